//! Instruction formatting - pure functions from a route step to the text
//! fragments the selector composes into announcements.
//!
//! Two renderings exist for every announcement: plain text for the local
//! fallback voice and markup-escaped text for the SSML-capable remote
//! backend. Escaping is applied only when producing the remote rendering.

use crate::route::RouteStep;

/// Render a step's maneuver instruction. Returns None for an absent step or
/// a step carrying no instruction text, signaling the caller to use arrival
/// phrasing instead.
pub fn format_step(step: Option<&RouteStep>, mark_up: bool) -> Option<String> {
    let instruction = step?.instruction.as_deref()?;
    let trimmed = instruction.trim();
    if trimmed.is_empty() {
        return None;
    }
    if mark_up {
        Some(escape_for_markup(trimmed))
    } else {
        Some(trimmed.to_string())
    }
}

/// Road description for "Continue on ..." phrasings: `"{name} ({code})"`
/// when both exist, else whichever is present, else empty.
pub fn format_road_description(step: &RouteStep) -> String {
    match (step.road_name.as_deref(), step.road_code.as_deref()) {
        (Some(name), Some(code)) => format!("{} ({})", name, code),
        (Some(name), None) => name.to_string(),
        (None, Some(code)) => code.to_string(),
        (None, None) => String::new(),
    }
}

/// Escape characters unsafe inside the SSML document sent to the remote
/// backend.
pub fn escape_for_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
