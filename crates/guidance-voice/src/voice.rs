//! Voice selection for the remote synthesis backend.
//!
//! Resolution precedence: explicit global override > locale-derived mapping
//! > universal default. Resolution never fails: an unmapped locale falls
//! through to the default voice silently.

/// Voice the remote backend falls back to when no locale mapping matches.
pub const DEFAULT_VOICE: &str = "Joanna";

/// Map a BCP-47-ish locale tag (e.g. "en-GB", "de-DE", "nl") to a remote
/// voice id. Region matters for English; other languages map by language
/// alone.
fn locale_to_voice(locale: &str) -> &'static str {
    let lower = locale.to_ascii_lowercase();
    let (language, region) = match lower.split_once('-') {
        Some((l, r)) => (l, Some(r)),
        None => (lower.as_str(), None),
    };
    match language {
        "de" => "Marlene",
        "en" => match region {
            Some("gb") => "Brian",
            Some("ca") => "Joanna",
            Some("au") => "Nicole",
            Some("in") => "Raveena",
            _ => "Joanna",
        },
        "fr" => "Celine",
        "nl" => "Lotte",
        _ => DEFAULT_VOICE,
    }
}

/// Resolved voice identity for the remote backend.
#[derive(Debug, Clone)]
pub struct VoiceSelection {
    /// Explicit global override; wins over any locale mapping.
    pub override_voice: Option<String>,
    /// Locale used for the mapping when no override is set.
    pub locale: String,
}

impl VoiceSelection {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            override_voice: None,
            locale: locale.into(),
        }
    }

    pub fn with_override(mut self, voice: impl Into<String>) -> Self {
        self.override_voice = Some(voice.into());
        self
    }

    /// Resolve to a concrete voice id. Always succeeds.
    pub fn resolve(&self) -> String {
        if let Some(ref v) = self.override_voice {
            return v.clone();
        }
        locale_to_voice(&self.locale).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_regions_map_distinctly() {
        assert_eq!(VoiceSelection::new("en-GB").resolve(), "Brian");
        assert_eq!(VoiceSelection::new("en-AU").resolve(), "Nicole");
        assert_eq!(VoiceSelection::new("en-IN").resolve(), "Raveena");
        assert_eq!(VoiceSelection::new("en-CA").resolve(), "Joanna");
        assert_eq!(VoiceSelection::new("en-US").resolve(), "Joanna");
        assert_eq!(VoiceSelection::new("en").resolve(), "Joanna");
    }

    #[test]
    fn language_only_mappings() {
        assert_eq!(VoiceSelection::new("de-DE").resolve(), "Marlene");
        assert_eq!(VoiceSelection::new("fr").resolve(), "Celine");
        assert_eq!(VoiceSelection::new("nl-NL").resolve(), "Lotte");
    }

    #[test]
    fn unmapped_locale_falls_through_to_default() {
        assert_eq!(VoiceSelection::new("ja-JP").resolve(), DEFAULT_VOICE);
        assert_eq!(VoiceSelection::new("").resolve(), DEFAULT_VOICE);
    }

    #[test]
    fn override_wins_over_locale() {
        let sel = VoiceSelection::new("de-DE").with_override("Hans");
        assert_eq!(sel.resolve(), "Hans");
    }
}
