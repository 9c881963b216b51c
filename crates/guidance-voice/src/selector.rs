//! Announcement selection - decides whether a progress update is spoken and
//! composes the exact instruction text.
//!
//! The selector owns the de-duplication key (`AnnouncedStep`): one selector
//! per navigation session, never ambient global state. The key is replaced
//! the instant a decision is made, before synthesis is dispatched, so a slow
//! backend can never cause the same step to be spoken twice.

use crate::distance::DistanceFormatter;
use crate::formatter::{format_road_description, format_step};
use crate::route::{AlertLevel, ManeuverType, RouteProgress, StepId};
use tracing::debug;

/// Distance (route units) below which a maneuver is "imminent": linked
/// phrasings are used instead of standalone ones. Shared with the routing
/// collaborator's high-alert tier.
pub const HIGH_ALERT_THRESHOLD: f64 = 300.0;

/// Step length above which the "Continue on ... for ..." phrasing is used.
pub const LONG_STEP_DISTANCE: f64 = 2000.0;

/// Arrival phrasing used when the upcoming step carries no instruction.
const ARRIVAL_FALLBACK: &str = "You have arrived at your destination";

/// A decided announcement: plain text for the local fallback voice and the
/// markup-escaped rendering for the SSML-capable remote backend. Composed
/// fresh per decision, never cached across steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub step_id: StepId,
    pub plain: String,
    pub markup: String,
}

/// Stateful decision policy converting route progress into announcements.
pub struct AnnouncementSelector {
    formatter: DistanceFormatter,
    announced: Option<StepId>,
}

impl AnnouncementSelector {
    pub fn new(formatter: DistanceFormatter) -> Self {
        Self {
            formatter,
            announced: None,
        }
    }

    /// The most recently announced step, if any.
    pub fn announced_step(&self) -> Option<StepId> {
        self.announced
    }

    /// Reset the de-duplication key, allowing the current step to be
    /// announced again (reroute policy hook).
    pub fn clear_announced(&mut self) {
        self.announced = None;
    }

    /// Decide whether `progress` warrants a new announcement and compose its
    /// text. Returns None when suppressed (already announced this step).
    /// Policy branches are evaluated in order; the first match wins.
    pub fn select(
        &mut self,
        progress: &RouteProgress,
        distance_to_maneuver: f64,
    ) -> Option<Announcement> {
        // 1. Duplicate suppression: sole de-duplication key, no side effects.
        if self.announced == Some(progress.current_step.id) {
            debug!(step = progress.current_step.id.0, "Announcement suppressed: step already announced");
            return None;
        }

        // Claim the step before any synthesis can begin.
        self.announced = Some(progress.current_step.id);

        let distance = self.formatter.format(distance_to_maneuver);
        let compose = |mark_up: bool| -> String {
            self.compose(progress, distance_to_maneuver, &distance, mark_up)
        };

        let announcement = Announcement {
            step_id: progress.current_step.id,
            plain: compose(false),
            markup: compose(true),
        };
        debug!(step = announcement.step_id.0, text = %announcement.plain, "Announcement selected");
        Some(announcement)
    }

    fn compose(
        &self,
        progress: &RouteProgress,
        distance_to_maneuver: f64,
        distance: &str,
        mark_up: bool,
    ) -> String {
        let current = &progress.current_step;
        let upcoming = format_step(progress.upcoming_step.as_ref(), mark_up);
        let upcoming = upcoming.unwrap_or_else(|| ARRIVAL_FALLBACK.to_string());

        // 2. No follow-on step: compose from the upcoming step only.
        if progress.follow_on_step.is_none() {
            return if progress.alert_level == AlertLevel::Arrive {
                upcoming
            } else {
                format!("In {}, {}", distance, upcoming)
            };
        }

        // 3. Departure.
        if current.maneuver == ManeuverType::Depart && progress.alert_level == AlertLevel::Depart {
            return if distance_to_maneuver < HIGH_ALERT_THRESHOLD {
                let current_text = format_step(Some(current), mark_up)
                    .unwrap_or_else(|| ARRIVAL_FALLBACK.to_string());
                format!("{}, then in {}, {}", current_text, distance, upcoming)
            } else {
                self.continue_phrase(progress, distance, mark_up)
            };
        }

        // 4. Long step.
        if current.distance > LONG_STEP_DISTANCE {
            return self.continue_phrase(progress, distance, mark_up);
        }

        // 5. Linked high alert: upcoming maneuver is imminent after this one.
        if progress.alert_level == AlertLevel::High {
            let upcoming_is_short = progress
                .upcoming_step
                .as_ref()
                .map(|s| s.distance < HIGH_ALERT_THRESHOLD)
                .unwrap_or(false);
            if upcoming_is_short {
                if let Some(follow_on) = format_step(progress.follow_on_step.as_ref(), mark_up) {
                    return format!("{}, then {}", upcoming, follow_on);
                }
            }
            // 7. Default for High: verbatim upcoming instruction.
            return upcoming;
        }

        // 6. Not yet at high alert.
        format!("In {}, {}", distance, upcoming)
    }

    fn continue_phrase(&self, progress: &RouteProgress, distance: &str, mark_up: bool) -> String {
        let road = format_road_description(&progress.current_step);
        let road = if mark_up {
            crate::formatter::escape_for_markup(&road)
        } else {
            road
        };
        format!("Continue on {} for {}", road, distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::MeasurementUnits;
    use crate::route::RouteStep;

    fn selector() -> AnnouncementSelector {
        AnnouncementSelector::new(DistanceFormatter::new(MeasurementUnits::Metric))
    }

    fn three_step_progress(alert: AlertLevel) -> RouteProgress {
        RouteProgress::new(
            RouteStep::new(1, "Head north on Main Street")
                .with_road(Some("Main Street"), Some("A1"))
                .with_distance(500.0),
            Some(RouteStep::new(2, "Turn left onto Oak Avenue").with_distance(400.0)),
            Some(RouteStep::new(3, "Turn right onto Elm Street")),
            alert,
        )
    }

    #[test]
    fn duplicate_current_step_is_suppressed() {
        let mut sel = selector();
        let progress = three_step_progress(AlertLevel::Medium);

        assert!(sel.select(&progress, 400.0).is_some());
        assert!(sel.select(&progress, 350.0).is_none());
        assert!(sel.select(&progress, 120.0).is_none());
    }

    #[test]
    fn clearing_announced_allows_reannouncement() {
        let mut sel = selector();
        let progress = three_step_progress(AlertLevel::Medium);

        assert!(sel.select(&progress, 400.0).is_some());
        sel.clear_announced();
        assert!(sel.select(&progress, 400.0).is_some());
    }

    // Scenario A: long current step, not departing, alert Medium.
    #[test]
    fn long_step_uses_continue_phrasing() {
        let mut sel = selector();
        let mut progress = three_step_progress(AlertLevel::Medium);
        progress.current_step.distance = 2500.0;

        let a = sel.select(&progress, 2500.0).unwrap();
        assert_eq!(a.plain, "Continue on Main Street (A1) for 2.5 kilometers");
    }

    // Scenario B: follow-on absent, alert Arrive.
    #[test]
    fn arrival_speaks_upcoming_verbatim() {
        let mut sel = selector();
        let progress = RouteProgress::new(
            RouteStep::new(8, "Continue straight"),
            Some(RouteStep::new(9, "You have arrived at 12 Oak Avenue")),
            None,
            AlertLevel::Arrive,
        );

        let a = sel.select(&progress, 20.0).unwrap();
        assert_eq!(a.plain, "You have arrived at 12 Oak Avenue");
    }

    #[test]
    fn no_follow_on_before_arrival_uses_in_distance_phrasing() {
        let mut sel = selector();
        let progress = RouteProgress::new(
            RouteStep::new(8, "Continue straight"),
            Some(RouteStep::new(9, "You have arrived at 12 Oak Avenue")),
            None,
            AlertLevel::Medium,
        );

        let a = sel.select(&progress, 480.0).unwrap();
        assert_eq!(a.plain, "In 500 meters, You have arrived at 12 Oak Avenue");
    }

    // Scenario C: alert High, short upcoming step links the follow-on.
    #[test]
    fn high_alert_with_short_upcoming_links_follow_on() {
        let mut sel = selector();
        let mut progress = three_step_progress(AlertLevel::High);
        progress.upcoming_step.as_mut().unwrap().distance = 100.0;

        let a = sel.select(&progress, 250.0).unwrap();
        assert_eq!(
            a.plain,
            "Turn left onto Oak Avenue, then Turn right onto Elm Street"
        );
    }

    #[test]
    fn high_alert_with_long_upcoming_speaks_upcoming_only() {
        let mut sel = selector();
        let progress = three_step_progress(AlertLevel::High);

        let a = sel.select(&progress, 250.0).unwrap();
        assert_eq!(a.plain, "Turn left onto Oak Avenue");
    }

    // Scenario D: depart maneuver close to the next maneuver.
    #[test]
    fn depart_near_maneuver_uses_linked_phrasing() {
        let mut sel = selector();
        let mut progress = three_step_progress(AlertLevel::Depart);
        progress.current_step = progress
            .current_step
            .clone()
            .with_maneuver(ManeuverType::Depart);

        let a = sel.select(&progress, 50.0).unwrap();
        assert_eq!(
            a.plain,
            "Head north on Main Street, then in 50 meters, Turn left onto Oak Avenue"
        );
    }

    #[test]
    fn depart_far_from_maneuver_uses_continue_phrasing() {
        let mut sel = selector();
        let mut progress = three_step_progress(AlertLevel::Depart);
        progress.current_step = progress
            .current_step
            .clone()
            .with_maneuver(ManeuverType::Depart);

        let a = sel.select(&progress, 1500.0).unwrap();
        assert_eq!(a.plain, "Continue on Main Street (A1) for 1.5 kilometers");
    }

    #[test]
    fn non_high_alert_uses_in_distance_phrasing() {
        let mut sel = selector();
        let progress = three_step_progress(AlertLevel::Low);

        let a = sel.select(&progress, 950.0).unwrap();
        assert_eq!(a.plain, "In 950 meters, Turn left onto Oak Avenue");
    }

    #[test]
    fn markup_rendering_is_escaped() {
        let mut sel = selector();
        let progress = RouteProgress::new(
            RouteStep::new(1, "Head north").with_distance(100.0),
            Some(RouteStep::new(2, "Turn left at Smith & Sons").with_distance(400.0)),
            Some(RouteStep::new(3, "Turn right")),
            AlertLevel::Low,
        );

        let a = sel.select(&progress, 200.0).unwrap();
        assert_eq!(a.plain, "In 200 meters, Turn left at Smith & Sons");
        assert_eq!(a.markup, "In 200 meters, Turn left at Smith &amp; Sons");
    }

    #[test]
    fn missing_upcoming_instruction_falls_back_to_arrival_phrase() {
        let mut sel = selector();
        let progress = RouteProgress::new(
            RouteStep::new(5, "Continue straight"),
            None,
            None,
            AlertLevel::Arrive,
        );

        let a = sel.select(&progress, 10.0).unwrap();
        assert_eq!(a.plain, ARRIVAL_FALLBACK);
    }
}
