//! Track change detection
//!
//! Decides whether a freshly normalized track is worth reporting. The last
//! reported track only advances once the report is known to have succeeded,
//! so a failed submission is retried on the next observation.

use tracing::debug;

use crate::stream::TrackInfo;

/// Result of comparing a track against the last reported one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Report,
    Skip,
}

/// What happened to an observed track in [`ChangeDetector::report_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Same as the last reported track
    Skipped,
    /// New track, submission succeeded, state advanced
    Submitted,
    /// New track, submission failed, state unchanged
    Failed,
}

/// Detector state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackerState {
    /// Nothing reported yet
    #[default]
    Idle,
    /// Last successfully reported track
    Tracking(TrackInfo),
}

/// Filters a stream of observations down to genuinely new tracks.
///
/// Owned by one poll loop; a loop per station gets its own detector.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    state: TrackerState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Last successfully reported track
    pub fn last_track(&self) -> Option<&TrackInfo> {
        match &self.state {
            TrackerState::Idle => None,
            TrackerState::Tracking(track) => Some(track),
        }
    }

    /// Compare `current` with the last reported track without changing state
    pub fn observe(&self, current: &TrackInfo) -> Decision {
        match &self.state {
            TrackerState::Tracking(last) if last == current => Decision::Skip,
            _ => Decision::Report,
        }
    }

    /// Record `track` as reported. Call only after a successful submission.
    pub fn confirm(&mut self, track: TrackInfo) {
        debug!(%track, "last track advanced");
        self.state = TrackerState::Tracking(track);
    }

    /// Observe `current`, run `submit` if it is new, and advance on success
    pub fn report_with<F>(&mut self, current: &TrackInfo, submit: F) -> Outcome
    where
        F: FnOnce(&TrackInfo) -> bool,
    {
        if self.observe(current) == Decision::Skip {
            return Outcome::Skipped;
        }
        if submit(current) {
            self.confirm(current.clone());
            Outcome::Submitted
        } else {
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(artist: &str, track: &str) -> TrackInfo {
        TrackInfo::new(artist, track)
    }

    // --- observe / confirm ---

    #[test]
    fn idle_reports_anything() {
        let d = ChangeDetector::new();
        assert_eq!(d.observe(&song("A", "1")), Decision::Report);
        assert_eq!(d.state(), &TrackerState::Idle);
    }

    #[test]
    fn observe_does_not_change_state() {
        let d = ChangeDetector::new();
        d.observe(&song("A", "1"));
        assert_eq!(d.observe(&song("A", "1")), Decision::Report);
        assert!(d.last_track().is_none());
    }

    #[test]
    fn confirmed_track_is_skipped() {
        let mut d = ChangeDetector::new();
        d.confirm(song("A", "1"));
        assert_eq!(d.observe(&song("A", "1")), Decision::Skip);
        assert_eq!(d.observe(&song("A", "2")), Decision::Report);
        assert_eq!(d.observe(&song("B", "1")), Decision::Report);
    }

    // --- report_with ---

    #[test]
    fn success_then_same_track_is_report_then_skip() {
        let mut d = ChangeDetector::new();
        let t = song("Artist X", "Song Y");
        assert_eq!(d.report_with(&t, |_| true), Outcome::Submitted);
        assert_eq!(d.observe(&t), Decision::Skip);
        assert_eq!(d.report_with(&t, |_| panic!("must not submit twice")), Outcome::Skipped);
    }

    #[test]
    fn failure_then_same_track_is_report_again() {
        let mut d = ChangeDetector::new();
        let t = song("Artist X", "Song Y");
        assert_eq!(d.report_with(&t, |_| false), Outcome::Failed);
        assert_eq!(d.state(), &TrackerState::Idle);
        assert_eq!(d.observe(&t), Decision::Report);
        assert_eq!(d.report_with(&t, |_| true), Outcome::Submitted);
    }

    #[test]
    fn failure_keeps_previous_track() {
        let mut d = ChangeDetector::new();
        let first = song("A", "1");
        let second = song("B", "2");
        d.report_with(&first, |_| true);

        assert_eq!(d.report_with(&second, |_| false), Outcome::Failed);
        assert_eq!(d.last_track(), Some(&first));
        assert_eq!(d.observe(&second), Decision::Report);
    }

    #[test]
    fn change_back_to_earlier_track_is_reported() {
        let mut d = ChangeDetector::new();
        d.report_with(&song("A", "1"), |_| true);
        d.report_with(&song("B", "2"), |_| true);
        assert_eq!(d.report_with(&song("A", "1"), |_| true), Outcome::Submitted);
    }

    #[test]
    fn submit_receives_current_track() {
        let mut d = ChangeDetector::new();
        let t = song("Seen", "Track");
        let mut seen = None;
        d.report_with(&t, |track| {
            seen = Some(track.clone());
            true
        });
        assert_eq!(seen, Some(t));
    }
}
