//! Frame continuity tracking
//!
//! Alarm frames of one event arrive with increasing frame numbers and are
//! often near-duplicates. A frame following the last inferred frame of the
//! same monitor by at most `skip_count` reuses that frame's labels instead of
//! running inference again.
//!
//! Alarm paths look like
//! `/nvr/zoneminder/events/BackPorch/18/06/20/19/20/04/00224-capture.jpg`.

use tracing::debug;

use crate::error::{DetectError, DetectResult};
use crate::types::Label;

/// Date and time directories between the monitor and the frame file.
const MAX_TIMESTAMP_SEGMENTS: usize = 6;

/// Monitor and frame number derived from an alarm frame path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameKey {
    pub monitor: String,
    pub frame: u64,
}

impl FrameKey {
    pub fn parse(path: &str) -> DetectResult<Self> {
        let parse_error = || DetectError::PathParse(path.to_string());

        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = segments.pop().ok_or_else(parse_error)?;

        let frame = file_name
            .split('-')
            .next()
            .and_then(|prefix| prefix.parse::<u64>().ok())
            .ok_or_else(parse_error)?;

        let mut dirs = segments.into_iter().rev();
        let mut skipped = 0;
        let monitor = loop {
            let dir = dirs.next().ok_or_else(parse_error)?;
            if skipped < MAX_TIMESTAMP_SEGMENTS && dir.bytes().all(|b| b.is_ascii_digit()) {
                skipped += 1;
                continue;
            }
            break dir;
        };

        Ok(Self {
            monitor: monitor.to_string(),
            frame,
        })
    }
}

/// Per-call continuity state. Created at the start of a call, threaded through
/// its image loop by mutable reference and dropped at the end.
#[derive(Debug, Clone, Default)]
pub struct ContinuityState {
    last: Option<FrameKey>,
    last_labels: Vec<Label>,
}

impl ContinuityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels to reuse for `key`, or `None` when inference must run.
    pub fn reuse(&self, key: &FrameKey, skip_count: u64) -> Option<&[Label]> {
        if skip_count == 0 {
            return None;
        }
        let last = self.last.as_ref()?;
        if last.monitor != key.monitor {
            return None;
        }

        match key.frame.checked_sub(last.frame) {
            Some(diff) if diff > 0 && diff <= skip_count => {
                debug!(
                    "Consecutive frame {} of {} (last inferred {}), reusing labels",
                    key.frame, key.monitor, last.frame
                );
                Some(&self.last_labels)
            }
            _ => None,
        }
    }

    /// Remember a frame that just ran inference.
    pub fn record(&mut self, key: FrameKey, labels: Vec<Label>) {
        self.last = Some(key);
        self.last_labels = labels;
    }

    pub fn last_frame(&self) -> Option<&FrameKey> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn key(monitor: &str, frame: u64) -> FrameKey {
        FrameKey {
            monitor: monitor.to_string(),
            frame,
        }
    }

    fn person() -> Vec<Label> {
        vec![Label::new(
            1,
            "person",
            0.9,
            BoundingBox { ymin: 1.0, xmin: 2.0, ymax: 3.0, xmax: 4.0 },
        )]
    }

    #[test]
    fn test_parse_zoneminder_path() {
        let key = FrameKey::parse("/nvr/zoneminder/events/BackPorch/18/06/20/19/20/04/00224-capture.jpg")
            .unwrap();
        assert_eq!(key, FrameKey { monitor: "BackPorch".into(), frame: 224 });
    }

    #[test]
    fn test_parse_numeric_monitor() {
        let key = FrameKey::parse("/events/7/19/04/04/04/30/00/00506-capture.jpg").unwrap();
        assert_eq!(key.monitor, "7");
        assert_eq!(key.frame, 506);
    }

    #[test]
    fn test_parse_short_path() {
        let key = FrameKey::parse("/cam1/000010-capture.jpg").unwrap();
        assert_eq!(key, FrameKey { monitor: "cam1".into(), frame: 10 });
    }

    #[test]
    fn test_parse_failures() {
        for path in ["/garbage", "", "/", "/000010-capture.jpg", "/cam1/capture.jpg", "/cam1/-1-capture.jpg"] {
            assert!(
                matches!(FrameKey::parse(path), Err(DetectError::PathParse(_))),
                "{} should not parse",
                path
            );
        }
    }

    #[test]
    fn test_first_frame_runs() {
        let state = ContinuityState::new();
        assert!(state.reuse(&key("cam1", 10), 5).is_none());
    }

    #[test]
    fn test_skip_window() {
        let mut state = ContinuityState::new();
        state.record(key("cam1", 10), person());

        assert!(state.reuse(&key("cam1", 10), 2).is_none());
        assert_eq!(state.reuse(&key("cam1", 11), 2), Some(person().as_slice()));
        assert_eq!(state.reuse(&key("cam1", 12), 2), Some(person().as_slice()));
        assert!(state.reuse(&key("cam1", 13), 2).is_none());
        assert!(state.reuse(&key("cam1", 9), 2).is_none());
    }

    #[test]
    fn test_skip_iff_within_window() {
        for k in 0..5u64 {
            let mut state = ContinuityState::new();
            state.record(key("cam1", 100), person());
            for frame in 95..110u64 {
                let diff = frame as i64 - 100;
                let expected = diff > 0 && diff <= k as i64;
                assert_eq!(
                    state.reuse(&key("cam1", frame), k).is_some(),
                    expected,
                    "k={} frame={}",
                    k,
                    frame
                );
            }
        }
    }

    #[test]
    fn test_monitor_change_never_skips() {
        let mut state = ContinuityState::new();
        state.record(key("cam1", 10), person());
        assert!(state.reuse(&key("cam2", 11), 100).is_none());
    }

    #[test]
    fn test_zero_skip_count_disables() {
        let mut state = ContinuityState::new();
        state.record(key("cam1", 10), person());
        assert!(state.reuse(&key("cam1", 11), 0).is_none());
    }

    #[test]
    fn test_record_replaces_labels() {
        let mut state = ContinuityState::new();
        state.record(key("cam1", 10), person());
        state.record(key("cam1", 20), Vec::new());
        assert_eq!(state.last_frame(), Some(&key("cam1", 20)));
        assert_eq!(state.reuse(&key("cam1", 21), 1), Some(&[][..]));
    }
}
