//! Transfer state tracking for downloads

use serde::Serialize;

/// Simulated progress never passes this mark on its own
pub const SIMULATED_CEILING: f64 = 90.0;

/// Transfer state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    #[default]
    Idle,
    InProgress {
        /// 0.0 to 100.0
        percent: f64,
        /// bytes per second
        rate: f64,
    },
    Succeeded,
    Failed(String),
}

/// Inputs that drive [`TransferTracker`]
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Started,
    /// Real bytes received. `total` is `None` when the server sent no length.
    Progress {
        downloaded: u64,
        total: Option<u64>,
        bytes_per_sec: f64,
    },
    /// Simulated advance used when the real total is unknown
    Tick { increment: f64, bytes_per_sec: f64 },
    Finished,
    Errored(String),
    Reset,
}

/// Progress tracking structure
#[derive(Debug, Clone, Default)]
pub struct TransferTracker {
    state: TransferState,
    downloaded_bytes: u64,
}

impl TransferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    pub fn downloaded_bytes(&self) -> u64 {
        self.downloaded_bytes
    }

    /// Apply an event. Returns `true` when the state changed.
    ///
    /// A transfer can only start from `Idle`, and only an in-progress
    /// transfer accepts progress, completion or failure. Everything else is
    /// ignored apart from `Reset`.
    pub fn apply(&mut self, event: TransferEvent) -> bool {
        let next = match (&self.state, event) {
            (_, TransferEvent::Reset) => {
                self.downloaded_bytes = 0;
                TransferState::Idle
            }
            (TransferState::Idle, TransferEvent::Started) => {
                self.downloaded_bytes = 0;
                TransferState::InProgress {
                    percent: 0.0,
                    rate: 0.0,
                }
            }
            (
                TransferState::InProgress { percent, .. },
                TransferEvent::Progress {
                    downloaded,
                    total,
                    bytes_per_sec,
                },
            ) => {
                self.downloaded_bytes = downloaded;
                let percent = match total {
                    Some(total) if total > 0 => {
                        (downloaded as f64 / total as f64 * 100.0).min(100.0)
                    }
                    _ => *percent,
                };
                TransferState::InProgress {
                    percent,
                    rate: bytes_per_sec,
                }
            }
            (
                TransferState::InProgress { percent, .. },
                TransferEvent::Tick {
                    increment,
                    bytes_per_sec,
                },
            ) => {
                let percent = if *percent >= SIMULATED_CEILING {
                    *percent
                } else {
                    (*percent + increment.max(0.0)).min(SIMULATED_CEILING)
                };
                TransferState::InProgress {
                    percent,
                    rate: bytes_per_sec,
                }
            }
            (TransferState::InProgress { .. }, TransferEvent::Finished) => {
                TransferState::Succeeded
            }
            (TransferState::InProgress { .. }, TransferEvent::Errored(reason)) => {
                TransferState::Failed(reason)
            }
            _ => return false,
        };

        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Percentage shown to the user (0.0 to 100.0)
    pub fn percent(&self) -> f64 {
        match self.state {
            TransferState::InProgress { percent, .. } => percent,
            TransferState::Succeeded => 100.0,
            TransferState::Idle | TransferState::Failed(_) => 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TransferState::InProgress { .. })
    }

    /// Short status text for the results view
    pub fn status_label(&self) -> String {
        match &self.state {
            TransferState::Idle => String::new(),
            TransferState::InProgress { rate, .. } if *rate <= 0.0 => "Starting...".to_string(),
            TransferState::InProgress { rate, .. } => {
                format!("{:.1} MB/s", rate / (1024.0 * 1024.0))
            }
            TransferState::Succeeded => "Done".to_string(),
            TransferState::Failed(_) => "Error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> TransferTracker {
        let mut tracker = TransferTracker::new();
        tracker.apply(TransferEvent::Started);
        tracker
    }

    fn tick(increment: f64) -> TransferEvent {
        TransferEvent::Tick {
            increment,
            bytes_per_sec: 1024.0 * 1024.0,
        }
    }

    // ============================================================
    // START / RESET
    // ============================================================

    #[test]
    fn test_new_tracker_is_idle() {
        let tracker = TransferTracker::new();
        assert_eq!(tracker.state(), &TransferState::Idle);
        assert_eq!(tracker.percent(), 0.0);
        assert_eq!(tracker.status_label(), "");
    }

    #[test]
    fn test_start_enters_in_progress() {
        let tracker = started();
        assert!(tracker.is_active());
        assert_eq!(tracker.percent(), 0.0);
        assert_eq!(tracker.status_label(), "Starting...");
    }

    #[test]
    fn test_second_start_is_ignored_while_active() {
        let mut tracker = started();
        tracker.apply(tick(40.0));
        assert!(!tracker.apply(TransferEvent::Started));
        assert_eq!(tracker.percent(), 40.0);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut tracker = started();
        tracker.apply(TransferEvent::Finished);
        assert!(tracker.apply(TransferEvent::Reset));
        assert_eq!(tracker.state(), &TransferState::Idle);
    }

    // ============================================================
    // REAL PROGRESS
    // ============================================================

    #[test]
    fn test_progress_with_known_total() {
        let mut tracker = started();
        tracker.apply(TransferEvent::Progress {
            downloaded: 250,
            total: Some(1000),
            bytes_per_sec: 2.5 * 1024.0 * 1024.0,
        });

        assert_eq!(tracker.percent(), 25.0);
        assert_eq!(tracker.downloaded_bytes(), 250);
        assert_eq!(tracker.status_label(), "2.5 MB/s");
    }

    #[test]
    fn test_progress_over_total_is_clamped() {
        let mut tracker = started();
        tracker.apply(TransferEvent::Progress {
            downloaded: 1500,
            total: Some(1000),
            bytes_per_sec: 1.0,
        });
        assert_eq!(tracker.percent(), 100.0);
    }

    #[test]
    fn test_progress_without_total_keeps_percent() {
        let mut tracker = started();
        tracker.apply(tick(30.0));
        tracker.apply(TransferEvent::Progress {
            downloaded: 4096,
            total: None,
            bytes_per_sec: 100.0,
        });
        assert_eq!(tracker.percent(), 30.0);
        assert_eq!(tracker.downloaded_bytes(), 4096);
    }

    #[test]
    fn test_progress_ignored_when_idle() {
        let mut tracker = TransferTracker::new();
        assert!(!tracker.apply(TransferEvent::Progress {
            downloaded: 1,
            total: Some(2),
            bytes_per_sec: 1.0,
        }));
        assert_eq!(tracker.state(), &TransferState::Idle);
    }

    // ============================================================
    // SIMULATED TICKS
    // ============================================================

    #[test]
    fn test_ticks_stall_at_ceiling() {
        let mut tracker = started();
        for _ in 0..20 {
            tracker.apply(tick(14.9));
        }
        assert_eq!(tracker.percent(), SIMULATED_CEILING);
    }

    #[test]
    fn test_negative_tick_does_not_rewind() {
        let mut tracker = started();
        tracker.apply(tick(10.0));
        tracker.apply(tick(-5.0));
        assert_eq!(tracker.percent(), 10.0);
    }

    // ============================================================
    // TERMINAL STATES
    // ============================================================

    #[test]
    fn test_finish_reaches_hundred() {
        let mut tracker = started();
        tracker.apply(tick(50.0));
        tracker.apply(TransferEvent::Finished);

        assert_eq!(tracker.state(), &TransferState::Succeeded);
        assert_eq!(tracker.percent(), 100.0);
        assert_eq!(tracker.status_label(), "Done");
    }

    #[test]
    fn test_error_resets_progress() {
        let mut tracker = started();
        tracker.apply(tick(50.0));
        tracker.apply(TransferEvent::Errored("connection reset".to_string()));

        assert_eq!(
            tracker.state(),
            &TransferState::Failed("connection reset".to_string())
        );
        assert_eq!(tracker.percent(), 0.0);
        assert_eq!(tracker.status_label(), "Error");
    }

    #[test]
    fn test_events_after_finish_are_ignored() {
        let mut tracker = started();
        tracker.apply(TransferEvent::Finished);
        assert!(!tracker.apply(tick(5.0)));
        assert!(!tracker.apply(TransferEvent::Errored("late".to_string())));
        assert_eq!(tracker.state(), &TransferState::Succeeded);
    }

    #[test]
    fn test_restart_after_failure_needs_reset() {
        let mut tracker = started();
        tracker.apply(TransferEvent::Errored("boom".to_string()));
        assert!(!tracker.apply(TransferEvent::Started));

        tracker.apply(TransferEvent::Reset);
        assert!(tracker.apply(TransferEvent::Started));
        assert!(tracker.is_active());
    }
}
