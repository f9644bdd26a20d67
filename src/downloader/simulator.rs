//! Simulated progress feedback for transfers with no known length

use crate::downloader::progress::TransferEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Rates shown while simulating, in MB/s
pub const SIMULATED_RATES_MB: [f64; 5] = [1.2, 2.5, 3.8, 5.1, 4.2];

/// Largest simulated advance per tick, in percent
pub const MAX_TICK_INCREMENT: f64 = 15.0;

pub const TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Emits [`TransferEvent::Tick`] on a fixed interval until stopped
pub struct ProgressSimulator {
    handle: JoinHandle<()>,
    stop: CancellationToken,
}

impl ProgressSimulator {
    /// Start ticking into `events`
    pub fn spawn(events: mpsc::Sender<TransferEvent>) -> Self {
        Self::spawn_with_rng(events, StdRng::from_entropy())
    }

    /// Start ticking with a caller-provided generator
    pub fn spawn_with_rng(events: mpsc::Sender<TransferEvent>, mut rng: StdRng) -> Self {
        let stop = CancellationToken::new();
        let token = stop.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            // the first tick of a tokio interval completes immediately
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let event = next_tick(&mut rng);
                        if events.send(event).await.is_err() {
                            debug!("Progress receiver dropped, stopping simulator");
                            break;
                        }
                    }
                }
            }
        });

        Self { handle, stop }
    }

    /// Stop ticking and wait for the task to exit
    pub async fn stop(self) {
        self.stop.cancel();
        let _ = self.handle.await;
    }
}

/// One random tick: increment below 15% and a rate from the fixed table
pub fn next_tick<R: Rng>(rng: &mut R) -> TransferEvent {
    let increment = rng.gen::<f64>() * MAX_TICK_INCREMENT;
    let mb = SIMULATED_RATES_MB[rng.gen_range(0..SIMULATED_RATES_MB.len())];
    TransferEvent::Tick {
        increment,
        bytes_per_sec: mb * 1024.0 * 1024.0,
    }
}
