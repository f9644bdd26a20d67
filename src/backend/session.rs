//! Supersession of in-flight lookups

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Hands out generation-numbered resolve requests.
///
/// Starting a request cancels the one before it, and only the newest
/// generation is accepted when results come back.
#[derive(Debug, Default)]
pub struct ResolveSession {
    generation: u64,
    token: Option<CancellationToken>,
}

impl ResolveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling the previous one
    pub fn begin(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.token.take() {
            debug!("Superseding resolve request {}", self.generation);
            previous.cancel();
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        (self.generation, token)
    }

    /// Whether a result for `generation` should still be shown
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.token.is_some()
    }

    /// Mark `generation` as done so a late duplicate is rejected
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.token = None;
            true
        } else {
            false
        }
    }

    /// Cancel whatever is in flight
    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }
}
