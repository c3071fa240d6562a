use std::time::Duration;

/// Inter-request pause policy, kept pure (elapsed time in, wait duration
/// out) so tests can drive the orchestrator with zero real delay.
#[derive(Debug, Clone, Copy)]
pub struct CooldownPolicy {
    delay: Duration,
}

impl CooldownPolicy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn zero() -> Self {
        Self::new(Duration::ZERO)
    }

    /// How much longer to pause, given how long the last call already took.
    pub fn wait_for(&self, since_last_call: Duration) -> Duration {
        self.delay.saturating_sub(since_last_call)
    }
}
