use crate::time::Duration;

/// The single timer of a sender guarding its oldest outstanding segment.
///
/// While running, ticks accumulate until the retransmission timeout (RTO) is reached. The RTO
/// doubles with every backoff and is reloaded with its initial value once the peer makes
/// progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetransmissionTimer {
    rto: Duration,
    elapsed: Duration,
    running: bool,
}

impl RetransmissionTimer {
    /// A stopped timer with the given timeout.
    pub fn new(rto: Duration) -> Self {
        RetransmissionTimer {
            rto,
            elapsed: Duration::from_millis(0),
            running: false,
        }
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the running timer reached its timeout.
    pub fn is_expired(&self) -> bool {
        self.running && self.elapsed >= self.rto
    }

    /// The current timeout.
    pub fn rto(&self) -> Duration {
        self.rto
    }

    /// Start counting from zero.
    pub fn start(&mut self) {
        self.running = true;
        self.reset();
    }

    /// Stop counting.
    pub fn stop(&mut self) {
        self.running = false;
        self.reset();
    }

    /// Restart the count without changing the running state.
    pub fn reset(&mut self) {
        self.elapsed = Duration::from_millis(0);
    }

    /// Double the timeout.
    pub fn backoff(&mut self) {
        self.rto = self.rto.saturating_mul(2);
    }

    /// Replace the timeout and restart the count.
    pub fn reload(&mut self, rto: Duration) {
        self.rto = rto;
        self.reset();
    }

    /// Add elapsed time, ignored while stopped.
    pub fn tick(&mut self, elapsed: Duration) -> &mut Self {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(elapsed);
        }
        self
    }
}
