/*! Time structures.

Nothing in this crate reads a clock. The driver reports how much time passed since its last call
through the various `tick` methods and every component measures its own deadlines by adding up
those reports.

 - [Duration] is used for all elapsed and configured time spans.
 - [Timer] accumulates elapsed time for a single entry, e.g. an ARP cache mapping.

[Duration]: https://doc.rust-lang.org/core/time/struct.Duration.html
[Timer]: struct.Timer.html
*/
use core::fmt;
pub use core::time::Duration;

/// The age of a single entry.
///
/// Starts at zero when created and only grows through [`tick`](#method.tick). Each cache entry
/// owns its own timer so entries expire independently of each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timer {
    elapsed: Duration,
}

impl Timer {
    /// A timer that has just been started.
    pub fn new() -> Self {
        Timer::default()
    }

    /// Add elapsed time.
    pub fn tick(&mut self, elapsed: Duration) -> &mut Self {
        self.elapsed = self.elapsed.saturating_add(elapsed);
        self
    }

    /// The time accumulated since the timer was started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the timer has reached the lifetime `ttl`.
    pub fn expired(&self, ttl: Duration) -> bool {
        self.elapsed >= ttl
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.elapsed.as_millis())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accumulates() {
        let mut timer = Timer::new();
        assert!(!timer.expired(Duration::from_millis(10)));
        timer.tick(Duration::from_millis(4)).tick(Duration::from_millis(5));
        assert_eq!(timer.elapsed(), Duration::from_millis(9));
        assert!(!timer.expired(Duration::from_millis(10)));
        assert!(timer.tick(Duration::from_millis(1)).expired(Duration::from_millis(10)));
    }

    #[test]
    fn zero_lifetime_is_always_expired() {
        assert!(Timer::new().expired(Duration::ZERO));
    }
}
