use std::time::Duration;
use tokio::time::Instant;

/// Default minimum interval between two frames sent to a display.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Drop-and-discard rate limiter on the monotonic tokio clock.
///
/// A request arriving sooner than `min_interval` after the last accepted one is rejected
/// and not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns true and records the send time if a send is allowed now.
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last_sent {
            Some(last_sent) if now.duration_since(last_sent) < self.min_interval => false,
            _ => {
                self.last_sent = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_try_acquire() {
        let mut throttle = Throttle::new(Duration::from_millis(100));

        // First send is always accepted
        assert!(throttle.try_acquire());

        // Second request within the interval is dropped
        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(!throttle.try_acquire());

        // Dropped request does not reset the interval
        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(throttle.try_acquire());

        tokio::time::advance(Duration::from_millis(99)).await;
        assert!(!throttle.try_acquire());

        tokio::time::advance(Duration::from_millis(250)).await;
        assert!(throttle.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_drops() {
        let mut throttle = Throttle::new(Duration::ZERO);
        assert!((0..10).all(|_| throttle.try_acquire()));
    }
}
