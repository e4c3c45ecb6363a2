use parking_lot::Mutex;
use tokio::sync::Notify;

/// Capacity-one coalescing hand-off between a producer and a single consumer.
///
/// [`Self::put`] never blocks and overwrites any value not yet taken, so a slow consumer
/// only ever observes the newest value.
#[derive(Debug)]
pub struct LatestValueSlot<T> {
    value: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> Default for LatestValueSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestValueSlot<T> {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Store `value`, discarding any previous untaken value, and wake the consumer.
    pub fn put(&self, value: T) {
        *self.value.lock() = Some(value);
        self.notify.notify_one();
    }

    /// Take the current value without waiting.
    pub fn try_take(&self) -> Option<T> {
        self.value.lock().take()
    }

    /// Wait until a value is present, then take it.
    pub async fn take(&self) -> T {
        loop {
            let notified = self.notify.notified();
            if let Some(value) = self.try_take() {
                return value;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    #[test]
    fn test_put_overwrites_untaken_value() {
        let slot = LatestValueSlot::new();
        assert_eq!(slot.try_take(), None::<u32>);

        slot.put(1);
        slot.put(2);
        slot.put(3);

        assert_eq!(slot.try_take(), Some(3));
        assert_eq!(slot.try_take(), None);
    }

    #[tokio::test]
    async fn test_take_returns_latest_value() {
        let slot = LatestValueSlot::new();
        for value in 0..100 {
            slot.put(value);
        }

        assert_eq!(slot.take().await, 99);
        assert_eq!(slot.try_take(), None);
    }

    #[tokio::test]
    async fn test_take_waits_for_put() {
        let slot = Arc::new(LatestValueSlot::new());

        let consumer = tokio::spawn({
            let slot = Arc::clone(&slot);
            async move { slot.take().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        slot.put("btcusdt");
        assert_eq!(consumer.await.unwrap(), "btcusdt");
    }

    #[tokio::test]
    async fn test_stale_wakeup_does_not_return_early() {
        let slot = LatestValueSlot::new();

        // Permit left by this put wakes the next take once, which must then wait again
        slot.put(1);
        assert_eq!(slot.try_take(), Some(1));

        let take = tokio::time::timeout(Duration::from_millis(20), slot.take()).await;
        assert!(take.is_err());
    }
}
