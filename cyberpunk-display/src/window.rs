use crate::error::DisplayError;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Default number of prices held, one per display column.
pub const DEFAULT_CAPACITY: usize = 32;

/// Fixed-capacity FIFO of the most recent prices.
///
/// Pushed to by the feed task and read by the render loop through [`Self::snapshot`]. The
/// lock is only held for the duration of a single push or copy, never across an `.await`.
#[derive(Debug)]
pub struct SlidingWindow {
    capacity: usize,
    prices: Mutex<VecDeque<f64>>,
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SlidingWindow {
    /// Create a new window holding at most `capacity` prices (minimum of one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            prices: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a price, evicting the oldest when at capacity.
    pub fn push(&self, price: f64) {
        let mut prices = self.prices.lock();
        if prices.len() >= self.capacity {
            prices.pop_front();
        }
        prices.push_back(price);
    }

    /// Copy of the window containing exactly `capacity` prices, oldest first.
    ///
    /// A partially filled window is left-padded with its oldest price.
    pub fn snapshot(&self) -> Result<Vec<f64>, DisplayError> {
        let prices = self.prices.lock();
        let oldest = *prices.front().ok_or(DisplayError::EmptyWindow)?;

        let mut snapshot = Vec::with_capacity(self.capacity);
        snapshot.resize(self.capacity - prices.len(), oldest);
        snapshot.extend(prices.iter().copied());
        Ok(snapshot)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.prices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.lock().is_empty()
    }

    /// Most recently pushed price.
    pub fn latest(&self) -> Option<f64> {
        self.prices.lock().back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        struct TestCase {
            capacity: usize,
            pushes: Vec<f64>,
            expected: Result<Vec<f64>, DisplayError>,
        }

        let tests = vec![
            TestCase {
                // TC0: empty window cannot be snapshot
                capacity: 4,
                pushes: vec![],
                expected: Err(DisplayError::EmptyWindow),
            },
            TestCase {
                // TC1: single price fills every column
                capacity: 4,
                pushes: vec![7.0],
                expected: Ok(vec![7.0, 7.0, 7.0, 7.0]),
            },
            TestCase {
                // TC2: partial window left-padded with the oldest price
                capacity: 4,
                pushes: vec![1.0, 2.0],
                expected: Ok(vec![1.0, 1.0, 1.0, 2.0]),
            },
            TestCase {
                // TC3: full window
                capacity: 4,
                pushes: vec![1.0, 2.0, 3.0, 4.0],
                expected: Ok(vec![1.0, 2.0, 3.0, 4.0]),
            },
            TestCase {
                // TC4: overflow evicts the oldest prices
                capacity: 4,
                pushes: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
                expected: Ok(vec![3.0, 4.0, 5.0, 6.0]),
            },
            TestCase {
                // TC5: zero capacity is treated as one
                capacity: 0,
                pushes: vec![1.0, 2.0],
                expected: Ok(vec![2.0]),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let window = SlidingWindow::new(test.capacity);
            for price in test.pushes {
                window.push(price);
            }
            assert_eq!(window.snapshot(), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_snapshot_is_last_capacity_pushes_in_order() {
        for pushes in [32_usize, 33, 64, 100, 1000] {
            let window = SlidingWindow::default();
            for price in 0..pushes {
                window.push(price as f64);
            }

            let expected = (pushes - DEFAULT_CAPACITY..pushes)
                .map(|price| price as f64)
                .collect::<Vec<_>>();

            assert_eq!(window.len(), DEFAULT_CAPACITY);
            assert_eq!(window.snapshot().unwrap(), expected, "{pushes} pushes failed");
            assert_eq!(window.latest(), Some((pushes - 1) as f64));
        }
    }
}
