//! [`SampleWindow`] – bounded, time-ordered buffer of recent joint samples.
//!
//! The window holds the last `capacity` samples, oldest first. Insertion
//! always appends to the tail; when the window overflows, the single oldest
//! sample is evicted. Detection logic reads the window; it never reorders it.
//!
//! Callers must push samples in non-decreasing timestamp order. The window
//! itself does not check this; the detector wrapping it rejects violations
//! before they reach the buffer (see
//! [`GestureDetector::add`][crate::detector::GestureDetector::add]).
//!
//! An optional [`WindowObserver`] can be injected at construction so that a
//! visualization layer (e.g. a skeleton overlay) can mirror the buffer's
//! contents. The observer is purely a side channel: detection logic never
//! consults it.

use gestmap_types::Sample;
use std::collections::VecDeque;

/// Default number of samples a window retains.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

// ────────────────────────────────────────────────────────────────────────────
// Observer
// ────────────────────────────────────────────────────────────────────────────

/// Observational callback mirroring the window's contents, e.g. for
/// on-screen joint trails. Never affects gesture logic.
pub trait WindowObserver {
    /// A sample was appended to the tail.
    fn sample_inserted(&mut self, sample: &Sample);

    /// A sample left the window, either by capacity eviction or by
    /// [`SampleWindow::clear`].
    fn sample_evicted(&mut self, sample: &Sample);
}

// ────────────────────────────────────────────────────────────────────────────
// SampleWindow
// ────────────────────────────────────────────────────────────────────────────

/// Fixed-capacity buffer of recent [`Sample`]s, oldest first.
///
/// Invariant: `len() <= capacity()` at all times. After `capacity + k`
/// pushes the window holds exactly the last `capacity` samples in insertion
/// order.
pub struct SampleWindow {
    entries: VecDeque<Sample>,
    capacity: usize,
    observer: Option<Box<dyn WindowObserver>>,
}

impl SampleWindow {
    /// Create an empty window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            observer: None,
        }
    }

    /// Attach a rendering observer. Replaces any previous observer.
    pub fn set_observer(&mut self, observer: Box<dyn WindowObserver>) {
        self.observer = Some(observer);
    }

    /// Append `sample` to the tail, evicting the oldest sample when the
    /// window is full.
    pub fn push(&mut self, sample: Sample) {
        if let Some(obs) = self.observer.as_mut() {
            obs.sample_inserted(&sample);
        }
        self.entries.push_back(sample);

        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                if let Some(obs) = self.observer.as_mut() {
                    obs.sample_evicted(&evicted);
                }
            }
        }
    }

    /// Empty the window, notifying the observer for each evicted sample.
    pub fn clear(&mut self) {
        while let Some(evicted) = self.entries.pop_front() {
            if let Some(obs) = self.observer.as_mut() {
                obs.sample_evicted(&evicted);
            }
        }
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no samples are buffered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The newest sample, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.entries.back()
    }

    /// The sample `n` positions back from the newest (`from_newest(0)` is
    /// the newest, `from_newest(1)` the one before it).
    pub fn from_newest(&self, n: usize) -> Option<&Sample> {
        let len = self.entries.len();
        if n < len { self.entries.get(len - 1 - n) } else { None }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gestmap_types::Point3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sample(seq: i64) -> Sample {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Sample::new(
            vec![Point3::new(seq as f32, 0.0, 0.0)],
            t0 + chrono::Duration::milliseconds(seq * 33),
        )
    }

    #[test]
    fn push_appends_in_order() {
        let mut w = SampleWindow::new(5);
        for i in 0..3 {
            w.push(sample(i));
        }
        assert_eq!(w.len(), 3);
        let xs: Vec<f32> = w.iter().map(|s| s.joints()[0].x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut w = SampleWindow::new(4);
        for i in 0..50 {
            w.push(sample(i));
            assert!(w.len() <= 4);
        }
    }

    #[test]
    fn overflow_keeps_exactly_the_last_capacity_samples() {
        let mut w = SampleWindow::new(3);
        for i in 0..7 {
            w.push(sample(i));
        }
        let xs: Vec<f32> = w.iter().map(|s| s.joints()[0].x).collect();
        assert_eq!(xs, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn from_newest_indexes_backwards() {
        let mut w = SampleWindow::new(5);
        for i in 0..4 {
            w.push(sample(i));
        }
        assert_eq!(w.from_newest(0).unwrap().joints()[0].x, 3.0);
        assert_eq!(w.from_newest(1).unwrap().joints()[0].x, 2.0);
        assert_eq!(w.from_newest(3).unwrap().joints()[0].x, 0.0);
        assert!(w.from_newest(4).is_none());
    }

    #[test]
    fn clear_empties_the_window() {
        let mut w = SampleWindow::new(5);
        for i in 0..5 {
            w.push(sample(i));
        }
        w.clear();
        assert!(w.is_empty());
        assert!(w.latest().is_none());
    }

    // ------------------------------------------------------------------
    // Observer side channel
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct Counts {
        inserted: usize,
        evicted: usize,
    }

    struct CountingObserver(Rc<RefCell<Counts>>);

    impl WindowObserver for CountingObserver {
        fn sample_inserted(&mut self, _sample: &Sample) {
            self.0.borrow_mut().inserted += 1;
        }
        fn sample_evicted(&mut self, _sample: &Sample) {
            self.0.borrow_mut().evicted += 1;
        }
    }

    #[test]
    fn observer_sees_inserts_and_evictions() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut w = SampleWindow::new(3);
        w.set_observer(Box::new(CountingObserver(Rc::clone(&counts))));

        for i in 0..5 {
            w.push(sample(i));
        }
        assert_eq!(counts.borrow().inserted, 5);
        assert_eq!(counts.borrow().evicted, 2);
    }

    #[test]
    fn observer_sees_clear_as_evictions() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut w = SampleWindow::new(10);
        w.set_observer(Box::new(CountingObserver(Rc::clone(&counts))));

        for i in 0..4 {
            w.push(sample(i));
        }
        w.clear();
        assert_eq!(counts.borrow().evicted, 4);
    }
}
