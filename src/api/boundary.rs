use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::core::Domain;

/// Host notification that the viewport moved past the loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DataRequest {
    /// The domain starts before the first row.
    Before { domain_start: f64, first_x: f64 },
    /// The domain ends after the last row.
    After { domain_end: f64, last_x: f64 },
}

pub type DataRequests = SmallVec<[DataRequest; 2]>;

/// Edge-triggered boundary detector.
///
/// A request fires when the domain crosses a data edge, and not again until
/// the domain comes back inside or a different first/last row arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundaryTracker {
    before: bool,
    after: bool,
    first_x: Option<f64>,
    last_x: Option<f64>,
}

impl BoundaryTracker {
    pub fn observe(
        &mut self,
        domain: Domain,
        first_x: Option<f64>,
        last_x: Option<f64>,
    ) -> DataRequests {
        self.rearm_on_new_edges(first_x, last_x);
        let mut requests = DataRequests::new();

        let before = first_x.is_some_and(|first| domain.min() < first);
        if before
            && !self.before
            && let Some(first_x) = first_x
        {
            debug!(domain_start = domain.min(), first_x, "data needed before domain start");
            requests.push(DataRequest::Before {
                domain_start: domain.min(),
                first_x,
            });
        }
        self.before = before;

        let after = last_x.is_some_and(|last| domain.max() > last);
        if after
            && !self.after
            && let Some(last_x) = last_x
        {
            debug!(domain_end = domain.max(), last_x, "data needed after domain end");
            requests.push(DataRequest::After {
                domain_end: domain.max(),
                last_x,
            });
        }
        self.after = after;
        requests
    }

    /// Records the current crossing state without emitting anything.
    pub fn arm_silently(&mut self, domain: Domain, first_x: Option<f64>, last_x: Option<f64>) {
        self.first_x = first_x;
        self.last_x = last_x;
        self.before = first_x.is_some_and(|first| domain.min() < first);
        self.after = last_x.is_some_and(|last| domain.max() > last);
    }

    fn rearm_on_new_edges(&mut self, first_x: Option<f64>, last_x: Option<f64>) {
        if first_x != self.first_x {
            self.before = false;
            self.first_x = first_x;
        }
        if last_x != self.last_x {
            self.after = false;
            self.last_x = last_x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundaryTracker, DataRequest};
    use crate::core::Domain;

    #[test]
    fn crossing_fires_once_until_domain_returns() {
        let mut tracker = BoundaryTracker::default();
        tracker.arm_silently(Domain::new(10.0, 20.0), Some(0.0), Some(50.0));

        let first = tracker.observe(Domain::new(-5.0, 5.0), Some(0.0), Some(50.0));
        assert_eq!(
            first.as_slice(),
            &[DataRequest::Before {
                domain_start: -5.0,
                first_x: 0.0
            }]
        );
        assert!(tracker.observe(Domain::new(-8.0, 2.0), Some(0.0), Some(50.0)).is_empty());
        assert!(tracker.observe(Domain::new(1.0, 11.0), Some(0.0), Some(50.0)).is_empty());
        assert_eq!(tracker.observe(Domain::new(-1.0, 9.0), Some(0.0), Some(50.0)).len(), 1);
    }

    #[test]
    fn new_first_row_rearms_the_latch() {
        let mut tracker = BoundaryTracker::default();
        tracker.arm_silently(Domain::new(10.0, 20.0), Some(0.0), Some(50.0));
        assert_eq!(tracker.observe(Domain::new(-30.0, -20.0), Some(0.0), Some(50.0)).len(), 1);
        let requests = tracker.observe(Domain::new(-30.0, -20.0), Some(-10.0), Some(50.0));
        assert_eq!(
            requests.as_slice(),
            &[DataRequest::Before {
                domain_start: -30.0,
                first_x: -10.0
            }]
        );
    }

    #[test]
    fn reset_does_not_emit_and_empty_data_never_requests() {
        let mut tracker = BoundaryTracker::default();
        tracker.arm_silently(Domain::new(-5.0, 60.0), Some(0.0), Some(50.0));
        assert!(tracker.observe(Domain::new(-5.0, 60.0), Some(0.0), Some(50.0)).is_empty());
        assert!(tracker.observe(Domain::new(-5.0, 60.0), None, None).is_empty());
    }
}
