use tracing::trace;

use crate::core::{Domain, Scale};

/// Solves the x-domain that keeps both initial touch pixels under the current
/// touch pixels.
///
/// `initial` and `current` are the two touch x positions; order does not
/// matter. Returns `None` when either pair collapses to one pixel.
#[must_use]
pub fn solve_pinch_domain(
    start_scale: &Scale,
    initial: (f64, f64),
    current: (f64, f64),
) -> Option<Domain> {
    let (a, b) = ordered(initial);
    let (c, d) = ordered(current);
    let initial_span = b - a;
    let current_span = d - c;
    if initial_span == 0.0 || current_span == 0.0 {
        trace!(initial_span, current_span, "degenerate pinch span");
        return None;
    }
    let ratio = initial_span / current_span;
    let domain = start_scale.invert_range_with(|edge| a + (edge - c) * ratio);
    domain.is_finite().then_some(domain)
}

fn ordered((first, second): (f64, f64)) -> (f64, f64) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}
