use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::core::Domain;
use crate::core::primitives::{datetime_to_unix_seconds, decimal_to_f64};

pub type ValueFn<T> = Arc<dyn Fn(&T) -> f64 + Send + Sync>;
pub type MultiValueFn<T> = Arc<dyn Fn(&T) -> SmallVec<[f64; 4]> + Send + Sync>;

/// Reads the x value of one plotted row.
pub struct XAccessor<T> {
    read: ValueFn<T>,
    identity: bool,
}

impl<T> XAccessor<T> {
    pub fn new(read: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            read: Arc::new(read),
            identity: false,
        }
    }

    /// Accessor for rows keyed by a UTC timestamp (mapped to unix seconds).
    pub fn datetime(read: impl Fn(&T) -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self::new(move |datum| datetime_to_unix_seconds(read(datum)))
    }

    #[must_use]
    pub fn value(&self, datum: &T) -> f64 {
        (self.read)(datum)
    }

    /// `true` when the row itself is the x value.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.identity == other.identity && Arc::ptr_eq(&self.read, &other.read)
    }
}

impl<T> XAccessor<T>
where
    T: Copy + Into<f64>,
{
    #[must_use]
    pub fn identity() -> Self {
        Self {
            read: Arc::new(|datum: &T| (*datum).into()),
            identity: true,
        }
    }
}

impl<T> Clone for XAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            identity: self.identity,
        }
    }
}

impl<T> fmt::Debug for XAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XAccessor")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// One y-extent contribution per plotted row.
pub enum YValue<T> {
    Single(ValueFn<T>),
    Multi(MultiValueFn<T>),
}

impl<T> YValue<T> {
    pub fn single(read: impl Fn(&T) -> f64 + Send + Sync + 'static) -> Self {
        Self::Single(Arc::new(read))
    }

    pub fn multi(read: impl Fn(&T) -> SmallVec<[f64; 4]> + Send + Sync + 'static) -> Self {
        Self::Multi(Arc::new(read))
    }

    /// Decimal-valued column; rows that do not fit in `f64` are skipped.
    pub fn decimal(read: impl Fn(&T) -> Decimal + Send + Sync + 'static) -> Self {
        Self::single(move |datum| decimal_to_f64(read(datum), "y value").unwrap_or(f64::NAN))
    }

    pub(crate) fn push_values(&self, datum: &T, out: &mut SmallVec<[f64; 8]>) {
        match self {
            Self::Single(read) => out.push(read(datum)),
            Self::Multi(read) => out.extend(read(datum)),
        }
    }
}

impl<T> Clone for YValue<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Single(read) => Self::Single(Arc::clone(read)),
            Self::Multi(read) => Self::Multi(Arc::clone(read)),
        }
    }
}

impl<T> fmt::Debug for YValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("YValue::Single(..)"),
            Self::Multi(_) => f.write_str("YValue::Multi(..)"),
        }
    }
}

/// Min/max over the finite values, `None` when there are none.
#[must_use]
pub fn finite_extent(values: impl IntoIterator<Item = f64>) -> Option<Domain> {
    let mut extent: Option<(OrderedFloat<f64>, OrderedFloat<f64>)> = None;
    for value in values.into_iter().filter(|value| value.is_finite()) {
        let value = OrderedFloat(value);
        extent = Some(match extent {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    extent.map(|(min, max)| Domain::new(min.into_inner(), max.into_inner()))
}

/// Merges two optional extents into their union.
#[must_use]
pub fn union_extent(left: Option<Domain>, right: Option<Domain>) -> Option<Domain> {
    match (left, right) {
        (Some(left), Some(right)) => Some(Domain::new(
            left.min().min(right.min()),
            left.max().max(right.max()),
        )),
        (one, None) | (None, one) => one,
    }
}
