//! Odd-number range filter with a fixed bound on the sum of the result.
//!
//! Parity uses Rust's truncating remainder: `n % 2 != 0` holds for every odd
//! `n`, negative ones included (`-3 % 2 == -1`).

use thiserror::Error;
use tracing::{debug, info, instrument};

/// Largest sum the odd numbers of a range may add up to.
pub const SUM_LIMIT: i128 = 100;

/// Errors reported by [`odd_numbers_in_range`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddNumbersError {
    #[error("Start ({start}) must be less than or equal to end ({end})")]
    InvalidRange { start: i64, end: i64 },

    #[error("Sum of odd numbers ({sum}) exceeds limit of {limit}", limit = SUM_LIMIT)]
    SumExceedsLimit { sum: i128 },
}

impl OddNumbersError {
    #[must_use]
    pub fn invalid_range(start: i64, end: i64) -> Self {
        Self::InvalidRange { start, end }
    }

    #[must_use]
    pub fn sum_exceeds_limit(sum: i128) -> Self {
        Self::SumExceedsLimit { sum }
    }
}

/// Returns `true` when `n` is not evenly divisible by two.
#[must_use]
pub fn is_odd(n: i64) -> bool {
    n % 2 != 0
}

/// Check a range without materializing it and return the sum of its odd
/// numbers.
///
/// # Errors
/// Same as [`odd_numbers_in_range`].
pub fn validate_range(start: i64, end: i64) -> Result<i128, OddNumbersError> {
    if start > end {
        debug!(start, end, "rejecting inverted range");
        return Err(OddNumbersError::invalid_range(start, end));
    }
    let sum = odd_sum(first_odd(start), end);
    if sum > SUM_LIMIT {
        debug!(sum, "sum of odd numbers is over the limit");
        return Err(OddNumbersError::sum_exceeds_limit(sum));
    }
    Ok(sum)
}

/// Collect every odd integer in `[start, end]` in ascending order.
///
/// The sum of the selection is checked against [`SUM_LIMIT`]; a sum equal to
/// the limit passes. The sum is evaluated in closed form over `i128` before
/// the sequence is materialized, so a range whose total is out of bounds is
/// rejected without allocating it.
///
/// # Errors
/// - [`OddNumbersError::InvalidRange`] when `start > end`
/// - [`OddNumbersError::SumExceedsLimit`] when the odd numbers add up to more
///   than [`SUM_LIMIT`]; the error carries the true sum
#[instrument(name = "parity.odd_numbers", level = "debug")]
pub fn odd_numbers_in_range(start: i64, end: i64) -> Result<Vec<i64>, OddNumbersError> {
    let sum = validate_range(start, end)?;

    let first = first_odd(start);
    let odd_numbers: Vec<i64> = if first > end {
        Vec::new()
    } else {
        (first..=end).step_by(2).collect()
    };

    info!(count = odd_numbers.len(), sum, "generated odd numbers");
    Ok(odd_numbers)
}

// i64::MAX is odd, so an even `n` always has a successor.
fn first_odd(n: i64) -> i64 {
    if is_odd(n) { n } else { n + 1 }
}

/// Sum of the arithmetic progression `first, first + 2, ..` up to `end`.
///
/// `first` must be odd. The mean of the progression fits in `i64` and there
/// are at most 2^63 terms, so the product never leaves `i128`.
fn odd_sum(first: i64, end: i64) -> i128 {
    if first > end {
        return 0;
    }
    let first = i128::from(first);
    let count = (i128::from(end) - first).div_euclid(2) + 1;
    count * (first + count - 1)
}
