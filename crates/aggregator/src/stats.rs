//! Price statistics over a day's listings.

use rust_decimal::Decimal;

/// Arithmetic mean, rounded to cents. Returns `None` for an empty slice.
#[must_use]
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum: Decimal = values.iter().sum();
    Some((sum / Decimal::from(values.len())).round_dp(2))
}

/// Median with linear interpolation on sorted values: the middle value for
/// odd n, the mean of the two middle values for even n. Rounded to cents.
#[must_use]
pub fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let m = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / Decimal::TWO
    };
    Some(m.round_dp(2))
}
