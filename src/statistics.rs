//! Descriptive statistics over score lists.
//!
//! Every helper is total: an empty dataset yields `0.0` rather than `NaN`,
//! because the values end up printed directly in reports.

/// Computes the arithmetic mean of the given values.
///
/// Returns `0.0` if the iterator is empty.
#[must_use]
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Computes the population standard deviation around a known mean.
///
/// The sum of squared deviations is divided by `N`, not `N - 1`.
///
/// # Arguments
///
/// * `mean` - The mean value of the dataset (pre-computed)
/// * `values` - An iterator over the values
#[must_use]
pub fn population_std_dev(mean: f64, values: impl IntoIterator<Item = f64>) -> f64 {
    self::mean(values.into_iter().map(|x| (x - mean).powi(2))).sqrt()
}

/// Percentage of `part` in `whole`, `0.0` when `whole` is zero.
#[must_use]
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Digits needed to print any finite `f64` exactly.
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Formats `value` with a fixed number of decimals.
///
/// Rounding works on the exact binary value, so `11.995` (stored slightly
/// below the tie) prints as `11.99`. Exact decimal ties round away from
/// zero: `12.125` prints as `12.13`, `6.25` as `6.3`.
#[must_use]
pub fn to_fixed(value: f64, digits: usize) -> String {
    let nearest = format!("{:.*}", digits, value);
    if !value.is_finite() {
        return nearest;
    }
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value);
    let Some((whole, fraction)) = exact.split_once('.') else {
        return nearest;
    };
    let (kept, dropped) = fraction.split_at(digits.min(fraction.len()));
    let is_tie = dropped.starts_with('5') && dropped[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return nearest;
    }
    let truncated: f64 = match format!("{whole}.{kept}").parse() {
        Ok(truncated) => truncated,
        Err(_) => return nearest,
    };
    let step = 10f64.powi(-(digits as i32));
    let away = truncated + step.copysign(value);
    format!("{:.*}", digits, away)
}

/// Rounds to two decimals, the precision averages are stored with.
#[must_use]
pub fn round2(value: f64) -> f64 {
    to_fixed(value, 2).parse().unwrap_or(value)
}

/// Returns the largest value, or `None` for an empty iterator.
#[must_use]
pub fn max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().max_by(f64::total_cmp)
}

/// Returns the smallest value, or `None` for an empty iterator.
#[must_use]
pub fn min(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(population_std_dev(0.0, std::iter::empty()), 0.0);
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(max(std::iter::empty()), None);
    }

    #[test]
    fn std_dev_divides_by_population_size() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let avg = mean(values);
        assert_eq!(avg, 5.0);
        assert!((population_std_dev(avg, values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(10.256), 10.26);
        assert_eq!(round2(9.994), 9.99);
        assert_eq!(rate(1, 4), 25.0);
    }

    #[test]
    fn rounding_follows_the_stored_binary_value() {
        assert_eq!(round2(11.995), 11.99);
        assert_eq!(round2(14.995), 14.99);
        assert_eq!(round2(12.125), 12.13);
        assert_eq!(round2(17.0), 17.0);
    }

    #[test]
    fn fixed_decimals_round_exact_ties_up() {
        assert_eq!(to_fixed(12.125, 2), "12.13");
        assert_eq!(to_fixed(6.25, 1), "6.3");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(11.995, 2), "11.99");
        assert_eq!(to_fixed(66.666_666, 2), "66.67");
        assert_eq!(to_fixed(10.0, 2), "10.00");
    }

    #[test]
    fn extremes_pick_bounds() {
        assert_eq!(max([3.0, 18.5, 0.0]), Some(18.5));
        assert_eq!(min([3.0, 18.5, 0.0]), Some(0.0));
    }
}
