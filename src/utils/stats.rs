//! Statistical utility functions.

use std::f64::consts::PI;

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the population variance of a slice (n denominator).
///
/// A sliding window is treated as the whole population it describes, so no
/// Bessel correction is applied.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / values.len() as f64
}

/// Calculate the population standard deviation of a slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    population_variance(values).sqrt()
}

/// Density of the standard normal distribution at `z`.
///
/// # Example
/// ```
/// use anofox_stream::utils::stats::normal_pdf;
///
/// assert!((normal_pdf(0.0) - 0.398_942_28).abs() < 1e-8);
/// ```
pub fn normal_pdf(z: f64) -> f64 {
    (-(z * z) / 2.0).exp() / (2.0 * PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(mean(&[10.0]), 10.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn population_variance_calculates_correctly() {
        // Population variance of [1, 2, 3, 4, 5] = 2.0
        assert_relative_eq!(
            population_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(population_variance(&[7.0]), 0.0, epsilon = 1e-10);
        assert!(population_variance(&[]).is_nan());
    }

    #[test]
    fn population_std_dev_calculates_correctly() {
        assert_relative_eq!(
            population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            2.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn normal_pdf_is_symmetric_and_peaks_at_zero() {
        assert_relative_eq!(normal_pdf(1.5), normal_pdf(-1.5), epsilon = 1e-12);
        assert!(normal_pdf(0.0) > normal_pdf(0.1));
        assert_relative_eq!(normal_pdf(1.0), 0.241_970_724_5, epsilon = 1e-9);
    }
}
