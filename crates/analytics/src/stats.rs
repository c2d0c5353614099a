//! Statistical helpers shared by the engines.
//!
//! All functions work on plain `f64` slices with missing values already removed
//! and return `None` when the statistic is undefined.

use approx::relative_eq;

/// Relative gap under which two floats are treated as the same number.
const RELATIVE_TOLERANCE: f64 = 1e-12;
/// Absolute gap used instead near zero.
const ABSOLUTE_TOLERANCE: f64 = 1e-15;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean_val = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean_val).powi(2)).sum();
    Some((sum_sq / (n - 1) as f64).sqrt())
}

/// Equality up to rounding noise.
pub fn approx_eq(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = ABSOLUTE_TOLERANCE, max_relative = RELATIVE_TOLERANCE)
}

/// True when every value equals the first up to rounding noise.
///
/// The same growth rate computed from prices on different scales differs in
/// the last bits, and a variance test on such a series leaves a tiny nonzero
/// standard deviation.
pub fn is_constant(values: &[f64]) -> bool {
    match values.split_first() {
        Some((&first, rest)) => rest.iter().all(|&v| approx_eq(v, first)),
        None => true,
    }
}

/// Compounds simple returns: `prod(1 + r) - 1`, skipping missing periods.
///
/// `None` when no period in the input has a value.
pub fn compound_return<I>(returns: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut growth = 1.0;
    let mut seen = false;
    for r in returns.into_iter().flatten() {
        growth *= 1.0 + r;
        seen = true;
    }
    seen.then_some(growth - 1.0)
}

/// Pearson correlation of paired observations.
///
/// Identical series correlate at exactly 1.0 (including constant ones).
/// Otherwise the coefficient is undefined with fewer than two pairs or when
/// either side has no variance. Equality and constancy are judged up to
/// rounding noise, and a coefficient that misses +/-1 only by rounding is
/// reported as exactly +/-1.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    if xs.iter().zip(ys).all(|(&x, &y)| approx_eq(x, y)) {
        return Some(1.0);
    }
    if is_constant(xs) || is_constant(ys) {
        return None;
    }

    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let r = sxy / denom;
    if approx_eq(r.abs(), 1.0) {
        return Some(1.0f64.copysign(r));
    }
    Some(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
        assert_eq!(sample_std_dev(&[1.0]), None);
        // var = ((1-2.5)^2 + (2-2.5)^2 + (3-2.5)^2 + (4-2.5)^2) / 3 = 5/3
        assert_relative_eq!(
            sample_std_dev(&[1.0, 2.0, 3.0, 4.0]).unwrap(),
            (5.0f64 / 3.0).sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn compounding_skips_missing() {
        let r = compound_return([Some(0.10), None, Some(0.10)]).unwrap();
        assert_relative_eq!(r, 0.21, epsilon = 1e-12);
        assert_eq!(compound_return([None, None]), None);
        assert_eq!(compound_return(std::iter::empty()), None);
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = [0.01, 0.02, -0.01, 0.03];
        let y = [0.02, 0.04, -0.02, 0.06];
        assert_eq!(pearson(&x, &y), Some(1.0));

        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert_eq!(pearson(&x, &neg), Some(-1.0));

        let scaled: Vec<f64> = x.iter().map(|v| v * 0.3 + 0.001).collect();
        assert_eq!(pearson(&x, &scaled), Some(1.0));

        let z = [0.01, 0.02, -0.01, 0.025];
        assert!(pearson(&x, &z).unwrap() < 1.0);
    }

    #[test]
    fn rounding_noise_is_not_variance() {
        // 10% growth from prices 100/110/121 and from 30/33/36.3.
        let wide = [0.1, 0.1];
        let narrow = [0.10000000000000009, 0.09999999999999987];
        assert!(is_constant(&narrow));
        assert!(is_constant(&[]));
        assert!(!is_constant(&[0.1, 0.1000001]));
        assert_eq!(pearson(&wide, &narrow), Some(1.0));
        assert_eq!(pearson(&narrow, &[0.2, 0.3]), None);
    }

    #[test]
    fn pearson_degenerate_cases() {
        assert_eq!(pearson(&[0.1], &[0.2]), None);
        assert_eq!(pearson(&[0.1, 0.1], &[0.1, 0.1]), Some(1.0));
        assert_eq!(pearson(&[0.1, 0.1], &[0.2, 0.3]), None);
    }
}
