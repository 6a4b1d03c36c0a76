//! Chi-square critical values at the 5% level.

use u_numflow::special::{chi_squared_cdf, inverse_normal_cdf};

use crate::error::{Result, SynthError};

const LEVEL: f64 = 0.95;

/// Critical value `c` with `P(χ²(df) > c) = 0.05`.
///
/// Inverts the χ² CDF by bisection, bracketing from the Wilson–Hilferty
/// cube-root approximation.
///
/// # Errors
/// `Usage` when `df` is zero.
pub fn chi_squared_critical(df: usize) -> Result<f64> {
    if df == 0 {
        return Err(SynthError::Usage(
            "chi-square needs at least one degree of freedom".into(),
        ));
    }
    let k = df as f64;
    let a = 2.0 / (9.0 * k);
    let guess = k * (1.0 - a + inverse_normal_cdf(LEVEL) * a.sqrt()).powi(3);

    let mut lo = 0.0;
    let mut hi = guess.max(1.0) * 2.0;
    while chi_squared_cdf(hi, k) < LEVEL {
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if chi_squared_cdf(mid, k) < LEVEL {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-12 * hi {
            break;
        }
    }
    Ok(0.5 * (lo + hi))
}
