//! Numeric literal scaling.

use crisp_ir::{NumberParts, TimeUnit};
use num_bigint::BigInt;
use num_traits::{pow, Zero};

use crate::errors::{invalid, EvalResult};

/// Largest exponent accepted by literals and `^`.
pub const MAX_EXPONENT: u32 = 1024;

/// Value of a number literal: digits × 10^(power − fractional digits) ×
/// seconds per time unit.
///
/// Literals must be integral after scaling: `1.5e18` and `1.5h` are fine,
/// `1.5` is rejected.
pub fn number_from_parts(parts: &NumberParts) -> EvalResult<BigInt> {
    let (int, frac) = parts
        .mantissa
        .split_once('.')
        .unwrap_or((parts.mantissa.as_str(), ""));
    let digits: BigInt = format!("{int}{frac}")
        .parse()
        .map_err(|_| invalid(format!("`{}` is not a number", parts.mantissa)))?;

    let power = parts.power.unwrap_or(0);
    if power > MAX_EXPONENT {
        return Err(invalid(format!(
            "exponent {power} exceeds the maximum of {MAX_EXPONENT}"
        )));
    }
    let frac_len = u32::try_from(frac.len()).unwrap_or(u32::MAX);

    let seconds = parts.time_unit.map_or(1, TimeUnit::seconds);
    let scaled = digits * seconds;
    if power >= frac_len {
        return Ok(scaled * pow(BigInt::from(10u8), (power - frac_len) as usize));
    }
    let divisor = pow(BigInt::from(10u8), (frac_len - power) as usize);
    if !(&scaled % &divisor).is_zero() {
        return Err(invalid(format!(
            "fractional component of `{}` exceeds decimals",
            parts.mantissa
        )));
    }
    Ok(scaled / divisor)
}
