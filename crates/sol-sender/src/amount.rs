//! Conversion of user-facing amounts to base units.
//!
//! `floor(amount * 10^decimals)` is computed on the shortest decimal
//! expansion of the `f64` (what `Display` prints, never exponent form),
//! not on the binary value, so `0.29` with 2 decimals is 29 and not 28.

use crate::error::SenderError;

/// Decimals of native SOL (lamports).
pub const SOL_DECIMALS: u8 = 9;

pub fn to_base_units(amount: f64, decimals: u8) -> Result<u64, SenderError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SenderError::NonPositiveAmount);
    }
    let out_of_range = || SenderError::AmountOutOfRange { amount, decimals };

    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    // Truncating extra fraction digits is the floor for positive values.
    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.extend(
        fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(decimals as usize),
    );

    let units: u128 = digits.parse().map_err(|_| out_of_range())?;
    match u64::try_from(units) {
        Ok(0) | Err(_) => Err(out_of_range()),
        Ok(units) => Ok(units),
    }
}
