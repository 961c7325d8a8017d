use rust_decimal::Decimal;

use crate::error::SpongeKitError;
use crate::types::{Money, Rate};
use crate::SpongeKitResult;

fn validate_rate(rate: Rate) -> SpongeKitResult<()> {
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(SpongeKitError::InvalidInput {
            field: "discount_rate".into(),
            reason: format!("Discount rate must satisfy 0 <= r < 1, got {rate}"),
        });
    }
    Ok(())
}

fn overflow(field: &str) -> SpongeKitError {
    SpongeKitError::invalid(field, "Value exceeds the representable decimal range")
}

/// Present value of a level `payment` at the end of each year `1..=years`.
///
/// Once `(1 + rate)^y` leaves the decimal range the remaining payments are
/// worth less than `payment / 7.9e28` each and are dropped.
pub fn pv_level_stream(rate: Rate, years: u32, payment: Money) -> SpongeKitResult<Money> {
    validate_rate(rate)?;

    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(years))
            .ok_or_else(|| overflow("payment"));
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for _ in 0..years {
        discount = match discount.checked_mul(one_plus_r) {
            Some(next) => next,
            None => break,
        };
        result = result
            .checked_add(payment / discount)
            .ok_or_else(|| overflow("payment"))?;
    }

    Ok(result)
}
