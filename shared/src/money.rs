//! Money helpers — integer cents as the storage unit
//!
//! All monetary amounts are persisted as integer cents (`i64`) to keep
//! SQLite arithmetic exact. `Decimal` is only used at the API boundary
//! for human-facing dollar amounts.

use rust_decimal::Decimal;

/// Convert integer cents to a dollar `Decimal` (2 decimal places)
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Convert a dollar `Decimal` to integer cents, rounding half-up
pub fn decimal_to_cents(amount: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;
    let scaled = (amount * Decimal::new(100, 0)).round();
    scaled.to_i64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_cents_to_decimal() {
        assert_eq!(cents_to_decimal(200), dec("2.00"));
        assert_eq!(cents_to_decimal(1), dec("0.01"));
        assert_eq!(cents_to_decimal(0), dec("0.00"));
        assert_eq!(cents_to_decimal(22500), dec("225.00"));
    }

    #[test]
    fn test_decimal_to_cents() {
        assert_eq!(decimal_to_cents(dec("2.00")), 200);
        assert_eq!(decimal_to_cents(dec("0.01")), 1);
        assert_eq!(decimal_to_cents(dec("99.99")), 9999);
    }

    #[test]
    fn test_round_trip() {
        for cents in [0_i64, 1, 99, 100, 1250, 9999, 100000] {
            assert_eq!(decimal_to_cents(cents_to_decimal(cents)), cents);
        }
    }
}
