//! Access Guard — who may initiate a day close, right now
//!
//! Two sequential store-scoped checks, re-derived from current data on
//! every attempt (no caching, no session affinity):
//!
//! 1. Shift condition: exactly one OPEN shift. Zero or multiple open
//!    shifts deny every role, including store managers — a business
//!    rule, not an oversight.
//! 2. User access: cashiers must own the active shift (OWNER);
//!    managerial roles always pass (OVERRIDE).
//!
//! The PIN precursor rejects malformed PINs before any lookup and
//! reports unknown and wrong PINs identically, so callers cannot
//! enumerate operators.

use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, operator, shift};
use shared::models::{AccessDecision, AccessType, DenyReason, Operator, OperatorRole};

/// PIN format: 4-6 ASCII digits
pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 6;

pub fn is_valid_pin_format(pin: &str) -> bool {
    (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len())
        && pin.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Clone)]
pub struct AccessGuard {
    pool: SqlitePool,
    store_id: i64,
}

impl AccessGuard {
    pub fn new(pool: SqlitePool, store_id: i64) -> Self {
        Self { pool, store_id }
    }

    /// Authenticate the PIN and evaluate both checks.
    ///
    /// Denial is a normal structured result; only infrastructure
    /// failures surface as errors.
    pub async fn check_access(&self, pin: &str) -> RepoResult<AccessDecision> {
        // Format gate before any database access
        if !is_valid_pin_format(pin) {
            return Ok(AccessDecision::denied(
                DenyReason::InvalidPin,
                "Invalid PIN",
                None,
                None,
                0,
            ));
        }

        let Some(op) = self.authenticate(pin).await? else {
            return Ok(AccessDecision::denied(
                DenyReason::InvalidPin,
                "Invalid PIN",
                None,
                None,
                0,
            ));
        };

        let mut open_shifts = shift::find_open_by_store(&self.pool, self.store_id).await?;
        let open_shift_count = open_shifts.len() as i64;

        // Shift condition: exactly one open shift, no role bypasses it
        if open_shift_count == 0 {
            return Ok(AccessDecision::denied(
                DenyReason::NoOpenShifts,
                "No open shifts, open a shift before closing the day",
                Some(op),
                None,
                0,
            ));
        }
        if open_shift_count > 1 {
            return Ok(AccessDecision::denied(
                DenyReason::MultipleOpenShifts,
                format!("{open_shift_count} shifts are open, close the extra shifts first"),
                Some(op),
                None,
                open_shift_count,
            ));
        }
        let active_shift = open_shifts.remove(0);

        // User access: ownership for cashiers, override for managers
        match op.role {
            OperatorRole::Cashier => {
                if active_shift.assigned_operator_id == Some(op.id) {
                    Ok(AccessDecision::granted(
                        AccessType::Owner,
                        op,
                        active_shift,
                        1,
                    ))
                } else {
                    Ok(AccessDecision::denied(
                        DenyReason::NotShiftOwner,
                        "Shift belongs to another operator, ask a manager to close",
                        Some(op),
                        Some(active_shift),
                        1,
                    ))
                }
            }
            OperatorRole::ShiftManager | OperatorRole::StoreManager => Ok(
                AccessDecision::granted(AccessType::Override, op, active_shift, 1),
            ),
        }
    }

    /// Match the PIN against the store's active operators.
    ///
    /// Every candidate hash is verified even after a match so the
    /// comparison cost does not depend on which operator (if any)
    /// matched.
    async fn authenticate(&self, pin: &str) -> RepoResult<Option<Operator>> {
        let candidates = operator::find_active_by_store(&self.pool, self.store_id).await?;
        let mut matched: Option<Operator> = None;
        for candidate in candidates {
            if operator::verify_pin(pin, &candidate.pin_hash) && matched.is_none() {
                matched = Some(candidate);
            }
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_pin_format;

    #[test]
    fn test_pin_format() {
        assert!(is_valid_pin_format("1234"));
        assert!(is_valid_pin_format("123456"));
        assert!(!is_valid_pin_format("123"));
        assert!(!is_valid_pin_format("1234567"));
        assert!(!is_valid_pin_format("12a4"));
        assert!(!is_valid_pin_format(""));
        assert!(!is_valid_pin_format("12 4"));
    }
}
