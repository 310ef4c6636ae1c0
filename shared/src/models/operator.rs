//! Operator Model (操作员)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Operator role.
///
/// Cashiers may only close the day on a shift they own; shift and
/// store managers close with override access. No role bypasses the
/// shift-condition check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OperatorRole {
    Cashier,
    ShiftManager,
    StoreManager,
}

impl OperatorRole {
    /// Managerial roles close the day regardless of shift ownership
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::ShiftManager | Self::StoreManager)
    }
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cashier => "cashier",
            Self::ShiftManager => "shift_manager",
            Self::StoreManager => "store_manager",
        };
        f.write_str(s)
    }
}

/// Error when parsing an operator role string
#[derive(Debug, thiserror::Error)]
#[error("Unknown operator role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for OperatorRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cashier" => Ok(Self::Cashier),
            "shift_manager" => Ok(Self::ShiftManager),
            "store_manager" => Ok(Self::StoreManager),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

/// Operator entity. The PIN hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Operator {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    pub role: OperatorRole,
    /// Argon2 hash of the login PIN
    #[serde(skip_serializing)]
    #[serde(default)]
    pub pin_hash: String,
    pub active: bool,
    pub created_at: i64,
}

/// Create operator payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorCreate {
    pub name: String,
    pub role: OperatorRole,
    /// Login PIN, 4-6 ASCII digits
    pub pin: String,
}

/// Update operator payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorUpdate {
    pub name: Option<String>,
    pub role: Option<OperatorRole>,
    pub pin: Option<String>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            OperatorRole::Cashier,
            OperatorRole::ShiftManager,
            OperatorRole::StoreManager,
        ] {
            assert_eq!(role.to_string().parse::<OperatorRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert!("admin".parse::<OperatorRole>().is_err());
    }

    #[test]
    fn test_is_manager() {
        assert!(!OperatorRole::Cashier.is_manager());
        assert!(OperatorRole::ShiftManager.is_manager());
        assert!(OperatorRole::StoreManager.is_manager());
    }
}
