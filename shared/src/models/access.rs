//! Access Guard result types
//!
//! Denial is a normal, structured outcome — not an error. The decision
//! carries the operator and shift-count context where available so the
//! caller can render useful guidance, but never secret material.

use serde::{Deserialize, Serialize};

use super::{Operator, Shift};

/// How the operator is allowed to close the day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    /// Cashier closing their own shift
    Owner,
    /// Managerial role, regardless of shift assignment
    Override,
}

/// Why access was denied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    NoOpenShifts,
    MultipleOpenShifts,
    NotShiftOwner,
    InvalidPin,
}

/// Discriminated guard result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<DenyReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_shift: Option<Shift>,
    pub open_shift_count: i64,
}

impl AccessDecision {
    pub fn granted(
        access_type: AccessType,
        operator: Operator,
        active_shift: Shift,
        open_shift_count: i64,
    ) -> Self {
        Self {
            allowed: true,
            access_type: Some(access_type),
            reason_code: None,
            reason: None,
            operator: Some(operator),
            active_shift: Some(active_shift),
            open_shift_count,
        }
    }

    pub fn denied(
        reason_code: DenyReason,
        reason: impl Into<String>,
        operator: Option<Operator>,
        active_shift: Option<Shift>,
        open_shift_count: i64,
    ) -> Self {
        Self {
            allowed: false,
            access_type: None,
            reason_code: Some(reason_code),
            reason: Some(reason.into()),
            operator,
            active_shift,
            open_shift_count,
        }
    }
}

/// Input to the guard's check endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCheckRequest {
    pub pin: String,
}
