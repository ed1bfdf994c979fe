//! Table-driven resolution of ticket reference literals.
//!
//! Ticket type, priority and status are small reference tables. Incoming
//! strings are resolved through one generic operation so every axis fails
//! the same way: `NotFound` carrying the literals the store currently holds.

use tracker_core::{DomainError, DomainResult};

use crate::model::{TicketPriority, TicketStatus, TicketType};

/// Which reference table a value lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceTable {
    TicketType,
    TicketPriority,
    TicketStatus,
}

impl ReferenceTable {
    pub const ALL: [ReferenceTable; 3] = [
        ReferenceTable::TicketType,
        ReferenceTable::TicketPriority,
        ReferenceTable::TicketStatus,
    ];

    /// Literals seeded into the table on a fresh store.
    pub fn default_literals(self) -> Vec<&'static str> {
        match self {
            ReferenceTable::TicketType => TicketType::ALL.iter().map(|v| v.as_str()).collect(),
            ReferenceTable::TicketPriority => {
                TicketPriority::ALL.iter().map(|v| v.as_str()).collect()
            }
            ReferenceTable::TicketStatus => TicketStatus::ALL.iter().map(|v| v.as_str()).collect(),
        }
    }
}

/// An enum backed by a reference table.
pub trait ReferenceValue: Copy + Sized + 'static {
    const TABLE: ReferenceTable;
    /// Request field name used in error payloads.
    const PROPERTY: &'static str;
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_literal(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == raw)
    }
}

/// Resolve `raw` against the literals currently persisted for `R`'s table.
///
/// Matching is exact and case-sensitive. A literal the enum knows but the
/// table no longer holds is treated as unknown.
pub fn resolve<R: ReferenceValue>(raw: &str, persisted: &[String]) -> DomainResult<R> {
    match R::from_literal(raw) {
        Some(value) if persisted.iter().any(|p| p == raw) => Ok(value),
        _ => Err(DomainError::not_found_with_hint(
            R::PROPERTY,
            raw,
            persisted.join(", "),
        )),
    }
}

macro_rules! impl_reference_value {
    ($t:ty, $table:expr, $property:literal, [$($variant:ident),+ $(,)?]) => {
        impl ReferenceValue for $t {
            const TABLE: ReferenceTable = $table;
            const PROPERTY: &'static str = $property;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(ReferenceValue::as_str(self))
            }
        }
    };
}

impl_reference_value!(
    TicketType,
    ReferenceTable::TicketType,
    "ticketType",
    [GeneralTask, NewFeature, ChangeRequest, Enhancement, Bug]
);
impl_reference_value!(
    TicketPriority,
    ReferenceTable::TicketPriority,
    "ticketPriority",
    [Low, Medium, High, Urgent]
);
impl_reference_value!(
    TicketStatus,
    ReferenceTable::TicketStatus,
    "ticketStatus",
    [New, Development, Testing, Resolved]
);
