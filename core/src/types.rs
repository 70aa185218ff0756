//! Shared primitive types used across the entire crate.

/// Row identifier of a registered user. System-assigned, monotonic.
pub type UserId = i64;

/// Row identifier of a placed order.
pub type OrderId = i64;

/// Row identifier of a filed complaint.
pub type ComplaintId = i64;
