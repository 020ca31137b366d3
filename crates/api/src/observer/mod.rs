// Path: crates/api/src/observer/mod.rs
//! The operation observer seam.

use deip_types::app::OperationNotification;

/// Receives a notification for every applied operation, in commit order.
///
/// Observers may keep their own indexes but must not touch ledger objects.
/// An `Err` is logged and reported; it never rolls anything back.
pub trait OperationObserver: Send + Sync {
    /// A short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Handles one notification.
    fn on_operation(&self, notification: &OperationNotification) -> Result<(), String>;
}
