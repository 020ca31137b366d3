// Path: crates/api/src/interpreter/mod.rs
//! The custom operation interpreter seam.

use crate::state::StateAccess;
use deip_types::error::InterpreterError;
use deip_types::protocol::operations::{CustomBinaryOperation, CustomJsonOperation};

/// Applies `custom_json` and `custom_binary` operations for one id.
///
/// `state` is confined to the interpreter's own key space (see
/// [`NamespacedStateAccess`](crate::state::NamespacedStateAccess)), so keys
/// are relative to it and ledger records are out of reach. Writes share the enclosing transaction's undo session, so a failing
/// transaction discards them.
pub trait CustomOperationInterpreter: Send + Sync {
    /// The custom operation id this interpreter handles.
    fn id(&self) -> &str;

    /// Applies a JSON payload.
    fn apply_json(
        &self,
        state: &mut dyn StateAccess,
        op: &CustomJsonOperation,
    ) -> Result<(), InterpreterError>;

    /// Applies a binary payload.
    fn apply_binary(
        &self,
        state: &mut dyn StateAccess,
        op: &CustomBinaryOperation,
    ) -> Result<(), InterpreterError>;

    /// A JSON description of the payloads this interpreter accepts.
    fn operation_schema(&self) -> serde_json::Value;
}
