// Path: crates/types/src/app/notification.rs

use crate::protocol::{Operation, TimePointSec, TransactionId};
use serde::{Deserialize, Serialize};

/// What observers see for each applied operation.
///
/// `virtual_op` is zero for submitted operations. Virtual operations are
/// numbered from one within their block.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OperationNotification {
    /// The enclosing transaction; the zero id for virtual operations emitted
    /// outside a transaction.
    pub trx_id: TransactionId,
    /// Height of the block being applied.
    pub block: u32,
    /// Position of the transaction in its block.
    pub trx_in_block: u32,
    /// Position of the operation in its transaction.
    pub op_in_trx: u16,
    /// Virtual operation counter.
    pub virtual_op: u32,
    /// Time of the block being applied.
    pub timestamp: TimePointSec,
    /// The operation.
    pub op: Operation,
}
