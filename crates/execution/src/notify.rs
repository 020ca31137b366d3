// Path: crates/execution/src/notify.rs

use crate::context::AppliedOperation;
use deip_api::observer::OperationObserver;
use deip_telemetry::chain_metrics;
use deip_types::app::OperationNotification;
use deip_types::error::ObserverError;
use deip_types::protocol::{TimePointSec, TransactionId};
use std::fmt;
use std::sync::Arc;

type Subscriber = Box<dyn Fn(&OperationNotification) -> Result<(), String> + Send + Sync>;

/// An ordered registry of notification subscribers.
///
/// Subscribers run synchronously, in registration order, once per
/// notification. A failing subscriber is logged and reported; the others
/// still run and nothing is rolled back.
#[derive(Default)]
pub struct NotificationBus {
    subscribers: Vec<(String, Subscriber)>,
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.subscribers.iter().map(|(name, _)| name))
            .finish()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, name: impl Into<String>, subscriber: F)
    where
        F: Fn(&OperationNotification) -> Result<(), String> + Send + Sync + 'static,
    {
        self.subscribers.push((name.into(), Box::new(subscriber)));
    }

    pub fn add_observer(&mut self, observer: Arc<dyn OperationObserver>) {
        let name = observer.name().to_string();
        self.subscribe(name, move |n| observer.on_operation(n));
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers one notification to every subscriber and returns their
    /// failures.
    pub fn publish(&self, notification: &OperationNotification) -> Vec<ObserverError> {
        let mut failures = Vec::new();
        for (name, subscriber) in &self.subscribers {
            if let Err(reason) = subscriber(notification) {
                tracing::warn!(
                    target: "notify",
                    event = "observer_failed",
                    observer = %name,
                    op = notification.op.name(),
                    block = notification.block,
                    error = %reason
                );
                chain_metrics().inc_observer_failures(name);
                failures.push(ObserverError {
                    observer: name.clone(),
                    reason,
                });
            }
        }
        failures
    }
}

/// Where a batch of applied operations sits in the chain.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    pub trx_id: TransactionId,
    pub block: u32,
    pub trx_in_block: u32,
    pub timestamp: TimePointSec,
}

/// Numbers a batch of applied operations. Each keeps the `op_in_trx` it was
/// recorded with. Virtual operations take the next value of the block's
/// `virtual_op` counter; submitted ones carry zero.
pub(crate) fn notifications(
    applied: Vec<AppliedOperation>,
    at: Position,
    virtual_op: &mut u32,
) -> Vec<OperationNotification> {
    applied
        .into_iter()
        .map(|applied| {
            let virtual_seq = if applied.is_virtual {
                *virtual_op = virtual_op.saturating_add(1);
                *virtual_op
            } else {
                0
            };
            OperationNotification {
                trx_id: at.trx_id,
                block: at.block,
                trx_in_block: at.trx_in_block,
                op_in_trx: applied.op_in_trx,
                virtual_op: virtual_seq,
                timestamp: at.timestamp,
                op: applied.op,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_types::protocol::operations::{ProducerRewardOperation, TransferOperation};
    use deip_types::protocol::{Asset, Operation};
    use parking_lot::Mutex;

    fn transfer() -> Operation {
        TransferOperation {
            from: "alice".into(),
            to: "bob".into(),
            amount: Asset::core(5),
            memo: String::new(),
        }
        .into()
    }

    fn position() -> Position {
        Position {
            trx_id: TransactionId::default(),
            block: 7,
            trx_in_block: 2,
            timestamp: TimePointSec::from_secs(21),
        }
    }

    #[test]
    fn failing_subscriber_does_not_stop_the_others() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = NotificationBus::new();
        bus.subscribe("broken", |_| Err("disk full".to_string()));
        let sink = seen.clone();
        bus.subscribe("recorder", move |n| {
            sink.lock().push(n.op.name());
            Ok(())
        });

        let notes = notifications(
            vec![AppliedOperation {
                op: transfer(),
                op_in_trx: 0,
                is_virtual: false,
            }],
            position(),
            &mut 0,
        );
        let failures = bus.publish(&notes[0]);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].observer, "broken");
        assert_eq!(*seen.lock(), vec!["transfer"]);
    }

    #[test]
    fn keeps_op_index_and_counts_virtual_operations() {
        let reward = Operation::from(ProducerRewardOperation {
            producer: "initminer".into(),
            reward: Asset::core(1),
        });
        let mut counter = 3;
        let notes = notifications(
            vec![
                AppliedOperation {
                    op: transfer(),
                    op_in_trx: 0,
                    is_virtual: false,
                },
                AppliedOperation {
                    op: transfer(),
                    op_in_trx: 0,
                    is_virtual: false,
                },
                AppliedOperation {
                    op: reward,
                    op_in_trx: 1,
                    is_virtual: true,
                },
            ],
            position(),
            &mut counter,
        );
        assert_eq!(
            notes.iter().map(|n| (n.op_in_trx, n.virtual_op)).collect::<Vec<_>>(),
            vec![(0, 0), (0, 0), (1, 4)]
        );
        assert_eq!(counter, 4);
    }
}
