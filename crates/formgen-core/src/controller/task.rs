//! Pending network operations and their settled results.

use crate::bundle::SchemaBundle;
use crate::error::FormError;
use crate::service::FormService;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    Probe,
}

/// Identifies one issued operation. A result is only applied when its ticket
/// matches the operation the controller is still waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub(crate) operation: Operation,
    pub(crate) seq: u64,
}

impl Ticket {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// A generation request that has been admitted and is waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: Ticket,
    pub description: String,
}

/// A settled operation, sent back to the loop that owns the controller.
#[derive(Debug)]
pub enum Completion {
    Generated {
        ticket: Ticket,
        result: Result<SchemaBundle, FormError>,
    },
    Probed {
        ticket: Ticket,
        result: Result<(), FormError>,
    },
}

/// Receiver for completions (hold on the controller side).
pub type CompletionReceiver = mpsc::Receiver<Completion>;

/// Runs the generation call on a tokio task and reports the result on `tx`.
pub(crate) fn spawn_generation(
    service: Arc<dyn FormService>,
    request: SubmitRequest,
    tx: mpsc::Sender<Completion>,
) {
    tokio::spawn(async move {
        let result = service.generate_form(&request.description).await;
        let completion = Completion::Generated {
            ticket: request.ticket,
            result,
        };
        if tx.send(completion).await.is_err() {
            tracing::debug!(target: "formgen::controller", "generation finished after the controller went away");
        }
    });
}

/// Runs the connectivity probe on a tokio task and reports the result on `tx`.
pub(crate) fn spawn_probe(service: Arc<dyn FormService>, ticket: Ticket, tx: mpsc::Sender<Completion>) {
    tokio::spawn(async move {
        let result = service.ping().await;
        if tx.send(Completion::Probed { ticket, result }).await.is_err() {
            tracing::debug!(target: "formgen::controller", "probe finished after the controller went away");
        }
    });
}
