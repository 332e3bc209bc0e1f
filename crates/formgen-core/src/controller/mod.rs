//! Form state controller: the single owner of the description, the active
//! bundle, the form data and the notices.
//!
//! Network operations are split in two halves. `begin_*` admits the operation
//! (enforcing one in flight per kind) and hands out a [`Ticket`]; `complete_*`
//! applies the settled result if the ticket is still the one being waited for.
//! The `async` wrappers run both halves inline; the `spawn_*` variants run the
//! call on a tokio task and deliver a [`Completion`] over a channel.

mod task;

pub use task::{Completion, CompletionReceiver, Operation, SubmitRequest, Ticket};

use crate::bundle::SchemaBundle;
use crate::data::FormData;
use crate::error::FormError;
use crate::notify::{NoticeKind, Notices, Outcome};
use crate::service::FormService;
use crate::view::{FormRenderer, FormView};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const GENERATED_MESSAGE: &str = "Form generated successfully";
pub const CONNECTED_MESSAGE: &str = "Connected to server successfully";

/// Submission state. The connectivity probe never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    NotStarted,
    Pending(Ticket),
    Done,
}

pub struct FormController {
    service: Arc<dyn FormService>,
    description: String,
    bundle: Option<SchemaBundle>,
    form_data: FormData,
    notices: Notices,
    phase: Phase,
    in_flight: Option<Ticket>,
    probe: ProbeState,
    next_seq: u64,
}

impl FormController {
    pub fn new(service: Arc<dyn FormService>, notice_ttl: Duration) -> Self {
        Self {
            service,
            description: String::new(),
            bundle: None,
            form_data: FormData::new(),
            notices: Notices::new(notice_ttl),
            phase: Phase::Idle,
            in_flight: None,
            probe: ProbeState::NotStarted,
            next_seq: 0,
        }
    }

    fn ticket(&mut self, operation: Operation) -> Ticket {
        self.next_seq += 1;
        Ticket {
            operation,
            seq: self.next_seq,
        }
    }

    /// Sets the description the next submission will send. No network effect.
    pub fn select_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
        tracing::debug!(target: "formgen::controller", description = %self.description, "Description selected");
    }

    /// Admits a generation request. Returns `None` while another one is in flight.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.phase == Phase::Submitting {
            tracing::debug!(target: "formgen::controller", "Submit ignored: generation already in flight");
            return None;
        }
        let ticket = self.ticket(Operation::Generate);
        self.in_flight = Some(ticket);
        self.phase = Phase::Submitting;
        self.notices.clear();
        tracing::info!(target: "formgen::controller", description = %self.description, "Requesting form generation");
        Some(SubmitRequest {
            ticket,
            description: self.description.clone(),
        })
    }

    /// Applies a settled generation. Returns `false` for a result nobody is waiting for.
    ///
    /// A failure leaves the active bundle and form data exactly as they were.
    pub fn complete_submit(&mut self, ticket: Ticket, result: Result<SchemaBundle, FormError>) -> bool {
        if self.in_flight != Some(ticket) {
            tracing::warn!(target: "formgen::controller", ?ticket, "Dropping stale generation result");
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(bundle) => {
                self.bundle = Some(bundle);
                self.form_data = FormData::new();
                self.notices.raise(NoticeKind::Success, GENERATED_MESSAGE);
                self.phase = Phase::Ready;
                tracing::info!(target: "formgen::controller", "Form generated");
            }
            Err(e) => {
                tracing::warn!(target: "formgen::controller", error = %e, "Form generation failed");
                self.notices.raise(NoticeKind::Error, e.message());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Submits the selected description and waits for the result.
    /// Returns `false` when the submission was rejected or its result was stale.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let result = self.service.generate_form(&request.description).await;
        self.complete_submit(request.ticket, result)
    }

    /// Submits on a background task; the result arrives on `tx` as a [`Completion`].
    pub fn spawn_submit(&mut self, tx: mpsc::Sender<Completion>) -> bool {
        match self.begin_submit() {
            Some(request) => {
                task::spawn_generation(Arc::clone(&self.service), request, tx);
                true
            }
            None => false,
        }
    }

    /// Replaces the whole form data with what the renderer reported.
    /// Ignored while no bundle is active; the data stays empty then.
    pub fn on_form_data_change(&mut self, data: FormData) {
        if self.bundle.is_none() {
            tracing::debug!(target: "formgen::controller", "Form data change without an active form; discarded");
            self.form_data = FormData::new();
            return;
        }
        self.form_data = data;
    }

    /// Admits the connectivity probe. Only the first call in the controller's lifetime succeeds.
    pub fn begin_probe(&mut self) -> Option<Ticket> {
        if self.probe != ProbeState::NotStarted {
            return None;
        }
        let ticket = self.ticket(Operation::Probe);
        self.probe = ProbeState::Pending(ticket);
        Some(ticket)
    }

    pub fn complete_probe(&mut self, ticket: Ticket, result: Result<(), FormError>) -> bool {
        if self.probe != ProbeState::Pending(ticket) {
            return false;
        }
        self.probe = ProbeState::Done;
        match result {
            Ok(()) => {
                tracing::info!(target: "formgen::controller", "Generation service reachable");
                self.notices.raise(NoticeKind::Success, CONNECTED_MESSAGE);
            }
            Err(e) => {
                tracing::warn!(target: "formgen::controller", error = %e, "Generation service unreachable");
                self.notices.raise(
                    NoticeKind::Error,
                    format!("Error connecting to server: {}", e.message()),
                );
            }
        }
        true
    }

    /// Runs the startup connectivity probe inline.
    pub async fn probe_connectivity(&mut self) -> bool {
        let Some(ticket) = self.begin_probe() else {
            return false;
        };
        let result = self.service.ping().await;
        self.complete_probe(ticket, result)
    }

    pub fn spawn_probe(&mut self, tx: mpsc::Sender<Completion>) -> bool {
        match self.begin_probe() {
            Some(ticket) => {
                task::spawn_probe(Arc::clone(&self.service), ticket, tx);
                true
            }
            None => false,
        }
    }

    /// Applies a completion delivered by a spawned operation.
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Generated { ticket, result } => self.complete_submit(ticket, result),
            Completion::Probed { ticket, result } => self.complete_probe(ticket, result),
        }
    }

    /// Laid-out form for the active bundle and data (empty with no bundle).
    pub fn view(&self) -> FormView<'_> {
        FormView::build(self.bundle.as_ref(), &self.form_data)
    }

    /// Runs one render pass and applies every data replacement the renderer emitted, in order.
    pub fn render_with<R: FormRenderer>(&mut self, renderer: &mut R) -> R::Ui {
        let mut emitted = Vec::new();
        let ui = {
            let view = FormView::build(self.bundle.as_ref(), &self.form_data);
            renderer.render(&view, &mut |data: FormData| emitted.push(data))
        };
        for data in emitted {
            self.on_form_data_change(data);
        }
        ui
    }

    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.notices.dismiss(kind)
    }

    pub fn expire_notices(&mut self, now: Instant) -> Vec<NoticeKind> {
        self.notices.expire(now)
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.notices.next_expiry()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn bundle(&self) -> Option<&SchemaBundle> {
        self.bundle.as_ref()
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn outcome(&self) -> Outcome {
        self.notices.outcome()
    }
}
