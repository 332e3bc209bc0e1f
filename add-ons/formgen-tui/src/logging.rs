//! Logging for the terminal client: a file sink (the terminal belongs to the UI)
//! plus a layer that mirrors each event into the activity pane.

use std::fs::File;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::field::Visit;
use tracing_subscriber::layer::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Captures the "message" field and the remaining fields of a tracing event.
#[derive(Default)]
struct MessageCollector {
    message: String,
    fields: String,
}

impl MessageCollector {
    fn line(&self) -> String {
        format!("{}{}", self.message, self.fields)
    }
}

impl Visit for MessageCollector {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push_str(&format!(" {}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push_str(&format!(" {}={:?}", field.name(), value));
        }
    }
}

/// Sends each formgen tracing event as a line to a broadcast channel.
#[derive(Clone)]
pub struct ActivityLayer {
    tx: broadcast::Sender<String>,
}

impl ActivityLayer {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { tx }
    }
}

impl<S> tracing_subscriber::Layer<S> for ActivityLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if !event.metadata().target().starts_with("formgen") {
            return;
        }
        let mut collector = MessageCollector::default();
        event.record(&mut collector);
        let line = format!("{} {}", event.metadata().level(), collector.line());
        let _ = self.tx.send(line);
    }
}

/// Installs the global subscriber: `RUST_LOG` filter (default `info`), fmt output to
/// `log_file`, and the activity layer.
pub fn init(log_file: File, activity: broadcast::Sender<String>) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(ActivityLayer::new(activity))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_layer_forwards_formgen_events_only() {
        let (tx, mut rx) = broadcast::channel(16);
        let subscriber = tracing_subscriber::registry().with(ActivityLayer::new(tx));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "formgen::controller", status = 400, "Form generation failed");
            tracing::info!(target: "hyper::proto", "connection closed");
        });
        assert_eq!(rx.try_recv().unwrap(), "INFO Form generation failed status=400");
        assert!(rx.try_recv().is_err());
    }
}
