use crate::bundle::SchemaBundle;
use crate::error::FormError;

/// The remote form generation service, as seen by the controller.
#[async_trait::async_trait]
pub trait FormService: Send + Sync {
    /// Asks the service to synthesize a form for `description`. The description is
    /// forwarded verbatim, empty or not. Results need not be deterministic.
    async fn generate_form(&self, description: &str) -> Result<SchemaBundle, FormError>;

    /// Reachability check; any success status counts.
    async fn ping(&self) -> Result<(), FormError>;
}
