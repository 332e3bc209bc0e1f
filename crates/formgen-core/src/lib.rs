//! formgen-core: schema bundle model, layout resolution, notices and the form state controller.
//!
//! Everything here is independent of the transport and of the concrete renderer;
//! `formgen-client` provides the HTTP [`FormService`] and the terminal add-on
//! provides a [`FormRenderer`].

mod bundle;
mod controller;
mod data;
mod error;
mod layout;
mod notify;
mod schema;
mod service;
mod shared;
mod view;

pub use bundle::SchemaBundle;
pub use controller::{
    Completion, CompletionReceiver, FormController, Operation, Phase, SubmitRequest, Ticket,
    CONNECTED_MESSAGE, GENERATED_MESSAGE,
};
pub use data::{FieldPath, FormData, PathSegment};
pub use error::FormError;
pub use layout::{ControlLabel, LayoutElement, LayoutIssue};
pub use notify::{Notice, NoticeKind, Notices, Outcome};
pub use schema::{humanize, validate, EnumOption, FieldKind, FieldNode, ValidationIssue};
pub use service::FormService;
pub use shared::{Category, ClientConfig, DEFAULT_NOTICE_TTL_SECS};
pub use view::{ControlKind, ControlView, FormRenderer, FormView, ViewNode};
