#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_precision_loss,      // Acceptable for millisecond timings
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. RecordError in record module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod adapter;
pub mod client;
pub mod filter;
pub mod record;
pub mod render;

// Re-export main types for easy access
pub use adapter::{Envelope, LogAdapter, LogBackend, TracingBackend};
pub use client::{LoggedClient, LoggedResponse, RAW_BODY};
pub use filter::{
    BodySchema, ContentTypeGate, Filter, FilterDecision, FilterError, FilterFn, HeaderRedact,
    JsonSchemaRedact, MessageBlacklist, QueryRedact, Scope, apply_filters,
};
pub use record::{ExchangeData, LogRecord, MultiValueMap, RecordError};
pub use render::JsonRenderer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
