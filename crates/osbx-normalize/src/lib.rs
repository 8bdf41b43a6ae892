//! Post-export normalization of a service-bus configuration archive.
//!
//! The stages run one after the other over the whole tree:
//! extract → classify/rename → unwrap envelopes → relocate.
//!
//! - `registry.rs` - Resource-type token to file extension table
//! - `classify.rs` - Sentinel deletion and renaming
//! - `envelope/` - Recovery of literal payloads from markup envelopes
//! - `pipeline.rs` - One export run over all stages

pub mod classify;
pub mod envelope;
mod error;
pub mod pipeline;
pub mod registry;

pub use classify::{Classifier, FileOperationError, FileOutcome, ProcessingReport};
pub use envelope::{EnvelopeLocator, Step, UnwrapOutcome, Unwrapper};
pub use error::PipelineError;
pub use pipeline::{ExportJob, Pipeline, PipelineReport};
pub use registry::ExtensionRegistry;
