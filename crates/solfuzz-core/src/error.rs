//! Core error types for solfuzz-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the type data model.

use thiserror::Error;

/// Core errors produced by the solfuzz-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A canonical type string did not name any elementary type.
    #[error("unknown type: '{name}'")]
    UnknownType { name: String },
}
