//! # Error Types
//!
//! This module defines the error type for the fretmidi library.
//!
//! The rendering engine itself cannot fail: invalid musical content degrades
//! to a silent (but structurally valid) track, content-lookup misses produce
//! an empty output buffer, and bad parameter values fall back to their
//! defaults. Errors only occur at the request surface, where a caller asks
//! for something the library does not understand at all.
//!
//! ## Usage
//! ```rust
//! use fretmidi::{render, NoContent, RenderError, RenderRequest};
//!
//! let request = RenderRequest {
//!     kind: "harmonica".to_string(),
//!     ..RenderRequest::default()
//! };
//! match render(&request, &NoContent) {
//!     Err(RenderError::UnsupportedKind(kind)) => assert_eq!(kind, "harmonica"),
//!     other => panic!("expected an UnsupportedKind error, got {:?}", other),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The request named a render kind the library does not implement.
    ///
    /// # Example
    /// ```
    /// # use fretmidi::RenderError;
    /// let err = RenderError::UnsupportedKind("harmonica".to_string());
    /// assert_eq!(err.to_string(), "Unsupported render kind: harmonica");
    /// ```
    #[error("Unsupported render kind: {0}")]
    UnsupportedKind(String),

    /// A render kind was requested without a field it needs.
    ///
    /// # Example
    /// ```
    /// # use fretmidi::RenderError;
    /// let err = RenderError::MissingField { kind: "tuning", field: "pitch" };
    /// assert_eq!(err.to_string(), "Missing field for tuning request: pitch");
    /// ```
    #[error("Missing field for {kind} request: {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}
