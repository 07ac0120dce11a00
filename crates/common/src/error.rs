//! Error types for the floating ad service.
//!
//! Errors only surface from the ambient layers (settings loading, settings
//! stores, page rewriting). The display pipeline itself never fails: invalid
//! configuration falls back to defaults and missing content renders nothing.

use derive_more::{Display, Error};

/// Errors raised while loading configuration, talking to a settings store or
/// rewriting HTML.
#[derive(Debug, Display, Error)]
pub enum FloatAdError {
    /// Service configuration could not be loaded or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// A settings store could not be read or written.
    #[display("Settings store error: {message}")]
    Store { message: String },

    /// A handlebars template failed to render.
    #[display("Template error: {message}")]
    Template { message: String },

    /// HTML rewriting failed.
    #[display("HTML rewrite error: {message}")]
    Html { message: String },

    /// Rewritten output was not valid UTF-8.
    #[display("Invalid UTF-8: {message}")]
    InvalidUtf8 { message: String },
}
