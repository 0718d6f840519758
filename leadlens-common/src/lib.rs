//! Types and utilities shared across the leadlens crates.
//!
//! This crate holds the workspace error type and the logging initialiser.
//! Every other crate depends on it, so it stays small and free of browser or
//! HTTP dependencies.
//!
//! # Overview
//!
//! - [`LeadlensError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use leadlens_common::LeadlensError;
//!
//! let err = LeadlensError::UnknownTool("fetch_weather".to_string());
//! assert_eq!(
//!     err.to_string(),
//!     "Tool invocation error: unknown tool `fetch_weather`"
//! );
//! ```

pub mod observability;

/// Error types used across the leadlens workspace.
///
/// A selector that matches nothing is never an error: extraction leaves the
/// field unset instead.
#[derive(thiserror::Error, Debug)]
pub enum LeadlensError {
    /// Browser launch, navigation, or page capture failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] anyhow::Error),

    /// The model asked for a tool that was never offered to it.
    #[error("Tool invocation error: unknown tool `{0}`")]
    UnknownTool(String),

    /// The model called a known tool with unusable arguments.
    #[error("Tool invocation error: {0}")]
    ToolArguments(String),

    /// The chat backend was unreachable or answered with an error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// A configured CSS selector or pattern did not compile.
    #[error("Selector error: {0}")]
    Selector(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A page never went network-idle within the render plan's bound.
    #[error("Timed out after {after:?} waiting for {url} to go idle")]
    Timeout { url: String, after: std::time::Duration },
}

/// Convenient alias for results that use [`LeadlensError`].
pub type Result<T> = std::result::Result<T, LeadlensError>;
