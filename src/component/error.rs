//! Error types for widget operations

use thiserror::Error;

/// Errors that can occur while constructing or driving a widget
///
/// Everything here is scoped to a single instance; no failure in one widget
/// affects another. Validation failures are deliberately *not* errors —
/// they are widget-local state surfaced through `validation` events.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A selector resolved to nothing under the `Fail` policy
    #[error("element not found for selector `{0}`")]
    ElementNotFound(String),

    /// A configuration value was rejected at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
