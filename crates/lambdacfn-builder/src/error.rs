//! Build error types.

use lambdacfn_config::EventSourceKind;
use lambdacfn_template::ComposeError;

/// Errors that can occur while building a function template.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
  /// The definition has no function name.
  #[error("function name is required")]
  MissingFunctionName,

  /// Parameter names must match `^[A-Za-z0-9]+$`.
  #[error("parameter names must be alphanumeric: {name}")]
  InvalidParameterName { name: String },

  #[error("parameter '{name}' must contain Type property")]
  MissingType { name: String },

  #[error("parameter '{name}' must contain Description property")]
  MissingDescription { name: String },

  /// A caller-supplied policy statement is incomplete.
  #[error("invalid policy statement at index {index}: {reason}")]
  InvalidStatement { index: usize, reason: String },

  #[error("invalid function runtime: {runtime}")]
  InvalidRuntime { runtime: String },

  #[error("unknown event source specified: {key}")]
  UnknownEventSource { key: String },

  /// More than one event source kind was declared for a single function.
  #[error("only one event source may be specified, found: {}", kinds.join(", "))]
  MultipleEventSources { kinds: Vec<String> },

  /// A recognized event source whose body has the wrong shape.
  #[error("invalid {kind} event source: {message}")]
  InvalidEventSource {
    kind: EventSourceKind,
    message: String,
  },

  #[error("unknown destination specified: {key}")]
  UnknownDestination { key: String },

  /// A recognized destination whose body has the wrong shape.
  #[error("invalid {kind} destination: {message}")]
  InvalidDestination { kind: &'static str, message: String },

  #[error("scheduled function expression cannot be undefined")]
  MissingExpression,

  #[error("eventPattern required for cloudwatch event")]
  MissingEventPattern,

  #[error("webhook function method not found")]
  MissingHttpMethod,

  #[error("invalid client HTTP method specified: {method}")]
  InvalidHttpMethod { method: String },

  /// `methodResponses` or `integrationResponses` is not an array.
  #[error("webhook {field} is not an array")]
  InvalidWebhookResponses { field: &'static str },

  #[error(transparent)]
  Compose(#[from] ComposeError),
}
