use thiserror::Error;

use crate::fragment::Section;

/// Errors that can occur while composing or linking templates.
#[derive(Debug, Error)]
pub enum ComposeError {
  /// The same key was declared in two fragments with different values.
  #[error("{section} name used more than once: {key}")]
  DuplicateKeyConflict { section: Section, key: String },

  /// The merged template declares more parameters than the platform allows.
  #[error("more than {limit} parameters specified: {count}")]
  TooManyParameters { count: usize, limit: usize },

  /// A resource the engine writes into is missing from the merge.
  #[error("resource not found: {name}")]
  MissingResource { name: String },

  /// A resource the engine writes into does not have the expected shape.
  #[error("malformed resource '{name}': {message}")]
  MalformedResource { name: String, message: String },
}
