//! Explicit inputs the builders would otherwise take from the environment.

use std::path::Path;

/// Settings shared by every builder for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
  /// Directory of the function's entry point, relative to the code bundle.
  pub handler_dir: String,

  /// Suffix for the webhook deployment resource. A fresh value per build
  /// lets a new deployment land on an existing stage.
  pub deployment_nonce: String,
}

impl BuildContext {
  pub fn new(handler_dir: impl Into<String>) -> Self {
    Self {
      handler_dir: handler_dir.into(),
      deployment_nonce: String::new(),
    }
  }

  pub fn with_deployment_nonce(mut self, nonce: impl Into<String>) -> Self {
    self.deployment_nonce = nonce.into();
    self
  }

  /// Handler string for the function resource: `<handler_dir>/function.fn`.
  pub fn handler(&self) -> String {
    if self.handler_dir.is_empty() {
      "function.fn".to_string()
    } else {
      format!("{}/function.fn", self.handler_dir)
    }
  }
}

/// Name of the directory holding the given entry file.
///
/// `functions/myFunction/function.js` -> `myFunction`
pub fn handler_dir_from_path(path: &Path) -> Option<String> {
  path
    .parent()?
    .file_name()?
    .to_str()
    .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_handler_dir_from_path() {
    assert_eq!(
      handler_dir_from_path(Path::new("/repo/functions/myFunction/function.js")).as_deref(),
      Some("myFunction")
    );
    assert_eq!(handler_dir_from_path(Path::new("function.js")), None);
  }

  #[test]
  fn test_handler() {
    assert_eq!(BuildContext::new("test").handler(), "test/function.fn");
    assert_eq!(BuildContext::default().handler(), "function.fn");
  }
}
