use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A caller-declared template parameter.
///
/// `Type` and `Description` are required by the builders; anything else
/// (`Default`, `AllowedValues`, `NoEcho`, ...) passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
  #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,

  #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ParameterDef {
  /// A `String` parameter with the given description.
  pub fn string(description: impl Into<String>) -> Self {
    Self {
      kind: Some("String".to_string()),
      description: Some(description.into()),
      extra: Map::new(),
    }
  }
}
