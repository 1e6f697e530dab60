use serde::{Deserialize, Serialize};

/// The closed set of keys accepted under `destinations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
  Sns,
}

impl DestinationKind {
  pub fn from_key(key: &str) -> Option<Self> {
    match key {
      "sns" => Some(DestinationKind::Sns),
      _ => None,
    }
  }

  pub fn key(self) -> &'static str {
    match self {
      DestinationKind::Sns => "sns",
    }
  }
}

/// One named notification topic under `destinations.sns`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnsDestinationDef {
  /// Description of the generated email parameter.
  #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}
