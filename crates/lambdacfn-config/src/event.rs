use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The closed set of keys accepted under `eventSources`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventSourceKind {
  Schedule,
  CloudwatchEvent,
  Sns,
  Webhook,
}

impl EventSourceKind {
  pub const ALL: [EventSourceKind; 4] = [
    EventSourceKind::Schedule,
    EventSourceKind::CloudwatchEvent,
    EventSourceKind::Sns,
    EventSourceKind::Webhook,
  ];

  /// Look up the kind for an `eventSources` key.
  pub fn from_key(key: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.key() == key)
  }

  /// The `eventSources` key for this kind.
  pub fn key(self) -> &'static str {
    match self {
      EventSourceKind::Schedule => "schedule",
      EventSourceKind::CloudwatchEvent => "cloudwatchEvent",
      EventSourceKind::Sns => "sns",
      EventSourceKind::Webhook => "webhook",
    }
  }
}

impl std::fmt::Display for EventSourceKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.key())
  }
}

/// A scheduled trigger, e.g. `rate(5 minutes)` or `cron(0 12 * * ? *)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDef {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expression: Option<String>,
}

/// A trigger fired by events matching a pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudwatchEventDef {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub event_pattern: Option<Value>,
}

/// An HTTP endpoint in front of the function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDef {
  /// HTTP method, matched case-insensitively.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  /// Require an API key and expose the generated key as an output.
  #[serde(default)]
  pub api_key: bool,

  /// Overrides the default method responses. Must be an array.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method_responses: Option<Value>,

  /// Overrides the default integration responses. Must be an array.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub integration_responses: Option<Value>,

  /// Properties merged over the default Lambda integration.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub integration: Option<Map<String, Value>>,
}
