use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parameter::ParameterDef;

/// Definition of a single serverless function.
///
/// `event_sources` and `destinations` are kept as raw maps: their keys are
/// checked against [`EventSourceKind`](crate::EventSourceKind) and
/// [`DestinationKind`](crate::DestinationKind) by the builders so an unknown
/// key can be reported by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
  /// Logical resource name of the function; root of every generated name.
  #[serde(default)]
  pub name: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub parameters: Option<BTreeMap<String, ParameterDef>>,

  /// Extra IAM policy statements granted to the execution role.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub statements: Option<Vec<Value>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub event_sources: Option<Map<String, Value>>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub destinations: Option<Map<String, Value>>,

  /// Seconds.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timeout: Option<i64>,

  /// Megabytes.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub memory_size: Option<i64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub runtime: Option<String>,

  /// Threshold for the default service alarms.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub threshold: Option<i64>,
}

impl FunctionDef {
  /// A definition with only a name; every other field takes its default.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  /// Whether `eventSources` declares the given key.
  pub fn has_event_source(&self, key: &str) -> bool {
    self
      .event_sources
      .as_ref()
      .is_some_and(|sources| sources.contains_key(key))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::EventSourceKind;
  use serde_json::json;

  #[test]
  fn test_deserialize_camel_case_fields() {
    let def: FunctionDef = serde_json::from_value(json!({
      "name": "test",
      "memorySize": 512,
      "timeout": 30,
      "eventSources": { "schedule": { "expression": "rate(5 minutes)" } },
      "parameters": {
        "token": { "Type": "String", "Description": "api token", "NoEcho": true }
      }
    }))
    .unwrap();

    assert_eq!(def.name, "test");
    assert_eq!(def.memory_size, Some(512));
    assert_eq!(def.timeout, Some(30));
    assert!(def.has_event_source("schedule"));
    assert!(!def.has_event_source("webhook"));

    let token = &def.parameters.as_ref().unwrap()["token"];
    assert_eq!(token.kind.as_deref(), Some("String"));
    assert_eq!(token.extra["NoEcho"], json!(true));
  }

  #[test]
  fn test_missing_name_defaults_to_empty() {
    let def: FunctionDef = serde_json::from_value(json!({})).unwrap();
    assert!(def.name.is_empty());
  }

  #[test]
  fn test_event_source_keys() {
    for kind in EventSourceKind::ALL {
      assert_eq!(EventSourceKind::from_key(kind.key()), Some(kind));
    }
    assert_eq!(EventSourceKind::from_key("cloudwatch"), None);
  }

  #[test]
  fn test_parameter_roundtrip_keeps_extra_fields() {
    let value = json!({ "Type": "Number", "Description": "count", "Default": 3 });
    let param: ParameterDef = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(serde_json::to_value(&param).unwrap(), value);
  }
}
