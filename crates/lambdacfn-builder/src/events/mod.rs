//! Event source dispatch.
//!
//! Exactly one event-wiring builder runs per function. The kind is chosen by
//! the single key under `eventSources`; with no event sources the function is
//! triggered through an SNS topic.

mod cloudwatch;
mod sns;
mod webhook;

use lambdacfn_config::{
  CloudwatchEventDef, EventSourceKind, FunctionDef, ScheduleDef, WebhookDef,
};
use lambdacfn_template::Fragment;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::BuildContext;
use crate::error::BuildError;

pub use cloudwatch::{build_pattern_event, build_schedule_event};
pub use sns::build_sns_event;
pub use webhook::{HTTP_METHODS, build_webhook_event};

/// A parsed event source.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSource {
  Schedule(ScheduleDef),
  CloudwatchEvent(CloudwatchEventDef),
  Sns,
  Webhook(WebhookDef),
}

impl EventSource {
  /// Select the event source declared by a function definition.
  ///
  /// Every key must be a known kind, and at most one kind may be declared.
  pub fn from_def(def: &FunctionDef) -> Result<Self, BuildError> {
    let Some(sources) = def.event_sources.as_ref().filter(|s| !s.is_empty()) else {
      return Ok(EventSource::Sns);
    };

    let mut declared = Vec::with_capacity(sources.len());
    for (key, body) in sources {
      let kind = EventSourceKind::from_key(key).ok_or_else(|| BuildError::UnknownEventSource {
        key: key.clone(),
      })?;
      declared.push((kind, body));
    }

    if declared.len() > 1 {
      return Err(BuildError::MultipleEventSources {
        kinds: declared.iter().map(|(kind, _)| kind.key().to_string()).collect(),
      });
    }
    let (kind, body) = declared[0];

    Ok(match kind {
      EventSourceKind::Schedule => EventSource::Schedule(parse_body(kind, body)?),
      EventSourceKind::CloudwatchEvent => EventSource::CloudwatchEvent(parse_body(kind, body)?),
      EventSourceKind::Sns => EventSource::Sns,
      EventSourceKind::Webhook => EventSource::Webhook(parse_body(kind, body)?),
    })
  }

  pub fn kind(&self) -> EventSourceKind {
    match self {
      EventSource::Schedule(_) => EventSourceKind::Schedule,
      EventSource::CloudwatchEvent(_) => EventSourceKind::CloudwatchEvent,
      EventSource::Sns => EventSourceKind::Sns,
      EventSource::Webhook(_) => EventSourceKind::Webhook,
    }
  }
}

/// Build the event wiring fragment for a function.
pub fn build_event_source(def: &FunctionDef, ctx: &BuildContext) -> Result<Fragment, BuildError> {
  match EventSource::from_def(def)? {
    EventSource::Schedule(schedule) => build_schedule_event(def, &schedule),
    EventSource::CloudwatchEvent(event) => build_pattern_event(def, &event),
    EventSource::Sns => Ok(build_sns_event(def)),
    EventSource::Webhook(webhook) => build_webhook_event(def, &webhook, ctx),
  }
}

fn parse_body<T>(kind: EventSourceKind, body: &Value) -> Result<T, BuildError>
where
  T: DeserializeOwned + Default,
{
  if body.is_null() {
    return Ok(T::default());
  }
  serde_json::from_value(body.clone()).map_err(|e| BuildError::InvalidEventSource {
    kind,
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn def(sources: Value) -> FunctionDef {
    serde_json::from_value(json!({ "name": "test", "eventSources": sources })).unwrap()
  }

  #[test]
  fn test_defaults_to_sns() {
    assert_eq!(EventSource::from_def(&FunctionDef::new("test")).unwrap(), EventSource::Sns);
    assert_eq!(EventSource::from_def(&def(json!({}))).unwrap(), EventSource::Sns);
  }

  #[test]
  fn test_selects_declared_kind() {
    let schedule = json!({ "schedule": { "expression": "rate(1 hour)" } });
    let source = EventSource::from_def(&def(schedule)).unwrap();
    assert_eq!(source.kind(), EventSourceKind::Schedule);

    let source = EventSource::from_def(&def(json!({ "webhook": { "method": "GET" } }))).unwrap();
    assert_eq!(source.kind(), EventSourceKind::Webhook);
  }

  #[test]
  fn test_unknown_key() {
    let result = EventSource::from_def(&def(json!({ "bad": {} })));
    assert!(matches!(result, Err(BuildError::UnknownEventSource { key }) if key == "bad"));
  }

  #[test]
  fn test_unknown_key_reported_before_multiple() {
    let result = EventSource::from_def(&def(json!({ "sns": {}, "bad": {} })));
    assert!(matches!(result, Err(BuildError::UnknownEventSource { .. })));
  }

  #[test]
  fn test_multiple_kinds_rejected() {
    let result = EventSource::from_def(&def(json!({
      "sns": {},
      "schedule": { "expression": "rate(5 minutes)" }
    })));
    match result {
      Err(BuildError::MultipleEventSources { kinds }) => {
        assert_eq!(kinds, vec!["sns".to_string(), "schedule".to_string()]);
      }
      other => panic!("expected multiple event sources, got {other:?}"),
    }
  }

  #[test]
  fn test_malformed_body() {
    let result = EventSource::from_def(&def(json!({ "schedule": { "expression": 5 } })));
    assert!(matches!(
      result,
      Err(BuildError::InvalidEventSource { kind: EventSourceKind::Schedule, .. })
    ));
  }
}
