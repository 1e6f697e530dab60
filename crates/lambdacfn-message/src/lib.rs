//! Lambdacfn Message
//!
//! Functions built by lambdacfn report findings by publishing to a topic.
//! This crate turns a [`Message`] into the [`PublishRequest`] to send. The
//! topic is picked in order of precedence:
//!
//! 1. The dispatch topic, when one is configured
//! 2. The topic named by the message
//! 3. The service alarm topic
//!
//! Sending the request is left to the caller.

mod error;

pub use error::MessageError;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Environment variable carrying the dispatch topic ARN.
pub const DISPATCH_TOPIC_VAR: &str = "DispatchServiceSnsArn";

/// Environment variable carrying the service alarm topic ARN.
pub const SERVICE_ALARM_TOPIC_VAR: &str = "ServiceAlarmSNSTopic";

/// Topics available to a running function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub dispatch_topic_arn: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub service_alarm_topic_arn: Option<String>,
}

impl MessageConfig {
  /// Read the topics from a variable lookup, e.g. `|name| std::env::var(name).ok()`.
  ///
  /// Empty values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
    Self {
      dispatch_topic_arn: non_empty(DISPATCH_TOPIC_VAR),
      service_alarm_topic_arn: non_empty(SERVICE_ALARM_TOPIC_VAR),
    }
  }
}

/// A notification from a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub subject: String,
  pub summary: String,
  /// The event that triggered the notification, attached as pretty JSON.
  #[serde(default)]
  pub event: Value,
  /// Topic to publish to when no dispatch topic is configured.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topic: Option<String>,
}

/// A ready-to-send topic publish request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishRequest {
  pub subject: String,
  pub message: String,
  pub topic_arn: String,
}

impl Message {
  /// Resolve the target topic and render the message body.
  pub fn to_publish_request(&self, config: &MessageConfig) -> Result<PublishRequest, MessageError> {
    let topic_arn = config
      .dispatch_topic_arn
      .as_deref()
      .filter(|t| !t.is_empty())
      .or(self.topic.as_deref().filter(|t| !t.is_empty()))
      .or(config.service_alarm_topic_arn.as_deref())
      .ok_or(MessageError::NoTopic)?
      .to_string();

    let event = serde_json::to_string_pretty(&self.event)?;
    debug!(subject = %self.subject, topic = %topic_arn, "publish request built");

    Ok(PublishRequest {
      subject: self.subject.clone(),
      message: format!("{}\n\n{}", self.summary, event),
      topic_arn,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn message(topic: Option<&str>) -> Message {
    Message {
      subject: "Policy changed".to_string(),
      summary: "A role policy was edited".to_string(),
      event: json!({ "detail": { "eventName": "PutRolePolicy" } }),
      topic: topic.map(ToString::to_string),
    }
  }

  fn config(dispatch: Option<&str>, alarm: Option<&str>) -> MessageConfig {
    MessageConfig {
      dispatch_topic_arn: dispatch.map(ToString::to_string),
      service_alarm_topic_arn: alarm.map(ToString::to_string),
    }
  }

  #[test]
  fn test_body_format() {
    let request = message(Some("arn:topic"))
      .to_publish_request(&MessageConfig::default())
      .unwrap();

    assert_eq!(request.subject, "Policy changed");
    assert_eq!(
      request.message,
      "A role policy was edited\n\n{\n  \"detail\": {\n    \"eventName\": \"PutRolePolicy\"\n  }\n}"
    );
  }

  #[test]
  fn test_topic_precedence() {
    let request = message(Some("arn:message"))
      .to_publish_request(&config(Some("arn:dispatch"), Some("arn:alarm")))
      .unwrap();
    assert_eq!(request.topic_arn, "arn:dispatch");

    let request = message(Some("arn:message"))
      .to_publish_request(&config(None, Some("arn:alarm")))
      .unwrap();
    assert_eq!(request.topic_arn, "arn:message");

    let request = message(None)
      .to_publish_request(&config(None, Some("arn:alarm")))
      .unwrap();
    assert_eq!(request.topic_arn, "arn:alarm");
  }

  #[test]
  fn test_no_topic() {
    assert!(matches!(
      message(None).to_publish_request(&MessageConfig::default()),
      Err(MessageError::NoTopic)
    ));
  }

  #[test]
  fn test_config_from_lookup() {
    let config = MessageConfig::from_lookup(|name| match name {
      DISPATCH_TOPIC_VAR => Some(String::new()),
      SERVICE_ALARM_TOPIC_VAR => Some("arn:alarm".to_string()),
      _ => None,
    });
    assert_eq!(config.dispatch_topic_arn, None);
    assert_eq!(config.service_alarm_topic_arn.as_deref(), Some("arn:alarm"));
  }

  #[test]
  fn test_request_serializes_pascal_case() {
    let request = message(Some("arn:topic"))
      .to_publish_request(&MessageConfig::default())
      .unwrap();
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["TopicArn"], "arn:topic");
    assert!(value.get("Subject").is_some());
  }
}
