//! Default service alarms and the shared alarm topic.

use lambdacfn_config::FunctionDef;
use lambdacfn_template::intrinsic::{join_with, reference, stack_name};
use lambdacfn_template::{Fragment, Section};
use serde_json::{Value, json};
use tracing::debug;

use crate::parameters::string_parameter;

/// Topic every alarm notifies.
pub const ALARM_TOPIC: &str = "ServiceAlarmSNSTopic";
pub const ALARM_EMAIL_PARAMETER: &str = "ServiceAlarmEmail";
pub const MAX_THRESHOLD: i64 = 25;

pub(crate) const ALARM_DOCS: &str = "https://github.com/mapbox/lambda-cfn/blob/master/alarms.md#";

struct DefaultAlarm {
  name: &'static str,
  metric: &'static str,
  comparison: &'static str,
}

const DEFAULT_ALARMS: [DefaultAlarm; 2] = [
  DefaultAlarm {
    name: "Errors",
    metric: "Errors",
    comparison: "GreaterThanThreshold",
  },
  DefaultAlarm {
    name: "NoInvocations",
    metric: "Invocations",
    comparison: "LessThanThreshold",
  },
];

/// Build the error and no-invocation alarms, the alarm topic with its email
/// parameter, and expose the topic to the function environment.
pub fn build_service_alarms(def: &FunctionDef) -> Fragment {
  let threshold = normalize_threshold(def.threshold);
  let mut fragment = Fragment::new();

  for alarm in &DEFAULT_ALARMS {
    fragment.insert(
      Section::Resources,
      format!("{}Alarm{}", def.name, alarm.name),
      json!({
        "Type": "AWS::CloudWatch::Alarm",
        "Properties": {
          "EvaluationPeriods": "5",
          "Statistic": "Sum",
          "Threshold": threshold.to_string(),
          "AlarmDescription": format!("{ALARM_DOCS}{}", alarm.name),
          "Period": "60",
          "AlarmActions": [reference(ALARM_TOPIC)],
          "Namespace": "AWS/Lambda",
          "Dimensions": [{ "Name": "FunctionName", "Value": reference(&def.name) }],
          "ComparisonOperator": alarm.comparison,
          "MetricName": alarm.metric,
        }
      }),
    );
  }

  fragment
    .insert(
      Section::Parameters,
      ALARM_EMAIL_PARAMETER,
      string_parameter("Service alarm notifications will send to this email address"),
    )
    .insert(
      Section::Resources,
      ALARM_TOPIC,
      email_topic(json!("ServiceAlarm"), ALARM_EMAIL_PARAMETER),
    )
    .insert(Section::Variables, ALARM_TOPIC, reference(ALARM_TOPIC));

  debug!(function = %def.name, threshold, "service alarms built");
  fragment
}

/// An SNS topic named `<stack>-<suffix>` with one email subscription.
pub(crate) fn email_topic(suffix: Value, email_parameter: &str) -> Value {
  json!({
    "Type": "AWS::SNS::Topic",
    "Properties": {
      "TopicName": join_with("-", vec![stack_name(), suffix]),
      "Subscription": [{ "Endpoint": reference(email_parameter), "Protocol": "email" }]
    }
  })
}

/// Absent or negative thresholds fall back to 0; above 25 clamps to 25.
pub fn normalize_threshold(threshold: Option<i64>) -> i64 {
  threshold.unwrap_or(0).clamp(0, MAX_THRESHOLD)
}
