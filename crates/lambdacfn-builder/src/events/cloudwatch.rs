use lambdacfn_config::{CloudwatchEventDef, FunctionDef, ScheduleDef};
use lambdacfn_template::intrinsic::get_att;
use lambdacfn_template::{Fragment, PRIMARY_ROLE, Section};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::BuildError;

/// A rule firing on a schedule expression.
pub fn build_schedule_event(
  def: &FunctionDef,
  schedule: &ScheduleDef,
) -> Result<Fragment, BuildError> {
  let expression = schedule
    .expression
    .as_deref()
    .filter(|e| !e.trim().is_empty())
    .ok_or(BuildError::MissingExpression)?;

  Ok(event_rule(def, "Schedule", "ScheduleExpression", json!(expression)))
}

/// A rule firing on events matching a pattern.
pub fn build_pattern_event(
  def: &FunctionDef,
  event: &CloudwatchEventDef,
) -> Result<Fragment, BuildError> {
  let pattern = match &event.event_pattern {
    Some(Value::Object(pattern)) if !pattern.is_empty() => Value::Object(pattern.clone()),
    _ => return Err(BuildError::MissingEventPattern),
  };

  Ok(event_rule(def, "CloudwatchEvent", "EventPattern", pattern))
}

fn event_rule(def: &FunctionDef, suffix: &str, trigger_property: &str, trigger: Value) -> Fragment {
  let event_name = format!("{}{suffix}", def.name);
  let rule_name = format!("{event_name}Rule");

  let mut properties = json!({
    "RoleArn": get_att(PRIMARY_ROLE, "Arn"),
    "State": "ENABLED",
    "Targets": [{ "Arn": get_att(&def.name, "Arn"), "Id": def.name }],
  });
  properties[trigger_property] = trigger;

  let fragment = Fragment::new()
    .with(
      Section::Resources,
      format!("{event_name}Permission"),
      json!({
        "Type": "AWS::Lambda::Permission",
        "Properties": {
          "FunctionName": get_att(&def.name, "Arn"),
          "Action": "lambda:InvokeFunction",
          "Principal": "events.amazonaws.com",
          "SourceArn": get_att(&rule_name, "Arn"),
        }
      }),
    )
    .with(
      Section::Resources,
      rule_name.clone(),
      json!({ "Type": "AWS::Events::Rule", "Properties": properties }),
    );

  debug!(function = %def.name, rule = %rule_name, "event rule built");
  fragment
}
