//! Execution roles.

use lambdacfn_config::{EventSourceKind, FunctionDef};
use lambdacfn_template::intrinsic::{account_id, join, reference};
use lambdacfn_template::{Fragment, PRIMARY_ROLE, Section};
use serde_json::{Value, json};
use tracing::debug;

use crate::alarms::ALARM_TOPIC;
use crate::error::BuildError;

/// Build the primary execution role.
pub fn build_role(def: &FunctionDef) -> Result<Fragment, BuildError> {
  let role = execution_role(def)?;
  debug!(function = %def.name, role = PRIMARY_ROLE, "execution role built");
  Ok(Fragment::new().with(Section::Resources, PRIMARY_ROLE, role))
}

/// The role resource shared by both execution roles: trust for the compute
/// and event services (plus the API gateway for webhooks), the basic policy,
/// and the caller's statements as a policy named after the function.
pub(crate) fn execution_role(def: &FunctionDef) -> Result<Value, BuildError> {
  let mut trusted = vec![
    trust_statement("lambda.amazonaws.com"),
    trust_statement("events.amazonaws.com"),
  ];
  if def.has_event_source(EventSourceKind::Webhook.key()) {
    trusted.push(trust_statement("apigateway.amazonaws.com"));
  }

  let mut policies = vec![json!({
    "PolicyName": "basic",
    "PolicyDocument": {
      "Statement": [
        {
          "Effect": "Allow",
          "Action": ["logs:*"],
          "Resource": join(vec![json!("arn:aws:logs:*:"), account_id(), json!(":*")]),
        },
        {
          "Effect": "Allow",
          "Action": ["sns:Publish"],
          "Resource": reference(ALARM_TOPIC),
        },
        {
          "Effect": "Allow",
          "Action": ["iam:SimulateCustomPolicy"],
          "Resource": "*",
        }
      ]
    }
  })];

  if let Some(statements) = &def.statements {
    for (index, statement) in statements.iter().enumerate() {
      validate_statement(index, statement)?;
    }
    policies.push(json!({
      "PolicyName": def.name,
      "PolicyDocument": { "Statement": statements }
    }));
  }

  Ok(json!({
    "Type": "AWS::IAM::Role",
    "Properties": {
      "AssumeRolePolicyDocument": { "Statement": trusted },
      "Path": "/",
      "Policies": policies,
    }
  }))
}

fn trust_statement(service: &str) -> Value {
  json!({
    "Sid": "",
    "Effect": "Allow",
    "Principal": { "Service": service },
    "Action": "sts:AssumeRole"
  })
}

/// Each statement needs `Effect`, one of `Action`/`NotAction` and one of
/// `Resource`/`NotResource`.
fn validate_statement(index: usize, statement: &Value) -> Result<(), BuildError> {
  let invalid = |reason: &str| BuildError::InvalidStatement {
    index,
    reason: reason.to_string(),
  };

  let statement = statement
    .as_object()
    .ok_or_else(|| invalid("statement must be an object"))?;
  let has = |key: &str| {
    statement
      .get(key)
      .is_some_and(|v| !v.is_null() && v != &json!(""))
  };

  if !has("Effect") {
    return Err(invalid("statement must contain Effect"));
  }
  if !has("Resource") && !has("NotResource") {
    return Err(invalid("statement must contain Resource or NotResource"));
  }
  if !has("Action") && !has("NotAction") {
    return Err(invalid("statement must contain Action or NotAction"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn with_statements(statements: Vec<Value>) -> FunctionDef {
    FunctionDef {
      statements: Some(statements),
      ..FunctionDef::new("myLambda")
    }
  }

  fn reason(result: Result<Fragment, BuildError>) -> String {
    match result {
      Err(BuildError::InvalidStatement { reason, .. }) => reason,
      other => panic!("expected invalid statement, got {other:?}"),
    }
  }

  #[test]
  fn test_statement_validation() {
    assert!(reason(build_role(&with_statements(vec![json!({})]))).contains("Effect"));
    assert!(
      reason(build_role(&with_statements(vec![json!({ "Effect": "test" })])))
        .contains("Resource or NotResource")
    );
    assert!(
      reason(build_role(&with_statements(vec![
        json!({ "Effect": "test", "Resource": {} })
      ])))
      .contains("Action or NotAction")
    );
    assert!(reason(build_role(&with_statements(vec![json!("s3:*")]))).contains("object"));
  }

  #[test]
  fn test_statements_become_named_policy() {
    let statements = vec![
      json!({
        "Effect": "Allow",
        "Action": ["s3:GetObject"],
        "Resource": "arn:aws:s3:::mySuperDuperBucket"
      }),
      json!({
        "Effect": "Allow",
        "NotAction": ["s3:GetObject"],
        "NotResource": "arn:aws:s3:::mySuperDuperBucket"
      }),
    ];
    let fragment = build_role(&with_statements(statements.clone())).unwrap();
    let role = fragment.get(Section::Resources, PRIMARY_ROLE).unwrap();
    let policies = &role["Properties"]["Policies"];

    assert_eq!(policies[0]["PolicyName"], "basic");
    assert_eq!(
      policies[1],
      json!({ "PolicyName": "myLambda", "PolicyDocument": { "Statement": statements } })
    );
  }

  #[test]
  fn test_webhook_adds_gateway_trust() {
    let plain = build_role(&FunctionDef::new("test")).unwrap();
    let trust = &plain.get(Section::Resources, PRIMARY_ROLE).unwrap()["Properties"]
      ["AssumeRolePolicyDocument"]["Statement"];
    assert_eq!(trust.as_array().unwrap().len(), 2);

    let def: FunctionDef = serde_json::from_value(json!({
      "name": "test",
      "eventSources": { "webhook": { "method": "POST" } }
    }))
    .unwrap();
    let webhook = build_role(&def).unwrap();
    let trust = &webhook.get(Section::Resources, PRIMARY_ROLE).unwrap()["Properties"]
      ["AssumeRolePolicyDocument"]["Statement"];
    assert_eq!(trust[2]["Principal"]["Service"], "apigateway.amazonaws.com");
  }
}
