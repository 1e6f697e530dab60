//! Helpers for CloudFormation intrinsic functions and pseudo parameters.

use serde_json::{Value, json};

/// `{ "Ref": name }`
pub fn reference(name: &str) -> Value {
  json!({ "Ref": name })
}

/// `{ "Fn::GetAtt": [resource, attribute] }`
pub fn get_att(resource: &str, attribute: &str) -> Value {
  json!({ "Fn::GetAtt": [resource, attribute] })
}

/// `{ "Fn::Join": ["", parts] }`
pub fn join(parts: Vec<Value>) -> Value {
  join_with("", parts)
}

/// `{ "Fn::Join": [delimiter, parts] }`
pub fn join_with(delimiter: &str, parts: Vec<Value>) -> Value {
  json!({ "Fn::Join": [delimiter, parts] })
}

/// `{ "Fn::If": [condition, when_true, when_false] }`
pub fn fn_if(condition: &str, when_true: Value, when_false: Value) -> Value {
  json!({ "Fn::If": [condition, when_true, when_false] })
}

/// `{ "Fn::Not": [condition] }`
pub fn fn_not(condition: Value) -> Value {
  json!({ "Fn::Not": [condition] })
}

/// `{ "Fn::Equals": [left, right] }`
pub fn fn_equals(left: Value, right: Value) -> Value {
  json!({ "Fn::Equals": [left, right] })
}

pub fn stack_name() -> Value {
  reference("AWS::StackName")
}

pub fn stack_id() -> Value {
  reference("AWS::StackId")
}

pub fn region() -> Value {
  reference("AWS::Region")
}

pub fn account_id() -> Value {
  reference("AWS::AccountId")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_join_uses_empty_delimiter() {
    let joined = join(vec![json!("arn:aws:logs:*:"), account_id(), json!(":*")]);
    assert_eq!(joined["Fn::Join"][0], "");
    assert_eq!(joined["Fn::Join"][1][1], json!({ "Ref": "AWS::AccountId" }));
    assert_eq!(joined["Fn::Join"][1][2], ":*");
  }

  #[test]
  fn test_fn_if_shape() {
    let value = fn_if("Cond", get_att("A", "Arn"), get_att("B", "Arn"));
    assert_eq!(
      value,
      json!({ "Fn::If": ["Cond", { "Fn::GetAtt": ["A", "Arn"] }, { "Fn::GetAtt": ["B", "Arn"] }] })
    );
  }
}
