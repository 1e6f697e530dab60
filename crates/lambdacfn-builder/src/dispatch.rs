//! Conditional dispatch support.
//!
//! When the optional `DispatchSnsArn` parameter is set at deploy time, the
//! function runs under a second role that may also publish to that topic.

use lambdacfn_config::FunctionDef;
use lambdacfn_template::intrinsic::reference;
use lambdacfn_template::{
  DISPATCH_ARN_PARAMETER, DISPATCH_CONDITION, DISPATCH_ROLE, Fragment, Section,
  dispatch_condition,
};
use serde_json::json;
use tracing::debug;

use crate::error::BuildError;
use crate::parameters::string_parameter;
use crate::roles::execution_role;

/// Build the dispatch parameter, its condition, and the conditional role.
pub fn build_dispatch(def: &FunctionDef) -> Result<Fragment, BuildError> {
  let mut role = execution_role(def)?;
  role["Condition"] = json!(DISPATCH_CONDITION);
  if let Some(policies) = role["Properties"]["Policies"].as_array_mut() {
    policies.push(json!({
      "PolicyName": "dispatch",
      "PolicyDocument": {
        "Statement": [{
          "Effect": "Allow",
          "Action": ["sns:Publish"],
          "Resource": reference(DISPATCH_ARN_PARAMETER),
        }]
      }
    }));
  }

  let fragment = Fragment::new()
    .with(
      Section::Parameters,
      DISPATCH_ARN_PARAMETER,
      string_parameter("Dispatch SNS ARN (Optional)"),
    )
    .with(Section::Conditions, DISPATCH_CONDITION, dispatch_condition())
    .with(Section::Resources, DISPATCH_ROLE, role);

  debug!(function = %def.name, role = DISPATCH_ROLE, "dispatch role built");
  Ok(fragment)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::roles::build_role;
  use lambdacfn_template::PRIMARY_ROLE;

  #[test]
  fn test_dispatch_role_is_conditional() {
    let fragment = build_dispatch(&FunctionDef::new("test")).unwrap();
    let role = fragment.get(Section::Resources, DISPATCH_ROLE).unwrap();

    assert_eq!(role["Condition"], DISPATCH_CONDITION);
    assert_eq!(
      fragment.get(Section::Conditions, DISPATCH_CONDITION),
      Some(&dispatch_condition())
    );
    assert!(fragment.get(Section::Parameters, DISPATCH_ARN_PARAMETER).is_some());
  }

  #[test]
  fn test_dispatch_role_mirrors_primary() {
    let def = FunctionDef::new("test");
    let primary = build_role(&def).unwrap();
    let primary = &primary.get(Section::Resources, PRIMARY_ROLE).unwrap()["Properties"];
    let dispatch = build_dispatch(&def).unwrap();
    let dispatch = &dispatch.get(Section::Resources, DISPATCH_ROLE).unwrap()["Properties"];

    assert_eq!(
      primary["AssumeRolePolicyDocument"],
      dispatch["AssumeRolePolicyDocument"]
    );
    assert_eq!(primary["Policies"][0], dispatch["Policies"][0]);

    let extra = dispatch["Policies"].as_array().unwrap().last().unwrap();
    assert_eq!(extra["PolicyName"], "dispatch");
    assert_eq!(
      extra["PolicyDocument"]["Statement"][0]["Resource"],
      reference(DISPATCH_ARN_PARAMETER)
    );
  }
}
