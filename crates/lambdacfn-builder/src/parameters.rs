use std::sync::LazyLock;

use lambdacfn_config::{FunctionDef, ParameterDef};
use lambdacfn_template::{ComposeError, Fragment, Section};
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::BuildError;

static PARAMETER_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("parameter name pattern"));

/// Parameters every function template carries: the code location and the
/// deployed revision.
pub const CODE_BUCKET_PARAMETER: &str = "CodeS3Bucket";
pub const CODE_PREFIX_PARAMETER: &str = "CodeS3Prefix";
pub const REVISION_PARAMETER: &str = "GitSha";

const IMPLICIT_PARAMETERS: [(&str, &str); 3] = [
  (CODE_BUCKET_PARAMETER, "lambda function S3 bucket location"),
  (CODE_PREFIX_PARAMETER, "lambda function S3 prefix location"),
  (REVISION_PARAMETER, "Deploy Gitsha"),
];

/// Build the Parameters fragment from the caller's declarations plus the
/// implicit deployment parameters.
pub fn build_parameters(def: &FunctionDef) -> Result<Fragment, BuildError> {
  let mut fragment = Fragment::new();

  for (name, param) in def.parameters.iter().flatten() {
    if IMPLICIT_PARAMETERS.iter().any(|(implicit, _)| *implicit == name.as_str()) {
      return Err(
        ComposeError::DuplicateKeyConflict {
          section: Section::Parameters,
          key: name.clone(),
        }
        .into(),
      );
    }
    fragment.insert(Section::Parameters, name.clone(), validate_parameter(name, param)?);
  }

  for (name, description) in IMPLICIT_PARAMETERS {
    fragment.insert(Section::Parameters, name, string_parameter(description));
  }

  debug!(
    function = %def.name,
    parameters = fragment.len(Section::Parameters),
    "parameters built"
  );
  Ok(fragment)
}

/// `{ "Type": "String", "Description": description }`
pub(crate) fn string_parameter(description: &str) -> Value {
  json!({ "Type": "String", "Description": description })
}

/// Parameter names must be alphanumeric.
pub(crate) fn check_parameter_name(name: &str) -> Result<(), BuildError> {
  if PARAMETER_NAME.is_match(name) {
    Ok(())
  } else {
    Err(BuildError::InvalidParameterName {
      name: name.to_string(),
    })
  }
}

fn validate_parameter(name: &str, param: &ParameterDef) -> Result<Value, BuildError> {
  check_parameter_name(name)?;

  let kind = param
    .kind
    .as_deref()
    .filter(|kind| !kind.is_empty())
    .ok_or_else(|| BuildError::MissingType {
      name: name.to_string(),
    })?;
  let description = param
    .description
    .as_deref()
    .filter(|description| !description.is_empty())
    .ok_or_else(|| BuildError::MissingDescription {
      name: name.to_string(),
    })?;

  let mut body = Map::new();
  body.insert("Type".to_string(), json!(kind));
  body.insert("Description".to_string(), json!(description));
  for (key, value) in &param.extra {
    body.insert(key.clone(), value.clone());
  }
  Ok(Value::Object(body))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn def_with(name: &str, param: ParameterDef) -> FunctionDef {
    FunctionDef {
      parameters: Some(BTreeMap::from([(name.to_string(), param)])),
      ..FunctionDef::new("test")
    }
  }

  #[test]
  fn test_implicit_parameters() {
    let fragment = build_parameters(&FunctionDef::new("test")).unwrap();
    let params = fragment.section(Section::Parameters).unwrap();

    assert_eq!(params.len(), 3);
    assert_eq!(params[CODE_BUCKET_PARAMETER]["Type"], "String");
    assert!(params.contains_key(CODE_PREFIX_PARAMETER));
    assert!(params.contains_key(REVISION_PARAMETER));
  }

  #[test]
  fn test_caller_parameters_pass_through() {
    let mut param = ParameterDef::string("api token");
    param.extra.insert("NoEcho".to_string(), json!("true"));

    let fragment = build_parameters(&def_with("githubToken", param)).unwrap();
    let token = fragment.get(Section::Parameters, "githubToken").unwrap();

    assert_eq!(token["Description"], "api token");
    assert_eq!(token["NoEcho"], "true");
  }

  #[test]
  fn test_missing_type() {
    let param = ParameterDef {
      description: Some("foo".to_string()),
      ..Default::default()
    };
    let result = build_parameters(&def_with("a", param));
    assert!(matches!(result, Err(BuildError::MissingType { name }) if name == "a"));
  }

  #[test]
  fn test_missing_description() {
    let param = ParameterDef {
      kind: Some("foo".to_string()),
      ..Default::default()
    };
    let result = build_parameters(&def_with("a", param));
    assert!(matches!(result, Err(BuildError::MissingDescription { .. })));
  }

  #[test]
  fn test_implicit_name_collision() {
    for name in [CODE_BUCKET_PARAMETER, CODE_PREFIX_PARAMETER, REVISION_PARAMETER] {
      let result = build_parameters(&def_with(name, ParameterDef::string("mine")));
      assert!(matches!(
        result,
        Err(BuildError::Compose(ComposeError::DuplicateKeyConflict {
          section: Section::Parameters,
          key,
        })) if key == name
      ));
    }
  }

  #[test]
  fn test_non_alphanumeric_name() {
    let result = build_parameters(&def_with("this_is_invalid", ParameterDef::string("foo")));
    assert!(matches!(result, Err(BuildError::InvalidParameterName { .. })));
  }
}
