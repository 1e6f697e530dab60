use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::error::ComposeError;
use crate::fragment::{Entries, Fragment, Section};
use crate::intrinsic::{account_id, fn_equals, fn_not, reference, region, stack_id, stack_name};
use crate::template::Template;

/// Platform limit on template parameters.
pub const MAX_PARAMETERS: usize = 60;

/// Logical name of the primary execution role.
pub const PRIMARY_ROLE: &str = "LambdaCfnRole";

/// Logical name of the execution role used when a dispatch topic is configured.
pub const DISPATCH_ROLE: &str = "LambdaCfnDispatchRole";

/// Condition that is true when the dispatch topic parameter is non-empty.
pub const DISPATCH_CONDITION: &str = "HasDispatchSnsArn";

/// Optional parameter carrying the dispatch topic ARN.
pub const DISPATCH_ARN_PARAMETER: &str = "DispatchSnsArn";

/// `NOT(DispatchSnsArn == "")`
pub fn dispatch_condition() -> Value {
  fn_not(fn_equals(json!(""), reference(DISPATCH_ARN_PARAMETER)))
}

/// Fold fragments into a single accumulator.
///
/// Keyed sections are merged with duplicate detection: a key seen twice must
/// carry an identical value, otherwise the merge fails. Policies are
/// concatenated in fragment order. Every value is cloned on ingestion, so the
/// result shares nothing with the inputs.
pub fn merge<'a, I>(fragments: I) -> Result<Fragment, ComposeError>
where
  I: IntoIterator<Item = &'a Fragment>,
{
  let mut merged = Fragment::new();

  for fragment in fragments {
    for section in Section::MERGE_ORDER {
      let Some(incoming) = fragment.section(section) else {
        continue;
      };

      let target = merged.slot_mut(section).get_or_insert_with(Map::new);
      for (key, value) in incoming {
        match target.get(key) {
          Some(existing) if existing == value => {
            debug!(section = %section, key = %key, "identical re-declaration kept");
          }
          Some(_) => {
            return Err(ComposeError::DuplicateKeyConflict {
              section,
              key: key.clone(),
            });
          }
          None => {
            target.insert(key.clone(), value.clone());
          }
        }
      }
    }

    merged.policies.extend(fragment.policies.iter().cloned());
  }

  Ok(merged)
}

/// Composes the fragments of one function into a template.
///
/// Each call works on its own accumulator; a `Composer` holds no state
/// between calls and can be shared freely.
#[derive(Debug, Clone)]
pub struct Composer {
  function_name: String,
}

impl Composer {
  /// Create a composer for the function resource with the given logical name.
  pub fn new(function_name: impl Into<String>) -> Self {
    Self {
      function_name: function_name.into(),
    }
  }

  /// Merge fragments and apply the post-merge passes.
  ///
  /// This process:
  /// 1. Merges all fragments (see [`merge`])
  /// 2. Synthesizes the dispatch condition if no fragment declared it
  /// 3. Enforces the parameter limit
  /// 4. Writes parameters and variables into the function environment
  /// 5. Appends accumulated policies to the execution roles
  #[instrument(name = "compose", skip(self, fragments), fields(function = %self.function_name))]
  pub fn compose(&self, fragments: &[Fragment]) -> Result<Template, ComposeError> {
    let mut merged = merge(fragments)?;

    merged
      .conditions
      .get_or_insert_with(Map::new)
      .entry(DISPATCH_CONDITION)
      .or_insert_with(dispatch_condition);

    check_parameter_limit(&merged)?;
    self.propagate_environment(&mut merged)?;
    inject_policies(&mut merged)?;

    info!(
      fragments = fragments.len(),
      parameters = merged.len(Section::Parameters),
      resources = merged.len(Section::Resources),
      outputs = merged.len(Section::Outputs),
      "template composed"
    );

    Ok(Template::from(merged))
  }

  /// Every parameter, every fragment variable and the stack identity become
  /// environment variables of the function resource.
  fn propagate_environment(&self, merged: &mut Fragment) -> Result<(), ComposeError> {
    let mut variables = merged.variables.take().unwrap_or_default();
    variables.insert("StackName".to_string(), stack_name());
    variables.insert("Region".to_string(), region());
    variables.insert("AccountId".to_string(), account_id());
    variables.insert("StackId".to_string(), stack_id());

    if let Some(parameters) = &merged.parameters {
      for name in parameters.keys() {
        variables.insert(name.clone(), reference(name));
      }
    }

    let properties = resource_properties(merged, &self.function_name)?;
    let environment = properties
      .entry("Environment")
      .or_insert_with(|| json!({}))
      .as_object_mut()
      .ok_or_else(|| ComposeError::MalformedResource {
        name: self.function_name.clone(),
        message: "Environment is not an object".to_string(),
      })?;
    environment.insert("Variables".to_string(), Value::Object(variables));

    Ok(())
  }
}

/// Fold composed templates into one deployable unit.
///
/// Uses the same duplicate rules and parameter limit as [`Composer::compose`];
/// the environment and policy passes already ran for each input.
#[instrument(name = "link", skip(templates), fields(templates = templates.len()))]
pub fn link(templates: &[Template]) -> Result<Template, ComposeError> {
  let fragments: Vec<Fragment> = templates.iter().cloned().map(Fragment::from).collect();
  let merged = merge(&fragments)?;
  check_parameter_limit(&merged)?;

  info!(
    parameters = merged.len(Section::Parameters),
    resources = merged.len(Section::Resources),
    "templates linked"
  );

  Ok(Template::from(merged))
}

fn check_parameter_limit(merged: &Fragment) -> Result<(), ComposeError> {
  let count = merged.len(Section::Parameters);
  if count > MAX_PARAMETERS {
    return Err(ComposeError::TooManyParameters {
      count,
      limit: MAX_PARAMETERS,
    });
  }
  Ok(())
}

/// Policies go to the primary role and, when present, the dispatch role.
fn inject_policies(merged: &mut Fragment) -> Result<(), ComposeError> {
  if merged.policies.is_empty() {
    return Ok(());
  }
  let policies = std::mem::take(&mut merged.policies);

  for role in [PRIMARY_ROLE, DISPATCH_ROLE] {
    let present = merged.get(Section::Resources, role).is_some();
    if !present {
      if role == PRIMARY_ROLE {
        return Err(ComposeError::MissingResource {
          name: role.to_string(),
        });
      }
      continue;
    }

    let properties = resource_properties(merged, role)?;
    let list = properties
      .entry("Policies")
      .or_insert_with(|| json!([]))
      .as_array_mut()
      .ok_or_else(|| ComposeError::MalformedResource {
        name: role.to_string(),
        message: "Policies is not an array".to_string(),
      })?;
    list.extend(policies.iter().cloned());
  }

  Ok(())
}

fn resource_properties<'a>(
  merged: &'a mut Fragment,
  name: &str,
) -> Result<&'a mut Entries, ComposeError> {
  let resource = merged
    .resources
    .as_mut()
    .and_then(|resources| resources.get_mut(name))
    .ok_or_else(|| ComposeError::MissingResource {
      name: name.to_string(),
    })?;

  resource
    .as_object_mut()
    .ok_or_else(|| ComposeError::MalformedResource {
      name: name.to_string(),
      message: "resource is not an object".to_string(),
    })?
    .entry("Properties")
    .or_insert_with(|| json!({}))
    .as_object_mut()
    .ok_or_else(|| ComposeError::MalformedResource {
      name: name.to_string(),
      message: "Properties is not an object".to_string(),
    })
}
