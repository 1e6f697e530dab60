use lambdacfn_config::FunctionDef;
use lambdacfn_template::{Composer, Fragment, Template};
use tracing::{info, instrument};

use crate::alarms::build_service_alarms;
use crate::context::BuildContext;
use crate::destinations::build_destination;
use crate::dispatch::build_dispatch;
use crate::error::BuildError;
use crate::events::build_event_source;
use crate::lambda::build_lambda;
use crate::parameters::build_parameters;
use crate::roles::build_role;

/// Builds the template for one function definition.
#[derive(Debug, Clone, Default)]
pub struct FunctionBuilder {
  ctx: BuildContext,
}

impl FunctionBuilder {
  pub fn new(ctx: BuildContext) -> Self {
    Self { ctx }
  }

  /// Build a template meant to be merged into a larger one: no format version
  /// and no description.
  #[instrument(name = "embed", skip(self, def), fields(function = %def.name))]
  pub fn embed(&self, def: &FunctionDef) -> Result<Template, BuildError> {
    if def.name.trim().is_empty() {
      return Err(BuildError::MissingFunctionName);
    }

    let fragments = self.fragments(def)?;
    let template = Composer::new(def.name.clone()).compose(&fragments)?;

    info!(
      parameters = template.parameter_count(),
      "function template built"
    );
    Ok(template)
  }

  /// Build a standalone template described as `<name> lambda-cfn function`.
  pub fn build(&self, def: &FunctionDef) -> Result<Template, BuildError> {
    let template = self.embed(def)?;
    Ok(template.finalize(format!("{} lambda-cfn function", def.name)))
  }

  /// Run every builder. Exactly one event source fragment is produced; the
  /// destination fragment is optional.
  fn fragments(&self, def: &FunctionDef) -> Result<Vec<Fragment>, BuildError> {
    let mut fragments = vec![
      build_parameters(def)?,
      build_role(def)?,
      build_dispatch(def)?,
      build_service_alarms(def),
      build_lambda(def, &self.ctx)?,
      build_event_source(def, &self.ctx)?,
    ];
    if let Some(destination) = build_destination(def)? {
      fragments.push(destination);
    }
    Ok(fragments)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use lambdacfn_template::Section;

  #[test]
  fn test_missing_name() {
    let builder = FunctionBuilder::default();
    assert!(matches!(
      builder.build(&FunctionDef::default()),
      Err(BuildError::MissingFunctionName)
    ));
    assert!(matches!(
      builder.embed(&FunctionDef::new("  ")),
      Err(BuildError::MissingFunctionName)
    ));
  }

  #[test]
  fn test_fragment_count() {
    let builder = FunctionBuilder::default();
    let fragments = builder.fragments(&FunctionDef::new("test")).unwrap();
    assert_eq!(fragments.len(), 6);
    assert!(fragments.iter().all(|f| !f.is_empty()));
    assert!(fragments[5].get(Section::Resources, "testSNSTopic").is_some());
  }
}
