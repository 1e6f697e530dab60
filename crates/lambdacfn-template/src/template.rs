use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fragment::{Entries, Fragment};

/// Template format version written by [`Template::finalize`].
pub const FORMAT_VERSION: &str = "2010-09-09";

/// A composed template ready for the provisioning service.
///
/// Without `format_version` and `description` it is an embeddable template
/// that can be linked into a larger one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
  #[serde(
    rename = "AWSTemplateFormatVersion",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub format_version: Option<String>,
  #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Entries>,
  #[serde(rename = "Parameters", default, skip_serializing_if = "Option::is_none")]
  pub parameters: Option<Entries>,
  #[serde(rename = "Mappings", default, skip_serializing_if = "Option::is_none")]
  pub mappings: Option<Entries>,
  #[serde(rename = "Conditions", default, skip_serializing_if = "Option::is_none")]
  pub conditions: Option<Entries>,
  #[serde(rename = "Resources", default, skip_serializing_if = "Option::is_none")]
  pub resources: Option<Entries>,
  #[serde(rename = "Outputs", default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<Entries>,
}

impl Template {
  pub fn resource(&self, name: &str) -> Option<&Value> {
    self.resources.as_ref().and_then(|r| r.get(name))
  }

  pub fn output(&self, name: &str) -> Option<&Value> {
    self.outputs.as_ref().and_then(|o| o.get(name))
  }

  pub fn parameter(&self, name: &str) -> Option<&Value> {
    self.parameters.as_ref().and_then(|p| p.get(name))
  }

  pub fn condition(&self, name: &str) -> Option<&Value> {
    self.conditions.as_ref().and_then(|c| c.get(name))
  }

  pub fn parameter_count(&self) -> usize {
    self.parameters.as_ref().map_or(0, |p| p.len())
  }

  /// Wrap the template for standalone deployment.
  pub fn finalize(mut self, description: impl Into<String>) -> Self {
    self.format_version = Some(FORMAT_VERSION.to_string());
    self.description = Some(description.into());
    self
  }
}

/// Drops `Variables` and `Policies`, which are not valid template sections.
impl From<Fragment> for Template {
  fn from(fragment: Fragment) -> Self {
    Self {
      format_version: None,
      description: None,
      metadata: fragment.metadata,
      parameters: fragment.parameters,
      mappings: fragment.mappings,
      conditions: fragment.conditions,
      resources: fragment.resources,
      outputs: fragment.outputs,
    }
  }
}

/// Lets composed templates take part in another merge.
impl From<Template> for Fragment {
  fn from(template: Template) -> Self {
    Self {
      metadata: template.metadata,
      parameters: template.parameters,
      mappings: template.mappings,
      conditions: template.conditions,
      resources: template.resources,
      outputs: template.outputs,
      variables: None,
      policies: Vec::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fragment::Section;
  use serde_json::json;

  #[test]
  fn test_finalize_sets_envelope() {
    let template = Template::default().finalize("test lambda-cfn function");
    assert_eq!(template.format_version.as_deref(), Some(FORMAT_VERSION));
    assert_eq!(template.description.as_deref(), Some("test lambda-cfn function"));
  }

  #[test]
  fn test_serialization_order_and_names() {
    let template = Template {
      resources: Some(Entries::from_iter([("r".to_string(), json!({}))])),
      parameters: Some(Entries::from_iter([("p".to_string(), json!({}))])),
      ..Default::default()
    }
    .finalize("d");

    let text = serde_json::to_string(&template).unwrap();
    assert_eq!(
      text,
      concat!(
        r#"{"AWSTemplateFormatVersion":"2010-09-09","Description":"d","#,
        r#""Parameters":{"p":{}},"Resources":{"r":{}}}"#
      )
    );
  }

  #[test]
  fn test_from_fragment_drops_variables_and_policies() {
    let mut fragment = Fragment::new().with(Section::Variables, "V", json!("x"));
    fragment.push_policy(json!({ "PolicyName": "p" }));

    let value = serde_json::to_value(Template::from(fragment)).unwrap();
    assert_eq!(value, json!({}));
  }
}
