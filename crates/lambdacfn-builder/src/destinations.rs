//! Downstream notification destinations.

use std::collections::BTreeMap;

use lambdacfn_config::{DestinationKind, FunctionDef, SnsDestinationDef};
use lambdacfn_template::intrinsic::reference;
use lambdacfn_template::{Fragment, Section};
use serde_json::{Value, json};
use tracing::debug;

use crate::alarms::email_topic;
use crate::error::BuildError;
use crate::parameters::{check_parameter_name, string_parameter};

/// A parsed destination.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
  /// Named email topics the function may publish to.
  Sns(BTreeMap<String, SnsDestinationDef>),
}

impl Destination {
  /// Parse every declared destination. Unknown keys are rejected.
  pub fn from_def(def: &FunctionDef) -> Result<Vec<Self>, BuildError> {
    let Some(destinations) = &def.destinations else {
      return Ok(Vec::new());
    };

    destinations
      .iter()
      .map(|(key, body)| {
        let kind = DestinationKind::from_key(key).ok_or_else(|| BuildError::UnknownDestination {
          key: key.clone(),
        })?;
        match kind {
          DestinationKind::Sns => Ok(Destination::Sns(parse_topics(kind, body)?)),
        }
      })
      .collect()
  }
}

/// Build the destination fragment, or `None` when no destination is declared.
pub fn build_destination(def: &FunctionDef) -> Result<Option<Fragment>, BuildError> {
  let destinations = Destination::from_def(def)?;
  if destinations.is_empty() {
    return Ok(None);
  }

  let mut fragment = Fragment::new();
  for destination in destinations {
    match destination {
      Destination::Sns(topics) => sns_destination(def, &topics, &mut fragment)?,
    }
  }
  Ok(Some(fragment))
}

fn parse_topics(
  kind: DestinationKind,
  body: &Value,
) -> Result<BTreeMap<String, SnsDestinationDef>, BuildError> {
  if body.is_null() {
    return Ok(BTreeMap::new());
  }
  serde_json::from_value(body.clone()).map_err(|e| BuildError::InvalidDestination {
    kind: kind.key(),
    message: e.to_string(),
  })
}

fn sns_destination(
  def: &FunctionDef,
  topics: &BTreeMap<String, SnsDestinationDef>,
  fragment: &mut Fragment,
) -> Result<(), BuildError> {
  for (name, topic) in topics {
    let description = topic
      .description
      .as_deref()
      .ok_or_else(|| BuildError::MissingDescription { name: name.clone() })?;
    let email = format!("{name}Email");
    check_parameter_name(&email)?;
    let topic_name = format!("{name}Topic");

    fragment
      .insert(Section::Parameters, email.clone(), string_parameter(description))
      .insert(Section::Resources, topic_name.clone(), email_topic(json!(name), &email))
      .insert(Section::Variables, topic_name.clone(), reference(&topic_name))
      .push_policy(json!({
        "PolicyName": format!("{name}TopicPermissions"),
        "PolicyDocument": {
          "Statement": [{
            "Effect": "Allow",
            "Action": "sns:Publish",
            "Resource": reference(&def.name),
          }]
        }
      }));
    debug!(function = %def.name, topic = %topic_name, "destination topic built");
  }
  Ok(())
}
