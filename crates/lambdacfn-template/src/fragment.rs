use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key/value entries of one template section.
pub type Entries = Map<String, Value>;

/// A keyed section of a fragment.
///
/// `Policies` is not listed: it is an ordered sequence that is concatenated
/// across fragments rather than merged by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  Metadata,
  Parameters,
  Mappings,
  Conditions,
  Resources,
  Outputs,
  Variables,
}

impl Section {
  /// Order in which sections are folded during a merge.
  pub const MERGE_ORDER: [Section; 7] = [
    Section::Metadata,
    Section::Parameters,
    Section::Mappings,
    Section::Conditions,
    Section::Resources,
    Section::Outputs,
    Section::Variables,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Section::Metadata => "Metadata",
      Section::Parameters => "Parameters",
      Section::Mappings => "Mappings",
      Section::Conditions => "Conditions",
      Section::Resources => "Resources",
      Section::Outputs => "Outputs",
      Section::Variables => "Variables",
    }
  }
}

impl std::fmt::Display for Section {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

/// A partial template contributed by one builder.
///
/// `Variables` and `Policies` are not valid template sections; they are
/// consumed by the [`Composer`](crate::Composer) and never reach the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fragment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parameters: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mappings: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub conditions: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resources: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub outputs: Option<Entries>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub variables: Option<Entries>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub policies: Vec<Value>,
}

impl Fragment {
  pub fn new() -> Self {
    Self::default()
  }

  /// Entries of a section, if the fragment declares it.
  pub fn section(&self, section: Section) -> Option<&Entries> {
    self.slot(section).as_ref()
  }

  /// Look up a single entry.
  pub fn get(&self, section: Section, key: &str) -> Option<&Value> {
    self.section(section).and_then(|entries| entries.get(key))
  }

  /// Insert an entry, creating the section on first use.
  pub fn insert(&mut self, section: Section, key: impl Into<String>, value: Value) -> &mut Self {
    self
      .slot_mut(section)
      .get_or_insert_with(Map::new)
      .insert(key.into(), value);
    self
  }

  /// Owned variant of [`insert`](Self::insert) for chaining.
  pub fn with(mut self, section: Section, key: impl Into<String>, value: Value) -> Self {
    self.insert(section, key, value);
    self
  }

  pub fn push_policy(&mut self, policy: Value) -> &mut Self {
    self.policies.push(policy);
    self
  }

  /// Number of entries in a section.
  pub fn len(&self, section: Section) -> usize {
    self.section(section).map_or(0, Map::len)
  }

  pub fn is_empty(&self) -> bool {
    Section::MERGE_ORDER
      .iter()
      .all(|section| self.len(*section) == 0)
      && self.policies.is_empty()
  }

  pub(crate) fn slot(&self, section: Section) -> &Option<Entries> {
    match section {
      Section::Metadata => &self.metadata,
      Section::Parameters => &self.parameters,
      Section::Mappings => &self.mappings,
      Section::Conditions => &self.conditions,
      Section::Resources => &self.resources,
      Section::Outputs => &self.outputs,
      Section::Variables => &self.variables,
    }
  }

  pub(crate) fn slot_mut(&mut self, section: Section) -> &mut Option<Entries> {
    match section {
      Section::Metadata => &mut self.metadata,
      Section::Parameters => &mut self.parameters,
      Section::Mappings => &mut self.mappings,
      Section::Conditions => &mut self.conditions,
      Section::Resources => &mut self.resources,
      Section::Outputs => &mut self.outputs,
      Section::Variables => &mut self.variables,
    }
  }
}
