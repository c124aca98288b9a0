use std::fmt;

use serde::{Deserialize, Serialize};

/// What a process link attaches to its activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessLinkType {
  Form,
  FormFlow,
  Plugin,
}

impl ProcessLinkType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ProcessLinkType::Form => "form",
      ProcessLinkType::FormFlow => "form-flow",
      ProcessLinkType::Plugin => "plugin",
    }
  }
}

impl fmt::Display for ProcessLinkType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A link type the backend allows for a given activity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableLinkType {
  pub process_link_type: ProcessLinkType,
}

impl AvailableLinkType {
  pub fn new(process_link_type: ProcessLinkType) -> Self {
    Self { process_link_type }
  }
}

/// A persisted association between a process activity and a form,
/// form-flow or plugin function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLink {
  pub id: String,
  pub process_definition_id: String,
  pub activity_id: String,
  pub activity_type: String,
  pub process_link_type: ProcessLinkType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_configuration_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_action_definition_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_properties: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_definition_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_flow_definition_id: Option<String>,
}

/// Identifies the activity whose links are being looked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLinkQuery {
  pub process_definition_id: String,
  pub activity_id: String,
}

impl ProcessLinkQuery {
  pub fn new(process_definition_id: impl Into<String>, activity_id: impl Into<String>) -> Self {
    Self {
      process_definition_id: process_definition_id.into(),
      activity_id: activity_id.into(),
    }
  }
}

/// Body of a create call.
///
/// `activity_type` already carries the `:create` / `:start` suffix, see
/// [`crate::activity_type_with_suffix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProcessLinkRequest {
  pub process_definition_id: String,
  pub activity_id: String,
  pub activity_type: String,
  pub process_link_type: ProcessLinkType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_configuration_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_action_definition_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_properties: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_definition_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_flow_definition_id: Option<String>,
}

impl SaveProcessLinkRequest {
  /// Materialize the link the backend would store for this request.
  pub fn into_link(self, id: impl Into<String>) -> ProcessLink {
    ProcessLink {
      id: id.into(),
      process_definition_id: self.process_definition_id,
      activity_id: self.activity_id,
      activity_type: self.activity_type,
      process_link_type: self.process_link_type,
      plugin_configuration_id: self.plugin_configuration_id,
      plugin_action_definition_key: self.plugin_action_definition_key,
      action_properties: self.action_properties,
      form_definition_id: self.form_definition_id,
      form_flow_definition_id: self.form_flow_definition_id,
    }
  }
}

/// Body of an update call. Only the link target and its properties can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcessLinkRequest {
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_configuration_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plugin_action_definition_key: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub action_properties: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_definition_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub form_flow_definition_id: Option<String>,
}

impl UpdateProcessLinkRequest {
  /// Apply this update to a stored link.
  pub fn apply_to(&self, link: &mut ProcessLink) {
    link.plugin_configuration_id = self.plugin_configuration_id.clone();
    link.plugin_action_definition_key = self.plugin_action_definition_key.clone();
    link.action_properties = self.action_properties.clone();
    link.form_definition_id = self.form_definition_id.clone();
    link.form_flow_definition_id = self.form_flow_definition_id.clone();
  }
}
