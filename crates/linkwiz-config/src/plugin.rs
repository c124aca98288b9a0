use serde::{Deserialize, Serialize};

/// A plugin type known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDefinition {
  pub key: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
}

/// A named instance of a plugin definition with concrete settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfiguration {
  pub id: String,
  pub title: String,
  pub plugin_definition_key: String,
}

/// An invocable action exposed by a plugin definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginFunction {
  pub key: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
}
