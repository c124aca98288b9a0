use async_trait::async_trait;
use linkwiz_config::{
  AvailableLinkType, PluginConfiguration, PluginDefinition, PluginFunction, ProcessLink,
  ProcessLinkQuery, SaveProcessLinkRequest, UpdateProcessLinkRequest,
};

use crate::error::GatewayError;

/// Persistence of process links.
///
/// Each call is a single request; implementations do not retry.
#[async_trait]
pub trait LinkPersistenceGateway: Send + Sync {
  /// Link types the backend allows for an activity type (suffixed, e.g. `bpmn:ServiceTask:start`).
  async fn get_process_link_candidates(
    &self,
    activity_type: &str,
  ) -> Result<Vec<AvailableLinkType>, GatewayError>;

  /// Existing links for an activity. An activity without links yields an empty list.
  async fn get_process_link(
    &self,
    query: &ProcessLinkQuery,
  ) -> Result<Vec<ProcessLink>, GatewayError>;

  /// Create a link.
  async fn save_process_link(
    &self,
    request: &SaveProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError>;

  /// Update an existing link.
  async fn update_process_link(
    &self,
    request: &UpdateProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError>;

  /// Delete a link by id.
  async fn delete_process_link(&self, id: &str) -> Result<(), GatewayError>;
}

/// Read-only plugin metadata used to populate the wizard's choice steps.
#[async_trait]
pub trait PluginCatalog: Send + Sync {
  /// Plugin definitions that expose at least one function for the activity type.
  async fn list_plugin_definitions(
    &self,
    activity_type: &str,
  ) -> Result<Vec<PluginDefinition>, GatewayError>;

  /// Plugin configurations, optionally restricted to one definition.
  async fn list_plugin_configurations(
    &self,
    definition_key: Option<&str>,
  ) -> Result<Vec<PluginConfiguration>, GatewayError>;

  /// Functions of a plugin definition usable on the activity type.
  async fn list_plugin_functions(
    &self,
    definition_key: &str,
    activity_type: &str,
  ) -> Result<Vec<PluginFunction>, GatewayError>;
}
