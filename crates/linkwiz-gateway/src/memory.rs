use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use linkwiz_config::{
  AvailableLinkType, PluginConfiguration, PluginDefinition, PluginFunction, ProcessLink,
  ProcessLinkQuery, SaveProcessLinkRequest, UpdateProcessLinkRequest,
};

use crate::error::GatewayError;
use crate::gateway::{LinkPersistenceGateway, PluginCatalog};

#[derive(Debug, Default)]
struct Data {
  candidates: HashMap<String, Vec<AvailableLinkType>>,
  links: Vec<ProcessLink>,
  definitions: Vec<PluginDefinition>,
  configurations: Vec<PluginConfiguration>,
  functions: HashMap<String, Vec<PluginFunction>>,
  save_requests: Vec<SaveProcessLinkRequest>,
  update_requests: Vec<UpdateProcessLinkRequest>,
  delete_requests: Vec<String>,
}

/// In-process gateway and plugin catalog.
///
/// Suitable for tests and offline demos. Lookups and writes can be made to
/// fail independently to exercise the wizard's recovery paths. Every write
/// request is recorded, including the ones that fail.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
  data: RwLock<Data>,
  fail_lookups: AtomicBool,
  fail_writes: AtomicBool,
}

impl InMemoryGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register the link types offered for an activity type (suffixed).
  pub fn with_candidates(
    self,
    activity_type: impl Into<String>,
    candidates: Vec<AvailableLinkType>,
  ) -> Self {
    self
      .data
      .write()
      .unwrap()
      .candidates
      .insert(activity_type.into(), candidates);
    self
  }

  /// Seed an existing link.
  pub fn with_link(self, link: ProcessLink) -> Self {
    self.data.write().unwrap().links.push(link);
    self
  }

  /// Register a plugin definition with its configurations and functions.
  pub fn with_plugin(
    self,
    definition: PluginDefinition,
    configurations: Vec<PluginConfiguration>,
    functions: Vec<PluginFunction>,
  ) -> Self {
    {
      let mut data = self.data.write().unwrap();
      data.functions.insert(definition.key.clone(), functions);
      data.configurations.extend(configurations);
      data.definitions.push(definition);
    }
    self
  }

  /// Make every read fail with [`GatewayError::Unavailable`].
  pub fn set_fail_lookups(&self, fail: bool) {
    self.fail_lookups.store(fail, Ordering::SeqCst);
  }

  /// Make every write fail with [`GatewayError::Unavailable`].
  pub fn set_fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  /// Links currently stored.
  pub fn links(&self) -> Vec<ProcessLink> {
    self.data.read().unwrap().links.clone()
  }

  pub fn save_requests(&self) -> Vec<SaveProcessLinkRequest> {
    self.data.read().unwrap().save_requests.clone()
  }

  pub fn update_requests(&self) -> Vec<UpdateProcessLinkRequest> {
    self.data.read().unwrap().update_requests.clone()
  }

  pub fn delete_requests(&self) -> Vec<String> {
    self.data.read().unwrap().delete_requests.clone()
  }

  fn check_lookup(&self) -> Result<(), GatewayError> {
    if self.fail_lookups.load(Ordering::SeqCst) {
      return Err(GatewayError::Unavailable {
        message: "lookups disabled".to_string(),
      });
    }
    Ok(())
  }

  fn check_write(&self) -> Result<(), GatewayError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(GatewayError::Unavailable {
        message: "writes disabled".to_string(),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl LinkPersistenceGateway for InMemoryGateway {
  async fn get_process_link_candidates(
    &self,
    activity_type: &str,
  ) -> Result<Vec<AvailableLinkType>, GatewayError> {
    self.check_lookup()?;
    let data = self.data.read().unwrap();
    Ok(data.candidates.get(activity_type).cloned().unwrap_or_default())
  }

  async fn get_process_link(
    &self,
    query: &ProcessLinkQuery,
  ) -> Result<Vec<ProcessLink>, GatewayError> {
    self.check_lookup()?;
    let data = self.data.read().unwrap();
    Ok(
      data
        .links
        .iter()
        .filter(|link| {
          link.process_definition_id == query.process_definition_id
            && link.activity_id == query.activity_id
        })
        .cloned()
        .collect(),
    )
  }

  async fn save_process_link(
    &self,
    request: &SaveProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError> {
    let mut data = self.data.write().unwrap();
    data.save_requests.push(request.clone());
    self.check_write()?;

    let link = request.clone().into_link(uuid::Uuid::new_v4().to_string());
    data.links.push(link.clone());
    Ok(link)
  }

  async fn update_process_link(
    &self,
    request: &UpdateProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError> {
    let mut data = self.data.write().unwrap();
    data.update_requests.push(request.clone());
    self.check_write()?;

    let link = data
      .links
      .iter_mut()
      .find(|link| link.id == request.id)
      .ok_or_else(|| GatewayError::NotFound {
        id: request.id.clone(),
      })?;
    request.apply_to(link);
    Ok(link.clone())
  }

  async fn delete_process_link(&self, id: &str) -> Result<(), GatewayError> {
    let mut data = self.data.write().unwrap();
    data.delete_requests.push(id.to_string());
    self.check_write()?;

    let before = data.links.len();
    data.links.retain(|link| link.id != id);
    if data.links.len() == before {
      return Err(GatewayError::NotFound { id: id.to_string() });
    }
    Ok(())
  }
}

#[async_trait]
impl PluginCatalog for InMemoryGateway {
  async fn list_plugin_definitions(
    &self,
    _activity_type: &str,
  ) -> Result<Vec<PluginDefinition>, GatewayError> {
    self.check_lookup()?;
    let data = self.data.read().unwrap();
    Ok(
      data
        .definitions
        .iter()
        .filter(|d| data.functions.get(&d.key).is_some_and(|f| !f.is_empty()))
        .cloned()
        .collect(),
    )
  }

  async fn list_plugin_configurations(
    &self,
    definition_key: Option<&str>,
  ) -> Result<Vec<PluginConfiguration>, GatewayError> {
    self.check_lookup()?;
    let data = self.data.read().unwrap();
    Ok(
      data
        .configurations
        .iter()
        .filter(|c| definition_key.is_none_or(|key| c.plugin_definition_key == key))
        .cloned()
        .collect(),
    )
  }

  async fn list_plugin_functions(
    &self,
    definition_key: &str,
    _activity_type: &str,
  ) -> Result<Vec<PluginFunction>, GatewayError> {
    self.check_lookup()?;
    let data = self.data.read().unwrap();
    Ok(data.functions.get(definition_key).cloned().unwrap_or_default())
  }
}
