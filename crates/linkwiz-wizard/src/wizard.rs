//! Process-link wizard wiring.
//!
//! [`ProcessLinkWizard`] connects the [`WizardStateStore`] to the backend:
//! it loads candidate link types and any existing link when the wizard
//! opens, and turns the final selection into create, update or delete
//! requests.
//!
//! Lookup failures never reach the user: a failed link lookup opens the
//! wizard in create mode and a failed catalog lookup yields an empty list.
//! Persistence failures re-enable input, are logged, and are returned so
//! the caller can let the user retry.

use std::future::Future;
use std::sync::Arc;

use linkwiz_config::{
  BpmnElement, PluginConfiguration, PluginDefinition, PluginFunction, ProcessLink,
  ProcessLinkQuery, ProcessLinkType, SaveProcessLinkRequest, UpdateProcessLinkRequest,
};
use linkwiz_gateway::{GatewayError, LinkPersistenceGateway, PluginCatalog};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::WizardError;
use crate::events::{NoopNotifier, WizardEvent, WizardNotifier};
use crate::registry::FunctionConfigurationRegistry;
use crate::state::{WizardMode, WizardState};
use crate::steps::StepKind;
use crate::store::WizardStateStore;

/// What the selection resolves to, independent of create or update.
struct LinkTarget {
  plugin_configuration_id: Option<String>,
  plugin_action_definition_key: Option<String>,
  action_properties: Option<Value>,
  form_definition_id: Option<String>,
  form_flow_definition_id: Option<String>,
}

pub struct ProcessLinkWizard<N: WizardNotifier = NoopNotifier> {
  store: WizardStateStore,
  gateway: Arc<dyn LinkPersistenceGateway>,
  catalog: Arc<dyn PluginCatalog>,
  registry: FunctionConfigurationRegistry,
  notifier: N,
}

impl ProcessLinkWizard<NoopNotifier> {
  /// Create a wizard that discards events.
  pub fn new(gateway: Arc<dyn LinkPersistenceGateway>, catalog: Arc<dyn PluginCatalog>) -> Self {
    Self::with_notifier(gateway, catalog, NoopNotifier)
  }
}

impl<N: WizardNotifier> ProcessLinkWizard<N> {
  pub fn with_notifier(
    gateway: Arc<dyn LinkPersistenceGateway>,
    catalog: Arc<dyn PluginCatalog>,
    notifier: N,
  ) -> Self {
    Self {
      store: WizardStateStore::new(),
      gateway,
      catalog,
      registry: FunctionConfigurationRegistry::new(),
      notifier,
    }
  }

  /// Use `registry` to configure plugin function action properties.
  pub fn with_registry(mut self, registry: FunctionConfigurationRegistry) -> Self {
    self.registry = registry;
    self
  }

  pub fn store(&self) -> &WizardStateStore {
    &self.store
  }

  pub fn state(&self) -> WizardState {
    self.store.state()
  }

  /// Open the wizard for a BPMN element.
  ///
  /// An existing link for the activity puts the wizard in edit mode with
  /// that link pre-selected.
  #[instrument(
    name = "wizard_open",
    skip(self, element),
    fields(activity_id = %element.id, element_type = %element.element_type)
  )]
  pub async fn open(
    &self,
    element: BpmnElement,
    process_definition_id: &str,
  ) -> Result<(), WizardError> {
    self.store.reset();
    self.store.set_element(element.clone(), process_definition_id);

    let query = ProcessLinkQuery::new(process_definition_id, &element.id);
    let existing = match self.gateway.get_process_link(&query).await {
      Ok(links) => links.into_iter().next(),
      Err(e) => {
        warn!(error = %e, "process link lookup failed, opening in create mode");
        None
      }
    };

    let activity_type = element.activity_type();
    let candidates = match self.gateway.get_process_link_candidates(&activity_type).await {
      Ok(candidates) => candidates,
      Err(e) => {
        warn!(activity_type = %activity_type, error = %e, "link type lookup failed");
        Vec::new()
      }
    };
    self.store.set_available_link_types(candidates);

    let editing = existing.is_some();
    match existing {
      Some(link) => self.preselect(link).await?,
      None => self.store.enter_create_mode(),
    }

    self.store.show_modal();
    info!(editing, "wizard_opened");
    self.notifier.notify(WizardEvent::Opened {
      activity_id: element.id,
      editing,
    });
    Ok(())
  }

  /// Put the store in edit mode with `link`'s target selected.
  async fn preselect(&self, link: ProcessLink) -> Result<(), WizardError> {
    self.store.enter_edit_mode(link.clone());
    self.store.select_link_type(link.process_link_type)?;

    match link.process_link_type {
      ProcessLinkType::Form => {
        if let Some(id) = link.form_definition_id {
          self.store.select_form_definition(id)?;
        }
      }
      ProcessLinkType::FormFlow => {
        if let Some(id) = link.form_flow_definition_id {
          self.store.select_form_flow_definition(id)?;
        }
      }
      ProcessLinkType::Plugin => {
        let Some(configuration_id) = link.plugin_configuration_id else {
          return Ok(());
        };
        let Some(configuration) = self.plugin_configuration(&configuration_id).await else {
          warn!(
            configuration_id = %configuration_id,
            "plugin configuration of existing link not found, selection left empty"
          );
          return Ok(());
        };

        self
          .store
          .select_plugin_definition(configuration.plugin_definition_key)?;
        self.store.select_plugin_configuration(configuration.id)?;
        match link.plugin_action_definition_key {
          Some(function_key) => {
            self.store.select_plugin_function(function_key)?;
            self.store.jump_to(StepKind::ConfigurePluginAction);
          }
          None => {
            self.store.jump_to(StepKind::ChoosePluginAction);
          }
        }
      }
    }
    Ok(())
  }

  // Selection, forwarded to the store

  pub fn select_link_type(&self, link_type: ProcessLinkType) -> Result<(), WizardError> {
    self.store.select_link_type(link_type)?;
    if let Some(activity_id) = self.store.state().element_id() {
      self.notifier.notify(WizardEvent::LinkTypeSelected {
        activity_id: activity_id.to_string(),
        link_type,
      });
    }
    Ok(())
  }

  pub fn select_plugin_definition(&self, definition_key: &str) -> Result<(), WizardError> {
    self.store.select_plugin_definition(definition_key)
  }

  /// Select a plugin configuration; its definition is selected along with it.
  pub fn select_plugin_configuration(
    &self,
    configuration: &PluginConfiguration,
  ) -> Result<(), WizardError> {
    self
      .store
      .select_plugin_definition(configuration.plugin_definition_key.as_str())?;
    self
      .store
      .select_plugin_configuration(configuration.id.as_str())
  }

  pub fn select_plugin_function(&self, function_key: &str) -> Result<(), WizardError> {
    self.store.select_plugin_function(function_key)
  }

  pub fn select_form_definition(&self, id: &str) -> Result<(), WizardError> {
    self.store.select_form_definition(id)
  }

  pub fn select_form_flow_definition(&self, id: &str) -> Result<(), WizardError> {
    self.store.select_form_flow_definition(id)
  }

  pub fn next(&self) -> Result<StepKind, WizardError> {
    self.store.go_to_next_step()
  }

  pub fn back(&self) -> Result<StepKind, WizardError> {
    self.store.go_to_previous_step()
  }

  /// Hide the wizard; state is reset after the close animation.
  pub fn close(&self) {
    if let Some(activity_id) = self.store.state().element_id() {
      self.notifier.notify(WizardEvent::Closed {
        activity_id: activity_id.to_string(),
      });
    }
    self.store.close_modal();
  }

  // Catalog lookups

  /// Plugin definitions usable on the current element.
  pub async fn plugin_definitions(&self) -> Vec<PluginDefinition> {
    let Some(activity_type) = self.current_activity_type() else {
      return Vec::new();
    };
    self
      .catalog
      .list_plugin_definitions(&activity_type)
      .await
      .unwrap_or_else(|e| {
        warn!(error = %e, "plugin definition lookup failed");
        Vec::new()
      })
  }

  /// Configurations offered on the configuration step.
  ///
  /// Restricted to the selected definition, if any.
  pub async fn plugin_configurations(&self) -> Vec<PluginConfiguration> {
    let state = self.store.state();
    self
      .catalog
      .list_plugin_configurations(state.selected_plugin_definition_key())
      .await
      .unwrap_or_else(|e| {
        warn!(error = %e, "plugin configuration lookup failed");
        Vec::new()
      })
  }

  /// Look up a configuration by id across every plugin definition.
  pub async fn plugin_configuration(&self, configuration_id: &str) -> Option<PluginConfiguration> {
    match self.catalog.list_plugin_configurations(None).await {
      Ok(configurations) => configurations
        .into_iter()
        .find(|configuration| configuration.id == configuration_id),
      Err(e) => {
        warn!(error = %e, "plugin configuration lookup failed");
        None
      }
    }
  }

  /// Functions of the selected plugin definition usable on the current element.
  pub async fn plugin_functions(&self) -> Vec<PluginFunction> {
    let state = self.store.state();
    let (Some(definition_key), Some(activity_type)) = (
      state.selected_plugin_definition_key(),
      self.current_activity_type(),
    ) else {
      return Vec::new();
    };
    self
      .catalog
      .list_plugin_functions(definition_key, &activity_type)
      .await
      .unwrap_or_else(|e| {
        warn!(error = %e, "plugin function lookup failed");
        Vec::new()
      })
  }

  fn current_activity_type(&self) -> Option<String> {
    self.store.state().element().map(BpmnElement::activity_type)
  }

  // Persistence

  /// Create or update depending on the mode.
  pub async fn save(&self, action_properties: Value) -> Result<ProcessLink, WizardError> {
    match self.store.state().mode() {
      WizardMode::Create => self.on_save_configuration(action_properties).await,
      WizardMode::Edit(_) => self.on_modify_configuration(action_properties).await,
    }
  }

  /// Save a form or form-flow link; these carry no action properties.
  pub async fn save_form_link(&self) -> Result<ProcessLink, WizardError> {
    match self.store.state().selected_link_type() {
      Some(ProcessLinkType::Form | ProcessLinkType::FormFlow) => self.save(Value::Null).await,
      Some(ProcessLinkType::Plugin) => Err(WizardError::InvalidSelection {
        message: "plugin links are saved with action properties".to_string(),
      }),
      None => Err(WizardError::NoLinkTypeSelected),
    }
  }

  /// Create a new link from the current selection.
  #[instrument(name = "wizard_save", skip(self, action_properties))]
  pub async fn on_save_configuration(
    &self,
    action_properties: Value,
  ) -> Result<ProcessLink, WizardError> {
    let state = self.store.state();
    if let Some(link) = state.existing_link() {
      return Err(WizardError::AlreadyLinked {
        id: link.id.clone(),
      });
    }
    let request = self.build_save_request(&state, action_properties)?;

    let link = self
      .persist(&state, self.gateway.save_process_link(&request))
      .await?;
    info!(link_id = %link.id, activity_id = %link.activity_id, "process_link_created");
    self.notifier.notify(WizardEvent::LinkCreated { link: link.clone() });
    Ok(link)
  }

  /// Update the link being edited from the current selection.
  #[instrument(name = "wizard_modify", skip(self, action_properties))]
  pub async fn on_modify_configuration(
    &self,
    action_properties: Value,
  ) -> Result<ProcessLink, WizardError> {
    let state = self.store.state();
    let existing = state.existing_link().ok_or(WizardError::NotInEditMode)?;
    let target = self.link_target(&state, action_properties)?;
    let request = UpdateProcessLinkRequest {
      id: existing.id.clone(),
      plugin_configuration_id: target.plugin_configuration_id,
      plugin_action_definition_key: target.plugin_action_definition_key,
      action_properties: target.action_properties,
      form_definition_id: target.form_definition_id,
      form_flow_definition_id: target.form_flow_definition_id,
    };

    let link = self
      .persist(&state, self.gateway.update_process_link(&request))
      .await?;
    info!(link_id = %link.id, "process_link_updated");
    self.notifier.notify(WizardEvent::LinkUpdated { link: link.clone() });
    Ok(link)
  }

  /// Delete the link being edited.
  #[instrument(name = "wizard_delete", skip(self))]
  pub async fn on_delete(&self) -> Result<(), WizardError> {
    let state = self.store.state();
    let id = state
      .existing_link()
      .ok_or(WizardError::NotInEditMode)?
      .id
      .clone();

    self
      .persist(&state, self.gateway.delete_process_link(&id))
      .await?;
    info!(link_id = %id, "process_link_deleted");
    self.notifier.notify(WizardEvent::LinkDeleted { id });
    Ok(())
  }

  /// Run one gateway write with input disabled.
  ///
  /// Success resets the wizard immediately; failure re-enables input and
  /// leaves the selection as it was.
  async fn persist<T>(
    &self,
    state: &WizardState,
    call: impl Future<Output = Result<T, GatewayError>>,
  ) -> Result<T, WizardError> {
    self.store.start_saving()?;
    let result = call.await;
    self.store.stop_saving();

    match result {
      Ok(value) => {
        self.store.reset();
        Ok(value)
      }
      Err(e) => {
        let activity_id = state.element_id().unwrap_or_default().to_string();
        error!(activity_id = %activity_id, error = %e, "process_link_persist_failed");
        self.notifier.notify(WizardEvent::PersistFailed {
          activity_id,
          error: e.to_string(),
        });
        Err(e.into())
      }
    }
  }

  fn build_save_request(
    &self,
    state: &WizardState,
    action_properties: Value,
  ) -> Result<SaveProcessLinkRequest, WizardError> {
    let element = state.element().ok_or(WizardError::NoElement)?;
    let process_definition_id = state
      .process_definition_id()
      .ok_or(WizardError::NoElement)?;
    let process_link_type = state
      .selected_link_type()
      .ok_or(WizardError::NoLinkTypeSelected)?;
    let target = self.link_target(state, action_properties)?;

    debug!(activity_type = %element.activity_type(), "building save request");
    Ok(SaveProcessLinkRequest {
      process_definition_id: process_definition_id.to_string(),
      activity_id: element.id.clone(),
      activity_type: element.activity_type(),
      process_link_type,
      plugin_configuration_id: target.plugin_configuration_id,
      plugin_action_definition_key: target.plugin_action_definition_key,
      action_properties: target.action_properties,
      form_definition_id: target.form_definition_id,
      form_flow_definition_id: target.form_flow_definition_id,
    })
  }

  /// Resolve the selection into a link target, checking it is complete.
  fn link_target(
    &self,
    state: &WizardState,
    action_properties: Value,
  ) -> Result<LinkTarget, WizardError> {
    let link_type = state
      .selected_link_type()
      .ok_or(WizardError::NoLinkTypeSelected)?;
    let incomplete =
      |missing: &'static str| WizardError::IncompleteSelection { link_type, missing };

    let mut target = LinkTarget {
      plugin_configuration_id: None,
      plugin_action_definition_key: None,
      action_properties: None,
      form_definition_id: None,
      form_flow_definition_id: None,
    };

    match link_type {
      ProcessLinkType::Form => {
        target.form_definition_id = Some(
          state
            .form_definition_id()
            .ok_or_else(|| incomplete("form definition"))?
            .to_string(),
        );
      }
      ProcessLinkType::FormFlow => {
        target.form_flow_definition_id = Some(
          state
            .form_flow_definition_id()
            .ok_or_else(|| incomplete("form flow definition"))?
            .to_string(),
        );
      }
      ProcessLinkType::Plugin => {
        let plugin = state.plugin();
        let definition_key = plugin
          .definition_key()
          .ok_or_else(|| incomplete("plugin definition"))?;
        let configuration_id = plugin
          .configuration_id()
          .ok_or_else(|| incomplete("plugin configuration"))?;
        let function_key = plugin
          .function_key()
          .ok_or_else(|| incomplete("plugin function"))?;

        target.action_properties = Some(self.registry.configure(
          definition_key,
          function_key,
          action_properties,
        )?);
        target.plugin_configuration_id = Some(configuration_id.to_string());
        target.plugin_action_definition_key = Some(function_key.to_string());
      }
    }

    Ok(target)
  }
}
