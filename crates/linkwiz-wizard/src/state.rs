use linkwiz_config::{BpmnElement, ProcessLink, ProcessLinkType};
use serde::Serialize;

use crate::selection::PluginSelection;

/// Whether the wizard creates a new link or edits an existing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", content = "link", rename_all = "snake_case")]
pub enum WizardMode {
  #[default]
  Create,
  Edit(ProcessLink),
}

/// Snapshot of everything the wizard has selected.
///
/// Only [`crate::WizardStateStore`] mutates this; consumers receive clones
/// or borrow it through a watch receiver.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
  pub(crate) selected_link_type: Option<ProcessLinkType>,
  pub(crate) plugin: PluginSelection,
  pub(crate) form_definition_id: Option<String>,
  pub(crate) form_flow_definition_id: Option<String>,
  pub(crate) element: Option<BpmnElement>,
  pub(crate) process_definition_id: Option<String>,
  pub(crate) mode: WizardMode,
  pub(crate) modal_open: bool,
  pub(crate) saving: bool,
  pub(crate) input_disabled: bool,
}

impl WizardState {
  pub fn selected_link_type(&self) -> Option<ProcessLinkType> {
    self.selected_link_type
  }

  pub fn plugin(&self) -> &PluginSelection {
    &self.plugin
  }

  pub fn selected_plugin_definition_key(&self) -> Option<&str> {
    self.plugin.definition_key()
  }

  pub fn selected_plugin_configuration_id(&self) -> Option<&str> {
    self.plugin.configuration_id()
  }

  pub fn selected_plugin_function_key(&self) -> Option<&str> {
    self.plugin.function_key()
  }

  pub fn form_definition_id(&self) -> Option<&str> {
    self.form_definition_id.as_deref()
  }

  pub fn form_flow_definition_id(&self) -> Option<&str> {
    self.form_flow_definition_id.as_deref()
  }

  pub fn element(&self) -> Option<&BpmnElement> {
    self.element.as_ref()
  }

  pub fn element_id(&self) -> Option<&str> {
    self.element.as_ref().map(|e| e.id.as_str())
  }

  pub fn element_name(&self) -> Option<&str> {
    self.element.as_ref().map(|e| e.name.as_str())
  }

  pub fn process_definition_id(&self) -> Option<&str> {
    self.process_definition_id.as_deref()
  }

  pub fn mode(&self) -> &WizardMode {
    &self.mode
  }

  /// The link being edited, if any.
  pub fn existing_link(&self) -> Option<&ProcessLink> {
    match &self.mode {
      WizardMode::Edit(link) => Some(link),
      WizardMode::Create => None,
    }
  }

  pub fn modal_open(&self) -> bool {
    self.modal_open
  }

  pub fn saving(&self) -> bool {
    self.saving
  }

  pub fn input_disabled(&self) -> bool {
    self.input_disabled
  }

  /// True when nothing differs from a freshly opened wizard.
  pub fn is_default(&self) -> bool {
    *self == WizardState::default()
  }
}
