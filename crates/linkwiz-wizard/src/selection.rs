//! Hierarchical plugin selection.
//!
//! A plugin function can only be chosen once a configuration is chosen, and
//! a configuration only once a definition is chosen. Encoding the levels as
//! variants makes an orphaned child selection unrepresentable: deselecting a
//! level drops everything below it.

use serde::Serialize;

use crate::error::WizardError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum PluginSelection {
  #[default]
  None,
  Definition {
    definition_key: String,
  },
  Configuration {
    definition_key: String,
    configuration_id: String,
  },
  Function {
    definition_key: String,
    configuration_id: String,
    function_key: String,
  },
}

impl PluginSelection {
  pub fn definition_key(&self) -> Option<&str> {
    match self {
      PluginSelection::None => None,
      PluginSelection::Definition { definition_key }
      | PluginSelection::Configuration { definition_key, .. }
      | PluginSelection::Function { definition_key, .. } => Some(definition_key),
    }
  }

  pub fn configuration_id(&self) -> Option<&str> {
    match self {
      PluginSelection::Configuration {
        configuration_id, ..
      }
      | PluginSelection::Function {
        configuration_id, ..
      } => Some(configuration_id),
      _ => None,
    }
  }

  pub fn function_key(&self) -> Option<&str> {
    match self {
      PluginSelection::Function { function_key, .. } => Some(function_key),
      _ => None,
    }
  }

  /// Select a definition.
  ///
  /// Re-selecting the current definition keeps the selections below it;
  /// any other key replaces the whole subtree.
  pub fn select_definition(&mut self, key: impl Into<String>) {
    let key = key.into();
    if self.definition_key() == Some(key.as_str()) {
      return;
    }
    *self = PluginSelection::Definition {
      definition_key: key,
    };
  }

  /// Select a configuration of the current definition.
  pub fn select_configuration(&mut self, id: impl Into<String>) -> Result<(), WizardError> {
    let id = id.into();
    let definition_key = self
      .definition_key()
      .ok_or_else(|| WizardError::InvalidSelection {
        message: format!("configuration '{}' selected without a plugin definition", id),
      })?
      .to_string();

    if self.configuration_id() == Some(id.as_str()) {
      return Ok(());
    }
    *self = PluginSelection::Configuration {
      definition_key,
      configuration_id: id,
    };
    Ok(())
  }

  /// Select a function of the current configuration.
  pub fn select_function(&mut self, key: impl Into<String>) -> Result<(), WizardError> {
    let key = key.into();
    let (definition_key, configuration_id) = match self {
      PluginSelection::Configuration {
        definition_key,
        configuration_id,
      }
      | PluginSelection::Function {
        definition_key,
        configuration_id,
        ..
      } => (definition_key.clone(), configuration_id.clone()),
      _ => {
        return Err(WizardError::InvalidSelection {
          message: format!("function '{}' selected without a plugin configuration", key),
        });
      }
    };

    *self = PluginSelection::Function {
      definition_key,
      configuration_id,
      function_key: key,
    };
    Ok(())
  }

  /// Clear the definition and everything below it.
  pub fn deselect_definition(&mut self) {
    *self = PluginSelection::None;
  }

  /// Clear the configuration and the function; the definition stays.
  pub fn deselect_configuration(&mut self) {
    *self = match std::mem::take(self) {
      PluginSelection::Configuration { definition_key, .. }
      | PluginSelection::Function { definition_key, .. } => {
        PluginSelection::Definition { definition_key }
      }
      other => other,
    };
  }

  /// Clear the function; definition and configuration stay.
  pub fn deselect_function(&mut self) {
    *self = match std::mem::take(self) {
      PluginSelection::Function {
        definition_key,
        configuration_id,
        ..
      } => PluginSelection::Configuration {
        definition_key,
        configuration_id,
      },
      other => other,
    };
  }

  pub fn is_complete(&self) -> bool {
    matches!(self, PluginSelection::Function { .. })
  }
}
