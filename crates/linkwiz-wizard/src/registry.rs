//! Plugin function configuration dispatch.
//!
//! Each plugin function can come with its own configuration logic that
//! checks and normalizes the action properties entered on the last wizard
//! step. Configurations are looked up by plugin definition key and function
//! key; functions without a registered configuration accept any JSON object.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::error::WizardError;

/// Errors raised while configuring a plugin function.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
  #[error("action properties must be a JSON object")]
  NotAnObject,

  #[error("missing required property '{field}'")]
  MissingField { field: String },
}

/// Validates and normalizes action properties for one plugin function.
pub trait FunctionConfiguration: Send + Sync {
  fn configure(&self, properties: Value) -> Result<Value, ConfigurationError>;
}

/// Accepts any object; `null` becomes an empty object.
#[derive(Debug, Clone, Default)]
pub struct PassThrough;

impl FunctionConfiguration for PassThrough {
  fn configure(&self, properties: Value) -> Result<Value, ConfigurationError> {
    match properties {
      Value::Null => Ok(Value::Object(Default::default())),
      Value::Object(_) => Ok(properties),
      _ => Err(ConfigurationError::NotAnObject),
    }
  }
}

/// Rejects objects where any of the listed fields is missing or `null`.
#[derive(Debug, Clone)]
pub struct RequiredFields {
  fields: Vec<String>,
}

impl RequiredFields {
  pub fn new<I, S>(fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      fields: fields.into_iter().map(Into::into).collect(),
    }
  }
}

impl FunctionConfiguration for RequiredFields {
  fn configure(&self, properties: Value) -> Result<Value, ConfigurationError> {
    let properties = PassThrough.configure(properties)?;
    for field in &self.fields {
      if properties.get(field).is_none_or(Value::is_null) {
        return Err(ConfigurationError::MissingField {
          field: field.clone(),
        });
      }
    }
    Ok(properties)
  }
}

type Factory = Box<dyn Fn() -> Box<dyn FunctionConfiguration> + Send + Sync>;

/// Map from `(plugin definition key, function key)` to a configuration factory.
#[derive(Default)]
pub struct FunctionConfigurationRegistry {
  factories: HashMap<(String, String), Factory>,
}

impl FunctionConfigurationRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a factory. A later registration for the same keys replaces the earlier one.
  pub fn register<F>(
    &mut self,
    definition_key: impl Into<String>,
    function_key: impl Into<String>,
    factory: F,
  ) where
    F: Fn() -> Box<dyn FunctionConfiguration> + Send + Sync + 'static,
  {
    self
      .factories
      .insert((definition_key.into(), function_key.into()), Box::new(factory));
  }

  pub fn contains(&self, definition_key: &str, function_key: &str) -> bool {
    self
      .factories
      .contains_key(&(definition_key.to_string(), function_key.to_string()))
  }

  /// Instantiate the configuration for a function, or [`PassThrough`].
  pub fn resolve(&self, definition_key: &str, function_key: &str) -> Box<dyn FunctionConfiguration> {
    match self
      .factories
      .get(&(definition_key.to_string(), function_key.to_string()))
    {
      Some(factory) => factory(),
      None => Box::new(PassThrough),
    }
  }

  /// Run the function's configuration over `properties`.
  pub fn configure(
    &self,
    definition_key: &str,
    function_key: &str,
    properties: Value,
  ) -> Result<Value, WizardError> {
    self
      .resolve(definition_key, function_key)
      .configure(properties)
      .map_err(|e| WizardError::InvalidActionProperties {
        function_key: function_key.to_string(),
        message: e.to_string(),
      })
  }
}

impl std::fmt::Debug for FunctionConfigurationRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FunctionConfigurationRegistry")
      .field("functions", &self.factories.keys().collect::<Vec<_>>())
      .finish()
  }
}
