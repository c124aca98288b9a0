//! Linkwiz Config
//!
//! Serializable types shared by the gateway and the wizard: process links,
//! the requests that create and update them, plugin metadata and the BPMN
//! element a link is attached to. Wire shapes are camelCase JSON, matching
//! the REST backend.
//!
//! Also holds [`ClientConfig`], the JSON configuration file the CLI reads
//! to find the backend.

mod client;
mod element;
mod link;
mod plugin;

pub use client::{ClientConfig, ConfigError, DEFAULT_LOCALE};
pub use element::{BpmnElement, USER_TASK, activity_type_with_suffix};
pub use link::{
  AvailableLinkType, ProcessLink, ProcessLinkQuery, ProcessLinkType, SaveProcessLinkRequest,
  UpdateProcessLinkRequest,
};
pub use plugin::{PluginConfiguration, PluginDefinition, PluginFunction};
