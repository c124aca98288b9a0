//! Linkwiz Gateway
//!
//! The wizard never talks to the backend directly. It goes through two
//! traits:
//!
//! - [`LinkPersistenceGateway`] looks up, creates, updates and deletes
//!   process links.
//! - [`PluginCatalog`] lists plugin definitions, configurations and
//!   functions the wizard offers for selection.
//!
//! [`HttpGateway`] implements both against the REST backend;
//! [`InMemoryGateway`] implements both in-process for tests and demos.

mod error;
mod gateway;
mod http;
mod memory;

pub use error::GatewayError;
pub use gateway::{LinkPersistenceGateway, PluginCatalog};
pub use http::HttpGateway;
pub use memory::InMemoryGateway;
