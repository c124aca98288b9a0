use std::time::Duration;

use async_trait::async_trait;
use linkwiz_config::{
  AvailableLinkType, ClientConfig, PluginConfiguration, PluginDefinition, PluginFunction,
  ProcessLink, ProcessLinkQuery, SaveProcessLinkRequest, UpdateProcessLinkRequest,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::GatewayError;
use crate::gateway::{LinkPersistenceGateway, PluginCatalog};

const PROCESS_LINK: &[&str] = &["api", "v1", "process-link"];
const PLUGIN: &[&str] = &["api", "v1", "plugin"];

/// REST client for the process-link and plugin endpoints.
#[derive(Debug, Clone)]
pub struct HttpGateway {
  client: Client,
  base_url: Url,
  token: Option<String>,
}

impl HttpGateway {
  /// Create a gateway for the backend rooted at `base_url`.
  pub fn new(base_url: &str) -> Result<Self, GatewayError> {
    Ok(Self {
      client: Client::new(),
      base_url: parse_base_url(base_url)?,
      token: None,
    })
  }

  /// Create a gateway from client configuration.
  pub fn from_config(config: &ClientConfig) -> Result<Self, GatewayError> {
    let mut builder = Client::builder();
    if let Some(timeout_ms) = config.timeout_ms {
      builder = builder.timeout(Duration::from_millis(timeout_ms));
    }

    Ok(Self {
      client: builder.build()?,
      base_url: parse_base_url(&config.base_url)?,
      token: config.token.clone(),
    })
  }

  /// Send `Authorization: Bearer <token>` with every request.
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// Build an endpoint URL from path segments and query pairs.
  fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, GatewayError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| GatewayError::InvalidUrl {
        url: self.base_url.to_string(),
        message: "url cannot be a base".to_string(),
      })?
      .pop_if_empty()
      .extend(segments);

    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url)
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    let request = self.client.request(method, url);
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  /// Send a request and decode a JSON body.
  async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(GatewayError::Status {
        status: status.as_u16(),
        body,
      });
    }

    Ok(serde_json::from_str(&body)?)
  }
}

fn parse_base_url(base_url: &str) -> Result<Url, GatewayError> {
  Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl {
    url: base_url.to_string(),
    message: e.to_string(),
  })
}

fn join<'a>(prefix: &[&'a str], rest: &[&'a str]) -> Vec<&'a str> {
  prefix.iter().chain(rest.iter()).copied().collect()
}

#[async_trait]
impl LinkPersistenceGateway for HttpGateway {
  #[instrument(name = "get_process_link_candidates", skip(self))]
  async fn get_process_link_candidates(
    &self,
    activity_type: &str,
  ) -> Result<Vec<AvailableLinkType>, GatewayError> {
    let url = self.endpoint(
      &join(PROCESS_LINK, &["types"]),
      &[("activityType", activity_type)],
    )?;
    self.send_json(self.request(Method::GET, url)).await
  }

  #[instrument(
    name = "get_process_link",
    skip(self, query),
    fields(
      process_definition_id = %query.process_definition_id,
      activity_id = %query.activity_id,
    )
  )]
  async fn get_process_link(
    &self,
    query: &ProcessLinkQuery,
  ) -> Result<Vec<ProcessLink>, GatewayError> {
    let url = self.endpoint(
      PROCESS_LINK,
      &[
        ("processDefinitionId", query.process_definition_id.as_str()),
        ("activityId", query.activity_id.as_str()),
      ],
    )?;

    match self.send_json(self.request(Method::GET, url)).await {
      Err(GatewayError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
        debug!("no process link for activity");
        Ok(Vec::new())
      }
      other => other,
    }
  }

  #[instrument(
    name = "save_process_link",
    skip(self, request),
    fields(activity_id = %request.activity_id, link_type = %request.process_link_type)
  )]
  async fn save_process_link(
    &self,
    request: &SaveProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError> {
    let url = self.endpoint(PROCESS_LINK, &[])?;
    self
      .send_json(self.request(Method::POST, url).json(request))
      .await
  }

  #[instrument(name = "update_process_link", skip(self, request), fields(id = %request.id))]
  async fn update_process_link(
    &self,
    request: &UpdateProcessLinkRequest,
  ) -> Result<ProcessLink, GatewayError> {
    let url = self.endpoint(PROCESS_LINK, &[])?;
    self
      .send_json(self.request(Method::PUT, url).json(request))
      .await
  }

  #[instrument(name = "delete_process_link", skip(self))]
  async fn delete_process_link(&self, id: &str) -> Result<(), GatewayError> {
    let url = self.endpoint(&join(PROCESS_LINK, &[id]), &[])?;
    let response = self.request(Method::DELETE, url).send().await?;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
      return Err(GatewayError::NotFound { id: id.to_string() });
    }
    if !status.is_success() {
      return Err(GatewayError::Status {
        status: status.as_u16(),
        body: response.text().await?,
      });
    }
    Ok(())
  }
}

#[async_trait]
impl PluginCatalog for HttpGateway {
  #[instrument(name = "list_plugin_definitions", skip(self))]
  async fn list_plugin_definitions(
    &self,
    activity_type: &str,
  ) -> Result<Vec<PluginDefinition>, GatewayError> {
    let url = self.endpoint(
      &join(PLUGIN, &["definition"]),
      &[("activityType", activity_type)],
    )?;
    self.send_json(self.request(Method::GET, url)).await
  }

  #[instrument(name = "list_plugin_configurations", skip(self))]
  async fn list_plugin_configurations(
    &self,
    definition_key: Option<&str>,
  ) -> Result<Vec<PluginConfiguration>, GatewayError> {
    let query: Vec<(&str, &str)> = definition_key
      .map(|key| vec![("pluginDefinitionKey", key)])
      .unwrap_or_default();
    let url = self.endpoint(&join(PLUGIN, &["configuration"]), &query)?;
    self.send_json(self.request(Method::GET, url)).await
  }

  #[instrument(name = "list_plugin_functions", skip(self))]
  async fn list_plugin_functions(
    &self,
    definition_key: &str,
    activity_type: &str,
  ) -> Result<Vec<PluginFunction>, GatewayError> {
    let url = self.endpoint(
      &join(PLUGIN, &["definition", definition_key, "action"]),
      &[("activityType", activity_type)],
    )?;
    self.send_json(self.request(Method::GET, url)).await
  }
}
