use thiserror::Error;

/// Errors returned by gateway implementations.
#[derive(Debug, Error)]
pub enum GatewayError {
  /// The request could not be sent or the response could not be read.
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The backend answered with a non-success status.
  #[error("backend returned status {status}: {body}")]
  Status { status: u16, body: String },

  /// The configured base URL cannot be used to build endpoints.
  #[error("invalid base url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  /// The response body did not match the expected shape.
  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// The process link does not exist.
  #[error("process link not found: {id}")]
  NotFound { id: String },

  /// The backend is unreachable (used by the in-memory gateway to simulate outages).
  #[error("backend unavailable: {message}")]
  Unavailable { message: String },
}
