//! Wizard error types.

use linkwiz_config::ProcessLinkType;
use linkwiz_gateway::GatewayError;

/// Errors that can occur while driving the wizard.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
  /// A selection was attempted without its parent being selected.
  #[error("invalid selection: {message}")]
  InvalidSelection { message: String },

  /// The wizard was used before `open` recorded a BPMN element.
  #[error("no BPMN element is being linked")]
  NoElement,

  /// A save was attempted before a link type was chosen.
  #[error("no process link type selected")]
  NoLinkTypeSelected,

  /// A save was attempted before the selection for the link type was complete.
  #[error("selection incomplete for {link_type} link: missing {missing}")]
  IncompleteSelection {
    link_type: ProcessLinkType,
    missing: &'static str,
  },

  /// Modify or delete was attempted outside edit mode.
  #[error("wizard is not editing an existing process link")]
  NotInEditMode,

  /// Create was attempted while an existing link is being edited.
  #[error("activity already has process link '{id}'")]
  AlreadyLinked { id: String },

  /// An existing link cannot change its type; it has to be deleted first.
  #[error("process link '{id}' is a {link_type} link; delete it to link another type")]
  LinkTypeLocked {
    id: String,
    link_type: ProcessLinkType,
  },

  /// A save is already in flight.
  #[error("a save is already in progress")]
  Busy,

  /// Action properties were rejected by the function's configuration.
  #[error("invalid action properties for '{function_key}': {message}")]
  InvalidActionProperties {
    function_key: String,
    message: String,
  },

  /// The gateway call failed.
  #[error("gateway error: {0}")]
  Gateway(#[from] GatewayError),
}
