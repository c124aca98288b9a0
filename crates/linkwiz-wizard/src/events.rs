//! Wizard lifecycle events and notifiers.
//!
//! Events let consumers observe the wizard without polling its state:
//! audit logs, toasts, refreshing a process diagram once a link is saved.

use linkwiz_config::{ProcessLink, ProcessLinkType};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by [`crate::ProcessLinkWizard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
  /// The wizard was opened for an activity.
  Opened { activity_id: String, editing: bool },

  /// A link type was chosen.
  LinkTypeSelected {
    activity_id: String,
    link_type: ProcessLinkType,
  },

  /// A new link was stored.
  LinkCreated { link: ProcessLink },

  /// An existing link was updated.
  LinkUpdated { link: ProcessLink },

  /// A link was deleted.
  LinkDeleted { id: String },

  /// A save, update or delete failed; input has been re-enabled.
  PersistFailed { activity_id: String, error: String },

  /// The wizard was closed without saving.
  Closed { activity_id: String },
}

/// Receives wizard events.
pub trait WizardNotifier: Send + Sync {
  fn notify(&self, event: WizardEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl WizardNotifier for NoopNotifier {
  fn notify(&self, _event: WizardEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded: at most a handful of events per wizard session.
  sender: mpsc::UnboundedSender<WizardEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<WizardEvent>) -> Self {
    Self { sender }
  }
}

impl WizardNotifier for ChannelNotifier {
  fn notify(&self, event: WizardEvent) {
    // receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
