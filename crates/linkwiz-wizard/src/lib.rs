//! Linkwiz Wizard
//!
//! State machine behind the process-link wizard: linking a BPMN activity to
//! a form, a form flow or a plugin action.
//!
//! - [`WizardStateStore`] holds the selection and publishes every change.
//! - [`StepSequencer`] tracks the ordered steps and the current one.
//! - [`ButtonVisibilityController`] tracks the back, next and save buttons.
//! - [`ProcessLinkWizard`] wires the store to a [`linkwiz_gateway`] backend.
//!
//! All observable state lives in `tokio::sync::watch` channels; subscribers
//! always see the latest value.

mod buttons;
mod error;
mod events;
mod i18n;
mod registry;
mod selection;
mod state;
mod steps;
mod store;
mod transition;
mod wizard;

pub use buttons::{Button, ButtonKind, ButtonState, ButtonVisibilityController};
pub use error::WizardError;
pub use events::{ChannelNotifier, NoopNotifier, WizardEvent, WizardNotifier};
pub use i18n::{Catalog, LocaleHandle};
pub use registry::{
  ConfigurationError, FunctionConfiguration, FunctionConfigurationRegistry, PassThrough,
  RequiredFields,
};
pub use selection::PluginSelection;
pub use state::{WizardMode, WizardState};
pub use steps::{
  StepKind, StepSequence, StepSequencer, TranslatedStep, TranslatedSteps, WizardStep,
};
pub use store::{MODAL_CLOSE_ANIMATION, WizardStateStore};
pub use transition::{Transition, initial_steps, transition_for};
pub use wizard::ProcessLinkWizard;
