//! The wizard's single source of truth.
//!
//! [`WizardStateStore`] owns the selection state, the step sequencer and the
//! footer buttons. Its setters are the only mutation path; every change is
//! published through `watch` channels so a renderer sees it on the same
//! tick.
//!
//! Closing the modal does not reset immediately: the reset is deferred by
//! [`MODAL_CLOSE_ANIMATION`] so the closing transition never shows a blank
//! wizard. The deferred reset is a cancellable task; reopening the modal,
//! closing it again, or resetting explicitly cancels the pending one.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use linkwiz_config::{AvailableLinkType, BpmnElement, ProcessLink, ProcessLinkType};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buttons::{ButtonKind, ButtonState, ButtonVisibilityController};
use crate::error::WizardError;
use crate::state::{WizardMode, WizardState};
use crate::steps::{StepKind, StepSequence, StepSequencer};
use crate::transition::transition_for;

/// Length of the modal close transition. State is reset once it has finished.
pub const MODAL_CLOSE_ANIMATION: Duration = Duration::from_millis(240);

/// Shared handle to the wizard state. Clones refer to the same store.
#[derive(Clone)]
pub struct WizardStateStore {
  inner: Arc<Inner>,
}

struct Inner {
  state: watch::Sender<WizardState>,
  available: watch::Sender<Vec<AvailableLinkType>>,
  steps: StepSequencer,
  buttons: ButtonVisibilityController,
  pending_reset: Mutex<Option<CancellationToken>>,
}

impl WizardStateStore {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(Inner {
        state: watch::Sender::new(WizardState::default()),
        available: watch::Sender::new(Vec::new()),
        steps: StepSequencer::new(),
        buttons: ButtonVisibilityController::default(),
        pending_reset: Mutex::new(None),
      }),
    }
  }

  // Read side

  pub fn state(&self) -> WizardState {
    self.inner.state.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<WizardState> {
    self.inner.state.subscribe()
  }

  pub fn available_link_types(&self) -> Vec<AvailableLinkType> {
    self.inner.available.borrow().clone()
  }

  pub fn subscribe_available_link_types(&self) -> watch::Receiver<Vec<AvailableLinkType>> {
    self.inner.available.subscribe()
  }

  /// True when exactly one link type is available and the choice step is skipped.
  pub fn has_single_option(&self) -> bool {
    self.inner.available.borrow().len() == 1
  }

  pub fn steps(&self) -> &StepSequencer {
    &self.inner.steps
  }

  pub fn buttons(&self) -> &ButtonVisibilityController {
    &self.inner.buttons
  }

  pub fn step_sequence(&self) -> StepSequence {
    self.inner.steps.sequence()
  }

  pub fn button_state(&self) -> ButtonState {
    self.inner.buttons.state()
  }

  // Element and mode

  /// Record the element being linked.
  pub fn set_element(&self, element: BpmnElement, process_definition_id: impl Into<String>) {
    let process_definition_id = process_definition_id.into();
    self.inner.state.send_modify(|state| {
      state.element = Some(element);
      state.process_definition_id = Some(process_definition_id);
    });
  }

  /// Edit `link` instead of creating a new one.
  pub fn enter_edit_mode(&self, link: ProcessLink) {
    debug!(link_id = %link.id, "wizard_edit_mode");
    self
      .inner
      .state
      .send_modify(|state| state.mode = WizardMode::Edit(link));
  }

  pub fn enter_create_mode(&self) {
    self
      .inner
      .state
      .send_modify(|state| state.mode = WizardMode::Create);
  }

  // Link type

  /// Store the link types offered for the element.
  ///
  /// A single type is selected right away; several types start the wizard
  /// on the choose-type step.
  pub fn set_available_link_types(&self, types: Vec<AvailableLinkType>) {
    let single = match types.as_slice() {
      [only] => Some(only.process_link_type),
      _ => None,
    };
    self.inner.steps.set_initial_steps(&types);
    self.inner.available.send_replace(types);

    match single {
      Some(link_type) => self.apply_link_type(link_type),
      None => self.inner.buttons.reset_buttons(),
    }
  }

  /// Select a link type and rebuild steps and buttons from the policy table.
  ///
  /// Outside edit mode the type must be one of the available ones. In edit
  /// mode only the existing link's type is accepted, since an update cannot
  /// change it.
  pub fn select_link_type(&self, link_type: ProcessLinkType) -> Result<(), WizardError> {
    self.ensure_input_enabled()?;

    match self.state().existing_link() {
      Some(link) if link.process_link_type != link_type => {
        return Err(WizardError::LinkTypeLocked {
          id: link.id.clone(),
          link_type: link.process_link_type,
        });
      }
      Some(_) => {}
      None => {
        let available = self.inner.available.borrow();
        if !available.iter().any(|t| t.process_link_type == link_type) {
          return Err(WizardError::InvalidSelection {
            message: format!("link type '{}' is not available for this activity", link_type),
          });
        }
      }
    }

    self.apply_link_type(link_type);
    Ok(())
  }

  fn apply_link_type(&self, link_type: ProcessLinkType) {
    let single = self.has_single_option();
    self.inner.state.send_modify(|state| {
      if state.selected_link_type != Some(link_type) {
        clear_targets(state);
      }
      state.selected_link_type = Some(link_type);
    });

    let transition = transition_for(link_type, single);
    self.inner.steps.set_steps(transition.steps, transition.current);
    self.sync_buttons();

    debug!(link_type = %link_type, single_option = single, "link_type_selected");
  }

  /// Go back to choosing a link type, dropping everything chosen after it.
  pub fn deselect_link_type(&self) -> Result<(), WizardError> {
    self.ensure_input_enabled()?;
    self.inner.state.send_modify(|state| {
      state.selected_link_type = None;
      clear_targets(state);
    });
    let available = self.available_link_types();
    self.inner.steps.set_initial_steps(&available);
    if available.len() == 1 {
      self.apply_link_type(available[0].process_link_type);
    } else {
      self.inner.buttons.reset_buttons();
    }
    Ok(())
  }

  // Plugin selection

  pub fn select_plugin_definition(&self, key: impl Into<String>) -> Result<(), WizardError> {
    let key = key.into();
    self.modify_selection(|state| {
      state.plugin.select_definition(key);
      Ok(())
    })
  }

  pub fn select_plugin_configuration(&self, id: impl Into<String>) -> Result<(), WizardError> {
    let id = id.into();
    self.modify_selection(|state| state.plugin.select_configuration(id))
  }

  pub fn select_plugin_function(&self, key: impl Into<String>) -> Result<(), WizardError> {
    let key = key.into();
    self.modify_selection(|state| state.plugin.select_function(key))
  }

  pub fn deselect_plugin_definition(&self) -> Result<(), WizardError> {
    self.modify_selection(|state| {
      state.plugin.deselect_definition();
      Ok(())
    })
  }

  pub fn deselect_plugin_configuration(&self) -> Result<(), WizardError> {
    self.modify_selection(|state| {
      state.plugin.deselect_configuration();
      Ok(())
    })
  }

  pub fn deselect_plugin_function(&self) -> Result<(), WizardError> {
    self.modify_selection(|state| {
      state.plugin.deselect_function();
      Ok(())
    })
  }

  // Form selection

  pub fn select_form_definition(&self, id: impl Into<String>) -> Result<(), WizardError> {
    let id = id.into();
    self.modify_selection(|state| {
      state.form_definition_id = Some(id);
      Ok(())
    })
  }

  pub fn select_form_flow_definition(&self, id: impl Into<String>) -> Result<(), WizardError> {
    let id = id.into();
    self.modify_selection(|state| {
      state.form_flow_definition_id = Some(id);
      Ok(())
    })
  }

  fn modify_selection(
    &self,
    apply: impl FnOnce(&mut WizardState) -> Result<(), WizardError>,
  ) -> Result<(), WizardError> {
    self.ensure_input_enabled()?;

    let mut result = Ok(());
    self.inner.state.send_if_modified(|state| {
      let before = state.clone();
      result = apply(state);
      *state != before
    });
    result?;

    self.sync_buttons();
    Ok(())
  }

  // Navigation

  /// Advance the plugin flow by one step.
  ///
  /// Fails when the current step's selection is missing.
  pub fn go_to_next_step(&self) -> Result<StepKind, WizardError> {
    self.ensure_input_enabled()?;
    let state = self.state();
    let current = self.step_sequence().current_kind();

    let target = match current {
      Some(StepKind::ChooseLinkType) => {
        let link_type = state
          .selected_link_type
          .ok_or(WizardError::NoLinkTypeSelected)?;
        self.apply_link_type(link_type);
        return self
          .step_sequence()
          .current_kind()
          .ok_or(WizardError::NoLinkTypeSelected);
      }
      Some(StepKind::ChoosePluginConfiguration) => {
        if state.plugin.configuration_id().is_none() {
          return Err(WizardError::IncompleteSelection {
            link_type: ProcessLinkType::Plugin,
            missing: "plugin configuration",
          });
        }
        StepKind::ChoosePluginAction
      }
      Some(StepKind::ChoosePluginAction) => {
        if state.plugin.function_key().is_none() {
          return Err(WizardError::IncompleteSelection {
            link_type: ProcessLinkType::Plugin,
            missing: "plugin function",
          });
        }
        StepKind::ConfigurePluginAction
      }
      other => {
        return Err(WizardError::InvalidSelection {
          message: format!("no step follows {:?}", other),
        });
      }
    };

    self.jump_to(target);
    Ok(target)
  }

  /// Step back, clearing the selection made on the step being left.
  pub fn go_to_previous_step(&self) -> Result<StepKind, WizardError> {
    self.ensure_input_enabled()?;
    let sequence = self.step_sequence();
    let current = sequence.current_kind();

    if sequence.current == 0 {
      return Err(WizardError::InvalidSelection {
        message: format!("no step precedes {:?}", current),
      });
    }

    match current {
      Some(StepKind::ChoosePluginAction) => self.deselect_plugin_function()?,
      Some(StepKind::ChoosePluginConfiguration) => self.deselect_plugin_definition()?,
      Some(StepKind::SelectForm) => self
        .inner
        .state
        .send_modify(|state| state.form_definition_id = None),
      Some(StepKind::SelectFormFlow) => self
        .inner
        .state
        .send_modify(|state| state.form_flow_definition_id = None),
      _ => {}
    }

    let target = sequence.steps[sequence.current - 1].kind;
    if target == StepKind::ChooseLinkType {
      self.deselect_link_type()?;
    } else {
      self.jump_to(target);
    }
    Ok(target)
  }

  /// Make `kind` the current step, enabling it and every step before it
  /// and disabling the ones after it.
  pub fn jump_to(&self, kind: StepKind) -> bool {
    let Some(index) = self.step_sequence().position(kind) else {
      return false;
    };
    let len = self.step_sequence().steps.len();
    for i in 0..len {
      if i <= index {
        self.inner.steps.enable_step(i);
      } else {
        self.inner.steps.disable_step(i);
      }
    }
    self.inner.steps.set_current_step(index);
    self.sync_buttons();
    true
  }

  /// Derive footer buttons from the current step and selection.
  fn sync_buttons(&self) {
    let state = self.state();
    let buttons = &self.inner.buttons;

    let Some(link_type) = state.selected_link_type else {
      buttons.reset_buttons();
      return;
    };
    let entry = transition_for(link_type, self.has_single_option());

    // (back, next, save) visibility, then (next, save) enablement
    let ((back, next, save), (next_enabled, save_enabled)) =
      match self.step_sequence().current_kind() {
        Some(StepKind::SelectForm) => {
          let chosen = state.form_definition_id.is_some();
          ((entry.back, entry.next, entry.save || chosen), (false, chosen))
        }
        Some(StepKind::SelectFormFlow) => {
          let chosen = state.form_flow_definition_id.is_some();
          ((entry.back, entry.next, entry.save || chosen), (false, chosen))
        }
        Some(StepKind::ChoosePluginConfiguration) => (
          (entry.back, entry.next, entry.save),
          (state.plugin.configuration_id().is_some(), false),
        ),
        Some(StepKind::ChoosePluginAction) => (
          (true, true, false),
          (state.plugin.function_key().is_some(), false),
        ),
        Some(StepKind::ConfigurePluginAction) => ((true, false, true), (false, true)),
        _ => {
          buttons.reset_buttons();
          return;
        }
      };

    buttons.set_visible(ButtonKind::Back, back);
    buttons.enable(ButtonKind::Back);
    buttons.set_visible(ButtonKind::Next, next);
    buttons.set_enabled(ButtonKind::Next, next_enabled);
    buttons.set_visible(ButtonKind::Save, save);
    buttons.set_enabled(ButtonKind::Save, save_enabled);
  }

  // Modal

  /// Show the modal, cancelling a reset still pending from a previous close.
  pub fn show_modal(&self) {
    let mut pending = self.inner.pending_reset.lock().unwrap();
    cancel(&mut pending);
    self.inner.state.send_modify(|state| state.modal_open = true);
  }

  /// Hide the modal now and reset all state once the close animation is over.
  ///
  /// Outside a tokio runtime there is nothing to defer on, so the reset
  /// happens right away.
  pub fn close_modal(&self) {
    self.inner.state.send_modify(|state| state.modal_open = false);

    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      debug!("no runtime, resetting wizard without close animation");
      self.reset();
      return;
    };

    let token = CancellationToken::new();
    if let Some(previous) = self.inner.pending_reset.lock().unwrap().replace(token.clone()) {
      previous.cancel();
    }

    let store = self.clone();
    runtime.spawn(async move {
      tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(MODAL_CLOSE_ANIMATION) => store.run_pending_reset(&token),
      }
    });
  }

  /// True while a deferred reset has been scheduled and not yet run.
  pub fn reset_pending(&self) -> bool {
    self.inner.pending_reset.lock().unwrap().is_some()
  }

  /// Run the deferred reset unless it was cancelled.
  ///
  /// The pending-reset lock is held until the reset is done, so a concurrent
  /// `show_modal` or `reset` either lands before it (and cancels it) or after
  /// it (and is kept).
  fn run_pending_reset(&self, token: &CancellationToken) {
    let mut pending = self.inner.pending_reset.lock().unwrap();
    if token.is_cancelled() {
      return;
    }
    *pending = None;
    debug!("wizard_reset_after_close");
    self.reset_now();
  }

  /// Reset everything immediately.
  pub fn reset(&self) {
    let mut pending = self.inner.pending_reset.lock().unwrap();
    cancel(&mut pending);
    self.reset_now();
  }

  fn reset_now(&self) {
    self.inner.state.send_replace(WizardState::default());
    self.inner.available.send_replace(Vec::new());
    self.inner.steps.reset();
    self.inner.buttons.reset_buttons();
  }

  // Saving

  /// Mark a save as in flight: input and navigation are disabled.
  pub fn start_saving(&self) -> Result<(), WizardError> {
    let mut already = false;
    self.inner.state.send_modify(|state| {
      already = state.saving;
      state.saving = true;
      state.input_disabled = true;
    });
    if already {
      return Err(WizardError::Busy);
    }

    self.inner.steps.lock_navigation();
    self.inner.buttons.lock();
    Ok(())
  }

  /// Re-enable input and navigation after a save attempt.
  pub fn stop_saving(&self) {
    self.inner.state.send_modify(|state| {
      state.saving = false;
      state.input_disabled = false;
    });
    self.inner.steps.unlock_navigation();
    self.inner.buttons.unlock();
  }

  fn ensure_input_enabled(&self) -> Result<(), WizardError> {
    if self.inner.state.borrow().input_disabled {
      return Err(WizardError::Busy);
    }
    Ok(())
  }
}

impl Default for WizardStateStore {
  fn default() -> Self {
    Self::new()
  }
}

fn cancel(pending: &mut Option<CancellationToken>) {
  if let Some(token) = pending.take() {
    token.cancel();
  }
}

/// Drop every link target (plugin, form, form flow).
fn clear_targets(state: &mut WizardState) {
  state.plugin.deselect_definition();
  state.form_definition_id = None;
  state.form_flow_definition_id = None;
}
