//! Wizard step sequencing.
//!
//! The step list is derived state: the store rebuilds it from the available
//! link types and the selected type, and nothing else edits it. Steps carry
//! translation keys; [`TranslatedSteps`] resolves them on read.

use std::sync::Arc;

use linkwiz_config::AvailableLinkType;
use serde::Serialize;
use tokio::sync::watch;

use crate::i18n::Catalog;
use crate::transition::{initial_steps, transition_for};

/// What a step asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
  ChooseLinkType,
  SelectForm,
  SelectFormFlow,
  ChoosePluginConfiguration,
  ChoosePluginAction,
  ConfigurePluginAction,
  /// Placeholder for a step that depends on a choice not made yet.
  Empty,
}

impl StepKind {
  pub fn label_key(&self) -> &'static str {
    match self {
      StepKind::ChooseLinkType => "processLinkSteps.chooseProcessLinkType",
      StepKind::SelectForm => "processLinkSteps.selectForm",
      StepKind::SelectFormFlow => "processLinkSteps.selectFormFlow",
      StepKind::ChoosePluginConfiguration => "processLinkSteps.choosePluginConfiguration",
      StepKind::ChoosePluginAction => "processLinkSteps.choosePluginAction",
      StepKind::ConfigurePluginAction => "processLinkSteps.configurePluginAction",
      StepKind::Empty => "",
    }
  }

  pub fn secondary_label_key(&self) -> &'static str {
    match self {
      StepKind::ChooseLinkType => "processLinkSteps.chooseProcessLinkTypeSecondary",
      StepKind::SelectForm => "processLinkSteps.selectFormSecondary",
      StepKind::SelectFormFlow => "processLinkSteps.selectFormFlowSecondary",
      StepKind::ChoosePluginConfiguration => {
        "processLinkSteps.choosePluginConfigurationSecondary"
      }
      StepKind::ChoosePluginAction => "processLinkSteps.choosePluginActionSecondary",
      StepKind::ConfigurePluginAction => "processLinkSteps.configurePluginActionSecondary",
      StepKind::Empty => "",
    }
  }
}

/// One entry in the wizard's progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStep {
  pub kind: StepKind,
  /// Translation key of the main label.
  pub label: String,
  /// Translation key of the secondary label.
  pub secondary_label: String,
  pub disabled: bool,
}

impl WizardStep {
  pub fn new(kind: StepKind, disabled: bool) -> Self {
    Self {
      kind,
      label: kind.label_key().to_string(),
      secondary_label: kind.secondary_label_key().to_string(),
      disabled,
    }
  }

  pub fn enabled(kind: StepKind) -> Self {
    Self::new(kind, false)
  }

  pub fn disabled(kind: StepKind) -> Self {
    Self::new(kind, true)
  }
}

/// The ordered steps plus the one currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSequence {
  pub steps: Vec<WizardStep>,
  pub current: usize,
  /// Set while saving; the progress indicator must not be clickable.
  pub navigation_locked: bool,
}

impl StepSequence {
  pub fn current_step(&self) -> Option<&WizardStep> {
    self.steps.get(self.current)
  }

  pub fn current_kind(&self) -> Option<StepKind> {
    self.current_step().map(|step| step.kind)
  }

  /// Index of the first step of the given kind.
  pub fn position(&self, kind: StepKind) -> Option<usize> {
    self.steps.iter().position(|step| step.kind == kind)
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// Owns the step sequence and publishes every change.
#[derive(Debug)]
pub struct StepSequencer {
  sequence: watch::Sender<StepSequence>,
}

impl StepSequencer {
  pub fn new() -> Self {
    Self {
      sequence: watch::Sender::new(StepSequence::default()),
    }
  }

  pub fn subscribe(&self) -> watch::Receiver<StepSequence> {
    self.sequence.subscribe()
  }

  pub fn sequence(&self) -> StepSequence {
    self.sequence.borrow().clone()
  }

  /// Steps shown when the wizard opens.
  ///
  /// With several link types the user first chooses one: slot 0 is the
  /// choice, slots 1 and 2 are disabled placeholders. With a single type
  /// the choice is skipped and that type's own steps are shown.
  pub fn set_initial_steps(&self, available: &[AvailableLinkType]) {
    match available {
      [] => self.reset(),
      [only] => {
        let transition = transition_for(only.process_link_type, true);
        self.set_steps(transition.steps, transition.current);
      }
      _ => self.set_steps(initial_steps(), 0),
    }
  }

  /// Replace the whole sequence.
  pub fn set_steps(&self, steps: Vec<WizardStep>, current: usize) {
    self.sequence.send_modify(|sequence| {
      sequence.current = current.min(steps.len().saturating_sub(1));
      sequence.steps = steps;
    });
  }

  /// Move to a step, enabling it. Out-of-range indexes are ignored.
  pub fn set_current_step(&self, index: usize) -> bool {
    self.sequence.send_if_modified(|sequence| {
      let Some(step) = sequence.steps.get_mut(index) else {
        return false;
      };
      step.disabled = false;
      sequence.current = index;
      true
    })
  }

  pub fn enable_step(&self, index: usize) {
    self.set_step_disabled(index, false);
  }

  pub fn disable_step(&self, index: usize) {
    self.set_step_disabled(index, true);
  }

  fn set_step_disabled(&self, index: usize, disabled: bool) {
    self.sequence.send_if_modified(|sequence| match sequence.steps.get_mut(index) {
      Some(step) if step.disabled != disabled => {
        step.disabled = disabled;
        true
      }
      _ => false,
    });
  }

  pub fn lock_navigation(&self) {
    self.sequence.send_modify(|sequence| sequence.navigation_locked = true);
  }

  pub fn unlock_navigation(&self) {
    self.sequence.send_modify(|sequence| sequence.navigation_locked = false);
  }

  /// Clear to an empty sequence.
  pub fn reset(&self) {
    self.sequence.send_replace(StepSequence::default());
  }

  /// A view whose labels follow the given locale.
  pub fn translated(
    &self,
    locale: watch::Receiver<String>,
    catalog: Arc<Catalog>,
  ) -> TranslatedSteps {
    TranslatedSteps {
      steps: self.subscribe(),
      locale,
      catalog,
    }
  }
}

impl Default for StepSequencer {
  fn default() -> Self {
    Self::new()
  }
}

/// A step with its labels resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedStep {
  pub kind: StepKind,
  pub label: String,
  pub secondary_label: String,
  pub disabled: bool,
}

/// Display view over the step sequence.
pub struct TranslatedSteps {
  steps: watch::Receiver<StepSequence>,
  locale: watch::Receiver<String>,
  catalog: Arc<Catalog>,
}

impl TranslatedSteps {
  /// Steps with labels resolved against the locale as of now.
  pub fn current(&self) -> Vec<TranslatedStep> {
    let locale = self.locale.borrow().clone();
    self
      .steps
      .borrow()
      .steps
      .iter()
      .map(|step| TranslatedStep {
        kind: step.kind,
        label: self.catalog.translate(&locale, &step.label),
        secondary_label: self.catalog.translate(&locale, &step.secondary_label),
        disabled: step.disabled,
      })
      .collect()
  }

  pub fn current_index(&self) -> usize {
    self.steps.borrow().current
  }

  /// Wait until either the steps or the locale change.
  pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
    tokio::select! {
      result = self.steps.changed() => result,
      result = self.locale.changed() => result,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use linkwiz_config::ProcessLinkType;

  fn types(list: &[ProcessLinkType]) -> Vec<AvailableLinkType> {
    list.iter().copied().map(AvailableLinkType::new).collect()
  }

  #[test]
  fn test_initial_steps_with_several_types() {
    let sequencer = StepSequencer::new();
    sequencer.set_initial_steps(&types(&[ProcessLinkType::Form, ProcessLinkType::Plugin]));

    let sequence = sequencer.sequence();
    assert_eq!(sequence.current, 0);
    assert_eq!(
      sequence.steps,
      vec![
        WizardStep::enabled(StepKind::ChooseLinkType),
        WizardStep::disabled(StepKind::Empty),
        WizardStep::disabled(StepKind::Empty),
      ]
    );
  }

  #[test]
  fn test_initial_steps_with_single_type_skips_choice() {
    let sequencer = StepSequencer::new();
    sequencer.set_initial_steps(&types(&[ProcessLinkType::Plugin]));

    let sequence = sequencer.sequence();
    assert_eq!(
      sequence.current_kind(),
      Some(StepKind::ChoosePluginConfiguration)
    );
    assert!(sequence.position(StepKind::ChooseLinkType).is_none());
  }

  #[test]
  fn test_initial_steps_without_types_is_empty() {
    let sequencer = StepSequencer::new();
    sequencer.set_initial_steps(&types(&[ProcessLinkType::Form, ProcessLinkType::Plugin]));
    sequencer.set_initial_steps(&[]);
    assert!(sequencer.sequence().is_empty());
  }

  #[test]
  fn test_set_current_step_enables_target() {
    let sequencer = StepSequencer::new();
    sequencer.set_steps(
      vec![
        WizardStep::enabled(StepKind::ChoosePluginConfiguration),
        WizardStep::disabled(StepKind::ChoosePluginAction),
      ],
      0,
    );

    assert!(sequencer.set_current_step(1));
    assert!(!sequencer.set_current_step(5));

    let sequence = sequencer.sequence();
    assert_eq!(sequence.current, 1);
    assert!(!sequence.steps[1].disabled);
  }

  #[tokio::test]
  async fn test_locale_switch_relabels_without_restructuring() {
    let sequencer = StepSequencer::new();
    sequencer.set_initial_steps(&types(&[ProcessLinkType::Form, ProcessLinkType::Plugin]));

    let (locale_tx, locale_rx) = watch::channel("en".to_string());
    let mut view = sequencer.translated(locale_rx, Arc::new(Catalog::builtin()));
    let structure_before = sequencer.sequence();

    assert_eq!(view.current()[0].label, "Choose link type");

    locale_tx.send("nl".to_string()).unwrap();
    view.changed().await.unwrap();

    assert_eq!(view.current()[0].label, "Kies koppeltype");
    assert_eq!(view.current()[1].label, "");
    assert_eq!(sequencer.sequence(), structure_before);
  }
}
