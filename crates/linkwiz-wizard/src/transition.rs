//! Fixed step/button policy per link type.
//!
//! | type      | single | steps                                                   | back   | next   | save   |
//! |-----------|--------|---------------------------------------------------------|--------|--------|--------|
//! | form      | yes    | select form                                             | hidden | hidden | hidden |
//! | form      | no     | choose type, select form                                | shown  | hidden | shown  |
//! | form-flow | yes    | select form flow                                        | hidden | hidden | hidden |
//! | form-flow | no     | choose type, select form flow                           | shown  | hidden | shown  |
//! | plugin    | yes    | configuration, action, configure action                 | hidden | shown  | hidden |
//! | plugin    | no     | choose type, configuration, action, configure action    | shown  | shown  | hidden |
//!
//! Visibility only; whether a shown button is enabled depends on the
//! selection and is decided by the store.

use linkwiz_config::ProcessLinkType;

use crate::steps::{StepKind, WizardStep};

/// One row of the policy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  pub steps: Vec<WizardStep>,
  pub current: usize,
  pub back: bool,
  pub next: bool,
  pub save: bool,
}

/// The choose-type step followed by two disabled placeholders.
pub fn initial_steps() -> Vec<WizardStep> {
  vec![
    WizardStep::enabled(StepKind::ChooseLinkType),
    WizardStep::disabled(StepKind::Empty),
    WizardStep::disabled(StepKind::Empty),
  ]
}

/// Steps and button visibility after selecting `link_type`.
pub fn transition_for(link_type: ProcessLinkType, single_option: bool) -> Transition {
  let type_steps = match link_type {
    ProcessLinkType::Form => vec![WizardStep::enabled(StepKind::SelectForm)],
    ProcessLinkType::FormFlow => vec![WizardStep::enabled(StepKind::SelectFormFlow)],
    ProcessLinkType::Plugin => vec![
      WizardStep::enabled(StepKind::ChoosePluginConfiguration),
      WizardStep::disabled(StepKind::ChoosePluginAction),
      WizardStep::disabled(StepKind::ConfigurePluginAction),
    ],
  };
  let is_plugin = link_type == ProcessLinkType::Plugin;

  if single_option {
    Transition {
      steps: type_steps,
      current: 0,
      back: false,
      next: is_plugin,
      save: false,
    }
  } else {
    let mut steps = vec![WizardStep::enabled(StepKind::ChooseLinkType)];
    steps.extend(type_steps);
    Transition {
      steps,
      current: 1,
      back: true,
      next: is_plugin,
      save: !is_plugin,
    }
  }
}
