//! Footer button flags.
//!
//! A plain flag bag: the store decides what to show, this only stores and
//! publishes it.

use serde::Serialize;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
  Back,
  Next,
  Save,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Button {
  pub visible: bool,
  pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ButtonState {
  pub back: Button,
  pub next: Button,
  pub save: Button,
  /// Set while saving; overrides every `enabled` flag.
  pub locked: bool,
}

impl ButtonState {
  pub fn button(&self, kind: ButtonKind) -> Button {
    match kind {
      ButtonKind::Back => self.back,
      ButtonKind::Next => self.next,
      ButtonKind::Save => self.save,
    }
  }

  fn button_mut(&mut self, kind: ButtonKind) -> &mut Button {
    match kind {
      ButtonKind::Back => &mut self.back,
      ButtonKind::Next => &mut self.next,
      ButtonKind::Save => &mut self.save,
    }
  }

  pub fn is_visible(&self, kind: ButtonKind) -> bool {
    self.button(kind).visible
  }

  /// Whether the button can be clicked right now.
  pub fn is_enabled(&self, kind: ButtonKind) -> bool {
    self.button(kind).enabled && !self.locked
  }
}

#[derive(Debug)]
pub struct ButtonVisibilityController {
  state: watch::Sender<ButtonState>,
}

impl ButtonVisibilityController {
  pub fn new() -> Self {
    Self {
      state: watch::Sender::new(ButtonState::default()),
    }
  }

  pub fn subscribe(&self) -> watch::Receiver<ButtonState> {
    self.state.subscribe()
  }

  pub fn state(&self) -> ButtonState {
    *self.state.borrow()
  }

  pub fn show(&self, kind: ButtonKind) {
    self.update(kind, |button| button.visible = true);
  }

  pub fn hide(&self, kind: ButtonKind) {
    self.update(kind, |button| button.visible = false);
  }

  pub fn enable(&self, kind: ButtonKind) {
    self.update(kind, |button| button.enabled = true);
  }

  pub fn disable(&self, kind: ButtonKind) {
    self.update(kind, |button| button.enabled = false);
  }

  pub fn set_visible(&self, kind: ButtonKind, visible: bool) {
    self.update(kind, |button| button.visible = visible);
  }

  pub fn set_enabled(&self, kind: ButtonKind, enabled: bool) {
    self.update(kind, |button| button.enabled = enabled);
  }

  pub fn lock(&self) {
    self.state.send_if_modified(|state| !std::mem::replace(&mut state.locked, true));
  }

  pub fn unlock(&self) {
    self.state.send_if_modified(|state| std::mem::replace(&mut state.locked, false));
  }

  /// Back and save hidden, next hidden and disabled.
  pub fn reset_buttons(&self) {
    self.state.send_replace(ButtonState {
      back: Button {
        visible: false,
        enabled: true,
      },
      next: Button {
        visible: false,
        enabled: false,
      },
      save: Button {
        visible: false,
        enabled: true,
      },
      locked: false,
    });
  }

  fn update(&self, kind: ButtonKind, apply: impl FnOnce(&mut Button)) {
    self.state.send_if_modified(|state| {
      let button = state.button_mut(kind);
      let before = *button;
      apply(button);
      *button != before
    });
  }
}

impl Default for ButtonVisibilityController {
  fn default() -> Self {
    let controller = Self::new();
    controller.reset_buttons();
    controller
  }
}
