//! Step label translation.
//!
//! Steps carry translation keys, never display text. Labels are resolved
//! against the current locale each time they are read, so switching the
//! locale re-labels steps that are already on screen without touching the
//! step structure.

use std::collections::HashMap;

use linkwiz_config::DEFAULT_LOCALE;
use tokio::sync::watch;

const EN: &[(&str, &str)] = &[
  ("processLinkSteps.chooseProcessLinkType", "Choose link type"),
  (
    "processLinkSteps.chooseProcessLinkTypeSecondary",
    "Form, form flow or plugin",
  ),
  ("processLinkSteps.selectForm", "Select form"),
  ("processLinkSteps.selectFormSecondary", "Form shown for this activity"),
  ("processLinkSteps.selectFormFlow", "Select form flow"),
  (
    "processLinkSteps.selectFormFlowSecondary",
    "Form flow started for this activity",
  ),
  (
    "processLinkSteps.choosePluginConfiguration",
    "Choose plugin configuration",
  ),
  (
    "processLinkSteps.choosePluginConfigurationSecondary",
    "Plugin instance to use",
  ),
  ("processLinkSteps.choosePluginAction", "Choose action"),
  (
    "processLinkSteps.choosePluginActionSecondary",
    "Action executed by the plugin",
  ),
  ("processLinkSteps.configurePluginAction", "Configure action"),
  (
    "processLinkSteps.configurePluginActionSecondary",
    "Action properties",
  ),
];

const NL: &[(&str, &str)] = &[
  ("processLinkSteps.chooseProcessLinkType", "Kies koppeltype"),
  (
    "processLinkSteps.chooseProcessLinkTypeSecondary",
    "Formulier, formulierflow of plugin",
  ),
  ("processLinkSteps.selectForm", "Selecteer formulier"),
  (
    "processLinkSteps.selectFormSecondary",
    "Formulier voor deze activiteit",
  ),
  ("processLinkSteps.selectFormFlow", "Selecteer formulierflow"),
  (
    "processLinkSteps.selectFormFlowSecondary",
    "Formulierflow voor deze activiteit",
  ),
  (
    "processLinkSteps.choosePluginConfiguration",
    "Kies pluginconfiguratie",
  ),
  (
    "processLinkSteps.choosePluginConfigurationSecondary",
    "Te gebruiken plugininstantie",
  ),
  ("processLinkSteps.choosePluginAction", "Kies actie"),
  (
    "processLinkSteps.choosePluginActionSecondary",
    "Actie die de plugin uitvoert",
  ),
  ("processLinkSteps.configurePluginAction", "Configureer actie"),
  (
    "processLinkSteps.configurePluginActionSecondary",
    "Actie-eigenschappen",
  ),
];

/// Translations keyed by locale, then by label key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
  entries: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
  /// Empty catalog; every lookup falls back to the key itself.
  pub fn new() -> Self {
    Self::default()
  }

  /// Catalog with the English and Dutch step labels.
  pub fn builtin() -> Self {
    let mut catalog = Self::new();
    for (key, text) in EN {
      catalog.insert("en", *key, *text);
    }
    for (key, text) in NL {
      catalog.insert("nl", *key, *text);
    }
    catalog
  }

  pub fn insert(&mut self, locale: &str, key: impl Into<String>, text: impl Into<String>) {
    self
      .entries
      .entry(locale.to_string())
      .or_default()
      .insert(key.into(), text.into());
  }

  /// Resolve a key for a locale.
  ///
  /// Falls back to the default locale, then to the key. An empty key
  /// (placeholder steps) resolves to an empty label.
  pub fn translate(&self, locale: &str, key: &str) -> String {
    if key.is_empty() {
      return String::new();
    }

    [locale, DEFAULT_LOCALE]
      .iter()
      .find_map(|l| self.entries.get(*l).and_then(|texts| texts.get(key)))
      .cloned()
      .unwrap_or_else(|| key.to_string())
  }
}

/// Live locale shared by every translated view.
#[derive(Debug)]
pub struct LocaleHandle {
  sender: watch::Sender<String>,
}

impl LocaleHandle {
  pub fn new(locale: impl Into<String>) -> Self {
    Self {
      sender: watch::Sender::new(locale.into()),
    }
  }

  pub fn current(&self) -> String {
    self.sender.borrow().clone()
  }

  /// Switch the locale. Views are woken only when the value changes.
  pub fn set(&self, locale: impl Into<String>) {
    let locale = locale.into();
    self.sender.send_if_modified(|current| {
      if *current == locale {
        return false;
      }
      *current = locale;
      true
    });
  }

  pub fn subscribe(&self) -> watch::Receiver<String> {
    self.sender.subscribe()
  }
}

impl Default for LocaleHandle {
  fn default() -> Self {
    Self::new(DEFAULT_LOCALE)
  }
}
