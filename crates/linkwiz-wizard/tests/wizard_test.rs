//! End-to-end wizard tests against the in-memory gateway.

use std::sync::Arc;
use std::time::Duration;

use linkwiz_config::{
  AvailableLinkType, BpmnElement, PluginConfiguration, PluginDefinition, PluginFunction,
  ProcessLink, ProcessLinkType,
};
use linkwiz_gateway::InMemoryGateway;
use linkwiz_wizard::{
  ButtonKind, Catalog, ChannelNotifier, FunctionConfigurationRegistry, LocaleHandle,
  MODAL_CLOSE_ANIMATION, ProcessLinkWizard, RequiredFields, StepKind, WizardError, WizardEvent,
  WizardMode,
};
use serde_json::json;
use tokio::sync::mpsc;

const PROCESS_DEFINITION_ID: &str = "loan-approval:3:8f2c";

fn types(list: &[ProcessLinkType]) -> Vec<AvailableLinkType> {
  list.iter().copied().map(AvailableLinkType::new).collect()
}

fn service_task() -> BpmnElement {
  BpmnElement::new("send-confirmation", "Send confirmation", "bpmn:ServiceTask")
}

fn user_task() -> BpmnElement {
  BpmnElement::new("review-application", "Review application", "bpmn:UserTask")
}

fn with_smtp(gateway: InMemoryGateway) -> InMemoryGateway {
  gateway.with_plugin(
    PluginDefinition {
      key: "smtp".to_string(),
      title: "SMTP".to_string(),
      description: String::new(),
    },
    vec![PluginConfiguration {
      id: "smtp-prod".to_string(),
      title: "Production mail".to_string(),
      plugin_definition_key: "smtp".to_string(),
    }],
    vec![PluginFunction {
      key: "send-mail".to_string(),
      title: "Send mail".to_string(),
      description: String::new(),
    }],
  )
}

fn wizard(gateway: &Arc<InMemoryGateway>) -> ProcessLinkWizard {
  ProcessLinkWizard::new(gateway.clone(), gateway.clone())
}

fn existing_plugin_link() -> ProcessLink {
  ProcessLink {
    id: "link-42".to_string(),
    process_definition_id: PROCESS_DEFINITION_ID.to_string(),
    activity_id: "send-confirmation".to_string(),
    activity_type: "bpmn:ServiceTask:start".to_string(),
    process_link_type: ProcessLinkType::Plugin,
    plugin_configuration_id: Some("smtp-prod".to_string()),
    plugin_action_definition_key: Some("send-mail".to_string()),
    action_properties: Some(json!({ "to": "old@example.com" })),
    form_definition_id: None,
    form_flow_definition_id: None,
  }
}

#[tokio::test]
async fn test_single_plugin_type_skips_choice() {
  let gateway = Arc::new(with_smtp(InMemoryGateway::new().with_candidates(
    "bpmn:ServiceTask:start",
    types(&[ProcessLinkType::Plugin]),
  )));
  let wizard = wizard(&gateway);

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let store = wizard.store();
  assert_eq!(store.state().selected_link_type(), Some(ProcessLinkType::Plugin));
  assert!(store.state().modal_open());

  let sequence = store.step_sequence();
  assert_eq!(sequence.current, 0);
  assert_eq!(
    sequence.current_kind(),
    Some(StepKind::ChoosePluginConfiguration)
  );
  assert!(sequence.position(StepKind::ChooseLinkType).is_none());

  let buttons = store.button_state();
  assert!(!buttons.is_visible(ButtonKind::Back));
  assert!(!buttons.is_visible(ButtonKind::Save));
  assert!(buttons.is_visible(ButtonKind::Next));
  assert!(!buttons.is_enabled(ButtonKind::Next));
}

#[tokio::test]
async fn test_several_types_start_on_choice() {
  let gateway = Arc::new(InMemoryGateway::new().with_candidates(
    "bpmn:UserTask:create",
    types(&[ProcessLinkType::Form, ProcessLinkType::FormFlow]),
  ));
  let wizard = wizard(&gateway);

  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();

  let sequence = wizard.store().step_sequence();
  assert_eq!(sequence.current, 0);
  assert_eq!(sequence.steps[0].kind, StepKind::ChooseLinkType);
  assert!(!sequence.steps[0].disabled);
  assert!(sequence.steps[1..].iter().all(|s| s.disabled));
  assert_eq!(wizard.state().selected_link_type(), None);
}

#[tokio::test]
async fn test_create_plugin_link() {
  let gateway = Arc::new(with_smtp(InMemoryGateway::new().with_candidates(
    "bpmn:ServiceTask:start",
    types(&[ProcessLinkType::Plugin]),
  )));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let wizard =
    ProcessLinkWizard::with_notifier(gateway.clone(), gateway.clone(), ChannelNotifier::new(tx));

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let configurations = wizard.plugin_configurations().await;
  assert_eq!(configurations.len(), 1);
  wizard.select_plugin_configuration(&configurations[0]).unwrap();
  assert_eq!(wizard.next().unwrap(), StepKind::ChoosePluginAction);

  let functions = wizard.plugin_functions().await;
  assert_eq!(functions[0].key, "send-mail");
  wizard.select_plugin_function(&functions[0].key).unwrap();
  assert_eq!(wizard.next().unwrap(), StepKind::ConfigurePluginAction);

  let link = wizard
    .save(json!({ "to": "applicant@example.com" }))
    .await
    .unwrap();
  assert_eq!(link.plugin_configuration_id.as_deref(), Some("smtp-prod"));
  assert_eq!(link.plugin_action_definition_key.as_deref(), Some("send-mail"));

  let request = &gateway.save_requests()[0];
  assert_eq!(request.activity_type, "bpmn:ServiceTask:start");
  assert_eq!(request.activity_id, "send-confirmation");
  assert_eq!(
    request.action_properties,
    Some(json!({ "to": "applicant@example.com" }))
  );
  assert!(wizard.state().is_default());

  assert!(matches!(rx.recv().await, Some(WizardEvent::Opened { editing: false, .. })));
  assert!(matches!(rx.recv().await, Some(WizardEvent::LinkCreated { .. })));
}

#[tokio::test]
async fn test_user_task_form_link_uses_create_suffix() {
  let gateway = Arc::new(InMemoryGateway::new().with_candidates(
    "bpmn:UserTask:create",
    types(&[ProcessLinkType::Form, ProcessLinkType::Plugin]),
  ));
  let wizard = wizard(&gateway);

  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();
  wizard.select_link_type(ProcessLinkType::Form).unwrap();
  assert!(!wizard.store().button_state().is_enabled(ButtonKind::Save));

  wizard.select_form_definition("review-form").unwrap();
  assert!(wizard.store().button_state().is_enabled(ButtonKind::Save));

  let link = wizard.save_form_link().await.unwrap();
  assert_eq!(link.activity_type, "bpmn:UserTask:create");
  assert_eq!(link.form_definition_id.as_deref(), Some("review-form"));
  assert_eq!(link.plugin_configuration_id, None);
}

#[tokio::test]
async fn test_existing_link_opens_in_edit_mode() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  let wizard = wizard(&gateway);

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let state = wizard.state();
  assert!(matches!(state.mode(), WizardMode::Edit(link) if link.id == "link-42"));
  assert_eq!(state.selected_plugin_definition_key(), Some("smtp"));
  assert_eq!(state.selected_plugin_configuration_id(), Some("smtp-prod"));
  assert_eq!(state.selected_plugin_function_key(), Some("send-mail"));
  assert_eq!(
    wizard.store().step_sequence().current_kind(),
    Some(StepKind::ConfigurePluginAction)
  );

  let updated = wizard
    .on_modify_configuration(json!({ "to": "new@example.com" }))
    .await
    .unwrap();
  assert_eq!(updated.id, "link-42");

  let requests = gateway.update_requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].id, "link-42");
  assert_eq!(
    gateway.links()[0].action_properties,
    Some(json!({ "to": "new@example.com" }))
  );
  assert!(gateway.save_requests().is_empty());
}

#[tokio::test]
async fn test_create_is_rejected_in_edit_mode() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let err = wizard.on_save_configuration(json!({})).await.unwrap_err();
  assert!(matches!(err, WizardError::AlreadyLinked { id } if id == "link-42"));
}

#[tokio::test]
async fn test_delete_existing_link() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  wizard.on_delete().await.unwrap();
  assert_eq!(gateway.delete_requests(), vec!["link-42".to_string()]);
  assert!(gateway.links().is_empty());
  assert!(wizard.state().is_default());
}

#[tokio::test]
async fn test_delete_requires_edit_mode() {
  let gateway = Arc::new(InMemoryGateway::new());
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  assert!(matches!(
    wizard.on_delete().await,
    Err(WizardError::NotInEditMode)
  ));
  assert!(gateway.delete_requests().is_empty());
}

#[tokio::test]
async fn test_edit_mode_rejects_another_link_type() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates(
        "bpmn:ServiceTask:start",
        types(&[ProcessLinkType::Form, ProcessLinkType::Plugin]),
      )
      .with_link(existing_plugin_link()),
  ));
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let err = wizard.select_link_type(ProcessLinkType::Form).unwrap_err();
  assert!(matches!(
    err,
    WizardError::LinkTypeLocked { ref id, link_type: ProcessLinkType::Plugin } if id == "link-42"
  ));

  wizard.select_form_definition("review-form").unwrap();
  assert!(wizard.save_form_link().await.is_err());

  let state = wizard.state();
  assert_eq!(state.selected_link_type(), Some(ProcessLinkType::Plugin));
  assert_eq!(state.selected_plugin_configuration_id(), Some("smtp-prod"));
  assert!(gateway.update_requests().is_empty());
  let stored = &gateway.links()[0];
  assert_eq!(stored.process_link_type, ProcessLinkType::Plugin);
  assert_eq!(stored.form_definition_id, None);
}

#[tokio::test]
async fn test_configuration_of_another_plugin_is_found() {
  let gateway = Arc::new(
    with_smtp(
      InMemoryGateway::new()
        .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
        .with_link(existing_plugin_link()),
    )
    .with_plugin(
      PluginDefinition {
        key: "documents".to_string(),
        title: "Documents".to_string(),
        description: String::new(),
      },
      vec![PluginConfiguration {
        id: "documents-main".to_string(),
        title: "Main archive".to_string(),
        plugin_definition_key: "documents".to_string(),
      }],
      vec![PluginFunction {
        key: "store-document".to_string(),
        title: "Store document".to_string(),
        description: String::new(),
      }],
    ),
  );
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let offered = wizard.plugin_configurations().await;
  assert!(offered.iter().all(|c| c.plugin_definition_key == "smtp"));

  let configuration = wizard.plugin_configuration("documents-main").await.unwrap();
  assert_eq!(configuration.plugin_definition_key, "documents");
  assert!(wizard.plugin_configuration("missing").await.is_none());

  wizard.select_plugin_configuration(&configuration).unwrap();
  assert_eq!(wizard.state().selected_plugin_definition_key(), Some("documents"));
  assert_eq!(wizard.state().selected_plugin_function_key(), None);
  wizard.select_plugin_function("store-document").unwrap();

  let link = wizard
    .on_modify_configuration(json!({ "path": "/loans" }))
    .await
    .unwrap();
  assert_eq!(link.id, "link-42");
  assert_eq!(link.plugin_configuration_id.as_deref(), Some("documents-main"));
  assert_eq!(
    gateway.update_requests()[0].plugin_action_definition_key.as_deref(),
    Some("store-document")
  );
}

#[tokio::test]
async fn test_failed_update_keeps_edit_mode() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let wizard =
    ProcessLinkWizard::with_notifier(gateway.clone(), gateway.clone(), ChannelNotifier::new(tx));
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();
  assert!(matches!(rx.recv().await, Some(WizardEvent::Opened { editing: true, .. })));

  gateway.set_fail_writes(true);
  let err = wizard
    .on_modify_configuration(json!({ "to": "new@example.com" }))
    .await
    .unwrap_err();
  assert!(matches!(err, WizardError::Gateway(_)));
  assert_eq!(gateway.update_requests().len(), 1);

  let state = wizard.state();
  assert!(!state.saving());
  assert!(!state.input_disabled());
  assert!(matches!(state.mode(), WizardMode::Edit(link) if link.id == "link-42"));
  assert_eq!(state.selected_plugin_function_key(), Some("send-mail"));
  assert!(!wizard.store().step_sequence().navigation_locked);
  assert_eq!(
    gateway.links()[0].action_properties,
    Some(json!({ "to": "old@example.com" }))
  );
  assert!(matches!(
    rx.recv().await,
    Some(WizardEvent::PersistFailed { activity_id, .. }) if activity_id == "send-confirmation"
  ));
}

#[tokio::test]
async fn test_failed_delete_keeps_edit_mode() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  let (tx, mut rx) = mpsc::unbounded_channel();
  let wizard =
    ProcessLinkWizard::with_notifier(gateway.clone(), gateway.clone(), ChannelNotifier::new(tx));
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();
  assert!(matches!(rx.recv().await, Some(WizardEvent::Opened { .. })));

  gateway.set_fail_writes(true);
  let err = wizard.on_delete().await.unwrap_err();
  assert!(matches!(err, WizardError::Gateway(_)));
  assert_eq!(gateway.delete_requests(), vec!["link-42".to_string()]);
  assert_eq!(gateway.links().len(), 1);

  let state = wizard.state();
  assert!(!state.saving());
  assert!(!state.input_disabled());
  assert!(state.modal_open());
  assert!(matches!(state.mode(), WizardMode::Edit(link) if link.id == "link-42"));
  assert!(matches!(
    rx.recv().await,
    Some(WizardEvent::PersistFailed { .. })
  ));

  gateway.set_fail_writes(false);
  wizard.on_delete().await.unwrap();
  assert!(gateway.links().is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_selection() {
  let gateway = Arc::new(InMemoryGateway::new().with_candidates(
    "bpmn:UserTask:create",
    types(&[ProcessLinkType::Form]),
  ));
  let wizard = wizard(&gateway);
  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();
  wizard.select_form_definition("review-form").unwrap();

  gateway.set_fail_writes(true);
  let err = wizard.save(json!({})).await.unwrap_err();
  assert!(matches!(err, WizardError::Gateway(_)));
  assert_eq!(gateway.save_requests().len(), 1);

  let state = wizard.state();
  assert!(!state.saving());
  assert!(!state.input_disabled());
  assert_eq!(state.form_definition_id(), Some("review-form"));
  assert!(!wizard.store().step_sequence().navigation_locked);
  assert!(wizard.store().button_state().is_enabled(ButtonKind::Save));

  gateway.set_fail_writes(false);
  wizard.save(json!({})).await.unwrap();
  assert_eq!(gateway.links().len(), 1);
}

#[tokio::test]
async fn test_lookup_failures_open_empty_create_mode() {
  let gateway = Arc::new(with_smtp(
    InMemoryGateway::new()
      .with_candidates("bpmn:ServiceTask:start", types(&[ProcessLinkType::Plugin]))
      .with_link(existing_plugin_link()),
  ));
  gateway.set_fail_lookups(true);
  let wizard = wizard(&gateway);

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let state = wizard.state();
  assert_eq!(state.mode(), &WizardMode::Create);
  assert!(state.modal_open());
  assert!(wizard.store().available_link_types().is_empty());
  assert!(wizard.plugin_definitions().await.is_empty());
}

#[tokio::test]
async fn test_incomplete_plugin_selection_is_rejected() {
  let gateway = Arc::new(with_smtp(InMemoryGateway::new().with_candidates(
    "bpmn:ServiceTask:start",
    types(&[ProcessLinkType::Plugin]),
  )));
  let wizard = wizard(&gateway);
  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();

  let configurations = wizard.plugin_configurations().await;
  wizard.select_plugin_configuration(&configurations[0]).unwrap();

  let err = wizard.save(json!({})).await.unwrap_err();
  assert!(matches!(
    err,
    WizardError::IncompleteSelection {
      missing: "plugin function",
      ..
    }
  ));
  assert!(gateway.save_requests().is_empty());
}

#[tokio::test]
async fn test_registered_configuration_validates_properties() {
  let gateway = Arc::new(with_smtp(InMemoryGateway::new().with_candidates(
    "bpmn:ServiceTask:start",
    types(&[ProcessLinkType::Plugin]),
  )));
  let mut registry = FunctionConfigurationRegistry::new();
  registry.register("smtp", "send-mail", || Box::new(RequiredFields::new(["to"])));
  let wizard = wizard(&gateway).with_registry(registry);

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();
  let configurations = wizard.plugin_configurations().await;
  wizard.select_plugin_configuration(&configurations[0]).unwrap();
  wizard.next().unwrap();
  wizard.select_plugin_function("send-mail").unwrap();
  wizard.next().unwrap();

  let err = wizard.save(json!({ "subject": "Hi" })).await.unwrap_err();
  assert!(matches!(err, WizardError::InvalidActionProperties { .. }));
  assert!(gateway.save_requests().is_empty());

  wizard.save(json!({ "to": "a@example.com" })).await.unwrap();
  assert_eq!(gateway.save_requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_close_resets_after_animation() {
  let gateway = Arc::new(InMemoryGateway::new().with_candidates(
    "bpmn:UserTask:create",
    types(&[ProcessLinkType::Form, ProcessLinkType::FormFlow]),
  ));
  let wizard = wizard(&gateway);
  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();
  wizard.select_link_type(ProcessLinkType::FormFlow).unwrap();

  wizard.close();
  let state = wizard.state();
  assert!(!state.modal_open());
  assert_eq!(state.selected_link_type(), Some(ProcessLinkType::FormFlow));

  tokio::time::sleep(MODAL_CLOSE_ANIMATION + Duration::from_millis(1)).await;
  assert!(wizard.state().is_default());
}

#[tokio::test(start_paused = true)]
async fn test_reopen_during_close_animation() {
  let gateway = Arc::new(InMemoryGateway::new().with_candidates(
    "bpmn:UserTask:create",
    types(&[ProcessLinkType::Form, ProcessLinkType::FormFlow]),
  ));
  let wizard = wizard(&gateway);
  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();

  wizard.close();
  tokio::time::sleep(Duration::from_millis(120)).await;
  wizard.open(user_task(), PROCESS_DEFINITION_ID).await.unwrap();
  wizard.select_link_type(ProcessLinkType::Form).unwrap();

  tokio::time::sleep(MODAL_CLOSE_ANIMATION * 2).await;
  let state = wizard.state();
  assert!(state.modal_open());
  assert_eq!(state.selected_link_type(), Some(ProcessLinkType::Form));
}

#[tokio::test]
async fn test_locale_change_relabels_steps() {
  let gateway = Arc::new(with_smtp(InMemoryGateway::new().with_candidates(
    "bpmn:ServiceTask:start",
    types(&[ProcessLinkType::Plugin]),
  )));
  let wizard = wizard(&gateway);
  let locale = LocaleHandle::default();
  let mut view = wizard
    .store()
    .steps()
    .translated(locale.subscribe(), Arc::new(Catalog::builtin()));

  wizard
    .open(service_task(), PROCESS_DEFINITION_ID)
    .await
    .unwrap();
  let before = view.current();
  assert_eq!(before[0].label, "Choose plugin configuration");

  locale.set("nl");
  view.changed().await.unwrap();
  let after = view.current();
  assert_eq!(after[0].label, "Kies pluginconfiguratie");
  assert_eq!(
    before.iter().map(|s| (s.kind, s.disabled)).collect::<Vec<_>>(),
    after.iter().map(|s| (s.kind, s.disabled)).collect::<Vec<_>>()
  );
  assert_eq!(view.current_index(), 0);
}
