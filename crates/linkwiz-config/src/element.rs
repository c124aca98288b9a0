use serde::{Deserialize, Serialize};

/// BPMN element type of a user task.
pub const USER_TASK: &str = "bpmn:UserTask";

/// The BPMN element a process link is being configured for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmnElement {
  /// Activity id within the process definition.
  pub id: String,
  #[serde(default)]
  pub name: String,
  /// BPMN type, e.g. `bpmn:ServiceTask`.
  pub element_type: String,
}

impl BpmnElement {
  pub fn new(
    id: impl Into<String>,
    name: impl Into<String>,
    element_type: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      element_type: element_type.into(),
    }
  }

  /// Activity type as sent in create requests.
  pub fn activity_type(&self) -> String {
    activity_type_with_suffix(&self.element_type)
  }
}

/// Append the lifecycle suffix the backend expects on an activity type.
///
/// User tasks are linked on `:create`; every other activity on `:start`.
pub fn activity_type_with_suffix(element_type: &str) -> String {
  if element_type == USER_TASK {
    format!("{}:create", element_type)
  } else {
    format!("{}:start", element_type)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_user_task_gets_create_suffix() {
    assert_eq!(activity_type_with_suffix("bpmn:UserTask"), "bpmn:UserTask:create");
  }

  #[test]
  fn test_other_activities_get_start_suffix() {
    assert_eq!(
      activity_type_with_suffix("bpmn:ServiceTask"),
      "bpmn:ServiceTask:start"
    );
    assert_eq!(
      activity_type_with_suffix("bpmn:CallActivity"),
      "bpmn:CallActivity:start"
    );
  }

  #[test]
  fn test_element_activity_type() {
    let element = BpmnElement::new("review", "Review", "bpmn:UserTask");
    assert!(element.activity_type().ends_with(":create"));
  }
}
