use serde_json::json;

use super::*;
use crate::error::ActionError;
use crate::types::{Action, ActionType};

#[test]
fn test_missing_action_type_is_null_action() {
    let record = json!({ "reasoning": "nothing to do" });
    let action = parse_action(&record).unwrap();
    assert!(matches!(action, Action::NullAction { .. }));
    assert_eq!(action.common().reasoning.as_deref(), Some("nothing to do"));

    let record = json!({ "action_type": null });
    assert!(matches!(parse_action(&record).unwrap(), Action::NullAction { .. }));
}

#[test]
fn test_unknown_action_type_errors() {
    let record = json!({ "action_type": "hover", "id": 1 });
    assert!(matches!(
        parse_action(&record),
        Err(ActionError::UnsupportedActionType(_))
    ));
}

#[test]
fn test_action_type_is_case_insensitive() {
    let record = json!({ "action_type": "Click", "id": "a1" });
    assert_eq!(parse_action(&record).unwrap().action_type(), ActionType::Click);
}

#[test]
fn test_element_id_coercion() {
    let record = json!({ "id": 42, "action_type": "click" });
    let action = parse_action(&record).unwrap();
    assert_eq!(action.element_id(), Some("42"));

    let record = json!({ "element_id": "42", "action_type": "click" });
    let action = parse_action(&record).unwrap();
    assert_eq!(action.element_id(), Some("42"));
}

#[test]
fn test_id_takes_precedence_over_element_id() {
    let record = json!({ "id": "1", "element_id": "2", "action_type": "click" });
    assert_eq!(parse_action(&record).unwrap().element_id(), Some("1"));
}

#[test]
fn test_click_without_element_fails() {
    let record = json!({ "action_type": "click" });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));
}

#[test]
fn test_input_text_requires_text_presence() {
    let record = json!({ "action_type": "input_text", "id": 5 });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));

    // Empty string is a valid value; absence is not.
    let record = json!({ "action_type": "input_text", "id": 5, "text": "" });
    let action = parse_action(&record).unwrap();
    assert!(matches!(action, Action::InputText { ref text, .. } if text.is_empty()));
}

#[test]
fn test_select_option_needs_one_of_label_value_index() {
    let record = json!({ "action_type": "select_option", "id": 9 });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));

    let record = json!({ "action_type": "select_option", "id": 9, "option": {} });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));

    for option in [json!({"label": "US"}), json!({"value": "us"}), json!({"index": 3})] {
        let record = json!({ "action_type": "select_option", "id": 9, "option": option });
        let action = parse_action(&record).unwrap();
        assert!(matches!(action, Action::SelectOption { .. }));
    }
}

#[test]
fn test_checkbox_requires_explicit_boolean() {
    let record = json!({ "action_type": "checkbox", "id": 2 });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));

    for checked in [true, false] {
        let record = json!({ "action_type": "checkbox", "id": 2, "is_checked": checked });
        let action = parse_action(&record).unwrap();
        assert!(matches!(action, Action::Checkbox { is_checked, .. } if is_checked == checked));
    }
}

#[test]
fn test_upload_file_requires_file_url() {
    let record = json!({ "action_type": "upload_file", "id": 4 });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));

    let record = json!({ "action_type": "upload_file", "id": 4, "file_url": "https://example.com/a.pdf" });
    let action = parse_action(&record).unwrap();
    assert!(matches!(action, Action::UploadFile { is_upload_file_tag: true, .. }));
}

#[test]
fn test_terminate_collects_user_errors() {
    let record = json!({
        "action_type": "terminate",
        "reasoning": "blocked by captcha",
        "errors": [
            { "error_code": "captcha", "reasoning": "unsolvable", "confidence_float": 0.9 }
        ]
    });
    let action = parse_action(&record).unwrap();
    match action {
        Action::Terminate { errors, .. } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].error_code, "captcha");
        }
        other => panic!("expected terminate, got {other:?}"),
    }
}

#[test]
fn test_complete_keeps_extraction_goal() {
    let record = json!({
        "action_type": "complete",
        "data_extraction_goal": "order confirmation number"
    });
    let action = parse_action(&record).unwrap();
    match action {
        Action::Complete {
            errors,
            data_extraction_goal,
            ..
        } => {
            assert!(errors.is_empty());
            assert_eq!(data_extraction_goal.as_deref(), Some("order confirmation number"));
        }
        other => panic!("expected complete, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_confidence_is_rejected() {
    let record = json!({ "action_type": "wait", "confidence_float": -0.1 });
    assert!(matches!(parse_action(&record), Err(ActionError::Validation(_))));
}

#[test]
fn test_batch_skips_bad_records() {
    let records = vec![
        json!({ "action_type": "click", "id": 1 }),
        json!({ "action_type": "hover", "id": 2 }),
        json!({ "action_type": "checkbox", "id": 3 }),
        json!({ "action_type": "input_text", "id": 4, "text": "hello" }),
        json!({ "action_type": 17 }),
    ];
    let actions = parse_actions(&records);
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].action_type(), ActionType::Click);
    assert_eq!(actions[1].action_type(), ActionType::InputText);
}

#[test]
fn test_batch_keeps_terminate_in_output() {
    let records = vec![
        json!({ "action_type": "terminate", "reasoning": "goal unreachable" }),
        json!({ "action_type": "wait" }),
    ];
    let actions = parse_actions(&records);
    assert_eq!(actions.len(), 2);
    assert!(actions[0].is_decisive());
}

#[test]
fn test_batch_of_empty_input_is_empty() {
    assert!(parse_actions(&[]).is_empty());
}
