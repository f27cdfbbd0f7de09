//! Parser from untyped LLM records to validated [`Action`] values.

use serde_json::Value;
use tracing::{error, warn};

use crate::error::ActionError;
use crate::types::{Action, ActionCommon, ActionType, SelectOption, UserDefinedError};

/// Resolve the targeted element id from `id` (precedence) or `element_id`.
/// Numeric ids are coerced to strings; anything else counts as absent.
fn element_id(record: &Value) -> Option<String> {
    let raw = record
        .get("id")
        .filter(|v| !v.is_null())
        .or_else(|| record.get("element_id").filter(|v| !v.is_null()))?;

    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn require_element(record: &Value, action_type: ActionType) -> Result<String, ActionError> {
    element_id(record).ok_or_else(|| {
        ActionError::validation(format!("{action_type} action requires an element id"))
    })
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn common_fields(record: &Value) -> ActionCommon {
    ActionCommon {
        confidence_float: record.get("confidence_float").and_then(Value::as_f64),
        description: string_field(record, "description"),
        reasoning: string_field(record, "reasoning"),
    }
}

fn user_errors(record: &Value) -> Result<Vec<UserDefinedError>, ActionError> {
    let Some(raw) = record.get("errors").filter(|v| !v.is_null()) else {
        return Ok(Vec::new());
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| ActionError::validation(format!("malformed errors list: {e}")))
}

/// Parse one raw record into a validated [`Action`].
///
/// A missing or null `action_type` yields [`Action::NullAction`] — an
/// explicit "do nothing", not an error. An unrecognized type string yields
/// [`ActionError::UnsupportedActionType`]; a recognized type with missing
/// required fields yields [`ActionError::Validation`].
pub fn parse_action(record: &Value) -> Result<Action, ActionError> {
    let common = common_fields(record);

    let raw_type = match record.get("action_type") {
        None | Some(Value::Null) => return Ok(Action::NullAction { common }),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(ActionError::validation(format!(
                "action_type must be a string, got {other}"
            )));
        }
    };
    let action_type: ActionType = raw_type.parse()?;

    let action = match action_type {
        ActionType::Click => Action::Click {
            element_id: require_element(record, action_type)?,
            file_url: string_field(record, "file_url"),
            download: record.get("download").and_then(Value::as_bool).unwrap_or(false),
            common,
        },
        ActionType::InputText => {
            // Presence of `text` is mandatory; an empty string is a valid value.
            let text = record
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::validation("input_text requires a 'text' field"))?
                .to_string();
            Action::InputText {
                element_id: require_element(record, action_type)?,
                text,
                common,
            }
        }
        ActionType::UploadFile => Action::UploadFile {
            element_id: require_element(record, action_type)?,
            file_url: string_field(record, "file_url")
                .ok_or_else(|| ActionError::validation("upload_file requires a 'file_url' field"))?,
            is_upload_file_tag: record
                .get("is_upload_file_tag")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            common,
        },
        ActionType::SelectOption => {
            let raw = record.get("option").filter(|v| !v.is_null()).ok_or_else(|| {
                ActionError::validation("select_option requires an 'option' object")
            })?;
            let option: SelectOption = serde_json::from_value(raw.clone())
                .map_err(|e| ActionError::validation(format!("malformed select option: {e}")))?;
            Action::SelectOption {
                element_id: require_element(record, action_type)?,
                option,
                common,
            }
        }
        ActionType::Checkbox => {
            let is_checked = record
                .get("is_checked")
                .and_then(Value::as_bool)
                .ok_or_else(|| {
                    ActionError::validation("checkbox requires an 'is_checked' boolean")
                })?;
            Action::Checkbox {
                element_id: require_element(record, action_type)?,
                is_checked,
                common,
            }
        }
        ActionType::Wait => Action::Wait { common },
        ActionType::NullAction => Action::NullAction { common },
        ActionType::SolveCaptcha => Action::SolveCaptcha { common },
        ActionType::Terminate => Action::Terminate {
            errors: user_errors(record)?,
            common,
        },
        ActionType::Complete => Action::Complete {
            errors: user_errors(record)?,
            data_extraction_goal: string_field(record, "data_extraction_goal"),
            common,
        },
    };

    action.validate()?;
    Ok(action)
}

/// Parse a batch of raw records, isolating per-item failures.
///
/// Unsupported or invalid records are logged with the offending payload and
/// skipped; the batch never aborts. A parsed terminate action is still
/// appended to the output and additionally surfaced through a warning log so
/// the caller can notice the agent's intent — this is advisory, not control
/// flow.
pub fn parse_actions(records: &[Value]) -> Vec<Action> {
    let mut actions = Vec::with_capacity(records.len());
    for record in records {
        match parse_action(record) {
            Ok(action) => {
                if matches!(action, Action::Terminate { .. }) {
                    warn!(
                        reasoning = action.common().reasoning.as_deref().unwrap_or(""),
                        "agent requested termination"
                    );
                }
                actions.push(action);
            }
            Err(err @ ActionError::UnsupportedActionType(_)) => {
                error!(raw_action = %record, %err, "unsupported action type, skipping");
            }
            Err(err) => {
                warn!(raw_action = %record, %err, "invalid action, skipping");
            }
        }
    }
    actions
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
