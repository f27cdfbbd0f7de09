//! The closed action taxonomy.
//!
//! Every command an agent may issue against a page is one of the variants
//! below. Variants that target a concrete element (`click`, `input_text`,
//! `upload_file`, `select_option`, `checkbox`) carry a mandatory element id;
//! the decisive variants (`terminate`, `complete`) carry the agent's
//! self-reported errors instead. Construction goes through the parser, which
//! calls [`Action::validate`] before handing a value to the caller.

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Action kinds an agent may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Click,
    InputText,
    UploadFile,
    SelectOption,
    Checkbox,
    Wait,
    NullAction,
    SolveCaptcha,
    Terminate,
    Complete,
}

impl ActionType {
    /// Get the wire name of the action kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::InputText => "input_text",
            Self::UploadFile => "upload_file",
            Self::SelectOption => "select_option",
            Self::Checkbox => "checkbox",
            Self::Wait => "wait",
            Self::NullAction => "null_action",
            Self::SolveCaptcha => "solve_captcha",
            Self::Terminate => "terminate",
            Self::Complete => "complete",
        }
    }

    /// Whether this kind must target a concrete page element.
    #[must_use]
    pub fn requires_element(&self) -> bool {
        matches!(
            self,
            Self::Click | Self::InputText | Self::UploadFile | Self::SelectOption | Self::Checkbox
        )
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = ActionError;

    /// Parse a raw type string, case-insensitively.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "click" => Ok(Self::Click),
            "input_text" => Ok(Self::InputText),
            "upload_file" => Ok(Self::UploadFile),
            "select_option" => Ok(Self::SelectOption),
            "checkbox" => Ok(Self::Checkbox),
            "wait" => Ok(Self::Wait),
            "null" | "null_action" => Ok(Self::NullAction),
            "solve_captcha" => Ok(Self::SolveCaptcha),
            "terminate" => Ok(Self::Terminate),
            "complete" => Ok(Self::Complete),
            _ => Err(ActionError::UnsupportedActionType(raw.to_string())),
        }
    }
}

/// An error the agent itself reports when terminating or completing a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDefinedError {
    pub error_code: String,
    pub reasoning: String,
    pub confidence_float: f64,
}

/// Target of a `select_option` action. At least one field must be populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub index: Option<u32>,
}

impl SelectOption {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.value.is_none() && self.index.is_none()
    }
}

/// Fields shared by every action variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionCommon {
    #[serde(default)]
    pub confidence_float: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// A validated browser action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum Action {
    /// Click an element, optionally expecting a file download.
    Click {
        #[serde(flatten)]
        common: ActionCommon,
        element_id: String,
        #[serde(default)]
        file_url: Option<String>,
        #[serde(default)]
        download: bool,
    },

    /// Type text into an input element. An empty string is a valid value.
    InputText {
        #[serde(flatten)]
        common: ActionCommon,
        element_id: String,
        text: String,
    },

    /// Upload a file through a file-input element.
    UploadFile {
        #[serde(flatten)]
        common: ActionCommon,
        element_id: String,
        file_url: String,
        #[serde(default = "default_true")]
        is_upload_file_tag: bool,
    },

    /// Pick an option from a select element.
    SelectOption {
        #[serde(flatten)]
        common: ActionCommon,
        element_id: String,
        option: SelectOption,
    },

    /// Set a checkbox to an explicit state.
    Checkbox {
        #[serde(flatten)]
        common: ActionCommon,
        element_id: String,
        is_checked: bool,
    },

    /// Wait for the page to make progress.
    Wait {
        #[serde(flatten)]
        common: ActionCommon,
    },

    /// Explicit "do nothing" decision.
    NullAction {
        #[serde(flatten)]
        common: ActionCommon,
    },

    /// Hand control to a captcha-solving collaborator.
    SolveCaptcha {
        #[serde(flatten)]
        common: ActionCommon,
    },

    /// The agent gives up on the goal.
    Terminate {
        #[serde(flatten)]
        common: ActionCommon,
        #[serde(default)]
        errors: Vec<UserDefinedError>,
    },

    /// The agent believes the goal is reached.
    Complete {
        #[serde(flatten)]
        common: ActionCommon,
        #[serde(default)]
        errors: Vec<UserDefinedError>,
        #[serde(default)]
        data_extraction_goal: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

impl Action {
    /// Get the action kind.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Click { .. } => ActionType::Click,
            Self::InputText { .. } => ActionType::InputText,
            Self::UploadFile { .. } => ActionType::UploadFile,
            Self::SelectOption { .. } => ActionType::SelectOption,
            Self::Checkbox { .. } => ActionType::Checkbox,
            Self::Wait { .. } => ActionType::Wait,
            Self::NullAction { .. } => ActionType::NullAction,
            Self::SolveCaptcha { .. } => ActionType::SolveCaptcha,
            Self::Terminate { .. } => ActionType::Terminate,
            Self::Complete { .. } => ActionType::Complete,
        }
    }

    /// Fields shared by every variant.
    #[must_use]
    pub fn common(&self) -> &ActionCommon {
        match self {
            Self::Click { common, .. }
            | Self::InputText { common, .. }
            | Self::UploadFile { common, .. }
            | Self::SelectOption { common, .. }
            | Self::Checkbox { common, .. }
            | Self::Wait { common }
            | Self::NullAction { common }
            | Self::SolveCaptcha { common }
            | Self::Terminate { common, .. }
            | Self::Complete { common, .. } => common,
        }
    }

    /// The targeted element id, for variants that have one.
    #[must_use]
    pub fn element_id(&self) -> Option<&str> {
        match self {
            Self::Click { element_id, .. }
            | Self::InputText { element_id, .. }
            | Self::UploadFile { element_id, .. }
            | Self::SelectOption { element_id, .. }
            | Self::Checkbox { element_id, .. } => Some(element_id),
            _ => None,
        }
    }

    /// Whether this action ends the run (terminate or complete).
    #[must_use]
    pub fn is_decisive(&self) -> bool {
        matches!(self, Self::Terminate { .. } | Self::Complete { .. })
    }

    /// Check the variant's domain constraints.
    pub fn validate(&self) -> Result<(), ActionError> {
        if let Some(confidence) = self.common().confidence_float {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ActionError::validation(format!(
                    "confidence_float {confidence} outside [0, 1]"
                )));
            }
        }

        match self {
            Self::SelectOption { option, .. } if option.is_empty() => {
                Err(ActionError::validation(
                    "select_option requires at least one of label, value or index",
                ))
            }
            Self::Terminate { errors, .. } | Self::Complete { errors, .. } => {
                for error in errors {
                    if !(0.0..=1.0).contains(&error.confidence_float) {
                        return Err(ActionError::validation(format!(
                            "error {} confidence_float {} outside [0, 1]",
                            error.error_code, error.confidence_float
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
