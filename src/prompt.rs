//! Modal text prompt construction.
//!
//! The list screen asks this module for its add/edit dialog: each intent
//! carries a fixed title and message, the field is pre-filled when editing,
//! and saving yields the typed text only when it trims to something
//! non-empty. Blank input is discarded silently; there is no error path out
//! of this module.

use crate::tui::input::InputField;

/// Which dialog the screen asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptIntent {
    Add,
    Edit,
}

impl PromptIntent {
    /// Dialog title shown in the popup border.
    pub fn title(self) -> &'static str {
        match self {
            PromptIntent::Add => "New Task",
            PromptIntent::Edit => "Redact Task",
        }
    }

    /// Explanatory line shown above the text field.
    pub fn message(self) -> &'static str {
        match self {
            PromptIntent::Add => "What do you want to do?",
            PromptIntent::Edit => "Enter new name for the task",
        }
    }
}

/// A single-field modal prompt with save/cancel semantics.
pub struct Prompt {
    pub intent: PromptIntent,
    pub field: InputField,
}

impl Prompt {
    /// Build a prompt for the given intent, pre-filling the field with the
    /// existing title when editing.
    pub fn new(intent: PromptIntent, existing_title: Option<&str>) -> Self {
        let field = match existing_title {
            Some(title) => InputField::with_value(title),
            None => InputField::new(),
        };
        Prompt { intent, field }
    }

    /// Save: the raw field text, or `None` when it trims to empty. Blank
    /// input never produces a value and never produces an error.
    pub fn save(&self) -> Option<String> {
        if self.field.value.trim().is_empty() {
            None
        } else {
            Some(self.field.value.clone())
        }
    }
}
