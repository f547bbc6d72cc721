//! Editor context describing the field an input session is attached to.
//!
//! The host hands an `EditorContext` to every start notification. The gate
//! keeps the last one applied to a visible view so that a redundant second
//! start-view after a reconfiguration can be recognised and dropped.

use serde::{Deserialize, Serialize};

/// Kind of content the focused field accepts. Part of the keyboard
/// equivalence check, since each kind may load a different layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPurpose {
    #[default]
    FreeForm,
    Email,
    Url,
    /// Masked field; the host usually also sets `no_suggestions`.
    Password,
    Number,
    Phone,
    /// Shell or console field where autocorrection is unwanted.
    Terminal,
}

/// Action the editor requests for the enter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    #[default]
    Unspecified,
    None,
    Go,
    Search,
    Send,
    Next,
    Done,
    Previous,
}

/// Description of the editor field a session is bound to.
///
/// # Fields
///
/// - `package_name`: application that owns the field
/// - `field_id`: host identifier of the field, changes on every recreation
/// - `input_purpose` / `multi_line`: the input type
/// - `action`: enter key action
/// - `no_suggestions` / `no_extract_ui`: option flags
/// - `private_options`: free-form options string set by the application
/// - `initial_selection`: cursor range when the session started
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorContext {
    pub package_name: String,
    pub field_id: u32,
    pub input_purpose: InputPurpose,
    pub multi_line: bool,
    pub action: EditorAction,
    pub no_suggestions: bool,
    pub no_extract_ui: bool,
    pub private_options: Option<String>,
    pub initial_selection: (usize, usize),
}

impl EditorContext {
    /// Create a free-form context for the given package.
    pub fn new<S: Into<String>>(package_name: S) -> Self {
        Self {
            package_name: package_name.into(),
            ..Self::default()
        }
    }

    pub fn with_purpose(mut self, purpose: InputPurpose) -> Self {
        self.input_purpose = purpose;
        self
    }

    pub fn with_action(mut self, action: EditorAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_field_id(mut self, field_id: u32) -> Self {
        self.field_id = field_id;
        self
    }

    /// Whether two contexts would produce the same keyboard.
    ///
    /// Only fields that affect layout selection are compared. The field id
    /// and the initial selection change whenever the host recreates the
    /// surface and are deliberately ignored.
    pub fn is_equivalent_for_keyboard(&self, other: &EditorContext) -> bool {
        self.package_name == other.package_name
            && self.input_purpose == other.input_purpose
            && self.multi_line == other.multi_line
            && self.action == other.action
            && self.no_suggestions == other.no_suggestions
            && self.no_extract_ui == other.no_extract_ui
            && self.private_options == other.private_options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recreated_field_is_equivalent() {
        let before = EditorContext::new("com.example.chat").with_field_id(7);
        let mut after = before.clone().with_field_id(8);
        after.initial_selection = (3, 3);
        assert!(before.is_equivalent_for_keyboard(&after));
    }

    #[test]
    fn layout_fields_break_equivalence() {
        let base = EditorContext::new("com.example.chat");
        assert!(!base.is_equivalent_for_keyboard(&base.clone().with_purpose(InputPurpose::Email)));
        assert!(!base.is_equivalent_for_keyboard(&base.clone().with_action(EditorAction::Send)));
        assert!(!base.is_equivalent_for_keyboard(&EditorContext::new("com.example.mail")));

        let mut private = base.clone();
        private.private_options = Some("nm".to_string());
        assert!(!base.is_equivalent_for_keyboard(&private));
    }

    #[test]
    fn deserializes_with_defaults() {
        let ctx: EditorContext =
            serde_json::from_str(r#"{"package_name":"a.b","input_purpose":"url"}"#).unwrap();
        assert_eq!(ctx.package_name, "a.b");
        assert_eq!(ctx.input_purpose, InputPurpose::Url);
        assert_eq!(ctx.action, EditorAction::Unspecified);
    }
}
