//! Predicate expression trees.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::doc_ref::DocRef;
use crate::tree::TreeNode;

/// Boolean operator joining the children of an operator node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Op {
    #[default]
    And,
    Or,
    Not,
}

/// Comparison a term applies to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    Equals,
    Contains,
    Between,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    InDictionary,
    InFolder,
    IsDocRef,
}

impl Condition {
    /// Whether the term value is a picked document rather than free text.
    pub fn uses_doc_ref(&self) -> bool {
        matches!(self, Self::InDictionary | Self::InFolder | Self::IsDocRef)
    }
}

fn default_enabled() -> bool {
    true
}

/// Internal node of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionOperator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub op: Op,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub children: Vec<ExpressionItem>,
}

/// Leaf node of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionTerm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<DocRef>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A node of a predicate expression: an operator or a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExpressionItem {
    Operator(ExpressionOperator),
    Term(ExpressionTerm),
}

impl ExpressionItem {
    /// Default term added by the expression editor.
    pub fn new_term() -> Self {
        Self::Term(ExpressionTerm {
            uuid: None,
            field: None,
            condition: None,
            value: None,
            dictionary: None,
            enabled: true,
        })
    }

    /// Default operator added by the expression editor.
    pub fn new_operator() -> Self {
        Self::Operator(ExpressionOperator {
            uuid: None,
            op: Op::And,
            enabled: true,
            children: Vec::new(),
        })
    }

    /// Operator with the given children and no identifier.
    pub fn operator(op: Op, children: Vec<ExpressionItem>) -> Self {
        Self::Operator(ExpressionOperator {
            uuid: None,
            op,
            enabled: true,
            children,
        })
    }

    /// Term with a free-text value and no identifier.
    pub fn term(field: impl Into<String>, condition: Condition, value: impl Into<String>) -> Self {
        Self::Term(ExpressionTerm {
            uuid: None,
            field: Some(field.into()),
            condition: Some(condition),
            value: Some(value.into()),
            dictionary: None,
            enabled: true,
        })
    }

    /// Set the identifier, consuming and returning the item.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.set_uuid(Some(uuid.into()));
        self
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    pub fn is_term(&self) -> bool {
        matches!(self, Self::Term(_))
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Operator(operator) => operator.enabled,
            Self::Term(term) => term.enabled,
        }
    }

    pub fn as_term(&self) -> Option<&ExpressionTerm> {
        match self {
            Self::Term(term) => Some(term),
            Self::Operator(_) => None,
        }
    }

    pub fn as_operator(&self) -> Option<&ExpressionOperator> {
        match self {
            Self::Operator(operator) => Some(operator),
            Self::Term(_) => None,
        }
    }
}

impl TreeNode for ExpressionItem {
    type Update = ExpressionItemUpdate;

    fn uuid(&self) -> Option<&str> {
        match self {
            Self::Operator(operator) => operator.uuid.as_deref(),
            Self::Term(term) => term.uuid.as_deref(),
        }
    }

    fn set_uuid(&mut self, uuid: Option<String>) {
        match self {
            Self::Operator(operator) => operator.uuid = uuid,
            Self::Term(term) => term.uuid = uuid,
        }
    }

    fn children(&self) -> Option<&[Self]> {
        match self {
            Self::Operator(operator) => Some(&operator.children),
            Self::Term(_) => None,
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Self>> {
        match self {
            Self::Operator(operator) => Some(&mut operator.children),
            Self::Term(_) => None,
        }
    }

    fn apply_update(&mut self, update: &ExpressionItemUpdate) {
        match self {
            Self::Operator(operator) => {
                if let Some(enabled) = update.enabled {
                    operator.enabled = enabled;
                }
                if let Some(op) = update.op {
                    operator.op = op;
                }
            }
            Self::Term(term) => {
                if let Some(enabled) = update.enabled {
                    term.enabled = enabled;
                }
                if let Some(field) = &update.field {
                    term.field = field.clone();
                }
                if let Some(condition) = update.condition {
                    term.condition = condition;
                }
                if let Some(value) = &update.value {
                    term.value = value.clone();
                }
                if let Some(dictionary) = &update.dictionary {
                    term.dictionary = dictionary.clone();
                }
            }
        }
    }
}

/// Shallow patch applied to an [`ExpressionItem`].
///
/// The outer `Option` says whether a field is touched at all; for
/// optional term fields the inner `Option` is the new value, so
/// `value: Some(None)` clears the value. Fields that do not exist on the
/// patched node kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionItemUpdate {
    pub enabled: Option<bool>,
    pub op: Option<Op>,
    pub field: Option<Option<String>>,
    pub condition: Option<Option<Condition>>,
    pub value: Option<Option<String>>,
    pub dictionary: Option<Option<DocRef>>,
}

impl ExpressionItemUpdate {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn op(mut self, op: Op) -> Self {
        self.op = Some(op);
        self
    }

    pub fn field(mut self, field: Option<String>) -> Self {
        self.field = Some(field);
        self
    }

    pub fn condition(mut self, condition: Option<Condition>) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn value(mut self, value: Option<String>) -> Self {
        self.value = Some(value);
        self
    }

    pub fn dictionary(mut self, dictionary: Option<DocRef>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Patch applied when a dictionary is picked for a term: the free-text
    /// value is cleared and the picked document attached.
    pub fn picked_dictionary(doc_ref: DocRef) -> Self {
        Self::default().value(None).dictionary(Some(doc_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_items() {
        let term = ExpressionItem::new_term();
        assert!(term.is_term());
        assert!(term.enabled());
        assert!(term.children().is_none());

        let operator = ExpressionItem::new_operator();
        assert!(operator.is_operator());
        assert_eq!(operator.as_operator().unwrap().op, Op::And);
        assert_eq!(operator.children().unwrap().len(), 0);
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{"type":"operator","op":"OR","enabled":true,"children":[
            {"type":"term","field":"Feed","condition":"EQUALS","value":"TEST","enabled":false}
        ]}"#;
        let item: ExpressionItem = serde_json::from_str(json).unwrap();
        let operator = item.as_operator().unwrap();
        assert_eq!(operator.op, Op::Or);
        let term = operator.children[0].as_term().unwrap();
        assert_eq!(term.condition, Some(Condition::Equals));
        assert!(!term.enabled);
        assert!(term.uuid.is_none());

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["children"][0]["type"], "term");
        assert_eq!(back["op"], "OR");
    }

    #[test]
    fn test_missing_enabled_defaults_true() {
        let item: ExpressionItem = serde_json::from_str(r#"{"type":"term"}"#).unwrap();
        assert!(item.enabled());
    }

    #[test]
    fn test_picked_dictionary_update() {
        let mut term = ExpressionItem::term("Feed", Condition::InDictionary, "typed");
        let dictionary = DocRef::new_document("d1", "Dictionary", "Feeds");
        term.apply_update(&ExpressionItemUpdate::picked_dictionary(dictionary.clone()));

        let term = term.as_term().unwrap();
        assert!(term.value.is_none());
        assert_eq!(term.dictionary, Some(dictionary));
        assert_eq!(term.field.as_deref(), Some("Feed"));
    }

    #[test]
    fn test_op_update_ignored_on_term() {
        let mut term = ExpressionItem::new_term();
        let before = term.clone();
        term.apply_update(&ExpressionItemUpdate::default().op(Op::Not));
        assert_eq!(term, before);
    }

    #[test]
    fn test_condition_uses_doc_ref() {
        assert!(Condition::InDictionary.uses_doc_ref());
        assert!(!Condition::Contains.uses_doc_ref());
        assert_eq!(Condition::GreaterThanOrEqualTo.to_string(), "GREATER_THAN_OR_EQUAL_TO");
    }
}
