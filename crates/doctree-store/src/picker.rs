//! Picker identifiers.
//!
//! A document picker reports its choice with the id it was opened with.
//! Pickers opened from an expression term carry the expression id and the
//! term uuid so the choice can be routed back to that term; the string form
//! `EXP_<expressionId>_<termUuid>` exists for widgets that only hold strings.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Leading component of an expression picker key.
pub const EXPRESSION_PREFIX: &str = "EXP";

/// Separator between picker key components.
pub const PICKER_DELIM: char = '_';

/// Errors building an expression picker id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerKeyError {
    /// A component contains the delimiter and would not split back.
    #[error("Picker key component {value:?} contains the delimiter '_'")]
    ContainsDelimiter { value: String },

    /// A component is empty.
    #[error("Picker key {component} cannot be empty")]
    Empty { component: &'static str },
}

/// Identity of a document picker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PickerId {
    /// Picker choosing a dictionary for one expression term.
    Expression {
        expression_id: String,
        term_uuid: String,
    },
    /// Any other picker.
    Plain(PlainPickerId),
}

/// Id of a picker not tied to an expression term.
///
/// Only [`PickerId::parse`] creates one, so a plain id never spells an
/// expression key and both forms of one key hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainPickerId(String);

impl PlainPickerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PickerId {
    /// Picker id for a term of an expression.
    pub fn for_term(
        expression_id: impl Into<String>,
        term_uuid: impl Into<String>,
    ) -> Result<Self, PickerKeyError> {
        let expression_id = expression_id.into();
        let term_uuid = term_uuid.into();
        check_component("expression id", &expression_id)?;
        check_component("term uuid", &term_uuid)?;
        Ok(Self::Expression {
            expression_id,
            term_uuid,
        })
    }

    /// Decode a picker id from its string form. Strings that are not
    /// expression keys become [`PickerId::Plain`].
    pub fn parse(value: &str) -> Self {
        let parts: Vec<&str> = value.split(PICKER_DELIM).collect();
        match parts.as_slice() {
            [prefix, expression_id, term_uuid]
                if *prefix == EXPRESSION_PREFIX
                    && !expression_id.is_empty()
                    && !term_uuid.is_empty() =>
            {
                Self::Expression {
                    expression_id: expression_id.to_string(),
                    term_uuid: term_uuid.to_string(),
                }
            }
            _ => Self::Plain(PlainPickerId(value.to_string())),
        }
    }

    /// Check if this picker belongs to an expression term.
    pub fn is_expression_based(&self) -> bool {
        matches!(self, Self::Expression { .. })
    }

    /// The expression id and term uuid, for expression pickers.
    pub fn expression_term(&self) -> Option<(&str, &str)> {
        match self {
            Self::Expression {
                expression_id,
                term_uuid,
            } => Some((expression_id, term_uuid)),
            Self::Plain(_) => None,
        }
    }
}

fn check_component(component: &'static str, value: &str) -> Result<(), PickerKeyError> {
    if value.is_empty() {
        return Err(PickerKeyError::Empty { component });
    }
    if value.contains(PICKER_DELIM) {
        return Err(PickerKeyError::ContainsDelimiter {
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for PickerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression {
                expression_id,
                term_uuid,
            } => write!(
                f,
                "{EXPRESSION_PREFIX}{PICKER_DELIM}{expression_id}{PICKER_DELIM}{term_uuid}"
            ),
            Self::Plain(id) => f.write_str(id.as_str()),
        }
    }
}

impl FromStr for PickerId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for PickerId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
