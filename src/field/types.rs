// Core types for workflow-constrained state fields

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A single state value stored in a subject's slot
///
/// Untagged on the wire: a JSON/TOML string or integer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Integer(i64),
    Text(String),
}

impl StateValue {
    /// Parse a raw string according to the field kind (CLI arguments, env values)
    pub fn parse(kind: &StateKind, raw: &str) -> Option<Self> {
        match kind {
            StateKind::Char { .. } => Some(StateValue::Text(raw.to_string())),
            StateKind::Integer => raw.trim().parse::<i64>().ok().map(StateValue::Integer),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            StateValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StateValue::Integer(n) => Some(*n),
            StateValue::Text(_) => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Integer(n) => write!(f, "{}", n),
            StateValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Integer(value)
    }
}

/// Declared storage type of a state field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateKind {
    /// Short text column
    Char {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Integer column
    Integer,
}

impl StateKind {
    /// Whether a value's variant matches this kind
    pub fn accepts(&self, value: &StateValue) -> bool {
        matches!(
            (self, value),
            (StateKind::Char { .. }, StateValue::Text(_)) | (StateKind::Integer, StateValue::Integer(_))
        )
    }

    /// Import path recorded in field descriptors
    pub fn field_path(&self) -> &'static str {
        match self {
            StateKind::Char { .. } => CHAR_FIELD_PATH,
            StateKind::Integer => INTEGER_FIELD_PATH,
        }
    }
}

pub const CHAR_FIELD_PATH: &str = "state_guard.StateCharField";
pub const INTEGER_FIELD_PATH: &str = "state_guard.StateIntegerField";

/// One row of a workflow table as it appears in descriptors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEntry {
    pub from: StateValue,
    #[serde(default)]
    pub to: Vec<StateValue>,
}

/// Transition table: state -> states reachable in one step
///
/// A key mapped to an empty set is terminal. Serialized as a list of
/// `WorkflowEntry` rows so integer keys survive JSON and TOML.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<WorkflowEntry>", into = "Vec<WorkflowEntry>")]
pub struct Workflow {
    transitions: BTreeMap<StateValue, BTreeSet<StateValue>>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state and the targets it may move to. Repeated calls merge.
    pub fn state<S, I, T>(mut self, from: S, to: I) -> Self
    where
        S: Into<StateValue>,
        I: IntoIterator<Item = T>,
        T: Into<StateValue>,
    {
        self.transitions
            .entry(from.into())
            .or_default()
            .extend(to.into_iter().map(Into::into));
        self
    }

    /// Add a state with no outgoing transitions
    pub fn terminal<S: Into<StateValue>>(mut self, state: S) -> Self {
        self.transitions.entry(state.into()).or_default();
        self
    }

    pub fn contains_state(&self, state: &StateValue) -> bool {
        self.transitions.contains_key(state)
    }

    pub fn targets(&self, from: &StateValue) -> Option<&BTreeSet<StateValue>> {
        self.transitions.get(from)
    }

    pub fn states(&self) -> impl Iterator<Item = &StateValue> {
        self.transitions.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateValue, &BTreeSet<StateValue>)> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl From<Vec<WorkflowEntry>> for Workflow {
    fn from(entries: Vec<WorkflowEntry>) -> Self {
        entries
            .into_iter()
            .fold(Workflow::new(), |wf, entry| wf.state(entry.from, entry.to))
    }
}

impl From<Workflow> for Vec<WorkflowEntry> {
    fn from(workflow: Workflow) -> Self {
        workflow
            .transitions
            .into_iter()
            .map(|(from, to)| WorkflowEntry {
                from,
                to: to.into_iter().collect(),
            })
            .collect()
    }
}

impl<S, T> FromIterator<(S, Vec<T>)> for Workflow
where
    S: Into<StateValue>,
    T: Into<StateValue>,
{
    fn from_iter<I: IntoIterator<Item = (S, Vec<T>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Workflow::new(), |wf, (from, to)| wf.state(from, to))
    }
}
