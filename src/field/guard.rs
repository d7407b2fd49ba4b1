// Transition guard - gates writes to one state slot through a workflow table

use std::sync::Arc;

use super::descriptor::FieldDescriptor;
use super::errors::{ids, ConfigurationError, GuardError, InvalidTransition};
use super::traits::Subject;
use super::types::{StateKind, StateValue, Workflow};

/// Unicode identifier: a letter or `_`, then letters, digits or `_`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Workflow-constrained accessor for one named state slot
///
/// Built once per field declaration and shared by every subject of the
/// owning type. The workflow never changes after construction; all
/// per-subject state lives in the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGuard {
    name: String,
    kind: StateKind,
    workflow: Option<Arc<Workflow>>,
}

impl TransitionGuard {
    pub fn new(name: impl Into<String>, kind: StateKind, workflow: Option<Workflow>) -> Self {
        Self {
            name: name.into(),
            kind,
            workflow: workflow.map(Arc::new),
        }
    }

    /// Text-valued state field
    pub fn char_field(name: impl Into<String>, max_length: Option<usize>, workflow: Workflow) -> Self {
        Self::new(name, StateKind::Char { max_length }, Some(workflow))
    }

    /// Integer-valued state field
    pub fn integer_field(name: impl Into<String>, workflow: Workflow) -> Self {
        Self::new(name, StateKind::Integer, Some(workflow))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn workflow(&self) -> Option<&Workflow> {
        self.workflow.as_deref()
    }

    /// Current slot value; `None` is the unset sentinel
    pub fn read<S: Subject + ?Sized>(&self, subject: &S) -> Option<StateValue> {
        subject.state(&self.name)
    }

    /// Assign `proposed` if the workflow permits it from the current value.
    ///
    /// From an unset slot any workflow key is accepted; afterwards only the
    /// targets listed for the current state are. On rejection the slot is
    /// left exactly as it was.
    pub fn write<S: Subject + ?Sized>(
        &self,
        subject: &mut S,
        proposed: impl Into<StateValue>,
    ) -> Result<(), InvalidTransition> {
        let proposed = proposed.into();
        let current = self.read(subject);

        if !self.can_transition(current.as_ref(), &proposed) {
            tracing::warn!(
                field = %self.name,
                current = ?current,
                proposed = %proposed,
                "State transition rejected"
            );
            return Err(InvalidTransition {
                field: self.name.clone(),
                current,
                proposed,
            });
        }

        tracing::debug!(
            field = %self.name,
            current = ?current,
            proposed = %proposed,
            "State transition accepted"
        );
        subject.store_state(&self.name, proposed);
        Ok(())
    }

    /// Pure form of the membership test used by `write`
    pub fn can_transition(&self, current: Option<&StateValue>, proposed: &StateValue) -> bool {
        let Some(workflow) = self.workflow() else {
            return false;
        };
        match current {
            None => workflow.contains_state(proposed),
            Some(current) => workflow
                .targets(current)
                .is_some_and(|targets| targets.contains(proposed)),
        }
    }

    /// States that `write` would accept next
    pub fn allowed_targets(&self, current: Option<&StateValue>) -> Vec<StateValue> {
        let Some(workflow) = self.workflow() else {
            return Vec::new();
        };
        match current {
            None => workflow.states().cloned().collect(),
            Some(current) => workflow
                .targets(current)
                .map(|targets| targets.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// A declared state with no way out
    pub fn is_terminal(&self, state: &StateValue) -> bool {
        self.workflow()
            .and_then(|wf| wf.targets(state))
            .is_some_and(|targets| targets.is_empty())
    }

    /// Workflow checks run at registration. Never fails; the caller decides
    /// whether the returned findings abort startup.
    pub fn validate_workflow(&self) -> Vec<ConfigurationError> {
        let Some(workflow) = self.workflow() else {
            return vec![ConfigurationError::error(
                ids::REQUIRED_WORKFLOW,
                &self.name,
                "StateField must define a 'workflow' attribute.",
            )
            .with_hint("Pass a workflow mapping each state to its permitted next states.")];
        };

        let mut errors = Vec::new();
        if workflow.is_empty() {
            errors.push(ConfigurationError::warning(
                ids::EMPTY_WORKFLOW,
                &self.name,
                "Workflow declares no states; every assignment will be rejected.",
            ));
        }

        for (from, targets) in workflow.iter() {
            errors.extend(self.check_state_value(from));
            for target in targets {
                if !workflow.contains_state(target) {
                    errors.push(
                        ConfigurationError::warning(
                            ids::DANGLING_TARGET,
                            &self.name,
                            format!("Transition {} -> {} targets an undeclared state.", from, target),
                        )
                        .with_hint(format!("Declare {} as a workflow state, terminal if needed.", target)),
                    );
                    // Dangling targets are still type-checked
                    errors.extend(self.check_state_value(target));
                }
            }
        }

        errors
    }

    /// Column-level checks the host schema layer runs for any field:
    /// the attribute name and the declared column size.
    pub fn check_field(&self) -> Vec<ConfigurationError> {
        let mut errors = self.check_name();
        errors.extend(self.check_kind());
        errors
    }

    /// Everything a schema check reports for this field
    pub fn check(&self) -> Vec<ConfigurationError> {
        let mut errors = self.check_field();
        errors.extend(self.validate_workflow());
        errors
    }

    fn check_name(&self) -> Vec<ConfigurationError> {
        let reason = if !is_identifier(&self.name) {
            Some("Field names must be valid identifiers.")
        } else if self.name.ends_with('_') {
            Some("Field names must not end with an underscore.")
        } else if self.name.contains("__") {
            Some("Field names must not contain \"__\".")
        } else {
            None
        };
        reason
            .map(|msg| vec![ConfigurationError::error(ids::INVALID_NAME, &self.name, msg)])
            .unwrap_or_default()
    }

    fn check_kind(&self) -> Vec<ConfigurationError> {
        match self.kind {
            StateKind::Char { max_length: Some(0) } => vec![ConfigurationError::error(
                ids::INVALID_MAX_LENGTH,
                &self.name,
                "'max_length' must be a positive integer.",
            )],
            _ => Vec::new(),
        }
    }

    fn check_state_value(&self, value: &StateValue) -> Vec<ConfigurationError> {
        if !self.kind.accepts(value) {
            return vec![ConfigurationError::error(
                ids::KIND_MISMATCH,
                &self.name,
                format!("State {} does not match the field type {}.", value, self.kind.field_path()),
            )];
        }
        match (self.kind, value) {
            (StateKind::Char { max_length: Some(max) }, StateValue::Text(text))
                if max > 0 && text.chars().count() > max =>
            {
                vec![ConfigurationError::error(
                    ids::STATE_TOO_LONG,
                    &self.name,
                    format!("State {} is longer than max_length={}.", value, max),
                )]
            }
            _ => Vec::new(),
        }
    }

    /// Reproducible description for schema snapshots
    pub fn describe(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            path: self.kind.field_path().to_string(),
            kind: self.kind,
            workflow: self.workflow().cloned(),
        }
    }

    /// Rebuild a guard from `describe()` output
    pub fn from_descriptor(descriptor: &FieldDescriptor) -> Result<Self, GuardError> {
        if descriptor.path != descriptor.kind.field_path() {
            return Err(GuardError::UnknownFieldPath(descriptor.path.clone()));
        }
        Ok(Self::new(
            descriptor.name.clone(),
            descriptor.kind,
            descriptor.workflow.clone(),
        ))
    }
}
