// Host-side attachment: models own guards, records own slot values

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::descriptor::ModelDescriptor;
use super::errors::{ids, ConfigurationError, GuardError, Result};
use super::guard::TransitionGuard;
use super::traits::Subject;
use super::types::StateValue;

/// Class-level registry of state fields
///
/// Guards are attached once and shared by every record the model creates.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    fields: BTreeMap<String, Arc<TransitionGuard>>,
    duplicates: Vec<String>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Attach a guard under its own field name
    ///
    /// A second guard with the same name replaces the first and is reported
    /// by `check` as a duplicate field.
    pub fn with_field(mut self, guard: TransitionGuard) -> Self {
        tracing::debug!(model = %self.name, field = %guard.name(), "Attaching state field");
        let name = guard.name().to_string();
        if self.fields.insert(name.clone(), Arc::new(guard)).is_some() {
            tracing::warn!(model = %self.name, field = %name, "State field declared twice");
            self.duplicates.push(name);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Result<&Arc<TransitionGuard>> {
        self.fields.get(name).ok_or_else(|| GuardError::UnknownField {
            model: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &Arc<TransitionGuard>> {
        self.fields.values()
    }

    /// Run the field and workflow checks of every attached guard
    pub fn check(&self) -> Vec<ConfigurationError> {
        let duplicates = self.duplicates.iter().map(|name| {
            ConfigurationError::error(
                ids::DUPLICATE_FIELD,
                name,
                format!("Field '{}' is declared more than once on model '{}'.", name, self.name),
            )
        });
        duplicates
            .chain(self.fields.values().flat_map(|guard| guard.check()))
            .collect()
    }

    /// Fail when any finding is fatal under the given policy
    pub fn ensure_valid(&self, warnings_as_errors: bool) -> Result<()> {
        let findings = self.check();
        for finding in &findings {
            tracing::warn!(model = %self.name, id = finding.id, "{}", finding);
        }
        if findings.iter().any(|f| f.is_fatal(warnings_as_errors)) {
            return Err(GuardError::InvalidConfiguration {
                model: self.name.clone(),
                errors: findings,
            });
        }
        Ok(())
    }

    pub fn instance(&self) -> Record {
        Record::new(self.name.clone())
    }

    pub fn get(&self, record: &Record, field: &str) -> Result<Option<StateValue>> {
        self.ensure_owns(record)?;
        Ok(self.field(field)?.read(record))
    }

    pub fn set(&self, record: &mut Record, field: &str, value: impl Into<StateValue>) -> Result<()> {
        self.ensure_owns(record)?;
        self.field(field)?.write(record, value)?;
        Ok(())
    }

    fn ensure_owns(&self, record: &Record) -> Result<()> {
        if record.model() != self.name {
            return Err(GuardError::RecordModelMismatch {
                model: self.name.clone(),
                record_model: record.model().to_string(),
            });
        }
        Ok(())
    }

    pub fn deconstruct(&self) -> ModelDescriptor {
        ModelDescriptor {
            model: self.name.clone(),
            fields: self.fields.values().map(|guard| guard.describe()).collect(),
        }
    }

    pub fn from_descriptor(descriptor: &ModelDescriptor) -> Result<Self> {
        descriptor
            .fields
            .iter()
            .try_fold(Model::new(descriptor.model.clone()), |model, field| {
                Ok(model.with_field(TransitionGuard::from_descriptor(field)?))
            })
    }
}

/// In-memory row: an attribute dictionary keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    model: String,
    attributes: HashMap<String, StateValue>,
}

impl Record {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Load a stored value without going through any guard, as the storage
    /// layer does when materializing a row.
    pub fn hydrate(&mut self, field: &str, value: impl Into<StateValue>) {
        self.attributes.insert(field.to_string(), value.into());
    }

    pub fn attributes(&self) -> &HashMap<String, StateValue> {
        &self.attributes
    }
}

impl Subject for Record {
    fn state(&self, field: &str) -> Option<StateValue> {
        self.attributes.get(field).cloned()
    }

    fn store_state(&mut self, field: &str, value: StateValue) {
        self.attributes.insert(field.to_string(), value);
    }
}
