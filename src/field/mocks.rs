// Mock subject for testing - records every slot access

use std::cell::RefCell;
use std::collections::HashMap;

use crate::field::traits::Subject;
use crate::field::types::StateValue;

/// Slot operations observed by `MockSubject`
#[derive(Debug, Clone, PartialEq)]
pub enum SlotCommand {
    Read { field: String },
    Store { field: String, value: StateValue },
}

/// Subject that keeps its slots in a map and logs each access
#[derive(Debug, Default)]
pub struct MockSubject {
    pub slots: HashMap<String, StateValue>,
    pub executed_commands: RefCell<Vec<SlotCommand>>,
}

impl MockSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, field: &str, value: impl Into<StateValue>) -> Self {
        self.slots.insert(field.to_string(), value.into());
        self
    }

    pub fn get_executed_commands(&self) -> Vec<SlotCommand> {
        self.executed_commands.borrow().clone()
    }

    pub fn stores(&self) -> Vec<SlotCommand> {
        self.get_executed_commands()
            .into_iter()
            .filter(|cmd| matches!(cmd, SlotCommand::Store { .. }))
            .collect()
    }
}

impl Subject for MockSubject {
    fn state(&self, field: &str) -> Option<StateValue> {
        self.executed_commands.borrow_mut().push(SlotCommand::Read {
            field: field.to_string(),
        });
        self.slots.get(field).cloned()
    }

    fn store_state(&mut self, field: &str, value: StateValue) {
        self.executed_commands.borrow_mut().push(SlotCommand::Store {
            field: field.to_string(),
            value: value.clone(),
        });
        self.slots.insert(field.to_string(), value);
    }
}
