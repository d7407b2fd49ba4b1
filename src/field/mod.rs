// State Field Module - workflow-constrained state slots
//
// A `TransitionGuard` gates every write to one named slot through a
// workflow table; `Model` attaches guards to field names the way a host
// schema layer would.

pub mod types;
pub mod traits;
pub mod errors;
pub mod guard;
pub mod descriptor;
pub mod model;

#[cfg(test)]
pub mod mocks;


#[cfg(test)]
mod property_tests;

pub use types::{StateKind, StateValue, Workflow, WorkflowEntry};
pub use traits::Subject;
pub use errors::{CheckLevel, ConfigurationError, GuardError, InvalidTransition};
pub use guard::TransitionGuard;
pub use descriptor::{DescriptorFormat, FieldDescriptor, ModelDescriptor};
pub use model::{Model, Record};
