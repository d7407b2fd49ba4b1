// state-guard - workflow-constrained state fields
// Exposes the guard, its host-side attachment types and the ambient config/telemetry setup

pub mod field;
pub mod config;
pub mod telemetry;

// Re-export key types for easy access
pub use field::{
    CheckLevel, ConfigurationError, DescriptorFormat, FieldDescriptor, GuardError,
    InvalidTransition, Model, ModelDescriptor, Record, StateKind, StateValue, Subject,
    TransitionGuard, Workflow, WorkflowEntry,
};
pub use config::{GuardConfig, config};
pub use telemetry::{init_telemetry, generate_correlation_id, create_replay_span};
