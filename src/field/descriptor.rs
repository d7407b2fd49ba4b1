// Serializable field configuration for schema snapshots and migrations

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{GuardError, Result};
use super::types::{StateKind, Workflow};

/// Output of `TransitionGuard::describe`
///
/// Feeding it back through `TransitionGuard::from_descriptor` yields a
/// guard with the same workflow and the same accept/reject behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub path: String,
    pub kind: StateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
}

/// Snapshot of every state field attached to a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub model: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// On-disk encodings supported for descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Toml,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(DescriptorFormat::Json),
            Some("toml") => Ok(DescriptorFormat::Toml),
            other => Err(GuardError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(DescriptorFormat::Json),
            "toml" => Ok(DescriptorFormat::Toml),
            other => Err(GuardError::UnsupportedFormat(other.to_string())),
        }
    }
}

macro_rules! descriptor_codec {
    ($ty:ty) => {
        impl $ty {
            pub fn to_json(&self) -> Result<String> {
                Ok(serde_json::to_string_pretty(self)?)
            }

            pub fn from_json(input: &str) -> Result<Self> {
                Ok(serde_json::from_str(input)?)
            }

            pub fn to_toml(&self) -> Result<String> {
                Ok(toml::to_string_pretty(self)?)
            }

            pub fn from_toml(input: &str) -> Result<Self> {
                Ok(toml::from_str(input)?)
            }

            pub fn encode(&self, format: DescriptorFormat) -> Result<String> {
                match format {
                    DescriptorFormat::Json => self.to_json(),
                    DescriptorFormat::Toml => self.to_toml(),
                }
            }

            pub fn decode(input: &str, format: DescriptorFormat) -> Result<Self> {
                match format {
                    DescriptorFormat::Json => Self::from_json(input),
                    DescriptorFormat::Toml => Self::from_toml(input),
                }
            }

            /// Load from a `.json` or `.toml` file
            pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
                let path = path.as_ref();
                let format = DescriptorFormat::from_path(path)?;
                let content = std::fs::read_to_string(path)?;
                tracing::debug!(path = %path.display(), ?format, "Loading descriptor");
                Self::decode(&content, format)
            }

            pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
                let path = path.as_ref();
                let format = DescriptorFormat::from_path(path)?;
                std::fs::write(path, self.encode(format)?)?;
                Ok(())
            }
        }
    };
}

descriptor_codec!(FieldDescriptor);
descriptor_codec!(ModelDescriptor);
