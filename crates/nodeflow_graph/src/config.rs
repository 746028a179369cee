// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration.
//!
//! Stored as RON next to the host application:
//! - node-definition documents to load (default and custom)
//! - custom socket type names
//! - project and exception-save file names
//! - paste offset for copied nodes

use crate::node::NodeOrigin;
use crate::registry::NodeRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "nodeflow.ron";

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Node-definition documents shipped with the host
    pub node_definition_files: Vec<PathBuf>,
    /// Node-definition documents added by the user; registered as extensions
    pub custom_node_definition_files: Vec<PathBuf>,
    /// Extra socket type tags accepted in definitions and projects
    pub custom_socket_types: Vec<String>,
    /// Project file used when saving without a path
    pub project_file: PathBuf,
    /// File name written to the temp directory on a crash save
    pub exception_save_file: String,
    /// Offset applied to pasted copies
    pub copy_offset: [f32; 3],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            node_definition_files: Vec::new(),
            custom_node_definition_files: Vec::new(),
            custom_socket_types: Vec::new(),
            project_file: PathBuf::from("project.json"),
            exception_save_file: "NEExceptionSave.json".to_string(),
            copy_offset: [20.0, 20.0, 0.0],
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;

        // Version check
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Serialize as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save the configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Build a registry from the built-in catalogue and every configured
    /// definition document.
    ///
    /// Documents that cannot be read are logged and skipped.
    pub fn build_registry(&self) -> NodeRegistry {
        let mut registry = NodeRegistry::with_builtins();
        for tag in &self.custom_socket_types {
            registry.register_socket_kind(tag.clone());
        }

        let files = self
            .node_definition_files
            .iter()
            .map(|p| (p, NodeOrigin::Definition))
            .chain(self.custom_node_definition_files.iter().map(|p| (p, NodeOrigin::Extension)));
        for (path, origin) in files {
            if let Err(error) = registry.load_definitions_path(path, origin) {
                tracing::error!("Skipping node definitions {:?}: {}", path, error);
            }
        }
        registry
    }
}

/// Error when reading or writing the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Configuration could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}
