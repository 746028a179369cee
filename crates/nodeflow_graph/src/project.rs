// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project session: one open graph together with its file.

use crate::codec::{CodecError, LoadReport, ProjectDocument};
use crate::config::EditorConfig;
use crate::graph::Graph;
use crate::node::NodeId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An open project
#[derive(Debug)]
pub struct ProjectSession {
    graph: Graph,
    config: EditorConfig,
    path: Option<PathBuf>,
}

impl ProjectSession {
    /// Start an empty project with a registry built from `config`
    pub fn new(config: EditorConfig) -> Self {
        let registry = Arc::new(config.build_registry());
        Self {
            graph: Graph::with_registry("Untitled", registry),
            config,
            path: None,
        }
    }

    /// The graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The graph, for editing
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// The configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// File the project was last loaded from or saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there are unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.graph.is_dirty()
    }

    /// Discard the graph and start over
    pub fn new_project(&mut self) {
        self.graph.remove_all_nodes();
        self.graph.mark_clean();
        self.path = None;
        tracing::info!("Created new project");
    }

    /// Save to the current file, or to the configured project file
    pub fn save(&mut self) -> Result<PathBuf, ProjectError> {
        let path = self.path.clone().unwrap_or_else(|| self.config.project_file.clone());
        self.save_as(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file
    pub fn save_as(&mut self, path: &Path) -> Result<(), ProjectError> {
        write_document(&self.graph, path)?;
        self.graph.mark_clean();
        self.path = Some(path.to_path_buf());
        tracing::info!("Saved project to {:?}", path);
        Ok(())
    }

    /// Replace the graph with the project stored at `path`.
    ///
    /// An unreadable or malformed file leaves the current graph untouched.
    pub fn load(&mut self, path: &Path) -> Result<LoadReport, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        let document = ProjectDocument::from_json_str(&content)?;
        let report = document.load_into(&mut self.graph);
        self.path = Some(path.to_path_buf());
        tracing::info!(
            "Opened project {:?}: {} nodes, {} connections",
            path,
            report.nodes_loaded,
            report.connections_loaded
        );
        Ok(report)
    }

    /// Write the graph to the temp directory, e.g. from a crash handler.
    ///
    /// Leaves the current file and dirty state as they are.
    pub fn exception_save(&self) -> Result<PathBuf, ProjectError> {
        let path = std::env::temp_dir().join(&self.config.exception_save_file);
        write_document(&self.graph, &path)?;
        tracing::warn!("Exception save written to {:?}", path);
        Ok(path)
    }

    /// Duplicate the selected nodes at the configured paste offset
    pub fn copy_selected(&mut self) -> Vec<NodeId> {
        let selected = self.graph.selected_nodes();
        self.graph.copy_nodes(&selected, self.config.copy_offset)
    }
}

impl Default for ProjectSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn write_document(graph: &Graph, path: &Path) -> Result<(), ProjectError> {
    let content = ProjectDocument::from_graph(graph).to_json_string()?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Error when reading or writing project files
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// File could not be read or written
    #[error("Project I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}
