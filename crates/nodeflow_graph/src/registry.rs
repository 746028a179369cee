// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node types.
//!
//! Types resolve in three tiers: compiled built-ins first, then host
//! extensions, then generic nodes from definition documents.

use crate::definition::{build_descriptor, DefinitionError, NodeDefinitionFile};
use crate::node::{Node, NodeDescriptor, NodeOrigin};
use crate::socket::SocketKind;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;
use std::sync::Arc;

/// Registry of available node types
#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    builtin: IndexMap<String, Arc<NodeDescriptor>>,
    extensions: IndexMap<String, Arc<NodeDescriptor>>,
    definitions: IndexMap<String, Arc<NodeDescriptor>>,
    custom_socket_kinds: IndexSet<String>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in catalogue
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::catalog::register_builtins(&mut registry);
        registry
    }

    /// Register a node type in the tier matching its origin
    pub fn register(&mut self, descriptor: NodeDescriptor) {
        let map = match descriptor.origin {
            NodeOrigin::Builtin => &mut self.builtin,
            NodeOrigin::Extension => &mut self.extensions,
            NodeOrigin::Definition => &mut self.definitions,
        };
        let key = descriptor.type_id.clone();
        if map.insert(key.clone(), Arc::new(descriptor)).is_some() {
            tracing::debug!("Node type '{}' registered twice, keeping the latest", key);
        }
    }

    /// Merge host-supplied node types
    pub fn register_extensions(&mut self, descriptors: impl IntoIterator<Item = NodeDescriptor>) {
        for mut descriptor in descriptors {
            descriptor.origin = NodeOrigin::Extension;
            self.register(descriptor);
        }
    }

    /// Make a custom socket type tag known to definition documents and project files
    pub fn register_socket_kind(&mut self, tag: impl Into<String>) {
        self.custom_socket_kinds.insert(tag.into());
    }

    /// Resolve a definition-document socket tag
    pub fn socket_kind(&self, tag: &str) -> Option<SocketKind> {
        SocketKind::from_definition_tag(tag).or_else(|| {
            self.custom_socket_kinds
                .get(tag)
                .map(|name| SocketKind::Custom(name.clone()))
        })
    }

    /// Resolve a project-file `socketType` name
    pub fn socket_kind_by_type_name(&self, name: &str) -> Option<SocketKind> {
        SocketKind::from_type_name(name).or_else(|| {
            self.custom_socket_kinds
                .get(name)
                .map(|name| SocketKind::Custom(name.clone()))
        })
    }

    /// Register every node of a definition document.
    ///
    /// `origin` is [`NodeOrigin::Extension`] for host-supplied (custom)
    /// documents and [`NodeOrigin::Definition`] otherwise. Returns the number
    /// of node types registered.
    pub fn load_definitions(&mut self, file: &NodeDefinitionFile, origin: NodeOrigin) -> usize {
        let mut count = 0;
        for (key, definition) in &file.nodes {
            let descriptor = build_descriptor(key, definition, origin, |tag| self.socket_kind(tag));
            self.register(descriptor);
            count += 1;
        }
        count
    }

    /// Parse and register a definition document given as JSON text
    pub fn load_definitions_str(
        &mut self,
        json: &str,
        origin: NodeOrigin,
    ) -> Result<usize, DefinitionError> {
        let file = NodeDefinitionFile::from_json_str(json)?;
        Ok(self.load_definitions(&file, origin))
    }

    /// Read and register a definition document
    pub fn load_definitions_path(
        &mut self,
        path: &Path,
        origin: NodeOrigin,
    ) -> Result<usize, DefinitionError> {
        let file = NodeDefinitionFile::load(path)?;
        let count = self.load_definitions(&file, origin);
        tracing::info!("Loaded {} node definitions from {:?}", count, path);
        Ok(count)
    }

    /// Get a node type by ID, searching built-ins, extensions, then definitions.
    ///
    /// Qualified identifiers such as `definition::print` search their tier first.
    pub fn get(&self, type_id: &str) -> Option<&Arc<NodeDescriptor>> {
        if let Some((prefix, key)) = type_id.split_once("::") {
            let tier = match prefix {
                "builtin" => Some(&self.builtin),
                "extension" => Some(&self.extensions),
                "definition" => Some(&self.definitions),
                _ => None,
            };
            if let Some(found) = tier.and_then(|map| map.get(key)) {
                return Some(found);
            }
            return self.get(key);
        }
        self.builtin
            .get(type_id)
            .or_else(|| self.extensions.get(type_id))
            .or_else(|| self.definitions.get(type_id))
    }

    /// Get a node type by ID, failing with [`RegistryError::UnknownType`]
    pub fn resolve(&self, type_id: &str) -> Result<Arc<NodeDescriptor>, RegistryError> {
        self.get(type_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Result<Node, RegistryError> {
        self.resolve(type_id).map(Node::new)
    }

    /// Whether a type ID resolves
    pub fn contains(&self, type_id: &str) -> bool {
        self.get(type_id).is_some()
    }

    /// Get all registered types, in lookup order
    pub fn types(&self) -> impl Iterator<Item = &Arc<NodeDescriptor>> {
        self.builtin
            .values()
            .chain(self.extensions.values())
            .chain(self.definitions.values())
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.builtin.len() + self.extensions.len() + self.definitions.len()
    }

    /// Whether no type is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries for the node palette
    pub fn palette(&self) -> Vec<PaletteEntry> {
        self.types().map(|d| PaletteEntry::from_descriptor(d)).collect()
    }

    /// Palette entries matching every whitespace-separated term of `query`
    pub fn search(&self, query: &str) -> Vec<PaletteEntry> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.palette()
            .into_iter()
            .filter(|entry| entry.matches(&terms))
            .collect()
    }

    /// Category menu tree
    pub fn category_tree(&self) -> CategoryTree {
        let mut tree = CategoryTree::default();
        for entry in self.palette() {
            let path = entry.tags.clone();
            tree.insert(&path, entry);
        }
        tree
    }
}

/// A node type as listed in menus and the search palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Display name
    pub name: String,
    /// Category path
    pub tags: Vec<String>,
    /// Type ID to pass to `create_node`
    pub type_id: String,
    /// Registration source
    pub origin: NodeOrigin,
}

impl PaletteEntry {
    fn from_descriptor(descriptor: &NodeDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            tags: descriptor.category.clone(),
            type_id: descriptor.type_id.clone(),
            origin: descriptor.origin,
        }
    }

    /// Whether every lowercase term occurs in the name or a tag
    fn matches(&self, terms: &[String]) -> bool {
        let name = self.name.to_lowercase();
        let tags: Vec<String> = self.tags.iter().map(|t| t.to_lowercase()).collect();
        terms.iter().all(|term| {
            name.contains(term.as_str()) || tags.iter().any(|t| t.contains(term.as_str()))
        })
    }
}

/// Nested category menu
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    /// Node types directly in this category
    pub entries: Vec<PaletteEntry>,
    /// Sub-categories by name
    pub children: IndexMap<String, CategoryTree>,
}

impl CategoryTree {
    fn insert(&mut self, path: &[String], entry: PaletteEntry) {
        match path.split_first() {
            None => self.entries.push(entry),
            Some((head, rest)) => self
                .children
                .entry(head.clone())
                .or_default()
                .insert(rest, entry),
        }
    }

    /// Get a sub-category by path
    pub fn get(&self, path: &[&str]) -> Option<&CategoryTree> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(*head)?.get(rest),
        }
    }

    /// Number of node types in this category and below
    pub fn count(&self) -> usize {
        self.entries.len() + self.children.values().map(CategoryTree::count).sum::<usize>()
    }
}

/// Error when resolving node types
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Type ID not found in any tier
    #[error("Unknown node type: {0}")]
    UnknownType(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::SocketSpec;

    const DEFINITIONS: &str = r#"{"Nodes": {
        "print": {"name": "Print", "cat": "Python,IO", "in": [{"name": "value", "type": "in"}],
                  "out": [], "extraAttr": {"py": "print({0})", "isRoot": true}},
        "range": {"name": "Range", "cat": "Python,Builtins,Iter",
                  "in": [{"name": "stop", "type": "num"}], "out": ["result"],
                  "extraAttr": {"py": "range({0})"}},
        "vec": {"name": "Vector", "cat": "Math", "in": [{"name": "q", "type": "quat"}],
                "out": ["v"]}
    }}"#;

    #[test]
    fn test_builtins_resolve() {
        let registry = NodeRegistry::with_builtins();
        assert!(registry.contains("multiply"));
        assert!(registry.contains("builtin::multiply"));
        assert!(matches!(
            registry.create_node("no_such_node"),
            Err(RegistryError::UnknownType(_))
        ));
    }

    #[test]
    fn test_lookup_order_prefers_builtins() {
        let mut registry = NodeRegistry::with_builtins();
        registry.register_extensions([
            NodeDescriptor::new("multiply", "Custom Multiply", NodeOrigin::Builtin)
                .output(SocketSpec::output("Out")),
        ]);
        assert_eq!(registry.resolve("multiply").unwrap().name, "Multiply");
        assert_eq!(registry.resolve("extension::multiply").unwrap().name, "Custom Multiply");
    }

    #[test]
    fn test_definitions_and_custom_socket_kinds() {
        let mut registry = NodeRegistry::new();
        assert_eq!(registry.load_definitions_str(DEFINITIONS, NodeOrigin::Definition).unwrap(), 3);
        // unknown "quat" socket is dropped, node still registered
        assert!(registry.resolve("vec").unwrap().inputs.is_empty());

        registry.register_socket_kind("quat");
        registry.load_definitions_str(DEFINITIONS, NodeOrigin::Definition).unwrap();
        let vec = registry.resolve("vec").unwrap();
        assert_eq!(vec.inputs[0].kind, SocketKind::Custom("quat".to_string()));
        assert_eq!(
            registry.socket_kind_by_type_name("quat"),
            Some(SocketKind::Custom("quat".to_string()))
        );
    }

    #[test]
    fn test_search_matches_names_and_tags() {
        let mut registry = NodeRegistry::new();
        registry.load_definitions_str(DEFINITIONS, NodeOrigin::Definition).unwrap();

        let hits: Vec<String> = registry.search("py ran").into_iter().map(|e| e.type_id).collect();
        assert_eq!(hits, vec!["range"]);
        assert_eq!(registry.search("PYTHON").len(), 2);
        assert_eq!(registry.search("").len(), 3);
    }

    #[test]
    fn test_category_tree_is_deep() {
        let mut registry = NodeRegistry::new();
        registry.load_definitions_str(DEFINITIONS, NodeOrigin::Definition).unwrap();
        let tree = registry.category_tree();

        let iter = tree.get(&["Python", "Builtins", "Iter"]).unwrap();
        assert_eq!(iter.entries[0].name, "Range");
        assert_eq!(tree.get(&["Python"]).unwrap().count(), 2);
        assert_eq!(tree.count(), 3);
    }
}
