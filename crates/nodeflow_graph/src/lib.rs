// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph data model and incremental dataflow evaluation.
//!
//! Users place nodes, wire output plugs to input plugs, and values propagate
//! through the graph as it changes. The same graph can be rendered to source
//! text through per-node templates.
//!
//! ## Architecture
//!
//! The framework is built on a generic graph model with:
//! - Typed sockets owning one or more plugs
//! - Connection validation (different nodes, opposite roles, single-feed inputs)
//! - Depth-first propagation tolerating feedback loops
//! - A three-tier node registry (built-in, extension, definition documents)
//! - JSON project documents and RON editor configuration

pub mod catalog;
pub mod codec;
pub mod codegen;
pub mod config;
pub mod connection;
pub mod definition;
pub mod evaluation;
pub mod events;
pub mod graph;
pub mod node;
pub mod plug;
pub mod project;
pub mod registry;
pub mod shared;
pub mod socket;
pub mod value;

pub use codec::{LoadReport, ProjectDocument};
pub use codegen::CodeGenerator;
pub use config::EditorConfig;
pub use connection::{Connection, ConnectionId, ConnectionState};
pub use evaluation::PropagationReport;
pub use events::{GraphEvent, GraphObserver};
pub use graph::{ConnectOutcome, Graph};
pub use node::{Node, NodeDescriptor, NodeId};
pub use plug::{Plug, PlugId};
pub use project::ProjectSession;
pub use registry::NodeRegistry;
pub use shared::SharedGraph;
pub use socket::{Socket, SocketId, SocketKind, SocketRole};
pub use value::Value;
