// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph handle for multi-threaded hosts.
//!
//! The whole graph sits behind one lock; propagation runs synchronously
//! while it is held.

use crate::graph::Graph;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable handle to a graph guarded by a single lock
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<Mutex<Graph>>,
}

impl SharedGraph {
    /// Wrap a graph
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(Mutex::new(graph)),
        }
    }

    /// Lock the graph
    pub fn lock(&self) -> MutexGuard<'_, Graph> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access
    pub fn with<R>(&self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::thread;

    #[test]
    fn test_concurrent_edits() {
        let shared = SharedGraph::default();
        let m = shared.with(|g| g.create_node("add").unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared.with(|g| {
                        let n = g.create_node("numeric_input").unwrap();
                        let socket = g.node(n).unwrap().inputs[0].id;
                        g.set_socket_value(n, socket, Value::Number(i as f64)).unwrap();
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let graph = shared.lock();
        assert_eq!(graph.node_count(), 5);
        assert!(graph.node(m).is_some());
    }
}
