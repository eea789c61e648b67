// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered lookup chain for template context.
//!
//! A chain node carries a flat mapping and an optional parent; resolution
//! walks child-first. `new_child` layers a node over an existing chain, so
//! `specific.over(&general)` consults `specific` before `general`.

use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug)]
struct ContextNode {
    vars: Map<String, Value>,
    parent: Option<Arc<ContextNode>>,
}

/// Immutable, cheaply cloneable context chain.
#[derive(Debug, Clone)]
pub struct ContextChain {
    node: Arc<ContextNode>,
}

impl ContextChain {
    /// Single-node chain over a JSON object. Non-object values yield an
    /// empty node.
    pub fn new(vars: Value) -> Self {
        let vars = match vars {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            node: Arc::new(ContextNode { vars, parent: None }),
        }
    }

    /// A chain whose lookups consult `self` first, then `parent`.
    pub fn new_child(&self, parent: &ContextChain) -> Self {
        Self {
            node: Arc::new(ContextNode {
                vars: self.node.vars.clone(),
                parent: Some(Arc::clone(&parent.node)),
            }),
        }
    }

    /// Resolve a top-level key by walking the chain.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut node = Some(&self.node);
        while let Some(current) = node {
            if let Some(value) = current.vars.get(key) {
                return Some(value);
            }
            node = current.parent.as_ref();
        }
        None
    }

    /// Flatten into one object for the renderer: parent values first,
    /// children override key-by-key.
    pub fn flatten(&self) -> Value {
        let mut layers = Vec::new();
        let mut node = Some(&self.node);
        while let Some(current) = node {
            layers.push(&current.vars);
            node = current.parent.as_ref();
        }

        let mut merged = Map::new();
        for vars in layers.into_iter().rev() {
            for (key, value) in vars {
                merged.insert(key.clone(), value.clone());
            }
        }
        Value::Object(merged)
    }
}

impl Default for ContextChain {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
