//! Fresh name generation and variable rename maps
//!
//! `FreshNames` holds the two counters the pipeline shares: one for
//! variables and one for Skolem symbols. Both are atomics, so a single
//! generator can serve several pipelines running on different threads.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::formula::vocabulary::{is_row_variable, ROW_BASE, SKOLEM_CONSTANT, SKOLEM_FUNCTION, VAR_BASE};
use crate::formula::Node;

/// Generator of fresh variable names and Skolem terms
#[derive(Debug, Default)]
pub struct FreshNames {
    var_index: AtomicU64,
    skolem_index: AtomicU64,
}

impl FreshNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start both counters at given values (used to exercise wrap-around)
    pub fn starting_at(var_index: u64, skolem_index: u64) -> Self {
        FreshNames {
            var_index: AtomicU64::new(var_index),
            skolem_index: AtomicU64::new(skolem_index),
        }
    }

    fn next(counter: &AtomicU64) -> u64 {
        let bump = |v: u64| if v == u64::MAX { 0 } else { v + 1 };
        let previous = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| Some(bump(v)))
            .unwrap_or_else(|v| v);
        bump(previous)
    }

    /// A variable name never returned before by this generator.
    ///
    /// Row-variable hints (`@...`) yield row variables, anything else an
    /// ordinary `?` variable.
    pub fn fresh_variable(&self, hint: Option<&str>) -> String {
        let base = match hint {
            Some(h) if is_row_variable(h) => ROW_BASE,
            _ => VAR_BASE,
        };
        format!("{}{}", base, Self::next(&self.var_index))
    }

    /// `(SkFn N v1 .. vk)` over the sorted variables, or `SkN` when there are none
    pub fn fresh_skolem_term(&self, universals: &BTreeSet<String>) -> Node {
        let index = Self::next(&self.skolem_index);
        if universals.is_empty() {
            return Node::atom(format!("{}{}", SKOLEM_CONSTANT, index));
        }
        let mut items = Vec::with_capacity(universals.len() + 2);
        items.push(Node::atom(SKOLEM_FUNCTION));
        items.push(Node::atom(index.to_string()));
        items.extend(universals.iter().map(|v| Node::atom(v.as_str())));
        Node::List(items)
    }
}

/// Map from a newly introduced variable to the variable it replaced.
///
/// Each renaming pass contributes one layer. A generated name may be spelled
/// like a surface variable of the input (`?X2`, `@ROW1`), so a lookup never
/// chains within a layer: `original_var` takes exactly one step per layer,
/// newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMap {
    layers: Vec<IndexMap<String, String>>,
}

impl RenameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rename in the newest layer
    pub fn insert(&mut self, new_name: impl Into<String>, old_name: impl Into<String>) {
        if self.layers.is_empty() {
            self.layers.push(IndexMap::new());
        }
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(new_name.into(), old_name.into());
        }
    }

    /// The name `name` replaced in the newest layer
    pub fn get(&self, name: &str) -> Option<&str> {
        self.layers.last()?.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Stack the layers of a later pass on top of this map
    pub fn push_layers(&mut self, later: RenameMap) {
        self.layers.extend(later.layers);
    }

    /// Follow `var` back through every layer to the surface name
    pub fn original_var<'a>(&'a self, var: &'a str) -> &'a str {
        self.layers
            .iter()
            .rev()
            .fold(var, |current, layer| layer.get(current).map_or(current, String::as_str))
    }

    /// Each name of the newest layer against its surface name
    pub fn composed(&self) -> IndexMap<String, String> {
        self.layers
            .last()
            .map(|layer| {
                layer
                    .keys()
                    .map(|name| (name.clone(), self.original_var(name).to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
