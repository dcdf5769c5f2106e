//! Normalizer configuration types.

use serde::{Deserialize, Serialize};

/// Configuration for the pre-processing and clausification pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Stop row-variable expansion once this many formulas have accumulated
    pub axiom_expansion_limit: usize,
    /// Relations applied to more arguments than this trigger a warning
    pub max_predicate_arity: usize,
    /// Upper bound of a row-variable range when no relation constrains it
    pub row_var_max_expansion: usize,
    /// Rewrite relations as `holds_N__` / `apply_N__` applications
    pub holds_prefix: bool,
    /// Add `(instance X SetOrClass)` for the class arguments of subclass and instance
    pub add_set_or_class_instances: bool,
    /// Suffix variable-arity relations with their argument count
    pub rename_variable_arity_relations: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            axiom_expansion_limit: 2000,
            max_predicate_arity: 7,
            row_var_max_expansion: 8,
            holds_prefix: false,
            add_set_or_class_instances: true,
            rename_variable_arity_relations: false,
        }
    }
}

impl NormalizerConfig {
    /// Read a configuration from JSON, falling back to defaults for missing fields
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Largest argument count accepted without a warning
    pub fn arity_warning_threshold(&self) -> usize {
        if self.holds_prefix {
            self.max_predicate_arity + 1
        } else {
            self.max_predicate_arity
        }
    }
}
