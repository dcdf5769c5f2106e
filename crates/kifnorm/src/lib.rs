//! kifnorm: SUO-KIF normalization to clausal form
//!
//! This library turns SUO-KIF formulas into clausal normal form and TPTP
//! first-order syntax. Row variables are expanded against relation arities
//! and predicate variables are instantiated from a knowledge base before
//! clausification.

pub mod clausal;
pub mod config;
pub mod error;
pub mod formula;
pub mod json;
pub mod kb;
pub mod pred_vars;
pub mod preprocess;
pub mod rename;
pub mod row_vars;
pub mod tptp;

// Re-export the formula types
pub use formula::{is_balanced, parse_node, parse_nodes, Formula, Node, SourceLocation};

// Re-export clausal form types
pub use clausal::{
    canonical_clausal_form, logically_equals, normalize_variables, to_canonical_clausal_form,
    to_open_query_for_negated_dual_form, ClausalForm, Clause, Clausifier,
};

pub use config::NormalizerConfig;
pub use error::{Diagnostic, Diagnostics, Result, Severity, TransformError};
pub use kb::{KnowledgeBase, MemoryKb};
pub use pred_vars::{Instantiation, PredVarInstantiator};
pub use preprocess::{is_ok_for_inference, preprocess_recurse, Pipeline, ProcessedFormula};
pub use rename::{FreshNames, RenameMap};
pub use row_vars::{RowVarExpander, RowVarRange};
pub use tptp::{translate_formula, translate_text};
