//! Clausal normal form: the reduction passes, clause types and canonical forms

pub mod canonical;
pub mod clause;
pub mod reducer;


pub use canonical::{
    canonical_clausal_form, logically_equals, normalize_variables, to_canonical_clausal_form,
    to_open_query_for_negated_dual_form,
};
pub use clause::{ClausalForm, Clause};
pub use reducer::{
    disjunctions_in, equivalences_out, implications_out, negations_in, nested_operators_out,
    operators_out, universals_out, Clausifier,
};
