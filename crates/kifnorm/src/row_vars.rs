//! Row-variable expansion
//!
//! A row variable `@ROW` stands for any number of arguments. Expansion
//! replaces it with sequences `?ROW1 .. ?ROWn` of ordinary variables, for
//! every count the relations applied to it allow.

use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clausal::Clausifier;
use crate::config::NormalizerConfig;
use crate::error::{Diagnostic, Diagnostics, Result};
use crate::formula::vocabulary::{is_variable, ROW_PREFIX, SKOLEM_FUNCTION, VAR_PREFIX};
use crate::formula::{Formula, Node};
use crate::kb::KnowledgeBase;
use crate::rename::RenameMap;

/// Inclusive lower and exclusive upper bound on a row variable's expansion count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowVarRange {
    pub min: usize,
    pub max: usize,
}

impl RowVarRange {
    pub fn new(min: usize, max: usize) -> Self {
        RowVarRange { min, max }
    }

    /// A minimum of 0 means no fixed-arity relation constrains the variable
    pub fn has_variable_arity(&self) -> bool {
        self.min == 0
    }
}

/// Names of the row variables in `node`, without the `@`
pub fn find_row_vars(node: &Node) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    node.visit_atoms(&mut |atom| {
        if let Some(name) = atom.strip_prefix(ROW_PREFIX) {
            if !name.is_empty() {
                out.insert(name.to_string());
            }
        }
    });
    out
}

/// Lower an expansion count when the row variable shares a literal with
/// fixed arguments, as in `(pred @ROW ?ITEM)`. Never returns less than 2.
pub fn adjust_expansion_count(node: &Node, variable_arity: bool, count: usize, row_var: &str) -> usize {
    let row_atom = if row_var.starts_with(ROW_PREFIX) {
        row_var.to_string()
    } else {
        format!("{}{}", ROW_PREFIX, row_var)
    };
    let count = count as isize;
    let mut revised = count;
    let mut queue: VecDeque<&Node> = VecDeque::new();
    if node.is_list() && !node.is_empty_list() {
        queue.push_back(node);
    }
    while let Some(current) = queue.pop_front() {
        let items = current.items().unwrap_or(&[]);
        let len = items.len() as isize;
        let applies_row = items.iter().any(|item| item.as_atom() == Some(row_atom.as_str()));
        let head_is_variable = items.first().is_some_and(Node::is_variable);
        if applies_row && !head_is_variable {
            if !variable_arity && len > 2 {
                revised = count - (len - 2);
            } else if variable_arity {
                revised = 10 - len;
            }
        }
        revised = revised.max(2);
        queue.extend(items.iter().filter(|item| item.is_list() && !item.is_empty_list()));
    }
    revised.max(2) as usize
}

/// Replace every `row_atom` element of a list with the `replacement` sequence
fn splice_row_var(node: &Node, row_atom: &str, replacement: &[Node]) -> Node {
    match node {
        Node::List(items) => {
            let mut out = Vec::with_capacity(items.len() + replacement.len());
            for item in items {
                if item.as_atom() == Some(row_atom) {
                    out.extend(replacement.iter().cloned());
                } else {
                    out.push(splice_row_var(item, row_atom, replacement));
                }
            }
            Node::List(out)
        }
        Node::Quoted(inner) => Node::Quoted(Box::new(splice_row_var(inner, row_atom, replacement))),
        atom => atom.clone(),
    }
}

/// Relations applied to each row variable in a literal, keyed by the
/// surface name of the row variable
fn collect_row_var_relations(
    literal: &Node,
    renames: &RenameMap,
    out: &mut IndexMap<String, BTreeSet<String>>,
) {
    let Some(items) = literal.items() else {
        return;
    };
    let relation = match items.first().and_then(Node::as_atom) {
        Some(head) if !is_variable(head) && head != SKOLEM_FUNCTION => head,
        _ => return,
    };
    for arg in &items[1..] {
        match arg {
            Node::Atom(var) if is_variable(var) => {
                let original = renames.original_var(var);
                if original.starts_with(ROW_PREFIX) {
                    out.entry(original.to_string())
                        .or_default()
                        .insert(relation.to_string());
                }
            }
            Node::List(_) => collect_row_var_relations(arg, renames, out),
            _ => {}
        }
    }
}

/// Expands the row variables of a formula against a knowledge base
pub struct RowVarExpander<'a> {
    kb: &'a dyn KnowledgeBase,
    clausifier: Clausifier<'a>,
    config: &'a NormalizerConfig,
    diagnostics: &'a Diagnostics,
}

impl<'a> RowVarExpander<'a> {
    pub fn new(
        kb: &'a dyn KnowledgeBase,
        clausifier: Clausifier<'a>,
        config: &'a NormalizerConfig,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        RowVarExpander {
            kb,
            clausifier,
            config,
            diagnostics,
        }
    }

    /// Expansion range of every row variable, from the relations applied to
    /// it in the formula's clausal form
    pub fn row_vars_min_max(&self, formula: &Formula) -> Result<IndexMap<String, RowVarRange>> {
        let clausal_form = formula.clausal_form(&self.clausifier)?;
        let mut relations = IndexMap::new();
        for literal in clausal_form.literals() {
            collect_row_var_relations(literal, &clausal_form.renames, &mut relations);
        }

        let mut ranges = IndexMap::new();
        for (row_var, relns) in relations {
            let mut range = RowVarRange::new(0, self.config.row_var_max_expansion);
            for reln in relns {
                match self.kb.relation_arity(&reln) {
                    Some(arity) if arity >= 1 && !self.kb.is_variable_arity_relation(&reln) => {
                        range.min = 1;
                        range.max = range.max.min(arity + 1);
                    }
                    // variable arity or unknown
                    _ => {}
                }
            }
            ranges.insert(row_var, range);
        }
        Ok(ranges)
    }

    /// Range for one row variable (named with or without `@`)
    pub fn expansion_range(&self, formula: &Formula, row_var: &str) -> Result<RowVarRange> {
        let key = if row_var.starts_with(ROW_PREFIX) {
            row_var.to_string()
        } else {
            format!("{}{}", ROW_PREFIX, row_var)
        };
        let ranges = self.row_vars_min_max(formula)?;
        Ok(ranges
            .get(&key)
            .copied()
            .unwrap_or(RowVarRange::new(1, self.config.row_var_max_expansion)))
    }

    /// Every expansion of the formula's row variables.
    ///
    /// A rule whose two sides are identical is a tautology and yields
    /// nothing. A formula without row variables is returned as is.
    pub fn expand(&self, formula: &Formula) -> Result<Vec<Formula>> {
        let tree = formula.tree();
        if tree.is_rule() && tree.argument(1) == tree.argument(2) {
            debug!("skipping tautology {}", tree);
            return Ok(Vec::new());
        }
        let row_vars = find_row_vars(tree);
        if row_vars.is_empty() {
            return Ok(vec![formula.clone()]);
        }

        let limit = self.config.axiom_expansion_limit;
        let mut current = vec![tree.clone()];
        for row in &row_vars {
            let range = self.expansion_range(formula, row)?;
            let max = adjust_expansion_count(tree, range.has_variable_arity(), range.max, row);
            let row_atom = format!("{}{}", ROW_PREFIX, row);

            let mut next = Vec::new();
            'formulas: for node in &current {
                for count in range.min.max(1)..max {
                    let replacement: Vec<Node> = (1..=count)
                        .map(|j| Node::atom(format!("{}{}{}", VAR_PREFIX, row, j)))
                        .collect();
                    next.push(splice_row_var(node, &row_atom, &replacement));
                    if next.len() >= limit {
                        self.diagnostics.report(
                            Diagnostic::warning(format!(
                                "Row variable expansion stopped after {} formulas",
                                limit
                            ))
                            .with_formula(tree)
                            .with_location(formula.source()),
                        );
                        break 'formulas;
                    }
                }
            }
            debug!("expanded @{} in {} to {} formula(s)", row, tree, next.len());
            current = next;
        }
        Ok(current.into_iter().map(|node| formula.derive(node)).collect())
    }
}

/// Whether any relation in `node` is declared variable-arity
pub fn contains_variable_arity_relation(node: &Node, kb: &dyn KnowledgeBase) -> bool {
    let mut found = false;
    node.visit_atoms(&mut |atom| found |= kb.is_variable_arity_relation(atom));
    found
}

/// Suffix each variable-arity relation in head position with its argument
/// count, e.g. `(ListFn a b)` becomes `(ListFn_2 a b)`
pub fn rename_variable_arity_relations(node: &Node, kb: &dyn KnowledgeBase) -> Node {
    match node {
        Node::List(items) => {
            let suffix = format!("_{}", items.len().saturating_sub(1));
            Node::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Node::Atom(head)
                            if i == 0
                                && kb.is_variable_arity_relation(head)
                                && !head.ends_with(&suffix) =>
                        {
                            Node::atom(format!("{}{}", head, suffix))
                        }
                        _ => rename_variable_arity_relations(item, kb),
                    })
                    .collect(),
            )
        }
        Node::Quoted(inner) => Node::Quoted(Box::new(rename_variable_arity_relations(inner, kb))),
        atom => atom.clone(),
    }
}
