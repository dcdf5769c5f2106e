//! Conversion from SUO-KIF formulas to clausal form
//!
//! The conversion is a fixed sequence of structural rewrites over the
//! formula tree. Each pass consumes the output of the previous one; the
//! passes that need fresh names or rename bookkeeping are methods on
//! `Clausifier`, the purely structural ones are free functions.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use super::clause::{ClausalForm, Clause};
use crate::error::{Result, TransformError};
use crate::formula::vocabulary::{
    is_commutative, is_quantifier, is_variable, AND, EXISTS, FORALL, IF, IFF, NOT, OR,
};
use crate::formula::Node;
use crate::rename::{FreshNames, RenameMap};

/// Runs the clausification passes, drawing fresh names from a shared generator
#[derive(Debug, Clone, Copy)]
pub struct Clausifier<'a> {
    names: &'a FreshNames,
}

fn malformed(pass: &'static str, node: &Node) -> TransformError {
    TransformError::Malformed {
        pass,
        formula: node.to_string(),
    }
}

fn into_triple(items: Vec<Node>, pass: &'static str) -> Result<[Node; 3]> {
    <[Node; 3]>::try_from(items).map_err(|items| malformed(pass, &Node::List(items)))
}

fn into_pair(items: Vec<Node>, pass: &'static str) -> Result<[Node; 2]> {
    <[Node; 2]>::try_from(items).map_err(|items| malformed(pass, &Node::List(items)))
}

/// Names bound by a quantifier's variable list
fn quantifier_vars(vars: &Node, pass: &'static str) -> Result<Vec<String>> {
    match vars {
        Node::List(items) => items
            .iter()
            .map(|v| match v {
                Node::Atom(name) if is_variable(name) => Ok(name.clone()),
                _ => Err(malformed(pass, vars)),
            })
            .collect(),
        _ => Err(malformed(pass, vars)),
    }
}

fn is_quantified(items: &[Node]) -> bool {
    matches!(items.first(), Some(Node::Atom(h)) if is_quantifier(h))
}

fn head_is(items: &[Node], symbol: &str) -> bool {
    matches!(items.first(), Some(Node::Atom(h)) if h == symbol)
}

fn negate(node: Node) -> Node {
    Node::List(vec![Node::atom(NOT), node])
}

impl<'a> Clausifier<'a> {
    pub fn new(names: &'a FreshNames) -> Self {
        Clausifier { names }
    }

    pub fn names(&self) -> &'a FreshNames {
        self.names
    }

    /// Convert a formula to clausal form
    pub fn clausify(&self, formula: &Node) -> Result<ClausalForm> {
        // Step 1: Eliminate equivalences
        let node = equivalences_out(formula.clone())?;

        // Step 2: Eliminate implications
        let node = implications_out(node)?;

        // Step 3: Push negations inward
        let node = negations_in(node)?;

        // Step 4: Rename variables apart
        let mut renames = RenameMap::new();
        let node = self.rename_variables(node, &mut renames)?;

        // Step 5: Skolemize
        let node = self.existentials_out(node)?;

        // Step 6: Drop universal quantifiers
        let node = universals_out(node)?;

        // Step 7: Distribute disjunctions over conjunctions
        let node = disjunctions_in(node);

        // Step 8: Standardize apart
        let mut standardized = RenameMap::new();
        let node = self.standardize_apart(node, &mut standardized);
        renames.push_layers(standardized);

        let clauses = operators_out(&node);
        debug!("clausified {} into {} clause(s)", formula, clauses.len());

        Ok(ClausalForm {
            clauses,
            original: formula.clone(),
            clausified: node,
            renames,
        })
    }

    /// Give every variable a globally fresh name.
    ///
    /// Quantified variables are renamed within their scope; variables that
    /// are never quantified get one fresh name for the whole formula.
    /// Every new name is recorded in `all_renames` against the name it
    /// replaced.
    pub fn rename_variables(&self, node: Node, all_renames: &mut RenameMap) -> Result<Node> {
        let mut top_level = IndexMap::new();
        self.rename_scoped(node, &mut top_level, &IndexMap::new(), all_renames)
    }

    fn rename_scoped(
        &self,
        node: Node,
        top_level: &mut IndexMap<String, String>,
        scoped: &IndexMap<String, String>,
        all_renames: &mut RenameMap,
    ) -> Result<Node> {
        match node {
            Node::List(items) if is_quantified(&items) => {
                let [quantifier, vars, body] = into_triple(items, "rename_variables")?;
                let old_vars = quantifier_vars(&vars, "rename_variables")?;
                let mut inner_scope = scoped.clone();
                let mut new_vars = Vec::with_capacity(old_vars.len());
                for old in old_vars {
                    let fresh = self.names.fresh_variable(Some(&old));
                    inner_scope.insert(old.clone(), fresh.clone());
                    all_renames.insert(fresh.clone(), old);
                    new_vars.push(Node::Atom(fresh));
                }
                let body = self.rename_scoped(body, top_level, &inner_scope, all_renames)?;
                Ok(Node::List(vec![quantifier, Node::List(new_vars), body]))
            }
            Node::Atom(name) if is_variable(&name) => {
                if let Some(renamed) = scoped.get(&name).or_else(|| top_level.get(&name)) {
                    return Ok(Node::Atom(renamed.clone()));
                }
                let fresh = self.names.fresh_variable(Some(&name));
                top_level.insert(name.clone(), fresh.clone());
                all_renames.insert(fresh.clone(), name);
                Ok(Node::Atom(fresh))
            }
            other => other.try_map_children(|child| {
                self.rename_scoped(child, top_level, scoped, all_renames)
            }),
        }
    }

    /// Replace existentially quantified variables with Skolem terms over the
    /// universals in scope, and drop the `exists` quantifiers.
    pub fn existentials_out(&self, node: Node) -> Result<Node> {
        let mut implicit = BTreeSet::new();
        collect_implicit_universals(&node, &BTreeSet::new(), &mut implicit);
        let mut substitutions = IndexMap::new();
        self.skolemize(node, &mut substitutions, &implicit, &BTreeSet::new())
    }

    fn skolemize(
        &self,
        node: Node,
        substitutions: &mut IndexMap<String, Node>,
        implicit: &BTreeSet<String>,
        scoped: &BTreeSet<String>,
    ) -> Result<Node> {
        match node {
            Node::List(items) if head_is(&items, FORALL) => {
                let [quantifier, vars, body] = into_triple(items, "existentials_out")?;
                let mut inner_scope = scoped.clone();
                inner_scope.extend(quantifier_vars(&vars, "existentials_out")?);
                let body = self.skolemize(body, substitutions, implicit, &inner_scope)?;
                Ok(Node::List(vec![quantifier, vars, body]))
            }
            Node::List(items) if head_is(&items, EXISTS) => {
                let [_, vars, body] = into_triple(items, "existentials_out")?;
                let universals: BTreeSet<String> = implicit.union(scoped).cloned().collect();
                for var in quantifier_vars(&vars, "existentials_out")? {
                    let term = self.names.fresh_skolem_term(&universals);
                    substitutions.insert(var, term);
                }
                self.skolemize(body, substitutions, implicit, scoped)
            }
            Node::Atom(name) if is_variable(&name) => {
                Ok(substitutions.get(&name).cloned().unwrap_or(Node::Atom(name)))
            }
            other => other.try_map_children(|child| {
                self.skolemize(child, substitutions, implicit, scoped)
            }),
        }
    }

    /// Split on the top-level `and` and give each conjunct its own fresh
    /// variables. `reverse` maps every new name to the name it replaced.
    pub fn standardize_apart(&self, node: Node, reverse: &mut RenameMap) -> Node {
        let clauses = match node {
            Node::List(items) if head_is(&items, AND) && items.len() > 1 => {
                items.into_iter().skip(1).collect::<Vec<_>>()
            }
            other => vec![other],
        };
        let standardized: Vec<Node> = clauses
            .into_iter()
            .map(|clause| {
                let mut renames = IndexMap::new();
                self.standardize_clause(clause, &mut renames, reverse)
            })
            .collect();
        match <[Node; 1]>::try_from(standardized) {
            Ok([single]) => single,
            Err(many) => Node::apply(AND, many),
        }
    }

    fn standardize_clause(
        &self,
        node: Node,
        renames: &mut IndexMap<String, String>,
        reverse: &mut RenameMap,
    ) -> Node {
        match node {
            Node::Atom(name) if is_variable(&name) => {
                if let Some(renamed) = renames.get(&name) {
                    return Node::Atom(renamed.clone());
                }
                let fresh = self.names.fresh_variable(Some(&name));
                renames.insert(name.clone(), fresh.clone());
                reverse.insert(fresh.clone(), name);
                Node::Atom(fresh)
            }
            other => other.map_children(|child| self.standardize_clause(child, renames, reverse)),
        }
    }
}

/// `(<=> A B)` becomes `(and (=> A B) (=> B A))`
pub fn equivalences_out(node: Node) -> Result<Node> {
    match node {
        Node::List(items) if head_is(&items, IFF) => {
            let [_, a, b] = into_triple(items, "equivalences_out")?;
            let a = equivalences_out(a)?;
            let b = equivalences_out(b)?;
            Ok(Node::apply(
                AND,
                [
                    Node::apply(IF, [a.clone(), b.clone()]),
                    Node::apply(IF, [b, a]),
                ],
            ))
        }
        other => other.try_map_children(equivalences_out),
    }
}

/// `(=> A B)` becomes `(or (not A) B)`
pub fn implications_out(node: Node) -> Result<Node> {
    match node {
        Node::List(items) if head_is(&items, IF) => {
            let [_, a, b] = into_triple(items, "implications_out")?;
            Ok(Node::apply(
                OR,
                [negate(implications_out(a)?), implications_out(b)?],
            ))
        }
        other => other.try_map_children(implications_out),
    }
}

/// Push negations down to the atoms, repeating until nothing changes
pub fn negations_in(node: Node) -> Result<Node> {
    let mut current = node;
    loop {
        let next = negations_in_once(current.clone())?;
        if next == current {
            return Ok(next);
        }
        current = next;
    }
}

fn negations_in_once(node: Node) -> Result<Node> {
    match node {
        Node::List(items) if head_is(&items, NOT) && items.len() == 2 && items[1].is_list() => {
            let [_, negated] = into_pair(items, "negations_in")?;
            push_negation(negated)
        }
        Node::List(items) if is_quantified(&items) => {
            let [quantifier, vars, body] = into_triple(items, "negations_in")?;
            Ok(Node::List(vec![quantifier, vars, negations_in_once(body)?]))
        }
        other => other.try_map_children(negations_in_once),
    }
}

/// Rewrite `(not negated)` where `negated` is a list
fn push_negation(negated: Node) -> Result<Node> {
    let mut parts = match negated {
        Node::List(parts) => parts,
        other => return Ok(negate(other)),
    };
    let op = parts.first().and_then(Node::as_atom).map(str::to_owned);
    match op.as_deref() {
        Some(NOT) => {
            let [_, inner] = into_pair(parts, "negations_in")?;
            negations_in_once(inner)
        }
        Some(op) if is_commutative(op) => {
            let dual = if op == AND { OR } else { AND };
            let mut out = vec![Node::atom(dual)];
            for part in parts.drain(1..) {
                out.push(negations_in_once(negate(part))?);
            }
            Ok(Node::List(out))
        }
        Some(op) if is_quantifier(op) => {
            let dual = if op == FORALL { EXISTS } else { FORALL };
            let [_, vars, body] = into_triple(parts, "negations_in")?;
            Ok(Node::List(vec![
                Node::atom(dual),
                vars,
                negations_in_once(negate(body))?,
            ]))
        }
        _ => Ok(negate(negations_in_once(Node::List(parts))?)),
    }
}

/// Variables that occur outside the scope of any quantifier binding them
fn collect_implicit_universals(node: &Node, scoped: &BTreeSet<String>, out: &mut BTreeSet<String>) {
    match node {
        Node::List(items) if is_quantified(items) && items.len() == 3 => {
            let mut inner = scoped.clone();
            if let Some(vars) = items[1].items() {
                inner.extend(vars.iter().filter_map(Node::as_atom).map(str::to_string));
            }
            collect_implicit_universals(&items[2], &inner, out);
        }
        Node::Atom(name) if is_variable(name) && !scoped.contains(name) => {
            out.insert(name.clone());
        }
        Node::Atom(_) => {}
        Node::List(items) => {
            for item in items {
                collect_implicit_universals(item, scoped, out);
            }
        }
        Node::Quoted(inner) => collect_implicit_universals(inner, scoped, out),
    }
}

/// Strip `forall` quantifiers, leaving their bodies
pub fn universals_out(node: Node) -> Result<Node> {
    match node {
        Node::List(items) if head_is(&items, FORALL) => {
            let [_, _, body] = into_triple(items, "universals_out")?;
            universals_out(body)
        }
        other => other.try_map_children(universals_out),
    }
}

/// Flatten nested runs of the same operator, repeating until nothing changes
pub fn nested_operators_out(node: Node) -> Node {
    let mut current = node;
    loop {
        let next = nested_operators_out_once(current.clone());
        if next == current {
            return next;
        }
        current = next;
    }
}

fn nested_operators_out_once(node: Node) -> Node {
    let op = node
        .head_symbol()
        .filter(|h| is_commutative(h) || *h == NOT)
        .map(str::to_string);
    let Some(op) = op else {
        return node.map_children(nested_operators_out_once);
    };
    let items = match node {
        Node::List(items) => items,
        other => return other,
    };
    let mut flat = vec![Node::atom(op.as_str())];
    for child in items.into_iter().skip(1) {
        match child {
            Node::List(mut inner) if head_is(&inner, &op) => {
                if op == NOT {
                    // (not (not x)) collapses to x
                    if inner.len() == 2 {
                        return nested_operators_out_once(inner.swap_remove(1));
                    }
                    flat.push(Node::List(inner));
                } else {
                    flat.extend(inner.into_iter().skip(1).map(nested_operators_out_once));
                }
            }
            other => flat.push(nested_operators_out_once(other)),
        }
    }
    Node::List(flat)
}

/// Distribute `or` over `and` until the formula is a conjunction of
/// disjunctions
pub fn disjunctions_in(node: Node) -> Node {
    let mut current = node;
    loop {
        let next = disjunctions_in_once(nested_operators_out(current.clone()));
        if next == current {
            return next;
        }
        current = next;
    }
}

fn disjunctions_in_once(node: Node) -> Node {
    match node {
        Node::List(items) if head_is(&items, OR) => {
            let mut disjuncts = Vec::with_capacity(items.len());
            let mut conjuncts: Vec<Node> = Vec::new();
            for disjunct in items.into_iter().skip(1) {
                match disjunct {
                    Node::List(inner)
                        if conjuncts.is_empty() && head_is(&inner, AND) && inner.len() > 1 =>
                    {
                        conjuncts = inner.into_iter().skip(1).map(disjunctions_in_once).collect();
                    }
                    other => disjuncts.push(other),
                }
            }
            if conjuncts.is_empty() {
                return Node::apply(OR, disjuncts);
            }
            let distributed = conjuncts.into_iter().map(|conjunct| {
                let mut parts = Vec::with_capacity(disjuncts.len() + 2);
                parts.push(Node::atom(OR));
                parts.push(conjunct);
                parts.extend(disjuncts.iter().cloned());
                disjunctions_in_once(Node::List(parts))
            });
            Node::apply(AND, distributed.collect::<Vec<_>>())
        }
        other => other.map_children(disjunctions_in_once),
    }
}

/// Split a clausified formula into clauses
pub fn operators_out(node: &Node) -> Vec<Clause> {
    let clauses: &[Node] = if node.head_is(AND) && !node.args().is_empty() {
        node.args()
    } else {
        std::slice::from_ref(node)
    };
    clauses.iter().map(Clause::from_disjunction).collect()
}
