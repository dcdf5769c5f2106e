//! Predicate-variable instantiation
//!
//! A variable in predicate position, as in `(?REL ?A ?B)`, is replaced by
//! every relation the knowledge base offers that satisfies the literals
//! constraining it elsewhere in the formula. When no relation fits, the
//! formula is rejected.

use std::collections::{HashSet, VecDeque};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::clausal::Clausifier;
use crate::error::Result;
use crate::formula::vocabulary::{
    is_commutative, is_logical_operator, is_quantifier, is_skolem_constant, is_variable, HOLDS,
    INSTANCE, SKOLEM_FUNCTION, VAR_PREFIX,
};
use crate::formula::{collect_quantified_variables, Formula, Node};
use crate::kb::KnowledgeBase;

const PREDICATE: &str = "Predicate";
const RELATION: &str = "Relation";

/// Outcome of instantiating a formula's predicate variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instantiation {
    /// No predicate variables; the formula is used as is
    Unchanged,
    /// One formula per consistent binding combination
    Instances(Vec<Formula>),
    /// Some predicate variable has no consistent binding
    Reject,
}

/// How the variables of a formula are used as predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredVarUsage {
    /// Each collected variable with the argument types inferred for it
    pub vars: IndexMap<String, Vec<String>>,
    /// Variables found in predicate (arg0) position
    pub predicate_vars: IndexSet<String>,
}

impl PredVarUsage {
    pub fn has_predicate_vars(&self) -> bool {
        !self.predicate_vars.is_empty()
    }
}

/// Ground answers for the literals constraining one predicate variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTuples {
    /// Literals to remove from the formula once the variable is bound
    pub simplification_lits: Vec<Node>,
    /// The literal whose argument positions the answers bind
    pub key_lit: Node,
    /// Ground instances of `key_lit`
    pub answers: Vec<Node>,
}

/// Whether some list anywhere in `node` applies a variable, either in head
/// position or through `holds`
fn has_variable_head(node: &Node) -> bool {
    match node {
        Node::List(items) => {
            let applied = if node.head_is(HOLDS) { items.get(1) } else { items.first() };
            applied.is_some_and(Node::is_variable) || items.iter().any(has_variable_head)
        }
        Node::Quoted(inner) => has_variable_head(inner),
        Node::Atom(_) => false,
    }
}

fn contains_skolem(node: &Node) -> bool {
    let mut found = false;
    node.visit_atoms(&mut |atom| found |= atom == SKOLEM_FUNCTION || is_skolem_constant(atom));
    found
}

fn count_ordinary_vars(node: &Node) -> usize {
    let mut count = 0;
    node.visit_atoms(&mut |atom| {
        if atom.starts_with(VAR_PREFIX) {
            count += 1;
        }
    });
    count
}

/// Replace `var` by `term` everywhere, dropping `holds` from `(holds var ..)`
fn substitute_predicate_var(node: &Node, var: &str, term: &Node) -> Node {
    match node {
        Node::Atom(s) if s == var => term.clone(),
        Node::List(items) => {
            let drop_holds = node.head_is(HOLDS) && items.get(1).and_then(Node::as_atom) == Some(var);
            let skip = usize::from(drop_holds);
            Node::List(
                items
                    .iter()
                    .skip(skip)
                    .map(|item| substitute_predicate_var(item, var, term))
                    .collect(),
            )
        }
        Node::Quoted(inner) => Node::Quoted(Box::new(substitute_predicate_var(inner, var, term))),
        atom => atom.clone(),
    }
}

/// Remove `lit` where it is a conjunct, disjunct or one side of a rule.
///
/// Used to drop the literals that only served to constrain a predicate
/// variable once the variable has been bound.
pub fn maybe_remove_matching_lits(node: &Node, lit: &Node) -> Node {
    let Some(items) = node.items() else {
        return node.clone();
    };
    let Some(head) = node.head_symbol() else {
        return node.clone();
    };
    if node.is_rule() {
        if &items[1] == lit {
            return maybe_remove_matching_lits(&items[2], lit);
        }
        if &items[2] == lit {
            return maybe_remove_matching_lits(&items[1], lit);
        }
        return Node::List(vec![
            items[0].clone(),
            maybe_remove_matching_lits(&items[1], lit),
            maybe_remove_matching_lits(&items[2], lit),
        ]);
    }
    if (is_quantifier(head) || head == "holdsDuring" || head == "KappaFn") && items.len() == 3 {
        return Node::List(vec![
            items[0].clone(),
            items[1].clone(),
            maybe_remove_matching_lits(&items[2], lit),
        ]);
    }
    if is_commutative(head) {
        let mut args: Vec<&Node> = items[1..].iter().collect();
        if let Some(position) = args.iter().position(|arg| *arg == lit) {
            if args.len() > 1 {
                args.remove(position);
            }
        }
        let mut rebuilt: Vec<Node> = args
            .into_iter()
            .map(|arg| maybe_remove_matching_lits(arg, lit))
            .collect();
        return match rebuilt.len() {
            1 => rebuilt.remove(0),
            _ => Node::apply(head, rebuilt),
        };
    }
    node.clone()
}

/// Instantiates predicate variables from knowledge-base answers
pub struct PredVarInstantiator<'a> {
    kb: &'a dyn KnowledgeBase,
    clausifier: Clausifier<'a>,
}

impl<'a> PredVarInstantiator<'a> {
    pub fn new(kb: &'a dyn KnowledgeBase, clausifier: Clausifier<'a>) -> Self {
        PredVarInstantiator { kb, clausifier }
    }

    /// Collect predicate variables and the argument types their other uses imply
    pub fn gather_pred_vars(&self, node: &Node) -> PredVarUsage {
        let mut usage = PredVarUsage::default();
        let mut queue: VecDeque<&Node> = VecDeque::from([node]);

        while let Some(current) = queue.pop_front() {
            let items = match current {
                Node::List(items) if !items.is_empty() => items,
                Node::Quoted(inner) => {
                    queue.push_back(inner);
                    continue;
                }
                _ => continue,
            };
            match &items[0] {
                Node::Atom(h) if is_quantifier(h) || h == "holdsDuring" || h == "KappaFn" => {
                    if let Some(body) = items.get(2) {
                        queue.push_back(body);
                    }
                }
                Node::Atom(h) if h == HOLDS => {
                    // (holds ?R a b) is (?R a b)
                    if let Some(Node::Atom(var)) = items.get(1) {
                        if is_variable(var) {
                            usage.vars.entry(var.clone()).or_default();
                            usage.predicate_vars.insert(var.clone());
                        }
                    }
                    queue.extend(items[1..].iter().filter(|item| item.is_list()));
                }
                Node::Atom(h) if is_variable(h) => {
                    usage.vars.entry(h.clone()).or_default();
                    usage.predicate_vars.insert(h.clone());
                    queue.extend(items[1..].iter().filter(|item| item.is_list()));
                }
                head => {
                    let signature = head.as_atom().and_then(|h| self.kb.argument_signature(h));
                    for (position, arg) in items.iter().enumerate().skip(1) {
                        let accepts_relation = signature
                            .as_ref()
                            .and_then(|s| s.get(position))
                            .copied()
                            .unwrap_or(false);
                        match arg {
                            Node::Atom(var) if accepts_relation && is_variable(var) => {
                                let types = usage.vars.entry(var.clone()).or_default();
                                let arg_type = head
                                    .as_atom()
                                    .and_then(|h| self.kb.arg_type(h, position));
                                if let Some(arg_type) = arg_type {
                                    if !types.contains(&arg_type) {
                                        types.push(arg_type);
                                    }
                                }
                            }
                            Node::List(_) | Node::Quoted(_) => queue.push_back(arg),
                            _ => {}
                        }
                    }
                }
            }
        }
        usage
    }

    /// Drop any type that a more specific type in the list already implies
    fn winnow_types(&self, types: &mut Vec<String>) {
        let snapshot = types.clone();
        types.retain(|general| {
            !snapshot
                .iter()
                .any(|specific| specific != general && self.kb.is_subclass_of(specific, general))
        });
    }

    /// Literals to query the knowledge base with for `var`.
    ///
    /// Negative literals of the clausal form that mention `var` as an
    /// ordinary argument are used directly; inferred argument types become
    /// `(instance var Type)` literals unless an explicit instance literal
    /// already implies them.
    pub fn query_literals(&self, formula: &Formula, var: &str, types: &[String]) -> Result<Vec<Node>> {
        let clausal_form = formula.clausal_form(&self.clausifier)?;
        let mut literals: IndexSet<Node> = IndexSet::new();
        let mut used_as_predicate = false;

        'literals: for literal in clausal_form.negative_literals() {
            if contains_skolem(literal) {
                continue;
            }
            let Some(items) = literal.items() else {
                continue;
            };
            let Some(head) = items.first().and_then(Node::as_atom) else {
                continue;
            };
            if is_variable(head) {
                used_as_predicate |= clausal_form.original_var(head) == var;
                continue;
            }
            let mut query = vec![Node::atom(head)];
            let mut found_var = false;
            for arg in &items[1..] {
                match arg {
                    Node::Atom(a) if is_variable(a) => {
                        let original = clausal_form.original_var(a);
                        found_var |= original == var;
                        query.push(Node::atom(original));
                    }
                    Node::Atom(_) => query.push(arg.clone()),
                    _ => continue 'literals,
                }
            }
            let queryable = head == INSTANCE || self.kb.argument_signature(head).is_some();
            let about_relation = head == INSTANCE && query.get(2).and_then(Node::as_atom) == Some(RELATION);
            if queryable && found_var && !about_relation {
                literals.insert(Node::List(query));
            }
        }

        let explicit_classes: Vec<String> = literals
            .iter()
            .filter(|lit| lit.head_is(INSTANCE) && lit.argument(1).and_then(Node::as_atom) == Some(var))
            .filter_map(|lit| lit.argument(2).and_then(Node::as_atom).map(str::to_string))
            .collect();

        let mut types = types.to_vec();
        if used_as_predicate && !types.iter().any(|t| t == PREDICATE) {
            types.push(PREDICATE.to_string());
        }
        self.winnow_types(&mut types);

        for class in types {
            if class == RELATION {
                continue;
            }
            let implied = explicit_classes
                .iter()
                .any(|explicit| *explicit == class || self.kb.is_subclass_of(explicit, &class));
            if implied || (class == PREDICATE && !literals.is_empty()) {
                continue;
            }
            literals.insert(Node::apply(INSTANCE, [Node::atom(var), Node::atom(class)]));
        }
        Ok(literals.into_iter().collect())
    }

    /// Query the literals for `var` and intersect their answers.
    ///
    /// Returns `None` when some literal has no answers, or when the answers
    /// disagree on every binding of `var`.
    pub fn substitution_tuples(&self, var: &str, mut literals: Vec<Node>) -> Option<SubstitutionTuples> {
        literals.sort_by_key(|lit| std::cmp::Reverse(count_ordinary_vars(lit)));
        let mut simplification_lits = Vec::with_capacity(literals.len());
        let mut key: Option<(Node, Vec<Node>)> = None;

        for literal in literals {
            let answers = self.kb.query_by_literal_pattern(&literal);
            if answers.is_empty() {
                debug!("no answers for {} constraining {}", literal, var);
                return None;
            }
            simplification_lits.push(literal.clone());
            match key.as_mut() {
                None => key = Some((literal, answers)),
                Some((key_lit, key_answers)) => {
                    let (Some(column), Some(key_column)) = (var_column(&literal, var), var_column(key_lit, var)) else {
                        continue;
                    };
                    let bindings: HashSet<&Node> = answers.iter().filter_map(|a| a.argument(column)).collect();
                    key_answers.retain(|a| a.argument(key_column).is_some_and(|v| bindings.contains(v)));
                }
            }
        }

        let (key_lit, answers) = key?;
        if answers.is_empty() {
            return None;
        }
        Some(SubstitutionTuples {
            simplification_lits,
            key_lit,
            answers,
        })
    }

    /// Instantiate every predicate variable of `formula`
    pub fn instantiate(&self, formula: &Formula) -> Result<Instantiation> {
        let tree = formula.tree();
        let engages = tree.head_symbol().is_some_and(is_logical_operator) && has_variable_head(tree);
        if !engages {
            return Ok(Instantiation::Unchanged);
        }
        let usage = self.gather_pred_vars(tree);
        if !usage.has_predicate_vars() {
            return Ok(Instantiation::Unchanged);
        }

        let mut tuples: Vec<SubstitutionTuples> = Vec::new();
        for (var, types) in &usage.vars {
            let literals = self.query_literals(formula, var, types)?;
            if literals.is_empty() {
                continue;
            }
            match self.substitution_tuples(var, literals) {
                Some(found) => {
                    let position = tuples
                        .iter()
                        .position(|t| t.answers.len() > found.answers.len())
                        .unwrap_or(tuples.len());
                    tuples.insert(position, found);
                }
                None if usage.predicate_vars.contains(var) => {
                    debug!("no instantiation of {} in {}", var, tree);
                    return Ok(Instantiation::Reject);
                }
                None => {}
            }
        }
        if tuples.is_empty() {
            return Ok(Instantiation::Reject);
        }

        let mut simplified = tree.clone();
        for found in &tuples {
            for lit in &found.simplification_lits {
                simplified = maybe_remove_matching_lits(&simplified, lit);
            }
        }

        let mut templates: IndexSet<Node> = IndexSet::from([simplified]);
        for found in &tuples {
            let key_items = found.key_lit.items().unwrap_or(&[]);
            let mut next = IndexSet::new();
            for answer in &found.answers {
                for template in &templates {
                    let quantified = collect_quantified_variables(template);
                    let mut result = template.clone();
                    for (position, slot) in key_items.iter().enumerate() {
                        let Some(slot_var) = slot.as_atom().filter(|s| is_variable(s)) else {
                            continue;
                        };
                        if quantified.contains(slot_var) {
                            continue;
                        }
                        if let Some(term) = answer.argument(position) {
                            result = substitute_predicate_var(&result, slot_var, term);
                        }
                    }
                    next.insert(result);
                }
            }
            templates = next;
        }

        if templates.is_empty() {
            return Ok(Instantiation::Reject);
        }
        Ok(Instantiation::Instances(
            templates.into_iter().map(|node| formula.derive(node)).collect(),
        ))
    }
}

fn var_column(literal: &Node, var: &str) -> Option<usize> {
    literal
        .items()?
        .iter()
        .position(|item| item.as_atom() == Some(var))
}
