//! Canonical clausal forms and structural comparison
//!
//! Two formulas with the same canonical clausal form differ only in the
//! order of literals and clauses and in the names of their variables.

use indexmap::IndexMap;

use super::clause::ClausalForm;
use super::reducer::Clausifier;
use crate::error::Result;
use crate::formula::vocabulary::{
    is_commutative, is_row_variable, is_skolem_constant, is_variable, AND, CANONICAL_ROW_BASE,
    CANONICAL_VAR_BASE, NOT, OR, SKOLEM_FUNCTION,
};
use crate::formula::{make_quantifiers_explicit, Node};

/// Rename variables to `?VAR1`, `?VAR2`, ... and row variables to
/// `@ROWVAR1`, ... in depth-first order of first occurrence.
///
/// With `replace_skolem`, Skolem constants and `SkFn` terms are treated as
/// variables too.
pub fn normalize_variables(node: &Node, replace_skolem: bool) -> Node {
    let mut mapping: IndexMap<Node, Node> = IndexMap::new();
    let mut counts = (0usize, 0usize);
    normalize_into(node, replace_skolem, &mut mapping, &mut counts)
}

fn normalize_into(
    node: &Node,
    replace_skolem: bool,
    mapping: &mut IndexMap<Node, Node>,
    counts: &mut (usize, usize),
) -> Node {
    let replaceable = match node {
        Node::Atom(s) => is_variable(s) || (replace_skolem && is_skolem_constant(s)),
        Node::List(_) => replace_skolem && node.head_is(SKOLEM_FUNCTION),
        Node::Quoted(_) => false,
    };
    if replaceable {
        if let Some(existing) = mapping.get(node) {
            return existing.clone();
        }
        let renamed = match node.as_atom() {
            Some(s) if is_row_variable(s) => {
                counts.1 += 1;
                format!("{}{}", CANONICAL_ROW_BASE, counts.1)
            }
            _ => {
                counts.0 += 1;
                format!("{}{}", CANONICAL_VAR_BASE, counts.0)
            }
        };
        let renamed = Node::Atom(renamed);
        mapping.insert(node.clone(), renamed.clone());
        return renamed;
    }
    match node {
        Node::List(items) => Node::List(
            items
                .iter()
                .map(|item| normalize_into(item, replace_skolem, mapping, counts))
                .collect(),
        ),
        Node::Quoted(inner) => Node::Quoted(Box::new(normalize_into(inner, replace_skolem, mapping, counts))),
        atom => atom.clone(),
    }
}

fn sorted_by_text(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_by_cached_key(Node::to_string);
    nodes
}

/// Sorted, variable-normalized rendering of a clausal form.
///
/// Within each clause the negated literals come first, each group sorted
/// textually; the clauses themselves are then sorted.
pub fn canonical_clausal_form(clausal_form: &ClausalForm) -> Node {
    let clauses: Vec<Node> = clausal_form
        .clauses
        .iter()
        .map(|clause| {
            let negative = sorted_by_text(clause.negative.clone())
                .into_iter()
                .map(|literal| Node::apply(NOT, [literal]));
            let positive = sorted_by_text(clause.positive.clone());
            let mut literals: Vec<Node> = negative.chain(positive).collect();
            if literals.len() == 1 {
                literals.remove(0)
            } else {
                Node::apply(OR, literals)
            }
        })
        .collect();
    let mut clauses = sorted_by_text(clauses);
    let conjunction = if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        Node::apply(AND, clauses)
    };
    normalize_variables(&conjunction, false)
}

/// Clausify `node` and return its canonical clausal form
pub fn to_canonical_clausal_form(node: &Node, clausifier: &Clausifier<'_>) -> Result<Node> {
    let clausal_form = clausifier.clausify(node)?;
    Ok(canonical_clausal_form(&clausal_form))
}

/// Canonical clausal form of the negation of a query, with free variables
/// bound existentially and Skolem terms normalized like variables
pub fn to_open_query_for_negated_dual_form(query: &Node, clausifier: &Clausifier<'_>) -> Result<Node> {
    let explicit = make_quantifiers_explicit(query, true);
    let negated = Node::apply(NOT, [explicit]);
    let canonical = to_canonical_clausal_form(&negated, clausifier)?;
    Ok(normalize_variables(&canonical, true))
}

/// Equality modulo variable names and the order of `and`/`or` arguments
pub fn logically_equals(a: &Node, b: &Node) -> bool {
    if normalize_variables(a, false) == normalize_variables(b, false) {
        return true;
    }
    match (a, b) {
        (Node::List(xs), Node::List(ys)) if xs.len() == ys.len() => {
            match (a.head_symbol(), b.head_symbol()) {
                (Some(op), Some(other)) if op == other && is_commutative(op) => {
                    unordered_equals(&xs[1..], &ys[1..])
                }
                _ => xs.iter().zip(ys).all(|(x, y)| logically_equals(x, y)),
            }
        }
        (Node::Quoted(x), Node::Quoted(y)) => logically_equals(x, y),
        _ => false,
    }
}

fn unordered_equals(xs: &[Node], ys: &[Node]) -> bool {
    let mut remaining: Vec<&Node> = ys.iter().collect();
    for x in xs {
        match remaining.iter().position(|y| logically_equals(x, y)) {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => return false,
        }
    }
    remaining.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_node;
    use crate::rename::FreshNames;

    fn parse(text: &str) -> Node {
        parse_node(text).unwrap()
    }

    #[test]
    fn test_normalize_variables() {
        let node = parse("(p ?Z @R (q ?Y ?Z) @S)");
        assert_eq!(
            normalize_variables(&node, false).to_string(),
            "(p ?VAR1 @ROWVAR1 (q ?VAR2 ?VAR1) @ROWVAR2)"
        );
    }

    #[test]
    fn test_normalize_skolem_terms() {
        let node = parse("(p Sk3 (SkFn 4 ?X) ?X)");
        assert_eq!(
            normalize_variables(&node, true).to_string(),
            "(p ?VAR1 ?VAR2 ?VAR3)"
        );
        assert_eq!(
            normalize_variables(&node, false).to_string(),
            "(p Sk3 (SkFn 4 ?VAR1) ?VAR1)"
        );
    }

    #[test]
    fn test_canonical_form_ignores_order_and_names() {
        let names = FreshNames::new();
        let clausifier = Clausifier::new(&names);
        let a = to_canonical_clausal_form(&parse("(=> (and (p ?X) (q ?X)) (r ?X))"), &clausifier).unwrap();
        let b = to_canonical_clausal_form(&parse("(or (r ?Y) (not (q ?Y)) (not (p ?Y)))"), &clausifier).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "(or (not (p ?VAR1)) (not (q ?VAR1)) (r ?VAR1))");
    }

    #[test]
    fn test_logically_equals() {
        assert!(logically_equals(&parse("(and (p ?X) (q ?X))"), &parse("(and (q ?Y) (p ?Y))")));
        assert!(!logically_equals(&parse("(and (p a) (q a))"), &parse("(and (p a) (q b))")));
        assert!(!logically_equals(&parse("(=> (p a) (q a))"), &parse("(=> (q a) (p a))")));
    }

    #[test]
    fn test_open_query_negated_dual_form() {
        let names = FreshNames::new();
        let clausifier = Clausifier::new(&names);
        // not (exists ?X (p ?X)) is the single clause (not (p ?X))
        let dual = to_open_query_for_negated_dual_form(&parse("(p ?X)"), &clausifier).unwrap();
        assert_eq!(dual.to_string(), "(not (p ?VAR1))");
    }
}
