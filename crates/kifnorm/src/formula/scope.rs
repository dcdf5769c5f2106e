//! Variable scope queries and explicit quantification

use std::collections::BTreeSet;

use super::node::Node;
use super::vocabulary::{is_quantifier, is_variable, DOC_PREDICATES, EXISTS, FORALL, VAR_PREFIX};

/// Variables bound by some quantifier (or `KappaFn`) anywhere in `node`
pub fn collect_quantified_variables(node: &Node) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        match current {
            Node::List(items) => {
                let binds = current
                    .head_symbol()
                    .is_some_and(|h| is_quantifier(h) || h == "KappaFn");
                if binds {
                    match items.get(1) {
                        Some(Node::List(vars)) => {
                            out.extend(vars.iter().filter_map(Node::as_atom).map(str::to_string))
                        }
                        Some(Node::Atom(var)) if is_variable(var) => {
                            out.insert(var.clone());
                        }
                        _ => {}
                    }
                }
                stack.extend(items.iter());
            }
            Node::Quoted(inner) => stack.push(inner),
            Node::Atom(_) => {}
        }
    }
    out
}

/// Ordinary (`?`) variables that are never quantified, in order of appearance
pub fn collect_unquantified_variables(node: &Node) -> Vec<String> {
    let quantified = collect_quantified_variables(node);
    node.variables_in_order()
        .into_iter()
        .filter(|v| v.starts_with(VAR_PREFIX) && !quantified.contains(v))
        .collect()
}

/// Wrap free variables in `forall`, or `exists` for a query.
///
/// Documentation-style relations are returned untouched.
pub fn make_quantifiers_explicit(node: &Node, query: bool) -> Node {
    if node.head_symbol().is_some_and(|h| DOC_PREDICATES.contains(&h)) {
        return node.clone();
    }
    let free = collect_unquantified_variables(node);
    if free.is_empty() {
        return node.clone();
    }
    let quantifier = if query { EXISTS } else { FORALL };
    Node::apply(
        quantifier,
        [Node::List(free.into_iter().map(Node::Atom).collect()), node.clone()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::reader::parse_node;

    #[test]
    fn test_quantified_and_free() {
        let node = parse_node("(=> (p ?X ?Z) (exists (?Y) (q ?X ?Y @ROW)))").unwrap();
        let quantified: Vec<_> = collect_quantified_variables(&node).into_iter().collect();
        assert_eq!(quantified, vec!["?Y"]);
        assert_eq!(collect_unquantified_variables(&node), vec!["?X", "?Z"]);
    }

    #[test]
    fn test_make_quantifiers_explicit() {
        let node = parse_node("(p ?X ?Y)").unwrap();
        assert_eq!(
            make_quantifiers_explicit(&node, false).to_string(),
            "(forall (?X ?Y) (p ?X ?Y))"
        );
        assert_eq!(
            make_quantifiers_explicit(&node, true).to_string(),
            "(exists (?X ?Y) (p ?X ?Y))"
        );

        let doc = parse_node("(documentation ?X EnglishLanguage \"text\")").unwrap();
        assert_eq!(make_quantifiers_explicit(&doc, false), doc);
    }
}
