//! Clauses and clausal forms

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::formula::vocabulary::{AND, LOG_FALSE, NOT, OR};
use crate::formula::Node;
use crate::rename::RenameMap;

/// A disjunction split into negated and unnegated literals
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub negative: Vec<Node>,
    pub positive: Vec<Node>,
}

impl Clause {
    pub fn new(negative: Vec<Node>, positive: Vec<Node>) -> Self {
        Clause { negative, positive }
    }

    /// Split a clause formula into literals; a top-level `or` is exploded,
    /// anything else is a single literal.
    pub fn from_disjunction(node: &Node) -> Self {
        let literals: &[Node] = if node.head_is(OR) && !node.args().is_empty() {
            node.args()
        } else {
            std::slice::from_ref(node)
        };
        let mut clause = Clause::default();
        for literal in literals {
            match literal {
                Node::List(items) if items.len() == 2 && literal.head_is(NOT) => {
                    clause.negative.push(items[1].clone())
                }
                Node::Atom(s) if s == LOG_FALSE => clause.negative.push(literal.clone()),
                _ => clause.positive.push(literal.clone()),
            }
        }
        clause
    }

    pub fn len(&self) -> usize {
        self.negative.len() + self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Negative literals first, then positive ones
    pub fn literals(&self) -> impl Iterator<Item = &Node> {
        self.negative.iter().chain(self.positive.iter())
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.literals().flat_map(Node::variables).collect()
    }

    /// Rebuild the clause as a formula, `(or (not n) .. p ..)` when it has
    /// more than one literal
    pub fn to_node(&self) -> Node {
        let mut literals: Vec<Node> = self
            .negative
            .iter()
            .map(|n| Node::apply(NOT, [n.clone()]))
            .chain(self.positive.iter().cloned())
            .collect();
        match literals.len() {
            1 => literals.remove(0),
            _ => Node::apply(OR, literals),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_node())
    }
}

/// Result of clausification: the clauses, the formula they were derived
/// from, the clausified formula itself and the rename graph linking
/// clause variables back to surface variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClausalForm {
    pub clauses: Vec<Clause>,
    pub original: Node,
    pub clausified: Node,
    pub renames: RenameMap,
}

impl ClausalForm {
    /// Surface variable a clause variable descends from
    pub fn original_var<'a>(&'a self, var: &'a str) -> &'a str {
        self.renames.original_var(var)
    }

    /// All literals of all clauses, negative ones first within each clause
    pub fn literals(&self) -> impl Iterator<Item = &Node> {
        self.clauses.iter().flat_map(Clause::literals)
    }

    pub fn negative_literals(&self) -> impl Iterator<Item = &Node> {
        self.clauses.iter().flat_map(|c| c.negative.iter())
    }

    /// The clauses as a single `(and ...)` formula
    pub fn to_node(&self) -> Node {
        let mut clauses: Vec<Node> = self.clauses.iter().map(Clause::to_node).collect();
        match clauses.len() {
            1 => clauses.remove(0),
            _ => Node::apply(AND, clauses),
        }
    }
}

impl fmt::Display for ClausalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_node;

    #[test]
    fn test_from_disjunction() {
        let clause = Clause::from_disjunction(&parse_node("(or (not (p ?X)) (q ?X) FALSE)").unwrap());
        assert_eq!(clause.negative.len(), 2);
        assert_eq!(clause.negative[0].to_string(), "(p ?X)");
        assert_eq!(clause.positive.len(), 1);
        assert_eq!(clause.to_string(), "(or (not (p ?X)) (not FALSE) (q ?X))");
    }

    #[test]
    fn test_single_literal() {
        let clause = Clause::from_disjunction(&parse_node("(not (p a))").unwrap());
        assert_eq!(clause.len(), 1);
        assert!(clause.positive.is_empty());
        assert_eq!(clause.to_string(), "(not (p a))");
    }
}
