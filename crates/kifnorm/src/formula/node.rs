//! Parsed s-expression tree and its list accessors

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::vocabulary::{is_function, is_variable, IF, IFF};

/// A parsed SUO-KIF expression.
///
/// Atoms cover symbols, variables, numbers and quoted strings (kept with
/// their quotes). `Quoted` marks a backtick-prefixed higher-order term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    Atom(String),
    List(Vec<Node>),
    Quoted(Box<Node>),
}

impl Node {
    pub fn atom(text: impl Into<String>) -> Self {
        Node::Atom(text.into())
    }

    pub fn list(items: Vec<Node>) -> Self {
        Node::List(items)
    }

    /// Build `(head args...)`
    pub fn apply(head: &str, args: impl IntoIterator<Item = Node>) -> Self {
        let mut items = vec![Node::atom(head)];
        items.extend(args);
        Node::List(items)
    }

    pub fn empty() -> Self {
        Node::List(Vec::new())
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Node::Atom(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Node::List(_))
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, Node::List(items) if items.is_empty())
    }

    /// A quoted string atom
    pub fn is_string(&self) -> bool {
        matches!(self, Node::Atom(s) if s.starts_with('"') || s.starts_with('\''))
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Node::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    /// First element of a list
    pub fn head(&self) -> Option<&Node> {
        self.items().and_then(|items| items.first())
    }

    /// The head when it is an atom
    pub fn head_symbol(&self) -> Option<&str> {
        self.head().and_then(Node::as_atom)
    }

    pub fn head_is(&self, symbol: &str) -> bool {
        self.head_symbol() == Some(symbol)
    }

    /// Everything after the head, as a new list
    pub fn tail(&self) -> Option<Node> {
        self.items()
            .map(|items| Node::List(items.iter().skip(1).cloned().collect()))
    }

    /// Arguments of a list (elements after the head)
    pub fn args(&self) -> &[Node] {
        match self {
            Node::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// The n-th top-level element, the head being element 0
    pub fn argument(&self, n: usize) -> Option<&Node> {
        self.items().and_then(|items| items.get(n))
    }

    /// Top-level element count, `None` for anything but a list
    pub fn list_length(&self) -> Option<usize> {
        self.items().map(<[Node]>::len)
    }

    /// Prepend `head`. A non-list becomes a dotted pair `(head . self)`,
    /// which only ever appears in intermediate results.
    pub fn cons(&self, head: Node) -> Node {
        match self {
            Node::List(items) => {
                let mut out = Vec::with_capacity(items.len() + 1);
                out.push(head);
                out.extend(items.iter().cloned());
                Node::List(out)
            }
            other => Node::List(vec![head, Node::atom("."), other.clone()]),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Atom(s) if is_variable(s))
    }

    /// `(=> A B)` or `(<=> A B)`
    pub fn is_rule(&self) -> bool {
        self.list_length() == Some(3) && (self.head_is(IF) || self.head_is(IFF))
    }

    /// A list headed by a function symbol such as `(MeasureFn ?X Meter)`
    pub fn is_functional_term(&self) -> bool {
        self.head_symbol().is_some_and(is_function)
    }

    /// Every variable occurring anywhere in the expression
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_atoms(&mut |atom| {
            if is_variable(atom) {
                out.insert(atom.to_string());
            }
        });
        out
    }

    /// Variables in order of first occurrence
    pub fn variables_in_order(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        self.visit_atoms(&mut |atom| {
            if is_variable(atom) && !out.iter().any(|v| v == atom) {
                out.push(atom.to_string());
            }
        });
        out
    }

    pub fn contains_atom(&self, symbol: &str) -> bool {
        let mut found = false;
        self.visit_atoms(&mut |atom| found |= atom == symbol);
        found
    }

    /// Depth-first walk over every atom
    pub fn visit_atoms(&self, f: &mut impl FnMut(&str)) {
        match self {
            Node::Atom(s) => f(s),
            Node::List(items) => items.iter().for_each(|item| item.visit_atoms(f)),
            Node::Quoted(inner) => inner.visit_atoms(f),
        }
    }

    /// Replace every atom equal to `from` with `to`
    pub fn replace_atom(&self, from: &str, to: &Node) -> Node {
        match self {
            Node::Atom(s) if s == from => to.clone(),
            Node::Atom(_) => self.clone(),
            Node::List(items) => Node::List(items.iter().map(|i| i.replace_atom(from, to)).collect()),
            Node::Quoted(inner) => Node::Quoted(Box::new(inner.replace_atom(from, to))),
        }
    }

    /// Rebuild with `f` applied to every direct child
    pub fn map_children(self, mut f: impl FnMut(Node) -> Node) -> Node {
        match self {
            Node::List(items) => Node::List(items.into_iter().map(&mut f).collect()),
            Node::Quoted(inner) => Node::Quoted(Box::new(f(*inner))),
            atom => atom,
        }
    }

    /// Fallible `map_children`
    pub fn try_map_children<E>(self, mut f: impl FnMut(Node) -> Result<Node, E>) -> Result<Node, E> {
        match self {
            Node::List(items) => items
                .into_iter()
                .map(&mut f)
                .collect::<Result<Vec<_>, E>>()
                .map(Node::List),
            Node::Quoted(inner) => Ok(Node::Quoted(Box::new(f(*inner)?))),
            atom => Ok(atom),
        }
    }

    /// Number of atoms, used to order candidate formulas by size
    pub fn size(&self) -> usize {
        let mut count = 0;
        self.visit_atoms(&mut |_| count += 1);
        count
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Atom(s) => write!(f, "{}", s),
            Node::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Node::Quoted(inner) => write!(f, "`{}", inner),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::atom(text)
    }
}
