//! The `Formula` wrapper: a parsed expression with source location and
//! lazily computed clausal form and TPTP caches.

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::node::Node;
use super::reader::{is_balanced, parse_node};
use crate::clausal::{ClausalForm, Clausifier};
use crate::error::{Result, TransformError};
use crate::tptp::translate_formula;

/// Where a formula came from, for diagnostics only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        SourceLocation {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.file, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
        }
    }
}

/// A SUO-KIF formula.
///
/// The tree never changes after construction; every transformation returns
/// a new `Formula`, so the caches stay valid for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Formula {
    tree: Node,
    source: Option<SourceLocation>,
    clausal_form: OnceCell<ClausalForm>,
    tptp: OnceCell<String>,
}

impl Formula {
    pub fn new(tree: Node) -> Self {
        Formula {
            tree,
            source: None,
            clausal_form: OnceCell::new(),
            tptp: OnceCell::new(),
        }
    }

    /// Parse a single balanced list or atom
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.starts_with('(') && !is_balanced(trimmed) {
            return Err(TransformError::Unbalanced(trimmed.to_string()));
        }
        parse_node(trimmed).map(Formula::new)
    }

    pub fn with_source(mut self, source: Option<SourceLocation>) -> Self {
        self.source = source;
        self
    }

    /// New formula with the same source location
    pub fn derive(&self, tree: Node) -> Formula {
        Formula::new(tree).with_source(self.source.clone())
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn into_tree(self) -> Node {
        self.tree
    }

    pub fn source(&self) -> Option<&SourceLocation> {
        self.source.as_ref()
    }

    pub fn car(&self) -> Option<&Node> {
        self.tree.head()
    }

    pub fn cdr(&self) -> Option<Formula> {
        self.tree.tail().map(|tail| self.derive(tail))
    }

    pub fn cons(&self, head: Node) -> Formula {
        self.derive(self.tree.cons(head))
    }

    pub fn argument(&self, n: usize) -> Option<&Node> {
        self.tree.argument(n)
    }

    pub fn list_length(&self) -> Option<usize> {
        self.tree.list_length()
    }

    pub fn is_list(&self) -> bool {
        self.tree.is_list()
    }

    pub fn is_atom(&self) -> bool {
        self.tree.is_atom()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty_list()
    }

    pub fn is_rule(&self) -> bool {
        self.tree.is_rule()
    }

    /// Clausal form, computed on first use
    pub fn clausal_form(&self, clausifier: &Clausifier<'_>) -> Result<&ClausalForm> {
        if let Some(cached) = self.clausal_form.get() {
            return Ok(cached);
        }
        let computed = clausifier.clausify(&self.tree)?;
        Ok(self.clausal_form.get_or_init(|| computed))
    }

    /// TPTP rendering, computed on first use
    pub fn tptp(&self, holds_prefix: bool) -> Result<&str> {
        if let Some(cached) = self.tptp.get() {
            return Ok(cached);
        }
        let computed = translate_formula(&self.tree, holds_prefix)?;
        Ok(self.tptp.get_or_init(|| computed).as_str())
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl Eq for Formula {}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tree)
    }
}

impl FromStr for Formula {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Formula::parse(s)
    }
}

impl From<Node> for Formula {
    fn from(tree: Node) -> Self {
        Formula::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::FreshNames;

    #[test]
    fn test_parse_rejects_unbalanced() {
        assert!(matches!(
            Formula::parse("(=> (p ?X) (q ?X)"),
            Err(TransformError::Unbalanced(_))
        ));
        assert!(Formula::parse("Human").unwrap().is_atom());
    }

    #[test]
    fn test_list_operations() {
        let formula: Formula = "(subclass Human Animal)".parse().unwrap();
        assert_eq!(formula.car().and_then(Node::as_atom), Some("subclass"));
        assert_eq!(formula.cdr().unwrap().to_string(), "(Human Animal)");
        assert_eq!(formula.cons(Node::atom("not")).to_string(), "(not subclass Human Animal)");
        assert_eq!(formula.list_length(), Some(3));
        assert!(!formula.is_rule());
    }

    #[test]
    fn test_clausal_form_is_cached() {
        let names = FreshNames::new();
        let clausifier = Clausifier::new(&names);
        let formula: Formula = "(=> (p ?X) (q ?X))".parse().unwrap();

        let first = formula.clausal_form(&clausifier).unwrap().clone();
        let second = formula.clausal_form(&clausifier).unwrap();
        assert_eq!(&first, second, "second call must return the cached value");
    }

    #[test]
    fn test_source_is_carried() {
        let formula = Formula::parse("(p a)")
            .unwrap()
            .with_source(Some(SourceLocation::new("Merge.kif", 3, 3)));
        let derived = formula.derive(Node::atom("q"));
        assert_eq!(derived.source().map(|s| s.to_string()), Some("Merge.kif:3".to_string()));
    }
}
