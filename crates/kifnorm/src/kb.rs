//! Read-only knowledge-base interface used by the expanders
//!
//! Row-variable expansion needs relation arities; predicate-variable
//! instantiation needs argument signatures, argument types, literal queries
//! and the subclass relation. `MemoryKb` is a small in-memory
//! implementation backed by ground facts.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexSet;

use crate::error::Result;
use crate::formula::vocabulary::{is_variable, INSTANCE, SUBCLASS};
use crate::formula::{parse_node, Node};

/// Queries the normalizer makes against a knowledge base
pub trait KnowledgeBase {
    /// Declared number of arguments; `Some(0)` for variable-arity relations
    fn relation_arity(&self, relation: &str) -> Option<usize>;

    fn is_variable_arity_relation(&self, relation: &str) -> bool;

    /// Per position, whether the argument must itself be a relation.
    /// Index 0 stands for the relation itself.
    fn argument_signature(&self, relation: &str) -> Option<Vec<bool>>;

    /// Declared class of argument `position` (1-based)
    fn arg_type(&self, relation: &str, position: usize) -> Option<String>;

    /// Ground literals matching `pattern`, whose variables match anything
    fn query_by_literal_pattern(&self, pattern: &Node) -> Vec<Node>;

    /// Whether `class` is a proper subclass of `superclass`
    fn is_subclass_of(&self, class: &str, superclass: &str) -> bool;

    /// Whether the formula is already asserted
    fn contains_formula(&self, _formula: &Node) -> bool {
        false
    }
}

const VARIABLE_ARITY_RELATION: &str = "VariableArityRelation";
const RELATION: &str = "Relation";

/// In-memory knowledge base over ground facts.
///
/// `subclass`, `domain` and `(instance R VariableArityRelation)` facts are
/// interpreted as schema as they are told; everything else is only stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryKb {
    facts: IndexSet<Node>,
    arities: HashMap<String, usize>,
    variable_arity: HashSet<String>,
    signatures: HashMap<String, Vec<bool>>,
    arg_types: HashMap<(String, usize), String>,
    superclasses: HashMap<String, Vec<String>>,
}

impl MemoryKb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and assert a ground fact
    pub fn tell(&mut self, text: &str) -> Result<()> {
        let fact = parse_node(text)?;
        self.assert_fact(fact);
        Ok(())
    }

    /// Assert every fact in `facts`, stopping at the first parse error
    pub fn tell_all<'s>(&mut self, facts: impl IntoIterator<Item = &'s str>) -> Result<()> {
        for fact in facts {
            self.tell(fact)?;
        }
        Ok(())
    }

    pub fn assert_fact(&mut self, fact: Node) {
        let atoms: Vec<&str> = fact.args().iter().filter_map(Node::as_atom).collect();
        match (fact.head_symbol(), atoms.as_slice()) {
            (Some(SUBCLASS), [class, superclass]) => {
                self.superclasses
                    .entry(class.to_string())
                    .or_default()
                    .push(superclass.to_string());
            }
            (Some(INSTANCE), [relation, VARIABLE_ARITY_RELATION]) => {
                self.variable_arity.insert(relation.to_string());
            }
            (Some("domain"), [relation, position, class]) => {
                if let Ok(position) = position.parse::<usize>() {
                    self.arg_types
                        .insert((relation.to_string(), position), class.to_string());
                }
            }
            _ => {}
        }
        self.facts.insert(fact);
    }

    pub fn declare_arity(&mut self, relation: &str, arity: usize) {
        self.arities.insert(relation.to_string(), arity);
    }

    pub fn declare_signature(&mut self, relation: &str, signature: Vec<bool>) {
        self.signatures.insert(relation.to_string(), signature);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    fn is_relation_class(&self, class: &str) -> bool {
        class == RELATION || self.is_subclass_of(class, RELATION)
    }

    /// Whether `fact` is an instance of `pattern`, with repeated variables
    /// bound to the same term
    fn matches(pattern: &[Node], fact: &[Node]) -> bool {
        if pattern.len() != fact.len() {
            return false;
        }
        let mut bindings: HashMap<&str, &Node> = HashMap::new();
        for (p, f) in pattern.iter().zip(fact) {
            match p.as_atom() {
                Some(var) if is_variable(var) => {
                    if let Some(bound) = bindings.insert(var, f) {
                        if bound != f {
                            return false;
                        }
                    }
                }
                _ => {
                    if p != f {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl KnowledgeBase for MemoryKb {
    fn relation_arity(&self, relation: &str) -> Option<usize> {
        if self.variable_arity.contains(relation) {
            return Some(0);
        }
        if let Some(arity) = self.arities.get(relation) {
            return Some(*arity);
        }
        self.arg_types
            .keys()
            .filter(|(r, _)| r == relation)
            .map(|(_, position)| *position)
            .max()
    }

    fn is_variable_arity_relation(&self, relation: &str) -> bool {
        self.variable_arity.contains(relation)
    }

    fn argument_signature(&self, relation: &str) -> Option<Vec<bool>> {
        if let Some(signature) = self.signatures.get(relation) {
            return Some(signature.clone());
        }
        let arity = self.relation_arity(relation).filter(|a| *a > 0)?;
        let mut signature = vec![false; arity + 1];
        for (position, slot) in signature.iter_mut().enumerate().skip(1) {
            *slot = self
                .arg_type(relation, position)
                .is_some_and(|class| self.is_relation_class(&class));
        }
        Some(signature)
    }

    fn arg_type(&self, relation: &str, position: usize) -> Option<String> {
        self.arg_types
            .get(&(relation.to_string(), position))
            .cloned()
    }

    fn query_by_literal_pattern(&self, pattern: &Node) -> Vec<Node> {
        let Some(items) = pattern.items() else {
            return Vec::new();
        };
        let mut answers: IndexSet<Node> = self
            .facts
            .iter()
            .filter(|fact| fact.items().is_some_and(|f| Self::matches(items, f)))
            .cloned()
            .collect();

        // (instance X C) also holds when X is an instance of a subclass of C
        if let (Some(INSTANCE), [_, Node::Atom(class)]) = (pattern.head_symbol(), pattern.args()) {
            if !is_variable(class) {
                for fact in &self.facts {
                    if let (Some(INSTANCE), [instance, Node::Atom(direct)]) =
                        (fact.head_symbol(), fact.args())
                    {
                        if self.is_subclass_of(direct, class) {
                            let inferred =
                                Node::apply(INSTANCE, [instance.clone(), Node::atom(class.as_str())]);
                            if inferred.items().is_some_and(|f| Self::matches(items, f)) {
                                answers.insert(inferred);
                            }
                        }
                    }
                }
            }
        }
        answers.into_iter().collect()
    }

    fn is_subclass_of(&self, class: &str, superclass: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            for parent in self.superclasses.get(current).into_iter().flatten() {
                if parent == superclass {
                    return true;
                }
                if seen.insert(parent.as_str()) {
                    queue.push_back(parent);
                }
            }
        }
        false
    }

    fn contains_formula(&self, formula: &Node) -> bool {
        self.facts.contains(formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> MemoryKb {
        let mut kb = MemoryKb::new();
        kb.tell_all([
            "(subclass BinaryPredicate Predicate)",
            "(subclass Predicate Relation)",
            "(subclass TransitiveRelation BinaryRelation)",
            "(instance partOf BinaryPredicate)",
            "(instance part TransitiveRelation)",
            "(instance ListFn VariableArityRelation)",
            "(domain subrelation 1 Relation)",
            "(domain subrelation 2 Relation)",
            "(domain located 1 Physical)",
            "(domain located 2 Object)",
        ])
        .unwrap();
        kb
    }

    #[test]
    fn test_subclass_closure() {
        let kb = kb();
        assert!(kb.is_subclass_of("BinaryPredicate", "Relation"));
        assert!(!kb.is_subclass_of("Relation", "BinaryPredicate"));
        assert!(!kb.is_subclass_of("Predicate", "Predicate"));
    }

    #[test]
    fn test_arity_and_signature() {
        let kb = kb();
        assert_eq!(kb.relation_arity("located"), Some(2));
        assert_eq!(kb.relation_arity("ListFn"), Some(0));
        assert!(kb.is_variable_arity_relation("ListFn"));
        assert_eq!(kb.relation_arity("unknown"), None);
        assert_eq!(kb.argument_signature("subrelation"), Some(vec![false, true, true]));
        assert_eq!(kb.argument_signature("located"), Some(vec![false, false, false]));
        assert_eq!(kb.arg_type("located", 2).as_deref(), Some("Object"));
    }

    #[test]
    fn test_query_pattern() {
        let kb = kb();
        let answers = kb.query_by_literal_pattern(&parse_node("(instance ?R BinaryPredicate)").unwrap());
        assert_eq!(answers, vec![parse_node("(instance partOf BinaryPredicate)").unwrap()]);
    }

    #[test]
    fn test_query_uses_subclass_closure() {
        let kb = kb();
        let answers = kb.query_by_literal_pattern(&parse_node("(instance ?R Relation)").unwrap());
        let rendered: Vec<String> = answers.iter().map(Node::to_string).collect();
        assert!(rendered.contains(&"(instance partOf Relation)".to_string()), "{:?}", rendered);
        assert!(!rendered.iter().any(|r| r.contains("part ")), "{:?}", rendered);
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let mut kb = MemoryKb::new();
        kb.tell_all(["(loves a a)", "(loves a b)"]).unwrap();
        let answers = kb.query_by_literal_pattern(&parse_node("(loves ?X ?X)").unwrap());
        assert_eq!(answers.len(), 1);
    }
}
