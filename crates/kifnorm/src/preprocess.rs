//! Preprocessing pipeline: SUO-KIF text in, inference-ready formulas out.
//!
//! `Pipeline` owns the fresh-name counters and the diagnostic sink and runs
//! each formula through the stages in order:
//!
//! 1. predicate-variable instantiation (skipped under the holds prefix)
//! 2. `SetOrClass` instance generation for `subclass`/`instance` facts
//! 3. row-variable expansion
//! 4. variable-arity relation renaming (optional)
//! 5. higher-order quoting and holds prefixing
//! 6. the inference filter
//!
//! A stage that fails reports a diagnostic and passes its input through.
//! `process` never panics and never returns an error; everything that went
//! wrong is in `diagnostics()`.

use tracing::debug;

use crate::clausal::{canonical_clausal_form, ClausalForm, Clausifier};
use crate::config::NormalizerConfig;
use crate::error::{Diagnostic, Diagnostics, Result, TransformError};
use crate::formula::vocabulary::{
    is_comparison_operator, is_logical_operator, is_math_function, is_quantifier, is_row_variable,
    is_variable,
    AND, EQUAL, EXISTS, FORALL, HOLDS, IF, IFF, INSTANCE, NOT, OR, SUBCLASS, VAR_PREFIX,
};
use crate::formula::{is_balanced, parse_nodes, Formula, Node, SourceLocation};
use crate::kb::KnowledgeBase;
use crate::pred_vars::{Instantiation, PredVarInstantiator};
use crate::rename::FreshNames;
use crate::row_vars::{
    contains_variable_arity_relation, rename_variable_arity_relations, RowVarExpander,
};

const SET_OR_CLASS: &str = "SetOrClass";

/// Relations whose non-ASCII text is replaced rather than rejected
const FREE_TEXT_RELATIONS: [&str; 2] = ["documentation", "comment"];

/// A formula that survived preprocessing, with its derived forms
#[derive(Debug, Clone)]
pub struct ProcessedFormula {
    pub formula: Formula,
    /// `None` when clausification failed
    pub clausal_form: Option<ClausalForm>,
    /// Sorted, variable-normalized clausal form
    pub canonical: Option<Node>,
    /// `None` when TPTP translation failed
    pub tptp: Option<String>,
}

pub struct Pipeline<'a> {
    kb: &'a dyn KnowledgeBase,
    config: NormalizerConfig,
    names: FreshNames,
    diagnostics: Diagnostics,
}

impl<'a> Pipeline<'a> {
    pub fn new(kb: &'a dyn KnowledgeBase, config: NormalizerConfig) -> Self {
        Pipeline {
            kb,
            config,
            names: FreshNames::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn with_default_config(kb: &'a dyn KnowledgeBase) -> Self {
        Self::new(kb, NormalizerConfig::default())
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    pub fn names(&self) -> &FreshNames {
        &self.names
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn clausifier(&self) -> Clausifier<'_> {
        Clausifier::new(&self.names)
    }

    fn report_error(&self, err: &TransformError, formula: &Formula) {
        self.diagnostics.report(
            Diagnostic::from(err)
                .with_formula(formula)
                .with_location(formula.source()),
        );
    }

    /// Unwrap a stage result, falling back to `fallback` on failure
    fn pass_through<T>(
        &self,
        stage: &str,
        formula: &Formula,
        result: Result<T>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                debug!(stage, "stage failed, passing input through: {}", err);
                self.report_error(&err, formula);
                fallback()
            }
        }
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Parse, validate and preprocess every expression in `text`
    pub fn process(&self, text: &str, is_query: bool) -> Vec<ProcessedFormula> {
        self.process_with_source(text, is_query, None)
    }

    pub fn process_with_source(
        &self,
        text: &str,
        is_query: bool,
        source: Option<SourceLocation>,
    ) -> Vec<ProcessedFormula> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if text.starts_with('(') && !is_balanced(text) {
            self.diagnostics.report(
                Diagnostic::error("Unbalanced parentheses or quotes")
                    .with_formula(text)
                    .with_location(source.as_ref()),
            );
            return Vec::new();
        }
        let nodes = match parse_nodes(text) {
            Ok(nodes) => nodes,
            Err(err) => {
                self.diagnostics.report(
                    Diagnostic::from(&err)
                        .with_formula(text)
                        .with_location(source.as_ref()),
                );
                return Vec::new();
            }
        };

        let mut results = Vec::new();
        for node in nodes {
            let formula = Formula::new(node).with_source(source.clone());
            if let Err(err) = self.valid_args(&formula) {
                self.report_error(&err, &formula);
                continue;
            }
            for processed in self.preprocess(&formula, is_query) {
                results.push(self.finish(processed));
            }
        }
        debug!("processed {} formula(s) from input", results.len());
        results
    }

    /// TPTP renderings of everything `process` keeps
    pub fn to_tptp(&self, text: &str, is_query: bool) -> Vec<String> {
        self.process(text, is_query)
            .into_iter()
            .filter_map(|processed| processed.tptp)
            .collect()
    }

    pub fn clausify(&self, formula: &Formula) -> Result<ClausalForm> {
        self.clausifier().clausify(formula.tree())
    }

    pub fn canonical_form(&self, formula: &Formula) -> Result<Node> {
        Ok(canonical_clausal_form(&self.clausify(formula)?))
    }

    fn finish(&self, formula: Formula) -> ProcessedFormula {
        let clausifier = self.clausifier();
        let clausal_form = match formula.clausal_form(&clausifier) {
            Ok(cf) => Some(cf.clone()),
            Err(err) => {
                self.report_error(&err, &formula);
                None
            }
        };
        let canonical = clausal_form.as_ref().map(canonical_clausal_form);
        let tptp = match formula.tptp(self.config.holds_prefix) {
            Ok(text) => Some(text.to_string()),
            Err(err) => {
                self.report_error(&err, &formula);
                None
            }
        };
        ProcessedFormula {
            formula,
            clausal_form,
            canonical,
            tptp,
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check the argument counts of logical operators and `equal`.
    ///
    /// Relations with more arguments than the configured maximum only
    /// produce a warning.
    pub fn valid_args(&self, formula: &Formula) -> Result<()> {
        self.valid_args_recurse(formula.tree(), formula)
    }

    fn valid_args_recurse(&self, node: &Node, formula: &Formula) -> Result<()> {
        let Node::List(items) = node else {
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }
        for arg in &items[1..] {
            self.valid_args_recurse(arg, formula)?;
        }

        let arg_count = items.len() - 1;
        let invalid = |what: &str| {
            Err(TransformError::InvalidArguments(format!(
                "{} in formula: {}",
                what, node
            )))
        };
        match node.head_symbol() {
            Some(AND | OR) if arg_count < 2 => invalid("Too few arguments for 'and' or 'or'"),
            Some(NOT) if arg_count != 1 => invalid("Wrong number of arguments for 'not'"),
            Some(FORALL | EXISTS) if arg_count != 2 => {
                invalid("Wrong number of arguments for 'exists' or 'forall'")
            }
            Some(FORALL | EXISTS) if !items[1].is_list() => {
                invalid("No parenthesized variable list for 'exists' or 'forall'")
            }
            Some(IF | IFF) if arg_count != 2 => {
                invalid("Wrong number of arguments for '<=>' or '=>'")
            }
            Some(EQUAL) if arg_count != 2 => invalid("Wrong number of arguments for 'equals'"),
            Some(AND | OR | NOT | FORALL | EXISTS | IF | IFF | EQUAL) => Ok(()),
            head => {
                if arg_count > self.config.arity_warning_threshold() {
                    self.diagnostics.report(
                        Diagnostic::warning("Maybe too many arguments")
                            .with_formula(node)
                            .with_location(formula.source()),
                    );
                }
                if let Some(head) = head {
                    self.check_declared_arity(head, &items[1..], node, formula);
                }
                Ok(())
            }
        }
    }

    /// Warn when a relation is applied to more arguments than its declared arity.
    /// Row variables stand for any number of arguments and suppress the check.
    fn check_declared_arity(&self, head: &str, args: &[Node], node: &Node, formula: &Formula) {
        if is_variable(head)
            || self.kb.is_variable_arity_relation(head)
            || args.iter().any(|arg| arg.as_atom().is_some_and(is_row_variable))
        {
            return;
        }
        let Some(arity) = self.kb.relation_arity(head).filter(|arity| *arity > 0) else {
            return;
        };
        if args.len() > arity {
            self.diagnostics.report(
                Diagnostic::warning(format!(
                    "Relation '{}' has arity {} but is given {} arguments",
                    head,
                    arity,
                    args.len()
                ))
                .with_formula(node)
                .with_location(formula.source()),
            );
        }
    }

    // =========================================================================
    // Preprocessing
    // =========================================================================

    /// Run the preprocessing stages on one parsed formula
    pub fn preprocess(&self, formula: &Formula, is_query: bool) -> Vec<Formula> {
        let formula = if formula
            .tree()
            .head_symbol()
            .is_some_and(|head| FREE_TEXT_RELATIONS.contains(&head))
        {
            formula.derive(replace_non_ascii(formula.tree()))
        } else {
            formula.clone()
        };

        let mut instantiations = if self.config.holds_prefix {
            vec![formula.clone()]
        } else {
            self.instantiate_predicate_variables(&formula)
        };

        if !is_query && self.config.add_set_or_class_instances {
            for instance in set_or_class_instances(formula.tree()) {
                let derived = formula.derive(instance);
                if !self.kb.contains_formula(derived.tree()) && !instantiations.contains(&derived) {
                    instantiations.push(derived);
                }
            }
        }

        let accumulator = self.expand_row_variables(instantiations);

        let mut results = Vec::new();
        for expanded in accumulator {
            let mut tree = expanded.tree().clone();
            if self.config.rename_variable_arity_relations
                && contains_variable_arity_relation(&tree, self.kb)
            {
                tree = rename_variable_arity_relations(&tree, self.kb);
            }
            let tree = preprocess_recurse(&tree, self.config.holds_prefix);
            if is_ok_for_inference(&tree, is_query) {
                results.push(expanded.derive(tree));
            } else {
                self.report_error(
                    &TransformError::RejectedForInference(tree.to_string()),
                    &expanded,
                );
            }
        }
        results
    }

    fn instantiate_predicate_variables(&self, formula: &Formula) -> Vec<Formula> {
        let instantiator = PredVarInstantiator::new(self.kb, self.clausifier());
        let outcome = self.pass_through(
            "predicate variables",
            formula,
            instantiator.instantiate(formula),
            || Instantiation::Unchanged,
        );
        match outcome {
            Instantiation::Unchanged => vec![formula.clone()],
            Instantiation::Instances(instances) if instances.is_empty() => vec![formula.clone()],
            Instantiation::Instances(instances) => instances,
            Instantiation::Reject => {
                let err = TransformError::NoPredicateInstantiation(formula.to_string());
                self.diagnostics.report(
                    Diagnostic::info(err.to_string()).with_location(formula.source()),
                );
                Vec::new()
            }
        }
    }

    fn expand_row_variables(&self, formulas: Vec<Formula>) -> Vec<Formula> {
        let limit = self.config.axiom_expansion_limit;
        if formulas.len() >= limit {
            self.diagnostics.report(Diagnostic::warning(format!(
                "{} instantiations exceed the expansion limit of {}",
                formulas.len(),
                limit
            )));
            return Vec::new();
        }
        let expander = RowVarExpander::new(self.kb, self.clausifier(), &self.config, &self.diagnostics);
        let mut accumulator = Vec::new();
        for formula in &formulas {
            let expansions = self.pass_through(
                "row variables",
                formula,
                expander.expand(formula),
                || vec![formula.clone()],
            );
            accumulator.extend(expansions);
            if accumulator.len() >= limit {
                accumulator.truncate(limit);
                break;
            }
        }
        accumulator
    }
}

/// `(instance X SetOrClass)` for each ground class argument of a
/// `subclass` or `instance` fact
pub fn set_or_class_instances(node: &Node) -> Vec<Node> {
    let first = match node.head_symbol() {
        Some(SUBCLASS) => 1,
        Some(INSTANCE) => 2,
        _ => return Vec::new(),
    };
    (first..=2)
        .filter_map(|position| node.argument(position))
        .filter_map(Node::as_atom)
        .filter(|arg| !is_variable(arg))
        .map(|arg| Node::apply(INSTANCE, [Node::atom(arg), Node::atom(SET_OR_CLASS)]))
        .collect()
}

fn replace_non_ascii(node: &Node) -> Node {
    match node {
        Node::Atom(s) if !s.is_ascii() => {
            Node::Atom(s.chars().map(|c| if c.is_ascii() { c } else { '_' }).collect())
        }
        Node::Atom(_) => node.clone(),
        Node::List(items) => Node::List(items.iter().map(replace_non_ascii).collect()),
        Node::Quoted(inner) => Node::Quoted(Box::new(replace_non_ascii(inner))),
    }
}

/// Quote higher-order arguments and optionally add holds prefixes.
///
/// A list argument of an ordinary relation that is not a functional term
/// is a formula used as a term, so it gets backtick-quoted. Quantifier
/// variable lists are left untouched. With `holds_prefix`, relation
/// applications become `(holds_N__ R ...)` and function applications
/// `(apply_N__ F ...)`, where N counts the relation and its arguments.
pub fn preprocess_recurse(node: &Node, holds_prefix: bool) -> Node {
    let Node::List(items) = node else {
        return node.clone();
    };
    let Some(head) = items.first() else {
        return node.clone();
    };
    let pred = head.as_atom().unwrap_or_default();

    if is_quantifier(pred) {
        let mut out = vec![head.clone()];
        out.extend(items.get(1).cloned());
        out.extend(items.get(2).map(|body| preprocess_recurse(body, holds_prefix)));
        return Node::List(out);
    }

    let ordinary = !is_logical_operator(pred) && !is_comparison_operator(pred) && !is_math_function(pred);
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(head.clone());
    for arg in &items[1..] {
        match arg {
            Node::List(_) => {
                let processed = preprocess_recurse(arg, holds_prefix);
                if ordinary && !arg.is_functional_term() {
                    out.push(Node::Quoted(Box::new(processed)));
                } else {
                    out.push(processed);
                }
            }
            _ => out.push(arg.clone()),
        }
    }

    if holds_prefix && !is_logical_operator(pred) {
        let kind = if node.is_functional_term() { "apply" } else { "holds" };
        if pred == HOLDS {
            out[0] = Node::atom(format!("{}_{}__", kind, items.len() - 1));
        } else if ordinary {
            out.insert(0, Node::atom(format!("{}_{}__", kind, items.len())));
        }
    }
    Node::List(out)
}

/// Whether `(equal ?A ?B ?C ...)` occurs anywhere in `node`
fn has_overloaded_equality(node: &Node) -> bool {
    match node {
        Node::List(items) => {
            let overloaded = node.head_is(EQUAL)
                && items.len() >= 4
                && items[1..4]
                    .iter()
                    .all(|arg| arg.as_atom().is_some_and(|a| a.starts_with(VAR_PREFIX)));
            overloaded || items.iter().any(has_overloaded_equality)
        }
        Node::Quoted(inner) => has_overloaded_equality(inner),
        Node::Atom(_) => false,
    }
}

/// `?` followed by a word character, anywhere in the text
fn mentions_variable(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == VAR_PREFIX as u8 && (w[1].is_ascii_alphanumeric() || w[1] == b'_'))
}

/// Syntactic filter on formulas handed to inference.
///
/// Rejects `equal` with three or more variable arguments, any non-ASCII
/// text, and, for statements, a non-logical list without strings that
/// still mentions a `?` variable.
pub fn is_ok_for_inference(node: &Node, is_query: bool) -> bool {
    let text = node.to_string();
    if has_overloaded_equality(node) || !text.is_ascii() {
        return false;
    }
    let free_variable_in_atom = !is_query
        && node.is_list()
        && !node.head_symbol().is_some_and(is_logical_operator)
        && !text.contains('"')
        && mentions_variable(&text);
    !free_variable_in_atom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_node;
    use crate::kb::MemoryKb;

    fn parse(text: &str) -> Node {
        parse_node(text).unwrap()
    }

    struct TestContext {
        kb: MemoryKb,
    }

    impl TestContext {
        fn new() -> Self {
            let mut kb = MemoryKb::new();
            kb.tell_all([
                "(subclass BinaryPredicate Predicate)",
                "(subclass Predicate Relation)",
                "(instance partOf BinaryPredicate)",
                "(instance ListFn VariableArityRelation)",
            ])
            .unwrap();
            kb.declare_arity("foo", 3);
            kb.declare_arity("partOf", 2);
            TestContext { kb }
        }

        fn pipeline(&self) -> Pipeline<'_> {
            Pipeline::with_default_config(&self.kb)
        }

        fn pipeline_with(&self, config: NormalizerConfig) -> Pipeline<'_> {
            Pipeline::new(&self.kb, config)
        }
    }

    #[test]
    fn test_valid_args_rejects_bad_operators() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        for text in [
            "(and (p a))",
            "(not (p a) (q a))",
            "(forall ?X (p ?X))",
            "(exists (?X) (p ?X) (q ?X))",
            "(=> (p a))",
            "(equal a b c)",
        ] {
            let formula = Formula::parse(text).unwrap();
            assert!(
                matches!(pipeline.valid_args(&formula), Err(TransformError::InvalidArguments(_))),
                "{} should be invalid",
                text
            );
        }
        let ok = Formula::parse("(=> (and (p ?X) (q ?X)) (forall (?Y) (r ?X ?Y)))").unwrap();
        assert!(pipeline.valid_args(&ok).is_ok());
    }

    #[test]
    fn test_too_many_arguments_is_only_a_warning() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        let formula = Formula::parse("(r a b c d e f g h)").unwrap();
        assert!(pipeline.valid_args(&formula).is_ok());
        let diagnostics = pipeline.diagnostics().take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Maybe too many arguments");
    }

    #[test]
    fn test_more_arguments_than_declared_arity_is_a_warning() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        let results = pipeline.process("(partOf a b c)", false);
        assert_eq!(results.len(), 1);
        let diagnostics = pipeline.diagnostics().take();
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
        assert_eq!(diagnostics[0].severity, crate::error::Severity::Warning);
        assert!(diagnostics[0].message.contains("'partOf' has arity 2"), "{}", diagnostics[0].message);

        pipeline.process("(partOf a b)", false);
        pipeline.process("(=> (foo @ROW ?X ?Y ?Z) (p ?X))", false);
        assert!(
            pipeline.diagnostics().take().iter().all(|d| !d.message.contains("has arity")),
            "unexpected arity warning"
        );
    }

    #[test]
    fn test_variable_arity_relations_renamed_when_enabled() {
        let ctx = TestContext::new();
        let config = NormalizerConfig {
            rename_variable_arity_relations: true,
            ..NormalizerConfig::default()
        };
        let pipeline = ctx.pipeline_with(config);
        let results = pipeline.process("(=> (p ?L) (equal ?L (ListFn a b)))", false);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].formula.to_string(), "(=> (p ?L) (equal ?L (ListFn_2 a b)))");

        let results = pipeline.process("(=> (p ?L) (q ?L))", false);
        assert_eq!(results[0].formula.to_string(), "(=> (p ?L) (q ?L))");
    }

    #[test]
    fn test_expansion_limit_caps_results() {
        let ctx = TestContext::new();
        let config = NormalizerConfig {
            axiom_expansion_limit: 2,
            ..NormalizerConfig::default()
        };
        let pipeline = ctx.pipeline_with(config);
        let results = pipeline.process("(=> (foo @ROW) (p a))", false);
        assert_eq!(results.len(), 2);
        assert!(!pipeline.diagnostics().is_empty());
    }

    #[test]
    fn test_preprocess_recurse_quotes_formula_arguments() {
        let node = parse("(believes John (likes Mary (FatherFn Bill)))");
        assert_eq!(
            preprocess_recurse(&node, false).to_string(),
            "(believes John `(likes Mary (FatherFn Bill)))"
        );
        let logical = parse("(=> (p a) (forall (?X) (q ?X)))");
        assert_eq!(preprocess_recurse(&logical, false), logical);
        let math = parse("(equal (AdditionFn 1 2) 3)");
        assert_eq!(preprocess_recurse(&math, false), math);
    }

    #[test]
    fn test_holds_prefix() {
        let node = parse("(=> (foo ?X (BarFn ?X)) (holds ?R ?X))");
        assert_eq!(
            preprocess_recurse(&node, true).to_string(),
            "(=> (holds_3__ foo ?X (apply_2__ BarFn ?X)) (holds_2__ ?R ?X))"
        );
    }

    #[test]
    fn test_set_or_class_instances() {
        let instances: Vec<String> = set_or_class_instances(&parse("(subclass Dog Animal)"))
            .iter()
            .map(Node::to_string)
            .collect();
        assert_eq!(instances, vec!["(instance Dog SetOrClass)", "(instance Animal SetOrClass)"]);
        let instances = set_or_class_instances(&parse("(instance Fido ?C)"));
        assert!(instances.is_empty());
        let instances = set_or_class_instances(&parse("(instance Fido Dog)"));
        assert_eq!(instances, vec![parse("(instance Dog SetOrClass)")]);
    }

    #[test]
    fn test_is_ok_for_inference() {
        assert!(is_ok_for_inference(&parse("(p a b)"), false));
        assert!(!is_ok_for_inference(&parse("(p ?X b)"), false));
        assert!(is_ok_for_inference(&parse("(p ?X b)"), true));
        assert!(is_ok_for_inference(&parse("(=> (p ?X) (q ?X))"), false));
        assert!(is_ok_for_inference(&parse("(format EnglishLanguage p \"%1 is ?X\")"), false));
        assert!(!is_ok_for_inference(&parse("(=> (p ?X) (equal ?X ?Y ?Z))"), false));
        assert!(!is_ok_for_inference(&parse("(p \"caf\u{e9}\")"), false));
    }

    #[test]
    fn test_process_statement() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        let results = pipeline.process("(=> (p ?X) (q ?X))", false);
        assert_eq!(results.len(), 1);
        let processed = &results[0];
        assert_eq!(
            processed.canonical.as_ref().unwrap().to_string(),
            "(or (not (p ?VAR1)) (q ?VAR1))"
        );
        assert_eq!(
            processed.tptp.as_deref(),
            Some("( ( ! [V__X] : (s__p(V__X) => s__q(V__X)) ) )")
        );
    }

    #[test]
    fn test_subclass_adds_set_or_class_facts() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        let formulas: Vec<String> = pipeline
            .process("(subclass Dog Animal)", false)
            .iter()
            .map(|p| p.formula.to_string())
            .collect();
        assert_eq!(
            formulas,
            vec![
                "(subclass Dog Animal)",
                "(instance Dog SetOrClass)",
                "(instance Animal SetOrClass)",
            ]
        );

        let config = NormalizerConfig {
            add_set_or_class_instances: false,
            ..NormalizerConfig::default()
        };
        let pipeline = ctx.pipeline_with(config);
        assert_eq!(pipeline.process("(subclass Dog Animal)", false).len(), 1);
    }

    #[test]
    fn test_unbalanced_input_is_reported_not_raised() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        assert!(pipeline.process("(p (q a)", false).is_empty());
        let diagnostics = pipeline.diagnostics().take();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unbalanced parentheses or quotes");
        assert!(pipeline.process("   ", false).is_empty());
        assert!(pipeline.diagnostics().is_empty());
    }

    #[test]
    fn test_rejected_predicate_variable_yields_nothing() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        let results = pipeline.process("(=> (and (instance ?R TernaryPredicate) (?R ?A ?B ?C)) (foo ?A))", false);
        assert!(results.is_empty());
        let messages: Vec<String> = pipeline.diagnostics().take().into_iter().map(|d| d.message).collect();
        assert!(
            messages.iter().any(|m| m.starts_with("No predicate instantiations for")),
            "{:?}",
            messages
        );
    }

    #[test]
    fn test_free_variable_atom_is_rejected() {
        let ctx = TestContext::new();
        let pipeline = ctx.pipeline();
        assert!(pipeline.process("(p ?X)", false).is_empty());
        assert!(pipeline.diagnostics().has_errors());
        assert_eq!(pipeline.process("(p ?X)", true).len(), 1);
    }
}
