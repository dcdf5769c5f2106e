//! Integration tests for TPTP serialization

use kifnorm::{parse_node, translate_formula, translate_text, Formula, TransformError};

fn tptp(text: &str) -> String {
    translate_formula(&parse_node(text).unwrap(), false).unwrap()
}

#[test]
fn test_negated_atom_with_free_variable() {
    let out = tptp("(not (p ?X))");
    assert_eq!(out, "( ( ! [V__X] : (~ s__p(V__X)) ) )");
}

#[test]
fn test_rule_with_quantified_consequent() {
    let out = tptp("(=> (instance ?X Human) (exists (?Y) (mother ?X ?Y)))");
    assert_eq!(
        out,
        "( ( ! [V__X] : (s__instance(V__X,s__Human) => (? [V__Y] : s__mother(V__X,V__Y))) ) )"
    );
}

#[test]
fn test_arithmetic_and_comparison_builtins() {
    let out = tptp("(=> (greaterThan ?N 0) (equal (AdditionFn ?N 1) ?M))");
    assert_eq!(
        out,
        "( ( ! [V__N,V__M] : (greater(V__N,0) => equal(plus(V__N,1),V__M)) ) )"
    );
}

#[test]
fn test_relation_as_argument_gets_mention_suffix() {
    assert_eq!(
        tptp("(instance partOf TransitiveRelation)"),
        "( s__instance(s__partOf__m,s__TransitiveRelation) )"
    );
    let holds = translate_formula(&parse_node("(instance partOf TransitiveRelation)").unwrap(), true).unwrap();
    assert_eq!(holds, "( s__instance(s__partOf,s__TransitiveRelation) )");
}

#[test]
fn test_formula_caches_its_translation() {
    let formula: Formula = "(p ?X)".parse().unwrap();
    let first = formula.tptp(false).unwrap().to_string();
    assert_eq!(formula.tptp(false).unwrap(), first);
    assert_eq!(first, "( ( ! [V__X] : s__p(V__X) ) )");
}

#[test]
fn test_unbalanced_text_is_an_error() {
    let err = translate_text("(p (q a)", false).unwrap_err();
    assert!(matches!(err, TransformError::Tptp(_)), "{:?}", err);
}
