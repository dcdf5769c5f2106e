//! Integration tests for clausal normal form conversion

use kifnorm::formula::vocabulary::{EXISTS, FORALL, IF, IFF};
use kifnorm::{
    canonical_clausal_form, parse_node, to_canonical_clausal_form, ClausalForm, Clausifier,
    FreshNames,
};

fn clausify(text: &str) -> ClausalForm {
    let names = FreshNames::new();
    Clausifier::new(&names).clausify(&parse_node(text).unwrap()).unwrap()
}

fn canonical(text: &str) -> String {
    let names = FreshNames::new();
    to_canonical_clausal_form(&parse_node(text).unwrap(), &Clausifier::new(&names))
        .unwrap()
        .to_string()
}

#[test]
fn test_disjunction_distributes_over_conjunction() {
    let cf = clausify("(or (p a) (and (q b) (r c)))");
    assert_eq!(cf.clauses.len(), 2);
    assert_eq!(
        canonical("(or (p a) (and (q b) (r c)))"),
        "(and (or (p a) (q b)) (or (p a) (r c)))"
    );
}

#[test]
fn test_no_connectives_survive() {
    let cf = clausify(
        "(<=> (forall (?X) (p ?X)) (exists (?Y) (=> (q ?Y) (not (r ?Y)))))",
    );
    for banned in [IF, IFF, FORALL, EXISTS] {
        assert!(!cf.clausified.contains_atom(banned), "{} in {}", banned, cf);
    }
    assert!(!cf.clauses.is_empty());
}

#[test]
fn test_existential_becomes_skolem_constant() {
    let cf = clausify("(exists (?X) (and (p ?X) (q ?X)))");
    assert_eq!(cf.clauses.len(), 2);
    let first = cf.clauses[0].positive[0].argument(1).unwrap().clone();
    let second = cf.clauses[1].positive[0].argument(1).unwrap().clone();
    assert_eq!(first, second);
    assert!(first.as_atom().is_some_and(|s| s.starts_with("Sk")), "{}", first);
}

#[test]
fn test_existential_under_universal_becomes_skolem_function() {
    let cf = clausify("(forall (?Y) (exists (?X) (loves ?X ?Y)))");
    assert_eq!(cf.clauses.len(), 1);
    let literal = &cf.clauses[0].positive[0];
    let skolem = literal.argument(1).unwrap();
    assert!(skolem.head_is("SkFn"), "{}", literal);
    // the Skolem function is applied to the variable it depends on
    assert_eq!(skolem.args().last(), literal.argument(2));
}

#[test]
fn test_clauses_are_standardized_apart() {
    let cf = clausify("(and (p ?X) (=> (q ?X) (r ?X)))");
    assert_eq!(cf.clauses.len(), 2);
    let a = cf.clauses[0].variables();
    let b = cf.clauses[1].variables();
    assert!(a.is_disjoint(&b), "{:?} and {:?}", a, b);
    for var in a.iter().chain(b.iter()) {
        assert_eq!(cf.original_var(var), "?X");
    }
}

#[test]
fn test_literal_polarity() {
    let cf = clausify("(=> (and (p ?X) (q ?X)) (r ?X))");
    assert_eq!(cf.clauses.len(), 1);
    assert_eq!(cf.clauses[0].negative.len(), 2);
    assert_eq!(cf.clauses[0].positive.len(), 1);
}

#[test]
fn test_canonical_form_is_insensitive_to_order_and_names() {
    let a = canonical("(and (or (p ?X) (q ?X)) (r ?Z))");
    let b = canonical("(and (r ?W) (or (q ?Y) (p ?Y)))");
    assert_eq!(a, b);
}

#[test]
fn test_reclausifying_a_clausal_form_keeps_it() {
    let names = FreshNames::new();
    let clausifier = Clausifier::new(&names);
    let first = clausifier
        .clausify(&parse_node("(=> (p ?X) (and (q ?X) (r ?X)))").unwrap())
        .unwrap();
    let second = clausifier.clausify(&first.to_node()).unwrap();
    assert_eq!(canonical_clausal_form(&first), canonical_clausal_form(&second));
}
