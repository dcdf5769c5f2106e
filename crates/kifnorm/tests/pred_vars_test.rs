//! Integration tests for predicate-variable instantiation

use kifnorm::{
    Clausifier, Formula, FreshNames, Instantiation, MemoryKb, NormalizerConfig, Pipeline,
    PredVarInstantiator,
};

fn kb(facts: &[&str]) -> MemoryKb {
    let mut kb = MemoryKb::new();
    kb.tell_all(facts.iter().copied()).unwrap();
    kb
}

fn instantiate(kb: &MemoryKb, text: &str) -> Instantiation {
    let names = FreshNames::new();
    PredVarInstantiator::new(kb, Clausifier::new(&names))
        .instantiate(&Formula::parse(text).unwrap())
        .unwrap()
}

#[test]
fn test_single_binding_replaces_every_occurrence() {
    let kb = kb(&["(instance partOf BinaryPredicate)"]);
    let result = instantiate(&kb, "(=> (and (instance ?R BinaryPredicate) (?R ?A ?B)) (foo ?A))");
    let Instantiation::Instances(formulas) = result else {
        panic!("expected instances, got {:?}", result);
    };
    assert_eq!(formulas.len(), 1);
    let text = formulas[0].to_string();
    assert!(!text.contains("?R"), "{}", text);
    assert!(text.contains("(partOf ?A ?B)"), "{}", text);
}

#[test]
fn test_no_binding_rejects() {
    let kb = kb(&["(instance partOf BinaryPredicate)"]);
    let result = instantiate(&kb, "(=> (and (instance ?R TernaryPredicate) (?R ?A ?B ?C)) (foo ?A))");
    assert_eq!(result, Instantiation::Reject);
}

#[test]
fn test_instance_query_uses_subclasses() {
    let kb = kb(&[
        "(subclass TransitiveRelation BinaryRelation)",
        "(instance part TransitiveRelation)",
    ]);
    let result = instantiate(&kb, "(=> (and (instance ?R BinaryRelation) (?R ?A ?B)) (?R ?B ?A))");
    let Instantiation::Instances(formulas) = result else {
        panic!("expected instances, got {:?}", result);
    };
    assert_eq!(formulas.len(), 1);
    assert!(formulas[0].to_string().contains("(part ?B ?A)"), "{}", formulas[0]);
}

#[test]
fn test_pipeline_keeps_instantiations() {
    let kb = kb(&[
        "(instance partOf BinaryPredicate)",
        "(instance located BinaryPredicate)",
    ]);
    let pipeline = Pipeline::with_default_config(&kb);
    let results = pipeline.process("(=> (and (instance ?R BinaryPredicate) (?R ?A ?B)) (foo ?A))", false);
    let formulas: Vec<String> = results.iter().map(|p| p.formula.to_string()).collect();
    assert_eq!(formulas.len(), 2, "{:?}", formulas);
    assert!(formulas.iter().any(|f| f.contains("partOf")));
    assert!(formulas.iter().any(|f| f.contains("located")));
    assert!(pipeline.diagnostics().is_empty(), "{:?}", pipeline.diagnostics().snapshot());
}

#[test]
fn test_holds_prefix_skips_instantiation() {
    let kb = kb(&["(instance partOf BinaryPredicate)"]);
    let config = NormalizerConfig {
        holds_prefix: true,
        ..NormalizerConfig::default()
    };
    let pipeline = Pipeline::new(&kb, config);
    let results = pipeline.process("(=> (and (instance ?R BinaryPredicate) (?R ?A ?B)) (foo ?A))", false);
    assert_eq!(results.len(), 1);
    assert_eq!(
        results[0].formula.to_string(),
        "(=> (and (holds_3__ instance ?R BinaryPredicate) (holds_3__ ?R ?A ?B)) (holds_2__ foo ?A))"
    );
}
