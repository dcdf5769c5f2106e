//! TPTP first-order serialization of processed SUO-KIF formulas
//!
//! The translation is a single left-to-right walk over the token stream.
//! Two stacks track the enclosing expressions: the separator to print
//! between siblings (`,` for argument lists, the infix connective for
//! binary operators) and how many siblings have been printed so far.
//! Free variables of each top-level expression are bound by an outer
//! `! [..] : `, and several top-level expressions are joined with `&`.

use indexmap::IndexSet;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::formula::reader::{tokenize, Token};
use crate::formula::vocabulary::{
    is_variable, AND, EQUAL, EXISTS, FORALL, IF, IFF, LOG_FALSE, LOG_TRUE, NOT, OR,
};
use crate::formula::Node;

/// Appended to relation names used as arguments
pub const MENTION_SUFFIX: &str = "__m";
pub const SYMBOL_PREFIX: &str = "s__";
pub const VARIABLE_PREFIX: &str = "V__";

/// Symbols that never take the mention suffix
const MENTION_EXCEPTIONS: [&str; 1] = ["en"];

const PREDICATES: [(&str, &str); 11] = [
    (LOG_TRUE, "$true"),
    (LOG_FALSE, "$false"),
    (EQUAL, "equal"),
    ("<=", "lesseq"),
    ("<", "less"),
    (">", "greater"),
    (">=", "greatereq"),
    ("lessThanOrEqualTo", "lesseq"),
    ("lessThan", "less"),
    ("greaterThan", "greater"),
    ("greaterThanOrEqualTo", "greatereq"),
];

const FUNCTIONS: [(&str, &str); 4] = [
    ("MultiplicationFn", "times"),
    ("DivisionFn", "divide"),
    ("AdditionFn", "plus"),
    ("SubtractionFn", "minus"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    /// Printed before its single operand
    Prefix(&'static str),
    /// Printed between operands
    Infix(&'static str),
}

fn operator(word: &str) -> Option<Operator> {
    match word {
        FORALL => Some(Operator::Prefix("! ")),
        EXISTS => Some(Operator::Prefix("? ")),
        NOT => Some(Operator::Prefix("~ ")),
        AND => Some(Operator::Infix(" & ")),
        OR => Some(Operator::Infix(" | ")),
        IF => Some(Operator::Infix(" => ")),
        IFF => Some(Operator::Infix(" <=> ")),
        _ => None,
    }
}

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    table.iter().find(|(kif, _)| *kif == word).map(|(_, tptp)| *tptp)
}

fn is_number(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('-') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Translate a quoted string token: single quotes, no embedded quotes,
/// control whitespace flattened to spaces
fn translate_string(token: &str) -> String {
    let inner = token
        .get(1..token.len().saturating_sub(1))
        .unwrap_or_default();
    let cleaned: String = inner
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if matches!(c, '\n' | '\t' | '\r' | '\x0c') { ' ' } else { c })
        .collect();
    format!("'{}'", cleaned)
}

/// Translate a single symbol.
///
/// `has_arguments` is true when the symbol heads a list. Relation names
/// occurring as arguments get the mention suffix, which is dropped under
/// holds prefixing for everything except the built-in comparison and
/// arithmetic relations.
pub fn translate_word(word: &str, has_arguments: bool, holds_prefix: bool) -> String {
    let builtin = lookup(&PREDICATES, word).or_else(|| lookup(&FUNCTIONS, word));
    let mention = if holds_prefix && builtin.is_none() {
        ""
    } else {
        MENTION_SUFFIX
    };

    if let Some(rest) = word.strip_prefix(|c| c == '?' || c == '@') {
        return format!("{}{}", VARIABLE_PREFIX, rest.replace('-', "_"));
    }
    if let Some(tptp) = builtin {
        return if has_arguments {
            tptp.to_string()
        } else {
            format!("{}{}", tptp, mention)
        };
    }
    if let Some(Operator::Prefix(op) | Operator::Infix(op)) = operator(word) {
        return op.to_string();
    }
    if is_number(word) {
        return word.to_string();
    }

    let mut term = word.to_string();
    if !has_arguments {
        let lowercase = word.chars().next().is_some_and(char::is_lowercase);
        if ((lowercase && !word.ends_with(mention)) || word.ends_with("Fn"))
            && !MENTION_EXCEPTIONS.contains(&word)
        {
            term.push_str(mention);
        }
    }
    format!("{}{}", SYMBOL_PREFIX, term.replace('-', "_"))
}

/// Walk state for one top-level expression
struct Translator {
    holds_prefix: bool,
    out: String,
    separators: Vec<&'static str>,
    counts: Vec<usize>,
    paren_level: usize,
    last_was_open: bool,
    in_quantifier_vars: bool,
    /// Quote marker seen, waiting for the list it applies to
    quote_pending: bool,
    /// Paren depth inside the outermost quoted term, when inside one
    quote_depth: Option<usize>,
    quantified: IndexSet<String>,
    variables: IndexSet<String>,
}

impl Translator {
    fn new(holds_prefix: bool) -> Self {
        Translator {
            holds_prefix,
            out: String::new(),
            separators: Vec::new(),
            counts: vec![0],
            paren_level: 0,
            last_was_open: false,
            in_quantifier_vars: false,
            quote_pending: false,
            quote_depth: None,
            quantified: IndexSet::new(),
            variables: IndexSet::new(),
        }
    }

    fn reset(&mut self) {
        *self = Translator::new(self.holds_prefix);
    }

    fn error(&self, message: &str) -> TransformError {
        TransformError::Tptp(format!("{} at '{}'", message, self.out))
    }

    fn separate(&mut self) {
        if self.counts.last().is_some_and(|c| *c > 0) {
            if let Some(separator) = self.separators.last() {
                self.out.push_str(separator);
            }
        }
    }

    fn bump(&mut self) {
        if let Some(count) = self.counts.last_mut() {
            *count += 1;
        }
    }

    fn open_quote_if_outermost(&mut self) {
        if self.quote_depth == Some(1) {
            self.out.push('\'');
        }
    }

    fn open(&mut self) -> Result<()> {
        if self.last_was_open {
            return Err(self.error("double open bracket"));
        }
        if std::mem::take(&mut self.quote_pending) && self.quote_depth.is_none() {
            self.quote_depth = Some(0);
        }
        if let Some(depth) = self.quote_depth.as_mut() {
            *depth += 1;
        }
        self.last_was_open = true;
        self.paren_level += 1;
        Ok(())
    }

    fn operator(&mut self, word: &str, op: Operator) -> Result<()> {
        if !self.last_was_open {
            return Err(self.error(&format!("missing ( before {}", word)));
        }
        self.separate();
        self.open_quote_if_outermost();
        self.out.push('(');
        match op {
            Operator::Prefix(prefix) => {
                self.out.push_str(prefix);
                self.counts.push(0);
                self.separators.push(",");
                self.in_quantifier_vars = word == FORALL || word == EXISTS;
            }
            Operator::Infix(infix) => {
                self.counts.push(0);
                self.separators.push(infix);
            }
        }
        self.last_was_open = false;
        Ok(())
    }

    fn term(&mut self, translated: String, raw: &str) {
        if self.last_was_open {
            if self.in_quantifier_vars {
                self.out.push('[');
                self.out.push_str(&translated);
                self.bump();
            } else {
                self.separate();
                self.open_quote_if_outermost();
                self.out.push_str(&translated);
                self.out.push('(');
                self.counts.push(0);
                self.separators.push(",");
            }
        } else {
            self.separate();
            self.out.push_str(&translated);
            self.bump();
        }
        if is_variable(raw) {
            let variable = translate_word(raw, false, self.holds_prefix);
            if self.in_quantifier_vars {
                self.quantified.insert(variable);
            } else {
                self.variables.insert(variable);
            }
        }
        self.last_was_open = false;
    }

    /// Returns the finished expression when this closes a top-level one
    fn close(&mut self) -> Result<Option<String>> {
        if self.last_was_open {
            return Err(self.error("empty list"));
        }
        if self.paren_level == 0 {
            return Err(self.error("extra closing bracket"));
        }
        if let Some(depth) = self.quote_depth.as_mut() {
            *depth = depth.saturating_sub(1);
        }
        if self.in_quantifier_vars {
            // the variable list does not count as an operand of the quantifier
            self.counts.pop();
            self.counts.push(0);
            self.out.push_str("] : ");
            self.in_quantifier_vars = false;
        } else {
            self.counts.pop();
            self.separators.pop();
            self.out.push(')');
            if self.quote_depth == Some(0) {
                self.out.push('\'');
                self.quote_depth = None;
            }
            self.bump();
        }
        self.last_was_open = false;
        self.paren_level -= 1;

        if self.paren_level > 0 {
            return Ok(None);
        }
        if self.counts.pop() != Some(1) {
            return Err(self.error("not one formula"));
        }
        let free: Vec<&str> = self
            .variables
            .iter()
            .filter(|v| !self.quantified.contains(*v))
            .map(String::as_str)
            .collect();
        let body = if free.is_empty() {
            std::mem::take(&mut self.out)
        } else {
            format!("( ! [{}] : {} )", free.join(","), self.out)
        };
        self.reset();
        Ok(Some(body))
    }
}

/// Translate every top-level expression in `text`.
///
/// Each expression renders as `( f )`; later ones are appended as
/// `& ( f )`. A bare symbol with no enclosing list is returned as its
/// translated token.
pub fn translate_text(text: &str, holds_prefix: bool) -> Result<String> {
    let tokens = tokenize(text)?;
    let mut translator = Translator::new(holds_prefix);
    let mut translated: Option<String> = None;

    for token in tokens {
        match token {
            Token::Open => translator.open()?,
            Token::Close => {
                if let Some(body) = translator.close()? {
                    translated = Some(match translated {
                        None => format!("( {} )", body),
                        Some(previous) => format!("{}& ( {} )", previous, body),
                    });
                }
            }
            Token::Backtick => translator.quote_pending = true,
            Token::Str(s) => {
                translator.quote_pending = false;
                translator.term(translate_string(s), s);
            }
            Token::Word(w) => {
                translator.quote_pending = false;
                match operator(w) {
                    Some(op) => translator.operator(w, op)?,
                    None => {
                        let translated_word =
                            translate_word(w, translator.last_was_open, holds_prefix);
                        translator.term(translated_word, w);
                    }
                }
            }
        }
    }

    if translator.paren_level > 0 {
        debug!(text, "unclosed expression in TPTP input");
        return Err(translator.error("unclosed expression"));
    }
    match translated {
        Some(result) if translator.out.is_empty() => Ok(result),
        Some(result) => Ok(format!("{}& {}", result, translator.out)),
        None => Ok(translator.out),
    }
}

/// Translate a single formula tree
pub fn translate_formula(node: &Node, holds_prefix: bool) -> Result<String> {
    translate_text(&node.to_string(), holds_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parse_node;

    fn tptp(text: &str) -> String {
        translate_formula(&parse_node(text).unwrap(), false).unwrap()
    }

    #[test]
    fn test_negated_literal_is_universally_closed() {
        assert_eq!(tptp("(not (p ?X))"), "( ( ! [V__X] : (~ s__p(V__X)) ) )");
    }

    #[test]
    fn test_binary_connectives_are_infix() {
        assert_eq!(
            tptp("(=> (and (p a) (q b)) (r c))"),
            "( ((s__p(s__a__m) & s__q(s__b__m)) => s__r(s__c__m)) )"
        );
        assert_eq!(tptp("(<=> (p A) (q B))"), "( (s__p(s__A) <=> s__q(s__B)) )");
    }

    #[test]
    fn test_quantifier_variable_list() {
        assert_eq!(
            tptp("(forall (?X ?Y) (or (p ?X) (q ?Y)))"),
            "( (! [V__X,V__Y] : (s__p(V__X) | s__q(V__Y))) )"
        );
        assert_eq!(
            tptp("(exists (?X) (p ?X ?Z))"),
            "( ( ! [V__Z] : (? [V__X] : s__p(V__X,V__Z)) ) )"
        );
    }

    #[test]
    fn test_translate_word() {
        assert_eq!(translate_word("?Some-Var", false, false), "V__Some_Var");
        assert_eq!(translate_word("@ROW", false, false), "V__ROW");
        assert_eq!(translate_word("lessThan", true, false), "less");
        assert_eq!(translate_word("lessThan", false, false), "less__m");
        assert_eq!(translate_word("lessThan", false, true), "less__m");
        assert_eq!(translate_word("AdditionFn", true, false), "plus");
        assert_eq!(translate_word("TRUE", true, false), "$true");
        assert_eq!(translate_word("-3.5", false, false), "-3.5");
        assert_eq!(translate_word("42", false, false), "42");
        assert_eq!(translate_word("part-of", true, false), "s__part_of");
        assert_eq!(translate_word("partOf", false, false), "s__partOf__m");
        assert_eq!(translate_word("partOf", false, true), "s__partOf");
        assert_eq!(translate_word("ListFn", false, false), "s__ListFn__m");
        assert_eq!(translate_word("Human", false, false), "s__Human");
        assert_eq!(translate_word("en", false, false), "s__en");
    }

    #[test]
    fn test_strings_are_single_quoted() {
        assert_eq!(
            tptp("(documentation Dog EnglishLanguage \"it's a\tdog\")"),
            "( s__documentation(s__Dog,s__EnglishLanguage,'its a dog') )"
        );
    }

    #[test]
    fn test_quoted_term_is_single_quoted() {
        assert_eq!(
            tptp("(believes John `(likes Mary ?X))"),
            "( ( ! [V__X] : s__believes(s__John,'s__likes(s__Mary,V__X)') ) )"
        );
    }

    #[test]
    fn test_multiple_expressions_are_conjoined() {
        let text = translate_text("(p a) (q ?Y)", false).unwrap();
        assert_eq!(text, "( s__p(s__a__m) )& ( ( ! [V__Y] : s__q(V__Y) ) )");
    }

    #[test]
    fn test_bare_symbol() {
        assert_eq!(translate_text("Foo", false).unwrap(), "s__Foo");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(matches!(translate_text("((p a))", false), Err(TransformError::Tptp(_))));
        assert!(matches!(translate_text("(p a))", false), Err(TransformError::Tptp(_))));
        assert!(matches!(translate_text("(p (a)", false), Err(TransformError::Tptp(_))));
        assert!(matches!(translate_text("(p not)", false), Err(TransformError::Tptp(_))));
    }
}
