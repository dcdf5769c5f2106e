//! SUO-KIF reader: nom lexer, tree builder and balance check

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, take_while1},
    character::complete::{anychar, char, multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded},
    IResult,
};

use super::node::Node;
use crate::error::{Result, TransformError};

/// Lexical tokens of SUO-KIF text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open,
    Close,
    /// Higher-order quote marker
    Backtick,
    /// Quoted string including its delimiters
    Str(&'a str),
    /// Symbol, variable or number
    Word(&'a str),
}

fn trivia(input: &str) -> IResult<&str, usize> {
    many0_count(alt((
        multispace1,
        recognize(pair(char(';'), not_line_ending)),
    )))(input)
}

fn quoted_string(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(
            char('"'),
            opt(escaped(is_not("\\\""), '\\', anychar)),
            char('"'),
        )),
        recognize(delimited(
            char('\''),
            opt(escaped(is_not("\\'"), '\\', anychar)),
            char('\''),
        )),
    ))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !"()\"'`;".contains(c))(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    preceded(
        trivia,
        alt((
            value(Token::Open, char('(')),
            value(Token::Close, char(')')),
            value(Token::Backtick, char('`')),
            map(quoted_string, Token::Str),
            map(word, Token::Word),
        )),
    )(input)
}

/// Split text into tokens, skipping whitespace and `;` comments
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    let (rest, tokens) = many0(token)(input).map_err(|e| TransformError::Parse(e.to_string()))?;
    let (rest, _) = trivia(rest).map_err(|e| TransformError::Parse(e.to_string()))?;
    if !rest.is_empty() {
        let snippet: String = rest.chars().take(40).collect();
        return Err(TransformError::Parse(format!("unexpected input at: {}", snippet)));
    }
    Ok(tokens)
}

struct Frame {
    items: Vec<Node>,
    quoted: bool,
}

fn quote_if(node: Node, quoted: bool) -> Node {
    if quoted {
        Node::Quoted(Box::new(node))
    } else {
        node
    }
}

/// Parse every top-level expression in `text`
pub fn parse_nodes(text: &str) -> Result<Vec<Node>> {
    let tokens = tokenize(text)?;
    let mut stack = vec![Frame { items: Vec::new(), quoted: false }];
    let mut quote_next = false;

    for token in tokens {
        match token {
            Token::Backtick => quote_next = true,
            Token::Open => stack.push(Frame {
                items: Vec::new(),
                quoted: std::mem::take(&mut quote_next),
            }),
            Token::Close => {
                let frame = match stack.pop() {
                    Some(frame) if !stack.is_empty() => frame,
                    _ => return Err(TransformError::Unbalanced(text.to_string())),
                };
                let node = quote_if(Node::List(frame.items), frame.quoted);
                if let Some(parent) = stack.last_mut() {
                    parent.items.push(node);
                }
            }
            Token::Str(s) | Token::Word(s) => {
                let node = quote_if(Node::atom(s), std::mem::take(&mut quote_next));
                if let Some(parent) = stack.last_mut() {
                    parent.items.push(node);
                }
            }
        }
    }

    if quote_next {
        return Err(TransformError::Parse(format!("dangling backtick in: {}", text)));
    }
    match stack.pop() {
        Some(frame) if stack.is_empty() => Ok(frame.items),
        _ => Err(TransformError::Unbalanced(text.to_string())),
    }
}

/// Parse text holding exactly one expression
pub fn parse_node(text: &str) -> Result<Node> {
    let mut nodes = parse_nodes(text)?;
    match nodes.len() {
        1 => Ok(nodes.remove(0)),
        0 => Err(TransformError::Parse("empty formula".to_string())),
        n => Err(TransformError::Parse(format!(
            "expected a single expression, found {}: {}",
            n, text
        ))),
    }
}

/// Whether `text` is a single parenthesized list with balanced parens.
///
/// Parens inside quoted strings and `;` comments do not count. Anything
/// that is not a list is reported as unbalanced.
pub fn is_balanced(text: &str) -> bool {
    let text = text.trim();
    if !(text.starts_with('(') && text.ends_with(')')) {
        return false;
    }
    let mut depth: i64 = 0;
    let mut quote: Option<char> = None;
    let mut escaping = false;
    let mut in_comment = false;

    for c in text.chars() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if let Some(q) = quote {
            if escaping {
                escaping = false;
            } else if c == '\\' {
                escaping = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && quote.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("(instance ?X \"a (b)\") ; trailing comment").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Open,
                Token::Word("instance"),
                Token::Word("?X"),
                Token::Str("\"a (b)\""),
                Token::Close,
            ]
        );
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let node = parse_node(r#"(comment Foo "say \"hi\"")"#).unwrap();
        assert_eq!(node.argument(2).unwrap().as_atom(), Some(r#""say \"hi\"""#));
    }

    #[test]
    fn test_parse_nested() {
        let node = parse_node("(=> (instance ?X Human)\n  (exists (?Y) (mother ?X ?Y)))").unwrap();
        assert_eq!(node.list_length(), Some(3));
        assert_eq!(
            node.to_string(),
            "(=> (instance ?X Human) (exists (?Y) (mother ?X ?Y)))"
        );
    }

    #[test]
    fn test_parse_backtick() {
        let node = parse_node("(believes John `(loves Mary John))").unwrap();
        assert!(matches!(node.argument(2), Some(Node::Quoted(_))));
        assert_eq!(node.to_string(), "(believes John `(loves Mary John))");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_node("(p a"), Err(TransformError::Unbalanced(_))));
        assert!(matches!(parse_node("p a)"), Err(TransformError::Unbalanced(_))));
        assert!(matches!(parse_node(""), Err(TransformError::Parse(_))));
        assert!(matches!(parse_node("(p) (q)"), Err(TransformError::Parse(_))));
        assert_eq!(parse_nodes("(p) (q)").unwrap().len(), 2);
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("(p a)"));
        assert!(is_balanced("()"));
        assert!(is_balanced("(p \"unclosed ( paren\")"));
        assert!(!is_balanced("(p (q a)"));
        assert!(!is_balanced("(p a))("));
        assert!(!is_balanced("(p \"open string)"));
        assert!(!is_balanced("atom"));
    }
}
