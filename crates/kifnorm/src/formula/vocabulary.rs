//! SUO-KIF operator names and symbol classification

pub const AND: &str = "and";
pub const OR: &str = "or";
pub const NOT: &str = "not";
pub const IF: &str = "=>";
pub const IFF: &str = "<=>";
pub const FORALL: &str = "forall";
pub const EXISTS: &str = "exists";
pub const EQUAL: &str = "equal";
pub const HOLDS: &str = "holds";
pub const INSTANCE: &str = "instance";
pub const SUBCLASS: &str = "subclass";

pub const LOG_TRUE: &str = "TRUE";
pub const LOG_FALSE: &str = "FALSE";

pub const SKOLEM_FUNCTION: &str = "SkFn";
pub const SKOLEM_CONSTANT: &str = "Sk";
pub const FN_SUFFIX: &str = "Fn";

pub const VAR_PREFIX: char = '?';
pub const ROW_PREFIX: char = '@';

/// Base of fresh ordinary variables
pub const VAR_BASE: &str = "?X";
/// Base of fresh row variables
pub const ROW_BASE: &str = "@ROW";
/// Base of normalized ordinary variables
pub const CANONICAL_VAR_BASE: &str = "?VAR";
/// Base of normalized row variables
pub const CANONICAL_ROW_BASE: &str = "@ROWVAR";

pub const LOGICAL_OPERATORS: [&str; 7] = [FORALL, EXISTS, AND, OR, NOT, IF, IFF];

pub const COMPARISON_OPERATORS: [&str; 5] = [
    EQUAL,
    "greaterThan",
    "greaterThanOrEqualTo",
    "lessThan",
    "lessThanOrEqualTo",
];

pub const MATH_FUNCTIONS: [&str; 4] = [
    "AdditionFn",
    "SubtractionFn",
    "MultiplicationFn",
    "DivisionFn",
];

/// Relations whose textual arguments are documentation rather than logic
pub const DOC_PREDICATES: [&str; 6] = [
    "documentation",
    "comment",
    "localDocumentation",
    "externalImage",
    "format",
    "termFormat",
];

pub fn is_quantifier(symbol: &str) -> bool {
    symbol == FORALL || symbol == EXISTS
}

/// `and` and `or`, whose arguments may be reordered freely
pub fn is_commutative(symbol: &str) -> bool {
    symbol == AND || symbol == OR
}

pub fn is_logical_operator(symbol: &str) -> bool {
    LOGICAL_OPERATORS.contains(&symbol)
}

pub fn is_comparison_operator(symbol: &str) -> bool {
    COMPARISON_OPERATORS.contains(&symbol)
}

pub fn is_math_function(symbol: &str) -> bool {
    MATH_FUNCTIONS.contains(&symbol)
}

pub fn is_variable(symbol: &str) -> bool {
    symbol.starts_with(VAR_PREFIX) || symbol.starts_with(ROW_PREFIX)
}

pub fn is_row_variable(symbol: &str) -> bool {
    symbol.starts_with(ROW_PREFIX)
}

/// Function symbols end in `Fn` and have at least one character before it
pub fn is_function(symbol: &str) -> bool {
    symbol.len() > FN_SUFFIX.len() && symbol.ends_with(FN_SUFFIX)
}

/// Skolem constants such as `Sk12`: an optional leading character, `Sk`,
/// and a tail ending in digits.
pub fn is_skolem_constant(symbol: &str) -> bool {
    let tail = match symbol.strip_prefix(SKOLEM_CONSTANT) {
        Some(tail) => tail,
        None => {
            let mut chars = symbol.chars();
            chars.next();
            match chars.as_str().strip_prefix(SKOLEM_CONSTANT) {
                Some(tail) => tail,
                None => return false,
            }
        }
    };
    !tail.is_empty()
        && !tail.chars().any(char::is_whitespace)
        && tail.ends_with(|c: char| c.is_ascii_digit())
}
