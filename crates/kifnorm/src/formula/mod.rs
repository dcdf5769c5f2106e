//! SUO-KIF formula representation

pub mod kif;
pub mod node;
pub mod reader;
pub mod scope;
pub mod vocabulary;

pub use kif::{Formula, SourceLocation};
pub use node::Node;
pub use reader::{is_balanced, parse_node, parse_nodes, tokenize, Token};
pub use scope::{collect_quantified_variables, collect_unquantified_variables, make_quantifiers_explicit};
