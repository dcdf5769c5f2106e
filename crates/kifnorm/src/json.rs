//! JSON serialization types for normalization results

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::clausal::{ClausalForm, Clause};
use crate::error::Diagnostic;
use crate::formula::{Node, SourceLocation};
use crate::preprocess::ProcessedFormula;

/// JSON representation of an expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeJson {
    Atom { name: String },
    List { items: Vec<NodeJson> },
    Quoted { term: Box<NodeJson> },
}

impl From<&Node> for NodeJson {
    fn from(node: &Node) -> Self {
        match node {
            Node::Atom(name) => NodeJson::Atom { name: name.clone() },
            Node::List(items) => NodeJson::List {
                items: items.iter().map(NodeJson::from).collect(),
            },
            Node::Quoted(inner) => NodeJson::Quoted {
                term: Box::new(NodeJson::from(inner.as_ref())),
            },
        }
    }
}

impl From<&NodeJson> for Node {
    fn from(json: &NodeJson) -> Self {
        match json {
            NodeJson::Atom { name } => Node::Atom(name.clone()),
            NodeJson::List { items } => Node::List(items.iter().map(Node::from).collect()),
            NodeJson::Quoted { term } => Node::Quoted(Box::new(Node::from(term.as_ref()))),
        }
    }
}

/// JSON representation of a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralJson {
    pub polarity: bool,
    pub atom: String,
}

/// JSON representation of a clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseJson {
    pub literals: Vec<LiteralJson>,
}

impl From<&Clause> for ClauseJson {
    fn from(clause: &Clause) -> Self {
        let negative = clause.negative.iter().map(|atom| LiteralJson {
            polarity: false,
            atom: atom.to_string(),
        });
        let positive = clause.positive.iter().map(|atom| LiteralJson {
            polarity: true,
            atom: atom.to_string(),
        });
        ClauseJson {
            literals: negative.chain(positive).collect(),
        }
    }
}

/// JSON representation of a clausal form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClausalFormJson {
    pub clauses: Vec<ClauseJson>,
    /// Final variable to the surface variable it stands for
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub renames: IndexMap<String, String>,
}

impl From<&ClausalForm> for ClausalFormJson {
    fn from(cf: &ClausalForm) -> Self {
        ClausalFormJson {
            clauses: cf.clauses.iter().map(ClauseJson::from).collect(),
            renames: cf.renames.composed(),
        }
    }
}

/// JSON representation of one processed formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFormulaJson {
    pub formula: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<SourceLocation>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub clausal_form: Option<ClausalFormJson>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tptp: Option<String>,
}

impl From<&ProcessedFormula> for ProcessedFormulaJson {
    fn from(processed: &ProcessedFormula) -> Self {
        ProcessedFormulaJson {
            formula: processed.formula.to_string(),
            source: processed.formula.source().cloned(),
            clausal_form: processed.clausal_form.as_ref().map(ClausalFormJson::from),
            canonical: processed.canonical.as_ref().map(Node::to_string),
            tptp: processed.tptp.clone(),
        }
    }
}

/// JSON representation of a processing batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJson {
    pub formulas: Vec<ProcessedFormulaJson>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchJson {
    pub fn new(results: &[ProcessedFormula], diagnostics: Vec<Diagnostic>) -> Self {
        BatchJson {
            formulas: results.iter().map(ProcessedFormulaJson::from).collect(),
            diagnostics,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
