use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error};

/// Operator tables the clause parser is driven by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Grammar {
    /// Non-associative goal-level operators, each producing a `Condition`.
    pub comparison_operators: Vec<String>,
    pub additive_operators: Vec<String>,
    pub multiplicative_operators: Vec<String>,
    /// Prefixes that wrap the following goal in a one-argument predicate.
    pub negation_prefixes: Vec<String>,
}

impl Default for Grammar {
    fn default() -> Self {
        fn owned(ops: &[&str]) -> Vec<String> {
            ops.iter().map(|op| op.to_string()).collect()
        }
        Self {
            comparison_operators: owned(&[
                "=", "\\=", "==", "\\==", "is", "=:=", "=\\=", "<", ">", "=<", ">=", "@<", "@>",
                "@=<", "@>=", "=..",
            ]),
            additive_operators: owned(&["+", "-"]),
            multiplicative_operators: owned(&["*", "/", "//", "mod", "rem"]),
            negation_prefixes: owned(&["\\+", "not"]),
        }
    }
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("failed to read grammar {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid grammar syntax in {path}: {message}")]
    Syntax { path: PathBuf, message: String },
    #[error("grammar contains an empty operator")]
    EmptyOperator,
    #[error("operator `{0}` is defined in more than one table")]
    DuplicateOperator(String),
}

impl Grammar {
    pub fn is_comparison(&self, op: &str) -> bool {
        self.comparison_operators.iter().any(|candidate| candidate == op)
    }

    pub fn is_additive(&self, op: &str) -> bool {
        self.additive_operators.iter().any(|candidate| candidate == op)
    }

    pub fn is_multiplicative(&self, op: &str) -> bool {
        self.multiplicative_operators.iter().any(|candidate| candidate == op)
    }

    pub fn is_negation(&self, op: &str) -> bool {
        self.negation_prefixes.iter().any(|candidate| candidate == op)
    }

    pub fn validate(&self) -> Result<(), GrammarError> {
        let mut seen = HashSet::new();
        let tables = [
            &self.comparison_operators,
            &self.additive_operators,
            &self.multiplicative_operators,
            &self.negation_prefixes,
        ];
        for op in tables.into_iter().flatten() {
            if op.trim().is_empty() {
                return Err(GrammarError::EmptyOperator);
            }
            if !seen.insert(op.as_str()) {
                return Err(GrammarError::DuplicateOperator(op.clone()));
            }
        }
        Ok(())
    }

    pub fn from_json5(contents: &str, path: &Path) -> Result<Self, GrammarError> {
        let grammar: Grammar =
            json5::from_str(contents).map_err(|err| GrammarError::Syntax {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        grammar.validate()?;
        Ok(grammar)
    }
}

/// Loads the grammar from a JSON5 file, or the built-in one when no path is
/// given.
pub fn load_grammar(path: Option<&Path>) -> Result<Grammar, GrammarError> {
    let Some(path) = path else {
        return Ok(Grammar::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|source| {
        error!(path = %path.display(), %source, "error fetching grammar file");
        GrammarError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let grammar = Grammar::from_json5(&contents, path).inspect_err(|err| {
        error!(path = %path.display(), %err, "error loading grammar file");
    })?;
    debug!(path = %path.display(), "loaded grammar");
    Ok(grammar)
}
