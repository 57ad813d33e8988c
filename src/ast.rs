use serde::{Deserialize, Serialize};

/// One node of a parsed clause.
///
/// Serialized with a `type` tag so the JSON shape matches what external
/// renderers expect (`{"type":"Predicate","name":..,"arguments":[..]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Term {
    Predicate {
        name: String,
        arguments: Vec<Term>,
    },
    Variable {
        value: String,
    },
    Condition {
        operator: String,
        #[serde(rename = "leftOperand")]
        left_operand: Box<Term>,
        #[serde(rename = "rightOperand")]
        right_operand: Box<Term>,
    },
    ListLiteral {
        list: Vec<Term>,
    },
    Atom {
        value: String,
    },
    /// Bare ordered group, e.g. a parenthesised conjunction. Never becomes a
    /// graph node; its elements attach to the enclosing parent.
    Sequence {
        items: Vec<Term>,
    },
}

impl Term {
    pub fn predicate(name: impl Into<String>, arguments: Vec<Term>) -> Self {
        Self::Predicate {
            name: name.into(),
            arguments,
        }
    }

    pub fn variable(value: impl Into<String>) -> Self {
        Self::Variable {
            value: value.into(),
        }
    }

    pub fn atom(value: impl Into<String>) -> Self {
        Self::Atom {
            value: value.into(),
        }
    }

    pub fn condition(operator: impl Into<String>, left: Term, right: Term) -> Self {
        Self::Condition {
            operator: operator.into(),
            left_operand: Box::new(left),
            right_operand: Box::new(right),
        }
    }

    pub fn list(list: Vec<Term>) -> Self {
        Self::ListLiteral { list }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Predicate { .. } => "Predicate",
            Term::Variable { .. } => "Variable",
            Term::Condition { .. } => "Condition",
            Term::ListLiteral { .. } => "ListLiteral",
            Term::Atom { .. } => "Atom",
            Term::Sequence { .. } => "Sequence",
        }
    }
}

/// A fact or rule. Rules keep their head as the first body entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub body: Vec<Term>,
}

impl Clause {
    pub fn new(body: Vec<Term>) -> Self {
        Self { body }
    }

    /// `name/arity` of the clause head, the key clauses are grouped under.
    pub fn predicate_key(&self) -> Option<(&str, usize)> {
        match self.body.first()? {
            Term::Predicate { name, arguments } => Some((name.as_str(), arguments.len())),
            Term::Atom { value } => Some((value.as_str(), 0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag_and_camel_case_operands() {
        let term = Term::condition(">", Term::variable("X"), Term::atom("3"));
        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(json["type"], "Condition");
        assert_eq!(json["operator"], ">");
        assert_eq!(json["leftOperand"]["value"], "X");
        assert_eq!(json["rightOperand"]["type"], "Atom");
    }

    #[test]
    fn predicate_key_is_head_name_and_arity() {
        let rule = Clause::new(vec![
            Term::predicate("grand", vec![Term::variable("X"), Term::variable("Z")]),
            Term::predicate("parent", vec![Term::variable("X")]),
        ]);
        assert_eq!(rule.predicate_key(), Some(("grand", 2)));
        assert_eq!(Clause::new(vec![Term::atom("go")]).predicate_key(), Some(("go", 0)));
        assert_eq!(Clause::default().predicate_key(), None);
    }

    #[test]
    fn kind_names_match_tags() {
        assert_eq!(Term::list(vec![]).kind_name(), "ListLiteral");
        assert_eq!(Term::predicate("p", vec![]).kind_name(), "Predicate");
    }
}
