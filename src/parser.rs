use crate::ast::{Clause, Term};
use crate::grammar::Grammar;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());
static VARIABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_][A-Za-z0-9_]*").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9_]*").unwrap());
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0'(?:\\.|''|.)|[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)").unwrap()
});
static SYMBOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+\-*/\\^<>=~:.?@#&$]+").unwrap());

const NECK: &str = ":-";
const IF_THEN: &str = "->";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected `{found}` at offset {offset} in `{clause}`")]
    UnexpectedToken {
        clause: String,
        offset: usize,
        found: String,
    },
    #[error("unexpected end of clause `{clause}`")]
    UnexpectedEnd { clause: String },
    #[error("unterminated quote at offset {offset} in `{clause}`")]
    UnterminatedQuote { clause: String, offset: usize },
    #[error("invalid character `{ch}` at offset {offset} in `{clause}`")]
    InvalidCharacter {
        clause: String,
        offset: usize,
        ch: char,
    },
}

/// Turns one normalized clause string into its syntax tree.
pub trait ClauseParser {
    fn parse(&self, clause: &str) -> Result<Clause, ParseError>;
}

#[derive(Debug, Clone, Default)]
pub struct GrammarParser {
    grammar: Grammar,
}

impl GrammarParser {
    pub fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }
}

impl ClauseParser for GrammarParser {
    fn parse(&self, clause: &str) -> Result<Clause, ParseError> {
        parse_clause(clause, &self.grammar)
    }
}

/// Parses `head.` into `[head]` and `head :- g1, g2.` into `[head, g1, g2]`.
pub fn parse_clause(input: &str, grammar: &Grammar) -> Result<Clause, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        clause: input,
        grammar,
    };

    let mut body = vec![parser.goal()?];
    if parser.eat_symbol(NECK) {
        body.extend(parser.goals()?);
    }
    parser.expect(&Tok::End)?;
    if let Some(extra) = parser.peek() {
        return Err(parser.unexpected(extra));
    }
    Ok(Clause::new(body))
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Variable(String),
    Name(String),
    Quoted(String),
    Number(String),
    Str(String),
    Symbol(String),
    Punct(char),
    End,
}

impl Tok {
    fn text(&self) -> String {
        match self {
            Tok::Variable(text) | Tok::Name(text) | Tok::Number(text) | Tok::Symbol(text) => {
                text.clone()
            }
            Tok::Quoted(text) => format!("'{text}'"),
            Tok::Str(text) => format!("\"{text}\""),
            Tok::Punct(ch) => ch.to_string(),
            Tok::End => ".".to_string(),
        }
    }

    /// Operator spelling, for tokens that may act as infix operators.
    fn operator(&self) -> Option<&str> {
        match self {
            Tok::Symbol(text) | Tok::Name(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    tok: Tok,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        if let Some(m) = WHITESPACE_RE.find(rest) {
            pos += m.end();
            continue;
        }

        let offset = pos;
        let Some(first) = rest.chars().next() else {
            break;
        };

        let (tok, len) = if let Some(m) = VARIABLE_RE.find(rest) {
            (Tok::Variable(m.as_str().to_string()), m.end())
        } else if let Some(m) = NAME_RE.find(rest) {
            (Tok::Name(m.as_str().to_string()), m.end())
        } else if let Some(m) = NUMBER_RE.find(rest) {
            (Tok::Number(m.as_str().to_string()), m.end())
        } else if first == '\'' || first == '"' || first == '`' {
            let (text, len) = read_quoted(rest, first).ok_or_else(|| {
                ParseError::UnterminatedQuote {
                    clause: input.to_string(),
                    offset,
                }
            })?;
            let tok = if first == '\'' {
                Tok::Quoted(text)
            } else {
                Tok::Str(text)
            };
            (tok, len)
        } else if let Some(m) = SYMBOL_RE.find(rest) {
            let symbol = split_sign(m.as_str(), &rest[m.end()..]);
            if symbol == "." && input[pos + 1..].trim().is_empty() {
                (Tok::End, 1)
            } else {
                (Tok::Symbol(symbol.to_string()), symbol.len())
            }
        } else if matches!(first, '(' | ')' | '[' | ']' | ',' | '|' | ';' | '!') {
            (Tok::Punct(first), first.len_utf8())
        } else {
            return Err(ParseError::InvalidCharacter {
                clause: input.to_string(),
                offset,
                ch: first,
            });
        };

        tokens.push(Token { tok, offset });
        pos += len;
    }

    Ok(tokens)
}

/// Leaves a trailing sign to the number after it, so `*-1` reads as `*`
/// followed by `-1`.
fn split_sign<'a>(symbol: &'a str, after: &str) -> &'a str {
    let signed_number = after.starts_with(|ch: char| ch.is_ascii_digit());
    match symbol.strip_suffix(&['-', '+'][..]) {
        Some(head) if signed_number && !head.is_empty() => head,
        _ => symbol,
    }
}

/// Reads a quoted token starting at `rest[0]`, returning its unescaped text
/// and byte length including both quotes.
fn read_quoted(rest: &str, quote: char) -> Option<(String, usize)> {
    let mut text = String::new();
    let mut chars = rest.char_indices().skip(1).peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            let (_, escaped) = chars.next()?;
            text.push(match escaped {
                'n' => '\n',
                't' => '\t',
                other => other,
            });
            continue;
        }
        if ch == quote {
            if chars.peek().is_some_and(|&(_, next)| next == quote) {
                chars.next();
                text.push(quote);
                continue;
            }
            return Some((text, idx + ch.len_utf8()));
        }
        text.push(ch);
    }
    None
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    clause: &'a str,
    grammar: &'a Grammar,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_tok(&self) -> Option<&Tok> {
        self.peek().map(|token| &token.tok)
    }

    fn peek_tok_at(&self, ahead: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + ahead).map(|token| &token.tok)
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| self.end())?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek_tok() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if matches!(self.peek_tok(), Some(Tok::Symbol(text)) if text == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) if &token.tok == tok => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(self.unexpected(token)),
            None => Err(self.end()),
        }
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            clause: self.clause.to_string(),
            offset: token.offset,
            found: token.tok.text(),
        }
    }

    fn end(&self) -> ParseError {
        ParseError::UnexpectedEnd {
            clause: self.clause.to_string(),
        }
    }

    fn at_goal_separator(&self) -> bool {
        match self.peek_tok() {
            Some(Tok::Punct(',')) | Some(Tok::Punct(';')) => true,
            Some(Tok::Symbol(text)) => text == IF_THEN,
            _ => false,
        }
    }

    /// `goal (sep goal)*` where sep is `,`, `;` or `->`.
    fn goals(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut goals = vec![self.goal()?];
        while self.at_goal_separator() {
            self.pos += 1;
            goals.push(self.goal()?);
        }
        Ok(goals)
    }

    fn goal(&mut self) -> Result<Term, ParseError> {
        if let Some(prefix) = self.negation_prefix() {
            self.pos += 1;
            let inner = self.goal()?;
            return Ok(Term::predicate(prefix, vec![inner]));
        }
        self.comparison()
    }

    /// A negation prefix used as an operator rather than as a functor name.
    fn negation_prefix(&self) -> Option<String> {
        let op = self.peek_tok()?.operator()?;
        if !self.grammar.is_negation(op) || self.peek_tok_at(1) == Some(&Tok::Punct('(')) {
            return None;
        }
        Some(op.to_string())
    }

    fn comparison(&mut self) -> Result<Term, ParseError> {
        let left = self.additive()?;
        let Some(op) = self.peek_operator(|grammar, op| grammar.is_comparison(op)) else {
            return Ok(left);
        };
        self.pos += 1;
        let right = self.additive()?;
        Ok(Term::condition(op, left, right))
    }

    fn additive(&mut self) -> Result<Term, ParseError> {
        let mut left = self.multiplicative()?;
        while let Some(op) = self.peek_operator(|grammar, op| grammar.is_additive(op)) {
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Term::condition(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Term, ParseError> {
        let mut left = self.primary()?;
        while let Some(op) = self.peek_operator(|grammar, op| grammar.is_multiplicative(op)) {
            self.pos += 1;
            let right = self.primary()?;
            left = Term::condition(op, left, right);
        }
        Ok(left)
    }

    fn peek_operator(&self, accepts: impl Fn(&Grammar, &str) -> bool) -> Option<String> {
        let op = self.peek_tok()?.operator()?;
        accepts(self.grammar, op).then(|| op.to_string())
    }

    fn primary(&mut self) -> Result<Term, ParseError> {
        let token = self.advance()?;
        match token.tok {
            Tok::Variable(name) => Ok(Term::variable(name)),
            Tok::Number(number) => Ok(Term::atom(number)),
            Tok::Str(text) => Ok(Term::atom(text)),
            Tok::Name(name) | Tok::Quoted(name) => {
                if self.eat(&Tok::Punct('(')) {
                    let arguments = self.arguments(')')?;
                    Ok(Term::predicate(name, arguments))
                } else {
                    Ok(Term::atom(name))
                }
            }
            Tok::Punct('!') => Ok(Term::atom("!")),
            Tok::Punct('[') => self.list(),
            Tok::Punct('(') => {
                let mut inner = self.goals()?;
                self.expect(&Tok::Punct(')'))?;
                if inner.len() == 1 {
                    Ok(inner.remove(0))
                } else {
                    Ok(Term::Sequence { items: inner })
                }
            }
            Tok::Symbol(ref symbol) if symbol == "-" || symbol == "+" => {
                match self.peek_tok() {
                    Some(Tok::Number(number)) => {
                        let value = if symbol == "-" {
                            format!("-{number}")
                        } else {
                            number.clone()
                        };
                        self.pos += 1;
                        Ok(Term::atom(value))
                    }
                    _ => Err(self.unexpected(&token)),
                }
            }
            Tok::Symbol(ref symbol) if self.grammar.is_negation(symbol) => {
                let inner = self.goal()?;
                Ok(Term::predicate(symbol.clone(), vec![inner]))
            }
            _ => Err(self.unexpected(&token)),
        }
    }

    /// Comma-separated goals up to `close`, which is consumed.
    fn arguments(&mut self, close: char) -> Result<Vec<Term>, ParseError> {
        let mut arguments = vec![self.goal()?];
        while self.eat(&Tok::Punct(',')) {
            arguments.push(self.goal()?);
        }
        self.expect(&Tok::Punct(close))?;
        Ok(arguments)
    }

    /// Body of a `[...]` literal after the opening bracket. A `| Tail` is
    /// kept as the final element.
    fn list(&mut self) -> Result<Term, ParseError> {
        if self.eat(&Tok::Punct(']')) {
            return Ok(Term::list(Vec::new()));
        }
        let mut elements = vec![self.goal()?];
        while self.eat(&Tok::Punct(',')) {
            elements.push(self.goal()?);
        }
        if self.eat(&Tok::Punct('|')) {
            elements.push(self.goal()?);
        }
        self.expect(&Tok::Punct(']'))?;
        Ok(Term::list(elements))
    }
}
