//! Compiler for the subset of CQL the storage endpoints accept.
//!
//! ```text
//! query    := [boolean] ["sortBy" sortkey+]
//! boolean  := clause (("and" | "or" | "not") clause)*
//! clause   := "(" boolean ")" | index relation term
//! relation := "==" | "=" | "<>" | "<" | "<=" | ">" | ">="
//! sortkey  := index ["/sort.ascending" | "/sort.descending"]
//! ```
//!
//! Boolean operators share one precedence level and associate to the left.

use std::fmt;

use crate::domain::{Comparison, FieldPath, Predicate, SortField, SortKey, SortOrder, Term};

const ALL_RECORDS_INDEX: &str = "cql.allRecords";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqlError(String);

impl CqlError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for CqlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for CqlError {}

/// A compiled query: what to match and how to order it.
#[derive(Debug, Clone, PartialEq)]
pub struct CqlQuery {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Relation(Comparison),
    Word(String),
    Quoted(String),
}

pub fn parse(input: &str) -> Result<CqlQuery, CqlError> {
    let tokens = tokenize(input)?;
    Parser {
        tokens,
        position: 0,
    }
    .query()
}

fn tokenize(input: &str) -> Result<Vec<Token>, CqlError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(CqlError::new("unterminated quoted term")),
                        },
                        Some('"') => break,
                        Some(other) => value.push(other),
                        None => return Err(CqlError::new("unterminated quoted term")),
                    }
                }
                tokens.push(Token::Quoted(value));
            }
            '=' => {
                chars.next();
                let op = if chars.next_if_eq(&'=').is_some() {
                    Comparison::Equal
                } else {
                    Comparison::Matches
                };
                tokens.push(Token::Relation(op));
            }
            '<' => {
                chars.next();
                let op = if chars.next_if_eq(&'>').is_some() {
                    Comparison::NotEqual
                } else if chars.next_if_eq(&'=').is_some() {
                    Comparison::LessOrEqual
                } else {
                    Comparison::LessThan
                };
                tokens.push(Token::Relation(op));
            }
            '>' => {
                chars.next();
                let op = if chars.next_if_eq(&'=').is_some() {
                    Comparison::GreaterOrEqual
                } else {
                    Comparison::GreaterThan
                };
                tokens.push(Token::Relation(op));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '=' | '<' | '>') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

fn unquoted_term(word: String) -> Term {
    if let Ok(integer) = word.parse::<i64>() {
        return Term::Integer(integer);
    }
    match word.parse::<f64>() {
        Ok(float) if float.is_finite() => Term::Float(float),
        _ => Term::Text(word),
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword))
    }

    fn query(mut self) -> Result<CqlQuery, CqlError> {
        let predicate = if self.peek().is_none() || self.at_keyword("sortBy") {
            Predicate::All
        } else {
            self.boolean()?
        };

        let sort = if self.at_keyword("sortBy") {
            self.position += 1;
            self.sort_keys()?
        } else {
            Vec::new()
        };

        if let Some(token) = self.peek() {
            return Err(CqlError::new(format!("unexpected {:?}", token)));
        }

        Ok(CqlQuery { predicate, sort })
    }

    fn boolean(&mut self) -> Result<Predicate, CqlError> {
        let mut left = self.clause()?;

        loop {
            if self.at_keyword("and") {
                self.position += 1;
                left = left.and(self.clause()?);
            } else if self.at_keyword("or") {
                self.position += 1;
                left = left.or(self.clause()?);
            } else if self.at_keyword("not") {
                self.position += 1;
                left = left.and_not(self.clause()?);
            } else {
                return Ok(left);
            }
        }
    }

    fn clause(&mut self) -> Result<Predicate, CqlError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.boolean()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(CqlError::new("expected ')'")),
                }
            }
            Some(Token::Word(index)) => {
                let op = match self.next() {
                    Some(Token::Relation(op)) => op,
                    _ => {
                        return Err(CqlError::new(format!(
                            "expected a relation after '{}'",
                            index
                        )));
                    }
                };
                let value = match self.next() {
                    Some(Token::Quoted(text)) => Term::Text(text),
                    Some(Token::Word(word)) => unquoted_term(word),
                    _ => {
                        return Err(CqlError::new(format!(
                            "expected a term after '{}'",
                            index
                        )));
                    }
                };

                if index.eq_ignore_ascii_case(ALL_RECORDS_INDEX) {
                    return Ok(Predicate::All);
                }

                let field = FieldPath::parse(&index)
                    .ok_or_else(|| CqlError::new(format!("invalid index '{}'", index)))?;
                Ok(Predicate::Compare { field, op, value })
            }
            Some(other) => Err(CqlError::new(format!("unexpected {:?}", other))),
            None => Err(CqlError::new("unexpected end of query")),
        }
    }

    fn sort_keys(&mut self) -> Result<Vec<SortKey>, CqlError> {
        let mut keys = Vec::new();

        while let Some(Token::Word(word)) = self.peek().cloned() {
            self.position += 1;

            let mut parts = word.split('/');
            let index = parts.next().unwrap_or_default();
            let field = FieldPath::parse(index)
                .ok_or_else(|| CqlError::new(format!("invalid sort index '{}'", index)))?;

            let mut order = SortOrder::Ascending;
            for modifier in parts {
                order = match modifier.to_ascii_lowercase().as_str() {
                    "sort.ascending" => SortOrder::Ascending,
                    "sort.descending" => SortOrder::Descending,
                    other => {
                        return Err(CqlError::new(format!(
                            "unsupported sort modifier '{}'",
                            other
                        )));
                    }
                };
            }

            keys.push(SortKey {
                field: SortField::Document(field),
                order,
            });
        }

        if keys.is_empty() {
            return Err(CqlError::new("sortBy requires at least one index"));
        }

        Ok(keys)
    }
}
