//! Free-text query parsing.
//!
//! User input never reaches the FTS5 grammar directly. Queries are parsed
//! into a small tree and rendered back out with every term quoted, so the
//! only operators FTS5 sees are the ones produced here.
//!
//! Supported syntax:
//!
//! | input              | meaning                                   |
//! |--------------------|-------------------------------------------|
//! | `quick fox`        | both terms (implicit `AND`)               |
//! | `quick AND fox`    | both terms                                |
//! | `quick OR fox`     | either term                               |
//! | `quick NOT fox`    | `quick` without `fox`                     |
//! | `quick -fox`       | same as above                             |
//! | `"quick fox"`      | the exact phrase                          |
//! | `qui*`             | any term starting with `qui`              |
//! | `(a OR b) c`       | grouping                                  |
//!
//! Keywords are upper-case only; lower-case `and`/`or`/`not` are ordinary
//! words. Words without any alphanumeric character are dropped. Groups nest
//! at most [`MAX_NESTING`] deep.

use crate::error::{IndexError, IndexResult};

/// Deepest parenthesis nesting a query may use.
pub const MAX_NESTING: usize = 16;

/// A node of a parsed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// A single word, optionally matched as a prefix.
    Term { text: String, prefix: bool },
    /// A quoted phrase.
    Phrase(String),
    /// Every clause must hold. Always contains at least one positive clause.
    And(Vec<QueryNode>),
    /// Any branch may hold.
    Or(Vec<QueryNode>),
    /// Excludes matches of the inner node. Only appears inside `And`.
    Not(Box<QueryNode>),
}

impl QueryNode {
    fn is_negation(&self) -> bool {
        matches!(self, Self::Not(_))
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_) | Self::Not(_))
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::Term { text, prefix } => {
                push_quoted(out, text);
                if *prefix {
                    out.push_str(" *");
                }
            }
            Self::Phrase(text) => push_quoted(out, text),
            Self::And(clauses) => {
                let (negated, positive): (Vec<_>, Vec<_>) =
                    clauses.iter().partition(|c| c.is_negation());
                let grouped = !negated.is_empty() && positive.len() > 1;
                if grouped {
                    out.push('(');
                }
                for (i, clause) in positive.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" AND ");
                    }
                    clause.render_operand(out);
                }
                if grouped {
                    out.push(')');
                }
                for clause in negated {
                    if let Self::Not(inner) = clause {
                        out.push_str(" NOT ");
                        inner.render_operand(out);
                    }
                }
            }
            Self::Or(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" OR ");
                    }
                    branch.render_operand(out);
                }
            }
            Self::Not(inner) => {
                // Unreachable from `SearchQuery::parse`; kept total for
                // hand-built trees.
                out.push_str("NOT ");
                inner.render_operand(out);
            }
        }
    }

    fn render_operand(&self, out: &mut String) {
        if self.is_compound() {
            out.push('(');
            self.render(out);
            out.push(')');
        } else {
            self.render(out);
        }
    }
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    out.push_str(&text.replace('"', "\"\""));
    out.push('"');
}

/// A parsed free-text query over the body field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    root: Option<QueryNode>,
}

impl SearchQuery {
    /// Parses query text.
    ///
    /// Blank input (or input made only of punctuation) parses to an empty
    /// query that matches nothing.
    pub fn parse(text: &str) -> IndexResult<Self> {
        let tokens = lex(text)?;
        if tokens.is_empty() {
            return Ok(Self { root: None });
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let root = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            return Err(IndexError::invalid_query("unbalanced parenthesis"));
        }
        Ok(Self { root: Some(root) })
    }

    /// True when the query can match nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The parsed tree, if any.
    #[must_use]
    pub fn root(&self) -> Option<&QueryNode> {
        self.root.as_ref()
    }

    /// Renders the query as an FTS5 match expression.
    #[must_use]
    pub fn to_fts5(&self) -> Option<String> {
        self.root.as_ref().map(|root| {
            let mut out = String::new();
            root.render(&mut out);
            out
        })
    }
}

// ── Lexer ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    And,
    Or,
    Not,
    Phrase(String),
    Word { text: String, prefix: bool },
}

fn has_alphanumeric(s: &str) -> bool {
    s.chars().any(char::is_alphanumeric)
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '"')
}

fn lex(text: &str) -> IndexResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
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
                let mut phrase = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    phrase.push(c);
                }
                if !closed {
                    return Err(IndexError::invalid_query("unterminated quote"));
                }
                if has_alphanumeric(&phrase) {
                    tokens.push(Token::Phrase(phrase.trim().to_string()));
                }
            }
            '-' => {
                chars.next();
                // A dash glued to the next operand negates it; a lone dash
                // is punctuation.
                if matches!(chars.peek(), Some(&(_, next)) if !next.is_whitespace() && next != ')') {
                    tokens.push(Token::Not);
                }
            }
            _ => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if is_word_boundary(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let word = &text[start..end];
                match word {
                    "AND" => tokens.push(Token::And),
                    "OR" => tokens.push(Token::Or),
                    "NOT" => tokens.push(Token::Not),
                    _ => {
                        let stem = word.trim_end_matches('*');
                        if has_alphanumeric(stem) {
                            tokens.push(Token::Word {
                                text: stem.to_string(),
                                prefix: stem.len() != word.len(),
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(tokens)
}

// ── Parser ───────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_operand_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::RParen) | Some(Token::Or) | Some(Token::And)
        )
    }

    /// or_expr := and_expr ("OR" and_expr)*
    fn parse_or(&mut self) -> IndexResult<QueryNode> {
        let first = self.parse_and()?.ok_or_else(|| match self.peek() {
            Some(Token::Or) => IndexError::invalid_query("OR is missing its left operand"),
            Some(Token::RParen) => IndexError::invalid_query("empty group or unbalanced parenthesis"),
            _ => IndexError::invalid_query("expected a search term"),
        })?;
        let mut branches = vec![first];

        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let branch = self
                .parse_and()?
                .ok_or_else(|| IndexError::invalid_query("OR is missing its right operand"))?;
            branches.push(branch);
        }

        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            QueryNode::Or(branches)
        })
    }

    /// and_expr := unary (("AND")? unary)*
    fn parse_and(&mut self) -> IndexResult<Option<QueryNode>> {
        let mut clauses = Vec::new();
        loop {
            match self.peek() {
                None | Some(Token::RParen) | Some(Token::Or) => break,
                Some(Token::And) => {
                    self.advance();
                    if clauses.is_empty() {
                        return Err(IndexError::invalid_query("AND is missing its left operand"));
                    }
                    if self.at_operand_end() {
                        return Err(IndexError::invalid_query("AND is missing its right operand"));
                    }
                }
                Some(_) => clauses.push(self.parse_unary()?),
            }
        }

        if clauses.is_empty() {
            return Ok(None);
        }
        if clauses.iter().all(QueryNode::is_negation) {
            return Err(IndexError::invalid_query(
                "query has only exclusions and nothing to match",
            ));
        }
        Ok(Some(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            QueryNode::And(clauses)
        }))
    }

    /// unary := ("NOT" | "-") primary | primary
    fn parse_unary(&mut self) -> IndexResult<QueryNode> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            if self.at_operand_end() || matches!(self.peek(), Some(Token::Not)) {
                return Err(IndexError::invalid_query("NOT has nothing to negate"));
            }
            return Ok(QueryNode::Not(Box::new(self.parse_primary()?)));
        }
        self.parse_primary()
    }

    /// primary := word | phrase | "(" or_expr ")"
    fn parse_primary(&mut self) -> IndexResult<QueryNode> {
        match self.advance() {
            Some(Token::Word { text, prefix }) => Ok(QueryNode::Term { text, prefix }),
            Some(Token::Phrase(text)) => Ok(QueryNode::Phrase(text)),
            Some(Token::LParen) => {
                if self.depth == MAX_NESTING {
                    return Err(IndexError::invalid_query("query nested too deeply"));
                }
                self.depth += 1;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(IndexError::invalid_query("unbalanced parenthesis")),
                }
            }
            _ => Err(IndexError::invalid_query("expected a search term")),
        }
    }
}
