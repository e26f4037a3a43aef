//! Formula parsing.
//!
//! Turns the text after a leading `=` into a typed [`Formula`]: an arithmetic
//! expression tree plus the set of cell names it references.
//!
//! Supported syntax:
//! - Numbers: `3`, `2.5`, `.5`, `1e3`, `4.2E-1`
//! - Cell names: `A1`, `total` (normalized through the grid's [`NamePolicy`])
//! - Operators: `+ - * /` with the usual precedence, unary `-`/`+`
//! - Parentheses

use std::fmt;

use thiserror::Error;

use super::name::NamePolicy;

/// Deepest expression tree a formula may build, counting parentheses,
/// unary signs and chained operators.
pub const MAX_NESTING: usize = 256;

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(String),
    Neg(Box<Expr>),
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Reasons a formula fails to parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected '{found}' at position {pos}")]
    UnexpectedToken { found: String, pos: usize },

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unclosed parenthesis opened at position {pos}")]
    UnclosedParen { pos: usize },

    #[error("invalid cell reference '{0}'")]
    InvalidReference(String),

    #[error("formula nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// A parsed formula.
///
/// Two formulas are equal when their expression trees are equal, which is the
/// case exactly when their canonical [`Display`](fmt::Display) forms match.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
    references: Vec<String>,
}

impl Formula {
    /// Parse formula text (without the leading `=`).
    pub fn parse(text: &str, policy: &NamePolicy) -> Result<Formula, FormulaError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            nesting: 0,
            policy,
            references: Vec::new(),
        };
        let (expr, _) = parser.parse_expr()?;
        if let Some(tok) = parser.peek() {
            return Err(FormulaError::UnexpectedToken {
                found: tok.kind.to_string(),
                pos: tok.pos,
            });
        }

        Ok(Formula {
            expr,
            references: parser.references,
        })
    }

    /// Distinct referenced cell names, in order of first appearance.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, &self.expr)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    match expr {
        Expr::Number(n) => write!(f, "{}", n),
        Expr::Ref(name) => f.write_str(name),
        Expr::Neg(inner) => {
            f.write_str("-")?;
            write_operand(f, inner, matches!(**inner, Expr::Binary { .. }))
        }
        Expr::Binary { op, left, right } => {
            let left_parens = matches!(**left, Expr::Binary { op: l, .. } if l.precedence() < op.precedence());
            // Right operands of equal precedence need parens to keep left associativity.
            let right_parens = matches!(**right, Expr::Binary { op: r, .. } if r.precedence() <= op.precedence());
            write_operand(f, left, left_parens)?;
            write!(f, " {} ", op.symbol())?;
            write_operand(f, right, right_parens)
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        f.write_str("(")?;
        write_expr(f, expr)?;
        f.write_str(")")
    } else {
        write_expr(f, expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{}", n),
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let kind = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let end = scan_number(&chars, i);
                let text: String = chars[start..end].iter().collect();
                let n = match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => return Err(FormulaError::InvalidNumber(text)),
                };
                tokens.push(Token {
                    kind: TokenKind::Number(n),
                    pos: start,
                });
                i = end;
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(chars[start..i].iter().collect()),
                    pos: start,
                });
                continue;
            }
            other => return Err(FormulaError::UnexpectedChar { ch: other, pos: i }),
        };
        tokens.push(Token { kind, pos: i });
        i += 1;
    }

    Ok(tokens)
}

/// Returns the end index of a number literal starting at `start`.
fn scan_number(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Current recursion depth through parentheses and unary signs
    nesting: usize,
    policy: &'a NamePolicy,
    references: Vec<String>,
}

fn check_depth(depth: usize) -> Result<usize, FormulaError> {
    if depth > MAX_NESTING {
        Err(FormulaError::TooDeep { limit: MAX_NESTING })
    } else {
        Ok(depth)
    }
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // Each parse step returns the expression with its tree depth.

    fn parse_expr(&mut self) -> Result<(Expr, usize), FormulaError> {
        let (mut left, mut depth) = self.parse_term()?;
        while let Some(op) = self.peek().and_then(|t| match t.kind {
            TokenKind::Plus => Some(Op::Add),
            TokenKind::Minus => Some(Op::Sub),
            _ => None,
        }) {
            self.pos += 1;
            let (right, right_depth) = self.parse_term()?;
            depth = check_depth(depth.max(right_depth) + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok((left, depth))
    }

    fn parse_term(&mut self) -> Result<(Expr, usize), FormulaError> {
        let (mut left, mut depth) = self.parse_factor()?;
        while let Some(op) = self.peek().and_then(|t| match t.kind {
            TokenKind::Star => Some(Op::Mul),
            TokenKind::Slash => Some(Op::Div),
            _ => None,
        }) {
            self.pos += 1;
            let (right, right_depth) = self.parse_factor()?;
            depth = check_depth(depth.max(right_depth) + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok((left, depth))
    }

    fn parse_factor(&mut self) -> Result<(Expr, usize), FormulaError> {
        let tok = self.next().ok_or(FormulaError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Number(n) => Ok((Expr::Number(n), 1)),
            TokenKind::Ident(name) => {
                let resolved = self
                    .policy
                    .resolve(&name)
                    .ok_or(FormulaError::InvalidReference(name))?;
                if !self.references.contains(&resolved) {
                    self.references.push(resolved.clone());
                }
                Ok((Expr::Ref(resolved), 1))
            }
            TokenKind::Minus => {
                let (inner, depth) = self.nested(Self::parse_factor)?;
                Ok((Expr::Neg(Box::new(inner)), check_depth(depth + 1)?))
            }
            TokenKind::Plus => self.nested(Self::parse_factor),
            TokenKind::LParen => {
                let inner = self.nested(Self::parse_expr)?;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken {
                        found: other.kind.to_string(),
                        pos: other.pos,
                    }),
                    None => Err(FormulaError::UnclosedParen { pos: tok.pos }),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.to_string(),
                pos: tok.pos,
            }),
        }
    }

    /// Run `parse` one recursion level deeper.
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<(Expr, usize), FormulaError>,
    ) -> Result<(Expr, usize), FormulaError> {
        self.nesting = check_depth(self.nesting + 1)?;
        let result = parse(self);
        self.nesting -= 1;
        result
    }
}
