//! Arithmetic formulas for journal templates.
//!
//! Formulas are parsed with a fixed grammar and evaluated against a map of
//! named amounts; nothing is ever executed as code.
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := "-" unary | primary
//! primary := number | "{{" ident "}}" | ident | "(" expr ")"
//! ```
//!
//! Formulas longer than [`MAX_FORMULA_LEN`] characters or nested deeper
//! than [`MAX_DEPTH`] levels are rejected before evaluation.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Longest formula accepted, in characters.
pub const MAX_FORMULA_LEN: usize = 1024;

/// Deepest nesting of parentheses and unary minus accepted.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Decimal),
    Ident(String),
    Symbol(char),
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Number(Decimal),
    /// A named amount.
    Variable(String),
    /// Unary minus.
    Neg(Box<Expr>),
    /// A binary operation; `op` is one of `+ - * /`.
    Binary {
        /// Operator.
        op: char,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

fn binary_prec(op: char) -> u8 {
    match op {
        '+' | '-' => 1,
        '*' | '/' => 2,
        _ => 0,
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<Decimal>()
                .map_err(|_| format!("invalid number '{}'", text))?;
            tokens.push(Token::Number(value));
        } else if c == '{' {
            if chars.get(i + 1) != Some(&'{') {
                return Err(format!("expected '{{{{' at position {}", i));
            }
            let close = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == '}' && chars[j + 1] == '}')
                .ok_or_else(|| format!("unterminated placeholder at position {}", i))?;
            let name: String = chars[i + 2..close].iter().collect();
            let name = name.trim();
            if !is_identifier(name) {
                return Err(format!("invalid placeholder '{{{{{}}}}}'", name));
            }
            tokens.push(Token::Ident(name.to_string()));
            i = close + 2;
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if matches!(c, '+' | '-' | '*' | '/' | '(' | ')') {
            tokens.push(Token::Symbol(c));
            i += 1;
        } else {
            return Err(format!("unexpected character '{}' at position {}", c, i));
        }
    }
    Ok(tokens)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, String> {
        let mut left = self.parse_unary()?;
        while let Some(Token::Symbol(op)) = self.peek() {
            let op = *op;
            let prec = binary_prec(op);
            if prec == 0 || prec < min_prec {
                break;
            }
            self.pos += 1;
            let right = self.parse_binary(prec + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    // Every nested level passes through here, so the depth check bounds
    // recursion for parentheses and minus chains alike.
    fn parse_unary(&mut self) -> Result<Expr, String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("formula nested too deeply".to_string());
        }
        let expr = if self.peek() == Some(&Token::Symbol('-')) {
            self.pos += 1;
            self.parse_unary().map(|inner| Expr::Neg(Box::new(inner)))
        } else {
            self.parse_primary()
        };
        self.depth -= 1;
        expr
    }

    fn parse_primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Ok(Expr::Variable(name)),
            Some(Token::Symbol('(')) => {
                let inner = self.parse_binary(1)?;
                match self.next() {
                    Some(Token::Symbol(')')) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(Token::Symbol(c)) => Err(format!("unexpected '{}'", c)),
            None => Err("unexpected end of formula".to_string()),
        }
    }
}

/// Parses a formula. An empty formula parses as zero.
///
/// # Errors
///
/// `FormulaError` on a syntax error, or when the formula exceeds
/// [`MAX_FORMULA_LEN`] or [`MAX_DEPTH`].
pub fn parse(formula: &str) -> EngineResult<Expr> {
    let error = |message: String| EngineError::FormulaError {
        formula: formula.to_string(),
        message,
    };

    let length = formula.chars().count();
    if length > MAX_FORMULA_LEN {
        return Err(error(format!(
            "formula is {} characters long; the limit is {}",
            length, MAX_FORMULA_LEN
        )));
    }
    let tokens = tokenize(formula).map_err(error)?;
    if tokens.is_empty() {
        return Ok(Expr::Number(Decimal::ZERO));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_binary(1).map_err(error)?;
    if let Some(token) = parser.peek() {
        return Err(error(format!("unexpected trailing input {:?}", token)));
    }
    Ok(expr)
}

impl Expr {
    /// Evaluates the expression against `variables`.
    pub fn eval(&self, variables: &HashMap<String, Decimal>) -> Result<Decimal, String> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Variable(name) => variables
                .get(name)
                .copied()
                .ok_or_else(|| format!("unknown variable '{}'", name)),
            Expr::Neg(inner) => Ok(-inner.eval(variables)?),
            Expr::Binary { op, left, right } => {
                let l = left.eval(variables)?;
                let r = right.eval(variables)?;
                let value = match op {
                    '+' => l.checked_add(r),
                    '-' => l.checked_sub(r),
                    '*' => l.checked_mul(r),
                    '/' => {
                        if r.is_zero() {
                            return Err("division by zero".to_string());
                        }
                        l.checked_div(r)
                    }
                    _ => return Err(format!("unknown operator '{}'", op)),
                };
                value.ok_or_else(|| "arithmetic overflow".to_string())
            }
        }
    }
}

/// Parses and evaluates `formula`.
///
/// # Errors
///
/// `FormulaError` naming the formula on a syntax error, an unknown
/// variable, or division by zero.
pub fn evaluate(formula: &str, variables: &HashMap<String, Decimal>) -> EngineResult<Decimal> {
    parse(formula)?
        .eval(variables)
        .map_err(|message| EngineError::FormulaError {
            formula: formula.to_string(),
            message,
        })
}
