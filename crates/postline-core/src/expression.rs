//! Condition predicates for mock endpoints.
//!
//! A small, sandboxed boolean language over path parameters:
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr (("or" | "||") and_expr)*
//! and_expr   := not_expr (("and" | "&&") not_expr)*
//! not_expr   := ("not" | "!") not_expr | comparison
//! comparison := operand (("==" | "!=" | "<" | "<=" | ">" | ">=" | "in" | "not in") operand)?
//! operand    := STRING | NUMBER | "{" IDENT "}" | IDENT | "true" | "false" | "(" expr ")"
//! ```
//!
//! `{id}` and bare `id` both refer to the path parameter `id`. Parameter
//! values are always strings, so `id == 1` is false for every `id`; compare
//! against `"1"` instead. Numbers only compare with numbers.
//! Expressions may nest at most [`MAX_DEPTH`] levels; `and`/`or` chains count
//! one level per operator.

use crate::matching::PathParams;
use std::cmp::Ordering;
use thiserror::Error;

/// Deepest nesting a predicate may have.
pub const MAX_DEPTH: usize = 64;

/// Errors raised while parsing or evaluating a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unterminated parameter reference starting at offset {offset}")]
    UnterminatedParam { offset: usize },

    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("unknown path parameter '{name}'")]
    UnknownParam { name: String },

    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Num(f64),
    Param(String),
    Ident(String),
    Bool(bool),
    And,
    Or,
    Not,
    In,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Str(s) => format!("\"{s}\""),
            Token::Num(n) => n.to_string(),
            Token::Param(name) => format!("{{{name}}}"),
            Token::Ident(name) => name.clone(),
            Token::Bool(b) => b.to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::In => "in".to_string(),
            Token::Eq => "==".to_string(),
            Token::Ne => "!=".to_string(),
            Token::Lt => "<".to_string(),
            Token::Le => "<=".to_string(),
            Token::Gt => ">".to_string(),
            Token::Ge => ">=".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '=' if chars.next_if(|&(_, n)| n == '=').is_some() => Token::Eq,
            '!' if chars.next_if(|&(_, n)| n == '=').is_some() => Token::Ne,
            '!' => Token::Not,
            '<' if chars.next_if(|&(_, n)| n == '=').is_some() => Token::Le,
            '<' => Token::Lt,
            '>' if chars.next_if(|&(_, n)| n == '=').is_some() => Token::Ge,
            '>' => Token::Gt,
            '&' if chars.next_if(|&(_, n)| n == '&').is_some() => Token::And,
            '|' if chars.next_if(|&(_, n)| n == '|').is_some() => Token::Or,
            '"' | '\'' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, n)) = chars.next() {
                    match n {
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        n if n == c => {
                            closed = true;
                            break;
                        }
                        n => value.push(n),
                    }
                }
                if !closed {
                    return Err(ExpressionError::UnterminatedString { offset });
                }
                Token::Str(value)
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(ExpressionError::UnterminatedParam { offset });
                }
                let name = name.trim().to_string();
                if name.is_empty() || !name.chars().all(is_ident_char) {
                    return Err(ExpressionError::UnexpectedToken {
                        found: format!("{{{name}}}"),
                        offset,
                    });
                }
                Token::Param(name)
            }
            c if c.is_ascii_digit() => {
                let mut number = c.to_string();
                while let Some((_, n)) = chars.next_if(|&(_, n)| n.is_ascii_digit() || n == '.') {
                    number.push(n);
                }
                match number.parse() {
                    Ok(value) => Token::Num(value),
                    Err(_) => {
                        return Err(ExpressionError::UnexpectedToken {
                            found: number,
                            offset,
                        })
                    }
                }
            }
            c if is_ident_char(c) => {
                let mut word = c.to_string();
                while let Some((_, n)) = chars.next_if(|&(_, n)| is_ident_char(n)) {
                    word.push(n);
                }
                match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "in" => Token::In,
                    "true" | "True" => Token::Bool(true),
                    "false" | "False" => Token::Bool(false),
                    _ => Token::Ident(word),
                }
            }
            ch => return Err(ExpressionError::UnexpectedChar { ch, offset }),
        };
        tokens.push((token, offset));
    }

    Ok(tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "in",
            CompareOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    Num(f64),
    Bool(bool),
    Param(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn nest(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::TooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn unexpected(&self) -> ExpressionError {
        match self.tokens.get(self.pos) {
            Some((token, offset)) => ExpressionError::UnexpectedToken {
                found: token.describe(),
                offset: *offset,
            },
            None => ExpressionError::UnexpectedEnd,
        }
    }

    fn parse(mut self) -> Result<Expr, ExpressionError> {
        let expr = self.parse_or()?;
        if self.peek().is_some() {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<Expr, ExpressionError> {
        let depth = self.depth;
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            self.nest()?;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExpressionError> {
        let depth = self.depth;
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            self.nest()?;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExpressionError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            self.nest()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExpressionError> {
        let left = self.parse_operand()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            Some(Token::In) => CompareOp::In,
            Some(Token::Not) if self.peek_at(1) == Some(&Token::In) => {
                self.pos += 1;
                CompareOp::NotIn
            }
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.parse_operand()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr, ExpressionError> {
        let Some((token, offset)) = self.advance() else {
            return Err(ExpressionError::UnexpectedEnd);
        };
        match token {
            Token::Str(value) => Ok(Expr::Str(value)),
            Token::Num(value) => Ok(Expr::Num(value)),
            Token::Bool(value) => Ok(Expr::Bool(value)),
            Token::Param(name) | Token::Ident(name) => Ok(Expr::Param(name)),
            Token::LParen => {
                self.nest()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((other, offset)) => Err(ExpressionError::UnexpectedToken {
                        found: other.describe(),
                        offset,
                    }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            other => Err(ExpressionError::UnexpectedToken {
                found: other.describe(),
                offset,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Scalar {
    fn truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Num(n) => *n != 0.0,
            Scalar::Str(s) => !s.is_empty(),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Num(_) => "number",
            Scalar::Str(_) => "string",
        }
    }

    fn ordering(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Num(a), Scalar::Num(b)) => a.partial_cmp(b),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl Expr {
    fn eval(&self, params: &PathParams) -> Result<Scalar, ExpressionError> {
        match self {
            Expr::Str(value) => Ok(Scalar::Str(value.clone())),
            Expr::Num(value) => Ok(Scalar::Num(*value)),
            Expr::Bool(value) => Ok(Scalar::Bool(*value)),
            Expr::Param(name) => params
                .get(name)
                .map(|value| Scalar::Str(value.clone()))
                .ok_or_else(|| ExpressionError::UnknownParam { name: name.clone() }),
            Expr::Not(inner) => Ok(Scalar::Bool(!inner.eval(params)?.truthy())),
            Expr::And(left, right) => {
                if !left.eval(params)?.truthy() {
                    return Ok(Scalar::Bool(false));
                }
                Ok(Scalar::Bool(right.eval(params)?.truthy()))
            }
            Expr::Or(left, right) => {
                if left.eval(params)?.truthy() {
                    return Ok(Scalar::Bool(true));
                }
                Ok(Scalar::Bool(right.eval(params)?.truthy()))
            }
            Expr::Compare { op, left, right } => {
                let left = left.eval(params)?;
                let right = right.eval(params)?;
                compare(*op, &left, &right).map(Scalar::Bool)
            }
        }
    }
}

fn compare(op: CompareOp, left: &Scalar, right: &Scalar) -> Result<bool, ExpressionError> {
    let mismatch = || ExpressionError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        CompareOp::In | CompareOp::NotIn => match (left, right) {
            (Scalar::Str(needle), Scalar::Str(haystack)) => {
                Ok(haystack.contains(needle.as_str()) == (op == CompareOp::In))
            }
            _ => Err(mismatch()),
        },
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = left.ordering(right).ok_or_else(mismatch)?;
            Ok(match op {
                CompareOp::Lt => ordering.is_lt(),
                CompareOp::Le => ordering.is_le(),
                CompareOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
    }
}

/// A compiled condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    source: String,
    expr: Expr,
}

impl Predicate {
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        let tokens = tokenize(source)?;
        let expr = Parser::new(tokens).parse()?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the parameters of one request.
    pub fn evaluate(&self, params: &PathParams) -> Result<bool, ExpressionError> {
        Ok(self.expr.eval(params)?.truthy())
    }

    /// Like [`Predicate::evaluate`], treating any error as `false`.
    pub fn matches(&self, params: &PathParams) -> bool {
        self.evaluate(params).unwrap_or_else(|err| {
            tracing::debug!(condition = %self.source, error = %err, "Condition evaluated to false");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn params(pairs: &[(&str, &str)]) -> PathParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[rstest]
    #[case(r#"id == "1""#, &[("id", "1")], true)]
    #[case(r#"id == "1""#, &[("id", "2")], false)]
    #[case(r#"{id} == '1'"#, &[("id", "1")], true)]
    #[case("'{id}' == '1'", &[("id", "1")], false)]
    #[case("id == 1", &[("id", "1")], false)]
    #[case("id != 1", &[("id", "1")], true)]
    #[case("10 > 9", &[], true)]
    #[case("1 == 1.0", &[], true)]
    #[case("0", &[], false)]
    #[case(r#"id != "1""#, &[("id", "2")], true)]
    #[case(r#"id == "1" or id == "2""#, &[("id", "2")], true)]
    #[case(r#"id == "1" || id == "2""#, &[("id", "3")], false)]
    #[case(r#"a == "x" and b == "y""#, &[("a", "x"), ("b", "y")], true)]
    #[case(r#"a == "x" && b == "y""#, &[("a", "x"), ("b", "z")], false)]
    #[case(r#"not id == "1""#, &[("id", "1")], false)]
    #[case(r#"!(id == "1")"#, &[("id", "2")], true)]
    #[case(r#""adm" in role"#, &[("role", "admin")], true)]
    #[case(r#""x" not in role"#, &[("role", "admin")], true)]
    #[case(r#"name < "m""#, &[("name", "alice")], true)]
    #[case(r#"name >= "m""#, &[("name", "alice")], false)]
    #[case(r#"name <= "alice" and name > "a""#, &[("name", "alice")], true)]
    #[case("true", &[], true)]
    #[case("False", &[], false)]
    #[case("id", &[("id", "x")], true)]
    #[case("''", &[], false)]
    #[case(r#"(a == "1" or b == "1") and not c == "1""#, &[("a", "0"), ("b", "1"), ("c", "0")], true)]
    #[case(r#"id == "it\"s""#, &[("id", "it\"s")], true)]
    #[case("true == 'true'", &[], false)]
    fn test_predicate_evaluate(
        #[case] source: &str,
        #[case] pairs: &[(&str, &str)],
        #[case] expected: bool,
    ) {
        let predicate = Predicate::parse(source).unwrap();
        assert_eq!(predicate.evaluate(&params(pairs)).unwrap(), expected);
        assert_eq!(predicate.source(), source);
    }

    #[rstest]
    #[case("")]
    #[case("id ==")]
    #[case("(id == '1'")]
    #[case("id == '1')")]
    #[case("'unterminated")]
    #[case("{id")]
    #[case("{} == '1'")]
    #[case("id = '1'")]
    #[case("id == '1' == '1'")]
    #[case("__import__('os')")]
    #[case("id; drop")]
    #[case("id == 1.2.3")]
    fn test_predicate_parse_rejects(#[case] source: &str) {
        assert!(Predicate::parse(source).is_err());
    }

    #[rstest]
    fn test_predicate_parse_error_kinds() {
        assert_eq!(Predicate::parse("").unwrap_err(), ExpressionError::UnexpectedEnd);
        assert_eq!(
            Predicate::parse("'abc").unwrap_err(),
            ExpressionError::UnterminatedString { offset: 0 }
        );
        assert_eq!(
            Predicate::parse("a == {id").unwrap_err(),
            ExpressionError::UnterminatedParam { offset: 5 }
        );
        assert_eq!(
            Predicate::parse("a $ b").unwrap_err(),
            ExpressionError::UnexpectedChar { ch: '$', offset: 2 }
        );
    }

    #[rstest]
    fn test_predicate_unknown_param_is_error() {
        let predicate = Predicate::parse("missing == '1'").unwrap();
        assert_eq!(
            predicate.evaluate(&params(&[])).unwrap_err(),
            ExpressionError::UnknownParam {
                name: "missing".to_string()
            }
        );
        assert!(!predicate.matches(&params(&[])));
    }

    #[rstest]
    #[case("true < 'a'")]
    #[case("'5' < 5")]
    #[case("1 in '123'")]
    #[case("'a' in true")]
    fn test_predicate_type_mismatch(#[case] source: &str) {
        let predicate = Predicate::parse(source).unwrap();
        assert!(matches!(
            predicate.evaluate(&params(&[])),
            Err(ExpressionError::TypeMismatch { .. })
        ));
        assert!(!predicate.matches(&params(&[])));
    }

    #[rstest]
    fn test_short_circuit_skips_unknown_param() {
        let predicate = Predicate::parse("true or missing == '1'").unwrap();
        assert!(predicate.evaluate(&params(&[])).unwrap());
        let predicate = Predicate::parse("false and missing == '1'").unwrap();
        assert!(!predicate.evaluate(&params(&[])).unwrap());
    }

    fn nested_parens(depth: usize) -> String {
        format!("{}id == '1'{}", "(".repeat(depth), ")".repeat(depth))
    }

    fn or_chain(terms: usize) -> String {
        vec!["id == '1'"; terms].join(" or ")
    }

    #[rstest]
    #[case(nested_parens(10_000))]
    #[case(format!("{}true", "not ".repeat(10_000)))]
    #[case(format!("{}true", "!".repeat(200_000)))]
    #[case(or_chain(10_000))]
    #[case(vec!["true"; 10_000].join(" && "))]
    fn test_deep_nesting_is_rejected(#[case] source: String) {
        assert_eq!(
            Predicate::parse(&source).unwrap_err(),
            ExpressionError::TooDeep { limit: MAX_DEPTH }
        );
    }

    #[rstest]
    #[case(nested_parens(MAX_DEPTH))]
    #[case(format!("{}true", "not ".repeat(MAX_DEPTH)))]
    #[case(or_chain(MAX_DEPTH + 1))]
    fn test_nesting_up_to_limit_is_accepted(#[case] source: String) {
        let predicate = Predicate::parse(&source).unwrap();
        assert!(predicate.matches(&params(&[("id", "1")])));
    }

    #[rstest]
    fn test_nesting_depth_adds_operators_and_groups() {
        let group = nested_parens(MAX_DEPTH - 1);
        let source = vec![group.as_str(); 10].join(" and ");
        assert!(Predicate::parse(&source).is_err());

        let source = vec![nested_parens(MAX_DEPTH); 2].join(" == ");
        assert!(Predicate::parse(&source).unwrap().matches(&params(&[("id", "1")])));
    }

    #[rstest]
    #[case("id == '7'", true)]
    #[case("other == '7'", false)]
    #[case("'7' < 7", false)]
    fn test_matches_swallows_errors(#[case] source: &str, #[case] expected: bool) {
        let predicate = Predicate::parse(source).unwrap();
        assert_eq!(predicate.matches(&params(&[("id", "7")])), expected);
    }
}
