//! Arithmetic expression evaluator for "calculate ..." questions.
//!
//! Integers stay exact until a division or a fractional literal forces a float,
//! and results render the way Python prints them (`7 / 2` is `3.5`, `4 / 2` is `2.0`).

use crate::error::MatchError;

/// Nesting allowed for parentheses, unary signs and exponent chains combined.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Int(i128),
    Float(f64),
}

impl Value {
    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn render(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 => {
                format!("{f:.1}")
            }
            Self::Float(f) => f.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Value),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow,
    LParen,
    RParen,
}

/// Evaluate `expr` and render the result.
///
/// Supports `+ - * / %`, `**` and `^` for powers, unary signs and parentheses.
///
/// # Errors
///
/// Returns [`MatchError::Parse`] for malformed input, [`MatchError::Overflow`]
/// when integer arithmetic overflows and [`MatchError::Eval`] on division by zero.
pub fn evaluate(expr: &str) -> Result<String, MatchError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        input: expr,
    };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(parser.parse_error());
    }
    Ok(value.render())
}

fn tokenize(input: &str) -> Result<Vec<Token>, MatchError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' => {}
            b'+' => tokens.push(Token::Plus),
            b'-' => tokens.push(Token::Minus),
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                tokens.push(Token::Pow);
                i += 1;
            }
            b'*' => tokens.push(Token::Star),
            b'^' => tokens.push(Token::Pow),
            b'/' => tokens.push(Token::Slash),
            b'%' => tokens.push(Token::Percent),
            b'(' => tokens.push(Token::LParen),
            b')' => tokens.push(Token::RParen),
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i + 1 < bytes.len() && (bytes[i + 1].is_ascii_digit() || bytes[i + 1] == b'.')
                {
                    i += 1;
                }
                let literal = &input[start..=i];
                tokens.push(Token::Num(parse_number(literal, input)?));
            }
            _ => {
                return Err(MatchError::Parse {
                    what: "expression",
                    input: input.to_owned(),
                });
            }
        }
        i += 1;
    }
    Ok(tokens)
}

fn parse_number(literal: &str, input: &str) -> Result<Value, MatchError> {
    let err = || MatchError::Parse {
        what: "number",
        input: input.to_owned(),
    };
    if literal.contains('.') {
        literal.parse().map(Value::Float).map_err(|_| err())
    } else {
        literal.parse().map(Value::Int).map_err(|_| err())
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    input: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn parse_error(&self) -> MatchError {
        MatchError::Parse {
            what: "expression",
            input: self.input.to_owned(),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Value, MatchError> {
        let mut lhs = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = apply(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<Value, MatchError> {
        let mut lhs = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = apply(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    // every recursive rule passes through here, so the depth check lives here
    fn unary(&mut self) -> Result<Value, MatchError> {
        if self.depth == MAX_DEPTH {
            return Err(self.parse_error());
        }
        self.depth += 1;
        let v = self.signed();
        self.depth -= 1;
        v
    }

    // unary := ('-' | '+') unary | power
    fn signed(&mut self) -> Result<Value, MatchError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let v = self.unary()?;
                negate(v)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := atom ('**' unary)?   (right-associative, binds tighter than unary minus on its left)
    fn power(&mut self) -> Result<Value, MatchError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Pow) {
            self.pos += 1;
            let exp = self.unary()?;
            return apply(Token::Pow, base, exp);
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Value, MatchError> {
        match self.peek() {
            Some(Token::Num(v)) => {
                self.pos += 1;
                Ok(v)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let v = self.expr()?;
                if self.peek() != Some(Token::RParen) {
                    return Err(self.parse_error());
                }
                self.pos += 1;
                Ok(v)
            }
            _ => Err(self.parse_error()),
        }
    }
}

fn overflow() -> MatchError {
    MatchError::Overflow { what: "expression" }
}

fn negate(v: Value) -> Result<Value, MatchError> {
    match v {
        Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        Value::Float(f) => Ok(Value::Float(-f)),
    }
}

fn apply(op: Token, lhs: Value, rhs: Value) -> Result<Value, MatchError> {
    if op == Token::Slash {
        let divisor = rhs.as_f64();
        if divisor == 0.0 {
            return Err(MatchError::Eval("division by zero".into()));
        }
        return Ok(Value::Float(lhs.as_f64() / divisor));
    }

    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, a, b),
        _ => float_op(op, lhs.as_f64(), rhs.as_f64()),
    }
}

fn int_op(op: Token, a: i128, b: i128) -> Result<Value, MatchError> {
    let v = match op {
        Token::Plus => a.checked_add(b).ok_or_else(overflow)?,
        Token::Minus => a.checked_sub(b).ok_or_else(overflow)?,
        Token::Star => a.checked_mul(b).ok_or_else(overflow)?,
        Token::Percent => {
            if b == 0 {
                return Err(MatchError::Eval("modulo by zero".into()));
            }
            // floored modulo: the result takes the sign of the divisor
            let r = a % b;
            if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
        }
        Token::Pow if b < 0 => return float_op(op, int_to_f64(a), int_to_f64(b)),
        Token::Pow => {
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).ok_or_else(overflow)?
        }
        _ => return Err(MatchError::Eval(format!("unsupported operator {op:?}"))),
    };
    Ok(Value::Int(v))
}

#[allow(clippy::cast_precision_loss)]
fn int_to_f64(i: i128) -> f64 {
    i as f64
}

fn float_op(op: Token, a: f64, b: f64) -> Result<Value, MatchError> {
    let v = match op {
        Token::Plus => a + b,
        Token::Minus => a - b,
        Token::Star => a * b,
        Token::Percent => {
            if b == 0.0 {
                return Err(MatchError::Eval("modulo by zero".into()));
            }
            a - b * (a / b).floor()
        }
        Token::Pow => a.powf(b),
        _ => return Err(MatchError::Eval(format!("unsupported operator {op:?}"))),
    };
    if v.is_finite() {
        Ok(Value::Float(v))
    } else {
        Err(overflow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), "14");
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), "20");
        assert_eq!(evaluate("10 - 4 - 3").unwrap(), "3");
        assert_eq!(evaluate("2 ** 10").unwrap(), "1024");
        assert_eq!(evaluate("2 ^ 3").unwrap(), "8");
    }

    #[test]
    fn division_is_float() {
        assert_eq!(evaluate("7 / 2").unwrap(), "3.5");
        assert_eq!(evaluate("4 / 2").unwrap(), "2.0");
        assert_eq!(evaluate("1.5 * 2").unwrap(), "3.0");
    }

    #[test]
    fn power_is_right_associative_and_binds_tighter_than_negation() {
        assert_eq!(evaluate("2 ** 3 ** 2").unwrap(), "512");
        assert_eq!(evaluate("-2 ** 2").unwrap(), "-4");
        assert_eq!(evaluate("2 ** -1").unwrap(), "0.5");
    }

    #[test]
    fn modulo_follows_divisor_sign() {
        assert_eq!(evaluate("10 % 3").unwrap(), "1");
        assert_eq!(evaluate("-7 % 3").unwrap(), "2");
        assert_eq!(evaluate("7 % -3").unwrap(), "-2");
    }

    #[test]
    fn errors() {
        assert!(matches!(evaluate("1 / 0"), Err(MatchError::Eval(_))));
        assert!(matches!(evaluate("5 % 0"), Err(MatchError::Eval(_))));
        assert!(matches!(evaluate("(1 + 2"), Err(MatchError::Parse { .. })));
        assert!(matches!(evaluate("1 +"), Err(MatchError::Parse { .. })));
        assert!(matches!(evaluate("1..2"), Err(MatchError::Parse { .. })));
        assert!(matches!(evaluate("2 ** 200"), Err(MatchError::Overflow { .. })));
        assert!(matches!(evaluate("1 2"), Err(MatchError::Parse { .. })));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let parens = format!("{}1{}", "(".repeat(3_000), ")".repeat(3_000));
        assert!(matches!(evaluate(&parens), Err(MatchError::Parse { .. })));
        let signs = format!("{}1", "-".repeat(20_000));
        assert!(matches!(evaluate(&signs), Err(MatchError::Parse { .. })));
        let powers = format!("2{}", " ** 1".repeat(5_000));
        assert!(matches!(evaluate(&powers), Err(MatchError::Parse { .. })));
    }

    #[test]
    fn moderate_nesting_still_evaluates() {
        let parens = format!("{}1 + 2{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(evaluate(&parens).unwrap(), "3");
        assert_eq!(evaluate(&format!("{}5", "-".repeat(10))).unwrap(), "5");
    }
}
