//! Evaluation of a formula body once every function call has been
//! replaced by a literal value.
//!
//! The body is classified by splitting on the operator characters
//! `* + / ^ ( ) [ ] -`:
//! - all pieces numeric: evaluated as arithmetic and rounded to 3 decimals
//! - all pieces text: `+` concatenates, anything else is kept verbatim
//! - a mix: type mismatch

use super::messages;

const OPERATOR_CHARS: &[char] = &['*', '+', '/', '^', '(', ')', '[', ']', '-'];

/// Evaluate a formula body (the text after `=`) to its display string.
pub fn evaluate_expression(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return messages::NO_FUNCTION.to_string();
    }

    let mut has_number = false;
    let mut has_text = false;
    for piece in body.split(OPERATOR_CHARS) {
        if coerce_number(piece).is_some() {
            has_number = true;
        } else {
            has_text = true;
        }
    }

    match (has_number, has_text) {
        (true, false) => evaluate_arithmetic(body),
        (false, true) => concatenate(body),
        _ => messages::TYPE_MISMATCH.to_string(),
    }
}

/// Interpret a cell value or expression piece as a number.
///
/// Blank text coerces to `0`. Otherwise only plain decimal literals
/// (sign, digits, fraction, exponent) are accepted; words such as `inf`
/// or `NaN` are text.
pub fn coerce_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Round half toward positive infinity at the third decimal place.
pub fn round_to_thousandths(value: f64) -> f64 {
    (value * 1000.0 + 0.5).floor() / 1000.0
}

/// Format a number for display: integral values without a fraction,
/// shortest round-trip digits otherwise, exponent form for very large or
/// very small magnitudes.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    format!("{}", n)
}

fn evaluate_arithmetic(body: &str) -> String {
    let Some(value) = tokenize(body).and_then(|tokens| Parser::new(tokens).parse()) else {
        return messages::INVALID_EXPRESSION.to_string();
    };
    let rounded = round_to_thousandths(value);
    if rounded.is_infinite() {
        messages::DIVIDE_BY_ZERO.to_string()
    } else if rounded.is_nan() {
        messages::ZERO_BY_ZERO.to_string()
    } else {
        format_number(rounded)
    }
}

fn concatenate(body: &str) -> String {
    let segments: Vec<&str> = body.split('+').collect();
    if segments.len() == 1 {
        return body.to_string();
    }
    segments
        .into_iter()
        .map(|segment| {
            let segment = segment.trim();
            let segment = segment.strip_prefix('"').unwrap_or(segment);
            segment.strip_suffix('"').unwrap_or(segment)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Open(char),
    Close(char),
}

fn tokenize(body: &str) -> Option<Vec<Token>> {
    let bytes = body.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let token = match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'(' | b'[' => Token::Open(b as char),
            b')' | b']' => Token::Close(b as char),
            b'0'..=b'9' | b'.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                if i + 1 < bytes.len()
                    && matches!(bytes[i], b'e' | b'E')
                    && bytes[i + 1].is_ascii_digit()
                {
                    i += 1;
                    while i < bytes.len() && bytes[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                tokens.push(Token::Number(body[start..i].parse().ok()?));
                continue;
            }
            _ => return None,
        };
        tokens.push(token);
        i += 1;
    }

    Some(tokens)
}

/// Recursive-descent arithmetic parser.
///
/// Precedence from loosest: `+ -`, `* /` (and implicit multiplication),
/// unary sign, `^` (right associative, exponent may carry a sign).
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn parse(mut self) -> Option<f64> {
        let value = self.expr()?;
        (self.pos == self.tokens.len()).then_some(value)
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Option<f64> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    acc += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    acc -= self.term()?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn term(&mut self) -> Option<f64> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    acc *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    acc /= self.unary()?;
                }
                Some(Token::Number(_)) | Some(Token::Open(_)) => {
                    acc *= self.unary()?;
                }
                _ => return Some(acc),
            }
        }
    }

    fn unary(&mut self) -> Option<f64> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Some(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Option<f64> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Some(base.powf(exponent));
        }
        Some(base)
    }

    fn primary(&mut self) -> Option<f64> {
        match self.next()? {
            Token::Number(n) => Some(n),
            Token::Open(open) => {
                let value = self.expr()?;
                match (open, self.next()?) {
                    ('(', Token::Close(')')) | ('[', Token::Close(']')) => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
