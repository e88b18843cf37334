//! Data-only literal values used for test inputs, expected outputs and
//! invocation results.
//!
//! The accepted grammar is the Python literal subset: numbers (with unary
//! sign), single or double quoted strings, lists, tuples, dicts, `True`,
//! `False` and `None`. Nothing in here can name a variable or call a function,
//! so parsing untrusted test data is side-effect free.

use std::fmt;

/// Containers nested deeper than this are rejected, so hostile input cannot
/// exhaust the stack.
const MAX_NESTING: usize = 200;

#[derive(Debug, Clone)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    /// Integer outside the `i64` range, kept as normalized decimal text
    /// (optional leading `-`, no leading zeros).
    BigInt(String),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Key/value pairs in insertion order; duplicate keys keep the last value.
    Dict(Vec<(Literal, Literal)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub pos: usize,
    pub msg: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid literal at offset {}: {}", self.pos, self.msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses a complete literal. Surrounding whitespace is ignored.
pub fn parse_literal(text: &str) -> Result<Literal, ParseError> {
    let mut p = Parser::new(text);
    p.skip_ws();
    let value = p.value()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.err("unexpected trailing input"));
    }
    Ok(value)
}

/// Parses `text` as a literal, falling back to the trimmed raw text as a string.
pub fn parse_or_raw(text: &str) -> Literal {
    parse_literal(text).unwrap_or_else(|_| Literal::Str(text.trim().to_string()))
}

/// Splits an argument list at commas that sit outside brackets and strings.
pub fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

/// Parses a test input into positional arguments. Segments that are not
/// valid literals are passed through as raw strings.
pub fn parse_args(input: &str) -> Vec<Literal> {
    split_top_level(input)
        .into_iter()
        .map(parse_or_raw)
        .collect()
}

impl Literal {
    fn as_number(&self) -> Option<Number> {
        match self {
            Literal::Bool(b) => Some(Number::Int(*b as i64)),
            Literal::Int(i) => Some(Number::Int(*i)),
            Literal::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Integer from decimal digits, `Int` when it fits in `i64`.
    fn int_from_digits(negative: bool, digits: &str) -> Literal {
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Literal::Int(0);
        }
        let text = if negative {
            format!("-{}", digits)
        } else {
            digits.to_string()
        };
        match text.parse::<i64>() {
            Ok(i) => Literal::Int(i),
            Err(_) => Literal::BigInt(text),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "NoneType",
            Literal::Bool(_) => "bool",
            Literal::Int(_) | Literal::BigInt(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
        }
    }

    /// Python `repr()` rendering.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Literal::None => out.push_str("None"),
            Literal::Bool(true) => out.push_str("True"),
            Literal::Bool(false) => out.push_str("False"),
            Literal::Int(i) => out.push_str(&i.to_string()),
            Literal::BigInt(text) => out.push_str(text),
            Literal::Float(f) => out.push_str(&float_repr(*f)),
            Literal::Str(s) => out.push_str(&str_repr(s)),
            Literal::List(items) => {
                out.push('[');
                write_items(items, out);
                out.push(']');
            }
            Literal::Tuple(items) => {
                out.push('(');
                write_items(items, out);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Literal::Dict(pairs) => {
                out.push('{');
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out);
                    out.push_str(": ");
                    v.write_repr(out);
                }
                out.push('}');
            }
        }
    }

    /// Renders the value as Starlark source that evaluates back to it.
    pub fn to_starlark(&self) -> String {
        match self {
            Literal::None => "None".into(),
            Literal::Bool(true) => "True".into(),
            Literal::Bool(false) => "False".into(),
            Literal::Int(i) => i.to_string(),
            Literal::BigInt(text) => text.clone(),
            Literal::Float(f) if f.is_nan() => "float(\"nan\")".into(),
            Literal::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    "float(\"inf\")".into()
                } else {
                    "float(\"-inf\")".into()
                }
            }
            Literal::Float(f) => float_repr(*f),
            Literal::Str(s) => starlark_str(s),
            Literal::List(items) => format!("[{}]", join_starlark(items)),
            Literal::Tuple(items) if items.len() == 1 => format!("({},)", items[0].to_starlark()),
            Literal::Tuple(items) => format!("({})", join_starlark(items)),
            Literal::Dict(pairs) => {
                let body: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_starlark(), v.to_starlark()))
                    .collect();
                format!("{{{}}}", body.join(", "))
            }
        }
    }

    /// Builds a literal from decoded JSON data.
    pub fn from_json(value: &serde_json::Value) -> Literal {
        use serde_json::Value;
        match value {
            Value::Null => Literal::None,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Literal::Int(i),
                (None, Some(u)) => Literal::BigInt(u.to_string()),
                _ => Literal::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Literal::Str(s.clone()),
            Value::Array(items) => Literal::List(items.iter().map(Literal::from_json).collect()),
            Value::Object(map) => Literal::Dict(
                map.iter()
                    .map(|(k, v)| (Literal::Str(k.clone()), Literal::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Python `str()` rendering: strings print raw, everything else as `repr()`.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => f.write_str(s),
            other => f.write_str(&other.repr()),
        }
    }
}

/// Python equality: numbers compare across int, float and bool; lists never
/// equal tuples; dicts ignore key order.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::None, Literal::None) => true,
            (Literal::Str(a), Literal::Str(b)) => a == b,
            (Literal::BigInt(a), Literal::BigInt(b)) => a == b,
            (Literal::BigInt(text), Literal::Float(f))
            | (Literal::Float(f), Literal::BigInt(text)) => {
                f.is_finite() && f.fract() == 0.0 && format!("{:.0}", f) == *text
            }
            (Literal::List(a), Literal::List(b)) => a == b,
            (Literal::Tuple(a), Literal::Tuple(b)) => a == b,
            (Literal::Dict(a), Literal::Dict(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            _ => match (self.as_number(), other.as_number()) {
                (Some(x), Some(y)) => x.equals(y),
                _ => false,
            },
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn equals(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) => {
                b.fract() == 0.0 && b == a as f64 && (b as i64) == a
            }
            (Number::Float(a), Number::Float(b)) => a == b,
        }
    }
}

fn write_items(items: &[Literal], out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out);
    }
}

fn join_starlark(items: &[Literal]) -> String {
    items
        .iter()
        .map(Literal::to_starlark)
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".into();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{:e}", f);
        return match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => sci,
        };
    }
    if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn starlark_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn err(&self, msg: &str) -> ParseError {
        ParseError {
            pos: self.pos,
            msg: msg.to_string(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParseError> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == want => Ok(()),
            _ => Err(self.err(&format!("expected '{}'", want))),
        }
    }

    fn value(&mut self) -> Result<Literal, ParseError> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.err("unexpected end of input")),
            Some('[' | '(' | '{') => {
                if self.depth >= MAX_NESTING {
                    return Err(self.err("nesting too deep"));
                }
                self.depth += 1;
                let nested = self.container();
                self.depth -= 1;
                nested
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(q).map(Literal::Str)
            }
            Some('-') | Some('+') => self.signed_number(),
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(false),
            Some(c) if c.is_alphabetic() || c == '_' => self.keyword(),
            Some(_) => Err(self.err("unexpected character")),
        }
    }

    fn container(&mut self) -> Result<Literal, ParseError> {
        match self.bump() {
            Some('[') => {
                let (items, _) = self.sequence(']')?;
                Ok(Literal::List(items))
            }
            Some('(') => {
                let (mut items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some('{') => self.dict(),
            _ => Err(self.err("expected '[', '(' or '{'")),
        }
    }

    /// Comma separated values up to `close`. Reports whether a trailing comma
    /// was present so `(x)` and `(x,)` can be told apart.
    fn sequence(&mut self, close: char) -> Result<(Vec<Literal>, bool), ParseError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => trailing_comma = true,
                Some(c) if c == close => return Ok((items, false)),
                _ => return Err(self.err(&format!("expected ',' or '{}'", close))),
            }
        }
    }

    fn dict(&mut self) -> Result<Literal, ParseError> {
        let mut pairs: Vec<(Literal, Literal)> = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Dict(pairs));
            }
            let key = self.value()?;
            if matches!(key, Literal::List(_) | Literal::Dict(_)) {
                return Err(self.err("unhashable dict key"));
            }
            self.expect(':')?;
            let value = self.value()?;
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => pairs.push((key, value)),
            }
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some('}') => return Ok(Literal::Dict(pairs)),
                _ => return Err(self.err("expected ',' or '}'")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or_else(|| self.err("unterminated string"))?;
            match c {
                c if c == quote => return Ok(out),
                '\n' => return Err(self.err("newline in string literal")),
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let c = self.bump().ok_or_else(|| self.err("unterminated escape"))?;
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' => out.push(self.hex_escape(2)?),
            'u' if self.peek() == Some('{') => {
                self.pos += 1;
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                self.expect('}')?;
                out.push(self.code_point(&digits)?);
            }
            'u' => out.push(self.hex_escape(4)?),
            'U' => out.push(self.hex_escape(8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, len: usize) -> Result<char, ParseError> {
        let end = self.pos + len;
        if end > self.chars.len() {
            return Err(self.err("truncated escape"));
        }
        let digits: String = self.chars[self.pos..end].iter().collect();
        self.pos = end;
        self.code_point(&digits)
    }

    fn code_point(&self, digits: &str) -> Result<char, ParseError> {
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.err("invalid escape code point"))
    }

    fn signed_number(&mut self) -> Result<Literal, ParseError> {
        let mut negative = false;
        while let Some(sign @ ('-' | '+')) = self.peek() {
            self.pos += 1;
            negative ^= sign == '-';
            self.skip_ws();
        }
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(negative),
            _ => Err(self.err("sign must be followed by a number")),
        }
    }

    fn number(&mut self, negative: bool) -> Result<Literal, ParseError> {
        let start = self.pos;
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => self.pos += 1,
                '.' => {
                    is_float = true;
                    self.pos += 1;
                }
                'e' | 'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        if matches!(self.peek(), Some(c) if c.is_alphanumeric()) {
            return Err(self.err("malformed number"));
        }
        let digits: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if !is_float {
            return Ok(Literal::int_from_digits(negative, &digits));
        }
        let value = digits
            .parse::<f64>()
            .map_err(|_| self.err("malformed float"))?;
        Ok(Literal::Float(if negative { -value } else { value }))
    }

    fn keyword(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => {
                self.pos = start;
                Err(self.err("names are not literals"))
            }
        }
    }
}
