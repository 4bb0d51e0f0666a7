//! Michelson expression text
//!
//! Conversion between the concrete syntax of Michelson expressions
//! (`Pair 5 (Some "a")`, `{ DROP ; NIL operation }`) and Micheline JSON.
//!
//! The textual layer is deliberately *generic*: [`expr_micheline_to_json`]
//! accepts any primitive name, including instructions such as `DROP` that
//! have no counterpart in [`Micheline`], and produces a [`serde_json::Value`].
//! Conversion into the closed data and type models goes through
//! [`Micheline::from_expr`] and [`MichelineType::from_expr`], which apply the
//! same checks as JSON decoding.
//!
//! Two printing styles are offered. The compact style, used by
//! [`json_micheline_to_expr`], omits all optional whitespace (`{DROP}`); the
//! spaced style is used by the `Display` impls of [`Micheline`] and
//! [`MichelineType`] (`{ 1 ; 2 }`).

use serde_json::{Map, Value};

use crate::conv::error::DecodeError;

use super::ty::MichelineType;
use super::{Micheline, MAX_DEPTH};

/// Error raised when converting between expression text and Micheline JSON
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprError {
    /// Input text could not be split into tokens
    Lex { offset: usize, reason: String },
    /// Token stream does not form a well-formed expression
    Parse { offset: usize, reason: String },
    /// JSON document does not have the shape of a Micheline node
    Json(String),
    /// Expression was well-formed but is not a valid value of the target model
    Decode(DecodeError),
}

impl ExprError {
    /// Byte offset into the source text at which the error was detected, if any
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            ExprError::Lex { offset, .. } | ExprError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    fn lex(offset: usize, reason: impl Into<String>) -> Self {
        Self::Lex {
            offset,
            reason: reason.into(),
        }
    }

    fn parse(offset: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<DecodeError> for ExprError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl std::fmt::Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprError::Lex { offset, reason } => {
                write!(f, "lexing error at offset {offset}: {reason}")
            }
            ExprError::Parse { offset, reason } => {
                write!(f, "parse error at offset {offset}: {reason}")
            }
            ExprError::Json(msg) => write!(f, "cannot print Micheline JSON: {msg}"),
            ExprError::Decode(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExprError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Int(String),
    Str(String),
    Bytes(String),
    Ident(String),
    Annot(String),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(i) => format!("integer `{i}`"),
            Token::Str(_) => "string literal".to_owned(),
            Token::Bytes(b) => format!("bytes `0x{b}`"),
            Token::Ident(id) => format!("primitive `{id}`"),
            Token::Annot(a) => format!("annotation `{a}`"),
            Token::LBrace => "`{`".to_owned(),
            Token::RBrace => "`}`".to_owned(),
            Token::LParen => "`(`".to_owned(),
            Token::RParen => "`)`".to_owned(),
            Token::Semi => "`;`".to_owned(),
        }
    }
}

fn is_annot_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '%' | '@')
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    // Consumes characters while `pred` holds, returning the end offset
    macro_rules! take_while {
        ($pred:expr) => {{
            let mut end = src.len();
            while let Some(&(ix, c)) = chars.peek() {
                if $pred(c) {
                    chars.next();
                } else {
                    end = ix;
                    break;
                }
            }
            end
        }};
    }

    while let Some(&(start, c)) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                take_while!(|c: char| c != '\n');
            }
            '{' | '}' | '(' | ')' | ';' => {
                chars.next();
                tokens.push((
                    start,
                    match c {
                        '{' => Token::LBrace,
                        '}' => Token::RBrace,
                        '(' => Token::LParen,
                        ')' => Token::RParen,
                        _ => Token::Semi,
                    },
                ));
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => return Err(ExprError::lex(start, "unterminated string literal")),
                        Some((_, '"')) => break,
                        Some((ix, '\\')) => match chars.next() {
                            Some((_, '"')) => text.push('"'),
                            Some((_, '\\')) => text.push('\\'),
                            Some((_, 'n')) => text.push('\n'),
                            Some((_, 't')) => text.push('\t'),
                            Some((_, 'r')) => text.push('\r'),
                            Some((_, 'b')) => text.push('\u{8}'),
                            Some((_, other)) => {
                                return Err(ExprError::lex(ix, format!("invalid escape `\\{other}`")))
                            }
                            None => return Err(ExprError::lex(ix, "unterminated escape")),
                        },
                        Some((_, other)) => text.push(other),
                    }
                }
                tokens.push((start, Token::Str(text)));
            }
            '%' | ':' | '@' => {
                chars.next();
                let end = take_while!(is_annot_char);
                tokens.push((start, Token::Annot(src[start..end].to_owned())));
            }
            '0' if src[start..].starts_with("0x") => {
                chars.next();
                chars.next();
                let end = take_while!(|c: char| c.is_ascii_alphanumeric());
                let hex = &src[start + 2..end];
                if !crate::hexstring::util::is_hex(hex) {
                    return Err(ExprError::lex(start, format!("invalid bytes literal `0x{hex}`")));
                }
                tokens.push((start, Token::Bytes(hex.to_owned())));
            }
            '-' | '0'..='9' => {
                chars.next();
                let end = take_while!(|c: char| c.is_ascii_digit());
                let text = &src[start..end];
                if !super::is_canonical_int(text) {
                    return Err(ExprError::lex(start, format!("malformed integer literal `{text}`")));
                }
                tokens.push((start, Token::Int(text.to_owned())));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let end = take_while!(|c: char| c.is_ascii_alphanumeric() || c == '_');
                tokens.push((start, Token::Ident(src[start..end].to_owned())));
            }
            other => return Err(ExprError::lex(start, format!("unexpected character `{other}`"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, tok)| tok)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(ix, _)| *ix)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, tok)| tok.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &str) -> ExprError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_owned(), Token::describe);
        ExprError::parse(self.offset(), format!("expected {expected}, found {found}"))
    }

    fn starts_arg(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Int(_)
                    | Token::Str(_)
                    | Token::Bytes(_)
                    | Token::Ident(_)
                    | Token::LBrace
                    | Token::LParen
            )
        )
    }

    fn enter(&mut self, offset: usize) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::parse(offset, format!("nesting exceeds maximum depth of {MAX_DEPTH}")));
        }
        self.depth += 1;
        Ok(())
    }

    /// Expression in a position where a primitive may take arguments
    fn expr(&mut self) -> Result<Value, ExprError> {
        if let Some(Token::Ident(_)) = self.peek() {
            let Some(Token::Ident(name)) = self.next() else {
                return Err(self.unexpected("primitive"));
            };
            let mut annots = Vec::new();
            while let Some(Token::Annot(_)) = self.peek() {
                if let Some(Token::Annot(a)) = self.next() {
                    annots.push(Value::String(a));
                }
            }
            let mut args = Vec::new();
            while self.starts_arg() {
                args.push(self.arg()?);
            }
            Ok(application(name, args, annots))
        } else {
            self.arg()
        }
    }

    /// Expression in argument position, where applications must be parenthesized
    fn arg(&mut self) -> Result<Value, ExprError> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Int(i)) => Ok(serde_json::json!({ "int": i })),
            Some(Token::Str(s)) => Ok(serde_json::json!({ "string": s })),
            Some(Token::Bytes(b)) => Ok(serde_json::json!({ "bytes": b })),
            Some(Token::Ident(name)) => Ok(application(name, Vec::new(), Vec::new())),
            Some(Token::LParen) => {
                self.enter(offset)?;
                let inner = self.expr()?;
                self.depth -= 1;
                if let Some(Token::RParen) = self.peek() {
                    self.next();
                    Ok(inner)
                } else {
                    Err(self.unexpected("`)`"))
                }
            }
            Some(Token::LBrace) => {
                self.enter(offset)?;
                let seq = self.seq()?;
                self.depth -= 1;
                Ok(seq)
            }
            Some(_) => {
                self.pos -= 1;
                Err(self.unexpected("expression"))
            }
            None => Err(ExprError::parse(offset, "unexpected end of input")),
        }
    }

    /// Sequence body, following its opening brace
    fn seq(&mut self) -> Result<Value, ExprError> {
        let mut elems = Vec::new();
        loop {
            if let Some(Token::RBrace) = self.peek() {
                self.next();
                break;
            }
            elems.push(self.expr()?);
            match self.peek() {
                Some(Token::Semi) => {
                    self.next();
                }
                Some(Token::RBrace) => {}
                _ => return Err(self.unexpected("`;` or `}`")),
            }
        }
        Ok(Value::Array(elems))
    }
}

fn application(name: String, args: Vec<Value>, annots: Vec<Value>) -> Value {
    let mut obj = Map::new();
    obj.insert("prim".into(), Value::String(name));
    if !args.is_empty() {
        obj.insert("args".into(), Value::Array(args));
    }
    if !annots.is_empty() {
        obj.insert("annots".into(), Value::Array(annots));
    }
    Value::Object(obj)
}

/// Parses Michelson expression text into Micheline JSON
///
/// # Examples
///
/// ```
/// # use mimic::micheline::expr::expr_micheline_to_json;
/// let json = expr_micheline_to_json("{ DROP }").unwrap();
/// assert_eq!(json.to_string(), r#"[{"prim":"DROP"}]"#);
/// ```
pub fn expr_micheline_to_json(src: &str) -> Result<Value, ExprError> {
    let tokens = tokenize(src)?;
    if tokens.is_empty() {
        return Err(ExprError::parse(0, "empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: src.len(),
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(value)
}

/// Prints Micheline JSON as compact Michelson expression text
///
/// # Examples
///
/// ```
/// # use mimic::micheline::expr::json_micheline_to_expr;
/// let json = serde_json::json!([{ "prim": "DROP" }]);
/// assert_eq!(json_micheline_to_expr(&json).unwrap(), "{DROP}");
/// ```
pub fn json_micheline_to_expr(value: &Value) -> Result<String, ExprError> {
    let mut out = String::new();
    write_node(&mut out, value, Style::Compact, false)?;
    Ok(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Style {
    Compact,
    Spaced,
}

fn write_string_literal(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str, ExprError> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ExprError::Json(format!("`{key}` must be a JSON string")))
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], ExprError> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(Value::Array(elems)) => Ok(elems.as_slice()),
        Some(_) => Err(ExprError::Json(format!("`{key}` must be a JSON array"))),
    }
}

fn write_node(out: &mut String, value: &Value, style: Style, nested: bool) -> Result<(), ExprError> {
    match value {
        Value::Array(elems) => {
            if elems.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            let (open, sep, close) = match style {
                Style::Compact => ("{", ";", "}"),
                Style::Spaced => ("{ ", " ; ", " }"),
            };
            out.push_str(open);
            for (ix, elem) in elems.iter().enumerate() {
                if ix > 0 {
                    out.push_str(sep);
                }
                write_node(out, elem, style, false)?;
            }
            out.push_str(close);
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("int") => {
            let text = str_field(obj, "int")?;
            if !super::is_canonical_int(text) {
                return Err(ExprError::Json(format!("`{text}` is not a canonical decimal integer")));
            }
            out.push_str(text);
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("string") => {
            write_string_literal(out, str_field(obj, "string")?);
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("bytes") => {
            out.push_str("0x");
            out.push_str(str_field(obj, "bytes")?);
            Ok(())
        }
        Value::Object(obj) if obj.contains_key("prim") => {
            let name = str_field(obj, "prim")?;
            let args = array_field(obj, "args")?;
            let annots = array_field(obj, "annots")?;
            let wrap = nested && !(args.is_empty() && annots.is_empty());
            if wrap {
                out.push('(');
            }
            out.push_str(name);
            for annot in annots {
                let annot = annot
                    .as_str()
                    .ok_or_else(|| ExprError::Json("annotations must be JSON strings".into()))?;
                out.push(' ');
                out.push_str(annot);
            }
            for arg in args {
                out.push(' ');
                write_node(out, arg, style, true)?;
            }
            if wrap {
                out.push(')');
            }
            Ok(())
        }
        other => Err(ExprError::Json(format!("not a Micheline node: {other}"))),
    }
}

fn display_json(value: &Value, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut out = String::new();
    write_node(&mut out, value, Style::Spaced, false).map_err(|_| std::fmt::Error)?;
    f.write_str(&out)
}

impl Micheline {
    /// Parses Michelson expression text as a Micheline value
    pub fn from_expr(src: &str) -> Result<Self, ExprError> {
        let json = expr_micheline_to_json(src)?;
        Ok(Micheline::from_json(&json)?)
    }

    /// Prints this value as compact Michelson expression text
    #[must_use]
    pub fn to_expr(&self) -> String {
        let mut out = String::new();
        // well-formed by construction
        let _ = write_node(&mut out, &self.to_json(), Style::Compact, false);
        out
    }
}

impl MichelineType {
    /// Parses Michelson expression text as a Micheline type
    pub fn from_expr(src: &str) -> Result<Self, ExprError> {
        let json = expr_micheline_to_json(src)?;
        Ok(MichelineType::from_json(&json)?)
    }
}

impl std::fmt::Display for Micheline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display_json(&self.to_json(), f)
    }
}

impl std::fmt::Display for MichelineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        display_json(&self.to_json(), f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::micheline::prim::TypePrim;

    #[test]
    fn drop_roundtrip() {
        let json = expr_micheline_to_json("{ DROP }").unwrap();
        assert_eq!(json.to_string(), r#"[{"prim":"DROP"}]"#);
        assert_eq!(json_micheline_to_expr(&json).unwrap(), "{DROP}");
    }

    #[test]
    fn instructions_with_args() {
        let json = expr_micheline_to_json("{ DROP ; NIL operation ; PAIR }").unwrap();
        assert_eq!(
            json.to_string(),
            r#"[{"prim":"DROP"},{"prim":"NIL","args":[{"prim":"operation"}]},{"prim":"PAIR"}]"#
        );
        assert_eq!(json_micheline_to_expr(&json).unwrap(), "{DROP;NIL operation;PAIR}");
    }

    #[test]
    fn data_display() {
        let value = Micheline::pair(Micheline::int(5), Micheline::some(Micheline::string("a")));
        assert_eq!(value.to_string(), r#"Pair 5 (Some "a")"#);
        assert_eq!(Micheline::from_expr(r#"Pair 5 (Some "a")"#).unwrap(), value);
        let seq = Micheline::seq([Micheline::int(1), Micheline::int(2)]);
        assert_eq!(seq.to_string(), "{ 1 ; 2 }");
        assert_eq!(seq.to_expr(), "{1;2}");
        assert_eq!(Micheline::seq([]).to_string(), "{}");
    }

    #[test]
    fn type_display() {
        let ty = MichelineType::pair(
            MichelineType::prim(TypePrim::nat).with_field("a"),
            MichelineType::prim(TypePrim::string).with_field("b"),
        );
        assert_eq!(ty.to_string(), "pair (nat %a) (string %b)");
        assert_eq!(MichelineType::from_expr("pair (nat %a) (string %b)").unwrap(), ty);
    }

    #[test]
    fn literals() {
        let value = Micheline::from_expr(r#"{ -12 ; 0xdeadBEEF ; "q\"uote\n" }"#).unwrap();
        assert_eq!(
            value,
            Micheline::seq([
                Micheline::int(-12),
                Micheline::bytes("deadBEEF"),
                Micheline::string("q\"uote\n"),
            ])
        );
        assert_eq!(value.to_string(), r#"{ -12 ; 0xdeadBEEF ; "q\"uote\n" }"#);
    }

    #[test]
    fn errors_carry_offsets() {
        assert_eq!(expr_micheline_to_json("Pair 1 $").unwrap_err().offset(), Some(7));
        assert_eq!(expr_micheline_to_json("(Pair 1 2").unwrap_err().offset(), Some(9));
        assert!(matches!(
            expr_micheline_to_json("\"abc"),
            Err(ExprError::Lex { offset: 0, .. })
        ));
        assert!(expr_micheline_to_json("").is_err());
        assert!(expr_micheline_to_json("0xabc").is_err());
        assert!(matches!(
            Micheline::from_expr("DROP"),
            Err(ExprError::Decode(DecodeError::UnknownPrim(_)))
        ));
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |n: usize| format!("{}Unit{}", "(Some ".repeat(n), ")".repeat(n));
        assert!(Micheline::from_expr(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(
            expr_micheline_to_json(&nested(MAX_DEPTH + 1)),
            Err(ExprError::Parse { offset, .. }) if offset == 6 * MAX_DEPTH
        ));
        let braces = format!("{}{}", "{".repeat(10_000), "}".repeat(10_000));
        assert!(matches!(expr_micheline_to_json(&braces), Err(ExprError::Parse { .. })));
    }

    #[test]
    fn int_literals_are_canonical() {
        assert_eq!(Micheline::from_expr("-0").ok(), None);
        assert!(matches!(expr_micheline_to_json("007"), Err(ExprError::Lex { offset: 0, .. })));
        assert!(matches!(expr_micheline_to_json("{ 1 ; -01 }"), Err(ExprError::Lex { offset: 6, .. })));
        assert_eq!(expr_micheline_to_json("0").unwrap(), serde_json::json!({ "int": "0" }));
        assert!(matches!(
            json_micheline_to_expr(&serde_json::json!({ "int": "+5" })),
            Err(ExprError::Json(_))
        ));
    }
}
