//! printf-style message templates with named placeholders.
//!
//! A template is literal text interleaved with placeholders of the form
//! `%(key)[-0][width][.precision](s|d)`; `%%` is a literal percent sign.
//!
//! | key         | value                                            |
//! |-------------|--------------------------------------------------|
//! | `name`      | logger name                                      |
//! | `levelname` | severity label, colored when enabled             |
//! | `levelno`   | numeric severity                                 |
//! | `message`   | event message followed by its other fields       |
//! | `filename`  | last component of the source path                |
//! | `pathname`  | source path as recorded by the compiler          |
//! | `lineno`    | source line                                      |
//! | `module`    | module path, or the source file stem             |
//! | `asctime`   | RFC 3339 timestamp                               |
//! | `process`   | id of the emitting process                       |
//! | `threadName`| name of the emitting thread                      |
//!
//! Flags: `-` left-justifies, `0` pads `d` conversions with zeros.
//! Width is measured in visible characters: escape sequences carried by a
//! [`Value::Painted`] never count towards it.
use std::{fmt, iter::Peekable, str::CharIndices, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
    #[error("expected `(` or `%` after `%` at byte {0}")]
    ExpectedKey(usize),
    #[error("unknown placeholder key `{0}`")]
    UnknownKey(String),
    #[error("unsupported conversion `{conv}` at byte {at} (expected `s` or `d`)")]
    UnsupportedConversion { conv: char, at: usize },
    #[error("conversion `d` needs a numeric key, got `{0}`")]
    NotNumeric(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Name,
    LevelName,
    LevelNo,
    Message,
    FileName,
    PathName,
    LineNo,
    Module,
    AscTime,
    Process,
    ThreadName,
}

impl Key {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "name" => Key::Name,
            "levelname" => Key::LevelName,
            "levelno" => Key::LevelNo,
            "message" => Key::Message,
            "filename" => Key::FileName,
            "pathname" => Key::PathName,
            "lineno" => Key::LineNo,
            "module" => Key::Module,
            "asctime" => Key::AscTime,
            "process" => Key::Process,
            "threadName" => Key::ThreadName,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Key::LevelNo | Key::LineNo | Key::Process)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Str,
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder {
    key: Key,
    left: bool,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Placeholder(Placeholder),
}

/// A value substituted for a placeholder.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Text(&'a str),
    Number(u64),
    /// `text` wrapped in escape sequences that take no room on screen.
    Painted {
        open: &'a str,
        text: &'a str,
        close: &'a str,
    },
}

/// Supplies placeholder values while a template renders.
pub trait Resolve {
    fn resolve(&self, key: Key) -> Value<'_>;
}

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                Some((_, '%')) => literal.push('%'),
                Some((_, '(')) => {
                    let placeholder = parse_placeholder(&mut chars, at)?;
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Placeholder(placeholder));
                }
                Some(_) => return Err(TemplateError::ExpectedKey(at)),
                None => return Err(TemplateError::Unterminated(at)),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` if any placeholder refers to `key`.
    pub fn uses(&self, key: Key) -> bool {
        self.pieces
            .iter()
            .any(|p| matches!(p, Piece::Placeholder(ph) if ph.key == key))
    }

    pub fn render<W, R>(&self, out: &mut W, values: &R) -> fmt::Result
    where
        W: fmt::Write + ?Sized,
        R: Resolve + ?Sized,
    {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.write_str(text)?,
                Piece::Placeholder(ph) => ph.write(out, values.resolve(ph.key))?,
            }
        }
        Ok(())
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Placeholder {
    fn write<W>(&self, out: &mut W, value: Value<'_>) -> fmt::Result
    where
        W: fmt::Write + ?Sized,
    {
        let number;
        let (open, text, close) = match value {
            Value::Text(text) => ("", text, ""),
            Value::Number(n) => {
                number = n.to_string();
                ("", number.as_str(), "")
            }
            Value::Painted { open, text, close } => (open, text, close),
        };
        let text = match (self.conversion, self.precision) {
            (Conversion::Str, Some(max)) => truncate(text, max),
            _ => text,
        };

        let pad = self.width.saturating_sub(text.chars().count());
        if !self.left {
            let padding = match self.conversion {
                Conversion::Int if self.zero => '0',
                _ => ' ',
            };
            fill(out, padding, pad)?;
        }
        out.write_str(open)?;
        out.write_str(text)?;
        out.write_str(close)?;
        if self.left {
            fill(out, ' ', pad)?;
        }
        Ok(())
    }
}

fn parse_placeholder(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<Placeholder, TemplateError> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some((_, ')')) => break,
            Some((_, c)) => name.push(c),
            None => return Err(TemplateError::Unterminated(start)),
        }
    }
    let key = Key::from_name(&name).ok_or_else(|| TemplateError::UnknownKey(name.clone()))?;

    let (mut left, mut zero) = (false, false);
    while let Some((_, flag)) = chars.next_if(|&(_, c)| c == '-' || c == '0') {
        match flag {
            '-' => left = true,
            _ => zero = true,
        }
    }
    let width = digits(chars).unwrap_or(0);
    let precision = match chars.next_if(|&(_, c)| c == '.') {
        Some(_) => Some(digits(chars).unwrap_or(0)),
        None => None,
    };

    let conversion = match chars.next() {
        Some((_, 's')) => Conversion::Str,
        Some((_, 'd')) if key.is_numeric() => Conversion::Int,
        Some((_, 'd')) => return Err(TemplateError::NotNumeric(name)),
        Some((at, conv)) => return Err(TemplateError::UnsupportedConversion { conv, at }),
        None => return Err(TemplateError::Unterminated(start)),
    };

    Ok(Placeholder {
        key,
        left,
        zero,
        width,
        precision,
        conversion,
    })
}

fn digits(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut value = None;
    while let Some((_, d)) = chars.next_if(|&(_, c)| c.is_ascii_digit()) {
        let digit = usize::from(d as u8 - b'0');
        value = Some(value.unwrap_or(0usize).saturating_mul(10).saturating_add(digit));
    }
    value
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn fill<W>(out: &mut W, padding: char, n: usize) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    for _ in 0..n {
        out.write_char(padding)?;
    }
    Ok(())
}
