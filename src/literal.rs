//! Primitive literal scanning and rendering.
//!
//! The scanners take text that starts at a literal and return the decoded
//! value together with the number of bytes consumed; the caller continues
//! from there. The renderers are their inverses.
//!
//! ```rust
//! use fron::literal::{scan_number, scan_string, string_to_literal};
//! use fron::Value;
//!
//! assert_eq!(scan_string(r#""a\tb" rest"#).unwrap(), ("a\tb".to_string(), 6));
//! assert_eq!(scan_number("0x1F,").unwrap(), (Value::from(31), 4));
//! assert_eq!(string_to_literal("say \"hi\"", '"'), r#""say \"hi\"""#);
//! ```

use crate::{Number, Value};
use num_bigint::BigInt;
use std::fmt;

/// A scanning failure, at `offset` bytes into the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanError {
    pub offset: usize,
    pub msg: String,
}

impl ScanError {
    fn new(offset: usize, msg: impl Into<String>) -> Self {
        ScanError {
            offset,
            msg: msg.into(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.msg, self.offset)
    }
}

type ScanResult<T> = std::result::Result<T, ScanError>;

/// Scans a single-, double- or back-quoted string.
///
/// Back-quoted strings may span lines; the others may not, except through a
/// backslash line continuation.
pub fn scan_string(text: &str) -> ScanResult<(String, usize)> {
    let mut chars = text.char_indices().peekable();
    let quote = match chars.next() {
        Some((_, c @ ('"' | '\'' | '`'))) => c,
        _ => return Err(ScanError::new(0, "expected a string")),
    };
    let mut out = String::new();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((out, i + c.len_utf8())),
            '\\' => {
                let (j, escape) = chars
                    .next()
                    .ok_or_else(|| ScanError::new(i, "unterminated string"))?;
                match escape {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'v' => out.push('\u{b}'),
                    '0' => out.push('\0'),
                    '\n' | '\u{2028}' | '\u{2029}' => {}
                    '\r' => {
                        if matches!(chars.peek(), Some((_, '\n'))) {
                            chars.next();
                        }
                    }
                    'x' => {
                        let code = hex_digits(text, j + 1, 2)?;
                        chars.next();
                        chars.next();
                        out.push(char::from_u32(code).ok_or_else(|| ScanError::new(j, "invalid escape"))?);
                    }
                    'u' => {
                        let (c, len) = unicode_escape(text, j + 1)?;
                        for _ in text[j + 1..j + 1 + len].chars() {
                            chars.next();
                        }
                        out.push(c);
                    }
                    other => out.push(other),
                }
            }
            '\n' | '\r' if quote != '`' => {
                return Err(ScanError::new(i, "unterminated string"));
            }
            c => out.push(c),
        }
    }
    Err(ScanError::new(text.len(), "unterminated string"))
}

fn hex_digits(text: &str, start: usize, count: usize) -> ScanResult<u32> {
    let digits = text
        .get(start..start + count)
        .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
        .ok_or_else(|| ScanError::new(start, "invalid hexadecimal escape"))?;
    u32::from_str_radix(digits, 16).map_err(|_| ScanError::new(start, "invalid hexadecimal escape"))
}

/// Decodes the text after `\u`; returns the character and the bytes used.
fn unicode_escape(text: &str, start: usize) -> ScanResult<(char, usize)> {
    if text[start..].starts_with('{') {
        let close = text[start..]
            .find('}')
            .ok_or_else(|| ScanError::new(start, "unterminated unicode escape"))?;
        let digits = &text[start + 1..start + close];
        if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ScanError::new(start, "invalid unicode escape"));
        }
        let code = u32::from_str_radix(digits, 16).map_err(|_| ScanError::new(start, "invalid unicode escape"))?;
        let c = char::from_u32(code).ok_or_else(|| ScanError::new(start, "invalid code point"))?;
        return Ok((c, close + 1));
    }

    let high = hex_digits(text, start, 4)?;
    if (0xD800..0xDC00).contains(&high) {
        // A high surrogate must be followed by `\uDC00`-`\uDFFF`.
        if text[start + 4..].starts_with("\\u") {
            let low = hex_digits(text, start + 6, 4)?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                let c = char::from_u32(code).ok_or_else(|| ScanError::new(start, "invalid code point"))?;
                return Ok((c, 10));
            }
        }
        return Err(ScanError::new(start, "unpaired surrogate"));
    }
    let c = char::from_u32(high).ok_or_else(|| ScanError::new(start, "unpaired surrogate"))?;
    Ok((c, 4))
}

/// Scans a number: decimal, `0x`/`0o`/`0b`, `NaN`, `Infinity`, with an
/// optional leading `-`. An `n` suffix makes a big integer.
///
/// Integers that do not fit in `i64` become floats, like any other number
/// without the suffix.
pub fn scan_number(text: &str) -> ScanResult<(Value, usize)> {
    let bytes = text.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let start = usize::from(negative);
    let rest = &text[start..];

    if rest.starts_with("Infinity") {
        let n = if negative {
            Number::NegativeInfinity
        } else {
            Number::Infinity
        };
        return Ok((Value::Number(n), start + 8));
    }
    if rest.starts_with("NaN") {
        return Ok((Value::Number(Number::NaN), start + 3));
    }

    let radix = match rest.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits_start = start + 2;
        let len = text[digits_start..]
            .chars()
            .take_while(|c| c.is_digit(radix))
            .count();
        if len == 0 {
            return Err(ScanError::new(digits_start, "missing digits after radix prefix"));
        }
        let digits = &text[digits_start..digits_start + len];
        let mut big = BigInt::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| ScanError::new(digits_start, "invalid digits"))?;
        if negative {
            big = -big;
        }
        let mut end = digits_start + len;
        if bytes.get(end) == Some(&b'n') {
            end += 1;
            return Ok((Value::BigInt(big), end));
        }
        return Ok((integer_value(&big), end));
    }

    let mut end = start;
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut is_float = false;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            is_float = true;
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return Err(ScanError::new(start, "expected a number"));
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            is_float = true;
            end = exp_end + exp_digits;
        }
    }

    let literal = &text[..end];
    if !is_float && bytes.get(end) == Some(&b'n') {
        let big = literal
            .parse::<BigInt>()
            .map_err(|_| ScanError::new(start, "invalid big integer"))?;
        return Ok((Value::BigInt(big), end + 1));
    }
    if !is_float {
        match literal.parse::<i64>() {
            // `-0` keeps its sign, which only a float can carry.
            Ok(0) if negative => return Ok((Value::Number(Number::Float(-0.0)), end)),
            Ok(i) => return Ok((Value::Number(Number::Integer(i)), end)),
            Err(_) => {}
        }
    }
    let f = literal
        .parse::<f64>()
        .map_err(|_| ScanError::new(start, "invalid number"))?;
    Ok((Value::Number(Number::from(f)), end))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn integer_value(big: &BigInt) -> Value {
    match i64::try_from(big) {
        Ok(i) => Value::Number(Number::Integer(i)),
        Err(_) => Value::Number(Number::from(big.to_string().parse::<f64>().unwrap_or(f64::NAN))),
    }
}

/// Scans a `/pattern/flags` literal; returns source, flags and bytes used.
///
/// The closing slash is the first unescaped `/` outside a character class.
pub fn scan_regexp(text: &str) -> ScanResult<(String, String, usize)> {
    let mut chars = text.char_indices();
    if !matches!(chars.next(), Some((_, '/'))) {
        return Err(ScanError::new(0, "expected a regular expression"));
    }
    let mut in_class = false;
    let mut close = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((j, '\n' | '\r')) => {
                    return Err(ScanError::new(j, "unterminated regular expression"));
                }
                Some(_) => {}
                None => break,
            },
            '\n' | '\r' => return Err(ScanError::new(i, "unterminated regular expression")),
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                close = Some(i);
                break;
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| ScanError::new(text.len(), "unterminated regular expression"))?;
    if close == 1 {
        return Err(ScanError::new(1, "empty regular expression"));
    }
    let flags_len = text[close + 1..]
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .count();
    let end = close + 1 + flags_len;
    Ok((
        text[1..close].to_string(),
        text[close + 1..end].to_string(),
        end,
    ))
}

/// Renders `s` as a quoted literal using `quote` as the delimiter.
///
/// Control characters and the line separators U+2028/U+2029 are escaped;
/// other non-ASCII text is written as is.
#[must_use]
pub fn string_to_literal(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Renders a number so that it scans back to the same variant.
///
/// Floats always carry a fraction or an exponent (`1.0`, `1e21`).
#[must_use]
pub fn number_to_literal(n: &Number) -> String {
    match n.normalized() {
        Number::Integer(i) => i.to_string(),
        Number::Float(f) => format!("{f:?}"),
        Number::Infinity => "Infinity".to_string(),
        Number::NegativeInfinity => "-Infinity".to_string(),
        Number::NaN => "NaN".to_string(),
    }
}

#[must_use]
pub fn bigint_to_literal(n: &BigInt) -> String {
    format!("{n}n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_quotes() {
        assert_eq!(scan_string("'it\\'s'").unwrap(), ("it's".to_string(), 7));
        assert_eq!(scan_string("`a\nb`").unwrap(), ("a\nb".to_string(), 5));
        assert!(scan_string("\"a\nb\"").is_err());
        assert!(scan_string("\"open").is_err());
    }

    #[test]
    fn test_string_escapes() {
        let (s, _) = scan_string(r#""\x41\u0042\u{43}\v\0""#).unwrap();
        assert_eq!(s, "ABC\u{b}\0");

        let (s, consumed) = scan_string(r#""\uD83D\uDE00!""#).unwrap();
        assert_eq!(s, "\u{1F600}!");
        assert_eq!(consumed, 15);

        assert!(scan_string(r#""\uD83D""#).is_err());
        assert!(scan_string(r#""\xZZ""#).is_err());
    }

    #[test]
    fn test_line_continuation() {
        let (s, _) = scan_string("\"a\\\nb\"").unwrap();
        assert_eq!(s, "ab");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(scan_number("42").unwrap(), (Value::from(42), 2));
        assert_eq!(scan_number("-1.5e3,").unwrap(), (Value::from(-1500.0), 6));
        assert_eq!(scan_number("1.0").unwrap(), (Value::from(1.0), 3));
        assert_eq!(scan_number(".5").unwrap(), (Value::from(0.5), 2));
        assert_eq!(scan_number("0b101").unwrap(), (Value::from(5), 5));
        assert_eq!(scan_number("-0o17").unwrap(), (Value::from(-15), 5));
        assert_eq!(
            scan_number("-Infinity").unwrap(),
            (Value::Number(Number::NegativeInfinity), 9)
        );
        assert!(scan_number("-").is_err());
        assert!(scan_number("0x").is_err());
    }

    #[test]
    fn test_exponent_without_digits_is_not_consumed() {
        assert_eq!(scan_number("1e").unwrap(), (Value::from(1), 1));
    }

    #[test]
    fn test_bigint() {
        let (v, consumed) = scan_number("123456789012345678901234567890n").unwrap();
        assert_eq!(consumed, 31);
        assert_eq!(
            v.as_bigint().map(ToString::to_string).as_deref(),
            Some("123456789012345678901234567890")
        );
        assert_eq!(scan_number("0xffn").unwrap().0, Value::BigInt(BigInt::from(255)));
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let (v, consumed) = scan_number("-0,").unwrap();
        assert_eq!(consumed, 2);
        assert!(matches!(v, Value::Number(Number::Float(f)) if f == 0.0 && f.is_sign_negative()));
        assert_eq!(scan_number("0").unwrap(), (Value::from(0), 1));
        assert_eq!(number_to_literal(&Number::Float(-0.0)), "-0.0");
    }

    #[test]
    fn test_integer_overflow_becomes_float() {
        let (v, _) = scan_number("99999999999999999999").unwrap();
        assert!(matches!(v, Value::Number(Number::Float(_))));
    }

    #[test]
    fn test_regexp() {
        assert_eq!(
            scan_regexp("/a[/]b\\/c/gi,").unwrap(),
            ("a[/]b\\/c".to_string(), "gi".to_string(), 12)
        );
        assert!(scan_regexp("//").is_err());
        assert!(scan_regexp("/abc").is_err());
        assert!(scan_regexp("/a\nb/").is_err());
    }

    #[test]
    fn test_string_to_literal() {
        assert_eq!(string_to_literal("a\"b\n", '"'), r#""a\"b\n""#);
        assert_eq!(string_to_literal("it's", '\''), r"'it\'s'");
        assert_eq!(string_to_literal("\u{1}é", '"'), "\"\\u0001é\"");
    }

    #[test]
    fn test_number_to_literal() {
        assert_eq!(number_to_literal(&Number::Integer(-7)), "-7");
        assert_eq!(number_to_literal(&Number::Float(1.0)), "1.0");
        assert_eq!(number_to_literal(&Number::Float(0.1)), "0.1");
        assert_eq!(number_to_literal(&Number::Float(f64::NAN)), "NaN");
        assert_eq!(number_to_literal(&Number::NegativeInfinity), "-Infinity");
        assert_eq!(bigint_to_literal(&BigInt::from(10)), "10n");
    }
}
