//! Module template rendering for the output artifact.
//!
//! # Design
//! - The artifact is `export const articles = <json>;` with no trailing newline.
//! - JSON is pretty printed with two-space indentation; empty containers stay on one line.
//! - Strings are written ASCII-only: anything outside printable ASCII becomes a lowercase
//!   `\uXXXX` escape (UTF-16 surrogate pairs for astral characters).
//! - Integer tokens are copied digit for digit, whatever their magnitude.
//! - Floats use the shortest round-trip digits: plain notation for decimal exponents in
//!   `-4..16` (always with a fractional part), otherwise `d.ddde+XX` with a signed,
//!   two-digit-minimum exponent.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};

use crate::error::{SinkError, SinkResult};

/// Text written before the JSON body.
pub const ARTIFACT_PREFIX: &str = "export const articles = ";
/// Text written after the JSON body.
pub const ARTIFACT_SUFFIX: &str = ";";

const INDENT: &[u8] = b"  ";

/// Render the module text for a parsed payload.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialised.
pub fn render_artifact(payload: &Value) -> SinkResult<String> {
    let mut buffer = Vec::with_capacity(ARTIFACT_PREFIX.len() + 128);
    buffer.extend_from_slice(ARTIFACT_PREFIX.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buffer, AsciiPrettyFormatter::new());
    payload
        .serialize(&mut serializer)
        .map_err(|source| SinkError::Render { source })?;
    buffer.extend_from_slice(ARTIFACT_SUFFIX.as_bytes());
    String::from_utf8(buffer).map_err(|source| SinkError::RenderUtf8 { source })
}

/// Recover the payload from module text produced by [`render_artifact`].
///
/// # Errors
///
/// Returns an error if the text does not follow the template or its body is not JSON.
pub fn parse_artifact(contents: &str) -> SinkResult<Value> {
    let body = contents
        .strip_prefix(ARTIFACT_PREFIX)
        .ok_or(SinkError::UnrecognisedArtifact { reason: "prefix" })?
        .strip_suffix(ARTIFACT_SUFFIX)
        .ok_or(SinkError::UnrecognisedArtifact { reason: "suffix" })?;
    serde_json::from_str(body).map_err(|source| SinkError::ParseArtifact { source })
}

struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl AsciiPrettyFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(INDENT),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        self.inner.end_object_value(writer)
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(canonical_float(value).as_bytes())
    }

    fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if is_integer_token(value) {
            let token = if value == "-0" { "0" } else { value };
            return writer.write_all(token.as_bytes());
        }
        let parsed: f64 = value.parse().map_err(io::Error::other)?;
        if !parsed.is_finite() {
            return Err(io::Error::other("number does not fit in a double"));
        }
        self.write_f64(writer, parsed)
    }

    // serde_json already escapes quotes, backslashes and C0 controls; fragments carry the rest.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if matches!(ch, ' '..='~') {
                continue;
            }
            writer.write_all(fragment[start..index].as_bytes())?;
            let mut units = [0_u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

fn is_integer_token(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

fn canonical_float(value: f64) -> String {
    // `{:e}` yields the shortest digits that round-trip, e.g. `1.25e-7`.
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs());
    }

    let (sign, mantissa) = mantissa
        .strip_prefix('-')
        .map_or(("", mantissa), |rest| ("-", rest));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    match usize::try_from(exponent) {
        Ok(exponent) => {
            let whole = exponent + 1;
            if digits.len() <= whole {
                format!("{sign}{digits}{}.0", "0".repeat(whole - digits.len()))
            } else {
                format!("{sign}{}.{}", &digits[..whole], &digits[whole..])
            }
        }
        Err(_) => {
            let zeros: String = (exponent + 1..0).map(|_| '0').collect();
            format!("{sign}0.{zeros}{digits}")
        }
    }
}
