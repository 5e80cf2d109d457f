//! Conversion hooks and their composition.
//!
//! A [`Hook`] converts a raw value into a [`Decoded`] value when it
//! recognises the (source, target) pair, and must pass the value through
//! unchanged — [`Conversion::Unhandled`], no failure — when it does not.
//! That pass-through contract is what makes hooks safe to chain: a
//! composed hook runs its parts in order and the first conversion wins,
//! while an "or" group treats its parts as fallback alternatives for the
//! same purpose, keeping the last failure only if no alternative succeeds.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::ConvertError;
use crate::schema::TargetKind;
use crate::value::{Decoded, RawValue};

/// Outcome of running a hook against a (source, target) pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Conversion {
    /// The hook recognised the pair and produced a typed value.
    Converted(Decoded),
    /// The hook does not apply; the value passes through unchanged.
    Unhandled,
}

type HookFn = Box<dyn Fn(&RawValue, &TargetKind) -> Result<Conversion, ConvertError> + Send + Sync>;

/// A named, guarded conversion function.
pub struct Hook {
    name: String,
    run: HookFn,
}

impl Hook {
    /// Wrap a conversion closure.
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&RawValue, &TargetKind) -> Result<Conversion, ConvertError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    /// The hook's name, used in composed names.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the hook.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] when the hook recognises the pair but the
    /// value cannot be parsed.
    pub fn run(&self, raw: &RawValue, target: &TargetKind) -> Result<Conversion, ConvertError> {
        (self.run)(raw, target)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish()
    }
}

fn joined_name(prefix: &str, hooks: &[Hook]) -> String {
    let mut name = String::from(prefix);
    for hook in hooks {
        name.push('_');
        name.push_str(hook.name());
    }
    name
}

/// Compose hooks left to right; the first conversion wins.
///
/// Composition is associative: composing `[A, B]` and then composing the
/// result with `[C]` behaves exactly like composing `[A, B, C]`.
///
/// # Panics
///
/// Panics when `hooks` is empty; at least one hook is required.
#[must_use]
pub fn compose(hooks: Vec<Hook>) -> Hook {
    assert!(!hooks.is_empty(), "at least one hook is required");
    let name = joined_name("compose", &hooks);
    Hook::new(name, move |raw, target| {
        for hook in &hooks {
            if let Conversion::Converted(value) = hook.run(raw, target)? {
                return Ok(Conversion::Converted(value));
            }
        }
        Ok(Conversion::Unhandled)
    })
}

/// Compose same-purpose hooks as fallback alternatives.
///
/// Each alternative is tried in order; the first successful conversion
/// wins. A failing alternative is remembered and the next one tried; if no
/// alternative converts and at least one failed, the last failure
/// propagates, otherwise the group passes the value through.
///
/// # Panics
///
/// Panics when `hooks` is empty; at least one hook is required.
#[must_use]
pub fn or_group(hooks: Vec<Hook>) -> Hook {
    assert!(!hooks.is_empty(), "at least one hook is required");
    let name = joined_name("or", &hooks);
    Hook::new(name, move |raw, target| {
        let mut last_failure = None;
        for hook in &hooks {
            match hook.run(raw, target) {
                Ok(Conversion::Converted(value)) => return Ok(Conversion::Converted(value)),
                Ok(Conversion::Unhandled) => {}
                Err(failure) => last_failure = Some(failure),
            }
        }
        match last_failure {
            Some(failure) => Err(failure),
            None => Ok(Conversion::Unhandled),
        }
    })
}

fn leaf<P>(name: impl Into<String>, kind: TargetKind, parse: P) -> Hook
where
    P: Fn(&str) -> Result<Decoded, ConvertError> + Send + Sync + 'static,
{
    Hook::new(name, move |raw, target| {
        let RawValue::Text(text) = raw else {
            return Ok(Conversion::Unhandled);
        };
        if *target != kind {
            return Ok(Conversion::Unhandled);
        }
        parse(text).map(Conversion::Converted)
    })
}

fn split_radix(s: &str) -> (u32, String) {
    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.strip_prefix('+').unwrap_or(s)),
    };
    for (prefix, radix) in [
        ("0x", 16),
        ("0X", 16),
        ("0o", 8),
        ("0O", 8),
        ("0b", 2),
        ("0B", 2),
    ] {
        if let Some(digits) = body.strip_prefix(prefix) {
            return (radix, format!("{sign}{digits}"));
        }
    }
    (10, format!("{sign}{body}"))
}

pub(crate) fn parse_i64(s: &str) -> Result<i64, std::num::ParseIntError> {
    let (radix, digits) = split_radix(s);
    i64::from_str_radix(&digits, radix)
}

pub(crate) fn parse_u64(s: &str) -> Result<u64, std::num::ParseIntError> {
    let (radix, digits) = split_radix(s);
    u64::from_str_radix(&digits, radix)
}

fn signed(name: &'static str, kind: TargetKind, min: i64, max: i64) -> Hook {
    leaf(name, kind.clone(), move |s| {
        let value = parse_i64(s).map_err(|e| ConvertError::parse(s, &kind, e))?;
        if value < min || value > max {
            return Err(ConvertError::unhandled(s, &kind));
        }
        Ok(Decoded::Int(value))
    })
}

fn unsigned(name: &'static str, kind: TargetKind, max: u64) -> Hook {
    leaf(name, kind.clone(), move |s| {
        let value = parse_u64(s).map_err(|e| ConvertError::parse(s, &kind, e))?;
        if value > max {
            return Err(ConvertError::unhandled(s, &kind));
        }
        Ok(Decoded::Uint(value))
    })
}

/// String to `i8`.
#[must_use]
pub fn string_to_i8() -> Hook {
    signed("string_to_i8", TargetKind::I8, i64::from(i8::MIN), i64::from(i8::MAX))
}

/// String to `i16`.
#[must_use]
pub fn string_to_i16() -> Hook {
    signed("string_to_i16", TargetKind::I16, i64::from(i16::MIN), i64::from(i16::MAX))
}

/// String to `i32`.
#[must_use]
pub fn string_to_i32() -> Hook {
    signed("string_to_i32", TargetKind::I32, i64::from(i32::MIN), i64::from(i32::MAX))
}

/// String to `i64`.
#[must_use]
pub fn string_to_i64() -> Hook {
    signed("string_to_i64", TargetKind::I64, i64::MIN, i64::MAX)
}

/// String to `u8`, falling back to the character's code value when a
/// single-character string does not parse numerically.
#[must_use]
pub fn string_to_u8() -> Hook {
    leaf("string_to_u8", TargetKind::U8, |s| match parse_u64(s) {
        Ok(value) if value <= u64::from(u8::MAX) => Ok(Decoded::Uint(value)),
        Ok(_) => Err(ConvertError::unhandled(s, TargetKind::U8)),
        Err(source) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if u32::from(c) <= u32::from(u8::MAX) => {
                    Ok(Decoded::Uint(u64::from(u32::from(c))))
                }
                _ => Err(ConvertError::parse(s, TargetKind::U8, source)),
            }
        }
    })
}

/// String to `u16`.
#[must_use]
pub fn string_to_u16() -> Hook {
    unsigned("string_to_u16", TargetKind::U16, u64::from(u16::MAX))
}

/// String to `u32`.
#[must_use]
pub fn string_to_u32() -> Hook {
    unsigned("string_to_u32", TargetKind::U32, u64::from(u32::MAX))
}

/// String to `u64`.
#[must_use]
pub fn string_to_u64() -> Hook {
    unsigned("string_to_u64", TargetKind::U64, u64::MAX)
}

/// String to `f32`.
#[must_use]
pub fn string_to_f32() -> Hook {
    leaf("string_to_f32", TargetKind::F32, |s| {
        s.parse::<f32>()
            .map(|v| Decoded::Float(f64::from(v)))
            .map_err(|e| ConvertError::parse(s, TargetKind::F32, e))
    })
}

/// String to `f64`.
#[must_use]
pub fn string_to_f64() -> Hook {
    leaf("string_to_f64", TargetKind::F64, |s| {
        s.parse::<f64>()
            .map(Decoded::Float)
            .map_err(|e| ConvertError::parse(s, TargetKind::F64, e))
    })
}

/// String to `bool`, accepting `1/t/T/true/TRUE/True` and their negatives.
#[must_use]
pub fn string_to_bool() -> Hook {
    leaf("string_to_bool", TargetKind::Bool, |s| match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(Decoded::Bool(true)),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(Decoded::Bool(false)),
        _ => Err(ConvertError::unhandled(s, TargetKind::Bool)),
    })
}

/// String to a Unicode code point, falling back to the character itself
/// when a single-character string does not parse numerically.
#[must_use]
pub fn string_to_char() -> Hook {
    leaf("string_to_char", TargetKind::Char, |s| match parse_u64(s) {
        Ok(value) => u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .map(Decoded::Char)
            .ok_or_else(|| ConvertError::unhandled(s, TargetKind::Char)),
        Err(source) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Decoded::Char(c)),
                _ => Err(ConvertError::parse(s, TargetKind::Char, source)),
            }
        }
    })
}

/// String to a duration, e.g. `"1h"` or `"250ms"`.
#[must_use]
pub fn string_to_duration() -> Hook {
    leaf("string_to_duration", TargetKind::Duration, |s| {
        humantime::parse_duration(s)
            .map(Decoded::Duration)
            .map_err(|e| ConvertError::parse(s, TargetKind::Duration, e))
    })
}

/// A timestamp layout tried by [`string_to_timestamp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeLayout {
    /// RFC 2822, e.g. `Mon, 02 Jan 2006 15:04:05 +0000`.
    Rfc2822,
    /// RFC 3339, e.g. `2006-01-02T15:04:05Z`, with or without sub-second
    /// precision.
    Rfc3339,
    /// A custom `chrono` format string, interpreted as UTC. Date-only
    /// formats resolve to midnight.
    Format(&'static str),
}

/// String to a UTC timestamp under one fixed layout.
#[must_use]
pub fn string_to_timestamp(layout: TimeLayout) -> Hook {
    let name = match layout {
        TimeLayout::Rfc2822 => "string_to_timestamp_rfc2822".to_owned(),
        TimeLayout::Rfc3339 => "string_to_timestamp_rfc3339".to_owned(),
        TimeLayout::Format(fmt) => format!("string_to_timestamp[{fmt}]"),
    };
    leaf(name, TargetKind::Timestamp, move |s| {
        let parsed = match layout {
            TimeLayout::Rfc2822 => DateTime::parse_from_rfc2822(s).map(|t| t.with_timezone(&Utc)),
            TimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc)),
            TimeLayout::Format(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .or_else(|_| NaiveDate::parse_from_str(s, fmt).map(|d| d.and_time(NaiveTime::MIN)))
                .map(|n| n.and_utc()),
        };
        parsed
            .map(Decoded::Timestamp)
            .map_err(|e| ConvertError::parse(s, TargetKind::Timestamp, e))
    })
}

/// The standard ordered group of timestamp layouts: RFC 2822, RFC 850
/// without the zone suffix (`%A, %d-%b-%y %H:%M:%S`), RFC 3339,
/// `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d`. The first successful parse wins.
#[must_use]
pub fn timestamp_formats() -> Hook {
    or_group(vec![
        string_to_timestamp(TimeLayout::Rfc2822),
        string_to_timestamp(TimeLayout::Format("%A, %d-%b-%y %H:%M:%S")),
        string_to_timestamp(TimeLayout::Rfc3339),
        string_to_timestamp(TimeLayout::Format("%Y-%m-%d %H:%M:%S")),
        string_to_timestamp(TimeLayout::Format("%Y-%m-%d")),
    ])
}

/// String to an IP address literal.
#[must_use]
pub fn string_to_ip() -> Hook {
    leaf("string_to_ip", TargetKind::Ip, |s| {
        s.parse::<IpAddr>()
            .map(Decoded::Ip)
            .map_err(|e| ConvertError::parse(s, TargetKind::Ip, e))
    })
}

/// String to a socket address literal.
#[must_use]
pub fn string_to_socket_addr() -> Hook {
    leaf("string_to_socket_addr", TargetKind::Socket, |s| {
        s.parse::<SocketAddr>()
            .map(Decoded::Socket)
            .map_err(|e| ConvertError::parse(s, TargetKind::Socket, e))
    })
}

/// String to a delimiter-separated list. Splitting produces text elements;
/// [`HookChain::convert`] coerces them further when the list's inner kind
/// asks for it. An empty string yields an empty list.
#[must_use]
pub fn string_to_list(delimiter: impl Into<String>) -> Hook {
    let delimiter = delimiter.into();
    Hook::new("string_to_list", move |raw, target| {
        let RawValue::Text(text) = raw else {
            return Ok(Conversion::Unhandled);
        };
        let TargetKind::List(_) = target else {
            return Ok(Conversion::Unhandled);
        };
        if text.is_empty() {
            return Ok(Conversion::Converted(Decoded::Seq(Vec::new())));
        }
        let items = text
            .split(delimiter.as_str())
            .map(|part| Decoded::Text(part.to_owned()))
            .collect();
        Ok(Conversion::Converted(Decoded::Seq(items)))
    })
}

/// The composed string-to-basic-type hook: every integer width, both float
/// widths, booleans and single code points.
#[must_use]
pub fn basic_types() -> Hook {
    compose(vec![
        string_to_i8(),
        string_to_u8(),
        string_to_i16(),
        string_to_u16(),
        string_to_i32(),
        string_to_u32(),
        string_to_i64(),
        string_to_u64(),
        string_to_f32(),
        string_to_f64(),
        string_to_bool(),
        string_to_char(),
    ])
}

/// An ordered sequence of hooks, run first-match-wins.
#[derive(Debug)]
pub struct HookChain {
    hooks: Vec<Hook>,
}

impl HookChain {
    /// Build a chain from hooks.
    ///
    /// # Panics
    ///
    /// Panics when `hooks` is empty; at least one hook is required.
    #[must_use]
    pub fn new(hooks: Vec<Hook>) -> Self {
        assert!(!hooks.is_empty(), "at least one hook is required");
        Self { hooks }
    }

    /// The default chain: basic types, durations, the timestamp layout
    /// group, IP and socket addresses, and comma-separated lists.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            basic_types(),
            string_to_duration(),
            timestamp_formats(),
            string_to_ip(),
            string_to_socket_addr(),
            string_to_list(","),
        ])
    }

    /// Append a hook to the end of the chain.
    pub fn push(&mut self, hook: Hook) {
        self.hooks.push(hook);
    }

    /// Append every hook of `other`, preserving order.
    pub fn extend(&mut self, other: HookChain) {
        self.hooks.extend(other.hooks);
    }

    /// Convert a raw value towards a target kind.
    ///
    /// List targets coerce their elements through the chain recursively: a
    /// raw sequence converts element by element, and a raw literal is first
    /// split by the list hook.
    ///
    /// # Errors
    ///
    /// Returns the [`ConvertError`] of the first hook that recognised the
    /// pair but failed to parse the value.
    pub fn convert(
        &self,
        raw: &RawValue,
        target: &TargetKind,
    ) -> Result<Conversion, ConvertError> {
        if let TargetKind::List(inner) = target {
            let items = match raw {
                RawValue::Seq(parts) => {
                    let mut items = Vec::with_capacity(parts.len());
                    for part in parts {
                        items.push(self.convert_element(part, inner)?);
                    }
                    items
                }
                RawValue::Text(_) => match self.run(raw, target)? {
                    Conversion::Converted(Decoded::Seq(split)) => {
                        let mut items = Vec::with_capacity(split.len());
                        for item in split {
                            match item {
                                Decoded::Text(s) => {
                                    items.push(self.convert_element(&RawValue::Text(s), inner)?);
                                }
                                already_typed => items.push(already_typed),
                            }
                        }
                        items
                    }
                    other => return Ok(other),
                },
                RawValue::Map(_) => return Ok(Conversion::Unhandled),
            };
            return Ok(Conversion::Converted(Decoded::Seq(items)));
        }
        self.run(raw, target)
    }

    fn convert_element(
        &self,
        part: &RawValue,
        inner: &TargetKind,
    ) -> Result<Decoded, ConvertError> {
        match self.convert(part, inner)? {
            Conversion::Converted(value) => Ok(value),
            Conversion::Unhandled => match (part, inner) {
                (RawValue::Text(s), TargetKind::Text) => Ok(Decoded::Text(s.clone())),
                (RawValue::Text(s), _) => Err(ConvertError::unhandled(s.clone(), inner)),
                _ => Err(ConvertError::unhandled("<nested value>", inner)),
            },
        }
    }

    fn run(&self, raw: &RawValue, target: &TargetKind) -> Result<Conversion, ConvertError> {
        for hook in &self.hooks {
            if let Conversion::Converted(value) = hook.run(raw, target)? {
                return Ok(Conversion::Converted(value));
            }
        }
        Ok(Conversion::Unhandled)
    }
}
