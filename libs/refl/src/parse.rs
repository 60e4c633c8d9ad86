//! Literal parsers used by string assignment.
//!
//! Integers accept an optional sign, a radix prefix (`0x`, `0o`, `0b`, or a
//! leading `0` for octal) and underscores between digits. Floats accept
//! decimal and hexadecimal (`0x1.8p3`) literals plus `inf`/`infinity`/`nan`.
//! Durations are sequences of `<decimal><unit>` pairs such as `1h30m` or
//! `1.5s`.

use std::fmt::Write as _;
use std::time::Duration;

use crate::error::ParseFailure;

/// Parse a signed integer that must fit in `bits` bits.
pub fn parse_int(s: &str, bits: u32) -> Result<i64, ParseFailure> {
    let (neg, body) = split_sign(s);
    let magnitude = parse_uint(body, 64)?;

    let cutoff = 1u64 << (bits.clamp(1, 64) - 1);
    if !neg && magnitude >= cutoff {
        return Err(ParseFailure::Range);
    }
    if neg && magnitude > cutoff {
        return Err(ParseFailure::Range);
    }
    Ok(if neg {
        (magnitude as i64).wrapping_neg()
    } else {
        magnitude as i64
    })
}

/// Parse an unsigned integer that must fit in `bits` bits.
pub fn parse_uint(s: &str, bits: u32) -> Result<u64, ParseFailure> {
    if s.is_empty() {
        return Err(ParseFailure::Syntax);
    }
    if s.contains('_') && !underscores_ok(s) {
        return Err(ParseFailure::Syntax);
    }

    let (base, digits) = split_radix(s);
    let mut n: u64 = 0;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(base).ok_or(ParseFailure::Syntax)? as u64;
        n = n
            .checked_mul(base as u64)
            .and_then(|n| n.checked_add(d))
            .ok_or(ParseFailure::Range)?;
    }

    let max = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
    if n > max {
        return Err(ParseFailure::Range);
    }
    Ok(n)
}

/// Parse a float at the given width (32 or 64). A finite literal that
/// overflows the width is a range error.
pub fn parse_float(s: &str, bits: u32) -> Result<f64, ParseFailure> {
    if s.is_empty() {
        return Err(ParseFailure::Syntax);
    }
    let (neg, body) = split_sign(s);

    let lower = body.to_ascii_lowercase();
    if matches!(lower.as_str(), "inf" | "infinity") {
        return Ok(if neg { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if lower == "nan" {
        return Ok(f64::NAN);
    }

    if s.contains('_') && !underscores_ok(s) {
        return Err(ParseFailure::Syntax);
    }

    let value = if lower.starts_with("0x") {
        let magnitude = parse_hex_float(&body[2..])?;
        if neg { -magnitude } else { magnitude }
    } else {
        // Only the exponent marker may be alphabetic here.
        let cleaned: String = s.chars().filter(|&c| c != '_').collect();
        if cleaned.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
            return Err(ParseFailure::Syntax);
        }
        if bits == 32 {
            cleaned.parse::<f32>().map_err(|_| ParseFailure::Syntax)? as f64
        } else {
            cleaned.parse::<f64>().map_err(|_| ParseFailure::Syntax)?
        }
    };

    let overflowed = if bits == 32 {
        (value as f32).is_infinite()
    } else {
        value.is_infinite()
    };
    if overflowed {
        return Err(ParseFailure::Range);
    }
    Ok(value)
}

/// Parse one of `1 t T TRUE true True 0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, ParseFailure> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseFailure::Syntax),
    }
}

/// Parse a duration literal such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`. A lone
/// `0` needs no unit. Negative non-zero durations are rejected since
/// `Duration` is unsigned.
pub fn parse_duration(s: &str) -> Result<Duration, ParseFailure> {
    let (neg, mut rest) = split_sign(s);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(ParseFailure::Syntax);
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(ParseFailure::Syntax);
        }

        let (whole, after_whole) = leading_int(rest)?;
        let has_whole = after_whole.len() != rest.len();
        rest = after_whole;

        let mut frac = 0u64;
        let mut scale = 1f64;
        let mut has_frac = false;
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (f, sc, after_frac) = leading_fraction(after_dot);
            has_frac = after_frac.len() != after_dot.len();
            frac = f;
            scale = sc;
            rest = after_frac;
        }
        if !has_whole && !has_frac {
            return Err(ParseFailure::Syntax);
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_end == 0 {
            return Err(ParseFailure::MissingUnit);
        }
        let unit_name = &rest[..unit_end];
        rest = &rest[unit_end..];
        let unit = unit_nanos(unit_name).ok_or_else(|| ParseFailure::UnknownUnit(unit_name.to_string()))?;

        let mut v = whole.checked_mul(unit).ok_or(ParseFailure::Range)?;
        if frac > 0 {
            let extra = (frac as f64 * (unit as f64 / scale)) as u64;
            v = v.checked_add(extra).ok_or(ParseFailure::Range)?;
        }
        total = total.checked_add(v).ok_or(ParseFailure::Range)?;
    }

    if neg && total > 0 {
        return Err(ParseFailure::Negative);
    }
    Ok(Duration::from_nanos(total))
}

/// Render a duration the way [`parse_duration`] reads it back, e.g.
/// `1h30m0s`, `1.5s`, `250ms`, `0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fixed_point(nanos, 3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", fixed_point(nanos, 6));
    }

    let hours = nanos / 3_600_000_000_000;
    let minutes = (nanos / 60_000_000_000) % 60;
    let seconds = nanos % 60_000_000_000;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h{minutes}m");
    } else if minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    out.push_str(&fixed_point(seconds, 9));
    out.push('s');
    out
}

fn fixed_point(value: u128, scale: u32) -> String {
    let div = 10u128.pow(scale);
    let (whole, frac) = (value / div, value % div);
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:0width$}", width = scale as usize);
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit {
        "ns" => 1,
        "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    })
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn split_radix(s: &str) -> (u32, &str) {
    let b = s.as_bytes();
    if b[0] != b'0' {
        return (10, s);
    }
    if b.len() >= 3 {
        match b[1].to_ascii_lowercase() {
            b'x' => return (16, &s[2..]),
            b'o' => return (8, &s[2..]),
            b'b' => return (2, &s[2..]),
            _ => {}
        }
    }
    (8, &s[1..])
}

/// Underscores may only separate digits, or follow a radix prefix.
fn underscores_ok(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if matches!(b.first(), Some(b'-' | b'+')) {
        i = 1;
    }

    // '^' start, '0' digit or prefix, '_' underscore, '!' anything else
    let mut saw = b'^';
    let mut hex = false;
    if b.len() >= i + 2 && b[i] == b'0' && matches!(b[i + 1].to_ascii_lowercase(), b'b' | b'o' | b'x') {
        hex = b[i + 1].to_ascii_lowercase() == b'x';
        i += 2;
        saw = b'0';
    }

    for &c in &b[i..] {
        if c.is_ascii_digit() || (hex && c.is_ascii_hexdigit()) {
            saw = b'0';
            continue;
        }
        if c == b'_' {
            if saw != b'0' {
                return false;
            }
            saw = b'_';
            continue;
        }
        if saw == b'_' {
            return false;
        }
        saw = b'!';
    }
    saw != b'_'
}

fn parse_hex_float(s: &str) -> Result<f64, ParseFailure> {
    let (mantissa, exponent) = s
        .split_once(|c| c == 'p' || c == 'P')
        .ok_or(ParseFailure::Syntax)?;

    let mut value = 0f64;
    let mut shift: i64 = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in mantissa.chars() {
        match c {
            '_' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => {
                let d = c.to_digit(16).ok_or(ParseFailure::Syntax)?;
                value = value * 16.0 + d as f64;
                if seen_dot {
                    shift -= 4;
                }
                seen_digit = true;
            }
        }
    }
    if !seen_digit {
        return Err(ParseFailure::Syntax);
    }

    let (exp_neg, exp_digits) = split_sign(exponent);
    if exp_digits.is_empty() {
        return Err(ParseFailure::Syntax);
    }
    let mut exp: i64 = 0;
    for c in exp_digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(10).ok_or(ParseFailure::Syntax)? as i64;
        exp = exp.saturating_mul(10).saturating_add(d);
    }
    if exp_neg {
        exp = -exp;
    }

    let total = (exp + shift).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    Ok(value * 2f64.powi(total))
}

/// Consume leading decimal digits.
fn leading_int(s: &str) -> Result<(u64, &str), ParseFailure> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut n: u64 = 0;
    for b in s[..end].bytes() {
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_add((b - b'0') as u64))
            .ok_or(ParseFailure::Range)?;
    }
    Ok((n, &s[end..]))
}

/// Consume leading fraction digits; digits past `u64` precision are dropped.
fn leading_fraction(s: &str) -> (u64, f64, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let mut x: u64 = 0;
    let mut scale = 1f64;
    let mut overflow = false;
    for b in s[..end].bytes() {
        if overflow {
            continue;
        }
        match x.checked_mul(10).and_then(|y| y.checked_add((b - b'0') as u64)) {
            Some(y) => {
                x = y;
                scale *= 10.0;
            }
            None => overflow = true,
        }
    }
    (x, scale, &s[end..])
}
