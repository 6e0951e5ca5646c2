//! Canonical block encoding used for hashing.
//!
//! Every node must produce the same bytes for the same block, so the layout
//! is fixed here rather than left to a serializer's defaults. The format is
//! sorted-key JSON with `", "` / `": "` separators, ASCII-only strings, and
//! shortest round-trip floats that always carry a `.0` or an exponent
//! (positional for decimal exponents in `-4..16`, `1e-05` style otherwise).

use crate::{Block, Transaction};
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// SHA-256 of the canonical encoding, lowercase hex.
pub fn hash_block(block: &Block) -> String {
    let digest = Sha256::digest(canonical_json(block).as_bytes());
    hex::encode(digest)
}

/// Keys are emitted in sorted order:
/// `index, previous_hash, proof, timestamp, transactions`.
pub fn canonical_json(block: &Block) -> String {
    let mut out = String::with_capacity(128 + block.transactions.len() * 64);
    out.push_str("{\"index\": ");
    write_int(&mut out, block.index);
    out.push_str(", \"previous_hash\": ");
    write_str(&mut out, &block.previous_hash);
    out.push_str(", \"proof\": ");
    write_int(&mut out, block.proof);
    out.push_str(", \"timestamp\": ");
    write_float(&mut out, block.timestamp);
    out.push_str(", \"transactions\": [");
    for (i, tx) in block.transactions.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_transaction(&mut out, tx);
    }
    out.push_str("]}");
    out
}

// amount, recipient, sender
fn write_transaction(out: &mut String, tx: &Transaction) {
    out.push_str("{\"amount\": ");
    write_float(out, tx.amount);
    out.push_str(", \"recipient\": ");
    write_str(out, &tx.recipient);
    out.push_str(", \"sender\": ");
    write_str(out, &tx.sender);
    out.push('}');
}

fn write_int(out: &mut String, value: u64) {
    let _ = write!(out, "{value}");
}

/// Shortest round-trip digits, laid out like Python's `float.__repr__`.
///
/// ryu supplies the digits; exact midpoints round half-to-even, which
/// `{:?}` does not guarantee. The layout is redone here because ryu switches
/// to scientific notation at different exponents: positional for decimal
/// exponents in `-4..16` (always with a fractional part), otherwise
/// `d.ddde+XX` with a signed, two-digit-minimum exponent.
fn write_float(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("NaN");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    let mut buffer = ryu::Buffer::new();
    let formatted = buffer.format_finite(value);
    let (negative, formatted) = match formatted.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, formatted),
    };
    if negative {
        out.push('-');
    }

    let (mantissa, exp) = match formatted.split_once(['e', 'E']) {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().unwrap_or(0)),
        None => (formatted, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = format!("{int_part}{frac_part}");
    let leading = all_digits.len() - all_digits.trim_start_matches('0').len();
    let digits = all_digits.trim_matches('0');
    if digits.is_empty() {
        out.push_str("0.0");
        return;
    }
    // Position of the decimal point relative to the first significant digit.
    let point = int_part.len() as i32 + exp - leading as i32;
    let sci_exp = point - 1;

    if (-4..16).contains(&sci_exp) {
        if point <= 0 {
            out.push_str("0.");
            out.extend(std::iter::repeat('0').take((-point) as usize));
            out.push_str(digits);
        } else if point as usize >= digits.len() {
            out.push_str(digits);
            out.extend(std::iter::repeat('0').take(point as usize - digits.len()));
            out.push_str(".0");
        } else {
            let (whole, frac) = digits.split_at(point as usize);
            let _ = write!(out, "{whole}.{frac}");
        }
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            let _ = write!(out, ".{rest}");
        }
        let sign = if sci_exp < 0 { '-' } else { '+' };
        let _ = write!(out, "e{sign}{:02}", sci_exp.unsigned_abs());
    }
}

fn write_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}
