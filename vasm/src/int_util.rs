//! Immediate literal parsing: decimal, `0x` hex, or (if a dot is present)
//! an IEEE-754 float reinterpreted as its 32-bit bit pattern, per
//! `spec.md` §4.4. Kept as its own module the way the teacher splits
//! numeric-literal parsing out of `instructions.rs`/`data.rs`, though the
//! generic multi-width machinery (`GetUnsigned`/`NumCastTrunc`) the
//! teacher needed for `i8`/`i16`/`i32` data widths has no counterpart here
//! — Milo832 only ever parses a single 32-bit immediate.

use crate::parser::Rule;
use pest::iterators::Pair;

/// Parses an `immediate` pair (`dec_lit | hex_lit | float_lit`) into the
/// raw 32-bit pattern that belongs in the low bits of an instruction word:
/// integers are parsed as signed decimal/hex, floats are reinterpreted bit
/// for bit via `f32::to_bits`.
pub fn parse_immediate(pair: Pair<Rule>) -> Result<i32, String> {
    let inner = pair.into_inner().next().unwrap();
    let text = inner.as_str();
    match inner.as_rule() {
        Rule::dec_lit => parse_dec(text),
        Rule::hex_lit => parse_hex(text),
        Rule::float_lit => text
            .parse::<f32>()
            .map(|f| f.to_bits() as i32)
            .map_err(|e| format!("Malformed immediate \"{}\": {}", text, e)),
        _ => unreachable!(),
    }
}

/// Parses a decimal literal as a full 32-bit word, the same way
/// [`parse_hex`] does: the magnitude is parsed as `u32` (so codegen's raw
/// bit-pattern constants like `4294967295` round-trip) and negated last,
/// rather than going through `i32::parse` directly and overflowing on
/// anything with bit 31 set.
fn parse_dec(text: &str) -> Result<i32, String> {
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = digits
        .parse::<u32>()
        .map_err(|e| format!("Malformed immediate \"{}\": {}", text, e))?;
    Ok(if neg { (value as i32).wrapping_neg() } else { value as i32 })
}

fn parse_hex(text: &str) -> Result<i32, String> {
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| format!("Malformed immediate \"{}\": {}", text, e))?;
    Ok(if neg {
        (value as i32).wrapping_neg()
    } else {
        value as i32
    })
}

/// Parses a `register` pair (`r[0-9]+`) into its numeric id, rejecting ids
/// outside `0..63` per `spec.md` §4.4.
pub fn parse_register(pair: Pair<Rule>) -> Result<u8, String> {
    let text = pair.as_str();
    let digits = &text[1..];
    let value: u32 = digits
        .parse()
        .map_err(|e| format!("Malformed register \"{}\": {}", text, e))?;
    if value > 63 {
        Err(format!("Register out of range 0..63: \"{}\"", text))
    } else {
        Ok(value as u8)
    }
}
