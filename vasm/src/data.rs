//! `.data ADDR, VALUE` directive processing. Places one 32-bit word at a
//! byte address in the VM's memory image at load time, per `spec.md`
//! §4.4 — a single always-word-sized form, unlike the teacher's
//! `.block`/`.byte`/`.half`/`.word` multi-width data section, since
//! Milo832's constant pool only ever holds 32-bit register-sized values
//! (interned float bit patterns, per `src/lang/codegen.rs`).

use crate::error::{AssembleError, Result};
use crate::int_util::parse_immediate;
use crate::parser::Rule;
use pest::iterators::Pair;

/// Parses a `data_directive` pair's two operands into `(address, value)`.
/// `address` must not be negative (a byte offset); `value` is the raw
/// 32-bit pattern to store, same convention as an immediate operand.
pub fn process_data_directive(pair: Pair<Rule>, line: u32) -> Result<(u32, u32)> {
    let mut operands = pair.into_inner();
    let addr_operand = operands.next().unwrap().into_inner().next().unwrap();
    let value_operand = operands.next().unwrap().into_inner().next().unwrap();

    let addr = parse_immediate(addr_operand).map_err(|m| AssembleError::new(line, m))?;
    if addr < 0 {
        return Err(AssembleError::new(line, "Data address must not be negative"));
    }
    let value = parse_immediate(value_operand).map_err(|m| AssembleError::new(line, m))?;
    Ok((addr as u32, value as u32))
}
