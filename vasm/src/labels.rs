//! The label table: `label name -> code index`. Kept as its own module the
//! way the teacher separates label bookkeeping from instruction encoding,
//! though Milo832 only has one flat instruction-index namespace (no
//! separate data-label map, since `.data` directives don't advance the
//! code index — see `spec.md` §4.4).

use std::collections::HashMap;

pub type LabelMap = HashMap<String, u32>;

use crate::error::{AssembleError, Result};

/// Declares `name` at `index`, capped at `max_labels` per `spec.md` §4.4.
/// Redeclaration overwrites, matching the original's "last definition
/// wins" scan (labels are supposed to be unique by construction; this just
/// avoids a spurious hard error if a shader emits a duplicate by mistake).
pub fn declare(labels: &mut LabelMap, name: &str, index: u32, line: u32, max_labels: usize) -> Result<()> {
    if !labels.contains_key(name) && labels.len() >= max_labels {
        return Err(AssembleError::new(
            line,
            format!("Too many labels (max {})", max_labels),
        ));
    }
    labels.insert(name.to_string(), index);
    Ok(())
}
