//! Generates [`Rule`] and [`MiloParser`] from `milo832.pest`. Split into its
//! own module the way the teacher keeps `Rule`/`VASMParser` behind a
//! `parser` module rather than deriving straight in `lib.rs`.

#[derive(pest_derive::Parser)]
#[grammar = "milo832.pest"]
pub struct MiloParser;
