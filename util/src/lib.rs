//! The one piece of shared plumbing every crate in the workspace agrees
//! on: which byte order instruction words, register files, and container
//! files are read and written in.

pub type Endian = byteorder::LittleEndian;
