//! A Memory Array Redcode Simulator (MARS) for the ICWS-88/94 dialect of
//! Redcode: an assembler, a circular memory core, and the execution engine
//! that steps Warriors through it one instruction at a time.
//!
//! The crate exposes three layers, from the outside in:
//!
//! - [`load_file`] — the instruction/warrior data model.
//! - [`parser`] — text source to [`load_file::Warrior`].
//! - [`core`] — the circular [`core::Core`] memory, its scheduler, and the
//!   single-step execution engine.
//!
//! A renderer, CLI argument handling, and file globbing are intentionally
//! left to a host (see `src/bin/redmars.rs` for a minimal one); this crate's
//! job ends at `Core::cycle` and a handful of read-only accessors.

pub mod core;
pub mod load_file;
pub mod parser;
