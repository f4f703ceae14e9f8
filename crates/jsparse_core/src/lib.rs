//! jsparse_core: Core utilities shared by the jsparse crates.
//!
//! Provides text ranges and line lookup, name interning, and the hash
//! collections used by binding analysis.

pub mod collections;
pub mod intern;
pub mod text;

pub use intern::{Atom, AtomTable};
pub use text::{LineMap, TextRange, TextSpan};
