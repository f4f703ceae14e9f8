//! jsparse_scanner: on-demand tokenizer for JavaScript source text.
//!
//! The scanner produces one token per call and leaves every context-dependent
//! decision to the parser:
//! - `/` and `/=` are rescanned as regular expressions in operand position
//! - `}` is rescanned as a template continuation after a substitution
//! - contextual keywords are plain identifiers
//! - legacy octal forms are flagged, not rejected

pub mod char_codes;
pub mod regexp;
mod scanner;
mod token;

pub use scanner::{Scanner, ScannerState, TemplateEscapeError};
pub use token::TokenInfo;
