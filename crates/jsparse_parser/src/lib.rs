//! jsparse_parser: Recursive descent parser for JavaScript.
//!
//! Pulls tokens from the scanner on demand and builds an arena-allocated
//! AST, or stops at the first syntax error. Early errors (duplicate
//! bindings, strict mode restrictions, invalid targets, label and private
//! name resolution) are checked during the same pass.
//!
//! ```ignore
//! let arena = bumpalo::Bump::new();
//! let program = jsparse_parser::parse(&arena, "let x = 1;", &ParseOptions::default())?;
//! ```

mod class;
mod context;
mod expression;
mod function;
mod module;
mod parser;
mod pattern;
mod precedence;
mod scope;
mod statement;
mod utilities;

use bumpalo::Bump;
use jsparse_ast::node::Program;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::{messages, SyntaxError};
use log::debug;

pub use jsparse_options::{CompatPolicy, LexicalGoal, ParseOptions};
pub use parser::Parser;

/// Parse `source` under `options`.
pub fn parse<'a>(
    arena: &'a Bump,
    source: &'a str,
    options: &ParseOptions,
) -> Result<Program<'a>, SyntaxError> {
    debug!(
        "parsing {} bytes as {} (goal: {}, strict: {}, compat: {})",
        source.len(),
        if options.module { "module" } else { "script" },
        options.lexical_goal.as_str(),
        options.starts_strict(),
        options.compat_mode
    );
    let result = Parser::new(arena, source, options).parse_program();
    match &result {
        Ok(program) => debug!(
            "parsed {} top-level statements, strict: {}",
            program.body.len(),
            program.strict
        ),
        Err(error) => debug!("parse failed: {} [{}]", error, error.kind()),
    }
    result
}

/// Parse raw bytes. Input that is not valid UTF-8 is an `InvalidEncoding`
/// error at the first invalid byte.
pub fn parse_bytes<'a>(
    arena: &'a Bump,
    bytes: &'a [u8],
    options: &ParseOptions,
) -> Result<Program<'a>, SyntaxError> {
    match simdutf8::compat::from_utf8(bytes) {
        Ok(source) => parse(arena, source, options),
        Err(error) => {
            let valid = error.valid_up_to();
            let prefix = simdutf8::basic::from_utf8(&bytes[..valid]).unwrap_or_default();
            let range = TextRange::new(valid as u32, valid as u32 + 1);
            Err(SyntaxError::new(prefix, range, &messages::INVALID_ENCODING, &[]))
        }
    }
}
