//! jsparse_ast: token kinds, scanner flags and the syntax tree.
//!
//! The tree is allocated in a bumpalo arena owned by the caller and can be
//! serialized with serde.

pub mod accessors;
pub mod node;
pub mod operators;
pub mod syntax_kind;
pub mod types;

// Re-export key types
pub use node::*;
pub use operators::*;
pub use syntax_kind::SyntaxKind;
pub use types::*;
