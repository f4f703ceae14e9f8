//! The parser core: state, token management and the program driver.
//!
//! This is a recursive descent parser. It pulls tokens from the scanner on
//! demand, builds an arena-allocated tree and stops at the first error. The
//! grammar productions live in sibling modules, each adding an
//! `impl<'a> Parser<'a>` block:
//!
//! - `statement.rs`: statements, declarations and directive prologues
//! - `expression.rs`: expressions and the arrow cover grammar
//! - `pattern.rs`: binding patterns and expression-to-pattern conversion
//! - `function.rs`: functions, parameters and arrow bodies
//! - `class.rs`: classes and private names
//! - `module.rs`: import and export declarations

use bumpalo::Bump;
use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::collections::{FxHashSet, FxIndexMap};
use jsparse_core::intern::{Atom, AtomTable};
use jsparse_core::text::TextRange;
use jsparse_diagnostics::{messages, DiagnosticMessage, SyntaxError};
use jsparse_options::{CompatPolicy, LexicalGoal, ParseOptions};
use jsparse_scanner::{Scanner, TokenInfo};

use crate::class::ClassScope;
use crate::context::{ContextFlags, Label};
use crate::scope::{BindingKind, PendingCheck, ScopeFlags, ScopeStack};
use crate::utilities::*;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 200;

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// An expression shape that is only valid if it later becomes a pattern,
/// such as the shorthand initializer in `({ a = 1 })`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CoverError {
    pub range: TextRange,
    pub message: &'static DiagnosticMessage,
}

/// Where `yield` and `await` were seen inside a construct that may still
/// turn into arrow parameters.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct YieldAwaitPositions {
    pub yield_expr: Option<TextRange>,
    pub await_expr: Option<TextRange>,
    /// `await` used as an identifier.
    pub await_ident: Option<TextRange>,
}

impl YieldAwaitPositions {
    fn merge(self, inner: YieldAwaitPositions) -> YieldAwaitPositions {
        YieldAwaitPositions {
            yield_expr: self.yield_expr.or(inner.yield_expr),
            await_expr: self.await_expr.or(inner.await_expr),
            await_ident: self.await_ident.or(inner.await_ident),
        }
    }
}

/// The parser produces a [`Program`] from JavaScript source text.
pub struct Parser<'a> {
    pub(crate) arena: &'a Bump,
    pub(crate) source: &'a str,
    pub(crate) scanner: Scanner<'a>,
    pub(crate) options: ParseOptions,
    pub(crate) policy: CompatPolicy,
    pub(crate) context: ContextFlags,
    pub(crate) atoms: AtomTable,
    pub(crate) scopes: ScopeStack<'a>,
    pub(crate) labels: Vec<Label<'a>>,
    pub(crate) cover_errors: Vec<CoverError>,
    /// Start offsets of array and object literals whose rest element is
    /// followed by a trailing comma.
    pub(crate) rest_trailing_commas: FxHashSet<u32>,
    /// Start offsets of identifiers that were wrapped in parentheses when
    /// converted to an assignment target.
    pub(crate) parenthesized_targets: FxHashSet<u32>,
    pub(crate) yield_await: YieldAwaitPositions,
    pub(crate) class_scopes: Vec<ClassScope>,
    /// Exported names, in declaration order.
    pub(crate) exports: FxIndexMap<&'a str, TextRange>,
    /// Local names referenced by `export { ... }` without `from`.
    pub(crate) export_references: Vec<Identifier<'a>>,
    /// End offset of the last consumed token. Nodes end here.
    pub(crate) prev_token_end: u32,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    pub(crate) recursion_depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, source: &'a str, options: &ParseOptions) -> Self {
        let policy = CompatPolicy::from_options(options);
        let mut scanner = Scanner::new(source);
        scanner.set_html_comments(policy.html_comments);

        let mut context = ContextFlags::NONE;
        if options.starts_strict() {
            context |= ContextFlags::STRICT;
        }
        if options.module {
            context |= ContextFlags::MODULE | ContextFlags::AWAIT;
        }

        Self {
            arena,
            source,
            scanner,
            options: *options,
            policy,
            context,
            atoms: AtomTable::new(),
            scopes: ScopeStack::new(policy.catch_parameter_redeclaration),
            labels: Vec::new(),
            cover_errors: Vec::new(),
            rest_trailing_commas: FxHashSet::default(),
            parenthesized_targets: FxHashSet::default(),
            yield_await: YieldAwaitPositions::default(),
            class_scopes: Vec::new(),
            exports: FxIndexMap::default(),
            export_references: Vec::new(),
            prev_token_end: 0,
            recursion_depth: 0,
        }
    }

    /// Parse the whole input.
    pub fn parse_program(mut self) -> Result<Program<'a>, SyntaxError> {
        let hashbang = self.scanner.skip_hashbang();
        self.next_token()?;

        let mut top = ScopeFlags::TOP;
        if self.options.module {
            top |= ScopeFlags::MODULE;
        }
        self.scopes.enter(top);

        let body = match self.options.lexical_goal {
            LexicalGoal::Program => {
                self.parse_directives_and_statements(SyntaxKind::EndOfFileToken, true)?
            }
            LexicalGoal::Expression => {
                let start = self.token_pos();
                let expression = self.parse_expression()?;
                if self.current_token() != SyntaxKind::EndOfFileToken {
                    return Err(self.unexpected());
                }
                let statement = Statement::Expression(ExpressionStatement {
                    range: self.range_from(start),
                    expression: self.arena.alloc(expression),
                    directive: None,
                });
                self.alloc_vec(vec![statement])
            }
        };

        if self.options.module {
            self.check_export_references()?;
        }
        let hoisted = self.scopes.exit();
        let annex_b_functions = self.resolve_atoms(hoisted);

        Ok(Program {
            range: TextRange::new(0, self.source.len() as u32),
            source_type: if self.options.module { SourceType::Module } else { SourceType::Script },
            strict: self.context.is_strict(),
            hashbang,
            body,
            annex_b_functions,
        })
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    pub(crate) fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    #[inline]
    pub(crate) fn token_range(&self) -> TextRange {
        self.scanner.token_range()
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    #[inline]
    pub(crate) fn is_contextual(&self, name: &str) -> bool {
        self.scanner.is_contextual(name)
    }

    pub(crate) fn next_token(&mut self) -> PResult<SyntaxKind> {
        self.prev_token_end = self.token_end();
        self.scanner.scan()
    }

    /// The token after the current one. A scan error in the lookahead
    /// shows up as `Unknown`; it is reported when the token is consumed.
    pub(crate) fn peek_token(&mut self) -> TokenInfo {
        self.scanner.look_ahead(|scanner| match scanner.scan() {
            Ok(_) => scanner.token_info(),
            Err(_) => TokenInfo {
                kind: SyntaxKind::Unknown,
                range: scanner.token_range(),
                value: String::new(),
                flags: TokenFlags::NONE,
            },
        })
    }

    pub(crate) fn expect_token(&mut self, kind: SyntaxKind) -> PResult<TextRange> {
        if self.current_token() == kind {
            let range = self.token_range();
            self.next_token()?;
            Ok(range)
        } else if self.current_token() == SyntaxKind::EndOfFileToken {
            Err(self.error_here(&messages::UNEXPECTED_END, &[]))
        } else {
            Err(self.error_here(&messages::EXPECTED_TOKEN, &[kind.describe()]))
        }
    }

    pub(crate) fn optional_token(&mut self, kind: SyntaxKind) -> PResult<bool> {
        if self.current_token() == kind {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Whether a semicolon may be inserted before the current token.
    pub(crate) fn can_insert_semicolon(&self) -> bool {
        matches!(self.current_token(), SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken)
            || self.has_preceding_line_break()
    }

    pub(crate) fn parse_expected_semicolon(&mut self) -> PResult<()> {
        if self.optional_token(SyntaxKind::SemicolonToken)? || self.can_insert_semicolon() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    #[inline]
    pub(crate) fn range_from(&self, start: u32) -> TextRange {
        TextRange::new(start, self.prev_token_end.max(start))
    }

    #[inline]
    pub(crate) fn alloc_vec<T>(&self, items: Vec<T>) -> &'a [T] {
        self.arena.alloc_slice_fill_iter(items)
    }

    // ========================================================================
    // Errors
    // ========================================================================

    pub(crate) fn error_at(
        &self,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> SyntaxError {
        SyntaxError::new(self.source, range, message, args)
    }

    pub(crate) fn error_here(&self, message: &DiagnosticMessage, args: &[&str]) -> SyntaxError {
        self.error_at(self.token_range(), message, args)
    }

    /// An "unexpected token" error at the current token.
    pub(crate) fn unexpected(&self) -> SyntaxError {
        if self.current_token() == SyntaxKind::EndOfFileToken {
            return self.error_here(&messages::UNEXPECTED_END, &[]);
        }
        let text = self.scanner.token_text();
        let text = if text.is_empty() { self.current_token().describe() } else { text };
        self.error_here(&messages::UNEXPECTED_TOKEN, &[text])
    }

    // ========================================================================
    // Context
    // ========================================================================

    #[inline]
    pub(crate) fn in_context(&self, flags: ContextFlags) -> bool {
        self.context.intersects(flags)
    }

    #[inline]
    pub(crate) fn is_strict(&self) -> bool {
        self.context.is_strict()
    }

    /// Run `f` with `context` in effect and restore the previous context.
    pub(crate) fn with_context<T>(
        &mut self,
        context: ContextFlags,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let saved = self.context;
        self.context = context;
        let result = f(self);
        self.context = saved;
        result
    }

    /// Run `f` with `in` allowed as a binary operator.
    pub(crate) fn allow_in<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let context = self.context - ContextFlags::DISALLOW_IN;
        self.with_context(context, f)
    }

    pub(crate) fn enter_recursion(&mut self) -> PResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(self.error_here(&messages::NESTING_TOO_DEEP, &[]));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn leave_recursion(&mut self) {
        self.recursion_depth -= 1;
    }

    /// Reset the `yield`/`await` positions for a nested construct and
    /// return the outer ones.
    pub(crate) fn take_yield_await(&mut self) -> YieldAwaitPositions {
        std::mem::take(&mut self.yield_await)
    }

    /// Put the outer positions back, keeping what the nested construct saw.
    pub(crate) fn merge_yield_await(&mut self, outer: YieldAwaitPositions) {
        self.yield_await = outer.merge(self.yield_await);
    }

    /// Check that every cover-only shape recorded since `mark` was
    /// consumed by a pattern conversion.
    pub(crate) fn check_cover_errors(&mut self, mark: usize) -> PResult<()> {
        if let Some(error) = self.cover_errors.get(mark) {
            return Err(self.error_at(error.range, error.message, &[]));
        }
        Ok(())
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    /// The decoded value of the current identifier or string token, borrowed
    /// from the source when it contains no escapes.
    pub(crate) fn token_name(&self) -> &'a str {
        match self.scanner.source_value() {
            Some(value) => value,
            None => self.arena.alloc_str(self.scanner.token_value()),
        }
    }

    #[inline]
    pub(crate) fn intern(&mut self, name: &str) -> Atom {
        self.atoms.intern(name)
    }

    pub(crate) fn resolve_atoms(&self, atoms: Vec<Atom>) -> &'a [&'a str] {
        let names: Vec<&'a str> = atoms
            .into_iter()
            .map(|atom| &*self.arena.alloc_str(self.atoms.resolve(atom)))
            .collect();
        self.alloc_vec(names)
    }

    /// Reject an identifier that is reserved in the current context.
    pub(crate) fn check_unreserved(
        &self,
        name: &str,
        range: TextRange,
        escaped: bool,
    ) -> PResult<()> {
        if name == "yield" && self.in_context(ContextFlags::YIELD) {
            return Err(self.error_at(range, &messages::UNEXPECTED_RESERVED_WORD, &[name]));
        }
        if name == "await"
            && self.in_context(
                ContextFlags::AWAIT | ContextFlags::MODULE | ContextFlags::STATIC_BLOCK,
            )
        {
            return Err(self.error_at(range, &messages::UNEXPECTED_RESERVED_WORD, &[name]));
        }
        if name == "arguments"
            && self.in_context(ContextFlags::CLASS_FIELD_INIT | ContextFlags::STATIC_BLOCK)
        {
            return Err(self.error_at(range, &messages::ARGUMENTS_IN_CLASS_INIT, &[]));
        }
        if is_reserved_word(name) {
            let message = if escaped {
                &messages::ESCAPED_KEYWORD
            } else {
                &messages::UNEXPECTED_RESERVED_WORD
            };
            return Err(self.error_at(range, message, &[name]));
        }
        if self.is_strict() && is_strict_reserved_word(name) {
            return Err(self.error_at(range, &messages::STRICT_RESERVED_WORD, &[name]));
        }
        Ok(())
    }

    /// Consume an identifier token that is not reserved here. Labels and
    /// the names of function expressions go through this directly.
    pub(crate) fn parse_identifier_token(&mut self) -> PResult<Identifier<'a>> {
        if self.current_token() != SyntaxKind::Identifier {
            return Err(self.identifier_expected());
        }
        let range = self.token_range();
        let name = self.token_name();
        let escaped = self.scanner.token_flags().contains(TokenFlags::UNICODE_ESCAPE);
        self.check_unreserved(name, range, escaped)?;
        self.next_token()?;
        Ok(Identifier { range, name })
    }

    /// Parse an identifier in reference position.
    pub(crate) fn parse_identifier_reference(&mut self) -> PResult<Identifier<'a>> {
        let id = self.parse_identifier_token()?;
        self.note_await_identifier(&id);
        Ok(id)
    }

    /// `await` as an identifier makes an enclosing cover invalid as async
    /// arrow parameters.
    pub(crate) fn note_await_identifier(&mut self, id: &Identifier<'a>) {
        if id.name == "await" {
            self.yield_await.await_ident.get_or_insert(id.range);
        }
    }

    /// Parse an identifier in binding position. The caller declares it.
    pub(crate) fn parse_binding_identifier(&mut self) -> PResult<Identifier<'a>> {
        let id = self.parse_identifier_token()?;
        self.check_binding_name(&id)?;
        Ok(id)
    }

    /// Parse any identifier name, including reserved words (property names,
    /// export names, labels after `.`).
    pub(crate) fn parse_identifier_name(&mut self) -> PResult<Identifier<'a>> {
        if !self.current_token().is_identifier_name() {
            return Err(self.identifier_expected());
        }
        let range = self.token_range();
        let name = match self.current_token().keyword_text() {
            Some(text) => text,
            None => self.token_name(),
        };
        self.next_token()?;
        Ok(Identifier { range, name })
    }

    pub(crate) fn identifier_expected(&self) -> SyntaxError {
        if self.current_token().is_keyword() {
            let text = self.scanner.token_text();
            return self.error_here(&messages::UNEXPECTED_RESERVED_WORD, &[text]);
        }
        if self.current_token() == SyntaxKind::EndOfFileToken {
            return self.error_here(&messages::UNEXPECTED_END, &[]);
        }
        self.error_here(&messages::IDENTIFIER_EXPECTED, &[])
    }

    /// Restrictions on a name being bound. In sloppy code the strict-only
    /// restrictions are recorded against the enclosing function, in case
    /// its body turns out to start with `"use strict"`.
    pub(crate) fn check_binding_name(&mut self, id: &Identifier<'a>) -> PResult<()> {
        if is_restricted_name(id.name) {
            if self.is_strict() {
                let message = &messages::RESTRICTED_NAME_IN_STRICT;
                return Err(self.error_at(id.range, message, &[id.name]));
            }
            self.scopes.add_pending(PendingCheck {
                range: id.range,
                message: &messages::RETRO_RESTRICTED_NAME,
                name: Some(id.name),
            });
        } else if is_strict_reserved_word(id.name) && !self.is_strict() {
            self.scopes.add_pending(PendingCheck {
                range: id.range,
                message: &messages::RETRO_RESERVED_WORD,
                name: Some(id.name),
            });
        }
        Ok(())
    }

    /// Declare `id` in the current scope.
    pub(crate) fn declare_name(&mut self, id: &Identifier<'a>, kind: BindingKind) -> PResult<()> {
        if kind == BindingKind::Lexical && id.name == "let" {
            return Err(self.error_at(id.range, &messages::LET_IN_LEXICAL_BINDING, &[]));
        }
        let atom = self.intern(id.name);
        if !self.scopes.declare(atom, kind) {
            return Err(self.error_at(id.range, &messages::DUPLICATE_BINDING, &[id.name]));
        }
        Ok(())
    }

    /// Declare every name a pattern binds.
    pub(crate) fn declare_pattern(
        &mut self,
        pattern: &Pattern<'a>,
        kind: BindingKind,
    ) -> PResult<()> {
        let mut names = Vec::new();
        pattern.for_each_binding(&mut |id| names.push(*id));
        names.iter().try_for_each(|id| self.declare_name(id, kind))
    }

    // ========================================================================
    // Literals
    // ========================================================================

    /// Legacy octal literals and escapes are checked when the token is
    /// consumed, so a `"use strict"` directive that precedes them in the
    /// same prologue applies.
    pub(crate) fn check_legacy_octal(&mut self) -> PResult<()> {
        let flags = self.scanner.token_flags();
        if !flags.intersects(TokenFlags::LEGACY_OCTAL) {
            return Ok(());
        }
        let is_escape = flags.contains(TokenFlags::OCTAL_ESCAPE);
        if self.is_strict() {
            let message = if is_escape {
                &messages::OCTAL_ESCAPE_IN_STRICT
            } else {
                &messages::OCTAL_LITERAL_IN_STRICT
            };
            return Err(self.error_here(message, &[]));
        }
        if !self.policy.legacy_octal {
            let message = if is_escape {
                &messages::LEGACY_OCTAL_ESCAPE_DISABLED
            } else {
                &messages::LEGACY_OCTAL_LITERAL_DISABLED
            };
            return Err(self.error_here(message, &[]));
        }
        Ok(())
    }

    pub(crate) fn parse_string_literal(&mut self) -> PResult<StringLiteral<'a>> {
        if self.current_token() != SyntaxKind::StringLiteral {
            return Err(self.unexpected());
        }
        self.check_legacy_octal()?;
        let literal = StringLiteral {
            range: self.token_range(),
            value: self.token_name(),
            raw: self.scanner.token_text(),
        };
        self.next_token()?;
        Ok(literal)
    }

    pub(crate) fn parse_numeric_literal(&mut self) -> PResult<NumericLiteral<'a>> {
        self.check_legacy_octal()?;
        let literal = NumericLiteral {
            range: self.token_range(),
            value: self.scanner.number_value(),
            raw: self.scanner.token_text(),
        };
        self.next_token()?;
        Ok(literal)
    }

    pub(crate) fn parse_bigint_literal(&mut self) -> PResult<BigIntLiteral<'a>> {
        let text = self.scanner.token_text();
        let digits = text.strip_suffix('n').unwrap_or(text);
        let raw: &'a str = if digits.contains('_') {
            self.arena.alloc_str(&digits.replace('_', ""))
        } else {
            digits
        };
        let literal = BigIntLiteral {
            range: self.token_range(),
            raw,
        };
        self.next_token()?;
        Ok(literal)
    }
}
