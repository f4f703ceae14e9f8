//! Classes and private names.
//!
//! Private names may be used before their declaration inside a class body,
//! so references are collected per class and resolved when the body closes.
//! Names a class does not declare move out to the enclosing class; at the
//! outermost class they are errors.

use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::collections::FxHashMap;
use jsparse_core::intern::Atom;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::messages;

use crate::context::ContextFlags;
use crate::parser::{PResult, Parser};
use crate::scope::{BindingKind, ScopeFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivateKind {
    Field,
    Method,
    Getter,
    Setter,
    /// A getter and a setter with the same name and placement.
    Accessors,
}

#[derive(Debug, Clone, Copy)]
struct PrivateEntry {
    kind: PrivateKind,
    is_static: bool,
}

/// The private names of one class body.
#[derive(Debug, Default)]
pub(crate) struct ClassScope {
    declared: FxHashMap<Atom, PrivateEntry>,
    unresolved: Vec<(Atom, TextRange)>,
}

impl ClassScope {
    /// Record a declaration. Returns `false` for a duplicate; only a
    /// getter/setter pair with the same placement may share a name.
    fn declare(&mut self, name: Atom, kind: PrivateKind, is_static: bool) -> bool {
        match self.declared.get_mut(&name) {
            None => {
                self.declared.insert(name, PrivateEntry { kind, is_static });
                true
            }
            Some(entry) => {
                let pairs = matches!(
                    (entry.kind, kind),
                    (PrivateKind::Getter, PrivateKind::Setter)
                        | (PrivateKind::Setter, PrivateKind::Getter)
                );
                if pairs && entry.is_static == is_static {
                    entry.kind = PrivateKind::Accessors;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Modifiers in front of a class element name.
#[derive(Debug, Clone, Copy, Default)]
struct ElementModifiers {
    is_static: bool,
    is_async: bool,
    is_generator: bool,
    accessor: Option<MethodKind>,
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Private names
    // ========================================================================

    pub(crate) fn parse_private_name(&mut self) -> PResult<PrivateName<'a>> {
        if self.current_token() != SyntaxKind::PrivateIdentifier {
            return Err(self.unexpected());
        }
        let name = PrivateName {
            range: self.token_range(),
            name: self.token_name(),
        };
        self.next_token()?;
        Ok(name)
    }

    /// A use of `#name` in an expression.
    pub(crate) fn reference_private_name(&mut self, name: &PrivateName<'a>) -> PResult<()> {
        if self.class_scopes.is_empty() {
            return Err(self.error_at(name.range, &messages::UNDECLARED_PRIVATE_NAME, &[name.name]));
        }
        let atom = self.intern(name.name);
        if let Some(scope) = self.class_scopes.last_mut() {
            scope.unresolved.push((atom, name.range));
        }
        Ok(())
    }

    fn declare_private_name(
        &mut self,
        name: &PrivateName<'a>,
        kind: PrivateKind,
        is_static: bool,
    ) -> PResult<()> {
        if name.name == "constructor" {
            return Err(self.error_at(name.range, &messages::PRIVATE_CONSTRUCTOR, &[]));
        }
        let atom = self.intern(name.name);
        let declared = self
            .class_scopes
            .last_mut()
            .is_some_and(|scope| scope.declare(atom, kind, is_static));
        if !declared {
            return Err(self.error_at(name.range, &messages::DUPLICATE_PRIVATE_NAME, &[name.name]));
        }
        Ok(())
    }

    /// Close the innermost class body and resolve its private references.
    fn exit_class_scope(&mut self) -> PResult<()> {
        let Some(scope) = self.class_scopes.pop() else {
            return Ok(());
        };
        for (atom, range) in scope.unresolved {
            if scope.declared.contains_key(&atom) {
                continue;
            }
            match self.class_scopes.last_mut() {
                Some(outer) => outer.unresolved.push((atom, range)),
                None => {
                    let name = self.atoms.resolve(atom);
                    return Err(self.error_at(range, &messages::UNDECLARED_PRIVATE_NAME, &[name]));
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// `class` declaration. The name is declared in the current scope and
    /// may only be omitted after `export default`.
    pub(crate) fn parse_class_declaration(
        &mut self,
        optional_name: bool,
    ) -> PResult<&'a Class<'a>> {
        self.parse_class(true, optional_name)
    }

    pub(crate) fn parse_class_expression(&mut self) -> PResult<&'a Class<'a>> {
        self.parse_class(false, true)
    }

    /// All parts of a class are strict mode code.
    fn parse_class(&mut self, is_declaration: bool, optional_name: bool) -> PResult<&'a Class<'a>> {
        let start = self.token_pos();
        let context = self.context | ContextFlags::STRICT;
        self.with_context(context, |p| {
            p.expect_token(SyntaxKind::ClassKeyword)?;
            let id = if p.current_token() == SyntaxKind::Identifier {
                let id = p.parse_binding_identifier()?;
                if is_declaration {
                    p.declare_name(&id, BindingKind::Lexical)?;
                }
                Some(id)
            } else if optional_name {
                None
            } else {
                return Err(p.identifier_expected());
            };

            let super_class = if p.optional_token(SyntaxKind::ExtendsKeyword)? {
                let heritage = p.parse_class_heritage()?;
                Some(&*p.arena.alloc(heritage))
            } else {
                None
            };

            let body = p.parse_class_body(super_class.is_some())?;
            Ok(&*p.arena.alloc(Class {
                range: p.range_from(start),
                id,
                super_class,
                body,
            }))
        })
    }

    /// ClassHeritage: a left-hand-side expression.
    fn parse_class_heritage(&mut self) -> PResult<Expression<'a>> {
        let mark = self.cover_errors.len();
        let start = self.token_pos();
        let heritage = self.parse_assignment_expression()?;
        self.check_cover_errors(mark)?;
        match heritage {
            Expression::Arrow(_)
            | Expression::Assignment(_)
            | Expression::Conditional(_)
            | Expression::Binary(_)
            | Expression::Logical(_)
            | Expression::Unary(_)
            | Expression::Update(_)
            | Expression::Yield(_)
            | Expression::Await(_)
            | Expression::PrivateIn(_) => Err(self.error_at(
                self.range_from(start),
                &messages::UNEXPECTED_TOKEN,
                &[heritage_text(&heritage)],
            )),
            _ => Ok(heritage),
        }
    }

    fn parse_class_body(&mut self, has_super: bool) -> PResult<&'a [ClassElement<'a>]> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        self.class_scopes.push(ClassScope::default());
        let mut elements = Vec::new();
        let mut has_constructor = false;

        while self.current_token() != SyntaxKind::CloseBraceToken {
            if self.optional_token(SyntaxKind::SemicolonToken)? {
                continue;
            }
            elements.push(self.parse_class_element(has_super, &mut has_constructor)?);
        }
        self.exit_class_scope()?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(self.alloc_vec(elements))
    }

    /// Whether the contextual word at the current token is a modifier
    /// rather than the element name.
    fn is_class_modifier(&mut self, allow_line_break: bool) -> bool {
        let next = self.peek_token();
        if !allow_line_break && next.has_preceding_line_break() {
            return false;
        }
        !matches!(
            next.kind,
            SyntaxKind::OpenParenToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        )
    }

    fn parse_element_modifiers(&mut self) -> PResult<ElementModifiers> {
        let mut modifiers = ElementModifiers::default();
        if self.is_contextual("static") && self.is_class_modifier(true) {
            modifiers.is_static = true;
            self.next_token()?;
            if self.current_token() == SyntaxKind::OpenBraceToken {
                return Ok(modifiers);
            }
        }
        if self.is_contextual("async") && self.is_class_modifier(false) {
            modifiers.is_async = true;
            self.next_token()?;
        }
        modifiers.is_generator = self.optional_token(SyntaxKind::AsteriskToken)?;
        if !modifiers.is_async
            && !modifiers.is_generator
            && (self.is_contextual("get") || self.is_contextual("set"))
            && self.is_class_modifier(true)
        {
            let accessor = if self.is_contextual("get") {
                MethodKind::Get
            } else {
                MethodKind::Set
            };
            modifiers.accessor = Some(accessor);
            self.next_token()?;
        }
        Ok(modifiers)
    }

    fn parse_class_element(
        &mut self,
        has_super: bool,
        has_constructor: &mut bool,
    ) -> PResult<ClassElement<'a>> {
        let start = self.token_pos();
        let modifiers = self.parse_element_modifiers()?;
        if modifiers.is_static && self.current_token() == SyntaxKind::OpenBraceToken {
            return self.parse_static_block(start);
        }

        let (key, computed) = self.parse_property_key(true)?;
        if self.current_token() == SyntaxKind::OpenParenToken {
            return self.parse_class_method(
                start,
                modifiers,
                key,
                computed,
                has_super,
                has_constructor,
            );
        }
        if modifiers.is_async || modifiers.is_generator || modifiers.accessor.is_some() {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &["("]));
        }
        self.parse_class_field(start, modifiers.is_static, key, computed)
    }

    fn parse_class_method(
        &mut self,
        start: u32,
        modifiers: ElementModifiers,
        key: PropertyKey<'a>,
        computed: bool,
        has_super: bool,
        has_constructor: &mut bool,
    ) -> PResult<ClassElement<'a>> {
        let is_constructor =
            !modifiers.is_static && !computed && key.static_name() == Some("constructor");
        let kind = match modifiers.accessor {
            Some(accessor) => accessor,
            None if is_constructor => MethodKind::Constructor,
            None => MethodKind::Method,
        };

        if is_constructor {
            let special = match kind {
                MethodKind::Get => Some("a getter"),
                MethodKind::Set => Some("a setter"),
                _ if modifiers.is_async => Some("an async method"),
                _ if modifiers.is_generator => Some("a generator"),
                _ => None,
            };
            if let Some(special) = special {
                return Err(self.error_at(key.range(), &messages::SPECIAL_CONSTRUCTOR, &[special]));
            }
            if *has_constructor {
                return Err(self.error_at(key.range(), &messages::DUPLICATE_CONSTRUCTOR, &[]));
            }
            *has_constructor = true;
        }
        if modifiers.is_static && !computed && key.static_name() == Some("prototype") {
            return Err(self.error_at(key.range(), &messages::STATIC_PROTOTYPE, &[]));
        }
        if let PropertyKey::Private(name) = &key {
            let private_kind = match kind {
                MethodKind::Get => PrivateKind::Getter,
                MethodKind::Set => PrivateKind::Setter,
                _ => PrivateKind::Method,
            };
            self.declare_private_name(name, private_kind, modifiers.is_static)?;
        }

        let mut extra = ContextFlags::SUPER_PROPERTY;
        if kind == MethodKind::Constructor && has_super {
            extra |= ContextFlags::SUPER_CALL;
        }
        let value = self.parse_method(modifiers.is_async, modifiers.is_generator, extra)?;
        let accessor_kind = match kind {
            MethodKind::Get => PropertyKind::Get,
            MethodKind::Set => PropertyKind::Set,
            _ => PropertyKind::Init,
        };
        self.check_accessor_parameters(accessor_kind, value)?;

        Ok(ClassElement::Method(MethodDefinition {
            range: self.range_from(start),
            key,
            value,
            kind,
            is_static: modifiers.is_static,
            computed,
        }))
    }

    fn parse_class_field(
        &mut self,
        start: u32,
        is_static: bool,
        key: PropertyKey<'a>,
        computed: bool,
    ) -> PResult<ClassElement<'a>> {
        if !computed {
            match key.static_name() {
                Some("constructor") => {
                    return Err(self.error_at(key.range(), &messages::FIELD_NAMED_CONSTRUCTOR, &[]));
                }
                Some("prototype") if is_static => {
                    return Err(self.error_at(key.range(), &messages::STATIC_PROTOTYPE, &[]));
                }
                _ => {}
            }
        }
        if let PropertyKey::Private(name) = &key {
            self.declare_private_name(name, PrivateKind::Field, is_static)?;
        }

        let value = if self.optional_token(SyntaxKind::EqualsToken)? {
            let context = (self.context - ContextFlags::FUNCTION_RESET)
                | ContextFlags::CLASS_FIELD_INIT
                | ContextFlags::SUPER_PROPERTY
                | ContextFlags::NEW_TARGET;
            let outer_positions = self.take_yield_await();
            let value = self.with_context(context, |p| p.parse_assignment_expression_and_alloc());
            self.yield_await = outer_positions;
            Some(value?)
        } else {
            None
        };
        self.parse_expected_semicolon()?;

        Ok(ClassElement::Property(PropertyDefinition {
            range: self.range_from(start),
            key,
            value,
            is_static,
            computed,
        }))
    }

    /// `static { ... }`. The body is a statement list with its own var
    /// scope; `await` and `arguments` are reserved, `return` is not allowed.
    fn parse_static_block(&mut self, start: u32) -> PResult<ClassElement<'a>> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        self.scopes.enter(ScopeFlags::CLASS_STATIC_BLOCK);
        let outer_labels = std::mem::take(&mut self.labels);
        let outer_positions = self.take_yield_await();
        let context = (self.context - ContextFlags::FUNCTION_RESET)
            | ContextFlags::STATIC_BLOCK
            | ContextFlags::SUPER_PROPERTY
            | ContextFlags::NEW_TARGET;

        let body =
            self.with_context(context, |p| p.parse_statement_list(SyntaxKind::CloseBraceToken));

        self.labels = outer_labels;
        self.yield_await = outer_positions;
        self.scopes.exit();
        let body = body?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(ClassElement::StaticBlock(StaticBlock {
            range: self.range_from(start),
            body,
        }))
    }
}

/// A short description of an expression that cannot be a class heritage.
fn heritage_text(expression: &Expression<'_>) -> &'static str {
    match expression {
        Expression::Arrow(_) => "=>",
        Expression::Assignment(_) => "=",
        Expression::Conditional(_) => "?",
        Expression::Yield(_) => "yield",
        Expression::Await(_) => "await",
        _ => "operator",
    }
}
