//! Import and export declarations.

use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::messages;

use crate::parser::{PResult, Parser};
use crate::scope::BindingKind;

impl<'a> Parser<'a> {
    fn expect_contextual(&mut self, name: &str) -> PResult<()> {
        if !self.is_contextual(name) {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &[name]));
        }
        self.next_token()?;
        Ok(())
    }

    /// An identifier name or a string literal.
    fn parse_module_export_name(&mut self) -> PResult<ModuleExportName<'a>> {
        if self.current_token() == SyntaxKind::StringLiteral {
            Ok(ModuleExportName::String(self.parse_string_literal()?))
        } else {
            Ok(ModuleExportName::Identifier(self.parse_identifier_name()?))
        }
    }

    /// `from "module"`, with optional import attributes.
    fn parse_module_source(&mut self) -> PResult<(StringLiteral<'a>, &'a [ImportAttribute<'a>])> {
        let source = self.parse_string_literal()?;
        let attributes = self.parse_import_attributes()?;
        Ok((source, attributes))
    }

    /// `with { type: "json" }`
    fn parse_import_attributes(&mut self) -> PResult<&'a [ImportAttribute<'a>]> {
        if !self.optional_token(SyntaxKind::WithKeyword)? {
            return Ok(&[]);
        }
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let mut attributes = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken {
            let start = self.token_pos();
            let key = self.parse_module_export_name()?;
            self.expect_token(SyntaxKind::ColonToken)?;
            let value = self.parse_string_literal()?;
            attributes.push(ImportAttribute {
                range: self.range_from(start),
                key,
                value,
            });
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.expect_token(SyntaxKind::CommaToken)?;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(self.alloc_vec(attributes))
    }

    // ========================================================================
    // Imports
    // ========================================================================

    pub(crate) fn parse_import_declaration(
        &mut self,
        start: u32,
    ) -> PResult<ImportDeclaration<'a>> {
        self.expect_token(SyntaxKind::ImportKeyword)?;
        let mut specifiers = Vec::new();

        if self.current_token() != SyntaxKind::StringLiteral {
            if self.current_token() == SyntaxKind::Identifier {
                let local = self.parse_import_binding()?;
                specifiers.push(ImportSpecifier::Default { range: local.range, local });
                if !self.optional_token(SyntaxKind::CommaToken)? {
                    return self.parse_import_rest(start, specifiers);
                }
            }
            match self.current_token() {
                SyntaxKind::AsteriskToken => {
                    let namespace_start = self.token_pos();
                    self.next_token()?;
                    self.expect_contextual("as")?;
                    let local = self.parse_import_binding()?;
                    specifiers.push(ImportSpecifier::Namespace {
                        range: self.range_from(namespace_start),
                        local,
                    });
                }
                SyntaxKind::OpenBraceToken => self.parse_named_imports(&mut specifiers)?,
                _ => return Err(self.unexpected()),
            }
            return self.parse_import_rest(start, specifiers);
        }

        let (source, attributes) = self.parse_module_source()?;
        self.parse_expected_semicolon()?;
        Ok(ImportDeclaration {
            range: self.range_from(start),
            specifiers: &[],
            source,
            attributes,
        })
    }

    /// `from "module" ;` after the import clause.
    fn parse_import_rest(
        &mut self,
        start: u32,
        specifiers: Vec<ImportSpecifier<'a>>,
    ) -> PResult<ImportDeclaration<'a>> {
        self.expect_contextual("from")?;
        let (source, attributes) = self.parse_module_source()?;
        self.parse_expected_semicolon()?;
        Ok(ImportDeclaration {
            range: self.range_from(start),
            specifiers: self.alloc_vec(specifiers),
            source,
            attributes,
        })
    }

    /// An imported binding. Imports are lexical declarations at the top
    /// of the module.
    fn parse_import_binding(&mut self) -> PResult<Identifier<'a>> {
        let local = self.parse_binding_identifier()?;
        self.declare_name(&local, BindingKind::Lexical)?;
        Ok(local)
    }

    fn parse_named_imports(&mut self, specifiers: &mut Vec<ImportSpecifier<'a>>) -> PResult<()> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        while self.current_token() != SyntaxKind::CloseBraceToken {
            let start = self.token_pos();
            let is_identifier = self.current_token() == SyntaxKind::Identifier;
            let escaped = self.scanner.token_flags().contains(TokenFlags::UNICODE_ESCAPE);
            let imported = self.parse_module_export_name()?;

            let local = if self.is_contextual("as") {
                self.next_token()?;
                self.parse_import_binding()?
            } else {
                // `{ name }` binds the imported name itself, so it must be
                // usable as a binding identifier.
                let ModuleExportName::Identifier(id) = imported else {
                    return Err(self.error_here(&messages::EXPECTED_TOKEN, &["as"]));
                };
                if !is_identifier {
                    let message = &messages::UNEXPECTED_RESERVED_WORD;
                    return Err(self.error_at(id.range, message, &[id.name]));
                }
                self.check_unreserved(id.name, id.range, escaped)?;
                self.check_binding_name(&id)?;
                self.declare_name(&id, BindingKind::Lexical)?;
                id
            };
            specifiers.push(ImportSpecifier::Named {
                range: self.range_from(start),
                imported,
                local,
            });
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.expect_token(SyntaxKind::CommaToken)?;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(())
    }

    // ========================================================================
    // Exports
    // ========================================================================

    fn add_export(&mut self, name: &'a str, range: TextRange) -> PResult<()> {
        if self.exports.contains_key(name) {
            return Err(self.error_at(range, &messages::DUPLICATE_EXPORT, &[name]));
        }
        self.exports.insert(name, range);
        Ok(())
    }

    pub(crate) fn parse_export_declaration(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.expect_token(SyntaxKind::ExportKeyword)?;
        match self.current_token() {
            SyntaxKind::AsteriskToken => self.parse_export_all(start),
            SyntaxKind::DefaultKeyword => self.parse_export_default(start),
            SyntaxKind::OpenBraceToken => self.parse_export_named(start),
            _ => self.parse_export_declaration_statement(start),
        }
    }

    /// `export * from "m"` and `export * as ns from "m"`.
    fn parse_export_all(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.expect_token(SyntaxKind::AsteriskToken)?;
        let exported = if self.is_contextual("as") {
            self.next_token()?;
            let name = self.parse_module_export_name()?;
            self.add_export(name.name(), name.range())?;
            Some(name)
        } else {
            None
        };
        self.expect_contextual("from")?;
        let (source, attributes) = self.parse_module_source()?;
        self.parse_expected_semicolon()?;
        Ok(Statement::ExportAll(ExportAllDeclaration {
            range: self.range_from(start),
            exported,
            source,
            attributes,
        }))
    }

    fn parse_export_default(&mut self, start: u32) -> PResult<Statement<'a>> {
        let default_range = self.expect_token(SyntaxKind::DefaultKeyword)?;
        self.add_export("default", default_range)?;

        let declaration_start = self.token_pos();
        let declaration = match self.current_token() {
            SyntaxKind::FunctionKeyword => {
                let function = self.parse_function_declaration(declaration_start, false, true)?;
                ExportDefaultKind::Function(function)
            }
            SyntaxKind::ClassKeyword => {
                ExportDefaultKind::Class(self.parse_class_declaration(true)?)
            }
            _ if self.is_async_function_start() => {
                self.next_token()?;
                let function = self.parse_function_declaration(declaration_start, true, true)?;
                ExportDefaultKind::Function(function)
            }
            _ => {
                let expression = self.allow_in(|p| p.parse_assignment_expression_and_alloc())?;
                self.parse_expected_semicolon()?;
                ExportDefaultKind::Expression(expression)
            }
        };
        Ok(Statement::ExportDefault(ExportDefaultDeclaration {
            range: self.range_from(start),
            declaration,
        }))
    }

    /// `async function` with no line break in between.
    fn is_async_function_start(&mut self) -> bool {
        if !self.is_contextual("async") {
            return false;
        }
        let next = self.peek_token();
        next.kind == SyntaxKind::FunctionKeyword && !next.has_preceding_line_break()
    }

    /// `export { a, b as c }`, optionally re-exported `from` a module.
    fn parse_export_named(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let mut specifiers = Vec::new();
        while self.current_token() != SyntaxKind::CloseBraceToken {
            let specifier_start = self.token_pos();
            let local = self.parse_module_export_name()?;
            let exported = if self.is_contextual("as") {
                self.next_token()?;
                self.parse_module_export_name()?
            } else {
                local
            };
            self.add_export(exported.name(), exported.range())?;
            specifiers.push(ExportSpecifier {
                range: self.range_from(specifier_start),
                local,
                exported,
            });
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.expect_token(SyntaxKind::CommaToken)?;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;

        let (source, attributes) = if self.is_contextual("from") {
            self.next_token()?;
            let (source, attributes) = self.parse_module_source()?;
            (Some(source), attributes)
        } else {
            // Without `from`, every local name refers to a binding of this
            // module. They are resolved once the whole module is parsed.
            for specifier in &specifiers {
                match specifier.local {
                    ModuleExportName::String(literal) => {
                        let message = &messages::STRING_EXPORT_WITHOUT_FROM;
                        return Err(self.error_at(literal.range, message, &[]));
                    }
                    ModuleExportName::Identifier(id) => {
                        self.check_unreserved(id.name, id.range, false)?;
                        self.export_references.push(id);
                    }
                }
            }
            (None, &[][..])
        };
        self.parse_expected_semicolon()?;

        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            range: self.range_from(start),
            declaration: None,
            specifiers: self.alloc_vec(specifiers),
            source,
            attributes,
        }))
    }

    /// `export var`, `let`, `const`, `function`, `async function` and `class`.
    fn parse_export_declaration_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        let is_declaration = match self.current_token() {
            SyntaxKind::VarKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::ClassKeyword => true,
            _ => self.is_contextual("let") || self.is_async_function_start(),
        };
        if !is_declaration {
            return Err(self.unexpected());
        }

        let statement = self.parse_statement_list_item()?;
        let mut names = Vec::new();
        match &statement {
            Statement::Variable(variable) => {
                for declarator in variable.declarations {
                    declarator.id.for_each_binding(&mut |id| names.push(*id));
                }
            }
            Statement::Function(function) => names.extend(function.id),
            Statement::Class(class) => names.extend(class.id),
            _ => {
                return Err(self.error_at(statement.range(), &messages::UNEXPECTED_TOKEN, &["let"]))
            }
        }
        for id in names {
            self.add_export(id.name, id.range)?;
        }

        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            range: self.range_from(start),
            declaration: Some(&*self.arena.alloc(statement)),
            specifiers: &[],
            source: None,
            attributes: &[],
        }))
    }

    /// Every local name exported with `export { ... }` must be declared at
    /// the top level of the module.
    pub(crate) fn check_export_references(&mut self) -> PResult<()> {
        let references = std::mem::take(&mut self.export_references);
        for id in references {
            let atom = self.intern(id.name);
            if !self.scopes.top_declares(atom) {
                return Err(self.error_at(id.range, &messages::UNDEFINED_EXPORT, &[id.name]));
            }
        }
        Ok(())
    }
}
