//! Statements, declarations and directive prologues.
//!
//! Statements dispatch on their first token. Contextual words (`let`,
//! `async`, labels) need one token of lookahead. Declarations are only
//! legal in statement list positions; single-statement bodies pass a
//! [`StatementPosition`] down so that the few sloppy-mode exceptions can
//! be applied where they belong.

use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::messages;
use log::trace;

use crate::context::{ContextFlags, Label, LabelKind, StatementPosition};
use crate::parser::{PResult, Parser};
use crate::pattern::TargetMode;
use crate::scope::{BindingKind, PendingCheck, ScopeFlags};
use crate::utilities::string_literal_body;

impl<'a> Parser<'a> {
    // ========================================================================
    // Statement lists and directive prologues
    // ========================================================================

    /// The statements of a program or function body, starting with its
    /// directive prologue. `simple_params` is false for a function whose
    /// parameter list may not be combined with `"use strict"`.
    pub(crate) fn parse_directives_and_statements(
        &mut self,
        end: SyntaxKind,
        simple_params: bool,
    ) -> PResult<&'a [Statement<'a>]> {
        let mut statements = Vec::new();
        let mut in_prologue = true;

        while self.current_token() != end {
            if self.current_token() == SyntaxKind::EndOfFileToken {
                return Err(self.unexpected());
            }
            if !in_prologue {
                statements.push(self.parse_statement_list_item()?);
                continue;
            }
            if self.current_token() != SyntaxKind::StringLiteral {
                in_prologue = false;
                self.scopes.clear_pending();
                continue;
            }

            let token_range = self.token_range();
            let has_octal_escape = self.scanner.token_flags().contains(TokenFlags::OCTAL_ESCAPE);
            let was_strict = self.is_strict();
            let mut statement = self.parse_statement_list_item()?;

            let directive = match &mut statement {
                Statement::Expression(es) => match es.expression {
                    Expression::String(literal) if same_range(literal.range, token_range) => {
                        let raw = string_literal_body(literal.raw);
                        es.directive = Some(raw);
                        Some(raw)
                    }
                    _ => None,
                },
                _ => None,
            };
            statements.push(statement);

            match directive {
                Some(raw) => {
                    if has_octal_escape && !was_strict {
                        self.scopes.add_pending(PendingCheck {
                            range: token_range,
                            message: &messages::RETRO_OCTAL_ESCAPE,
                            name: None,
                        });
                    }
                    if raw == "use strict" {
                        self.apply_use_strict(token_range, simple_params)?;
                    }
                }
                None => {
                    in_prologue = false;
                    self.scopes.clear_pending();
                }
            }
        }
        if in_prologue {
            self.scopes.clear_pending();
        }
        Ok(self.alloc_vec(statements))
    }

    /// Switch the rest of the body to strict mode and fail on the first
    /// check that was deferred while it was still sloppy.
    fn apply_use_strict(&mut self, range: TextRange, simple_params: bool) -> PResult<()> {
        if !simple_params {
            return Err(self.error_at(range, &messages::USE_STRICT_NON_SIMPLE, &[]));
        }
        if self.is_strict() {
            return Ok(());
        }
        trace!("'use strict' directive at {}", range.start);
        self.context |= ContextFlags::STRICT;
        let pending = self.scopes.take_pending();
        if let Some(check) = pending.first() {
            let name = check.name.unwrap_or_default();
            return Err(self.error_at(check.range, check.message, &[name]));
        }
        Ok(())
    }

    /// Statements up to `end`, which is not consumed.
    pub(crate) fn parse_statement_list(&mut self, end: SyntaxKind) -> PResult<&'a [Statement<'a>]> {
        let mut statements = Vec::new();
        while self.current_token() != end {
            if self.current_token() == SyntaxKind::EndOfFileToken {
                return Err(self.unexpected());
            }
            statements.push(self.parse_statement_list_item()?);
        }
        Ok(self.alloc_vec(statements))
    }

    #[inline]
    pub(crate) fn parse_statement_list_item(&mut self) -> PResult<Statement<'a>> {
        self.parse_statement(StatementPosition::ListItem)
    }

    pub(crate) fn parse_statement(
        &mut self,
        position: StatementPosition,
    ) -> PResult<Statement<'a>> {
        self.enter_recursion()?;
        let result = self.parse_statement_worker(position);
        self.leave_recursion();
        result
    }

    fn parse_statement_worker(&mut self, position: StatementPosition) -> PResult<Statement<'a>> {
        let start = self.token_pos();
        match self.current_token() {
            SyntaxKind::OpenBraceToken => Ok(Statement::Block(self.parse_block_statement()?)),
            SyntaxKind::SemicolonToken => {
                self.next_token()?;
                Ok(Statement::Empty(EmptyStatement {
                    range: self.range_from(start),
                }))
            }
            SyntaxKind::VarKeyword => self.parse_variable_statement(start, VariableKind::Var),
            SyntaxKind::ConstKeyword => {
                if !position.allows_declarations() {
                    return Err(self.error_here(&messages::LEXICAL_IN_STATEMENT_POSITION, &[]));
                }
                self.parse_variable_statement(start, VariableKind::Const)
            }
            SyntaxKind::FunctionKeyword => self.parse_function_statement(start, false, position),
            SyntaxKind::ClassKeyword => {
                if !position.allows_declarations() {
                    return Err(self.unexpected());
                }
                Ok(Statement::Class(self.parse_class_declaration(false)?))
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(start),
            SyntaxKind::ForKeyword => self.parse_for_statement(start),
            SyntaxKind::WhileKeyword => self.parse_while_statement(start),
            SyntaxKind::DoKeyword => self.parse_do_statement(start),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(start),
            SyntaxKind::BreakKeyword => self.parse_break_statement(start),
            SyntaxKind::ContinueKeyword => self.parse_continue_statement(start),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(start),
            SyntaxKind::TryKeyword => self.parse_try_statement(start),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(start),
            SyntaxKind::WithKeyword => self.parse_with_statement(start),
            SyntaxKind::DebuggerKeyword => {
                self.next_token()?;
                self.parse_expected_semicolon()?;
                Ok(Statement::Debugger(DebuggerStatement {
                    range: self.range_from(start),
                }))
            }
            SyntaxKind::ImportKeyword => {
                let next = self.peek_token().kind;
                if matches!(next, SyntaxKind::OpenParenToken | SyntaxKind::DotToken) {
                    return self.parse_expression_statement(start);
                }
                self.check_module_item_position(position, "import")?;
                Ok(Statement::Import(self.parse_import_declaration(start)?))
            }
            SyntaxKind::ExportKeyword => {
                self.check_module_item_position(position, "export")?;
                self.parse_export_declaration(start)
            }
            SyntaxKind::Identifier => self.parse_identifier_statement(start, position),
            _ => self.parse_expression_statement(start),
        }
    }

    /// Statements that start with an identifier: `let` declarations,
    /// `async function`, labels and expression statements.
    fn parse_identifier_statement(
        &mut self,
        start: u32,
        position: StatementPosition,
    ) -> PResult<Statement<'a>> {
        if self.is_contextual("let") {
            let next = self.peek_token();
            let is_declaration = match next.kind {
                SyntaxKind::OpenBracketToken => true,
                SyntaxKind::OpenBraceToken | SyntaxKind::Identifier => {
                    position.allows_declarations() || !next.has_preceding_line_break()
                }
                _ => false,
            };
            if is_declaration {
                if !position.allows_declarations() {
                    return Err(self.error_here(&messages::LEXICAL_IN_STATEMENT_POSITION, &[]));
                }
                return self.parse_variable_statement(start, VariableKind::Let);
            }
        } else if self.is_contextual("async") {
            let next = self.peek_token();
            if next.kind == SyntaxKind::FunctionKeyword && !next.has_preceding_line_break() {
                self.next_token()?;
                return self.parse_function_statement(start, true, position);
            }
        }
        if self.peek_token().kind == SyntaxKind::ColonToken {
            return self.parse_labeled_statement(start, position);
        }
        self.parse_expression_statement(start)
    }

    fn parse_expression_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        if self.current_token() == SyntaxKind::NumericLiteral && self.is_regexp_after_line_break() {
            let literal = self.parse_numeric_literal()?;
            return Ok(Statement::Expression(ExpressionStatement {
                range: self.range_from(start),
                expression: self.arena.alloc(Expression::Numeric(literal)),
                directive: None,
            }));
        }
        let expression = self.allow_in(|p| p.parse_expression_and_alloc())?;
        self.parse_expected_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            range: self.range_from(start),
            expression,
            directive: None,
        }))
    }

    /// A statement made of a lone numeric literal ends at a line break
    /// followed by `/`, which then starts a regular expression.
    fn is_regexp_after_line_break(&mut self) -> bool {
        let next = self.peek_token();
        matches!(next.kind, SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken)
            && next.flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// `import` and `export` declarations may only appear directly in the
    /// statement list of a module.
    fn check_module_item_position(
        &self,
        position: StatementPosition,
        keyword: &str,
    ) -> PResult<()> {
        let top_level = position.allows_declarations() && self.scopes.depth() == 1;
        if !self.options.module || !top_level {
            return Err(self.error_here(&messages::MODULE_ITEM_POSITION, &[keyword]));
        }
        Ok(())
    }

    // ========================================================================
    // Blocks and declarations
    // ========================================================================

    /// `{ ... }` with its own lexical scope.
    pub(crate) fn parse_block_statement(&mut self) -> PResult<BlockStatement<'a>> {
        self.scopes.enter(ScopeFlags::NONE);
        let result = self.parse_block_body();
        self.scopes.exit();
        result
    }

    /// `{ ... }` in the current scope.
    fn parse_block_body(&mut self) -> PResult<BlockStatement<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let body = self.parse_statement_list(SyntaxKind::CloseBraceToken)?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(BlockStatement {
            range: self.range_from(start),
            body,
        })
    }

    fn parse_variable_statement(
        &mut self,
        start: u32,
        kind: VariableKind,
    ) -> PResult<Statement<'a>> {
        let declaration = self.allow_in(|p| p.parse_variable_declaration(start, kind, false))?;
        self.parse_expected_semicolon()?;
        let range = self.range_from(start);
        Ok(Statement::Variable(VariableDeclaration { range, ..declaration }))
    }

    /// `var`, `let` or `const` followed by declarators. Outside a `for` head
    /// the names are declared and initializers are checked here; a `for`
    /// head does both once it knows which kind of loop it starts.
    pub(crate) fn parse_variable_declaration(
        &mut self,
        start: u32,
        kind: VariableKind,
        in_for_head: bool,
    ) -> PResult<VariableDeclaration<'a>> {
        self.next_token()?;
        let mut declarations = Vec::new();
        loop {
            let declarator_start = self.token_pos();
            let id = self.parse_binding_target()?;
            if !in_for_head {
                self.declare_pattern(&id, binding_kind(kind))?;
            }
            let init = if self.optional_token(SyntaxKind::EqualsToken)? {
                Some(self.parse_assignment_expression_and_alloc()?)
            } else {
                None
            };
            let declarator = VariableDeclarator {
                range: self.range_from(declarator_start),
                id,
                init,
            };
            if !in_for_head {
                self.check_declarator_initializer(kind, &declarator)?;
            }
            declarations.push(declarator);
            if !self.optional_token(SyntaxKind::CommaToken)? {
                break;
            }
        }
        Ok(VariableDeclaration {
            range: self.range_from(start),
            kind,
            declarations: self.alloc_vec(declarations),
        })
    }

    /// Destructuring declarations and `const` require an initializer.
    fn check_declarator_initializer(
        &self,
        kind: VariableKind,
        declarator: &VariableDeclarator<'a>,
    ) -> PResult<()> {
        if declarator.init.is_some() {
            return Ok(());
        }
        if !matches!(declarator.id, Pattern::Identifier(_)) {
            let message = &messages::MISSING_DESTRUCTURING_INITIALIZER;
            return Err(self.error_at(declarator.range, message, &[]));
        }
        if kind == VariableKind::Const {
            return Err(self.error_at(declarator.range, &messages::MISSING_CONST_INITIALIZER, &[]));
        }
        Ok(())
    }

    /// A function declaration in any statement position. `is_async` is set
    /// when `async` has been consumed.
    fn parse_function_statement(
        &mut self,
        start: u32,
        is_async: bool,
        position: StatementPosition,
    ) -> PResult<Statement<'a>> {
        if position.allows_declarations() {
            let function = self.parse_function_declaration(start, is_async, false)?;
            return Ok(Statement::Function(function));
        }
        let is_generator = self.peek_token().kind == SyntaxKind::AsteriskToken;
        let sloppy = !self.is_strict();

        match position {
            StatementPosition::If | StatementPosition::Label if is_async || is_generator => {
                let message = &messages::LABELED_GENERATOR_OR_ASYNC;
                Err(self.error_at(self.range_from(start), message, &[]))
            }
            StatementPosition::If if sloppy && self.policy.if_function_declarations => {
                // Treated as if wrapped in a block of its own.
                self.scopes.enter(ScopeFlags::NONE);
                let function = self.parse_function_declaration(start, false, false);
                self.scopes.exit();
                Ok(Statement::Function(function?))
            }
            StatementPosition::Label if sloppy && self.policy.labeled_function_declarations => {
                Ok(Statement::Function(self.parse_function_declaration(start, false, false)?))
            }
            _ => Err(self.error_here(&messages::FUNCTION_IN_STATEMENT_POSITION, &[])),
        }
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.next_token()?;
        let test = self.parse_parenthesized_condition()?;
        let consequent = self.parse_statement(StatementPosition::If)?;
        let consequent = &*self.arena.alloc(consequent);
        let alternate = if self.optional_token(SyntaxKind::ElseKeyword)? {
            let alternate = self.parse_statement(StatementPosition::If)?;
            Some(&*self.arena.alloc(alternate))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            range: self.range_from(start),
            test,
            consequent,
            alternate,
        }))
    }

    /// `( Expression )` after `if`, `while`, `switch` and `with`.
    fn parse_parenthesized_condition(&mut self) -> PResult<&'a Expression<'a>> {
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let expression = self.allow_in(|p| p.parse_expression_and_alloc())?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        Ok(expression)
    }

    /// Mark the labels directly in front of the statement at `start`.
    /// Consecutive labels all apply to the same statement.
    fn mark_enclosing_labels(&mut self, start: u32, kind: LabelKind) {
        let mut position = start;
        for label in self.labels.iter_mut().rev() {
            if label.statement_start != position {
                break;
            }
            label.kind = kind;
            position = label.range.start;
        }
    }

    /// The body of a loop: `break` and `continue` become legal.
    fn parse_loop_body(&mut self) -> PResult<&'a Statement<'a>> {
        let context = self.context | ContextFlags::IN_ITERATION;
        let body = self.with_context(context, |p| p.parse_statement(StatementPosition::Nested))?;
        Ok(self.arena.alloc(body))
    }

    fn parse_while_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.mark_enclosing_labels(start, LabelKind::Loop);
        self.next_token()?;
        let test = self.parse_parenthesized_condition()?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(WhileStatement {
            range: self.range_from(start),
            test,
            body,
        }))
    }

    fn parse_do_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.mark_enclosing_labels(start, LabelKind::Loop);
        self.next_token()?;
        let body = self.parse_loop_body()?;
        self.expect_token(SyntaxKind::WhileKeyword)?;
        let test = self.parse_parenthesized_condition()?;
        // A semicolon is always inserted after `do ... while (...)`.
        self.optional_token(SyntaxKind::SemicolonToken)?;
        Ok(Statement::DoWhile(DoWhileStatement {
            range: self.range_from(start),
            body,
            test,
        }))
    }

    fn parse_return_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        if !self.in_context(ContextFlags::RETURN) {
            return Err(self.error_here(&messages::ILLEGAL_RETURN, &[]));
        }
        self.next_token()?;
        let argument = if self.current_token() == SyntaxKind::SemicolonToken
            || self.can_insert_semicolon()
        {
            None
        } else {
            Some(self.allow_in(|p| p.parse_expression_and_alloc())?)
        };
        self.parse_expected_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            range: self.range_from(start),
            argument,
        }))
    }

    /// The optional label after `break` or `continue`. It must be on the
    /// same line.
    fn parse_jump_label(&mut self) -> PResult<Option<(Identifier<'a>, LabelKind)>> {
        if self.current_token() != SyntaxKind::Identifier || self.has_preceding_line_break() {
            return Ok(None);
        }
        let label = self.parse_identifier_token()?;
        let found = self.labels.iter().rev().find(|l| l.name == label.name);
        match found {
            Some(target) => Ok(Some((label, target.kind))),
            None => Err(self.error_at(label.range, &messages::UNDEFINED_LABEL, &[label.name])),
        }
    }

    fn parse_break_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        let keyword = self.token_range();
        self.next_token()?;
        let label = self.parse_jump_label()?;
        if label.is_none()
            && !self.in_context(ContextFlags::IN_ITERATION | ContextFlags::IN_SWITCH)
        {
            return Err(self.error_at(keyword, &messages::ILLEGAL_BREAK, &[]));
        }
        self.parse_expected_semicolon()?;
        Ok(Statement::Break(BreakStatement {
            range: self.range_from(start),
            label: label.map(|(label, _)| label),
        }))
    }

    fn parse_continue_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        let keyword = self.token_range();
        self.next_token()?;
        let label = self.parse_jump_label()?;
        match &label {
            Some((label, kind)) if *kind != LabelKind::Loop => {
                let message = &messages::CONTINUE_TARGET_NOT_LOOP;
                return Err(self.error_at(label.range, message, &[label.name]));
            }
            None if !self.in_context(ContextFlags::IN_ITERATION) => {
                return Err(self.error_at(keyword, &messages::ILLEGAL_CONTINUE, &[]));
            }
            _ => {}
        }
        self.parse_expected_semicolon()?;
        Ok(Statement::Continue(ContinueStatement {
            range: self.range_from(start),
            label: label.map(|(label, _)| label),
        }))
    }

    fn parse_throw_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.next_token()?;
        if self.has_preceding_line_break() {
            return Err(self.error_here(&messages::NEWLINE_AFTER_THROW, &[]));
        }
        let argument = self.allow_in(|p| p.parse_expression_and_alloc())?;
        self.parse_expected_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            range: self.range_from(start),
            argument,
        }))
    }

    fn parse_try_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.next_token()?;
        let block = self.parse_block_statement()?;
        let handler = if self.current_token() == SyntaxKind::CatchKeyword {
            Some(self.parse_catch_clause()?)
        } else {
            None
        };
        let finalizer = if self.optional_token(SyntaxKind::FinallyKeyword)? {
            Some(self.parse_block_statement()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &["catch"]));
        }
        Ok(Statement::Try(TryStatement {
            range: self.range_from(start),
            block,
            handler,
            finalizer,
        }))
    }

    /// The parameter and the block of a catch clause share one scope, so
    /// the block may not redeclare the parameter lexically.
    fn parse_catch_clause(&mut self) -> PResult<CatchClause<'a>> {
        let start = self.token_pos();
        self.next_token()?;
        let param = if self.optional_token(SyntaxKind::OpenParenToken)? {
            let param = self.parse_binding_target()?;
            self.expect_token(SyntaxKind::CloseParenToken)?;
            Some(param)
        } else {
            None
        };

        let flags = match param {
            Some(Pattern::Identifier(_)) => ScopeFlags::SIMPLE_CATCH,
            _ => ScopeFlags::NONE,
        };
        self.scopes.enter(flags);
        let body = self.parse_catch_body(&param);
        self.scopes.exit();

        Ok(CatchClause {
            range: self.range_from(start),
            param,
            body: body?,
        })
    }

    fn parse_catch_body(&mut self, param: &Option<Pattern<'a>>) -> PResult<BlockStatement<'a>> {
        match param {
            Some(Pattern::Identifier(id)) => self.declare_name(id, BindingKind::SimpleCatch)?,
            Some(pattern) => self.declare_pattern(pattern, BindingKind::Lexical)?,
            None => {}
        }
        self.parse_block_body()
    }

    fn parse_switch_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.mark_enclosing_labels(start, LabelKind::Switch);
        self.next_token()?;
        let discriminant = self.parse_parenthesized_condition()?;
        self.expect_token(SyntaxKind::OpenBraceToken)?;

        self.scopes.enter(ScopeFlags::NONE);
        let context = self.context | ContextFlags::IN_SWITCH;
        let cases = self.with_context(context, |p| p.parse_case_clauses());
        self.scopes.exit();
        let cases = cases?;

        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(Statement::Switch(SwitchStatement {
            range: self.range_from(start),
            discriminant,
            cases,
        }))
    }

    fn parse_case_clauses(&mut self) -> PResult<&'a [SwitchCase<'a>]> {
        let mut cases = Vec::new();
        let mut has_default = false;
        while self.current_token() != SyntaxKind::CloseBraceToken {
            let start = self.token_pos();
            let test = match self.current_token() {
                SyntaxKind::CaseKeyword => {
                    self.next_token()?;
                    Some(self.allow_in(|p| p.parse_expression_and_alloc())?)
                }
                SyntaxKind::DefaultKeyword => {
                    if has_default {
                        return Err(self.error_here(&messages::DUPLICATE_DEFAULT_CLAUSE, &[]));
                    }
                    has_default = true;
                    self.next_token()?;
                    None
                }
                _ => return Err(self.unexpected()),
            };
            self.expect_token(SyntaxKind::ColonToken)?;

            let mut consequent = Vec::new();
            while !matches!(
                self.current_token(),
                SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword | SyntaxKind::CloseBraceToken
            ) {
                if self.current_token() == SyntaxKind::EndOfFileToken {
                    return Err(self.unexpected());
                }
                consequent.push(self.parse_statement_list_item()?);
            }
            cases.push(SwitchCase {
                range: self.range_from(start),
                test,
                consequent: self.alloc_vec(consequent),
            });
        }
        Ok(self.alloc_vec(cases))
    }

    fn parse_with_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        if self.is_strict() {
            return Err(self.error_here(&messages::WITH_IN_STRICT, &[]));
        }
        self.next_token()?;
        let object = self.parse_parenthesized_condition()?;
        let body = self.parse_statement(StatementPosition::Nested)?;
        Ok(Statement::With(WithStatement {
            range: self.range_from(start),
            object,
            body: self.arena.alloc(body),
        }))
    }

    fn parse_labeled_statement(
        &mut self,
        start: u32,
        position: StatementPosition,
    ) -> PResult<Statement<'a>> {
        let label = self.parse_identifier_token()?;
        if self.labels.iter().any(|l| l.name == label.name) {
            return Err(self.error_at(label.range, &messages::DUPLICATE_LABEL, &[label.name]));
        }
        self.expect_token(SyntaxKind::ColonToken)?;

        self.labels.push(Label {
            name: label.name,
            kind: LabelKind::Other,
            statement_start: self.token_pos(),
            range: label.range,
        });
        // A labeled function is only allowed where the labeled statement
        // itself could be a declaration.
        let body_position = match position {
            StatementPosition::ListItem | StatementPosition::Label => StatementPosition::Label,
            _ => StatementPosition::Nested,
        };
        let body = self.parse_statement(body_position);
        self.labels.pop();
        let body = body?;

        Ok(Statement::Labeled(LabeledStatement {
            range: self.range_from(start),
            label,
            body: self.arena.alloc(body),
        }))
    }

    // ========================================================================
    // For statements
    // ========================================================================

    /// `for (;;)`, `for-in`, `for-of` and `for await`. Declarations in the
    /// head live in a scope that also encloses the body.
    fn parse_for_statement(&mut self, start: u32) -> PResult<Statement<'a>> {
        self.mark_enclosing_labels(start, LabelKind::Loop);
        self.next_token()?;
        let is_await = if self.is_contextual("await") {
            if !self.in_context(ContextFlags::AWAIT) {
                return Err(self.error_here(&messages::FOR_AWAIT_OUTSIDE_ASYNC, &[]));
            }
            self.next_token()?;
            true
        } else {
            false
        };
        self.expect_token(SyntaxKind::OpenParenToken)?;

        self.scopes.enter(ScopeFlags::NONE);
        let result = self.parse_for_head_and_body(start, is_await);
        self.scopes.exit();
        result
    }

    fn parse_for_head_and_body(&mut self, start: u32, is_await: bool) -> PResult<Statement<'a>> {
        let head_start = self.token_pos();
        let declaration_kind = match self.current_token() {
            SyntaxKind::VarKeyword => Some(VariableKind::Var),
            SyntaxKind::ConstKeyword => Some(VariableKind::Const),
            SyntaxKind::Identifier if self.is_contextual("let") => {
                let next = self.peek_token().kind;
                matches!(
                    next,
                    SyntaxKind::OpenBracketToken
                        | SyntaxKind::OpenBraceToken
                        | SyntaxKind::Identifier
                )
                .then_some(VariableKind::Let)
            }
            _ => None,
        };

        if let Some(kind) = declaration_kind {
            let context = self.context | ContextFlags::DISALLOW_IN;
            let declaration = self.with_context(context, |p| {
                p.parse_variable_declaration(head_start, kind, true)
            })?;
            return self.parse_for_declaration_rest(start, declaration, is_await);
        }

        if self.current_token() == SyntaxKind::SemicolonToken {
            if is_await {
                return Err(self.unexpected());
            }
            return self.parse_for_loop_rest(start, None);
        }

        let starts_with_let = self.is_contextual("let");
        let mark = self.cover_errors.len();
        let context = self.context | ContextFlags::DISALLOW_IN;
        let expression = self.with_context(context, |p| p.parse_expression_cover())?;
        let expression = &*self.arena.alloc(expression);

        let Some(is_of) = self.for_in_or_of() else {
            if is_await {
                return Err(self.unexpected());
            }
            self.check_cover_errors(mark)?;
            return self.parse_for_loop_rest(start, Some(ForInit::Expression(expression)));
        };
        if is_await && !is_of {
            return Err(self.unexpected());
        }
        if is_of && starts_with_let {
            return Err(self.error_at(expression.range(), &messages::FOR_OF_LET, &[]));
        }
        if is_of && !is_await && is_plain_async(expression) {
            return Err(self.error_at(expression.range(), &messages::FOR_OF_ASYNC, &[]));
        }

        let target = match expression {
            Expression::Object(_) | Expression::Array(_) => {
                let pattern = self.to_pattern(expression, TargetMode::Assignment)?;
                self.cover_errors.truncate(mark);
                pattern
            }
            _ => {
                self.check_cover_errors(mark)?;
                let name = if is_of { "of" } else { "in" };
                self.to_simple_target(expression, &messages::INVALID_FOR_TARGET, &[name])?
            }
        };
        self.parse_for_in_of_rest(start, ForHead::Pattern(target), is_of, is_await)
    }

    /// `Some(true)` at `of`, `Some(false)` at `in`.
    fn for_in_or_of(&self) -> Option<bool> {
        if self.current_token() == SyntaxKind::InKeyword {
            Some(false)
        } else if self.is_contextual("of") {
            Some(true)
        } else {
            None
        }
    }

    fn parse_for_declaration_rest(
        &mut self,
        start: u32,
        declaration: VariableDeclaration<'a>,
        is_await: bool,
    ) -> PResult<Statement<'a>> {
        let kind = declaration.kind;
        let Some(is_of) = self.for_in_or_of() else {
            if is_await {
                return Err(self.unexpected());
            }
            for declarator in declaration.declarations {
                self.declare_pattern(&declarator.id, binding_kind(kind))?;
                self.check_declarator_initializer(kind, declarator)?;
            }
            return self.parse_for_loop_rest(start, Some(ForInit::Variable(declaration)));
        };
        if is_await && !is_of {
            return Err(self.unexpected());
        }

        let name = if is_of { "of" } else { "in" };
        let [declarator] = declaration.declarations else {
            let message = &messages::FOR_HEAD_SINGLE_BINDING;
            return Err(self.error_at(declaration.range, message, &[name]));
        };
        if declarator.init.is_some() && !self.allows_for_in_initializer(kind, declarator, is_of) {
            return Err(self.error_at(declarator.range, &messages::FOR_HEAD_INITIALIZER, &[name]));
        }
        let binding = match kind {
            VariableKind::Var if is_of => BindingKind::VarForOf,
            _ => binding_kind(kind),
        };
        self.declare_pattern(&declarator.id, binding)?;
        self.parse_for_in_of_rest(start, ForHead::Variable(declaration), is_of, is_await)
    }

    /// `for (var x = 0 in o)` survives in sloppy code for compatibility.
    fn allows_for_in_initializer(
        &self,
        kind: VariableKind,
        declarator: &VariableDeclarator<'a>,
        is_of: bool,
    ) -> bool {
        !is_of
            && kind == VariableKind::Var
            && !self.is_strict()
            && self.policy.for_in_initializer
            && matches!(declarator.id, Pattern::Identifier(_))
    }

    fn parse_for_in_of_rest(
        &mut self,
        start: u32,
        left: ForHead<'a>,
        is_of: bool,
        is_await: bool,
    ) -> PResult<Statement<'a>> {
        self.next_token()?;
        let right = if is_of {
            self.allow_in(|p| p.parse_assignment_expression_and_alloc())?
        } else {
            self.allow_in(|p| p.parse_expression_and_alloc())?
        };
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let body = self.parse_loop_body()?;
        let range = self.range_from(start);

        if is_of {
            Ok(Statement::ForOf(ForOfStatement {
                range,
                is_await,
                left,
                right,
                body,
            }))
        } else {
            Ok(Statement::ForIn(ForInStatement { range, left, right, body }))
        }
    }

    /// The rest of `for (init; test; update) body`, at the first `;`.
    fn parse_for_loop_rest(
        &mut self,
        start: u32,
        init: Option<ForInit<'a>>,
    ) -> PResult<Statement<'a>> {
        self.expect_token(SyntaxKind::SemicolonToken)?;
        let test = if self.current_token() == SyntaxKind::SemicolonToken {
            None
        } else {
            Some(self.allow_in(|p| p.parse_expression_and_alloc())?)
        };
        self.expect_token(SyntaxKind::SemicolonToken)?;
        let update = if self.current_token() == SyntaxKind::CloseParenToken {
            None
        } else {
            Some(self.allow_in(|p| p.parse_expression_and_alloc())?)
        };
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::For(ForStatement {
            range: self.range_from(start),
            init,
            test,
            update,
            body,
        }))
    }
}

fn binding_kind(kind: VariableKind) -> BindingKind {
    if kind.is_lexical() {
        BindingKind::Lexical
    } else {
        BindingKind::Var
    }
}

#[inline]
fn same_range(a: TextRange, b: TextRange) -> bool {
    a.start == b.start && a.end == b.end
}

/// The unparenthesized, unescaped identifier `async`.
fn is_plain_async(expression: &Expression<'_>) -> bool {
    matches!(
        expression,
        Expression::Identifier(id) if id.name == "async" && id.range.end - id.range.start == 5
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_kind_for_declarations() {
        assert_eq!(binding_kind(VariableKind::Var), BindingKind::Var);
        assert_eq!(binding_kind(VariableKind::Let), BindingKind::Lexical);
        assert_eq!(binding_kind(VariableKind::Const), BindingKind::Lexical);
    }

    #[test]
    fn test_plain_async_requires_unescaped_spelling() {
        let plain = Expression::Identifier(Identifier {
            range: TextRange::new(5, 10),
            name: "async",
        });
        let escaped = Expression::Identifier(Identifier {
            range: TextRange::new(5, 15),
            name: "async",
        });
        assert!(is_plain_async(&plain));
        assert!(!is_plain_async(&escaped));
    }
}
