//! Functions, methods, formal parameters and arrow functions.

use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::collections::FxHashSet;
use jsparse_diagnostics::messages;
use log::trace;

use crate::context::ContextFlags;
use crate::parser::{PResult, Parser};
use crate::scope::{BindingKind, PendingCheck, ScopeFlags};

impl<'a> Parser<'a> {
    /// `function` expression. The current token is `function`; a preceding
    /// `async` has been consumed by the caller.
    pub(crate) fn parse_function_expression(
        &mut self,
        start: u32,
        is_async: bool,
    ) -> PResult<&'a Function<'a>> {
        self.expect_token(SyntaxKind::FunctionKeyword)?;
        let is_generator = self.optional_token(SyntaxKind::AsteriskToken)?;

        // The name of a function expression is scoped to the function itself,
        // so `yield` and `await` follow the function's own kind.
        let id = if self.current_token() == SyntaxKind::Identifier {
            let context = self.context.for_function(is_async, is_generator);
            Some(self.with_context(context, |p| p.parse_identifier_token())?)
        } else {
            None
        };
        self.parse_function_rest(start, id, is_async, is_generator, ContextFlags::NONE, false)
    }

    /// `function` declaration after an optional `async`. The name is
    /// declared in the current scope. `optional_name` is set for
    /// `export default function`.
    pub(crate) fn parse_function_declaration(
        &mut self,
        start: u32,
        is_async: bool,
        optional_name: bool,
    ) -> PResult<&'a Function<'a>> {
        self.expect_token(SyntaxKind::FunctionKeyword)?;
        let is_generator = self.optional_token(SyntaxKind::AsteriskToken)?;
        let id = if optional_name && self.current_token() == SyntaxKind::OpenParenToken {
            None
        } else {
            let id = self.parse_binding_identifier()?;
            self.declare_function_name(&id, !is_async && !is_generator)?;
            Some(id)
        };
        self.parse_function_rest(start, id, is_async, is_generator, ContextFlags::NONE, false)
    }

    /// Declare a function name in the current scope. Plain sloppy functions
    /// in blocks may be redeclared and become Annex-B hoisting candidates.
    fn declare_function_name(&mut self, id: &Identifier<'a>, is_plain: bool) -> PResult<()> {
        let functions_as_var = self.scopes.functions_as_var();
        let sloppy_plain = is_plain && !self.is_strict();
        let kind = if functions_as_var {
            BindingKind::Var
        } else if sloppy_plain && self.policy.duplicate_block_functions {
            BindingKind::Function
        } else {
            BindingKind::Lexical
        };
        self.declare_name(id, kind)?;
        if sloppy_plain && !functions_as_var && self.policy.annex_b_function_hoisting {
            let atom = self.intern(id.name);
            self.scopes.add_annex_b_candidate(atom);
        }
        Ok(())
    }

    /// An object or class method: parameters and body, starting at `(`.
    pub(crate) fn parse_method(
        &mut self,
        is_async: bool,
        is_generator: bool,
        extra: ContextFlags,
    ) -> PResult<&'a Function<'a>> {
        let start = self.token_pos();
        self.parse_function_rest(start, None, is_async, is_generator, extra, true)
    }

    /// Parameters and body of any non-arrow function.
    fn parse_function_rest(
        &mut self,
        start: u32,
        id: Option<Identifier<'a>>,
        is_async: bool,
        is_generator: bool,
        extra: ContextFlags,
        is_method: bool,
    ) -> PResult<&'a Function<'a>> {
        self.scopes.enter(ScopeFlags::FUNCTION);
        let outer_labels = std::mem::take(&mut self.labels);
        let outer_positions = self.take_yield_await();
        let context = self.context.for_function(is_async, is_generator) | extra;

        let result = self.with_context(context, |p| {
            if let Some(id) = &id {
                p.check_binding_name(id)?;
            }
            let parameter_context = p.context | ContextFlags::PARAMETERS;
            let params = p.with_context(parameter_context, |p| p.parse_formal_parameters())?;
            p.declare_parameters(&params, is_method)?;
            let body = p.parse_function_body(params.is_simple())?;
            Ok((params, body))
        });

        self.labels = outer_labels;
        self.yield_await = outer_positions;
        let hoisted = self.scopes.exit();
        let (params, mut body) = result?;
        if !hoisted.is_empty() {
            trace!("{} block-level function(s) hoisted in function at {}", hoisted.len(), start);
        }
        body.annex_b_functions = self.resolve_atoms(hoisted);

        Ok(self.arena.alloc(Function {
            range: self.range_from(start),
            id,
            params,
            body,
            is_async,
            is_generator,
        }))
    }

    /// FormalParameters in parentheses.
    pub(crate) fn parse_formal_parameters(&mut self) -> PResult<FormalParameters<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let mut items = Vec::new();
        let mut rest = None;

        while self.current_token() != SyntaxKind::CloseParenToken {
            if self.current_token() == SyntaxKind::DotDotDotToken {
                let rest_start = self.token_pos();
                self.next_token()?;
                let argument = self.parse_binding_target()?;
                if self.current_token() == SyntaxKind::EqualsToken {
                    return Err(self.error_here(&messages::REST_WITH_INITIALIZER, &[]));
                }
                if self.current_token() != SyntaxKind::CloseParenToken {
                    return Err(self.error_here(&messages::REST_NOT_LAST, &[]));
                }
                let element = RestElement {
                    range: self.range_from(rest_start),
                    argument,
                };
                rest = Some(&*self.arena.alloc(element));
                break;
            }
            items.push(self.parse_binding_element()?);
            if self.current_token() != SyntaxKind::CloseParenToken {
                self.expect_token(SyntaxKind::CommaToken)?;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken)?;

        Ok(FormalParameters {
            range: self.range_from(start),
            items: self.alloc_vec(items),
            rest,
        })
    }

    /// Declare the parameter names in the current function scope.
    /// Duplicates are always an error for arrows, methods, strict functions
    /// and non-simple lists; otherwise they are deferred until the body's
    /// directive prologue is known.
    pub(crate) fn declare_parameters(
        &mut self,
        params: &FormalParameters<'a>,
        always_unique: bool,
    ) -> PResult<()> {
        let mut names = Vec::new();
        for item in params.items {
            item.for_each_binding(&mut |id| names.push(*id));
        }
        if let Some(rest) = params.rest {
            rest.argument.for_each_binding(&mut |id| names.push(*id));
        }

        let unique = always_unique
            || self.is_strict()
            || !params.is_simple()
            || !self.policy.duplicate_parameters;
        let mut seen = FxHashSet::default();
        for id in &names {
            if !seen.insert(id.name) {
                if unique {
                    return Err(self.error_at(id.range, &messages::DUPLICATE_PARAMETER, &[id.name]));
                }
                self.scopes.add_pending(PendingCheck {
                    range: id.range,
                    message: &messages::RETRO_DUPLICATE_PARAMETER,
                    name: Some(id.name),
                });
            }
            self.declare_name(id, BindingKind::Parameter)?;
        }
        Ok(())
    }

    /// `{ FunctionBody }` in the already entered function scope.
    pub(crate) fn parse_function_body(&mut self, simple_params: bool) -> PResult<FunctionBody<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let body =
            self.parse_directives_and_statements(SyntaxKind::CloseBraceToken, simple_params)?;
        let strict = self.is_strict();
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(FunctionBody {
            range: self.range_from(start),
            strict,
            body,
            annex_b_functions: &[],
        })
    }

    /// Getters take no parameters; setters take exactly one, not a rest.
    pub(crate) fn check_accessor_parameters(
        &self,
        kind: PropertyKind,
        function: &Function<'a>,
    ) -> PResult<()> {
        let params = &function.params;
        match kind {
            PropertyKind::Get if !params.items.is_empty() || params.rest.is_some() => {
                Err(self.error_at(params.range, &messages::GETTER_PARAMETERS, &[]))
            }
            PropertyKind::Set if params.rest.is_some() => {
                Err(self.error_at(params.range, &messages::SETTER_REST_PARAMETER, &[]))
            }
            PropertyKind::Set if params.items.len() != 1 => {
                Err(self.error_at(params.range, &messages::SETTER_PARAMETERS, &[]))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Arrow functions
    // ========================================================================

    /// The rest of an arrow function. The current token is `=>`. `params`
    /// builds the parameter list once the arrow's scope is entered, so
    /// that deferred checks on the names attach to the arrow.
    pub(crate) fn parse_arrow_function(
        &mut self,
        start: u32,
        is_async: bool,
        params: impl FnOnce(&mut Self) -> PResult<FormalParameters<'a>>,
    ) -> PResult<Expression<'a>> {
        if self.has_preceding_line_break() {
            return Err(self.error_here(&messages::NEWLINE_BEFORE_ARROW, &[]));
        }
        self.scopes.enter(ScopeFlags::FUNCTION | ScopeFlags::ARROW);
        let outer_labels = std::mem::take(&mut self.labels);
        let outer_positions = self.take_yield_await();

        let result = self.parse_arrow_function_worker(is_async, params);

        self.labels = outer_labels;
        self.yield_await = outer_positions;
        let hoisted = self.scopes.exit();
        let (params, mut body) = result?;
        if let ArrowBody::Block(block) = &mut body {
            block.annex_b_functions = self.resolve_atoms(hoisted);
        }

        let arrow = self.arena.alloc(ArrowFunction {
            range: self.range_from(start),
            params,
            body,
            is_async,
        });
        Ok(Expression::Arrow(arrow))
    }

    fn parse_arrow_function_worker(
        &mut self,
        is_async: bool,
        params: impl FnOnce(&mut Self) -> PResult<FormalParameters<'a>>,
    ) -> PResult<(FormalParameters<'a>, ArrowBody<'a>)> {
        let params = params(self)?;
        self.declare_parameters(&params, true)?;
        self.expect_token(SyntaxKind::EqualsGreaterThanToken)?;

        let disallow_in = self.in_context(ContextFlags::DISALLOW_IN);
        let context = self.context.for_arrow(is_async);
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            let simple = params.is_simple();
            ArrowBody::Block(self.with_context(context, |p| p.parse_function_body(simple))?)
        } else {
            let mut context = context;
            context.set(ContextFlags::DISALLOW_IN, disallow_in);
            let expression =
                self.with_context(context, |p| p.parse_assignment_expression_and_alloc())?;
            ArrowBody::Expression(expression)
        };
        Ok((params, body))
    }
}
