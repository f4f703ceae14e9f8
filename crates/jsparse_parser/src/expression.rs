//! Expressions.
//!
//! Binary operators use precedence climbing over
//! [`get_binary_operator_precedence`]. Parenthesized expressions, object and
//! array literals and `async(...)` calls double as the cover grammar for
//! arrow parameters and destructuring targets: they are parsed as
//! expressions, cover-only shapes are recorded in `cover_errors`, and the
//! token after them decides whether they get reinterpreted by `pattern.rs`.

use std::borrow::Cow;

use jsparse_ast::node::*;
use jsparse_ast::operators::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::messages;

use crate::context::ContextFlags;
use crate::parser::{CoverError, PResult, Parser};
use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};
use crate::utilities::can_start_expression;

impl<'a> Parser<'a> {
    // ========================================================================
    // Comma and assignment expressions
    // ========================================================================

    /// Expression: one or more assignment expressions separated by commas.
    pub(crate) fn parse_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let first = self.parse_assignment_expression()?;
        if self.current_token() != SyntaxKind::CommaToken {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.optional_token(SyntaxKind::CommaToken)? {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            range: self.range_from(start),
            expressions: self.alloc_vec(expressions),
        }))
    }

    /// Like [`Parser::parse_expression`], but a lone object or array literal
    /// keeps its cover errors for the caller. Used for `for` heads.
    pub(crate) fn parse_expression_cover(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let mark = self.cover_errors.len();
        let first = self.parse_assignment_expression_cover()?;
        if self.current_token() != SyntaxKind::CommaToken {
            return Ok(first);
        }
        self.check_cover_errors(mark)?;
        let mut expressions = vec![first];
        while self.optional_token(SyntaxKind::CommaToken)? {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            range: self.range_from(start),
            expressions: self.alloc_vec(expressions),
        }))
    }

    pub(crate) fn parse_expression_and_alloc(&mut self) -> PResult<&'a Expression<'a>> {
        let expression = self.parse_expression()?;
        Ok(self.arena.alloc(expression))
    }

    /// AssignmentExpression. Cover-only shapes left in the result are errors.
    pub(crate) fn parse_assignment_expression(&mut self) -> PResult<Expression<'a>> {
        let mark = self.cover_errors.len();
        let expression = self.parse_assignment_expression_cover()?;
        self.check_cover_errors(mark)?;
        Ok(expression)
    }

    pub(crate) fn parse_assignment_expression_and_alloc(&mut self) -> PResult<&'a Expression<'a>> {
        let expression = self.parse_assignment_expression()?;
        Ok(self.arena.alloc(expression))
    }

    /// AssignmentExpression inside a construct that may still become a
    /// pattern. If the result is an unparenthesized object or array literal,
    /// its cover errors stay recorded.
    pub(crate) fn parse_assignment_expression_cover(&mut self) -> PResult<Expression<'a>> {
        self.enter_recursion()?;
        let result = self.parse_assignment_expression_worker();
        self.leave_recursion();
        result
    }

    fn parse_assignment_expression_worker(&mut self) -> PResult<Expression<'a>> {
        if self.in_context(ContextFlags::YIELD) && self.is_contextual("yield") {
            return self.parse_yield_expression();
        }

        let start = self.token_pos();
        let mark = self.cover_errors.len();
        let left = self.parse_conditional_expression()?;
        if matches!(left, Expression::Arrow(_)) {
            return Ok(left);
        }

        let kind = self.current_token();
        let Some(operator) = AssignmentOperator::from_token(kind) else {
            if !matches!(left, Expression::Object(_) | Expression::Array(_)) {
                self.check_cover_errors(mark)?;
            }
            return Ok(left);
        };

        let left = &*self.arena.alloc(left);
        let is_pattern = matches!(left, Expression::Object(_) | Expression::Array(_));
        let target = if operator.is_plain() && is_pattern {
            let target = self.to_assignment_target(left)?;
            self.cover_errors.truncate(mark);
            target
        } else {
            self.check_cover_errors(mark)?;
            self.to_simple_target(left, &messages::INVALID_ASSIGNMENT_TARGET, &[])?
        };

        self.next_token()?;
        let right = self.parse_assignment_expression_and_alloc()?;
        Ok(Expression::Assignment(AssignmentExpression {
            range: self.range_from(start),
            operator,
            left: target,
            right,
        }))
    }

    fn parse_yield_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        if self.in_context(ContextFlags::PARAMETERS) {
            return Err(self.error_here(&messages::YIELD_IN_PARAMETER, &[]));
        }
        let range = self.token_range();
        self.yield_await.yield_expr.get_or_insert(range);
        self.next_token()?;

        let mut delegate = false;
        let mut argument = None;
        if !self.has_preceding_line_break() {
            if self.current_token() == SyntaxKind::AsteriskToken {
                delegate = true;
                self.next_token()?;
                argument = Some(self.parse_assignment_expression_and_alloc()?);
            } else if can_start_expression(self.current_token()) {
                argument = Some(self.parse_assignment_expression_and_alloc()?);
            }
        }
        Ok(Expression::Yield(YieldExpression {
            range: self.range_from(start),
            argument,
            delegate,
        }))
    }

    fn parse_conditional_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let test = self.parse_binary_expression(OperatorPrecedence::Lowest)?;
        if self.current_token() != SyntaxKind::QuestionToken
            || matches!(test, Expression::Arrow(_))
        {
            return Ok(test);
        }
        self.next_token()?;
        let consequent = self.allow_in(|p| p.parse_assignment_expression_and_alloc())?;
        self.expect_token(SyntaxKind::ColonToken)?;
        let alternate = self.parse_assignment_expression_and_alloc()?;
        Ok(Expression::Conditional(ConditionalExpression {
            range: self.range_from(start),
            test: self.arena.alloc(test),
            consequent,
            alternate,
        }))
    }

    // ========================================================================
    // Binary expressions
    // ========================================================================

    /// Binary operators binding tighter than `min_precedence`.
    fn parse_binary_expression(
        &mut self,
        min_precedence: OperatorPrecedence,
    ) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let mut left = if self.current_token() == SyntaxKind::PrivateIdentifier {
            self.parse_private_in(min_precedence)?
        } else {
            self.parse_unary_expression()?
        };
        if matches!(left, Expression::Arrow(_)) {
            return Ok(left);
        }

        let allow_in = !self.in_context(ContextFlags::DISALLOW_IN);
        loop {
            let kind = self.current_token();
            let precedence = get_binary_operator_precedence(kind, allow_in);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            if kind == SyntaxKind::AsteriskAsteriskToken
                && matches!(left, Expression::Unary(_) | Expression::Await(_))
            {
                return Err(self.error_at(left.range(), &messages::UNARY_BEFORE_EXPONENT, &[]));
            }

            self.next_token()?;
            let right = if precedence.is_right_associative() {
                self.parse_binary_expression(OperatorPrecedence::Multiplicative)?
            } else {
                self.parse_binary_expression(precedence)?
            };
            self.check_operand(&right)?;
            left = self.make_binary_expression(start, kind, left, right)?;
        }
        Ok(left)
    }

    fn make_binary_expression(
        &self,
        start: u32,
        kind: SyntaxKind,
        left: Expression<'a>,
        right: Expression<'a>,
    ) -> PResult<Expression<'a>> {
        let range = self.range_from(start);
        if let Some(operator) = LogicalOperator::from_token(kind) {
            let is_coalesce = operator == LogicalOperator::Coalesce;
            for operand in [&left, &right] {
                if let Expression::Logical(inner) = operand {
                    if (inner.operator == LogicalOperator::Coalesce) != is_coalesce {
                        return Err(self.error_at(range, &messages::MIXED_COALESCE, &[]));
                    }
                }
            }
            return Ok(Expression::Logical(LogicalExpression {
                range,
                operator,
                left: self.arena.alloc(left),
                right: self.arena.alloc(right),
            }));
        }
        let Some(operator) = BinaryOperator::from_token(kind) else {
            return Err(self.error_at(range, &messages::UNEXPECTED_TOKEN, &[kind.describe()]));
        };
        Ok(Expression::Binary(BinaryExpression {
            range,
            operator,
            left: self.arena.alloc(left),
            right: self.arena.alloc(right),
        }))
    }

    /// `#x in obj`
    fn parse_private_in(&mut self, min_precedence: OperatorPrecedence) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let left = self.parse_private_name()?;
        if self.current_token() != SyntaxKind::InKeyword
            || self.in_context(ContextFlags::DISALLOW_IN)
            || min_precedence >= OperatorPrecedence::Relational
        {
            return Err(self.error_at(left.range, &messages::UNEXPECTED_TOKEN, &[left.name]));
        }
        self.reference_private_name(&left)?;
        self.next_token()?;
        let right = self.parse_binary_expression(OperatorPrecedence::Relational)?;
        self.check_operand(&right)?;
        Ok(Expression::PrivateIn(PrivateInExpression {
            range: self.range_from(start),
            left,
            right: self.arena.alloc(right),
        }))
    }

    /// An arrow function cannot be the operand of an operator.
    fn check_operand(&self, expr: &Expression<'a>) -> PResult<()> {
        match expr {
            Expression::Arrow(arrow) => {
                Err(self.error_at(arrow.range, &messages::UNEXPECTED_TOKEN, &["=>"]))
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Unary and update expressions
    // ========================================================================

    fn parse_unary_expression(&mut self) -> PResult<Expression<'a>> {
        self.enter_recursion()?;
        let result = self.parse_unary_expression_worker();
        self.leave_recursion();
        result
    }

    fn parse_unary_expression_worker(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let kind = self.current_token();

        if let Some(operator) = UnaryOperator::from_token(kind) {
            self.next_token()?;
            let argument = self.parse_unary_expression()?;
            self.check_operand(&argument)?;
            if operator == UnaryOperator::Delete {
                self.check_delete_operand(&argument)?;
            }
            return Ok(Expression::Unary(UnaryExpression {
                range: self.range_from(start),
                operator,
                argument: self.arena.alloc(argument),
            }));
        }

        if let Some(operator) = UpdateOperator::from_token(kind) {
            self.next_token()?;
            let argument = self.parse_unary_expression()?;
            self.check_operand(&argument)?;
            self.check_simple_target(&argument, &messages::INVALID_UPDATE_TARGET, &["prefix"])?;
            return Ok(Expression::Update(UpdateExpression {
                range: self.range_from(start),
                operator,
                prefix: true,
                argument: self.arena.alloc(argument),
            }));
        }

        if self.is_contextual("await") {
            if self.in_context(ContextFlags::AWAIT) {
                return self.parse_await_expression();
            }
            if self.in_context(ContextFlags::CLASS_FIELD_INIT)
                && self.in_context(ContextFlags::MODULE)
            {
                return Err(self.error_here(&messages::AWAIT_IN_CLASS_FIELD, &[]));
            }
        }

        self.parse_postfix_expression()
    }

    fn check_delete_operand(&self, argument: &Expression<'a>) -> PResult<()> {
        let target = match argument.without_parentheses() {
            Expression::Chain(chain) => chain.expression,
            other => other,
        };
        match target {
            Expression::Identifier(id) if self.is_strict() => {
                Err(self.error_at(id.range, &messages::DELETE_IDENTIFIER_IN_STRICT, &[]))
            }
            Expression::Member(member) if matches!(member.property, MemberProperty::Private(_)) => {
                Err(self.error_at(member.range, &messages::PRIVATE_DELETE, &[]))
            }
            _ => Ok(()),
        }
    }

    fn parse_await_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        if self.in_context(ContextFlags::PARAMETERS) {
            return Err(self.error_here(&messages::AWAIT_IN_PARAMETER, &[]));
        }
        let range = self.token_range();
        self.yield_await.await_expr.get_or_insert(range);
        self.next_token()?;
        let argument = self.parse_unary_expression()?;
        self.check_operand(&argument)?;
        Ok(Expression::Await(AwaitExpression {
            range: self.range_from(start),
            argument: self.arena.alloc(argument),
        }))
    }

    fn parse_postfix_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let expression = self.parse_left_hand_side_expression()?;
        if matches!(expression, Expression::Arrow(_)) || self.has_preceding_line_break() {
            return Ok(expression);
        }
        let Some(operator) = UpdateOperator::from_token(self.current_token()) else {
            return Ok(expression);
        };
        self.check_simple_target(&expression, &messages::INVALID_UPDATE_TARGET, &["postfix"])?;
        self.next_token()?;
        Ok(Expression::Update(UpdateExpression {
            range: self.range_from(start),
            operator,
            prefix: false,
            argument: self.arena.alloc(expression),
        }))
    }

    // ========================================================================
    // Calls, members and `new`
    // ========================================================================

    fn parse_left_hand_side_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let expression = match self.current_token() {
            SyntaxKind::NewKeyword => self.parse_new_expression()?,
            SyntaxKind::SuperKeyword => self.parse_super_expression(true)?,
            SyntaxKind::ImportKeyword => self.parse_import_expression(true)?,
            _ => self.parse_primary_expression()?,
        };
        if matches!(expression, Expression::Arrow(_)) {
            return Ok(expression);
        }
        self.parse_call_and_member_rest(start, expression, true)
    }

    /// Member accesses, calls, optional chains and tagged templates after
    /// `expression`. Without `allow_call` this stops before `(`, for the
    /// callee of `new`.
    fn parse_call_and_member_rest(
        &mut self,
        start: u32,
        mut expression: Expression<'a>,
        allow_call: bool,
    ) -> PResult<Expression<'a>> {
        let mut in_chain = false;
        loop {
            expression = match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token()?;
                    let property = self.parse_member_name()?;
                    self.make_member(start, expression, property, false)
                }
                SyntaxKind::OpenBracketToken => {
                    let property = self.parse_computed_member()?;
                    self.make_member(start, expression, property, false)
                }
                SyntaxKind::QuestionDotToken => {
                    if !allow_call {
                        return Err(self.error_here(&messages::NEW_OPTIONAL_CHAIN, &[]));
                    }
                    in_chain = true;
                    self.next_token()?;
                    match self.current_token() {
                        SyntaxKind::OpenParenToken => {
                            let arguments = self.parse_arguments()?;
                            Expression::Call(CallExpression {
                                range: self.range_from(start),
                                callee: self.arena.alloc(expression),
                                arguments,
                                optional: true,
                            })
                        }
                        SyntaxKind::OpenBracketToken => {
                            let property = self.parse_computed_member()?;
                            self.make_member(start, expression, property, true)
                        }
                        SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                            return Err(self.error_here(&messages::TAGGED_TEMPLATE_IN_CHAIN, &[]));
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            self.make_member(start, expression, property, true)
                        }
                    }
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    if in_chain {
                        return Err(self.error_here(&messages::TAGGED_TEMPLATE_IN_CHAIN, &[]));
                    }
                    let quasi = self.parse_template_literal(true)?;
                    Expression::TaggedTemplate(TaggedTemplateExpression {
                        range: self.range_from(start),
                        tag: self.arena.alloc(expression),
                        quasi,
                    })
                }
                SyntaxKind::OpenParenToken if allow_call => {
                    let arguments = self.parse_arguments()?;
                    Expression::Call(CallExpression {
                        range: self.range_from(start),
                        callee: self.arena.alloc(expression),
                        arguments,
                        optional: false,
                    })
                }
                _ => break,
            };
        }

        if in_chain {
            expression = Expression::Chain(ChainExpression {
                range: self.range_from(start),
                expression: self.arena.alloc(expression),
            });
        }
        Ok(expression)
    }

    fn make_member(
        &self,
        start: u32,
        object: Expression<'a>,
        property: MemberProperty<'a>,
        optional: bool,
    ) -> Expression<'a> {
        Expression::Member(MemberExpression {
            range: self.range_from(start),
            object: self.arena.alloc(object),
            property,
            optional,
        })
    }

    fn parse_member_name(&mut self) -> PResult<MemberProperty<'a>> {
        if self.current_token() == SyntaxKind::PrivateIdentifier {
            let name = self.parse_private_name()?;
            self.reference_private_name(&name)?;
            return Ok(MemberProperty::Private(name));
        }
        Ok(MemberProperty::Static(self.parse_identifier_name()?))
    }

    fn parse_computed_member(&mut self) -> PResult<MemberProperty<'a>> {
        self.expect_token(SyntaxKind::OpenBracketToken)?;
        let property = self.allow_in(|p| p.parse_expression_and_alloc())?;
        self.expect_token(SyntaxKind::CloseBracketToken)?;
        Ok(MemberProperty::Computed(property))
    }

    /// Arguments: `( ... )` with spreads and an optional trailing comma.
    pub(crate) fn parse_arguments(&mut self) -> PResult<&'a [Argument<'a>]> {
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let arguments = self.allow_in(|p| {
            let mut arguments = Vec::new();
            while p.current_token() != SyntaxKind::CloseParenToken {
                arguments.push(p.parse_argument(false)?);
                if p.current_token() != SyntaxKind::CloseParenToken {
                    p.expect_token(SyntaxKind::CommaToken)?;
                }
            }
            Ok(arguments)
        })?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        Ok(self.alloc_vec(arguments))
    }

    fn parse_argument(&mut self, cover: bool) -> PResult<Argument<'a>> {
        let start = self.token_pos();
        let spread = self.optional_token(SyntaxKind::DotDotDotToken)?;
        let expression = if cover {
            self.parse_assignment_expression_cover()?
        } else {
            self.parse_assignment_expression()?
        };
        if !spread {
            return Ok(Argument::Expression(expression));
        }
        Ok(Argument::Spread(SpreadElement {
            range: self.range_from(start),
            argument: self.arena.alloc(expression),
        }))
    }

    fn parse_new_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let new_range = self.expect_token(SyntaxKind::NewKeyword)?;

        if self.current_token() == SyntaxKind::DotToken {
            self.next_token()?;
            if !self.is_contextual("target") {
                return Err(self.error_here(&messages::INVALID_META_PROPERTY, &["new", "target"]));
            }
            let property = Identifier {
                range: self.token_range(),
                name: "target",
            };
            self.next_token()?;
            let range = self.range_from(start);
            if !self.in_context(ContextFlags::NEW_TARGET) {
                return Err(self.error_at(range, &messages::NEW_TARGET_OUTSIDE_FUNCTION, &[]));
            }
            return Ok(Expression::MetaProperty(MetaProperty {
                range,
                meta: Identifier {
                    range: new_range,
                    name: "new",
                },
                property,
            }));
        }

        let callee_start = self.token_pos();
        let callee = match self.current_token() {
            SyntaxKind::NewKeyword => self.parse_new_expression()?,
            SyntaxKind::SuperKeyword => self.parse_super_expression(false)?,
            SyntaxKind::ImportKeyword => self.parse_import_expression(false)?,
            SyntaxKind::Identifier if self.is_contextual("async") => {
                Expression::Identifier(self.parse_identifier_reference()?)
            }
            _ => self.parse_primary_expression()?,
        };
        self.check_operand(&callee)?;
        let callee = self.parse_call_and_member_rest(callee_start, callee, false)?;

        let arguments = if self.current_token() == SyntaxKind::OpenParenToken {
            self.parse_arguments()?
        } else {
            &[]
        };
        Ok(Expression::New(NewExpression {
            range: self.range_from(start),
            callee: self.arena.alloc(callee),
            arguments,
        }))
    }

    /// `super` must be followed by a property access, or by arguments in a
    /// derived constructor.
    fn parse_super_expression(&mut self, allow_call: bool) -> PResult<Expression<'a>> {
        let range = self.expect_token(SyntaxKind::SuperKeyword)?;
        let allowed = match self.current_token() {
            SyntaxKind::OpenParenToken => allow_call && self.in_context(ContextFlags::SUPER_CALL),
            SyntaxKind::DotToken | SyntaxKind::OpenBracketToken => {
                self.in_context(ContextFlags::SUPER_PROPERTY)
            }
            _ => false,
        };
        if !allowed {
            return Err(self.error_at(range, &messages::UNEXPECTED_SUPER, &[]));
        }
        Ok(Expression::Super(SuperExpression { range }))
    }

    /// `import(...)` or `import.meta`.
    fn parse_import_expression(&mut self, allow_call: bool) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let import_range = self.expect_token(SyntaxKind::ImportKeyword)?;

        if self.optional_token(SyntaxKind::DotToken)? {
            if !self.is_contextual("meta") {
                return Err(self.error_here(&messages::INVALID_META_PROPERTY, &["import", "meta"]));
            }
            let property = Identifier {
                range: self.token_range(),
                name: "meta",
            };
            self.next_token()?;
            let range = self.range_from(start);
            if !self.options.module {
                return Err(self.error_at(range, &messages::IMPORT_META_OUTSIDE_MODULE, &[]));
            }
            return Ok(Expression::MetaProperty(MetaProperty {
                range,
                meta: Identifier {
                    range: import_range,
                    name: "import",
                },
                property,
            }));
        }

        if !allow_call || self.current_token() != SyntaxKind::OpenParenToken {
            return Err(self.unexpected());
        }
        self.next_token()?;
        let (source, options) = self.allow_in(|p| {
            let source = p.parse_assignment_expression_and_alloc()?;
            let mut options = None;
            if p.optional_token(SyntaxKind::CommaToken)?
                && p.current_token() != SyntaxKind::CloseParenToken
            {
                options = Some(p.parse_assignment_expression_and_alloc()?);
                p.optional_token(SyntaxKind::CommaToken)?;
            }
            Ok((source, options))
        })?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        Ok(Expression::Import(ImportExpression {
            range: self.range_from(start),
            source,
            options,
        }))
    }

    // ========================================================================
    // Primary expressions
    // ========================================================================

    fn parse_primary_expression(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let range = self.token_range();
        let expression = match self.current_token() {
            SyntaxKind::Identifier => return self.parse_identifier_or_arrow(),
            SyntaxKind::NumericLiteral => Expression::Numeric(self.parse_numeric_literal()?),
            SyntaxKind::BigIntLiteral => Expression::BigInt(self.parse_bigint_literal()?),
            SyntaxKind::StringLiteral => Expression::String(self.parse_string_literal()?),
            SyntaxKind::NullKeyword => {
                self.next_token()?;
                Expression::Null(NullLiteral { range })
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let value = self.current_token() == SyntaxKind::TrueKeyword;
                self.next_token()?;
                Expression::Boolean(BooleanLiteral { range, value })
            }
            SyntaxKind::ThisKeyword => {
                self.next_token()?;
                Expression::This(ThisExpression { range })
            }
            SyntaxKind::OpenParenToken => return self.parse_parenthesized_or_arrow(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal()?,
            SyntaxKind::OpenBraceToken => self.parse_object_literal()?,
            SyntaxKind::FunctionKeyword => {
                Expression::Function(self.parse_function_expression(start, false)?)
            }
            SyntaxKind::ClassKeyword => Expression::Class(self.parse_class_expression()?),
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                Expression::Template(self.parse_template_literal(false)?)
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.scanner.rescan_slash_token()?;
                let (pattern, flags) = self.scanner.regexp_parts();
                let range = self.token_range();
                self.next_token()?;
                Expression::RegExp(RegExpLiteral { range, pattern, flags })
            }
            _ => return Err(self.unexpected()),
        };
        Ok(expression)
    }

    /// An identifier reference, or the start of an arrow function or an
    /// `async` construct.
    fn parse_identifier_or_arrow(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        if self.is_contextual("async") {
            let next = self.peek_token();
            match next.kind {
                SyntaxKind::FunctionKeyword if !next.has_preceding_line_break() => {
                    self.next_token()?;
                    return Ok(Expression::Function(self.parse_function_expression(start, true)?));
                }
                SyntaxKind::Identifier
                    if !next.has_preceding_line_break() && !self.is_async_of_head() =>
                {
                    return self.parse_async_arrow_with_identifier(start);
                }
                SyntaxKind::OpenParenToken => return self.parse_async_call_or_arrow(start),
                _ => {}
            }
        }

        let id = self.parse_identifier_reference()?;
        if self.current_token() == SyntaxKind::EqualsGreaterThanToken {
            return self.parse_arrow_function(start, false, move |p| {
                p.check_binding_name(&id)?;
                Ok(FormalParameters {
                    range: id.range,
                    items: p.alloc_vec(vec![Pattern::Identifier(id)]),
                    rest: None,
                })
            });
        }
        Ok(Expression::Identifier(id))
    }

    /// `async of` not followed by `=>`: `async` is a plain identifier on the
    /// left of a for-of head.
    fn is_async_of_head(&mut self) -> bool {
        self.scanner.look_ahead(|scanner| {
            let is_of = scanner.scan().is_ok() && scanner.is_contextual("of");
            is_of && !matches!(scanner.scan(), Ok(SyntaxKind::EqualsGreaterThanToken))
        })
    }

    /// `async x => ...`
    fn parse_async_arrow_with_identifier(&mut self, start: u32) -> PResult<Expression<'a>> {
        self.next_token()?;
        let id = self.parse_identifier_token()?;
        if id.name == "await" {
            return Err(self.error_at(id.range, &messages::UNEXPECTED_RESERVED_WORD, &[id.name]));
        }
        if self.current_token() != SyntaxKind::EqualsGreaterThanToken {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &["=>"]));
        }
        self.parse_arrow_function(start, true, move |p| {
            p.check_binding_name(&id)?;
            Ok(FormalParameters {
                range: id.range,
                items: p.alloc_vec(vec![Pattern::Identifier(id)]),
                rest: None,
            })
        })
    }

    /// `async(...)`: a call, or the parameters of an async arrow function.
    fn parse_async_call_or_arrow(&mut self, start: u32) -> PResult<Expression<'a>> {
        let async_id = self.parse_identifier_reference()?;
        let line_break_before_paren = self.has_preceding_line_break();
        let mark = self.cover_errors.len();
        let outer = self.take_yield_await();

        let paren_start = self.token_pos();
        self.expect_token(SyntaxKind::OpenParenToken)?;
        let (arguments, trailing_comma) = self.allow_in(|p| {
            let mut arguments = Vec::new();
            let mut trailing_comma = false;
            while p.current_token() != SyntaxKind::CloseParenToken {
                arguments.push(p.parse_argument(true)?);
                if p.current_token() == SyntaxKind::CloseParenToken {
                    break;
                }
                p.expect_token(SyntaxKind::CommaToken)?;
                trailing_comma = p.current_token() == SyntaxKind::CloseParenToken;
            }
            Ok((arguments, trailing_comma))
        })?;
        self.expect_token(SyntaxKind::CloseParenToken)?;
        let arguments = self.alloc_vec(arguments);

        if self.current_token() == SyntaxKind::EqualsGreaterThanToken {
            if line_break_before_paren {
                return Err(self.error_at(async_id.range, &messages::NEWLINE_AFTER_ASYNC, &[]));
            }
            let seen = self.yield_await;
            if let Some(range) = seen.yield_expr {
                return Err(self.error_at(range, &messages::YIELD_IN_PARAMETER, &[]));
            }
            if let Some(range) = seen.await_expr {
                return Err(self.error_at(range, &messages::AWAIT_IN_PARAMETER, &[]));
            }
            if let Some(range) = seen.await_ident {
                return Err(self.error_at(range, &messages::UNEXPECTED_RESERVED_WORD, &["await"]));
            }
            self.yield_await = outer;
            self.cover_errors.truncate(mark);
            let range = self.range_from(paren_start);
            return self.parse_arrow_function(start, true, move |p| {
                p.async_arguments_to_parameters(range, arguments, trailing_comma)
            });
        }

        self.check_cover_errors(mark)?;
        self.merge_yield_await(outer);
        Ok(Expression::Call(CallExpression {
            range: self.range_from(start),
            callee: self.arena.alloc(Expression::Identifier(async_id)),
            arguments,
            optional: false,
        }))
    }

    /// `( ... )`: a parenthesized expression or arrow parameters.
    fn parse_parenthesized_or_arrow(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        let mark = self.cover_errors.len();
        let outer = self.take_yield_await();
        self.expect_token(SyntaxKind::OpenParenToken)?;

        let (items, rest, trailing_comma) = self.allow_in(|p| {
            let mut items = Vec::new();
            let mut rest = None;
            let mut trailing_comma = false;
            while p.current_token() != SyntaxKind::CloseParenToken {
                if p.current_token() == SyntaxKind::DotDotDotToken {
                    let rest_start = p.token_pos();
                    p.next_token()?;
                    let argument = p.parse_binding_target()?;
                    if p.current_token() == SyntaxKind::EqualsToken {
                        return Err(p.error_here(&messages::REST_WITH_INITIALIZER, &[]));
                    }
                    if p.current_token() != SyntaxKind::CloseParenToken {
                        return Err(p.error_here(&messages::REST_NOT_LAST, &[]));
                    }
                    let element = RestElement {
                        range: p.range_from(rest_start),
                        argument,
                    };
                    rest = Some(&*p.arena.alloc(element));
                    break;
                }
                items.push(p.parse_assignment_expression_cover()?);
                if p.current_token() == SyntaxKind::CloseParenToken {
                    break;
                }
                p.expect_token(SyntaxKind::CommaToken)?;
                trailing_comma = p.current_token() == SyntaxKind::CloseParenToken;
            }
            Ok((items, rest, trailing_comma))
        })?;
        self.expect_token(SyntaxKind::CloseParenToken)?;

        if self.current_token() == SyntaxKind::EqualsGreaterThanToken {
            let seen = self.yield_await;
            if let Some(range) = seen.yield_expr {
                return Err(self.error_at(range, &messages::YIELD_IN_PARAMETER, &[]));
            }
            if let Some(range) = seen.await_expr {
                return Err(self.error_at(range, &messages::AWAIT_IN_PARAMETER, &[]));
            }
            self.yield_await = outer;
            self.cover_errors.truncate(mark);
            let range = self.range_from(start);
            let items = self.alloc_vec(items);
            return self.parse_arrow_function(start, false, move |p| {
                p.to_arrow_parameters(range, items, rest)
            });
        }

        if items.is_empty() || rest.is_some() || trailing_comma {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &["=>"]));
        }
        self.check_cover_errors(mark)?;
        self.merge_yield_await(outer);

        let mut items = items;
        let expression = match items.pop() {
            Some(only) if items.is_empty() => only,
            Some(last) => {
                items.push(last);
                let first = items.first().map_or(start, |e| e.range().start);
                let end = items.last().map_or(start, |e| e.range().end);
                Expression::Sequence(SequenceExpression {
                    range: TextRange::new(first, end),
                    expressions: self.alloc_vec(items),
                })
            }
            None => return Err(self.unexpected()),
        };
        Ok(Expression::Parenthesized(ParenthesizedExpression {
            range: self.range_from(start),
            expression: self.arena.alloc(expression),
        }))
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn parse_array_literal(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken)?;
        let elements = self.allow_in(|p| {
            let mut elements = Vec::new();
            loop {
                match p.current_token() {
                    SyntaxKind::CloseBracketToken => break,
                    SyntaxKind::CommaToken => {
                        elements.push(ArrayElement::Hole(p.token_range()));
                        p.next_token()?;
                        continue;
                    }
                    SyntaxKind::DotDotDotToken => {
                        let spread = p.parse_spread_element()?;
                        if p.current_token() == SyntaxKind::CommaToken {
                            p.rest_trailing_commas.insert(start);
                        }
                        elements.push(ArrayElement::Spread(spread));
                    }
                    _ => {
                        let element = p.parse_assignment_expression_cover()?;
                        elements.push(ArrayElement::Expression(element));
                    }
                }
                if p.current_token() != SyntaxKind::CloseBracketToken {
                    p.expect_token(SyntaxKind::CommaToken)?;
                }
            }
            Ok(elements)
        })?;
        self.expect_token(SyntaxKind::CloseBracketToken)?;
        Ok(Expression::Array(ArrayExpression {
            range: self.range_from(start),
            elements: self.alloc_vec(elements),
        }))
    }

    fn parse_spread_element(&mut self) -> PResult<SpreadElement<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::DotDotDotToken)?;
        let argument = self.parse_assignment_expression_cover()?;
        Ok(SpreadElement {
            range: self.range_from(start),
            argument: self.arena.alloc(argument),
        })
    }

    fn parse_object_literal(&mut self) -> PResult<Expression<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let properties = self.allow_in(|p| {
            let mut properties = Vec::new();
            let mut has_proto = false;
            while p.current_token() != SyntaxKind::CloseBraceToken {
                if p.current_token() == SyntaxKind::DotDotDotToken {
                    let spread = p.parse_spread_element()?;
                    if p.current_token() == SyntaxKind::CommaToken {
                        p.rest_trailing_commas.insert(start);
                    }
                    properties.push(ObjectMember::Spread(spread));
                } else {
                    let property = p.parse_object_property(&mut has_proto)?;
                    properties.push(ObjectMember::Property(property));
                }
                if p.current_token() != SyntaxKind::CloseBraceToken {
                    p.expect_token(SyntaxKind::CommaToken)?;
                }
            }
            Ok(properties)
        })?;
        self.expect_token(SyntaxKind::CloseBraceToken)?;
        Ok(Expression::Object(ObjectExpression {
            range: self.range_from(start),
            properties: self.alloc_vec(properties),
        }))
    }

    /// Whether the contextual word at the current token is a modifier
    /// (`async`, `get`, `set`) rather than the property name itself.
    fn is_property_modifier(&mut self, allow_line_break: bool) -> bool {
        let next = self.peek_token();
        if !allow_line_break && next.has_preceding_line_break() {
            return false;
        }
        !matches!(
            next.kind,
            SyntaxKind::CommaToken
                | SyntaxKind::ColonToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::EndOfFileToken
        )
    }

    fn parse_object_property(&mut self, has_proto: &mut bool) -> PResult<ObjectProperty<'a>> {
        let start = self.token_pos();
        let mut is_async = false;
        let mut kind = PropertyKind::Init;
        if self.is_contextual("async") && self.is_property_modifier(false) {
            is_async = true;
            self.next_token()?;
        }
        let is_generator = self.optional_token(SyntaxKind::AsteriskToken)?;
        if !is_async
            && !is_generator
            && (self.is_contextual("get") || self.is_contextual("set"))
            && self.is_property_modifier(true)
        {
            kind = if self.is_contextual("get") { PropertyKind::Get } else { PropertyKind::Set };
            self.next_token()?;
        }

        let is_identifier = self.current_token() == SyntaxKind::Identifier;
        let escaped = self.scanner.token_flags().contains(TokenFlags::UNICODE_ESCAPE);
        let (key, computed) = self.parse_property_key(false)?;

        if self.current_token() == SyntaxKind::OpenParenToken {
            let function = self.parse_method(is_async, is_generator, ContextFlags::SUPER_PROPERTY)?;
            self.check_accessor_parameters(kind, function)?;
            return Ok(ObjectProperty {
                range: self.range_from(start),
                key,
                value: Expression::Function(function),
                kind,
                method: kind == PropertyKind::Init,
                shorthand: false,
                computed,
            });
        }
        if is_async || is_generator || kind != PropertyKind::Init {
            return Err(self.error_here(&messages::EXPECTED_TOKEN, &["("]));
        }

        if self.optional_token(SyntaxKind::ColonToken)? {
            if !computed && key.static_name() == Some("__proto__") {
                if *has_proto {
                    self.cover_errors.push(CoverError {
                        range: key.range(),
                        message: &messages::DUPLICATE_PROTO,
                    });
                }
                *has_proto = true;
            }
            let value = self.parse_assignment_expression_cover()?;
            return Ok(ObjectProperty {
                range: self.range_from(start),
                key,
                value,
                kind,
                method: false,
                shorthand: false,
                computed,
            });
        }

        // Shorthand `{ a }`, or the cover-only `{ a = 1 }`.
        let PropertyKey::Identifier(id) = key else {
            return Err(self.unexpected());
        };
        if !is_identifier {
            return Err(self.error_at(id.range, &messages::UNEXPECTED_RESERVED_WORD, &[id.name]));
        }
        self.check_unreserved(id.name, id.range, escaped)?;
        self.note_await_identifier(&id);

        let value = if self.current_token() == SyntaxKind::EqualsToken {
            self.check_assignable_name(&id)?;
            self.next_token()?;
            let right = self.parse_assignment_expression_and_alloc()?;
            let range = self.range_from(start);
            self.cover_errors.push(CoverError {
                range,
                message: &messages::INVALID_SHORTHAND_INITIALIZER,
            });
            Expression::Assignment(AssignmentExpression {
                range,
                operator: AssignmentOperator::Assign,
                left: Pattern::Identifier(id),
                right,
            })
        } else {
            Expression::Identifier(id)
        };
        Ok(ObjectProperty {
            range: self.range_from(start),
            key,
            value,
            kind,
            method: false,
            shorthand: true,
            computed: false,
        })
    }

    /// A property name. Returns the key and whether it was computed.
    pub(crate) fn parse_property_key(
        &mut self,
        allow_private: bool,
    ) -> PResult<(PropertyKey<'a>, bool)> {
        let key = match self.current_token() {
            SyntaxKind::StringLiteral => PropertyKey::String(self.parse_string_literal()?),
            SyntaxKind::NumericLiteral => PropertyKey::Numeric(self.parse_numeric_literal()?),
            SyntaxKind::BigIntLiteral => PropertyKey::BigInt(self.parse_bigint_literal()?),
            SyntaxKind::PrivateIdentifier if allow_private => {
                PropertyKey::Private(self.parse_private_name()?)
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token()?;
                let expression = self.allow_in(|p| p.parse_assignment_expression_and_alloc())?;
                self.expect_token(SyntaxKind::CloseBracketToken)?;
                return Ok((PropertyKey::Computed(expression), true));
            }
            kind if kind.is_identifier_name() => {
                PropertyKey::Identifier(self.parse_identifier_name()?)
            }
            _ => return Err(self.unexpected()),
        };
        Ok((key, false))
    }

    // ========================================================================
    // Templates
    // ========================================================================

    /// A template literal. In a tagged template an invalid escape leaves the
    /// cooked value undefined instead of being an error.
    pub(crate) fn parse_template_literal(&mut self, tagged: bool) -> PResult<TemplateLiteral<'a>> {
        let start = self.token_pos();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let element = self.parse_template_element(tagged)?;
            let tail = element.tail;
            quasis.push(element);
            self.next_token()?;
            if tail {
                break;
            }
            expressions.push(self.allow_in(|p| p.parse_expression())?);
            if self.current_token() != SyntaxKind::CloseBraceToken {
                return Err(self.error_here(&messages::EXPECTED_TOKEN, &["}"]));
            }
            self.scanner.rescan_template_continuation()?;
        }
        Ok(TemplateLiteral {
            range: self.range_from(start),
            quasis: self.alloc_vec(quasis),
            expressions: self.alloc_vec(expressions),
        })
    }

    fn parse_template_element(&self, tagged: bool) -> PResult<TemplateElement<'a>> {
        let kind = self.current_token();
        if !kind.is_template() {
            return Err(self.unexpected());
        }
        let cooked = match self.scanner.template_cooked() {
            Some(cooked) => Some(&*self.arena.alloc_str(cooked)),
            None if tagged => None,
            None => {
                return Err(match self.scanner.template_error() {
                    Some(error) => self.error_at(error.range, error.message, &[]),
                    None => self.unexpected(),
                })
            }
        };
        let raw = match self.scanner.template_raw() {
            Cow::Borrowed(raw) => raw,
            Cow::Owned(raw) => &*self.arena.alloc_str(&raw),
        };
        Ok(TemplateElement {
            range: self.token_range(),
            raw,
            cooked,
            tail: matches!(
                kind,
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateTail
            ),
        })
    }
}
