//! Binding patterns and the pattern/target validator.
//!
//! Declarations and function parameters are parsed directly as patterns.
//! Everything else (assignment targets, `for-in`/`for-of` heads, arrow
//! parameters) is first parsed as an expression and reinterpreted here once
//! the parser sees the token that decides it. Reinterpretation walks the
//! already built tree; it never goes back to the scanner.

use jsparse_ast::node::*;
use jsparse_ast::syntax_kind::SyntaxKind;
use jsparse_ast::types::*;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::{messages, DiagnosticMessage};

use crate::parser::{PResult, Parser};
use crate::utilities::is_restricted_name;

/// How an expression is being reinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetMode {
    /// The left side of `=`, or a `for-in`/`for-of` head without a declaration.
    Assignment,
    /// A declaration or an arrow parameter.
    Binding,
}

impl TargetMode {
    fn invalid_target(self) -> &'static DiagnosticMessage {
        match self {
            TargetMode::Assignment => &messages::INVALID_DESTRUCTURING_TARGET,
            TargetMode::Binding => &messages::INVALID_BINDING_PATTERN,
        }
    }
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Binding patterns
    // ========================================================================

    /// BindingIdentifier or BindingPattern. The caller declares the names.
    pub(crate) fn parse_binding_target(&mut self) -> PResult<Pattern<'a>> {
        match self.current_token() {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => Ok(Pattern::Identifier(self.parse_binding_identifier()?)),
        }
    }

    /// A binding target with an optional default value.
    pub(crate) fn parse_binding_element(&mut self) -> PResult<Pattern<'a>> {
        let start = self.token_pos();
        let target = self.parse_binding_target()?;
        self.parse_binding_default(start, target)
    }

    fn parse_binding_default(&mut self, start: u32, target: Pattern<'a>) -> PResult<Pattern<'a>> {
        if self.current_token() != SyntaxKind::EqualsToken {
            return Ok(target);
        }
        self.next_token()?;
        let right = self.allow_in(|p| p.parse_assignment_expression())?;
        Ok(Pattern::Assignment(AssignmentPattern {
            range: self.range_from(start),
            left: self.arena.alloc(target),
            right: self.arena.alloc(right),
        }))
    }

    fn parse_object_binding_pattern(&mut self) -> PResult<Pattern<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken)?;
        let mut properties = Vec::new();
        let mut rest = None;

        while self.current_token() != SyntaxKind::CloseBraceToken {
            if self.current_token() == SyntaxKind::DotDotDotToken {
                let rest_start = self.token_pos();
                self.next_token()?;
                let id = self.parse_binding_identifier()?;
                let element = RestElement {
                    range: self.range_from(rest_start),
                    argument: Pattern::Identifier(id),
                };
                rest = Some(&*self.arena.alloc(element));
                if self.current_token() != SyntaxKind::CloseBraceToken {
                    return Err(self.error_here(&messages::REST_NOT_LAST, &[]));
                }
                break;
            }
            properties.push(self.parse_binding_property()?);
            if self.current_token() != SyntaxKind::CloseBraceToken {
                self.expect_token(SyntaxKind::CommaToken)?;
            }
        }
        self.expect_token(SyntaxKind::CloseBraceToken)?;

        Ok(Pattern::Object(ObjectPattern {
            range: self.range_from(start),
            properties: self.alloc_vec(properties),
            rest,
        }))
    }

    fn parse_binding_property(&mut self) -> PResult<PatternProperty<'a>> {
        let start = self.token_pos();
        let is_identifier = self.current_token() == SyntaxKind::Identifier;
        let escaped = self.scanner.token_flags().contains(TokenFlags::UNICODE_ESCAPE);
        let (key, computed) = self.parse_property_key(false)?;

        if self.optional_token(SyntaxKind::ColonToken)? {
            let value = self.parse_binding_element()?;
            return Ok(PatternProperty {
                range: self.range_from(start),
                key,
                value,
                shorthand: false,
                computed,
            });
        }

        // Shorthand `{ a }` or `{ a = 1 }`.
        let PropertyKey::Identifier(id) = key else {
            return Err(self.unexpected());
        };
        if !is_identifier {
            return Err(self.error_at(id.range, &messages::UNEXPECTED_RESERVED_WORD, &[id.name]));
        }
        self.check_unreserved(id.name, id.range, escaped)?;
        self.check_binding_name(&id)?;
        let value = self.parse_binding_default(start, Pattern::Identifier(id))?;
        Ok(PatternProperty {
            range: self.range_from(start),
            key,
            value,
            shorthand: true,
            computed: false,
        })
    }

    fn parse_array_binding_pattern(&mut self) -> PResult<Pattern<'a>> {
        let start = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken)?;
        let mut elements = Vec::new();
        let mut rest = None;

        loop {
            match self.current_token() {
                SyntaxKind::CloseBracketToken => break,
                SyntaxKind::CommaToken => {
                    self.next_token()?;
                    elements.push(None);
                }
                SyntaxKind::DotDotDotToken => {
                    let rest_start = self.token_pos();
                    self.next_token()?;
                    let argument = self.parse_binding_target()?;
                    if self.current_token() == SyntaxKind::EqualsToken {
                        return Err(self.error_here(&messages::REST_WITH_INITIALIZER, &[]));
                    }
                    let element = RestElement {
                        range: self.range_from(rest_start),
                        argument,
                    };
                    rest = Some(&*self.arena.alloc(element));
                    if self.current_token() != SyntaxKind::CloseBracketToken {
                        return Err(self.error_here(&messages::REST_NOT_LAST, &[]));
                    }
                    break;
                }
                _ => {
                    elements.push(Some(self.parse_binding_element()?));
                    if self.current_token() != SyntaxKind::CloseBracketToken {
                        self.expect_token(SyntaxKind::CommaToken)?;
                    }
                }
            }
        }
        self.expect_token(SyntaxKind::CloseBracketToken)?;

        Ok(Pattern::Array(ArrayPattern {
            range: self.range_from(start),
            elements: self.alloc_vec(elements),
            rest,
        }))
    }

    // ========================================================================
    // Expression to pattern
    // ========================================================================

    /// Reinterpret the left side of `=` as an assignment target.
    pub(crate) fn to_assignment_target(
        &mut self,
        expr: &'a Expression<'a>,
    ) -> PResult<Pattern<'a>> {
        match expr {
            Expression::Object(_) | Expression::Array(_) => {
                self.to_pattern(expr, TargetMode::Assignment)
            }
            _ => self.to_simple_target(expr, &messages::INVALID_ASSIGNMENT_TARGET, &[]),
        }
    }

    /// An identifier or member expression, possibly parenthesized. Targets of
    /// compound assignment and `for-in`/`for-of` heads.
    pub(crate) fn to_simple_target(
        &mut self,
        expr: &'a Expression<'a>,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> PResult<Pattern<'a>> {
        match expr {
            Expression::Identifier(id) => {
                self.check_assignable_name(id)?;
                Ok(Pattern::Identifier(*id))
            }
            Expression::Member(member) => Ok(Pattern::Member(member)),
            Expression::Parenthesized(paren) => {
                if matches!(
                    paren.expression.without_parentheses(),
                    Expression::Object(_) | Expression::Array(_)
                ) {
                    return Err(self.error_at(expr.range(), &messages::PARENTHESIZED_PATTERN, &[]));
                }
                let target = self.to_simple_target(paren.expression, message, args)?;
                if let Pattern::Identifier(id) = &target {
                    self.parenthesized_targets.insert(id.range.start);
                }
                Ok(target)
            }
            _ => Err(self.error_at(expr.range(), message, args)),
        }
    }

    /// Like [`Parser::to_simple_target`] without building a pattern. Used
    /// for the operands of `++` and `--`.
    pub(crate) fn check_simple_target(
        &self,
        expr: &Expression<'a>,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> PResult<()> {
        match expr.without_parentheses() {
            Expression::Identifier(id) => self.check_assignable_name(id),
            Expression::Member(_) => Ok(()),
            _ => Err(self.error_at(expr.range(), message, args)),
        }
    }

    pub(crate) fn check_assignable_name(&self, id: &Identifier<'a>) -> PResult<()> {
        if self.is_strict() && is_restricted_name(id.name) {
            return Err(self.error_at(id.range, &messages::RESTRICTED_NAME_IN_STRICT, &[id.name]));
        }
        Ok(())
    }

    /// Reinterpret an expression as a destructuring target.
    pub(crate) fn to_pattern(
        &mut self,
        expr: &'a Expression<'a>,
        mode: TargetMode,
    ) -> PResult<Pattern<'a>> {
        match (expr, mode) {
            (Expression::Identifier(id), TargetMode::Assignment) => {
                self.check_assignable_name(id)?;
                Ok(Pattern::Identifier(*id))
            }
            (Expression::Identifier(id), TargetMode::Binding) => {
                self.check_binding_name(id)?;
                Ok(Pattern::Identifier(*id))
            }
            (Expression::Member(member), TargetMode::Assignment) => Ok(Pattern::Member(member)),
            (Expression::Parenthesized(_), TargetMode::Assignment) => {
                self.to_simple_target(expr, &messages::INVALID_DESTRUCTURING_TARGET, &[])
            }
            (Expression::Parenthesized(_), TargetMode::Binding) => {
                Err(self.error_at(expr.range(), &messages::PARENTHESIZED_PATTERN, &[]))
            }
            (Expression::Array(array), _) => self.array_to_pattern(array, mode),
            (Expression::Object(object), _) => self.object_to_pattern(object, mode),
            _ => Err(self.error_at(expr.range(), mode.invalid_target(), &[])),
        }
    }

    /// An element of a destructuring pattern, which may carry a default.
    fn element_to_pattern(
        &mut self,
        expr: &'a Expression<'a>,
        mode: TargetMode,
    ) -> PResult<Pattern<'a>> {
        if let Expression::Assignment(assign) = expr {
            if !assign.operator.is_plain() {
                return Err(self.error_at(expr.range(), mode.invalid_target(), &[]));
            }
            if mode == TargetMode::Binding {
                self.validate_binding(&assign.left)?;
            }
            return Ok(Pattern::Assignment(AssignmentPattern {
                range: assign.range,
                left: &assign.left,
                right: assign.right,
            }));
        }
        self.to_pattern(expr, mode)
    }

    fn array_to_pattern(
        &mut self,
        array: &'a ArrayExpression<'a>,
        mode: TargetMode,
    ) -> PResult<Pattern<'a>> {
        let mut elements = Vec::with_capacity(array.elements.len());
        let mut rest = None;
        let last = array.elements.len().saturating_sub(1);

        for (index, element) in array.elements.iter().enumerate() {
            match element {
                ArrayElement::Hole(_) => elements.push(None),
                ArrayElement::Expression(expr) => {
                    elements.push(Some(self.element_to_pattern(expr, mode)?));
                }
                ArrayElement::Spread(spread) => {
                    if index != last || self.rest_trailing_commas.contains(&array.range.start) {
                        return Err(self.error_at(spread.range, &messages::REST_NOT_LAST, &[]));
                    }
                    rest = Some(self.spread_to_rest(spread, mode)?);
                }
            }
        }

        Ok(Pattern::Array(ArrayPattern {
            range: array.range,
            elements: self.alloc_vec(elements),
            rest,
        }))
    }

    fn object_to_pattern(
        &mut self,
        object: &'a ObjectExpression<'a>,
        mode: TargetMode,
    ) -> PResult<Pattern<'a>> {
        let mut properties = Vec::with_capacity(object.properties.len());
        let mut rest = None;
        let last = object.properties.len().saturating_sub(1);

        for (index, member) in object.properties.iter().enumerate() {
            match member {
                ObjectMember::Property(property) => {
                    if property.method || property.kind != PropertyKind::Init {
                        return Err(self.error_at(property.range, mode.invalid_target(), &[]));
                    }
                    let value = self.element_to_pattern(&property.value, mode)?;
                    properties.push(PatternProperty {
                        range: property.range,
                        key: property.key,
                        value,
                        shorthand: property.shorthand,
                        computed: property.computed,
                    });
                }
                ObjectMember::Spread(spread) => {
                    if index != last || self.rest_trailing_commas.contains(&object.range.start) {
                        return Err(self.error_at(spread.range, &messages::REST_NOT_LAST, &[]));
                    }
                    let simple = match mode {
                        TargetMode::Binding => matches!(spread.argument, Expression::Identifier(_)),
                        TargetMode::Assignment => matches!(
                            spread.argument.without_parentheses(),
                            Expression::Identifier(_) | Expression::Member(_)
                        ),
                    };
                    if !simple {
                        let range = spread.argument.range();
                        return Err(self.error_at(range, &messages::INVALID_REST_ELEMENT, &[]));
                    }
                    rest = Some(self.spread_to_rest(spread, mode)?);
                }
            }
        }

        Ok(Pattern::Object(ObjectPattern {
            range: object.range,
            properties: self.alloc_vec(properties),
            rest,
        }))
    }

    pub(crate) fn spread_to_rest(
        &mut self,
        spread: &'a SpreadElement<'a>,
        mode: TargetMode,
    ) -> PResult<&'a RestElement<'a>> {
        if matches!(spread.argument, Expression::Assignment(_)) {
            let range = spread.argument.range();
            return Err(self.error_at(range, &messages::REST_WITH_INITIALIZER, &[]));
        }
        let argument = self.to_pattern(spread.argument, mode)?;
        Ok(self.arena.alloc(RestElement {
            range: spread.range,
            argument,
        }))
    }

    /// Check a target converted for assignment before it is used in a
    /// binding position, as in the defaulted arrow parameter `([a] = b) => a`.
    fn validate_binding(&mut self, pattern: &Pattern<'a>) -> PResult<()> {
        match pattern {
            Pattern::Identifier(id) => {
                if self.parenthesized_targets.contains(&id.range.start) {
                    return Err(self.error_at(id.range, &messages::PARENTHESIZED_PATTERN, &[]));
                }
                self.check_binding_name(id)
            }
            Pattern::Member(member) => {
                Err(self.error_at(member.range, &messages::INVALID_BINDING_PATTERN, &[]))
            }
            Pattern::Object(object) => {
                for property in object.properties {
                    self.validate_binding(&property.value)?;
                }
                match object.rest {
                    Some(rest) => self.validate_binding(&rest.argument),
                    None => Ok(()),
                }
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.validate_binding(element)?;
                }
                match array.rest {
                    Some(rest) => self.validate_binding(&rest.argument),
                    None => Ok(()),
                }
            }
            Pattern::Assignment(assign) => self.validate_binding(assign.left),
        }
    }

    /// Turn the items of a parenthesized cover into arrow parameters.
    pub(crate) fn to_arrow_parameters(
        &mut self,
        range: TextRange,
        items: impl IntoIterator<Item = &'a Expression<'a>>,
        rest: Option<&'a RestElement<'a>>,
    ) -> PResult<FormalParameters<'a>> {
        let mut params = Vec::new();
        for item in items {
            match item {
                Expression::Identifier(_)
                | Expression::Object(_)
                | Expression::Array(_)
                | Expression::Assignment(_) => {
                    params.push(self.element_to_pattern(item, TargetMode::Binding)?);
                }
                _ => {
                    let message = &messages::INVALID_ARROW_PARAMETERS;
                    return Err(self.error_at(item.range(), message, &[]));
                }
            }
        }
        Ok(FormalParameters {
            range,
            items: self.alloc_vec(params),
            rest,
        })
    }

    /// The arguments of `async(...)` followed by `=>`. A spread becomes the
    /// rest parameter and must come last, without a trailing comma.
    pub(crate) fn async_arguments_to_parameters(
        &mut self,
        range: TextRange,
        arguments: &'a [Argument<'a>],
        trailing_comma: bool,
    ) -> PResult<FormalParameters<'a>> {
        let mut items = Vec::with_capacity(arguments.len());
        let mut rest = None;
        for (index, argument) in arguments.iter().enumerate() {
            match argument {
                Argument::Expression(expr) => items.push(expr),
                Argument::Spread(spread) => {
                    if index + 1 != arguments.len() || trailing_comma {
                        return Err(self.error_at(spread.range, &messages::REST_NOT_LAST, &[]));
                    }
                    rest = Some(self.spread_to_rest(spread, TargetMode::Binding)?);
                }
            }
        }
        self.to_arrow_parameters(range, items, rest)
    }
}
