//! AST node definitions.
//!
//! Nodes live in a bumpalo arena. Children are `&'a` references and lists are
//! `&'a [T]` slices, so a whole tree is dropped with its arena. There are no
//! parent pointers. Every node carries its source [`TextRange`].
//!
//! Expressions and patterns are separate types: the parser first builds an
//! [`Expression`] and converts it into a [`Pattern`] once it knows the
//! expression was really a destructuring target or parameter list.

use crate::operators::*;
use crate::types::*;
use jsparse_core::text::TextRange;
use serde::Serialize;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Program<'a> {
    pub range: TextRange,
    pub source_type: SourceType,
    /// Whether the program body is strict mode code.
    pub strict: bool,
    /// The text of a leading `#!` line, without the `#!`.
    pub hashbang: Option<&'a str>,
    pub body: NodeList<'a, Statement<'a>>,
    /// Block-level functions that also got a `var` binding at script level.
    pub annex_b_functions: NodeList<'a, &'a str>,
}

impl<'a> Program<'a> {
    /// Serialize the tree to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ============================================================================
// Names and literals
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Identifier<'a> {
    pub range: TextRange,
    /// The name after escape decoding.
    pub name: &'a str,
}

/// `#name`. The stored name excludes the `#`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PrivateName<'a> {
    pub range: TextRange,
    pub name: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NullLiteral {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BooleanLiteral {
    pub range: TextRange,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericLiteral<'a> {
    pub range: TextRange,
    pub value: f64,
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BigIntLiteral<'a> {
    pub range: TextRange,
    /// The digits without the trailing `n` and without separators.
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StringLiteral<'a> {
    pub range: TextRange,
    /// The cooked value. Lone surrogates are replaced by U+FFFD.
    pub value: &'a str,
    pub raw: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RegExpLiteral<'a> {
    pub range: TextRange,
    pub pattern: &'a str,
    pub flags: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TemplateLiteral<'a> {
    pub range: TextRange,
    pub quasis: NodeList<'a, TemplateElement<'a>>,
    pub expressions: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateElement<'a> {
    pub range: TextRange,
    pub raw: &'a str,
    /// `None` when the segment contains an invalid escape. Only legal in
    /// tagged templates.
    pub cooked: Option<&'a str>,
    pub tail: bool,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Serialize)]
pub enum Expression<'a> {
    Identifier(Identifier<'a>),
    Null(NullLiteral),
    Boolean(BooleanLiteral),
    Numeric(NumericLiteral<'a>),
    BigInt(BigIntLiteral<'a>),
    String(StringLiteral<'a>),
    RegExp(RegExpLiteral<'a>),
    Template(TemplateLiteral<'a>),
    TaggedTemplate(TaggedTemplateExpression<'a>),
    This(ThisExpression),
    Super(SuperExpression),
    Array(ArrayExpression<'a>),
    Object(ObjectExpression<'a>),
    Function(&'a Function<'a>),
    Arrow(&'a ArrowFunction<'a>),
    Class(&'a Class<'a>),
    Unary(UnaryExpression<'a>),
    Update(UpdateExpression<'a>),
    Binary(BinaryExpression<'a>),
    PrivateIn(PrivateInExpression<'a>),
    Logical(LogicalExpression<'a>),
    Conditional(ConditionalExpression<'a>),
    Assignment(AssignmentExpression<'a>),
    Sequence(SequenceExpression<'a>),
    Call(CallExpression<'a>),
    New(NewExpression<'a>),
    Member(MemberExpression<'a>),
    Chain(ChainExpression<'a>),
    Yield(YieldExpression<'a>),
    Await(AwaitExpression<'a>),
    MetaProperty(MetaProperty<'a>),
    Import(ImportExpression<'a>),
    Parenthesized(ParenthesizedExpression<'a>),
}

#[derive(Debug, Serialize)]
pub struct TaggedTemplateExpression<'a> {
    pub range: TextRange,
    pub tag: &'a Expression<'a>,
    pub quasi: TemplateLiteral<'a>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ThisExpression {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuperExpression {
    pub range: TextRange,
}

#[derive(Debug, Serialize)]
pub struct SpreadElement<'a> {
    pub range: TextRange,
    pub argument: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct ArrayExpression<'a> {
    pub range: TextRange,
    pub elements: NodeList<'a, ArrayElement<'a>>,
}

#[derive(Debug, Serialize)]
pub enum ArrayElement<'a> {
    /// An elision, `[, x]`.
    Hole(TextRange),
    Expression(Expression<'a>),
    Spread(SpreadElement<'a>),
}

#[derive(Debug, Serialize)]
pub struct ObjectExpression<'a> {
    pub range: TextRange,
    pub properties: NodeList<'a, ObjectMember<'a>>,
}

#[derive(Debug, Serialize)]
pub enum ObjectMember<'a> {
    Property(ObjectProperty<'a>),
    Spread(SpreadElement<'a>),
}

#[derive(Debug, Serialize)]
pub struct ObjectProperty<'a> {
    pub range: TextRange,
    pub key: PropertyKey<'a>,
    /// For shorthand `{a = 1}` covers this is an `Assignment` whose left side
    /// is the identifier; such a literal is only valid as a pattern.
    pub value: Expression<'a>,
    pub kind: PropertyKind,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum PropertyKey<'a> {
    /// An identifier name, including reserved words.
    Identifier(Identifier<'a>),
    String(StringLiteral<'a>),
    Numeric(NumericLiteral<'a>),
    BigInt(BigIntLiteral<'a>),
    Private(PrivateName<'a>),
    Computed(&'a Expression<'a>),
}

#[derive(Debug, Serialize)]
pub struct UnaryExpression<'a> {
    pub range: TextRange,
    pub operator: UnaryOperator,
    pub argument: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct UpdateExpression<'a> {
    pub range: TextRange,
    pub operator: UpdateOperator,
    pub prefix: bool,
    /// An identifier or member expression.
    pub argument: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct BinaryExpression<'a> {
    pub range: TextRange,
    pub operator: BinaryOperator,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
}

/// `#x in obj`
#[derive(Debug, Serialize)]
pub struct PrivateInExpression<'a> {
    pub range: TextRange,
    pub left: PrivateName<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct LogicalExpression<'a> {
    pub range: TextRange,
    pub operator: LogicalOperator,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct ConditionalExpression<'a> {
    pub range: TextRange,
    pub test: &'a Expression<'a>,
    pub consequent: &'a Expression<'a>,
    pub alternate: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentExpression<'a> {
    pub range: TextRange,
    pub operator: AssignmentOperator,
    pub left: Pattern<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct SequenceExpression<'a> {
    pub range: TextRange,
    pub expressions: NodeList<'a, Expression<'a>>,
}

#[derive(Debug, Serialize)]
pub enum Argument<'a> {
    Expression(Expression<'a>),
    Spread(SpreadElement<'a>),
}

#[derive(Debug, Serialize)]
pub struct CallExpression<'a> {
    pub range: TextRange,
    pub callee: &'a Expression<'a>,
    pub arguments: NodeList<'a, Argument<'a>>,
    /// `f?.()`
    pub optional: bool,
}

#[derive(Debug, Serialize)]
pub struct NewExpression<'a> {
    pub range: TextRange,
    pub callee: &'a Expression<'a>,
    pub arguments: NodeList<'a, Argument<'a>>,
}

#[derive(Debug, Serialize)]
pub struct MemberExpression<'a> {
    pub range: TextRange,
    pub object: &'a Expression<'a>,
    pub property: MemberProperty<'a>,
    /// `a?.b`
    pub optional: bool,
}

#[derive(Debug, Serialize)]
pub enum MemberProperty<'a> {
    Static(Identifier<'a>),
    Computed(&'a Expression<'a>),
    Private(PrivateName<'a>),
}

/// The root of an optional chain such as `a?.b.c`.
#[derive(Debug, Serialize)]
pub struct ChainExpression<'a> {
    pub range: TextRange,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct YieldExpression<'a> {
    pub range: TextRange,
    pub argument: Option<&'a Expression<'a>>,
    pub delegate: bool,
}

#[derive(Debug, Serialize)]
pub struct AwaitExpression<'a> {
    pub range: TextRange,
    pub argument: &'a Expression<'a>,
}

/// `new.target` or `import.meta`.
#[derive(Debug, Serialize)]
pub struct MetaProperty<'a> {
    pub range: TextRange,
    pub meta: Identifier<'a>,
    pub property: Identifier<'a>,
}

/// Dynamic `import(source, options?)`.
#[derive(Debug, Serialize)]
pub struct ImportExpression<'a> {
    pub range: TextRange,
    pub source: &'a Expression<'a>,
    pub options: Option<&'a Expression<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ParenthesizedExpression<'a> {
    pub range: TextRange,
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Patterns
// ============================================================================

/// A binding pattern or an assignment target.
///
/// `Member` only occurs in assignment targets, never in declarations.
#[derive(Debug, Serialize)]
pub enum Pattern<'a> {
    Identifier(Identifier<'a>),
    Member(&'a MemberExpression<'a>),
    Object(ObjectPattern<'a>),
    Array(ArrayPattern<'a>),
    /// A target with a default value, `x = 1`.
    Assignment(AssignmentPattern<'a>),
}

#[derive(Debug, Serialize)]
pub struct ObjectPattern<'a> {
    pub range: TextRange,
    pub properties: NodeList<'a, PatternProperty<'a>>,
    pub rest: Option<&'a RestElement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct PatternProperty<'a> {
    pub range: TextRange,
    pub key: PropertyKey<'a>,
    pub value: Pattern<'a>,
    pub shorthand: bool,
    pub computed: bool,
}

#[derive(Debug, Serialize)]
pub struct ArrayPattern<'a> {
    pub range: TextRange,
    /// `None` marks an elision.
    pub elements: NodeList<'a, Option<Pattern<'a>>>,
    pub rest: Option<&'a RestElement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentPattern<'a> {
    pub range: TextRange,
    pub left: &'a Pattern<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct RestElement<'a> {
    pub range: TextRange,
    pub argument: Pattern<'a>,
}

// ============================================================================
// Functions and classes
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Function<'a> {
    pub range: TextRange,
    pub id: Option<Identifier<'a>>,
    pub params: FormalParameters<'a>,
    pub body: FunctionBody<'a>,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Serialize)]
pub struct FormalParameters<'a> {
    pub range: TextRange,
    pub items: NodeList<'a, Pattern<'a>>,
    pub rest: Option<&'a RestElement<'a>>,
}

impl<'a> FormalParameters<'a> {
    /// Whether every parameter is a plain identifier with no default or rest.
    pub fn is_simple(&self) -> bool {
        self.rest.is_none() && self.items.iter().all(|p| matches!(p, Pattern::Identifier(_)))
    }
}

#[derive(Debug, Serialize)]
pub struct FunctionBody<'a> {
    pub range: TextRange,
    /// Whether the body is strict, either inherited or by its own directive.
    pub strict: bool,
    pub body: NodeList<'a, Statement<'a>>,
    /// Block-level functions that also got a `var` binding in this function.
    pub annex_b_functions: NodeList<'a, &'a str>,
}

#[derive(Debug, Serialize)]
pub struct ArrowFunction<'a> {
    pub range: TextRange,
    pub params: FormalParameters<'a>,
    pub body: ArrowBody<'a>,
    pub is_async: bool,
}

#[derive(Debug, Serialize)]
pub enum ArrowBody<'a> {
    Expression(&'a Expression<'a>),
    Block(FunctionBody<'a>),
}

#[derive(Debug, Serialize)]
pub struct Class<'a> {
    pub range: TextRange,
    pub id: Option<Identifier<'a>>,
    pub super_class: Option<&'a Expression<'a>>,
    pub body: NodeList<'a, ClassElement<'a>>,
}

#[derive(Debug, Serialize)]
pub enum ClassElement<'a> {
    Method(MethodDefinition<'a>),
    Property(PropertyDefinition<'a>),
    StaticBlock(StaticBlock<'a>),
}

#[derive(Debug, Serialize)]
pub struct MethodDefinition<'a> {
    pub range: TextRange,
    pub key: PropertyKey<'a>,
    pub value: &'a Function<'a>,
    pub kind: MethodKind,
    pub is_static: bool,
    pub computed: bool,
}

#[derive(Debug, Serialize)]
pub struct PropertyDefinition<'a> {
    pub range: TextRange,
    pub key: PropertyKey<'a>,
    pub value: Option<&'a Expression<'a>>,
    pub is_static: bool,
    pub computed: bool,
}

#[derive(Debug, Serialize)]
pub struct StaticBlock<'a> {
    pub range: TextRange,
    pub body: NodeList<'a, Statement<'a>>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Serialize)]
pub enum Statement<'a> {
    Expression(ExpressionStatement<'a>),
    Block(BlockStatement<'a>),
    Empty(EmptyStatement),
    Debugger(DebuggerStatement),
    Variable(VariableDeclaration<'a>),
    Function(&'a Function<'a>),
    Class(&'a Class<'a>),
    If(IfStatement<'a>),
    For(ForStatement<'a>),
    ForIn(ForInStatement<'a>),
    ForOf(ForOfStatement<'a>),
    While(WhileStatement<'a>),
    DoWhile(DoWhileStatement<'a>),
    Return(ReturnStatement<'a>),
    Break(BreakStatement<'a>),
    Continue(ContinueStatement<'a>),
    Throw(ThrowStatement<'a>),
    Try(TryStatement<'a>),
    Switch(SwitchStatement<'a>),
    Labeled(LabeledStatement<'a>),
    With(WithStatement<'a>),
    Import(ImportDeclaration<'a>),
    ExportNamed(ExportNamedDeclaration<'a>),
    ExportDefault(ExportDefaultDeclaration<'a>),
    ExportAll(ExportAllDeclaration<'a>),
}

#[derive(Debug, Serialize)]
pub struct ExpressionStatement<'a> {
    pub range: TextRange,
    pub expression: &'a Expression<'a>,
    /// The raw text (without quotes) when this statement is part of a
    /// directive prologue.
    pub directive: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct BlockStatement<'a> {
    pub range: TextRange,
    pub body: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmptyStatement {
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DebuggerStatement {
    pub range: TextRange,
}

#[derive(Debug, Serialize)]
pub struct VariableDeclaration<'a> {
    pub range: TextRange,
    pub kind: VariableKind,
    pub declarations: NodeList<'a, VariableDeclarator<'a>>,
}

#[derive(Debug, Serialize)]
pub struct VariableDeclarator<'a> {
    pub range: TextRange,
    pub id: Pattern<'a>,
    pub init: Option<&'a Expression<'a>>,
}

#[derive(Debug, Serialize)]
pub struct IfStatement<'a> {
    pub range: TextRange,
    pub test: &'a Expression<'a>,
    pub consequent: &'a Statement<'a>,
    pub alternate: Option<&'a Statement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ForStatement<'a> {
    pub range: TextRange,
    pub init: Option<ForInit<'a>>,
    pub test: Option<&'a Expression<'a>>,
    pub update: Option<&'a Expression<'a>>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, Serialize)]
pub enum ForInit<'a> {
    Variable(VariableDeclaration<'a>),
    Expression(&'a Expression<'a>),
}

/// The left side of a `for-in` or `for-of` head.
#[derive(Debug, Serialize)]
pub enum ForHead<'a> {
    Variable(VariableDeclaration<'a>),
    Pattern(Pattern<'a>),
}

#[derive(Debug, Serialize)]
pub struct ForInStatement<'a> {
    pub range: TextRange,
    pub left: ForHead<'a>,
    pub right: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, Serialize)]
pub struct ForOfStatement<'a> {
    pub range: TextRange,
    pub is_await: bool,
    pub left: ForHead<'a>,
    pub right: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, Serialize)]
pub struct WhileStatement<'a> {
    pub range: TextRange,
    pub test: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, Serialize)]
pub struct DoWhileStatement<'a> {
    pub range: TextRange,
    pub body: &'a Statement<'a>,
    pub test: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct ReturnStatement<'a> {
    pub range: TextRange,
    pub argument: Option<&'a Expression<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BreakStatement<'a> {
    pub range: TextRange,
    pub label: Option<Identifier<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ContinueStatement<'a> {
    pub range: TextRange,
    pub label: Option<Identifier<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ThrowStatement<'a> {
    pub range: TextRange,
    pub argument: &'a Expression<'a>,
}

#[derive(Debug, Serialize)]
pub struct TryStatement<'a> {
    pub range: TextRange,
    pub block: BlockStatement<'a>,
    pub handler: Option<CatchClause<'a>>,
    pub finalizer: Option<BlockStatement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CatchClause<'a> {
    pub range: TextRange,
    pub param: Option<Pattern<'a>>,
    pub body: BlockStatement<'a>,
}

#[derive(Debug, Serialize)]
pub struct SwitchStatement<'a> {
    pub range: TextRange,
    pub discriminant: &'a Expression<'a>,
    pub cases: NodeList<'a, SwitchCase<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SwitchCase<'a> {
    pub range: TextRange,
    /// `None` for the `default` clause.
    pub test: Option<&'a Expression<'a>>,
    pub consequent: NodeList<'a, Statement<'a>>,
}

#[derive(Debug, Serialize)]
pub struct LabeledStatement<'a> {
    pub range: TextRange,
    pub label: Identifier<'a>,
    pub body: &'a Statement<'a>,
}

#[derive(Debug, Serialize)]
pub struct WithStatement<'a> {
    pub range: TextRange,
    pub object: &'a Expression<'a>,
    pub body: &'a Statement<'a>,
}

// ============================================================================
// Modules
// ============================================================================

/// An export or import name: an identifier name or a string literal.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum ModuleExportName<'a> {
    Identifier(Identifier<'a>),
    String(StringLiteral<'a>),
}

#[derive(Debug, Serialize)]
pub struct ImportDeclaration<'a> {
    pub range: TextRange,
    pub specifiers: NodeList<'a, ImportSpecifier<'a>>,
    pub source: StringLiteral<'a>,
    pub attributes: NodeList<'a, ImportAttribute<'a>>,
}

#[derive(Debug, Serialize)]
pub enum ImportSpecifier<'a> {
    /// `import x from "m"`
    Default { range: TextRange, local: Identifier<'a> },
    /// `import * as ns from "m"`
    Namespace { range: TextRange, local: Identifier<'a> },
    /// `import { a as b } from "m"`
    Named {
        range: TextRange,
        imported: ModuleExportName<'a>,
        local: Identifier<'a>,
    },
}

/// `with { type: "json" }`
#[derive(Debug, Serialize)]
pub struct ImportAttribute<'a> {
    pub range: TextRange,
    pub key: ModuleExportName<'a>,
    pub value: StringLiteral<'a>,
}

#[derive(Debug, Serialize)]
pub struct ExportNamedDeclaration<'a> {
    pub range: TextRange,
    pub declaration: Option<&'a Statement<'a>>,
    pub specifiers: NodeList<'a, ExportSpecifier<'a>>,
    pub source: Option<StringLiteral<'a>>,
    pub attributes: NodeList<'a, ImportAttribute<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ExportSpecifier<'a> {
    pub range: TextRange,
    pub local: ModuleExportName<'a>,
    pub exported: ModuleExportName<'a>,
}

#[derive(Debug, Serialize)]
pub struct ExportDefaultDeclaration<'a> {
    pub range: TextRange,
    pub declaration: ExportDefaultKind<'a>,
}

#[derive(Debug, Serialize)]
pub enum ExportDefaultKind<'a> {
    Function(&'a Function<'a>),
    Class(&'a Class<'a>),
    Expression(&'a Expression<'a>),
}

#[derive(Debug, Serialize)]
pub struct ExportAllDeclaration<'a> {
    pub range: TextRange,
    /// `export * as ns from "m"`
    pub exported: Option<ModuleExportName<'a>>,
    pub source: StringLiteral<'a>,
    pub attributes: NodeList<'a, ImportAttribute<'a>>,
}
