//! Range accessors and small shape queries over AST nodes.

use crate::node::*;
use jsparse_core::text::TextRange;

impl<'a> Expression<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Expression::Identifier(n) => n.range,
            Expression::Null(n) => n.range,
            Expression::Boolean(n) => n.range,
            Expression::Numeric(n) => n.range,
            Expression::BigInt(n) => n.range,
            Expression::String(n) => n.range,
            Expression::RegExp(n) => n.range,
            Expression::Template(n) => n.range,
            Expression::TaggedTemplate(n) => n.range,
            Expression::This(n) => n.range,
            Expression::Super(n) => n.range,
            Expression::Array(n) => n.range,
            Expression::Object(n) => n.range,
            Expression::Function(n) => n.range,
            Expression::Arrow(n) => n.range,
            Expression::Class(n) => n.range,
            Expression::Unary(n) => n.range,
            Expression::Update(n) => n.range,
            Expression::Binary(n) => n.range,
            Expression::PrivateIn(n) => n.range,
            Expression::Logical(n) => n.range,
            Expression::Conditional(n) => n.range,
            Expression::Assignment(n) => n.range,
            Expression::Sequence(n) => n.range,
            Expression::Call(n) => n.range,
            Expression::New(n) => n.range,
            Expression::Member(n) => n.range,
            Expression::Chain(n) => n.range,
            Expression::Yield(n) => n.range,
            Expression::Await(n) => n.range,
            Expression::MetaProperty(n) => n.range,
            Expression::Import(n) => n.range,
            Expression::Parenthesized(n) => n.range,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn without_parentheses(&self) -> &Expression<'a> {
        let mut expr = self;
        while let Expression::Parenthesized(p) = expr {
            expr = p.expression;
        }
        expr
    }

    #[inline]
    pub fn is_parenthesized(&self) -> bool {
        matches!(self, Expression::Parenthesized(_))
    }

    /// The identifier name, if this is a bare identifier reference.
    pub fn identifier_name(&self) -> Option<&'a str> {
        match self {
            Expression::Identifier(id) => Some(id.name),
            _ => None,
        }
    }
}

impl<'a> Statement<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Statement::Expression(n) => n.range,
            Statement::Block(n) => n.range,
            Statement::Empty(n) => n.range,
            Statement::Debugger(n) => n.range,
            Statement::Variable(n) => n.range,
            Statement::Function(n) => n.range,
            Statement::Class(n) => n.range,
            Statement::If(n) => n.range,
            Statement::For(n) => n.range,
            Statement::ForIn(n) => n.range,
            Statement::ForOf(n) => n.range,
            Statement::While(n) => n.range,
            Statement::DoWhile(n) => n.range,
            Statement::Return(n) => n.range,
            Statement::Break(n) => n.range,
            Statement::Continue(n) => n.range,
            Statement::Throw(n) => n.range,
            Statement::Try(n) => n.range,
            Statement::Switch(n) => n.range,
            Statement::Labeled(n) => n.range,
            Statement::With(n) => n.range,
            Statement::Import(n) => n.range,
            Statement::ExportNamed(n) => n.range,
            Statement::ExportDefault(n) => n.range,
            Statement::ExportAll(n) => n.range,
        }
    }

    /// The directive text, if this statement belongs to a directive prologue.
    pub fn directive(&self) -> Option<&'a str> {
        match self {
            Statement::Expression(s) => s.directive,
            _ => None,
        }
    }
}

impl<'a> Pattern<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Pattern::Identifier(n) => n.range,
            Pattern::Member(n) => n.range,
            Pattern::Object(n) => n.range,
            Pattern::Array(n) => n.range,
            Pattern::Assignment(n) => n.range,
        }
    }

    /// Call `f` for every identifier this pattern binds, in source order.
    pub fn for_each_binding<F: FnMut(&Identifier<'a>)>(&self, f: &mut F) {
        match self {
            Pattern::Identifier(id) => f(id),
            Pattern::Member(_) => {}
            Pattern::Object(obj) => {
                for prop in obj.properties {
                    prop.value.for_each_binding(f);
                }
                if let Some(rest) = obj.rest {
                    rest.argument.for_each_binding(f);
                }
            }
            Pattern::Array(arr) => {
                for elem in arr.elements.iter().flatten() {
                    elem.for_each_binding(f);
                }
                if let Some(rest) = arr.rest {
                    rest.argument.for_each_binding(f);
                }
            }
            Pattern::Assignment(assign) => assign.left.for_each_binding(f),
        }
    }
}

impl<'a> PropertyKey<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            PropertyKey::Identifier(n) => n.range,
            PropertyKey::String(n) => n.range,
            PropertyKey::Numeric(n) => n.range,
            PropertyKey::BigInt(n) => n.range,
            PropertyKey::Private(n) => n.range,
            PropertyKey::Computed(n) => n.range(),
        }
    }

    /// The name of a non-computed, non-private identifier or string key.
    pub fn static_name(&self) -> Option<&'a str> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name),
            PropertyKey::String(s) => Some(s.value),
            _ => None,
        }
    }
}

impl<'a> ModuleExportName<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ModuleExportName::Identifier(n) => n.range,
            ModuleExportName::String(n) => n.range,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            ModuleExportName::Identifier(n) => n.name,
            ModuleExportName::String(n) => n.value,
        }
    }
}

impl<'a> ClassElement<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ClassElement::Method(n) => n.range,
            ClassElement::Property(n) => n.range,
            ClassElement::StaticBlock(n) => n.range,
        }
    }
}

impl<'a> ObjectMember<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ObjectMember::Property(n) => n.range,
            ObjectMember::Spread(n) => n.range,
        }
    }
}

impl<'a> ArrayElement<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ArrayElement::Hole(range) => *range,
            ArrayElement::Expression(n) => n.range(),
            ArrayElement::Spread(n) => n.range,
        }
    }
}

impl<'a> Argument<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            Argument::Expression(n) => n.range(),
            Argument::Spread(n) => n.range,
        }
    }
}

impl<'a> ImportSpecifier<'a> {
    pub fn range(&self) -> TextRange {
        match self {
            ImportSpecifier::Default { range, .. }
            | ImportSpecifier::Namespace { range, .. }
            | ImportSpecifier::Named { range, .. } => *range,
        }
    }

    pub fn local(&self) -> &Identifier<'a> {
        match self {
            ImportSpecifier::Default { local, .. }
            | ImportSpecifier::Namespace { local, .. }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: u32) -> Identifier<'_> {
        Identifier {
            range: TextRange::new(start, start + name.len() as u32),
            name,
        }
    }

    #[test]
    fn test_without_parentheses() {
        let inner = Expression::Identifier(ident("a", 2));
        let once = Expression::Parenthesized(ParenthesizedExpression {
            range: TextRange::new(1, 4),
            expression: &inner,
        });
        let twice = Expression::Parenthesized(ParenthesizedExpression {
            range: TextRange::new(0, 5),
            expression: &once,
        });
        assert_eq!(twice.without_parentheses().identifier_name(), Some("a"));
        assert_eq!(twice.range(), TextRange::new(0, 5));
    }

    #[test]
    fn test_for_each_binding_visits_nested_names() {
        let default = Expression::Numeric(NumericLiteral {
            range: TextRange::new(10, 11),
            value: 1.0,
            raw: "1",
        });
        let left = Pattern::Identifier(ident("b", 6));
        let elements = [
            Some(Pattern::Identifier(ident("a", 1))),
            None,
            Some(Pattern::Assignment(AssignmentPattern {
                range: TextRange::new(6, 11),
                left: &left,
                right: &default,
            })),
        ];
        let rest = RestElement {
            range: TextRange::new(13, 17),
            argument: Pattern::Identifier(ident("c", 16)),
        };
        let pattern = Pattern::Array(ArrayPattern {
            range: TextRange::new(0, 18),
            elements: &elements,
            rest: Some(&rest),
        });
        let mut names = Vec::new();
        pattern.for_each_binding(&mut |id| names.push(id.name));
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
