//! Parse context: the grammar parameters in effect at the current position.
//!
//! [`ContextFlags`] is a plain `Copy` value. The parser swaps in a new value
//! when it descends into a construct that changes what is legal and puts the
//! old one back on return, so a sibling subtree never observes a flag set by
//! another.

use jsparse_core::text::TextRange;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u32 {
        const NONE              = 0;
        /// Strict mode code.
        const STRICT            = 1 << 0;
        /// Module goal. Implies strict.
        const MODULE            = 1 << 1;
        /// Inside any non-arrow function body.
        const IN_FUNCTION       = 1 << 2;
        /// `return` is allowed.
        const RETURN            = 1 << 3;
        /// Inside a generator: `yield` is an operator.
        const YIELD             = 1 << 4;
        /// Inside an async function or module top level: `await` is an operator.
        const AWAIT             = 1 << 5;
        /// An unlabeled `continue` or `break` is allowed.
        const IN_ITERATION      = 1 << 6;
        /// An unlabeled `break` is allowed.
        const IN_SWITCH         = 1 << 7;
        /// Inside a class static initialization block.
        const STATIC_BLOCK      = 1 << 8;
        /// `in` is not a binary operator (the init clause of a `for` head).
        const DISALLOW_IN       = 1 << 9;
        /// Inside a class field initializer: `arguments` is forbidden.
        const CLASS_FIELD_INIT  = 1 << 10;
        /// `super.x` is allowed.
        const SUPER_PROPERTY    = 1 << 11;
        /// `super()` is allowed.
        const SUPER_CALL        = 1 << 12;
        /// `new.target` is allowed.
        const NEW_TARGET        = 1 << 13;
        /// Parsing formal parameters: `yield`/`await` expressions are forbidden.
        const PARAMETERS        = 1 << 14;
        /// Parsing a cover grammar that may turn into arrow parameters.
        const COVER             = 1 << 15;

        /// Flags that do not survive into a nested non-arrow function.
        const FUNCTION_RESET = Self::IN_FUNCTION.bits()
            | Self::RETURN.bits()
            | Self::YIELD.bits()
            | Self::AWAIT.bits()
            | Self::IN_ITERATION.bits()
            | Self::IN_SWITCH.bits()
            | Self::STATIC_BLOCK.bits()
            | Self::DISALLOW_IN.bits()
            | Self::CLASS_FIELD_INIT.bits()
            | Self::SUPER_PROPERTY.bits()
            | Self::SUPER_CALL.bits()
            | Self::NEW_TARGET.bits()
            | Self::PARAMETERS.bits()
            | Self::COVER.bits();
    }
}

impl ContextFlags {
    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(ContextFlags::STRICT)
    }

    /// The context for the body of a function with the given kind.
    pub fn for_function(self, is_async: bool, is_generator: bool) -> ContextFlags {
        let mut flags = (self - ContextFlags::FUNCTION_RESET)
            | ContextFlags::IN_FUNCTION
            | ContextFlags::RETURN
            | ContextFlags::NEW_TARGET;
        flags.set(ContextFlags::AWAIT, is_async);
        flags.set(ContextFlags::YIELD, is_generator);
        flags
    }

    /// The context for an arrow body. Arrows keep `super`, `new.target`,
    /// class-field and static-block restrictions of their surroundings, so
    /// `arguments` and `await` stay reserved in an arrow inside `static {}`.
    pub fn for_arrow(self, is_async: bool) -> ContextFlags {
        let mut flags = self
            - (ContextFlags::YIELD
                | ContextFlags::IN_ITERATION
                | ContextFlags::IN_SWITCH
                | ContextFlags::DISALLOW_IN
                | ContextFlags::PARAMETERS
                | ContextFlags::COVER)
            | ContextFlags::RETURN;
        flags.set(ContextFlags::AWAIT, is_async);
        flags
    }
}

/// Where a statement appears. Declarations are only allowed in list
/// positions; the other positions are single-statement bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementPosition {
    /// A statement list item: block, function body, program, case clause.
    ListItem,
    /// The body of an `if` or `else`.
    If,
    /// The body of a labeled statement.
    Label,
    /// A loop body or `with` body.
    Nested,
}

impl StatementPosition {
    #[inline]
    pub fn allows_declarations(self) -> bool {
        self == StatementPosition::ListItem
    }
}

/// What a label encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Loop,
    Switch,
    Other,
}

/// One entry of the label stack.
#[derive(Debug, Clone, Copy)]
pub struct Label<'a> {
    pub name: &'a str,
    pub kind: LabelKind,
    /// Start of the statement the label applies to. Consecutive labels
    /// on the same statement share it.
    pub statement_start: u32,
    pub range: TextRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_context_resets_and_keeps_strict() {
        let outer = ContextFlags::STRICT
            | ContextFlags::YIELD
            | ContextFlags::IN_ITERATION
            | ContextFlags::DISALLOW_IN;
        let inner = outer.for_function(true, false);
        assert!(inner.is_strict());
        assert!(inner.contains(
            ContextFlags::AWAIT | ContextFlags::RETURN | ContextFlags::NEW_TARGET
        ));
        assert!(!inner.intersects(
            ContextFlags::YIELD | ContextFlags::IN_ITERATION | ContextFlags::DISALLOW_IN
        ));
    }

    #[test]
    fn test_arrow_context_keeps_super_and_new_target() {
        let outer = ContextFlags::SUPER_PROPERTY
            | ContextFlags::NEW_TARGET
            | ContextFlags::YIELD
            | ContextFlags::AWAIT;
        let inner = outer.for_arrow(false);
        assert!(inner.contains(
            ContextFlags::SUPER_PROPERTY | ContextFlags::NEW_TARGET | ContextFlags::RETURN
        ));
        assert!(!inner.intersects(ContextFlags::YIELD | ContextFlags::AWAIT));
    }

    #[test]
    fn test_arrow_in_static_block_keeps_static_block_restrictions() {
        let inner = ContextFlags::STATIC_BLOCK.for_arrow(false);
        assert!(inner.contains(ContextFlags::STATIC_BLOCK | ContextFlags::RETURN));
        assert!(!inner.contains(ContextFlags::AWAIT));

        let nested = inner.for_arrow(true);
        assert!(nested.contains(ContextFlags::STATIC_BLOCK | ContextFlags::AWAIT));
        assert!(!inner.for_function(false, false).contains(ContextFlags::STATIC_BLOCK));
    }

    #[test]
    fn test_only_list_items_allow_declarations() {
        assert!(StatementPosition::ListItem.allows_declarations());
        assert!(!StatementPosition::If.allows_declarations());
        assert!(!StatementPosition::Label.allows_declarations());
    }
}
