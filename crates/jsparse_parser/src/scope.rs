//! Scope binding records.
//!
//! One [`Scope`] per function, block, catch clause and `for` head, kept in a
//! stack indexed by position. The records exist only to evaluate early
//! errors: redeclarations, the deferred strict-mode checks of a function
//! and Annex-B hoisting of block-level functions.

use jsparse_core::collections::FxHashSet;
use jsparse_core::intern::Atom;
use jsparse_core::text::TextRange;
use jsparse_diagnostics::DiagnosticMessage;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScopeFlags: u16 {
        const NONE               = 0;
        /// The script or module top level.
        const TOP                = 1 << 0;
        /// A function body, including arrows.
        const FUNCTION           = 1 << 1;
        const ARROW              = 1 << 2;
        /// A `catch (e)` clause with a plain identifier parameter.
        const SIMPLE_CATCH       = 1 << 3;
        const CLASS_STATIC_BLOCK = 1 << 4;
        /// The module top level.
        const MODULE             = 1 << 5;

        /// Scopes that receive `var` declarations.
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::CLASS_STATIC_BLOCK.bits();
    }
}

/// How a name is being declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `var`, and functions at the top of a function or script.
    Var,
    /// A `var` in a `for-of` head. Never excused by a catch parameter.
    VarForOf,
    /// `let`, `const`, `class`, imports.
    Lexical,
    /// A sloppy function declaration in a block.
    Function,
    /// The identifier parameter of a `catch` clause.
    SimpleCatch,
    /// A formal parameter.
    Parameter,
}

/// A check that becomes an error only if the enclosing function (or the
/// script) turns out to be strict.
#[derive(Debug, Clone, Copy)]
pub struct PendingCheck<'a> {
    pub range: TextRange,
    pub message: &'static DiagnosticMessage,
    pub name: Option<&'a str>,
}

/// A block-level function that may also get a `var` binding in the
/// enclosing function.
#[derive(Debug, Clone, Copy)]
struct AnnexBCandidate {
    name: Atom,
    /// Index of the scope that declared the function.
    origin: usize,
}

#[derive(Debug)]
pub struct Scope<'a> {
    pub flags: ScopeFlags,
    var: FxHashSet<Atom>,
    lexical: FxHashSet<Atom>,
    functions: FxHashSet<Atom>,
    params: FxHashSet<Atom>,
    catch_param: Option<Atom>,
    pending: Vec<PendingCheck<'a>>,
    annex_b: Vec<AnnexBCandidate>,
}

impl<'a> Scope<'a> {
    fn new(flags: ScopeFlags) -> Self {
        Self {
            flags,
            var: FxHashSet::default(),
            lexical: FxHashSet::default(),
            functions: FxHashSet::default(),
            params: FxHashSet::default(),
            catch_param: None,
            pending: Vec::new(),
            annex_b: Vec::new(),
        }
    }

    #[inline]
    fn is_var_scope(&self) -> bool {
        self.flags.intersects(ScopeFlags::VAR)
    }

    /// Whether function declarations directly in this scope behave like `var`.
    #[inline]
    fn functions_as_var(&self) -> bool {
        self.flags.contains(ScopeFlags::FUNCTION)
            || (self.flags.contains(ScopeFlags::TOP) && !self.flags.contains(ScopeFlags::MODULE))
    }

    /// Whether a lexical binding of `name` here would conflict with a `var`
    /// of the same name passing through.
    fn blocks_var(&self, name: Atom, excuse_catch: bool) -> bool {
        if self.lexical.contains(&name) && !(excuse_catch && self.catch_param == Some(name)) {
            return true;
        }
        !self.functions_as_var() && self.functions.contains(&name)
    }

    pub fn declares(&self, name: Atom) -> bool {
        self.var.contains(&name) || self.lexical.contains(&name) || self.functions.contains(&name)
    }
}

/// The stack of open scopes.
#[derive(Debug, Default)]
pub struct ScopeStack<'a> {
    scopes: Vec<Scope<'a>>,
    /// Whether a `var` may redeclare a simple catch parameter.
    catch_redeclaration: bool,
}

impl<'a> ScopeStack<'a> {
    pub fn new(catch_redeclaration: bool) -> Self {
        Self {
            scopes: Vec::new(),
            catch_redeclaration,
        }
    }

    pub fn enter(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope::new(flags));
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// The nearest scope that receives `var` declarations.
    fn var_scope_index(&self) -> usize {
        self.scopes
            .iter()
            .rposition(|s| s.is_var_scope())
            .unwrap_or(0)
    }

    /// Whether the current scope treats function declarations like `var`.
    pub fn functions_as_var(&self) -> bool {
        self.scopes.last().is_some_and(|s| s.functions_as_var())
    }

    /// Declare `name`. Returns `false` if it conflicts with an existing
    /// declaration.
    pub fn declare(&mut self, name: Atom, kind: BindingKind) -> bool {
        let Some(last) = self.scopes.len().checked_sub(1) else {
            return true;
        };
        match kind {
            BindingKind::Lexical => {
                let scope = &mut self.scopes[last];
                let redeclared = scope.lexical.contains(&name)
                    || scope.functions.contains(&name)
                    || scope.var.contains(&name);
                scope.lexical.insert(name);
                !redeclared
            }
            BindingKind::SimpleCatch => {
                let scope = &mut self.scopes[last];
                scope.lexical.insert(name);
                scope.catch_param = Some(name);
                true
            }
            BindingKind::Function => {
                let scope = &mut self.scopes[last];
                let redeclared = if scope.functions_as_var() {
                    scope.lexical.contains(&name)
                } else {
                    scope.lexical.contains(&name) || scope.var.contains(&name)
                };
                scope.functions.insert(name);
                !redeclared
            }
            BindingKind::Var | BindingKind::VarForOf | BindingKind::Parameter => {
                let excuse_catch = self.catch_redeclaration && kind == BindingKind::Var;
                let mut ok = true;
                for scope in self.scopes.iter_mut().rev() {
                    if scope.blocks_var(name, excuse_catch) {
                        ok = false;
                    }
                    scope.var.insert(name);
                    if kind == BindingKind::Parameter {
                        scope.params.insert(name);
                    }
                    if scope.is_var_scope() {
                        break;
                    }
                }
                ok
            }
        }
    }

    /// Whether the module or script top level declares `name`.
    pub fn top_declares(&self, name: Atom) -> bool {
        self.scopes.first().is_some_and(|s| s.declares(name))
    }

    // ========================================================================
    // Deferred strict-mode checks
    // ========================================================================

    /// Record a check against the nearest function (or top-level) scope.
    pub fn add_pending(&mut self, check: PendingCheck<'a>) {
        let index = self.var_scope_index();
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.pending.push(check);
        }
    }

    /// Take the recorded checks of the nearest var scope.
    pub fn take_pending(&mut self) -> Vec<PendingCheck<'a>> {
        let index = self.var_scope_index();
        self.scopes
            .get_mut(index)
            .map(|s| std::mem::take(&mut s.pending))
            .unwrap_or_default()
    }

    /// Drop the recorded checks of the nearest var scope once its directive
    /// prologue ended without `"use strict"`.
    pub fn clear_pending(&mut self) {
        let index = self.var_scope_index();
        if let Some(scope) = self.scopes.get_mut(index) {
            scope.pending.clear();
        }
    }

    // ========================================================================
    // Annex-B function hoisting
    // ========================================================================

    /// Mark a sloppy block-level function as a hoisting candidate.
    pub fn add_annex_b_candidate(&mut self, name: Atom) {
        let origin = self.scopes.len().saturating_sub(1);
        if let Some(scope) = self.scopes.last_mut() {
            scope.annex_b.push(AnnexBCandidate { name, origin });
        }
    }

    /// Leave the current scope. Hoisting candidates move to the parent
    /// scope unless this scope has a lexical binding that a `var` of the
    /// same name would collide with. A var scope resolves its candidates
    /// and returns the hoisted names.
    pub fn exit(&mut self) -> Vec<Atom> {
        let Some(mut scope) = self.scopes.pop() else {
            return Vec::new();
        };
        let index = self.scopes.len();
        let candidates = std::mem::take(&mut scope.annex_b);

        if scope.is_var_scope() {
            let mut hoisted = Vec::new();
            for candidate in candidates {
                let conflicts = scope.lexical.contains(&candidate.name);
                let is_param = scope.params.contains(&candidate.name);
                if !conflicts && !is_param && !hoisted.contains(&candidate.name) {
                    hoisted.push(candidate.name);
                }
            }
            return hoisted;
        }

        let survivors: Vec<AnnexBCandidate> = candidates
            .into_iter()
            .filter(|c| c.origin == index || !scope.blocks_var(c.name, self.catch_redeclaration))
            .collect();
        if let Some(parent) = self.scopes.last_mut() {
            parent.annex_b.extend(survivors);
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsparse_core::intern::AtomTable;

    fn stack() -> ScopeStack<'static> {
        let mut stack = ScopeStack::new(true);
        stack.enter(ScopeFlags::TOP);
        stack
    }

    #[test]
    fn test_lexical_redeclaration() {
        let mut atoms = AtomTable::new();
        let a = atoms.intern("a");
        let mut scopes = stack();
        assert!(scopes.declare(a, BindingKind::Lexical));
        assert!(!scopes.declare(a, BindingKind::Lexical));
        assert!(!scopes.declare(a, BindingKind::Var));
    }

    #[test]
    fn test_var_may_redeclare_var_and_function() {
        let mut atoms = AtomTable::new();
        let f = atoms.intern("f");
        let mut scopes = stack();
        assert!(scopes.declare(f, BindingKind::Var));
        assert!(scopes.declare(f, BindingKind::Var));
        assert!(scopes.declare(f, BindingKind::Function));
        assert!(!scopes.declare(f, BindingKind::Lexical));
    }

    #[test]
    fn test_var_in_block_conflicts_with_outer_let() {
        let mut atoms = AtomTable::new();
        let x = atoms.intern("x");
        let mut scopes = stack();
        assert!(scopes.declare(x, BindingKind::Lexical));
        scopes.enter(ScopeFlags::NONE);
        assert!(!scopes.declare(x, BindingKind::Var));
    }

    #[test]
    fn test_module_top_level_functions_are_lexical() {
        let mut atoms = AtomTable::new();
        let f = atoms.intern("f");
        let mut scopes = ScopeStack::new(false);
        scopes.enter(ScopeFlags::TOP | ScopeFlags::MODULE);
        assert!(scopes.declare(f, BindingKind::Var));
        assert!(!scopes.declare(f, BindingKind::Function));
    }

    #[test]
    fn test_catch_parameter_redeclaration() {
        let mut atoms = AtomTable::new();
        let e = atoms.intern("e");
        let mut scopes = stack();
        scopes.enter(ScopeFlags::SIMPLE_CATCH);
        assert!(scopes.declare(e, BindingKind::SimpleCatch));
        assert!(scopes.declare(e, BindingKind::Var));
        assert!(!scopes.declare(e, BindingKind::VarForOf));
        assert!(!scopes.declare(e, BindingKind::Lexical));
    }

    #[test]
    fn test_annex_b_hoisting_respects_lexical_conflicts() {
        let mut atoms = AtomTable::new();
        let (f, g) = (atoms.intern("f"), atoms.intern("g"));
        let mut scopes = stack();
        scopes.enter(ScopeFlags::NONE);
        assert!(scopes.declare(f, BindingKind::Function));
        scopes.add_annex_b_candidate(f);
        assert!(scopes.declare(g, BindingKind::Function));
        scopes.add_annex_b_candidate(g);
        scopes.exit();
        assert!(scopes.declare(g, BindingKind::Lexical));
        assert_eq!(scopes.exit(), vec![f]);
    }

    #[test]
    fn test_annex_b_candidate_blocked_by_intermediate_let() {
        let mut atoms = AtomTable::new();
        let f = atoms.intern("f");
        let mut scopes = stack();
        scopes.enter(ScopeFlags::NONE);
        assert!(scopes.declare(f, BindingKind::Lexical));
        scopes.enter(ScopeFlags::NONE);
        assert!(scopes.declare(f, BindingKind::Function));
        scopes.add_annex_b_candidate(f);
        scopes.exit();
        scopes.exit();
        assert!(scopes.exit().is_empty());
    }

    #[test]
    fn test_pending_checks_attach_to_var_scope() {
        let mut scopes = stack();
        scopes.enter(ScopeFlags::FUNCTION);
        scopes.enter(ScopeFlags::NONE);
        scopes.add_pending(PendingCheck {
            range: TextRange::new(0, 1),
            message: &jsparse_diagnostics::messages::RETRO_OCTAL_ESCAPE,
            name: None,
        });
        scopes.exit();
        assert_eq!(scopes.take_pending().len(), 1);
        assert!(scopes.take_pending().is_empty());
    }
}
