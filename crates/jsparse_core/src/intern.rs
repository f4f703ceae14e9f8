//! Name interning for binding analysis.
//!
//! Scope records key their name tables by [`Atom`], so duplicate and
//! conflict checks compare integers instead of strings. Each parse owns its
//! own [`AtomTable`]; nothing is shared between parses.

use lasso::{Rodeo, Spur};
use std::fmt;

/// An interned name. Comparing two atoms is an integer comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Atom(Spur);

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.0)
    }
}

/// Interner for identifier names seen during one parse.
pub struct AtomTable {
    rodeo: Rodeo,
}

impl AtomTable {
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Intern a name, returning the existing atom if it was seen before.
    #[inline]
    pub fn intern(&mut self, name: &str) -> Atom {
        Atom(self.rodeo.get_or_intern(name))
    }

    /// Look up a name without interning it.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Atom> {
        self.rodeo.get(name).map(Atom)
    }

    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.rodeo.resolve(&atom.0)
    }

    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AtomTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomTable").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut atoms = AtomTable::new();
        let a = atoms.intern("arguments");
        let b = atoms.intern("arguments");
        let c = atoms.intern("eval");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(atoms.resolve(c), "eval");
        assert_eq!(atoms.len(), 2);
    }

    #[test]
    fn test_get_does_not_intern() {
        let mut atoms = AtomTable::new();
        assert!(atoms.get("x").is_none());
        let x = atoms.intern("x");
        assert_eq!(atoms.get("x"), Some(x));
    }
}
