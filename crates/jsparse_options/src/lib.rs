//! jsparse_options: parse configuration.
//!
//! [`ParseOptions`] is the flag set a caller hands to the parser. It loads
//! from JSON with camelCase keys; missing keys take their defaults.
//! [`CompatPolicy`] turns the flags into the explicit list of legacy
//! relaxations the parser consults.

use serde::{Deserialize, Serialize};

/// Whether a leading `{` starts a block (program) or an object literal
/// (a lone expression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LexicalGoal {
    #[default]
    Program,
    Expression,
}

impl LexicalGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            LexicalGoal::Program => "program",
            LexicalGoal::Expression => "expression",
        }
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseOptions {
    /// Start in strict mode, as if under a `"use strict"` directive.
    pub strict_initial: bool,
    /// Parse as a module. Implies strict mode.
    pub module: bool,
    /// Enable the legacy web-compatibility relaxations.
    pub compat_mode: bool,
    pub lexical_goal: LexicalGoal,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict_initial: false,
            module: false,
            compat_mode: true,
            lexical_goal: LexicalGoal::Program,
        }
    }
}

/// Errors from loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid parse options: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseOptions {
    /// Options for a sloppy script with compatibility mode on.
    pub fn script() -> Self {
        Self::default()
    }

    pub fn module() -> Self {
        Self {
            module: true,
            ..Self::default()
        }
    }

    pub fn strict() -> Self {
        Self {
            strict_initial: true,
            ..Self::default()
        }
    }

    pub fn expression() -> Self {
        Self {
            lexical_goal: LexicalGoal::Expression,
            ..Self::default()
        }
    }

    pub fn with_compat_mode(mut self, enabled: bool) -> Self {
        self.compat_mode = enabled;
        self
    }

    /// Load options from a JSON object such as `{"module": true}`.
    pub fn from_json(content: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Whether parsing starts in strict mode.
    #[inline]
    pub fn starts_strict(&self) -> bool {
        self.strict_initial || self.module
    }

    /// The flags as an enumerated `(name, value)` map.
    pub fn flags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("strictInitial", self.strict_initial.to_string()),
            ("module", self.module.to_string()),
            ("compatMode", self.compat_mode.to_string()),
            ("lexicalGoal", self.lexical_goal.as_str().to_string()),
        ]
    }
}

// ============================================================================
// Compatibility policy
// ============================================================================

/// The legacy relaxations, each resolved to whether it may apply at all.
///
/// Relaxations marked "sloppy only" below are additionally gated by the
/// strictness of the code they occur in, which the parser tracks. When a
/// `"use strict"` directive turns a function strict after some of its tokens
/// were read, the parser rechecks those tokens through its pending-check
/// worklist; the relaxations that depend on declaration position are
/// evaluated after the directive prologue and need no recheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatPolicy {
    /// `017`, `08` and `"\17"`, `"\8"`. Sloppy only.
    pub legacy_octal: bool,
    /// `function f(a, a) {}`. Sloppy only, simple parameter lists only.
    pub duplicate_parameters: bool,
    /// Block-level functions also bind a `var` in the enclosing function.
    pub annex_b_function_hoisting: bool,
    /// `{ function f() {} function f() {} }`. Sloppy only.
    pub duplicate_block_functions: bool,
    /// `if (x) function f() {}`. Sloppy only.
    pub if_function_declarations: bool,
    /// `l: function f() {}`. Sloppy only.
    pub labeled_function_declarations: bool,
    /// `try {} catch (e) { var e; }` and `for (var e of ...)` excluded.
    pub catch_parameter_redeclaration: bool,
    /// `for (var x = 1 in o)`. Sloppy only.
    pub for_in_initializer: bool,
    /// `<!--` and `-->` comments.
    pub html_comments: bool,
}

impl CompatPolicy {
    pub fn from_options(options: &ParseOptions) -> Self {
        let web = options.compat_mode && !options.module;
        Self {
            legacy_octal: web,
            duplicate_parameters: !options.module,
            annex_b_function_hoisting: web,
            duplicate_block_functions: web,
            if_function_declarations: web,
            labeled_function_declarations: web,
            catch_parameter_redeclaration: web,
            for_in_initializer: web,
            html_comments: web,
        }
    }

    /// Every relaxation with its resolved state, in a fixed order.
    pub fn relaxations(&self) -> [(&'static str, bool); 9] {
        [
            ("legacyOctal", self.legacy_octal),
            ("duplicateParameters", self.duplicate_parameters),
            ("annexBFunctionHoisting", self.annex_b_function_hoisting),
            ("duplicateBlockFunctions", self.duplicate_block_functions),
            ("ifFunctionDeclarations", self.if_function_declarations),
            ("labeledFunctionDeclarations", self.labeled_function_declarations),
            ("catchParameterRedeclaration", self.catch_parameter_redeclaration),
            ("forInInitializer", self.for_in_initializer),
            ("htmlComments", self.html_comments),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.strict_initial);
        assert!(!options.module);
        assert!(options.compat_mode);
        assert_eq!(options.lexical_goal, LexicalGoal::Program);
        assert!(!options.starts_strict());
    }

    #[test]
    fn test_from_json_with_missing_keys() {
        let options =
            ParseOptions::from_json(r#"{"module": true, "lexicalGoal": "expression"}"#).unwrap();
        assert!(options.module);
        assert!(options.compat_mode);
        assert_eq!(options.lexical_goal, LexicalGoal::Expression);
        assert!(options.starts_strict());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(ParseOptions::from_json(r#"{"module": "yes"}"#).is_err());
    }

    #[test]
    fn test_flags_map() {
        let flags = ParseOptions::strict().flags();
        assert_eq!(flags[0], ("strictInitial", "true".to_string()));
        assert_eq!(flags[3], ("lexicalGoal", "program".to_string()));
    }

    #[test]
    fn test_module_disables_every_web_relaxation() {
        let policy = CompatPolicy::from_options(&ParseOptions::module());
        assert!(policy.relaxations().iter().all(|(_, enabled)| !enabled));
    }

    #[test]
    fn test_compat_off_keeps_duplicate_parameters() {
        let policy = CompatPolicy::from_options(&ParseOptions::script().with_compat_mode(false));
        assert!(policy.duplicate_parameters);
        assert!(!policy.legacy_octal);
        assert!(!policy.annex_b_function_hoisting);
    }
}
