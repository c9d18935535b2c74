//! Argument-count and numeric argument validation.

use std::fmt;

use crate::state::ReplState;

/// Bounds on the number of arguments a command accepts, not counting the
/// command word itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` means any number of arguments.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn new(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn exactly(n: usize) -> Self {
        Self::new(n, n)
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Bounds widened by `words` leading words.
    ///
    /// Subcommands declare bounds on the arguments after the subcommand
    /// word; shifting by one lets the same check run against the full
    /// `[parent, subcommand, ...]` list.
    pub const fn shifted(self, words: usize) -> Self {
        Self {
            min: self.min + words,
            max: match self.max {
                Some(max) => Some(max + words),
                None => None,
            },
        }
    }

    /// Check an argument count against these bounds.
    pub fn check(&self, count: usize) -> Result<(), ArityViolation> {
        if count < self.min {
            return Err(ArityViolation::TooFew {
                min: self.min,
                got: count,
            });
        }
        if let Some(max) = self.max
            && count > max
        {
            return Err(ArityViolation::TooMany { max, got: count });
        }
        Ok(())
    }
}

/// Which bound an invocation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityViolation {
    TooFew { min: usize, got: usize },
    TooMany { max: usize, got: usize },
}

impl fmt::Display for ArityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFew { min, got } => {
                write!(f, "Too few args; need at least {min}, got {got}")
            },
            Self::TooMany { max, got } => {
                write!(f, "Too many args; need at most {max}, got {got}")
            },
        }
    }
}

/// Validate `args` (command word first) against `arity`.
///
/// On failure the violated bound is reported on the REPL output and
/// `false` is returned; the caller just skips this one dispatch.
pub fn arg_count_ok(arity: Arity, args: &[&str], state: &mut ReplState) -> bool {
    let count = args.len().saturating_sub(1);
    match arity.check(count) {
        Ok(()) => true,
        Err(violation) => {
            log::debug!("arity check failed for {:?}: {violation}", args.first());
            state.errmsg(violation);
            false
        },
    }
}

/// Parse a signed integer argument and check it against bounds.
///
/// `what` names the value in diagnostics (e.g. "line width"). Problems are
/// reported on the REPL output and yield `None`.
pub fn get_int(
    arg: &str,
    what: &str,
    min: i64,
    max: Option<i64>,
    state: &mut ReplState,
) -> Option<i64> {
    let Ok(value) = arg.parse::<i64>() else {
        state.errmsg(format!("Expecting integer {what}; got '{arg}'."));
        return None;
    };
    if value < min {
        state.errmsg(format!(
            "Expecting integer value {what} to be at least {min}; got {value}."
        ));
        return None;
    }
    if let Some(max) = max
        && value > max
    {
        state.errmsg(format!(
            "Expecting integer value {what} to be at most {max}; got {value}."
        ));
        return None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::capture_state;

    #[test]
    fn too_few() {
        let (mut state, out) = capture_state();
        assert!(!arg_count_ok(Arity::new(1, 2), &["cmd"], &mut state));
        assert!(out.text().contains("Too few args; need at least 1, got 0"));
    }

    #[test]
    fn within_bounds() {
        let (mut state, out) = capture_state();
        assert!(arg_count_ok(Arity::new(1, 2), &["cmd", "a"], &mut state));
        assert!(arg_count_ok(Arity::new(1, 2), &["cmd", "a", "b"], &mut state));
        assert!(out.text().is_empty());
    }

    #[test]
    fn too_many() {
        let (mut state, out) = capture_state();
        assert!(!arg_count_ok(
            Arity::new(1, 2),
            &["cmd", "a", "b", "c"],
            &mut state
        ));
        assert!(out.text().contains("Too many args; need at most 2, got 3"));
    }

    #[test]
    fn unbounded_max() {
        let (mut state, _out) = capture_state();
        assert!(arg_count_ok(
            Arity::at_least(1),
            &["cmd", "a", "b", "c", "d"],
            &mut state
        ));
    }

    #[test]
    fn zero_max_is_enforced() {
        let (mut state, _out) = capture_state();
        assert!(arg_count_ok(Arity::exactly(0), &["show"], &mut state));
        assert!(!arg_count_ok(Arity::exactly(0), &["show", "x"], &mut state));
    }

    #[test]
    fn shifted_bounds() {
        assert_eq!(Arity::exactly(1).shifted(1), Arity::exactly(2));
        assert_eq!(Arity::at_least(0).shifted(1), Arity::at_least(1));
    }

    #[test]
    fn errors_are_marked_without_highlight() {
        let (mut state, out) = capture_state();
        arg_count_ok(Arity::exactly(0), &["quit", "1"], &mut state);
        assert!(out.text().starts_with("** Too many args"));
    }

    #[test]
    fn get_int_parses() {
        let (mut state, _out) = capture_state();
        assert_eq!(get_int("120", "line width", 0, Some(10000), &mut state), Some(120));
        assert_eq!(get_int("-3", "offset", -10, None, &mut state), Some(-3));
    }

    #[test]
    fn get_int_rejects_garbage() {
        let (mut state, out) = capture_state();
        assert_eq!(get_int("wide", "line width", 0, Some(10000), &mut state), None);
        assert!(out.text().contains("Expecting integer line width; got 'wide'."));
    }

    #[test]
    fn get_int_rejects_out_of_range() {
        let (mut state, out) = capture_state();
        assert_eq!(get_int("-1", "line width", 0, Some(10000), &mut state), None);
        assert_eq!(get_int("10001", "line width", 0, Some(10000), &mut state), None);
        let text = out.text();
        assert!(text.contains("to be at least 0; got -1."));
        assert!(text.contains("to be at most 10000; got 10001."));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn check_matches_bounds(min in 0usize..5, extra in 0usize..5, count in 0usize..12) {
                let arity = Arity::new(min, min + extra);
                let ok = arity.check(count).is_ok();
                prop_assert_eq!(ok, count >= min && count <= min + extra);
            }

            #[test]
            fn unbounded_only_checks_min(min in 0usize..5, count in 0usize..50) {
                prop_assert_eq!(Arity::at_least(min).check(count).is_ok(), count >= min);
            }

            #[test]
            fn shift_preserves_verdict(min in 0usize..5, extra in 0usize..5, count in 0usize..12) {
                let arity = Arity::new(min, min + extra);
                prop_assert_eq!(
                    arity.check(count).is_ok(),
                    arity.shifted(1).check(count + 1).is_ok()
                );
            }
        }
    }
}
