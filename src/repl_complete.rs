//! Tab-completion for the REPL: prefix-matches the word under the cursor
//! against the built-in registry's names and the current environment's
//! bindings.

use rustyline::Context;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use std::cell::RefCell;
use std::rc::Rc;

/// Candidates are refreshed by the REPL loop each iteration so that names
/// `define`d during the session join the built-in registry's names.
pub struct ReplCompleter {
    pub candidates: Rc<RefCell<Vec<String>>>,
}

impl rustyline::Helper for ReplCompleter {}

impl rustyline::hint::Hinter for ReplCompleter {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplCompleter {}

impl Validator for ReplCompleter {
    fn validate(
        &self,
        _ctx: &mut ValidationContext,
    ) -> Result<ValidationResult, rustyline::error::ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Completer for ReplCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), rustyline::error::ReadlineError> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(')
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];
        let matches = self
            .candidates
            .borrow()
            .iter()
            .filter(|s| s.starts_with(word))
            .map(|s| Pair {
                display: s.clone(),
                replacement: s.clone(),
            })
            .collect();
        Ok((start, matches))
    }
}
