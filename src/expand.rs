//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Macro expansion: context stack, argument collection, substitution
//

use std::collections::{HashSet, VecDeque};

use log::trace;

use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, SourceLocation};
use crate::macros::{BuiltinMacro, Macro, MacroKind, MacroTable};
use crate::token::{Token, TokenKind};

/// What the expander pulls from and reports into. The main token stream
/// implements this on top of the directive layer; directive lines
/// (`#if`, `#line`) implement it over a finite token buffer.
pub(crate) trait ExpansionInput {
    fn next_token(&mut self) -> Token;
    fn macros(&self) -> &MacroTable;
    fn report(&mut self, kind: DiagnosticKind, location: SourceLocation, text: &str);
}

/// One live expansion: the macro's name and the not-yet-rescanned part
/// of its substituted replacement.
struct MacroContext {
    name: String,
    tokens: VecDeque<Token>,
}

/// Iterative rescanning expander.
///
/// Replacement tokens are held in a stack of contexts rather than being
/// expanded through native recursion; a macro is disabled while its
/// context is live, and a disabled macro's name seen anywhere in the
/// meantime gets its `expansion_disabled` flag set permanently. That
/// flag, not call depth, is what terminates self- and mutual recursion.
pub(crate) struct Expander {
    contexts: Vec<MacroContext>,
    expanding: HashSet<String>,
    pending: Option<Token>,
}

impl Expander {
    pub fn new() -> Self {
        Expander {
            contexts: Vec::new(),
            expanding: HashSet::new(),
            pending: None,
        }
    }

    /// Next fully expanded token.
    pub fn next(&mut self, input: &mut dyn ExpansionInput) -> Token {
        loop {
            let mut token = self.pull(input);
            if !self.try_expand(&mut token, input) {
                return token;
            }
        }
    }

    /// Innermost pending token: the put-back slot, then live contexts
    /// (popping drained ones), then the underlying input.
    fn pull(&mut self, input: &mut dyn ExpansionInput) -> Token {
        if let Some(token) = self.pending.take() {
            return token;
        }
        while let Some(context) = self.contexts.last_mut() {
            if let Some(token) = context.tokens.pop_front() {
                return token;
            }
            if let Some(done) = self.contexts.pop() {
                self.expanding.remove(&done.name);
            }
        }
        input.next_token()
    }

    /// Attempt to expand `token`. Returns true when a context was pushed
    /// (or the invocation was consumed and dropped) and rescanning must
    /// continue; false when the token is to be emitted as-is.
    fn try_expand(&mut self, token: &mut Token, input: &mut dyn ExpansionInput) -> bool {
        if token.kind != TokenKind::Identifier || token.expansion_disabled {
            return false;
        }
        if self.expanding.contains(&token.text) {
            token.expansion_disabled = true;
            return false;
        }
        let Some(mac) = input.macros().get(&token.text) else {
            return false;
        };
        if let Some(builtin) = mac.builtin {
            let value = match builtin {
                BuiltinMacro::Line => token.location.line.to_string(),
                BuiltinMacro::File => token.location.source_index.to_string(),
            };
            token.kind = TokenKind::ConstInt;
            token.text = value;
            return false;
        }
        let mac = mac.clone();
        let replacement = match mac.kind {
            MacroKind::Object => substitute(&mac, token, &[]),
            MacroKind::Function => {
                // Only a following '(' makes this an invocation; the
                // token is pulled across newlines and put back if it is
                // anything else.
                let next = self.pull(input);
                if next.kind != TokenKind::LeftParen {
                    self.pending = Some(next);
                    return false;
                }
                let mut args = match self.collect_arguments(input) {
                    Some(args) => args,
                    None => {
                        input.report(
                            DiagnosticKind::MacroUnterminatedInvocation,
                            token.location,
                            &token.text,
                        );
                        return false;
                    }
                };
                // `FOO()` on a zero-parameter macro is an empty
                // invocation, not one empty argument.
                if mac.params.is_empty() && args.len() == 1 && args[0].is_empty() {
                    args.clear();
                }
                if args.len() != mac.params.len() {
                    let kind = if args.len() < mac.params.len() {
                        DiagnosticKind::MacroTooFewArgs
                    } else {
                        DiagnosticKind::MacroTooManyArgs
                    };
                    input.report(kind, token.location, &token.text);
                    // The whole invocation is dropped.
                    return true;
                }
                substitute(&mac, token, &args)
            }
        };
        trace!("expand macro {} ({} tokens)", mac.name, replacement.len());
        self.expanding.insert(mac.name.clone());
        self.contexts.push(MacroContext {
            name: mac.name,
            tokens: replacement.into(),
        });
        true
    }

    /// Collect invocation arguments after the opening parenthesis.
    /// Nesting is honored, newlines read as plain whitespace, and names
    /// of macros that are live right now get their expansion flag set
    /// at this point. None means end of input was hit.
    fn collect_arguments(&mut self, input: &mut dyn ExpansionInput) -> Option<Vec<Vec<Token>>> {
        let mut args = vec![Vec::new()];
        let mut depth = 1usize;
        loop {
            let mut token = self.pull(input);
            match token.kind {
                TokenKind::Last => return None,
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(args);
                    }
                }
                TokenKind::Comma if depth == 1 => {
                    args.push(Vec::new());
                    continue;
                }
                TokenKind::Identifier if self.expanding.contains(&token.text) => {
                    token.expansion_disabled = true;
                }
                _ => {}
            }
            if token.at_line_start {
                token.at_line_start = false;
                token.has_leading_space = true;
            }
            if let Some(arg) = args.last_mut() {
                arg.push(token);
            }
        }
    }
}

/// Build the substituted replacement for one invocation: parameters are
/// spliced with their argument token sequences verbatim, every token
/// takes the invocation's location, and the first token inherits the
/// invocation's line and spacing flags.
fn substitute(mac: &Macro, invocation: &Token, args: &[Vec<Token>]) -> Vec<Token> {
    let mut out = Vec::new();
    for rep in &mac.replacement {
        if rep.kind == TokenKind::Identifier {
            if let Some(arg) = mac
                .params
                .iter()
                .position(|p| p == &rep.text)
                .and_then(|i| args.get(i))
            {
                let mut first = true;
                for token in arg {
                    let mut token = token.clone();
                    token.location = invocation.location;
                    token.at_line_start = false;
                    if first {
                        token.has_leading_space = rep.has_leading_space;
                        first = false;
                    }
                    out.push(token);
                }
                continue;
            }
        }
        let mut token = rep.clone();
        token.location = invocation.location;
        token.at_line_start = false;
        out.push(token);
    }
    if let Some(first) = out.first_mut() {
        first.at_line_start = invocation.at_line_start;
        first.has_leading_space = invocation.has_leading_space;
    }
    out
}

/// An `ExpansionInput` over a finite token buffer, used for directive
/// lines. Exhaustion reads as end of input at the buffer's location.
pub(crate) struct BufferInput<'a> {
    tokens: VecDeque<Token>,
    end: SourceLocation,
    macros: &'a MacroTable,
    diag: &'a mut dyn DiagnosticSink,
}

impl<'a> BufferInput<'a> {
    pub fn new(
        tokens: Vec<Token>,
        end: SourceLocation,
        macros: &'a MacroTable,
        diag: &'a mut dyn DiagnosticSink,
    ) -> Self {
        BufferInput {
            tokens: tokens.into(),
            end,
            macros,
            diag,
        }
    }
}

impl ExpansionInput for BufferInput<'_> {
    fn next_token(&mut self) -> Token {
        self.tokens.pop_front().unwrap_or_else(|| Token::last(self.end))
    }

    fn macros(&self) -> &MacroTable {
        self.macros
    }

    fn report(&mut self, kind: DiagnosticKind, location: SourceLocation, text: &str) {
        self.diag.report(Diagnostic {
            kind,
            location,
            text: text.to_string(),
        });
    }
}

/// Fully expand a finite token buffer.
pub(crate) fn expand_buffer(input: &mut BufferInput) -> Vec<Token> {
    let mut expander = Expander::new();
    let mut out = Vec::new();
    loop {
        let token = expander.next(input);
        if token.kind == TokenKind::Last {
            return out;
        }
        out.push(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn tokens_of(input: &str) -> Vec<Token> {
        let mut diags = Vec::new();
        let inputs = [input];
        let mut lexer = Lexer::new(&inputs, 256);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token(&mut diags);
            if t.kind == TokenKind::Last {
                break;
            }
            out.push(t);
        }
        out
    }

    fn expand_str(table: &MacroTable, input: &str) -> (Vec<String>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let toks = tokens_of(input);
        let end = SourceLocation::new(0, 1);
        let mut buffer = BufferInput::new(toks, end, table, &mut diags);
        let out = expand_buffer(&mut buffer);
        (out.iter().map(|t| t.text().to_string()).collect(), diags)
    }

    fn define(table: &mut MacroTable, name: &str, body: &str) {
        let mut diags = Vec::new();
        table.define(
            Macro::object(name, tokens_of(body)),
            SourceLocation::new(0, 1),
            &mut diags,
        );
        assert!(diags.is_empty());
    }

    fn define_fn(table: &mut MacroTable, name: &str, params: &[&str], body: &str) {
        let mut diags = Vec::new();
        table.define(
            Macro::function(
                name,
                params.iter().map(|p| p.to_string()).collect(),
                tokens_of(body),
            ),
            SourceLocation::new(0, 1),
            &mut diags,
        );
        assert!(diags.is_empty());
    }

    #[test]
    fn object_macro_expands() {
        let mut table = MacroTable::new();
        define(&mut table, "pi", "3.14");
        let (out, diags) = expand_str(&table, "x = pi ;");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["x", "=", "3.14", ";"]);
    }

    #[test]
    fn self_reference_terminates() {
        let mut table = MacroTable::new();
        define(&mut table, "foo", "foo");
        let (out, diags) = expand_str(&table, "foo");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["foo"]);
    }

    #[test]
    fn three_cycle_terminates() {
        let mut table = MacroTable::new();
        define(&mut table, "foo", "bar");
        define(&mut table, "bar", "baz");
        define(&mut table, "baz", "foo");
        let (out, _) = expand_str(&table, "foo");
        assert_eq!(out, vec!["foo"]);
    }

    #[test]
    fn function_macro_invocation() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "foo", &["x"], "((x)+1)");
        let (out, diags) = expand_str(&table, "foo(bar)");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["(", "(", "bar", ")", "+", "1", ")"]);
    }

    #[test]
    fn function_macro_without_paren_is_literal() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "foo", &["x"], "x");
        let (out, diags) = expand_str(&table, "foo + 1");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["foo", "+", "1"]);
    }

    #[test]
    fn arguments_not_preexpanded_but_rescanned() {
        let mut table = MacroTable::new();
        define(&mut table, "one", "1");
        define_fn(&mut table, "id", &["x"], "x");
        let (out, _) = expand_str(&table, "id(one)");
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn parameter_shadows_macro() {
        let mut table = MacroTable::new();
        define(&mut table, "x", "0");
        define_fn(&mut table, "foo", &["x"], "x");
        let (out, _) = expand_str(&table, "foo(1)");
        assert_eq!(out, vec!["1"]);
    }

    #[test]
    fn nested_parens_in_arguments() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "first", &["a", "b"], "a");
        let (out, diags) = expand_str(&table, "first(f(x, y), z)");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["f", "(", "x", ",", "y", ")"]);
    }

    #[test]
    fn empty_invocation_of_one_param_macro() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "wrap", &["x"], "[x]");
        let (out, diags) = expand_str(&table, "wrap()");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["[", "]"]);
    }

    #[test]
    fn empty_invocation_of_zero_param_macro() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "unit", &[], "u");
        let (out, diags) = expand_str(&table, "unit()");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["u"]);
    }

    #[test]
    fn arity_mismatch_drops_invocation() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "two", &["a", "b"], "a b");
        let (out, diags) = expand_str(&table, "x two(1) y two(1,2,3) z");
        assert_eq!(out, vec!["x", "y", "z"]);
        assert_eq!(diags[0].kind, DiagnosticKind::MacroTooFewArgs);
        assert_eq!(diags[1].kind, DiagnosticKind::MacroTooManyArgs);
    }

    #[test]
    fn unterminated_invocation_emits_name() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "foo", &["x"], "x");
        let (out, diags) = expand_str(&table, "foo(1, 2");
        assert_eq!(out, vec!["foo"]);
        assert_eq!(diags[0].kind, DiagnosticKind::MacroUnterminatedInvocation);
    }

    #[test]
    fn mutual_recursion_through_arguments() {
        let mut table = MacroTable::new();
        define_fn(&mut table, "f", &["x"], "f(x)");
        let (out, diags) = expand_str(&table, "f(2)");
        assert!(diags.is_empty());
        assert_eq!(out, vec!["f", "(", "2", ")"]);
    }

    #[test]
    fn line_and_file_builtins() {
        let table = MacroTable::new();
        let (out, _) = expand_str(&table, "__LINE__ __FILE__ __VERSION__ GL_ES");
        assert_eq!(out, vec!["1", "0", "100", "1"]);
    }

    #[test]
    fn substituted_tokens_take_invocation_location() {
        let mut table = MacroTable::new();
        define(&mut table, "pi", "3.14");
        let mut diags = Vec::new();
        let toks = tokens_of("\n\npi");
        let end = SourceLocation::new(0, 3);
        let mut buffer = BufferInput::new(toks, end, &table, &mut diags);
        let out = expand_buffer(&mut buffer);
        assert_eq!(out[0].location.line, 3);
    }
}
