//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Directive parsing, conditional inclusion and the preprocessor front end
//

use log::{debug, trace};

use crate::diag::{
    Diagnostic, DiagnosticKind, DiagnosticSink, LocationTracker, SourceLocation,
};
use crate::expand::{expand_buffer, BufferInput, Expander, ExpansionInput};
use crate::expr::{parse_integer, ExprEvaluator};
use crate::lexer::Lexer;
use crate::macros::{Macro, MacroTable};
use crate::token::{tokens_to_text, Token, TokenKind};

/// Receiver for directives that are the host compiler's business rather
/// than the preprocessor's.
pub trait DirectiveHandler {
    fn handle_error(&mut self, _location: SourceLocation, _message: &str) {}
    fn handle_pragma(
        &mut self,
        _location: SourceLocation,
        _name: &str,
        _value: &str,
        _stdgl: bool,
    ) {
    }
    fn handle_extension(&mut self, _location: SourceLocation, _name: &str, _behavior: &str) {}
    fn handle_version(&mut self, _location: SourceLocation, _version: i32) {}
}

/// Handler that ignores everything.
pub struct NullHandler;

impl DirectiveHandler for NullHandler {}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Maximum lexeme length before truncation; 0 means the default.
    pub max_token_size: usize,
}

impl Options {
    fn effective_max_token_size(&self) -> usize {
        if self.max_token_size == 0 {
            256
        } else {
            self.max_token_size
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionalKind {
    If,
    Ifdef,
    Ifndef,
}

impl ConditionalKind {
    fn name(self) -> &'static str {
        match self {
            ConditionalKind::If => "if",
            ConditionalKind::Ifdef => "ifdef",
            ConditionalKind::Ifndef => "ifndef",
        }
    }
}

/// One open `#if`/`#ifdef`/`#ifndef` region.
struct Conditional {
    kind: ConditionalKind,
    location: SourceLocation,
    /// Whether the enclosing regions were active when this one opened.
    parent_active: bool,
    /// Whether the branch currently being scanned is emitted.
    active: bool,
    /// Whether any branch of this chain has been taken.
    had_true: bool,
    seen_else: bool,
}

/// Raw-stream side of the preprocessor: pulls scanner tokens, applies
/// `#line` remapping, consumes directives and drops the contents of
/// inactive conditional regions. What remains feeds the macro expander.
struct DirectiveParser<'i, 'h> {
    lexer: Lexer<'i>,
    tracker: LocationTracker,
    macros: MacroTable,
    conditionals: Vec<Conditional>,
    /// Unmapped put-back slot for the token that ended a directive line.
    pending: Option<Token>,
    /// Raw position of the most recent line-opening `#`.
    hash_raw: SourceLocation,
    diag: &'h mut dyn DiagnosticSink,
    handler: &'h mut dyn DirectiveHandler,
    seen_construct: bool,
}

impl<'i, 'h> DirectiveParser<'i, 'h> {
    fn new(
        inputs: &[&'i str],
        options: Options,
        diag: &'h mut dyn DiagnosticSink,
        handler: &'h mut dyn DirectiveHandler,
    ) -> Self {
        DirectiveParser {
            lexer: Lexer::new(inputs, options.effective_max_token_size()),
            tracker: LocationTracker::new(),
            macros: MacroTable::new(),
            conditionals: Vec::new(),
            pending: None,
            hash_raw: SourceLocation::new(0, 1),
            diag,
            handler,
            seen_construct: false,
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind, location: SourceLocation, text: &str) {
        self.diag.report(Diagnostic {
            kind,
            location,
            text: text.to_string(),
        });
    }

    /// Next token with its raw location.
    fn scan(&mut self) -> Token {
        match self.pending.take() {
            Some(token) => token,
            None => self.lexer.next_token(&mut *self.diag),
        }
    }

    fn mapped(&self, mut token: Token) -> Token {
        token.location = self.tracker.map(token.location);
        token
    }

    fn next_raw(&mut self) -> Token {
        let token = self.scan();
        // Remember the raw spot of a line-opening '#'; #line needs it
        // after its own directive line has been consumed.
        if token.kind == TokenKind::PpHash && token.at_line_start {
            self.hash_raw = token.location;
        }
        self.mapped(token)
    }

    /// Next token of the current directive line, or None at its end.
    /// The line-ending token goes back into the put-back slot unmapped
    /// so a `#line` override still applies to it.
    fn line_token(&mut self) -> Option<Token> {
        let token = self.scan();
        if token.kind == TokenKind::Last || token.at_line_start {
            self.pending = Some(token);
            None
        } else {
            Some(self.mapped(token))
        }
    }

    fn collect_line(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.line_token() {
            tokens.push(token);
        }
        tokens
    }

    fn skip_line(&mut self) {
        while self.line_token().is_some() {}
    }

    fn is_active(&self) -> bool {
        self.conditionals.iter().all(|c| c.active)
    }

    /// The expander's base stream: everything that survives directive
    /// handling and conditional exclusion.
    fn next_skipping(&mut self) -> Token {
        loop {
            let token = self.next_raw();
            match token.kind {
                TokenKind::Last => {
                    if let Some(frame) = self.conditionals.pop() {
                        self.diagnose(
                            DiagnosticKind::ConditionalUnterminated,
                            frame.location,
                            frame.kind.name(),
                        );
                        self.conditionals.clear();
                    }
                    return token;
                }
                TokenKind::PpHash if token.at_line_start => {
                    self.directive(token);
                }
                _ if !self.is_active() => {
                    // Excluded content is discarded without a sound.
                }
                _ => {
                    self.seen_construct = true;
                    return token;
                }
            }
        }
    }

    fn directive(&mut self, hash: Token) {
        let Some(name_token) = self.line_token() else {
            // A lone '#' is a null directive, but still a construct as
            // far as #version placement is concerned.
            self.seen_construct = true;
            return;
        };
        let active = self.is_active();
        if name_token.kind != TokenKind::Identifier {
            if active {
                self.diagnose(
                    DiagnosticKind::DirectiveInvalidName,
                    name_token.location,
                    name_token.text(),
                );
            }
            self.skip_line();
            self.seen_construct = true;
            return;
        }
        trace!("directive #{} (active={})", name_token.text, active);
        match name_token.text.as_str() {
            // Conditionals are tracked even in excluded regions.
            "if" => self.parse_if(ConditionalKind::If, &hash),
            "ifdef" => self.parse_ifdef(ConditionalKind::Ifdef, &hash),
            "ifndef" => self.parse_ifdef(ConditionalKind::Ifndef, &hash),
            "elif" => self.parse_elif(&hash),
            "else" => self.parse_else(&hash),
            "endif" => self.parse_endif(&hash),
            _ if !active => self.skip_line(),
            "define" => self.parse_define(&hash),
            "undef" => self.parse_undef(&hash),
            "line" => self.parse_line(&hash),
            "pragma" => self.parse_pragma(&hash),
            "extension" => self.parse_extension(&hash),
            "version" => self.parse_version(&hash),
            "error" => self.parse_error(&hash),
            other => {
                self.diagnose(DiagnosticKind::DirectiveInvalidName, name_token.location, other);
                self.skip_line();
            }
        }
        self.seen_construct = true;
    }

    fn push_frame(&mut self, kind: ConditionalKind, location: SourceLocation, taken: bool) {
        let parent_active = self.is_active();
        self.conditionals.push(Conditional {
            kind,
            location,
            parent_active,
            active: parent_active && taken,
            // A chain under an inactive parent can never take a branch.
            had_true: !parent_active || taken,
            seen_else: false,
        });
    }

    fn parse_if(&mut self, kind: ConditionalKind, hash: &Token) {
        let line = self.collect_line();
        let taken = if self.is_active() {
            self.eval_condition(line, hash.location)
        } else {
            false
        };
        self.push_frame(kind, hash.location, taken);
    }

    fn parse_ifdef(&mut self, kind: ConditionalKind, hash: &Token) {
        let line = self.collect_line();
        let taken = if self.is_active() {
            match line.first() {
                Some(t) if t.kind == TokenKind::Identifier => {
                    if let Some(extra) = line.get(1) {
                        self.diagnose(
                            DiagnosticKind::UnexpectedToken,
                            extra.location,
                            extra.text(),
                        );
                    }
                    let defined = self.macros.is_defined(&line[0].text);
                    (kind == ConditionalKind::Ifdef) == defined
                }
                Some(t) => {
                    let (location, text) = (t.location, t.text().to_string());
                    self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                    false
                }
                None => {
                    self.diagnose(DiagnosticKind::UnexpectedToken, hash.location, "");
                    false
                }
            }
        } else {
            false
        };
        self.push_frame(kind, hash.location, taken);
    }

    fn parse_elif(&mut self, hash: &Token) {
        let line = self.collect_line();
        let Some(frame) = self.conditionals.last() else {
            self.diagnose(DiagnosticKind::ConditionalElifWithoutIf, hash.location, "");
            return;
        };
        let parent_active = frame.parent_active;
        let had_true = frame.had_true;
        if frame.seen_else {
            if parent_active {
                self.diagnose(DiagnosticKind::ConditionalElifAfterElse, hash.location, "");
            }
            if let Some(frame) = self.conditionals.last_mut() {
                frame.active = false;
            }
            return;
        }
        // A branch that cannot be taken has its expression ignored,
        // malformed or not.
        let taken = if parent_active && !had_true {
            self.eval_condition(line, hash.location)
        } else {
            false
        };
        if let Some(frame) = self.conditionals.last_mut() {
            frame.active = frame.parent_active && taken;
            frame.had_true |= taken;
        }
    }

    fn parse_else(&mut self, hash: &Token) {
        let line = self.collect_line();
        let Some(frame) = self.conditionals.last() else {
            self.diagnose(DiagnosticKind::ConditionalElseWithoutIf, hash.location, "");
            return;
        };
        let parent_active = frame.parent_active;
        let had_true = frame.had_true;
        let seen_else = frame.seen_else;
        if parent_active {
            if let Some(extra) = line.first() {
                let (location, text) = (extra.location, extra.text().to_string());
                self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
            }
        }
        if seen_else {
            if parent_active {
                self.diagnose(DiagnosticKind::ConditionalElseAfterElse, hash.location, "");
            }
            if let Some(frame) = self.conditionals.last_mut() {
                frame.active = false;
            }
            return;
        }
        if let Some(frame) = self.conditionals.last_mut() {
            frame.seen_else = true;
            frame.active = parent_active && !had_true;
            frame.had_true = true;
        }
    }

    fn parse_endif(&mut self, hash: &Token) {
        let line = self.collect_line();
        match self.conditionals.pop() {
            None => {
                self.diagnose(DiagnosticKind::ConditionalEndifWithoutIf, hash.location, "");
            }
            Some(frame) => {
                if frame.parent_active {
                    if let Some(extra) = line.first() {
                        let (location, text) = (extra.location, extra.text().to_string());
                        self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                    }
                }
            }
        }
    }

    /// Evaluate an `#if`/`#elif` operand: rewrite literal `defined`
    /// applications (operands unexpanded), macro-expand the rest, then
    /// run the constant-expression evaluator.
    fn eval_condition(&mut self, line: Vec<Token>, location: SourceLocation) -> bool {
        if line.is_empty() {
            self.diagnose(DiagnosticKind::ConditionalUnexpectedToken, location, "");
            return false;
        }
        let Some(rewritten) = self.rewrite_defined(line) else {
            return false;
        };
        let expanded = {
            let mut input =
                BufferInput::new(rewritten, location, &self.macros, &mut *self.diag);
            expand_buffer(&mut input)
        };
        let (value, leftover) = {
            let mut ev = ExprEvaluator::new(
                &expanded,
                location,
                &self.macros,
                &mut *self.diag,
                true,
                DiagnosticKind::ConditionalUnexpectedToken,
            );
            let value = ev.evaluate();
            let leftover = (!ev.finished())
                .then(|| ev.remainder().map(|t| (t.location, t.text().to_string())))
                .flatten();
            (value, leftover)
        };
        let Some(value) = value else {
            return false;
        };
        if let Some((location, text)) = leftover {
            self.diagnose(DiagnosticKind::ConditionalUnexpectedToken, location, &text);
            return false;
        }
        value != 0
    }

    /// Replace each literal `defined IDENT` / `defined ( IDENT )` with
    /// 0 or 1 before any expansion happens. None on a malformed
    /// application (already reported).
    fn rewrite_defined(&mut self, line: Vec<Token>) -> Option<Vec<Token>> {
        let mut out = Vec::new();
        let mut it = line.into_iter();
        while let Some(token) = it.next() {
            if !token.is_ident("defined") {
                out.push(token);
                continue;
            }
            let mut operand = it.next();
            let parenthesized = matches!(&operand, Some(o) if o.kind == TokenKind::LeftParen);
            if parenthesized {
                operand = it.next();
            }
            let name = match operand {
                Some(o) if o.kind == TokenKind::Identifier => o.text,
                _ => {
                    self.diagnose(
                        DiagnosticKind::ConditionalUnexpectedToken,
                        token.location,
                        "defined",
                    );
                    return None;
                }
            };
            if parenthesized
                && !matches!(it.next(), Some(c) if c.kind == TokenKind::RightParen)
            {
                self.diagnose(
                    DiagnosticKind::ConditionalUnexpectedToken,
                    token.location,
                    "defined",
                );
                return None;
            }
            let value = if self.macros.is_defined(&name) { "1" } else { "0" };
            let mut replacement =
                Token::new(TokenKind::ConstInt, value.to_string(), token.location);
            replacement.has_leading_space = token.has_leading_space;
            out.push(replacement);
        }
        Some(out)
    }

    fn parse_define(&mut self, hash: &Token) {
        let line = self.collect_line();
        let mut it = line.into_iter();
        let name_token = match it.next() {
            Some(t) if t.kind == TokenKind::Identifier => t,
            Some(t) => {
                let (location, text) = (t.location, t.text().to_string());
                self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                return;
            }
            None => {
                self.diagnose(DiagnosticKind::UnexpectedToken, hash.location, "");
                return;
            }
        };
        let mut rest: Vec<Token> = it.collect();
        let function_like = rest
            .first()
            .is_some_and(|t| t.kind == TokenKind::LeftParen && !t.has_leading_space);
        let mac = if function_like {
            rest.remove(0);
            let Some(params) = self.parse_params(&mut rest, hash) else {
                return;
            };
            Macro::function(&name_token.text, params, rest)
        } else {
            Macro::object(&name_token.text, rest)
        };
        self.macros.define(mac, name_token.location, &mut *self.diag);
    }

    /// Parse a parameter list off the front of `rest`, leaving the
    /// replacement tokens behind. None on a malformed list.
    fn parse_params(&mut self, rest: &mut Vec<Token>, hash: &Token) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if rest.first().is_some_and(|t| t.kind == TokenKind::RightParen) {
            rest.remove(0);
            return Some(params);
        }
        loop {
            match rest.first() {
                Some(t) if t.kind == TokenKind::Identifier => {
                    if params.contains(&t.text) {
                        let (location, text) = (t.location, t.text().to_string());
                        self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                        return None;
                    }
                    params.push(t.text.clone());
                    rest.remove(0);
                }
                Some(t) => {
                    let (location, text) = (t.location, t.text().to_string());
                    self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                    return None;
                }
                None => {
                    self.diagnose(DiagnosticKind::UnexpectedToken, hash.location, "");
                    return None;
                }
            }
            match rest.first().map(|t| t.kind) {
                Some(TokenKind::Comma) => {
                    rest.remove(0);
                }
                Some(TokenKind::RightParen) => {
                    rest.remove(0);
                    return Some(params);
                }
                Some(_) => {
                    let (location, text) = rest
                        .first()
                        .map(|t| (t.location, t.text().to_string()))
                        .unwrap_or((hash.location, String::new()));
                    self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                    return None;
                }
                None => {
                    self.diagnose(DiagnosticKind::UnexpectedToken, hash.location, "");
                    return None;
                }
            }
        }
    }

    fn parse_undef(&mut self, hash: &Token) {
        let line = self.collect_line();
        match line.first() {
            Some(t) if t.kind == TokenKind::Identifier => {
                if let Some(extra) = line.get(1) {
                    let (location, text) = (extra.location, extra.text().to_string());
                    self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
                }
                let (name, location) = (line[0].text.clone(), line[0].location);
                self.macros.undef(&name, location, &mut *self.diag);
            }
            Some(t) => {
                let (location, text) = (t.location, t.text().to_string());
                self.diagnose(DiagnosticKind::UnexpectedToken, location, &text);
            }
            None => {
                self.diagnose(DiagnosticKind::UnexpectedToken, hash.location, "");
            }
        }
    }

    fn parse_line(&mut self, hash: &Token) {
        let line = self.collect_line();
        if line.is_empty() {
            self.diagnose(DiagnosticKind::InvalidLineDirective, hash.location, "");
            return;
        }
        let expanded = {
            let mut input = BufferInput::new(line, hash.location, &self.macros, &mut *self.diag);
            expand_buffer(&mut input)
        };
        let (line_number, file_number, leftover) = {
            let mut ev = ExprEvaluator::new(
                &expanded,
                hash.location,
                &self.macros,
                &mut *self.diag,
                false,
                DiagnosticKind::InvalidLineDirective,
            );
            let Some(line_number) = ev.evaluate() else {
                return;
            };
            let file_number = if ev.finished() {
                None
            } else {
                match ev.evaluate() {
                    Some(v) => Some(v),
                    None => return,
                }
            };
            let leftover = (!ev.finished())
                .then(|| ev.remainder().map(|t| (t.location, t.text().to_string())))
                .flatten();
            (line_number, file_number, leftover)
        };
        if let Some((location, text)) = leftover {
            self.diagnose(DiagnosticKind::InvalidLineDirective, location, &text);
            return;
        }
        if line_number < 0 {
            self.diagnose(DiagnosticKind::InvalidLineNumber, hash.location, "");
            return;
        }
        if file_number.is_some_and(|f| f < 0) {
            self.diagnose(DiagnosticKind::InvalidFileNumber, hash.location, "");
            return;
        }
        debug!(
            "#line {} {:?} at raw {}",
            line_number, file_number, self.hash_raw
        );
        // The override starts on the line after the directive.
        self.tracker.set_line(
            self.hash_raw.source_index,
            self.hash_raw.line + 1,
            line_number as u32,
            file_number.map(|f| f as u32),
        );
    }

    fn parse_pragma(&mut self, hash: &Token) {
        let line = self.collect_line();
        if line.is_empty() {
            // An empty pragma is dropped without comment.
            return;
        }
        let mut i = 0;
        let stdgl = line[0].is_ident("STDGL");
        if stdgl {
            i += 1;
        }
        let name = match line.get(i) {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => {
                let text = tokens_to_text(&line);
                self.diagnose(DiagnosticKind::UnrecognizedPragma, hash.location, &text);
                return;
            }
        };
        i += 1;
        let mut value = String::new();
        if i < line.len() {
            let well_formed = line.len() == i + 3
                && line[i].kind == TokenKind::LeftParen
                && matches!(
                    line[i + 1].kind,
                    TokenKind::Identifier | TokenKind::ConstInt | TokenKind::ConstFloat
                )
                && line[i + 2].kind == TokenKind::RightParen;
            if !well_formed {
                let text = tokens_to_text(&line);
                self.diagnose(DiagnosticKind::UnrecognizedPragma, hash.location, &text);
                return;
            }
            value = line[i + 1].text().to_string();
        }
        self.handler.handle_pragma(hash.location, &name, &value, stdgl);
    }

    fn parse_extension(&mut self, hash: &Token) {
        let line = self.collect_line();
        let name = match line.first() {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            Some(t) => {
                let (location, text) = (t.location, t.text().to_string());
                self.diagnose(DiagnosticKind::InvalidExtensionName, location, &text);
                return;
            }
            None => {
                self.diagnose(DiagnosticKind::InvalidExtensionDirective, hash.location, "");
                return;
            }
        };
        if !matches!(line.get(1), Some(c) if c.kind == TokenKind::Colon) {
            self.diagnose(DiagnosticKind::InvalidExtensionDirective, hash.location, "");
            return;
        }
        let behavior = match line.get(2) {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            Some(t) => {
                let (location, text) = (t.location, t.text().to_string());
                self.diagnose(DiagnosticKind::InvalidExtensionBehavior, location, &text);
                return;
            }
            None => {
                self.diagnose(DiagnosticKind::InvalidExtensionDirective, hash.location, "");
                return;
            }
        };
        if let Some(extra) = line.get(3) {
            let (location, text) = (extra.location, extra.text().to_string());
            self.diagnose(DiagnosticKind::InvalidExtensionDirective, location, &text);
            return;
        }
        self.handler.handle_extension(hash.location, &name, &behavior);
    }

    fn parse_version(&mut self, hash: &Token) {
        let misplaced = self.seen_construct;
        let line = self.collect_line();
        let version = match line.first() {
            Some(t) if t.kind == TokenKind::ConstInt => {
                let (value, overflow) = parse_integer(t.text());
                if overflow {
                    let (location, text) = (t.location, t.text().to_string());
                    self.diagnose(DiagnosticKind::InvalidVersionNumber, location, &text);
                    return;
                }
                value
            }
            Some(t) => {
                let (location, text) = (t.location, t.text().to_string());
                self.diagnose(DiagnosticKind::InvalidVersionNumber, location, &text);
                return;
            }
            None => {
                self.diagnose(DiagnosticKind::InvalidVersionDirective, hash.location, "");
                return;
            }
        };
        if let Some(extra) = line.get(1) {
            let (location, text) = (extra.location, extra.text().to_string());
            self.diagnose(DiagnosticKind::InvalidVersionDirective, location, &text);
            return;
        }
        if misplaced {
            // The handler still learns the requested version; the
            // diagnostic alone marks the shader invalid.
            self.diagnose(DiagnosticKind::VersionNotFirstStatement, hash.location, "");
        }
        self.handler.handle_version(hash.location, version);
    }

    fn parse_error(&mut self, hash: &Token) {
        let line = self.collect_line();
        let message = tokens_to_text(&line);
        self.handler.handle_error(hash.location, &message);
    }
}

impl ExpansionInput for DirectiveParser<'_, '_> {
    fn next_token(&mut self) -> Token {
        self.next_skipping()
    }

    fn macros(&self) -> &MacroTable {
        &self.macros
    }

    fn report(&mut self, kind: DiagnosticKind, location: SourceLocation, text: &str) {
        self.diagnose(kind, location, text);
    }
}

/// The preprocessor session. Pull tokens with [`Preprocessor::lex`];
/// diagnostics and out-of-band directives go to the sink and handler
/// given at construction. All state is owned here and discarded with
/// the session.
pub struct Preprocessor<'i, 'h> {
    parser: DirectiveParser<'i, 'h>,
    expander: Expander,
}

impl<'i, 'h> Preprocessor<'i, 'h> {
    pub fn new(
        inputs: &[&'i str],
        options: Options,
        diag: &'h mut dyn DiagnosticSink,
        handler: &'h mut dyn DirectiveHandler,
    ) -> Self {
        Preprocessor {
            parser: DirectiveParser::new(inputs, options, diag, handler),
            expander: Expander::new(),
        }
    }

    /// Next fully preprocessed token. Returns `Last` forever once the
    /// input is exhausted.
    pub fn lex(&mut self) -> Token {
        loop {
            let token = self.expander.next(&mut self.parser);
            match token.kind {
                TokenKind::PpNumber => {
                    self.parser.diagnose(
                        DiagnosticKind::InvalidNumber,
                        token.location,
                        token.text(),
                    );
                }
                TokenKind::PpOther => {
                    self.parser.diagnose(
                        DiagnosticKind::InvalidCharacter,
                        token.location,
                        token.text(),
                    );
                }
                TokenKind::PpHash => {
                    self.parser.diagnose(
                        DiagnosticKind::UnexpectedToken,
                        token.location,
                        "#",
                    );
                }
                _ => return token,
            }
        }
    }
}
