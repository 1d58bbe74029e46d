//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Integer constant expression evaluation for #if, #elif and #line
//

use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, SourceLocation};
use crate::macros::MacroTable;
use crate::token::{Token, TokenKind};

/// Recursive-descent evaluator over an already-expanded token buffer.
///
/// Arithmetic is signed 32-bit with wrap-around. Both operands of `&&`
/// and `||` are always parsed, but the `live` flag goes false on the
/// short-circuited side so that division-by-zero and overflow there
/// produce no diagnostics.
pub(crate) struct ExprEvaluator<'a> {
    tokens: &'a [Token],
    pos: usize,
    macros: &'a MacroTable,
    diag: &'a mut dyn DiagnosticSink,
    location: SourceLocation,
    allow_defined: bool,
    error_kind: DiagnosticKind,
}

impl<'a> ExprEvaluator<'a> {
    pub fn new(
        tokens: &'a [Token],
        location: SourceLocation,
        macros: &'a MacroTable,
        diag: &'a mut dyn DiagnosticSink,
        allow_defined: bool,
        error_kind: DiagnosticKind,
    ) -> Self {
        ExprEvaluator {
            tokens,
            pos: 0,
            macros,
            diag,
            location,
            allow_defined,
            error_kind,
        }
    }

    /// Evaluate one expression from the current position. None on a
    /// syntax error (already reported).
    pub fn evaluate(&mut self) -> Option<i32> {
        self.expr_or(true)
    }

    /// True once every token has been consumed.
    pub fn finished(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// First unconsumed token, if any.
    pub fn remainder(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn syntax_error(&mut self) -> Option<i32> {
        let (location, text) = match self.tokens.get(self.pos) {
            Some(t) => (t.location, t.text().to_string()),
            None => (self.location, String::new()),
        };
        self.diag.report(Diagnostic {
            kind: self.error_kind,
            location,
            text,
        });
        None
    }

    fn report_if_live(&mut self, live: bool, kind: DiagnosticKind, location: SourceLocation) {
        if live {
            self.diag.report(Diagnostic {
                kind,
                location,
                text: String::new(),
            });
        }
    }

    fn expr_or(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_and(live)?;
        while self.eat(TokenKind::PipePipe) {
            let right = self.expr_and(live && left == 0)?;
            left = i32::from(left != 0 || right != 0);
        }
        Some(left)
    }

    fn expr_and(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_bitor(live)?;
        while self.eat(TokenKind::AmpAmp) {
            let right = self.expr_bitor(live && left != 0)?;
            left = i32::from(left != 0 && right != 0);
        }
        Some(left)
    }

    fn expr_bitor(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_bitxor(live)?;
        while self.eat(TokenKind::Pipe) {
            left |= self.expr_bitxor(live)?;
        }
        Some(left)
    }

    fn expr_bitxor(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_bitand(live)?;
        while self.eat(TokenKind::Caret) {
            left ^= self.expr_bitand(live)?;
        }
        Some(left)
    }

    fn expr_bitand(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_equality(live)?;
        while self.eat(TokenKind::Amp) {
            left &= self.expr_equality(live)?;
        }
        Some(left)
    }

    fn expr_equality(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_relational(live)?;
        loop {
            if self.eat(TokenKind::EqualEqual) {
                left = i32::from(left == self.expr_relational(live)?);
            } else if self.eat(TokenKind::BangEqual) {
                left = i32::from(left != self.expr_relational(live)?);
            } else {
                return Some(left);
            }
        }
    }

    fn expr_relational(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_shift(live)?;
        loop {
            if self.eat(TokenKind::Less) {
                left = i32::from(left < self.expr_shift(live)?);
            } else if self.eat(TokenKind::Greater) {
                left = i32::from(left > self.expr_shift(live)?);
            } else if self.eat(TokenKind::LessEqual) {
                left = i32::from(left <= self.expr_shift(live)?);
            } else if self.eat(TokenKind::GreaterEqual) {
                left = i32::from(left >= self.expr_shift(live)?);
            } else {
                return Some(left);
            }
        }
    }

    fn expr_shift(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_additive(live)?;
        loop {
            if self.eat(TokenKind::LeftShift) {
                left = left.wrapping_shl(self.expr_additive(live)? as u32);
            } else if self.eat(TokenKind::RightShift) {
                left = left.wrapping_shr(self.expr_additive(live)? as u32);
            } else {
                return Some(left);
            }
        }
    }

    fn expr_additive(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_multiplicative(live)?;
        loop {
            if self.eat(TokenKind::Plus) {
                left = left.wrapping_add(self.expr_multiplicative(live)?);
            } else if self.eat(TokenKind::Minus) {
                left = left.wrapping_sub(self.expr_multiplicative(live)?);
            } else {
                return Some(left);
            }
        }
    }

    fn expr_multiplicative(&mut self, live: bool) -> Option<i32> {
        let mut left = self.expr_unary(live)?;
        loop {
            let op = match self.peek_kind() {
                Some(k @ (TokenKind::Star | TokenKind::Slash | TokenKind::Percent)) => k,
                _ => return Some(left),
            };
            let op_location = self
                .tokens
                .get(self.pos)
                .map(|t| t.location)
                .unwrap_or(self.location);
            self.pos += 1;
            let right = self.expr_unary(live)?;
            left = match op {
                TokenKind::Star => left.wrapping_mul(right),
                TokenKind::Slash => {
                    if right == 0 {
                        self.report_if_live(live, DiagnosticKind::DivisionByZero, op_location);
                        0
                    } else {
                        left.wrapping_div(right)
                    }
                }
                _ => {
                    if right == 0 {
                        self.report_if_live(live, DiagnosticKind::DivisionByZero, op_location);
                        0
                    } else {
                        left.wrapping_rem(right)
                    }
                }
            };
        }
    }

    fn expr_unary(&mut self, live: bool) -> Option<i32> {
        if self.eat(TokenKind::Bang) {
            return Some(i32::from(self.expr_unary(live)? == 0));
        }
        if self.eat(TokenKind::Tilde) {
            return Some(!self.expr_unary(live)?);
        }
        if self.eat(TokenKind::Minus) {
            return Some(self.expr_unary(live)?.wrapping_neg());
        }
        if self.eat(TokenKind::Plus) {
            return self.expr_unary(live);
        }
        self.expr_primary(live)
    }

    fn expr_primary(&mut self, live: bool) -> Option<i32> {
        match self.peek_kind() {
            Some(TokenKind::ConstInt) => {
                let token = self.advance()?;
                let location = token.location;
                let (value, overflow) = parse_integer(token.text());
                if overflow {
                    self.report_if_live(live, DiagnosticKind::IntegerOverflow, location);
                }
                Some(value)
            }
            Some(TokenKind::LeftParen) => {
                self.pos += 1;
                let value = self.expr_or(live)?;
                if !self.eat(TokenKind::RightParen) {
                    return self.syntax_error();
                }
                Some(value)
            }
            Some(TokenKind::Identifier) => {
                if self.allow_defined && self.tokens[self.pos].text == "defined" {
                    self.pos += 1;
                    return self.eval_defined();
                }
                // A bare identifier is not silently zero here.
                self.syntax_error()
            }
            _ => self.syntax_error(),
        }
    }

    /// `defined IDENT` or `defined ( IDENT )`.
    fn eval_defined(&mut self) -> Option<i32> {
        let parenthesized = self.eat(TokenKind::LeftParen);
        let name = match self.peek_kind() {
            Some(TokenKind::Identifier) => {
                let t = self.advance()?;
                t.text.clone()
            }
            _ => return self.syntax_error(),
        };
        if parenthesized && !self.eat(TokenKind::RightParen) {
            return self.syntax_error();
        }
        Some(i32::from(self.macros.is_defined(&name)))
    }
}

/// Parse a decimal, octal or hex literal into a 32-bit value. The
/// second element flags a magnitude beyond the unsigned 32-bit range;
/// the value is truncated modulo 2^32 in that case.
pub(crate) fn parse_integer(text: &str) -> (i32, bool) {
    let bytes = text.as_bytes();
    let (digits, radix) = if bytes.starts_with(b"0x") || bytes.starts_with(b"0X") {
        (&bytes[2..], 16u64)
    } else if bytes.first() == Some(&b'0') {
        (bytes, 8u64)
    } else {
        (bytes, 10u64)
    };
    let mut acc: u64 = 0;
    let mut overflow = false;
    for &b in digits {
        let digit = (b as char).to_digit(radix as u32).unwrap_or(0) as u64;
        acc = acc * radix + digit;
        if acc > u64::from(u32::MAX) {
            overflow = true;
            acc &= 0xFFFF_FFFF;
        }
    }
    (acc as u32 as i32, overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Diagnostic;
    use crate::lexer::Lexer;

    fn eval(table: &MacroTable, input: &str) -> (Option<i32>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let inputs = [input];
        let mut lexer = Lexer::new(&inputs, 256);
        let mut tokens = Vec::new();
        loop {
            let t = lexer.next_token(&mut diags);
            if t.kind == TokenKind::Last {
                break;
            }
            tokens.push(t);
        }
        let location = SourceLocation::new(0, 1);
        let mut ev = ExprEvaluator::new(
            &tokens,
            location,
            table,
            &mut diags,
            true,
            DiagnosticKind::ConditionalUnexpectedToken,
        );
        let value = ev.evaluate();
        if value.is_some() && !ev.finished() {
            (None, diags)
        } else {
            (value, diags)
        }
    }

    fn value(input: &str) -> i32 {
        let table = MacroTable::new();
        let (v, diags) = eval(&table, input);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        v.unwrap()
    }

    #[test]
    fn precedence_and_arithmetic() {
        assert_eq!(value("1 + 2 * 3"), 7);
        assert_eq!(value("(1 + 2) * 3"), 9);
        assert_eq!(value("7 / 2"), 3);
        assert_eq!(value("7 % 3"), 1);
        assert_eq!(value("1 << 4"), 16);
        assert_eq!(value("256 >> 4"), 16);
        assert_eq!(value("1 | 6 & 3"), 3);
        assert_eq!(value("5 ^ 3"), 6);
        assert_eq!(value("3 > 2 == 1"), 1);
        assert_eq!(value("-2 + +3"), 1);
        assert_eq!(value("!0"), 1);
        assert_eq!(value("~0"), -1);
    }

    #[test]
    fn radix_parsing() {
        assert_eq!(value("0x10"), 16);
        assert_eq!(value("010"), 8);
        assert_eq!(value("0"), 0);
    }

    #[test]
    fn logical_results_are_boolean() {
        assert_eq!(value("2 && 3"), 1);
        assert_eq!(value("0 || 5"), 1);
        assert_eq!(value("0 && 5"), 0);
    }

    #[test]
    fn short_circuit_suppresses_division_by_zero() {
        let table = MacroTable::new();
        let (v, diags) = eval(&table, "1 || (2 / 0)");
        assert_eq!(v, Some(1));
        assert!(diags.is_empty());
        let (v, diags) = eval(&table, "0 && (2 / 0)");
        assert_eq!(v, Some(0));
        assert!(diags.is_empty());
    }

    #[test]
    fn live_division_by_zero_reported() {
        let table = MacroTable::new();
        let (v, diags) = eval(&table, "2 / 0");
        assert_eq!(v, Some(0));
        assert_eq!(diags[0].kind, DiagnosticKind::DivisionByZero);
    }

    #[test]
    fn literal_overflow() {
        let table = MacroTable::new();
        let (v, diags) = eval(&table, "0x1FFFFFFFF");
        assert_eq!(diags[0].kind, DiagnosticKind::IntegerOverflow);
        assert_eq!(v, Some(-1));
        // 2^31 wraps into the sign bit without overflowing u32.
        let (v, diags) = eval(&table, "2147483648");
        assert!(diags.is_empty());
        assert_eq!(v, Some(i32::MIN));
    }

    #[test]
    fn defined_operator() {
        let mut table = MacroTable::new();
        let mut diags = Vec::new();
        table.define(
            crate::macros::Macro::object("FOO", vec![]),
            SourceLocation::new(0, 1),
            &mut diags,
        );
        let (v, diags) = eval(&table, "defined FOO && defined(FOO)");
        assert!(diags.is_empty());
        assert_eq!(v, Some(1));
        let (v, _) = eval(&table, "defined(BAR)");
        assert_eq!(v, Some(0));
        let (v, _) = eval(&table, "defined(GL_ES)");
        assert_eq!(v, Some(1));
    }

    #[test]
    fn bare_identifier_is_error() {
        let table = MacroTable::new();
        let (v, diags) = eval(&table, "FOO + 1");
        assert_eq!(v, None);
        assert_eq!(diags[0].kind, DiagnosticKind::ConditionalUnexpectedToken);
        assert_eq!(diags[0].text, "FOO");
    }

    #[test]
    fn malformed_expressions() {
        let table = MacroTable::new();
        assert_eq!(eval(&table, "1 +").0, None);
        assert_eq!(eval(&table, "(1").0, None);
        assert_eq!(eval(&table, "1.5").0, None);
        assert_eq!(eval(&table, "1 2").0, None);
    }

    #[test]
    fn division_wrapping_edge() {
        assert_eq!(value("(-2147483647 - 1) / -1"), i32::MIN);
    }
}
