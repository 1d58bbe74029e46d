//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Scanner producing raw preprocessing tokens from the input buffers
//

use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, SourceLocation};
use crate::token::{Token, TokenKind};

/// Raw token scanner over an ordered list of input buffers.
///
/// Each buffer starts a fresh raw line counter and source index.
/// Locations produced here are raw; `#line` remapping is applied by the
/// directive layer. After the last buffer is exhausted `next_token`
/// returns `Last` forever.
pub struct Lexer<'a> {
    inputs: Vec<&'a [u8]>,
    src: usize,
    offset: usize,
    line: u32,
    at_line_start: bool,
    has_space: bool,
    max_token_size: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(inputs: &[&'a str], max_token_size: usize) -> Self {
        Lexer {
            inputs: inputs.iter().map(|s| s.as_bytes()).collect(),
            src: 0,
            offset: 0,
            line: 1,
            at_line_start: true,
            has_space: false,
            max_token_size,
        }
    }

    /// Raw line number the scanner is currently positioned on.
    pub fn raw_line(&self) -> u32 {
        self.line
    }

    pub fn raw_source(&self) -> u32 {
        self.src.min(self.inputs.len().saturating_sub(1)) as u32
    }

    fn peek(&self) -> Option<u8> {
        self.inputs.get(self.src)?.get(self.offset).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.inputs.get(self.src)?.get(self.offset + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.offset += 1;
        Some(c)
    }

    /// Consume a newline sequence (\n, \r or \r\n) if one is next.
    fn eat_newline(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.offset += 1;
            }
            Some(b'\r') => {
                self.offset += 1;
                if self.peek() == Some(b'\n') {
                    self.offset += 1;
                }
            }
            _ => return false,
        }
        self.line += 1;
        self.at_line_start = true;
        true
    }

    fn here(&self) -> SourceLocation {
        SourceLocation::new(self.raw_source(), self.line)
    }

    /// Step into the next input buffer. Returns false when none remain.
    fn advance_buffer(&mut self) -> bool {
        if self.src + 1 < self.inputs.len() {
            self.src += 1;
            self.offset = 0;
            self.line = 1;
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments, advancing buffers as they drain.
    /// Returns false once every buffer is exhausted.
    fn skip_blank(&mut self, diag: &mut dyn DiagnosticSink) -> bool {
        loop {
            let Some(c) = self.peek() else {
                if self.advance_buffer() {
                    self.at_line_start = true;
                    self.has_space = false;
                    continue;
                }
                return false;
            };
            match c {
                b' ' | b'\t' | b'\x0b' | b'\x0c' => {
                    self.offset += 1;
                    self.has_space = true;
                }
                b'\n' | b'\r' => {
                    self.eat_newline();
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' || c == b'\r' {
                            break;
                        }
                        self.offset += 1;
                    }
                    self.has_space = true;
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment(diag);
                }
                _ => return true,
            }
        }
    }

    fn skip_block_comment(&mut self, diag: &mut dyn DiagnosticSink) {
        let start = self.here();
        let start_src = self.src;
        let start_line = self.line;
        self.offset += 2;
        // Byte-wise scan so the closing "*/" may straddle a buffer seam.
        let mut prev_star = false;
        loop {
            match self.peek() {
                None => {
                    // The buffers form one logical stream; the comment
                    // keeps going in the next one.
                    if self.advance_buffer() {
                        continue;
                    }
                    diag.report(Diagnostic {
                        kind: DiagnosticKind::UnterminatedComment,
                        location: start,
                        text: String::new(),
                    });
                    break;
                }
                Some(b'/') if prev_star => {
                    self.offset += 1;
                    break;
                }
                Some(b'\n') | Some(b'\r') => {
                    self.eat_newline();
                    prev_star = false;
                }
                Some(c) => {
                    self.offset += 1;
                    prev_star = c == b'*';
                }
            }
        }
        // The whole comment reads as a single space; newlines inside it
        // advance the line counter but do not open a new logical line.
        if self.src != start_src || self.line != start_line {
            self.at_line_start = false;
        }
        self.has_space = true;
    }

    fn make(&mut self, kind: TokenKind, text: String, location: SourceLocation) -> Token {
        let mut token = Token::new(kind, text, location);
        token.at_line_start = self.at_line_start;
        token.has_leading_space = self.has_space;
        self.at_line_start = false;
        self.has_space = false;
        token
    }

    pub fn next_token(&mut self, diag: &mut dyn DiagnosticSink) -> Token {
        if !self.skip_blank(diag) {
            return Token::last(self.here());
        }
        let location = self.here();
        let c = self.peek().unwrap_or(0);
        if c == b'_' || c.is_ascii_alphabetic() {
            let text = self.lexeme(location, diag, |c, _| {
                c == b'_' || c.is_ascii_alphanumeric()
            });
            return self.make(TokenKind::Identifier, text, location);
        }
        if c.is_ascii_digit() || (c == b'.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
        {
            // Greedy preprocessing number, classified afterwards.
            let text = self.lexeme(location, diag, |c, prev| {
                c == b'.'
                    || c == b'_'
                    || c.is_ascii_alphanumeric()
                    || ((c == b'+' || c == b'-') && matches!(prev, b'e' | b'E'))
            });
            let kind = classify_number(&text);
            return self.make(kind, text, location);
        }
        if c == b'#' {
            self.offset += 1;
            return self.make(TokenKind::PpHash, String::new(), location);
        }
        if let Some((kind, len)) = self.match_operator() {
            self.offset += len;
            return self.make(kind, String::new(), location);
        }
        self.offset += 1;
        // Keep UTF-8 continuation bytes with their leading byte so the
        // diagnostic names the character that was typed.
        let mut bytes = vec![c];
        while let Some(b) = self.peek() {
            if b & 0xC0 != 0x80 {
                break;
            }
            self.offset += 1;
            bytes.push(b);
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();
        self.make(TokenKind::PpOther, text, location)
    }

    /// Collect a lexeme whose continuation bytes satisfy `cont`,
    /// enforcing the configured maximum token length.
    fn lexeme(
        &mut self,
        location: SourceLocation,
        diag: &mut dyn DiagnosticSink,
        cont: impl Fn(u8, u8) -> bool,
    ) -> String {
        let mut text = String::new();
        let mut prev = 0u8;
        let mut truncated = false;
        while let Some(c) = self.peek() {
            if !text.is_empty() && !cont(c, prev) {
                break;
            }
            self.offset += 1;
            if text.len() < self.max_token_size {
                text.push(c as char);
            } else {
                truncated = true;
            }
            prev = c;
        }
        if truncated {
            diag.report(Diagnostic {
                kind: DiagnosticKind::TokenTooLong,
                location,
                text: text.clone(),
            });
        }
        text
    }

    fn match_operator(&self) -> Option<(TokenKind, usize)> {
        use TokenKind::*;
        let c0 = self.peek()?;
        let c1 = self.peek_at(1);
        let c2 = self.peek_at(2);
        // Longest match first.
        let three = match (c0, c1, c2) {
            (b'<', Some(b'<'), Some(b'=')) => Some(LeftShiftAssign),
            (b'>', Some(b'>'), Some(b'=')) => Some(RightShiftAssign),
            _ => None,
        };
        if let Some(kind) = three {
            return Some((kind, 3));
        }
        let two = match (c0, c1) {
            (b'=', Some(b'=')) => Some(EqualEqual),
            (b'!', Some(b'=')) => Some(BangEqual),
            (b'<', Some(b'=')) => Some(LessEqual),
            (b'>', Some(b'=')) => Some(GreaterEqual),
            (b'<', Some(b'<')) => Some(LeftShift),
            (b'>', Some(b'>')) => Some(RightShift),
            (b'&', Some(b'&')) => Some(AmpAmp),
            (b'|', Some(b'|')) => Some(PipePipe),
            (b'^', Some(b'^')) => Some(CaretCaret),
            (b'+', Some(b'+')) => Some(Increment),
            (b'-', Some(b'-')) => Some(Decrement),
            (b'+', Some(b'=')) => Some(PlusAssign),
            (b'-', Some(b'=')) => Some(MinusAssign),
            (b'*', Some(b'=')) => Some(StarAssign),
            (b'/', Some(b'=')) => Some(SlashAssign),
            (b'%', Some(b'=')) => Some(PercentAssign),
            (b'&', Some(b'=')) => Some(AmpAssign),
            (b'|', Some(b'=')) => Some(PipeAssign),
            (b'^', Some(b'=')) => Some(CaretAssign),
            _ => None,
        };
        if let Some(kind) = two {
            return Some((kind, 2));
        }
        let one = match c0 {
            b'(' => LeftParen,
            b')' => RightParen,
            b'[' => LeftBracket,
            b']' => RightBracket,
            b'{' => LeftBrace,
            b'}' => RightBrace,
            b'.' => Dot,
            b',' => Comma,
            b':' => Colon,
            b';' => Semicolon,
            b'?' => Question,
            b'!' => Bang,
            b'~' => Tilde,
            b'+' => Plus,
            b'-' => Minus,
            b'*' => Star,
            b'/' => Slash,
            b'%' => Percent,
            b'<' => Less,
            b'>' => Greater,
            b'=' => Assign,
            b'&' => Amp,
            b'|' => Pipe,
            b'^' => Caret,
            _ => return None,
        };
        Some((one, 1))
    }
}

/// Decide whether a greedily scanned preprocessing number is a valid
/// integer or float literal. Anything else stays `PpNumber` and is
/// reported at the top level.
fn classify_number(text: &str) -> TokenKind {
    let b = text.as_bytes();
    if is_integer(b) {
        TokenKind::ConstInt
    } else if is_float(b) {
        TokenKind::ConstFloat
    } else {
        TokenKind::PpNumber
    }
}

fn is_integer(b: &[u8]) -> bool {
    if b.starts_with(b"0x") || b.starts_with(b"0X") {
        return b.len() > 2 && b[2..].iter().all(u8::is_ascii_hexdigit);
    }
    if b.first() == Some(&b'0') {
        return b.iter().all(|c| (b'0'..=b'7').contains(c));
    }
    !b.is_empty() && b.iter().all(u8::is_ascii_digit)
}

fn is_float(b: &[u8]) -> bool {
    let mut i = 0;
    let mut int_digits = 0;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
        int_digits += 1;
    }
    let mut frac_digits = 0;
    let has_dot = i < b.len() && b[i] == b'.';
    if has_dot {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            frac_digits += 1;
        }
    }
    let has_exp = i < b.len() && (b[i] == b'e' || b[i] == b'E');
    if has_exp {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let mut exp_digits = 0;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
            exp_digits += 1;
        }
        if exp_digits == 0 {
            return false;
        }
    }
    i == b.len() && (has_dot || has_exp) && int_digits + frac_digits > 0
}
