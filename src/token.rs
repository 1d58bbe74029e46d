//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Token model for the GLSL ES preprocessor
//

use std::fmt;

use crate::diag::SourceLocation;

/// Preprocessing token kinds.
///
/// `PpHash`, `PpNumber` and `PpOther` are internal: `PpHash` is consumed
/// by the directive layer, the other two are turned into diagnostics by
/// the top-level loop. None of the three ever reaches the caller of
/// `Preprocessor::lex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    ConstInt,
    ConstFloat,

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Question,
    Bang,
    Tilde,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Less,
    Greater,
    Assign,
    Amp,
    Pipe,
    Caret,

    EqualEqual,
    BangEqual,
    LessEqual,
    GreaterEqual,
    LeftShift,
    RightShift,
    AmpAmp,
    PipePipe,
    CaretCaret,
    Increment,
    Decrement,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    LeftShiftAssign,
    RightShiftAssign,
    AmpAssign,
    PipeAssign,
    CaretAssign,

    PpHash,
    PpNumber,
    PpOther,

    Last,
}

impl TokenKind {
    /// Fixed spelling for operator and punctuator kinds. Kinds that carry
    /// their lexeme in `Token::text` (identifiers, numbers, pseudo-kinds)
    /// return the empty string here.
    pub fn spelling(self) -> &'static str {
        match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Question => "?",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Assign => "=",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::LessEqual => "<=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LeftShift => "<<",
            TokenKind::RightShift => ">>",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::CaretCaret => "^^",
            TokenKind::Increment => "++",
            TokenKind::Decrement => "--",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::PercentAssign => "%=",
            TokenKind::LeftShiftAssign => "<<=",
            TokenKind::RightShiftAssign => ">>=",
            TokenKind::AmpAssign => "&=",
            TokenKind::PipeAssign => "|=",
            TokenKind::CaretAssign => "^=",
            TokenKind::PpHash => "#",
            _ => "",
        }
    }
}

/// A single preprocessing token.
///
/// `text` holds the lexeme for identifier, number and pseudo kinds;
/// operators carry their spelling in the kind itself.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub location: SourceLocation,
    /// First token on its logical line.
    pub at_line_start: bool,
    /// Whitespace or a comment immediately preceded this token.
    pub has_leading_space: bool,
    /// This occurrence must never be considered for macro expansion
    /// again. Set when the token names a macro that is already being
    /// expanded; sticky across rescans.
    pub expansion_disabled: bool,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, location: SourceLocation) -> Self {
        Token {
            kind,
            text,
            location,
            at_line_start: false,
            has_leading_space: false,
            expansion_disabled: false,
        }
    }

    /// End-of-stream sentinel.
    pub fn last(location: SourceLocation) -> Self {
        Token::new(TokenKind::Last, String::new(), location)
    }

    /// The token's spelling as it would appear in source text.
    pub fn text(&self) -> &str {
        if self.text.is_empty() {
            self.kind.spelling()
        } else {
            &self.text
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// True for an identifier token spelled exactly `name`.
    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }
}

/// Render a token sequence back to text, inserting a single space
/// wherever the original had inter-token spacing.
pub fn tokens_to_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() && token.has_leading_space {
            out.push(' ');
        }
        out.push_str(token.text());
    }
    out
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
