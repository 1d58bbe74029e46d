//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Source locations, #line remapping and diagnostics
//

use std::fmt;

/// Logical position of a token: index of the originating input buffer
/// (or the value set by `#line`) and a 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub source_index: u32,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(source_index: u32, line: u32) -> Self {
        SourceLocation { source_index, line }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_index, self.line)
    }
}

/// Maps raw scanner positions to logical positions.
///
/// A `#line` directive installs an override: a line bias added to the
/// raw line number and optionally a replacement source index. The
/// override is keyed to the raw buffer it was issued in; crossing into
/// the next input buffer drops it.
#[derive(Debug, Default)]
pub struct LocationTracker {
    over: Option<LineOverride>,
}

#[derive(Debug)]
struct LineOverride {
    raw_source: u32,
    source_index: Option<u32>,
    line_bias: i64,
}

impl LocationTracker {
    pub fn new() -> Self {
        LocationTracker { over: None }
    }

    /// Install an override so that the raw line `next_raw_line` reports
    /// as logical line `line`, with an optional source index override.
    pub fn set_line(
        &mut self,
        raw_source: u32,
        next_raw_line: u32,
        line: u32,
        source_index: Option<u32>,
    ) {
        self.over = Some(LineOverride {
            raw_source,
            source_index,
            line_bias: i64::from(line) - i64::from(next_raw_line),
        });
    }

    /// Translate a raw position into the logical one.
    pub fn map(&self, raw: SourceLocation) -> SourceLocation {
        match &self.over {
            Some(over) if over.raw_source == raw.source_index => SourceLocation {
                source_index: over.source_index.unwrap_or(raw.source_index),
                line: (i64::from(raw.line) + over.line_bias).max(0) as u32,
            },
            _ => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Everything the preprocessor can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("invalid character")]
    InvalidCharacter,
    #[error("invalid number")]
    InvalidNumber,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("token too long")]
    TokenTooLong,

    #[error("macro name is reserved")]
    MacroNameReserved,
    #[error("macro redefined with a different body")]
    MacroRedefined,
    #[error("redefinition of a predefined macro")]
    MacroPredefinedRedefined,
    #[error("undefinition of a predefined macro")]
    MacroPredefinedUndefined,
    #[error("unterminated macro invocation")]
    MacroUnterminatedInvocation,
    #[error("too few arguments for macro")]
    MacroTooFewArgs,
    #[error("too many arguments for macro")]
    MacroTooManyArgs,

    #[error("invalid directive name")]
    DirectiveInvalidName,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("invalid #line directive")]
    InvalidLineDirective,
    #[error("invalid line number in #line")]
    InvalidLineNumber,
    #[error("invalid source index in #line")]
    InvalidFileNumber,
    #[error("unrecognized pragma")]
    UnrecognizedPragma,
    #[error("invalid extension name")]
    InvalidExtensionName,
    #[error("invalid extension behavior")]
    InvalidExtensionBehavior,
    #[error("invalid #extension directive")]
    InvalidExtensionDirective,
    #[error("invalid version number")]
    InvalidVersionNumber,
    #[error("invalid #version directive")]
    InvalidVersionDirective,
    #[error("#version must be the first statement")]
    VersionNotFirstStatement,

    #[error("#elif without #if")]
    ConditionalElifWithoutIf,
    #[error("#elif after #else")]
    ConditionalElifAfterElse,
    #[error("#else without #if")]
    ConditionalElseWithoutIf,
    #[error("#else after #else")]
    ConditionalElseAfterElse,
    #[error("#endif without #if")]
    ConditionalEndifWithoutIf,
    #[error("unterminated conditional directive")]
    ConditionalUnterminated,
    #[error("unexpected token in conditional expression")]
    ConditionalUnexpectedToken,

    #[error("division by zero in constant expression")]
    DivisionByZero,
    #[error("integer literal overflow")]
    IntegerOverflow,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnrecognizedPragma => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One reported problem, with the offending lexeme (possibly empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: SourceLocation,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.kind.severity(), self.kind)?;
        if !self.text.is_empty() {
            write!(f, ": '{}'", self.text)?;
        }
        Ok(())
    }
}

/// Receiver for diagnostics. The preprocessor owns no global state;
/// the caller decides where reports go.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
