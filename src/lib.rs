//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// glsl-pp - GLSL ES shader preprocessor
//
// A pull-based preprocessor for OpenGL ES shading language sources:
// macro definition and expansion, conditional inclusion, #line
// remapping, and routing of #pragma/#extension/#version/#error to a
// caller-supplied handler. Create a `Preprocessor` over the input
// buffers and drain it with `lex()`.
//

pub mod diag;
mod expand;
mod expr;
pub mod lexer;
pub mod macros;
pub mod preprocess;
pub mod token;

pub use diag::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity, SourceLocation};
pub use preprocess::{DirectiveHandler, NullHandler, Options, Preprocessor};
pub use token::{tokens_to_text, Token, TokenKind};
