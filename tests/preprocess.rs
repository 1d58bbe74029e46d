//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// End-to-end preprocessing scenarios through the public API
//

use similar_asserts::assert_eq;

use glsl_pp::{
    tokens_to_text, Diagnostic, DiagnosticKind, DirectiveHandler, NullHandler, Options,
    Preprocessor, SourceLocation, Token, TokenKind,
};

fn preprocess(sources: &[&str]) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut diags = Vec::new();
    let mut handler = NullHandler;
    let mut pp = Preprocessor::new(sources, Options::default(), &mut diags, &mut handler);
    let mut tokens = Vec::new();
    loop {
        let token = pp.lex();
        if token.kind == TokenKind::Last {
            break;
        }
        tokens.push(token);
    }
    drop(pp);
    (tokens, diags)
}

/// Rebuild the output as one line per logical source line.
fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if token.at_line_start && !out.is_empty() {
            out.push('\n');
        } else if token.has_leading_space && !out.is_empty() && !out.ends_with('\n') {
            out.push(' ');
        }
        out.push_str(token.text());
    }
    out
}

fn render_str(source: &str) -> String {
    let (tokens, diags) = preprocess(&[source]);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    render(&tokens)
}

#[test]
fn shader_with_macros_and_conditionals() {
    let src = "\
#version 100
#define SCALE 2.0
#define transform(p) ((p) * SCALE)
precision mediump float;
#ifdef HIGH_QUALITY
const int samples = 16;
#else
const int samples = 4;
#endif
void main() {
    gl_FragColor = transform(color);
}";
    assert_eq!(
        render_str(src),
        "\
precision mediump float;
const int samples = 4;
void main() {
gl_FragColor = ((color) * 2.0);
}"
    );
}

#[test]
fn redefinition_must_be_token_identical() {
    let (tokens, diags) = preprocess(&["#define N (1+2)\n#define N (1+2)\n#define N (1 + 3)\nN"]);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DiagnosticKind::MacroRedefined);
    assert_eq!(render(&tokens), "(1+2)");
}

#[test]
fn recursive_macros_emit_literal_names() {
    let src = "#define foo bar\n#define bar baz\n#define baz foo\nfoo bar baz";
    assert_eq!(render_str(src), "foo bar baz");
}

#[test]
fn function_macro_needs_parenthesis() {
    let src = "#define foo(x) ((x)+1)\nfoo(bar) foo";
    assert_eq!(render_str(src), "((bar)+1) foo");
}

#[test]
fn parameter_shadows_outer_macro() {
    let src = "#define x 0\n#define foo(x) x\nfoo(1) x";
    assert_eq!(render_str(src), "1 0");
}

#[test]
fn short_circuit_protects_division() {
    let src = "#if 1 || (2 / 0)\nyes\n#endif\n#if 0 && 1 / 0\nno\n#endif";
    assert_eq!(render_str(src), "yes");
}

#[test]
fn line_directive_rewrites_locations() {
    let (tokens, diags) = preprocess(&["#line 10 20\nfoo bar\nbaz"]);
    assert!(diags.is_empty());
    assert_eq!(tokens[0].location, SourceLocation::new(20, 10));
    assert_eq!(tokens[1].location, SourceLocation::new(20, 10));
    assert_eq!(tokens[2].location, SourceLocation::new(20, 11));
}

#[test]
fn block_comment_crosses_input_buffers() {
    let (tokens, diags) = preprocess(&["a /* one", "two */ b"]);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    assert_eq!(render(&tokens), "a b");
}

#[test]
fn multiple_buffers_share_macro_state() {
    let (tokens, diags) = preprocess(&["#define N 7\n", "N"]);
    assert!(diags.is_empty());
    assert_eq!(render(&tokens), "7");
    assert_eq!(tokens[0].location.source_index, 1);
}

#[test]
fn pragma_reaches_handler_intact() {
    #[derive(Default)]
    struct Pragmas(Vec<(String, String, bool)>);
    impl DirectiveHandler for Pragmas {
        fn handle_pragma(
            &mut self,
            _location: SourceLocation,
            name: &str,
            value: &str,
            stdgl: bool,
        ) {
            self.0.push((name.to_string(), value.to_string(), stdgl));
        }
    }
    let mut diags = Vec::new();
    let mut handler = Pragmas::default();
    let sources = ["#pragma foo(bar)\n"];
    let mut pp = Preprocessor::new(&sources, Options::default(), &mut diags, &mut handler);
    while pp.lex().kind != TokenKind::Last {}
    drop(pp);
    assert!(diags.is_empty());
    assert_eq!(handler.0, vec![("foo".to_string(), "bar".to_string(), false)]);
}

#[test]
fn error_directive_preserves_message() {
    #[derive(Default)]
    struct Errors(Vec<String>);
    impl DirectiveHandler for Errors {
        fn handle_error(&mut self, _location: SourceLocation, message: &str) {
            self.0.push(message.to_string());
        }
    }
    let mut diags = Vec::new();
    let mut handler = Errors::default();
    let sources = ["#error unsupported target\n"];
    let mut pp = Preprocessor::new(&sources, Options::default(), &mut diags, &mut handler);
    while pp.lex().kind != TokenKind::Last {}
    drop(pp);
    assert_eq!(handler.0, vec!["unsupported target".to_string()]);
}

#[test]
fn stream_stays_at_last() {
    let mut diags = Vec::new();
    let mut handler = NullHandler;
    let sources = ["a b c"];
    let mut pp = Preprocessor::new(&sources, Options::default(), &mut diags, &mut handler);
    for _ in 0..3 {
        assert_ne!(pp.lex().kind, TokenKind::Last);
    }
    for _ in 0..5 {
        assert_eq!(pp.lex().kind, TokenKind::Last);
    }
}

#[test]
fn version_gl_es_and_line_builtins() {
    let src = "__VERSION__ GL_ES __LINE__\n__LINE__";
    assert_eq!(render_str(src), "100 1 1\n2");
}

#[test]
fn tokens_to_text_respects_spacing() {
    let (tokens, _) = preprocess(&["a b(c)"]);
    assert_eq!(tokens_to_text(&tokens), "a b(c)");
}
