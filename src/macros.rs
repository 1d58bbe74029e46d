//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Macro definitions and the definition table
//

use std::collections::HashMap;

use log::debug;

use crate::diag::{Diagnostic, DiagnosticKind, DiagnosticSink, SourceLocation};
use crate::token::{Token, TokenKind};

/// Macros whose replacement is computed at expansion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMacro {
    /// `__LINE__`: logical line of the invocation.
    Line,
    /// `__FILE__`: logical source index of the invocation.
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    Object,
    Function,
}

#[derive(Debug, Clone)]
pub struct Macro {
    pub name: String,
    pub kind: MacroKind,
    pub params: Vec<String>,
    pub replacement: Vec<Token>,
    pub predefined: bool,
    pub builtin: Option<BuiltinMacro>,
}

impl Macro {
    pub fn object(name: &str, replacement: Vec<Token>) -> Self {
        Macro {
            name: name.to_string(),
            kind: MacroKind::Object,
            params: Vec::new(),
            replacement,
            predefined: false,
            builtin: None,
        }
    }

    pub fn function(name: &str, params: Vec<String>, replacement: Vec<Token>) -> Self {
        Macro {
            name: name.to_string(),
            kind: MacroKind::Function,
            params,
            replacement,
            predefined: false,
            builtin: None,
        }
    }

    fn builtin(name: &str, builtin: BuiltinMacro) -> Self {
        Macro {
            name: name.to_string(),
            kind: MacroKind::Object,
            params: Vec::new(),
            replacement: Vec::new(),
            predefined: true,
            builtin: Some(builtin),
        }
    }

    fn predefined_int(name: &str, value: &str) -> Self {
        let token = Token::new(
            TokenKind::ConstInt,
            value.to_string(),
            SourceLocation::new(0, 0),
        );
        Macro {
            name: name.to_string(),
            kind: MacroKind::Object,
            params: Vec::new(),
            replacement: vec![token],
            predefined: true,
            builtin: None,
        }
    }

    /// Token-for-token equality as required for a benign redefinition:
    /// kind, parameter list and replacement sequence, comparing token
    /// kind and text only. Locations and spacing flags do not count.
    fn same_definition(&self, other: &Macro) -> bool {
        self.kind == other.kind
            && self.params == other.params
            && self.replacement.len() == other.replacement.len()
            && self
                .replacement
                .iter()
                .zip(other.replacement.iter())
                .all(|(a, b)| a.kind == b.kind && a.text() == b.text())
    }
}

/// A name the user is not allowed to define: `__` prefix or infix, or
/// the `GL_` namespace.
fn is_reserved_name(name: &str) -> bool {
    name.starts_with("GL_") || name.contains("__")
}

/// Definition table, seeded with the predefined macros.
pub struct MacroTable {
    map: HashMap<String, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        let mut map = HashMap::new();
        for mac in [
            Macro::builtin("__LINE__", BuiltinMacro::Line),
            Macro::builtin("__FILE__", BuiltinMacro::File),
            Macro::predefined_int("__VERSION__", "100"),
            Macro::predefined_int("GL_ES", "1"),
        ] {
            map.insert(mac.name.clone(), mac);
        }
        MacroTable { map }
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.map.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Install a definition, enforcing the reservation and redefinition
    /// rules. On rejection the table is left untouched.
    pub fn define(
        &mut self,
        mac: Macro,
        location: SourceLocation,
        diag: &mut dyn DiagnosticSink,
    ) {
        if let Some(existing) = self.map.get(&mac.name) {
            if existing.predefined {
                diag.report(Diagnostic {
                    kind: DiagnosticKind::MacroPredefinedRedefined,
                    location,
                    text: mac.name,
                });
                return;
            }
            if !existing.same_definition(&mac) {
                diag.report(Diagnostic {
                    kind: DiagnosticKind::MacroRedefined,
                    location,
                    text: mac.name,
                });
                return;
            }
            // Identical redefinition is benign.
            return;
        }
        if is_reserved_name(&mac.name) {
            diag.report(Diagnostic {
                kind: DiagnosticKind::MacroNameReserved,
                location,
                text: mac.name,
            });
            return;
        }
        debug!("define macro {}", mac.name);
        self.map.insert(mac.name.clone(), mac);
    }

    /// Remove a definition. Undefining an unknown name is silently
    /// accepted; undefining a predefined macro is rejected.
    pub fn undef(
        &mut self,
        name: &str,
        location: SourceLocation,
        diag: &mut dyn DiagnosticSink,
    ) {
        if let Some(existing) = self.map.get(name) {
            if existing.predefined {
                diag.report(Diagnostic {
                    kind: DiagnosticKind::MacroPredefinedUndefined,
                    location,
                    text: name.to_string(),
                });
                return;
            }
            debug!("undef macro {}", name);
            self.map.remove(name);
        }
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        MacroTable::new()
    }
}
