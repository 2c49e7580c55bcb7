// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Stack-based nesting of content lines into raw components.
//!
//! 1. On `BEGIN:X`, push a new component onto the stack
//! 2. On a property, append it to the component on top of the stack
//! 3. On `END:X`, pop the stack and append the component to its parent

use crate::keyword::{KW_BEGIN, KW_END};
use crate::parser::ParseError;
use crate::syntax::Span;
use crate::syntax::scanner::ContentLine;

/// A `BEGIN`/`END` delimited block with its properties in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponent {
    /// Component name as written after `BEGIN:`
    pub name: String,

    /// Property lines in source order
    pub properties: Vec<ContentLine>,

    /// Nested blocks in source order
    pub children: Vec<RawComponent>,

    /// Span from the `BEGIN` line to the `END` line
    pub span: Span,
}

/// Nest scanned content lines.
///
/// # Errors
///
/// - [`ParseError::UnbalancedComponent`] for a mismatched, missing or extra `END`
/// - [`ParseError::UnexpectedProperty`] for a property outside of any block
pub fn build_tree(lines: Vec<ContentLine>) -> Result<Vec<RawComponent>, ParseError> {
    let mut stack: Vec<RawComponent> = Vec::new();
    let mut roots = Vec::new();

    for line in lines {
        if line.name.eq_ignore_ascii_case(KW_BEGIN) {
            stack.push(RawComponent {
                name: line.value,
                properties: Vec::new(),
                children: Vec::new(),
                span: line.span,
            });
        } else if line.name.eq_ignore_ascii_case(KW_END) {
            let Some(mut component) = stack.pop() else {
                return Err(ParseError::UnbalancedComponent {
                    expected: None,
                    found: Some(line.value),
                    span: line.span,
                });
            };

            if !component.name.eq_ignore_ascii_case(&line.value) {
                return Err(ParseError::UnbalancedComponent {
                    expected: Some(component.name),
                    found: Some(line.value),
                    span: line.span,
                });
            }

            component.span = component.span.merge(line.span);
            match stack.last_mut() {
                Some(parent) => parent.children.push(component),
                None => roots.push(component),
            }
        } else if let Some(current) = stack.last_mut() {
            current.properties.push(line);
        } else {
            return Err(ParseError::UnexpectedProperty {
                name: line.name,
                span: line.span,
            });
        }
    }

    if let Some(component) = stack.pop() {
        return Err(ParseError::UnbalancedComponent {
            span: component.span,
            expected: Some(component.name),
            found: None,
        });
    }

    Ok(roots)
}
