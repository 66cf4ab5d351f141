//! Scripting variables contributed by a tag invocation
//!
//! A [`VariableDescriptor`] names one variable, its declared type, whether the
//! invocation introduces a fresh binding, and the [`VariableScope`] window over
//! which generated code may read it.
//!
//! Type names are never primitives: values reach generated code through
//! attribute storage that only holds reference types, so `java.lang.Integer`
//! rather than `int`. That constraint is checked by the emission stage, which
//! can see the target type system; here a type name only has to be non-empty.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScopeError;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_$][\p{L}\p{N}_$]*$").expect("Invalid regex pattern")
});

/// Keywords and literals of the generated code's language; none can name a local.
const RESERVED_WORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while", "_",
];

/// Visibility window of a scripting variable relative to the tag's start and end markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableScope {
    /// Between the start and end markers only.
    #[serde(alias = "nested")]
    Nested = 0,
    /// From the start marker to the end of the enclosing scope.
    #[serde(alias = "at_begin", alias = "at-begin")]
    AtBegin = 1,
    /// From the end marker to the end of the enclosing scope.
    #[serde(alias = "at_end", alias = "at-end")]
    AtEnd = 2,
}

impl VariableScope {
    pub const ALL: [VariableScope; 3] = [
        VariableScope::Nested,
        VariableScope::AtBegin,
        VariableScope::AtEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableScope::Nested => "NESTED",
            VariableScope::AtBegin => "AT_BEGIN",
            VariableScope::AtEnd => "AT_END",
        }
    }

    /// Protocol code: `NESTED = 0`, `AT_BEGIN = 1`, `AT_END = 2`.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn visible_in_body(&self) -> bool {
        matches!(self, VariableScope::Nested | VariableScope::AtBegin)
    }

    pub fn visible_after_end(&self) -> bool {
        matches!(self, VariableScope::AtBegin | VariableScope::AtEnd)
    }

    /// Whether two windows share any region of generated code.
    ///
    /// Only `NESTED` and `AT_END` are disjoint: one ends where the other starts.
    pub fn overlaps(&self, other: VariableScope) -> bool {
        (self.visible_in_body() && other.visible_in_body())
            || (self.visible_after_end() && other.visible_after_end())
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableScope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        match normalized.as_str() {
            "NESTED" => Ok(VariableScope::Nested),
            "AT_BEGIN" => Ok(VariableScope::AtBegin),
            "AT_END" => Ok(VariableScope::AtEnd),
            _ => Err(ScopeError::invalid(
                "",
                format!("unknown scope '{}', expected NESTED, AT_BEGIN or AT_END", s),
            )),
        }
    }
}

impl TryFrom<i32> for VariableScope {
    type Error = ScopeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(VariableScope::Nested),
            1 => Ok(VariableScope::AtBegin),
            2 => Ok(VariableScope::AtEnd),
            other => Err(ScopeError::invalid(
                "",
                format!("unknown scope code {}", other),
            )),
        }
    }
}

/// One scripting variable declared by one tag invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct VariableDescriptor {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    declare: bool,
    scope: VariableScope,
}

#[derive(Deserialize)]
struct RawDescriptor {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    declare: bool,
    scope: VariableScope,
}

impl TryFrom<RawDescriptor> for VariableDescriptor {
    type Error = ScopeError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        VariableDescriptor::new(raw.name, raw.type_name, raw.declare, raw.scope)
    }
}

impl VariableDescriptor {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        declare: bool,
        scope: VariableScope,
    ) -> Result<Self, ScopeError> {
        let name = name.into();
        let type_name = type_name.into();

        if name.is_empty() {
            return Err(ScopeError::invalid(name, "variable name is empty"));
        }
        if !is_identifier(&name) {
            return Err(ScopeError::invalid(name, "variable name is not an identifier"));
        }
        if is_reserved_word(&name) {
            return Err(ScopeError::invalid(name, "variable name is a reserved word"));
        }

        let type_name = type_name.trim();
        if type_name.is_empty() {
            return Err(ScopeError::invalid(name, "type name is empty"));
        }

        Ok(Self {
            type_name: type_name.to_string(),
            name,
            declare,
            scope,
        })
    }

    /// Builds a descriptor from a raw protocol scope code.
    pub fn from_code(
        name: impl Into<String>,
        type_name: impl Into<String>,
        declare: bool,
        scope_code: i32,
    ) -> Result<Self, ScopeError> {
        let name = name.into();
        let scope = VariableScope::try_from(scope_code).map_err(|err| match err {
            ScopeError::InvalidDescriptor { reason, .. } => ScopeError::invalid(name.clone(), reason),
            other => other,
        })?;
        Self::new(name, type_name, declare, scope)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// True when generated code needs a fresh declaration rather than an assignment
    /// to a binding made by an enclosing construct.
    pub fn is_new_declaration(&self) -> bool {
        self.declare
    }

    pub fn scope(&self) -> VariableScope {
        self.scope
    }

    /// Fully-qualified type names resolve without the page's imports.
    pub fn is_qualified_type(&self) -> bool {
        self.type_name.contains('.')
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}
