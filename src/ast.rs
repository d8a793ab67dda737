//! A generic syntax tree for grammars that do not need typed output.

use std::fmt;

use serde::Serialize;

/// A named tree node with an optional text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, "", Vec::new())
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, value, Vec::new())
    }

    pub fn branch(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(name, "", children)
    }

    pub fn new(name: impl Into<String>, value: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            children,
        }
    }

    /// First child called `name`.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{}", "  ".repeat(depth), self.name)?;
        if !self.value.is_empty() {
            write!(f, ": {}", self.value)?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    /// One node per line, `name: value`, indented two spaces per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
