//! Namespaced identifiers (`namespace:path`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier `{0}` has more than one `:`")]
    TooManySeparators(String),
    #[error("identifier `{id}` has an empty {part}")]
    EmptyPart { id: String, part: &'static str },
    #[error("invalid character `{ch}` in {part} of `{id}`")]
    InvalidChar {
        id: String,
        part: &'static str,
        ch: char,
    },
}

/// A `namespace:path` name as used for scenes, structures, blocks and items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    pub fn new(namespace: &str, path: &str) -> Result<Self, IdentError> {
        let id = format!("{namespace}:{path}");
        if namespace.is_empty() {
            return Err(IdentError::EmptyPart {
                id,
                part: "namespace",
            });
        }
        if path.is_empty() {
            return Err(IdentError::EmptyPart { id, part: "path" });
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentError::InvalidChar {
                id,
                part: "namespace",
                ch,
            });
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentError::InvalidChar {
                id,
                part: "path",
                ch,
            });
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Parse `s`, putting a bare name (no `:`) under `default_namespace`.
    pub fn parse_with_default(s: &str, default_namespace: &str) -> Result<Self, IdentError> {
        if s.contains(':') {
            s.parse()
        } else {
            Self::new(default_namespace, s)
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for ResourceLocation {
    type Err = IdentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdentError::Empty);
        }
        let mut parts = s.split(':');
        let (ns, path) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(path), None) => (ns, path),
            (Some(path), None, _) => ("minecraft", path),
            _ => return Err(IdentError::TooManySeparators(s.to_string())),
        };
        Self::new(ns, path)
    }
}

impl TryFrom<String> for ResourceLocation {
    type Error = IdentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceLocation> for String {
    fn from(value: ResourceLocation) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced() {
        let id: ResourceLocation = "create:funnel/intro".parse().unwrap();
        assert_eq!(id.namespace(), "create");
        assert_eq!(id.path(), "funnel/intro");
        assert_eq!(id.to_string(), "create:funnel/intro");
    }

    #[test]
    fn test_bare_name_uses_default_namespace() {
        let id = ResourceLocation::parse_with_default("gearbox", "kubejs").unwrap();
        assert_eq!(id.to_string(), "kubejs:gearbox");
    }

    #[test]
    fn test_rejects_malformed() {
        let test_cases = vec![
            ("", IdentError::Empty),
            (
                "a:b:c",
                IdentError::TooManySeparators("a:b:c".into()),
            ),
            (
                ":x",
                IdentError::EmptyPart {
                    id: ":x".into(),
                    part: "namespace",
                },
            ),
            (
                "Create:x",
                IdentError::InvalidChar {
                    id: "Create:x".into(),
                    part: "namespace",
                    ch: 'C',
                },
            ),
        ];

        for (input, expected) in test_cases {
            assert_eq!(input.parse::<ResourceLocation>(), Err(expected), "{input}");
        }
    }
}
