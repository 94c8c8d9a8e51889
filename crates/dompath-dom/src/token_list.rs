//! Token lists
//!
//! Space-separated attribute values (e.g. `class`) manipulated token by token.

/// Token list for space-separated attribute values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<String>,
}

impl TokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string
    pub fn from_string(s: &str) -> Self {
        let tokens = s.split_whitespace()
            .map(|s| s.to_string())
            .collect();
        Self { tokens }
    }

    /// Get number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append a token, duplicates included
    pub fn push(&mut self, token: &str) {
        if !token.is_empty() {
            self.tokens.push(token.to_string());
        }
    }

    /// Remove the first occurrence of a token; false if it was not present
    pub fn remove_first(&mut self, token: &str) -> bool {
        match self.tokens.iter().position(|t| t == token) {
            Some(pos) => {
                self.tokens.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for TokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
