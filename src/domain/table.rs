//! Game table
//!
//! The game runs across two physical tables; every session and every log
//! entry belongs to exactly one of them.

use serde::{Deserialize, Serialize};

/// Which table a moderator is seated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Island,
    Britain,
}

impl Table {
    /// Database code for this table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Island => "island",
            Table::Britain => "britain",
        }
    }

    /// Parse a database code.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "island" => Some(Table::Island),
            "britain" => Some(Table::Britain),
            _ => None,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_roundtrip() {
        assert_eq!(Table::parse("island"), Some(Table::Island));
        assert_eq!(Table::parse("britain"), Some(Table::Britain));
        assert_eq!(Table::parse("atlantis"), None);
        assert_eq!(Table::Island.as_str(), "island");
        assert_eq!(Table::Britain.to_string(), "britain");
    }
}
