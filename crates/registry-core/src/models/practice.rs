//! Practice (tenant) models.

use serde::{Deserialize, Serialize};

/// A practice: one isolated partition of patient data.
///
/// Read-only from this crate's perspective apart from seeding; the source of
/// truth lives in the admin tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Practice {
    pub id: String,
    pub name: String,
}

impl Practice {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Display name, falling back to the id when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_id() {
        let named = Practice::new("p1", "Sunrise Family Practice");
        assert_eq!(named.display_name(), "Sunrise Family Practice");

        let unnamed = Practice::new("p2", "  ");
        assert_eq!(unnamed.display_name(), "p2");
    }
}
