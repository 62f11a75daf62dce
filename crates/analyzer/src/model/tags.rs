use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const MISSING_TAG: &str = "missing";
pub const INTERNAL_TAG: &str = "internal";

/// A tag users can attach. The `missing` marker is not one of them: it is
/// owned by the placeholder factory and only readable here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Part of the analyzed application rather than a library or the platform.
    Internal,
    Custom(String),
}

impl Tag {
    pub fn as_str(&self) -> &str {
        match self {
            Tag::Internal => INTERNAL_TAG,
            Tag::Custom(name) => name,
        }
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        match value {
            INTERNAL_TAG => Tag::Internal,
            other => Tag::Custom(other.to_string()),
        }
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::from(value.as_str())
    }
}

impl From<&Tag> for Tag {
    fn from(value: &Tag) -> Self {
        value.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    missing: bool,
    pub internal: bool,
    pub custom: BTreeSet<String>,
}

impl Tags {
    /// Set for placeholders only, see [`crate::resolution::missing`].
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    pub(crate) fn set_missing(&mut self, missing: bool) {
        self.missing = missing;
    }

    pub fn add(&mut self, tag: impl Into<Tag>) {
        match tag.into() {
            Tag::Internal => self.internal = true,
            Tag::Custom(name) => {
                self.custom.insert(name);
            }
        }
    }

    pub fn remove(&mut self, tag: impl Into<Tag>) {
        match tag.into() {
            Tag::Internal => self.internal = false,
            Tag::Custom(name) => {
                self.custom.remove(&name);
            }
        }
    }

    pub fn contains(&self, tag: impl Into<Tag>) -> bool {
        match tag.into() {
            Tag::Internal => self.internal,
            Tag::Custom(name) => self.custom.contains(&name),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if self.missing {
            names.push(MISSING_TAG);
        }
        if self.internal {
            names.push(INTERNAL_TAG);
        }
        names.extend(
            self.custom
                .iter()
                .map(String::as_str)
                .filter(|name| *name != MISSING_TAG || !self.missing),
        );
        names
    }
}

/// Named group of user tags, kept for reporting layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCategory {
    pub name: String,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_names_map_to_internal_or_custom() {
        let mut tags = Tags::default();
        tags.add(Tag::Internal);
        tags.add("entrypoint");

        assert!(tags.internal);
        assert!(tags.contains("entrypoint"));
        assert_eq!(tags.names(), vec!["internal", "entrypoint"]);

        tags.remove("internal");
        assert!(!tags.contains(Tag::Internal));
    }

    #[test]
    fn test_missing_name_never_marks_a_placeholder() {
        let mut tags = Tags::default();
        tags.add("missing");

        assert!(!tags.is_missing());
        assert_eq!(Tag::from("missing"), Tag::Custom("missing".to_string()));
        assert!(tags.contains("missing"));

        tags.set_missing(true);
        assert_eq!(tags.names(), vec!["missing"]);
    }
}
