// SPDX-License-Identifier: MIT OR Apache-2.0
//! Section registry.

use crate::section::Section;
use indexmap::IndexMap;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The empty ID is reserved for "no predecessor"
    #[error("Section ID must not be empty")]
    EmptySectionId,
}

/// Sections keyed by ID, in registration order
#[derive(Debug, Clone, Default)]
pub struct SectionRegistry {
    sections: IndexMap<String, Section>,
}

impl SectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section, replacing any section with the same ID.
    ///
    /// Returns the replaced section.
    pub fn register(&mut self, section: Section) -> Result<Option<Section>, RegistryError> {
        if section.id.is_empty() {
            return Err(RegistryError::EmptySectionId);
        }

        let replaced = self.sections.insert(section.id.clone(), section);
        if let Some(old) = &replaced {
            tracing::debug!("Section '{}' registered twice, keeping the latest", old.id);
        }
        Ok(replaced)
    }

    /// Build a registry from sections, later duplicates replacing earlier ones
    pub fn from_sections<I>(sections: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Section>,
    {
        let mut registry = Self::new();
        for section in sections {
            registry.register(section)?;
        }
        Ok(registry)
    }

    /// Look up a section
    pub fn lookup(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    /// Whether a section is registered
    pub fn contains(&self, id: &str) -> bool {
        self.sections.contains_key(id)
    }

    /// All sections in registration order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// All section IDs in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::ClipDescriptor;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SectionRegistry::new();
        registry
            .register(Section::new("pending", ClipDescriptor::new(["p"])))
            .unwrap();

        assert!(registry.contains("pending"));
        assert_eq!(registry.lookup("pending").unwrap().id, "pending");
        assert!(registry.lookup("loading").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = SectionRegistry::new();
        registry
            .register(Section::new("a", ClipDescriptor::new(["first"])))
            .unwrap();
        let replaced = registry
            .register(Section::new("a", ClipDescriptor::new(["second"])))
            .unwrap();

        assert_eq!(replaced.unwrap().primary.frames[0].as_str(), "first");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("a").unwrap().primary.frames[0].as_str(), "second");
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut registry = SectionRegistry::new();
        let result = registry.register(Section::new("", ClipDescriptor::new(["x"])));
        assert_eq!(result, Err(RegistryError::EmptySectionId));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_sections_preserves_order() {
        let registry = SectionRegistry::from_sections(
            ["c", "a", "b"]
                .into_iter()
                .map(|id| Section::new(id, ClipDescriptor::new([id]))),
        );
        let ids: Vec<_> = registry.unwrap().ids().map(str::to_string).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
