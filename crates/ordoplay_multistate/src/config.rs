// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation configuration documents.
//!
//! A document maps section IDs to their frames and optional transitions:
//!
//! ```json
//! {
//!     "loading": { "oneshot": false, "frames": ["loading_001", "loading_002"] },
//!     "finished": {
//!         "frames": ["finished_000"],
//!         "transitions_from": {
//!             "loading": { "frame_duration": 40, "frames": ["end_001", "end_002"] },
//!             "": { "frames": ["intro_001"] }
//!         }
//!     }
//! }
//! ```
//!
//! JSON is the primary format. RON documents with the same shape are also
//! accepted, picked by the `.ron` file extension.

use crate::clip::{ClipDescriptor, FrameRef, DEFAULT_FRAME_DURATION_MS, DEFAULT_ONE_SHOT};
use crate::registry::{RegistryError, SectionRegistry};
use crate::section::Section;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed RON
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// RON serialization failed
    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),

    /// Reading the document failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Document path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A clip lists no frames
    #[error("{} has no frames", clip_label(section, transition.as_deref()))]
    EmptyFrames {
        /// Section ID
        section: String,
        /// Predecessor key when the clip is a transition
        transition: Option<String>,
    },

    /// A clip has a zero frame duration
    #[error("{} has a zero frame duration", clip_label(section, transition.as_deref()))]
    ZeroFrameDuration {
        /// Section ID
        section: String,
        /// Predecessor key when the clip is a transition
        transition: Option<String>,
    },

    /// Section could not be registered
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn clip_label(section: &str, transition: Option<&str>) -> String {
    match transition {
        Some(from) => format!("Transition from {from:?} into section {section:?}"),
        None => format!("Section {section:?}"),
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_frame_duration() -> u32 {
    DEFAULT_FRAME_DURATION_MS
}

fn default_one_shot() -> bool {
    DEFAULT_ONE_SHOT
}

/// One section entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Play once instead of looping
    #[serde(rename = "oneshot", default = "default_one_shot")]
    pub one_shot: bool,
    /// Milliseconds per frame
    #[serde(default = "default_frame_duration")]
    pub frame_duration: u32,
    /// Frame references in order
    pub frames: Vec<FrameRef>,
    /// Transitions keyed by predecessor ID ("" for the idle state)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub transitions_from: IndexMap<String, TransitionConfig>,
}

/// One transition entry. Transitions always play once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Milliseconds per frame
    #[serde(default = "default_frame_duration")]
    pub frame_duration: u32,
    /// Frame references in order
    pub frames: Vec<FrameRef>,
}

/// A whole animation document, keyed by section ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationConfig {
    /// Sections in document order
    pub sections: IndexMap<String, SectionConfig>,
}

impl SectionConfig {
    /// Primary clip descriptor
    pub fn descriptor(&self) -> ClipDescriptor {
        ClipDescriptor {
            frames: self.frames.clone(),
            frame_duration_ms: self.frame_duration,
            one_shot: self.one_shot,
        }
    }
}

impl TransitionConfig {
    /// Transition clip descriptor, always one-shot
    pub fn descriptor(&self) -> ClipDescriptor {
        ClipDescriptor {
            frames: self.frames.clone(),
            frame_duration_ms: self.frame_duration,
            one_shot: true,
        }
    }
}

impl AnimationConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON document from a reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a RON document
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        Ok(ron::from_str(ron)?)
    }

    /// Load a document from disk, as RON for `.ron` files and JSON otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_ron = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ron"));
        let config = if is_ron {
            Self::from_ron_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        tracing::debug!("Loaded {} sections from {}", config.sections.len(), path.display());
        Ok(config)
    }

    /// Serialize as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize as pretty RON
    pub fn to_ron_pretty(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Check every clip has frames and a positive frame duration
    pub fn validate(&self) -> Result<()> {
        for (id, section) in &self.sections {
            if id.is_empty() {
                return Err(RegistryError::EmptySectionId.into());
            }
            check_clip(id, None, &section.frames, section.frame_duration)?;
            for (from, transition) in &section.transitions_from {
                check_clip(id, Some(from), &transition.frames, transition.frame_duration)?;
            }
        }
        Ok(())
    }

    /// Validate and build a section registry
    pub fn into_registry(self) -> Result<SectionRegistry> {
        self.validate()?;

        let mut registry = SectionRegistry::new();
        for (id, config) in self.sections {
            let mut section = Section::new(id, config.descriptor());
            for (from, transition) in &config.transitions_from {
                section.add_transition(from.clone(), transition.descriptor());
            }
            registry.register(section)?;
        }
        Ok(registry)
    }
}

pub(crate) fn check_clip(section: &str, transition: Option<&str>, frames: &[FrameRef], frame_duration: u32) -> Result<()> {
    if frames.is_empty() {
        return Err(ConfigError::EmptyFrames {
            section: section.to_string(),
            transition: transition.map(str::to_string),
        });
    }
    if frame_duration == 0 {
        return Err(ConfigError::ZeroFrameDuration {
            section: section.to_string(),
            transition: transition.map(str::to_string),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_STATE: &str = r#"{
        "pending": { "oneshot": true, "frames": ["pending_000"] },
        "loading": {
            "oneshot": false,
            "frame_duration": 33,
            "frames": ["loading_001", "loading_002", "loading_003"]
        },
        "finished": {
            "frames": ["finished_099"],
            "transitions_from": {
                "loading": {
                    "frame_duration": 40,
                    "frames": ["end_091", "end_092"]
                },
                "": { "frames": ["intro_001"] }
            }
        }
    }"#;

    #[test]
    fn test_parse_with_defaults() {
        let config = AnimationConfig::from_json_str(THREE_STATE).unwrap();
        let ids: Vec<_> = config.sections.keys().map(String::as_str).collect();
        assert_eq!(ids, ["pending", "loading", "finished"]);

        let finished = &config.sections["finished"];
        assert!(finished.one_shot);
        assert_eq!(finished.frame_duration, DEFAULT_FRAME_DURATION_MS);
        assert_eq!(finished.transitions_from["loading"].frame_duration, 40);
        assert_eq!(finished.transitions_from[""].frame_duration, DEFAULT_FRAME_DURATION_MS);

        assert!(!config.sections["loading"].one_shot);
    }

    #[test]
    fn test_into_registry() {
        let registry = AnimationConfig::from_json_str(THREE_STATE)
            .unwrap()
            .into_registry()
            .unwrap();
        assert_eq!(registry.len(), 3);

        let finished = registry.lookup("finished").unwrap();
        let transition = finished.transition("loading").unwrap();
        assert!(transition.one_shot);
        assert_eq!(transition.total_duration(), 80);
        assert!(finished.transition("").is_some());
        assert!(!registry.lookup("loading").unwrap().primary.one_shot);
    }

    #[test]
    fn test_missing_frames_is_parse_error() {
        let err = AnimationConfig::from_json_str(r#"{ "a": { "oneshot": true } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_validation() {
        let err = AnimationConfig::from_json_str(r#"{ "a": { "frames": [] } }"#)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert_eq!(err.to_string(), "Section \"a\" has no frames");

        let err = AnimationConfig::from_json_str(
            r#"{ "a": { "frames": ["x"], "transitions_from": { "b": { "frame_duration": 0, "frames": ["t"] } } } }"#,
        )
        .unwrap()
        .validate()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Transition from \"b\" into section \"a\" has a zero frame duration"
        );

        let err = AnimationConfig::from_json_str(r#"{ "": { "frames": ["x"] } }"#)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Registry(RegistryError::EmptySectionId)));
    }

    #[test]
    fn test_json_output_uses_document_keys() {
        let config = AnimationConfig::from_json_str(THREE_STATE).unwrap();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"oneshot\""));
        assert!(json.contains("\"transitions_from\""));
        assert_eq!(AnimationConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_ron_document() {
        let config = AnimationConfig::from_json_str(THREE_STATE).unwrap();
        let ron = config.to_ron_pretty().unwrap();
        let loaded = AnimationConfig::from_ron_str(&ron).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("multistate-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let json_path = dir.join("animation.json");
        std::fs::write(&json_path, THREE_STATE).unwrap();
        let config = AnimationConfig::load(&json_path).unwrap();
        assert_eq!(config.sections.len(), 3);

        let ron_path = dir.join("animation.ron");
        std::fs::write(&ron_path, config.to_ron_pretty().unwrap()).unwrap();
        assert_eq!(AnimationConfig::load(&ron_path).unwrap(), config);

        let err = AnimationConfig::load(dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
