//! Artifact kinds and their document shapes.
//!
//! An artifact is a flat record of string fields. Each kind carries the
//! static facts the generic store, validator and pipeline need: its JSON
//! document key, its storage path segments and its field list.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifies one of the independently versioned artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKindId {
    /// The narrative foundation: genre, tone and thematic pillars.
    StoryRoot,
    /// The setting: physical laws, society, history and technology.
    WorldState,
}

impl ArtifactKindId {
    /// Key under which the artifact is stored inside a version document.
    #[must_use]
    pub const fn document_key(self) -> &'static str {
        match self {
            Self::StoryRoot => "story_root",
            Self::WorldState => "world_state",
        }
    }

    /// First path segment below the user directory.
    #[must_use]
    pub const fn kind_segment(self) -> &'static str {
        match self {
            Self::StoryRoot => "story-root",
            Self::WorldState => "world-state",
        }
    }

    /// Second path segment below the user directory.
    #[must_use]
    pub const fn artifact_segment(self) -> &'static str {
        match self {
            Self::StoryRoot => "root",
            Self::WorldState => "world",
        }
    }

    /// Human-readable name used in messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::StoryRoot => "Story Root",
            Self::WorldState => "World State",
        }
    }
}

impl fmt::Display for ArtifactKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_key())
    }
}

/// A single named field of an artifact, borrowed for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactField<'a> {
    /// JSON field name.
    pub name: &'static str,
    /// Current value.
    pub value: &'a str,
    /// Whether a blank value is a validation failure.
    pub required: bool,
}

impl<'a> ArtifactField<'a> {
    const fn required(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value,
            required: true,
        }
    }

    const fn optional(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value,
            required: false,
        }
    }
}

/// Trait implemented by every artifact document type.
///
/// Artifacts are value objects: equality is structural and the only
/// identity they carry is their id field.
pub trait ArtifactKind:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// The kind this type represents.
    const KIND: ArtifactKindId;

    /// Returns the artifact's own id field.
    fn artifact_id(&self) -> &str;

    /// Returns every field in declaration order.
    fn fields(&self) -> Vec<ArtifactField<'_>>;

    /// True when every field, required or not, is blank.
    fn is_blank(&self) -> bool {
        self.fields().iter().all(|f| f.value.trim().is_empty())
    }
}

/// The Story Root document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryRoot {
    /// Artifact id.
    pub story_root_id: String,
    /// Genre of the story.
    pub genre: String,
    /// Emotional tone and atmosphere.
    pub tone: String,
    /// Core themes and messages.
    pub thematic_pillars: String,
    /// Free-form notes. Optional.
    pub notes: String,
}

impl ArtifactKind for StoryRoot {
    const KIND: ArtifactKindId = ArtifactKindId::StoryRoot;

    fn artifact_id(&self) -> &str {
        &self.story_root_id
    }

    fn fields(&self) -> Vec<ArtifactField<'_>> {
        vec![
            ArtifactField::required("story_root_id", &self.story_root_id),
            ArtifactField::required("genre", &self.genre),
            ArtifactField::required("tone", &self.tone),
            ArtifactField::required("thematic_pillars", &self.thematic_pillars),
            ArtifactField::optional("notes", &self.notes),
        ]
    }
}

/// The World State document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldState {
    /// Artifact id.
    pub world_state_id: String,
    /// Physical laws and rules of the world.
    pub physical_laws: String,
    /// Social organisation.
    pub social_structures: String,
    /// Historical background.
    pub historical_context: String,
    /// Magic system or technology level.
    pub magic_or_technology: String,
    /// Free-form notes. Optional.
    pub notes: String,
}

impl ArtifactKind for WorldState {
    const KIND: ArtifactKindId = ArtifactKindId::WorldState;

    fn artifact_id(&self) -> &str {
        &self.world_state_id
    }

    fn fields(&self) -> Vec<ArtifactField<'_>> {
        vec![
            ArtifactField::required("world_state_id", &self.world_state_id),
            ArtifactField::required("physical_laws", &self.physical_laws),
            ArtifactField::required("social_structures", &self.social_structures),
            ArtifactField::required("historical_context", &self.historical_context),
            ArtifactField::required("magic_or_technology", &self.magic_or_technology),
            ArtifactField::optional("notes", &self.notes),
        ]
    }
}
