//! Scene documents as they come out of the loader.
//!
//! A scene holds its steps either as a list of segments (preferred) or as
//! one flat list split by `next_scene` markers (legacy). Nothing here
//! enforces the segment invariants; see `processor::segmenter`.

pub mod ident;
mod lenient;
pub mod record;
pub mod step;
pub mod types;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use ident::{IdentError, ResourceLocation};
pub use record::StepRecord;
pub use step::{Op, Step};
pub use types::{
    BlockPos, BlockState, Direction, InputAction, Keyword, Palette, Selection, SoundSource, Vec3,
    fmt_num,
};

/// Language used when a localized title has no entry for the requested one.
pub const FALLBACK_LANG: &str = "en_us";

/// Either a plain string or one string per language code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Picks `lang`, then [`FALLBACK_LANG`], then any entry.
    pub fn get(&self, lang: &str) -> Option<&str> {
        match self {
            LocalizedText::Plain(s) => Some(s),
            LocalizedText::Localized(map) => map
                .get(lang)
                .or_else(|| map.get(FALLBACK_LANG))
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::any")]
    pub title: Option<LocalizedText>,
    #[serde(deserialize_with = "lenient::list")]
    pub steps: Vec<Step>,
}

impl Segment {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// First step that is not blank.
    pub fn first_meaningful(&self) -> Option<&Step> {
        self.steps.iter().find(|s| !s.is_blank())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub id: String,
    /// Items whose ponder screen lists this scene.
    #[serde(deserialize_with = "lenient::list")]
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::any")]
    pub title: Option<LocalizedText>,
    /// Structure pool, in order.
    #[serde(deserialize_with = "lenient::list")]
    pub structures: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::list")]
    pub tags: Vec<String>,
    /// Legacy flat encoding.
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::list")]
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_list")]
    pub segments: Option<Vec<Segment>>,
}

impl Scene {
    /// Whether the segment list is the authoritative encoding.
    pub fn is_segmented(&self) -> bool {
        self.segments.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn is_inert(&self) -> bool {
        self.items.is_empty()
    }

    pub fn resource_id(&self) -> Result<ResourceLocation, IdentError> {
        self.id.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_localized_title_fallbacks() {
        let title: LocalizedText = serde_json::from_value(json!({
            "en_us": "Using the Funnel",
            "de_de": "Den Trichter benutzen",
        }))
        .unwrap();
        assert_eq!(title.get("de_de"), Some("Den Trichter benutzen"));
        assert_eq!(title.get("fr_fr"), Some("Using the Funnel"));

        let plain = LocalizedText::Plain("Gears".into());
        assert_eq!(plain.get("de_de"), Some("Gears"));
    }

    #[test]
    fn test_scene_encoding_choice() {
        let scene: Scene = serde_json::from_value(json!({
            "id": "kubejs:funnel",
            "items": ["create:andesite_funnel"],
            "steps": [{"type": "idle", "duration": 10}],
            "segments": [],
        }))
        .unwrap();
        assert!(!scene.is_segmented());
        assert!(!scene.is_inert());
        assert_eq!(scene.resource_id().unwrap().path(), "funnel");
    }
}
