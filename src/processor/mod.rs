//! The functional core: turns loaded scenes into compiled, ready-to-emit
//! segments.
pub mod history;
pub mod interpreter;
pub mod lexer;
pub mod recorder;
pub mod resolver;
pub mod segmenter;
pub mod snbt;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::model::{ResourceLocation, Scene, Segment};
use resolver::{ResolveWarning, StructureResolver};

/// One segment with everything a backend needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSegment {
    /// `<scene path>` or `<scene path>/<segment>`; unique within the scene.
    pub id: String,
    pub title: String,
    pub structure: ResourceLocation,
    /// Sanitized steps.
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScene {
    pub id: ResourceLocation,
    pub triggers: Vec<String>,
    pub title: String,
    pub segments: Vec<CompiledSegment>,
    /// Structure references that fell back, by segment index.
    pub warnings: Vec<(usize, ResolveWarning)>,
}

/// Read-only result handed to the writers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedProject {
    pub scenes: Vec<CompiledScene>,
}

/// Compiles every scene with triggers. `lang` picks localized titles.
pub fn run(scenes: &[Scene], lang: &str) -> Result<ProcessedProject> {
    let mut compiled = Vec::new();
    for scene in scenes {
        if scene.is_inert() {
            info!(scene = %scene.id, "no trigger items, skipping");
            continue;
        }
        compiled.push(
            compile_scene(scene, lang).with_context(|| format!("Compiling scene {}", scene.id))?,
        );
    }
    info!(scenes = compiled.len(), "compiled");
    Ok(ProcessedProject { scenes: compiled })
}

pub fn compile_scene(scene: &Scene, lang: &str) -> Result<CompiledScene> {
    let id = scene.resource_id()?;
    let title = scene
        .title
        .as_ref()
        .and_then(|t| t.get(lang))
        .unwrap_or(id.path())
        .to_string();

    let segments = segmenter::normalize(scene);
    let lone = segments.len() == 1 && segments[0].id.is_none();
    let mut resolver = StructureResolver::for_scene(scene);
    let mut warnings = Vec::new();
    let mut out = Vec::with_capacity(segments.len());

    for (index, segment) in segments.into_iter().enumerate() {
        let (structure, warning) = resolver.next_segment(&segment);
        if let Some(w) = warning {
            warnings.push((index, w));
        }
        let segment_id = if lone {
            id.path().to_string()
        } else {
            let name = segment.id.clone().unwrap_or_else(|| (index + 1).to_string());
            format!("{}/{name}", id.path())
        };
        let segment_title = segment
            .title
            .as_ref()
            .and_then(|t| t.get(lang))
            .unwrap_or(title.as_str())
            .to_string();
        debug!(segment = %segment_id, %structure, steps = segment.steps.len(), "resolved segment");
        out.push(CompiledSegment {
            id: segment_id,
            title: segment_title,
            structure,
            segment,
        });
    }

    Ok(CompiledScene {
        id,
        triggers: scene.items.clone(),
        title,
        segments: out,
        warnings,
    })
}
