//! Picks the structure each segment plays on.
//!
//! Segments are resolved in order. A segment whose opening reveal names a
//! structure switches to it; every later segment keeps it until the next
//! override.

use thiserror::Error;
use tracing::warn;

use crate::model::{IdentError, Op, ResourceLocation, Scene, Segment};

/// Namespace given to bare structure names.
pub const DEFAULT_NAMESPACE: &str = "kubejs";
/// Structure used when nothing else resolves.
pub const FALLBACK_STRUCTURE: (&str, &str) = ("ponder", "debug/scene_1");

pub fn fallback_structure() -> ResourceLocation {
    ResourceLocation::new(FALLBACK_STRUCTURE.0, FALLBACK_STRUCTURE.1)
        .unwrap_or_else(|_| unreachable!("fallback structure id is valid"))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveWarning {
    #[error("structure reference is empty")]
    Empty,
    #[error("structure index {index} is outside the pool of {pool_size}")]
    IndexOutOfRange { index: String, pool_size: usize },
    #[error("structure index `{0}` is not a whole number")]
    BadIndex(String),
    #[error("structure reference `{reference}` is invalid: {source}")]
    BadName {
        reference: String,
        #[source]
        source: IdentError,
    },
}

/// Carries the current structure from one segment to the next.
pub struct StructureResolver<'a> {
    pool: &'a [String],
    current: ResourceLocation,
}

impl<'a> StructureResolver<'a> {
    /// Seeds from the first pool entry, or the fallback for an empty pool.
    pub fn new(pool: &'a [String]) -> Self {
        let current = match pool.first() {
            Some(first) => match resolve_name(first) {
                Ok(id) => id,
                Err(w) => {
                    warn!("structure pool entry 0: {w}");
                    fallback_structure()
                }
            },
            None => fallback_structure(),
        };
        Self { pool, current }
    }

    pub fn for_scene(scene: &'a Scene) -> Self {
        Self::new(&scene.structures)
    }

    pub fn current(&self) -> &ResourceLocation {
        &self.current
    }

    /// Resolves the next segment and updates the carried structure.
    pub fn next_segment(
        &mut self,
        segment: &Segment,
    ) -> (ResourceLocation, Option<ResolveWarning>) {
        let explicit = segment.steps.iter().find_map(|s| match &s.op {
            Op::ShowStructure { structure, .. } => Some(structure.as_deref()),
            _ => None,
        });
        self.advance(explicit.flatten())
    }

    /// Same as [`Self::next_segment`], given the override directly.
    pub fn advance(
        &mut self,
        explicit: Option<&str>,
    ) -> (ResourceLocation, Option<ResolveWarning>) {
        let mut warning = None;
        if let Some(reference) = explicit {
            self.current = match resolve_reference(self.pool, reference) {
                Ok(id) => id,
                Err(w) => {
                    warn!("{w}; using {}", fallback_structure());
                    warning = Some(w);
                    fallback_structure()
                }
            };
        }
        (self.current.clone(), warning)
    }
}

/// Resolves one explicit reference against the pool.
///
/// Integers are pool indices: 1-based when in `[1, len]`, else 0-based when
/// in `[0, len)`. Any numeric reference that is not such an index is an
/// error, never a name.
pub fn resolve_reference(
    pool: &[String],
    reference: &str,
) -> Result<ResourceLocation, ResolveWarning> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ResolveWarning::Empty);
    }
    if !is_numeric(reference) {
        return resolve_name(reference);
    }
    let out_of_range = || ResolveWarning::IndexOutOfRange {
        index: reference.to_string(),
        pool_size: pool.len(),
    };
    let digits = reference.trim_start_matches(['+', '-']);
    let index = match reference.parse::<i64>() {
        Ok(index) => index,
        // too wide for i64
        Err(_) if digits.bytes().all(|b| b.is_ascii_digit()) => return Err(out_of_range()),
        Err(_) => return Err(ResolveWarning::BadIndex(reference.to_string())),
    };
    let len = pool.len() as i64;
    let slot = if (1..=len).contains(&index) {
        index - 1
    } else if (0..len).contains(&index) {
        index
    } else {
        return Err(out_of_range());
    };
    resolve_name(&pool[slot as usize])
}

/// A decimal number, optionally signed. `inf` and `NaN` are names.
fn is_numeric(reference: &str) -> bool {
    reference
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && reference.parse::<f64>().is_ok()
}

fn resolve_name(name: &str) -> Result<ResourceLocation, ResolveWarning> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ResolveWarning::Empty);
    }
    ResourceLocation::parse_with_default(name, DEFAULT_NAMESPACE).map_err(|source| {
        ResolveWarning::BadName {
            reference: name.to_string(),
            source,
        }
    })
}
