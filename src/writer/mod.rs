//! Component 4: writers. Everything here reads a `ProcessedProject` and
//! only touches the output directory.
pub mod codegen;
pub mod kubejs;
pub mod trace;

use crate::model::ResourceLocation;

/// File stem shared by every artifact of one scene.
pub fn file_stem(id: &ResourceLocation) -> String {
    format!("{}_{}", id.namespace(), id.path().replace('/', "_"))
}
