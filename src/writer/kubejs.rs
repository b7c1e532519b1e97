//! Emit one KubeJS Ponder registration script per compiled scene.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::processor::{CompiledScene, ProcessedProject};
use crate::writer::codegen::{self, quote};
use crate::writer::file_stem;

const INDENT: &str = "    ";

pub fn emit(project: &ProcessedProject, out_dir: &Path) -> io::Result<()> {
    for scene in &project.scenes {
        let path = out_dir.join(format!("{}.js", file_stem(&scene.id)));
        let mut f = File::create(&path)?;
        f.write_all(render(scene).as_bytes())?;
        info!(path = %path.display(), segments = scene.segments.len(), "wrote script");
    }
    Ok(())
}

/// The whole script for one scene: a registry callback with one chained
/// `.scene(..)` per segment.
pub fn render(scene: &CompiledScene) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_scene(&mut out, scene);
    out
}

fn write_scene(out: &mut String, scene: &CompiledScene) -> std::fmt::Result {
    writeln!(out, "// Auto-generated from {} – DO NOT EDIT", scene.id)?;
    for (index, warning) in &scene.warnings {
        writeln!(out, "// segment {}: {warning}", index + 1)?;
    }
    writeln!(out)?;

    let triggers: Vec<String> = scene.triggers.iter().map(|t| quote(t)).collect();
    writeln!(out, "Ponder.registry((event) => {{")?;
    write!(out, "{INDENT}event.create([{}])", triggers.join(", "))?;
    for seg in &scene.segments {
        writeln!(out)?;
        writeln!(
            out,
            "{INDENT}{INDENT}.scene({}, {}, {}, (scene, util) => {{",
            quote(&seg.id),
            quote(&seg.title),
            quote(&seg.structure.to_string())
        )?;
        for line in codegen::emit(&seg.segment) {
            writeln!(out, "{INDENT}{INDENT}{INDENT}{line}")?;
        }
        write!(out, "{INDENT}{INDENT}}})")?;
    }
    writeln!(out, ";")?;
    writeln!(out, "}});")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocalizedText, Scene, Step};
    use crate::processor::compile_scene;

    #[test]
    fn test_render_scene() {
        let scene = Scene {
            id: "kubejs:belt".into(),
            items: vec!["create:belt_connector".into()],
            title: Some(LocalizedText::Plain("Belts".into())),
            structures: vec!["belt".into()],
            steps: vec![Step::idle(10)],
            ..Scene::default()
        };
        let compiled = compile_scene(&scene, "en_us").unwrap();
        let expected = "\
// Auto-generated from kubejs:belt – DO NOT EDIT

Ponder.registry((event) => {
    event.create([\"create:belt_connector\"])
        .scene(\"belt\", \"Belts\", \"kubejs:belt\", (scene, util) => {
            scene.showStructure();
            scene.idleSeconds(1);
            scene.idle(10);
        });
});
";
        assert_eq!(render(&compiled), expected);
    }
}
