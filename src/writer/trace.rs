//! Dump what the interpreter would do with each segment, one builder call
//! per line. Debug aid behind `--trace`.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::processor::interpreter;
use crate::processor::recorder::Recorder;
use crate::processor::{CompiledScene, ProcessedProject};
use crate::writer::file_stem;

pub fn emit(project: &ProcessedProject, out_dir: &Path) -> io::Result<()> {
    for scene in &project.scenes {
        let path = out_dir.join(format!("{}.trace.txt", file_stem(&scene.id)));
        fs::write(&path, render(scene))?;
    }
    Ok(())
}

pub fn render(scene: &CompiledScene) -> String {
    let mut out = String::new();
    for seg in &scene.segments {
        let mut recorder = Recorder::default();
        let report = interpreter::execute(&seg.segment, &mut recorder);

        let _ = writeln!(out, "== {} ({}) ==", seg.id, seg.structure);
        for line in &recorder.lines {
            let _ = writeln!(out, "{line}");
        }
        for w in &report.warnings {
            let _ = writeln!(out, "! step {} ({}): {}", w.index, w.kind, w.reason);
        }
    }
    out
}
