use std::fs;

use ponder_dsl::parser::load_from_json;
use ponder_dsl::processor::interpreter::{self, SkipReason};
use ponder_dsl::processor::recorder::Recorder;
use ponder_dsl::processor::{self, ProcessedProject};
use ponder_dsl::writer::{codegen, kubejs};

fn compile(fixture: &str, lang: &str) -> ProcessedProject {
    let json = fs::read_to_string(format!("tests/fixtures/{fixture}")).unwrap();
    let scenes = load_from_json(&json).unwrap();
    processor::run(&scenes, lang).unwrap()
}

#[test]
fn flat_scene_splits_and_resolves() {
    let project = compile("funnel.json", "de_de");
    let scene = &project.scenes[0];
    assert_eq!(scene.title, "Trichter benutzen");

    let ids: Vec<_> = scene.segments.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["funnel/1", "funnel/2"]);
    assert_eq!(scene.segments[0].structure.to_string(), "kubejs:funnel_intro");
    assert_eq!(scene.segments[1].structure.to_string(), "create:funnel_belt");
    assert!(scene.warnings.is_empty());

    // first segment got a reveal, the second already opens with one
    assert_eq!(scene.segments[0].segment.steps.len(), 8);
    assert_eq!(scene.segments[1].segment.steps.len(), 8);
    assert!(scene.segments[1].segment.steps[0].keyframe);
}

#[test]
fn interpreter_runs_every_segment() {
    let project = compile("funnel.json", "en_us");
    let segments = &project.scenes[0].segments;

    let mut rec = Recorder::default();
    let report = interpreter::execute(&segments[0].segment, &mut rec);
    assert!(report.warnings.is_empty());
    assert_eq!(report.applied, 7);
    assert_eq!(rec.lines.last().unwrap(), "move_section(#0, [0, 1, 0], 15)");

    let mut rec = Recorder::default();
    let report = interpreter::execute(&segments[1].segment, &mut rec);
    assert_eq!(report.warnings.len(), 1);
    let w = &report.warnings[0];
    assert_eq!(w.index, 7);
    assert_eq!(w.kind, "spin_the_camera");
    assert!(matches!(w.reason, SkipReason::UnknownType(_)));
    // the second unnamed detach replaced the first
    assert!(rec.lines.contains(&"rotate_section(#1, [0, 90, 0], 20)".to_string()));
}

#[test]
fn code_generator_output() {
    let project = compile("funnel.json", "en_us");
    let lines = codegen::emit(&project.scenes[0].segments[1].segment);

    assert_eq!(lines[0], "scene.addKeyframe();");
    assert_eq!(lines[1], "scene.showStructure();");
    assert_eq!(lines[2], "scene.idleSeconds(2);");
    assert_eq!(
        lines[3],
        "let link1 = scene.world.showIndependentSection(util.select.fromTo(1, 1, 1, 1, 2, 1), Direction.DOWN);"
    );
    assert_eq!(
        lines[4],
        "let link2 = scene.world.showIndependentSection(util.select.position(3, 1, 1), Direction.DOWN);"
    );
    assert_eq!(lines[5], "scene.world.rotateSection(link2, 0, 90, 0, 20);");
    assert!(lines[6].starts_with("scene.world.modifyBlockEntityNBT(util.select.position(1, 1, 1), true,"));
    assert_eq!(
        lines[7],
        "// [unsupported] scene.effects.indicateSuccess([1, 1, 1]);"
    );
    assert_eq!(lines[8], "// [unknown] step type \"spin_the_camera\"");
    assert_eq!(lines.len(), 9);
}

#[test]
fn segmented_project() {
    let project = compile("project.json", "en_us");
    // the trigger-less scene is dropped
    assert_eq!(project.scenes.len(), 1);

    let scene = &project.scenes[0];
    let summary: Vec<_> = scene
        .segments
        .iter()
        .map(|s| (s.id.as_str(), s.title.as_str(), s.structure.to_string()))
        .collect();
    assert_eq!(
        summary,
        [
            ("gearbox/intro", "Gearboxes", "kubejs:gearbox_a".to_string()),
            ("gearbox/2", "Reversing", "kubejs:gearbox_b".to_string()),
            ("gearbox/3", "Gearboxes", "ponder:debug/scene_1".to_string()),
        ]
    );
    assert_eq!(scene.warnings.len(), 1);
    assert_eq!(scene.warnings[0].0, 2);

    assert_eq!(
        codegen::emit(&scene.segments[0].segment),
        [
            "scene.showStructure();",
            "scene.idleSeconds(1);",
            "scene.idleSeconds(1);",
            "scene.rotateCameraY(-90);",
        ]
    );
    assert_eq!(
        codegen::emit(&scene.segments[1].segment),
        [
            "scene.showStructure(2);",
            "scene.world.setBlock([1, 1, 1], \"create:cogwheel[axis=y]\", false);",
        ]
    );
    assert_eq!(
        codegen::emit(&scene.segments[2].segment)[1],
        "scene.playSound(\"minecraft:block.note_block.bell\", \"master\", 1, 1.5);"
    );
}

#[test]
fn writes_one_script_per_scene() {
    let project = compile("project.json", "en_us");
    let out = std::env::temp_dir().join(format!("ponder-dsl-test-{}", std::process::id()));
    fs::create_dir_all(&out).unwrap();

    kubejs::emit(&project, &out).unwrap();
    let script = fs::read_to_string(out.join("kubejs_gearbox.js")).unwrap();
    assert!(script.contains("event.create([\"create:gearbox\"])"));
    assert!(script.contains(".scene(\"gearbox/intro\", \"Gearboxes\", \"kubejs:gearbox_a\", (scene, util) => {"));
    assert!(script.contains("// segment 3: structure index 7 is outside the pool of 2"));
    assert!(!out.join("kubejs_unused.js").exists());

    fs::remove_dir_all(&out).unwrap();
}
