use std::fs;

use ponder_dsl::model::{Op, Step};
use ponder_dsl::parser::load_from_json;

#[test]
fn loads_flat_scene() {
    let json = fs::read_to_string("tests/fixtures/funnel.json").unwrap();
    let scenes = load_from_json(&json).expect("valid document");

    assert_eq!(scenes.len(), 1);
    let scene = &scenes[0];
    assert_eq!(scene.id, "kubejs:funnel");
    assert_eq!(scene.items.len(), 2);
    assert!(!scene.is_segmented());
    assert_eq!(scene.steps.len(), 15);

    // null entries are kept as blanks
    assert!(scene.steps[3].is_blank());
    assert!(matches!(scene.steps[6].op, Op::NextScene));
    assert!(scene.steps[6].keyframe);
    assert!(matches!(
        &scene.steps[14].op,
        Op::Unknown(r) if r.kind.as_deref() == Some("spin_the_camera")
    ));
}

#[test]
fn loads_project_with_segments() {
    let json = fs::read_to_string("tests/fixtures/project.json").unwrap();
    let scenes = load_from_json(&json).expect("valid document");

    assert_eq!(scenes.len(), 2);
    let gearbox = &scenes[0];
    assert!(gearbox.is_segmented());
    assert!(scenes[1].is_inert());

    let segments = gearbox.segments.as_ref().unwrap();
    assert_eq!(segments[0].id.as_deref(), Some("intro"));
    // numeric strings are read as numbers
    assert_eq!(segments[0].steps[0], Step::idle(20));
}

#[test]
fn steps_survive_a_save_cycle() {
    let json = fs::read_to_string("tests/fixtures/funnel.json").unwrap();
    let scenes = load_from_json(&json).unwrap();

    let saved = serde_json::to_string(&scenes[0]).unwrap();
    let reloaded = load_from_json(&saved).unwrap();
    assert_eq!(reloaded[0], scenes[0]);

    let original: serde_json::Value = serde_json::from_str(&json).unwrap();
    let resaved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(resaved["steps"], original["steps"]);
}

#[test]
fn unrecognized_values_survive_a_save_cycle() {
    let json = r#"{
        "id": "kubejs:odd",
        "items": ["minecraft:stone"],
        "steps": [
            {"type": "text", "duration": 40, "text": "hi", "point": [1, 2, 3], "color": "purple"},
            {"type": "set_block", "block": "minecraft:stone", "pos": [1.5, 2, 3]}
        ]
    }"#;
    let scenes = load_from_json(json).unwrap();
    let saved = serde_json::to_value(&scenes[0]).unwrap();
    let original: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(saved["steps"], original["steps"]);
}

#[test]
fn one_bad_scene_does_not_sink_the_rest() {
    let json = r#"[
        {"id": "kubejs:good", "items": ["x"], "steps": [{"type": "idle", "duration": 5}]},
        {"id": "kubejs:bad", "items": ["x"], "steps": [42, {"type": 5}], "segments": [{"steps": 7}]}
    ]"#;
    let scenes = load_from_json(json).expect("malformed steps are not fatal");
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].steps, vec![Step::idle(5)]);
    assert!(scenes[1].steps[0].is_blank());
}
