use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, info};

use crate::model::Scene;

/// Parse a scene document into its scenes.
///
/// Three shapes are accepted:
///   • a single scene object
///   • a bare array of scenes
///   • an object with a `scenes` array
///
/// Anything else, or a scene whose `id` is not a valid namespaced name, is
/// reported as an error.
pub fn load_from_json(json: &str) -> Result<Vec<Scene>> {
    debug!(bytes = json.len(), "loading scene document");
    // Grab the entire file as a dynamic value first.
    let root: Value = serde_json::from_str(json).context("document is not valid JSON")?;

    let entries = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("scenes") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(anyhow!("`scenes` is not an array")),
            None => vec![Value::Object(map)],
        },
        _ => return Err(anyhow!("expected a scene object or an array of scenes")),
    };

    let mut scenes = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let scene: Scene =
            serde_json::from_value(entry).with_context(|| format!("scene {i} is malformed"))?;
        scene
            .resource_id()
            .with_context(|| format!("scene {i} has invalid id `{}`", scene.id))?;
        scenes.push(scene);
    }

    info!(scenes = scenes.len(), "scene document loaded");
    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    #[test]
    fn test_document_shapes() {
        let test_cases = vec![
            (r#"{"id": "kubejs:a", "items": ["x"]}"#, 1),
            (r#"[{"id": "kubejs:a"}, {"id": "kubejs:b"}]"#, 2),
            (r#"{"scenes": [{"id": "kubejs:a"}]}"#, 1),
            (r#"[]"#, 0),
        ];
        for (input, expected) in test_cases {
            let scenes = load_from_json(input).unwrap();
            assert_eq!(scenes.len(), expected, "input: {input}");
        }
    }

    #[test]
    fn test_rejected_documents() {
        let test_cases = vec![
            "42",
            "not json",
            r#"{"scenes": {"id": "kubejs:a"}}"#,
            r#"[{"id": "kubejs:a"}, {"id": "No Good"}]"#,
        ];
        for input in test_cases {
            assert!(load_from_json(input).is_err(), "input: {input}");
        }
    }

    #[test]
    fn test_invalid_id_names_index() {
        let err = load_from_json(r#"[{"id": "kubejs:a"}, {"id": ""}]"#).unwrap_err();
        assert!(err.to_string().contains("scene 1"));
    }

    #[test]
    fn test_malformed_steps_do_not_fail_the_document() {
        let test_cases = vec![
            r#"{"id": "kubejs:b", "steps": [42, {"type": 5}]}"#,
            r#"{"id": "kubejs:b", "steps": 7}"#,
            r#"{"id": "kubejs:b", "segments": [{"steps": 7}, "oops"]}"#,
            r#"{"id": "kubejs:b", "segments": 3, "items": "x", "title": 9}"#,
        ];
        for second in test_cases {
            let doc = format!(
                r#"[{{"id": "kubejs:a", "items": ["x"], "steps": [{{"type": "idle", "duration": 5}}]}}, {second}]"#
            );
            let scenes = load_from_json(&doc).unwrap();
            assert_eq!(scenes.len(), 2, "input: {second}");
            assert_eq!(scenes[0].items, vec!["x".to_string()]);
            assert_eq!(scenes[0].steps, vec![Step::idle(5)]);
            assert_eq!(scenes[1].id, "kubejs:b");
        }
    }

    #[test]
    fn test_malformed_entries_keep_their_slots() {
        let scenes = load_from_json(
            r#"{"id": "kubejs:b", "steps": [42, {"type": 5}], "segments": [{"steps": 7}]}"#,
        )
        .unwrap();
        let scene = &scenes[0];
        assert!(scene.steps[0].is_blank());
        assert_eq!(scene.steps[1].op.kind(), "5");
        let segments = scene.segments.as_ref().unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].steps.is_empty());
    }
}
