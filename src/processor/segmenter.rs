//! Splits a scene into segments and makes every segment open with a
//! structure reveal.

use tracing::debug;

use crate::model::{Op, Scene, Segment, Step};

/// Ticks waited after a reveal the sanitizer had to insert.
pub const PRELUDE_IDLE_TICKS: i32 = 20;

/// Returns the scene's segments, sanitized. Never fails and never returns
/// an empty list.
pub fn normalize(scene: &Scene) -> Vec<Segment> {
    let mut segments = match &scene.segments {
        Some(segments) if !segments.is_empty() => segments.clone(),
        _ => split(&scene.steps),
    };
    for (idx, segment) in segments.iter_mut().enumerate() {
        if sanitize(segment) {
            debug!(scene = %scene.id, segment = idx, "inserted structure reveal");
        }
    }
    segments
}

/// The scene rewritten into the segment encoding, sanitized.
pub fn normalized(scene: &Scene) -> Scene {
    Scene {
        steps: Vec::new(),
        segments: Some(normalize(scene)),
        ..scene.clone()
    }
}

/// Cuts a flat list at `next_scene` markers. The markers themselves are
/// dropped; a marker keeps its keyframe flag by passing it to the next step.
pub fn split(steps: &[Step]) -> Vec<Segment> {
    let mut segments = vec![Segment::default()];
    let mut carry_keyframe = false;

    for step in steps {
        if matches!(step.op, Op::NextScene) {
            segments.push(Segment::default());
            carry_keyframe = step.keyframe;
            continue;
        }
        let mut step = step.clone();
        if carry_keyframe && !step.is_blank() {
            step.keyframe = true;
            carry_keyframe = false;
        }
        if let Some(current) = segments.last_mut() {
            current.steps.push(step);
        }
    }
    segments
}

/// Puts a reveal plus a short idle in front of a segment whose first
/// meaningful step is not a reveal. Segments with no meaningful step are
/// left alone. Returns whether anything was inserted.
pub fn sanitize(segment: &mut Segment) -> bool {
    let Some(first) = segment.first_meaningful() else {
        return false;
    };
    if matches!(first.op, Op::ShowStructure { .. }) {
        return false;
    }
    segment.steps.splice(
        0..0,
        [Step::show_structure(), Step::idle(PRELUDE_IDLE_TICKS)],
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_step() -> Step {
        Step::new(Op::Text {
            duration: Some(40),
            text: Some("hi".into()),
            point: None,
            color: None,
            near_target: None,
        })
    }

    fn marker() -> Step {
        Step::new(Op::NextScene)
    }

    #[test]
    fn test_empty_flat_list_is_one_empty_segment() {
        let segments = normalize(&Scene::default());
        assert_eq!(segments, vec![Segment::default()]);
    }

    #[test]
    fn test_split_at_markers() {
        let scene = Scene {
            steps: vec![
                Step::show_structure(),
                Step::idle(5),
                marker(),
                text_step(),
                marker(),
            ],
            ..Scene::default()
        };
        let segments = normalize(&scene);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].steps, vec![Step::show_structure(), Step::idle(5)]);
        assert_eq!(
            segments[1].steps,
            vec![Step::show_structure(), Step::idle(20), text_step()]
        );
        assert!(segments[2].steps.is_empty());
    }

    #[test]
    fn test_blank_steps_do_not_count_as_first() {
        let mut segment = Segment::new(vec![Step::blank(), Step::show_structure()]);
        assert!(!sanitize(&mut segment));

        let mut segment = Segment::new(vec![Step::blank(), text_step()]);
        assert!(sanitize(&mut segment));
        assert!(matches!(segment.steps[0].op, Op::ShowStructure { .. }));
        assert_eq!(segment.steps[1], Step::idle(PRELUDE_IDLE_TICKS));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let scene = Scene {
            steps: vec![text_step(), marker(), Step::blank(), Step::idle(3)],
            ..Scene::default()
        };
        let once = normalized(&scene);
        let twice = normalized(&once);
        assert_eq!(once, twice);
        assert_eq!(normalize(&once), normalize(&scene));
    }

    #[test]
    fn test_marker_keyframe_moves_to_next_step() {
        let mut m = marker();
        m.keyframe = true;
        let segments = split(&[Step::show_structure(), m, Step::show_structure()]);
        assert!(segments[1].steps[0].keyframe);
    }

    fn segmented() -> Scene {
        Scene {
            // ignored once segments are present
            steps: vec![text_step()],
            segments: Some(vec![
                Segment::new(vec![Step::blank(), Step::show_structure(), text_step()]),
                Segment::new(vec![Step::blank(), text_step(), Step::idle(5)]),
                Segment::new(vec![Step::blank()]),
            ]),
            ..Scene::default()
        }
    }

    #[test]
    fn test_segment_list_is_sanitized_per_segment() {
        let segments = normalize(&segmented());
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0].steps,
            vec![Step::blank(), Step::show_structure(), text_step()]
        );
        assert_eq!(
            segments[1].steps,
            vec![
                Step::show_structure(),
                Step::idle(PRELUDE_IDLE_TICKS),
                Step::blank(),
                text_step(),
                Step::idle(5),
            ]
        );
        assert_eq!(segments[2].steps, vec![Step::blank()]);
    }

    #[test]
    fn test_normalize_is_idempotent_on_segment_list() {
        let scene = segmented();
        let once = normalized(&scene);
        assert!(once.steps.is_empty());
        assert_eq!(normalized(&once), once);
        assert_eq!(normalize(&once), normalize(&scene));
    }

    #[test]
    fn test_empty_segment_list_falls_back_to_steps() {
        let scene = Scene {
            steps: vec![Step::show_structure(), marker(), Step::show_structure()],
            segments: Some(Vec::new()),
            ..Scene::default()
        };
        assert_eq!(normalize(&scene).len(), 2);
    }
}
