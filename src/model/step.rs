//! The instruction set: one enum variant per step type, each carrying only
//! its own fields.
//!
//! Required fields are still `Option`s. Steps are allowed to be half
//! filled in (the editor saves whatever the author has typed so far); the
//! backends decide what is missing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::record::StepRecord;
use super::types::{Direction, InputAction, Keyword, Palette, SoundSource, Vec3};

/// Reads from any JSON value: `null`, a non-object or a record without a
/// `type` is a blank step. Writes a blank step as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Option<StepRecord>")]
pub struct Step {
    /// Mark a named timeline point before this step runs.
    pub keyframe: bool,
    pub op: Op,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A null or typeless entry. Skipped by every pass.
    Blank,
    ShowStructure {
        structure: Option<String>,
        height: Option<i32>,
        scale: Option<f64>,
    },
    Idle {
        ticks: Option<i32>,
    },
    Text {
        duration: Option<i32>,
        text: Option<String>,
        point: Option<Vec3>,
        color: Option<Keyword<Palette>>,
        near_target: Option<bool>,
    },
    SharedText {
        duration: Option<i32>,
        key: Option<String>,
        point: Option<Vec3>,
        color: Option<Keyword<Palette>>,
        near_target: Option<bool>,
    },
    RotateCamera {
        degrees: Option<f64>,
    },
    ShowControls {
        duration: Option<i32>,
        point: Option<Vec3>,
        direction: Option<Keyword<Direction>>,
        action: Option<Keyword<InputAction>>,
        item: Option<String>,
    },
    PlaySound {
        sound: Option<String>,
        volume: Option<f64>,
        pitch: Option<f64>,
        source: Option<Keyword<SoundSource>>,
    },
    SetBlock {
        block: Option<String>,
        properties: Option<BTreeMap<String, String>>,
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        particles: Option<bool>,
    },
    DestroyBlock {
        pos: Option<Vec3>,
        particles: Option<bool>,
    },
    ReplaceBlocks {
        block: Option<String>,
        properties: Option<BTreeMap<String, String>>,
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        particles: Option<bool>,
    },
    ShowSection {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        direction: Option<Keyword<Direction>>,
    },
    HideSection {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        direction: Option<Keyword<Direction>>,
    },
    /// Detach: shows blocks as their own movable section.
    ShowIndependentSection {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        direction: Option<Keyword<Direction>>,
        link: Option<String>,
    },
    /// Merge: shows blocks into an existing section.
    MergeSection {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        direction: Option<Keyword<Direction>>,
        link: Option<String>,
    },
    HideIndependentSection {
        link: Option<String>,
        direction: Option<Keyword<Direction>>,
    },
    RotateSection {
        link: Option<String>,
        rot_x: Option<f64>,
        rot_y: Option<f64>,
        rot_z: Option<f64>,
        duration: Option<i32>,
    },
    MoveSection {
        link: Option<String>,
        offset: Option<Vec3>,
        duration: Option<i32>,
    },
    ModifyBlockEntity {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        nbt: Option<String>,
        redraw: Option<bool>,
    },
    CreateEntity {
        entity: Option<String>,
        pos: Option<Vec3>,
        yaw: Option<f64>,
        pitch: Option<f64>,
        look_at: Option<Vec3>,
    },
    CreateItemEntity {
        item: Option<String>,
        pos: Option<Vec3>,
        motion: Option<Vec3>,
        count: Option<i32>,
    },
    ClearEntities {
        entity: Option<String>,
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        full_scene: Option<bool>,
    },
    ClearItemEntities {
        item: Option<String>,
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        full_scene: Option<bool>,
    },
    ShowOutline {
        color: Option<Keyword<Palette>>,
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
        duration: Option<i32>,
    },
    ToggleRedstonePower {
        pos: Option<Vec3>,
        pos2: Option<Vec3>,
    },
    IndicateRedstone {
        pos: Option<Vec3>,
    },
    IndicateSuccess {
        pos: Option<Vec3>,
    },
    Keyframe,
    /// Segment boundary in the flat encoding.
    NextScene,
    /// A `type` this compiler does not know. Kept whole so it round-trips.
    Unknown(Box<StepRecord>),
}

impl Op {
    /// Storage discriminant, in instruction-set order (index == opcode).
    pub const KIND_NAMES: &'static [&'static str] = &[
        "show_structure",
        "idle",
        "text",
        "shared_text",
        "rotate_camera",
        "show_controls",
        "play_sound",
        "set_block",
        "destroy_block",
        "replace_blocks",
        "show_section",
        "hide_section",
        "show_independent_section",
        "show_section_and_merge",
        "hide_independent_section",
        "rotate_section",
        "move_section",
        "modify_block_entity_nbt",
        "create_entity",
        "create_item_entity",
        "clear_entities",
        "clear_item_entities",
        "show_outline",
        "toggle_redstone_power",
        "indicate_redstone",
        "indicate_success",
        "keyframe",
        "next_scene",
    ];

    pub fn kind(&self) -> &str {
        match self {
            Op::Blank => "",
            Op::ShowStructure { .. } => "show_structure",
            Op::Idle { .. } => "idle",
            Op::Text { .. } => "text",
            Op::SharedText { .. } => "shared_text",
            Op::RotateCamera { .. } => "rotate_camera",
            Op::ShowControls { .. } => "show_controls",
            Op::PlaySound { .. } => "play_sound",
            Op::SetBlock { .. } => "set_block",
            Op::DestroyBlock { .. } => "destroy_block",
            Op::ReplaceBlocks { .. } => "replace_blocks",
            Op::ShowSection { .. } => "show_section",
            Op::HideSection { .. } => "hide_section",
            Op::ShowIndependentSection { .. } => "show_independent_section",
            Op::MergeSection { .. } => "show_section_and_merge",
            Op::HideIndependentSection { .. } => "hide_independent_section",
            Op::RotateSection { .. } => "rotate_section",
            Op::MoveSection { .. } => "move_section",
            Op::ModifyBlockEntity { .. } => "modify_block_entity_nbt",
            Op::CreateEntity { .. } => "create_entity",
            Op::CreateItemEntity { .. } => "create_item_entity",
            Op::ClearEntities { .. } => "clear_entities",
            Op::ClearItemEntities { .. } => "clear_item_entities",
            Op::ShowOutline { .. } => "show_outline",
            Op::ToggleRedstonePower { .. } => "toggle_redstone_power",
            Op::IndicateRedstone { .. } => "indicate_redstone",
            Op::IndicateSuccess { .. } => "indicate_success",
            Op::Keyframe => "keyframe",
            Op::NextScene => "next_scene",
            Op::Unknown(record) => record.kind.as_deref().unwrap_or(""),
        }
    }
}

impl Step {
    pub fn new(op: Op) -> Self {
        Self {
            keyframe: false,
            op,
        }
    }

    pub fn blank() -> Self {
        Self::new(Op::Blank)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.op, Op::Blank)
    }

    /// The `show_structure` step with no overrides.
    pub fn show_structure() -> Self {
        Self::new(Op::ShowStructure {
            structure: None,
            height: None,
            scale: None,
        })
    }

    pub fn idle(ticks: i32) -> Self {
        Self::new(Op::Idle { ticks: Some(ticks) })
    }
}

// ─────────────────────────────────────────────────────
// Record <-> Step
// ─────────────────────────────────────────────────────

fn ticks(n: Option<f64>) -> Option<i32> {
    n.map(|n| n.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

fn keyword<T: std::str::FromStr<Err = String>>(
    field: &str,
    raw: Option<String>,
) -> Option<Keyword<T>> {
    let kw = Keyword::parse(&raw?);
    if let Keyword::Raw(v) = &kw {
        debug!("keeping unrecognized `{field}` value `{v}`");
    }
    Some(kw)
}

fn vec3(p: Option<[f64; 3]>) -> Option<Vec3> {
    p.map(Vec3::from)
}

impl From<StepRecord> for Step {
    fn from(r: StepRecord) -> Self {
        let keyframe = r.attach_key_frame;
        let kind = r.kind.clone().unwrap_or_default();
        let op = match kind.trim() {
            "" => Op::Blank,
            "show_structure" => Op::ShowStructure {
                structure: r.structure,
                height: ticks(r.height),
                scale: r.scale,
            },
            "idle" => Op::Idle {
                ticks: ticks(r.duration),
            },
            "text" => Op::Text {
                duration: ticks(r.duration),
                text: r.text,
                point: vec3(r.point),
                color: keyword("color", r.color),
                near_target: r.place_near_target,
            },
            "shared_text" => Op::SharedText {
                duration: ticks(r.duration),
                key: r.key,
                point: vec3(r.point),
                color: keyword("color", r.color),
                near_target: r.place_near_target,
            },
            "rotate_camera" => Op::RotateCamera { degrees: r.degrees },
            "show_controls" => Op::ShowControls {
                duration: ticks(r.duration),
                point: vec3(r.point),
                direction: keyword("direction", r.direction),
                action: keyword("action", r.action),
                item: r.item,
            },
            "play_sound" => Op::PlaySound {
                sound: r.sound,
                volume: r.volume,
                pitch: r.pitch,
                source: keyword("source", r.source),
            },
            "set_block" => Op::SetBlock {
                block: r.block,
                properties: r.properties,
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                particles: r.spawn_particles,
            },
            "destroy_block" => Op::DestroyBlock {
                pos: vec3(r.pos),
                particles: r.spawn_particles,
            },
            "replace_blocks" => Op::ReplaceBlocks {
                block: r.block,
                properties: r.properties,
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                particles: r.spawn_particles,
            },
            "show_section" => Op::ShowSection {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                direction: keyword("direction", r.direction),
            },
            "hide_section" => Op::HideSection {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                direction: keyword("direction", r.direction),
            },
            "show_independent_section" => Op::ShowIndependentSection {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                direction: keyword("direction", r.direction),
                link: r.link_id,
            },
            "show_section_and_merge" => Op::MergeSection {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                direction: keyword("direction", r.direction),
                link: r.link_id,
            },
            "hide_independent_section" => Op::HideIndependentSection {
                link: r.link_id,
                direction: keyword("direction", r.direction),
            },
            "rotate_section" => Op::RotateSection {
                link: r.link_id,
                rot_x: r.rot_x,
                rot_y: r.rot_y,
                rot_z: r.rot_z,
                duration: ticks(r.duration),
            },
            "move_section" => Op::MoveSection {
                link: r.link_id,
                offset: vec3(r.offset),
                duration: ticks(r.duration),
            },
            "modify_block_entity_nbt" => Op::ModifyBlockEntity {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                nbt: r.nbt,
                redraw: r.redraw,
            },
            "create_entity" => Op::CreateEntity {
                entity: r.entity,
                pos: vec3(r.pos),
                yaw: r.yaw,
                pitch: r.pitch,
                look_at: vec3(r.look_at),
            },
            "create_item_entity" => Op::CreateItemEntity {
                item: r.item,
                pos: vec3(r.pos),
                motion: vec3(r.motion),
                count: ticks(r.count),
            },
            "clear_entities" => Op::ClearEntities {
                entity: r.entity,
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                full_scene: r.full_scene,
            },
            "clear_item_entities" => Op::ClearItemEntities {
                item: r.item,
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                full_scene: r.full_scene,
            },
            "show_outline" => Op::ShowOutline {
                color: keyword("color", r.color),
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
                duration: ticks(r.duration),
            },
            "toggle_redstone_power" => Op::ToggleRedstonePower {
                pos: vec3(r.pos),
                pos2: vec3(r.pos2),
            },
            "indicate_redstone" => Op::IndicateRedstone {
                pos: vec3(r.pos),
            },
            "indicate_success" => Op::IndicateSuccess {
                pos: vec3(r.pos),
            },
            "keyframe" => Op::Keyframe,
            "next_scene" => Op::NextScene,
            _ => {
                let mut r = r;
                r.attach_key_frame = false;
                Op::Unknown(Box::new(r))
            }
        };
        Step { keyframe, op }
    }
}

impl From<Value> for Step {
    fn from(v: Value) -> Self {
        match v {
            Value::Object(_) => Step::from(StepRecord::from_value(v)),
            _ => Step::blank(),
        }
    }
}

fn f(n: Option<i32>) -> Option<f64> {
    n.map(f64::from)
}

fn name<T: ToString>(k: Option<T>) -> Option<String> {
    k.map(|k| k.to_string())
}

fn arr<T: Into<[f64; 3]>>(p: Option<T>) -> Option<[f64; 3]> {
    p.map(Into::into)
}

impl From<Step> for StepRecord {
    fn from(step: Step) -> Self {
        let mut r = match step.op {
            Op::Blank => StepRecord::default(),
            Op::Unknown(record) => *record,
            op => {
                let mut r = StepRecord::of_kind(op.kind());
                match op {
                    Op::ShowStructure {
                        structure,
                        height,
                        scale,
                    } => {
                        r.structure = structure;
                        r.height = f(height);
                        r.scale = scale;
                    }
                    Op::Idle { ticks } => r.duration = f(ticks),
                    Op::Text {
                        duration,
                        text,
                        point,
                        color,
                        near_target,
                    } => {
                        r.duration = f(duration);
                        r.text = text;
                        r.point = arr(point);
                        r.color = name(color);
                        r.place_near_target = near_target;
                    }
                    Op::SharedText {
                        duration,
                        key,
                        point,
                        color,
                        near_target,
                    } => {
                        r.duration = f(duration);
                        r.key = key;
                        r.point = arr(point);
                        r.color = name(color);
                        r.place_near_target = near_target;
                    }
                    Op::RotateCamera { degrees } => r.degrees = degrees,
                    Op::ShowControls {
                        duration,
                        point,
                        direction,
                        action,
                        item,
                    } => {
                        r.duration = f(duration);
                        r.point = arr(point);
                        r.direction = name(direction);
                        r.action = name(action);
                        r.item = item;
                    }
                    Op::PlaySound {
                        sound,
                        volume,
                        pitch,
                        source,
                    } => {
                        r.sound = sound;
                        r.volume = volume;
                        r.pitch = pitch;
                        r.source = name(source);
                    }
                    Op::SetBlock {
                        block,
                        properties,
                        pos,
                        pos2,
                        particles,
                    }
                    | Op::ReplaceBlocks {
                        block,
                        properties,
                        pos,
                        pos2,
                        particles,
                    } => {
                        r.block = block;
                        r.properties = properties;
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.spawn_particles = particles;
                    }
                    Op::DestroyBlock { pos, particles } => {
                        r.pos = arr(pos);
                        r.spawn_particles = particles;
                    }
                    Op::ShowSection {
                        pos,
                        pos2,
                        direction,
                    }
                    | Op::HideSection {
                        pos,
                        pos2,
                        direction,
                    } => {
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.direction = name(direction);
                    }
                    Op::ShowIndependentSection {
                        pos,
                        pos2,
                        direction,
                        link,
                    }
                    | Op::MergeSection {
                        pos,
                        pos2,
                        direction,
                        link,
                    } => {
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.direction = name(direction);
                        r.link_id = link;
                    }
                    Op::HideIndependentSection { link, direction } => {
                        r.link_id = link;
                        r.direction = name(direction);
                    }
                    Op::RotateSection {
                        link,
                        rot_x,
                        rot_y,
                        rot_z,
                        duration,
                    } => {
                        r.link_id = link;
                        r.rot_x = rot_x;
                        r.rot_y = rot_y;
                        r.rot_z = rot_z;
                        r.duration = f(duration);
                    }
                    Op::MoveSection {
                        link,
                        offset,
                        duration,
                    } => {
                        r.link_id = link;
                        r.offset = arr(offset);
                        r.duration = f(duration);
                    }
                    Op::ModifyBlockEntity {
                        pos,
                        pos2,
                        nbt,
                        redraw,
                    } => {
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.nbt = nbt;
                        r.redraw = redraw;
                    }
                    Op::CreateEntity {
                        entity,
                        pos,
                        yaw,
                        pitch,
                        look_at,
                    } => {
                        r.entity = entity;
                        r.pos = arr(pos);
                        r.yaw = yaw;
                        r.pitch = pitch;
                        r.look_at = arr(look_at);
                    }
                    Op::CreateItemEntity {
                        item,
                        pos,
                        motion,
                        count,
                    } => {
                        r.item = item;
                        r.pos = arr(pos);
                        r.motion = arr(motion);
                        r.count = f(count);
                    }
                    Op::ClearEntities {
                        entity,
                        pos,
                        pos2,
                        full_scene,
                    } => {
                        r.entity = entity;
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.full_scene = full_scene;
                    }
                    Op::ClearItemEntities {
                        item,
                        pos,
                        pos2,
                        full_scene,
                    } => {
                        r.item = item;
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.full_scene = full_scene;
                    }
                    Op::ShowOutline {
                        color,
                        pos,
                        pos2,
                        duration,
                    } => {
                        r.color = name(color);
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                        r.duration = f(duration);
                    }
                    Op::ToggleRedstonePower { pos, pos2 } => {
                        r.pos = arr(pos);
                        r.pos2 = arr(pos2);
                    }
                    Op::IndicateRedstone { pos } | Op::IndicateSuccess { pos } => {
                        r.pos = arr(pos);
                    }
                    Op::Keyframe | Op::NextScene | Op::Blank | Op::Unknown(_) => {}
                }
                r
            }
        };
        r.attach_key_frame = step.keyframe;
        r
    }
}

impl From<Step> for Option<StepRecord> {
    fn from(step: Step) -> Self {
        if step.is_blank() && !step.keyframe {
            None
        } else {
            Some(StepRecord::from(step))
        }
    }
}
