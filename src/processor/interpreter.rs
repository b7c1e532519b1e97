//! Runs a sanitized segment against a live scene builder.
//!
//! One builder call per step. A step that is missing something it needs is
//! skipped with a warning; the rest of the segment still runs.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::model::{
    BlockPos, BlockState, Direction, IdentError, InputAction, Keyword, Op, Palette,
    ResourceLocation, Segment, Selection, SoundSource, Step, Vec3,
};
use crate::processor::snbt::{self, Nbt, SnbtError};

/// Link-table key for section steps that name no link.
pub const DEFAULT_LINK: &str = "default";
pub const DEFAULT_CAMERA_DEGREES: f64 = 90.0;

/// How a spawned entity is turned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Facing {
    Default,
    Angles { yaw: f64, pitch: f64 },
    LookAt(Vec3),
}

/// Which entities a clear step removes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearScope {
    WholeScene,
    Region(Selection),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextStyle {
    pub color: Option<Palette>,
    pub near_target: bool,
}

/// The scene-building capability a segment is executed against.
///
/// `Section` is whatever the builder hands out for a detached group of
/// blocks; the interpreter only stores and passes it back.
pub trait SceneBuilder {
    type Section;

    fn mark_timeline_point(&mut self);
    fn show_structure(&mut self, height: Option<i32>, scale: Option<f64>);
    fn idle(&mut self, ticks: u32);
    fn show_text(&mut self, duration: u32, text: &str, point: Vec3, style: TextStyle);
    fn show_shared_text(&mut self, duration: u32, key: &str, point: Vec3, style: TextStyle);
    fn rotate_camera_y(&mut self, degrees: f64);
    fn show_controls(
        &mut self,
        duration: u32,
        point: Vec3,
        pointing: Direction,
        action: Option<InputAction>,
        item: Option<&ResourceLocation>,
    );
    fn play_sound(
        &mut self,
        sound: &ResourceLocation,
        source: SoundSource,
        volume: f64,
        pitch: f64,
    );
    fn set_blocks(&mut self, selection: Selection, state: &BlockState, particles: bool);
    fn destroy_block(&mut self, pos: BlockPos, particles: bool);
    fn replace_blocks(&mut self, selection: Selection, state: &BlockState, particles: bool);
    fn show_section(&mut self, selection: Selection, direction: Direction);
    fn hide_section(&mut self, selection: Selection, direction: Direction);
    fn show_independent_section(
        &mut self,
        selection: Selection,
        direction: Direction,
    ) -> Self::Section;
    fn show_section_and_merge(
        &mut self,
        selection: Selection,
        direction: Direction,
        section: &Self::Section,
    );
    fn hide_independent_section(&mut self, section: &Self::Section, direction: Direction);
    fn rotate_section(&mut self, section: &Self::Section, rotation: Vec3, duration: u32);
    fn move_section(&mut self, section: &Self::Section, offset: Vec3, duration: u32);
    fn modify_block_entity_nbt(&mut self, selection: Selection, patch: &Nbt, redraw: bool);
    fn create_entity(&mut self, entity: &ResourceLocation, pos: Vec3, facing: Facing);
    fn create_item_entity(&mut self, item: &ResourceLocation, pos: Vec3, motion: Vec3, count: u32);
    fn clear_entities(&mut self, filter: Option<&ResourceLocation>, scope: ClearScope);
    fn clear_item_entities(&mut self, filter: Option<&ResourceLocation>, scope: ClearScope);
    fn show_outline(&mut self, color: Palette, selection: Selection, duration: u32);
    fn toggle_redstone_power(&mut self, selection: Selection);
    fn indicate_redstone(&mut self, pos: BlockPos);
    fn indicate_success(&mut self, pos: BlockPos);
}

/// Why a single step was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    #[error("missing `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}` `{value}`: {source}")]
    InvalidId {
        field: &'static str,
        value: String,
        #[source]
        source: IdentError,
    },
    #[error("unknown `{field}` value `{value}`")]
    InvalidKeyword { field: &'static str, value: String },
    #[error("invalid data patch: {0}")]
    InvalidPatch(#[from] SnbtError),
    #[error("no section linked as `{0}`")]
    UnknownLink(String),
    #[error("unknown step type `{0}`")]
    UnknownType(String),
    #[error("segment boundary inside a segment")]
    StrayBoundary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepWarning {
    /// Position of the step in its segment.
    pub index: usize,
    pub kind: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecReport {
    /// Steps that produced their builder call.
    pub applied: usize,
    pub warnings: Vec<StepWarning>,
}

/// Executes one segment. The section link table lives only for this call.
pub fn execute<B: SceneBuilder>(segment: &Segment, builder: &mut B) -> ExecReport {
    let mut run = Run {
        builder,
        links: HashMap::new(),
    };
    let mut report = ExecReport::default();

    for (index, step) in segment.steps.iter().enumerate() {
        if step.is_blank() {
            continue;
        }
        if step.keyframe || matches!(step.op, Op::Keyframe) {
            run.builder.mark_timeline_point();
        }
        match run.apply(step) {
            Ok(()) => report.applied += 1,
            Err(reason) => {
                warn!(step = index, kind = step.op.kind(), "skipped: {reason}");
                report.warnings.push(StepWarning {
                    index,
                    kind: step.op.kind().to_string(),
                    reason,
                });
            }
        }
    }
    report
}

fn need<T>(value: Option<T>, field: &'static str) -> Result<T, SkipReason> {
    value.ok_or(SkipReason::MissingField(field))
}

fn id(value: Option<&String>, field: &'static str) -> Result<ResourceLocation, SkipReason> {
    let value = need(value, field)?;
    value.parse().map_err(|source| SkipReason::InvalidId {
        field,
        value: value.clone(),
        source,
    })
}

fn optional_id(
    value: Option<&String>,
    field: &'static str,
) -> Result<Option<ResourceLocation>, SkipReason> {
    value.map(|v| id(Some(v), field)).transpose()
}

fn duration(ticks: Option<i32>) -> Result<u32, SkipReason> {
    Ok(need(ticks, "duration")?.max(0) as u32)
}

fn selection(pos: Option<Vec3>, pos2: Option<Vec3>) -> Result<Selection, SkipReason> {
    need(Selection::from_pair(pos, pos2), "pos")
}

fn block(pos: Option<Vec3>) -> Result<BlockPos, SkipReason> {
    need(pos, "pos").map(BlockPos::from)
}

fn keyword<T: Copy>(
    value: &Option<Keyword<T>>,
    field: &'static str,
) -> Result<Option<T>, SkipReason> {
    value
        .as_ref()
        .map(|k| {
            k.known().map_err(|raw| SkipReason::InvalidKeyword {
                field,
                value: raw.to_string(),
            })
        })
        .transpose()
}

fn link_key(link: &Option<String>) -> &str {
    link.as_deref().unwrap_or(DEFAULT_LINK)
}

fn block_state(
    block: Option<&String>,
    properties: Option<&std::collections::BTreeMap<String, String>>,
) -> Result<BlockState, SkipReason> {
    Ok(BlockState {
        block: id(block, "block")?,
        properties: properties.cloned().unwrap_or_default(),
    })
}

struct Run<'b, B: SceneBuilder> {
    builder: &'b mut B,
    links: HashMap<String, B::Section>,
}

fn linked<'l, S>(
    links: &'l HashMap<String, S>,
    link: &Option<String>,
) -> Result<&'l S, SkipReason> {
    let key = link_key(link);
    links
        .get(key)
        .ok_or_else(|| SkipReason::UnknownLink(key.to_string()))
}

impl<B: SceneBuilder> Run<'_, B> {
    fn apply(&mut self, step: &Step) -> Result<(), SkipReason> {
        let b = &mut *self.builder;
        match &step.op {
            Op::Blank => {}
            Op::ShowStructure { height, scale, .. } => b.show_structure(*height, *scale),
            Op::Idle { ticks } => b.idle(duration(*ticks)?),
            Op::Text {
                duration: d,
                text,
                point,
                color,
                near_target,
            } => {
                let d = duration(*d)?;
                let text = need(text.as_deref(), "text")?;
                let point = need(*point, "point")?;
                let style = TextStyle {
                    color: keyword(color, "color")?,
                    near_target: near_target.unwrap_or(false),
                };
                b.show_text(d, text, point, style);
            }
            Op::SharedText {
                duration: d,
                key,
                point,
                color,
                near_target,
            } => {
                let d = duration(*d)?;
                let key = need(key.as_deref(), "key")?;
                let point = need(*point, "point")?;
                let style = TextStyle {
                    color: keyword(color, "color")?,
                    near_target: near_target.unwrap_or(false),
                };
                b.show_shared_text(d, key, point, style);
            }
            Op::RotateCamera { degrees } => {
                b.rotate_camera_y(degrees.unwrap_or(DEFAULT_CAMERA_DEGREES))
            }
            Op::ShowControls {
                duration: d,
                point,
                direction,
                action,
                item,
            } => {
                let d = duration(*d)?;
                let point = need(*point, "point")?;
                let direction = need(keyword(direction, "direction")?, "direction")?;
                let action = keyword(action, "action")?;
                let item = optional_id(item.as_ref(), "item")?;
                b.show_controls(d, point, direction, action, item.as_ref());
            }
            Op::PlaySound {
                sound,
                volume,
                pitch,
                source,
            } => {
                let sound = id(sound.as_ref(), "sound")?;
                let source = keyword(source, "source")?;
                b.play_sound(
                    &sound,
                    source.unwrap_or(SoundSource::Master),
                    volume.unwrap_or(1.0),
                    pitch.unwrap_or(1.0),
                );
            }
            Op::SetBlock {
                block,
                properties,
                pos,
                pos2,
                particles,
            } => {
                let state = block_state(block.as_ref(), properties.as_ref())?;
                let sel = selection(*pos, *pos2)?;
                b.set_blocks(sel, &state, particles.unwrap_or(true));
            }
            Op::DestroyBlock { pos, particles } => {
                b.destroy_block(block(*pos)?, particles.unwrap_or(true));
            }
            Op::ReplaceBlocks {
                block,
                properties,
                pos,
                pos2,
                particles,
            } => {
                let state = block_state(block.as_ref(), properties.as_ref())?;
                let sel = selection(*pos, *pos2)?;
                b.replace_blocks(sel, &state, particles.unwrap_or(true));
            }
            Op::ShowSection {
                pos,
                pos2,
                direction,
            } => {
                let sel = selection(*pos, *pos2)?;
                let direction = keyword(direction, "direction")?;
                b.show_section(sel, direction.unwrap_or(Direction::Down));
            }
            Op::HideSection {
                pos,
                pos2,
                direction,
            } => {
                let sel = selection(*pos, *pos2)?;
                let direction = keyword(direction, "direction")?;
                b.hide_section(sel, direction.unwrap_or(Direction::Up));
            }
            Op::ShowIndependentSection {
                pos,
                pos2,
                direction,
                link,
            } => {
                let sel = selection(*pos, *pos2)?;
                let direction = need(keyword(direction, "direction")?, "direction")?;
                let section = b.show_independent_section(sel, direction);
                self.links.insert(link_key(link).to_string(), section);
            }
            Op::MergeSection {
                pos,
                pos2,
                direction,
                link,
            } => {
                let sel = selection(*pos, *pos2)?;
                let direction = need(keyword(direction, "direction")?, "direction")?;
                let key = link_key(link);
                match self.links.get(key) {
                    Some(section) => b.show_section_and_merge(sel, direction, section),
                    None => {
                        let section = b.show_independent_section(sel, direction);
                        self.links.insert(key.to_string(), section);
                    }
                }
            }
            Op::HideIndependentSection { link, direction } => {
                let direction = keyword(direction, "direction")?.unwrap_or(Direction::Up);
                let section = linked(&self.links, link)?;
                self.builder.hide_independent_section(section, direction);
            }
            Op::RotateSection {
                link,
                rot_x,
                rot_y,
                rot_z,
                duration: d,
            } => {
                let d = duration(*d)?;
                let rotation = Vec3::new(
                    rot_x.unwrap_or(0.0),
                    rot_y.unwrap_or(0.0),
                    rot_z.unwrap_or(0.0),
                );
                let section = linked(&self.links, link)?;
                self.builder.rotate_section(section, rotation, d);
            }
            Op::MoveSection {
                link,
                offset,
                duration: d,
            } => {
                let d = duration(*d)?;
                let offset = need(*offset, "offset")?;
                let section = linked(&self.links, link)?;
                self.builder.move_section(section, offset, d);
            }
            Op::ModifyBlockEntity {
                pos,
                pos2,
                nbt,
                redraw,
            } => {
                let sel = selection(*pos, *pos2)?;
                let patch = snbt::parse_patch(need(nbt.as_deref(), "nbt")?)?;
                b.modify_block_entity_nbt(sel, &patch, redraw.unwrap_or(false));
            }
            Op::CreateEntity {
                entity,
                pos,
                yaw,
                pitch,
                look_at,
            } => {
                let entity = id(entity.as_ref(), "entity")?;
                let pos = need(*pos, "pos")?;
                let facing = match (look_at, yaw, pitch) {
                    (Some(target), _, _) => Facing::LookAt(*target),
                    (None, None, None) => Facing::Default,
                    (None, yaw, pitch) => Facing::Angles {
                        yaw: yaw.unwrap_or(0.0),
                        pitch: pitch.unwrap_or(0.0),
                    },
                };
                b.create_entity(&entity, pos, facing);
            }
            Op::CreateItemEntity {
                item,
                pos,
                motion,
                count,
            } => {
                let item = id(item.as_ref(), "item")?;
                let pos = need(*pos, "pos")?;
                let count = count.unwrap_or(1).max(1) as u32;
                b.create_item_entity(&item, pos, motion.unwrap_or_default(), count);
            }
            Op::ClearEntities {
                entity,
                pos,
                pos2,
                full_scene,
            } => {
                let filter = optional_id(entity.as_ref(), "entity")?;
                let scope = clear_scope(*pos, *pos2, *full_scene)?;
                b.clear_entities(filter.as_ref(), scope);
            }
            Op::ClearItemEntities {
                item,
                pos,
                pos2,
                full_scene,
            } => {
                let filter = optional_id(item.as_ref(), "item")?;
                let scope = clear_scope(*pos, *pos2, *full_scene)?;
                b.clear_item_entities(filter.as_ref(), scope);
            }
            Op::ShowOutline {
                color,
                pos,
                pos2,
                duration: d,
            } => {
                let d = duration(*d)?;
                let sel = selection(*pos, *pos2)?;
                let color = keyword(color, "color")?.unwrap_or(Palette::White);
                b.show_outline(color, sel, d);
            }
            Op::ToggleRedstonePower { pos, pos2 } => {
                b.toggle_redstone_power(selection(*pos, *pos2)?)
            }
            Op::IndicateRedstone { pos } => b.indicate_redstone(block(*pos)?),
            Op::IndicateSuccess { pos } => b.indicate_success(block(*pos)?),
            // marked by `execute`
            Op::Keyframe => {}
            Op::NextScene => return Err(SkipReason::StrayBoundary),
            Op::Unknown(record) => {
                return Err(SkipReason::UnknownType(
                    record.kind.clone().unwrap_or_default(),
                ));
            }
        }
        Ok(())
    }
}

fn clear_scope(
    pos: Option<Vec3>,
    pos2: Option<Vec3>,
    full_scene: Option<bool>,
) -> Result<ClearScope, SkipReason> {
    if full_scene == Some(true) {
        return Ok(ClearScope::WholeScene);
    }
    Ok(ClearScope::Region(selection(pos, pos2)?))
}
