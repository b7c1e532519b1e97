//! A scene builder that writes down every call instead of building a scene.
//! Backs `--trace` and the interpreter tests.

use crate::model::{
    BlockPos, BlockState, Direction, InputAction, Palette, ResourceLocation, Selection,
    SoundSource, Vec3, fmt_num,
};
use crate::processor::interpreter::{ClearScope, Facing, SceneBuilder, TextStyle};
use crate::processor::snbt::Nbt;

#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: Vec<String>,
    next_section: usize,
}

/// Handle for a detached section: its creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionId(pub usize);

fn style(s: TextStyle) -> String {
    let mut out = String::new();
    if let Some(color) = s.color {
        out.push_str(&format!(", {color}"));
    }
    if s.near_target {
        out.push_str(", near_target");
    }
    out
}

fn scope(s: ClearScope) -> String {
    match s {
        ClearScope::WholeScene => "scene".to_string(),
        ClearScope::Region(sel) => sel.to_string(),
    }
}

fn filter(f: Option<&ResourceLocation>) -> String {
    f.map_or_else(|| "*".to_string(), ToString::to_string)
}

impl Recorder {
    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

impl SceneBuilder for Recorder {
    type Section = SectionId;

    fn mark_timeline_point(&mut self) {
        self.push("mark_timeline_point()".into());
    }

    fn show_structure(&mut self, height: Option<i32>, scale: Option<f64>) {
        let mut args = Vec::new();
        if let Some(h) = height {
            args.push(format!("height={h}"));
        }
        if let Some(s) = scale {
            args.push(format!("scale={}", fmt_num(s)));
        }
        self.push(format!("show_structure({})", args.join(", ")));
    }

    fn idle(&mut self, ticks: u32) {
        self.push(format!("idle({ticks})"));
    }

    fn show_text(&mut self, duration: u32, text: &str, point: Vec3, s: TextStyle) {
        self.push(format!("show_text({duration}, {text:?}, [{point}]{})", style(s)));
    }

    fn show_shared_text(&mut self, duration: u32, key: &str, point: Vec3, s: TextStyle) {
        self.push(format!("show_shared_text({duration}, {key}, [{point}]{})", style(s)));
    }

    fn rotate_camera_y(&mut self, degrees: f64) {
        self.push(format!("rotate_camera_y({})", fmt_num(degrees)));
    }

    fn show_controls(
        &mut self,
        duration: u32,
        point: Vec3,
        pointing: Direction,
        action: Option<InputAction>,
        item: Option<&ResourceLocation>,
    ) {
        let action = action.map_or("none", InputAction::as_str);
        self.push(format!(
            "show_controls({duration}, [{point}], {pointing}, {action}, {})",
            filter(item)
        ));
    }

    fn play_sound(
        &mut self,
        sound: &ResourceLocation,
        source: SoundSource,
        volume: f64,
        pitch: f64,
    ) {
        self.push(format!(
            "play_sound({sound}, {source}, {}, {})",
            fmt_num(volume),
            fmt_num(pitch)
        ));
    }

    fn set_blocks(&mut self, selection: Selection, state: &BlockState, particles: bool) {
        self.push(format!("set_blocks({selection}, {state}, particles={particles})"));
    }

    fn destroy_block(&mut self, pos: BlockPos, particles: bool) {
        self.push(format!("destroy_block([{pos}], particles={particles})"));
    }

    fn replace_blocks(&mut self, selection: Selection, state: &BlockState, particles: bool) {
        self.push(format!("replace_blocks({selection}, {state}, particles={particles})"));
    }

    fn show_section(&mut self, selection: Selection, direction: Direction) {
        self.push(format!("show_section({selection}, {direction})"));
    }

    fn hide_section(&mut self, selection: Selection, direction: Direction) {
        self.push(format!("hide_section({selection}, {direction})"));
    }

    fn show_independent_section(
        &mut self,
        selection: Selection,
        direction: Direction,
    ) -> SectionId {
        let id = SectionId(self.next_section);
        self.next_section += 1;
        self.push(format!(
            "show_independent_section({selection}, {direction}) -> #{}",
            id.0
        ));
        id
    }

    fn show_section_and_merge(
        &mut self,
        selection: Selection,
        direction: Direction,
        section: &SectionId,
    ) {
        self.push(format!(
            "show_section_and_merge({selection}, {direction}, #{})",
            section.0
        ));
    }

    fn hide_independent_section(&mut self, section: &SectionId, direction: Direction) {
        self.push(format!("hide_independent_section(#{}, {direction})", section.0));
    }

    fn rotate_section(&mut self, section: &SectionId, rotation: Vec3, duration: u32) {
        self.push(format!("rotate_section(#{}, [{rotation}], {duration})", section.0));
    }

    fn move_section(&mut self, section: &SectionId, offset: Vec3, duration: u32) {
        self.push(format!("move_section(#{}, [{offset}], {duration})", section.0));
    }

    fn modify_block_entity_nbt(&mut self, selection: Selection, patch: &Nbt, redraw: bool) {
        self.push(format!(
            "modify_block_entity_nbt({selection}, {patch}, redraw={redraw})"
        ));
    }

    fn create_entity(&mut self, entity: &ResourceLocation, pos: Vec3, facing: Facing) {
        let facing = match facing {
            Facing::Default => String::new(),
            Facing::Angles { yaw, pitch } => {
                format!(", yaw={}, pitch={}", fmt_num(yaw), fmt_num(pitch))
            }
            Facing::LookAt(target) => format!(", look_at=[{target}]"),
        };
        self.push(format!("create_entity({entity}, [{pos}]{facing})"));
    }

    fn create_item_entity(&mut self, item: &ResourceLocation, pos: Vec3, motion: Vec3, count: u32) {
        self.push(format!(
            "create_item_entity({item} x{count}, [{pos}], motion=[{motion}])"
        ));
    }

    fn clear_entities(&mut self, f: Option<&ResourceLocation>, s: ClearScope) {
        self.push(format!("clear_entities({}, {})", filter(f), scope(s)));
    }

    fn clear_item_entities(&mut self, f: Option<&ResourceLocation>, s: ClearScope) {
        self.push(format!("clear_item_entities({}, {})", filter(f), scope(s)));
    }

    fn show_outline(&mut self, color: Palette, selection: Selection, duration: u32) {
        self.push(format!("show_outline({color}, {selection}, {duration})"));
    }

    fn toggle_redstone_power(&mut self, selection: Selection) {
        self.push(format!("toggle_redstone_power({selection})"));
    }

    fn indicate_redstone(&mut self, pos: BlockPos) {
        self.push(format!("indicate_redstone([{pos}])"));
    }

    fn indicate_success(&mut self, pos: BlockPos) {
        self.push(format!("indicate_success([{pos}])"));
    }
}
