//! Emits a segment as KubeJS Ponder script lines.
//!
//! Every step produces at least one line. Steps the script surface cannot
//! express, and steps missing something they need, come out as tagged
//! comments so a reader of the generated file still sees them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::model::{
    BlockPos, BlockState, Direction, IdentError, InputAction, Keyword, Op, Palette,
    ResourceLocation, Segment, Selection, SoundSource, Step, Vec3, fmt_num,
};
use crate::processor::interpreter::{DEFAULT_CAMERA_DEGREES, DEFAULT_LINK};
use crate::processor::snbt;

pub const UNSUPPORTED_TAG: &str = "[unsupported]";
/// Ticks per second; waits that are whole seconds use `idleSeconds`.
pub const TICKS_PER_SECOND: i32 = 20;

/// Why a step could not be emitted as a call.
#[derive(Debug, Clone, PartialEq)]
enum Gap {
    Missing(&'static str),
    Invalid(&'static str, String),
    Unlinked(String),
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Missing(field) => write!(f, "[missing {field}]"),
            Gap::Invalid(field, why) => write!(f, "[invalid {field}: {why}]"),
            Gap::Unlinked(link) => write!(f, "[unlinked {link}]"),
        }
    }
}

/// Emits every step of `segment`, one context per call.
pub fn emit(segment: &Segment) -> Vec<String> {
    let mut ctx = EmitContext::default();
    let mut out = Vec::new();
    for step in &segment.steps {
        ctx.emit_step(step, &mut out);
    }
    out
}

/// String literal with `\` and `"` escaped.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '\\' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn vec3(v: Vec3) -> String {
    format!("[{}, {}, {}]", fmt_num(v.x), fmt_num(v.y), fmt_num(v.z))
}

fn pos(p: BlockPos) -> String {
    format!("[{}, {}, {}]", p.x, p.y, p.z)
}

fn select(sel: Selection) -> String {
    match sel {
        Selection::Single(p) => format!("util.select.position({}, {}, {})", p.x, p.y, p.z),
        Selection::Range(a, b) => format!(
            "util.select.fromTo({}, {}, {}, {}, {}, {})",
            a.x, a.y, a.z, b.x, b.y, b.z
        ),
    }
}

fn direction(d: Direction) -> String {
    format!("Direction.{}", d.as_str().to_ascii_uppercase())
}

fn palette(p: Palette) -> String {
    format!("PonderPalette.{}", p.as_str().to_ascii_uppercase())
}

/// Variable name for a user link id. The `sec_` prefix keeps these apart
/// from synthesized `linkN` names and from `scene`, `util` and keywords.
fn user_var(link: &str) -> String {
    let tail: String = link
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    format!("sec_{tail}")
}

fn need<T>(value: Option<T>, field: &'static str) -> Result<T, Gap> {
    value.ok_or(Gap::Missing(field))
}

fn id(value: Option<&String>, field: &'static str) -> Result<ResourceLocation, Gap> {
    need(value, field)?
        .parse()
        .map_err(|e: IdentError| Gap::Invalid(field, e.to_string()))
}

fn optional_id(
    value: Option<&String>,
    field: &'static str,
) -> Result<Option<ResourceLocation>, Gap> {
    value.map(|v| id(Some(v), field)).transpose()
}

fn keyword<T: Copy>(value: &Option<Keyword<T>>, field: &'static str) -> Result<Option<T>, Gap> {
    value
        .as_ref()
        .map(|k| {
            k.known()
                .map_err(|raw| Gap::Invalid(field, format!("unknown value `{raw}`")))
        })
        .transpose()
}

fn ticks(value: Option<i32>) -> Result<i32, Gap> {
    Ok(need(value, "duration")?.max(0))
}

fn selection(p: Option<Vec3>, p2: Option<Vec3>) -> Result<Selection, Gap> {
    need(Selection::from_pair(p, p2), "pos")
}

fn block(p: Option<Vec3>) -> Result<BlockPos, Gap> {
    need(p, "pos").map(BlockPos::from)
}

fn block_state(
    block: Option<&String>,
    properties: Option<&BTreeMap<String, String>>,
) -> Result<BlockState, Gap> {
    Ok(BlockState {
        block: id(block, "block")?,
        properties: properties.cloned().unwrap_or_default(),
    })
}

fn text_tail(color: Option<Palette>, near_target: Option<bool>) -> String {
    let mut tail = String::new();
    if let Some(c) = color {
        tail.push_str(&format!(".colored({})", palette(c)));
    }
    if near_target == Some(true) {
        tail.push_str(".placeNearTarget()");
    }
    tail
}

/// Link naming state for one emission pass.
#[derive(Debug, Default)]
pub struct EmitContext {
    /// Last synthesized `linkN`.
    counter: usize,
    /// Link key -> variable currently holding that section.
    bound: HashMap<String, String>,
    /// User link id -> its variable, fixed for the whole pass.
    named: HashMap<String, String>,
    declared: HashSet<String>,
}

impl EmitContext {
    pub fn emit_step(&mut self, step: &Step, out: &mut Vec<String>) {
        if step.is_blank() {
            return;
        }
        if step.keyframe || matches!(step.op, Op::Keyframe) {
            out.push("scene.addKeyframe();".to_string());
        }
        let kind = step.op.kind();
        match self.lower(&step.op) {
            Ok(lines) => out.extend(lines),
            Err(gap) => out.push(format!("// {gap} {kind}")),
        }
    }

    fn synthesize(&mut self) -> String {
        self.counter += 1;
        format!("link{}", self.counter)
    }

    /// The variable for a user link. Ids that sanitize to the same name
    /// get `_2`, `_3`, .. suffixes in order of first use.
    fn named(&mut self, link: &str) -> String {
        if let Some(name) = self.named.get(link) {
            return name.clone();
        }
        let base = user_var(link);
        let mut name = base.clone();
        let mut n = 1;
        while self.named.values().any(|taken| *taken == name) {
            n += 1;
            name = format!("{base}_{n}");
        }
        self.named.insert(link.to_string(), name.clone());
        name
    }

    /// Binds a detached section to a variable and returns the assignment
    /// prefix (`let x = ` the first time, `x = ` after).
    fn bind(&mut self, link: &Option<String>) -> String {
        let (key, name) = match link {
            Some(l) => (l.clone(), self.named(l)),
            None => (DEFAULT_LINK.to_string(), self.synthesize()),
        };
        self.bound.insert(key, name.clone());
        if self.declared.insert(name.clone()) {
            format!("let {name} = ")
        } else {
            format!("{name} = ")
        }
    }

    fn lookup(&self, link: &Option<String>) -> Result<String, Gap> {
        let key = link.as_deref().unwrap_or(DEFAULT_LINK);
        self.bound
            .get(key)
            .cloned()
            .ok_or_else(|| Gap::Unlinked(key.to_string()))
    }

    fn lower(&mut self, op: &Op) -> Result<Vec<String>, Gap> {
        let line = match op {
            Op::Blank => return Ok(Vec::new()),
            Op::ShowStructure { height, scale, .. } => {
                let mut lines = vec![match height {
                    Some(h) => format!("scene.showStructure({h});"),
                    None => "scene.showStructure();".to_string(),
                }];
                if let Some(s) = scale {
                    lines.push(format!("scene.scaleSceneView({});", fmt_num(*s)));
                }
                return Ok(lines);
            }
            Op::Idle { ticks: t } => {
                let t = ticks(*t)?;
                if t > 0 && t % TICKS_PER_SECOND == 0 {
                    format!("scene.idleSeconds({});", t / TICKS_PER_SECOND)
                } else {
                    format!("scene.idle({t});")
                }
            }
            Op::Text {
                duration,
                text,
                point,
                color,
                near_target,
            } => {
                let d = ticks(*duration)?;
                let text = need(text.as_deref(), "text")?;
                let point = need(*point, "point")?;
                format!(
                    "scene.text({d}, {}, {}){};",
                    quote(text),
                    vec3(point),
                    text_tail(keyword(color, "color")?, *near_target)
                )
            }
            Op::SharedText {
                duration,
                key,
                point,
                color,
                near_target,
            } => {
                let d = ticks(*duration)?;
                let key = need(key.as_deref(), "key")?;
                let point = need(*point, "point")?;
                format!(
                    "scene.sharedText({d}, {}, {}){};",
                    quote(key),
                    vec3(point),
                    text_tail(keyword(color, "color")?, *near_target)
                )
            }
            Op::RotateCamera { degrees } => format!(
                "scene.rotateCameraY({});",
                fmt_num(degrees.unwrap_or(DEFAULT_CAMERA_DEGREES))
            ),
            Op::ShowControls {
                duration,
                point,
                direction: pointing,
                action,
                item,
            } => {
                let d = ticks(*duration)?;
                let point = need(*point, "point")?;
                let pointing = need(keyword(pointing, "direction")?, "direction")?;
                let action = keyword(action, "action")?;
                let item = optional_id(item.as_ref(), "item")?;
                let mut line = format!(
                    "scene.showControls({d}, {}, {})",
                    vec3(point),
                    quote(pointing.as_str())
                );
                match action {
                    Some(InputAction::LeftClick) => line.push_str(".leftClick()"),
                    Some(InputAction::RightClick) => line.push_str(".rightClick()"),
                    Some(InputAction::Scroll) => line.push_str(".scroll()"),
                    None => {}
                }
                if let Some(item) = item {
                    line.push_str(&format!(".withItem({})", quote(&item.to_string())));
                }
                line.push(';');
                line
            }
            Op::PlaySound {
                sound,
                volume,
                pitch,
                source,
            } => {
                let sound = id(sound.as_ref(), "sound")?;
                let source = keyword(source, "source")?;
                format!(
                    "scene.playSound({}, {}, {}, {});",
                    quote(&sound.to_string()),
                    quote(source.unwrap_or(SoundSource::Master).as_str()),
                    fmt_num(volume.unwrap_or(1.0)),
                    fmt_num(pitch.unwrap_or(1.0))
                )
            }
            Op::SetBlock {
                block,
                properties,
                pos: p,
                pos2,
                particles,
            } => {
                let state = block_state(block.as_ref(), properties.as_ref())?;
                let particles = particles.unwrap_or(true);
                match selection(*p, *pos2)? {
                    Selection::Single(p) => format!(
                        "scene.world.setBlock({}, {}, {particles});",
                        pos(p),
                        quote(&state.to_string())
                    ),
                    range => format!(
                        "scene.world.setBlocks({}, {}, {particles});",
                        select(range),
                        quote(&state.to_string())
                    ),
                }
            }
            Op::DestroyBlock { pos: p, particles } => {
                let p = block(*p)?;
                if particles.unwrap_or(true) {
                    format!("scene.world.destroyBlock({});", pos(p))
                } else {
                    format!("scene.world.setBlock({}, \"minecraft:air\", false);", pos(p))
                }
            }
            Op::ReplaceBlocks {
                block,
                properties,
                pos: p,
                pos2,
                particles,
            } => {
                let state = block_state(block.as_ref(), properties.as_ref())?;
                let sel = selection(*p, *pos2)?;
                format!(
                    "scene.world.replaceBlocks({}, {}, {});",
                    select(sel),
                    quote(&state.to_string()),
                    particles.unwrap_or(true)
                )
            }
            Op::ShowSection {
                pos: p,
                pos2,
                direction: d,
            } => format!(
                "scene.world.showSection({}, {});",
                select(selection(*p, *pos2)?),
                direction(keyword(d, "direction")?.unwrap_or(Direction::Down))
            ),
            Op::HideSection {
                pos: p,
                pos2,
                direction: d,
            } => format!(
                "scene.world.hideSection({}, {});",
                select(selection(*p, *pos2)?),
                direction(keyword(d, "direction")?.unwrap_or(Direction::Up))
            ),
            Op::ShowIndependentSection {
                pos: p,
                pos2,
                direction: d,
                link,
            } => {
                let sel = selection(*p, *pos2)?;
                let d = need(keyword(d, "direction")?, "direction")?;
                format!(
                    "{}scene.world.showIndependentSection({}, {});",
                    self.bind(link),
                    select(sel),
                    direction(d)
                )
            }
            Op::MergeSection {
                pos: p,
                pos2,
                direction: d,
                link,
            } => {
                let sel = selection(*p, *pos2)?;
                let d = need(keyword(d, "direction")?, "direction")?;
                match self.lookup(link) {
                    Ok(name) => format!(
                        "scene.world.showSectionAndMerge({}, {}, {name});",
                        select(sel),
                        direction(d)
                    ),
                    Err(_) => format!(
                        "{}scene.world.showIndependentSection({}, {});",
                        self.bind(link),
                        select(sel),
                        direction(d)
                    ),
                }
            }
            Op::HideIndependentSection {
                link,
                direction: d,
            } => format!(
                "scene.world.hideIndependentSection({}, {});",
                self.lookup(link)?,
                direction(keyword(d, "direction")?.unwrap_or(Direction::Up))
            ),
            Op::RotateSection {
                link,
                rot_x,
                rot_y,
                rot_z,
                duration,
            } => {
                let d = ticks(*duration)?;
                format!(
                    "scene.world.rotateSection({}, {}, {}, {}, {d});",
                    self.lookup(link)?,
                    fmt_num(rot_x.unwrap_or(0.0)),
                    fmt_num(rot_y.unwrap_or(0.0)),
                    fmt_num(rot_z.unwrap_or(0.0))
                )
            }
            Op::MoveSection {
                link,
                offset,
                duration,
            } => {
                let d = ticks(*duration)?;
                let offset = need(*offset, "offset")?;
                format!(
                    "scene.world.moveSection({}, {}, {d});",
                    self.lookup(link)?,
                    vec3(offset)
                )
            }
            Op::ModifyBlockEntity {
                pos: p,
                pos2,
                nbt,
                redraw,
            } => {
                let sel = selection(*p, *pos2)?;
                let patch = snbt::parse_patch(need(nbt.as_deref(), "nbt")?)
                    .map_err(|e| Gap::Invalid("nbt", e.to_string()))?;
                format!(
                    "scene.world.modifyBlockEntityNBT({}, {}, (nbt) => {{ nbt.merge(NBT.toTagCompound({})); }});",
                    select(sel),
                    redraw.unwrap_or(false),
                    quote(&patch.to_string())
                )
            }
            Op::CreateEntity {
                entity,
                pos: p,
                yaw,
                pitch,
                look_at,
            } => {
                let entity = id(entity.as_ref(), "entity")?;
                let p = need(*p, "pos")?;
                let head = format!(
                    "scene.world.createEntity({}, {}",
                    quote(&entity.to_string()),
                    vec3(p)
                );
                match (look_at, yaw, pitch) {
                    (Some(target), _, _) => format!(
                        "{head}, (e) => {{ e.lookAt(\"feet\", {}); }});",
                        vec3(*target)
                    ),
                    (None, None, None) => format!("{head});"),
                    (None, yaw, pitch) => format!(
                        "{head}, (e) => {{ e.setYRot({}); e.setXRot({}); }});",
                        fmt_num(yaw.unwrap_or(0.0)),
                        fmt_num(pitch.unwrap_or(0.0))
                    ),
                }
            }
            Op::CreateItemEntity {
                item,
                pos: p,
                motion,
                count,
            } => {
                let item = id(item.as_ref(), "item")?;
                let p = need(*p, "pos")?;
                let m = motion.unwrap_or_default();
                format!(
                    "scene.world.createItemEntity({}, util.vector.of({}, {}, {}), Item.of({}, {}));",
                    vec3(p),
                    fmt_num(m.x),
                    fmt_num(m.y),
                    fmt_num(m.z),
                    quote(&item.to_string()),
                    count.unwrap_or(1).max(1)
                )
            }
            Op::ClearEntities {
                entity,
                pos: p,
                pos2,
                full_scene,
            } => {
                let filter = optional_id(entity.as_ref(), "entity")?;
                clear_line("removeEntities", filter, *p, *pos2, *full_scene)?
            }
            Op::ClearItemEntities {
                item,
                pos: p,
                pos2,
                full_scene,
            } => {
                let filter = optional_id(item.as_ref(), "item")?;
                clear_line("removeItems", filter, *p, *pos2, *full_scene)?
            }
            Op::ShowOutline {
                color,
                pos: p,
                pos2,
                duration,
            } => {
                let d = ticks(*duration)?;
                let sel = selection(*p, *pos2)?;
                let color = keyword(color, "color")?.unwrap_or(Palette::White);
                format!(
                    "scene.overlay.showOutline({}, \"outline\", {}, {d});",
                    palette(color),
                    select(sel)
                )
            }
            Op::ToggleRedstonePower { pos: p, pos2 } => format!(
                "// {UNSUPPORTED_TAG} scene.world.toggleRedstonePower({});",
                select(selection(*p, *pos2)?)
            ),
            Op::IndicateRedstone { pos: p } => format!(
                "// {UNSUPPORTED_TAG} scene.effects.indicateRedstone({});",
                pos(block(*p)?)
            ),
            Op::IndicateSuccess { pos: p } => format!(
                "// {UNSUPPORTED_TAG} scene.effects.indicateSuccess({});",
                pos(block(*p)?)
            ),
            // marked by `emit_step`
            Op::Keyframe => return Ok(Vec::new()),
            Op::NextScene => "// [segment boundary]".to_string(),
            Op::Unknown(record) => format!(
                "// [unknown] step type {}",
                quote(record.kind.as_deref().unwrap_or(""))
            ),
        };
        Ok(vec![line])
    }
}

fn clear_line(
    method: &str,
    filter: Option<ResourceLocation>,
    p: Option<Vec3>,
    p2: Option<Vec3>,
    full_scene: Option<bool>,
) -> Result<String, Gap> {
    let filter = filter.map(|f| quote(&f.to_string()));
    if full_scene == Some(true) {
        return Ok(match filter {
            Some(f) => format!("scene.world.{method}({f});"),
            None => format!("scene.world.{method}();"),
        });
    }
    let sel = select(selection(p, p2)?);
    Ok(match filter {
        Some(f) => format!("scene.world.{method}Inside({sel}, {f});"),
        None => format!("scene.world.{method}Inside({sel});"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detach(link: Option<&str>) -> Step {
        Step::new(Op::ShowIndependentSection {
            pos: Some(Vec3::new(1.0, 1.0, 1.0)),
            pos2: Some(Vec3::new(1.0, 2.0, 1.0)),
            direction: Some(Direction::Down.into()),
            link: link.map(Into::into),
        })
    }

    fn lines(steps: Vec<Step>) -> Vec<String> {
        emit(&Segment::new(steps))
    }

    #[test]
    fn test_idle_forms() {
        assert_eq!(
            lines(vec![Step::idle(40), Step::idle(30), Step::idle(0), Step::idle(-4)]),
            vec![
                "scene.idleSeconds(2);",
                "scene.idle(30);",
                "scene.idle(0);",
                "scene.idle(0);",
            ]
        );
    }

    #[test]
    fn test_numbers_drop_integral_fraction() {
        let out = lines(vec![
            Step::new(Op::RotateCamera { degrees: Some(2.0) }),
            Step::new(Op::RotateCamera { degrees: Some(2.5) }),
            Step::new(Op::MoveSection {
                link: Some("a".into()),
                offset: Some(Vec3::new(2.0, 0.5, -1.0)),
                duration: Some(10),
            }),
        ]);
        assert_eq!(out[0], "scene.rotateCameraY(2);");
        assert_eq!(out[1], "scene.rotateCameraY(2.5);");
        assert_eq!(out[2], "// [unlinked a] move_section");
    }

    #[test]
    fn test_auto_link_names_are_deterministic() {
        let segment = Segment::new(vec![
            detach(None),
            detach(Some("gear")),
            detach(None),
            Step::new(Op::MoveSection {
                link: None,
                offset: Some(Vec3::new(0.0, 1.0, 0.0)),
                duration: Some(20),
            }),
        ]);
        let expected = vec![
            "let link1 = scene.world.showIndependentSection(util.select.fromTo(1, 1, 1, 1, 2, 1), Direction.DOWN);",
            "let sec_gear = scene.world.showIndependentSection(util.select.fromTo(1, 1, 1, 1, 2, 1), Direction.DOWN);",
            "let link2 = scene.world.showIndependentSection(util.select.fromTo(1, 1, 1, 1, 2, 1), Direction.DOWN);",
            "scene.world.moveSection(link2, [0, 1, 0], 20);",
        ];
        assert_eq!(emit(&segment), expected);
        assert_eq!(emit(&segment), expected);
    }

    #[test]
    fn test_redetach_reassigns() {
        let out = lines(vec![detach(Some("x-1")), detach(Some("x-1"))]);
        assert!(out[0].starts_with("let sec_x_1 = "));
        assert!(out[1].starts_with("sec_x_1 = "));
    }

    #[test]
    fn test_merge_into_known_and_unknown_link() {
        let merge = |link: &str| {
            Step::new(Op::MergeSection {
                pos: Some(Vec3::new(0.0, 1.0, 0.0)),
                pos2: None,
                direction: Some(Direction::West.into()),
                link: Some(link.into()),
            })
        };
        let out = lines(vec![detach(Some("a")), merge("a"), merge("b")]);
        assert_eq!(
            out[1],
            "scene.world.showSectionAndMerge(util.select.position(0, 1, 0), Direction.WEST, sec_a);"
        );
        assert_eq!(
            out[2],
            "let sec_b = scene.world.showIndependentSection(util.select.position(0, 1, 0), Direction.WEST);"
        );
    }

    #[test]
    fn test_single_vs_range_forms() {
        let set = |pos2: [f64; 3]| {
            Step::new(Op::SetBlock {
                block: Some("minecraft:lever".into()),
                properties: Some(BTreeMap::from([("powered".into(), "true".into())])),
                pos: Some(Vec3::new(1.0, 1.0, 1.0)),
                pos2: Some(Vec3::from(pos2)),
                particles: Some(false),
            })
        };
        assert_eq!(
            lines(vec![set([1.0, 1.0, 1.0]), set([3.0, 1.0, 1.0])]),
            vec![
                "scene.world.setBlock([1, 1, 1], \"minecraft:lever[powered=true]\", false);",
                "scene.world.setBlocks(util.select.fromTo(1, 1, 1, 3, 1, 1), \"minecraft:lever[powered=true]\", false);",
            ]
        );
    }

    #[test]
    fn test_unsupported_and_missing_become_comments() {
        let out = lines(vec![
            Step::new(Op::ToggleRedstonePower {
                pos: Some(Vec3::new(2.0, 1.0, 2.0)),
                pos2: None,
            }),
            Step::new(Op::IndicateSuccess {
                pos: Some(Vec3::new(0.0, 0.0, 0.0)),
            }),
            Step::new(Op::IndicateRedstone { pos: None }),
            Step::new(Op::Text {
                duration: Some(60),
                text: None,
                point: None,
                color: None,
                near_target: None,
            }),
            Step::idle(5),
        ]);
        assert_eq!(
            out,
            vec![
                "// [unsupported] scene.world.toggleRedstonePower(util.select.position(2, 1, 2));",
                "// [unsupported] scene.effects.indicateSuccess([0, 0, 0]);",
                "// [missing pos] indicate_redstone",
                "// [missing text] text",
                "scene.idle(5);",
            ]
        );
    }

    #[test]
    fn test_text_escaping_and_tail() {
        let mut step = Step::new(Op::Text {
            duration: Some(60),
            text: Some("Say \"hi\" \\ bye\n".into()),
            point: Some(Vec3::new(2.5, 2.0, 1.0)),
            color: Some(Palette::Green.into()),
            near_target: Some(true),
        });
        step.keyframe = true;
        assert_eq!(
            lines(vec![step]),
            vec![
                "scene.addKeyframe();",
                "scene.text(60, \"Say \\\"hi\\\" \\\\ bye\n\", [2.5, 2, 1]).colored(PonderPalette.GREEN).placeNearTarget();",
            ]
        );
    }

    #[test]
    fn test_nbt_patch() {
        let patch = |nbt: &str| {
            Step::new(Op::ModifyBlockEntity {
                pos: Some(Vec3::new(1.0, 1.0, 1.0)),
                pos2: None,
                nbt: Some(nbt.into()),
                redraw: Some(true),
            })
        };
        let out = lines(vec![patch("{Lit: 1b}"), patch("{Lit")]);
        assert_eq!(
            out[0],
            "scene.world.modifyBlockEntityNBT(util.select.position(1, 1, 1), true, (nbt) => { nbt.merge(NBT.toTagCompound(\"{Lit:1b}\")); });"
        );
        assert!(out[1].starts_with("// [invalid nbt: "));
        assert!(out[1].ends_with(" modify_block_entity_nbt"));
    }

    #[test]
    fn test_clear_forms() {
        let out = lines(vec![
            Step::new(Op::ClearEntities {
                entity: None,
                pos: Some(Vec3::new(9.0, 9.0, 9.0)),
                pos2: None,
                full_scene: Some(true),
            }),
            Step::new(Op::ClearItemEntities {
                item: Some("minecraft:apple".into()),
                pos: Some(Vec3::new(0.0, 1.0, 0.0)),
                pos2: Some(Vec3::new(4.0, 1.0, 4.0)),
                full_scene: None,
            }),
        ]);
        assert_eq!(
            out,
            vec![
                "scene.world.removeEntities();",
                "scene.world.removeItemsInside(util.select.fromTo(0, 1, 0, 4, 1, 4), \"minecraft:apple\");",
            ]
        );
    }

    #[test]
    fn test_user_links_never_share_a_variable() {
        let out = lines(vec![
            detach(None),
            detach(Some("link1")),
            detach(Some("a-b")),
            detach(Some("a_b")),
            detach(Some("scene")),
            Step::new(Op::MoveSection {
                link: None,
                offset: Some(Vec3::new(0.0, 1.0, 0.0)),
                duration: Some(10),
            }),
            Step::new(Op::MoveSection {
                link: Some("a-b".into()),
                offset: Some(Vec3::new(0.0, 1.0, 0.0)),
                duration: Some(10),
            }),
        ]);
        let heads: Vec<&str> = out[..5]
            .iter()
            .map(|l| l.split(" = ").next().unwrap_or_default())
            .collect();
        assert_eq!(
            heads,
            [
                "let link1",
                "let sec_link1",
                "let sec_a_b",
                "let sec_a_b_2",
                "let sec_scene"
            ]
        );
        assert_eq!(out[5], "scene.world.moveSection(link1, [0, 1, 0], 10);");
        assert_eq!(out[6], "scene.world.moveSection(sec_a_b, [0, 1, 0], 10);");
    }

    #[test]
    fn test_unknown_keywords_and_fractional_blocks() {
        let test_cases = vec![
            (
                Step::new(Op::ShowOutline {
                    color: Some(Keyword::Raw("purple".into())),
                    pos: Some(Vec3::new(0.0, 0.0, 0.0)),
                    pos2: None,
                    duration: Some(20),
                }),
                "// [invalid color: unknown value `purple`] show_outline",
            ),
            (
                Step::new(Op::ShowSection {
                    pos: Some(Vec3::new(0.0, 0.0, 0.0)),
                    pos2: None,
                    direction: Some(Keyword::Raw("sideways".into())),
                }),
                "// [invalid direction: unknown value `sideways`] show_section",
            ),
            (
                Step::new(Op::DestroyBlock {
                    pos: Some(Vec3::new(1.5, 2.0, -0.5)),
                    particles: None,
                }),
                "scene.world.destroyBlock([1, 2, -1]);",
            ),
        ];
        for (step, expected) in test_cases {
            assert_eq!(lines(vec![step]), vec![expected]);
        }
    }

    #[test]
    fn test_keyframe_marks_once() {
        let mut flagged = Step::new(Op::Keyframe);
        flagged.keyframe = true;
        let mut blank = Step::blank();
        blank.keyframe = true;
        assert_eq!(
            lines(vec![Step::new(Op::Keyframe), flagged, blank]),
            vec!["scene.addKeyframe();", "scene.addKeyframe();"]
        );
    }
}
