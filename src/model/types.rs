//! Small value types shared by the step model and both backends.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ident::ResourceLocation;

/// Declares a closed keyword enum with its storage spelling.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                match lower.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("unknown {} `{s}`", stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(
    /// Edge a section slides in from / out to, or the side an input hint points at.
    Direction {
        Down => "down",
        Up => "up",
        North => "north",
        South => "south",
        West => "west",
        East => "east",
    }
);

keyword_enum!(
    /// Overlay colours understood by the scene renderer.
    Palette {
        White => "white",
        Black => "black",
        Red => "red",
        Green => "green",
        Blue => "blue",
        Slow => "slow",
        Medium => "medium",
        Fast => "fast",
        Input => "input",
        Output => "output",
    }
);

keyword_enum!(
    SoundSource {
        Master => "master",
        Music => "music",
        Record => "record",
        Weather => "weather",
        Block => "block",
        Hostile => "hostile",
        Neutral => "neutral",
        Player => "player",
        Ambient => "ambient",
        Voice => "voice",
    }
);

keyword_enum!(
    /// What the input hint asks the player to do.
    InputAction {
        LeftClick => "left_click",
        RightClick => "right_click",
        Scroll => "scroll",
    }
);

/// A keyword field as written. Spellings that name no variant are kept
/// as-is so they survive a save; the backends reject them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword<T> {
    Known(T),
    Raw(String),
}

impl<T: FromStr> Keyword<T> {
    pub fn parse(s: &str) -> Self {
        s.parse()
            .map_or_else(|_| Keyword::Raw(s.to_string()), Keyword::Known)
    }
}

impl<T: Copy> Keyword<T> {
    /// The variant, or the unrecognized spelling.
    pub fn known(&self) -> Result<T, &str> {
        match self {
            Keyword::Known(v) => Ok(*v),
            Keyword::Raw(s) => Err(s),
        }
    }
}

impl<T> From<T> for Keyword<T> {
    fn from(v: T) -> Self {
        Keyword::Known(v)
    }
}

impl<T: fmt::Display> fmt::Display for Keyword<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Known(v) => v.fmt(f),
            Keyword::Raw(s) => f.write_str(s),
        }
    }
}

/// Prints a number without a fractional part when it has none
/// (`2`, not `2.0`).
pub fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", fmt_num(self.x), fmt_num(self.y), fmt_num(self.z))
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Stored coordinates are plain numbers; block positions floor them.
impl From<[f64; 3]> for BlockPos {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

impl From<Vec3> for BlockPos {
    fn from(v: Vec3) -> Self {
        Self::from(<[f64; 3]>::from(v))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Blocks a range step applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Single(BlockPos),
    Range(BlockPos, BlockPos),
}

impl Selection {
    /// Builds a selection from a step's `pos`/`pos2`, flooring both.
    ///
    /// Endpoints in the same block collapse to a single position; a lone
    /// `pos2` is treated as a single position as well.
    pub fn from_pair(pos: Option<Vec3>, pos2: Option<Vec3>) -> Option<Self> {
        match (pos.map(BlockPos::from), pos2.map(BlockPos::from)) {
            (Some(a), Some(b)) if a != b => Some(Selection::Range(a, b)),
            (Some(a), _) | (None, Some(a)) => Some(Selection::Single(a)),
            (None, None) => None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Single(p) => write!(f, "[{p}]"),
            Selection::Range(a, b) => write!(f, "[{a}]..[{b}]"),
        }
    }
}

/// A block id plus property overrides, e.g. `minecraft:lever[powered=true]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockState {
    pub block: ResourceLocation,
    pub properties: BTreeMap<String, String>,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.block)?;
        if self.properties.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, (k, v)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("]")
    }
}
