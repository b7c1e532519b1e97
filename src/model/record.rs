//! Storage form of a step: one flat record, every field optional.
//!
//! This is what scene documents contain. The compiler never works on it
//! directly; see [`crate::model::step::Step`] for the typed form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StepRecord {
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "is_false", deserialize_with = "lenient::flag_or_false")]
    pub attach_key_frame: bool,

    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub key: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub point: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::flag")]
    pub place_near_target: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub item: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub sound: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub volume: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub pitch: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub block: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::properties")]
    pub properties: Option<BTreeMap<String, String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub pos: Option<[f64; 3]>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub pos2: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::flag")]
    pub spawn_particles: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub link_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub rot_x: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub rot_y: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub rot_z: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub offset: Option<[f64; 3]>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub nbt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::flag")]
    pub redraw: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub entity: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub yaw: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub look_at: Option<[f64; 3]>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::vec3",
        serialize_with = "compact::vec3"
    )]
    pub motion: Option<[f64; 3]>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::flag")]
    pub full_scene: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub structure: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub height: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::number",
        serialize_with = "compact::number"
    )]
    pub scale: Option<f64>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Writers that keep integral numbers integral (`20`, not `20.0`).
mod compact {
    use serde::Serializer;
    use serde::ser::SerializeTuple;

    const EXACT: f64 = 9_007_199_254_740_992.0;

    fn write<S: Serializer>(n: f64, s: S) -> Result<S::Ok, S::Error> {
        if n.fract() == 0.0 && n.abs() < EXACT {
            s.serialize_i64(n as i64)
        } else {
            s.serialize_f64(n)
        }
    }

    struct Num(f64);

    impl serde::Serialize for Num {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            write(self.0, s)
        }
    }

    pub fn number<S: Serializer>(n: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match n {
            Some(n) => write(*n, s),
            None => s.serialize_none(),
        }
    }

    pub fn vec3<S: Serializer>(v: &Option<[f64; 3]>, s: S) -> Result<S::Ok, S::Error> {
        let Some(v) = v else {
            return s.serialize_none();
        };
        let mut tup = s.serialize_tuple(3)?;
        for n in v {
            tup.serialize_element(&Num(*n))?;
        }
        tup.end()
    }
}

impl StepRecord {
    /// A record with only its discriminant set.
    pub fn of_kind(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            ..Self::default()
        }
    }

    /// Reads a record out of an arbitrary JSON value; anything that is not
    /// an object reads as an empty record.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}
