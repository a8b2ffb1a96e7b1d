use serde::{Deserialize, Serialize};

use crate::{column_store::transforms, grid::Cell};

/// Wire document version understood by this crate.
pub const PROTOCOL_VERSION: u32 = 1;

pub const DEFAULT_LINK_STROKE: &str = "solid";

/// Ordered key/value settings carried alongside the graph. Order is
/// part of the encoding, so this is a pair list rather than a map.
pub type Settings = Vec<(String, String)>;

/// Serde helper distinguishing an omitted field from an explicit null.
/// `None` = omitted, `Some(None)` = null, `Some(Some(v))` = value.
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }
}

/// Raw node as carried on the wire; every field is optional and the
/// tristate fields keep "omitted" distinct from "explicitly null".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub secondary_label: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub url: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub color: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "double_option"
    )]
    pub rank: Option<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Raw link as carried on the wire. The stroke is a free string here;
/// only the message-protocol validation constrains it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
}

/// The versioned wire document handed to the visualization process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadedData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub links: Vec<WireLink>,
}

/// Tool-owned state persisted back from the visualization process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub version: u32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub nodes: Vec<PositionNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionNode {
    pub id: String,
    pub is_locked: bool,
    /// Absent means "not positioned", which is distinct from 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStroke {
    #[default]
    Solid,
    Dashed,
}

impl LinkStroke {
    /// Enum-constrained parse used by the message protocol; anything
    /// outside the set maps to `None` for the caller to default.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "solid" => Some(LinkStroke::Solid),
            "dashed" => Some(LinkStroke::Dashed),
            _ => None,
        }
    }
}

/// Validated node produced by the message protocol; id and label are
/// always present here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub secondary_label: Option<String>,
    pub url: Option<String>,
    pub color: Option<String>,
    pub rank: Option<f64>,
    pub is_locked: bool,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub stroke: LinkStroke,
}

/// Best-effort validated document plus the settings carried through.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub settings: Settings,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Encodes ordered settings pairs as the flat alternating cell list
/// stored in the settings column.
pub fn pack_settings(settings: &Settings) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(settings.len() * 2);
    for (key, value) in settings {
        cells.push(Cell::text(key.clone()));
        cells.push(Cell::text(value.clone()));
    }
    cells
}

/// Inverse of [`pack_settings`]. An odd trailing cell unpacks as a key
/// with an empty value, so a trailing empty value trimmed away by the
/// column read still round-trips.
pub fn unpack_settings(cells: &[Cell]) -> Settings {
    let mut settings = Vec::with_capacity(cells.len().div_ceil(2));
    for chunk in cells.chunks(2) {
        let key = transforms::as_string(&chunk[0]);
        let value = chunk.get(1).map(transforms::as_string).unwrap_or_default();
        settings.push((key, value));
    }
    settings
}
