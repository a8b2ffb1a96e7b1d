use ahash::AHashSet;
use log::warn;

use crate::{
    document::{GraphDocument, Link, LinkStroke, LoadedData, Node},
    errors::SheetGraphError,
};

/// Parses and validates the raw cross-process message. This is the one
/// place where malformed input is fatal: unparseable text, a non-object
/// payload, or an unrecognized `version` all fail with a protocol
/// version error carrying the raw text for diagnostics.
pub fn parse(raw: &str) -> Result<LoadedData, SheetGraphError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| SheetGraphError::protocol_version(format!("invalid JSON: {e}"), raw))?;

    match value.get("version").and_then(serde_json::Value::as_u64) {
        Some(1) => {
            let document: LoadedData = serde_json::from_value(value).map_err(|e| {
                SheetGraphError::protocol_version(format!("malformed v1 document: {e}"), raw)
            })?;
            Ok(upgrade_v1(document))
        }
        other => Err(SheetGraphError::protocol_version(
            format!("unrecognized document version: {other:?}"),
            raw,
        )),
    }
}

/// Per-version upgrade seam. Version 1 is current, so this is the
/// identity; future versions get their own transition step here.
fn upgrade_v1(document: LoadedData) -> LoadedData {
    document
}

/// Encodes the document for the cross-process transport.
pub fn serialize(document: &LoadedData) -> Result<String, SheetGraphError> {
    serde_json::to_string(document)
        .map_err(|e| SheetGraphError::configuration(format!("failed to encode document: {e}")))
}

/// Validates the raw document into a typed one, best-effort. Never
/// fails: offending records are dropped, one message per drop is
/// collected, and a partial document is always returned for display.
///
/// A node is accepted only when its id is present and non-blank; a
/// second occurrence of an accepted id is dropped with an error. The
/// accepted-id set is finalized before links are checked, and a link
/// with an endpoint outside that set is dropped with an error. Stroke
/// is the deliberate exception: any value outside {solid, dashed}
/// (including absent) silently becomes the default, with no error.
pub fn to_graph_document(loaded: &LoadedData) -> (GraphDocument, Vec<String>) {
    let mut errors = Vec::new();

    let mut accepted: AHashSet<&str> = AHashSet::new();
    let mut nodes = Vec::new();
    for raw in &loaded.nodes {
        let Some(id) = raw.id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };
        if !accepted.insert(id) {
            errors.push(format!("duplicate node id: {id:?}"));
            continue;
        }
        let label = raw
            .label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(id);
        nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            secondary_label: raw.secondary_label.clone().flatten(),
            url: raw.url.clone().flatten(),
            color: raw.color.clone().flatten(),
            rank: raw.rank.flatten(),
            is_locked: raw.is_locked.unwrap_or(false),
            x: raw.x,
            y: raw.y,
        });
    }

    let mut links = Vec::new();
    for raw in &loaded.links {
        let source = raw.source.as_deref().unwrap_or("");
        let target = raw.target.as_deref().unwrap_or("");
        if !accepted.contains(source) || !accepted.contains(target) {
            errors.push(format!(
                "link references unknown node: {source:?} -> {target:?}"
            ));
            continue;
        }
        let stroke = raw
            .stroke
            .as_deref()
            .and_then(LinkStroke::from_wire)
            .unwrap_or_default();
        links.push(Link {
            source: source.to_string(),
            target: target.to_string(),
            stroke,
        });
    }

    if !errors.is_empty() {
        warn!("document validation collected {} errors", errors.len());
    }

    (
        GraphDocument {
            settings: loaded.settings.clone(),
            nodes,
            links,
        },
        errors,
    )
}
