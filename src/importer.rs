use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::{
    column_store::transforms,
    document::{LoadedData, WireLink, WireNode, DEFAULT_LINK_STROKE, PROTOCOL_VERSION},
    errors::SheetGraphError,
    grid::Cell,
};

// Column names inside a column-major batch result. The first cell of
// each physical column is its name; physical order is irrelevant.
pub const BATCH_NODE_ID: &str = "id";
pub const BATCH_NODE_LABEL: &str = "label";
pub const BATCH_NODE_SECONDARY_LABEL: &str = "secondaryLabel";
pub const BATCH_NODE_COLOR: &str = "color";
pub const BATCH_NODE_URL: &str = "url";
pub const BATCH_NODE_RANK: &str = "rank";
pub const BATCH_LINK_SOURCE: &str = "source";
pub const BATCH_LINK_TARGET: &str = "target";
pub const BATCH_LINK_STROKE: &str = "stroke";

fn trim_trailing_strings(mut values: Vec<String>) -> Vec<String> {
    let keep = values
        .iter()
        .rposition(|v| !v.is_empty())
        .map_or(0, |i| i + 1);
    values.truncate(keep);
    values
}

/// Pulls the requested columns out of a column-major matrix by name, in
/// request order. Fails with a configuration error when the request
/// itself contains duplicates. A name with no matching physical column
/// yields `None`; when the same name heads several physical columns the
/// first occurrence wins. Cell values are stringified (blank cells
/// become `""`) and the trailing run of empty strings is trimmed.
pub fn extract_named_columns(
    matrix: &[Vec<Cell>],
    names: &[&str],
) -> Result<Vec<Option<Vec<String>>>, SheetGraphError> {
    let mut seen = AHashSet::new();
    for name in names {
        if !seen.insert(*name) {
            return Err(SheetGraphError::configuration(format!(
                "duplicate column name: {name:?}"
            )));
        }
    }

    let mut by_name: AHashMap<String, usize> = AHashMap::new();
    for (index, column) in matrix.iter().enumerate() {
        if let Some(first) = column.first() {
            by_name.entry(transforms::as_string(first)).or_insert(index);
        }
    }

    Ok(names
        .iter()
        .map(|name| {
            by_name.get(*name).map(|&index| {
                let values = matrix[index]
                    .iter()
                    .skip(1)
                    .map(transforms::as_string)
                    .collect();
                trim_trailing_strings(values)
            })
        })
        .collect())
}

/// Named columns feeding [`document_from_columns`]. A `None` optional
/// column means the column was entirely absent from the source, which
/// is different from a present-but-short column.
#[derive(Debug, Clone, Default)]
pub struct DataColumns {
    pub node_ids: Vec<String>,
    pub node_labels: Option<Vec<String>>,
    pub node_secondary_labels: Option<Vec<String>>,
    pub node_urls: Option<Vec<String>>,
    pub node_colors: Option<Vec<String>>,
    pub node_ranks: Option<Vec<String>>,
    pub link_source_ids: Vec<String>,
    pub link_target_ids: Vec<String>,
    pub link_strokes: Option<Vec<String>>,
}

fn nth<'a>(values: &'a [String], index: usize) -> Option<&'a str> {
    values.get(index).map(String::as_str)
}

/// Column present + empty cell => explicit null; column absent => the
/// field is omitted from the node entirely.
fn tristate(column: &Option<Vec<String>>, index: usize) -> Option<Option<String>> {
    column.as_ref().map(|values| {
        nth(values, index)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Builds a wire document from named data columns. One node per id
/// cell; the label falls back to the id when its column is absent or
/// the cell is empty. One link per row position common to the source
/// and target columns; a row missing either endpoint is dropped
/// silently (this path has no error-collection channel). Rank cells
/// parse permissively, a non-numeric value becomes NaN rather than an
/// error. Stroke values pass through unchecked apart from defaulting.
pub fn document_from_columns(columns: &DataColumns) -> LoadedData {
    let mut nodes = Vec::with_capacity(columns.node_ids.len());
    for (index, id) in columns.node_ids.iter().enumerate() {
        let label = columns
            .node_labels
            .as_deref()
            .and_then(|labels| nth(labels, index))
            .filter(|label| !label.is_empty())
            .unwrap_or(id);

        let rank = columns.node_ranks.as_deref().map(|ranks| {
            nth(ranks, index)
                .filter(|v| !v.is_empty())
                .map(|v| v.parse().unwrap_or(f64::NAN))
        });

        nodes.push(WireNode {
            id: Some(id.clone()),
            label: Some(label.to_string()),
            secondary_label: tristate(&columns.node_secondary_labels, index),
            url: tristate(&columns.node_urls, index),
            color: tristate(&columns.node_colors, index),
            rank,
            ..WireNode::default()
        });
    }

    let mut links = Vec::new();
    for (index, source) in columns.link_source_ids.iter().enumerate() {
        let Some(target) = nth(&columns.link_target_ids, index) else {
            continue;
        };
        let stroke = columns
            .link_strokes
            .as_deref()
            .and_then(|strokes| nth(strokes, index))
            .filter(|stroke| !stroke.is_empty())
            .unwrap_or(DEFAULT_LINK_STROKE);
        links.push(WireLink {
            source: Some(source.clone()),
            target: Some(target.to_string()),
            stroke: Some(stroke.to_string()),
        });
    }

    LoadedData {
        version: PROTOCOL_VERSION,
        settings: Vec::new(),
        nodes,
        links,
    }
}

/// Builds a wire document straight from the two column-major matrices
/// of a batch fetch (nodes sheet, links sheet). Tolerates arbitrary
/// physical column ordering; only the id, source and target columns
/// are required.
pub fn document_from_batch(
    nodes_matrix: &[Vec<Cell>],
    links_matrix: &[Vec<Cell>],
) -> Result<LoadedData, SheetGraphError> {
    let mut node_cols = extract_named_columns(
        nodes_matrix,
        &[
            BATCH_NODE_ID,
            BATCH_NODE_LABEL,
            BATCH_NODE_SECONDARY_LABEL,
            BATCH_NODE_COLOR,
            BATCH_NODE_URL,
            BATCH_NODE_RANK,
        ],
    )?
    .into_iter();
    let node_ids = node_cols.next().flatten();
    let node_labels = node_cols.next().flatten();
    let node_secondary_labels = node_cols.next().flatten();
    let node_colors = node_cols.next().flatten();
    let node_urls = node_cols.next().flatten();
    let node_ranks = node_cols.next().flatten();

    let mut link_cols = extract_named_columns(
        links_matrix,
        &[BATCH_LINK_SOURCE, BATCH_LINK_TARGET, BATCH_LINK_STROKE],
    )?
    .into_iter();
    let link_source_ids = link_cols.next().flatten();
    let link_target_ids = link_cols.next().flatten();
    let link_strokes = link_cols.next().flatten();

    let columns = DataColumns {
        node_ids: node_ids.ok_or_else(|| missing_column(BATCH_NODE_ID))?,
        node_labels,
        node_secondary_labels,
        node_urls,
        node_colors,
        node_ranks,
        link_source_ids: link_source_ids.ok_or_else(|| missing_column(BATCH_LINK_SOURCE))?,
        link_target_ids: link_target_ids.ok_or_else(|| missing_column(BATCH_LINK_TARGET))?,
        link_strokes,
    };

    debug!(
        "batch import: {} node rows, {} link rows",
        columns.node_ids.len(),
        columns.link_source_ids.len()
    );
    Ok(document_from_columns(&columns))
}

fn missing_column(name: &str) -> SheetGraphError {
    SheetGraphError::configuration(format!("required column missing: {name:?}"))
}
