use ahash::AHashMap;
use log::debug;

use crate::{
    column_store::{transforms, ColumnStore, ColumnWrite},
    document::{
        pack_settings, unpack_settings, LoadedData, PositionData, WireLink, WireNode,
        DEFAULT_LINK_STROKE, PROTOCOL_VERSION,
    },
    errors::SheetGraphError,
    grid::{Cell, GridBackend},
};

// Fixed grid schema: data columns are human-edited, managed columns are
// owned exclusively by this tool and joined onto nodes by id.
pub const HEADER_NODE_ID: &str = "node:id";
pub const HEADER_NODE_LABEL: &str = "node:label";
pub const HEADER_NODE_SECONDARY_LABEL: &str = "node:secondaryLabel";
pub const HEADER_NODE_URL: &str = "node:url";
pub const HEADER_NODE_COLOR: &str = "node:color";
pub const HEADER_NODE_RANK: &str = "node:rank";
pub const HEADER_LINK_SOURCE: &str = "link:source";
pub const HEADER_LINK_TARGET: &str = "link:target";
pub const HEADER_LINK_STROKE: &str = "link:stroke";
pub const HEADER_MANAGED_NODE_ID: &str = "managed:node:id";
pub const HEADER_MANAGED_NODE_IS_LOCKED: &str = "managed:node:isLocked";
pub const HEADER_MANAGED_NODE_X: &str = "managed:node:x";
pub const HEADER_MANAGED_NODE_Y: &str = "managed:node:y";
pub const HEADER_SETTINGS: &str = "managed:autograph:settings";

fn nth_cell(column: &Option<Vec<Cell>>, index: usize) -> Cell {
    column
        .as_ref()
        .and_then(|cells| cells.get(index))
        .cloned()
        .unwrap_or(Cell::Empty)
}

/// Column present + blank cell => explicit null; column absent => field
/// omitted entirely.
fn tristate_string(column: &Option<Vec<Cell>>, index: usize) -> Option<Option<String>> {
    column
        .as_ref()
        .map(|_| transforms::as_string_opt(&nth_cell(column, index)))
}

/// Synchronizes the grid with the graph document: assembles the wire
/// document from the human-edited data columns plus the tool-owned
/// shadow columns, and persists positions back into the shadow region.
pub struct SheetSync<G: GridBackend> {
    store: ColumnStore<G>,
}

impl<G: GridBackend> SheetSync<G> {
    pub fn new(grid: G) -> Self {
        Self {
            store: ColumnStore::new(grid),
        }
    }

    pub fn store(&self) -> &ColumnStore<G> {
        &self.store
    }

    pub fn into_inner(self) -> G {
        self.store.into_inner()
    }

    /// Assembles a version-tagged document from the grid's current
    /// state. Every call reads the grid live; nothing is cached.
    /// Nodes with a blank id are excluded. Nodes whose id appears in
    /// the managed index pick up isLocked/x/y from that shadow row
    /// (left join; unmatched nodes keep those fields absent).
    pub fn load(&self) -> Result<LoadedData, SheetGraphError> {
        let mut cols = self
            .store
            .read_columns(&[
                HEADER_SETTINGS,
                HEADER_NODE_ID,
                HEADER_NODE_LABEL,
                HEADER_NODE_SECONDARY_LABEL,
                HEADER_NODE_URL,
                HEADER_NODE_COLOR,
                HEADER_NODE_RANK,
                HEADER_LINK_SOURCE,
                HEADER_LINK_TARGET,
                HEADER_LINK_STROKE,
                HEADER_MANAGED_NODE_ID,
                HEADER_MANAGED_NODE_IS_LOCKED,
                HEADER_MANAGED_NODE_X,
                HEADER_MANAGED_NODE_Y,
            ])
            .into_iter();

        let settings_col = cols.next().flatten();
        let node_ids = cols.next().flatten();
        let node_labels = cols.next().flatten();
        let node_secondary_labels = cols.next().flatten();
        let node_urls = cols.next().flatten();
        let node_colors = cols.next().flatten();
        let node_ranks = cols.next().flatten();
        let link_sources = cols.next().flatten();
        let link_targets = cols.next().flatten();
        let link_strokes = cols.next().flatten();
        let managed_ids = cols.next().flatten();
        let managed_locked = cols.next().flatten();
        let managed_x = cols.next().flatten();
        let managed_y = cols.next().flatten();

        let managed_index = build_managed_index(&managed_ids);

        let mut nodes = Vec::new();
        for index in 0..node_ids.as_ref().map_or(0, Vec::len) {
            let id = transforms::as_string(&nth_cell(&node_ids, index));
            if id.is_empty() {
                continue;
            }

            let mut node = WireNode {
                id: Some(id.clone()),
                label: transforms::as_string_opt(&nth_cell(&node_labels, index)),
                secondary_label: tristate_string(&node_secondary_labels, index),
                url: tristate_string(&node_urls, index),
                color: tristate_string(&node_colors, index),
                rank: node_ranks
                    .as_ref()
                    .map(|_| transforms::as_number_opt(&nth_cell(&node_ranks, index))),
                ..WireNode::default()
            };

            if let Some(&row) = managed_index.get(id.as_str()) {
                node.is_locked = transforms::as_bool_opt(&nth_cell(&managed_locked, row));
                node.x = transforms::as_number_opt(&nth_cell(&managed_x, row));
                node.y = transforms::as_number_opt(&nth_cell(&managed_y, row));
            }
            nodes.push(node);
        }

        let mut links = Vec::new();
        for index in 0..link_sources.as_ref().map_or(0, Vec::len) {
            let stroke = transforms::as_string_opt(&nth_cell(&link_strokes, index))
                .unwrap_or_else(|| DEFAULT_LINK_STROKE.to_string());
            links.push(WireLink {
                source: Some(transforms::as_string(&nth_cell(&link_sources, index))),
                target: Some(transforms::as_string(&nth_cell(&link_targets, index))),
                stroke: Some(stroke),
            });
        }

        let settings = unpack_settings(settings_col.as_deref().unwrap_or(&[]));
        debug!(
            "loaded {} nodes, {} links, {} settings",
            nodes.len(),
            links.len(),
            settings.len()
        );

        Ok(LoadedData {
            version: PROTOCOL_VERSION,
            settings,
            nodes,
            links,
        })
    }

    /// Overwrites the whole shadow region from the given position data
    /// in a single write pass. There is no read-modify-write merge: a
    /// save racing with another writer's edit to these columns clobbers
    /// it, and a later `load` sees only what this call stored. Absent
    /// x/y are written as empty cells, never 0.
    pub fn save(&mut self, positions: &PositionData) -> Result<(), SheetGraphError> {
        let mut ids = Vec::with_capacity(positions.nodes.len());
        let mut locked = Vec::with_capacity(positions.nodes.len());
        let mut xs = Vec::with_capacity(positions.nodes.len());
        let mut ys = Vec::with_capacity(positions.nodes.len());
        for node in &positions.nodes {
            ids.push(Cell::text(node.id.clone()));
            locked.push(Cell::Bool(node.is_locked));
            xs.push(node.x.map(Cell::Number).unwrap_or(Cell::Empty));
            ys.push(node.y.map(Cell::Number).unwrap_or(Cell::Empty));
        }

        debug!("saving {} managed node rows", positions.nodes.len());
        self.store.write_columns(&[
            ColumnWrite::new(HEADER_SETTINGS, pack_settings(&positions.settings)),
            ColumnWrite::new(HEADER_MANAGED_NODE_ID, ids),
            ColumnWrite::new(HEADER_MANAGED_NODE_IS_LOCKED, locked),
            ColumnWrite::new(HEADER_MANAGED_NODE_X, xs),
            ColumnWrite::new(HEADER_MANAGED_NODE_Y, ys),
        ])
    }
}

/// Maps each managed id to its row offset within the shadow columns.
/// The first non-blank occurrence of an id wins; later duplicates are
/// ignored. Rebuilt from live grid state on every load.
fn build_managed_index(managed_ids: &Option<Vec<Cell>>) -> AHashMap<String, usize> {
    let mut index = AHashMap::new();
    if let Some(cells) = managed_ids {
        for (row, cell) in cells.iter().enumerate() {
            let id = transforms::as_string(cell);
            if !id.is_empty() {
                index.entry(id).or_insert(row);
            }
        }
    }
    index
}
