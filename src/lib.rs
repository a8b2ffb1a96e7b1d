//! Bridges a human-edited, header-addressed spreadsheet grid and the
//! strongly-typed graph document consumed by the visualization process.

pub mod column_store;
pub mod document;
pub mod errors;
pub mod grid;
pub mod importer;
pub mod protocol;
pub mod sync;

pub use crate::column_store::{trim_trailing, ColumnStore, ColumnWrite};
pub use crate::document::{
    pack_settings, unpack_settings, GraphDocument, Link, LinkStroke, LoadedData, Node,
    PositionData, PositionNode, Settings, WireLink, WireNode, DEFAULT_LINK_STROKE,
    PROTOCOL_VERSION,
};
pub use crate::errors::SheetGraphError;
pub use crate::grid::{Cell, GridBackend, MemoryGrid};
pub use crate::importer::{
    document_from_batch, document_from_columns, extract_named_columns, DataColumns,
};
pub use crate::protocol::{parse, serialize, to_graph_document};
pub use crate::sync::SheetSync;
