use ahash::AHashSet;
use log::debug;

use crate::{
    errors::SheetGraphError,
    grid::{Cell, GridBackend},
};

pub const HEADER_ROW: usize = 0;
const FIRST_DATA_ROW: usize = 1;

/// One column to persist: the header naming it and the cells to write
/// from the first data row down.
#[derive(Debug, Clone)]
pub struct ColumnWrite {
    pub header: String,
    pub values: Vec<Cell>,
}

impl ColumnWrite {
    pub fn new<H: Into<String>>(header: H, values: Vec<Cell>) -> Self {
        Self {
            header: header.into(),
            values,
        }
    }
}

/// Removes exactly the maximal trailing run of blank cells. Interior
/// blanks are kept as empty-value sentinels.
pub fn trim_trailing(mut values: Vec<Cell>) -> Vec<Cell> {
    let keep = values
        .iter()
        .rposition(|c| !c.is_blank())
        .map_or(0, |i| i + 1);
    values.truncate(keep);
    values
}

/// Element-wise cell transforms applied after a column read. Parsing is
/// permissive throughout: a non-numeric string becomes `f64::NAN` and
/// is propagated, never rejected.
pub mod transforms {
    use crate::grid::Cell;

    pub fn as_string(cell: &Cell) -> String {
        match cell {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format!("{n}"),
            Cell::Bool(b) => b.to_string(),
        }
    }

    pub fn as_string_opt(cell: &Cell) -> Option<String> {
        if cell.is_blank() {
            None
        } else {
            Some(as_string(cell))
        }
    }

    pub fn as_number_opt(cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Number(n) => Some(*n),
            _ if cell.is_blank() => None,
            other => Some(as_string(other).parse().unwrap_or(f64::NAN)),
        }
    }

    pub fn as_bool_opt(cell: &Cell) -> Option<bool> {
        match cell {
            Cell::Bool(b) => Some(*b),
            _ if cell.is_blank() => None,
            Cell::Number(n) => Some(*n != 0.0),
            other => Some(as_string(other).eq_ignore_ascii_case("true")),
        }
    }
}

/// Header-driven column reads and writes over a grid handle. Row 0 is
/// the header row; data starts at row 1. State is read live on every
/// call, nothing is cached across calls.
pub struct ColumnStore<G: GridBackend> {
    grid: G,
}

impl<G: GridBackend> ColumnStore<G> {
    pub fn new(grid: G) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn into_inner(self) -> G {
        self.grid
    }

    /// Reads the requested columns in request order. An unresolved
    /// header yields `None` (absent), distinct from a resolved column
    /// with no data (`Some(vec![])`). Each column is read from the
    /// first data row through the grid's used extent with the trailing
    /// blank run trimmed.
    pub fn read_columns(&self, headers: &[&str]) -> Vec<Option<Vec<Cell>>> {
        let data_rows = self.grid.used_rows().saturating_sub(FIRST_DATA_ROW);
        self.find_columns(headers)
            .into_iter()
            .map(|col| {
                col.map(|idx| trim_trailing(self.grid.read_col(idx, FIRST_DATA_ROW, data_rows)))
            })
            .collect()
    }

    /// Writes each entry's cells under its header, creating missing
    /// columns (hidden, bold header) in one batch beforehand. Fails
    /// with a configuration error when the requested headers are not
    /// pairwise distinct, before any mutation. Cells left over from a
    /// previous longer write are cleared up to the previous shared
    /// data extent.
    pub fn write_columns(&mut self, entries: &[ColumnWrite]) -> Result<(), SheetGraphError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut seen = AHashSet::new();
        for entry in entries {
            if !seen.insert(entry.header.as_str()) {
                return Err(SheetGraphError::configuration(format!(
                    "duplicate write header: {:?}",
                    entry.header
                )));
            }
        }

        let headers: Vec<&str> = entries.iter().map(|e| e.header.as_str()).collect();
        let mut columns = self.find_columns(&headers);

        let missing: Vec<&str> = headers
            .iter()
            .zip(&columns)
            .filter(|(_, col)| col.is_none())
            .map(|(header, _)| *header)
            .collect();
        if !missing.is_empty() {
            debug!("creating {} missing columns: {:?}", missing.len(), missing);
            self.create_columns(&missing)?;
            // single bounded re-resolve, no retry loop
            columns = self.find_columns(&headers);
        }

        // previous data extent, shared across the whole write call
        let prev_data_rows = self.grid.used_rows().saturating_sub(FIRST_DATA_ROW);

        let max_values = entries.iter().map(|e| e.values.len()).max().unwrap_or(0);
        self.grid.ensure_rows(FIRST_DATA_ROW + max_values)?;

        for (entry, column) in entries.iter().zip(columns.iter().copied()) {
            let col = column.ok_or_else(|| {
                SheetGraphError::grid(format!(
                    "column {:?} missing after creation pass",
                    entry.header
                ))
            })?;
            self.grid.write_col(col, FIRST_DATA_ROW, &entry.values)?;
            let stale = prev_data_rows.saturating_sub(entry.values.len());
            if stale > 0 {
                self.grid
                    .clear_col(col, FIRST_DATA_ROW + entry.values.len(), stale)?;
            }
        }
        Ok(())
    }

    /// Resolves each header against the header row, scanning left to
    /// right over the used column range; the first textual match wins.
    fn find_columns(&self, headers: &[&str]) -> Vec<Option<usize>> {
        let used_cols = self.grid.used_cols();
        let header_cells = self.grid.read_row(HEADER_ROW, 0, used_cols);
        let header_texts: Vec<String> = header_cells.iter().map(transforms::as_string).collect();
        headers
            .iter()
            .map(|header| header_texts.iter().position(|text| text.as_str() == *header))
            .collect()
    }

    /// Inserts the given headers as new hidden columns before column 0
    /// and writes their bold header cells.
    fn create_columns(&mut self, headers: &[&str]) -> Result<(), SheetGraphError> {
        if headers.is_empty() {
            return Ok(());
        }
        self.grid.insert_cols_before(0, headers.len())?;
        self.grid.ensure_rows(HEADER_ROW + 1)?;
        let cells: Vec<Cell> = headers.iter().map(|h| Cell::text(*h)).collect();
        for (i, cell) in cells.into_iter().enumerate() {
            self.grid.write_col(i, HEADER_ROW, &[cell])?;
        }
        self.grid.hide_cols(0, headers.len())?;
        self.grid.set_bold(HEADER_ROW, 0, headers.len())?;
        Ok(())
    }
}
