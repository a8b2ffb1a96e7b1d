use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::SheetGraphError;

/// A single scalar grid cell. Row 0 of a grid is the header row; column
/// identity is resolved by exact text match against it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Empty cells and empty strings are interchangeable as far as the
    /// column logic is concerned.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn text<T: Into<String>>(value: T) -> Self {
        Cell::Text(value.into())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Handle to an already-connected row/column grid. All indices are
/// 0-based. Reads past the physical extent pad with [`Cell::Empty`];
/// writes past it are an error, callers grow the grid first via
/// [`GridBackend::ensure_rows`].
pub trait GridBackend {
    /// Number of rows up to and including the last row holding a
    /// non-blank cell.
    fn used_rows(&self) -> usize;

    /// Number of columns up to and including the last column holding a
    /// non-blank cell.
    fn used_cols(&self) -> usize;

    /// Physical row count; at least `used_rows()`.
    fn max_rows(&self) -> usize;

    fn read_row(&self, row: usize, start_col: usize, count: usize) -> Vec<Cell>;

    fn read_col(&self, col: usize, start_row: usize, count: usize) -> Vec<Cell>;

    fn write_col(
        &mut self,
        col: usize,
        start_row: usize,
        values: &[Cell],
    ) -> Result<(), SheetGraphError>;

    fn clear_col(&mut self, col: usize, start_row: usize, count: usize)
        -> Result<(), SheetGraphError>;

    /// Inserts `count` new empty columns before `col`, shifting
    /// existing columns (and any column styling) right.
    fn insert_cols_before(&mut self, col: usize, count: usize) -> Result<(), SheetGraphError>;

    /// Grows the physical grid to at least `rows` rows.
    fn ensure_rows(&mut self, rows: usize) -> Result<(), SheetGraphError>;

    fn hide_cols(&mut self, col: usize, count: usize) -> Result<(), SheetGraphError>;

    fn set_bold(&mut self, row: usize, col: usize, count: usize) -> Result<(), SheetGraphError>;
}

/// In-memory grid. Rows may be ragged; cells outside a row's stored
/// width are empty. Hidden-column and bold-cell state is tracked so the
/// managed-column styling contract stays observable.
#[derive(Debug, Clone, Default)]
pub struct MemoryGrid {
    rows: Vec<Vec<Cell>>,
    hidden_cols: AHashSet<usize>,
    bold_cells: AHashSet<(usize, usize)>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or(Cell::Empty)
    }

    pub fn is_hidden(&self, col: usize) -> bool {
        self.hidden_cols.contains(&col)
    }

    pub fn is_bold(&self, row: usize, col: usize) -> bool {
        self.bold_cells.contains(&(row, col))
    }

    fn set_cell(&mut self, row: usize, col: usize, value: Cell) {
        let row_cells = &mut self.rows[row];
        if row_cells.len() <= col {
            row_cells.resize(col + 1, Cell::Empty);
        }
        row_cells[col] = value;
    }
}

impl GridBackend for MemoryGrid {
    fn used_rows(&self) -> usize {
        let mut used = 0;
        for (i, row) in self.rows.iter().enumerate() {
            if row.iter().any(|c| !c.is_blank()) {
                used = i + 1;
            }
        }
        used
    }

    fn used_cols(&self) -> usize {
        let mut used = 0;
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if !cell.is_blank() && i + 1 > used {
                    used = i + 1;
                }
            }
        }
        used
    }

    fn max_rows(&self) -> usize {
        self.rows.len()
    }

    fn read_row(&self, row: usize, start_col: usize, count: usize) -> Vec<Cell> {
        (start_col..start_col + count)
            .map(|col| self.cell(row, col))
            .collect()
    }

    fn read_col(&self, col: usize, start_row: usize, count: usize) -> Vec<Cell> {
        (start_row..start_row + count)
            .map(|row| self.cell(row, col))
            .collect()
    }

    fn write_col(
        &mut self,
        col: usize,
        start_row: usize,
        values: &[Cell],
    ) -> Result<(), SheetGraphError> {
        let end_row = start_row + values.len();
        if end_row > self.rows.len() {
            return Err(SheetGraphError::grid(format!(
                "write of {} rows at row {start_row} exceeds grid of {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        for (i, value) in values.iter().enumerate() {
            self.set_cell(start_row + i, col, value.clone());
        }
        Ok(())
    }

    fn clear_col(
        &mut self,
        col: usize,
        start_row: usize,
        count: usize,
    ) -> Result<(), SheetGraphError> {
        for row in start_row..start_row + count {
            if let Some(row_cells) = self.rows.get_mut(row) {
                if let Some(cell) = row_cells.get_mut(col) {
                    *cell = Cell::Empty;
                }
            }
        }
        Ok(())
    }

    fn insert_cols_before(&mut self, col: usize, count: usize) -> Result<(), SheetGraphError> {
        if count == 0 {
            return Ok(());
        }
        for row_cells in &mut self.rows {
            if col <= row_cells.len() {
                for _ in 0..count {
                    row_cells.insert(col, Cell::Empty);
                }
            }
            // cells past a shorter row are implicitly empty already
        }
        let hidden = std::mem::take(&mut self.hidden_cols);
        self.hidden_cols = hidden
            .into_iter()
            .map(|c| if c >= col { c + count } else { c })
            .collect();
        let bold = std::mem::take(&mut self.bold_cells);
        self.bold_cells = bold
            .into_iter()
            .map(|(r, c)| if c >= col { (r, c + count) } else { (r, c) })
            .collect();
        Ok(())
    }

    fn ensure_rows(&mut self, rows: usize) -> Result<(), SheetGraphError> {
        if rows > self.rows.len() {
            self.rows.resize(rows, Vec::new());
        }
        Ok(())
    }

    fn hide_cols(&mut self, col: usize, count: usize) -> Result<(), SheetGraphError> {
        for c in col..col + count {
            self.hidden_cols.insert(c);
        }
        Ok(())
    }

    fn set_bold(&mut self, row: usize, col: usize, count: usize) -> Result<(), SheetGraphError> {
        for c in col..col + count {
            self.bold_cells.insert((row, c));
        }
        Ok(())
    }
}
