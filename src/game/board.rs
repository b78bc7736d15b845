use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::error::MoveError;

/// Number of aligned tokens needed to win.
pub const WIN_LENGTH: usize = 4;

/// Scan directions as (row delta, col delta): →, ↓, ↘, ↙.
/// The last one covers the ↗ axis when walked in both directions.
pub(crate) const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Red,
    Yellow,
}

/// Direction in which a dropped token travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    /// Tokens fall toward the highest row index.
    #[default]
    Down,
    /// Tokens rise toward row 0.
    Up,
}

impl Gravity {
    pub fn flipped(self) -> Gravity {
        match self {
            Gravity::Down => Gravity::Up,
            Gravity::Up => Gravity::Down,
        }
    }
}

/// A `rows × cols` grid. Row 0 is the top of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board.
    ///
    /// Panics if `rows * cols` overflows; `GameConfig::validate` rejects
    /// such sizes before a game is built.
    pub fn new(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the cell at a specific position.
    ///
    /// Panics if the position is outside the board.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) is off the board");
        self.cells[row * self.cols + col]
    }

    /// Signed lookup used by the directional scans; `None` off the board.
    pub fn cell_at(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.cols + col] = cell;
    }

    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Cell::Empty
    }

    /// Row through which tokens enter under `gravity`.
    pub fn entry_row(&self, gravity: Gravity) -> usize {
        match gravity {
            Gravity::Down => 0,
            Gravity::Up => self.rows.saturating_sub(1),
        }
    }

    /// A column is playable when its entry cell is empty.
    pub fn is_column_open(&self, col: usize, gravity: Gravity) -> bool {
        col < self.cols && self.rows > 0 && self.is_empty_at(self.entry_row(gravity), col)
    }

    /// Playable columns in ascending order.
    pub fn legal_columns(&self, gravity: Gravity) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| self.is_column_open(col, gravity))
            .collect()
    }

    /// True when no column can take another token under `gravity`.
    pub fn is_blocked(&self, gravity: Gravity) -> bool {
        (0..self.cols).all(|col| !self.is_column_open(col, gravity))
    }

    /// Row a token dropped in `col` would land on: the first empty cell
    /// scanning from the far side toward the entry row.
    pub fn landing_row(&self, col: usize, gravity: Gravity) -> Option<usize> {
        if col >= self.cols {
            return None;
        }
        match gravity {
            Gravity::Down => (0..self.rows).rev().find(|&row| self.is_empty_at(row, col)),
            Gravity::Up => (0..self.rows).find(|&row| self.is_empty_at(row, col)),
        }
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(
        &mut self,
        col: usize,
        cell: Cell,
        gravity: Gravity,
    ) -> Result<usize, MoveError> {
        if col >= self.cols {
            return Err(MoveError::InvalidColumn {
                column: col,
                cols: self.cols,
            });
        }
        let row = self
            .landing_row(col, gravity)
            .ok_or(MoveError::ColumnFull(col))?;
        self.set(row, col, cell);
        Ok(row)
    }

    /// Place a token that is removed again when the returned guard drops.
    pub fn place_scoped(
        &mut self,
        col: usize,
        cell: Cell,
        gravity: Gravity,
    ) -> Option<ScopedPlacement<'_>> {
        let row = self.landing_row(col, gravity)?;
        self.set(row, col, cell);
        Some(ScopedPlacement {
            board: self,
            row,
            col,
        })
    }

    /// Check if the token at (row, col) is part of four in a row. Empty
    /// and off-board positions never win.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, col, dr, dc, cell) + self.run_length(row, col, -dr, -dc, cell)
                >= WIN_LENGTH
        })
    }

    /// Count matching cells strictly beyond (row, col) along one direction.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        (1..)
            .map(|i| self.cell_at(row as isize + dr * i, col as isize + dc * i))
            .take_while(|&c| c == Some(cell))
            .count()
    }

    /// First run of exactly four `cell` tokens, scanning row-major and
    /// trying the directions in →, ↓, ↘, ↙ order at each start cell.
    pub fn winning_line(&self, cell: Cell) -> Option<[(usize, usize); WIN_LENGTH]> {
        if cell == Cell::Empty {
            return None;
        }
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.get(row, col) != cell {
                    continue;
                }
                for &(dr, dc) in &DIRECTIONS {
                    if let Some(line) = self.line_from(row, col, dr, dc, cell) {
                        return Some(line);
                    }
                }
            }
        }
        None
    }

    fn line_from(
        &self,
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        cell: Cell,
    ) -> Option<[(usize, usize); WIN_LENGTH]> {
        let mut line = [(0, 0); WIN_LENGTH];
        for (i, slot) in line.iter_mut().enumerate() {
            let r = row as isize + dr * i as isize;
            let c = col as isize + dc * i as isize;
            if self.cell_at(r, c)? != cell {
                return None;
            }
            *slot = (r as usize, c as usize);
        }
        Some(line)
    }

    /// Every horizontal, vertical and diagonal run of four cells.
    pub fn windows(&self) -> impl Iterator<Item = [Cell; WIN_LENGTH]> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).flat_map(move |col| {
                DIRECTIONS
                    .iter()
                    .filter_map(move |&(dr, dc)| self.window(row, col, dr, dc))
            })
        })
    }

    fn window(&self, row: usize, col: usize, dr: isize, dc: isize) -> Option<[Cell; WIN_LENGTH]> {
        let mut cells = [Cell::Empty; WIN_LENGTH];
        for (i, slot) in cells.iter_mut().enumerate() {
            *slot = self.cell_at(row as isize + dr * i as isize, col as isize + dc * i as isize)?;
        }
        Some(cells)
    }

    /// Build a board from text rows, top row first: `R`, `Y`, `.`.
    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&str]) -> Board {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut board = Board::new(rows.len(), cols);
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), cols, "ragged row {row}");
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    'R' => Cell::Red,
                    'Y' => Cell::Yellow,
                    '.' => Cell::Empty,
                    other => panic!("unexpected cell '{other}'"),
                };
                board.set(row, col, cell);
            }
        }
        board
    }
}

/// A token placed by [`Board::place_scoped`]. Dereferences to the board
/// and clears the placed cell on drop, so every exit path restores the grid.
pub struct ScopedPlacement<'a> {
    board: &'a mut Board,
    row: usize,
    col: usize,
}

impl ScopedPlacement<'_> {
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

impl Deref for ScopedPlacement<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for ScopedPlacement<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for ScopedPlacement<'_> {
    fn drop(&mut self) {
        self.board.set(self.row, self.col, Cell::Empty);
    }
}
