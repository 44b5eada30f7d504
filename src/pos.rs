//! The three coordinate spaces of the editor and how to move between them.
//!
//! - **Table coordinates** ([`TablePos`]): (row, col) in the 9x9 editor table.
//!   Row 0 is the automap top row and column 8 the scene-launch column; the
//!   droppable area is rows 1..=8, columns 0..=7. The top-right corner (0, 8)
//!   has no button at all.
//! - **Hardware coordinates** ([`HwPos`]): 0-based (x, y) on the physical 8x8
//!   pad grid, excluding the border buttons.
//! - **Template-relative offsets** ([`Offset`]): (row, col) deltas from a
//!   template's anchor item, which sits at (0, 0).

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// A template-relative offset from the anchor item.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
pub struct Offset {
    pub row: i32,
    pub col: i32,
}

impl Offset {
    /// The offset of the anchor ("main") item itself.
    pub const ANCHOR: Offset = Offset { row: 0, col: 0 };

    pub fn new(row: i32, col: i32) -> Offset {
        Offset { row, col }
    }
}

// Template files store offsets as `[row, col]`.
impl Serialize for Offset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.row, self.col].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Offset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [row, col] = <[i32; 2]>::deserialize(deserializer)?;
        Ok(Offset { row, col })
    }
}

/// A cell of the 9x9 editor table. Coordinates may be negative so that
/// resolving an offset near the edge cannot wrap; such positions simply fail
/// the bounds check.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash, PartialOrd, Ord)]
pub struct TablePos {
    pub row: i32,
    pub col: i32,
}

impl TablePos {
    pub fn new(row: i32, col: i32) -> TablePos {
        TablePos { row, col }
    }

    /// Whether this cell is part of the droppable 8x8 area (not the automap
    /// border, not outside the table).
    pub fn is_usable(self) -> bool {
        (1..=8).contains(&self.row) && (0..=7).contains(&self.col)
    }

    /// Whether this cell is one of the 16 automap/scene border cells.
    pub fn is_automap(self) -> bool {
        (self.row == 0 && (0..=7).contains(&self.col))
            || (self.col == 8 && (1..=8).contains(&self.row))
    }

    /// Maps into 0-based hardware space by dropping the reserved border
    /// offset. `None` for border cells and anything outside the table.
    pub fn to_hardware(self) -> Option<HwPos> {
        if self.is_usable() {
            Some(HwPos {
                x: self.col as u8,
                y: (self.row - 1) as u8,
            })
        } else {
            None
        }
    }

    /// Return a copy of this position, moved up by a certain number of rows
    pub fn up(self, steps: i32) -> Self {
        TablePos { row: self.row - steps, col: self.col }
    }

    /// Return a copy of this position, moved down by a certain number of rows
    pub fn down(self, steps: i32) -> Self {
        TablePos { row: self.row + steps, col: self.col }
    }

    /// Return a copy of this position, moved left by a certain number of columns
    pub fn left(self, steps: i32) -> Self {
        TablePos { row: self.row, col: self.col - steps }
    }

    /// Return a copy of this position, moved right by a certain number of columns
    pub fn right(self, steps: i32) -> Self {
        TablePos { row: self.row, col: self.col + steps }
    }

    /// The four orthogonal neighbors of this cell.
    pub fn neighbors_4(self) -> [TablePos; 4] {
        [self.up(1), self.right(1), self.down(1), self.left(1)]
    }
}

/// `anchor + offset` resolves a template-relative offset to an absolute cell.
impl std::ops::Add<Offset> for TablePos {
    type Output = TablePos;

    fn add(self, offset: Offset) -> TablePos {
        TablePos {
            row: self.row + offset.row,
            col: self.col + offset.col,
        }
    }
}

/// `cell - anchor` recovers the offset of a cell relative to an anchor.
impl std::ops::Sub<TablePos> for TablePos {
    type Output = Offset;

    fn sub(self, anchor: TablePos) -> Offset {
        Offset {
            row: self.row - anchor.row,
            col: self.col - anchor.col,
        }
    }
}

/// 0-based coordinates on the physical 8x8 pad grid.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Hash)]
pub struct HwPos {
    pub x: u8,
    pub y: u8,
}

impl HwPos {
    pub fn new(x: u8, y: u8) -> HwPos {
        assert!(x < 8);
        assert!(y < 8);
        HwPos { x, y }
    }

    /// The inverse of [`TablePos::to_hardware`]; always succeeds because every
    /// hardware pad has a table cell.
    pub fn to_table(self) -> TablePos {
        TablePos {
            row: self.y as i32 + 1,
            col: self.x as i32,
        }
    }

    /// Index of this pad in a row-major 64-cell frame.
    pub fn frame_index(self) -> usize {
        self.y as usize * 8 + self.x as usize
    }
}
