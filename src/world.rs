use crate::error::RenderError;

pub const GRID_SIZE: f64 = 64.0;
pub const MAP_SIZE: usize = 4;

/// Demo layout, `walls_h[row][col]`.
pub const DEMO_WALLS_H: [&[u8]; MAP_SIZE + 1] = [
    &[1, 1, 1, 1],
    &[1, 0, 0, 0],
    &[0, 1, 1, 0],
    &[0, 1, 1, 1],
    &[1, 1, 1, 1],
];

/// Demo layout, `walls_v[col][row]`.
pub const DEMO_WALLS_V: [&[u8]; MAP_SIZE + 1] = [
    &[1, 1, 1, 1],
    &[0, 1, 0, 0],
    &[0, 0, 0, 0],
    &[1, 0, 0, 0],
    &[1, 1, 1, 1],
];

/// Which grid a wall flag lives in.
///
/// Horizontal walls lie on lines of constant world Y and are stored
/// `walls_h[row][col]`; vertical walls lie on lines of constant world X and
/// are stored `walls_v[col][row]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    Horizontal,
    Vertical,
}

/// Square wall layout of `size` x `size` cells, `grid_size` world units each.
pub struct GridMap {
    size: usize,
    grid_size: f64,
    walls_h: Vec<Vec<bool>>, // size + 1 rows of size cols
    walls_v: Vec<Vec<bool>>, // size + 1 cols of size rows
}

impl GridMap {
    pub fn new(
        size: usize,
        grid_size: f64,
        walls_h: Vec<Vec<bool>>,
        walls_v: Vec<Vec<bool>>,
    ) -> Result<Self, RenderError> {
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return Err(RenderError::InvalidGridSize(grid_size));
        }
        check_shape(WallKind::Horizontal, &walls_h, size)?;
        check_shape(WallKind::Vertical, &walls_v, size)?;
        Ok(Self {
            size,
            grid_size,
            walls_h,
            walls_v,
        })
    }

    /// Map without a single wall; every ray escapes through the boundary.
    pub fn open(size: usize, grid_size: f64) -> Result<Self, RenderError> {
        let empty = vec![vec![false; size]; size + 1];
        Self::new(size, grid_size, empty.clone(), empty)
    }

    /// Map whose only walls are the outer boundary.
    pub fn enclosed(size: usize, grid_size: f64) -> Result<Self, RenderError> {
        let mut lines = vec![vec![false; size]; size + 1];
        lines[0].fill(true);
        lines[size].fill(true);
        Self::new(size, grid_size, lines.clone(), lines)
    }

    /// Builds a map from 0/1 rows, the way layouts are usually written down.
    pub fn from_flags(
        size: usize,
        grid_size: f64,
        walls_h: &[&[u8]],
        walls_v: &[&[u8]],
    ) -> Result<Self, RenderError> {
        Self::new(size, grid_size, lines_from_flags(walls_h), lines_from_flags(walls_v))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// World-space side length of the whole map.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.size as f64 * self.grid_size
    }

    #[inline]
    pub fn contains(&self, kind: WallKind, col: i64, row: i64) -> bool {
        let size = self.size as i64;
        match kind {
            WallKind::Horizontal => (0..size).contains(&col) && (0..=size).contains(&row),
            WallKind::Vertical => (0..=size).contains(&col) && (0..size).contains(&row),
        }
    }

    /// Out-of-range indices read as open space.
    #[inline]
    pub fn wall_at(&self, kind: WallKind, col: i64, row: i64) -> bool {
        if !self.contains(kind, col, row) {
            return false;
        }
        let (col, row) = (col as usize, row as usize);
        match kind {
            WallKind::Horizontal => self.walls_h[row][col],
            WallKind::Vertical => self.walls_v[col][row],
        }
    }
}

/// The 4x4 demo layout. Its shape is fixed, so it skips `check_shape`.
impl Default for GridMap {
    fn default() -> Self {
        Self {
            size: MAP_SIZE,
            grid_size: GRID_SIZE,
            walls_h: lines_from_flags(&DEMO_WALLS_H),
            walls_v: lines_from_flags(&DEMO_WALLS_V),
        }
    }
}

fn lines_from_flags(lines: &[&[u8]]) -> Vec<Vec<bool>> {
    lines
        .iter()
        .map(|line| line.iter().map(|&flag| flag > 0).collect())
        .collect()
}

fn check_shape(kind: WallKind, lines: &[Vec<bool>], size: usize) -> Result<(), RenderError> {
    if lines.len() != size + 1 {
        return Err(RenderError::MapShape {
            kind,
            detail: format!("expected {} lines, got {}", size + 1, lines.len()),
        });
    }
    if let Some((i, line)) = lines.iter().enumerate().find(|(_, l)| l.len() != size) {
        return Err(RenderError::MapShape {
            kind,
            detail: format!("line {} has {} cells, expected {}", i, line.len(), size),
        });
    }
    Ok(())
}
