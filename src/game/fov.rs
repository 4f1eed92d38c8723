//! # Field of View
//!
//! Symmetric shadowcasting visibility computation.
//!
//! The map is scanned in four cardinal quadrants. Within a quadrant, rows are
//! swept outward from the origin; each row tracks a sector bounded by a start
//! and an end slope, and opaque cells split the sector for the rows behind
//! them. Slopes are kept as exact rational numbers, so the result is fully
//! deterministic and floor-to-floor visibility is reciprocal: if A sees B,
//! then B sees A.
//!
//! Walls block sight but are revealed themselves, so the wall face adjacent
//! to a lit corridor renders as visible even though nothing behind it does.

use crate::game::world::Grid;
use crate::Position;

/// Computes the cells visible from `origin` within `radius`.
///
/// `transparent` marks the see-through cells; for this game that is exactly
/// the walkable floor mask. The returned grid has the same dimensions, with
/// visible cells set. The origin is always visible. Cells farther than
/// `radius` (Euclidean) are never revealed.
///
/// # Examples
///
/// ```
/// use delve::{fov, Grid, Position};
///
/// let open = Grid::filled(9, 9, true);
/// let visible = fov::compute(&open, Position::new(4, 4), 3);
/// assert!(visible.get(Position::new(4, 1)));
/// assert!(!visible.get(Position::new(4, 0)));
/// ```
pub fn compute(transparent: &Grid, origin: Position, radius: i32) -> Grid {
    let mut visible = Grid::new(transparent.width(), transparent.height());
    if radius < 0 || !transparent.in_bounds(origin) {
        return visible;
    }
    visible.set(origin, true);

    for cardinal in [
        Cardinal::North,
        Cardinal::South,
        Cardinal::East,
        Cardinal::West,
    ] {
        let mut scan = Scan {
            quadrant: Quadrant { cardinal, origin },
            radius,
            transparent,
            visible: &mut visible,
        };
        scan.row(Row::first());
    }

    visible
}

#[derive(Debug, Clone, Copy)]
enum Cardinal {
    North,
    South,
    East,
    West,
}

/// One quarter of the plane, addressed in (depth, column) coordinates
/// relative to the origin.
#[derive(Debug, Clone, Copy)]
struct Quadrant {
    cardinal: Cardinal,
    origin: Position,
}

impl Quadrant {
    fn transform(self, depth: i32, col: i32) -> Position {
        let Position { x, y } = self.origin;
        match self.cardinal {
            Cardinal::North => Position::new(x + col, y - depth),
            Cardinal::South => Position::new(x + col, y + depth),
            Cardinal::East => Position::new(x + depth, y + col),
            Cardinal::West => Position::new(x - depth, y + col),
        }
    }
}

/// An exact rational slope `num / den` with `den > 0`.
#[derive(Debug, Clone, Copy)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    /// The slope grazing the near edge of the tile at (depth, col).
    fn of(depth: i32, col: i32) -> Self {
        Self {
            num: 2 * col - 1,
            den: 2 * depth,
        }
    }
}

/// A row of tiles at a fixed depth, bounded by the sector slopes.
#[derive(Debug, Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn first() -> Self {
        Self {
            depth: 1,
            start: Slope { num: -1, den: 1 },
            end: Slope { num: 1, den: 1 },
        }
    }

    fn next(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    /// First column of the row, rounding ties toward the sector interior.
    fn min_col(&self) -> i32 {
        div_floor(
            2 * self.depth * self.start.num + self.start.den,
            2 * self.start.den,
        )
    }

    /// Last column of the row, rounding ties toward the sector interior.
    fn max_col(&self) -> i32 {
        div_ceil(
            2 * self.depth * self.end.num - self.end.den,
            2 * self.end.den,
        )
    }

    /// Whether the tile center at (depth, col) lies inside the sector.
    ///
    /// Floor tiles are only revealed when this holds, which is what makes
    /// visibility between floor tiles reciprocal.
    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }
}

struct Scan<'a> {
    quadrant: Quadrant,
    radius: i32,
    transparent: &'a Grid,
    visible: &'a mut Grid,
}

impl Scan<'_> {
    /// Cells outside the grid block sight like walls.
    fn is_wall(&self, depth: i32, col: i32) -> bool {
        !self.transparent.get(self.quadrant.transform(depth, col))
    }

    fn reveal(&mut self, depth: i32, col: i32) {
        if depth * depth + col * col <= self.radius * self.radius {
            self.visible.set(self.quadrant.transform(depth, col), true);
        }
    }

    fn row(&mut self, mut row: Row) {
        if row.depth > self.radius {
            return;
        }

        let mut prev_wall: Option<bool> = None;
        for col in row.min_col()..=row.max_col() {
            let wall = self.is_wall(row.depth, col);
            if wall || row.is_symmetric(col) {
                self.reveal(row.depth, col);
            }
            if prev_wall == Some(true) && !wall {
                row.start = Slope::of(row.depth, col);
            }
            if prev_wall == Some(false) && wall {
                let mut shadowed = row.next();
                shadowed.end = Slope::of(row.depth, col);
                self.row(shadowed);
            }
            prev_wall = Some(wall);
        }
        if prev_wall == Some(false) {
            self.row(row.next());
        }
    }
}

// Floor/ceiling division for a possibly negative numerator and a positive
// denominator; `/` truncates toward zero and would round the wrong way.
fn div_floor(a: i32, b: i32) -> i32 {
    a.div_euclid(b)
}

fn div_ceil(a: i32, b: i32) -> i32 {
    -((-a).div_euclid(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> Grid {
        Grid::filled(width, height, true)
    }

    #[test]
    fn test_origin_is_always_visible() {
        let grid = open_grid(5, 5);
        let visible = compute(&grid, Position::new(2, 2), 0);
        assert!(visible.get(Position::new(2, 2)));
        assert_eq!(visible.count_set(), 1);
    }

    #[test]
    fn test_out_of_bounds_origin_sees_nothing() {
        let grid = open_grid(5, 5);
        let visible = compute(&grid, Position::new(-1, 2), 8);
        assert_eq!(visible.count_set(), 0);
    }

    #[test]
    fn test_open_grid_is_a_disc() {
        let grid = open_grid(9, 9);
        let origin = Position::new(4, 4);
        let radius = 3;
        let visible = compute(&grid, origin, radius);

        for y in 0..9 {
            for x in 0..9 {
                let pos = Position::new(x, y);
                let dx = x - origin.x;
                let dy = y - origin.y;
                let inside = dx * dx + dy * dy <= radius * radius;
                assert_eq!(visible.get(pos), inside, "mismatch at {:?}", pos);
            }
        }
    }

    #[test]
    fn test_wall_blocks_sight_but_is_lit() {
        let mut grid = open_grid(9, 9);
        grid.set(Position::new(4, 3), false);

        let visible = compute(&grid, Position::new(4, 4), 8);
        assert!(visible.get(Position::new(4, 3))); // the wall itself
        assert!(!visible.get(Position::new(4, 2))); // the cell behind it
        assert!(!visible.get(Position::new(4, 0)));
    }

    #[test]
    fn test_corridor_walls_are_lit() {
        // All wall except the middle row.
        let mut grid = Grid::new(5, 5);
        for x in 0..5 {
            grid.set(Position::new(x, 2), true);
        }

        let visible = compute(&grid, Position::new(2, 2), 3);
        assert!(visible.get(Position::new(0, 2)));
        assert!(visible.get(Position::new(4, 2)));
        assert!(visible.get(Position::new(2, 1))); // wall face above the corridor
        assert!(!visible.get(Position::new(2, 0))); // second rank stays dark
    }

    #[test]
    fn test_radius_cutoff_in_corridor() {
        let mut grid = Grid::new(12, 3);
        for x in 0..12 {
            grid.set(Position::new(x, 1), true);
        }

        let visible = compute(&grid, Position::new(0, 1), 5);
        assert!(visible.get(Position::new(5, 1)));
        assert!(!visible.get(Position::new(6, 1)));
    }

    #[test]
    fn test_deterministic() {
        let mut grid = open_grid(16, 16);
        for x in 3..9 {
            grid.set(Position::new(x, 7), false);
        }
        let a = compute(&grid, Position::new(8, 3), 7);
        let b = compute(&grid, Position::new(8, 3), 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reciprocity_around_a_pillar() {
        let mut grid = open_grid(11, 11);
        grid.set(Position::new(5, 5), false);

        let radius = 10;
        for y in 0..11 {
            for x in 0..11 {
                let a = Position::new(x, y);
                if !grid.get(a) {
                    continue;
                }
                let from_a = compute(&grid, a, radius);
                for yy in 0..11 {
                    for xx in 0..11 {
                        let b = Position::new(xx, yy);
                        if !grid.get(b) {
                            continue;
                        }
                        let from_b = compute(&grid, b, radius);
                        assert_eq!(
                            from_a.get(b),
                            from_b.get(a),
                            "asymmetry between {:?} and {:?}",
                            a,
                            b
                        );
                    }
                }
            }
        }
    }
}
