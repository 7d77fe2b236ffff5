pub mod generator;

use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

pub use generator::GenerationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub blocked: bool,
    pub blocks_sight: bool,
    pub explored: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    /// `blocks_sight` follows `blocked` unless explicitly overridden.
    pub fn new(blocked: bool, blocks_sight: Option<bool>) -> Self {
        Self {
            blocked,
            blocks_sight: blocks_sight.unwrap_or(blocked),
            explored: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(true, None)
    }
}

/// Cells of one dungeon floor, stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.idx(point.x, point.y).map(|idx| &self.tiles[idx])
    }

    pub fn tile_at_mut(&mut self, point: Point) -> Option<&mut Tile> {
        self.idx(point.x, point.y).map(|idx| &mut self.tiles[idx])
    }

    /// Terrain-only half of the blocking query; entities are checked by the ECS.
    pub fn is_wall(&self, point: Point) -> bool {
        self.tile_at(point).map_or(true, |tile| tile.blocked)
    }

    pub fn is_opaque(&self, point: Point) -> bool {
        self.tile_at(point).map_or(true, |tile| tile.blocks_sight)
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.tile_at(point).map_or(false, |tile| tile.explored)
    }

    pub fn reveal_point(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.explored = true;
        }
    }

    pub fn carve(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.blocked = false;
            tile.blocks_sight = false;
        }
    }

    /// Opens the interior of `room`, leaving its outline as wall.
    pub fn carve_room(&mut self, room: &Rect) {
        for point in room_interior(room) {
            self.carve(point);
        }
    }

    pub fn carve_corridor(&mut self, start: Point, end: Point, horizontal_first: bool) {
        for point in corridor_path(start, end, horizontal_first) {
            self.carve(point);
        }
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if !self.is_wall(point) {
                    points.push(point);
                }
            }
        }
        points
    }
}

pub fn room_interior(room: &Rect) -> impl Iterator<Item = Point> + '_ {
    ((room.y1 + 1)..room.y2)
        .flat_map(move |y| ((room.x1 + 1)..room.x2).map(move |x| Point::new(x, y)))
}

pub fn random_interior_point(room: &Rect, rng: &mut RandomNumberGenerator) -> Point {
    Point::new(
        rng.range(room.x1 + 1, room.x2),
        rng.range(room.y1 + 1, room.y2),
    )
}

/// L-shaped path from `start` to `end`, bending at `(end.x, start.y)` when the
/// horizontal leg goes first and at `(start.x, end.y)` otherwise.
pub fn corridor_path(start: Point, end: Point, horizontal_first: bool) -> Vec<Point> {
    let mut path = Vec::new();
    let mut cursor = start;
    path.push(cursor);

    let walk_x = |cursor: &mut Point, path: &mut Vec<Point>| {
        while cursor.x != end.x {
            cursor.x += if end.x > cursor.x { 1 } else { -1 };
            path.push(*cursor);
        }
    };
    let walk_y = |cursor: &mut Point, path: &mut Vec<Point>| {
        while cursor.y != end.y {
            cursor.y += if end.y > cursor.y { 1 } else { -1 };
            path.push(*cursor);
        }
    };

    if horizontal_first {
        walk_x(&mut cursor, &mut path);
        walk_y(&mut cursor, &mut path);
    } else {
        walk_y(&mut cursor, &mut path);
        walk_x(&mut cursor, &mut path);
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_is_solid_and_unexplored() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.tiles.len(), 80);
        assert!(grid
            .tiles
            .iter()
            .all(|tile| tile.blocked && tile.blocks_sight && !tile.explored));
    }

    #[test]
    fn sight_follows_blocking_unless_overridden() {
        assert!(Tile::new(true, None).blocks_sight);
        assert!(!Tile::new(false, None).blocks_sight);
        let window = Tile::new(true, Some(false));
        assert!(window.blocked);
        assert!(!window.blocks_sight);
    }

    #[test]
    fn out_of_bounds_is_wall_and_opaque() {
        let grid = Grid::new(5, 5);
        assert!(grid.is_wall(Point::new(-1, 2)));
        assert!(grid.is_opaque(Point::new(2, 5)));
        assert!(!grid.is_explored(Point::new(9, 9)));
    }

    #[test]
    fn carving_a_room_keeps_its_outline() {
        let mut grid = Grid::new(12, 12);
        let room = Rect::with_size(1, 1, 5, 4);
        grid.carve_room(&room);
        assert!(grid.is_wall(Point::new(1, 1)));
        assert!(grid.is_wall(Point::new(6, 3)));
        assert!(!grid.is_wall(Point::new(2, 2)));
        assert!(!grid.is_wall(Point::new(5, 4)));
        assert_eq!(room_interior(&room).count(), 4 * 3);
    }

    #[test]
    fn corridor_bends_at_the_chosen_corner() {
        let start = Point::new(1, 1);
        let end = Point::new(4, 3);
        let horizontal = corridor_path(start, end, true);
        assert!(horizontal.contains(&Point::new(4, 1)));
        assert!(!horizontal.contains(&Point::new(1, 3)));
        let vertical = corridor_path(start, end, false);
        assert!(vertical.contains(&Point::new(1, 3)));
        assert_eq!(*vertical.last().unwrap(), end);
        assert_eq!(horizontal.len(), 6);
    }

    #[test]
    fn explored_sticks_once_revealed() {
        let mut grid = Grid::new(4, 4);
        grid.reveal_point(Point::new(2, 2));
        assert!(grid.is_explored(Point::new(2, 2)));
        grid.carve(Point::new(2, 2));
        assert!(grid.is_explored(Point::new(2, 2)));
    }
}
