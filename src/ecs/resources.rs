use bracket_geometry::prelude::Point;

use super::components::StatBonus;
use crate::map::Grid;

/// Opacity snapshot of the current grid, handed to the FOV system.
#[derive(Clone)]
pub struct MapContext {
    pub width: i32,
    pub height: i32,
    opaque: Vec<bool>,
}

impl MapContext {
    pub fn from_grid(grid: &Grid) -> Self {
        let opaque = (0..grid.height)
            .flat_map(|y| (0..grid.width).map(move |x| Point::new(x, y)))
            .map(|point| grid.is_opaque(point))
            .collect::<Vec<bool>>();

        Self {
            width: grid.width,
            height: grid.height,
            opaque,
        }
    }

    /// Out-of-bounds cells count as opaque.
    pub fn is_opaque(&self, point: Point) -> bool {
        if !self.in_bounds(point) {
            return true;
        }
        let idx = (point.y * self.width + point.x) as usize;
        self.opaque.get(idx).copied().unwrap_or(true)
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TurnClock {
    pub turn: u64,
    pub regen_interval: u64,
}

/// Summed bonus of the player's equipped gear for the current turn.
#[derive(Clone, Copy, Debug, Default)]
pub struct GearBonus(pub StatBonus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_mirrors_grid_opacity() {
        let mut grid = Grid::new(6, 6);
        grid.carve(Point::new(2, 3));
        let context = MapContext::from_grid(&grid);
        assert!(!context.is_opaque(Point::new(2, 3)));
        assert!(context.is_opaque(Point::new(3, 3)));
        assert!(context.is_opaque(Point::new(-1, 0)));
        assert!(context.is_opaque(Point::new(0, 6)));
    }
}
