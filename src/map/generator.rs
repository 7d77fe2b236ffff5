use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use log::{debug, info};
use thiserror::Error;

use super::{Grid, random_interior_point, room_interior};
use crate::config::GameConfig;

const START_TILE_ATTEMPTS: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no room survived {attempts} placement attempts on a {width}x{height} map")]
    NoRooms {
        attempts: usize,
        width: i32,
        height: i32,
    },

    #[error("every room tile is occupied; nowhere to place the player")]
    NoStartTile,
}

/// Fills freshly carved rooms with monsters and items.
pub trait RoomPopulator {
    fn populate(&mut self, grid: &Grid, room: &Rect, rng: &mut RandomNumberGenerator);

    /// Whether a blocking entity already stands on `point`.
    fn is_occupied(&self, point: Point) -> bool;
}

/// Accepted room footprints, in acceptance order.
#[derive(Clone, Debug, Default)]
pub struct RoomPlanner {
    rooms: Vec<Rect>,
}

impl RoomPlanner {
    /// Accepts `candidate` unless it touches or overlaps an accepted room.
    pub fn try_add(&mut self, candidate: Rect) -> bool {
        if self.rooms.iter().any(|room| room.intersect(&candidate)) {
            return false;
        }
        self.rooms.push(candidate);
        true
    }

    pub fn rooms(&self) -> &[Rect] {
        &self.rooms
    }

    pub fn last(&self) -> Option<&Rect> {
        self.rooms.last()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }
}

#[derive(Clone, Debug)]
pub struct FloorPlan {
    pub rooms: Vec<Rect>,
    pub start: Point,
    pub stairs: Point,
}

pub fn generate_floor<P: RoomPopulator>(
    config: &GameConfig,
    rng: &mut RandomNumberGenerator,
    populator: &mut P,
) -> Result<(Grid, FloorPlan), GenerationError> {
    let width = config.map_width;
    let height = config.map_height;
    let mut grid = Grid::new(width, height);
    let mut planner = RoomPlanner::default();

    for _ in 0..config.room_attempts {
        let room_w = rng.range(config.room_min, config.room_max + 1);
        let room_h = rng.range(config.room_min, config.room_max + 1);
        let room_x = rng.range(0, width - room_w);
        let room_y = rng.range(0, height - room_h);
        let candidate = Rect::with_size(room_x, room_y, room_w, room_h);

        let previous = planner.last().copied();
        if !planner.try_add(candidate) {
            continue;
        }

        grid.carve_room(&candidate);
        if let Some(previous) = previous {
            let from = random_interior_point(&previous, rng);
            let to = random_interior_point(&candidate, rng);
            let horizontal_first = rng.range(0, 2) == 0;
            grid.carve_corridor(from, to, horizontal_first);
        }
        populator.populate(&grid, &candidate, rng);
    }

    let Some(last_room) = planner.last().copied() else {
        return Err(GenerationError::NoRooms {
            attempts: config.room_attempts,
            width,
            height,
        });
    };
    let stairs = last_room.center();
    let start = pick_start(&grid, planner.rooms(), rng, populator)?;

    info!(
        "generated floor with {} rooms from {} attempts",
        planner.len(),
        config.room_attempts
    );
    debug!("player start {:?}, stairs {:?}", start, stairs);

    Ok((
        grid,
        FloorPlan {
            rooms: planner.rooms().to_vec(),
            start,
            stairs,
        },
    ))
}

fn pick_start<P: RoomPopulator>(
    grid: &Grid,
    rooms: &[Rect],
    rng: &mut RandomNumberGenerator,
    populator: &P,
) -> Result<Point, GenerationError> {
    let free = |point: Point| !grid.is_wall(point) && !populator.is_occupied(point);

    for _ in 0..START_TILE_ATTEMPTS {
        let room = &rooms[rng.range(0, rooms.len())];
        let point = random_interior_point(room, rng);
        if free(point) {
            return Ok(point);
        }
    }

    rooms
        .iter()
        .flat_map(room_interior)
        .find(|point| free(*point))
        .ok_or(GenerationError::NoStartTile)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashSet, VecDeque};

    use proptest::prelude::*;

    use super::*;

    struct EmptyRooms;

    impl RoomPopulator for EmptyRooms {
        fn populate(&mut self, _grid: &Grid, _room: &Rect, _rng: &mut RandomNumberGenerator) {}

        fn is_occupied(&self, _point: Point) -> bool {
            false
        }
    }

    fn reachable_from(grid: &Grid, origin: Point) -> HashSet<Point> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(origin);
        queue.push_back(origin);
        while let Some(point) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = Point::new(point.x + dx, point.y + dy);
                if !grid.is_wall(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn identical_candidate_is_rejected() {
        let mut planner = RoomPlanner::default();
        let room = Rect::with_size(4, 4, 6, 6);
        assert!(planner.try_add(room));
        assert!(!planner.try_add(room));
        assert_eq!(planner.len(), 1);
    }

    #[test]
    fn touching_rooms_are_rejected_but_separated_rooms_accepted() {
        let mut planner = RoomPlanner::default();
        assert!(planner.try_add(Rect::with_size(0, 0, 5, 5)));
        assert!(!planner.try_add(Rect::with_size(5, 0, 5, 5)));
        assert!(planner.try_add(Rect::with_size(6, 0, 5, 5)));
        assert_eq!(planner.len(), 2);
    }

    #[test]
    fn zero_attempts_report_no_rooms() {
        let config = GameConfig {
            room_attempts: 0,
            ..GameConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(3);
        let err = generate_floor(&config, &mut rng, &mut EmptyRooms).unwrap_err();
        assert!(matches!(err, GenerationError::NoRooms { attempts: 0, .. }));
    }

    #[test]
    fn single_attempt_always_yields_one_room() {
        let config = GameConfig {
            room_attempts: 1,
            ..GameConfig::default()
        };
        let mut rng = RandomNumberGenerator::seeded(3);
        let (_, plan) = generate_floor(&config, &mut rng, &mut EmptyRooms).unwrap();
        assert_eq!(plan.rooms.len(), 1);
    }

    #[test]
    fn stairs_sit_in_the_last_room() {
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(11);
        let (grid, plan) = generate_floor(&config, &mut rng, &mut EmptyRooms).unwrap();
        let last = plan.rooms.last().unwrap();
        assert_eq!(plan.stairs, last.center());
        assert!(!grid.is_wall(plan.stairs));
        assert!(!grid.is_wall(plan.start));
        assert!(plan.rooms.iter().any(|room| {
            plan.start.x > room.x1
                && plan.start.x < room.x2
                && plan.start.y > room.y1
                && plan.start.y < room.y2
        }));
    }

    struct Crowded;

    impl RoomPopulator for Crowded {
        fn populate(&mut self, _grid: &Grid, _room: &Rect, _rng: &mut RandomNumberGenerator) {}

        fn is_occupied(&self, _point: Point) -> bool {
            true
        }
    }

    #[test]
    fn fully_occupied_floor_has_no_start_tile() {
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(5);
        let err = generate_floor(&config, &mut rng, &mut Crowded).unwrap_err();
        assert_eq!(err, GenerationError::NoStartTile);
    }

    struct Counting {
        rooms: usize,
    }

    impl RoomPopulator for Counting {
        fn populate(&mut self, grid: &Grid, room: &Rect, _rng: &mut RandomNumberGenerator) {
            assert!(!grid.is_wall(room.center()));
            self.rooms += 1;
        }

        fn is_occupied(&self, _point: Point) -> bool {
            false
        }
    }

    #[test]
    fn every_accepted_room_is_populated_after_carving() {
        let config = GameConfig::default();
        let mut rng = RandomNumberGenerator::seeded(99);
        let mut counting = Counting { rooms: 0 };
        let (_, plan) = generate_floor(&config, &mut rng, &mut counting).unwrap();
        assert_eq!(counting.rooms, plan.rooms.len());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn all_rooms_are_connected(seed in any::<u64>()) {
            let config = GameConfig::default();
            let mut rng = RandomNumberGenerator::seeded(seed);
            let (grid, plan) = generate_floor(&config, &mut rng, &mut EmptyRooms).unwrap();
            let reachable = reachable_from(&grid, plan.start);
            for room in &plan.rooms {
                for point in room_interior(room) {
                    prop_assert!(
                        reachable.contains(&point),
                        "seed={seed}: {:?} in {:?} is cut off",
                        point,
                        room
                    );
                }
            }
        }
    }
}
