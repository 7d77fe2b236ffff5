use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, field_of_view};
use specs::prelude::*;

use super::{
    components::{Fighter, PlayerTag, Position, Viewshed},
    resources::{GearBonus, MapContext, TurnClock},
};

/// Recomputes dirty viewsheds; clean ones keep last turn's result.
#[derive(Default)]
pub struct FovSystem;

impl<'a> System<'a> for FovSystem {
    type SystemData = (
        ReadExpect<'a, MapContext>,
        WriteStorage<'a, Viewshed>,
        ReadStorage<'a, Position>,
    );

    fn run(&mut self, (map, mut viewsheds, positions): Self::SystemData) {
        let fov_map = OpacityMap { ctx: &map };
        for (viewshed, pos) in (&mut viewsheds, &positions).join() {
            if !viewshed.dirty {
                continue;
            }
            viewshed.visible = field_of_view(pos.point, viewshed.radius, &fov_map)
                .into_iter()
                .filter(|point| map.in_bounds(*point))
                .collect();
            viewshed.dirty = false;
        }
    }
}

/// Passive regeneration: every `regen_interval` turns the player recovers
/// its effective regen in both hp and mp.
#[derive(Default)]
pub struct RegenSystem;

impl<'a> System<'a> for RegenSystem {
    type SystemData = (
        ReadExpect<'a, TurnClock>,
        ReadExpect<'a, GearBonus>,
        ReadStorage<'a, PlayerTag>,
        WriteStorage<'a, Fighter>,
    );

    fn run(&mut self, (clock, gear, players, mut fighters): Self::SystemData) {
        if clock.regen_interval == 0 || clock.turn == 0 || clock.turn % clock.regen_interval != 0 {
            return;
        }
        for (fighter, _) in (&mut fighters, &players).join() {
            if fighter.hp <= 0 {
                continue;
            }
            let amount = fighter.regen(&gear.0);
            if amount > 0 {
                fighter.heal(amount, amount, &gear.0);
            }
        }
    }
}

struct OpacityMap<'a> {
    ctx: &'a MapContext,
}

impl<'a> BaseMap for OpacityMap<'a> {
    fn is_opaque(&self, idx: usize) -> bool {
        let point = self.index_to_point2d(idx);
        self.ctx.is_opaque(point)
    }
}

impl<'a> Algorithm2D for OpacityMap<'a> {
    fn dimensions(&self) -> Point {
        Point::new(self.ctx.width, self.ctx.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        self.ctx.in_bounds(point)
    }
}

#[cfg(test)]
mod tests {
    use bracket_geometry::prelude::Rect;

    use super::*;
    use crate::ecs::components::{DeathRoutine, StatBonus};
    use crate::map::Grid;

    fn world_with(grid: &Grid) -> World {
        let mut world = World::new();
        world.register::<Viewshed>();
        world.register::<Position>();
        world.register::<Fighter>();
        world.register::<PlayerTag>();
        world.insert(MapContext::from_grid(grid));
        world
    }

    #[test]
    fn fov_stops_at_walls_but_lights_them() {
        let mut grid = Grid::new(20, 10);
        grid.carve_room(&Rect::with_size(1, 1, 6, 6));
        let mut world = world_with(&grid);
        let viewer = world
            .create_entity()
            .with(Position {
                point: Point::new(3, 3),
            })
            .with(Viewshed {
                radius: 8,
                dirty: true,
                ..Viewshed::default()
            })
            .build();

        FovSystem.run_now(&world);

        let viewsheds = world.read_component::<Viewshed>();
        let viewshed = viewsheds.get(viewer).unwrap();
        assert!(!viewshed.dirty);
        assert!(viewshed.visible.contains(&Point::new(5, 5)));
        assert!(viewshed.visible.contains(&Point::new(1, 3)));
        assert!(!viewshed.visible.contains(&Point::new(10, 3)));
    }

    #[test]
    fn clean_viewshed_is_left_alone() {
        let mut grid = Grid::new(10, 10);
        grid.carve_room(&Rect::with_size(0, 0, 8, 8));
        let mut world = world_with(&grid);
        let viewer = world
            .create_entity()
            .with(Position {
                point: Point::new(3, 3),
            })
            .with(Viewshed {
                radius: 8,
                dirty: false,
                ..Viewshed::default()
            })
            .build();

        FovSystem.run_now(&world);

        let viewsheds = world.read_component::<Viewshed>();
        assert!(viewsheds.get(viewer).unwrap().visible.is_empty());
    }

    fn regen_world(turn: u64) -> (World, Entity) {
        let mut world = world_with(&Grid::new(1, 1));
        world.insert(TurnClock {
            turn,
            regen_interval: 10,
        });
        world.insert(GearBonus(StatBonus {
            regen: 1,
            ..StatBonus::default()
        }));
        let player = world
            .create_entity()
            .with(PlayerTag)
            .with(Fighter {
                base_max_hp: 30,
                base_max_mp: 10,
                base_defense: 0,
                base_power: 1,
                base_magic: 0,
                base_regen: 2,
                hp: 10,
                mp: 9,
                xp: 0,
                death: DeathRoutine::Player,
            })
            .build();
        (world, player)
    }

    #[test]
    fn regen_fires_on_interval_and_counts_gear() {
        let (world, player) = regen_world(20);
        RegenSystem.run_now(&world);
        let fighters = world.read_component::<Fighter>();
        let fighter = fighters.get(player).unwrap();
        assert_eq!(fighter.hp, 13);
        assert_eq!(fighter.mp, 10);
    }

    #[test]
    fn regen_waits_between_intervals() {
        let (world, player) = regen_world(7);
        RegenSystem.run_now(&world);
        let fighters = world.read_component::<Fighter>();
        assert_eq!(fighters.get(player).unwrap().hp, 10);
    }
}
