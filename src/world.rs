use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use log::info;
use specs::prelude::Entity;

use crate::{
    config::GameConfig,
    ecs::EcsWorld,
    gamelog::{GOOD, GameLog, WARN},
    map::{GenerationError, Grid, generator::generate_floor},
    spawner::Spawner,
};

/// Everything one run owns. Passed by `&mut` to whichever phase of the turn
/// is active.
pub struct WorldState {
    pub config: GameConfig,
    pub grid: Grid,
    pub ecs: EcsWorld,
    pub inventory: Vec<Entity>,
    pub equipment: Vec<Entity>,
    pub dungeon_level: i32,
    pub turn: u64,
    pub player_dead: bool,
    pub log: GameLog,
    pub rng: RandomNumberGenerator,
}

impl WorldState {
    pub fn new(config: GameConfig) -> Result<Self, GenerationError> {
        let rng = match config.seed {
            Some(seed) => RandomNumberGenerator::seeded(seed),
            None => RandomNumberGenerator::new(),
        };
        let mut world = Self::empty(config, rng);
        world.build_floor()?;
        world
            .log
            .push("Welcome to the dungeon. Find the stairs down.", WARN);
        Ok(world)
    }

    /// A world with an unbuilt floor, the player parked at the origin.
    pub fn empty(config: GameConfig, rng: RandomNumberGenerator) -> Self {
        let grid = Grid::new(config.map_width, config.map_height);
        let ecs = EcsWorld::new(Point::new(0, 0), &config);
        Self {
            config,
            grid,
            ecs,
            inventory: Vec::new(),
            equipment: Vec::new(),
            dungeon_level: 1,
            turn: 0,
            player_dead: false,
            log: GameLog::default(),
            rng,
        }
    }

    pub fn player(&self) -> Entity {
        self.ecs.player()
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        self.ecs.is_blocked(&self.grid, point)
    }

    pub fn refresh_visibility(&mut self) -> bool {
        self.ecs.refresh_visibility(&mut self.grid)
    }

    /// Replaces the grid and everything on it with a fresh floor for the
    /// current dungeon level.
    pub fn build_floor(&mut self) -> Result<(), GenerationError> {
        self.ecs.clear_floor();
        let player = self.ecs.player();
        let stairs = self.ecs.stairs();
        self.ecs.set_position(player, Point::new(-1, -1));

        let stats = crate::combat::combat_stats(self, player);
        let (max_hp, max_mp) = stats.map_or((0, 0), |s| (s.max_hp, s.max_mp));
        let mut spawner = Spawner::new(&mut self.ecs, self.dungeon_level, max_hp, max_mp);
        let (grid, plan) = generate_floor(&self.config, &mut self.rng, &mut spawner)?;

        self.grid = grid;
        self.ecs.set_position(stairs, plan.stairs);
        self.ecs.set_position(player, plan.start);
        self.ecs.mark_fov_dirty();
        info!(
            "dungeon level {} ready: {} rooms, start {:?}, stairs {:?}",
            self.dungeon_level,
            plan.rooms.len(),
            plan.start,
            plan.stairs
        );
        Ok(())
    }

    /// Takes the stairs: deeper level, new floor, then a rest heal scaled by
    /// the player's regen.
    pub fn next_level(&mut self) -> Result<(), GenerationError> {
        self.dungeon_level += 1;
        self.build_floor()?;

        let player = self.player();
        if let Some(stats) = crate::combat::combat_stats(self, player) {
            let factor = 0.14 + stats.regen as f32 * 0.01;
            let hp = (stats.max_hp as f32 * factor).floor() as i32;
            let mp = (stats.max_mp as f32 * factor).floor() as i32;
            crate::combat::heal(self, player, hp, mp);
        }
        self.log
            .push("During a calm moment, you find time to rest.", GOOD);
        self.log.push(
            format!("You descend to dungeon level {}.", self.dungeon_level),
            WARN,
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combat_stats;

    fn seeded(seed: u64) -> WorldState {
        let config = GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        };
        WorldState::new(config).unwrap()
    }

    #[test]
    fn new_world_places_player_on_open_floor() {
        let world = seeded(3);
        let start = world.ecs.player_point();
        assert!(!world.grid.is_wall(start));
        let stairs = world.ecs.position(world.ecs.stairs()).unwrap();
        assert!(!world.grid.is_wall(stairs));
        assert_eq!(world.dungeon_level, 1);
    }

    #[test]
    fn descending_rebuilds_and_rests() {
        let mut world = seeded(5);
        let player = world.player();
        world
            .ecs
            .with_mut::<crate::ecs::components::Fighter, _>(player, |f| f.hp = 10);
        world.next_level().unwrap();
        assert_eq!(world.dungeon_level, 2);
        // 50 * (0.14 + 0.01) = 7.5 -> 7
        assert_eq!(combat_stats(&world, player).unwrap().hp, 17);
        assert!(world.ecs.fov_dirty());
        assert!(world.log.contains("dungeon level 2"));
    }

    #[test]
    fn carried_items_survive_the_stairs() {
        let mut world = seeded(8);
        let potion = world.ecs.spawn_usable(
            "healing potion",
            '!',
            crate::gamelog::BAD,
            crate::ecs::components::UsableItem { effect: None },
            world.ecs.player_point(),
        );
        world.ecs.remove_from_map(potion);
        world.inventory.push(potion);
        world.next_level().unwrap();
        assert_eq!(world.ecs.name(potion), "healing potion");
        assert!(!world.ecs.objects().contains(&potion));
    }
}
