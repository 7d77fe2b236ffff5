use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use log::debug;

use crate::{
    data::{
        items::{ItemPayload, ItemTemplate, Scaling, choose_item, item_ceiling},
        monsters::{MonsterTemplate, choose_monster, monster_ceiling},
    },
    ecs::{EcsWorld, components::UsableItem},
    map::{Grid, generator::RoomPopulator, random_interior_point},
};

/// Stocks each freshly carved room with monsters and loot for the current
/// dungeon level.
pub struct Spawner<'a> {
    ecs: &'a mut EcsWorld,
    scaling: Scaling,
    roster: Vec<MonsterTemplate>,
    catalog: Vec<ItemTemplate>,
}

impl<'a> Spawner<'a> {
    pub fn new(ecs: &'a mut EcsWorld, dungeon_level: i32, player_max_hp: i32, player_max_mp: i32) -> Self {
        Self {
            ecs,
            scaling: Scaling {
                dungeon_level,
                player_max_hp,
                player_max_mp,
            },
            roster: MonsterTemplate::roster(),
            catalog: ItemTemplate::catalog(),
        }
    }

    /// A random interior tile of `room`, or `None` when something already
    /// blocks it. Rejected tiles are not retried.
    fn free_spot(&self, grid: &Grid, room: &Rect, rng: &mut RandomNumberGenerator) -> Option<Point> {
        let point = random_interior_point(room, rng);
        if grid.is_wall(point) || self.ecs.blocks_at(point) {
            None
        } else {
            Some(point)
        }
    }

    fn place_monsters(&mut self, grid: &Grid, room: &Rect, rng: &mut RandomNumberGenerator) -> usize {
        let level = self.scaling.dungeon_level;
        let count = rng.range(0, monster_ceiling(level) + 1);
        let mut placed = 0;
        for _ in 0..count {
            let Some(point) = self.free_spot(grid, room, rng) else {
                continue;
            };
            if let Some(template) = choose_monster(&self.roster, level, rng) {
                self.ecs.spawn_monster(&template, point);
                placed += 1;
            }
        }
        placed
    }

    fn place_items(&mut self, grid: &Grid, room: &Rect, rng: &mut RandomNumberGenerator) -> usize {
        let level = self.scaling.dungeon_level;
        let count = rng.range(0, item_ceiling(level) + 1);
        let mut placed = 0;
        for _ in 0..count {
            let Some(point) = self.free_spot(grid, room, rng) else {
                continue;
            };
            let Some(template) = choose_item(&self.catalog, level, rng) else {
                continue;
            };
            match template.kind.payload(&self.scaling) {
                ItemPayload::Usable(effect) => {
                    self.ecs.spawn_usable(
                        template.name,
                        template.glyph,
                        template.color,
                        UsableItem {
                            effect: Some(effect),
                        },
                        point,
                    );
                }
                ItemPayload::Gear(equipment) => {
                    self.ecs.spawn_gear(
                        template.name,
                        template.glyph,
                        template.color,
                        equipment,
                        point,
                    );
                }
            }
            placed += 1;
        }
        placed
    }
}

impl RoomPopulator for Spawner<'_> {
    fn populate(&mut self, grid: &Grid, room: &Rect, rng: &mut RandomNumberGenerator) {
        let monsters = self.place_monsters(grid, room, rng);
        let items = self.place_items(grid, room, rng);
        debug!(
            "room at ({}, {}): {monsters} monsters, {items} items",
            room.x1, room.y1
        );
    }

    fn is_occupied(&self, point: Point) -> bool {
        self.ecs.blocks_at(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        ecs::components::{Ai, Equipment},
        map::generator::generate_floor,
    };

    fn count_with<F: Fn(&EcsWorld, specs::prelude::Entity) -> bool>(ecs: &EcsWorld, pred: F) -> usize {
        ecs.objects().iter().filter(|e| pred(ecs, **e)).count()
    }

    #[test]
    fn populated_floor_never_stacks_blockers() {
        let config = GameConfig::default();
        let mut ecs = EcsWorld::new(Point::new(-1, -1), &config);
        let mut rng = RandomNumberGenerator::seeded(17);
        let mut spawner = Spawner::new(&mut ecs, 6, 50, 15);
        let (grid, plan) = generate_floor(&config, &mut rng, &mut spawner).unwrap();

        let mut seen = std::collections::HashSet::new();
        for entity in ecs.objects() {
            if ecs.has::<Ai>(*entity) {
                let point = ecs.position(*entity).unwrap();
                assert!(!grid.is_wall(point));
                assert!(seen.insert(point), "two monsters on {point:?}");
            }
        }
        assert!(!seen.contains(&plan.start));
    }

    #[test]
    fn first_floor_holds_only_kobolds_potions_and_swords() {
        let config = GameConfig::default();
        let mut ecs = EcsWorld::new(Point::new(-1, -1), &config);
        let mut rng = RandomNumberGenerator::seeded(23);
        let mut spawner = Spawner::new(&mut ecs, 1, 50, 15);
        generate_floor(&config, &mut rng, &mut spawner).unwrap();

        let monsters = count_with(&ecs, |ecs, e| ecs.has::<Ai>(e));
        let kobolds = count_with(&ecs, |ecs, e| ecs.has::<Ai>(e) && ecs.name(e) == "kobold");
        assert_eq!(monsters, kobolds);
        let odd_items = count_with(&ecs, |ecs, e| {
            let carried = ecs.has::<UsableItem>(e) || ecs.has::<Equipment>(e);
            let name = ecs.name(e);
            carried && name != "healing potion" && name != "sword"
        });
        assert_eq!(odd_items, 0);
    }

    #[test]
    fn gear_spawns_unequipped() {
        let config = GameConfig::default();
        let mut ecs = EcsWorld::new(Point::new(-1, -1), &config);
        let mut rng = RandomNumberGenerator::seeded(31);
        let mut spawner = Spawner::new(&mut ecs, 10, 50, 15);
        generate_floor(&config, &mut rng, &mut spawner).unwrap();
        for entity in ecs.objects() {
            if let Some(gear) = ecs.get::<Equipment>(*entity) {
                assert!(!gear.equipped);
            }
        }
    }
}
