pub mod components;
pub mod resources;
pub mod systems;

use std::collections::HashSet;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_terminal::prelude::{RGB, to_cp437};
use log::debug;
use specs::prelude::{
    Builder, Component, Dispatcher, DispatcherBuilder, Entity, Join, RunNow, World as SpecsWorld,
    WorldExt,
};

use crate::{
    config::GameConfig,
    data::monsters::{Behavior, MonsterTemplate},
    map::Grid,
};

use self::{
    components::{
        Ai, AlwaysVisible, BlocksTile, DeathRoutine, Equipment, Fighter, Name, PlayerTag,
        Position, Progression, Renderable, StatBonus, UsableItem, Viewshed,
    },
    resources::{GearBonus, MapContext, TurnClock},
    systems::{FovSystem, RegenSystem},
};

pub const CORPSE_COLOR: RGB = RGB {
    r: 0.5,
    g: 0.0,
    b: 0.0,
};
pub const THRALL_COLOR: RGB = RGB {
    r: 0.5,
    g: 1.0,
    b: 0.83,
};

/// Everything that can be drawn for one entity.
#[derive(Clone, Debug)]
pub struct Drawable {
    pub point: Point,
    pub renderable: Renderable,
    pub always_visible: bool,
}

/// Owns the specs world plus the ordered list of entities on the current
/// floor. Order is draw order: index 0 is drawn first and ends up underneath.
pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    objects: Vec<Entity>,
    player: Entity,
    stairs: Entity,
}

impl EcsWorld {
    pub fn new(player_start: Point, config: &GameConfig) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        specs_world.insert(TurnClock {
            turn: 0,
            regen_interval: config.regen_interval,
        });
        specs_world.insert(GearBonus::default());
        let player = Self::spawn_player(&mut specs_world, player_start, config);
        let stairs = Self::spawn_stairs(&mut specs_world, player_start);
        let dispatcher = DispatcherBuilder::new()
            .with(RegenSystem, "regen", &[])
            .build();

        Self {
            specs_world,
            dispatcher,
            objects: vec![stairs, player],
            player,
            stairs,
        }
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<Name>();
        world.register::<BlocksTile>();
        world.register::<AlwaysVisible>();
        world.register::<PlayerTag>();
        world.register::<Viewshed>();
        world.register::<Fighter>();
        world.register::<Ai>();
        world.register::<UsableItem>();
        world.register::<Equipment>();
        world.register::<Progression>();
    }

    fn spawn_player(world: &mut SpecsWorld, spawn: Point, config: &GameConfig) -> Entity {
        let stats = &config.player;
        world
            .create_entity()
            .with(Position { point: spawn })
            .with(Renderable {
                glyph: to_cp437('@'),
                fg: RGB::from_u8(255, 255, 255),
            })
            .with(Name {
                name: "player".to_string(),
            })
            .with(BlocksTile)
            .with(PlayerTag)
            .with(Viewshed {
                radius: config.fov_radius,
                dirty: true,
                visible: HashSet::new(),
            })
            .with(Fighter {
                base_max_hp: stats.hp,
                base_max_mp: stats.mp,
                base_defense: stats.defense,
                base_power: stats.power,
                base_magic: stats.magic,
                base_regen: stats.regen,
                hp: stats.hp,
                mp: stats.mp,
                xp: 0,
                death: DeathRoutine::Player,
            })
            .with(Progression::default())
            .build()
    }

    fn spawn_stairs(world: &mut SpecsWorld, point: Point) -> Entity {
        world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437('>'),
                fg: RGB::from_u8(255, 255, 255),
            })
            .with(Name {
                name: "stairs".to_string(),
            })
            .with(AlwaysVisible)
            .build()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn stairs(&self) -> Entity {
        self.stairs
    }

    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    pub fn get<C: Component + Clone>(&self, entity: Entity) -> Option<C> {
        self.specs_world.read_component::<C>().get(entity).cloned()
    }

    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.specs_world.read_component::<C>().contains(entity)
    }

    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) {
        let _ = self
            .specs_world
            .write_component::<C>()
            .insert(entity, component);
    }

    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.specs_world.write_component::<C>().remove(entity)
    }

    pub fn with_mut<C: Component, R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut C) -> R,
    ) -> Option<R> {
        let mut storage = self.specs_world.write_component::<C>();
        storage.get_mut(entity).map(f)
    }

    pub fn position(&self, entity: Entity) -> Option<Point> {
        self.get::<Position>(entity).map(|pos| pos.point)
    }

    pub fn player_point(&self) -> Point {
        self.position(self.player).unwrap_or(Point::new(0, 0))
    }

    pub fn name(&self, entity: Entity) -> String {
        self.get::<Name>(entity)
            .map(|name| name.name)
            .unwrap_or_else(|| "something".to_string())
    }

    pub fn distance(&self, from: Entity, to: Entity) -> f32 {
        match (self.position(from), self.position(to)) {
            (Some(a), Some(b)) => DistanceAlg::Pythagoras.distance2d(a, b),
            _ => f32::INFINITY,
        }
    }

    /// Moves the entity; moving the player dirties its viewshed.
    pub fn set_position(&mut self, entity: Entity, point: Point) {
        self.insert(entity, Position { point });
        if entity == self.player {
            self.mark_fov_dirty();
        }
    }

    /// Whether a blocking entity stands on `point`.
    pub fn blocks_at(&self, point: Point) -> bool {
        let positions = self.specs_world.read_component::<Position>();
        let blockers = self.specs_world.read_component::<BlocksTile>();
        (&positions, &blockers).join().any(|(pos, _)| pos.point == point)
    }

    /// Terrain or a blocking entity.
    pub fn is_blocked(&self, grid: &Grid, point: Point) -> bool {
        grid.is_wall(point) || self.blocks_at(point)
    }

    /// First entity in draw order at `point` that can still fight.
    pub fn fighter_at(&self, point: Point) -> Option<Entity> {
        let positions = self.specs_world.read_component::<Position>();
        let fighters = self.specs_world.read_component::<Fighter>();
        self.objects.iter().copied().find(|entity| {
            fighters.contains(*entity)
                && positions.get(*entity).map(|pos| pos.point) == Some(point)
        })
    }

    pub fn entities_at(&self, point: Point) -> Vec<Entity> {
        let positions = self.specs_world.read_component::<Position>();
        self.objects
            .iter()
            .copied()
            .filter(|entity| positions.get(*entity).map(|pos| pos.point) == Some(point))
            .collect()
    }

    /// Names of everything visible on `point`, for mouse-look.
    pub fn names_at(&self, point: Point) -> Vec<String> {
        if !self.is_visible(point) {
            return Vec::new();
        }
        self.entities_at(point)
            .into_iter()
            .map(|entity| self.name(entity))
            .collect()
    }

    pub fn send_to_back(&mut self, entity: Entity) {
        if let Some(idx) = self.objects.iter().position(|e| *e == entity) {
            let entity = self.objects.remove(idx);
            self.objects.insert(0, entity);
        }
    }

    /// Lifts an item off the floor into a carried collection.
    pub fn remove_from_map(&mut self, entity: Entity) {
        self.objects.retain(|e| *e != entity);
        self.remove::<Position>(entity);
    }

    /// Puts a carried item back on the floor beneath everything else.
    pub fn place_on_map(&mut self, entity: Entity, point: Point) {
        self.insert(entity, Position { point });
        self.objects.insert(0, entity);
    }

    /// Deletes an entity outright, wherever it lives.
    pub fn despawn(&mut self, entity: Entity) {
        self.objects.retain(|e| *e != entity);
        let _ = self.specs_world.delete_entity(entity);
        self.specs_world.maintain();
    }

    /// Deletes everything on the floor except the player and the stairs.
    /// Carried items have no place in `objects` and survive.
    pub fn clear_floor(&mut self) {
        let doomed: Vec<Entity> = self
            .objects
            .iter()
            .copied()
            .filter(|entity| *entity != self.player && *entity != self.stairs)
            .collect();
        debug!("clearing {} entities from the floor", doomed.len());
        for entity in doomed {
            let _ = self.specs_world.delete_entity(entity);
        }
        self.specs_world.maintain();
        self.objects = vec![self.stairs, self.player];
    }

    pub fn spawn_monster(&mut self, template: &MonsterTemplate, point: Point) -> Entity {
        let ai = match template.behavior {
            Behavior::Chaser => Ai::Chaser,
            Behavior::Territorial => Ai::Territorial {
                home: point,
                zone: crate::ai::danger_zone_offsets(),
            },
        };
        let entity = self
            .specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437(template.glyph),
                fg: template.color,
            })
            .with(Name {
                name: template.name.to_string(),
            })
            .with(BlocksTile)
            .with(Fighter::monster(
                template.hp,
                template.defense,
                template.power,
                template.xp,
            ))
            .with(ai)
            .build();
        self.objects.push(entity);
        entity
    }

    pub fn spawn_usable(
        &mut self,
        name: &str,
        glyph: char,
        fg: RGB,
        item: UsableItem,
        point: Point,
    ) -> Entity {
        let entity = self
            .item_builder(name, glyph, fg, point)
            .with(item)
            .build();
        self.objects.insert(0, entity);
        entity
    }

    pub fn spawn_gear(
        &mut self,
        name: &str,
        glyph: char,
        fg: RGB,
        equipment: Equipment,
        point: Point,
    ) -> Entity {
        let entity = self
            .item_builder(name, glyph, fg, point)
            .with(equipment)
            .build();
        self.objects.insert(0, entity);
        entity
    }

    fn item_builder(
        &mut self,
        name: &str,
        glyph: char,
        fg: RGB,
        point: Point,
    ) -> specs::EntityBuilder<'_> {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: to_cp437(glyph),
                fg,
            })
            .with(Name {
                name: name.to_string(),
            })
            .with(AlwaysVisible)
    }

    /// Turns a slain monster into inert scenery.
    pub fn make_corpse(&mut self, entity: Entity) {
        let name = self.name(entity);
        self.insert(
            entity,
            Name {
                name: format!("remains of {name}"),
            },
        );
        self.insert(
            entity,
            Renderable {
                glyph: to_cp437('%'),
                fg: CORPSE_COLOR,
            },
        );
        self.remove::<BlocksTile>(entity);
        self.remove::<Fighter>(entity);
        self.remove::<Ai>(entity);
        self.send_to_back(entity);
    }

    pub fn mark_player_fallen(&mut self) {
        let player = self.player;
        self.with_mut::<Renderable, _>(player, |render| {
            render.glyph = to_cp437('%');
            render.fg = CORPSE_COLOR;
        });
    }

    pub fn mark_fov_dirty(&mut self) {
        let player = self.player;
        self.with_mut::<Viewshed, _>(player, |viewshed| viewshed.dirty = true);
    }

    pub fn fov_dirty(&self) -> bool {
        self.get::<Viewshed>(self.player)
            .map_or(false, |viewshed| viewshed.dirty)
    }

    /// Recomputes the player's visible set if something dirtied it, and marks
    /// the newly seen tiles explored. Returns whether a recompute happened.
    pub fn refresh_visibility(&mut self, grid: &mut Grid) -> bool {
        if !self.fov_dirty() {
            return false;
        }
        self.specs_world.insert(MapContext::from_grid(grid));
        FovSystem.run_now(&self.specs_world);
        let viewsheds = self.specs_world.read_component::<Viewshed>();
        if let Some(viewshed) = viewsheds.get(self.player) {
            for point in &viewshed.visible {
                grid.reveal_point(*point);
            }
        }
        true
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.specs_world
            .read_component::<Viewshed>()
            .get(self.player)
            .map_or(false, |viewshed| viewshed.visible.contains(&point))
    }

    pub fn visible_points(&self) -> HashSet<Point> {
        self.get::<Viewshed>(self.player)
            .map(|viewshed| viewshed.visible)
            .unwrap_or_default()
    }

    /// Runs the once-per-turn upkeep systems.
    pub fn run_upkeep(&mut self, turn: u64, gear: StatBonus) {
        let regen_interval = self.specs_world.fetch::<TurnClock>().regen_interval;
        self.specs_world.insert(TurnClock {
            turn,
            regen_interval,
        });
        self.specs_world.insert(GearBonus(gear));
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
    }

    pub fn drawables(&self) -> Vec<Drawable> {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let always = self.specs_world.read_component::<AlwaysVisible>();
        self.objects
            .iter()
            .filter_map(|entity| {
                let point = positions.get(*entity)?.point;
                let renderable = renderables.get(*entity)?.clone();
                Some(Drawable {
                    point,
                    renderable,
                    always_visible: always.contains(*entity),
                })
            })
            .collect()
    }

    /// Absolute cells guarded by every living territorial monster.
    pub fn danger_zones(&self) -> HashSet<Point> {
        let ais = self.specs_world.read_component::<Ai>();
        let mut cells = HashSet::new();
        for ai in (&ais).join() {
            if let Ai::Territorial { home, zone } = ai {
                cells.extend(
                    zone.iter()
                        .map(|offset| Point::new(home.x + offset.x, home.y + offset.y)),
                );
            }
        }
        cells
    }
}
