use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use log::debug;
use specs::prelude::Entity;

use crate::{
    combat::{self, combat_stats},
    ecs::components::{Ai, Fighter},
    world::WorldState,
};

/// How far a chaser looks for a juicier ally to go after instead.
const CHASER_ALLY_RADIUS: f32 = 4.0;
/// How far an ally looks for something to fight.
const ALLY_HUNT_RADIUS: f32 = 5.0;

/// The 29 offsets a territorial monster guards: a diamond of radius 3 plus the
/// four tips at distance 4.
pub fn danger_zone_offsets() -> Vec<Point> {
    let mut zone = Vec::with_capacity(29);
    for dy in -4_i32..=4 {
        for dx in -4_i32..=4 {
            let manhattan = dx.abs() + dy.abs();
            if manhattan <= 3 || (manhattan == 4 && (dx == 0 || dy == 0)) {
                zone.push(Point::new(dx, dy));
            }
        }
    }
    zone
}

/// One monster turn. Monsters outside the player's sight, and corpses, do
/// nothing.
pub fn take_turn(world: &mut WorldState, entity: Entity) {
    let Some(ai) = world.ecs.get::<Ai>(entity) else {
        return;
    };
    let Some(point) = world.ecs.position(entity) else {
        return;
    };
    if !world.ecs.is_visible(point) {
        return;
    }

    match ai {
        Ai::Chaser => {
            let target = chase_target(world, entity);
            engage(world, entity, target);
        }
        Ai::Territorial { home, zone } => {
            let player = world.ecs.player_point();
            let intruded = zone
                .iter()
                .any(|offset| Point::new(home.x + offset.x, home.y + offset.y) == player);
            if intruded {
                let target = world.player();
                engage(world, entity, target);
            }
        }
        Ai::Ally => match hunt_target(world, entity) {
            Some(target) => engage(world, entity, target),
            None => {
                let player = world.player();
                if world.ecs.distance(entity, player) >= 2.0 {
                    let goal = world.ecs.player_point();
                    smart_step(world, entity, goal);
                }
            }
        },
    }
}

/// Step toward `target` until adjacent, then hit it while it still stands.
fn engage(world: &mut WorldState, entity: Entity, target: Entity) {
    if world.ecs.distance(entity, target) >= 2.0 {
        if let Some(goal) = world.ecs.position(target) {
            smart_step(world, entity, goal);
        }
    } else if combat_stats(world, target).is_some_and(|stats| stats.hp > 0) {
        combat::attack(world, entity, target);
    }
}

/// The player, unless the nearest ally in reach is healthier than the player.
fn chase_target(world: &WorldState, entity: Entity) -> Entity {
    let player = world.player();
    let player_hp = combat_stats(world, player).map_or(0, |stats| stats.hp);
    nearest(world, entity, CHASER_ALLY_RADIUS, |ai| !ai.is_hostile())
        .filter(|ally| combat_stats(world, *ally).is_some_and(|stats| stats.hp > player_hp))
        .unwrap_or(player)
}

fn hunt_target(world: &WorldState, entity: Entity) -> Option<Entity> {
    nearest(world, entity, ALLY_HUNT_RADIUS, Ai::is_hostile)
}

/// Closest other fighter whose strategy passes `wanted`, within `radius`.
fn nearest(
    world: &WorldState,
    from: Entity,
    radius: f32,
    wanted: impl Fn(&Ai) -> bool,
) -> Option<Entity> {
    world
        .ecs
        .objects()
        .iter()
        .copied()
        .filter(|other| *other != from && world.ecs.has::<Fighter>(*other))
        .filter(|other| world.ecs.get::<Ai>(*other).is_some_and(|ai| wanted(&ai)))
        .map(|other| (other, world.ecs.distance(from, other)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(other, _)| other)
}

/// Moves one tile unless terrain or a blocker is in the way.
pub fn move_by(world: &mut WorldState, entity: Entity, dx: i32, dy: i32) -> bool {
    let Some(from) = world.ecs.position(entity) else {
        return false;
    };
    let dest = Point::new(from.x + dx, from.y + dy);
    if world.is_blocked(dest) {
        return false;
    }
    world.ecs.set_position(entity, dest);
    true
}

fn step_towards(from: Point, target: Point) -> (i32, i32) {
    let distance = DistanceAlg::Pythagoras.distance2d(from, target);
    if distance == 0.0 {
        return (0, 0);
    }
    let dx = (target.x - from.x) as f32;
    let dy = (target.y - from.y) as f32;
    ((dx / distance).round() as i32, (dy / distance).round() as i32)
}

/// Straight-line step toward `target`; fails silently when blocked.
pub fn move_towards(world: &mut WorldState, entity: Entity, target: Point) -> bool {
    let Some(from) = world.ecs.position(entity) else {
        return false;
    };
    let (dx, dy) = step_towards(from, target);
    if dx == 0 && dy == 0 {
        return false;
    }
    move_by(world, entity, dx, dy)
}

/// Like `move_towards`, but slides along an axis when the direct step is
/// blocked. An axis is only tried while the mover is not yet level with the
/// target on it.
pub fn smart_step(world: &mut WorldState, entity: Entity, target: Point) -> bool {
    if move_towards(world, entity, target) {
        return true;
    }
    let Some(from) = world.ecs.position(entity) else {
        return false;
    };
    let direct = step_towards(from, target);
    let nudges = [
        ((target.x - from.x).signum(), 0),
        (0, (target.y - from.y).signum()),
    ];
    for (dx, dy) in nudges {
        if (dx, dy) == (0, 0) || (dx, dy) == direct {
            continue;
        }
        if move_by(world, entity, dx, dy) {
            return true;
        }
    }
    debug!("{} is boxed in at {:?}", world.ecs.name(entity), from);
    false
}
