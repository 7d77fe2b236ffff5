use log::debug;
use specs::prelude::Entity;

use crate::{
    combat::{self, combat_stats},
    ecs::{
        THRALL_COLOR,
        components::{Ai, Fighter, Renderable, Spell},
    },
    gamelog::{BAD, GOOD, MAGIC, WARN},
    world::WorldState,
};

/// What a scroll, potion or spell does, with its arguments already bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Heal { min: i32, max: i32, mp_cost: i32 },
    RestoreMana { min: i32, max: i32 },
    MagicMissile { damage: i32, mp_cost: i32 },
    Teleport,
    Enthrall { range: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UseOutcome {
    Consumed,
    Cancelled,
}

impl Effect {
    /// Spell effects scale with the caster's effective magic.
    pub fn for_spell(spell: Spell, magic: i32) -> Self {
        match spell {
            Spell::MinorHeal => {
                let min = (magic as f32 * 0.25) as i32;
                let max = ((magic as f32 * 0.75) as i32).max(min);
                Effect::Heal {
                    min: min.max(1),
                    max: max.max(1),
                    mp_cost: spell.mp_cost(),
                }
            }
            Spell::MagicMissile => Effect::MagicMissile {
                damage: ((magic as f32 * 0.5) as i32).max(1),
                mp_cost: spell.mp_cost(),
            },
        }
    }

    pub fn apply(&self, world: &mut WorldState) -> UseOutcome {
        match *self {
            Effect::Heal { min, max, mp_cost } => heal(world, min, max, mp_cost),
            Effect::RestoreMana { min, max } => restore_mana(world, min, max),
            Effect::MagicMissile { damage, mp_cost } => magic_missile(world, damage, mp_cost),
            Effect::Teleport => teleport(world),
            Effect::Enthrall { range } => enthrall(world, range),
        }
    }
}

pub fn cast(world: &mut WorldState, spell: Spell) -> UseOutcome {
    let magic = combat_stats(world, world.player()).map_or(0, |stats| stats.magic);
    Effect::for_spell(spell, magic).apply(world)
}

fn roll(world: &mut WorldState, min: i32, max: i32) -> i32 {
    world.rng.range(min, max.max(min) + 1)
}

fn spend_mana(world: &mut WorldState, cost: i32) -> bool {
    let player = world.player();
    let available = combat_stats(world, player).map_or(0, |stats| stats.mp);
    if available < cost {
        debug!("refused: {cost} mp needed, {available} available");
        world
            .log
            .push(format!("You need {cost} MP, but only have {available}."), BAD);
        return false;
    }
    world
        .ecs
        .with_mut::<Fighter, _>(player, |fighter| fighter.mp -= cost);
    true
}

fn heal(world: &mut WorldState, min: i32, max: i32, mp_cost: i32) -> UseOutcome {
    let player = world.player();
    let Some(stats) = combat_stats(world, player) else {
        return UseOutcome::Cancelled;
    };
    if stats.hp >= stats.max_hp {
        world.log.push("You are already at full health.", BAD);
        return UseOutcome::Cancelled;
    }
    if !spend_mana(world, mp_cost) {
        return UseOutcome::Cancelled;
    }
    let amount = roll(world, min, max);
    combat::heal(world, player, amount, 0);
    world
        .log
        .push(format!("Your wounds start to feel better. (+{amount} HP)"), GOOD);
    UseOutcome::Consumed
}

fn restore_mana(world: &mut WorldState, min: i32, max: i32) -> UseOutcome {
    let player = world.player();
    let Some(stats) = combat_stats(world, player) else {
        return UseOutcome::Cancelled;
    };
    if stats.mp >= stats.max_mp {
        world.log.push("Your mana is already full.", BAD);
        return UseOutcome::Cancelled;
    }
    let amount = roll(world, min, max);
    combat::heal(world, player, 0, amount);
    world
        .log
        .push(format!("Your mind clears. (+{amount} MP)"), MAGIC);
    UseOutcome::Consumed
}

fn magic_missile(world: &mut WorldState, damage: i32, mp_cost: i32) -> UseOutcome {
    let range = world.config.fov_radius as f32;
    let Some(target) = closest_enemy(world, range) else {
        world.log.push("No enemy is close enough to strike.", BAD);
        return UseOutcome::Cancelled;
    };
    if !spend_mana(world, mp_cost) {
        return UseOutcome::Cancelled;
    }
    let name = world.ecs.name(target);
    world.log.push(
        format!("A bolt of pale energy strikes the {name} for {damage} damage!"),
        MAGIC,
    );
    combat::take_damage(world, target, damage);
    UseOutcome::Consumed
}

fn teleport(world: &mut WorldState) -> UseOutcome {
    let player = world.player();
    let origin = world.ecs.player_point();
    let candidates: Vec<_> = world
        .grid
        .walkable_points()
        .into_iter()
        .filter(|point| *point != origin && !world.ecs.blocks_at(*point))
        .collect();
    if candidates.is_empty() {
        world.log.push("The scroll fizzles; there is nowhere to go.", BAD);
        return UseOutcome::Cancelled;
    }
    let destination = candidates[world.rng.range(0, candidates.len())];
    world.ecs.set_position(player, destination);
    world
        .log
        .push("Space folds around you, and you are elsewhere.", MAGIC);
    UseOutcome::Consumed
}

fn enthrall(world: &mut WorldState, range: i32) -> UseOutcome {
    let Some(target) = closest_enemy(world, range as f32) else {
        world.log.push("No creature is close enough to enthrall.", BAD);
        return UseOutcome::Cancelled;
    };
    world.ecs.insert(target, Ai::Ally);
    world
        .ecs
        .with_mut::<Renderable, _>(target, |render| render.fg = THRALL_COLOR);
    let name = world.ecs.name(target);
    world
        .log
        .push(format!("The {name} is bound to your will!"), WARN);
    UseOutcome::Consumed
}

/// Nearest visible hostile fighter within `max_range`. Allies and the player
/// are never chosen.
pub fn closest_enemy(world: &WorldState, max_range: f32) -> Option<Entity> {
    let player = world.player();
    world
        .ecs
        .objects()
        .iter()
        .copied()
        .filter(|entity| *entity != player && world.ecs.has::<Fighter>(*entity))
        .filter(|entity| {
            world
                .ecs
                .get::<Ai>(*entity)
                .map_or(true, |ai| ai.is_hostile())
        })
        .filter(|entity| {
            world
                .ecs
                .position(*entity)
                .is_some_and(|point| world.ecs.is_visible(point))
        })
        .map(|entity| (entity, world.ecs.distance(player, entity)))
        .filter(|(_, distance)| *distance <= max_range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}
