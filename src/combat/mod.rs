pub mod progression;

use log::info;
use specs::prelude::Entity;

use crate::{
    ecs::components::{DeathRoutine, Equipment, Fighter, StatBonus},
    gamelog::{BAD, GRAY, WARN},
    world::WorldState,
};

/// Effective combat numbers for one entity, gear included.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatStats {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub defense: i32,
    pub power: i32,
    pub magic: i32,
    pub regen: i32,
    pub xp: i32,
}

/// Sum of every equipped item the player carries.
pub fn gear_bonus(world: &WorldState) -> StatBonus {
    world
        .equipment
        .iter()
        .filter_map(|entity| world.ecs.get::<Equipment>(*entity))
        .filter(|gear| gear.equipped)
        .map(|gear| gear.bonus)
        .sum()
}

/// Only the player wears gear.
pub fn bonus_for(world: &WorldState, entity: Entity) -> StatBonus {
    if entity == world.player() {
        gear_bonus(world)
    } else {
        StatBonus::default()
    }
}

pub fn combat_stats(world: &WorldState, entity: Entity) -> Option<CombatStats> {
    let fighter = world.ecs.get::<Fighter>(entity)?;
    let bonus = bonus_for(world, entity);
    Some(CombatStats {
        hp: fighter.hp,
        max_hp: fighter.max_hp(&bonus),
        mp: fighter.mp,
        max_mp: fighter.max_mp(&bonus),
        defense: fighter.defense(&bonus),
        power: fighter.power(&bonus),
        magic: fighter.magic(&bonus),
        regen: fighter.regen(&bonus),
        xp: fighter.xp,
    })
}

pub fn attack(world: &mut WorldState, attacker: Entity, defender: Entity) {
    let (Some(offense), Some(defense)) = (
        combat_stats(world, attacker),
        combat_stats(world, defender),
    ) else {
        return;
    };
    let damage = (offense.power - defense.defense).max(1);
    let color = if defender == world.player() { BAD } else { GRAY };
    let message = format!(
        "{} attacks {} for {damage}",
        capitalize(&world.ecs.name(attacker)),
        world.ecs.name(defender)
    );
    world.log.push(message, color);
    take_damage(world, defender, damage);
}

/// Applies damage and runs the death routine on the transition to zero hp.
/// Returns whether this hit was the killing blow.
pub fn take_damage(world: &mut WorldState, target: Entity, amount: i32) -> bool {
    let Some((was_alive, hp, xp, death)) = world.ecs.with_mut::<Fighter, _>(target, |fighter| {
        let was_alive = fighter.hp > 0;
        fighter.hp = (fighter.hp - amount.max(0)).max(0);
        (was_alive, fighter.hp, fighter.xp, fighter.death)
    }) else {
        return false;
    };
    if !was_alive || hp > 0 {
        return false;
    }

    let player = world.player();
    if target != player {
        world.ecs.with_mut::<Fighter, _>(player, |fighter| fighter.xp += xp);
    }
    match death {
        DeathRoutine::Player => player_death(world),
        DeathRoutine::Monster => monster_death(world, target, xp),
    }
    true
}

fn player_death(world: &mut WorldState) {
    info!("player died on dungeon level {}", world.dungeon_level);
    world.log.push("You died!", BAD);
    world.player_dead = true;
    world.ecs.mark_player_fallen();
}

fn monster_death(world: &mut WorldState, monster: Entity, xp: i32) {
    let name = world.ecs.name(monster);
    info!("{name} slain, {xp} xp awarded");
    world.log.push(
        format!("{} is slain! You gain {xp} experience.", capitalize(&name)),
        WARN,
    );
    world.ecs.make_corpse(monster);
}

/// Restores hp and mp up to the entity's effective maxima.
pub fn heal(world: &mut WorldState, entity: Entity, hp: i32, mp: i32) {
    let bonus = bonus_for(world, entity);
    world
        .ecs
        .with_mut::<Fighter, _>(entity, |fighter| fighter.heal(hp, mp, &bonus));
}

/// Re-clamps the player after its gear changed.
pub fn clamp_player(world: &mut WorldState) {
    let bonus = gear_bonus(world);
    let player = world.player();
    world
        .ecs
        .with_mut::<Fighter, _>(player, |fighter| fighter.clamp_to(&bonus));
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
