use log::info;

use crate::{
    config::GameConfig,
    ecs::components::{Fighter, Progression, SPELLBOOK, Spell},
    gamelog::{GOOD, MAGIC},
    world::WorldState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelUpChoice {
    Health,
    Mana,
    Strength,
    Magic,
    Defense,
    Regen,
    Learn(Spell),
}

pub fn threshold(config: &GameConfig, level: i32) -> i32 {
    config.level_up_base + level * config.level_up_factor
}

/// Raises the player one level if its xp has reached the threshold. Surplus
/// xp carries over, so callers loop until this returns false.
pub fn try_level_up(world: &mut WorldState) -> bool {
    let player = world.player();
    let (Some(fighter), Some(progress)) = (
        world.ecs.get::<Fighter>(player),
        world.ecs.get::<Progression>(player),
    ) else {
        return false;
    };
    let needed = threshold(&world.config, progress.level);
    if fighter.xp < needed {
        return false;
    }

    world
        .ecs
        .with_mut::<Fighter, _>(player, |fighter| fighter.xp -= needed);
    let level = world
        .ecs
        .with_mut::<Progression, _>(player, |progress| {
            progress.level += 1;
            progress.level
        })
        .unwrap_or(progress.level + 1);
    info!("player reached level {level}");
    world.log.push(
        format!("Your battle skills grow stronger! You reached level {level}!"),
        GOOD,
    );
    true
}

pub fn hp_boost(base_max_hp: i32, times_chosen: i32) -> i32 {
    let base = base_max_hp as f32;
    let boost = (0.04 * base).max(0.15 * base - times_chosen as f32 * 0.005);
    (boost.floor() as i32).max(1)
}

pub fn mp_boost(base_max_mp: i32, times_chosen: i32) -> i32 {
    let base = base_max_mp as f32;
    let boost = (0.04 * base).max(0.2 * base - times_chosen as f32 * 0.0075);
    (boost.floor() as i32).max(1)
}

pub fn power_boost(times_chosen: i32) -> i32 {
    if times_chosen % 2 == 0 { 2 } else { 1 }
}

/// Stat boosts always; spells once the level allows and the player lacks them.
pub fn choices(world: &WorldState) -> Vec<LevelUpChoice> {
    let mut options = vec![
        LevelUpChoice::Health,
        LevelUpChoice::Mana,
        LevelUpChoice::Strength,
        LevelUpChoice::Magic,
        LevelUpChoice::Defense,
        LevelUpChoice::Regen,
    ];
    if let Some(progress) = world.ecs.get::<Progression>(world.player()) {
        options.extend(
            SPELLBOOK
                .iter()
                .filter(|spell| {
                    progress.level >= spell.unlock_level() && !progress.spells.contains(spell)
                })
                .map(|spell| LevelUpChoice::Learn(*spell)),
        );
    }
    options
}

pub fn describe(world: &WorldState, choice: LevelUpChoice) -> String {
    let player = world.player();
    let fighter = world.ecs.get::<Fighter>(player);
    let progress = world.ecs.get::<Progression>(player).unwrap_or_default();
    let (base_hp, base_mp) = fighter.map_or((0, 0), |f| (f.base_max_hp, f.base_max_mp));
    match choice {
        LevelUpChoice::Health => format!(
            "Constitution (+{} HP)",
            hp_boost(base_hp, progress.hp_boosts)
        ),
        LevelUpChoice::Mana => format!(
            "Intellect (+{} MP)",
            mp_boost(base_mp, progress.mp_boosts)
        ),
        LevelUpChoice::Strength => format!(
            "Strength (+{} attack)",
            power_boost(progress.power_boosts)
        ),
        LevelUpChoice::Magic => "Arcana (+1 magic)".to_string(),
        LevelUpChoice::Defense => "Agility (+1 defense)".to_string(),
        LevelUpChoice::Regen => "Vigor (+1 regen)".to_string(),
        LevelUpChoice::Learn(spell) => format!("Learn {} ({} MP)", spell.name(), spell.mp_cost()),
    }
}

pub fn apply(world: &mut WorldState, choice: LevelUpChoice) {
    let player = world.player();
    let Some(progress) = world.ecs.get::<Progression>(player) else {
        return;
    };
    match choice {
        LevelUpChoice::Health => {
            world.ecs.with_mut::<Fighter, _>(player, |fighter| {
                let boost = hp_boost(fighter.base_max_hp, progress.hp_boosts);
                fighter.base_max_hp += boost;
                fighter.hp += boost;
            });
            world
                .ecs
                .with_mut::<Progression, _>(player, |progress| progress.hp_boosts += 1);
        }
        LevelUpChoice::Mana => {
            world.ecs.with_mut::<Fighter, _>(player, |fighter| {
                let boost = mp_boost(fighter.base_max_mp, progress.mp_boosts);
                fighter.base_max_mp += boost;
                fighter.mp += boost;
            });
            world
                .ecs
                .with_mut::<Progression, _>(player, |progress| progress.mp_boosts += 1);
        }
        LevelUpChoice::Strength => {
            let boost = power_boost(progress.power_boosts);
            world
                .ecs
                .with_mut::<Fighter, _>(player, |fighter| fighter.base_power += boost);
            world
                .ecs
                .with_mut::<Progression, _>(player, |progress| progress.power_boosts += 1);
        }
        LevelUpChoice::Magic => {
            world
                .ecs
                .with_mut::<Fighter, _>(player, |fighter| fighter.base_magic += 1);
        }
        LevelUpChoice::Defense => {
            world
                .ecs
                .with_mut::<Fighter, _>(player, |fighter| fighter.base_defense += 1);
        }
        LevelUpChoice::Regen => {
            world
                .ecs
                .with_mut::<Fighter, _>(player, |fighter| fighter.base_regen += 1);
        }
        LevelUpChoice::Learn(spell) => {
            world.ecs.with_mut::<Progression, _>(player, |progress| {
                progress.spells.insert(spell);
            });
            world
                .log
                .push(format!("You learned {}!", spell.name()), MAGIC);
        }
    }
    info!("level-up choice applied: {choice:?}");
}
