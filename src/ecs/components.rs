use std::collections::{BTreeSet, HashSet};
use std::iter::Sum;
use std::ops::Add;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use specs::prelude::{Component, NullStorage, VecStorage};

use crate::effects::Effect;

#[derive(Clone, Debug)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Renderable {
    pub glyph: u16,
    pub fg: RGB,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Name {
    pub name: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

/// Present while the entity stops others from entering its tile.
#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

/// Drawn on any explored tile, even outside the field of view.
#[derive(Default)]
pub struct AlwaysVisible;

impl Component for AlwaysVisible {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Viewshed {
    pub radius: i32,
    pub dirty: bool,
    pub visible: HashSet<Point>,
}

impl Component for Viewshed {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatBonus {
    pub max_hp: i32,
    pub max_mp: i32,
    pub defense: i32,
    pub power: i32,
    pub magic: i32,
    pub regen: i32,
}

impl Add for StatBonus {
    type Output = StatBonus;

    fn add(self, other: StatBonus) -> StatBonus {
        StatBonus {
            max_hp: self.max_hp + other.max_hp,
            max_mp: self.max_mp + other.max_mp,
            defense: self.defense + other.defense,
            power: self.power + other.power,
            magic: self.magic + other.magic,
            regen: self.regen + other.regen,
        }
    }
}

impl Sum for StatBonus {
    fn sum<I: Iterator<Item = StatBonus>>(iter: I) -> StatBonus {
        iter.fold(StatBonus::default(), Add::add)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathRoutine {
    Player,
    Monster,
}

/// Combat profile. Effective values are base plus whatever gear bonus the
/// caller passes in; nothing here is cached.
#[derive(Clone, Debug)]
pub struct Fighter {
    pub base_max_hp: i32,
    pub base_max_mp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    pub base_magic: i32,
    pub base_regen: i32,
    pub hp: i32,
    pub mp: i32,
    /// Awarded to the player on death; for the player, experience earned.
    pub xp: i32,
    pub death: DeathRoutine,
}

impl Component for Fighter {
    type Storage = VecStorage<Self>;
}

impl Fighter {
    pub fn monster(hp: i32, defense: i32, power: i32, xp: i32) -> Self {
        Self {
            base_max_hp: hp,
            base_max_mp: 0,
            base_defense: defense,
            base_power: power,
            base_magic: 0,
            base_regen: 0,
            hp,
            mp: 0,
            xp,
            death: DeathRoutine::Monster,
        }
    }

    pub fn max_hp(&self, bonus: &StatBonus) -> i32 {
        self.base_max_hp + bonus.max_hp
    }

    pub fn max_mp(&self, bonus: &StatBonus) -> i32 {
        self.base_max_mp + bonus.max_mp
    }

    pub fn defense(&self, bonus: &StatBonus) -> i32 {
        self.base_defense + bonus.defense
    }

    pub fn power(&self, bonus: &StatBonus) -> i32 {
        self.base_power + bonus.power
    }

    pub fn magic(&self, bonus: &StatBonus) -> i32 {
        self.base_magic + bonus.magic
    }

    pub fn regen(&self, bonus: &StatBonus) -> i32 {
        self.base_regen + bonus.regen
    }

    /// Restores hp and mp, never past the effective maxima.
    pub fn heal(&mut self, hp: i32, mp: i32, bonus: &StatBonus) {
        self.hp = (self.hp + hp).min(self.max_hp(bonus));
        self.mp = (self.mp + mp).min(self.max_mp(bonus));
    }

    /// Pulls hp/mp back under the maxima after gear comes off.
    pub fn clamp_to(&mut self, bonus: &StatBonus) {
        self.hp = self.hp.min(self.max_hp(bonus));
        self.mp = self.mp.clamp(0, self.max_mp(bonus).max(0));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ai {
    Chaser,
    /// Acts only while the player stands on `home` shifted by one of `zone`.
    Territorial { home: Point, zone: Vec<Point> },
    Ally,
}

impl Component for Ai {
    type Storage = VecStorage<Self>;
}

impl Ai {
    pub fn is_hostile(&self) -> bool {
        !matches!(self, Ai::Ally)
    }
}

/// `None` marks an item with nothing bound to it.
#[derive(Clone, Debug)]
pub struct UsableItem {
    pub effect: Option<Effect>,
}

impl Component for UsableItem {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    MainHand,
    OffHand,
    Body,
    Neck,
}

impl Slot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::MainHand => "main hand",
            Slot::OffHand => "off hand",
            Slot::Body => "body",
            Slot::Neck => "neck",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Equipment {
    pub slot: Slot,
    pub bonus: StatBonus,
    pub equipped: bool,
}

impl Component for Equipment {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Spell {
    MinorHeal,
    MagicMissile,
}

impl Spell {
    pub fn name(&self) -> &'static str {
        match self {
            Spell::MinorHeal => "Minor Heal",
            Spell::MagicMissile => "Magic Missile",
        }
    }

    pub fn mp_cost(&self) -> i32 {
        match self {
            Spell::MinorHeal => 3,
            Spell::MagicMissile => 5,
        }
    }

    /// Character level from which the spell is offered on level-up.
    pub fn unlock_level(&self) -> i32 {
        match self {
            Spell::MinorHeal => 2,
            Spell::MagicMissile => 5,
        }
    }
}

pub const SPELLBOOK: [Spell; 2] = [Spell::MinorHeal, Spell::MagicMissile];

#[derive(Clone, Debug)]
pub struct Progression {
    pub level: i32,
    pub spells: BTreeSet<Spell>,
    pub hp_boosts: i32,
    pub mp_boosts: i32,
    pub power_boosts: i32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            spells: BTreeSet::new(),
            hp_boosts: 0,
            mp_boosts: 0,
            power_boosts: 0,
        }
    }
}

impl Component for Progression {
    type Storage = VecStorage<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Fighter {
        Fighter {
            base_max_hp: 20,
            base_max_mp: 10,
            base_defense: 1,
            base_power: 5,
            base_magic: 5,
            base_regen: 1,
            hp: 10,
            mp: 2,
            xp: 0,
            death: DeathRoutine::Player,
        }
    }

    #[test]
    fn heal_clamps_at_effective_maximum() {
        let mut fighter = hero();
        let bonus = StatBonus {
            max_hp: 5,
            ..StatBonus::default()
        };
        fighter.heal(100, 100, &bonus);
        assert_eq!(fighter.hp, 25);
        assert_eq!(fighter.mp, 10);
    }

    #[test]
    fn losing_gear_clamps_current_values() {
        let mut fighter = hero();
        let bonus = StatBonus {
            max_hp: 10,
            ..StatBonus::default()
        };
        fighter.heal(100, 0, &bonus);
        assert_eq!(fighter.hp, 30);
        fighter.clamp_to(&StatBonus::default());
        assert_eq!(fighter.hp, 20);
    }

    #[test]
    fn bonuses_sum_fieldwise() {
        let total: StatBonus = [
            StatBonus {
                power: 2,
                regen: 1,
                ..StatBonus::default()
            },
            StatBonus {
                power: 3,
                defense: 1,
                ..StatBonus::default()
            },
        ]
        .into_iter()
        .sum();
        assert_eq!(total.power, 5);
        assert_eq!(total.defense, 1);
        assert_eq!(total.regen, 1);
    }

    #[test]
    fn allies_are_not_hostile() {
        assert!(!Ai::Ally.is_hostile());
        assert!(Ai::Chaser.is_hostile());
    }
}
