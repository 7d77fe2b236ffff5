use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;

use super::{EscalationTable, Weight, escalation, weighted_choice};
use crate::{
    ecs::components::{Equipment, Slot, StatBonus},
    effects::Effect,
};

/// Most items a single room may receive, by dungeon level.
pub const ITEMS_PER_ROOM: EscalationTable = &[(1, 1), (2, 5), (3, 10)];

const ENTHRALL_RANGE: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    HealingPotion,
    ManaPotion,
    MissileScroll,
    TeleportScroll,
    EnthrallScroll,
    Sword,
    Buckler,
    Robe,
    Amulet,
}

/// What an item becomes once spawned: something to use up, or something to
/// wear.
#[derive(Clone, Debug)]
pub enum ItemPayload {
    Usable(Effect),
    Gear(Equipment),
}

/// Numbers an item's strength is derived from at spawn time.
#[derive(Clone, Copy, Debug)]
pub struct Scaling {
    pub dungeon_level: i32,
    pub player_max_hp: i32,
    pub player_max_mp: i32,
}

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub kind: ItemKind,
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub weight: Weight,
}

impl ItemTemplate {
    pub fn catalog() -> Vec<Self> {
        use ItemKind::*;
        vec![
            Self::new(HealingPotion, "healing potion", '!', (191, 0, 191), Weight::Fixed(30)),
            Self::new(
                ManaPotion,
                "mana potion",
                '!',
                (63, 63, 255),
                Weight::Escalating(&[(15, 5), (20, 10)]),
            ),
            Self::new(
                MissileScroll,
                "scroll of magic missile",
                '#',
                (255, 255, 63),
                Weight::Escalating(&[(15, 3), (20, 5), (25, 10)]),
            ),
            Self::new(
                TeleportScroll,
                "scroll of teleportation",
                '#',
                (63, 255, 255),
                Weight::Escalating(&[(10, 2)]),
            ),
            Self::new(
                EnthrallScroll,
                "scroll of enthrallment",
                '#',
                (127, 255, 212),
                Weight::Escalating(&[(5, 4), (10, 8)]),
            ),
            Self::new(
                Sword,
                "sword",
                '/',
                (0, 191, 255),
                Weight::Escalating(&[(10, 1)]),
            ),
            Self::new(
                Buckler,
                "buckler",
                '[',
                (191, 127, 63),
                Weight::Escalating(&[(8, 2)]),
            ),
            Self::new(
                Robe,
                "robe",
                '(',
                (159, 95, 255),
                Weight::Escalating(&[(6, 3)]),
            ),
            Self::new(
                Amulet,
                "amulet",
                '"',
                (255, 215, 0),
                Weight::Escalating(&[(4, 4)]),
            ),
        ]
    }

    fn new(
        kind: ItemKind,
        name: &'static str,
        glyph: char,
        (r, g, b): (u8, u8, u8),
        weight: Weight,
    ) -> Self {
        Self {
            kind,
            name,
            glyph,
            color: RGB::from_u8(r, g, b),
            weight,
        }
    }
}

fn scaled(level: i32, factor: f32) -> i32 {
    (level as f32 * factor).round() as i32
}

/// `[lower, upper]` as fractions of `max`, widened by `spread` if it
/// collapses.
fn potion_range(max: i32, spread: i32) -> (i32, i32) {
    let lower = ((max as f32 * 0.05) as i32).max(1);
    let mut upper = (max as f32 * 0.12) as i32;
    if upper <= lower {
        upper = lower + spread;
    }
    (lower, upper)
}

impl ItemKind {
    pub fn payload(&self, scaling: &Scaling) -> ItemPayload {
        let level = scaling.dungeon_level;
        let gear = |slot: Slot, bonus: StatBonus| {
            ItemPayload::Gear(Equipment {
                slot,
                bonus,
                equipped: false,
            })
        };
        match self {
            ItemKind::HealingPotion => {
                let (min, max) = potion_range(scaling.player_max_hp, 4);
                ItemPayload::Usable(Effect::Heal {
                    min,
                    max,
                    mp_cost: 0,
                })
            }
            ItemKind::ManaPotion => {
                let (min, max) = potion_range(scaling.player_max_mp, 1);
                ItemPayload::Usable(Effect::RestoreMana { min, max })
            }
            ItemKind::MissileScroll => ItemPayload::Usable(Effect::MagicMissile {
                damage: level / 2 + 7,
                mp_cost: 0,
            }),
            ItemKind::TeleportScroll => ItemPayload::Usable(Effect::Teleport),
            ItemKind::EnthrallScroll => ItemPayload::Usable(Effect::Enthrall {
                range: ENTHRALL_RANGE,
            }),
            ItemKind::Sword => gear(
                Slot::MainHand,
                StatBonus {
                    power: scaled(level, 1.1),
                    ..StatBonus::default()
                },
            ),
            ItemKind::Buckler => gear(
                Slot::OffHand,
                StatBonus {
                    defense: scaled(level, 0.6).max(1),
                    ..StatBonus::default()
                },
            ),
            ItemKind::Robe => gear(
                Slot::Body,
                StatBonus {
                    max_hp: scaled(level, 2.5),
                    regen: 1,
                    ..StatBonus::default()
                },
            ),
            ItemKind::Amulet => gear(
                Slot::Neck,
                StatBonus {
                    magic: scaled(level, 0.8).max(1),
                    max_mp: scaled(level, 2.0),
                    ..StatBonus::default()
                },
            ),
        }
    }
}

pub fn item_ceiling(dungeon_level: i32) -> i32 {
    escalation(ITEMS_PER_ROOM, dungeon_level)
}

pub fn choose_item(
    catalog: &[ItemTemplate],
    dungeon_level: i32,
    rng: &mut RandomNumberGenerator,
) -> Option<ItemTemplate> {
    let weights: Vec<(usize, i32)> = catalog
        .iter()
        .enumerate()
        .map(|(idx, template)| (idx, template.weight.at(dungeon_level)))
        .collect();
    weighted_choice(&weights, rng).map(|idx| catalog[idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaling(level: i32) -> Scaling {
        Scaling {
            dungeon_level: level,
            player_max_hp: 50,
            player_max_mp: 15,
        }
    }

    fn bonus_of(kind: ItemKind, level: i32) -> StatBonus {
        match kind.payload(&scaling(level)) {
            ItemPayload::Gear(gear) => gear.bonus,
            ItemPayload::Usable(effect) => panic!("{kind:?} is not gear: {effect:?}"),
        }
    }

    #[test]
    fn healing_potion_scales_with_max_hp() {
        match ItemKind::HealingPotion.payload(&scaling(1)) {
            ItemPayload::Usable(Effect::Heal { min, max, .. }) => {
                assert_eq!((min, max), (2, 6));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn collapsed_potion_ranges_widen() {
        assert_eq!(potion_range(10, 4), (1, 5));
        assert_eq!(potion_range(15, 1), (1, 2));
        assert_eq!(potion_range(0, 4), (1, 5));
    }

    #[test]
    fn equipment_scales_with_depth() {
        assert_eq!(bonus_of(ItemKind::Sword, 1).power, 1);
        assert_eq!(bonus_of(ItemKind::Sword, 5).power, 6);
        assert_eq!(bonus_of(ItemKind::Buckler, 1).defense, 1);
        assert_eq!(bonus_of(ItemKind::Robe, 4).max_hp, 10);
        assert_eq!(bonus_of(ItemKind::Robe, 4).regen, 1);
        let amulet = bonus_of(ItemKind::Amulet, 4);
        assert_eq!((amulet.magic, amulet.max_mp), (3, 8));
    }

    #[test]
    fn missile_damage_grows_every_other_level() {
        for (level, expected) in [(1, 7), (2, 8), (5, 9)] {
            match ItemKind::MissileScroll.payload(&scaling(level)) {
                ItemPayload::Usable(Effect::MagicMissile { damage, .. }) => {
                    assert_eq!(damage, expected)
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[test]
    fn first_floor_offers_potions_and_swords_only() {
        let catalog = ItemTemplate::catalog();
        let mut rng = RandomNumberGenerator::seeded(4);
        for _ in 0..200 {
            let pick = choose_item(&catalog, 1, &mut rng).unwrap();
            assert!(matches!(pick.kind, ItemKind::HealingPotion | ItemKind::Sword));
        }
    }

    #[test]
    fn item_ceiling_steps_up() {
        assert_eq!(item_ceiling(1), 1);
        assert_eq!(item_ceiling(7), 2);
        assert_eq!(item_ceiling(12), 3);
    }
}
