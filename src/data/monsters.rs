use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;

use super::{EscalationTable, Weight, escalation, weighted_choice};

/// Most monsters a single room may receive, by dungeon level.
pub const MONSTERS_PER_ROOM: EscalationTable = &[(2, 1), (3, 4), (5, 6)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behavior {
    Chaser,
    Territorial,
}

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub xp: i32,
    pub behavior: Behavior,
    pub weight: Weight,
}

impl MonsterTemplate {
    pub fn roster() -> Vec<Self> {
        vec![
            Self::new(
                "kobold",
                'k',
                RGB::from_u8(0, 95, 191),
                (8, 0, 3),
                35,
                Behavior::Chaser,
                Weight::Fixed(60),
            ),
            Self::new(
                "orc",
                'o',
                RGB::from_u8(63, 127, 63),
                (12, 1, 3),
                40,
                Behavior::Chaser,
                Weight::Escalating(&[(20, 3), (30, 5), (60, 7)]),
            ),
            Self::new(
                "troll",
                'T',
                RGB::from_u8(0, 127, 0),
                (15, 2, 5),
                50,
                Behavior::Chaser,
                Weight::Escalating(&[(15, 4), (30, 6), (45, 8)]),
            ),
            Self::new(
                "gargoyle",
                'g',
                RGB::from_u8(159, 159, 159),
                (18, 3, 4),
                60,
                Behavior::Territorial,
                Weight::Escalating(&[(10, 2), (20, 5)]),
            ),
        ]
    }

    fn new(
        name: &'static str,
        glyph: char,
        color: RGB,
        (hp, defense, power): (i32, i32, i32),
        xp: i32,
        behavior: Behavior,
        weight: Weight,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            hp,
            defense,
            power,
            xp,
            behavior,
            weight,
        }
    }
}

pub fn monster_ceiling(dungeon_level: i32) -> i32 {
    escalation(MONSTERS_PER_ROOM, dungeon_level)
}

pub fn choose_monster(
    roster: &[MonsterTemplate],
    dungeon_level: i32,
    rng: &mut RandomNumberGenerator,
) -> Option<MonsterTemplate> {
    let weights: Vec<(usize, i32)> = roster
        .iter()
        .enumerate()
        .map(|(idx, template)| (idx, template.weight.at(dungeon_level)))
        .collect();
    weighted_choice(&weights, rng).map(|idx| roster[idx].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_floors_only_spawn_kobolds() {
        let roster = MonsterTemplate::roster();
        let mut rng = RandomNumberGenerator::seeded(1);
        for _ in 0..100 {
            let pick = choose_monster(&roster, 1, &mut rng).unwrap();
            assert_eq!(pick.name, "kobold");
        }
    }

    #[test]
    fn deeper_floors_unlock_trolls() {
        let roster = MonsterTemplate::roster();
        let mut rng = RandomNumberGenerator::seeded(2);
        let found = (0..500).any(|_| choose_monster(&roster, 8, &mut rng).unwrap().name == "troll");
        assert!(found);
    }

    #[test]
    fn ceiling_grows_with_depth() {
        assert_eq!(monster_ceiling(1), 2);
        assert_eq!(monster_ceiling(5), 3);
        assert_eq!(monster_ceiling(9), 5);
    }
}
