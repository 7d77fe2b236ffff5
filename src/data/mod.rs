pub mod items;
pub mod monsters;

use bracket_random::prelude::RandomNumberGenerator;

/// `(value, min_level)` thresholds, in ascending `min_level` order.
pub type EscalationTable = &'static [(i32, i32)];

/// Value for the deepest threshold the dungeon level has reached, or 0 when
/// the level is shallower than every threshold.
pub fn escalation(table: &[(i32, i32)], dungeon_level: i32) -> i32 {
    table
        .iter()
        .filter(|(_, min_level)| dungeon_level >= *min_level)
        .max_by_key(|(_, min_level)| *min_level)
        .map_or(0, |(value, _)| *value)
}

#[derive(Clone, Copy, Debug)]
pub enum Weight {
    Fixed(i32),
    Escalating(EscalationTable),
}

impl Weight {
    pub fn at(&self, dungeon_level: i32) -> i32 {
        match self {
            Weight::Fixed(weight) => *weight,
            Weight::Escalating(table) => escalation(table, dungeon_level),
        }
    }
}

/// Picks one entry with probability proportional to its weight. Entries with a
/// non-positive weight never win; `None` when nothing can win.
pub fn weighted_choice<T: Copy>(entries: &[(T, i32)], rng: &mut RandomNumberGenerator) -> Option<T> {
    let total: i32 = entries.iter().map(|(_, weight)| (*weight).max(0)).sum();
    if total <= 0 {
        return None;
    }
    let die = rng.range(1, total + 1);
    let mut running = 0;
    for (entry, weight) in entries {
        running += (*weight).max(0);
        if die <= running {
            return Some(*entry);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: EscalationTable = &[(2, 1), (3, 4), (5, 6)];

    #[test]
    fn escalation_steps_with_depth() {
        assert_eq!(escalation(TABLE, 0), 0);
        assert_eq!(escalation(TABLE, 1), 2);
        assert_eq!(escalation(TABLE, 3), 2);
        assert_eq!(escalation(TABLE, 4), 3);
        assert_eq!(escalation(TABLE, 6), 5);
        assert_eq!(escalation(TABLE, 40), 5);
    }

    #[test]
    fn escalation_ignores_table_order() {
        assert_eq!(escalation(&[(5, 6), (2, 1), (3, 4)], 5), 3);
    }

    #[test]
    fn zero_weights_never_win() {
        let mut rng = RandomNumberGenerator::seeded(7);
        for _ in 0..200 {
            let pick = weighted_choice(&[("kobold", 0), ("orc", 5), ("troll", -3)], &mut rng);
            assert_eq!(pick, Some("orc"));
        }
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let mut rng = RandomNumberGenerator::seeded(7);
        assert_eq!(weighted_choice::<u8>(&[], &mut rng), None);
        assert_eq!(weighted_choice(&[(1u8, 0)], &mut rng), None);
    }

    #[test]
    fn every_positive_entry_can_win() {
        let mut rng = RandomNumberGenerator::seeded(21);
        let mut seen = [false; 3];
        for _ in 0..500 {
            if let Some(idx) = weighted_choice(&[(0usize, 1), (1, 1), (2, 1)], &mut rng) {
                seen[idx] = true;
            }
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn escalating_weight_reads_the_table() {
        let weight = Weight::Escalating(&[(20, 3), (30, 5)]);
        assert_eq!(weight.at(2), 0);
        assert_eq!(weight.at(5), 30);
        assert_eq!(Weight::Fixed(60).at(1), 60);
    }
}
