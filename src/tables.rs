//! Drop and upgrade tables for 5-star artifacts
//!
//! Stat roll distributions follow the community-datamined tables
//! (https://genshin-impact.fandom.com/wiki/Artifacts/Stat_Roll_Distribution).

use crate::types::{ArtifactSet, Domain, SetPieces, Slot, Stat, Stats};
use rand::Rng;

/// 1 in 5 artifacts drop with four sub stats
pub const EXTRA_SUBSTAT_PROB: u32 = 5;

pub const MAX_LEVEL: u8 = 20;

/// Main stat value of a +20 artifact
pub const MAINSTAT_LEVEL: [i32; Stat::MAINSTAT_COUNT] = [
    4780, 311, 0, // flat hp / atk / def
    466, 466, 583, // hp% / atk% / def%
    187, 518, // em / er
    311, 622, // cr / cd
    359, // healing
    583, 466, 466, // phys / elemental
];

/// Value added per sub stat roll, one of four tiers
pub const SUBSTAT_TIERS: [[i32; 4]; Stat::SUBSTAT_COUNT] = [
    [209, 239, 269, 299], // flat hp
    [14, 16, 18, 19],     // flat atk
    [16, 19, 21, 23],     // flat def
    [41, 47, 53, 58],     // hp%
    [41, 47, 53, 58],     // atk%
    [51, 58, 66, 73],     // def%
    [16, 19, 21, 23],     // em
    [45, 52, 58, 65],     // er
    [27, 31, 35, 39],     // cr
    [54, 62, 70, 78],     // cd
];

#[inline]
pub fn mainstat_value(stat: Stat) -> i32 {
    MAINSTAT_LEVEL.get(stat.index()).copied().unwrap_or(0)
}

/// Smallest roll of a sub stat, used to count "roll equivalents"
#[inline]
pub fn smallest_tier(stat: Stat) -> i32 {
    SUBSTAT_TIERS.get(stat.index()).map_or(1, |tiers| tiers[0])
}

const fn bonus(entries: &[(Stat, i32)]) -> Stats {
    let mut values = [0; Stat::COUNT];
    let mut i = 0;
    while i < entries.len() {
        values[entries[i].0 as usize] += entries[i].1;
        i += 1;
    }
    Stats(values)
}

// Unconditional effects only; stacking buffs like 4pc Crimson Witch use their average uptime.
static TWO_PIECE_BONUS: [Stats; ArtifactSet::COUNT] = [
    bonus(&[]),                                // none
    bonus(&[(Stat::AtkPct, 180)]),             // gladiator's
    bonus(&[(Stat::ElementalMastery, 80)]),    // wanderer's
    bonus(&[(Stat::DmgBurst, 200)]),           // noblesse
    bonus(&[(Stat::PhysicalBonus, 250)]),      // bloodstained
    bonus(&[(Stat::HealingBonus, 150)]),       // maiden
    bonus(&[(Stat::OnElementBonus, 150)]),     // viridescent
    bonus(&[]),                                // bolide
    bonus(&[(Stat::OnElementBonus, 150)]),     // petra
    bonus(&[(Stat::OnElementBonus, 150)]),     // crimson witch
    bonus(&[]),                                // lavawalker
    bonus(&[(Stat::OnElementBonus, 150)]),     // heart of depth
    bonus(&[(Stat::OnElementBonus, 150)]),     // blizzard
    bonus(&[(Stat::OnElementBonus, 150)]),     // thundering fury
    bonus(&[]),                                // thundersoother
    bonus(&[(Stat::HpPct, 200)]),              // millelith
    bonus(&[(Stat::PhysicalBonus, 250)]),      // pale flame
];

static FOUR_PIECE_BONUS: [Stats; ArtifactSet::COUNT] = [
    bonus(&[]),
    bonus(&[(Stat::DmgNormalAttack, 350)]),
    bonus(&[(Stat::DmgChargedAttack, 350)]),
    bonus(&[(Stat::AtkPct, 200)]),
    bonus(&[]),
    bonus(&[(Stat::HealingBonus, 200)]),
    bonus(&[]),
    bonus(&[(Stat::DmgNormalAttack, 400), (Stat::DmgChargedAttack, 400)]),
    bonus(&[]),
    bonus(&[(Stat::OnElementBonus, 75), (Stat::ReactionBonus, 15)]),
    bonus(&[(Stat::OnElementBonus, 350)]),
    bonus(&[(Stat::DmgNormalAttack, 300), (Stat::DmgChargedAttack, 300)]),
    bonus(&[(Stat::CritRate, 400)]),
    bonus(&[]),
    bonus(&[(Stat::OnElementBonus, 350)]),
    bonus(&[(Stat::AtkPct, 200)]),
    bonus(&[(Stat::AtkPct, 180), (Stat::PhysicalBonus, 250)]),
];

/// Set effect for the given piece count. The 4pc effect does not include the 2pc one.
#[inline]
pub fn set_bonus(set: ArtifactSet, pieces: SetPieces) -> &'static Stats {
    match pieces {
        SetPieces::Two => &TWO_PIECE_BONUS[set.index()],
        SetPieces::Four => &FOUR_PIECE_BONUS[set.index()],
    }
}

const DOMAIN_SETS: [[ArtifactSet; 2]; Domain::COUNT] = [
    [ArtifactSet::GladiatorsFinale, ArtifactSet::WanderersTroupe],
    [ArtifactSet::NoblesseOblige, ArtifactSet::BloodstainedChivalry],
    [ArtifactSet::MaidenBeloved, ArtifactSet::ViridescentVenerer],
    [ArtifactSet::RetracingBolide, ArtifactSet::ArchaicPetra],
    [ArtifactSet::CrimsonWitchOfFlames, ArtifactSet::Lavawalker],
    [ArtifactSet::HeartOfDepth, ArtifactSet::BlizzardStrayer],
    [ArtifactSet::ThunderingFury, ArtifactSet::Thundersoother],
    [ArtifactSet::TenacityOfTheMillelith, ArtifactSet::PaleFlame],
];

impl Domain {
    pub fn sets(self) -> [ArtifactSet; 2] {
        DOMAIN_SETS[self.index()]
    }
}

/// Selection weights used by the artifact generator.
///
/// Slot and main stat weights are cumulative (the last entry is the total);
/// sub stat weights are plain per-stat weights. Every main stat that can drop
/// must leave at least four sub stats with a positive weight, see
/// [`StatTable::can_roll_substats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTable {
    pub slot_weights: [u32; Slot::COUNT],
    pub mainstat_weights: [[u32; Stat::MAINSTAT_COUNT]; Slot::COUNT],
    pub substat_weights: [u32; Stat::SUBSTAT_COUNT],
}

impl StatTable {
    /// The in-game drop tables
    pub const fn standard() -> Self {
        Self {
            slot_weights: [1, 2, 3, 4, 5],
            mainstat_weights: [
                [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                [0, 0, 0, 80, 160, 240, 270, 300, 300, 300, 300, 300, 300, 300],
                [0, 0, 0, 85, 170, 250, 260, 260, 260, 260, 260, 280, 300, 400],
                [0, 0, 0, 22, 44, 66, 70, 70, 80, 90, 100, 100, 100, 100],
            ],
            substat_weights: [
                6, 6, 6, // flat stats
                4, 4, 4, 4, 4, // % stats, em, er
                3, 3, // crit
            ],
        }
    }

    pub fn roll_slot(&self, rng: &mut impl Rng) -> Slot {
        Slot::ALL[pick_cumulative(&self.slot_weights, rng)]
    }

    pub fn roll_mainstat(&self, slot: Slot, rng: &mut impl Rng) -> Stat {
        Stat::ALL[pick_cumulative(&self.mainstat_weights[slot.index()], rng)]
    }

    /// Probability of a (slot, main stat) pair implied by the cumulative tables
    pub fn mainstat_probability(&self, slot: Slot, stat: Stat) -> f64 {
        let slot_total = self.slot_weights[Slot::COUNT - 1] as f64;
        let slot_weight = cumulative_weight(&self.slot_weights, slot.index()) as f64;
        let row = &self.mainstat_weights[slot.index()];
        let row_total = row[Stat::MAINSTAT_COUNT - 1] as f64;
        if !stat.is_mainstat() || slot_total == 0.0 || row_total == 0.0 {
            return 0.0;
        }
        (slot_weight / slot_total) * (cumulative_weight(row, stat.index()) as f64 / row_total)
    }
}

impl StatTable {
    /// Whether every droppable main stat leaves four sub stats to roll from.
    /// Generation never finishes otherwise.
    pub fn can_roll_substats(&self) -> bool {
        Slot::ALL.iter().all(|slot| {
            let row = &self.mainstat_weights[slot.index()];
            Stat::ALL[..Stat::MAINSTAT_COUNT].iter().all(|&main| {
                let rollable = Stat::ALL[..Stat::SUBSTAT_COUNT]
                    .iter()
                    .filter(|&&sub| sub != main && self.substat_weights[sub.index()] > 0)
                    .count();
                cumulative_weight(row, main.index()) == 0 || rollable >= 4
            })
        })
    }
}

impl Default for StatTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn cumulative_weight(cumulative: &[u32], idx: usize) -> u32 {
    let below = if idx == 0 { 0 } else { cumulative[idx - 1] };
    cumulative[idx].saturating_sub(below)
}

/// Index of the first cumulative bucket above a uniform roll
fn pick_cumulative(cumulative: &[u32], rng: &mut impl Rng) -> usize {
    let total = cumulative.last().copied().unwrap_or(0);
    if total == 0 {
        return 0;
    }
    let roll = rng.gen_range(0..total);
    cumulative
        .iter()
        .position(|&bound| roll < bound)
        .unwrap_or(cumulative.len() - 1)
}
