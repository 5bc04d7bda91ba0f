//! Farming session results and the statistics aggregated from them

use crate::artifact::Artifact;
use crate::profile::FarmingConfig;
use crate::tables::smallest_tier;
use crate::types::{SetCounts, SetPieces, Slot, Stat, Stats};
use serde::Serialize;

/// Stats that count as "good rolls" when the config gives them a score
pub const OFFENSIVE_STATS: [Stat; 6] = [
    Stat::HpPct,
    Stat::AtkPct,
    Stat::DefPct,
    Stat::ElementalMastery,
    Stat::CritRate,
    Stat::CritDamage,
];

/// Round to a fixed number of decimal digits
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// `num / denom` as a percentage with two decimals; 0 when nothing was counted
pub fn percentage(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    round_to(100.0 * num as f64 / denom as f64, 2)
}

/// How many artifacts of a slot were leveled out of how many dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeTally {
    pub upgraded: u64,
    pub generated: u64,
}

impl UpgradeTally {
    pub fn percentage(&self) -> f64 {
        percentage(self.upgraded, self.generated)
    }

    pub fn merge(&mut self, other: &UpgradeTally) {
        self.upgraded += other.upgraded;
        self.generated += other.generated;
    }
}

/// Result of one farming session: the best loadout found and its damage
#[derive(Debug, Clone, Default, Serialize)]
pub struct FarmedSet {
    /// One artifact per slot, or `None` if no loadout met the constraints
    pub loadout: Option<[Artifact; Slot::COUNT]>,
    /// Damage index of the loadout; 0 when there is none
    pub damage: i64,
    pub upgrade_ratio: [UpgradeTally; Slot::COUNT],
}

impl FarmedSet {
    pub fn is_viable(&self) -> bool {
        self.loadout.is_some()
    }

    pub fn artifacts(&self) -> &[Artifact] {
        match &self.loadout {
            Some(pieces) => pieces.as_slice(),
            None => &[],
        }
    }

    pub fn set_counts(&self) -> SetCounts {
        SetCounts::from_sets(self.artifacts().iter().map(|a| a.set))
    }

    /// Sum of main and sub stats over the worn artifacts
    pub fn artifact_stats(&self) -> Stats {
        let mut stats = Stats::ZERO;
        for artifact in self.artifacts() {
            artifact.add_to(&mut stats);
        }
        stats
    }
}

/// Which target set effects a loadout achieves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetBonusTier {
    NoBonus,
    /// One 2pc effect (with three unrelated pieces)
    TwoPiece,
    TwoPlusTwo,
    FourPiece,
}

impl SetBonusTier {
    pub const COUNT: usize = 4;
    pub const ALL: [SetBonusTier; SetBonusTier::COUNT] = [
        SetBonusTier::NoBonus,
        SetBonusTier::TwoPiece,
        SetBonusTier::TwoPlusTwo,
        SetBonusTier::FourPiece,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SetBonusTier::NoBonus => "0pc",
            SetBonusTier::TwoPiece => "2pc",
            SetBonusTier::TwoPlusTwo => "2pc + 2pc",
            SetBonusTier::FourPiece => "4pc",
        }
    }

    /// A target 4pc wins outright, otherwise count target 2pc effects
    pub fn classify(farming: &FarmingConfig, counts: &SetCounts) -> Self {
        let mut two_pc = 0;
        for (set, count) in counts.iter() {
            if count >= SetPieces::Four.required() && farming.is_target(set, SetPieces::Four) {
                return SetBonusTier::FourPiece;
            }
            if count >= SetPieces::Two.required() && farming.is_target(set, SetPieces::Two) {
                two_pc += 1;
            }
        }
        match two_pc {
            0 => SetBonusTier::NoBonus,
            1 => SetBonusTier::TwoPiece,
            _ => SetBonusTier::TwoPlusTwo,
        }
    }
}

/// Aggregated statistics from many farming sessions
#[derive(Debug, Clone, Default, Serialize)]
pub struct FarmedSetStats {
    pub runs: usize,
    /// Fraction of sessions that found a loadout
    pub viable_rate: f64,
    pub mean: f64,
    /// Population standard deviation of damage
    pub stddev: f64,
    /// Damage at every percentile 0..=100 (nearest rank, not interpolated)
    pub percentiles: Vec<i64>,
    /// Average number of scored offensive sub stat rolls on the best loadout
    pub good_rolls: f64,
    /// Average crit value (2 x CR% + CD%) of the best loadout's artifacts
    pub crit_value: f64,
    pub upgrade_ratio: [UpgradeTally; Slot::COUNT],
    pub total_upgrade_ratio: UpgradeTally,
    /// Percent of sessions in each [`SetBonusTier`]. Each bucket is rounded
    /// separately so the total may be off 100 by 0.01.
    pub set_bonus_pcts: [f64; SetBonusTier::COUNT],
}

impl FarmedSetStats {
    /// Create aggregated stats from a batch of farming sessions
    pub fn from_sets(farming: &FarmingConfig, sets: &[FarmedSet]) -> Self {
        if sets.is_empty() {
            return Self::default();
        }

        let size = sets.len();
        let n = size as f64;

        let mut damages: Vec<i64> = sets.iter().map(|s| s.damage).collect();
        damages.sort_unstable();
        let percentiles = (0..=100)
            .map(|i| damages[(i * size / 100).min(size - 1)])
            .collect();

        let mean = damages.iter().sum::<i64>() as f64 / n;
        let variance = damages
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        // Roll equivalents per sub stat across every viable loadout
        let mut rolls = [0i64; Stat::SUBSTAT_COUNT];
        let mut crit_value = 0i64;
        for artifact in sets.iter().flat_map(|s| s.artifacts()) {
            for line in artifact.substats() {
                rolls[line.stat.index()] += (line.value / smallest_tier(line.stat)) as i64;
            }
            crit_value += 2 * artifact.substat_value(Stat::CritRate) as i64
                + artifact.substat_value(Stat::CritDamage) as i64;
        }
        let good_rolls: i64 = OFFENSIVE_STATS
            .iter()
            .filter(|&&stat| farming.weight(stat) > 0)
            .map(|stat| rolls[stat.index()])
            .sum();

        let mut upgrade_ratio = [UpgradeTally::default(); Slot::COUNT];
        for set in sets {
            for (total, tally) in upgrade_ratio.iter_mut().zip(set.upgrade_ratio.iter()) {
                total.merge(tally);
            }
        }
        let mut total_upgrade_ratio = UpgradeTally::default();
        for tally in &upgrade_ratio {
            total_upgrade_ratio.merge(tally);
        }

        let mut bonus_counts = [0u64; SetBonusTier::COUNT];
        for set in sets {
            bonus_counts[SetBonusTier::classify(farming, &set.set_counts()).index()] += 1;
        }
        let set_bonus_pcts = bonus_counts.map(|count| percentage(count, size as u64));

        Self {
            runs: size,
            viable_rate: sets.iter().filter(|s| s.is_viable()).count() as f64 / n,
            mean,
            stddev: variance.sqrt(),
            percentiles,
            good_rolls: round_to(good_rolls as f64 / n, 2),
            // sub stats are stored x10, CV is reported to 0.01
            crit_value: (10.0 * crit_value as f64 / n).round() / 100.0,
            upgrade_ratio,
            total_upgrade_ratio,
            set_bonus_pcts,
        }
    }

    /// Damage at percentile `p` (clamped to 100)
    pub fn percentile(&self, p: usize) -> i64 {
        self.percentiles.get(p.min(100)).copied().unwrap_or(0)
    }

    pub fn median(&self) -> i64 {
        self.percentile(50)
    }

    pub fn upgrade_pct(&self, slot: Slot) -> f64 {
        self.upgrade_ratio[slot.index()].percentage()
    }
}

/// Statistics over a sample of individually rolled, fully upgraded artifacts
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollStats {
    pub samples: usize,
    /// Percent of the whole sample that is this slot with both crit sub stats
    pub double_crit_pcts: [f64; Slot::COUNT],
}

impl RollStats {
    pub fn from_artifacts(sample: &[Artifact]) -> Self {
        let mut double_crit = [0u64; Slot::COUNT];
        for artifact in sample {
            if artifact.substat_value(Stat::CritRate) > 0 && artifact.substat_value(Stat::CritDamage) > 0 {
                double_crit[artifact.slot.index()] += 1;
            }
        }
        Self {
            samples: sample.len(),
            double_crit_pcts: double_crit.map(|count| percentage(count, sample.len() as u64)),
        }
    }
}
