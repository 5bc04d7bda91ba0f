//! Character, weapon and farming profiles with validated, table-indexed values

use crate::artifact::Artifact;
use crate::config::{
    CharacterConfig, ConfigError, FarmingSection, ProfileConfig, WeaponConfig,
};
use crate::tables::smallest_tier;
use crate::types::{ArtifactSet, Domain, SetPieces, Slot, Stat, Stats};
use std::collections::HashMap;

/// Character stats ready for damage calculation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Character {
    pub base_atk: i32,
    /// Share of hits that trigger an amplifying reaction, 0..=100
    pub reaction_percentage: i32,
    /// Reaction damage multiplier x10 (15 for a 1.5x reaction)
    pub reaction_multiplier_x10: i32,
    /// Damage bonus channel added to on-element damage
    pub damage_type: Stat,
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Weapon {
    pub base_atk: i32,
    pub stats: Stats,
}

/// Parameters governing how the simulated player farms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmingConfig {
    /// Domains farmed round robin
    pub domains: Vec<Domain>,
    pub target_sets: [[bool; SetPieces::COUNT]; ArtifactSet::COUNT],
    /// Score per roll of each stat
    pub stat_score: [i32; Stat::MAINSTAT_COUNT],
    /// Largest value in `stat_score`; scales the pruning margin
    pub stat_score_max: i32,
    /// Number of good sub rolls a wanted main stat is worth
    pub mainstat_multiplier: i32,
    /// Score for a piece from a target set
    pub set_bonus_value: i32,
    /// Minimum +0 score for a piece to be leveled to +20
    pub min_stat_score: [i32; Slot::COUNT],
    pub required_er: i32,
    /// Candidates scoring this many max-value rolls below the current best piece
    /// in their slot are skipped. Larger values search more, smaller values prune
    /// harder; the search is not guaranteed optimal either way.
    pub good_rolls_margin: i32,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            domains: vec![Domain::Boss],
            target_sets: [[false; SetPieces::COUNT]; ArtifactSet::COUNT],
            stat_score: [0; Stat::MAINSTAT_COUNT],
            stat_score_max: 1,
            mainstat_multiplier: 0,
            set_bonus_value: 0,
            min_stat_score: [0; Slot::COUNT],
            required_er: 0,
            good_rolls_margin: Self::DEFAULT_GOOD_ROLLS_MARGIN,
        }
    }
}

impl FarmingConfig {
    pub const DEFAULT_GOOD_ROLLS_MARGIN: i32 = 3;

    /// Score per roll of a stat; stats that can't be main stats score 0
    #[inline]
    pub fn weight(&self, stat: Stat) -> i32 {
        self.stat_score.get(stat.index()).copied().unwrap_or(0)
    }

    pub fn set_weight(&mut self, stat: Stat, score: i32) {
        if let Some(slot) = self.stat_score.get_mut(stat.index()) {
            *slot = score;
        }
    }

    #[inline]
    pub fn is_target(&self, set: ArtifactSet, pieces: SetPieces) -> bool {
        self.target_sets[set.index()][pieces.index()]
    }

    pub fn set_target(&mut self, set: ArtifactSet, pieces: SetPieces, wanted: bool) {
        self.target_sets[set.index()][pieces.index()] = wanted;
    }

    pub fn is_any_target(&self, set: ArtifactSet) -> bool {
        self.is_target(set, SetPieces::Two) || self.is_target(set, SetPieces::Four)
    }

    /// Weighted estimate of the number of good rolls on an artifact
    pub fn score(&self, artifact: &Artifact) -> i32 {
        let mut score = self.mainstat_multiplier * self.weight(artifact.mainstat);
        if self.is_any_target(artifact.set) {
            score += self.set_bonus_value;
        }
        for line in artifact.substats() {
            score += self.weight(line.stat) * line.value / smallest_tier(line.stat);
        }
        score
    }

    /// Whether a +0 artifact is worth leveling to +20
    pub fn upgradeable(&self, artifact: &Artifact) -> bool {
        self.score(artifact) >= self.min_stat_score[artifact.slot.index()]
    }

    /// A variable main stat with no score can never be worth wearing
    pub fn has_useless_mainstat(&self, artifact: &Artifact) -> bool {
        !artifact.slot.has_fixed_mainstat() && self.weight(artifact.mainstat) == 0
    }

    /// Score gap beyond which search candidates are skipped
    pub fn prune_margin(&self) -> i32 {
        self.stat_score_max * self.good_rolls_margin
    }
}

/// Everything one farming session needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub character: Character,
    pub weapon: Weapon,
    pub farming: FarmingConfig,
}

impl Profile {
    pub fn from_config(config: &ProfileConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            character: Character::from_config(&config.character)?,
            weapon: Weapon::from_config(&config.weapon)?,
            farming: FarmingConfig::from_config(&config.farming)?,
        })
    }
}

fn parse_stat(key: &str) -> Result<Stat, ConfigError> {
    Stat::from_key(key).ok_or_else(|| ConfigError::UnknownStat(key.to_string()))
}

fn parse_stats(map: &HashMap<String, i32>) -> Result<Stats, ConfigError> {
    let mut stats = Stats::ZERO;
    for (key, &value) in map {
        stats[parse_stat(key)?] += value;
    }
    Ok(stats)
}

/// Target sets must be real sets, never the "no set" placeholder
fn parse_set(name: &str) -> Result<ArtifactSet, ConfigError> {
    ArtifactSet::from_name(name)
        .filter(|&set| set != ArtifactSet::None)
        .ok_or_else(|| ConfigError::UnknownSet(name.to_string()))
}

impl Character {
    pub fn from_config(c: &CharacterConfig) -> Result<Self, ConfigError> {
        let damage_type = Stat::from_key(&c.damage_type)
            .filter(|s| s.is_damage_type())
            .ok_or_else(|| ConfigError::InvalidDamageType(c.damage_type.clone()))?;

        if !(0..=100).contains(&c.reaction_percentage) {
            return Err(ConfigError::ReactionPercentage(c.reaction_percentage));
        }

        Ok(Self {
            base_atk: c.base_atk,
            reaction_percentage: c.reaction_percentage,
            reaction_multiplier_x10: c.reaction_multiplier_x10,
            damage_type,
            stats: parse_stats(&c.stats)?,
        })
    }
}

impl Weapon {
    pub fn from_config(w: &WeaponConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_atk: w.base_atk,
            stats: parse_stats(&w.stats)?,
        })
    }
}

impl FarmingConfig {
    pub fn from_config(f: &FarmingSection) -> Result<Self, ConfigError> {
        let domains = f
            .domains
            .iter()
            .map(|name| {
                Domain::from_name(name).ok_or_else(|| ConfigError::UnknownDomain(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if domains.is_empty() {
            return Err(ConfigError::NoDomains);
        }

        let mut target_sets = [[false; SetPieces::COUNT]; ArtifactSet::COUNT];
        for name in &f.target_sets_2pc {
            target_sets[parse_set(name)?.index()][SetPieces::Two.index()] = true;
        }
        for name in &f.target_sets_4pc {
            target_sets[parse_set(name)?.index()][SetPieces::Four.index()] = true;
        }

        let mut stat_score = [0; Stat::MAINSTAT_COUNT];
        for (key, &score) in &f.stat_score {
            let stat = parse_stat(key)?;
            if !stat.is_mainstat() {
                return Err(ConfigError::UnscorableStat(key.clone()));
            }
            if score < 0 {
                return Err(ConfigError::NegativeScore { stat: key.clone(), score });
            }
            stat_score[stat.index()] = score;
        }

        if stat_score.iter().all(|&score| score == 0) {
            return Err(ConfigError::NoScoredStats);
        }

        if f.stat_score_max <= 0 {
            return Err(ConfigError::StatScoreMax(f.stat_score_max));
        }

        let min_stat_score: [i32; Slot::COUNT] =
            f.min_stat_score.as_slice().try_into().map_err(|_| {
                ConfigError::MinStatScoreCount {
                    expected: Slot::COUNT,
                    found: f.min_stat_score.len(),
                }
            })?;

        let good_rolls_margin = f.good_rolls_margin.unwrap_or(Self::DEFAULT_GOOD_ROLLS_MARGIN);
        if good_rolls_margin < 0 {
            return Err(ConfigError::NegativeMargin(good_rolls_margin));
        }

        Ok(Self {
            domains,
            target_sets,
            stat_score,
            stat_score_max: f.stat_score_max,
            mainstat_multiplier: f.mainstat_multiplier,
            set_bonus_value: f.set_bonus_value,
            min_stat_score,
            required_er: f.required_er,
            good_rolls_margin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> FarmingSection {
        FarmingSection {
            domains: vec!["Hidden Palace of Zhou Formula".into(), "boss".into()],
            target_sets_2pc: vec!["Gladiator's Finale".into()],
            target_sets_4pc: vec!["Crimson Witch of Flames".into()],
            stat_score: HashMap::from([
                ("atkp".to_string(), 1),
                ("CR".to_string(), 2),
                ("cd".to_string(), 2),
            ]),
            stat_score_max: 2,
            mainstat_multiplier: 6,
            set_bonus_value: 3,
            min_stat_score: vec![4, 4, 10, 10, 10],
            required_er: 1200,
            good_rolls_margin: None,
        }
    }

    #[test]
    fn test_farming_from_config() {
        let farming = FarmingConfig::from_config(&section()).unwrap();
        assert_eq!(farming.domains, vec![Domain::HiddenPalaceOfZhouFormula, Domain::Boss]);
        assert!(farming.is_target(ArtifactSet::GladiatorsFinale, SetPieces::Two));
        assert!(!farming.is_target(ArtifactSet::GladiatorsFinale, SetPieces::Four));
        assert!(farming.is_target(ArtifactSet::CrimsonWitchOfFlames, SetPieces::Four));
        assert!(!farming.is_target(ArtifactSet::CrimsonWitchOfFlames, SetPieces::Two));
        assert_eq!(farming.weight(Stat::CritRate), 2);
        assert_eq!(farming.weight(Stat::ReactionBonus), 0);
        assert_eq!(farming.good_rolls_margin, 3);
        assert_eq!(farming.prune_margin(), 6);
    }

    #[test]
    fn test_farming_rejects_bad_input() {
        let mut s = section();
        s.domains.clear();
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::NoDomains)));

        let mut s = section();
        s.domains.push("Spiral Abyss".into());
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::UnknownDomain(_))));

        let mut s = section();
        s.min_stat_score.pop();
        assert!(matches!(
            FarmingConfig::from_config(&s),
            Err(ConfigError::MinStatScoreCount { expected: 5, found: 4 })
        ));

        let mut s = section();
        s.stat_score.insert("dmg_burst".into(), 1);
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::UnscorableStat(_))));

        let mut s = section();
        s.stat_score.insert("em".into(), -1);
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::NegativeScore { .. })));

        let mut s = section();
        s.stat_score.clear();
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::NoScoredStats)));

        let mut s = section();
        s.stat_score_max = 0;
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::StatScoreMax(0))));

        let mut s = section();
        s.target_sets_2pc.push("Emblem of Severed Fate".into());
        assert!(matches!(FarmingConfig::from_config(&s), Err(ConfigError::UnknownSet(_))));

        let mut s = section();
        s.target_sets_4pc.push("No set".into());
        assert!(matches!(
            FarmingConfig::from_config(&s),
            Err(ConfigError::UnknownSet(ref name)) if name == "No set"
        ));
    }

    #[test]
    fn test_character_validation() {
        let mut c = CharacterConfig {
            base_atk: 106,
            reaction_percentage: 50,
            reaction_multiplier_x10: 15,
            damage_type: "DMG_SKILL".into(),
            stats: HashMap::from([("cd".to_string(), 384)]),
        };
        let character = Character::from_config(&c).unwrap();
        assert_eq!(character.damage_type, Stat::DmgSkill);
        assert_eq!(character.stats[Stat::CritDamage], 384);

        c.damage_type = "atkp".into();
        assert!(matches!(Character::from_config(&c), Err(ConfigError::InvalidDamageType(_))));

        c.damage_type = "dmg_none".into();
        c.reaction_percentage = 120;
        assert!(matches!(Character::from_config(&c), Err(ConfigError::ReactionPercentage(120))));

        c.reaction_percentage = 0;
        c.stats.insert("speed".into(), 1);
        assert!(matches!(Character::from_config(&c), Err(ConfigError::UnknownStat(_))));
    }

    #[test]
    fn test_score_counts_weighted_rolls() {
        let farming = FarmingConfig::from_config(&section()).unwrap();
        let mut a = Artifact::new(Slot::Circlet, Stat::CritRate, ArtifactSet::CrimsonWitchOfFlames);
        a.push_substat(Stat::CritDamage, 132); // two rolls' worth
        a.push_substat(Stat::AtkPct, 47);
        a.push_substat(Stat::Hp, 299);
        // 6 * 2 mainstat + 3 target set + 2 * 132 / 54 + 1 * 47 / 41
        assert_eq!(farming.score(&a), 12 + 3 + 4 + 1);
        assert!(farming.upgradeable(&a));
        assert!(!farming.has_useless_mainstat(&a));

        let b = Artifact::new(Slot::Sands, Stat::DefPct, ArtifactSet::Lavawalker);
        assert_eq!(farming.score(&b), 0);
        assert!(!farming.upgradeable(&b));
        assert!(farming.has_useless_mainstat(&b));

        let flower = Artifact::new(Slot::Flower, Stat::Hp, ArtifactSet::None);
        assert!(!farming.has_useless_mainstat(&flower));
    }
}
