//! Core enumerations (stats, slots, sets, domains) and the stat vectors indexed by them

use serde::Serialize;
use std::ops::{AddAssign, Index, IndexMut, SubAssign};

/// Every damage-relevant quantity. Percent stats are stored as percent x 10.
///
/// The first 14 variants are the possible main stats and the first 10 of those
/// are the possible sub stats; the ordinal doubles as the table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub enum Stat {
    Hp,
    Atk,
    Def,
    HpPct,
    AtkPct,
    DefPct,
    ElementalMastery,
    EnergyRecharge,
    CritRate,
    CritDamage,
    HealingBonus,
    PhysicalBonus,
    OnElementBonus,
    OffElementBonus,
    ReactionBonus,
    #[default]
    DmgNone,
    DmgNormalAttack,
    DmgChargedAttack,
    DmgSkill,
    DmgBurst,
}

impl Stat {
    pub const COUNT: usize = 20;
    pub const MAINSTAT_COUNT: usize = 14;
    pub const SUBSTAT_COUNT: usize = 10;

    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::Hp,
        Stat::Atk,
        Stat::Def,
        Stat::HpPct,
        Stat::AtkPct,
        Stat::DefPct,
        Stat::ElementalMastery,
        Stat::EnergyRecharge,
        Stat::CritRate,
        Stat::CritDamage,
        Stat::HealingBonus,
        Stat::PhysicalBonus,
        Stat::OnElementBonus,
        Stat::OffElementBonus,
        Stat::ReactionBonus,
        Stat::DmgNone,
        Stat::DmgNormalAttack,
        Stat::DmgChargedAttack,
        Stat::DmgSkill,
        Stat::DmgBurst,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn is_mainstat(self) -> bool {
        self.index() < Self::MAINSTAT_COUNT
    }

    pub fn is_substat(self) -> bool {
        self.index() < Self::SUBSTAT_COUNT
    }

    /// Damage-type channels a character can optimize for
    pub fn is_damage_type(self) -> bool {
        matches!(
            self,
            Stat::DmgNone
                | Stat::DmgNormalAttack
                | Stat::DmgChargedAttack
                | Stat::DmgSkill
                | Stat::DmgBurst
        )
    }

    /// Flat stats are stored unscaled
    pub fn is_flat(self) -> bool {
        matches!(self, Stat::Hp | Stat::Atk | Stat::Def | Stat::ElementalMastery)
    }

    /// Short config key
    pub fn key(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::HpPct => "hpp",
            Stat::AtkPct => "atkp",
            Stat::DefPct => "defp",
            Stat::ElementalMastery => "em",
            Stat::EnergyRecharge => "er",
            Stat::CritRate => "cr",
            Stat::CritDamage => "cd",
            Stat::HealingBonus => "heal",
            Stat::PhysicalBonus => "phys",
            Stat::OnElementBonus => "on_ele",
            Stat::OffElementBonus => "off_ele",
            Stat::ReactionBonus => "reaction",
            Stat::DmgNone => "dmg_none",
            Stat::DmgNormalAttack => "dmg_na",
            Stat::DmgChargedAttack => "dmg_ca",
            Stat::DmgSkill => "dmg_skill",
            Stat::DmgBurst => "dmg_burst",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Atk => "ATK",
            Stat::Def => "DEF",
            Stat::HpPct => "HP%",
            Stat::AtkPct => "ATK%",
            Stat::DefPct => "DEF%",
            Stat::ElementalMastery => "EM",
            Stat::EnergyRecharge => "ER%",
            Stat::CritRate => "Crit Rate%",
            Stat::CritDamage => "Crit Dmg%",
            Stat::HealingBonus => "Healing Bonus",
            Stat::PhysicalBonus => "Phys%",
            Stat::OnElementBonus => "Element% (correct element)",
            Stat::OffElementBonus => "Element% (wrong element)",
            Stat::ReactionBonus => "Reaction Bonus",
            Stat::DmgNone => "Dmg% (none)",
            Stat::DmgNormalAttack => "Dmg% (Normal Attack)",
            Stat::DmgChargedAttack => "Dmg% (Charged Attack)",
            Stat::DmgSkill => "Dmg% (Skill)",
            Stat::DmgBurst => "Dmg% (Burst)",
        }
    }

    /// Case-insensitive lookup by config key
    pub fn from_key(key: &str) -> Option<Stat> {
        let key = key.trim().to_lowercase();
        Stat::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Human-readable value: flat stats as-is, percentages unscaled
    pub fn display_value(self, value: i32) -> f64 {
        if self.is_flat() {
            value as f64
        } else {
            value as f64 / 10.0
        }
    }
}

/// Equipment position; one artifact per slot is worn at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Slot {
    Flower,
    Feather,
    Sands,
    Goblet,
    Circlet,
}

impl Slot {
    pub const COUNT: usize = 5;
    pub const ALL: [Slot; Slot::COUNT] =
        [Slot::Flower, Slot::Feather, Slot::Sands, Slot::Goblet, Slot::Circlet];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Flower and feather only ever roll flat HP / flat ATK
    pub fn has_fixed_mainstat(self) -> bool {
        matches!(self, Slot::Flower | Slot::Feather)
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Flower => "Flower",
            Slot::Feather => "Feather",
            Slot::Sands => "Sands",
            Slot::Goblet => "Goblet",
            Slot::Circlet => "Circlet",
        }
    }
}

/// Named artifact collections. `None` is the "no set" placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ArtifactSet {
    None,
    GladiatorsFinale,
    WanderersTroupe,
    NoblesseOblige,
    BloodstainedChivalry,
    MaidenBeloved,
    ViridescentVenerer,
    RetracingBolide,
    ArchaicPetra,
    CrimsonWitchOfFlames,
    Lavawalker,
    HeartOfDepth,
    BlizzardStrayer,
    ThunderingFury,
    Thundersoother,
    TenacityOfTheMillelith,
    PaleFlame,
}

impl ArtifactSet {
    pub const COUNT: usize = 17;
    pub const ALL: [ArtifactSet; ArtifactSet::COUNT] = [
        ArtifactSet::None,
        ArtifactSet::GladiatorsFinale,
        ArtifactSet::WanderersTroupe,
        ArtifactSet::NoblesseOblige,
        ArtifactSet::BloodstainedChivalry,
        ArtifactSet::MaidenBeloved,
        ArtifactSet::ViridescentVenerer,
        ArtifactSet::RetracingBolide,
        ArtifactSet::ArchaicPetra,
        ArtifactSet::CrimsonWitchOfFlames,
        ArtifactSet::Lavawalker,
        ArtifactSet::HeartOfDepth,
        ArtifactSet::BlizzardStrayer,
        ArtifactSet::ThunderingFury,
        ArtifactSet::Thundersoother,
        ArtifactSet::TenacityOfTheMillelith,
        ArtifactSet::PaleFlame,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ArtifactSet::None => "No set",
            ArtifactSet::GladiatorsFinale => "Gladiator's Finale",
            ArtifactSet::WanderersTroupe => "Wanderer's Troupe",
            ArtifactSet::NoblesseOblige => "Noblesse Oblige",
            ArtifactSet::BloodstainedChivalry => "Bloodstained Chivalry",
            ArtifactSet::MaidenBeloved => "Maiden Beloved",
            ArtifactSet::ViridescentVenerer => "Viridescent Venerer",
            ArtifactSet::RetracingBolide => "Retracing Bolide",
            ArtifactSet::ArchaicPetra => "Archaic Petra",
            ArtifactSet::CrimsonWitchOfFlames => "Crimson Witch of Flames",
            ArtifactSet::Lavawalker => "Lavawalker",
            ArtifactSet::HeartOfDepth => "Heart of Depth",
            ArtifactSet::BlizzardStrayer => "Blizzard Strayer",
            ArtifactSet::ThunderingFury => "Thundering Fury",
            ArtifactSet::Thundersoother => "Thundersoother",
            ArtifactSet::TenacityOfTheMillelith => "Tenacity of the Millelith",
            ArtifactSet::PaleFlame => "Pale Flame",
        }
    }

    pub fn from_name(name: &str) -> Option<ArtifactSet> {
        let name = name.trim();
        ArtifactSet::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

/// Number of pieces needed to activate a set effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetPieces {
    Two,
    Four,
}

impl SetPieces {
    pub const COUNT: usize = 2;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn required(self) -> u8 {
        match self {
            SetPieces::Two => 2,
            SetPieces::Four => 4,
        }
    }
}

/// Farming source; each yields pieces from one of two sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Domain {
    Boss,
    ClearPoolAndMountainCavern,
    ValleyOfRemembrance,
    DomainOfGuyun,
    HiddenPalaceOfZhouFormula,
    PeakOfVindagnyr,
    MidsummerCourtyard,
    RidgeWatch,
}

impl Domain {
    pub const COUNT: usize = 8;
    pub const ALL: [Domain; Domain::COUNT] = [
        Domain::Boss,
        Domain::ClearPoolAndMountainCavern,
        Domain::ValleyOfRemembrance,
        Domain::DomainOfGuyun,
        Domain::HiddenPalaceOfZhouFormula,
        Domain::PeakOfVindagnyr,
        Domain::MidsummerCourtyard,
        Domain::RidgeWatch,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::Boss => "Boss",
            Domain::ClearPoolAndMountainCavern => "Clear Pool and Mountain Cavern",
            Domain::ValleyOfRemembrance => "Valley of Remembrance",
            Domain::DomainOfGuyun => "Domain of Guyun",
            Domain::HiddenPalaceOfZhouFormula => "Hidden Palace of Zhou Formula",
            Domain::PeakOfVindagnyr => "Peak of Vindagnyr",
            Domain::MidsummerCourtyard => "Midsummer Courtyard",
            Domain::RidgeWatch => "Ridge Watch",
        }
    }

    pub fn from_name(name: &str) -> Option<Domain> {
        let name = name.trim();
        Domain::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

/// A full stat vector indexed by [`Stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats(pub [i32; Stat::COUNT]);

impl Stats {
    pub const ZERO: Stats = Stats([0; Stat::COUNT]);

    pub fn from_pairs(pairs: &[(Stat, i32)]) -> Self {
        let mut stats = Stats::ZERO;
        for &(stat, value) in pairs {
            stats[stat] += value;
        }
        stats
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, i32)> + '_ {
        Stat::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Stat> for Stats {
    type Output = i32;

    #[inline]
    fn index(&self, stat: Stat) -> &i32 {
        &self.0[stat.index()]
    }
}

impl IndexMut<Stat> for Stats {
    #[inline]
    fn index_mut(&mut self, stat: Stat) -> &mut i32 {
        &mut self.0[stat.index()]
    }
}

impl AddAssign<&Stats> for Stats {
    #[inline]
    fn add_assign(&mut self, other: &Stats) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&Stats> for Stats {
    #[inline]
    fn sub_assign(&mut self, other: &Stats) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a -= b;
        }
    }
}

/// Number of worn pieces per [`ArtifactSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetCounts([u8; ArtifactSet::COUNT]);

impl SetCounts {
    pub fn from_sets<I: IntoIterator<Item = ArtifactSet>>(sets: I) -> Self {
        let mut counts = SetCounts::default();
        for set in sets {
            counts.add(set);
        }
        counts
    }

    #[inline]
    pub fn add(&mut self, set: ArtifactSet) {
        self.0[set.index()] += 1;
    }

    #[inline]
    pub fn remove(&mut self, set: ArtifactSet) {
        self.0[set.index()] -= 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactSet, u8)> + '_ {
        ArtifactSet::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<ArtifactSet> for SetCounts {
    type Output = u8;

    #[inline]
    fn index(&self, set: ArtifactSet) -> &u8 {
        &self.0[set.index()]
    }
}
