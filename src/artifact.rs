//! Artifact generation and upgrading

use crate::tables::{mainstat_value, StatTable, EXTRA_SUBSTAT_PROB, MAX_LEVEL, SUBSTAT_TIERS};
use crate::types::{ArtifactSet, Domain, Slot, Stat, Stats};
use rand::Rng;
use serde::Serialize;

/// One sub stat on an artifact and the total it has accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubstatLine {
    pub stat: Stat,
    pub value: i32,
    /// Number of tier increments rolled into `value`
    pub rolls: u8,
}

impl SubstatLine {
    const EMPTY: SubstatLine = SubstatLine { stat: Stat::Hp, value: 0, rolls: 0 };
}

/// A single 5-star artifact, either fresh (+0) or fully upgraded (+20)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub slot: Slot,
    pub mainstat: Stat,
    pub set: ArtifactSet,
    pub level: u8,
    /// Cached quality score from the farming config
    pub score: i32,
    /// Whether the artifact dropped with four sub stats
    pub extra_substat: bool,
    #[serde(rename = "substats", serialize_with = "serialize_lines")]
    lines: ([SubstatLine; 4], u8),
}

fn serialize_lines<S: serde::Serializer>(
    lines: &([SubstatLine; 4], u8),
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(&lines.0[..lines.1 as usize])
}

impl Artifact {
    /// A +0 artifact with no sub stats yet
    pub fn new(slot: Slot, mainstat: Stat, set: ArtifactSet) -> Self {
        Self {
            slot,
            mainstat,
            set,
            level: 0,
            score: 0,
            extra_substat: false,
            lines: ([SubstatLine::EMPTY; 4], 0),
        }
    }

    #[inline]
    pub fn substats(&self) -> &[SubstatLine] {
        &self.lines.0[..self.lines.1 as usize]
    }

    pub fn has_substat(&self, stat: Stat) -> bool {
        self.substats().iter().any(|line| line.stat == stat)
    }

    pub fn substat_value(&self, stat: Stat) -> i32 {
        self.substats()
            .iter()
            .find(|line| line.stat == stat)
            .map_or(0, |line| line.value)
    }

    pub fn total_rolls(&self) -> u32 {
        self.substats().iter().map(|line| line.rolls as u32).sum()
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }

    /// Main stat value at the current level; fresh pieces are treated as +20
    pub fn mainstat_value(&self) -> i32 {
        mainstat_value(self.mainstat)
    }

    #[inline]
    pub fn add_to(&self, totals: &mut Stats) {
        totals[self.mainstat] += self.mainstat_value();
        for line in self.substats() {
            totals[line.stat] += line.value;
        }
    }

    #[inline]
    pub fn subtract_from(&self, totals: &mut Stats) {
        totals[self.mainstat] -= self.mainstat_value();
        for line in self.substats() {
            totals[line.stat] -= line.value;
        }
    }

    /// Add a sub stat line. Panics if the artifact already has four lines.
    pub fn push_substat(&mut self, stat: Stat, value: i32) {
        let (lines, count) = &mut self.lines;
        lines[*count as usize] = SubstatLine { stat, value, rolls: 1 };
        *count += 1;
    }

    fn bump_line(&mut self, idx: usize, value: i32) {
        let line = &mut self.lines.0[idx];
        line.value += value;
        line.rolls += 1;
    }
}

/// Round-robin cursor over the configured domains
#[derive(Debug, Clone, Default)]
pub struct DomainRotation {
    cursor: usize,
}

impl DomainRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The domain for the next artifact; `None` if no domains are configured
    pub fn next(&mut self, domains: &[Domain]) -> Option<Domain> {
        if domains.is_empty() {
            return None;
        }
        let domain = domains[self.cursor % domains.len()];
        self.cursor = (self.cursor + 1) % domains.len();
        Some(domain)
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Roll a fresh +0 artifact
pub fn roll_artifact(
    table: &StatTable,
    domains: &[Domain],
    rotation: &mut DomainRotation,
    rng: &mut impl Rng,
) -> Artifact {
    let slot = table.roll_slot(rng);
    let mainstat = table.roll_mainstat(slot, rng);
    let set = match rotation.next(domains) {
        Some(domain) => domain.sets()[rng.gen_range(0..2)],
        None => ArtifactSet::None,
    };

    let mut artifact = Artifact::new(slot, mainstat, set);
    artifact.extra_substat = rng.gen_range(0..EXTRA_SUBSTAT_PROB) == 0;
    let starting = if artifact.extra_substat { 4 } else { 3 };
    for _ in 0..starting {
        roll_substat(&mut artifact, table, rng);
    }
    artifact
}

/// Level an artifact from +0 to +20.
///
/// A three-line artifact first unlocks its fourth line, then every artifact
/// gets four upgrades (five if it dropped with four lines). Either way this is
/// exactly five tier increments.
pub fn upgrade_full(artifact: &mut Artifact, table: &StatTable, rng: &mut impl Rng) {
    if artifact.substats().len() < 4 {
        roll_substat(artifact, table, rng);
    }

    let upgrades = if artifact.extra_substat { 5 } else { 4 };
    for _ in 0..upgrades {
        let idx = rng.gen_range(0..4);
        let stat = artifact.lines.0[idx].stat;
        let value = SUBSTAT_TIERS[stat.index()][rng.gen_range(0..4)];
        artifact.bump_line(idx, value);
    }

    artifact.level = MAX_LEVEL;
}

/// Add one new sub stat, weighted, never the main stat or a duplicate
fn roll_substat(artifact: &mut Artifact, table: &StatTable, rng: &mut impl Rng) {
    let total: u32 = Stat::ALL[..Stat::SUBSTAT_COUNT]
        .iter()
        .filter(|&&stat| stat != artifact.mainstat)
        .map(|stat| table.substat_weights[stat.index()])
        .sum();

    let stat = loop {
        let mut roll = rng.gen_range(0..total);
        let mut picked = Stat::Hp;
        for &stat in Stat::ALL[..Stat::SUBSTAT_COUNT].iter() {
            if stat == artifact.mainstat {
                continue;
            }
            let weight = table.substat_weights[stat.index()];
            if roll < weight {
                picked = stat;
                break;
            }
            roll -= weight;
        }
        if !artifact.has_substat(picked) {
            break picked;
        }
    };

    let value = SUBSTAT_TIERS[stat.index()][rng.gen_range(0..4)];
    artifact.push_substat(stat, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DOMAINS: [Domain; 2] = [Domain::HiddenPalaceOfZhouFormula, Domain::RidgeWatch];

    fn assert_well_formed(a: &Artifact) {
        let subs = a.substats();
        assert!(subs.len() == 3 || subs.len() == 4);
        for (i, line) in subs.iter().enumerate() {
            assert!(line.stat.is_substat());
            assert_ne!(line.stat, a.mainstat);
            assert!(subs[i + 1..].iter().all(|other| other.stat != line.stat));
        }
        assert!(a.level == 0 || a.level == MAX_LEVEL);
    }

    #[test]
    fn test_fresh_artifacts_are_well_formed() {
        let table = StatTable::standard();
        let mut rotation = DomainRotation::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..5000 {
            let a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            assert_well_formed(&a);
            assert_eq!(a.level, 0);
            assert_eq!(a.substats().len(), if a.extra_substat { 4 } else { 3 });
            assert_eq!(a.total_rolls() as usize, a.substats().len());
        }
    }

    #[test]
    fn test_upgrade_adds_exactly_five_increments() {
        let table = StatTable::standard();
        let mut rotation = DomainRotation::new();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..5000 {
            let mut a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            let before = a.total_rolls();
            upgrade_full(&mut a, &table, &mut rng);
            assert_well_formed(&a);
            assert_eq!(a.level, MAX_LEVEL);
            assert_eq!(a.substats().len(), 4);
            assert_eq!(a.total_rolls(), before + 5);
            assert_eq!(a.total_rolls(), if a.extra_substat { 9 } else { 8 });
        }
    }

    #[test]
    fn test_substat_values_are_sums_of_tiers() {
        let table = StatTable::standard();
        let mut rotation = DomainRotation::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..2000 {
            let mut a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            upgrade_full(&mut a, &table, &mut rng);
            for line in a.substats() {
                let tiers = SUBSTAT_TIERS[line.stat.index()];
                let rolls = line.rolls as i32;
                assert!(line.value >= tiers[0] * rolls);
                assert!(line.value <= tiers[3] * rolls);
            }
        }
    }

    #[test]
    fn test_substat_draws_follow_the_weights() {
        const DRAWS: usize = 200_000;
        let table = StatTable::standard();
        let mut rotation = DomainRotation::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2718);

        let mut four_lines = 0usize;
        let mut observed = [0f64; Stat::SUBSTAT_COUNT];
        let mut expected = [0f64; Stat::SUBSTAT_COUNT];
        for _ in 0..DRAWS {
            let a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            if a.extra_substat {
                four_lines += 1;
            }
            observed[a.substats()[0].stat.index()] += 1.0;

            // The main stat is taken out of the pool before the first draw
            let pool: u32 = Stat::ALL[..Stat::SUBSTAT_COUNT]
                .iter()
                .filter(|&&stat| stat != a.mainstat)
                .map(|stat| table.substat_weights[stat.index()])
                .sum();
            for &stat in Stat::ALL[..Stat::SUBSTAT_COUNT].iter() {
                if stat != a.mainstat {
                    expected[stat.index()] += table.substat_weights[stat.index()] as f64 / pool as f64;
                }
            }
        }

        let four_rate = four_lines as f64 / DRAWS as f64;
        assert!((four_rate - 1.0 / EXTRA_SUBSTAT_PROB as f64).abs() < 0.005, "four line rate {}", four_rate);
        for stat in &Stat::ALL[..Stat::SUBSTAT_COUNT] {
            let got = observed[stat.index()] / DRAWS as f64;
            let want = expected[stat.index()] / DRAWS as f64;
            assert!((got - want).abs() < 0.004, "{:?}: observed {} expected {}", stat, got, want);
        }
    }

    #[test]
    fn test_flower_first_line_frequencies() {
        let table = StatTable::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let mut counts = [0usize; Stat::SUBSTAT_COUNT];
        let mut flowers = 0usize;
        let mut rotation = DomainRotation::new();
        while flowers < 40_000 {
            let a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            if a.slot != Slot::Flower {
                continue;
            }
            flowers += 1;
            counts[a.substats()[0].stat.index()] += 1;
        }
        let freq = |stat: Stat| counts[stat.index()] as f64 / flowers as f64;

        // Flat HP is the main stat, leaving 6 + 6 + 5 * 4 + 3 + 3 = 38
        assert_eq!(counts[Stat::Hp.index()], 0);
        for (stat, weight) in [(Stat::Atk, 6.0), (Stat::AtkPct, 4.0), (Stat::CritRate, 3.0), (Stat::CritDamage, 3.0)] {
            assert!((freq(stat) - weight / 38.0).abs() < 0.008, "{:?}: {}", stat, freq(stat));
        }
    }

    #[test]
    fn test_domain_rotation_round_robin() {
        let mut rotation = DomainRotation::new();
        let picked: Vec<Domain> = (0..5).filter_map(|_| rotation.next(&DOMAINS)).collect();
        assert_eq!(
            picked,
            vec![DOMAINS[0], DOMAINS[1], DOMAINS[0], DOMAINS[1], DOMAINS[0]]
        );
        assert_eq!(rotation.next(&[]), None);
        rotation.reset();
        assert_eq!(rotation.next(&DOMAINS), Some(DOMAINS[0]));
    }

    #[test]
    fn test_sets_follow_the_rotation() {
        let table = StatTable::standard();
        let mut rotation = DomainRotation::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for i in 0..100 {
            let a = roll_artifact(&table, &DOMAINS, &mut rotation, &mut rng);
            assert!(DOMAINS[i % 2].sets().contains(&a.set));
        }
        let a = roll_artifact(&table, &[], &mut rotation, &mut rng);
        assert_eq!(a.set, ArtifactSet::None);
    }

    #[test]
    fn test_add_and_subtract_stats() {
        let mut a = Artifact::new(Slot::Circlet, Stat::CritRate, ArtifactSet::None);
        a.push_substat(Stat::CritDamage, 78);
        a.push_substat(Stat::AtkPct, 47);
        a.push_substat(Stat::Atk, 19);
        let mut totals = Stats::ZERO;
        a.add_to(&mut totals);
        assert_eq!(totals[Stat::CritRate], 311);
        assert_eq!(totals[Stat::CritDamage], 78);
        assert_eq!(totals[Stat::Atk], 19);
        a.subtract_from(&mut totals);
        assert_eq!(totals, Stats::ZERO);
    }
}
