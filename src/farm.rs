//! Farming engine: roll artifacts, level the promising ones and search for
//! the loadout with the highest damage index

use crate::artifact::{self, Artifact, DomainRotation};
use crate::damage::DamageModel;
use crate::profile::{Character, FarmingConfig, Profile, Weapon};
use crate::stats::{FarmedSet, FarmedSetStats, RollStats, UpgradeTally};
use crate::tables::StatTable;
use crate::types::{SetCounts, Slot, Stat, Stats};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Seed used until the farmer is explicitly reseeded
pub const DEFAULT_SEED: u64 = 0x5EED_A271_FAC7;

/// Buffers reused by every [`Farmer::farm`] call
#[derive(Debug, Clone, Default)]
struct Scratch {
    pool: Vec<Artifact>,
    by_slot: [Vec<Artifact>; Slot::COUNT],
}

/// Random context for one sequential stream of farming sessions.
///
/// Owns the RNG, the domain rotation cursor and the working buffers, so two
/// farmers with the same seed produce identical sessions.
#[derive(Debug, Clone)]
pub struct Farmer {
    rng: SmallRng,
    rotation: DomainRotation,
    table: StatTable,
    scratch: Scratch,
}

impl Default for Farmer {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl Farmer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            rotation: DomainRotation::new(),
            table: StatTable::standard(),
            scratch: Scratch::default(),
        }
    }

    pub fn from_time() -> Self {
        Self::with_seed(time_seed())
    }

    /// Use a custom drop table.
    ///
    /// Panics if some droppable main stat leaves fewer than four weighted sub
    /// stats, since such an artifact could never finish rolling.
    pub fn with_table(mut self, table: StatTable) -> Self {
        assert!(
            table.can_roll_substats(),
            "drop table needs four weighted sub stats besides every droppable main stat"
        );
        self.table = table;
        self
    }

    /// Restart the random stream; the domain rotation keeps its position
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn reseed_from_time(&mut self) -> u64 {
        let seed = time_seed();
        self.reseed(seed);
        seed
    }

    /// Draw a seed for an independent farmer
    pub fn fork_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    pub fn table(&self) -> &StatTable {
        &self.table
    }

    /// Roll a fresh +0 artifact with its score cached
    pub fn roll_artifact(&mut self, farming: &FarmingConfig) -> Artifact {
        let mut piece =
            artifact::roll_artifact(&self.table, &farming.domains, &mut self.rotation, &mut self.rng);
        piece.score = farming.score(&piece);
        piece
    }

    /// Roll an artifact and level it to +20 regardless of its score
    pub fn roll_upgraded(&mut self, farming: &FarmingConfig) -> Artifact {
        let mut piece = self.roll_artifact(farming);
        self.upgrade_full(&mut piece);
        piece.score = farming.score(&piece);
        piece
    }

    pub fn upgrade_full(&mut self, piece: &mut Artifact) {
        artifact::upgrade_full(piece, &self.table, &mut self.rng);
    }

    /// Roll and upgrade `count` artifacts and summarize them
    pub fn roll_sample(&mut self, farming: &FarmingConfig, count: usize) -> RollStats {
        let sample: Vec<Artifact> = (0..count).map(|_| self.roll_upgraded(farming)).collect();
        RollStats::from_artifacts(&sample)
    }

    /// Farm `n` artifacts and return the best loadout among them.
    ///
    /// Pieces meeting their slot's minimum score are leveled to +20; only +20
    /// pieces with a scored main stat are considered for the loadout.
    pub fn farm(
        &mut self,
        character: &Character,
        weapon: &Weapon,
        farming: &FarmingConfig,
        n: usize,
    ) -> FarmedSet {
        let Farmer { rng, rotation, table, scratch } = self;
        let mut upgrade_ratio = [UpgradeTally::default(); Slot::COUNT];

        scratch.pool.clear();
        for _ in 0..n {
            let mut piece = artifact::roll_artifact(table, &farming.domains, rotation, rng);
            let tally = &mut upgrade_ratio[piece.slot.index()];
            tally.generated += 1;
            if farming.upgradeable(&piece) {
                artifact::upgrade_full(&mut piece, table, rng);
                tally.upgraded += 1;
            }
            piece.score = farming.score(&piece);
            scratch.pool.push(piece);
        }

        // Best pieces first so a strong loadout is found early and prunes the rest
        scratch.pool.sort_by(|a, b| b.score.cmp(&a.score));

        for bucket in scratch.by_slot.iter_mut() {
            bucket.clear();
        }
        for piece in &scratch.pool {
            if !piece.is_max_level() || farming.has_useless_mainstat(piece) {
                continue;
            }
            scratch.by_slot[piece.slot.index()].push(*piece);
        }

        debug!(
            artifacts = n,
            flower = scratch.by_slot[0].len(),
            feather = scratch.by_slot[1].len(),
            sands = scratch.by_slot[2].len(),
            goblet = scratch.by_slot[3].len(),
            circlet = scratch.by_slot[4].len(),
            "Searching loadouts"
        );

        let model = DamageModel::new(character, weapon, farming);
        let (loadout, damage) = best_loadout(&scratch.by_slot, &model, farming);

        FarmedSet { loadout, damage, upgrade_ratio }
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(DEFAULT_SEED)
}

/// Depth-first search over one candidate per slot
struct LoadoutSearch<'a> {
    candidates: &'a [Vec<Artifact>; Slot::COUNT],
    model: &'a DamageModel<'a>,
    required_er: i32,
    margin: i32,
    stats: Stats,
    counts: SetCounts,
    picks: [usize; Slot::COUNT],
    best: Option<[usize; Slot::COUNT]>,
    best_scores: [i32; Slot::COUNT],
    best_damage: i64,
}

impl<'a> LoadoutSearch<'a> {
    fn descend(&mut self, depth: usize) {
        if depth == Slot::COUNT {
            self.evaluate();
            return;
        }

        let candidates = self.candidates;
        for (i, piece) in candidates[depth].iter().enumerate() {
            // Too many good rolls behind the current best piece for this slot
            if piece.score <= self.best_scores[depth] - self.margin {
                continue;
            }
            piece.add_to(&mut self.stats);
            self.counts.add(piece.set);
            self.picks[depth] = i;

            self.descend(depth + 1);

            piece.subtract_from(&mut self.stats);
            self.counts.remove(piece.set);
        }
    }

    fn evaluate(&mut self) {
        let er = self.stats[Stat::EnergyRecharge] + self.model.base_stats()[Stat::EnergyRecharge];
        if er < self.required_er {
            return;
        }

        let damage = self.model.damage(&self.stats, &self.counts);
        if damage > self.best_damage {
            self.best_damage = damage;
            self.best = Some(self.picks);
            for (slot, &pick) in self.picks.iter().enumerate() {
                self.best_scores[slot] = self.candidates[slot][pick].score;
            }
        }
    }
}

/// Highest damage loadout among per-slot candidates sorted by descending score
fn best_loadout(
    candidates: &[Vec<Artifact>; Slot::COUNT],
    model: &DamageModel,
    farming: &FarmingConfig,
) -> (Option<[Artifact; Slot::COUNT]>, i64) {
    let mut search = LoadoutSearch {
        candidates,
        model,
        required_er: farming.required_er,
        margin: farming.prune_margin(),
        stats: Stats::ZERO,
        counts: SetCounts::default(),
        picks: [0; Slot::COUNT],
        best: None,
        best_scores: [0; Slot::COUNT],
        best_damage: 0,
    };
    search.descend(0);

    let loadout = search
        .best
        .map(|picks| Slot::ALL.map(|slot| candidates[slot.index()][picks[slot.index()]]));
    (loadout, search.best_damage)
}

/// Run farming sessions one after another on a single farmer
pub fn run_farms_sequential(
    profile: &Profile,
    sessions: usize,
    n: usize,
    farmer: &mut Farmer,
) -> Vec<FarmedSet> {
    (0..sessions)
        .map(|_| farmer.farm(&profile.character, &profile.weapon, &profile.farming, n))
        .collect()
}

/// Run farming sessions in parallel; session `i` uses its own farmer seeded with `seed + i`
pub fn run_farms_parallel(profile: &Profile, sessions: usize, n: usize, seed: u64) -> Vec<FarmedSet> {
    let num_threads = num_cpus::get().max(1);

    let run = || -> Vec<FarmedSet> {
        (0..sessions)
            .into_par_iter()
            .map(|i| {
                Farmer::with_seed(seed.wrapping_add(i as u64)).farm(
                    &profile.character,
                    &profile.weapon,
                    &profile.farming,
                    n,
                )
            })
            .collect()
    };

    match ThreadPoolBuilder::new().num_threads(num_threads).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            warn!(error = %e, "Could not build thread pool, using the global pool");
            run()
        }
    }
}

/// Run farming sessions and return aggregated stats
pub fn run_and_analyze(
    profile: &Profile,
    sessions: usize,
    n: usize,
    farmer: &mut Farmer,
    parallel: bool,
) -> FarmedSetStats {
    let start = Instant::now();
    let sets = if parallel {
        let seed = farmer.fork_seed();
        run_farms_parallel(profile, sessions, n, seed)
    } else {
        run_farms_sequential(profile, sessions, n, farmer)
    };

    let viable = sets.iter().filter(|s| s.is_viable()).count();
    info!(
        sessions,
        artifacts = n,
        viable,
        parallel,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Farming batch finished"
    );
    if sessions > 0 && viable == 0 {
        warn!(artifacts = n, "No session found a loadout meeting the constraints");
    }

    FarmedSetStats::from_sets(&profile.farming, &sets)
}
