//! CLI entry point for Artifact Sim

use anyhow::{bail, Context, Result};
use artifact_sim_lib::{
    config::ProfileConfig,
    damage::{total_attack, DamageModel},
    farm::{run_and_analyze, Farmer},
    profile::Profile,
    stats::{FarmedSet, FarmedSetStats, RollStats, SetBonusTier},
    artifact::Artifact,
    types::{SetPieces, Slot, Stat, Stats},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "artifact-sim")]
#[command(version = "1.0")]
#[command(about = "Monte-Carlo artifact farming and loadout optimization simulator", long_about = None)]
struct Args {
    /// Path to the profile file (YAML or JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Seed the random number generator
    #[arg(short, long, conflicts_with = "reseed")]
    seed: Option<u64>,

    /// Seed the random number generator from the system clock
    #[arg(long, default_value = "false")]
    reseed: bool,

    /// Use parallel processing
    #[arg(short, long, default_value = "false")]
    parallel: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Show timing information
    #[arg(short, long, default_value = "false")]
    timing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate many people farming artifacts and print the damage distribution
    Farm {
        /// Number of farming sessions
        #[arg(short, long, default_value = "1000")]
        iters: usize,

        /// Artifacts farmed per session
        #[arg(short = 'n', long)]
        artifacts: usize,
    },

    /// Farm once and print the best loadout found
    FarmOne {
        #[arg(short = 'n', long)]
        artifacts: usize,
    },

    /// Farm for every artifact count from start to stop and write a CSV report
    FarmScript {
        #[arg(short, long, default_value = "1000")]
        iters: usize,

        #[arg(long)]
        start: usize,

        #[arg(long)]
        stop: usize,

        #[arg(long)]
        step: usize,

        #[arg(long, default_value = "output.csv")]
        out: PathBuf,
    },

    /// Roll and upgrade many artifacts and print some statistics
    Roll {
        #[arg(short = 'n', long)]
        count: usize,
    },

    /// Roll and upgrade one artifact and print it
    RollOne,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artifact_sim=info,artifact_sim_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = ProfileConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load profile {}", args.config.display()))?;
    let profile = Profile::from_config(&config)
        .with_context(|| format!("Invalid profile {}", args.config.display()))?;

    let mut farmer = match args.seed {
        Some(seed) => Farmer::with_seed(seed),
        None => Farmer::new(),
    };
    if args.reseed {
        let seed = farmer.reseed_from_time();
        info!(seed, "Random number generator seeded from the clock");
    }

    let start = Instant::now();
    match args.command {
        Command::Farm { iters, artifacts } => {
            let stats = run_and_analyze(&profile, iters, artifacts, &mut farmer, args.parallel);
            let elapsed = start.elapsed().as_secs_f64();
            match args.output {
                OutputFormat::Text => {
                    println!("=== Farming Results ===");
                    println!("Sessions: {} x {} artifacts", iters, artifacts);
                    println!();
                    print_farmed_set_stats(&stats);
                }
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "sessions": iters,
                        "artifacts": artifacts,
                        "parallel": args.parallel,
                        "elapsed_seconds": elapsed,
                        "stats": stats,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
        }
        Command::FarmOne { artifacts } => {
            let set = farmer.farm(&profile.character, &profile.weapon, &profile.farming, artifacts);
            match args.output {
                OutputFormat::Text => print_farmed_set(&profile, &set),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&set)?),
            }
        }
        Command::FarmScript { iters, start: first, stop, step, out } => {
            if step == 0 {
                bail!("--step must be positive");
            }
            if first > stop {
                bail!("--start ({}) is past --stop ({})", first, stop);
            }

            let file = File::create(&out)
                .with_context(|| format!("Failed to open {} for writing", out.display()))?;
            let mut writer = BufWriter::new(file);
            writeln!(
                writer,
                "Artifacts,Mean,Stddev,5%ile,25%ile,Median,75%ile,95%ile,Good Rolls,Crit Value,Upgrade ratio"
            )?;

            for n in (first..=stop).step_by(step) {
                info!(artifacts = n, sessions = iters, "Farming");
                let stats = run_and_analyze(&profile, iters, n, &mut farmer, args.parallel);
                writeln!(
                    writer,
                    "{},{:.2},{:.2},{},{},{},{},{},{},{},{}%",
                    n,
                    stats.mean,
                    stats.stddev,
                    stats.percentile(5),
                    stats.percentile(25),
                    stats.median(),
                    stats.percentile(75),
                    stats.percentile(95),
                    stats.good_rolls,
                    stats.crit_value,
                    stats.total_upgrade_ratio.percentage()
                )?;
            }
            writer.flush()?;
            info!(path = %out.display(), "Report written");
        }
        Command::Roll { count } => {
            let stats = farmer.roll_sample(&profile.farming, count);
            match args.output {
                OutputFormat::Text => print_roll_stats(&stats),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            }
        }
        Command::RollOne => {
            let artifact = farmer.roll_upgraded(&profile.farming);
            match args.output {
                OutputFormat::Text => print_artifact(&artifact),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&artifact)?),
            }
        }
    }

    if args.timing {
        let elapsed = start.elapsed();
        eprintln!();
        eprintln!("--- Performance ---");
        eprintln!("Total time: {:.3}s", elapsed.as_secs_f64());
    }

    Ok(())
}

fn format_value(stat: Stat, value: i32) -> String {
    if stat.is_flat() {
        value.to_string()
    } else {
        format!("{:.1}", stat.display_value(value))
    }
}

fn print_artifact(artifact: &Artifact) {
    println!("{}", artifact.set.name());
    println!(
        "{}: {} {}",
        artifact.slot.label(),
        format_value(artifact.mainstat, artifact.mainstat_value()),
        artifact.mainstat.label()
    );
    for line in artifact.substats() {
        println!("{} {}", format_value(line.stat, line.value), line.stat.label());
    }
}

fn print_farmed_set(profile: &Profile, set: &FarmedSet) {
    match &set.loadout {
        Some(loadout) => {
            for artifact in loadout {
                print_artifact(artifact);
                println!();
            }
            print_totals(profile, set);
        }
        None => println!("No set with suitable main stats found"),
    }

    let ratios: Vec<String> = set
        .upgrade_ratio
        .iter()
        .map(|tally| format!("{}%", tally.percentage()))
        .collect();
    println!("Upgrade ratio: {}", ratios.join(" "));
    println!("Damage achieved: {}", set.damage);
}

fn print_totals(profile: &Profile, set: &FarmedSet) {
    let model = DamageModel::new(&profile.character, &profile.weapon, &profile.farming);
    let counts = set.set_counts();
    let total = model.total_stats(&set.artifact_stats(), &counts);

    // A 4pc effect replaces whatever 2pc effects were listed before it
    let mut active = String::new();
    for (artifact_set, count) in counts.iter() {
        if count >= SetPieces::Two.required() && profile.farming.is_target(artifact_set, SetPieces::Two) {
            active.push_str(&format!("2 {} ", artifact_set.name()));
        }
        if count >= SetPieces::Four.required() && profile.farming.is_target(artifact_set, SetPieces::Four) {
            active = format!("4 {}", artifact_set.name());
        }
    }

    let mut gained = total;
    gained -= model.base_stats();
    let total_atk = total_attack(model.base_atk(), &total);
    let damage_type = profile.character.damage_type;

    println!("{}", active.trim_end());
    print_stat_block("", total_atk, &total, damage_type);
    println!("From artifacts:");
    print_stat_block(" ", total_atk - model.base_atk() as i64, &gained, damage_type);
    println!();
}

fn print_stat_block(indent: &str, atk: i64, stats: &Stats, damage_type: Stat) {
    let dmg_bonus = stats[Stat::OnElementBonus] + stats[damage_type];
    println!("{}ATK: {}", indent, atk);
    println!("{}Elemental Mastery: {}", indent, stats[Stat::ElementalMastery]);
    println!("{}Energy Recharge: {:.1}%", indent, stats[Stat::EnergyRecharge] as f64 / 10.0);
    println!("{}Crit Rate: {:.1}%", indent, stats[Stat::CritRate] as f64 / 10.0);
    println!("{}Crit DMG: {:.1}%", indent, stats[Stat::CritDamage] as f64 / 10.0);
    println!("{}Total DMG%: {:.1}%", indent, dmg_bonus as f64 / 10.0);
}

fn print_farmed_set_stats(stats: &FarmedSetStats) {
    println!("Loadout found: {:.2}%", stats.viable_rate * 100.0);
    println!("Mean damage: {:.2}", stats.mean);
    println!("Stddev: {:.2}", stats.stddev);
    println!("5%ile: {}", stats.percentile(5));
    println!("25%ile: {}", stats.percentile(25));
    println!("Median: {}", stats.median());
    println!("75%ile: {}", stats.percentile(75));
    println!("95%ile: {}", stats.percentile(95));
    println!();
    println!("Avg number of good (offensive stat) rolls: {}", stats.good_rolls);
    println!("Avg crit value: {}", stats.crit_value);

    let ratios: Vec<String> = Slot::ALL
        .iter()
        .map(|&slot| format!("{} {}%", slot.label(), stats.upgrade_pct(slot)))
        .collect();
    println!(
        "Upgrade ratio: {} (overall {}%)",
        ratios.join(", "),
        stats.total_upgrade_ratio.percentage()
    );

    let bonuses: Vec<String> = SetBonusTier::ALL
        .iter()
        .map(|tier| format!("{} {}%", tier.label(), stats.set_bonus_pcts[tier.index()]))
        .collect();
    println!("Set bonuses: {}", bonuses.join(", "));
}

fn print_roll_stats(stats: &RollStats) {
    println!("=== Roll Results ===");
    println!("Artifacts rolled: {}", stats.samples);
    println!("Double crit pieces:");
    for slot in Slot::ALL {
        println!("  {}: {}%", slot.label(), stats.double_crit_pcts[slot.index()]);
    }
}
