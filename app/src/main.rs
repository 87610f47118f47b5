mod cli;
mod dataset;
mod logging;

use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;
use vecino::{L2Dist, VotePolicy};

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.k_step == 0 {
        bail!("--k-step must be at least 1");
    }

    let mut dataset = dataset::load_csv(&cli.data, &cli.missing)
        .with_context(|| format!("failed to load {}", cli.data.display()))?;

    let dropped = dataset.drop_incomplete();
    if dropped > 0 {
        info!(dropped, "dropped rows with missing values");
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(cli.seed);
    dataset.instances.shuffle(&mut rng);
    if let Some(sample) = cli.sample {
        dataset.instances.truncate(sample);
    }
    info!(
        rows = dataset.instances.len(),
        attributes = dataset.attribute_names.len(),
        label = %dataset.label_name,
        "table ready"
    );

    let policy: VotePolicy = cli.policy.into();
    let ks: Vec<usize> = (cli.k_start..cli.k_end).step_by(cli.k_step).collect();

    let ranked =
        model_selection::sweep_neighbor_counts(&dataset.instances, cli.folds, &ks, L2Dist, policy)?;

    println!("Neighbor count sweep ({} folds):", cli.folds);
    println!("{:>10}  {:>4}", "accuracy", "k");
    for (accuracy, k) in &ranked {
        println!("{accuracy:>10.4}  {k:>4}");
    }

    if cli.subset_trials > 0 {
        let best_k = ranked.first().map(|&(_, k)| k).unwrap_or(cli.k_start);
        let subset_size = cli
            .subset_size
            .unwrap_or_else(|| dataset.attribute_names.len().saturating_sub(1).max(1));

        let results = model_selection::sweep_feature_subsets_with_seed(
            &dataset.instances,
            &dataset.attribute_names,
            cli.folds,
            best_k,
            subset_size,
            cli.subset_trials,
            L2Dist,
            policy,
            cli.seed,
        )?;

        println!();
        println!("Attribute subset sweep ({subset_size} columns, k = {best_k}):");
        println!("{:>10}  columns", "accuracy");
        for (accuracy, names) in &results {
            println!("{accuracy:>10.4}  {}", names.join(", "));
        }
    }

    Ok(())
}
