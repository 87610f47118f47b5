use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use vecino::VotePolicy;

/// Cross-validated kNN hyperparameter search over a delimited numeric table.
#[derive(Parser)]
#[command(
    name = "knn-evaluator",
    version,
    about = "Cross-validated kNN hyperparameter search"
)]
pub struct Cli {
    /// Path to the CSV input (header row; last column is the class label).
    pub data: PathBuf,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Number of cross-validation folds.
    #[arg(long, default_value_t = 10)]
    pub folds: usize,

    /// First neighbor count to evaluate.
    #[arg(long = "k-start", default_value_t = 3)]
    pub k_start: usize,

    /// Exclusive upper bound of the neighbor count sweep.
    #[arg(long = "k-end", default_value_t = 100)]
    pub k_end: usize,

    /// Step between evaluated neighbor counts.
    #[arg(long = "k-step", default_value_t = 6)]
    pub k_step: usize,

    /// Shuffle the table and keep only this many rows.
    #[arg(long)]
    pub sample: Option<usize>,

    /// RNG seed for row shuffling and attribute sampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Field value marking a missing entry.
    #[arg(long, default_value = "NA")]
    pub missing: String,

    /// Number of random attribute subsets to evaluate (0 disables the sweep).
    #[arg(long = "subset-trials", default_value_t = 0)]
    pub subset_trials: usize,

    /// Attribute columns per subset trial (default: all but one).
    #[arg(long = "subset-size")]
    pub subset_size: Option<usize>,

    /// Vote policy used to derive a prediction from the neighbors.
    #[arg(long, value_enum, default_value = "median")]
    pub policy: PolicyArg,
}

/// CLI surface for the classifier's vote policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Median of the neighbor labels.
    Median,
    /// Strict majority, ties broken toward the nearest neighbor.
    Majority,
}

impl From<PolicyArg> for VotePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Median => VotePolicy::MedianLabel,
            PolicyArg::Majority => VotePolicy::NearestMajority,
        }
    }
}
