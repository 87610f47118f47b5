//! Cross-validated kNN classification on tabular numeric data.
//!
//! The workspace splits into three members, re-exported here:
//!
//! - `vecino-helpers`: the shared [`Instance`] row type, the [`Float`] trait,
//!   distance metrics, and the min-max [`MinMaxScaler`]
//! - `k-nn`: neighbor search ([`k_closest`]) and the [`KnnClassifier`] with
//!   its [`VotePolicy`] options
//! - `model-selection`: stratified fold construction, cross-validation, and
//!   the hyperparameter sweeps

pub use k_nn::{k_closest, KnnClassifier, KnnError, Neighbor, VotePolicy};
pub use model_selection::{
    cross_validate, stratified_folds, sweep_feature_subsets, sweep_feature_subsets_with_seed,
    sweep_neighbor_counts, EvaluationError,
};
pub use vecino_helpers::{Distance, Float, Instance, L2Dist, MinMaxScaler, ScalingError};
