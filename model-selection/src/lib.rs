use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

use ndarray::Array1;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{info, warn};

// Core components from the shared library and the classifier crate.
use k_nn::{KnnClassifier, KnnError, VotePolicy};
use vecino_helpers::{Distance, Float, Instance, MinMaxScaler, ScalingError};

/// Errors that can occur during fold construction and cross-validated
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Fold count must be at least 1
    InvalidFoldCount { k_folds: usize },
    /// Cannot evaluate an empty table
    EmptyTable,
    /// Requested subset size is zero or exceeds the attribute count
    InvalidSubsetSize { requested: usize, available: usize },
    /// Attribute name count disagrees with the table arity
    AttributeNameMismatch { names: usize, arity: usize },
    /// An instance's attribute count disagrees with the table's arity
    MismatchedArity { expected: usize, found: usize },
    /// Normalization failed for a training/test fold pair
    Scaling(ScalingError),
    /// Neighbor search or prediction failed
    Knn(KnnError),
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationError::InvalidFoldCount { k_folds } => {
                write!(f, "fold count must be at least 1, got {k_folds}")
            }
            EvaluationError::EmptyTable => write!(f, "cannot evaluate an empty table"),
            EvaluationError::InvalidSubsetSize {
                requested,
                available,
            } => write!(
                f,
                "cannot sample {requested} of {available} attribute columns"
            ),
            EvaluationError::AttributeNameMismatch { names, arity } => write!(
                f,
                "{names} attribute names do not match the table arity {arity}"
            ),
            EvaluationError::MismatchedArity { expected, found } => {
                write!(f, "instance arity {found} does not match expected {expected}")
            }
            EvaluationError::Scaling(e) => write!(f, "{e}"),
            EvaluationError::Knn(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EvaluationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EvaluationError::Scaling(e) => Some(e),
            EvaluationError::Knn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScalingError> for EvaluationError {
    fn from(e: ScalingError) -> Self {
        EvaluationError::Scaling(e)
    }
}

impl From<KnnError> for EvaluationError {
    fn from(e: KnnError) -> Self {
        EvaluationError::Knn(e)
    }
}

/// Groups instance indices by label, groups ordered by ascending label value.
fn group_by_label<F: Float>(table: &[Instance<F>]) -> Vec<(F, Vec<usize>)> {
    let mut groups: Vec<(F, Vec<usize>)> = Vec::new();
    for (i, instance) in table.iter().enumerate() {
        match groups.iter_mut().find(|(label, _)| *label == instance.label) {
            Some((_, members)) => members.push(i),
            None => groups.push((instance.label, vec![i])),
        }
    }
    groups.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    groups
}

/// Splits `table` into `k_folds` class-balanced folds.
///
/// Instances are grouped by class label and each group is dealt round-robin
/// across the folds (member `i` of a group lands in fold `i % k_folds`), so
/// per-class counts across folds differ by at most one and no instance is
/// ever dropped. The split is deterministic for a fixed input order: shuffle
/// the table upstream when random folds are wanted.
///
/// A class group smaller than the fold count leaves some folds without that
/// class (and possibly empty); this is reported as a warning, not an error.
/// Every fold owns independent copies of its instances.
pub fn stratified_folds<F: Float>(
    table: &[Instance<F>],
    k_folds: usize,
) -> Result<Vec<Vec<Instance<F>>>, EvaluationError> {
    if k_folds == 0 {
        return Err(EvaluationError::InvalidFoldCount { k_folds });
    }
    if table.is_empty() {
        return Err(EvaluationError::EmptyTable);
    }

    let groups = group_by_label(table);
    let mut folds: Vec<Vec<Instance<F>>> = vec![Vec::new(); k_folds];
    for (label, members) in &groups {
        if members.len() < k_folds {
            warn!(
                %label,
                group_size = members.len(),
                k_folds,
                "class group smaller than fold count; folds will be uneven"
            );
        }
        for (i, &member) in members.iter().enumerate() {
            folds[i % k_folds].push(table[member].clone());
        }
    }
    Ok(folds)
}

/// Leave-one-fold-out evaluation of a kNN classifier at a fixed `k`.
///
/// Each fold in turn becomes the test set while the remaining folds form the
/// training set. The pair is normalized with extrema fitted on the training
/// side only, every test instance is predicted, and predictions are compared
/// to the true labels by exact equality. The returned accuracy aggregates
/// correct predictions over the entire table, not per-fold averages.
///
/// Deterministic for a fixed table and parameters. Numeric and arity errors
/// abort the evaluation with the wrapped error.
pub fn cross_validate<F, D>(
    table: &[Instance<F>],
    k_folds: usize,
    k: usize,
    distance: D,
    policy: VotePolicy,
) -> Result<F, EvaluationError>
where
    F: Float,
    D: Distance<F>,
{
    let folds = stratified_folds(table, k_folds)?;

    let mut correct = 0usize;
    let mut total = 0usize;
    for held_out in 0..folds.len() {
        let test = &folds[held_out];
        if test.is_empty() {
            continue;
        }
        let training: Vec<Instance<F>> = folds
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != held_out)
            .flat_map(|(_, fold)| fold.iter().cloned())
            .collect();

        let (training, test) = MinMaxScaler::fit_transform_pair(&training, test)?;
        let classifier = KnnClassifier::new(k, training, distance.clone())?.with_policy(policy);
        for instance in &test {
            let predicted = classifier.predict(instance.features.view())?;
            if predicted == instance.label {
                correct += 1;
            }
            total += 1;
        }
    }

    Ok(F::cast(correct).unwrap() / F::cast(total).unwrap())
}

fn sort_by_accuracy_desc<F: Float, P>(results: &mut [(F, P)]) {
    results.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
}

/// Cross-validates at every neighbor count in `ks` and ranks the outcomes.
///
/// Returns `(accuracy, k)` pairs sorted descending by accuracy; the caller
/// picks the head. A `k` whose evaluation fails is reported and skipped so
/// one bad setting does not abort the whole sweep.
pub fn sweep_neighbor_counts<F, D>(
    table: &[Instance<F>],
    k_folds: usize,
    ks: &[usize],
    distance: D,
    policy: VotePolicy,
) -> Result<Vec<(F, usize)>, EvaluationError>
where
    F: Float,
    D: Distance<F>,
{
    if k_folds == 0 {
        return Err(EvaluationError::InvalidFoldCount { k_folds });
    }
    if table.is_empty() {
        return Err(EvaluationError::EmptyTable);
    }

    let mut results = Vec::with_capacity(ks.len());
    for &k in ks {
        info!(k, "evaluating neighbor count");
        match cross_validate(table, k_folds, k, distance.clone(), policy) {
            Ok(accuracy) => results.push((accuracy, k)),
            Err(e) => warn!(k, error = %e, "evaluation failed; skipping this neighbor count"),
        }
    }
    sort_by_accuracy_desc(&mut results);
    Ok(results)
}

/// Repeatedly evaluates random attribute subsets at a fixed `k`.
///
/// Each trial samples `subset_size` distinct attribute columns uniformly at
/// random (the label is always retained), projects a fresh copy of the table
/// onto them, re-partitions, cross-validates, and records the accuracy with
/// the chosen column names. Trials share nothing but the source table, so a
/// projection in one trial can never leak into another.
///
/// Returns all trials sorted descending by accuracy. A failed trial is
/// reported and skipped; structurally invalid input fails the sweep up
/// front.
#[allow(clippy::too_many_arguments)]
pub fn sweep_feature_subsets<F, D, R>(
    table: &[Instance<F>],
    attribute_names: &[String],
    k_folds: usize,
    k: usize,
    subset_size: usize,
    trials: usize,
    distance: D,
    policy: VotePolicy,
    rng: &mut R,
) -> Result<Vec<(F, Vec<String>)>, EvaluationError>
where
    F: Float,
    D: Distance<F>,
    R: Rng,
{
    if k_folds == 0 {
        return Err(EvaluationError::InvalidFoldCount { k_folds });
    }
    let first = table.first().ok_or(EvaluationError::EmptyTable)?;
    let arity = first.arity();
    for instance in table {
        if instance.arity() != arity {
            return Err(EvaluationError::MismatchedArity {
                expected: arity,
                found: instance.arity(),
            });
        }
    }
    if attribute_names.len() != arity {
        return Err(EvaluationError::AttributeNameMismatch {
            names: attribute_names.len(),
            arity,
        });
    }
    if subset_size == 0 || subset_size > arity {
        return Err(EvaluationError::InvalidSubsetSize {
            requested: subset_size,
            available: arity,
        });
    }

    let mut results = Vec::with_capacity(trials);
    for trial in 0..trials {
        let mut columns = index::sample(rng, arity, subset_size).into_vec();
        columns.sort_unstable();

        let projected: Vec<Instance<F>> = table
            .iter()
            .map(|instance| {
                let features: Array1<F> =
                    columns.iter().map(|&c| instance.features[c]).collect();
                Instance::new(features, instance.label)
            })
            .collect();
        let names: Vec<String> = columns
            .iter()
            .map(|&c| attribute_names[c].clone())
            .collect();

        info!(trial, columns = ?names, "evaluating attribute subset");
        match cross_validate(&projected, k_folds, k, distance.clone(), policy) {
            Ok(accuracy) => results.push((accuracy, names)),
            Err(e) => {
                warn!(trial, columns = ?names, error = %e, "trial failed; skipping this subset")
            }
        }
    }
    sort_by_accuracy_desc(&mut results);
    Ok(results)
}

/// Seeded convenience wrapper around [`sweep_feature_subsets`] for
/// reproducible sweeps.
#[allow(clippy::too_many_arguments)]
pub fn sweep_feature_subsets_with_seed<F, D>(
    table: &[Instance<F>],
    attribute_names: &[String],
    k_folds: usize,
    k: usize,
    subset_size: usize,
    trials: usize,
    distance: D,
    policy: VotePolicy,
    seed: u64,
) -> Result<Vec<(F, Vec<String>)>, EvaluationError>
where
    F: Float,
    D: Distance<F>,
{
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    sweep_feature_subsets(
        table,
        attribute_names,
        k_folds,
        k,
        subset_size,
        trials,
        distance,
        policy,
        &mut rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use vecino_helpers::L2Dist;

    fn single_attribute(values: &[(f64, f64)]) -> Vec<Instance<f64>> {
        values
            .iter()
            .map(|&(x, label)| Instance::new(array![x], label))
            .collect()
    }

    /// 5 instances of each class, single attribute, well separated.
    fn binary_table() -> Vec<Instance<f64>> {
        single_attribute(&[
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (4.0, 0.0),
            (5.0, 0.0),
            (11.0, 1.0),
            (12.0, 1.0),
            (13.0, 1.0),
            (14.0, 1.0),
            (15.0, 1.0),
        ])
    }

    fn sorted_rows(folds: &[Vec<Instance<f64>>]) -> Vec<(f64, f64)> {
        let mut rows: Vec<(f64, f64)> = folds
            .iter()
            .flatten()
            .map(|instance| (instance.features[0], instance.label))
            .collect();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        rows
    }

    #[test]
    fn test_folds_are_a_partition_of_the_table() {
        let table = binary_table();
        let folds = stratified_folds(&table, 3).unwrap();

        assert_eq!(folds.len(), 3);
        let mut expected: Vec<(f64, f64)> = table
            .iter()
            .map(|instance| (instance.features[0], instance.label))
            .collect();
        expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted_rows(&folds), expected);
    }

    #[test]
    fn test_per_class_fold_counts_differ_by_at_most_one() {
        // 7 of class 0, 5 of class 1
        let table = single_attribute(&[
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (4.0, 0.0),
            (5.0, 0.0),
            (6.0, 0.0),
            (7.0, 0.0),
            (11.0, 1.0),
            (12.0, 1.0),
            (13.0, 1.0),
            (14.0, 1.0),
            (15.0, 1.0),
        ]);
        let folds = stratified_folds(&table, 3).unwrap();

        for class in [0.0, 1.0] {
            let counts: Vec<usize> = folds
                .iter()
                .map(|fold| fold.iter().filter(|i| i.label == class).count())
                .collect();
            let min = counts.iter().min().unwrap();
            let max = counts.iter().max().unwrap();
            assert!(max - min <= 1, "class {class} counts {counts:?}");
        }
    }

    #[test]
    fn test_round_robin_placement_is_deterministic() {
        let table = single_attribute(&[
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (11.0, 1.0),
            (12.0, 1.0),
        ]);
        let folds = stratified_folds(&table, 2).unwrap();

        // group 0 deals 1.0, 3.0 to fold 0 and 2.0 to fold 1; group 1 deals
        // 11.0 to fold 0 and 12.0 to fold 1
        let fold0: Vec<f64> = folds[0].iter().map(|i| i.features[0]).collect();
        let fold1: Vec<f64> = folds[1].iter().map(|i| i.features[0]).collect();
        assert_eq!(fold0, vec![1.0, 3.0, 11.0]);
        assert_eq!(fold1, vec![2.0, 12.0]);

        assert_eq!(folds, stratified_folds(&table, 2).unwrap());
    }

    #[test]
    fn test_class_group_smaller_than_fold_count_keeps_all_instances() {
        let table = single_attribute(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (11.0, 1.0)]);
        let folds = stratified_folds(&table, 3).unwrap();
        assert_eq!(folds.iter().map(Vec::len).sum::<usize>(), table.len());
    }

    #[test]
    fn test_zero_folds_is_an_error() {
        let table = binary_table();
        assert_eq!(
            stratified_folds(&table, 0).unwrap_err(),
            EvaluationError::InvalidFoldCount { k_folds: 0 }
        );
    }

    #[test]
    fn test_empty_table_is_an_error() {
        let table: Vec<Instance<f64>> = vec![];
        assert_eq!(
            stratified_folds(&table, 2).unwrap_err(),
            EvaluationError::EmptyTable
        );
    }

    #[test]
    fn test_well_separated_classes_classify_perfectly() {
        // 2 folds, k = 1: every held-out instance's nearest training
        // neighbor carries the same class, including through the tie cases,
        // so the aggregate accuracy over all 10 predictions is exactly 1.
        let accuracy = cross_validate(
            &binary_table(),
            2,
            1,
            L2Dist,
            VotePolicy::MedianLabel,
        )
        .unwrap();
        assert_abs_diff_eq!(accuracy, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_accuracy_is_within_unit_interval_and_deterministic() {
        let table = single_attribute(&[
            (1.0, 0.0),
            (2.0, 1.0),
            (3.0, 0.0),
            (4.0, 1.0),
            (5.0, 0.0),
            (6.0, 1.0),
            (7.0, 0.0),
            (8.0, 1.0),
        ]);
        let first = cross_validate(&table, 2, 3, L2Dist, VotePolicy::MedianLabel).unwrap();
        let second = cross_validate(&table, 2, 3, L2Dist, VotePolicy::MedianLabel).unwrap();

        assert!((0.0..=1.0).contains(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_training_column_aborts_the_evaluation() {
        let table: Vec<Instance<f64>> = (0..8)
            .map(|i| Instance::new(array![i as f64, 5.0], (i % 2) as f64))
            .collect();
        let result = cross_validate(&table, 2, 1, L2Dist, VotePolicy::MedianLabel);
        assert_eq!(
            result.unwrap_err(),
            EvaluationError::Scaling(ScalingError::DegenerateColumn { column: 1 })
        );
    }

    #[test]
    fn test_neighbor_sweep_ranks_descending() {
        let results = sweep_neighbor_counts(
            &binary_table(),
            2,
            &[1, 3],
            L2Dist,
            VotePolicy::MedianLabel,
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].0 >= results[1].0);
        for (accuracy, _) in &results {
            assert!((0.0..=1.0).contains(accuracy));
        }
    }

    #[test]
    fn test_neighbor_sweep_skips_a_failing_k() {
        // The larger training side holds 6 instances, so k = 7 cannot be
        // satisfied in any fold and that trial is dropped.
        let results = sweep_neighbor_counts(
            &binary_table(),
            2,
            &[1, 7],
            L2Dist,
            VotePolicy::MedianLabel,
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1, 1);
    }

    fn three_attribute_table() -> (Vec<Instance<f64>>, Vec<String>) {
        let table: Vec<Instance<f64>> = (0..10)
            .map(|i| {
                let x = i as f64;
                let label = if i < 5 { 0.0 } else { 1.0 };
                Instance::new(array![x, 2.0 * x + 1.0, 30.0 - x], label)
            })
            .collect();
        let names = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        (table, names)
    }

    #[test]
    fn test_subset_sweep_drops_exactly_one_attribute() {
        let (table, names) = three_attribute_table();
        let results = sweep_feature_subsets_with_seed(
            &table,
            &names,
            2,
            1,
            names.len() - 1,
            4,
            L2Dist,
            VotePolicy::MedianLabel,
            7,
        )
        .unwrap();

        assert_eq!(results.len(), 4);
        for (accuracy, columns) in &results {
            assert!((0.0..=1.0).contains(accuracy));
            assert_eq!(columns.len(), names.len() - 1);
            for column in columns {
                assert!(names.contains(column));
            }
        }
    }

    #[test]
    fn test_subset_sweep_is_reproducible_for_a_seed() {
        let (table, names) = three_attribute_table();
        let run = |seed| {
            sweep_feature_subsets_with_seed(
                &table,
                &names,
                2,
                1,
                2,
                5,
                L2Dist,
                VotePolicy::MedianLabel,
                seed,
            )
            .unwrap()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_subset_sweep_rejects_bad_sizes() {
        let (table, names) = three_attribute_table();
        assert_eq!(
            sweep_feature_subsets_with_seed(
                &table,
                &names,
                2,
                1,
                0,
                1,
                L2Dist,
                VotePolicy::MedianLabel,
                0,
            )
            .unwrap_err(),
            EvaluationError::InvalidSubsetSize {
                requested: 0,
                available: 3
            }
        );
        assert_eq!(
            sweep_feature_subsets_with_seed(
                &table,
                &names,
                2,
                1,
                4,
                1,
                L2Dist,
                VotePolicy::MedianLabel,
                0,
            )
            .unwrap_err(),
            EvaluationError::InvalidSubsetSize {
                requested: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_subset_sweep_rejects_mismatched_names() {
        let (table, _) = three_attribute_table();
        let names = vec!["alpha".to_string()];
        assert_eq!(
            sweep_feature_subsets_with_seed(
                &table,
                &names,
                2,
                1,
                1,
                1,
                L2Dist,
                VotePolicy::MedianLabel,
                0,
            )
            .unwrap_err(),
            EvaluationError::AttributeNameMismatch { names: 1, arity: 3 }
        );
    }
}
