use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

// These are the core components from our shared library.
use ndarray::ArrayView1;
use vecino_helpers::{Distance, Float, Instance};

/// Errors that can occur when using the k-NN classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnnError {
    /// k must be at least 1
    InvalidK,
    /// Requested more neighbors than the training table holds
    InsufficientNeighbors { requested: usize, available: usize },
    /// An instance's attribute count disagrees with the expected arity
    MismatchedArity { expected: usize, found: usize },
    /// Invalid distance comparison (likely due to NaN values in data)
    InvalidDistance,
}

impl Display for KnnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KnnError::InvalidK => write!(f, "k must be at least 1"),
            KnnError::InsufficientNeighbors {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} neighbors but only {available} training instances are available"
            ),
            KnnError::MismatchedArity { expected, found } => {
                write!(f, "instance arity {found} does not match expected {expected}")
            }
            KnnError::InvalidDistance => write!(
                f,
                "invalid distance comparison (likely due to NaN values in data)"
            ),
        }
    }
}

impl Error for KnnError {}

/// A training instance decorated with its distance to a query.
///
/// Borrows into the training table: the table itself is never annotated,
/// reordered, or copied during neighbor selection.
#[derive(Debug, Clone)]
pub struct Neighbor<'a, F: Float> {
    /// True (Euclidean) distance to the query.
    pub distance: F,
    pub instance: &'a Instance<F>,
}

/// Ranks `training` by distance to `query` and returns the `k` closest, in
/// ascending distance order. Equal distances keep their original training
/// order.
///
/// # Errors
///
/// Fails with [`KnnError::InvalidK`] for `k == 0`, with
/// [`KnnError::InsufficientNeighbors`] when `k` exceeds the training size,
/// with [`KnnError::MismatchedArity`] when a training instance disagrees with
/// the query's arity, and with [`KnnError::InvalidDistance`] when a computed
/// distance is NaN.
pub fn k_closest<'a, F, D>(
    query: ArrayView1<'_, F>,
    training: &'a [Instance<F>],
    k: usize,
    distance: &D,
) -> Result<Vec<Neighbor<'a, F>>, KnnError>
where
    F: Float,
    D: Distance<F>,
{
    if k == 0 {
        return Err(KnnError::InvalidK);
    }
    if k > training.len() {
        return Err(KnnError::InsufficientNeighbors {
            requested: k,
            available: training.len(),
        });
    }

    let arity = query.len();
    let mut ranked = Vec::with_capacity(training.len());
    for instance in training {
        if instance.arity() != arity {
            return Err(KnnError::MismatchedArity {
                expected: arity,
                found: instance.arity(),
            });
        }
        // Rank by the reduced distance (squared Euclidean for L2); it is
        // cheaper and preserves the ordering of the true metric.
        let rdist = distance.rdistance(query, instance.features.view());
        if rdist.is_nan() {
            return Err(KnnError::InvalidDistance);
        }
        ranked.push((rdist, instance));
    }

    // Stable sort so equal distances keep their training order. The NaN
    // fallback is unreachable after the scan above.
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    ranked.truncate(k);

    Ok(ranked
        .into_iter()
        .map(|(rdist, instance)| Neighbor {
            distance: distance.rdistance_to_distance(rdist),
            instance,
        })
        .collect())
}

/// How the predicted label is derived from the retrieved neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub enum VotePolicy {
    /// Median of the neighbor labels.
    ///
    /// Equals the strict majority for a two-valued label domain and odd `k`.
    /// For even `k` a split vote lands midway between the two label values,
    /// and exact-equality scoring then counts the prediction as incorrect.
    #[default]
    MedianLabel,
    /// Strict vote count, ties broken toward the label of the nearest tied
    /// neighbor.
    NearestMajority,
}

fn median_label<F: Float>(neighbors: &[Neighbor<'_, F>]) -> F {
    let mut labels: Vec<F> = neighbors.iter().map(|n| n.instance.label).collect();
    labels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = labels.len() / 2;
    if labels.len() % 2 == 1 {
        labels[mid]
    } else {
        (labels[mid - 1] + labels[mid]) / (F::one() + F::one())
    }
}

fn nearest_majority<F: Float>(neighbors: &[Neighbor<'_, F>]) -> F {
    // Tallies are pushed in nearest-first order, so on a tied vote count the
    // strict comparison below keeps the label whose neighbor is closest.
    let mut tallies: Vec<(F, usize)> = Vec::new();
    for neighbor in neighbors {
        let label = neighbor.instance.label;
        match tallies.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 += 1,
            None => tallies.push((label, 1)),
        }
    }
    let mut best = tallies[0];
    for &entry in &tallies[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    best.0
}

/// A k-Nearest Neighbors (k-NN) classifier over numeric-label instances.
///
/// Predicts the label of a query point from the labels of the `k` most
/// similar training instances, under a configurable [`VotePolicy`].
///
/// # Type Parameters
///
/// * `F`: The float type for features and labels (e.g., `f32`, `f64`).
/// * `D`: The distance metric, which must implement the
///   `vecino_helpers::Distance` trait.
#[derive(Debug, Clone)]
pub struct KnnClassifier<F, D>
where
    F: Float,
    D: Distance<F>,
{
    k: usize,
    training_data: Vec<Instance<F>>,
    distance: D,
    policy: VotePolicy,
}

impl<F, D> KnnClassifier<F, D>
where
    F: Float,
    D: Distance<F>,
{
    /// Creates a new k-NN classifier with the default [`VotePolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`KnnError::InvalidK`] if `k` is 0 and
    /// [`KnnError::InsufficientNeighbors`] if `k` exceeds the training size.
    pub fn new(k: usize, training_data: Vec<Instance<F>>, distance: D) -> Result<Self, KnnError> {
        if k == 0 {
            return Err(KnnError::InvalidK);
        }
        if k > training_data.len() {
            return Err(KnnError::InsufficientNeighbors {
                requested: k,
                available: training_data.len(),
            });
        }
        Ok(Self {
            k,
            training_data,
            distance,
            policy: VotePolicy::default(),
        })
    }

    /// Replaces the vote policy.
    pub fn with_policy(mut self, policy: VotePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn policy(&self) -> VotePolicy {
        self.policy
    }

    /// The `k` training instances closest to `features`, ascending by
    /// distance.
    pub fn neighbors(&self, features: ArrayView1<'_, F>) -> Result<Vec<Neighbor<'_, F>>, KnnError> {
        k_closest(features, &self.training_data, self.k, &self.distance)
    }

    /// Predicts the label value for a new, unseen data point.
    ///
    /// Under [`VotePolicy::MedianLabel`] the returned value can fall between
    /// two label values on an even split; callers comparing by exact equality
    /// will score such a prediction as a miss.
    pub fn predict(&self, features: ArrayView1<'_, F>) -> Result<F, KnnError> {
        let neighbors = self.neighbors(features)?;
        Ok(match self.policy {
            VotePolicy::MedianLabel => median_label(&neighbors),
            VotePolicy::NearestMajority => nearest_majority(&neighbors),
        })
    }
}
