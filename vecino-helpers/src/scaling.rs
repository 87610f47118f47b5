use crate::{Float, Instance};
use ndarray::Array1;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors that can occur while fitting or applying a [`MinMaxScaler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalingError {
    /// Cannot learn extrema from an empty training table.
    EmptyTrainingSet,
    /// A training column's min equals its max, so no [0,1] rescale exists.
    DegenerateColumn { column: usize },
    /// A training column holds only missing (NaN) values.
    EmptyColumn { column: usize },
    /// An instance's attribute count disagrees with the fitted arity.
    MismatchedArity { expected: usize, found: usize },
}

impl Display for ScalingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalingError::EmptyTrainingSet => {
                write!(f, "cannot fit a scaler on an empty training table")
            }
            ScalingError::DegenerateColumn { column } => write!(
                f,
                "column {column} is degenerate: min equals max, no [0,1] rescale exists"
            ),
            ScalingError::EmptyColumn { column } => {
                write!(f, "column {column} holds no present values")
            }
            ScalingError::MismatchedArity { expected, found } => {
                write!(f, "instance arity {found} does not match expected {expected}")
            }
        }
    }
}

impl Error for ScalingError {}

/// Min-max rescaler into [0,1], fitted on training data only.
///
/// Each attribute column is fitted independently. A NaN entry marks a missing
/// value: it is excluded when learning the extrema and passes through
/// `transform` unchanged, keeping row and column positions intact. Labels are
/// never touched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct MinMaxScaler<F>
where
    F: Float,
{
    ranges: Vec<(F, F)>,
}

impl<F> MinMaxScaler<F>
where
    F: Float,
{
    /// Learns per-column `(min, max)` pairs from the training table.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::DegenerateColumn`] when a column's min equals
    /// its max: no [0,1] rescale exists and the failure is surfaced instead
    /// of producing NaN. Also fails on an empty table, an all-missing
    /// column, or instances of unequal arity.
    pub fn fit(training: &[Instance<F>]) -> Result<Self, ScalingError> {
        let first = training.first().ok_or(ScalingError::EmptyTrainingSet)?;
        let arity = first.arity();
        for instance in training {
            if instance.arity() != arity {
                return Err(ScalingError::MismatchedArity {
                    expected: arity,
                    found: instance.arity(),
                });
            }
        }

        let mut ranges = Vec::with_capacity(arity);
        for column in 0..arity {
            let mut min_val = F::infinity();
            let mut max_val = F::neg_infinity();
            let mut present = 0usize;
            for instance in training {
                let x = instance.features[column];
                if x.is_nan() {
                    continue;
                }
                if x < min_val {
                    min_val = x;
                }
                if x > max_val {
                    max_val = x;
                }
                present += 1;
            }
            if present == 0 {
                return Err(ScalingError::EmptyColumn { column });
            }
            if min_val == max_val {
                return Err(ScalingError::DegenerateColumn { column });
            }
            ranges.push((min_val, max_val));
        }
        Ok(Self { ranges })
    }

    /// Number of attribute columns the scaler was fitted on.
    pub fn arity(&self) -> usize {
        self.ranges.len()
    }

    /// Rescales every feature with the fitted extrema, clamped to [0,1].
    ///
    /// Values outside the fitted range (a test value beyond the training
    /// extrema) clamp to the nearest bound. Produces a fresh table; the input
    /// is left untouched.
    pub fn transform(&self, table: &[Instance<F>]) -> Result<Vec<Instance<F>>, ScalingError> {
        table
            .iter()
            .map(|instance| {
                if instance.arity() != self.ranges.len() {
                    return Err(ScalingError::MismatchedArity {
                        expected: self.ranges.len(),
                        found: instance.arity(),
                    });
                }
                let features: Array1<F> = instance
                    .features
                    .iter()
                    .zip(&self.ranges)
                    .map(|(&x, &(min_val, max_val))| {
                        if x.is_nan() {
                            x
                        } else {
                            ((x - min_val) / (max_val - min_val))
                                .min(F::one())
                                .max(F::zero())
                        }
                    })
                    .collect();
                Ok(Instance::new(features, instance.label))
            })
            .collect()
    }

    /// Fits on `training` and transforms both tables with the same extrema —
    /// the shape every held-out fold evaluation needs.
    pub fn fit_transform_pair(
        training: &[Instance<F>],
        test: &[Instance<F>],
    ) -> Result<(Vec<Instance<F>>, Vec<Instance<F>>), ScalingError> {
        let scaler = Self::fit(training)?;
        Ok((scaler.transform(training)?, scaler.transform(test)?))
    }
}
