use crate::Float;
use ndarray::Array1;

/// One row of a data table: a numeric feature vector plus its class label.
///
/// The label is stored beside the features rather than as a trailing column,
/// so feature-wise operations (scaling, distances) can never touch it. Code
/// that works with the original row shape splits the trailing column off at
/// the I/O boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_crate::Serialize, serde_crate::Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Instance<F>
where
    F: Float,
{
    pub features: Array1<F>,
    pub label: F,
}

impl<F> Instance<F>
where
    F: Float,
{
    pub fn new(features: Array1<F>, label: F) -> Self {
        Instance { features, label }
    }

    /// Number of attribute columns; the label is not counted.
    pub fn arity(&self) -> usize {
        self.features.len()
    }
}
