use ndarray::NdFloat;

use num_traits::{FromPrimitive, NumCast, Signed};
use rand::distr::uniform::SampleUniform;

use std::iter::Sum;

// Include submodules
mod common;
mod distance;
mod scaling;

// Re-export types from submodules
pub use common::Instance;
pub use distance::{Distance, L2Dist};
pub use scaling::{MinMaxScaler, ScalingError};

pub trait Float:
    NdFloat + FromPrimitive + Default + Signed + Sum + SampleUniform + std::marker::Unpin
{
    fn cast<T: NumCast>(x: T) -> Option<Self> {
        NumCast::from(x)
    }
}

impl Float for f32 {}

impl Float for f64 {}
