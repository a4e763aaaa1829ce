//! Activation functions for neural layers

use serde::{Deserialize, Serialize};

/// Activation function applied element-wise to a layer's weighted sums.
///
/// Both variants are total functions with no failure modes. A layer with
/// no activation set passes its weighted sums through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Logistic sigmoid, clamped to 1 above input 10 and 0 below -10 to
    /// skip the exp for saturated inputs.
    ClampedSigmoid,
    /// x / (1 + |x|), output in (-1, 1).
    SoftSign,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::ClampedSigmoid => {
                if x > 10.0 {
                    1.0
                } else if x < -10.0 {
                    0.0
                } else {
                    1.0 / (1.0 + (-x).exp())
                }
            }
            Activation::SoftSign => x / (1.0 + x.abs()),
        }
    }
}
