use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::error::{Error, Result};
use crate::math::{TensorView, TensorViewMut};

/// The closed set of elementwise activations a dense layer can use.
/// Each variant carries its own function and closed-form derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Identity,
    Sigmoid,
    Tanh,
    #[serde(rename = "relu")]
    ReLU,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative with respect to the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
        }
    }

    /// `dst = f(src)`. Identity is a plain copy.
    pub fn apply(&self, mut dst: TensorViewMut<'_>, src: TensorView<'_>) {
        match self {
            ActivationFunction::Identity => dst.copy_from(src),
            kind => dst.map_from(src, |x| kind.function(x)),
        };
    }

    /// `dst = f'(src)`.
    pub fn apply_derivative(&self, mut dst: TensorViewMut<'_>, src: TensorView<'_>) {
        dst.map_from(src, |x| self.derivative(x));
    }

    /// Tag written to model files. The numbering is part of the file format.
    pub fn tag(&self) -> u32 {
        match self {
            ActivationFunction::ReLU => 0,
            ActivationFunction::Tanh => 1,
            ActivationFunction::Sigmoid => 2,
            ActivationFunction::Identity => 3,
        }
    }

    pub fn from_tag(tag: u32) -> Result<ActivationFunction> {
        match tag {
            0 => Ok(ActivationFunction::ReLU),
            1 => Ok(ActivationFunction::Tanh),
            2 => Ok(ActivationFunction::Sigmoid),
            3 => Ok(ActivationFunction::Identity),
            other => Err(Error::UnknownActivation(other)),
        }
    }
}
