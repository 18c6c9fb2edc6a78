//! Quasi-Newton gradient estimation.
//!
//! Parameters of a [`Model`] are stitched into one flat vector, an
//! [`Lbfgs`] run minimises the loss from there, and the [`Estimator`]
//! reports the clipped displacement back in the model's own shapes.

mod estimator;
mod lbfgs;
mod stitch;
mod tensor;

pub use estimator::*;
pub use lbfgs::*;
pub use stitch::*;
pub use tensor::*;
