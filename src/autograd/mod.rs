//! Tape-based autograd engine
//!
//! Tensors are flat `f32` buffers; every differentiable operation records a
//! [`BackwardOp`] on its output. [`backward`] walks the recorded graph in
//! reverse topological order.
//!
//! ```
//! use layoutgan::autograd::{backward, mul, sum, Tensor};
//!
//! let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
//! let y = sum(&mul(&x, &x));
//! backward(&y, None);
//! assert_eq!(x.grad().unwrap().to_vec(), vec![2.0, 4.0, 6.0]);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub(crate) use backward::tracks;
pub use backward::{backward, BackwardOp};
pub use context::{is_grad_enabled, no_grad};
pub use ops::*;
pub use tensor::Tensor;
