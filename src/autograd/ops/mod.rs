//! Autograd operations with backward passes

mod activations;
mod basic;
mod matmul;
mod shape;

pub use activations::{relu, tanh};
pub use basic::{add, add_scalar, mean, mean_of, mul, scale, sub, sum};
pub use matmul::{matmul, matmul_compute, transpose, transposed};
pub use shape::{add_bias, broadcast_rows, concat_cols, row_norms};
