//! Matrix multiplication and transpose
//!
//! Matrices are row-major flat buffers; callers pass the dimensions.

use crate::autograd::{tracks, BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Transpose a row-major matrix (rows x cols) to (cols x rows)
/// Uses cache-efficient blocked transpose for large matrices
#[inline]
pub fn transpose(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut transposed = vec![0.0f32; rows * cols];

    const BLOCK_SIZE: usize = 32;
    if rows >= BLOCK_SIZE && cols >= BLOCK_SIZE {
        transpose_blocked(data, &mut transposed, rows, cols, BLOCK_SIZE);
    } else {
        transpose_simple(data, &mut transposed, rows, cols);
    }
    transposed
}

#[inline]
fn transpose_blocked(src: &[f32], dst: &mut [f32], rows: usize, cols: usize, block: usize) {
    for r_block in (0..rows).step_by(block) {
        for c_block in (0..cols).step_by(block) {
            let r_end = (r_block + block).min(rows);
            let c_end = (c_block + block).min(cols);
            for r in r_block..r_end {
                for c in c_block..c_end {
                    dst[c * rows + r] = src[r * cols + c];
                }
            }
        }
    }
}

#[inline]
fn transpose_simple(src: &[f32], dst: &mut [f32], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

/// C = A @ B with A (m x k) and B (k x n)
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        let c_row = &mut c[i * n..(i + 1) * n];
        for (p, &a_ip) in a_row.iter().enumerate() {
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
    c
}

/// Differentiable matrix multiplication
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "matmul: lhs must be {m}x{k}");
    assert_eq!(b.len(), k * n, "matmul: rhs must be {k}x{n}");

    let a_slice = a.data().as_slice().expect("tensor data is contiguous");
    let b_slice = b.data().as_slice().expect("tensor data is contiguous");
    let data = Array1::from(matmul_compute(a_slice, b_slice, m, k, n));
    let requires_grad = tracks(&[a, b]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(MatmulBackward {
            inputs: [a.clone(), b.clone()],
            m,
            k,
            n,
        }));
    }
    result
}

struct MatmulBackward {
    inputs: [Tensor; 2],
    m: usize,
    k: usize,
    n: usize,
}

impl BackwardOp for MatmulBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let [a, b] = &self.inputs;
        let (m, k, n) = (self.m, self.k, self.n);
        let grad_slice = grad.as_slice().expect("gradient is contiguous");

        // ∂L/∂A = ∂L/∂C @ B^T
        let grad_a = a.requires_grad().then(|| {
            let b_t = transpose(b.data().as_slice().expect("contiguous"), k, n);
            Array1::from(matmul_compute(grad_slice, &b_t, m, n, k))
        });

        // ∂L/∂B = A^T @ ∂L/∂C
        let grad_b = b.requires_grad().then(|| {
            let a_t = transpose(a.data().as_slice().expect("contiguous"), m, k);
            Array1::from(matmul_compute(&a_t, grad_slice, k, m, n))
        });

        vec![grad_a, grad_b]
    }
}

/// Differentiable transpose of a (rows x cols) matrix
pub fn transposed(a: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * cols, "transposed: expected {rows}x{cols}");
    let data = Array1::from(transpose(
        a.data().as_slice().expect("tensor data is contiguous"),
        rows,
        cols,
    ));
    let requires_grad = tracks(&[a]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(TransposeBackward {
            inputs: [a.clone()],
            rows,
            cols,
        }));
    }
    result
}

struct TransposeBackward {
    inputs: [Tensor; 1],
    rows: usize,
    cols: usize,
}

impl BackwardOp for TransposeBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let back = transpose(
            grad.as_slice().expect("gradient is contiguous"),
            self.cols,
            self.rows,
        );
        vec![Some(Array1::from(back))]
    }
}
