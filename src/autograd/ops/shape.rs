//! Row-wise operations on row-major matrices: bias broadcast, tiling,
//! column concatenation and per-row L2 norms

use crate::autograd::{tracks, BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Add a `cols`-long bias to every row of a (rows x cols) matrix
pub fn add_bias(x: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(x.len(), rows * cols, "add_bias: expected {rows}x{cols}");
    assert_eq!(bias.len(), cols, "add_bias: bias must have {cols} elements");

    let mut data = x.data().clone();
    for r in 0..rows {
        for c in 0..cols {
            data[r * cols + c] += bias.data()[c];
        }
    }
    let requires_grad = tracks(&[x, bias]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(AddBiasBackward {
            inputs: [x.clone(), bias.clone()],
            rows,
            cols,
        }));
    }
    result
}

struct AddBiasBackward {
    inputs: [Tensor; 2],
    rows: usize,
    cols: usize,
}

impl BackwardOp for AddBiasBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        vec![
            Some(grad.clone()),
            Some(sum_rows(grad, self.rows, self.cols)),
        ]
    }
}

/// Tile a vector as `rows` identical rows
pub fn broadcast_rows(v: &Tensor, rows: usize) -> Tensor {
    let cols = v.len();
    let mut data = Array1::zeros(rows * cols);
    for r in 0..rows {
        data.slice_mut(ndarray::s![r * cols..(r + 1) * cols])
            .assign(v.data());
    }
    let requires_grad = tracks(&[v]);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(BroadcastRowsBackward {
            inputs: [v.clone()],
            rows,
        }));
    }
    result
}

struct BroadcastRowsBackward {
    inputs: [Tensor; 1],
    rows: usize,
}

impl BackwardOp for BroadcastRowsBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let cols = self.inputs[0].len();
        vec![Some(sum_rows(grad, self.rows, cols))]
    }
}

fn sum_rows(grad: &Array1<f32>, rows: usize, cols: usize) -> Array1<f32> {
    let mut out = Array1::zeros(cols);
    for r in 0..rows {
        out += &grad.slice(ndarray::s![r * cols..(r + 1) * cols]);
    }
    out
}

/// Concatenate (rows x cols_i) matrices along the column axis
///
/// Each part is given with its column count. The result is
/// (rows x Σ cols_i).
pub fn concat_cols(parts: &[(&Tensor, usize)], rows: usize) -> Tensor {
    let total_cols: usize = parts.iter().map(|(_, c)| c).sum();
    for (t, cols) in parts {
        assert_eq!(
            t.len(),
            rows * cols,
            "concat_cols: part must be {rows}x{cols}"
        );
    }

    let mut data = Array1::zeros(rows * total_cols);
    for r in 0..rows {
        let mut offset = r * total_cols;
        for (t, cols) in parts {
            data.slice_mut(ndarray::s![offset..offset + cols])
                .assign(&t.data().slice(ndarray::s![r * cols..(r + 1) * cols]));
            offset += cols;
        }
    }

    let refs: Vec<&Tensor> = parts.iter().map(|(t, _)| *t).collect();
    let requires_grad = tracks(&refs);

    let mut result = Tensor::new(data, requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(ConcatColsBackward {
            inputs: parts.iter().map(|(t, _)| (*t).clone()).collect(),
            widths: parts.iter().map(|(_, c)| *c).collect(),
            rows,
        }));
    }
    result
}

struct ConcatColsBackward {
    inputs: Vec<Tensor>,
    widths: Vec<usize>,
    rows: usize,
}

impl BackwardOp for ConcatColsBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let total_cols: usize = self.widths.iter().sum();
        let mut start = 0;
        self.widths
            .iter()
            .map(|&cols| {
                let mut part = Array1::zeros(self.rows * cols);
                for r in 0..self.rows {
                    let src = r * total_cols + start;
                    part.slice_mut(ndarray::s![r * cols..(r + 1) * cols])
                        .assign(&grad.slice(ndarray::s![src..src + cols]));
                }
                start += cols;
                Some(part)
            })
            .collect()
    }
}

/// L2 norm of each row of a (rows x cols) matrix
///
/// The gradient of a zero-norm row is defined as zero.
pub fn row_norms(x: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(x.len(), rows * cols, "row_norms: expected {rows}x{cols}");
    let norms: Array1<f32> = (0..rows)
        .map(|r| {
            x.data()
                .slice(ndarray::s![r * cols..(r + 1) * cols])
                .iter()
                .map(|v| v * v)
                .sum::<f32>()
                .sqrt()
        })
        .collect();
    let requires_grad = tracks(&[x]);

    let mut result = Tensor::new(norms.clone(), requires_grad);
    if requires_grad {
        result.set_backward_op(Rc::new(RowNormsBackward {
            inputs: [x.clone()],
            norms,
            cols,
        }));
    }
    result
}

struct RowNormsBackward {
    inputs: [Tensor; 1],
    norms: Array1<f32>,
    cols: usize,
}

impl BackwardOp for RowNormsBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        // ∂‖x_r‖/∂x_rc = x_rc / ‖x_r‖
        let x = self.inputs[0].data();
        let mut out = Array1::zeros(x.len());
        for (r, &norm) in self.norms.iter().enumerate() {
            if norm == 0.0 {
                continue;
            }
            let factor = grad[r] / norm;
            for c in 0..self.cols {
                let i = r * self.cols + c;
                out[i] = x[i] * factor;
            }
        }
        vec![Some(out)]
    }
}
