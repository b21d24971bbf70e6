//! Unit tests for autograd operations (forward and backward)

use crate::autograd::{
    add, add_bias, add_scalar, backward, broadcast_rows, concat_cols, matmul, mean, mean_of, mul,
    no_grad, relu, row_norms, scale, sub, sum, tanh, transposed, Tensor,
};
use approx::assert_abs_diff_eq;
use ndarray::arr1;

#[test]
fn test_tensor_creation() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    assert_eq!(t.len(), 3);
    assert!(t.requires_grad());
    assert!(t.grad().is_none());
    assert!(t.is_leaf());
}

#[test]
fn test_tensor_grad_accumulation() {
    let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);

    t.accumulate_grad(arr1(&[1.0, 1.0, 1.0]));
    assert_eq!(t.grad().expect("gradient should be available")[0], 1.0);

    t.accumulate_grad(arr1(&[1.0, 1.0, 1.0]));
    assert_eq!(t.grad().expect("gradient should be available")[0], 2.0);

    t.zero_grad();
    assert!(t.grad().is_none());
}

#[test]
fn test_clone_shares_gradient_cell() {
    let t = Tensor::from_vec(vec![1.0], true);
    let c = t.clone();
    c.accumulate_grad(arr1(&[3.0]));
    assert_eq!(t.grad().unwrap()[0], 3.0);
    assert_eq!(t.id(), c.id());
}

#[test]
fn test_data_mut_does_not_alter_recorded_graph() {
    let mut w = Tensor::from_vec(vec![2.0], true);
    let x = Tensor::from_vec(vec![3.0], false);
    let y = mul(&w, &x);

    w.data_mut()[0] = 100.0;
    backward(&y, None);

    // Gradient w.r.t. w is x, independent of the update
    assert_abs_diff_eq!(w.grad().unwrap()[0], 3.0);
    assert_abs_diff_eq!(y.data()[0], 6.0);
}

#[test]
fn test_detach_cuts_graph() {
    let a = Tensor::from_vec(vec![1.0, 2.0], true);
    let d = scale(&a, 2.0).detach();
    assert!(!d.requires_grad());
    assert!(d.is_leaf());
    assert_eq!(d.to_vec(), vec![2.0, 4.0]);
}

#[test]
fn test_add_sub_backward() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    let b = Tensor::from_vec(vec![4.0, 5.0, 6.0], true);
    let c = sum(&add(&a, &sub(&a, &b)));

    backward(&c, None);

    assert_abs_diff_eq!(a.grad().unwrap()[0], 2.0);
    assert_abs_diff_eq!(b.grad().unwrap()[0], -1.0);
}

#[test]
fn test_shared_subgraph_gradient_counted_once() {
    // y = (2x) * (2x) => dy/dx = 8x
    let x = Tensor::from_vec(vec![1.5], true);
    let h = scale(&x, 2.0);
    let y = mul(&h, &h);

    backward(&y, None);

    assert_abs_diff_eq!(x.grad().unwrap()[0], 12.0, epsilon = 1e-5);
}

#[test]
fn test_repeated_backward_accumulates_on_leaves() {
    let x = Tensor::from_vec(vec![2.0], true);
    let y = mul(&x, &x);

    backward(&y, None);
    backward(&y, None);

    assert_abs_diff_eq!(x.grad().unwrap()[0], 8.0);
}

#[test]
fn test_no_grad_records_nothing() {
    let x = Tensor::from_vec(vec![1.0, 2.0], true);
    let y = no_grad(|| mul(&x, &x));
    assert!(!y.requires_grad());
    assert!(y.is_leaf());
}

#[test]
fn test_mean_and_add_scalar() {
    let x = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
    let m = mean(&add_scalar(&x, 1.0));
    assert_abs_diff_eq!(m.item(), 3.5);

    backward(&m, None);
    for g in x.grad().unwrap().iter() {
        assert_abs_diff_eq!(*g, 0.25);
    }
}

#[test]
fn test_mean_of_averages_elementwise() {
    let a = Tensor::from_vec(vec![1.0, 3.0], true);
    let b = Tensor::from_vec(vec![3.0, 5.0], true);
    let m = mean_of(&[a.clone(), b.clone()]);
    assert_eq!(m.to_vec(), vec![2.0, 4.0]);

    backward(&sum(&m), None);
    assert_eq!(a.grad().unwrap().to_vec(), vec![0.5, 0.5]);
    assert_eq!(b.grad().unwrap().to_vec(), vec![0.5, 0.5]);
}

#[test]
fn test_relu_and_tanh_forward() {
    let x = Tensor::from_vec(vec![-1.0, 0.0, 2.0], false);
    assert_eq!(relu(&x).to_vec(), vec![0.0, 0.0, 2.0]);
    assert_abs_diff_eq!(tanh(&x).data()[2], 2.0f32.tanh());
}

#[test]
fn test_matmul_forward_and_backward() {
    // [1 2; 3 4] @ [5; 6] = [17; 39]
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
    let b = Tensor::from_vec(vec![5.0, 6.0], true);
    let c = matmul(&a, &b, 2, 2, 1);
    assert_eq!(c.to_vec(), vec![17.0, 39.0]);

    backward(&sum(&c), None);
    assert_eq!(a.grad().unwrap().to_vec(), vec![5.0, 6.0, 5.0, 6.0]);
    assert_eq!(b.grad().unwrap().to_vec(), vec![4.0, 6.0]);
}

#[test]
fn test_transposed_roundtrip() {
    let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false);
    let t = transposed(&a, 2, 3);
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(transposed(&t, 3, 2).to_vec(), a.to_vec());
}

#[test]
fn test_add_bias_backward_sums_rows() {
    let x = Tensor::zeros(6, true);
    let bias = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
    let y = add_bias(&x, &bias, 2, 3);
    assert_eq!(y.to_vec(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);

    backward(&sum(&y), None);
    assert_eq!(bias.grad().unwrap().to_vec(), vec![2.0, 2.0, 2.0]);
}

#[test]
fn test_broadcast_rows() {
    let v = Tensor::from_vec(vec![1.0, 2.0], true);
    let tiled = broadcast_rows(&v, 3);
    assert_eq!(tiled.to_vec(), vec![1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);

    backward(&sum(&tiled), None);
    assert_eq!(v.grad().unwrap().to_vec(), vec![3.0, 3.0]);
}

#[test]
fn test_concat_cols_layout_and_split_gradient() {
    let a = Tensor::from_vec(vec![1.0, 2.0], true); // 2x1
    let b = Tensor::from_vec(vec![3.0, 4.0, 5.0, 6.0], true); // 2x2
    let c = concat_cols(&[(&a, 1), (&b, 2)], 2);
    assert_eq!(c.to_vec(), vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);

    let weights = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false);
    backward(&sum(&mul(&c, &weights)), None);
    assert_eq!(a.grad().unwrap().to_vec(), vec![1.0, 4.0]);
    assert_eq!(b.grad().unwrap().to_vec(), vec![2.0, 3.0, 5.0, 6.0]);
}

#[test]
fn test_row_norms_zero_row_has_zero_gradient() {
    let x = Tensor::from_vec(vec![3.0, 4.0, 0.0, 0.0], true);
    let n = row_norms(&x, 2, 2);
    assert_eq!(n.to_vec(), vec![5.0, 0.0]);

    backward(&sum(&n), None);
    let g = x.grad().unwrap();
    assert_abs_diff_eq!(g[0], 0.6);
    assert_abs_diff_eq!(g[1], 0.8);
    assert_eq!(g[2], 0.0);
    assert_eq!(g[3], 0.0);
}
