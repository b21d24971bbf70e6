//! Reverse-mode execution of the recorded graph

use super::context::is_grad_enabled;
use super::Tensor;
use ndarray::Array1;
use std::collections::{HashMap, HashSet};

/// Backward rule of a recorded operation
///
/// `backward` receives the gradient of the operation's output and returns
/// one optional gradient per entry of `inputs`, in the same order.
pub trait BackwardOp {
    /// Tensors this operation read during the forward pass
    fn inputs(&self) -> &[Tensor];

    /// Gradients w.r.t. each input
    fn backward(&self, grad_output: &Array1<f32>) -> Vec<Option<Array1<f32>>>;
}

/// Whether an op reading `inputs` should record itself
pub(crate) fn tracks(inputs: &[&Tensor]) -> bool {
    is_grad_enabled() && inputs.iter().any(|t| t.requires_grad())
}

/// Perform a backward pass from `tensor`
///
/// Gradients are seeded with `grad_output` (ones when `None`) and flow in
/// reverse topological order, so every node forwards its complete gradient
/// exactly once. Only leaves requiring grad accumulate into their gradient
/// cell; intermediate gradients live for the duration of the pass. The
/// graph itself is not consumed and may be traversed again by a later pass.
pub fn backward(tensor: &Tensor, grad_output: Option<Array1<f32>>) {
    if !tensor.requires_grad() {
        return;
    }
    let seed = grad_output.unwrap_or_else(|| Array1::ones(tensor.len()));
    assert_eq!(
        seed.len(),
        tensor.len(),
        "seed gradient must match tensor length"
    );

    let order = topological_order(tensor);
    let mut grads: HashMap<usize, Array1<f32>> = HashMap::new();
    grads.insert(tensor.id(), seed);

    for node in order.iter().rev() {
        let Some(grad) = grads.remove(&node.id()) else {
            continue;
        };
        match node.backward_op() {
            Some(op) => {
                let input_grads = op.backward(&grad);
                for (input, input_grad) in op.inputs().iter().zip(input_grads) {
                    let Some(g) = input_grad else { continue };
                    if !input.requires_grad() {
                        continue;
                    }
                    match grads.get_mut(&input.id()) {
                        Some(acc) => *acc += &g,
                        None => {
                            grads.insert(input.id(), g);
                        }
                    }
                }
            }
            None => node.accumulate_grad(grad),
        }
    }
}

/// Post-order DFS over nodes that require grad
fn topological_order(root: &Tensor) -> Vec<Tensor> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        let op = node.backward_op();
        stack.push((node, true));
        if let Some(op) = op {
            for input in op.inputs() {
                if input.requires_grad() && !visited.contains(&input.id()) {
                    stack.push((input.clone(), false));
                }
            }
        }
    }

    order
}
