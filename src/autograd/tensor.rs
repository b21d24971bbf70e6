//! Tensor type with gradient tracking

use super::backward::BackwardOp;
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_TENSOR_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed)
}

/// Flat `f32` tensor participating in the autograd graph
///
/// Data is reference counted and copied on write, so a tensor captured by a
/// backward op keeps the values it had at forward time even after an
/// optimizer updates the owning parameter. The gradient cell is shared by
/// all clones: gradients accumulated through the graph land on the
/// parameter owned by the network.
///
/// Shapes are not stored; operations take explicit dimensions.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<Array1<f32>>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
    id: usize,
}

impl Tensor {
    /// Create a tensor from an array
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(data),
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
            id: next_id(),
        }
    }

    /// Create a tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Tensor of zeros
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Tensor of ones
    pub fn ones(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::ones(len), requires_grad)
    }

    /// Single-element constant
    pub fn scalar(value: f32) -> Self {
        Self::from_vec(vec![value], false)
    }

    /// Graph node identity, shared by clones
    pub fn id(&self) -> usize {
        self.id
    }

    /// Borrow the data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable access to the data (copies if a graph still holds the old values)
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        Rc::make_mut(&mut self.data)
    }

    /// Copy the data out
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.to_vec()
    }

    /// First element, for scalar losses
    pub fn item(&self) -> f32 {
        self.data.first().copied().unwrap_or(0.0)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    /// Current accumulated gradient
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing += &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// True for tensors not produced by a recorded operation
    pub fn is_leaf(&self) -> bool {
        self.backward_op.is_none()
    }

    /// Same values, cut from the graph
    pub fn detach(&self) -> Tensor {
        Tensor {
            data: Rc::clone(&self.data),
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad: false,
            id: next_id(),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("id", &self.id)
            .field("len", &self.data.len())
            .field("requires_grad", &self.requires_grad)
            .field("is_leaf", &self.is_leaf())
            .finish()
    }
}
