//! Gaussian splat rasterizer

use super::Renderer;
use crate::autograd::{tracks, BackwardOp};
use crate::data::LayoutShape;
use crate::Tensor;
use ndarray::Array1;
use std::rc::Rc;

/// Draws every real node and every edge midpoint as an isotropic Gaussian
///
/// Pixel intensity is `1 - exp(-Σ w_k exp(-|p - c_k|² / 2σ²))`, which stays in
/// [0, 1) and is differentiable w.r.t. the node coordinates. The image covers
/// the square `[-extent, extent]²`.
#[derive(Debug, Clone)]
pub struct SplatRenderer {
    image_size: usize,
    sigma: f32,
    extent: f32,
    edge_weight: f32,
}

impl SplatRenderer {
    pub fn new(image_size: usize, sigma: f32, extent: f32) -> Self {
        Self {
            image_size,
            sigma,
            extent,
            edge_weight: 0.5,
        }
    }

    fn pixel_center(&self, index: usize) -> f32 {
        let step = 2.0 * self.extent / self.image_size as f32;
        -self.extent + (index as f32 + 0.5) * step
    }
}

/// A splat center and the nodes it is averaged from
struct Splat {
    nodes: [usize; 2],
    weight: f32,
}

impl Splat {
    fn between(a: usize, b: usize, weight: f32) -> Self {
        Self {
            nodes: [a, b],
            weight,
        }
    }
}

fn splats(
    adjacency: &[f32],
    b: usize,
    count: usize,
    shape: LayoutShape,
    edge_weight: f32,
) -> Vec<Splat> {
    let n = shape.max_nodes;
    let base = b * shape.adjacency_stride();
    let mut out: Vec<Splat> = (0..count).map(|i| Splat::between(i, i, 1.0)).collect();
    for i in 0..count {
        for j in i + 1..count {
            if adjacency[base + i * n + j] != 0.0 || adjacency[base + j * n + i] != 0.0 {
                out.push(Splat::between(i, j, edge_weight));
            }
        }
    }
    out
}

fn center(layouts: &[f32], b: usize, splat: &Splat, shape: LayoutShape) -> (f32, f32) {
    let at = |node: usize| b * shape.layout_stride() + node * shape.coord_dim;
    let (u, v) = (at(splat.nodes[0]), at(splat.nodes[1]));
    (
        0.5 * (layouts[u] + layouts[v]),
        0.5 * (layouts[u + 1] + layouts[v + 1]),
    )
}

impl Renderer for SplatRenderer {
    fn image_size(&self) -> usize {
        self.image_size
    }

    fn render(
        &self,
        layouts: &Tensor,
        adjacency: &Tensor,
        num_nodes: &[usize],
        shape: LayoutShape,
    ) -> Tensor {
        assert_eq!(layouts.len(), shape.layout_len(), "render: layout shape");
        assert_eq!(
            adjacency.len(),
            shape.adjacency_len(),
            "render: adjacency shape"
        );
        let coords = layouts.to_vec();
        let adj = adjacency.to_vec();
        let s = self.image_size;
        let inv_two_var = 1.0 / (2.0 * self.sigma * self.sigma);

        let mut image = Array1::zeros(shape.batch_size * s * s);
        for (b, &count) in num_nodes.iter().enumerate().take(shape.batch_size) {
            let centers: Vec<(f32, (f32, f32))> = splats(&adj, b, count, shape, self.edge_weight)
                .iter()
                .map(|sp| (sp.weight, center(&coords, b, sp, shape)))
                .collect();
            for row in 0..s {
                let py = self.pixel_center(row);
                for col in 0..s {
                    let px = self.pixel_center(col);
                    let density: f32 = centers
                        .iter()
                        .map(|(w, (cx, cy))| {
                            let d2 = (px - cx).powi(2) + (py - cy).powi(2);
                            w * (-d2 * inv_two_var).exp()
                        })
                        .sum();
                    image[b * s * s + row * s + col] = 1.0 - (-density).exp();
                }
            }
        }

        let requires_grad = tracks(&[layouts]);
        let mut result = Tensor::new(image.clone(), requires_grad);
        if requires_grad {
            result.set_backward_op(Rc::new(RenderBackward {
                inputs: [layouts.clone()],
                renderer: self.clone(),
                adjacency: adj,
                num_nodes: num_nodes.to_vec(),
                shape,
                image,
            }));
        }
        result
    }
}

struct RenderBackward {
    inputs: [Tensor; 1],
    renderer: SplatRenderer,
    adjacency: Vec<f32>,
    num_nodes: Vec<usize>,
    shape: LayoutShape,
    image: Array1<f32>,
}

impl BackwardOp for RenderBackward {
    fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    fn backward(&self, grad: &Array1<f32>) -> Vec<Option<Array1<f32>>> {
        let r = &self.renderer;
        let shape = self.shape;
        let s = r.image_size;
        let var = r.sigma * r.sigma;
        let coords = self.inputs[0].to_vec();
        let mut grad_layout = Array1::zeros(shape.layout_len());

        for (b, &count) in self.num_nodes.iter().enumerate().take(shape.batch_size) {
            let splats = splats(&self.adjacency, b, count, shape, r.edge_weight);
            let centers: Vec<(f32, f32)> = splats
                .iter()
                .map(|sp| center(&coords, b, sp, shape))
                .collect();
            for row in 0..s {
                let py = r.pixel_center(row);
                for col in 0..s {
                    let px = r.pixel_center(col);
                    let pixel = b * s * s + row * s + col;
                    // dI/dΣ = exp(-Σ) = 1 - I
                    let upstream = grad[pixel] * (1.0 - self.image[pixel]);
                    if upstream == 0.0 {
                        continue;
                    }
                    for (sp, &(cx, cy)) in splats.iter().zip(&centers) {
                        let d2 = (px - cx).powi(2) + (py - cy).powi(2);
                        let e = sp.weight * (-d2 / (2.0 * var)).exp();
                        // each center is the mean of its two node slots
                        let gx = upstream * e * (px - cx) / var * 0.5;
                        let gy = upstream * e * (py - cy) / var * 0.5;
                        for &node in &sp.nodes {
                            let at = b * shape.layout_stride() + node * shape.coord_dim;
                            grad_layout[at] += gx;
                            grad_layout[at + 1] += gy;
                        }
                    }
                }
            }
        }
        vec![Some(grad_layout)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, mul, sum};
    use approx::assert_abs_diff_eq;

    fn two_node_graph() -> (Vec<f32>, Vec<f32>, LayoutShape) {
        let shape = LayoutShape::new(1, 3);
        let layouts = vec![0.3, -0.2, -0.4, 0.5, 0.0, 0.0];
        let mut adjacency = vec![0.0; 9];
        adjacency[1] = 1.0;
        adjacency[3] = 1.0;
        (layouts, adjacency, shape)
    }

    #[test]
    fn test_render_range_and_empty_graph() {
        let renderer = SplatRenderer::new(8, 0.2, 1.0);
        let (layouts, adjacency, shape) = two_node_graph();
        let image = renderer.render(
            &Tensor::from_vec(layouts, false),
            &Tensor::from_vec(adjacency.clone(), false),
            &[2],
            shape,
        );
        assert_eq!(image.len(), 64);
        assert!(image.data().iter().all(|&p| (0.0..1.0).contains(&p)));
        assert!(image.data().iter().any(|&p| p > 0.1));

        let blank = renderer.render(
            &Tensor::zeros(6, false),
            &Tensor::zeros(9, false),
            &[0],
            shape,
        );
        assert!(blank.data().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_render_gradient_matches_finite_difference() {
        let renderer = SplatRenderer::new(6, 0.3, 1.0);
        let (layouts, adjacency, shape) = two_node_graph();
        let adj = Tensor::from_vec(adjacency, false);
        let weights: Vec<f32> = (0..36).map(|i| ((i as f32) * 0.7).cos()).collect();
        let w = Tensor::from_vec(weights, false);

        let x = Tensor::from_vec(layouts.clone(), true);
        let image = renderer.render(&x, &adj, &[2], shape);
        backward(&sum(&mul(&image, &w)), None);
        let analytic = x.grad().unwrap();

        let f = |coords: &[f32]| -> f32 {
            let moved = Tensor::from_vec(coords.to_vec(), false);
            let image = renderer.render(&moved, &adj, &[2], shape);
            (image.data() * w.data()).sum()
        };
        let eps = 1e-3;
        for i in 0..4 {
            let mut plus = layouts.clone();
            let mut minus = layouts.clone();
            plus[i] += eps;
            minus[i] -= eps;
            let numeric = (f(&plus) - f(&minus)) / (2.0 * eps);
            assert_abs_diff_eq!(analytic[i], numeric, epsilon = 2e-2);
        }
        // padded node receives nothing
        assert_eq!(analytic[4], 0.0);
        assert_eq!(analytic[5], 0.0);
    }

    #[test]
    fn test_snapshot_produces_gray_image() {
        let renderer = SplatRenderer::new(8, 0.2, 1.0);
        let (layouts, adjacency, shape) = two_node_graph();
        let img = renderer
            .snapshot(
                &Tensor::from_vec(layouts, false),
                &Tensor::from_vec(adjacency, false),
                &[2],
                shape,
                0,
            )
            .unwrap();
        assert_eq!(img.dimensions(), (8, 8));
        assert!(renderer
            .snapshot(
                &Tensor::zeros(6, false),
                &Tensor::zeros(9, false),
                &[0],
                shape,
                1,
            )
            .is_err());
    }
}
