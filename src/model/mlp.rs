//! Minimal fully connected network trained with plain SGD.
//!
//! Deliberately small: f32 weight vectors, ReLU hidden layers, softmax
//! cross-entropy output, per-sample updates in a seeded shuffle order. All
//! state is serializable so trained models round-trip through JSON artifacts.

use rand::seq::SliceRandom;
use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// One dense layer, weights stored row-major (`out_dim * in_dim`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    in_dim: usize,
    out_dim: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl Layer {
    /// Xavier-uniform initialized layer.
    fn new(in_dim: usize, out_dim: usize, rng: &mut StdRng) -> Self {
        let limit = (6.0 / (in_dim + out_dim) as f32).sqrt();
        let weights = (0..in_dim * out_dim)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        Self {
            in_dim,
            out_dim,
            weights,
            biases: vec![0.0; out_dim],
        }
    }

    /// Affine forward pass: `z = W x + b`.
    fn forward(&self, x: &[f32]) -> Vec<f32> {
        debug_assert_eq!(x.len(), self.in_dim);
        let mut z = self.biases.clone();
        for o in 0..self.out_dim {
            let row = &self.weights[o * self.in_dim..(o + 1) * self.in_dim];
            let mut acc = 0.0;
            for (w, xi) in row.iter().zip(x) {
                acc += w * xi;
            }
            z[o] += acc;
        }
        z
    }
}

/// A small multi-layer perceptron classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// Builds a network with the given layer sizes, e.g. `&[4, 16, 5]` for
    /// 4 inputs, one hidden layer of 16, and 5 output classes.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two dimensions are given or any dimension is zero.
    pub fn new(dims: &[usize], rng: &mut StdRng) -> Self {
        assert!(dims.len() >= 2, "need at least input and output dimensions");
        assert!(dims.iter().all(|&d| d > 0));
        let layers = dims
            .windows(2)
            .map(|w| Layer::new(w[0], w[1], rng))
            .collect();
        Self { layers }
    }

    /// Input dimension.
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim
    }

    /// Number of output classes.
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim
    }

    /// Raw logits for one input.
    pub fn forward(&self, x: &[f32]) -> Vec<f32> {
        let mut a = x.to_vec();
        let last = self.layers.len() - 1;
        for (l, layer) in self.layers.iter().enumerate() {
            a = layer.forward(&a);
            if l < last {
                for v in &mut a {
                    *v = v.max(0.0); // ReLU
                }
            }
        }
        a
    }

    /// Class probabilities for one input.
    pub fn probabilities(&self, x: &[f32]) -> Vec<f32> {
        softmax(&self.forward(x))
    }

    /// Most likely class for one input.
    pub fn predict(&self, x: &[f32]) -> usize {
        argmax(&self.forward(x))
    }

    /// All activations from input to logits, for backpropagation.
    fn forward_cached(&self, x: &[f32]) -> Vec<Vec<f32>> {
        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(x.to_vec());
        let last = self.layers.len() - 1;
        for (l, layer) in self.layers.iter().enumerate() {
            let mut a = layer.forward(acts.last().map_or(x, Vec::as_slice));
            if l < last {
                for v in &mut a {
                    *v = v.max(0.0);
                }
            }
            acts.push(a);
        }
        acts
    }

    /// One SGD update for a single sample; returns its cross-entropy loss.
    fn update(&mut self, x: &[f32], target: usize, lr: f32) -> f32 {
        let acts = self.forward_cached(x);
        let probs = softmax(&acts[self.layers.len()]);
        let loss = -probs[target].max(1e-9).ln();

        // Output gradient of softmax cross-entropy: p - onehot(target).
        let mut delta = probs;
        delta[target] -= 1.0;

        for l in (0..self.layers.len()).rev() {
            let input_act = &acts[l];

            // Gradient w.r.t. this layer's input, using pre-update weights.
            let delta_prev = if l > 0 {
                let layer = &self.layers[l];
                let mut prev = vec![0.0; layer.in_dim];
                for o in 0..layer.out_dim {
                    let row = &layer.weights[o * layer.in_dim..(o + 1) * layer.in_dim];
                    for (p, w) in prev.iter_mut().zip(row) {
                        *p += w * delta[o];
                    }
                }
                // ReLU derivative on the previous post-activation.
                for (p, a) in prev.iter_mut().zip(input_act) {
                    if *a <= 0.0 {
                        *p = 0.0;
                    }
                }
                Some(prev)
            } else {
                None
            };

            let layer = &mut self.layers[l];
            for o in 0..layer.out_dim {
                let row = &mut layer.weights[o * layer.in_dim..(o + 1) * layer.in_dim];
                for (w, xi) in row.iter_mut().zip(input_act) {
                    *w -= lr * delta[o] * xi;
                }
                layer.biases[o] -= lr * delta[o];
            }

            match delta_prev {
                Some(prev) => delta = prev,
                None => break,
            }
        }

        loss
    }

    /// Trains for `epochs` passes over the data, shuffling the sample order
    /// with `rng` each epoch. Returns the mean loss per epoch.
    ///
    /// # Panics
    ///
    /// Panics if inputs and targets differ in length.
    pub fn train(
        &mut self,
        inputs: &[Vec<f32>],
        targets: &[usize],
        epochs: usize,
        lr: f32,
        rng: &mut StdRng,
    ) -> Vec<f32> {
        assert_eq!(inputs.len(), targets.len());
        if inputs.is_empty() {
            return vec![0.0; epochs];
        }

        let mut order: Vec<usize> = (0..inputs.len()).collect();
        let mut losses = Vec::with_capacity(epochs);
        for _ in 0..epochs {
            order.shuffle(rng);
            let mut total = 0.0;
            for &i in &order {
                total += self.update(&inputs[i], targets[i], lr);
            }
            losses.push(total / inputs.len() as f32);
        }
        losses
    }

    /// Mean cross-entropy loss over a dataset without updating weights.
    pub fn mean_loss(&self, inputs: &[Vec<f32>], targets: &[usize]) -> f32 {
        if inputs.is_empty() {
            return 0.0;
        }
        let total: f32 = inputs
            .iter()
            .zip(targets)
            .map(|(x, &t)| -self.probabilities(x)[t].max(1e-9).ln())
            .sum();
        total / inputs.len() as f32
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one on ties.
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
