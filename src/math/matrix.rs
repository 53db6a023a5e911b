use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// Dense row-major matrix of `f64`.
///
/// Layer weights are stored as `(input_size, size)` so that a row-vector
/// input `x` maps to `x · W`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    pub fn zeros_like(other: &Matrix) -> Matrix {
        Matrix::zeros(other.rows, other.cols)
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Matrix {
        assert_eq!(data.len(), rows * cols, "data length does not match {}x{}", rows, cols);
        Matrix { rows, cols, data }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: N(0, sqrt(2 / rows)). `rows` is the fan-in.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (2.0 / rows as f64).sqrt(), rng)
    }

    /// Xavier (Glorot) initialization: N(0, sqrt(1 / rows)).
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal(rows, cols, (1.0 / rows as f64).sqrt(), rng)
    }

    fn normal<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let data = (0..rows * cols)
            .map(|_| Matrix::sample_standard_normal(rng) * std_dev)
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn same_shape(&self, other: &Matrix) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn fill(&mut self, value: f64) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Row vector times matrix: `x · self`, with `x.len() == rows`.
    pub fn left_mul(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.rows, "input length {} does not match {} rows", x.len(), self.rows);
        let mut out = vec![0.0; self.cols];
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for (o, &w) in out.iter_mut().zip(row) {
                *o += xi * w;
            }
        }
        out
    }

    /// Matrix times column vector of transposed shape: `self · v`, with
    /// `v.len() == cols`. Used to push a delta back through `Wᵀ`.
    pub fn mul_transposed(&self, v: &[f64]) -> Vec<f64> {
        assert_eq!(v.len(), self.cols, "vector length {} does not match {} cols", v.len(), self.cols);
        self.data
            .chunks_exact(self.cols)
            .map(|row| row.iter().zip(v).map(|(w, d)| w * d).sum())
            .collect()
    }

    /// Accumulates the outer product `xᵀ · delta` into `self`.
    pub fn add_outer(&mut self, x: &[f64], delta: &[f64]) {
        assert_eq!(x.len(), self.rows);
        assert_eq!(delta.len(), self.cols);
        for (i, &xi) in x.iter().enumerate() {
            if xi == 0.0 {
                continue;
            }
            let row = &mut self.data[i * self.cols..(i + 1) * self.cols];
            for (g, &d) in row.iter_mut().zip(delta) {
                *g += xi * d;
            }
        }
    }

    /// Element-wise `self += other`.
    pub fn add_assign_slice(&mut self, other: &[f64]) {
        assert_eq!(self.data.len(), other.len());
        for (a, b) in self.data.iter_mut().zip(other) {
            *a += b;
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_mul_matches_hand_computation() {
        // [1 2] · [[1 2 3], [4 5 6]] = [9 12 15]
        let w = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(w.left_mul(&[1.0, 2.0]), vec![9.0, 12.0, 15.0]);
    }

    #[test]
    fn mul_transposed_is_w_times_v() {
        let w = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(w.mul_transposed(&[1.0, 0.0, 1.0]), vec![4.0, 10.0]);
    }

    #[test]
    fn add_outer_accumulates() {
        let mut g = Matrix::zeros(2, 2);
        g.add_outer(&[1.0, 2.0], &[3.0, 4.0]);
        g.add_outer(&[1.0, 0.0], &[1.0, 1.0]);
        assert_eq!(g.data, vec![4.0, 5.0, 6.0, 8.0]);
    }
}
