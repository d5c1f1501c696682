//! Structure-of-Arrays gradient/hessian output buffer.
//!
//! Gradients and hessians live in separate contiguous arrays using
//! **column-major** (output-major) order, so `output_grads(k)` is a zero-copy
//! contiguous slice of all samples' gradients for output `k` - the layout
//! the histogram-building side of a boosting engine wants to consume.
//!
//! ```text
//! grads: [s0_o0, s1_o0, ..., sN_o0, s0_o1, s1_o1, ..., sN_o1, ...]
//! hess:  [s0_o0, s1_o0, ..., sN_o0, s0_o1, s1_o1, ..., sN_o1, ...]
//!        |---- output 0 ----|      |---- output 1 ----|
//! ```
//!
//! Index formula: `grads[output * n_rows + row]`. The hessian side exists
//! only when the objective defines one.

/// Gradient (and optional hessian) output for one evaluated batch.
#[derive(Debug, Clone)]
pub struct Gradients {
    grads: Vec<f32>,
    hess: Option<Vec<f32>>,
    n_rows: usize,
    n_outputs: usize,
}

impl Gradients {
    /// Create a zeroed buffer for `n_rows` samples and `n_outputs` outputs.
    ///
    /// # Panics
    /// Panics if `n_rows` or `n_outputs` is zero.
    pub fn new(n_rows: usize, n_outputs: usize, with_hessian: bool) -> Self {
        assert!(n_rows > 0, "n_rows must be positive");
        assert!(n_outputs > 0, "n_outputs must be positive");

        let size = n_rows * n_outputs;
        Self {
            grads: vec![0.0; size],
            hess: with_hessian.then(|| vec![0.0; size]),
            n_rows,
            n_outputs,
        }
    }

    /// Number of samples.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Outputs per sample.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// All gradients, column-major `[n_outputs * n_rows]`.
    #[inline]
    pub fn grads(&self) -> &[f32] {
        &self.grads
    }

    /// All hessians, or `None` when the objective defines none.
    #[inline]
    pub fn hess(&self) -> Option<&[f32]> {
        self.hess.as_deref()
    }

    /// Contiguous gradient slice for one output column.
    #[inline]
    pub fn output_grads(&self, output: usize) -> &[f32] {
        let start = output * self.n_rows;
        &self.grads[start..start + self.n_rows]
    }

    /// Contiguous hessian slice for one output column, if present.
    #[inline]
    pub fn output_hess(&self, output: usize) -> Option<&[f32]> {
        let start = output * self.n_rows;
        self.hess.as_deref().map(|h| &h[start..start + self.n_rows])
    }

    /// Gradient and hessian for one (row, output) cell.
    #[inline]
    pub fn get(&self, row: usize, output: usize) -> (f32, Option<f32>) {
        let idx = output * self.n_rows + row;
        (self.grads[idx], self.hess.as_deref().map(|h| h[idx]))
    }

    /// Mutable views over both sides, for filling.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut [f32], Option<&mut [f32]>) {
        (&mut self.grads, self.hess.as_deref_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_slicing() {
        let mut buf = Gradients::new(3, 2, true);
        let (grads, hess) = buf.split_mut();
        grads.copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        hess.unwrap().fill(0.5);

        assert_eq!(buf.output_grads(0), &[1.0, 2.0, 3.0]);
        assert_eq!(buf.output_grads(1), &[4.0, 5.0, 6.0]);
        assert_eq!(buf.get(2, 1), (6.0, Some(0.5)));
    }

    #[test]
    fn hessian_side_can_be_absent() {
        let buf = Gradients::new(4, 1, false);
        assert!(buf.hess().is_none());
        assert!(buf.output_hess(0).is_none());
        assert_eq!(buf.get(0, 0), (0.0, None));
    }

    #[test]
    #[should_panic(expected = "n_rows must be positive")]
    fn zero_rows_rejected() {
        let _ = Gradients::new(0, 1, true);
    }
}
