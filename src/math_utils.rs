// src/math_utils.rs
use ndarray::{Array1, ArrayView1, Zip};

/// `max(x, y)` that returns NaN if either side is NaN.
///
/// `f64::max` would hand back the other operand and hide a broken node.
pub fn nan_max(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        f64::NAN
    } else {
        x.max(y)
    }
}

/// `min(x, y)` that returns NaN if either side is NaN.
pub fn nan_min(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() {
        f64::NAN
    } else {
        x.min(y)
    }
}

/// Elementwise `max(a, b)`, consuming `a`.
pub fn maximum(mut a: Array1<f64>, b: ArrayView1<'_, f64>) -> Array1<f64> {
    Zip::from(&mut a).and(&b).for_each(|x, &y| *x = nan_max(*x, y));
    a
}

/// Elementwise `max(a, c)` against a scalar.
pub fn floor_at(a: ArrayView1<'_, f64>, c: f64) -> Array1<f64> {
    a.mapv(|x| nan_max(x, c))
}

/// Elementwise `min(a, c)` against a scalar.
pub fn cap_at(a: ArrayView1<'_, f64>, c: f64) -> Array1<f64> {
    a.mapv(|x| nan_min(x, c))
}

/// Array shaped like `s`, every node set to `value`.
pub fn filled_like(s: ArrayView1<'_, f64>, value: f64) -> Array1<f64> {
    Array1::from_elem(s.len(), value)
}

/// Indices of the nodes satisfying `keep`.
pub fn select_nodes(s: ArrayView1<'_, f64>, keep: impl Fn(f64) -> bool) -> Vec<usize> {
    s.iter()
        .enumerate()
        .filter(|&(_, &x)| keep(x))
        .map(|(i, _)| i)
        .collect()
}

/// Write `sub[j]` into `out[idx[j]]`.
pub fn scatter(out: &mut Array1<f64>, idx: &[usize], sub: ArrayView1<'_, f64>) {
    assert_eq!(idx.len(), sub.len(), "subset result does not match the subset size");
    for (&i, &x) in idx.iter().zip(sub.iter()) {
        out[i] = x;
    }
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
