//! Gaussian convolution kernel construction.
//!
//! The kernel is separable: the square kernel is the outer product of
//! a 1-D Gaussian with itself. [`crate::blur`] exploits this by running
//! the 1-D factor horizontally and then vertically.

/// A normalized, square, separable Gaussian kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    half_width: u32,
    factor: Vec<f64>,
}

impl Kernel {
    /// Build the Gaussian kernel of side `2 * half_width + 1`.
    ///
    /// `sigma = half_width / 3`, so the kernel spans three standard
    /// deviations on each side. `half_width = 0` is the 1x1 identity.
    #[must_use]
    pub fn gaussian(half_width: u32) -> Self {
        Self {
            half_width,
            factor: gaussian_kernel_1d(half_width),
        }
    }

    /// Distance from the center tap to either edge.
    #[must_use]
    pub const fn half_width(&self) -> u32 {
        self.half_width
    }

    /// Side length of the square kernel.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.factor.len()
    }

    /// The normalized 1-D factor. Sums to 1.
    #[must_use]
    pub fn factor(&self) -> &[f64] {
        &self.factor
    }

    /// Weight at `(row, col)` of the square kernel.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not less than [`side`](Self::side).
    #[must_use]
    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.factor[row] * self.factor[col]
    }

    /// The full square kernel, row-major.
    #[must_use]
    pub fn to_matrix(&self) -> Vec<f64> {
        self.factor
            .iter()
            .flat_map(|&r| self.factor.iter().map(move |&c| r * c))
            .collect()
    }
}

/// The normalized 1-D Gaussian of length `2 * half_width + 1`, sampled at
/// integer offsets `-half_width..=half_width` with `sigma = half_width / 3`.
#[must_use]
pub fn gaussian_kernel_1d(half_width: u32) -> Vec<f64> {
    if half_width == 0 {
        return vec![1.0];
    }

    let center = f64::from(half_width);
    let sigma = center / 3.0;
    let two_sigma_sq = 2.0 * sigma * sigma;

    let raw: Vec<f64> = (0..=2 * half_width)
        .map(|i| {
            let offset = f64::from(i) - center;
            (-(offset * offset) / two_sigma_sq).exp()
        })
        .collect();

    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}
