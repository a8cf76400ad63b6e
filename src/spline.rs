// Natural cubic spline fitting and evaluation
//
// One spline per actuator is the canonical command -> deflection law: it
// passes exactly through every calibration sample and has zero second
// derivative at both endpoints ("natural" boundary conditions), which keeps
// the fit stable at the edges of the measured command range.

/// Natural cubic spline through a set of sample points
///
/// The spline interpolates exactly through the given (x, y) samples with C2
/// continuity. The second-derivative formulation is used: construction solves
/// the tridiagonal system for the curvature at each knot (Thomas algorithm,
/// O(n)), and evaluation reconstructs the cubic on the containing segment.
///
/// Construction requires x strictly ascending with at least two samples;
/// both are guaranteed by dataset validation before any spline is fitted.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative of the spline at each knot (endpoints are zero)
    m: Vec<f64>,
}

impl NaturalCubicSpline {
    /// Fit a natural cubic spline through the given samples
    ///
    /// # Arguments
    /// * `x` - Abscissae, strictly ascending, at least 2 entries
    /// * `y` - Ordinates, same length as `x`
    ///
    /// # Panics
    /// If the lengths differ, fewer than 2 samples are given, or `x` is not
    /// strictly ascending. Callers validate the dataset first, so these are
    /// internal invariant violations rather than expected failures.
    pub fn fit(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have the same length");
        assert!(x.len() >= 2, "need at least 2 samples to fit a spline");
        assert!(
            x.windows(2).all(|w| w[0] < w[1]),
            "x must be strictly ascending"
        );

        let m = solve_curvatures(&x, &y);
        Self { x, y, m }
    }

    /// Evaluate the spline at `v`
    ///
    /// Values outside the fitted range return the boundary ordinate; the
    /// engine clamps commands to the calibrated range before evaluating, so
    /// this branch only defends against floating-point edge effects.
    pub fn evaluate(&self, v: f64) -> f64 {
        let n = self.x.len();
        if v <= self.x[0] {
            return self.y[0];
        }
        if v >= self.x[n - 1] {
            return self.y[n - 1];
        }

        // Index of the segment [x[i], x[i+1]] containing v
        let i = self.x.partition_point(|&xi| xi <= v) - 1;
        let h = self.x[i + 1] - self.x[i];
        let t = v - self.x[i];

        let slope = (self.y[i + 1] - self.y[i]) / h;
        let b = slope - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        let c = self.m[i] / 2.0;
        let d = (self.m[i + 1] - self.m[i]) / (6.0 * h);

        self.y[i] + t * (b + t * (c + t * d))
    }

    /// First abscissa of the fitted range
    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    /// Last abscissa of the fitted range
    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }
}

/// Solve for the knot curvatures of a natural cubic spline
///
/// Tridiagonal system with natural boundary conditions (zero curvature at
/// both endpoints), solved by forward elimination and back substitution.
fn solve_curvatures(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n == 2 {
        // Two samples degenerate to a straight line
        return m;
    }

    // Interior equations:
    //   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1] = rhs[i]
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        let h_lo = x[i] - x[i - 1];
        let h_hi = x[i + 1] - x[i];
        diag[i] = 2.0 * (h_lo + h_hi);
        rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h_hi - (y[i] - y[i - 1]) / h_lo);
    }

    // Forward elimination (natural BCs pin m[0] = m[n-1] = 0)
    for i in 2..n - 1 {
        let h_lo = x[i] - x[i - 1];
        let factor = h_lo / diag[i - 1];
        diag[i] -= factor * h_lo;
        rhs[i] -= factor * rhs[i - 1];
    }

    // Back substitution
    for i in (1..n - 1).rev() {
        let h_hi = x[i + 1] - x[i];
        let upper = if i + 1 < n - 1 { m[i + 1] } else { 0.0 };
        m[i] = (rhs[i] - h_hi * upper) / diag[i];
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_samples() {
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let y = vec![0.0, 1.0, 4.0, 9.0];
        let spline = NaturalCubicSpline::fit(x.clone(), y.clone());

        for i in 0..x.len() {
            assert!((spline.evaluate(x[i]) - y[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_two_point_spline_is_linear() {
        let spline = NaturalCubicSpline::fit(vec![0.0, 10.0], vec![5.0, 15.0]);

        assert!((spline.evaluate(5.0) - 10.0).abs() < 1e-12);
        assert!((spline.evaluate(2.5) - 7.5).abs() < 1e-12);
        assert!((spline.evaluate(7.5) - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_data() {
        let spline = NaturalCubicSpline::fit(vec![0.0, 1.0, 2.0, 3.0], vec![5.0, 5.0, 5.0, 5.0]);

        assert!((spline.evaluate(0.5) - 5.0).abs() < 1e-12);
        assert!((spline.evaluate(1.5) - 5.0).abs() < 1e-12);
        assert!((spline.evaluate(2.5) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_law_interpolation() {
        // Dense sampling of y = x^2 should interpolate tightly in between
        let x: Vec<f64> = (0..11).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let spline = NaturalCubicSpline::fit(x, y);

        let v = 0.55;
        assert!((spline.evaluate(v) - v * v).abs() < 1e-4);
    }

    #[test]
    fn test_natural_boundary_conditions() {
        // Second derivative at the ends must vanish: near the endpoints the
        // spline should look locally linear
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![0.0, 1.0, 0.0, -1.0, 0.0];
        let spline = NaturalCubicSpline::fit(x, y);

        let eps = 1e-4;
        let second_diff =
            spline.evaluate(eps) - 2.0 * spline.evaluate(2.0 * eps) + spline.evaluate(3.0 * eps);
        assert!(second_diff.abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_clamps_to_boundary() {
        let spline = NaturalCubicSpline::fit(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 5.0]);

        assert!((spline.evaluate(-1.0) - 1.0).abs() < 1e-12);
        assert!((spline.evaluate(10.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_continuity_across_knots() {
        let x = vec![0.0, 1.0, 3.0, 6.0, 10.0];
        let y = vec![0.0, 1.0, 9.0, 36.0, 100.0];
        let spline = NaturalCubicSpline::fit(x, y);

        let below = spline.evaluate(3.0 - 1e-9);
        let above = spline.evaluate(3.0 + 1e-9);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn test_unsorted_x_panics() {
        NaturalCubicSpline::fit(vec![0.0, 2.0, 1.0], vec![0.0, 4.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "at least 2 samples")]
    fn test_single_point_panics() {
        NaturalCubicSpline::fit(vec![1.0], vec![1.0]);
    }

    #[test]
    fn test_range_accessors() {
        let spline = NaturalCubicSpline::fit(vec![-1.5, 0.0, 2.5], vec![1.0, 0.0, 1.0]);
        assert_eq!(spline.x_min(), -1.5);
        assert_eq!(spline.x_max(), 2.5);
    }
}
