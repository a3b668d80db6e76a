//! Quantization Parameters
//!
//! Affine mapping between real values and fixed-width integers:
//! `q = clamp(round(x / scale) + zero_point, qmin, qmax)` and
//! `x = scale * (q - zero_point)`.
//!
//! @version 0.1.0
//! @author Tessera Development Team

// =============================================================================
// Quantization Parameters
// =============================================================================

/// Per-tensor affine quantization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizationParams {
    /// Real-valued step between adjacent quantized levels.
    pub scale: f32,
    /// Quantized value representing real zero.
    pub zero_point: i32,
    /// Bit width of the quantized values.
    pub precision: u8,
    /// Whether the quantized range is signed.
    pub signed: bool,
}

impl QuantizationParams {
    /// Smallest representable quantized value.
    pub fn qmin(&self) -> i32 {
        qrange(self.precision, self.signed).0
    }

    /// Largest representable quantized value.
    pub fn qmax(&self) -> i32 {
        qrange(self.precision, self.signed).1
    }

    /// Quantizes one value, rounding half to even and clamping.
    pub fn quantize(&self, value: f32) -> i32 {
        let transformed = self.zero_point as f32 + value / self.scale;
        let rounded = transformed.round_ties_even();
        rounded.clamp(self.qmin() as f32, self.qmax() as f32) as i32
    }

    /// Maps one quantized value back to the real domain.
    pub fn dequantize(&self, value: i32) -> f32 {
        self.scale * (value - self.zero_point) as f32
    }
}

/// Returns `(qmin, qmax)` for a bit width and signedness.
pub fn qrange(precision: u8, signed: bool) -> (i32, i32) {
    debug_assert!((1..=16).contains(&precision));
    if signed {
        (-(1 << (precision - 1)), (1 << (precision - 1)) - 1)
    } else {
        (0, (1 << precision) - 1)
    }
}

// =============================================================================
// Parameter Selection
// =============================================================================

/// Returns the minimum and maximum of `data`, or `(0, 0)` when empty.
pub fn find_min_max(data: &[f32]) -> (f32, f32) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    data.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
        (lo.min(x), hi.max(x))
    })
}

/// Chooses scale and zero point so that `[min, max]` maps onto `[qmin, qmax]`.
///
/// The range is widened to contain zero, and the zero point is nudged to an
/// integer so that real zero is exactly representable. With
/// `preserve_sparsity` a range straddling zero is made symmetric and the zero
/// point sits at the middle of the quantized range.
pub fn choose_quantization_params(
    mut min: f32,
    mut max: f32,
    qmin: i32,
    qmax: i32,
    preserve_sparsity: bool,
) -> (f32, i32) {
    let symmetric = preserve_sparsity && min < 0.0 && max > 0.0;
    if symmetric {
        let symmetric_qmin = -((qmax - qmin) / 2 + 1);
        let symmetric_qmax = (qmax - qmin) / 2;
        let max_scale = (min / symmetric_qmin as f32)
            .abs()
            .max((max / symmetric_qmax as f32).abs());
        min = max_scale * symmetric_qmin as f32;
        max = max_scale * symmetric_qmax as f32;
    }

    min = min.min(0.0);
    max = max.max(0.0);

    let mut scale = (f64::from(max) - f64::from(min)) / (f64::from(qmax) - f64::from(qmin));
    if scale as f32 == 0.0 || !(1.0 / scale as f32).is_finite() {
        scale = 0.1;
    }

    let min = f64::from(min);
    let max = f64::from(max);
    let zero_point_from_min = f64::from(qmin) - min / scale;
    let zero_point_from_max = f64::from(qmax) - max / scale;
    let zero_point_from_min_error = f64::from(qmin).abs() + (min / scale).abs();
    let zero_point_from_max_error = f64::from(qmax).abs() + (max / scale).abs();

    let initial_zero_point = if symmetric {
        f64::from(qmin + qmax) / 2.0
    } else if zero_point_from_min_error < zero_point_from_max_error {
        zero_point_from_min
    } else {
        zero_point_from_max
    };

    let zero_point = if initial_zero_point < f64::from(qmin) {
        qmin
    } else if initial_zero_point > f64::from(qmax) {
        qmax
    } else {
        initial_zero_point.round_ties_even() as i32
    };

    (scale as f32, zero_point)
}

// =============================================================================
// Tests
// =============================================================================
