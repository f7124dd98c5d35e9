//! Offset quantization

/// Snap `value` to the nearest multiple of `grid`.
///
/// A grid of 0 or less disables quantization. Exact half-grid ties round away from zero
/// (`f64::round`), which for non-negative offsets means rounding up.
///
/// # Examples
/// ```
/// use chord_roman::analysis::quantize;
///
/// assert_eq!(quantize(1.1, 0.25), 1.0);
/// assert_eq!(quantize(1.125, 0.25), 1.25);
/// assert_eq!(quantize(1.1, 0.0), 1.1);
/// ```
pub fn quantize(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_grid_is_identity() {
        for v in [0.0, 0.1, 1.37, 12.999, 1e6] {
            assert_eq!(quantize(v, 0.0), v);
            assert_eq!(quantize(v, -0.5), v);
        }
    }

    #[test]
    fn test_result_is_grid_multiple() {
        for grid in [0.25, 0.5, 1.0, 1.0 / 3.0] {
            for v in [0.0, 0.13, 0.26, 0.74, 3.333, 7.9] {
                let q = quantize(v, grid);
                let steps = q / grid;
                assert!((steps - steps.round()).abs() < 1e-9, "{} on {} gave {}", v, grid, q);
                assert!((q - v).abs() <= grid / 2.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_half_grid_rounds_up() {
        assert_eq!(quantize(0.125, 0.25), 0.25);
        assert_eq!(quantize(0.375, 0.25), 0.5);
        assert_eq!(quantize(0.25, 0.5), 0.5);
    }

    #[test]
    fn test_order_is_preserved() {
        let offsets = [0.0, 0.1, 0.12, 0.2, 0.49, 0.51, 1.0];
        let quantized: Vec<f64> = offsets.iter().map(|v| quantize(*v, 0.25)).collect();
        assert!(quantized.windows(2).all(|w| w[0] <= w[1]));
    }
}
