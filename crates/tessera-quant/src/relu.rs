//! Quantized ReLU
//!
//! Clamps quantized values below at the zero point, which is exactly real
//! zero after dequantization.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use tessera_tensor::Tensor;

use crate::config::QuantConfig;
use crate::error::QuantResult;
use crate::utils::{dequantize_tensor, quantize_tensor};

/// Applies ReLU to `input` in the 8-bit quantized domain.
pub fn quantized_relu(input: &Tensor<f32>) -> QuantResult<Tensor<f32>> {
    quantized_relu_with_config(input, &QuantConfig::default())
}

/// [`quantized_relu`] with explicit quantization settings.
pub fn quantized_relu_with_config(input: &Tensor<f32>, config: &QuantConfig) -> QuantResult<Tensor<f32>> {
    let (quantized, params) = quantize_tensor(input, config)?;
    let floor = params.zero_point.clamp(0, i32::from(u8::MAX)) as u8;
    let rectified = quantized.map(|q| q.max(floor));
    Ok(dequantize_tensor(&rectified, &params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_zeroes_negatives() {
        let input = Tensor::from_vec(vec![-2.0, -0.5, 0.0, 1.0, 2.0], &[5]).unwrap();
        let output = quantized_relu(&input).unwrap().to_vec();

        assert_eq!(&output[..3], &[0.0, 0.0, 0.0]);
        assert!((output[3] - 1.0).abs() <= 4.0 / 255.0);
        assert!((output[4] - 2.0).abs() <= 4.0 / 255.0);
    }

    #[test]
    fn test_relu_positive_input_unchanged() {
        let input = Tensor::from_vec(vec![0.0, 5.0, 10.0], &[3]).unwrap();
        let output = quantized_relu(&input).unwrap();
        assert_eq!(output.shape(), &[3]);
        assert!((output.to_vec()[2] - 10.0).abs() < 1e-5);
    }
}
