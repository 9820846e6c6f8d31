use image::{ImageBuffer, Luma};
use ndarray::{Array2, Zip};

/// Per-cell gamma values of one evaluation.
///
/// Undefined cells (zero planned dose) hold `0.0` in [`values`](Self::values)
/// and `false` in [`defined`](Self::defined); use [`get`](Self::get) to
/// tell them apart from a perfect match.
#[derive(Clone, Debug, PartialEq)]
pub struct GammaField {
    values: Array2<f64>,
    defined: Array2<bool>,
}

impl GammaField {
    pub(crate) fn from_cells(cells: &Array2<Option<f64>>) -> Self {
        Self {
            values: cells.mapv(|cell| cell.unwrap_or(0.0)),
            defined: cells.mapv(|cell| cell.is_some()),
        }
    }

    /// Get the dimensions of the field (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn defined(&self) -> &Array2<bool> {
        &self.defined
    }

    /// Gamma at column `x`, row `y`; `None` if undefined or out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        match self.defined.get([y, x]) {
            Some(true) => self.values.get([y, x]).copied(),
            _ => None,
        }
    }

    pub fn defined_count(&self) -> usize {
        self.defined.iter().filter(|&&d| d).count()
    }

    /// Iterate over the defined gamma values in row-major order.
    pub fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .zip(self.defined.iter())
            .filter_map(|(&v, &d)| d.then_some(v))
    }

    #[inline]
    fn gamma_to_u8(value: f64) -> u8 {
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Render the field as an 8-bit grayscale map.
    ///
    /// Gamma is scaled by 255 and clipped, so every value at or above 1.0
    /// saturates to white. Undefined cells are black.
    pub fn to_image(&self) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
        let (height, width) = self.dim();
        let mut pixels = Array2::<u8>::zeros((height, width));
        Zip::from(&mut pixels)
            .and(&self.values)
            .and(&self.defined)
            .par_for_each(|px, &value, &defined| {
                if defined {
                    *px = Self::gamma_to_u8(value);
                }
            });
        let (pixel_data, _) = pixels.into_raw_vec_and_offset();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }
}

#[cfg(test)]
mod tests {
    use super::GammaField;
    use ndarray::array;

    fn sample() -> GammaField {
        GammaField::from_cells(&array![[Some(0.0), None, Some(0.5)], [Some(1.0), Some(2.5), None]])
    }

    #[test]
    fn test_sentinel_and_mask() {
        let field = sample();
        assert_eq!(field.dim(), (2, 3));
        assert_eq!(field.values()[[0, 1]], 0.0);
        assert!(!field.defined()[[0, 1]]);
        assert_eq!(field.get(0, 0), Some(0.0));
        assert_eq!(field.get(1, 0), None);
        assert_eq!(field.get(1, 1), Some(2.5));
        assert_eq!(field.get(3, 0), None);
        assert_eq!(field.defined_count(), 4);
        assert_eq!(
            field.defined_values().collect::<Vec<_>>(),
            vec![0.0, 0.5, 1.0, 2.5]
        );
    }

    #[test]
    fn test_to_image() {
        let image = sample().to_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0)[0], 0);
        assert_eq!(image.get_pixel(1, 0)[0], 0);
        assert_eq!(image.get_pixel(2, 0)[0], 128);
        assert_eq!(image.get_pixel(0, 1)[0], 255);
        assert_eq!(image.get_pixel(1, 1)[0], 255);
    }
}
