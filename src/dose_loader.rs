use crate::dose_grid::{DoseGrid, PixelSpacing};
use crate::error::GammaError;

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use image::{DynamicImage, ImageBuffer, Pixel};
use ndarray::{Array2, s};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DoseLoaderError {
    #[error("No decodable pixel data")]
    NoPixelData,

    #[error("Missing pixel spacing information")]
    MissingSpacing,

    #[error("Invalid dose grid: {0}")]
    Grid(#[from] GammaError),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Reads dose planes into [`DoseGrid`]s.
pub struct DoseLoader;

impl DoseLoader {
    /// Load the first frame of a DICOM file (typically an RT Dose object).
    ///
    /// Stored values are multiplied by `DoseGridScaling` when present, and
    /// the spacing is taken from `PixelSpacing`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, carries no decodable pixel
    /// data or no spacing.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<DoseGrid, DoseLoaderError> {
        let dicom_object = open_file(path.as_ref())?;
        Self::load_from_dicom_object(&dicom_object)
    }

    pub fn load_from_dicom_object(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<DoseGrid, DoseLoaderError> {
        let raw = Self::decode_plane(dicom_object).ok_or(DoseLoaderError::NoPixelData)?;
        let spacing = Self::get_spacing(dicom_object).ok_or(DoseLoaderError::MissingSpacing)?;
        let scaling = Self::get_dose_grid_scaling(dicom_object).unwrap_or(1.0);

        let data = raw.mapv(|v| v * scaling);
        log::debug!(
            "loaded {}x{} dose plane, pixel {} x {} mm, scaling {scaling}",
            data.ncols(),
            data.nrows(),
            spacing.width_mm,
            spacing.height_mm,
        );
        Ok(DoseGrid::new(data, spacing)?)
    }

    /// Load a grayscale raster (PNG, TIFF, ...) whose calibration is known
    /// only to the caller.
    ///
    /// Gray and float samples are used as dose values unchanged, whatever
    /// their bit depth. Color rasters are reduced to their luminance in the
    /// stored range.
    pub fn load_from_image(
        path: impl AsRef<Path>,
        spacing: PixelSpacing,
    ) -> Result<DoseGrid, DoseLoaderError> {
        let image = image::open(path.as_ref())?;
        let (width, height) = (image.width(), image.height());
        let samples = match image {
            DynamicImage::ImageLuma8(buf) => Self::first_channel(&buf),
            DynamicImage::ImageLumaA8(buf) => Self::first_channel(&buf),
            DynamicImage::ImageLuma16(buf) => Self::first_channel(&buf),
            DynamicImage::ImageLumaA16(buf) => Self::first_channel(&buf),
            // Float rasters decode as RGB(A); a gray plane has equal channels.
            DynamicImage::ImageRgb32F(buf) => Self::first_channel(&buf),
            DynamicImage::ImageRgba32F(buf) => Self::first_channel(&buf),
            other @ (DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_)) => {
                Self::first_channel(&other.to_luma8())
            }
            other @ (DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgba16(_)) => {
                Self::first_channel(&other.to_luma16())
            }
            other => Self::first_channel(&other.to_luma32f()),
        };
        let data = Array2::from_shape_vec((height as usize, width as usize), samples)
            .map_err(|_| DoseLoaderError::NoPixelData)?;
        Ok(DoseGrid::new(data, spacing)?)
    }

    fn first_channel<P>(buf: &ImageBuffer<P, Vec<P::Subpixel>>) -> Vec<f64>
    where
        P: Pixel,
        P::Subpixel: Into<f64>,
    {
        buf.pixels().map(|p| p.channels()[0].into()).collect()
    }

    fn decode_plane(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<f64>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f64>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    // PixelSpacing is (row spacing, column spacing), i.e. (height, width).
    fn get_spacing(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<PixelSpacing> {
        let pixel_spacing = dicom_object
            .element(tags::PIXEL_SPACING)
            .ok()?
            .to_multi_float64()
            .ok()?;
        let (&row, &column) = (pixel_spacing.first()?, pixel_spacing.get(1)?);
        PixelSpacing::new(column, row).ok()
    }

    fn get_dose_grid_scaling(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<f64> {
        dicom_object
            .element(tags::DOSE_GRID_SCALING)
            .ok()?
            .to_float64()
            .ok()
    }
}
