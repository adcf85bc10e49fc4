use stripsobel_image::{Image, ImageError};

use crate::strip::Strip;

/// BT.709 luma weights scaled by [`WEIGHT_SCALE`].
const BW: u32 = 722;
const GW: u32 = 7152;
const RW: u32 = 2126;
const WEIGHT_SCALE: u32 = 10_000;

/// Convert one BGR8 pixel to luma using the ITU-R BT.709 weights:
///
/// Y = floor(0.0722 * B + 0.7152 * G + 0.2126 * R)
///
/// The weights sum to one, so the result always fits in a byte.
///
/// # Example
///
/// ```
/// use stripsobel_imgproc::color::gray_from_bgr_pixel;
///
/// assert_eq!(gray_from_bgr_pixel(200, 200, 200), 200);
/// assert_eq!(gray_from_bgr_pixel(0, 0, 255), 54);
/// ```
#[inline]
pub fn gray_from_bgr_pixel(b: u8, g: u8, r: u8) -> u8 {
    ((BW * b as u32 + GW * g as u32 + RW * r as u32) / WEIGHT_SCALE) as u8
}

/// Convert a row of interleaved BGR8 pixels into a row of luma values.
///
/// PRECONDITION: `src.len() == 3 * dst.len()`.
pub fn gray_row_from_bgr(src: &[u8], dst: &mut [u8]) {
    src.chunks_exact(3)
        .zip(dst.iter_mut())
        .for_each(|(bgr, gray)| {
            *gray = gray_from_bgr_pixel(bgr[0], bgr[1], bgr[2]);
        });
}

/// Convert a BGR8 image to grayscale with the BT.709 weights.
///
/// # Arguments
///
/// * `src` - The input BGR8 image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use stripsobel_image::{Image, ImageSize};
/// use stripsobel_imgproc::color::gray_from_bgr;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![255, 0, 0, 0, 255, 0],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_bgr(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[18, 182]);
/// ```
pub fn gray_from_bgr(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    gray_row_from_bgr(src.as_slice(), dst.as_slice_mut());

    Ok(())
}

/// Convert a strip of a BGR8 frame to grayscale, context rows included.
///
/// # Arguments
///
/// * `src` - The strip view of the frame.
/// * `dst` - The output grayscale strip with the same extent as `src`.
pub fn gray_from_bgr_strip(src: &Strip<'_>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    for j in 0..src.rows() {
        gray_row_from_bgr(src.row(j)?, dst.row_mut(j)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use stripsobel_image::{Image, ImageError, ImageSize};

    use crate::strip::partition_strips;

    #[test]
    fn gray_from_bgr_pixel_weights() {
        assert_eq!(super::gray_from_bgr_pixel(200, 200, 200), 200);
        assert_eq!(super::gray_from_bgr_pixel(255, 255, 255), 255);
        assert_eq!(super::gray_from_bgr_pixel(0, 0, 255), 54);
        assert_eq!(super::gray_from_bgr_pixel(0, 255, 0), 182);
        assert_eq!(super::gray_from_bgr_pixel(255, 0, 0), 18);
        assert_eq!(super::gray_from_bgr_pixel(0, 0, 0), 0);
        // 0.0722 * 10 + 0.7152 * 20 + 0.2126 * 30 = 21.402
        assert_eq!(super::gray_from_bgr_pixel(10, 20, 30), 21);
    }

    #[test]
    fn gray_from_bgr_regression() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![
                0u8, 0, 255,
                0, 255, 0,
                255, 0, 0,
                100, 100, 100,
            ],
        )?;

        let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::gray_from_bgr(&image, &mut gray)?;

        assert_eq!(gray.as_slice(), &[54, 182, 18, 100]);

        Ok(())
    }

    #[test]
    fn gray_from_bgr_size_mismatch() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )?;
        let mut gray = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0,
        )?;

        assert_eq!(
            super::gray_from_bgr(&image, &mut gray),
            Err(ImageError::InvalidImageSize(2, 2, 3, 2))
        );

        Ok(())
    }

    #[test]
    fn gray_from_strip_includes_context() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 2,
            height: 8,
        };
        let mut data = Vec::with_capacity(size.area() * 3);
        for y in 0..size.height {
            for _ in 0..size.width {
                let v = 10 * y as u8;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let frame = Image::<u8, 3>::new(size, data)?;
        let strips = partition_strips(&frame)?;

        let mut gray = Image::<u8, 1>::from_size_val(strips[2].size(), 0)?;
        super::gray_from_bgr_strip(&strips[2], &mut gray)?;

        assert_eq!(gray.as_slice(), &[30, 30, 40, 40, 50, 50, 60, 60]);

        Ok(())
    }
}
