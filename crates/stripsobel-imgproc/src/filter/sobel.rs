use stripsobel_image::{Image, ImageError};

use super::kernels::{self, Kernel3};

/// How the clamped `|Gx|` and `|Gy|` responses are combined into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientOverflow {
    /// Keep the low byte of `Gx + Gy`, i.e. the sum wraps modulo 256.
    #[default]
    Wrap,

    /// Saturate `Gx + Gy` at 255.
    Saturate,
}

impl GradientOverflow {
    /// Combine the two clamped gradient components.
    ///
    /// # Example
    ///
    /// ```
    /// use stripsobel_imgproc::filter::GradientOverflow;
    ///
    /// assert_eq!(GradientOverflow::Wrap.combine(200, 200), 144);
    /// assert_eq!(GradientOverflow::Saturate.combine(200, 200), 255);
    /// assert_eq!(GradientOverflow::Wrap.combine(255, 0), 255);
    /// ```
    #[inline]
    pub fn combine(self, gx: u8, gy: u8) -> u8 {
        match self {
            GradientOverflow::Wrap => gx.wrapping_add(gy),
            GradientOverflow::Saturate => gx.saturating_add(gy),
        }
    }
}

/// Response of a 3x3 kernel centred on column `c` of the middle row.
#[inline]
fn kernel3_response(rows: [&[u8]; 3], c: usize, kernel: &Kernel3) -> i32 {
    let mut sum = 0;
    for (row, k_row) in rows.iter().zip(kernel.iter()) {
        for (dx, k) in k_row.iter().enumerate() {
            sum += row[c + dx - 1] as i32 * k;
        }
    }
    sum
}

/// Absolute kernel response clamped to the byte range.
#[inline]
fn clamp_abs(response: i32) -> u8 {
    response.unsigned_abs().min(255) as u8
}

/// Compute the Sobel gradient magnitude of a grayscale strip.
///
/// Every interior pixel `(i, j)` of `src` produces
/// `dst(i - 1, j) = combine(clamp(|Gx|), clamp(|Gy|))`. The first and last rows of
/// `src` only provide context, so `dst` has two rows less than `src`. The first
/// and last columns of `dst` are always zero.
///
/// # Arguments
///
/// * `src` - The grayscale strip with shape (R, C), R >= 2.
/// * `dst` - The gradient strip with shape (R - 2, C).
/// * `overflow` - How `Gx + Gy` is narrowed to a byte.
///
/// # Example
///
/// ```
/// use stripsobel_image::{Image, ImageSize};
/// use stripsobel_imgproc::filter::{sobel_u8, GradientOverflow};
///
/// let src = Image::<u8, 1>::new(
///     ImageSize { width: 4, height: 3 },
///     vec![0, 0, 255, 255, 0, 0, 255, 255, 0, 0, 255, 255],
/// )
/// .unwrap();
///
/// let mut dst = Image::<u8, 1>::from_size_val(ImageSize { width: 4, height: 1 }, 7).unwrap();
/// sobel_u8(&src, &mut dst, GradientOverflow::Wrap).unwrap();
///
/// assert_eq!(dst.as_slice(), &[0, 255, 255, 0]);
/// ```
pub fn sobel_u8(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    overflow: GradientOverflow,
) -> Result<(), ImageError> {
    let expected_rows = src.rows().checked_sub(2);
    if expected_rows != Some(dst.rows()) || src.cols() != dst.cols() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (sobel_x, sobel_y) = kernels::sobel_kernel3();
    let cols = src.cols();
    let src_data = src.as_slice();

    for r in 0..dst.rows() {
        let rows = [
            &src_data[r * cols..(r + 1) * cols],
            &src_data[(r + 1) * cols..(r + 2) * cols],
            &src_data[(r + 2) * cols..(r + 3) * cols],
        ];
        let dst_row = dst.row_mut(r)?;

        // border columns have no horizontal neighbours
        if let Some(first) = dst_row.first_mut() {
            *first = 0;
        }
        if let Some(last) = dst_row.last_mut() {
            *last = 0;
        }

        for c in 1..cols.saturating_sub(1) {
            let gx = clamp_abs(kernel3_response(rows, c, &sobel_x));
            let gy = clamp_abs(kernel3_response(rows, c, &sobel_y));
            dst_row[c] = overflow.combine(gx, gy);
        }
    }

    Ok(())
}
