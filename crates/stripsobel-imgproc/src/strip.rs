use std::ops::Range;

use stripsobel_image::{Image, ImageError, ImageSize};

use crate::error::StripError;

/// Number of horizontal strips a frame is split into.
pub const STRIP_COUNT: usize = 4;

/// Rows of convolution context carried by every strip, one above and one below its band.
pub const CONTEXT_ROWS: usize = 2;

/// Row geometry of a frame split into [`STRIP_COUNT`] bands.
///
/// # Examples
///
/// ```
/// use stripsobel_image::ImageSize;
/// use stripsobel_imgproc::strip::StripLayout;
///
/// let layout = StripLayout::new(ImageSize { width: 6, height: 8 }).unwrap();
///
/// assert_eq!(layout.strip_height(), 2);
/// assert_eq!(layout.offsets(), [0, 2, 4, 6]);
/// assert_eq!(layout.band(3), 6..8);
/// assert_eq!(layout.strip_size(), ImageSize { width: 6, height: 4 });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StripLayout {
    frame_size: ImageSize,
    strip_height: usize,
}

impl StripLayout {
    /// Validate the frame geometry and compute the band height.
    ///
    /// # Errors
    ///
    /// Frames without pixels and frames whose height is not a multiple of
    /// [`STRIP_COUNT`] are rejected.
    pub fn new(frame_size: ImageSize) -> Result<Self, StripError> {
        if frame_size.width == 0 || frame_size.height == 0 {
            return Err(StripError::EmptyFrame(frame_size));
        }

        if frame_size.height % STRIP_COUNT != 0 {
            return Err(StripError::InvalidFrameHeight(frame_size.height));
        }

        Ok(Self {
            frame_size,
            strip_height: frame_size.height / STRIP_COUNT,
        })
    }

    /// The size of the frame the layout was computed for.
    pub fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    /// Number of output rows owned by each strip.
    pub fn strip_height(&self) -> usize {
        self.strip_height
    }

    /// Output rows owned by strip `k`.
    pub fn band(&self, k: usize) -> Range<usize> {
        k * self.strip_height..(k + 1) * self.strip_height
    }

    /// First output row of every strip: `{0, h/4, h/2, 3h/4}`.
    pub fn offsets(&self) -> [usize; STRIP_COUNT] {
        std::array::from_fn(|k| k * self.strip_height)
    }

    /// Extent of a strip including its context rows.
    pub fn strip_size(&self) -> ImageSize {
        ImageSize {
            width: self.frame_size.width,
            height: self.strip_height + CONTEXT_ROWS,
        }
    }

    /// Extent of a gradient strip once the context rows are consumed.
    pub fn band_size(&self) -> ImageSize {
        ImageSize {
            width: self.frame_size.width,
            height: self.strip_height,
        }
    }
}

/// A borrowed row-range view of a BGR frame.
///
/// The strip owns the band `[band_start, band_start + band_rows)` of the output and
/// reads one extra row above and below it. Window rows that fall outside the frame
/// resolve to the nearest frame row, so no read ever leaves the frame.
#[derive(Clone, Copy, Debug)]
pub struct Strip<'a> {
    frame: &'a Image<u8, 3>,
    index: usize,
    band_start: usize,
    band_rows: usize,
}

impl<'a> Strip<'a> {
    /// Index of the strip in `0..STRIP_COUNT`.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Output rows owned by this strip.
    pub fn band(&self) -> Range<usize> {
        self.band_start..self.band_start + self.band_rows
    }

    /// Number of rows in the strip, context rows included.
    pub fn rows(&self) -> usize {
        self.band_rows + CONTEXT_ROWS
    }

    /// Number of columns in the strip.
    pub fn cols(&self) -> usize {
        self.frame.cols()
    }

    /// Extent of the strip, context rows included.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.cols(),
            height: self.rows(),
        }
    }

    /// Frame rows actually read by the strip, clipped to the frame.
    pub fn window(&self) -> Range<usize> {
        let band = self.band();
        band.start.saturating_sub(1)..(band.end + 1).min(self.frame.rows())
    }

    /// The frame row backing strip row `j`.
    pub fn source_row(&self, j: usize) -> usize {
        (self.band_start + j)
            .saturating_sub(1)
            .min(self.frame.rows().saturating_sub(1))
    }

    /// Interleaved BGR data of strip row `j`.
    pub fn row(&self, j: usize) -> Result<&'a [u8], ImageError> {
        if j >= self.rows() {
            return Err(ImageError::RowIndexOutOfBounds(j, self.rows()));
        }
        self.frame.row(self.source_row(j))
    }
}

/// Split a frame into [`STRIP_COUNT`] overlapping horizontal strips.
///
/// # Arguments
///
/// * `frame` - The BGR frame with a height divisible by [`STRIP_COUNT`].
///
/// # Examples
///
/// ```
/// use stripsobel_image::{Image, ImageSize};
/// use stripsobel_imgproc::strip::partition_strips;
///
/// let frame = Image::<u8, 3>::from_size_val(ImageSize { width: 5, height: 12 }, 0).unwrap();
/// let strips = partition_strips(&frame).unwrap();
///
/// assert_eq!(strips[0].window(), 0..4);
/// assert_eq!(strips[1].window(), 2..7);
/// assert_eq!(strips[3].window(), 8..12);
/// assert!(strips.iter().all(|s| s.rows() == 5));
/// ```
pub fn partition_strips(frame: &Image<u8, 3>) -> Result<[Strip<'_>; STRIP_COUNT], StripError> {
    let layout = StripLayout::new(frame.size())?;

    Ok(std::array::from_fn(|k| Strip {
        frame,
        index: k,
        band_start: layout.band(k).start,
        band_rows: layout.strip_height(),
    }))
}

/// Copy the gradient strips into their bands of the output frame.
///
/// # Arguments
///
/// * `slots` - One gradient strip per strip index, each `width x height/4`.
/// * `dst` - The single channel output frame.
///
/// PRECONDITION: every slot must match the band extent of `dst`.
pub fn assemble_strips(
    slots: &[Image<u8, 1>; STRIP_COUNT],
    dst: &mut Image<u8, 1>,
) -> Result<(), StripError> {
    let layout = StripLayout::new(dst.size())?;
    let expected = layout.band_size();

    for (k, slot) in slots.iter().enumerate() {
        if slot.size() != expected {
            return Err(StripError::StripSizeMismatch {
                strip: k,
                expected,
                actual: slot.size(),
            });
        }
    }

    let band_len = expected.area();
    dst.as_slice_mut()
        .chunks_exact_mut(band_len)
        .zip(slots.iter())
        .for_each(|(band, slot)| band.copy_from_slice(slot.as_slice()));

    Ok(())
}
