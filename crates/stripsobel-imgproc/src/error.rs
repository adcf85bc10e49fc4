use stripsobel_image::{ImageError, ImageSize};

/// An error type for the strip pipeline.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StripError {
    /// The frame has no rows or no columns.
    #[error("Frame has no pixels: {0}")]
    EmptyFrame(ImageSize),

    /// The frame height cannot be split into four equal bands.
    #[error("Frame height ({0}) is not divisible by 4")]
    InvalidFrameHeight(usize),

    /// A gradient strip does not cover exactly its band of the output frame.
    #[error("Strip {strip} has size {actual}, expected {expected}")]
    StripSizeMismatch {
        /// Index of the offending strip.
        strip: usize,
        /// The band extent in the output frame.
        expected: ImageSize,
        /// The extent of the gradient strip.
        actual: ImageSize,
    },

    /// Error from the underlying image buffers.
    #[error(transparent)]
    Image(#[from] ImageError),
}
