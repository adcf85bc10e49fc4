/// An error type for the image module.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes of two buffers are not compatible.
    #[error("Image size mismatch: ({0}, {1}) vs ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the pixel index is out of bounds.
    #[error("Pixel index out of bounds. The index is ({0}, {1}) and the image size is ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the row index is out of bounds.
    #[error("Row index out of bounds. The index is {0} and the image has {1} rows")]
    RowIndexOutOfBounds(usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index out of bounds. The index is {0} and the image has {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),
}
