#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use stripsobel_image as image;

#[doc(inline)]
pub use stripsobel_imgproc as imgproc;

#[doc(inline)]
pub use stripsobel_io as io;
