/// A 3x3 integer convolution kernel indexed as `kernel[dy][dx]`.
pub type Kernel3 = [[i32; 3]; 3];

/// Horizontal Sobel kernel.
///
/// ```text
/// [-1 0 1
///  -2 0 2
///  -1 0 1]
/// ```
pub const SOBEL_X: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical Sobel kernel.
///
/// ```text
/// [ 1  2  1
///   0  0  0
///  -1 -2 -1]
/// ```
pub const SOBEL_Y: Kernel3 = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];

/// Create the sobel kernel pair `(kernel_x, kernel_y)`.
pub fn sobel_kernel3() -> (Kernel3, Kernel3) {
    (SOBEL_X, SOBEL_Y)
}

#[cfg(test)]
mod tests {
    #[test]
    fn sobel_kernels_are_transposed() {
        let (kx, ky) = super::sobel_kernel3();
        for dy in 0..3 {
            for dx in 0..3 {
                assert_eq!(kx[dy][dx], -ky[dx][dy]);
            }
        }
        assert_eq!(kx.iter().flatten().sum::<i32>(), 0);
        assert_eq!(ky.iter().flatten().sum::<i32>(), 0);
    }
}
