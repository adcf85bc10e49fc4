use stripsobel_image::{Image, ImageError};

use crate::{
    error::StripError,
    filter::GradientOverflow,
    parallel::{run_strip_workers, CycleReport, ExecutionStrategy},
    strip::{assemble_strips, partition_strips, StripLayout, STRIP_COUNT},
};

/// Strip-parallel Sobel edge detector.
///
/// One call processes one frame: the frame is split into four overlapping strips,
/// each strip is converted to luma and filtered by its own worker, and the
/// gradient strips are copied into the output once every worker has finished.
///
/// # Examples
///
/// ```
/// use stripsobel_image::{Image, ImageSize};
/// use stripsobel_imgproc::{filter::GradientOverflow, StripSobel};
///
/// let frame = Image::<u8, 3>::from_size_val(ImageSize { width: 8, height: 8 }, 90).unwrap();
///
/// let edges = StripSobel::new()
///     .with_overflow(GradientOverflow::Saturate)
///     .process(&frame)
///     .unwrap();
///
/// assert_eq!(edges.size(), frame.size());
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripSobel {
    overflow: GradientOverflow,
    strategy: ExecutionStrategy,
}

impl StripSobel {
    /// Create a detector that wraps `Gx + Gy` and spawns one thread per strip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how `Gx + Gy` is narrowed to a byte.
    pub fn with_overflow(mut self, overflow: GradientOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set how the strip workers are executed.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The configured overflow policy.
    pub fn overflow(&self) -> GradientOverflow {
        self.overflow
    }

    /// The configured execution strategy.
    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Compute the edge map of a BGR frame into a newly allocated image.
    pub fn process(&self, frame: &Image<u8, 3>) -> Result<Image<u8, 1>, StripError> {
        let mut dst = Image::from_size_val(frame.size(), 0u8)?;
        self.process_into(frame, &mut dst)?;
        Ok(dst)
    }

    /// Compute the edge map of a BGR frame into `dst`.
    ///
    /// Worker failures do not fail the call: the affected band stays black and the
    /// failure is listed in the returned report.
    ///
    /// # Arguments
    ///
    /// * `frame` - The BGR frame, height divisible by 4.
    /// * `dst` - The single channel output with the same size as `frame`.
    pub fn process_into(
        &self,
        frame: &Image<u8, 3>,
        dst: &mut Image<u8, 1>,
    ) -> Result<CycleReport, StripError> {
        if frame.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                frame.cols(),
                frame.rows(),
                dst.cols(),
                dst.rows(),
            )
            .into());
        }

        let layout = StripLayout::new(frame.size())?;
        let strips = partition_strips(frame)?;

        let slot = Image::from_size_val(layout.band_size(), 0u8)?;
        let mut slots: [Image<u8, 1>; STRIP_COUNT] = std::array::from_fn(|_| slot.clone());

        let report = run_strip_workers(&strips, &mut slots, self.overflow, self.strategy);
        assemble_strips(&slots, dst)?;

        log::debug!(
            "processed {} frame in {} strips of {} rows, {} worker failures",
            layout.frame_size(),
            STRIP_COUNT,
            layout.strip_height(),
            report.failures.len()
        );

        Ok(report)
    }
}
