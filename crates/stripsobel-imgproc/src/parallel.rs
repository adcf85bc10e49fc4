use std::thread;

use thiserror::Error;

use stripsobel_image::{Image, ImageError};

use crate::{
    color::gray_from_bgr_strip,
    filter::{sobel_u8, GradientOverflow},
    strip::{Strip, STRIP_COUNT},
};

/// A worker that did not deliver its gradient strip.
///
/// Failures are reported, never propagated: the slot of a failed worker keeps
/// whatever it held before the cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerFailure {
    /// The worker thread could not be spawned.
    #[error("failed to launch worker for strip {strip}: {reason}")]
    Launch {
        /// Index of the strip.
        strip: usize,
        /// The OS error reported by the spawn.
        reason: String,
    },

    /// The worker thread panicked before reaching the join barrier.
    #[error("failed to join worker for strip {strip}")]
    Join {
        /// Index of the strip.
        strip: usize,
    },

    /// The worker ran but its task returned an error.
    #[error("worker for strip {strip} failed: {source}")]
    Task {
        /// Index of the strip.
        strip: usize,
        /// The error returned by the task.
        source: ImageError,
    },
}

impl WorkerFailure {
    /// Index of the strip whose worker failed.
    pub fn strip(&self) -> usize {
        match self {
            WorkerFailure::Launch { strip, .. }
            | WorkerFailure::Join { strip }
            | WorkerFailure::Task { strip, .. } => *strip,
        }
    }
}

/// Outcome of one fan-out/fan-in cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// Workers that did not deliver their strip, in strip order.
    pub failures: Vec<WorkerFailure>,
}

impl CycleReport {
    /// Whether every worker delivered its strip.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Controls how the strip workers of a cycle are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Spawn one named thread per strip for the cycle and join them all before returning.
    #[default]
    SpawnPerStrip,

    /// Run the strip workers one after another on the current thread.
    ///
    /// Useful for debugging. A panicking worker is not isolated in this mode.
    Serial,
}

/// Run one worker task: grayscale conversion then Sobel gradient over a strip.
///
/// # Arguments
///
/// * `strip` - The strip view of the frame.
/// * `dst` - The gradient strip, `strip.rows() - 2` rows by `strip.cols()` columns.
/// * `overflow` - How `Gx + Gy` is narrowed to a byte.
pub fn sobel_strip(
    strip: &Strip<'_>,
    dst: &mut Image<u8, 1>,
    overflow: GradientOverflow,
) -> Result<(), ImageError> {
    let mut gray = Image::<u8, 1>::from_size_val(strip.size(), 0)?;
    gray_from_bgr_strip(strip, &mut gray)?;
    sobel_u8(&gray, dst, overflow)
}

/// Run the Sobel worker task over every strip, one slot per strip.
///
/// # Arguments
///
/// * `strips` - The strips of the frame.
/// * `slots` - One gradient strip per strip index; slot `k` is written only by worker `k`.
/// * `overflow` - How `Gx + Gy` is narrowed to a byte.
/// * `strategy` - How the workers are executed.
pub fn run_strip_workers(
    strips: &[Strip<'_>; STRIP_COUNT],
    slots: &mut [Image<u8, 1>; STRIP_COUNT],
    overflow: GradientOverflow,
    strategy: ExecutionStrategy,
) -> CycleReport {
    run_strip_tasks(strips, slots, strategy, |strip, slot| {
        sobel_strip(strip, slot, overflow)
    })
}

/// Run `task` once per strip and wait for all of them.
///
/// Each invocation receives the only mutable reference to its own slot, so the
/// workers never share output memory. Launch and join failures are logged and
/// collected in the returned report; the cycle always completes.
pub fn run_strip_tasks<F>(
    strips: &[Strip<'_>; STRIP_COUNT],
    slots: &mut [Image<u8, 1>; STRIP_COUNT],
    strategy: ExecutionStrategy,
    task: F,
) -> CycleReport
where
    F: Fn(&Strip<'_>, &mut Image<u8, 1>) -> Result<(), ImageError> + Sync,
{
    let mut report = CycleReport::default();

    match strategy {
        ExecutionStrategy::Serial => {
            for (strip, slot) in strips.iter().zip(slots.iter_mut()) {
                if let Err(source) = task(strip, slot) {
                    report.failures.push(WorkerFailure::Task {
                        strip: strip.index(),
                        source,
                    });
                }
            }
        }
        ExecutionStrategy::SpawnPerStrip => {
            let task = &task;
            thread::scope(|s| {
                let handles = strips
                    .iter()
                    .zip(slots.iter_mut())
                    .map(|(strip, slot)| {
                        let spawned = thread::Builder::new()
                            .name(format!("sobel-strip-{}", strip.index()))
                            .spawn_scoped(s, move || task(strip, slot));
                        (strip.index(), spawned)
                    })
                    .collect::<Vec<_>>();

                // join barrier
                for (k, spawned) in handles {
                    let failure = match spawned {
                        Err(e) => Some(WorkerFailure::Launch {
                            strip: k,
                            reason: e.to_string(),
                        }),
                        Ok(handle) => match handle.join() {
                            Ok(Ok(())) => None,
                            Ok(Err(source)) => Some(WorkerFailure::Task { strip: k, source }),
                            Err(_) => Some(WorkerFailure::Join { strip: k }),
                        },
                    };
                    report.failures.extend(failure);
                }
            });
        }
    }

    for failure in &report.failures {
        log::error!("{failure}");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::{partition_strips, StripLayout};
    use stripsobel_image::ImageSize;

    fn gradient_frame(size: ImageSize) -> Result<Image<u8, 3>, ImageError> {
        let mut data = Vec::with_capacity(size.area() * 3);
        for y in 0..size.height {
            for x in 0..size.width {
                data.extend_from_slice(&[(x * 7) as u8, (y * 5) as u8, ((x + y) * 3) as u8]);
            }
        }
        Image::new(size, data)
    }

    fn zeroed_slots(layout: &StripLayout) -> Result<[Image<u8, 1>; STRIP_COUNT], ImageError> {
        let slot = Image::from_size_val(layout.band_size(), 0u8)?;
        Ok(std::array::from_fn(|_| slot.clone()))
    }

    #[test]
    fn spawn_and_serial_agree() -> Result<(), Box<dyn std::error::Error>> {
        let frame = gradient_frame(ImageSize {
            width: 17,
            height: 24,
        })?;
        let layout = StripLayout::new(frame.size())?;
        let strips = partition_strips(&frame)?;

        let mut threaded = zeroed_slots(&layout)?;
        let report = run_strip_workers(
            &strips,
            &mut threaded,
            GradientOverflow::Wrap,
            ExecutionStrategy::SpawnPerStrip,
        );
        assert!(report.is_clean());

        let mut serial = zeroed_slots(&layout)?;
        let report = run_strip_workers(
            &strips,
            &mut serial,
            GradientOverflow::Wrap,
            ExecutionStrategy::Serial,
        );
        assert!(report.is_clean());

        assert_eq!(threaded, serial);
        Ok(())
    }

    #[test]
    fn each_worker_writes_only_its_slot() -> Result<(), Box<dyn std::error::Error>> {
        let frame = gradient_frame(ImageSize {
            width: 4,
            height: 8,
        })?;
        let layout = StripLayout::new(frame.size())?;
        let strips = partition_strips(&frame)?;
        let mut slots = zeroed_slots(&layout)?;

        let report = run_strip_tasks(
            &strips,
            &mut slots,
            ExecutionStrategy::SpawnPerStrip,
            |strip, slot| {
                slot.fill(strip.index() as u8 + 1);
                Ok(())
            },
        );

        assert!(report.is_clean());
        for (k, slot) in slots.iter().enumerate() {
            assert!(slot.as_slice().iter().all(|&v| v == k as u8 + 1));
        }
        Ok(())
    }

    #[test]
    fn panicking_worker_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let frame = gradient_frame(ImageSize {
            width: 4,
            height: 8,
        })?;
        let layout = StripLayout::new(frame.size())?;
        let strips = partition_strips(&frame)?;
        let mut slots = zeroed_slots(&layout)?;

        let report = run_strip_tasks(
            &strips,
            &mut slots,
            ExecutionStrategy::SpawnPerStrip,
            |strip, slot| {
                if strip.index() == 2 {
                    panic!("worker {} gave up", strip.index());
                }
                slot.fill(9);
                Ok(())
            },
        );

        assert_eq!(report.failures, vec![WorkerFailure::Join { strip: 2 }]);
        assert_eq!(report.failures[0].strip(), 2);

        // the failed slot keeps its previous contents, the others are delivered
        assert!(slots[2].as_slice().iter().all(|&v| v == 0));
        for k in [0, 1, 3] {
            assert!(slots[k].as_slice().iter().all(|&v| v == 9));
        }
        Ok(())
    }

    #[test]
    fn task_errors_are_reported() -> Result<(), Box<dyn std::error::Error>> {
        let frame = gradient_frame(ImageSize {
            width: 4,
            height: 8,
        })?;
        let strips = partition_strips(&frame)?;

        // slots sized for the wrong band height
        let wrong = Image::from_size_val(
            ImageSize {
                width: 4,
                height: 3,
            },
            0u8,
        )?;
        let mut slots: [Image<u8, 1>; STRIP_COUNT] = std::array::from_fn(|_| wrong.clone());

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::SpawnPerStrip] {
            let report =
                run_strip_workers(&strips, &mut slots, GradientOverflow::Wrap, strategy);
            assert_eq!(report.failures.len(), STRIP_COUNT);
            assert!(report
                .failures
                .iter()
                .enumerate()
                .all(|(k, f)| matches!(f, WorkerFailure::Task { strip, .. } if *strip == k)));
        }
        Ok(())
    }
}
