use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use stripsobel_image::Image;

use crate::{
    error::IoError,
    fps_counter::FpsCounter,
    png::{has_png_extension, read_image_png_bgr8, write_image_png_mono8},
};

/// A pull-based supplier of BGR frames.
pub trait FrameSource {
    /// Fetch the next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError>;
}

/// A consumer rendering one edge map per cycle.
pub trait DisplaySink {
    /// Render one output frame.
    fn show(&mut self, frame: &Image<u8, 1>) -> Result<(), IoError>;
}

/// A [`FrameSource`] over any iterator of BGR frames.
///
/// # Examples
///
/// ```
/// use stripsobel_image::{Image, ImageSize};
/// use stripsobel_io::stream::{FrameSource, IterSource};
///
/// let frame = Image::<u8, 3>::from_size_val(ImageSize { width: 2, height: 4 }, 0).unwrap();
/// let mut source = IterSource::new(vec![frame]);
///
/// assert!(source.next_frame().unwrap().is_some());
/// assert!(source.next_frame().unwrap().is_none());
/// ```
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = Image<u8, 3>>> IterSource<I> {
    /// Wrap an iterator of frames.
    pub fn new(frames: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: frames.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Image<u8, 3>>> FrameSource for IterSource<I> {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        Ok(self.iter.next())
    }
}

/// A [`FrameSource`] reading the `*.png` files of a directory in lexicographic order.
pub struct PngSequenceSource {
    paths: std::vec::IntoIter<PathBuf>,
}

impl PngSequenceSource {
    /// List the PNG files of `dir`.
    ///
    /// # Errors
    ///
    /// If the directory does not exist or cannot be listed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(IoError::DirectoryDoesNotExist(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_png_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        log::info!("found {} png frames in {}", paths.len(), dir.display());

        Ok(Self {
            paths: paths.into_iter(),
        })
    }

    /// Number of frames not yet read.
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for PngSequenceSource {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        self.paths.next().map(read_image_png_bgr8).transpose()
    }
}

/// A [`DisplaySink`] writing every frame as `frame_{index:06}.png` into a directory.
pub struct PngSequenceSink {
    dir: PathBuf,
    next_index: usize,
}

impl PngSequenceSink {
    /// Create the sink, creating `dir` if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, IoError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_index: 0 })
    }

    /// Path of the file the frame with the given index is written to.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }
}

impl DisplaySink for PngSequenceSink {
    fn show(&mut self, frame: &Image<u8, 1>) -> Result<(), IoError> {
        write_image_png_mono8(self.frame_path(self.next_index), frame)?;
        self.next_index += 1;
        Ok(())
    }
}

/// A [`DisplaySink`] keeping every frame in memory.
#[derive(Debug, Default)]
pub struct CollectSink {
    frames: Vec<Image<u8, 1>>,
}

impl CollectSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The frames shown so far.
    pub fn frames(&self) -> &[Image<u8, 1>] {
        &self.frames
    }

    /// Consume the sink and return its frames.
    pub fn into_frames(self) -> Vec<Image<u8, 1>> {
        self.frames
    }
}

impl DisplaySink for CollectSink {
    fn show(&mut self, frame: &Image<u8, 1>) -> Result<(), IoError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// A [`DisplaySink`] discarding every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&mut self, _frame: &Image<u8, 1>) -> Result<(), IoError> {
        Ok(())
    }
}

/// Configuration of the frame-serial driving loop.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Pause after every cycle so the sink can render.
    pub frame_delay: Duration,
    /// Stop after this many frames have been read.
    pub max_frames: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(1),
            max_frames: None,
        }
    }
}

impl StreamConfig {
    /// Create the default configuration: 1 ms delay, unbounded stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause after every cycle.
    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    /// Stop after `max_frames` frames.
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }
}

/// Counters of a finished stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    /// Frames pulled from the source.
    pub frames_read: u64,
    /// Frames handed to the sink.
    pub frames_shown: u64,
    /// Frames whose processing failed and were not shown.
    pub frames_skipped: u64,
    /// Smoothed cycle rate at the end of the stream.
    pub fps: f32,
}

/// Drive `process` over a stream, one frame per cycle.
///
/// Every cycle pulls one frame, processes it, hands the result to the sink and
/// waits `config.frame_delay`. Cycles never overlap. A frame whose processing fails
/// is logged and skipped; source and sink errors end the stream. `cancel` is
/// checked before every cycle.
///
/// # Arguments
///
/// * `source` - Supplies the BGR frames.
/// * `sink` - Receives the edge maps.
/// * `config` - Per-cycle delay and frame limit.
/// * `cancel` - Set to stop the stream before the next cycle.
/// * `process` - Computes the edge map of one frame.
pub fn run_stream<S, D, F, E>(
    source: &mut S,
    sink: &mut D,
    config: &StreamConfig,
    cancel: &AtomicBool,
    mut process: F,
) -> Result<StreamStats, IoError>
where
    S: FrameSource + ?Sized,
    D: DisplaySink + ?Sized,
    F: FnMut(&Image<u8, 3>) -> Result<Image<u8, 1>, E>,
    E: Display,
{
    let mut stats = StreamStats::default();
    let mut fps_counter = FpsCounter::new();

    loop {
        if cancel.load(Ordering::SeqCst) {
            log::info!("stream cancelled after {} frames", stats.frames_read);
            break;
        }

        if config.max_frames.is_some_and(|max| stats.frames_read >= max) {
            break;
        }

        let Some(frame) = source.next_frame()? else {
            log::debug!("end of stream");
            break;
        };
        let index = stats.frames_read;
        stats.frames_read += 1;

        match process(&frame) {
            Ok(edges) => {
                sink.show(&edges)?;
                stats.frames_shown += 1;
            }
            Err(e) => {
                log::warn!("skipping frame {index}: {e}");
                stats.frames_skipped += 1;
            }
        }

        fps_counter.update();
        if !config.frame_delay.is_zero() {
            std::thread::sleep(config.frame_delay);
        }
    }

    stats.fps = fps_counter.fps();
    log::info!(
        "stream finished: {} read, {} shown, {} skipped, {:.1} fps",
        stats.frames_read,
        stats.frames_shown,
        stats.frames_skipped,
        stats.fps
    );

    Ok(stats)
}
