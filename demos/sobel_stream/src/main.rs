use argh::FromArgs;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use stripsobel::{
    image::{Image, ImageSize},
    imgproc::{filter::GradientOverflow, parallel::ExecutionStrategy, StripError, StripSobel},
    io::{
        error::IoError,
        stream::{
            run_stream, DisplaySink, FrameSource, NullSink, PngSequenceSink, PngSequenceSource,
            StreamConfig,
        },
    },
};

#[derive(FromArgs)]
/// Run the strip-parallel Sobel edge detector over a stream of frames
struct Args {
    /// directory of PNG frames; a synthetic moving pattern is used when absent
    #[argh(option, short = 'i')]
    input: Option<PathBuf>,

    /// directory to write the edge maps to; frames are discarded when absent
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// stop after this many frames
    #[argh(option, short = 'n')]
    frames: Option<u64>,

    /// pause after every frame, in milliseconds
    #[argh(option, default = "1")]
    delay_ms: u64,

    /// saturate the gradient magnitude instead of wrapping it
    #[argh(switch)]
    saturate: bool,

    /// run the four strips on the calling thread
    #[argh(switch)]
    serial: bool,

    /// width of the synthetic frames
    #[argh(option, default = "640")]
    width: usize,

    /// height of the synthetic frames
    #[argh(option, default = "480")]
    height: usize,
}

/// A bright square sliding over a diagonal gradient.
struct MovingPattern {
    size: ImageSize,
    frame: usize,
}

impl FrameSource for MovingPattern {
    fn next_frame(&mut self) -> Result<Option<Image<u8, 3>>, IoError> {
        let ImageSize { width, height } = self.size;
        let side = (width.min(height) / 4).max(1);
        let x0 = (self.frame * 4) % width.max(1);
        let y0 = (height - side.min(height)) / 2;

        let mut data = Vec::with_capacity(self.size.area() * 3);
        for y in 0..height {
            for x in 0..width {
                let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
                let v = if inside { 255 } else { ((x + y) / 4 % 128) as u8 };
                // b, g, r
                data.extend_from_slice(&[v / 2, v, v]);
            }
        }
        self.frame += 1;

        Ok(Some(Image::new(self.size, data)?))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let detector = StripSobel::new()
        .with_overflow(if args.saturate {
            GradientOverflow::Saturate
        } else {
            GradientOverflow::Wrap
        })
        .with_strategy(if args.serial {
            ExecutionStrategy::Serial
        } else {
            ExecutionStrategy::SpawnPerStrip
        });

    let mut source: Box<dyn FrameSource> = match &args.input {
        Some(dir) => Box::new(PngSequenceSource::new(dir)?),
        None => Box::new(MovingPattern {
            size: ImageSize {
                width: args.width,
                height: args.height,
            },
            frame: 0,
        }),
    };

    let mut sink: Box<dyn DisplaySink> = match &args.output {
        Some(dir) => Box::new(PngSequenceSink::new(dir)?),
        None => Box::new(NullSink),
    };

    let mut config = StreamConfig::new().with_frame_delay(Duration::from_millis(args.delay_ms));
    if let Some(frames) = args.frames {
        config = config.with_max_frames(frames);
    }

    // create a cancel token to stop the stream
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            log::info!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    let stats = run_stream(
        source.as_mut(),
        sink.as_mut(),
        &config,
        &cancel_token,
        |frame| -> Result<Image<u8, 1>, StripError> {
            let mut edges = Image::from_size_val(frame.size(), 0u8)?;
            let report = detector.process_into(frame, &mut edges)?;
            if !report.is_clean() {
                log::warn!("{} strips left black", report.failures.len());
            }
            Ok(edges)
        },
    )?;

    println!(
        "Processed {} frames ({} skipped) at {:.1} fps",
        stats.frames_shown, stats.frames_skipped, stats.fps
    );

    Ok(())
}
