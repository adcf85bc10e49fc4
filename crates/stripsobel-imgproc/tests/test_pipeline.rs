use rand::{rngs::StdRng, Rng, SeedableRng};

use stripsobel_image::{Image, ImageSize};
use stripsobel_imgproc::{
    color::gray_from_bgr,
    filter::{sobel_u8, GradientOverflow},
    parallel::ExecutionStrategy,
    strip::{StripLayout, STRIP_COUNT},
    StripSobel,
};

fn random_frame(size: ImageSize, seed: u64) -> Result<Image<u8, 3>, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..size.area() * 3).map(|_| rng.random::<u8>()).collect();
    Ok(Image::new(size, data)?)
}

fn gray_frame(size: ImageSize, f: impl Fn(usize, usize) -> u8) -> Image<u8, 3> {
    let mut data = Vec::with_capacity(size.area() * 3);
    for y in 0..size.height {
        for x in 0..size.width {
            let v = f(x, y);
            data.extend_from_slice(&[v, v, v]);
        }
    }
    Image::new(size, data).expect("frame data matches its size")
}

/// Whole-frame Sobel with the first and last rows replicated as context.
fn whole_frame_sobel(
    frame: &Image<u8, 3>,
    overflow: GradientOverflow,
) -> Result<Image<u8, 1>, Box<dyn std::error::Error>> {
    let mut gray = Image::<u8, 1>::from_size_val(frame.size(), 0)?;
    gray_from_bgr(frame, &mut gray)?;

    let cols = frame.cols();
    let mut padded = Vec::with_capacity((frame.rows() + 2) * cols);
    padded.extend_from_slice(gray.row(0)?);
    padded.extend_from_slice(gray.as_slice());
    padded.extend_from_slice(gray.row(frame.rows() - 1)?);
    let padded = Image::<u8, 1>::new(
        ImageSize {
            width: cols,
            height: frame.rows() + 2,
        },
        padded,
    )?;

    let mut dst = Image::<u8, 1>::from_size_val(frame.size(), 0)?;
    sobel_u8(&padded, &mut dst, overflow)?;
    Ok(dst)
}

#[test]
fn output_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let frame = random_frame(
        ImageSize {
            width: 64,
            height: 48,
        },
        7,
    )?;
    let detector = StripSobel::new();

    let first = detector.process(&frame)?;
    for _ in 0..8 {
        assert_eq!(detector.process(&frame)?, first);
    }
    Ok(())
}

#[test]
fn strategies_agree() -> Result<(), Box<dyn std::error::Error>> {
    let frame = random_frame(
        ImageSize {
            width: 33,
            height: 20,
        },
        11,
    )?;
    for overflow in [GradientOverflow::Wrap, GradientOverflow::Saturate] {
        let threaded = StripSobel::new()
            .with_overflow(overflow)
            .with_strategy(ExecutionStrategy::SpawnPerStrip)
            .process(&frame)?;
        let serial = StripSobel::new()
            .with_overflow(overflow)
            .with_strategy(ExecutionStrategy::Serial)
            .process(&frame)?;
        assert_eq!(threaded, serial);
    }
    Ok(())
}

#[test]
fn strips_match_whole_frame() -> Result<(), Box<dyn std::error::Error>> {
    for (i, height) in [4usize, 8, 12, 36, 100].into_iter().enumerate() {
        let frame = random_frame(
            ImageSize {
                width: 23,
                height,
            },
            i as u64,
        )?;
        for overflow in [GradientOverflow::Wrap, GradientOverflow::Saturate] {
            let strips = StripSobel::new().with_overflow(overflow).process(&frame)?;
            let whole = whole_frame_sobel(&frame, overflow)?;
            assert_eq!(strips, whole, "height {height}, {overflow:?}");
        }
    }
    Ok(())
}

#[test]
fn seams_are_continuous_on_vertical_ramp() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 16,
        height: 32,
    };
    // intensity grows by 3 per row, so Gy = 8 * 3 everywhere inside the frame
    let frame = gray_frame(size, |_, y| (y * 3) as u8);
    let edges = StripSobel::new().process(&frame)?;

    let layout = StripLayout::new(size)?;
    for seam in layout.offsets().into_iter().skip(1) {
        for y in [seam - 1, seam] {
            let row = edges.row(y)?;
            assert!(
                row[1..size.width - 1].iter().all(|&v| v == 24),
                "row {y}: {row:?}"
            );
        }
    }

    // only the outermost rows see a replicated neighbour
    for y in 1..size.height - 1 {
        assert!(edges.row(y)?[1..size.width - 1].iter().all(|&v| v == 24));
    }
    Ok(())
}

#[test]
fn bands_tile_output_rows() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 5,
        height: 16,
    };
    let layout = StripLayout::new(size)?;
    let mut owner = vec![None; size.height];
    for k in 0..STRIP_COUNT {
        for y in layout.band(k) {
            assert!(owner[y].is_none(), "row {y} assigned twice");
            owner[y] = Some(k);
        }
    }
    assert!(owner.iter().all(Option::is_some));
    Ok(())
}

#[test]
fn vertical_edge_across_all_strips() -> Result<(), Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 10,
        height: 12,
    };
    let frame = gray_frame(size, |x, _| if x < 5 { 0 } else { 255 });
    let edges = StripSobel::new().process(&frame)?;

    for y in 0..size.height {
        assert_eq!(edges.row(y)?, &[0, 0, 0, 0, 255, 255, 0, 0, 0, 0]);
    }
    Ok(())
}

#[test]
fn flat_frame_has_no_edges() -> Result<(), Box<dyn std::error::Error>> {
    let frame = gray_frame(
        ImageSize {
            width: 9,
            height: 8,
        },
        |_, _| 200,
    );
    let edges = StripSobel::new().process(&frame)?;
    assert!(edges.as_slice().iter().all(|&v| v == 0));
    Ok(())
}
