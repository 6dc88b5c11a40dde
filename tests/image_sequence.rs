//! Image directory source tests.

use std::path::Path;

use image::{Rgb, RgbImage};
use makepalette::{
    Color, FrameSource, ImageSequence, InputKind, NoOverwrite, PaletteJob, PaletteOptions,
    Resolution, RunContext, TimingOptions, open_source, sample_palette,
};

fn write_frames(directory: &Path, colors: &[[u8; 3]]) {
    write_frames_from(directory, 0, colors);
}

fn write_frames_from(directory: &Path, first: usize, colors: &[[u8; 3]]) {
    for (offset, color) in colors.iter().enumerate() {
        RgbImage::from_pixel(6, 4, Rgb(*color))
            .save(directory.join(format!("frame_{:03}.png", first + offset)))
            .unwrap();
    }
}

#[test]
fn directory_is_scanned_in_name_order() {
    let directory = tempfile::tempdir().unwrap();
    write_frames(directory.path(), &[[10, 0, 0], [20, 0, 0], [30, 0, 0]]);
    std::fs::write(directory.path().join("README.txt"), b"ignored").unwrap();

    let sequence = ImageSequence::open(directory.path()).unwrap();
    assert_eq!(sequence.paths().len(), 3);
    assert!(sequence.paths()[0].ends_with("frame_000.png"));
    assert_eq!(sequence.directory(), directory.path());

    let metadata = sequence.metadata();
    assert_eq!(metadata.kind, InputKind::ImageDirectory);
    assert_eq!((metadata.width, metadata.height), (6, 4));
    assert_eq!(metadata.frame_count, 3);
    assert_eq!(metadata.frames_per_second, 1.0);
    assert_eq!(metadata.length_timecode(), "0:00:03");
}

#[test]
fn frames_are_decoded_by_index() {
    let directory = tempfile::tempdir().unwrap();
    write_frames(directory.path(), &[[1, 2, 3], [4, 5, 6]]);

    let mut sequence = ImageSequence::open(directory.path()).unwrap();
    assert_eq!(sequence.frame(1).unwrap().get_pixel(0, 0).0, [4, 5, 6]);
    assert_eq!(sequence.sample_color(0).unwrap(), Color::new(1, 2, 3));
    assert!(sequence.frame(2).is_err());
}

#[test]
fn frame_rate_override_changes_timestamp_mapping() {
    let directory = tempfile::tempdir().unwrap();
    write_frames(directory.path(), &[[0, 0, 0]; 20]);

    let mut sequence = ImageSequence::open(directory.path())
        .unwrap()
        .with_frame_rate(2.0)
        .unwrap();
    assert_eq!(sequence.metadata().frames_per_second, 2.0);

    // Seconds 5..8 at 2 fps are images 10..16; stride is 1 on a wide canvas.
    let options = PaletteOptions::new().with_timing(
        TimingOptions::new()
            .with_start("00:00:05")
            .with_end("00:00:08"),
    );
    let palette = sample_palette(&mut sequence, 1000, &options).unwrap();
    assert_eq!(palette.len(), 6);
    assert_eq!(palette.range.start_frame, 10);

    assert!(ImageSequence::open(directory.path())
        .unwrap()
        .with_frame_rate(0.0)
        .is_err());
}

#[test]
fn unreadable_image_truncates_the_palette() {
    let directory = tempfile::tempdir().unwrap();
    write_frames(directory.path(), &[[100, 0, 0], [0, 100, 0]]);
    std::fs::write(directory.path().join("frame_002.png"), b"not a png").unwrap();
    write_frames_from(directory.path(), 3, &[[0, 0, 100]]);

    let mut source = open_source(directory.path()).unwrap();
    let options = PaletteOptions::new().with_sampling_rate(1);
    let palette = sample_palette(source.as_mut(), 1000, &options).unwrap();

    assert_eq!(
        palette.colors(),
        &[Color::new(100, 0, 0), Color::new(0, 100, 0)]
    );
    assert_eq!(palette.truncated_at, Some(2));
}

#[test]
fn directory_renders_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    write_frames(input.path(), &[[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]]);
    let output = tempfile::tempdir().unwrap();

    let context = RunContext::new(input.path())
        .with_output_file("stills.png")
        .with_output_dir(output.path());
    let options = PaletteOptions::new()
        .with_resolution(Resolution::new(8, 2))
        .with_sampling_rate(1);
    let summary = PaletteJob::new(context, options).run(&NoOverwrite).unwrap();

    assert_eq!(summary.input_kind, InputKind::ImageDirectory);
    assert_eq!(summary.sampled, 4);

    let canvas = image::open(&summary.output_path).unwrap().into_rgb8();
    assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0]);
    assert_eq!(canvas.get_pixel(3, 1).0, [0, 255, 0]);
    assert_eq!(canvas.get_pixel(5, 0).0, [0, 0, 255]);
    assert_eq!(canvas.get_pixel(7, 1).0, [255, 255, 255]);
}
