//! Configuration and option builder tests.

use makepalette::{
    CancellationToken, OutputSize, PaletteOptions, RESOLUTION_PRESETS, Resolution,
    TimingOptions, parse_aspect_ratio,
};

// ── Resolution ─────────────────────────────────────────────────────

#[test]
fn presets_parse_case_insensitively() {
    assert_eq!("HD".parse::<Resolution>().unwrap(), Resolution::new(1920, 1080));
    assert_eq!("hd".parse::<Resolution>().unwrap(), Resolution::new(1920, 1080));
    assert_eq!("4k".parse::<Resolution>().unwrap(), Resolution::new(3840, 2160));
    assert_eq!("u".parse::<Resolution>().unwrap(), Resolution::preset("ultrawide").unwrap());
    assert_eq!("a4".parse::<Resolution>().unwrap(), Resolution::new(3508, 2480));
}

#[test]
fn every_preset_round_trips_through_lookup() {
    for &(name, width, height) in RESOLUTION_PRESETS {
        assert_eq!(
            name.parse::<Resolution>().unwrap(),
            Resolution::new(width, height),
            "{name}"
        );
    }
}

#[test]
fn dimensions_parse() {
    assert_eq!("800x200".parse::<Resolution>().unwrap(), Resolution::new(800, 200));
    assert_eq!(" 64X48 ".parse::<Resolution>().unwrap(), Resolution::new(64, 48));
}

#[test]
fn bad_resolutions_are_rejected() {
    for bad in ["", "huge", "800", "800x", "x200", "0x100", "100x0", "-5x5", "10x10x10"] {
        assert!(bad.parse::<Resolution>().is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn resolution_displays_as_dimensions() {
    assert_eq!(Resolution::new(1920, 1080).to_string(), "1920x1080");
}

#[test]
fn aspect_ratio_derives_height() {
    assert_eq!(
        Resolution::from_aspect_ratio(4096, 2.39).unwrap(),
        Resolution::new(4096, 1713)
    );
    assert_eq!(
        Resolution::from_aspect_ratio(1000, 2.0).unwrap(),
        Resolution::new(1000, 500)
    );
    assert_eq!(
        Resolution::from_aspect_ratio(10, 100.0).unwrap(),
        Resolution::new(10, 1)
    );
    assert!(Resolution::from_aspect_ratio(0, 2.0).is_err());
    assert!(Resolution::from_aspect_ratio(100, 0.0).is_err());
}

#[test]
fn aspect_ratio_parses_decimals_and_ratios() {
    assert_eq!(parse_aspect_ratio("2.39").unwrap(), 2.39);
    assert_eq!(parse_aspect_ratio("16:9").unwrap(), 16.0 / 9.0);
    for bad in ["", "wide", "0", "-1.5", "16:0", "16:"] {
        assert!(parse_aspect_ratio(bad).is_err(), "{bad:?} should be rejected");
    }
}

// ── OutputSize ─────────────────────────────────────────────────────

#[test]
fn output_size_defaults_to_source() {
    assert_eq!(
        OutputSize::default().resolve(640, 360).unwrap(),
        Resolution::new(640, 360)
    );
}

#[test]
fn aspect_ratio_output_falls_back_to_source_width() {
    let size = OutputSize::AspectRatio {
        width: 0,
        aspect_ratio: 2.0,
    };
    assert_eq!(size.resolve(640, 360).unwrap(), Resolution::new(640, 320));
}

#[test]
fn zero_sized_source_cannot_be_matched() {
    assert!(OutputSize::Source.resolve(0, 360).is_err());
}

// ── PaletteOptions ─────────────────────────────────────────────────

#[test]
fn options_defaults() {
    let options = PaletteOptions::default();
    assert_eq!(options.sampling_rate(), 10);
    assert_eq!(options.timing(), &TimingOptions::new());
    assert_eq!(options.output_size(), OutputSize::Source);
}

#[test]
fn options_builder_chain() {
    let options = PaletteOptions::new()
        .with_resolution(Resolution::new(100, 20))
        .with_sampling_rate(3)
        .with_timing(TimingOptions::new().with_center_percentage(80))
        .with_batch_size(0)
        .with_strict_decoding(true)
        .with_swatch_size(0);

    assert_eq!(
        options.output_size(),
        OutputSize::Exact(Resolution::new(100, 20))
    );
    assert_eq!(options.sampling_rate(), 3);
    assert_eq!(options.timing().center_percentage, Some(80));
}

#[test]
fn options_debug_hides_callbacks() {
    let options = PaletteOptions::new().with_cancellation(CancellationToken::new());
    let debug = format!("{options:?}");
    assert!(debug.contains("has_cancellation: true"));
    assert!(debug.contains("sampling_rate: 10"));
}
