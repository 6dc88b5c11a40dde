//! Output naming, overwrite policy, and workspace tests.

use std::path::{Path, PathBuf};

use image::RgbImage;
use makepalette::{
    Color, NoOverwrite, NoWorkspace, Overwrite, OverwritePolicy, PaletteError, SwatchDirectory,
    WorkspaceLifecycle, check_output, define_output_path, swatch_file_name, write_palette,
    write_placeholder, write_swatch,
};

// ── Output naming ──────────────────────────────────────────────────

#[test]
fn default_name_replaces_extension_in_current_directory() {
    let path = define_output_path(Path::new("movies/film.mkv"), None, None).unwrap();
    assert_eq!(path, PathBuf::from("./film.jpg"));
}

#[test]
fn image_directory_input_gets_jpg_name() {
    let path = define_output_path(Path::new("shots/day_one"), None, None).unwrap();
    assert_eq!(path, PathBuf::from("./day_one.jpg"));
}

#[test]
fn explicit_output_keeps_only_its_file_name() {
    let directory = tempfile::tempdir().unwrap();
    let path = define_output_path(
        Path::new("film.mkv"),
        Some(Path::new("/somewhere/else/poster.png")),
        Some(directory.path()),
    )
    .unwrap();
    assert_eq!(path, directory.path().join("poster.png"));
}

#[test]
fn output_directory_is_created() {
    let directory = tempfile::tempdir().unwrap();
    let nested = directory.path().join("a").join("b");
    let path = define_output_path(Path::new("film.mkv"), None, Some(&nested)).unwrap();
    assert!(nested.is_dir());
    assert_eq!(path, nested.join("film.jpg"));
}

#[test]
fn output_directory_that_is_a_file_fails() {
    let directory = tempfile::tempdir().unwrap();
    let blocker = directory.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let result = define_output_path(Path::new("film.mkv"), None, Some(&blocker.join("sub")));
    assert!(matches!(result, Err(PaletteError::WriteError { .. })));
}

#[test]
fn nameless_input_is_rejected() {
    let result = define_output_path(Path::new("/"), None, None);
    assert!(matches!(result, Err(PaletteError::InvalidArgument(_))));
}

// ── Overwrite policy ───────────────────────────────────────────────

#[test]
fn missing_output_never_consults_policy() {
    struct Panicking;
    impl OverwritePolicy for Panicking {
        fn allow_overwrite(&self, _path: &Path) -> bool {
            panic!("policy should not be consulted");
        }
    }

    let directory = tempfile::tempdir().unwrap();
    check_output(&directory.path().join("new.jpg"), &Panicking).unwrap();
}

#[test]
fn existing_output_follows_policy() {
    let directory = tempfile::tempdir().unwrap();
    let existing = directory.path().join("old.jpg");
    std::fs::write(&existing, b"").unwrap();

    assert!(check_output(&existing, &Overwrite).is_ok());
    match check_output(&existing, &NoOverwrite) {
        Err(PaletteError::OutputExists { path }) => assert_eq!(path, existing),
        other => panic!("Expected OutputExists, got: {other:?}"),
    }
}

// ── Image writing ──────────────────────────────────────────────────

#[test]
fn placeholder_is_a_tiny_image_in_the_named_format() {
    let directory = tempfile::tempdir().unwrap();
    for name in ["p.jpg", "p.png", "p.bmp"] {
        let path = directory.path().join(name);
        write_placeholder(&path).unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (1, 1), "{name}");
    }
}

#[test]
fn placeholder_fails_for_unknown_extension_or_missing_directory() {
    let directory = tempfile::tempdir().unwrap();
    assert!(matches!(
        write_placeholder(&directory.path().join("palette.xyz")),
        Err(PaletteError::WriteError { .. })
    ));
    assert!(matches!(
        write_placeholder(&directory.path().join("missing").join("palette.png")),
        Err(PaletteError::WriteError { .. })
    ));
}

#[test]
fn palette_replaces_placeholder() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("palette.png");
    write_placeholder(&path).unwrap();

    let canvas = RgbImage::from_pixel(12, 3, image::Rgb([1, 2, 3]));
    write_palette(&canvas, &path).unwrap();
    let written = image::open(&path).unwrap().into_rgb8();
    assert_eq!(written, canvas);
}

#[test]
fn swatch_files_are_numbered() {
    assert_eq!(swatch_file_name(0), "swatch_000000.png");
    assert_eq!(swatch_file_name(1234), "swatch_001234.png");

    let directory = tempfile::tempdir().unwrap();
    let path = write_swatch(directory.path(), 7, Color::new(5, 6, 7), 3).unwrap();
    assert_eq!(path, directory.path().join("swatch_000007.png"));
    let swatch = image::open(&path).unwrap().into_rgb8();
    assert_eq!(swatch.dimensions(), (3, 3));
}

// ── Workspaces ─────────────────────────────────────────────────────

#[test]
fn no_workspace_has_no_swatch_directory() {
    let mut workspace = NoWorkspace;
    workspace.prepare().unwrap();
    assert!(workspace.swatch_directory().is_none());
    workspace.release();
}

#[test]
fn swatch_directory_lifecycle() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("swatches");

    let mut workspace = SwatchDirectory::new(&path);
    workspace.prepare().unwrap();
    assert!(path.is_dir());
    assert_eq!(workspace.swatch_directory(), Some(path.as_path()));

    workspace.release();
    assert!(!path.exists());
}

#[test]
fn kept_swatch_directory_survives_release() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("swatches");

    let mut workspace = SwatchDirectory::new(&path).keep(true);
    workspace.prepare().unwrap();
    workspace.release();
    assert!(path.is_dir());
}

#[test]
fn preexisting_swatch_directory_is_never_removed() {
    let directory = tempfile::tempdir().unwrap();
    let mut workspace = SwatchDirectory::new(directory.path());
    workspace.prepare().unwrap();
    workspace.release();
    assert!(directory.path().is_dir());
}
