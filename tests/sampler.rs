//! Sampling plan tests.

use makepalette::{PaletteError, SampleIndex, TimeRange, compute_stride, sample_frames};

#[test]
fn stride_follows_length_width_and_rate() {
    assert_eq!(compute_stride(1000, 100, 10).unwrap(), 100);
    assert_eq!(compute_stride(216_000, 1920, 10).unwrap(), 1125);
    // floor(1000 / 300 * 10) = 33
    assert_eq!(compute_stride(1000, 300, 10).unwrap(), 33);
}

#[test]
fn stride_is_at_least_one() {
    assert_eq!(compute_stride(10, 1920, 10).unwrap(), 1);
    assert_eq!(compute_stride(0, 1920, 10).unwrap(), 1);
}

#[test]
fn stride_rejects_zero_width_or_rate() {
    assert!(matches!(
        compute_stride(1000, 0, 10),
        Err(PaletteError::InvalidArgument(_))
    ));
    assert!(matches!(
        compute_stride(1000, 100, 0),
        Err(PaletteError::InvalidArgument(_))
    ));
}

#[test]
fn indices_step_from_start_below_end() {
    let range = TimeRange {
        start_frame: 5,
        end_frame: 30,
    };
    let indices: Vec<u64> = SampleIndex::new(range, 10, 100).collect();
    assert_eq!(indices, vec![5, 15, 25]);
}

#[test]
fn indices_are_capped_by_source_length() {
    let range = TimeRange {
        start_frame: 0,
        end_frame: 500,
    };
    let indices: Vec<u64> = SampleIndex::new(range, 4, 10).collect();
    assert_eq!(indices, vec![0, 4, 8]);
}

#[test]
fn empty_range_yields_nothing() {
    let range = TimeRange {
        start_frame: 40,
        end_frame: 40,
    };
    let mut indices = SampleIndex::new(range, 3, 100);
    assert_eq!(indices.len(), 0);
    assert_eq!(indices.next(), None);
}

#[test]
fn zero_stride_is_treated_as_one() {
    let indices = SampleIndex::new(TimeRange::full(4), 0, 4);
    assert_eq!(indices.stride(), 1);
    assert_eq!(indices.collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn reported_length_matches_yielded_count() {
    for (start, end, stride) in [(0, 100, 7), (3, 97, 10), (0, 1, 1), (10, 11, 100)] {
        let range = TimeRange {
            start_frame: start,
            end_frame: end,
        };
        let mut indices = SampleIndex::new(range, stride, 1000);
        let expected = indices.len();
        let mut yielded = 0;
        while indices.next().is_some() {
            yielded += 1;
            assert_eq!(indices.len(), expected - yielded);
        }
        assert_eq!(yielded, expected);
        // Fused once exhausted.
        assert_eq!(indices.next(), None);
    }
}

#[test]
fn sample_frames_combines_stride_and_range() {
    let range = TimeRange {
        start_frame: 250,
        end_frame: 750,
    };
    let indices = sample_frames(1000, 100, 10, range).unwrap();
    assert_eq!(indices.stride(), 100);
    assert_eq!(
        indices.collect::<Vec<_>>(),
        vec![250, 350, 450, 550, 650]
    );
}
