use super::*;

#[test]
fn test_empty_depth_defaults() {
    let d = Depth::default();
    assert_eq!(d.to_samples(), 0);
    assert_eq!(d.to_mean(), 0);
}

#[test]
fn test_sample_tracks_min_max_mean() {
    let mut d = Depth::default();
    for depth in [2, 4, 4, 6] {
        d.sample(depth);
    }
    assert_eq!(d.to_samples(), 4);
    assert_eq!(d.to_min(), 2);
    assert_eq!(d.to_max(), 6);
    assert_eq!(d.to_mean(), 4);
}
