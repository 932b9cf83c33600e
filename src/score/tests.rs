//! Scoring tests

use super::*;
use test_case::test_case;

#[test]
fn test_empty_series_has_no_score() {
    assert!(score_series(&[]).is_none());
}

#[test]
fn test_two_point_swing_is_volatile() {
    let score = score_series(&[1.0, 100.0]).unwrap();

    // sd = 70.0036, mean = 50.5
    assert!((score.volatility - 1.3862).abs() < 1e-3);
    assert_eq!(score.granularity, Granularity::Coarse);
    assert_eq!(score.sample_count, 2);
    assert!(score.verdict);
}

#[test]
fn test_flat_short_series_fails() {
    let score = score_series(&[5.0; 10]).unwrap();

    assert_eq!(score.volatility, 0.0);
    assert_eq!(score.granularity, Granularity::Coarse);
    assert!(!score.verdict);
}

#[test]
fn test_flat_fine_series_passes_on_density() {
    let score = score_series(&[5.0; 150]).unwrap();

    assert_eq!(score.volatility, 0.0);
    assert_eq!(score.granularity, Granularity::Fine);
    assert!(score.verdict);
}

#[test]
fn test_zero_series_has_zero_volatility() {
    let score = score_series(&[0.0, 0.0, 0.0]).unwrap();
    assert_eq!(score.volatility, 0.0);
    assert!(!score.verdict);
}

#[test]
fn test_single_sample() {
    let score = score_series(&[42.0]).unwrap();
    assert_eq!(score.volatility, 0.0);
    assert!(!score.verdict);
}

#[test]
fn test_zero_mean_series_has_zero_volatility() {
    assert_eq!(volatility(&[-1.0, 1.0, -1.0, 1.0]), 0.0);

    let score = score_series(&[-5.0, 5.0]).unwrap();
    assert_eq!(score.volatility, 0.0);
    assert_eq!(score.granularity, Granularity::Coarse);
    assert!(!score.verdict);
}

#[test]
fn test_negative_mean_uses_magnitude() {
    // sd = 1, |mean| = 10
    let v = volatility(&[-9.0, -10.0, -11.0]);
    assert!((v - 0.1).abs() < 1e-12);
}

#[test]
fn test_volatility_is_never_negative() {
    assert!(volatility(&[-10.0, -12.0, -9.0]) >= 0.0);
}

#[test_case(1, Granularity::Coarse; "one")]
#[test_case(11, Granularity::Coarse; "just below medium")]
#[test_case(12, Granularity::Medium; "medium lower bound")]
#[test_case(99, Granularity::Medium; "just below fine")]
#[test_case(100, Granularity::Fine; "fine lower bound")]
#[test_case(5000, Granularity::Fine; "large")]
fn test_granularity_bounds(len: usize, expected: Granularity) {
    assert_eq!(VisualPotentialScorer::default().granularity(len), expected);
}

#[test]
fn test_threshold_is_exclusive() {
    // sd = 1, mean = 10 → cv = 0.1
    let series = [9.0, 10.0, 11.0];
    let v = volatility(&series);
    assert!((v - 0.1).abs() < 1e-12);

    let at = VisualPotentialScorer::new().with_min_volatility(v);
    assert!(!at.score(&series).unwrap().verdict);

    let below = VisualPotentialScorer::new().with_min_volatility(0.09);
    assert!(below.score(&series).unwrap().verdict);
}

#[test]
fn test_custom_granularity_bounds() {
    let scorer = VisualPotentialScorer::new().with_granularity_bounds(2, 4);
    let score = scorer.score(&[1.0, 1.0, 1.0, 1.0]).unwrap();

    assert_eq!(score.granularity, Granularity::Fine);
    assert!(score.verdict);
}
