use proptest::prelude::*;

use typer_backend_rust::services::points::{ScorePolicy, SessionMetrics};

fn metrics(wpm: f64, accuracy: f64, correct_chars: i64) -> SessionMetrics {
    SessionMetrics {
        wpm,
        accuracy,
        correct_chars,
    }
}

proptest! {
    #[test]
    fn below_threshold_always_scores_zero(
        wpm in 0.0..300.0f64,
        accuracy in 0.0..80.0f64,
        correct_chars in 0i64..10_000,
    ) {
        let policy = ScorePolicy::default();
        prop_assert_eq!(policy.score(&metrics(wpm, accuracy, correct_chars)), 0);
    }

    #[test]
    fn score_is_deterministic(
        wpm in 0.0..300.0f64,
        accuracy in 0.0..100.0f64,
        correct_chars in 0i64..10_000,
    ) {
        let policy = ScorePolicy::default();
        let m = metrics(wpm, accuracy, correct_chars);
        prop_assert_eq!(policy.score(&m), policy.score(&m));
    }

    #[test]
    fn score_is_never_negative(
        wpm in 0.0..1_000.0f64,
        accuracy in 0.0..100.0f64,
        correct_chars in 0i64..100_000,
    ) {
        let policy = ScorePolicy::default();
        prop_assert!(policy.score(&metrics(wpm, accuracy, correct_chars)) >= 0);
    }

    #[test]
    fn score_is_monotone_in_correct_chars(
        wpm in 0.0..300.0f64,
        accuracy in 80.0..100.0f64,
        a in 0i64..5_000,
        b in 0i64..5_000,
    ) {
        let policy = ScorePolicy::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            policy.score(&metrics(wpm, accuracy, lo)) <= policy.score(&metrics(wpm, accuracy, hi))
        );
    }

    #[test]
    fn score_is_monotone_in_wpm(
        a in 0.0..300.0f64,
        b in 0.0..300.0f64,
        accuracy in 80.0..100.0f64,
        correct_chars in 0i64..5_000,
    ) {
        let policy = ScorePolicy::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            policy.score(&metrics(lo, accuracy, correct_chars))
                <= policy.score(&metrics(hi, accuracy, correct_chars))
        );
    }
}
