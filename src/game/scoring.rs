use std::time::Duration;

/// Smallest award for a correct answer. A correct answer in the last second
/// of the budget, or one landing after the deadline but before the timer
/// rotates the question, earns this instead of the 0 that whole remaining
/// seconds would give.
pub const MIN_POINTS: u64 = 1;

/// Points for a correct answer: whole seconds left in the question budget
pub fn points_for_answer(budget: Duration, elapsed: Duration) -> u64 {
    budget.saturating_sub(elapsed).as_secs().max(MIN_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 20)]
    #[case(999, 19)]
    #[case(1_000, 19)]
    #[case(4_500, 15)]
    #[case(18_000, 2)]
    #[case(19_500, 1)]
    #[case(20_000, 1)]
    #[case(45_000, 1)]
    fn test_points_decay_with_elapsed_time(#[case] elapsed_ms: u64, #[case] expected: u64) {
        let budget = Duration::from_secs(20);
        assert_eq!(
            points_for_answer(budget, Duration::from_millis(elapsed_ms)),
            expected
        );
    }
}
