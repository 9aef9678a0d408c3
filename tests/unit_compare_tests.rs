//! # Compare Module Unit Tests / Compare 模块单元测试
//!
//! Tests for the absolute/relative tolerance split.
//!
//! 绝对/相对容差策略的测试。

use regression_runner::compare::{
    all_passed, compare_values, rule_for, within_tolerance, ToleranceRule,
};

const TOL: f64 = 0.00001;

#[cfg(test)]
mod absolute_rule_tests {
    use super::*;

    #[test]
    fn test_zero_expected_within_tolerance() {
        assert!(within_tolerance(0.0, 0.000003, TOL));
    }

    #[test]
    fn test_zero_expected_beyond_tolerance() {
        assert!(!within_tolerance(0.0, 0.00002, TOL));
    }

    #[test]
    fn test_small_expected_uses_absolute_rule() {
        assert_eq!(rule_for(0.000004, TOL), ToleranceRule::Absolute);
        assert_eq!(rule_for(-0.000004, TOL), ToleranceRule::Absolute);
        // Relative error here is 2.25, yet the absolute difference is tiny.
        assert!(within_tolerance(0.000004, 0.000013, TOL));
        assert!(!within_tolerance(0.000004, 0.000015, TOL));
    }

    #[test]
    fn test_zero_tolerance_requires_exact_match() {
        assert_eq!(rule_for(0.0, 0.0), ToleranceRule::Absolute);
        assert!(within_tolerance(0.0, 0.0, 0.0));
        assert!(!within_tolerance(0.0, 1e-300, 0.0));
        assert!(within_tolerance(1.5, 1.5, 0.0));
        assert!(!within_tolerance(1.5, 1.5000001, 0.0));
    }
}

#[cfg(test)]
mod relative_rule_tests {
    use super::*;

    #[test]
    fn test_relative_within_tolerance() {
        assert_eq!(rule_for(-2.667326, TOL), ToleranceRule::Relative);
        assert!(within_tolerance(-2.667326, -2.667327, TOL));
    }

    #[test]
    fn test_relative_beyond_tolerance() {
        assert!(!within_tolerance(-2.667326, -2.67, TOL));
    }

    #[test]
    fn test_expected_equal_to_tolerance_is_relative() {
        assert_eq!(rule_for(TOL, TOL), ToleranceRule::Relative);
    }

    #[test]
    fn test_small_reference_is_sensitive() {
        // delta 3e-6 against 0.018717 is a relative error of about 1.6e-4
        assert!(!within_tolerance(0.018717, 0.018720, TOL));
    }

    #[test]
    fn test_nan_never_passes() {
        assert!(!within_tolerance(1.0, f64::NAN, TOL));
        assert!(!within_tolerance(0.0, f64::NAN, TOL));
    }
}

#[cfg(test)]
mod compare_values_tests {
    use super::*;

    #[test]
    fn test_all_pairs_evaluated_after_failure() {
        let expected = [1.0, 2.0, 3.0];
        let extracted = [5.0, 2.0, 3.5];
        let comparisons = compare_values(&expected, &extracted, TOL);

        assert_eq!(comparisons.len(), 3);
        assert!(!comparisons[0].passed);
        assert!(comparisons[1].passed);
        assert!(!comparisons[2].passed);
        assert_eq!(comparisons[0].delta, 4.0);
        assert_eq!(comparisons[2].delta, 0.5);
        assert!(!all_passed(&comparisons));
    }

    #[test]
    fn test_matching_sequences_pass() {
        let values = [-2.667326, 2.797439, 0.018717, 0.006906];
        let comparisons = compare_values(&values, &values, TOL);

        assert!(all_passed(&comparisons));
        assert!(comparisons.iter().all(|c| c.delta == 0.0));
        assert!(comparisons.iter().all(|c| c.rule == ToleranceRule::Relative));
    }

    #[test]
    fn test_empty_sequences_pass() {
        assert!(all_passed(&compare_values(&[], &[], TOL)));
    }
}
