// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Pipeline Laws
//!
//! These tests prove that pipelines behave exactly like the equivalent
//! eager computations over plain vectors and values, for all inputs.

use cim_reactive::{FlowError, Sequence, SingleValue};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate a list of elements, empty lists included
fn elements() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1000i64..1000, 0..40)
}

/// Drain a sequence through a blocking collect
fn drain(sequence: &Sequence<i64>) -> Vec<i64> {
    sequence.collect_list().block().expect("untimed sequence completes")
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: A held value is returned unchanged
    #[test]
    fn prop_of_block_returns_value(value in any::<i64>()) {
        prop_assert_eq!(SingleValue::of(value).block().unwrap(), value);
    }

    /// Property: Mapping a single value equals applying the function
    #[test]
    fn prop_single_map_applies_function(value in -1_000_000i64..1_000_000) {
        let f = |x: i64| x * 3 - 7;
        prop_assert_eq!(SingleValue::of(value).map(f).block().unwrap(), f(value));
    }

    /// Property: A rejecting filter always yields EmptyValue
    #[test]
    fn prop_rejected_single_is_empty(value in any::<i64>()) {
        let result = SingleValue::of(value).filter(move |x| *x != value).block();
        prop_assert!(matches!(result, Err(FlowError::EmptyValue)));
    }

    /// Property: Subscribing replays the source in order
    #[test]
    fn prop_sequence_preserves_order(items in elements()) {
        prop_assert_eq!(drain(&Sequence::of(items.clone())), items);
    }

    /// Property: map identity
    ///
    /// `sequence.map(|x| x) == sequence`
    #[test]
    fn prop_map_identity(items in elements()) {
        let sequence = Sequence::of(items.clone());
        prop_assert_eq!(drain(&sequence.map(|x| x)), items);
    }

    /// Property: map composition
    ///
    /// `sequence.map(f).map(g) == sequence.map(|x| g(f(x)))`
    #[test]
    fn prop_map_composition(items in elements()) {
        let sequence = Sequence::of(items);
        let chained = sequence.map(|x| x + 1).map(|x| x * 2);
        let fused = sequence.map(|x| (x + 1) * 2);

        prop_assert_eq!(drain(&chained), drain(&fused));
    }

    /// Property: filter matches Vec filtering, order included
    #[test]
    fn prop_filter_matches_vec(items in elements()) {
        let expected: Vec<i64> = items.iter().copied().filter(|x| x % 3 == 0).collect();
        let filtered = Sequence::of(items).filter(|x| x % 3 == 0);

        prop_assert_eq!(drain(&filtered), expected);
    }

    /// Property: consecutive filters fuse
    ///
    /// `sequence.filter(p).filter(q) == sequence.filter(|x| p(x) && q(x))`
    #[test]
    fn prop_filter_fusion(items in elements()) {
        let sequence = Sequence::of(items);
        let chained = sequence.filter(|x| *x > 0).filter(|x| x % 2 == 0);
        let fused = sequence.filter(|x| *x > 0 && x % 2 == 0);

        prop_assert_eq!(drain(&chained), drain(&fused));
    }

    /// Property: take yields the prefix
    #[test]
    fn prop_take_is_prefix(items in elements(), count in 0usize..50) {
        let expected: Vec<i64> = items.iter().copied().take(count).collect();
        prop_assert_eq!(drain(&Sequence::of(items).take(count)), expected);
    }

    /// Property: count equals length, first and last match the ends
    #[test]
    fn prop_count_first_last(items in elements()) {
        let sequence = Sequence::of(items.clone());

        prop_assert_eq!(sequence.count().block().unwrap(), items.len());
        prop_assert_eq!(sequence.next().block_optional().unwrap(), items.first().copied());
        prop_assert_eq!(sequence.last().block_optional().unwrap(), items.last().copied());
    }

    /// Property: sources are cold
    ///
    /// Subscribing twice observes the same elements twice.
    #[test]
    fn prop_cold_replay(items in elements()) {
        let sequence = Sequence::of(items).map(|x| x - 1);
        prop_assert_eq!(drain(&sequence), drain(&sequence));
    }
}
