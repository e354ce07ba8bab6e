//! Property tests for quota rules, time parsing and slot ordering.

use std::str::FromStr;

use proptest::prelude::*;

use academy_backend::models::{
    slot_key_order, DayOfWeek, SlotKey, SubscriptionType, TimeRange, MAX_CUSTOM_SLOTS,
};

fn day_strategy() -> impl Strategy<Value = DayOfWeek> {
    prop::sample::select(DayOfWeek::ALL.to_vec())
}

fn time_range_strategy() -> impl Strategy<Value = TimeRange> {
    (0u16..(24 * 60 - 1)).prop_flat_map(|start| {
        ((start + 1)..=(24 * 60)).prop_map(move |end| TimeRange::new(start, end).unwrap())
    })
}

proptest! {
    #[test]
    fn half_hour_four_accepts_only_four(count in 0usize..20) {
        prop_assert_eq!(
            SubscriptionType::HalfHourFour.quota().accepts(count),
            count == 4
        );
    }

    #[test]
    fn custom_plan_bounds_hold(count in 0usize..100) {
        prop_assert_eq!(
            SubscriptionType::Custom.quota().accepts(count),
            (1..=MAX_CUSTOM_SLOTS).contains(&count)
        );
    }

    #[test]
    fn other_plan_accepts_everything(count in 0usize..1000) {
        prop_assert!(SubscriptionType::Other.quota().accepts(count));
    }

    #[test]
    fn time_range_display_parse_roundtrip(range in time_range_strategy()) {
        let parsed = TimeRange::from_str(&range.to_string()).unwrap();
        prop_assert_eq!(parsed, range);
    }

    #[test]
    fn slot_ordering_is_permutation_invariant(
        mut keys in prop::collection::vec((day_strategy(), time_range_strategy()), 1..12),
        seed in 0u64..1000
    ) {
        let mut sorted_once: Vec<SlotKey> = keys.clone();
        sorted_once.sort_by(slot_key_order);

        // Shuffle deterministically from the seed, then re-sort
        let len = keys.len();
        for i in 0..len {
            let j = ((seed as usize).wrapping_mul(31).wrapping_add(i * 7)) % len;
            keys.swap(i, j);
        }
        let mut sorted_twice = keys;
        sorted_twice.sort_by(slot_key_order);

        prop_assert_eq!(sorted_once, sorted_twice);
    }

    #[test]
    fn sorted_keys_ascend_by_day_then_start(
        mut keys in prop::collection::vec((day_strategy(), time_range_strategy()), 2..12)
    ) {
        keys.sort_by(slot_key_order);
        for pair in keys.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let a_rank = (a.0.index(), a.1.start_minutes());
            let b_rank = (b.0.index(), b.1.start_minutes());
            prop_assert!(a_rank <= b_rank);
        }
    }
}
