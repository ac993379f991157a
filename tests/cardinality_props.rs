//! Property tests of cardinality simplification

use idspec::Cardinality;
use proptest::prelude::*;

fn any_cardinality() -> impl Strategy<Value = Cardinality> {
    prop_oneof![
        Just(Cardinality::optional()),
        Just(Cardinality::required()),
        Just(Cardinality::prohibited()),
        (0u32..50, proptest::option::of(0u32..50))
            .prop_filter("max below min", |(min, max)| max.map_or(true, |m| m >= *min))
            .prop_map(|(min, max)| Cardinality::min_max(min, max)),
    ]
}

proptest! {
    #[test]
    fn simplify_is_idempotent(card in any_cardinality()) {
        let once = card.simplify();
        prop_assert_eq!(once.simplify(), once);
    }

    #[test]
    fn simplify_keeps_the_bounds(card in any_cardinality()) {
        prop_assert!(card.simplify().equivalent(&card));
        prop_assert_eq!(card.simplify().to_min_max(), card.to_min_max());
    }

    #[test]
    fn allows_follows_the_bounds(card in any_cardinality(), count in 0u32..60) {
        let bounds = card.to_min_max();
        let expected = count >= bounds.min_occurs && bounds.max_occurs.map_or(true, |m| count <= m);
        prop_assert_eq!(card.allows(count), expected);
    }
}

#[test]
fn test_named_forms() {
    assert_eq!(Cardinality::min_max(0, None).simplify(), Cardinality::optional());
    assert_eq!(Cardinality::min_max(1, None).simplify(), Cardinality::required());
    assert_eq!(Cardinality::min_max(0, Some(0)).simplify(), Cardinality::prohibited());
    assert_eq!(Cardinality::min_max(1, Some(1)).simplify(), Cardinality::min_max(1, Some(1)));
}
