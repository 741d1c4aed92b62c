use proptest::prelude::*;
use steady_model::ServiceName;

proptest! {
    #[test]
    fn prop_canonical_name_parses_back(
        segments in proptest::collection::vec("[a-zA-Z0-9_. \"\\\\-]{0,8}", 1..6)
    ) {
        let name = ServiceName::new(segments);
        let parsed = ServiceName::parse(&name.canonical_name()).unwrap();
        prop_assert_eq!(parsed, name);
    }

    #[test]
    fn prop_order_matches_canonical_strings(
        a in proptest::collection::vec("[a-z.]{1,4}", 1..4),
        b in proptest::collection::vec("[a-z.]{1,4}", 1..4),
    ) {
        let a = ServiceName::new(a);
        let b = ServiceName::new(b);
        prop_assert_eq!(a.cmp(&b), a.canonical_name().cmp(&b.canonical_name()));
    }
}
