use cim_traits::{Registry, TypeBuilder};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn composite_ids_strictly_increase(count in 1usize..32) {
        let registry = Registry::new();
        let base = TypeBuilder::new("Base").build();
        let ids: Vec<u64> = (0..count)
            .map(|_| registry.basing(&base).unwrap().id().as_u64())
            .collect();
        let expected: Vec<u64> = (0..count as u64).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn trait_state_is_independent(values in proptest::collection::vec(any::<i64>(), 2..16)) {
        let registry = Registry::new();
        let base = TypeBuilder::new("Base").build();
        let counter = TypeBuilder::new("Counter").field("count", 0).build();
        let composite = registry.basing(&base).unwrap().with([&counter]).unwrap();

        let mut instances: Vec<_> = values
            .iter()
            .map(|_| composite.construct(&[]).unwrap())
            .collect();
        for (instance, value) in instances.iter_mut().zip(&values) {
            instance.set("count", *value).unwrap();
        }
        for (instance, value) in instances.iter().zip(&values) {
            prop_assert_eq!(instance.get("count").unwrap(), json!(*value));
        }
    }

    #[test]
    fn disjoint_traits_expose_every_member(count in 1usize..8) {
        let registry = Registry::new();
        let base = TypeBuilder::new("Base").field("base", true).build();
        let traits: Vec<_> = (0..count)
            .map(|i| {
                TypeBuilder::new(format!("T{i}"))
                    .field(format!("field{i}"), i as u64)
                    .method(format!("method{i}"), move |_, _| Ok(json!(i)))
                    .build()
            })
            .collect();

        let composite = registry.basing(&base).unwrap().with(&traits).unwrap();
        let mut instance = composite.construct(&[]).unwrap();

        prop_assert!(instance.has_own("base"));
        for i in 0..count {
            prop_assert_eq!(instance.get(&format!("field{i}")).unwrap(), json!(i));
            prop_assert_eq!(instance.call(&format!("method{i}"), &[]).unwrap(), json!(i));
        }
    }
}
