//! Property tests for entity handling, type paths, and map merging.

use proptest::prelude::*;
use traitdex_core::{entity, Implementor, ImplementorMap, TypePath};

proptest! {
    /// Escaping then unescaping any text is the identity.
    #[test]
    fn entity_round_trip(text in "\\PC{0,200}") {
        let escaped = entity::escape(&text);
        prop_assert_eq!(entity::unescape(&escaped).unwrap(), text);
    }

    /// Escaped output never contains a bare markup-significant character.
    #[test]
    fn escape_removes_markup_chars(text in "\\PC{0,200}") {
        let escaped = entity::escape(&text);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
    }

    /// Well-formed paths survive a parse round trip.
    #[test]
    fn type_path_round_trip(
        segments in prop::collection::vec("[a-zA-Z_][a-zA-Z0-9_]{0,12}", 1..5)
    ) {
        let raw = segments.join("::");
        let path = TypePath::parse(raw.clone()).unwrap();
        prop_assert_eq!(path.as_str(), raw.as_str());
        prop_assert_eq!(path.segments().count(), segments.len());
        prop_assert_eq!(path.crate_name(), segments[0].as_str());
        prop_assert_eq!(path.item_name(), segments[segments.len() - 1].as_str());
    }

    /// Merging a map into an empty map preserves it exactly.
    #[test]
    fn merge_into_empty_is_identity(
        crates in prop::collection::btree_map(
            "[a-z_][a-z0-9_]{0,10}",
            prop::collection::vec(("impl .{0,20}", any::<bool>()), 0..3),
            0..4,
        )
    ) {
        let mut source = ImplementorMap::new();
        for (name, records) in &crates {
            let records = records
                .iter()
                .map(|(text, synthetic)| {
                    Implementor::new(text.clone(), *synthetic, vec![TypePath::new(format!("{name}::T"))])
                })
                .collect();
            source.insert(name.clone(), records);
        }
        let mut target = ImplementorMap::new();
        target.merge(source.clone()).unwrap();
        prop_assert_eq!(target, source);
    }
}
