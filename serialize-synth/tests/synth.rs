// This file is part of eventide-typegen.
// Copyright (C) 2025 Eventide Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//#![deny(warnings)]

#[cfg(test)]
mod tests {
    use eventide_serialize_synth::*;
    use paste::paste;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn int() -> TypeDescriptor {
        TypeDescriptor::named("Int")
    }

    fn long() -> TypeDescriptor {
        TypeDescriptor::named("Long")
    }

    fn text(max_chars: u32) -> TypeDescriptor {
        TypeDescriptor::named("Text").with_annotation(Annotation::Encoding {
            kind: EncodingKind::Utf8,
            max_chars: Some(max_chars),
        })
    }

    fn bytes(max_size: u32) -> TypeDescriptor {
        TypeDescriptor::named("Bytes").with_annotation(Annotation::MaxSize { size: max_size })
    }

    fn decimal(integer: u32, fraction: u32) -> TypeDescriptor {
        TypeDescriptor::named("Decimal").with_annotation(Annotation::Digits { integer, fraction })
    }

    fn character(kind: EncodingKind) -> TypeDescriptor {
        TypeDescriptor::named("Char").with_annotation(Annotation::Encoding {
            kind,
            max_chars: None,
        })
    }

    fn list(element: TypeDescriptor, max_size: u32) -> TypeDescriptor {
        TypeDescriptor::named("List")
            .with_argument(element)
            .with_annotation(Annotation::MaxSize { size: max_size })
    }

    fn set(element: TypeDescriptor, max_size: u32) -> TypeDescriptor {
        TypeDescriptor::named("Set")
            .with_argument(element)
            .with_annotation(Annotation::MaxSize { size: max_size })
    }

    fn map(key: TypeDescriptor, value: TypeDescriptor, max_size: u32) -> TypeDescriptor {
        TypeDescriptor::named("Map")
            .with_argument(key)
            .with_argument(value)
            .with_annotation(Annotation::MaxSize { size: max_size })
    }

    fn converted_instant() -> TypeDescriptor {
        TypeDescriptor::named("Instant").with_annotation(Annotation::Via {
            provider: "conv::AsMillis".to_owned(),
            surrogate: "Millis".to_owned(),
        })
    }

    #[test]
    fn list_of_int_synthesizes_two_declarations() {
        let (root, declarations) = synthesize("Param", &list(int(), 5)).unwrap();
        assert_eq!(root, "Param_0");
        assert_eq!(
            declarations,
            vec!["type Param_0 = FixedList<Param_1, 5>;", "type Param_1 = FixedInt;"]
        );
    }

    #[test]
    fn map_key_and_value_open_distinct_buckets() {
        let (root, declarations) = synthesize("M", &map(int(), int(), 3)).unwrap();
        assert_eq!(root, "M_0");
        assert_eq!(
            declarations,
            vec![
                "type M_0 = FixedMap<M_0_A_0, M_0_B_0, 3>;",
                "type M_0_A_0 = FixedInt;",
                "type M_0_B_0 = FixedInt;",
            ]
        );
    }

    #[test]
    fn single_child_nesting_advances_the_trailing_coordinate() {
        let (root, declarations) = synthesize("Param", &list(list(int(), 2), 4)).unwrap();
        assert_eq!(root, "Param_0");
        assert_eq!(
            declarations,
            vec![
                "type Param_0 = FixedList<Param_1, 4>;",
                "type Param_1 = FixedList<Param_2, 2>;",
                "type Param_2 = FixedInt;",
            ]
        );
    }

    #[test]
    fn nested_maps_nest_their_buckets() {
        let descriptor = map(text(8), map(int(), long(), 2), 4);
        let (root, declarations) = synthesize("Ledger", &descriptor).unwrap();
        assert_eq!(root, "Ledger_0");
        assert_eq!(
            declarations,
            vec![
                "type Ledger_0 = FixedMap<Ledger_0_A_0, Ledger_0_B_0, 4>;",
                "type Ledger_0_A_0 = FixedText<Utf8, 8>;",
                "type Ledger_0_B_0 = FixedMap<Ledger_0_B_0_A_0, Ledger_0_B_0_B_0, 2>;",
                "type Ledger_0_B_0_A_0 = FixedInt;",
                "type Ledger_0_B_0_B_0 = FixedLong;",
            ]
        );
    }

    #[test]
    fn scalar_shapes_emit_their_fixed_wrappers() {
        for (descriptor, declaration) in [
            (TypeDescriptor::named("Bool"), "type F_0 = FixedBool;"),
            (int(), "type F_0 = FixedInt;"),
            (long(), "type F_0 = FixedLong;"),
            (character(EncodingKind::Ascii), "type F_0 = FixedChar<Ascii>;"),
            (character(EncodingKind::Utf32), "type F_0 = FixedChar<Utf32>;"),
            (bytes(64), "type F_0 = FixedBytes<64>;"),
            (decimal(10, 2), "type F_0 = FixedDecimal<10, 2>;"),
        ] {
            let (root, declarations) = synthesize("F", &descriptor).unwrap();
            assert_eq!(root, "F_0");
            assert_eq!(declarations, vec![declaration]);
        }
    }

    #[test]
    fn sets_share_the_list_layout_under_their_own_wrapper() {
        let (_, declarations) = synthesize("Peers", &set(text(16), 8)).unwrap();
        assert_eq!(
            declarations,
            vec![
                "type Peers_0 = FixedSet<Peers_1, 8>;",
                "type Peers_1 = FixedText<Utf8, 16>;",
            ]
        );
    }

    #[test]
    fn nullable_scalars_wrap_an_option_without_a_provider() {
        let (root, declarations) = synthesize("Amount", &long().nullable()).unwrap();
        assert_eq!(root, "Amount_0");
        assert_eq!(
            declarations,
            vec![
                "type Amount_0 = FixedOption<Amount_1>;",
                "type Amount_1 = FixedLong;",
            ]
        );
    }

    #[test]
    fn nullable_collections_use_their_empty_padded_filler() {
        let (_, declarations) = synthesize("Tags", &list(int(), 2).nullable()).unwrap();
        assert_eq!(
            declarations,
            vec![
                "type Tags_0 = FixedOption<Tags_1>;",
                "type Tags_1 = FixedList<Tags_2, 2>;",
                "type Tags_2 = FixedInt;",
            ]
        );
    }

    #[test]
    fn nullable_foreign_types_default_before_wrapping() {
        let descriptor = TypeDescriptor::named("Instant")
            .with_annotation(Annotation::Default {
                provider: "defaults::Epoch".to_owned(),
            })
            .nullable();
        let (root, declarations) = synthesize("Seen", &descriptor).unwrap();
        assert_eq!(root, "Seen_0");
        assert_eq!(
            declarations,
            vec![
                "type Seen_0 = FixedOption<Seen_1>;",
                "type Seen_1 = FixedDefault<Seen_2, defaults::Epoch>;",
                "type Seen_2 = InstantSerializer;",
            ]
        );
    }

    #[test]
    fn converted_foreign_types_delegate_through_their_provider() {
        let (_, declarations) = synthesize("Stamp", &converted_instant()).unwrap();
        assert_eq!(
            declarations,
            vec!["type Stamp_0 = FixedVia<MillisSerializer, conv::AsMillis>;"]
        );
    }

    #[test]
    fn nullable_converted_foreign_types_reuse_the_conversion_default() {
        let (_, declarations) = synthesize("Stamp", &converted_instant().nullable()).unwrap();
        assert_eq!(
            declarations,
            vec![
                "type Stamp_0 = FixedOption<Stamp_1>;",
                "type Stamp_1 = FixedDefault<Stamp_2, conv::AsMillis>;",
                "type Stamp_2 = FixedVia<MillisSerializer, conv::AsMillis>;",
            ]
        );
    }

    #[test]
    fn self_describing_foreign_types_are_referenced_by_name() {
        let (_, declarations) =
            synthesize("Owner", &TypeDescriptor::named("AccountRef")).unwrap();
        assert_eq!(declarations, vec!["type Owner_0 = AccountRefSerializer;"]);
    }

    #[test]
    fn nullable_self_describing_foreign_types_need_a_provider() {
        let error = synthesize("Seen", &TypeDescriptor::named("Instant").nullable()).unwrap_err();
        assert_eq!(
            error,
            SynthesisError::MissingDefaultProvider {
                source: "Instant?".to_owned(),
            }
        );
    }

    macro_rules! missing_annotation_test {
        ($name:ident, $descriptor:expr, $category:expr) => {
            paste! {
                #[test]
                fn [<missing_annotation_for_ $name>]() {
                    match synthesize("Field", &$descriptor) {
                        Err(SynthesisError::MissingAnnotation { category, .. }) => {
                            assert_eq!(category, $category)
                        }
                        other => panic!("expected a missing annotation failure, got {other:?}"),
                    }
                }
            }
        };
    }

    missing_annotation_test!(
        list,
        TypeDescriptor::named("List").with_argument(int()),
        ShapeCategory::List
    );
    missing_annotation_test!(
        set,
        TypeDescriptor::named("Set").with_argument(int()),
        ShapeCategory::Set
    );
    missing_annotation_test!(
        map,
        TypeDescriptor::named("Map").with_argument(int()).with_argument(int()),
        ShapeCategory::Map
    );
    missing_annotation_test!(bytes, TypeDescriptor::named("Bytes"), ShapeCategory::Bytes);
    missing_annotation_test!(char, TypeDescriptor::named("Char"), ShapeCategory::Char);
    missing_annotation_test!(
        variable_width_char,
        TypeDescriptor::named("Char").with_annotation(Annotation::Encoding {
            kind: EncodingKind::Utf8,
            max_chars: None,
        }),
        ShapeCategory::Char
    );
    missing_annotation_test!(text, TypeDescriptor::named("Text"), ShapeCategory::Text);
    missing_annotation_test!(
        unbounded_text,
        TypeDescriptor::named("Text").with_annotation(Annotation::Encoding {
            kind: EncodingKind::Utf8,
            max_chars: None,
        }),
        ShapeCategory::Text
    );
    missing_annotation_test!(decimal, TypeDescriptor::named("Decimal"), ShapeCategory::Decimal);

    #[test]
    fn diagnostics_quote_the_offending_source_form() {
        let error = synthesize("Field", &TypeDescriptor::named("List").with_argument(int()))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "list type `List<Int>` requires a max_size annotation"
        );

        let error = synthesize("Field", &TypeDescriptor::named("Instant").nullable())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "`Instant?` has no usable default; add a default annotation or a conversion \
             provider that carries one"
        );
    }

    #[test]
    fn double_wrapping_nullability_is_rejected() {
        let descriptor = int().nullable();
        let already_nullable = resolve(&descriptor).unwrap();
        assert!(matches!(
            wrap_null(already_nullable, &descriptor),
            Err(SynthesisError::DoubleWrap { .. })
        ));
    }

    #[test]
    fn nested_failures_yield_no_partial_declarations() {
        let unbounded_value = map(int(), TypeDescriptor::named("Text"), 3);
        assert!(matches!(
            synthesize("State", &unbounded_value),
            Err(SynthesisError::MissingAnnotation {
                category: ShapeCategory::Text,
                ..
            })
        ));
    }

    #[test]
    fn synthesis_output_is_byte_identical_across_runs() {
        let descriptor = map(text(8), list(converted_instant().nullable(), 5), 7).nullable();
        let first = synthesize("State", &descriptor).unwrap();
        let second = synthesize("State", &descriptor).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn parallel_synthesis_matches_the_serial_result() {
        let descriptor = map(text(8), list(long().nullable(), 5), 7);
        let baseline = synthesize("State", &descriptor).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let descriptor = descriptor.clone();
                std::thread::spawn(move || synthesize("State", &descriptor).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), baseline);
        }
    }

    #[test]
    fn loaded_dumps_synthesize_like_handwritten_descriptors() {
        let dump = r#"{
            "version": {"major": 1, "minor": 0},
            "name": "Map",
            "annotations": [{"annotation": "max_size", "size": 3}],
            "arguments": [
                {
                    "name": "Text",
                    "annotations": [{"annotation": "encoding", "kind": "utf8", "max_chars": 8}]
                },
                {"name": "Int", "nullable": true}
            ]
        }"#;
        let loaded = TypeDescriptor::load(dump.as_bytes()).unwrap();
        assert_eq!(
            synthesize("Balances", &loaded).unwrap(),
            synthesize("Balances", &map(text(8), int().nullable(), 3)).unwrap()
        );
    }

    fn declared_identifier(declaration: &str) -> &str {
        declaration
            .strip_prefix("type ")
            .and_then(|rest| rest.split_once(" = "))
            .map(|(identifier, _)| identifier)
            .unwrap_or_else(|| panic!("malformed declaration: {declaration}"))
    }

    /// Clears the annotations of the preorder `target`-th descriptor node.
    fn strip_annotations_at(descriptor: &mut TypeDescriptor, target: usize) {
        fn walk(descriptor: &mut TypeDescriptor, index: &mut usize, target: usize) -> bool {
            if *index == target {
                descriptor.annotations.clear();
                return true;
            }
            *index += 1;
            descriptor
                .arguments
                .iter_mut()
                .any(|argument| walk(argument, index, target))
        }
        let mut index = 0;
        walk(descriptor, &mut index, target);
    }

    fn node_count(descriptor: &TypeDescriptor) -> usize {
        1 + descriptor.arguments.iter().map(node_count).sum::<usize>()
    }

    proptest! {
        #[test]
        fn synthesis_is_deterministic(descriptor in any::<TypeDescriptor>()) {
            prop_assert_eq!(
                synthesize("Field", &descriptor),
                synthesize("Field", &descriptor)
            );
        }

        #[test]
        fn identifiers_within_a_declaration_set_never_collide(
            descriptor in any::<TypeDescriptor>(),
        ) {
            let (root, declarations) = synthesize("Field", &descriptor).unwrap();
            let identifiers: HashSet<&str> =
                declarations.iter().map(|declaration| declared_identifier(declaration)).collect();
            prop_assert_eq!(identifiers.len(), declarations.len());
            prop_assert!(identifiers.contains(root.as_str()));
        }

        #[test]
        fn stripping_annotations_fails_cleanly_or_keeps_identifiers_unique(
            descriptor in any::<TypeDescriptor>(),
            seed in any::<u64>(),
        ) {
            let mut corrupted = descriptor;
            let target = StdRng::seed_from_u64(seed).gen_range(0..node_count(&corrupted));
            strip_annotations_at(&mut corrupted, target);
            match synthesize("Field", &corrupted) {
                Ok((_, declarations)) => {
                    let identifiers: HashSet<&str> = declarations
                        .iter()
                        .map(|declaration| declared_identifier(declaration))
                        .collect();
                    prop_assert_eq!(identifiers.len(), declarations.len());
                }
                Err(error) => prop_assert!(!error.to_string().is_empty()),
            }
        }

        #[test]
        fn annotations_round_trip_through_json(annotation in any::<Annotation>()) {
            let encoded = serde_json::to_string(&annotation).unwrap();
            let decoded: Annotation = serde_json::from_str(&encoded).unwrap();
            prop_assert_eq!(annotation, decoded);
        }
    }
}
