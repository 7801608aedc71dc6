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

//! The declared-type descriptions consumed by the synthesis engine.
//!
//! A [`TypeDescriptor`] is what the host toolchain's introspection reports
//! for one field occurrence: the erased type name, its ordered type
//! arguments, whether the occurrence is nullable, and the recognized
//! annotations attached to it. Descriptors are inputs only; the engine never
//! mutates them.

use itertools::Itertools;
#[cfg(feature = "proptest")]
use proptest::strategy::{NewTree, Strategy, ValueTree};
#[cfg(feature = "proptest")]
use proptest::test_runner::TestRunner;
#[cfg(feature = "proptest")]
use proptest_derive::Arbitrary;
#[cfg(feature = "proptest")]
use rand::Rng;
#[cfg(feature = "proptest")]
use rand::distributions::{Distribution, Standard};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::io::{self, Read};

/// A character encoding a `Char` or `Text` occurrence is pinned to.
#[cfg_attr(feature = "proptest", derive(Arbitrary))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    Ascii,
    Utf8,
    Utf16,
    Utf32,
}

impl EncodingKind {
    /// The encoding marker spliced into emitted declarations.
    pub(crate) fn marker(self) -> &'static str {
        match self {
            EncodingKind::Ascii => "Ascii",
            EncodingKind::Utf8 => "Utf8",
            EncodingKind::Utf16 => "Utf16",
            EncodingKind::Utf32 => "Utf32",
        }
    }
}

impl Display for EncodingKind {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let name = match self {
            EncodingKind::Ascii => "ascii",
            EncodingKind::Utf8 => "utf8",
            EncodingKind::Utf16 => "utf16",
            EncodingKind::Utf32 => "utf32",
        };
        write!(formatter, "{name}")
    }
}

/// One recognized annotation attached to a declared type occurrence.
///
/// The set is closed: introspection drops anything it does not recognize
/// before the descriptor reaches this crate.
#[cfg_attr(feature = "proptest", derive(Arbitrary))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "annotation")]
pub enum Annotation {
    /// Fixes a collection's padded capacity.
    MaxSize { size: u32 },
    /// Pins a character encoding; the `Text` form also fixes the padded
    /// character count.
    Encoding {
        kind: EncodingKind,
        #[serde(default)]
        max_chars: Option<u32>,
    },
    /// Fixes a decimal's digit counts on each side of the point.
    Digits { integer: u32, fraction: u32 },
    /// Names the provider of the filler value used when defaulting is
    /// required.
    Default { provider: String },
    /// Names a surrogate type and the bidirectional conversion provider
    /// through which a third-party type is serialized.
    Via { provider: String, surrogate: String },
}

impl Display for Annotation {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            Annotation::MaxSize { size } => write!(formatter, "max_size({size})"),
            Annotation::Encoding {
                kind,
                max_chars: Some(max_chars),
            } => write!(formatter, "encoding({kind}, {max_chars})"),
            Annotation::Encoding {
                kind,
                max_chars: None,
            } => write!(formatter, "encoding({kind})"),
            Annotation::Digits { integer, fraction } => {
                write!(formatter, "digits({integer}, {fraction})")
            }
            Annotation::Default { provider } => write!(formatter, "default({provider})"),
            Annotation::Via {
                provider,
                surrogate,
            } => write!(formatter, "via({provider}, {surrogate})"),
        }
    }
}

/// The declared shape of one type occurrence.
///
/// Nullability arrives pre-normalized: the surface language spells it `T?`
/// on the occurrence itself, so nested nullability is not representable
/// here and a descriptor is its own nullability marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// The erased (clean) type name as written in the surface language.
    pub name: String,
    /// Ordered type arguments, such as a list's element or a map's key and
    /// value.
    #[serde(default)]
    pub arguments: Vec<TypeDescriptor>,
    /// Whether this occurrence is nullable.
    #[serde(default)]
    pub nullable: bool,
    /// Recognized annotations, in declaration order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Deserialize)]
struct SerdeVersion {
    major: u8,
    minor: u8,
}

impl TypeDescriptor {
    /// A bare descriptor carrying nothing but a name.
    pub fn named(name: &str) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_owned(),
            arguments: Vec::new(),
            nullable: false,
            annotations: Vec::new(),
        }
    }

    /// This descriptor with one more type argument appended.
    pub fn with_argument(mut self, argument: TypeDescriptor) -> TypeDescriptor {
        self.arguments.push(argument);
        self
    }

    /// This descriptor with one more annotation appended.
    pub fn with_annotation(mut self, annotation: Annotation) -> TypeDescriptor {
        self.annotations.push(annotation);
        self
    }

    /// This descriptor marked nullable.
    pub fn nullable(mut self) -> TypeDescriptor {
        self.nullable = true;
        self
    }

    /// Reads a descriptor from the dump the host toolchain's introspection
    /// emits: a JSON object carrying the descriptor fields next to a
    /// `version` entry. Only version 1.0 dumps are accepted.
    pub fn load<R: Read>(reader: R) -> io::Result<TypeDescriptor> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        match &value {
            serde_json::Value::Object(entries) => {
                let version = serde_json::from_value(
                    entries
                        .get("version")
                        .ok_or(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "Expected a version entry",
                        ))?
                        .clone(),
                )?;
                match version {
                    SerdeVersion { major: 1, minor: 0 } => Ok(serde_json::from_value(value)?),
                    SerdeVersion { major, minor } => Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Unsupported descriptor version: {major}.{minor}"),
                    )),
                }
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Expected a JSON object",
            )),
        }
    }

    /// The first max-size annotation, if any.
    pub fn max_size(&self) -> Option<u32> {
        self.annotations.iter().find_map(|annotation| match annotation {
            Annotation::MaxSize { size } => Some(*size),
            _ => None,
        })
    }

    /// The first digit-count annotation, if any.
    pub fn digits(&self) -> Option<(u32, u32)> {
        self.annotations.iter().find_map(|annotation| match annotation {
            Annotation::Digits { integer, fraction } => Some((*integer, *fraction)),
            _ => None,
        })
    }

    /// The first default-provider annotation, if any.
    pub fn default_provider(&self) -> Option<&str> {
        self.annotations.iter().find_map(|annotation| match annotation {
            Annotation::Default { provider } => Some(provider.as_str()),
            _ => None,
        })
    }

    /// The first conversion annotation, if any, as `(provider, surrogate)`.
    pub fn conversion(&self) -> Option<(&str, &str)> {
        self.annotations.iter().find_map(|annotation| match annotation {
            Annotation::Via {
                provider,
                surrogate,
            } => Some((provider.as_str(), surrogate.as_str())),
            _ => None,
        })
    }

    /// Every encoding annotation on this occurrence, in declaration order.
    pub(crate) fn encodings(&self) -> Vec<(EncodingKind, Option<u32>)> {
        self.annotations
            .iter()
            .filter_map(|annotation| match annotation {
                Annotation::Encoding { kind, max_chars } => Some((*kind, *max_chars)),
                _ => None,
            })
            .collect()
    }

    /// The structural source form, such as `Map<Text, Int>?`.
    pub fn render(&self) -> String {
        let mut rendered = self.name.clone();
        if !self.arguments.is_empty() {
            rendered.push('<');
            rendered.push_str(&self.arguments.iter().map(TypeDescriptor::render).join(", "));
            rendered.push('>');
        }
        if self.nullable {
            rendered.push('?');
        }
        rendered
    }

    /// The annotated source form quoted by diagnostics, such as
    /// `List<Int> [max_size(5)]`.
    pub fn source(&self) -> String {
        if self.annotations.is_empty() {
            self.render()
        } else {
            format!("{} [{}]", self.render(), self.annotations.iter().join(", "))
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.source())
    }
}

#[cfg(feature = "proptest")]
impl Distribution<EncodingKind> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EncodingKind {
        match rng.gen_range(0..4) {
            0 => EncodingKind::Ascii,
            1 => EncodingKind::Utf8,
            2 => EncodingKind::Utf16,
            _ => EncodingKind::Utf32,
        }
    }
}

#[cfg(feature = "proptest")]
impl Distribution<TypeDescriptor> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TypeDescriptor {
        sample_well_formed(rng, 3)
    }
}

/// Samples a descriptor the engine is expected to accept, recursing at most
/// `depth` levels below collection shapes.
#[cfg(feature = "proptest")]
fn sample_well_formed<R: Rng + ?Sized>(rng: &mut R, depth: u32) -> TypeDescriptor {
    let shapes = if depth == 0 { 8 } else { 11 };
    let descriptor = match rng.gen_range(0..shapes) {
        0 => TypeDescriptor::named("Bool"),
        1 => TypeDescriptor::named("Int"),
        2 => TypeDescriptor::named("Long"),
        3 => TypeDescriptor::named("Char").with_annotation(Annotation::Encoding {
            kind: if rng.gen_bool(0.5) {
                EncodingKind::Ascii
            } else {
                EncodingKind::Utf32
            },
            max_chars: None,
        }),
        4 => TypeDescriptor::named("Text").with_annotation(Annotation::Encoding {
            kind: rng.r#gen(),
            max_chars: Some(rng.gen_range(1..=64)),
        }),
        5 => TypeDescriptor::named("Bytes").with_annotation(Annotation::MaxSize {
            size: rng.gen_range(1..=64),
        }),
        6 => TypeDescriptor::named("Decimal").with_annotation(Annotation::Digits {
            integer: rng.gen_range(1..=18),
            fraction: rng.gen_range(0..=8),
        }),
        7 => sample_foreign(rng),
        8 => TypeDescriptor::named("List")
            .with_argument(sample_well_formed(rng, depth - 1))
            .with_annotation(Annotation::MaxSize {
                size: rng.gen_range(1..=16),
            }),
        9 => TypeDescriptor::named("Set")
            .with_argument(sample_well_formed(rng, depth - 1))
            .with_annotation(Annotation::MaxSize {
                size: rng.gen_range(1..=16),
            }),
        _ => TypeDescriptor::named("Map")
            .with_argument(sample_well_formed(rng, depth - 1))
            .with_argument(sample_well_formed(rng, depth - 1))
            .with_annotation(Annotation::MaxSize {
                size: rng.gen_range(1..=16),
            }),
    };
    if rng.gen_bool(0.25) {
        descriptor.nullable()
    } else {
        descriptor
    }
}

/// Samples a foreign occurrence that stays synthesizable even when marked
/// nullable, by always carrying a usable default path.
#[cfg(feature = "proptest")]
fn sample_foreign<R: Rng + ?Sized>(rng: &mut R) -> TypeDescriptor {
    const NAMES: [&str; 3] = ["Instant", "AccountRef", "Fingerprint"];
    let descriptor = TypeDescriptor::named(NAMES[rng.gen_range(0..NAMES.len())]);
    if rng.gen_bool(0.5) {
        descriptor.with_annotation(Annotation::Via {
            provider: "conv::AsFieldBytes".to_owned(),
            surrogate: "FieldBytes".to_owned(),
        })
    } else {
        descriptor.with_annotation(Annotation::Default {
            provider: "defaults::Zeroed".to_owned(),
        })
    }
}

/// Draws one random well-formed descriptor per test case, with no
/// shrinking; a failing case is reported exactly as drawn.
#[cfg(feature = "proptest")]
#[derive(Debug)]
pub struct DescriptorStrategy;

#[cfg(feature = "proptest")]
pub struct DrawnDescriptor(TypeDescriptor);

#[cfg(feature = "proptest")]
impl ValueTree for DrawnDescriptor {
    type Value = TypeDescriptor;

    fn current(&self) -> TypeDescriptor {
        self.0.clone()
    }

    fn simplify(&mut self) -> bool {
        false
    }

    fn complicate(&mut self) -> bool {
        false
    }
}

#[cfg(feature = "proptest")]
impl Strategy for DescriptorStrategy {
    type Tree = DrawnDescriptor;
    type Value = TypeDescriptor;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        Ok(DrawnDescriptor(runner.rng().r#gen()))
    }
}

#[cfg(feature = "proptest")]
impl proptest::arbitrary::Arbitrary for TypeDescriptor {
    type Parameters = ();
    type Strategy = DescriptorStrategy;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        DescriptorStrategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn int() -> TypeDescriptor {
        TypeDescriptor::named("Int")
    }

    #[test]
    fn renders_nested_arguments_and_nullability() {
        let descriptor = TypeDescriptor::named("Map")
            .with_argument(TypeDescriptor::named("Text"))
            .with_argument(TypeDescriptor::named("List").with_argument(int().nullable()))
            .nullable();
        assert_eq!(descriptor.render(), "Map<Text, List<Int?>>?");
    }

    #[test]
    fn source_form_quotes_annotations() {
        let descriptor = TypeDescriptor::named("List")
            .with_argument(int())
            .with_annotation(Annotation::MaxSize { size: 5 })
            .with_annotation(Annotation::Default {
                provider: "defaults::Empty".to_owned(),
            });
        assert_eq!(
            descriptor.source(),
            "List<Int> [max_size(5), default(defaults::Empty)]"
        );
        assert_eq!(int().source(), "Int");
    }

    #[test]
    fn accessors_pick_the_first_matching_annotation() {
        let descriptor = TypeDescriptor::named("Bytes")
            .with_annotation(Annotation::MaxSize { size: 8 })
            .with_annotation(Annotation::MaxSize { size: 99 });
        assert_eq!(descriptor.max_size(), Some(8));
        assert_eq!(descriptor.digits(), None);
        assert_eq!(descriptor.default_provider(), None);

        let converted = TypeDescriptor::named("Instant").with_annotation(Annotation::Via {
            provider: "conv::AsMillis".to_owned(),
            surrogate: "Millis".to_owned(),
        });
        assert_eq!(converted.conversion(), Some(("conv::AsMillis", "Millis")));
    }

    #[test]
    fn annotations_serialize_with_a_tag_entry() {
        let value = serde_json::to_value(Annotation::MaxSize { size: 5 }).unwrap();
        assert_eq!(value, json!({"annotation": "max_size", "size": 5}));

        let value = serde_json::to_value(Annotation::Encoding {
            kind: EncodingKind::Utf8,
            max_chars: Some(32),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"annotation": "encoding", "kind": "utf8", "max_chars": 32})
        );
    }

    #[test]
    fn loads_a_version_one_dump() {
        let dump = r#"{
            "version": {"major": 1, "minor": 0},
            "name": "List",
            "arguments": [{"name": "Int"}],
            "annotations": [{"annotation": "max_size", "size": 5}]
        }"#;
        let descriptor = TypeDescriptor::load(dump.as_bytes()).unwrap();
        assert_eq!(
            descriptor,
            TypeDescriptor::named("List")
                .with_argument(int())
                .with_annotation(Annotation::MaxSize { size: 5 })
        );
    }

    #[test]
    fn rejects_other_versions_and_shapes() {
        let wrong_version = r#"{"version": {"major": 2, "minor": 0}, "name": "Int"}"#;
        let error = TypeDescriptor::load(wrong_version.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);

        let missing_version = r#"{"name": "Int"}"#;
        let error = TypeDescriptor::load(missing_version.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);

        let not_an_object = r#"["Int"]"#;
        let error = TypeDescriptor::load(not_an_object.as_bytes()).unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }
}
