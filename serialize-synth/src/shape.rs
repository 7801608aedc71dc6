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

//! Classification of declared types into the closed set of serializable
//! shapes, with the per-shape annotation validation.

use crate::descriptor::{EncodingKind, TypeDescriptor};
use crate::error::SynthesisError;
use crate::object::Template;
use std::fmt::{self, Display, Formatter};

/// The closed set of shapes the engine can serialize with a statically
/// fixed length. Every declared name outside it is
/// [`Foreign`](ShapeCategory::Foreign) and handled through surrogate
/// conversion or the self-describing assumption.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeCategory {
    /// A truth value.
    Bool,
    /// A 32-bit signed integer.
    Int,
    /// A 64-bit signed integer.
    Long,
    /// A single character in a fixed-width encoding.
    Char,
    /// A string padded to a fixed character count.
    Text,
    /// An ordered collection padded to a fixed capacity.
    List,
    /// An unordered collection padded to a fixed capacity.
    Set,
    /// A key-value collection padded to a fixed capacity.
    Map,
    /// A byte string padded to a fixed capacity.
    Bytes,
    /// A decimal number with fixed digit counts.
    Decimal,
    /// A user-defined or third-party type outside the closed set.
    Foreign,
}

impl Display for ShapeCategory {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let name = match self {
            ShapeCategory::Bool => "bool",
            ShapeCategory::Int => "int",
            ShapeCategory::Long => "long",
            ShapeCategory::Char => "char",
            ShapeCategory::Text => "text",
            ShapeCategory::List => "list",
            ShapeCategory::Set => "set",
            ShapeCategory::Map => "map",
            ShapeCategory::Bytes => "bytes",
            ShapeCategory::Decimal => "decimal",
            ShapeCategory::Foreign => "foreign",
        };
        write!(formatter, "{name}")
    }
}

/// Classifies one declared type occurrence by its clean name and validates
/// the annotations its category demands, so that anything downstream can
/// rely on them being present and well formed. No recursion into type
/// arguments happens here.
pub fn classify(descriptor: &TypeDescriptor) -> Result<ShapeCategory, SynthesisError> {
    let category = match descriptor.name.as_str() {
        "Bool" => ShapeCategory::Bool,
        "Int" => ShapeCategory::Int,
        "Long" => ShapeCategory::Long,
        "Char" => ShapeCategory::Char,
        "Text" => ShapeCategory::Text,
        "List" => ShapeCategory::List,
        "Set" => ShapeCategory::Set,
        "Map" => ShapeCategory::Map,
        "Bytes" => ShapeCategory::Bytes,
        "Decimal" => ShapeCategory::Decimal,
        _ => ShapeCategory::Foreign,
    };
    validated_template(category, descriptor)?;
    Ok(category)
}

/// Validates the annotations `category` demands of `descriptor` and
/// returns the construction template they pin down. `Foreign` has no
/// template; its obligations are checked by a later compilation stage.
pub(crate) fn validated_template(
    category: ShapeCategory,
    descriptor: &TypeDescriptor,
) -> Result<Option<Template>, SynthesisError> {
    use ShapeCategory::*;
    let template = match category {
        Bool => Template::Bool,
        Int => Template::Int,
        Long => Template::Long,
        Char => match descriptor.encodings()[..] {
            [(kind @ (EncodingKind::Ascii | EncodingKind::Utf32), _)] => {
                Template::Char { encoding: kind }
            }
            _ => {
                return Err(missing(
                    Char,
                    "exactly one encoding annotation, either ascii or utf32",
                    descriptor,
                ));
            }
        },
        Text => match descriptor.encodings()[..] {
            [(kind, Some(max_chars))] => Template::Text {
                encoding: kind,
                max_chars,
            },
            [(_, None)] => {
                return Err(missing(
                    Text,
                    "a maximum character count on its encoding annotation",
                    descriptor,
                ));
            }
            _ => {
                return Err(missing(
                    Text,
                    "exactly one encoding annotation (ascii, utf8, utf16, or utf32)",
                    descriptor,
                ));
            }
        },
        List => {
            let max_size = require_max_size(List, descriptor)?;
            require_arguments(descriptor, 1)?;
            Template::List { max_size }
        }
        Set => {
            let max_size = require_max_size(Set, descriptor)?;
            require_arguments(descriptor, 1)?;
            Template::Set { max_size }
        }
        Map => {
            let max_size = require_max_size(Map, descriptor)?;
            require_arguments(descriptor, 2)?;
            Template::Map { max_size }
        }
        Bytes => Template::Bytes {
            max_size: require_max_size(Bytes, descriptor)?,
        },
        Decimal => match descriptor.digits() {
            Some((integer, fraction)) => Template::Decimal { integer, fraction },
            None => {
                return Err(missing(
                    Decimal,
                    "a digits annotation fixing integer and fraction digit counts",
                    descriptor,
                ));
            }
        },
        Foreign => return Ok(None),
    };
    Ok(Some(template))
}

fn missing(
    category: ShapeCategory,
    requirement: &'static str,
    descriptor: &TypeDescriptor,
) -> SynthesisError {
    SynthesisError::MissingAnnotation {
        category,
        requirement,
        source: descriptor.source(),
    }
}

fn require_max_size(
    category: ShapeCategory,
    descriptor: &TypeDescriptor,
) -> Result<u32, SynthesisError> {
    descriptor
        .max_size()
        .ok_or_else(|| missing(category, "a max_size annotation", descriptor))
}

fn require_arguments(descriptor: &TypeDescriptor, expected: usize) -> Result<(), SynthesisError> {
    let actual = descriptor.arguments.len();
    if actual == expected {
        return Ok(());
    }
    let role = match (expected, actual) {
        (2, 0) => "key",
        (2, _) => "value",
        _ => "element",
    };
    Err(SynthesisError::UnresolvableChild {
        role,
        source: descriptor.source(),
    })
}
