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

//! Serializing objects: the tree nodes that, once handed a tracker, expand
//! into the named declaration set for one field subtree.
//!
//! Instantiation is pure. A node derives every identifier it needs from the
//! tracker it receives, hands derived trackers to its children, and merges
//! the children's declarations into its own. Parents land ahead of the
//! subtrees they reference, but the generation target resolves declarations
//! as a set, so nothing downstream may depend on that order.

use crate::descriptor::{EncodingKind, TypeDescriptor};
use crate::error::SynthesisError;
use crate::tracker::Tracker;

/// The flattened output of one subtree: the tracker naming its entry point
/// plus every declaration the subtree contributed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializationSupport {
    /// The identifier under which the whole subtree is referenced.
    pub root: Tracker,
    /// Standalone named definitions, parents ahead of the identifiers they
    /// reference.
    pub declarations: Vec<String>,
}

impl SerializationSupport {
    /// A support holding the single declaration `type {root} = {body};`.
    fn declare(root: Tracker, body: String) -> SerializationSupport {
        let declaration = format!("type {root} = {body};");
        SerializationSupport {
            root,
            declarations: vec![declaration],
        }
    }

    /// Merges another subtree's declarations into this one, keeping this
    /// subtree's root.
    pub fn include(mut self, other: SerializationSupport) -> SerializationSupport {
        self.declarations.extend(other.declarations);
        self
    }
}

/// Construction data for one recognized shape: everything validation pinned
/// down, ready to splice into a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Template {
    Bool,
    Int,
    Long,
    Char { encoding: EncodingKind },
    Text { encoding: EncodingKind, max_chars: u32 },
    Bytes { max_size: u32 },
    List { max_size: u32 },
    Set { max_size: u32 },
    Map { max_size: u32 },
    Decimal { integer: u32, fraction: u32 },
}

impl Template {
    /// How many child subtrees this template composes over.
    fn arity(&self) -> usize {
        match self {
            Template::List { .. } | Template::Set { .. } => 1,
            Template::Map { .. } => 2,
            _ => 0,
        }
    }
}

/// A recognized-shape node: a construction template over zero, one, or two
/// child subtrees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeObject {
    /// The clean name of the declared type this node serializes.
    pub clean_name: String,
    /// The annotated source form, re-emitted in diagnostics.
    pub annotated: String,
    /// Child serializing objects, in type-argument order.
    pub children: Vec<SerializingObject>,
    /// The construction data validation pinned down.
    pub template: Template,
}

impl NativeObject {
    fn instantiate(&self, tracker: Tracker) -> Result<SerializationSupport, SynthesisError> {
        let expected = self.template.arity();
        if self.children.len() != expected {
            return Err(SynthesisError::AmbiguousChildCount {
                expected,
                actual: self.children.len(),
                source: self.annotated.clone(),
            });
        }
        match &self.template {
            Template::Bool => Ok(SerializationSupport::declare(tracker, "FixedBool".to_owned())),
            Template::Int => Ok(SerializationSupport::declare(tracker, "FixedInt".to_owned())),
            Template::Long => Ok(SerializationSupport::declare(tracker, "FixedLong".to_owned())),
            Template::Char { encoding } => Ok(SerializationSupport::declare(
                tracker,
                format!("FixedChar<{}>", encoding.marker()),
            )),
            Template::Text {
                encoding,
                max_chars,
            } => Ok(SerializationSupport::declare(
                tracker,
                format!("FixedText<{}, {max_chars}>", encoding.marker()),
            )),
            Template::Bytes { max_size } => Ok(SerializationSupport::declare(
                tracker,
                format!("FixedBytes<{max_size}>"),
            )),
            Template::Decimal { integer, fraction } => Ok(SerializationSupport::declare(
                tracker,
                format!("FixedDecimal<{integer}, {fraction}>"),
            )),
            Template::List { max_size } => {
                let element = self.children[0].instantiate(tracker.next())?;
                let support = SerializationSupport::declare(
                    tracker,
                    format!("FixedList<{}, {max_size}>", element.root),
                );
                Ok(support.include(element))
            }
            Template::Set { max_size } => {
                let element = self.children[0].instantiate(tracker.next())?;
                let support = SerializationSupport::declare(
                    tracker,
                    format!("FixedSet<{}, {max_size}>", element.root),
                );
                Ok(support.include(element))
            }
            Template::Map { max_size } => {
                // Key and value each open their own bucket under the map so
                // their subtree counters can never collide.
                let key = self.children[0].instantiate(tracker.literal(0).numeric(0))?;
                let value = self.children[1].instantiate(tracker.literal(1).numeric(0))?;
                let support = SerializationSupport::declare(
                    tracker,
                    format!("FixedMap<{}, {}, {max_size}>", key.root, value.root),
                );
                Ok(support.include(key).include(value))
            }
        }
    }
}

/// How a foreign type obtains its serializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForeignMode {
    /// Serialized through an explicit surrogate shape, delegating to the
    /// named bidirectional conversion provider.
    Converted { provider: String, surrogate: String },
    /// Assumed to generate its own serializer; referenced by name here and
    /// checked by a later, independent compilation stage.
    SelfDescribing,
}

/// A foreign-type node. No children are tracked here: the referenced type's
/// nested structure belongs to its own synthesis session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignObject {
    pub clean_name: String,
    pub annotated: String,
    pub mode: ForeignMode,
}

impl ForeignObject {
    fn instantiate(&self, tracker: Tracker) -> SerializationSupport {
        match &self.mode {
            ForeignMode::Converted {
                provider,
                surrogate,
            } => SerializationSupport::declare(
                tracker,
                format!("FixedVia<{surrogate}Serializer, {provider}>"),
            ),
            ForeignMode::SelfDescribing => {
                SerializationSupport::declare(tracker, format!("{}Serializer", self.clean_name))
            }
        }
    }
}

/// One node of the serializing-object tree built for a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SerializingObject {
    /// A recognized native shape.
    Native(NativeObject),
    /// A user-defined or third-party type.
    Foreign(ForeignObject),
    /// Supplies a filler value through `provider` when the absent case of a
    /// nullable occurrence still has to write a full-length payload.
    Defaulted {
        inner: Box<SerializingObject>,
        provider: String,
    },
    /// Makes the (already defaulted) inner object optional.
    Nullable { inner: Box<SerializingObject> },
}

impl SerializingObject {
    /// The clean name of the declared type at this node. Decorators defer
    /// to the object they wrap.
    pub fn clean_name(&self) -> &str {
        match self {
            SerializingObject::Native(native) => &native.clean_name,
            SerializingObject::Foreign(foreign) => &foreign.clean_name,
            SerializingObject::Defaulted { inner, .. }
            | SerializingObject::Nullable { inner } => inner.clean_name(),
        }
    }

    /// The annotated source form re-emitted in diagnostics.
    pub fn annotated(&self) -> &str {
        match self {
            SerializingObject::Native(native) => &native.annotated,
            SerializingObject::Foreign(foreign) => &foreign.annotated,
            SerializingObject::Defaulted { inner, .. }
            | SerializingObject::Nullable { inner } => inner.annotated(),
        }
    }

    /// Whether this object always has a filler value of its own, with no
    /// external provider involved. Native shapes do: scalars have zero
    /// values and fixed-capacity collections have the empty padded form.
    pub fn has_native_default(&self) -> bool {
        match self {
            SerializingObject::Native(_) | SerializingObject::Defaulted { .. } => true,
            SerializingObject::Foreign(_) | SerializingObject::Nullable { .. } => false,
        }
    }

    /// Expands this subtree into its declaration set, rooted at `tracker`.
    pub fn instantiate(&self, tracker: Tracker) -> Result<SerializationSupport, SynthesisError> {
        match self {
            SerializingObject::Native(native) => native.instantiate(tracker),
            SerializingObject::Foreign(foreign) => Ok(foreign.instantiate(tracker)),
            SerializingObject::Defaulted { inner, provider } => {
                let wrapped = inner.instantiate(tracker.next())?;
                let support = SerializationSupport::declare(
                    tracker,
                    format!("FixedDefault<{}, {provider}>", wrapped.root),
                );
                Ok(support.include(wrapped))
            }
            SerializingObject::Nullable { inner } => {
                let wrapped = inner.instantiate(tracker.next())?;
                let support = SerializationSupport::declare(
                    tracker,
                    format!("FixedOption<{}>", wrapped.root),
                );
                Ok(support.include(wrapped))
            }
        }
    }
}

/// Ensures `object` can produce a filler value when one is demanded.
///
/// Objects with a native filler pass through unchanged. Anything else needs
/// the descriptor's default annotation or, failing that, the default its
/// conversion provider carries.
pub fn wrap_default(
    object: SerializingObject,
    descriptor: &TypeDescriptor,
) -> Result<SerializingObject, SynthesisError> {
    if object.has_native_default() {
        return Ok(object);
    }
    let conversion_default = match &object {
        SerializingObject::Foreign(foreign) => match &foreign.mode {
            ForeignMode::Converted { provider, .. } => Some(provider.clone()),
            ForeignMode::SelfDescribing => None,
        },
        _ => None,
    };
    match descriptor
        .default_provider()
        .map(str::to_owned)
        .or(conversion_default)
    {
        Some(provider) => Ok(SerializingObject::Defaulted {
            inner: Box::new(object),
            provider,
        }),
        None => Err(SynthesisError::MissingDefaultProvider {
            source: descriptor.source(),
        }),
    }
}

/// Makes `object` nullable.
///
/// The inner object is defaulted first, so the absent case still writes a
/// full-length filler payload; defaulted-then-nullable is a fixed ordering.
/// Re-wrapping an already-nullable object is rejected rather than
/// collapsed.
pub fn wrap_null(
    object: SerializingObject,
    descriptor: &TypeDescriptor,
) -> Result<SerializingObject, SynthesisError> {
    if matches!(object, SerializingObject::Nullable { .. }) {
        return Err(SynthesisError::DoubleWrap {
            source: object.annotated().to_owned(),
        });
    }
    let defaulted = wrap_default(object, descriptor)?;
    Ok(SerializingObject::Nullable {
        inner: Box::new(defaulted),
    })
}
