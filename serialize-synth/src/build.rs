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

//! Recursive construction of the serializing-object tree for one declared
//! type occurrence.

use crate::descriptor::TypeDescriptor;
use crate::error::SynthesisError;
use crate::object::{
    ForeignMode, ForeignObject, NativeObject, SerializingObject, Template, wrap_default, wrap_null,
};
use crate::shape::{ShapeCategory, classify, validated_template};
use tracing::trace;

/// Fully resolves one declared type occurrence: classification, tree
/// building, and the occurrence's own nullability and default wrapping.
/// This is the recursion entry used both for a field and for every nested
/// type argument.
pub fn resolve(descriptor: &TypeDescriptor) -> Result<SerializingObject, SynthesisError> {
    let category = classify(descriptor)?;
    trace!(declared = %descriptor, shape = %category, "classified declared type");
    let object = build(descriptor, category)?;
    if descriptor.nullable {
        wrap_null(object, descriptor)
    } else if descriptor.default_provider().is_some() {
        wrap_default(object, descriptor)
    } else {
        Ok(object)
    }
}

/// Builds the serializing-object node for a descriptor already classified
/// as `category`, resolving nested type arguments depth-first.
pub fn build(
    descriptor: &TypeDescriptor,
    category: ShapeCategory,
) -> Result<SerializingObject, SynthesisError> {
    let Some(template) = validated_template(category, descriptor)? else {
        return Ok(foreign(descriptor));
    };
    let children = match (&template, &descriptor.arguments[..]) {
        (Template::List { .. } | Template::Set { .. }, [element]) => vec![resolve(element)?],
        (Template::Map { .. }, [key, value]) => vec![resolve(key)?, resolve(value)?],
        // Validation has pinned collection argument counts already; only
        // scalar shapes reach here, and they track no children.
        _ => Vec::new(),
    };
    Ok(SerializingObject::Native(NativeObject {
        clean_name: descriptor.name.clone(),
        annotated: descriptor.source(),
        children,
        template,
    }))
}

/// Builds the node for a type outside the closed shape set. A conversion
/// provider takes precedence; anything else is assumed self-describing and
/// left to a later compilation stage to confirm.
fn foreign(descriptor: &TypeDescriptor) -> SerializingObject {
    let mode = match descriptor.conversion() {
        Some((provider, surrogate)) => ForeignMode::Converted {
            provider: provider.to_owned(),
            surrogate: surrogate.to_owned(),
        },
        None => ForeignMode::SelfDescribing,
    };
    SerializingObject::Foreign(ForeignObject {
        clean_name: descriptor.name.clone(),
        annotated: descriptor.source(),
        mode,
    })
}
