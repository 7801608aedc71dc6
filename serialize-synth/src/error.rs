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

use crate::shape::ShapeCategory;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Errors raised while synthesising the serializer set for a single field.
///
/// Each one aborts that field's synthesis before any declaration is handed
/// to the caller. The messages are compile-time diagnostics addressed to the
/// author of the annotated declaration, so they quote the offending source
/// form rather than engine internals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SynthesisError {
    /// A shape's mandatory annotation is absent, duplicated, or malformed.
    MissingAnnotation {
        category: ShapeCategory,
        requirement: &'static str,
        source: String,
    },
    /// A parametrised type's child type argument cannot be resolved.
    UnresolvableChild { role: &'static str, source: String },
    /// A filler value was demanded, but neither a default annotation nor a
    /// conversion provider supplies one.
    MissingDefaultProvider { source: String },
    /// A nullable wrapper was applied to an already-nullable object.
    DoubleWrap { source: String },
    /// A construction template was instantiated with the wrong number of
    /// child subtrees. Signals an engine defect rather than bad input.
    AmbiguousChildCount {
        expected: usize,
        actual: usize,
        source: String,
    },
}

impl Display for SynthesisError {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        use SynthesisError::*;
        match self {
            MissingAnnotation {
                category,
                requirement,
                source,
            } => write!(formatter, "{category} type `{source}` requires {requirement}"),
            UnresolvableChild { role, source } => write!(
                formatter,
                "cannot resolve the {role} type argument of `{source}`"
            ),
            MissingDefaultProvider { source } => write!(
                formatter,
                "`{source}` has no usable default; add a default annotation or a conversion provider that carries one"
            ),
            DoubleWrap { source } => write!(
                formatter,
                "`{source}` is already nullable; nullable-of-nullable is not supported"
            ),
            AmbiguousChildCount {
                expected,
                actual,
                source,
            } => write!(
                formatter,
                "construction template for `{source}` expects {expected} children, {actual} were supplied"
            ),
        }
    }
}

impl Error for SynthesisError {}
