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

//! The driver-facing entry point: one declared field in, one named
//! declaration set out.

use crate::build::resolve;
use crate::descriptor::TypeDescriptor;
use crate::error::SynthesisError;
use crate::tracker::Tracker;
use tracing::debug;

/// Synthesizes the fixed-length serializer declarations for one declared
/// field.
///
/// The field's base identifier is its name followed by a numeric coordinate
/// at 0; every other identifier in the returned set is derived from that
/// tracker. Declarations come back with parents ahead of the identifiers
/// they reference, though the generation target resolves them as a set. On
/// error nothing is returned for the field; partial declaration sets are
/// never handed out.
///
/// Synthesis is pure and shares no state between calls, so independent
/// fields may be processed in parallel by the caller.
pub fn synthesize(
    field_name: &str,
    descriptor: &TypeDescriptor,
) -> Result<(String, Vec<String>), SynthesisError> {
    let object = resolve(descriptor)?;
    let support = object.instantiate(Tracker::for_field(field_name))?;
    debug!(
        field = field_name,
        declared = object.clean_name(),
        root = %support.root,
        declarations = support.declarations.len(),
        "synthesized fixed-length serializer set"
    );
    Ok((support.root.to_string(), support.declarations))
}
