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

#![deny(unreachable_pub)]
#![deny(warnings)]
// Proptest derive triggers this.
#![allow(non_local_definitions)]

//! Fixed-length serializer synthesis for circuit-facing declared types.
//!
//! Declared state must encode to a statically fixed number of bits, whatever
//! its runtime content, because the downstream consumers are arithmetic
//! circuits that cannot express variable-length data. This crate is the
//! synthesis-time engine behind that guarantee: given the declared shape of
//! one field, it recursively builds a tree of serializing objects and emits
//! a self-consistent set of named codec declarations for the surrounding
//! code-generation driver to write out.
//!
//! [`synthesize`] is the one entry point that driver calls. The rest of the
//! public surface is the machinery underneath it: [`classify`] maps a
//! [`TypeDescriptor`] into the closed [`ShapeCategory`] set and validates
//! the category's annotations, [`resolve`] and [`build`] construct the
//! [`SerializingObject`] tree, [`wrap_default`] and [`wrap_null`] compose
//! the decorator layers, and [`Tracker`] allocates the collision-free
//! identifiers every declaration is named by.

mod build;
mod descriptor;
mod emit;
mod error;
mod object;
mod shape;
mod tracker;

pub use crate::build::{build, resolve};
#[cfg(feature = "proptest")]
pub use crate::descriptor::{DescriptorStrategy, DrawnDescriptor};
pub use crate::descriptor::{Annotation, EncodingKind, TypeDescriptor};
pub use crate::emit::synthesize;
pub use crate::error::SynthesisError;
pub use crate::object::{
    ForeignMode, ForeignObject, NativeObject, SerializationSupport, SerializingObject, Template,
    wrap_default, wrap_null,
};
pub use crate::shape::{ShapeCategory, classify};
pub use crate::tracker::{Coordinate, Tracker};
