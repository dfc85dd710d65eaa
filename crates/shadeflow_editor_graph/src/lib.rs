// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model and shader synchronization engine for Shadeflow Editor.
//!
//! This crate is the connectivity core behind the visual patch editor: it
//! owns the editable graph of nodes and connectors, gates candidate
//! connections through a pluggable compatibility strategy, fans structural
//! change notifications out to observers, and keeps a derived shader
//! artifact in sync through invalidate-then-regenerate.
//!
//! ## Architecture
//!
//! - Mutations go through [`GraphModel`], which validates them and delivers
//!   synchronous notifications ([`events`]).
//! - [`ShaderPreview`] subscribes an invalidator and regenerates preview
//!   shader text on demand through an external [`ShaderGenerator`].
//! - [`convert`] maps the model to and from the generator-facing patch layer
//!   (`shadeflow_editor_patch`); [`storage`] persists a model inside the
//!   generated shader file itself, using the patch layer's embedded-region
//!   codec.
//!
//! The engine is single-threaded and event-driven: no operation suspends,
//! and every notification is delivered before the mutating call returns.

pub mod archive;
pub mod compat;
pub mod connection;
pub mod convert;
pub mod events;
pub mod graph;
pub mod naming;
pub mod node;
pub mod preview;
pub mod storage;

pub use archive::{FragmentArchive, FragmentSignature, MemoryArchive, ResolutionError};
pub use compat::{AlwaysCompatible, CompatibilityStrategy, FragmentCompatibility};
pub use connection::{Connection, ConnectionId, ConnectorRef};
pub use convert::{from_patch_layer, to_patch_layer, ConvertError};
pub use events::{ConnectionAdding, GraphObserver};
pub use graph::{GraphError, GraphModel, ObserverHandle};
pub use naming::ConnectionNamer;
pub use node::{Direction, Item, ItemSemantic, Node, NodeId, NodeTag};
pub use preview::{ShaderArtifact, ShaderPreview, StructureInvalidator};
pub use storage::{load, save, StorageError};

pub use shadeflow_editor_patch::{GenerateError, PatchGraph, ShaderGenerator};
