// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading and saving graphs through shader files.
//!
//! A persisted patch is an ordinary shader source file; the serialized graph
//! travels inside it as an embedded region (see
//! [`shadeflow_editor_patch::codec`]), conventionally wrapped in a block
//! comment so the file stays valid shader source.

use crate::archive::FragmentArchive;
use crate::convert::{self, ConvertError};
use crate::graph::GraphModel;
use shadeflow_editor_patch::codec::{self, CodecError};
use std::fs;
use std::path::Path;

/// Serialize a model into an embeddable payload.
pub fn serialize(model: &GraphModel) -> Result<String, StorageError> {
    let patch = convert::to_patch_layer(model);
    Ok(codec::encode(&patch)?)
}

/// Reconstruct a model from a payload produced by [`serialize`].
pub fn deserialize(
    payload: &str,
    archive: &dyn FragmentArchive,
) -> Result<GraphModel, StorageError> {
    let patch = codec::decode(payload)?;
    Ok(convert::from_patch_layer(&patch, archive)?)
}

/// Load the graph embedded in the shader file at `path`.
///
/// Returns `Ok(None)` when the file contains no embedded region. A malformed
/// payload or an unresolvable archive reference aborts the whole load; no
/// partial graph is returned.
pub fn load(path: &Path, archive: &dyn FragmentArchive) -> Result<Option<GraphModel>, StorageError> {
    let text = fs::read_to_string(path)?;
    let Some(payload) = codec::extract(&text) else {
        tracing::info!(path = %path.display(), "no embedded graph region");
        return Ok(None);
    };
    let model = deserialize(payload, archive)?;
    tracing::info!(
        path = %path.display(),
        nodes = model.node_count(),
        connections = model.connection_count(),
        "graph loaded from shader file"
    );
    Ok(Some(model))
}

/// Write `shader_text` to `path` with the serialized graph embedded in a
/// trailing block comment, so [`load`] can recover the model later.
pub fn save(path: &Path, model: &GraphModel, shader_text: &str) -> Result<(), StorageError> {
    let payload = serialize(model)?;
    let mut out = String::with_capacity(shader_text.len() + payload.len() + 16);
    out.push_str(shader_text);
    if !shader_text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("/* ");
    out.push_str(&codec::embed(&payload));
    out.push_str(" */\n");
    fs::write(path, out)?;
    tracing::info!(path = %path.display(), "graph saved into shader file");
    Ok(())
}

/// Error loading or saving a persisted graph.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the file failed
    #[error("failed reading or writing the patch file: {0}")]
    Io(#[from] std::io::Error),

    /// The embedded payload is malformed
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The payload decoded but could not be turned back into a model
    #[error(transparent)]
    Convert(#[from] ConvertError),
}
