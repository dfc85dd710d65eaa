// SPDX-License-Identifier: MIT OR Apache-2.0
//! Synchronization between the graph and its derived shader text.
//!
//! Structural mutations do not eagerly recompute anything; they only mark
//! the derived artifact stale through a [`StructureInvalidator`] subscribed
//! to the model. Regeneration happens on demand, when the artifact is next
//! requested, by converting the model and calling the external generator.

use crate::connection::Connection;
use crate::convert;
use crate::events::GraphObserver;
use crate::graph::GraphModel;
use crate::node::{Node, NodeId};
use shadeflow_editor_patch::{GenerateError, ShaderGenerator};
use std::cell::RefCell;
use std::rc::Rc;

/// Derived shader text with a staleness flag.
///
/// Starts stale; a stale artifact never serves its cached text. Only a
/// successful regeneration clears the flag, so a failed generation leaves
/// the artifact stale and the next request tries again.
#[derive(Debug)]
pub struct ShaderArtifact {
    text: Option<String>,
    stale: bool,
}

impl Default for ShaderArtifact {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderArtifact {
    /// Create an empty, stale artifact.
    pub fn new() -> Self {
        Self {
            text: None,
            stale: true,
        }
    }

    /// Mark the artifact stale.
    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    /// Whether the artifact needs regeneration.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The cached text, unless stale.
    pub fn current(&self) -> Option<&str> {
        if self.stale {
            None
        } else {
            self.text.as_deref()
        }
    }

    /// Store freshly generated text and clear the stale flag.
    pub fn store(&mut self, text: String) {
        self.text = Some(text);
        self.stale = false;
    }
}

/// Observer that marks a shared artifact stale on every structural event.
#[derive(Debug)]
pub struct StructureInvalidator {
    artifact: Rc<RefCell<ShaderArtifact>>,
}

impl StructureInvalidator {
    /// Create an invalidator for `artifact`.
    pub fn new(artifact: Rc<RefCell<ShaderArtifact>>) -> Self {
        Self { artifact }
    }

    fn invalidate(&self, reason: &str) {
        tracing::debug!(reason, "shader structure invalidated");
        self.artifact.borrow_mut().mark_stale();
    }
}

impl GraphObserver for StructureInvalidator {
    fn node_added(&mut self, _node: &Node) {
        self.invalidate("node added");
    }

    fn node_removed(&mut self, _node: &Node) {
        self.invalidate("node removed");
    }

    fn connection_added(&mut self, _connection: &Connection) {
        self.invalidate("connection added");
    }

    fn connection_removing(&mut self, _connection: &Connection) {
        self.invalidate("connection removing");
    }
}

/// On-demand preview shader for one target node.
pub struct ShaderPreview {
    target: NodeId,
    options: String,
    artifact: Rc<RefCell<ShaderArtifact>>,
}

impl ShaderPreview {
    /// Create a preview for `target` with empty generator options.
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            options: String::new(),
            artifact: Rc::new(RefCell::new(ShaderArtifact::new())),
        }
    }

    /// Set the option string passed to the generator.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }

    /// The node this preview targets.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The shared artifact backing this preview.
    pub fn artifact(&self) -> Rc<RefCell<ShaderArtifact>> {
        Rc::clone(&self.artifact)
    }

    /// Subscribe an invalidator for this preview's artifact to `model`.
    pub fn attach(&self, model: &mut GraphModel) {
        model.subscribe(Rc::new(RefCell::new(StructureInvalidator::new(
            self.artifact(),
        ))));
    }

    /// The preview shader text, regenerated through `generator` if the
    /// artifact is stale.
    pub fn shader(
        &self,
        model: &GraphModel,
        generator: &dyn ShaderGenerator,
    ) -> Result<String, GenerateError> {
        if let Some(text) = self.artifact.borrow().current() {
            return Ok(text.to_owned());
        }
        let patch = convert::to_patch_layer(model);
        let text = generator.generate_preview(&patch, self.target.0, &self.options)?;
        tracing::info!(
            target = self.target.0,
            bytes = text.len(),
            "preview shader regenerated"
        );
        self.artifact.borrow_mut().store(text.clone());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectorRef;
    use crate::node::{Item, NodeTag};
    use shadeflow_editor_patch::PatchGraph;
    use std::cell::Cell;

    struct CountingGenerator {
        calls: Cell<u32>,
        fail: bool,
    }

    impl CountingGenerator {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: Cell::new(0),
                fail: true,
            }
        }
    }

    impl ShaderGenerator for CountingGenerator {
        fn generate_preview(
            &self,
            graph: &PatchGraph,
            target: u32,
            _options: &str,
        ) -> Result<String, GenerateError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(GenerateError("backend unavailable".to_string()));
            }
            Ok(format!("// preview of node {target}, {} nodes", graph.nodes.len()))
        }
    }

    fn model_with_two_nodes() -> (GraphModel, NodeId, NodeId) {
        let mut model = GraphModel::new();
        let a = model
            .add_node(
                Node::new(NodeTag::Procedure {
                    archive: "a".to_string(),
                })
                .with_item(Item::output("out", "float3")),
            )
            .unwrap();
        let b = model
            .add_node(
                Node::new(NodeTag::Procedure {
                    archive: "b".to_string(),
                })
                .with_item(Item::input("in", "float3")),
            )
            .unwrap();
        (model, a, b)
    }

    #[test]
    fn artifact_starts_stale_and_never_serves_stale_text() {
        let mut artifact = ShaderArtifact::new();
        assert!(artifact.is_stale());
        assert_eq!(artifact.current(), None);

        artifact.store("// text".to_string());
        assert_eq!(artifact.current(), Some("// text"));

        artifact.mark_stale();
        assert_eq!(artifact.current(), None);
    }

    #[test]
    fn regeneration_is_cached_until_invalidated() {
        let (mut model, a, b) = model_with_two_nodes();
        let preview = ShaderPreview::new(b);
        preview.attach(&mut model);
        let generator = CountingGenerator::new();

        let first = preview.shader(&model, &generator).unwrap();
        let second = preview.shader(&model, &generator).unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.calls.get(), 1);

        model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 0),
                ConnectorRef::new(b, 0),
            ))
            .unwrap();
        assert!(preview.artifact().borrow().is_stale());

        preview.shader(&model, &generator).unwrap();
        assert_eq!(generator.calls.get(), 2);
    }

    #[test]
    fn every_structural_event_invalidates() {
        let (mut model, a, b) = model_with_two_nodes();
        let preview = ShaderPreview::new(b);
        preview.attach(&mut model);
        let artifact = preview.artifact();

        let refresh = |artifact: &Rc<RefCell<ShaderArtifact>>| {
            artifact.borrow_mut().store("// fresh".to_string());
        };

        refresh(&artifact);
        let c = model
            .add_node(Node::new(NodeTag::Preview))
            .unwrap();
        assert!(artifact.borrow().is_stale());

        refresh(&artifact);
        let id = model
            .add_connection(Connection::new(
                ConnectorRef::new(a, 0),
                ConnectorRef::new(b, 0),
            ))
            .unwrap();
        assert!(artifact.borrow().is_stale());

        refresh(&artifact);
        model.remove_connection(id);
        assert!(artifact.borrow().is_stale());

        refresh(&artifact);
        model.remove_node(c);
        assert!(artifact.borrow().is_stale());
    }

    #[test]
    fn failed_generation_leaves_artifact_stale() {
        let (mut model, _, b) = model_with_two_nodes();
        let preview = ShaderPreview::new(b);
        preview.attach(&mut model);
        let generator = CountingGenerator::failing();

        assert!(preview.shader(&model, &generator).is_err());
        assert!(preview.artifact().borrow().is_stale());

        // the next request tries again instead of serving anything cached
        assert!(preview.shader(&model, &generator).is_err());
        assert_eq!(generator.calls.get(), 2);
    }
}
