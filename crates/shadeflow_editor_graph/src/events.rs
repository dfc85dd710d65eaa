// SPDX-License-Identifier: MIT OR Apache-2.0
//! Structural change notifications.
//!
//! Observers are registered on a [`GraphModel`](crate::GraphModel) and are
//! invoked synchronously, in registration order, inline during the mutating
//! call. They receive event data but never a model handle, so a handler
//! cannot re-enter the model mid-dispatch.

use crate::connection::Connection;
use crate::node::Node;

/// Observer of structural graph changes.
///
/// All methods default to no-ops; implementors override the events they care
/// about.
pub trait GraphObserver {
    /// A node was inserted.
    fn node_added(&mut self, _node: &Node) {}

    /// A node and every connection touching it were removed. Delivered after
    /// removal completes.
    fn node_removed(&mut self, _node: &Node) {}

    /// A connection is about to be committed; the event carries the
    /// compatibility verdict and may be vetoed.
    fn connection_adding(&mut self, _event: &mut ConnectionAdding<'_>) {}

    /// A connection was committed (or an existing literal was overwritten).
    fn connection_added(&mut self, _connection: &Connection) {}

    /// A connection is about to be removed. Not vetoable.
    fn connection_removing(&mut self, _connection: &Connection) {}
}

/// Vetoable announcement of a candidate connection.
#[derive(Debug)]
pub struct ConnectionAdding<'a> {
    /// The candidate; its id is not assigned yet
    pub connection: &'a Connection,
    /// Verdict of the model's compatibility strategy. Affirmative for
    /// literal-value edges, which have no source connector to judge.
    pub compatible: bool,
    cancel: bool,
}

impl<'a> ConnectionAdding<'a> {
    pub(crate) fn new(connection: &'a Connection, compatible: bool) -> Self {
        Self {
            connection,
            compatible,
            cancel: false,
        }
    }

    /// Veto the candidate; the model will discard it without mutating.
    pub fn cancel(&mut self) {
        self.cancel = true;
    }

    /// Whether any observer has vetoed the candidate.
    pub fn cancelled(&self) -> bool {
        self.cancel
    }
}
