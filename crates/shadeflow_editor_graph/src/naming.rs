// SPDX-License-Identifier: MIT OR Apache-2.0
//! Default labels for new connections.

use crate::connection::Connection;

const DEFAULT_PREFIX: &str = "Connection ";

/// Assigns `"Connection <n>"` labels to connections committed without one.
///
/// The counter is owned by the model instance, starts at 1, increments only
/// when a default name is handed out, and is never reset or reused when
/// connections are removed. Connections that already carry a name (including
/// the literal text of literal-value edges) are left untouched.
#[derive(Debug)]
pub struct ConnectionNamer {
    next: u32,
}

impl ConnectionNamer {
    /// Create a namer with its counter at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Assign a default name if `connection` has none.
    pub fn apply(&mut self, connection: &mut Connection) {
        if !connection.name.is_empty() {
            return;
        }
        connection.name = format!("{DEFAULT_PREFIX}{}", self.next);
        self.next += 1;
    }

    /// Advance the counter past an existing default-shaped name, so names
    /// handed out later never collide with ones restored from a persisted
    /// graph.
    pub(crate) fn note(&mut self, name: &str) {
        if let Some(n) = name
            .strip_prefix(DEFAULT_PREFIX)
            .and_then(|rest| rest.parse::<u32>().ok())
        {
            self.next = self.next.max(n.saturating_add(1));
        }
    }
}

impl Default for ConnectionNamer {
    fn default() -> Self {
        Self::new()
    }
}
