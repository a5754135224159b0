use crate::reactive::{Graph, GraphBuilder, GraphError, Propagation};

/// Name of the shared input cell backing the selection.
pub const SELECTED_PLAYERS: &str = "selected_players";

// ---------------------------------------------------------------------------
// Selection – ordered set of player keys
// ---------------------------------------------------------------------------

/// Duplicate-free player keys in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    keys: Vec<String>,
}

impl Selection {
    /// Append `key` unless already present. Returns whether it was added.
    pub fn add(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    /// Drop `key` if present, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::default();
        for key in iter {
            selection.add(key.as_ref());
        }
        selection
    }
}

// ---------------------------------------------------------------------------
// SelectionStore – the session-wide selection, mirrored into the graph
// ---------------------------------------------------------------------------

/// Owns the selected players and writes every change into the shared
/// [`SELECTED_PLAYERS`] cell, so dependent cells of every view recompute.
/// No-op mutations leave the graph untouched.
#[derive(Debug, Default)]
pub struct SelectionStore {
    selection: Selection,
}

impl SelectionStore {
    /// Declare the backing cell, starting empty.
    pub fn register(builder: &mut GraphBuilder) -> Self {
        builder.register_input(SELECTED_PLAYERS, Selection::default());
        SelectionStore::default()
    }

    pub fn add(&mut self, graph: &mut Graph, key: &str) -> Result<Propagation, GraphError> {
        if !self.selection.add(key) {
            return Ok(Propagation::default());
        }
        log::debug!("selected {key}");
        self.publish(graph)
    }

    pub fn remove(&mut self, graph: &mut Graph, key: &str) -> Result<Propagation, GraphError> {
        if !self.selection.remove(key) {
            return Ok(Propagation::default());
        }
        log::debug!("deselected {key}");
        self.publish(graph)
    }

    /// Remove when selected, add otherwise.
    pub fn toggle(&mut self, graph: &mut Graph, key: &str) -> Result<Propagation, GraphError> {
        if self.selection.contains(key) {
            self.remove(graph, key)
        } else {
            self.add(graph, key)
        }
    }

    pub fn list(&self) -> &[String] {
        self.selection.as_slice()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.selection.contains(key)
    }

    fn publish(&self, graph: &mut Graph) -> Result<Propagation, GraphError> {
        graph.set_input(SELECTED_PLAYERS, self.selection.clone())
    }
}
