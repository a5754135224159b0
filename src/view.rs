use std::fmt;

use crate::reactive::{Graph, GraphError, Propagation, Scope};

/// The dashboard's top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum View {
    #[default]
    Explore,
    Search,
    Compare,
}

impl View {
    pub const ALL: [View; 3] = [View::Explore, View::Search, View::Compare];

    /// Graph scope holding this view's local cells.
    pub fn scope(self) -> Scope {
        Scope::Local(self.key())
    }

    /// Prefix of the view's cell names.
    pub fn key(self) -> &'static str {
        match self {
            View::Explore => "explore",
            View::Search => "search",
            View::Compare => "compare",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Explore => "Explore Players",
            View::Search => "Find Players",
            View::Compare => "Compare Players",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Tracks the mounted view. Only the mounted view's local cells are attached;
/// shared cells are never touched by a transition.
#[derive(Debug)]
pub struct ViewController {
    current: View,
}

impl ViewController {
    /// Mount `initial` and detach every other view.
    pub fn new(graph: &mut Graph, initial: View) -> Self {
        for view in View::ALL.into_iter().filter(|v| *v != initial) {
            graph.detach(view.scope());
        }
        ViewController { current: initial }
    }

    pub fn current(&self) -> View {
        self.current
    }

    /// Switch to `next`. Switching to the mounted view does nothing.
    pub fn show(&mut self, graph: &mut Graph, next: View) -> Result<Propagation, GraphError> {
        if next == self.current {
            return Ok(Propagation::default());
        }
        log::info!("view {} -> {}", self.current.key(), next.key());
        graph.detach(self.current.scope());
        self.current = next;
        graph.attach(next.scope())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::GraphBuilder;

    fn graph() -> Graph {
        let mut b = GraphBuilder::new();
        b.register_input("shared", 0i64);
        for view in View::ALL {
            let name = format!("{}.value", view.key());
            b.register_computed(&name, &["shared"], |d| Ok(*d.get::<i64>("shared")?))
                .scope(view.scope());
        }
        b.build().unwrap()
    }

    #[test]
    fn only_mounted_view_is_attached() {
        let mut g = graph();
        let views = ViewController::new(&mut g, View::Explore);
        assert_eq!(views.current(), View::Explore);
        assert!(g.is_attached("explore.value").unwrap());
        assert!(!g.is_attached("search.value").unwrap());
        assert!(!g.is_attached("compare.value").unwrap());
        assert!(g.is_attached("shared").unwrap());
    }

    #[test]
    fn transition_swaps_attached_cells() {
        let mut g = graph();
        let mut views = ViewController::new(&mut g, View::Explore);
        g.set_input("shared", 7i64).unwrap();

        let pass = views.show(&mut g, View::Compare).unwrap();
        assert_eq!(pass.recomputed, ["compare.value"]);
        assert_eq!(g.get::<i64>("compare.value").unwrap(), 7);
        assert!(!g.is_attached("explore.value").unwrap());

        assert!(views.show(&mut g, View::Compare).unwrap().is_empty());
    }
}
