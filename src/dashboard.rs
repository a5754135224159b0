use std::sync::Arc;

use crate::cells::{self, Reset, dataset_resets, is_dataset_field};
use crate::config::DashboardConfig;
use crate::data::catalog::Catalog;
use crate::data::filter::AgeRange;
use crate::reactive::{Graph, GraphBuilder, GraphError, Propagation};
use crate::selection::SelectionStore;
use crate::view::{View, ViewController};

// ---------------------------------------------------------------------------
// UI events
// ---------------------------------------------------------------------------

/// New value of a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Single-choice dropdown; `None` when cleared.
    Text(Option<String>),
    /// Multi-choice dropdown.
    List(Vec<String>),
    Ages(AgeRange),
}

/// One user interaction. Each event is applied as one batched mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A selector changed; `field` is the input cell name.
    Select { field: String, value: FieldValue },
    /// A ranked row or bar was clicked.
    Pick(String),
    /// A selection list item was clicked.
    Toggle(String),
    /// The pointer entered or left a ranked row.
    Hover(Option<String>),
    ShowView(View),
}

impl Event {
    pub fn select(field: &str, value: FieldValue) -> Self {
        Event::Select {
            field: field.to_string(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard – one interactive session
// ---------------------------------------------------------------------------

/// Owns the catalog, the cell graph, the shared selection and the mounted
/// view. The rendering layer reads cells through [`Dashboard::get`] and
/// writes only by sending [`Event`]s.
pub struct Dashboard {
    catalog: Arc<Catalog>,
    config: DashboardConfig,
    graph: Graph,
    selection: SelectionStore,
    views: ViewController,
}

impl Dashboard {
    /// Wire every view's cells and mount `initial_view`.
    ///
    /// An error here is a wiring mistake, never a data problem.
    pub fn new(
        catalog: Arc<Catalog>,
        config: DashboardConfig,
        initial_view: View,
    ) -> Result<Self, GraphError> {
        let dataset = config.initial_dataset(&catalog.table_ids());
        let mut builder = GraphBuilder::new();
        let selection = SelectionStore::register(&mut builder);
        cells::declare(&mut builder, &catalog, &config, dataset);

        let mut graph = builder.build()?;
        let views = ViewController::new(&mut graph, initial_view);
        log::info!(
            "dashboard ready: {} tables, view {}",
            catalog.len(),
            initial_view.key()
        );

        Ok(Dashboard {
            catalog,
            config,
            graph,
            selection,
            views,
        })
    }

    /// Apply one event and run its propagation pass.
    pub fn handle(&mut self, event: Event) -> Result<Propagation, GraphError> {
        log::debug!("event {event:?}");
        match event {
            Event::Select { field, value } => self.select(&field, value),
            Event::Pick(player) => self.selection.add(&mut self.graph, &player),
            Event::Toggle(player) => self.selection.remove(&mut self.graph, &player),
            Event::Hover(player) => self.graph.set_input(cells::explore::HOVERED, player),
            Event::ShowView(view) => self.views.show(&mut self.graph, view),
        }
    }

    fn select(&mut self, field: &str, value: FieldValue) -> Result<Propagation, GraphError> {
        // a dataset switch clears dependent selectors in the same batch,
        // unless the dataset did not actually change
        let resets: &[Reset] = match &value {
            FieldValue::Text(id) if is_dataset_field(field) => {
                let current = self.graph.input_value::<Option<String>>(field).ok();
                if current.as_ref() == Some(id) {
                    &[]
                } else {
                    dataset_resets(field)
                }
            }
            _ => &[],
        };

        let mut batch = self.graph.batch();
        match value {
            FieldValue::Text(v) => batch.set(field, v)?,
            FieldValue::List(v) => batch.set(field, v)?,
            FieldValue::Ages(v) => batch.set(field, v)?,
        }
        for reset in resets {
            match *reset {
                Reset::List(name) => batch.set(name, Vec::<String>::new())?,
                Reset::Choice(name) => batch.set(name, None::<String>)?,
            }
        }
        batch.commit()
    }

    /// Current value of a cell of the mounted view or a shared cell.
    pub fn get<T: Clone + 'static>(&self, name: &str) -> Result<T, GraphError> {
        self.graph.get(name)
    }

    pub fn selected(&self) -> &[String] {
        self.selection.list()
    }

    pub fn is_selected(&self, player: &str) -> bool {
        self.selection.contains(player)
    }

    pub fn view(&self) -> View {
        self.views.current()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}
