use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::GraphError;
use super::value::CellValue;

type CellId = usize;
type ComputeFn = Box<dyn Fn(&Deps<'_>) -> Result<Rc<dyn CellValue>, GraphError>>;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Who a cell belongs to. Shared cells are always attached; local cells are
/// attached and detached together with their view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Shared,
    Local(&'static str),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Shared => write!(f, "shared"),
            Scope::Local(name) => write!(f, "{name}"),
        }
    }
}

impl Scope {
    /// Whether a cell in `self` may read a cell in `dependency`.
    fn may_read(self, dependency: Scope) -> bool {
        dependency == Scope::Shared || dependency == self
    }
}

// ---------------------------------------------------------------------------
// Dependency access for compute functions
// ---------------------------------------------------------------------------

/// Read-only view of a computed cell's declared dependencies.
pub struct Deps<'a> {
    cell: &'a str,
    values: Vec<(&'a str, &'a dyn CellValue)>,
}

impl Deps<'_> {
    /// Value of the declared dependency `name`.
    pub fn get<T: 'static>(&self, name: &str) -> Result<&T, GraphError> {
        let (_, value) = self
            .values
            .iter()
            .find(|(dep, _)| *dep == name)
            .ok_or_else(|| GraphError::UndeclaredDependency {
                cell: self.cell.to_string(),
                dependency: name.to_string(),
            })?;
        value
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| GraphError::TypeMismatch {
                cell: name.to_string(),
                declared: value.type_name(),
                requested: std::any::type_name::<T>(),
            })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

enum DeclKind {
    Input(Rc<dyn CellValue>),
    Computed { deps: Vec<String>, compute: ComputeFn },
}

struct Decl {
    name: String,
    kind: DeclKind,
    scope: Scope,
    renderable: bool,
    live: bool,
    type_id: TypeId,
    type_name: &'static str,
}

/// Chained options for the cell just registered.
pub struct CellOptions<'b> {
    decl: &'b mut Decl,
}

impl CellOptions<'_> {
    pub fn scope(self, scope: Scope) -> Self {
        self.decl.scope = scope;
        self
    }

    /// Mark the cell as readable by the rendering layer.
    pub fn renderable(self) -> Self {
        self.decl.renderable = true;
        self
    }

    /// Keep recomputing while the cell's scope is detached. Reads are still
    /// refused until the scope is attached. Everything the cell depends on
    /// becomes live too.
    pub fn live(self) -> Self {
        self.decl.live = true;
        self
    }
}

/// Collects cell declarations in any order; [`GraphBuilder::build`] checks
/// them and performs the first evaluation.
#[derive(Default)]
pub struct GraphBuilder {
    decls: Vec<Decl>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_input<T>(&mut self, name: &str, initial: T) -> CellOptions<'_>
    where
        T: CellValue + PartialEq,
    {
        self.push(Decl {
            name: name.to_string(),
            kind: DeclKind::Input(Rc::new(initial)),
            scope: Scope::Shared,
            renderable: false,
            live: false,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        })
    }

    pub fn register_computed<T, F>(&mut self, name: &str, deps: &[&str], f: F) -> CellOptions<'_>
    where
        T: CellValue + PartialEq,
        F: Fn(&Deps<'_>) -> Result<T, GraphError> + 'static,
    {
        let compute: ComputeFn =
            Box::new(move |deps| f(deps).map(|value| Rc::new(value) as Rc<dyn CellValue>));
        self.push(Decl {
            name: name.to_string(),
            kind: DeclKind::Computed {
                deps: deps.iter().map(|d| d.to_string()).collect(),
                compute,
            },
            scope: Scope::Shared,
            renderable: false,
            live: false,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        })
    }

    fn push(&mut self, decl: Decl) -> CellOptions<'_> {
        self.decls.push(decl);
        let last = self.decls.len() - 1;
        CellOptions {
            decl: &mut self.decls[last],
        }
    }

    /// Validate the declarations and evaluate every computed cell once.
    ///
    /// Fails on duplicate names, unknown dependencies, scope violations and
    /// cycles. These are wiring mistakes, so callers should abort.
    pub fn build(self) -> Result<Graph, GraphError> {
        let mut index: HashMap<String, CellId> = HashMap::with_capacity(self.decls.len());
        for (id, decl) in self.decls.iter().enumerate() {
            if index.insert(decl.name.clone(), id).is_some() {
                return Err(GraphError::DuplicateCell(decl.name.clone()));
            }
        }

        let mut cells = Vec::with_capacity(self.decls.len());
        for decl in self.decls {
            let (kind, value) = match decl.kind {
                DeclKind::Input(initial) => (Kind::Input, Some(initial)),
                DeclKind::Computed { deps, compute } => {
                    let deps = deps
                        .iter()
                        .map(|dep| {
                            index.get(dep).copied().ok_or_else(|| {
                                GraphError::UnknownDependency {
                                    cell: decl.name.clone(),
                                    dependency: dep.clone(),
                                }
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    (Kind::Computed { deps, compute }, None)
                }
            };
            cells.push(Cell {
                name: decl.name,
                kind,
                scope: decl.scope,
                renderable: decl.renderable,
                live: decl.live,
                type_id: decl.type_id,
                type_name: decl.type_name,
                value,
                version: 0,
                seen: Vec::new(),
                evaluations: 0,
                attached: true,
            });
        }

        for cell in &cells {
            for &dep in cell.deps() {
                let dependency = &cells[dep];
                if !cell.scope.may_read(dependency.scope) {
                    return Err(GraphError::ScopeViolation {
                        cell: cell.name.clone(),
                        scope: cell.scope,
                        dependency: dependency.name.clone(),
                        dependency_scope: dependency.scope,
                    });
                }
            }
        }

        let order = topological_order(&cells)?;
        // dependents come after their dependencies, so walk backwards
        for &id in order.iter().rev() {
            if !cells[id].live {
                continue;
            }
            let deps = cells[id].deps().to_vec();
            for dep in deps {
                cells[dep].live = true;
            }
        }
        let mut graph = Graph {
            cells,
            index,
            order,
            clock: 0,
        };
        let initial = graph.settle()?;
        log::debug!("graph built: {} cells, {} evaluated", graph.cells.len(), initial.len());
        Ok(graph)
    }
}

/// Depth-first post-order over dependencies, visiting cells in declaration
/// order so the result is deterministic.
fn topological_order(cells: &[Cell]) -> Result<Vec<CellId>, GraphError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(
        id: CellId,
        cells: &[Cell],
        marks: &mut [Mark],
        stack: &mut Vec<CellId>,
        order: &mut Vec<CellId>,
    ) -> Result<(), GraphError> {
        match marks[id] {
            Mark::Done => return Ok(()),
            Mark::Active => {
                let start = stack.iter().position(|&s| s == id).unwrap_or(0);
                let mut path: Vec<String> =
                    stack[start..].iter().map(|&s| cells[s].name.clone()).collect();
                path.push(cells[id].name.clone());
                return Err(GraphError::Cycle { path });
            }
            Mark::New => {}
        }
        marks[id] = Mark::Active;
        stack.push(id);
        for &dep in cells[id].deps() {
            visit(dep, cells, marks, stack, order)?;
        }
        stack.pop();
        marks[id] = Mark::Done;
        order.push(id);
        Ok(())
    }

    let mut marks = vec![Mark::New; cells.len()];
    let mut stack = Vec::new();
    let mut order = Vec::with_capacity(cells.len());
    for id in 0..cells.len() {
        visit(id, cells, &mut marks, &mut stack, &mut order)?;
    }
    Ok(order)
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

enum Kind {
    Input,
    Computed { deps: Vec<CellId>, compute: ComputeFn },
}

struct Cell {
    name: String,
    kind: Kind,
    scope: Scope,
    renderable: bool,
    /// Propagated into even while detached.
    live: bool,
    type_id: TypeId,
    type_name: &'static str,
    value: Option<Rc<dyn CellValue>>,
    /// Clock tick of the last actual value change.
    version: u64,
    /// Dependency versions at the last evaluation.
    seen: Vec<u64>,
    evaluations: u64,
    attached: bool,
}

impl Cell {
    fn deps(&self) -> &[CellId] {
        match &self.kind {
            Kind::Input => &[],
            Kind::Computed { deps, .. } => deps,
        }
    }

    fn is_input(&self) -> bool {
        matches!(self.kind, Kind::Input)
    }
}

/// What one propagation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Inputs whose value actually changed.
    pub changed_inputs: Vec<String>,
    /// Computed cells evaluated, in evaluation order.
    pub recomputed: Vec<String>,
}

impl Propagation {
    pub fn is_empty(&self) -> bool {
        self.changed_inputs.is_empty() && self.recomputed.is_empty()
    }

    pub fn was_recomputed(&self, name: &str) -> bool {
        self.recomputed.iter().any(|r| r == name)
    }

    /// Fold a later pass into this one.
    pub fn merge(&mut self, other: Propagation) {
        self.changed_inputs.extend(other.changed_inputs);
        self.recomputed.extend(other.recomputed);
    }
}

/// The dependency graph of input and computed cells.
///
/// All mutation happens through [`Graph::set_input`], [`Graph::batch`] and
/// scope attach/detach; each call runs one full propagation pass before it
/// returns.
pub struct Graph {
    cells: Vec<Cell>,
    index: HashMap<String, CellId>,
    /// Dependencies before dependents.
    order: Vec<CellId>,
    clock: u64,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("cells", &self.cells.len())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Graph {
    fn id(&self, name: &str) -> Result<CellId, GraphError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownCell(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Current value of a cell.
    pub fn get<T: Clone + 'static>(&self, name: &str) -> Result<T, GraphError> {
        let cell = &self.cells[self.id(name)?];
        if !cell.attached {
            return Err(GraphError::Detached(cell.name.clone()));
        }
        let value = cell
            .value
            .as_ref()
            .ok_or_else(|| GraphError::Detached(cell.name.clone()))?;
        value
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| GraphError::TypeMismatch {
                cell: cell.name.clone(),
                declared: cell.type_name,
                requested: std::any::type_name::<T>(),
            })
    }

    /// Current value of an input, attached or not.
    pub fn input_value<T: Clone + 'static>(&self, name: &str) -> Result<T, GraphError> {
        let cell = &self.cells[self.check_input::<T>(name)?];
        cell.value
            .as_ref()
            .and_then(|value| value.as_any().downcast_ref::<T>())
            .cloned()
            .ok_or_else(|| GraphError::UnknownCell(cell.name.clone()))
    }

    /// Write one input and propagate.
    pub fn set_input<T: CellValue + PartialEq>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<Propagation, GraphError> {
        let mut batch = self.batch();
        batch.set(name, value)?;
        batch.commit()
    }

    /// Start a batched mutation; nothing propagates until [`Batch::commit`].
    pub fn batch(&mut self) -> Batch<'_> {
        Batch {
            graph: self,
            writes: Vec::new(),
        }
    }

    fn check_input<T: 'static>(&self, name: &str) -> Result<CellId, GraphError> {
        let id = self.id(name)?;
        let cell = &self.cells[id];
        if !cell.is_input() {
            return Err(GraphError::NotAnInput(cell.name.clone()));
        }
        if cell.type_id != TypeId::of::<T>() {
            return Err(GraphError::TypeMismatch {
                cell: cell.name.clone(),
                declared: cell.type_name,
                requested: std::any::type_name::<T>(),
            });
        }
        Ok(id)
    }

    fn apply(
        &mut self,
        writes: Vec<(CellId, Rc<dyn CellValue>)>,
    ) -> Result<Propagation, GraphError> {
        let mut changed_inputs = Vec::new();
        for (id, value) in writes {
            let cell = &mut self.cells[id];
            let unchanged = cell
                .value
                .as_ref()
                .is_some_and(|old| old.same_as(&*value));
            if unchanged {
                continue;
            }
            self.clock += 1;
            cell.value = Some(value);
            cell.version = self.clock;
            changed_inputs.push(cell.name.clone());
        }
        if changed_inputs.is_empty() {
            return Ok(Propagation::default());
        }

        let recomputed = self.settle()?;
        log::debug!(
            "propagation: {:?} changed, recomputed {:?}",
            changed_inputs,
            recomputed
        );
        Ok(Propagation {
            changed_inputs,
            recomputed,
        })
    }

    /// Evaluate every attached computed cell whose dependencies moved since its
    /// last evaluation, in topological order.
    fn settle(&mut self) -> Result<Vec<String>, GraphError> {
        let mut recomputed = Vec::new();
        for position in 0..self.order.len() {
            let id = self.order[position];
            let cell = &self.cells[id];
            if cell.is_input() || !(cell.attached || cell.live) || !self.is_stale(id) {
                continue;
            }
            self.evaluate(id)?;
            recomputed.push(self.cells[id].name.clone());
        }
        Ok(recomputed)
    }

    fn is_stale(&self, id: CellId) -> bool {
        let cell = &self.cells[id];
        let deps = cell.deps();
        cell.value.is_none()
            || cell.seen.len() != deps.len()
            || deps
                .iter()
                .zip(&cell.seen)
                .any(|(&dep, &seen)| self.cells[dep].version != seen)
    }

    fn evaluate(&mut self, id: CellId) -> Result<(), GraphError> {
        let value = {
            let cell = &self.cells[id];
            let Kind::Computed { deps, compute } = &cell.kind else {
                return Ok(());
            };
            let mut values = Vec::with_capacity(deps.len());
            for &dep in deps {
                let dependency = &self.cells[dep];
                let value = dependency
                    .value
                    .as_ref()
                    .ok_or_else(|| GraphError::Detached(dependency.name.clone()))?;
                values.push((dependency.name.as_str(), &**value));
            }
            compute(&Deps {
                cell: &cell.name,
                values,
            })?
        };

        let seen: Vec<u64> = self.cells[id]
            .deps()
            .iter()
            .map(|&dep| self.cells[dep].version)
            .collect();

        let cell = &mut self.cells[id];
        cell.seen = seen;
        cell.evaluations += 1;
        let unchanged = cell
            .value
            .as_ref()
            .is_some_and(|old| old.same_as(&*value));
        if !unchanged {
            self.clock += 1;
            cell.value = Some(value);
            cell.version = self.clock;
        }
        Ok(())
    }

    /// Stop propagating into the cells of a local scope, except live ones.
    /// Their last values are kept but cannot be read until the scope is
    /// attached again.
    pub fn detach(&mut self, scope: Scope) {
        if scope == Scope::Shared {
            return;
        }
        for cell in self.cells.iter_mut().filter(|c| c.scope == scope) {
            cell.attached = false;
        }
    }

    /// Reattach a scope and bring its stale cells up to date.
    pub fn attach(&mut self, scope: Scope) -> Result<Propagation, GraphError> {
        for cell in self.cells.iter_mut().filter(|c| c.scope == scope) {
            cell.attached = true;
        }
        let recomputed = self.settle()?;
        Ok(Propagation {
            changed_inputs: Vec::new(),
            recomputed,
        })
    }

    pub fn is_attached(&self, name: &str) -> Result<bool, GraphError> {
        Ok(self.cells[self.id(name)?].attached)
    }

    /// How many times a computed cell's function has run.
    pub fn evaluations(&self, name: &str) -> Result<u64, GraphError> {
        Ok(self.cells[self.id(name)?].evaluations)
    }

    /// Attached cells the rendering layer may read.
    pub fn renderable_cells(&self) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|c| c.renderable && c.attached)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn scope_of(&self, name: &str) -> Result<Scope, GraphError> {
        Ok(self.cells[self.id(name)?].scope)
    }
}

/// Several input writes applied as one mutation.
pub struct Batch<'g> {
    graph: &'g mut Graph,
    writes: Vec<(CellId, Rc<dyn CellValue>)>,
}

impl Batch<'_> {
    /// Stage a write. A later write to the same input replaces the earlier one.
    pub fn set<T: CellValue + PartialEq>(
        &mut self,
        name: &str,
        value: T,
    ) -> Result<(), GraphError> {
        let id = self.graph.check_input::<T>(name)?;
        self.writes.retain(|(staged, _)| *staged != id);
        self.writes.push((id, Rc::new(value)));
        Ok(())
    }

    /// Apply all staged writes, then run one propagation pass.
    pub fn commit(self) -> Result<Propagation, GraphError> {
        self.graph.apply(self.writes)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn diamond() -> GraphBuilder {
        //      a     b
        //     / \    |
        //  double sum-+
        //      \  /
        //      total
        let mut b = GraphBuilder::new();
        b.register_input("a", 1i64);
        b.register_input("b", 10i64);
        b.register_computed("double", &["a"], |d| Ok(d.get::<i64>("a")? * 2));
        b.register_computed("sum", &["a", "b"], |d| Ok(d.get::<i64>("a")? + d.get::<i64>("b")?));
        b.register_computed("total", &["double", "sum"], |d| {
            Ok(d.get::<i64>("double")? + d.get::<i64>("sum")?)
        });
        b
    }

    #[test]
    fn build_evaluates_everything_once() {
        let g = diamond().build().unwrap();
        assert_eq!(g.get::<i64>("total").unwrap(), 13);
        for name in ["double", "sum", "total"] {
            assert_eq!(g.evaluations(name).unwrap(), 1);
        }
    }

    #[test]
    fn set_input_recomputes_dependents_once_in_order() {
        let mut g = diamond().build().unwrap();
        let pass = g.set_input("a", 2i64).unwrap();
        assert_eq!(pass.changed_inputs, ["a"]);
        assert_eq!(pass.recomputed, ["double", "sum", "total"]);
        assert_eq!(g.get::<i64>("total").unwrap(), 16);
        assert_eq!(g.evaluations("total").unwrap(), 2);
    }

    #[test]
    fn only_reachable_cells_are_recomputed() {
        let mut g = diamond().build().unwrap();
        let pass = g.set_input("b", 20i64).unwrap();
        assert_eq!(pass.recomputed, ["sum", "total"]);
        assert_eq!(g.evaluations("double").unwrap(), 1);
    }

    #[test]
    fn equal_write_does_not_propagate() {
        let mut g = diamond().build().unwrap();
        let pass = g.set_input("a", 1i64).unwrap();
        assert!(pass.is_empty());
        assert_eq!(g.evaluations("sum").unwrap(), 1);
    }

    #[test]
    fn unchanged_result_stops_propagation() {
        let mut b = GraphBuilder::new();
        b.register_input("n", 3i64);
        b.register_computed("is_odd", &["n"], |d| Ok(d.get::<i64>("n")? % 2 == 1));
        b.register_computed("label", &["is_odd"], |d| {
            Ok(if *d.get::<bool>("is_odd")? { "odd" } else { "even" }.to_string())
        });
        let mut g = b.build().unwrap();

        let pass = g.set_input("n", 5i64).unwrap();
        assert_eq!(pass.recomputed, ["is_odd"]);
        assert_eq!(g.evaluations("label").unwrap(), 1);
    }

    #[test]
    fn batch_observes_joint_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut b = GraphBuilder::new();
        b.register_input("a", 1i64);
        b.register_input("b", 1i64);
        b.register_computed("pair", &["a", "b"], move |d| {
            let pair = (*d.get::<i64>("a")?, *d.get::<i64>("b")?);
            log.borrow_mut().push(pair);
            Ok(pair)
        });
        let mut g = b.build().unwrap();

        let mut batch = g.batch();
        batch.set("a", 2i64).unwrap();
        batch.set("b", 3i64).unwrap();
        let pass = batch.commit().unwrap();

        assert_eq!(pass.recomputed, ["pair"]);
        assert_eq!(*seen.borrow(), [(1, 1), (2, 3)]);
    }

    #[test]
    fn cycle_is_rejected_with_path() {
        let mut b = GraphBuilder::new();
        b.register_input("root", 0i64);
        b.register_computed("x", &["root", "z"], |_| Ok(0i64));
        b.register_computed("y", &["x"], |_| Ok(0i64));
        b.register_computed("z", &["y"], |_| Ok(0i64));
        match b.build() {
            Err(GraphError::Cycle { path }) => assert_eq!(path, ["x", "z", "y", "x"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut b = GraphBuilder::new();
        b.register_computed("loop", &["loop"], |_| Ok(0i64));
        assert!(matches!(b.build(), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn unknown_and_duplicate_names_fail_build() {
        let mut b = GraphBuilder::new();
        b.register_computed("x", &["ghost"], |_| Ok(0i64));
        assert!(matches!(b.build(), Err(GraphError::UnknownDependency { .. })));

        let mut b = GraphBuilder::new();
        b.register_input("x", 0i64);
        b.register_input("x", 1i64);
        assert!(matches!(b.build(), Err(GraphError::DuplicateCell(_))));
    }

    #[test]
    fn writes_are_type_checked() {
        let mut g = diamond().build().unwrap();
        assert!(matches!(g.set_input("a", 1.5f64), Err(GraphError::TypeMismatch { .. })));
        assert!(matches!(g.set_input("sum", 1i64), Err(GraphError::NotAnInput(_))));
        assert!(matches!(g.set_input("nope", 1i64), Err(GraphError::UnknownCell(_))));
        assert!(matches!(g.get::<String>("sum"), Err(GraphError::TypeMismatch { .. })));
    }

    #[test]
    fn undeclared_read_is_an_error() {
        let mut b = GraphBuilder::new();
        b.register_input("a", 1i64);
        b.register_input("b", 1i64);
        b.register_computed("sneaky", &["a"], |d| Ok(*d.get::<i64>("b")?));
        assert!(matches!(b.build(), Err(GraphError::UndeclaredDependency { .. })));
    }

    #[test]
    fn shared_cell_cannot_read_local_cell() {
        let mut b = GraphBuilder::new();
        b.register_input("local", 1i64).scope(Scope::Local("explore"));
        b.register_computed("global", &["local"], |d| Ok(*d.get::<i64>("local")?));
        assert!(matches!(b.build(), Err(GraphError::ScopeViolation { .. })));
    }

    #[test]
    fn detached_scope_skips_propagation_and_catches_up_on_attach() {
        let mut b = GraphBuilder::new();
        b.register_input("shared", 1i64);
        b.register_computed("view", &["shared"], |d| Ok(d.get::<i64>("shared")? + 100))
            .scope(Scope::Local("compare"))
            .renderable();
        let mut g = b.build().unwrap();
        let scope = Scope::Local("compare");

        g.detach(scope);
        assert!(g.renderable_cells().is_empty());
        assert!(matches!(g.get::<i64>("view"), Err(GraphError::Detached(_))));

        let pass = g.set_input("shared", 2i64).unwrap();
        assert!(pass.recomputed.is_empty());
        g.set_input("shared", 3i64).unwrap();

        let pass = g.attach(scope).unwrap();
        assert_eq!(pass.recomputed, ["view"]);
        assert_eq!(g.get::<i64>("view").unwrap(), 103);
        assert_eq!(g.evaluations("view").unwrap(), 2);
        assert_eq!(g.renderable_cells(), ["view"]);

        // nothing moved while detached, so reattaching is free
        g.detach(scope);
        assert!(g.attach(scope).unwrap().recomputed.is_empty());
    }

    #[test]
    fn live_cells_propagate_while_detached() {
        let scope = Scope::Local("compare");
        let mut b = GraphBuilder::new();
        b.register_input("shared", 1i64);
        b.register_input("local", 10i64).scope(scope);
        b.register_computed("offset", &["local"], |d| Ok(*d.get::<i64>("local")?))
            .scope(scope);
        b.register_computed("chart", &["shared", "offset"], |d| {
            Ok(d.get::<i64>("shared")? + d.get::<i64>("offset")?)
        })
        .scope(scope)
        .live();
        b.register_computed("idle", &["shared"], |d| Ok(*d.get::<i64>("shared")?))
            .scope(scope);
        let mut g = b.build().unwrap();
        g.detach(scope);

        let pass = g.set_input("shared", 2i64).unwrap();
        assert_eq!(pass.recomputed, ["chart"]);
        g.set_input("shared", 3i64).unwrap();
        assert_eq!(g.evaluations("chart").unwrap(), 3);
        assert_eq!(g.evaluations("idle").unwrap(), 1);
        assert!(matches!(g.get::<i64>("chart"), Err(GraphError::Detached(_))));

        // the dependency of a live cell follows it while detached
        let pass = g.set_input("local", 20i64).unwrap();
        assert_eq!(pass.recomputed, ["offset", "chart"]);

        let pass = g.attach(scope).unwrap();
        assert_eq!(pass.recomputed, ["idle"]);
        assert_eq!(g.get::<i64>("chart").unwrap(), 23);
    }

    #[test]
    fn input_value_ignores_attachment() {
        let scope = Scope::Local("search");
        let mut b = GraphBuilder::new();
        b.register_input("dataset", Some("defense".to_string())).scope(scope);
        let mut g = b.build().unwrap();
        g.detach(scope);

        assert!(g.get::<Option<String>>("dataset").is_err());
        let value = g.input_value::<Option<String>>("dataset").unwrap();
        assert_eq!(value.as_deref(), Some("defense"));
        assert!(matches!(
            g.input_value::<i64>("dataset"),
            Err(GraphError::TypeMismatch { .. })
        ));
    }
}
