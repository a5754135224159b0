/// Reactive layer: named cells wired into a dependency graph.
///
/// Architecture:
/// ```text
///   input cells ──set / batch──┐
///        │                     ▼
///        │              ┌──────────────┐
///        └────────────▶ │ propagation  │  topological pass, value-equality
///                       └──────────────┘  short-circuit, one eval per cell
///                              │
///                              ▼
///                       computed cells ──get──▶ rendering layer
/// ```

pub mod graph;
pub mod value;

pub use graph::{Batch, Deps, Graph, GraphBuilder, Propagation, Scope};
pub use value::CellValue;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("unknown cell '{0}'")]
    UnknownCell(String),

    #[error("cell '{cell}' depends on unknown cell '{dependency}'")]
    UnknownDependency { cell: String, dependency: String },

    #[error("cell '{cell}' reads '{dependency}' without declaring it")]
    UndeclaredDependency { cell: String, dependency: String },

    #[error("cell '{0}' is registered twice")]
    DuplicateCell(String),

    #[error("cell '{cell}' holds {declared}, not {requested}")]
    TypeMismatch {
        cell: String,
        declared: &'static str,
        requested: &'static str,
    },

    #[error("cell '{0}' is computed and cannot be written")]
    NotAnInput(String),

    #[error("cell '{0}' is detached")]
    Detached(String),

    #[error(
        "cell '{cell}' in scope {scope} cannot depend on '{dependency}' in scope {dependency_scope}"
    )]
    ScopeViolation {
        cell: String,
        scope: Scope,
        dependency: String,
        dependency_scope: Scope,
    },
}
