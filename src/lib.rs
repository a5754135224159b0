//! Reactive core of the scouting dashboard: player tables, the projection
//! pipeline, the cell graph that keeps every view consistent, the shared
//! player selection and the view controller.

pub mod cells;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod reactive;
pub mod selection;
pub mod view;

pub use dashboard::{Dashboard, Event, FieldValue};
pub use view::View;
