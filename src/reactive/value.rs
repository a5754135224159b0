use std::any::Any;
use std::fmt::Debug;

/// Anything a cell can hold: comparable so unchanged results stop
/// propagation, debuggable for logs.
pub trait CellValue: Any + Debug {
    fn as_any(&self) -> &dyn Any;

    /// Value equality across the type-erased boundary. Values of different
    /// types are never equal.
    fn same_as(&self, other: &dyn CellValue) -> bool;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + PartialEq> CellValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn same_as(&self, other: &dyn CellValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_as_compares_by_value_and_type() {
        let a: &dyn CellValue = &vec![1, 2];
        let b: &dyn CellValue = &vec![1, 2];
        let c: &dyn CellValue = &vec![1u8, 2];
        assert!(a.same_as(b));
        assert!(!a.same_as(c));
        assert!(!a.same_as(&Some(3)));
    }
}
