//! Row identity: when two datasource entries count as the same row
use std::rc::Rc;
use std::sync::Arc;

/// Decides whether two row items are "the same" for reconciliation.
pub trait RowIdentity<T: ?Sized> {
    fn same(&self, a: &T, b: &T) -> bool;

    /// Compare two optional items; two absent items are equal.
    fn same_opt(&self, a: Option<&T>, b: Option<&T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.same(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// First index in `rows` holding an item that is the same as `item`.
    fn position(&self, rows: &[T], item: &T) -> Option<usize>
    where
        T: Sized,
    {
        rows.iter().position(|row| self.same(row, item))
    }
}

impl<T: ?Sized, I: RowIdentity<T> + ?Sized> RowIdentity<T> for &I {
    fn same(&self, a: &T, b: &T) -> bool {
        (**self).same(a, b)
    }
}

/// Value equality via `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueIdentity;

impl<T: PartialEq + ?Sized> RowIdentity<T> for ValueIdentity {
    fn same(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Reference identity for shared rows: two handles are the same row only when
/// they point at the same allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerIdentity;

impl<T: ?Sized> RowIdentity<Rc<T>> for PointerIdentity {
    fn same(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl<T: ?Sized> RowIdentity<Arc<T>> for PointerIdentity {
    fn same(&self, a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

/// Identity by a projected key, e.g. a record id.
#[derive(Debug, Clone, Copy)]
pub struct KeyIdentity<F>(pub F);

impl<T, K, F> RowIdentity<T> for KeyIdentity<F>
where
    F: Fn(&T) -> K,
    K: PartialEq,
{
    fn same(&self, a: &T, b: &T) -> bool {
        (self.0)(a) == (self.0)(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_identity_compares_contents() {
        assert!(ValueIdentity.same(&"a".to_string(), &"a".to_string()));
        assert!(!ValueIdentity.same(&1, &2));
    }

    #[test]
    fn pointer_identity_ignores_equal_contents() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        assert!(PointerIdentity.same(&a, &a.clone()));
        assert!(!PointerIdentity.same(&a, &b));
    }

    #[test]
    fn absent_items_only_match_absent_items() {
        assert!(RowIdentity::<i32>::same_opt(&ValueIdentity, None, None));
        assert!(!ValueIdentity.same_opt(Some(&1), None));
    }

    #[test]
    fn key_identity_and_position() {
        let by_id = KeyIdentity(|row: &(u32, char)| row.0);
        let rows = [(1, 'a'), (2, 'b'), (2, 'c')];
        assert!(by_id.same(&(1, 'x'), &(1, 'y')));
        assert_eq!(by_id.position(&rows, &(2, 'z')), Some(1));
        assert_eq!(by_id.position(&rows, &(9, 'a')), None);
    }
}
