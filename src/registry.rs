use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::domain::AirscopeError;

/// Views that render dataset rows as selectable marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    Map,
}

/// Maps the position of a rendered mark back to its row in the dataset.
///
/// Every view that can originate a selection registers the dataset rows it
/// renders, in render order. A mark position is only ever turned into a row
/// index through [`RowIndexRegistry::resolve`].
#[derive(Debug, Default)]
pub struct RowIndexRegistry {
    mappings: HashMap<ViewId, Arc<Vec<usize>>>,
}

impl RowIndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the mapping of `view`. Called on every redraw of the view.
    pub fn register(&mut self, view: ViewId, rows: impl Into<Arc<Vec<usize>>>) {
        let rows = rows.into();
        trace!("Registering {} marks for {:?}", rows.len(), view);
        self.mappings.insert(view, rows);
    }

    pub fn resolve(&self, view: ViewId, mark_position: usize) -> Result<usize, AirscopeError> {
        let rows = self.mappings.get(&view);
        rows.and_then(|rows| rows.get(mark_position).copied())
            .ok_or(AirscopeError::UnknownMark {
                view,
                position: mark_position,
                len: rows.map(|r| r.len()).unwrap_or(0),
            })
    }

    pub fn mapping(&self, view: ViewId) -> Option<Arc<Vec<usize>>> {
        self.mappings.get(&view).map(Arc::clone)
    }

    pub fn mark_count(&self, view: ViewId) -> usize {
        self.mappings.get(&view).map(|r| r.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_registered_mapping() {
        let mut registry = RowIndexRegistry::new();
        registry.register(ViewId::Map, vec![5, 2, 8, 1]);
        assert_eq!(registry.resolve(ViewId::Map, 2).unwrap(), 8);
        assert_eq!(registry.resolve(ViewId::Map, 0).unwrap(), 5);
        assert_eq!(registry.mark_count(ViewId::Map), 4);
    }

    #[test]
    fn out_of_range_mark_is_unknown() {
        let mut registry = RowIndexRegistry::new();
        registry.register(ViewId::Map, vec![5, 2, 8, 1]);
        match registry.resolve(ViewId::Map, 9) {
            Err(AirscopeError::UnknownMark { position, len, .. }) => {
                assert_eq!(position, 9);
                assert_eq!(len, 4);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn unregistered_view_is_unknown() {
        let registry = RowIndexRegistry::new();
        assert!(matches!(
            registry.resolve(ViewId::Map, 0),
            Err(AirscopeError::UnknownMark { len: 0, .. })
        ));
        assert!(registry.mapping(ViewId::Map).is_none());
    }

    #[test]
    fn register_replaces_previous_mapping() {
        let mut registry = RowIndexRegistry::new();
        registry.register(ViewId::Map, vec![0, 1, 2, 3, 4]);
        registry.register(ViewId::Map, vec![3, 4]);
        assert_eq!(registry.resolve(ViewId::Map, 1).unwrap(), 4);
        assert!(registry.resolve(ViewId::Map, 2).is_err());
    }
}
