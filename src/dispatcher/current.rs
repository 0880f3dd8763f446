use std::cell::RefCell;

use crate::types::RouteId;

thread_local! {
    static CURRENT_ROUTE: RefCell<Option<RouteId>> = const { RefCell::new(None) };
}

pub(crate) fn set_current_route(route: Option<RouteId>) {
    CURRENT_ROUTE.with(|cell| *cell.borrow_mut() = route);
}

/// Identifier matched by the latest dispatch on this thread, if it found a
/// route.
pub fn current_route_identifier() -> Option<RouteId> {
    CURRENT_ROUTE.with(|cell| cell.borrow().clone())
}
