//! Route Table Index
//!
//! The application's page routes, segregated by access level the same way the
//! pages themselves are. Declaration order across modules is the match precedence:
//! public pages first, then admin pages.

use crate::{
    errors::GateError,
    gate::{Route, RouteTable},
};

/// Pages open to every visitor, signed in or not.
pub mod public;

/// Pages restricted to signed-in users holding the 'admin' role.
pub mod admin;

/// All page routes in declaration order.
pub fn app_routes() -> Result<Vec<Route>, GateError> {
    let mut routes = public::public_routes()?;
    routes.extend(admin::admin_routes()?);
    Ok(routes)
}

/// The validated route table the navigation gate runs against.
pub fn route_table() -> Result<RouteTable, GateError> {
    RouteTable::new(app_routes()?)
}
