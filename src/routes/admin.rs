use crate::{
    errors::GateError,
    gate::{PageId, Route},
};

/// Admin Route Module
///
/// Pages only administrators may open. Every route here is built with
/// `Route::admin_only`, which sets both the auth and the admin flag: a visitor
/// without a token is sent to the login page, a signed-in user without the 'admin'
/// role is sent home.
pub fn admin_routes() -> Result<Vec<Route>, GateError> {
    Ok(vec![
        // Moderation overview: pending observations, users, comment reports.
        Route::new("/admin/dashboard", PageId::AdminDashboard)?
            .named("AdminDashboard")
            .admin_only(),
    ])
}
