use crate::{
    errors::GateError,
    gate::{PageId, Route},
};

/// Public Route Module
///
/// Pages reachable without a session. None of these carry access flags, so the gate
/// always lets navigation through once the path matches.
pub fn public_routes() -> Result<Vec<Route>, GateError> {
    Ok(vec![
        Route::new("/", PageId::Home)?.named("Home"),
        // --- Account flows ---
        // The login page is the redirect target for unauthenticated navigation, so it
        // must stay ungated.
        Route::new("/auth/login", PageId::Login)?,
        Route::new("/auth/register", PageId::Register)?,
        Route::new("/auth/forgot-password", PageId::ForgotPassword)?,
        Route::new("/auth/reset-password", PageId::ResetPassword)?,
        // Path spelling is what existing links point at.
        Route::new("/succesbanner", PageId::SuccessBanner)?,
        // --- Catalog ---
        // The captured species name is the binomial as it appears in links,
        // e.g. /species/Puma_concolor.
        Route::new("/species/:species_name", PageId::SpeciesList)?,
        Route::new("/observations/:source_id", PageId::Observations)?,
        // --- Map & visualizations ---
        Route::new("/map", PageId::Map)?,
        Route::new("/piechart", PageId::PieChart)?,
        Route::new("/linechart", PageId::LineChart)?,
        Route::new("/visualizations", PageId::Visualizations)?.named("Visualizations"),
        Route::new("/imagegallery", PageId::ImageGallery)?,
        Route::new("/commentsection", PageId::CommentSection)?,
        Route::new("/upload", PageId::Upload)?,
        // --- Profiles ---
        // Without a userId these show the current user's own profile.
        Route::new("/editprofile/:userId?", PageId::EditProfile)?.named("EditOtherProfile"),
        Route::new("/profile/:userId?", PageId::UserProfile)?.named("UserProfile"),
    ])
}
