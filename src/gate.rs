use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    errors::GateError,
    session::{Session, SessionStore},
};

/// The role a session must carry to enter admin-only pages. Compared exactly.
pub const ADMIN_ROLE: &str = "admin";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_HOME_PATH: &str = "/";

/// Captured path parameters, keyed by the name declared in the pattern.
pub type RouteParams = BTreeMap<String, String>;

/// PageId
///
/// Logical page a route is bound to. The page renderer maps these onto views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub enum PageId {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    SuccessBanner,
    SpeciesList,
    Observations,
    Map,
    PieChart,
    LineChart,
    Visualizations,
    ImageGallery,
    CommentSection,
    Upload,
    EditProfile,
    UserProfile,
    AdminDashboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param { name: String, optional: bool },
}

/// RoutePattern
///
/// A parsed path pattern such as `/species/:species_name` or `/profile/:userId?`.
/// Static segments match ASCII case-insensitively; a parameter captures exactly one
/// segment, or none when marked optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, GateError> {
        let invalid = |reason: &str| GateError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let mut segments = Vec::new();
        let mut seen = HashSet::new();

        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            if let Some(param) = raw.strip_prefix(':') {
                let (name, optional) = match param.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (param, false),
                };
                if name.is_empty() {
                    return Err(invalid("parameter name is empty"));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(invalid("parameter names may only contain [A-Za-z0-9_]"));
                }
                if !seen.insert(name.to_string()) {
                    return Err(invalid("parameter name is repeated"));
                }
                segments.push(Segment::Param {
                    name: name.to_string(),
                    optional,
                });
            } else {
                if raw.contains([':', '?', '*', '#']) {
                    return Err(invalid("static segment contains a reserved character"));
                }
                segments.push(Segment::Static(raw.to_string()));
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Returns the captured parameters when `path` structurally matches this pattern.
    /// Query strings and fragments are ignored, as are empty segments.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let parts = path_segments(path);
        let mut captures = RouteParams::new();
        match_from(&self.segments, &parts, &mut captures).then_some(captures)
    }

    /// Builds a concrete path, percent-encoding parameter values.
    /// On failure returns the name of the first required parameter left unset.
    fn build(&self, params: &[(&str, &str)]) -> Result<String, String> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, value)| *key == name && !value.is_empty())
                .map(|(_, value)| *value)
        };

        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(s) => {
                    path.push('/');
                    path.push_str(s);
                }
                Segment::Param { name, optional } => match lookup(name) {
                    Some(value) => {
                        path.push('/');
                        path.push_str(&urlencoding::encode(value));
                    }
                    None if *optional => {}
                    None => return Err(name.clone()),
                },
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn path_segments(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn match_from(segments: &[Segment], parts: &[&str], captures: &mut RouteParams) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match segment {
        Segment::Static(expected) => match parts.split_first() {
            Some((part, tail)) if part.eq_ignore_ascii_case(expected) => {
                match_from(rest, tail, captures)
            }
            _ => false,
        },
        Segment::Param { name, optional } => {
            if let Some((part, tail)) = parts.split_first() {
                captures.insert(name.clone(), decode_segment(part));
                if match_from(rest, tail, captures) {
                    return true;
                }
                captures.remove(name);
            }
            *optional && match_from(rest, parts, captures)
        }
    }
}

/// Route
///
/// A path pattern bound to a page, with its access flags. Both flags default to off.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: RoutePattern,
    page: PageId,
    name: Option<String>,
    requires_auth: bool,
    requires_admin: bool,
}

impl Route {
    pub fn new(pattern: &str, page: PageId) -> Result<Self, GateError> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            page,
            name: None,
            requires_auth: false,
            requires_admin: false,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Only sessions holding a token may enter.
    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Sets only the admin flag. The route still needs a token, see `requires_auth`.
    pub fn with_admin(mut self) -> Self {
        self.requires_admin = true;
        self
    }

    /// Only sessions holding a token and the admin role may enter.
    pub fn admin_only(self) -> Self {
        self.with_auth().with_admin()
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn page(&self) -> PageId {
        self.page
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Admin routes always need a token as well, whatever flags they were built with.
    pub fn requires_auth(&self) -> bool {
        self.requires_auth || self.requires_admin
    }

    pub fn requires_admin(&self) -> bool {
        self.requires_admin
    }

    fn is_gated(&self) -> bool {
        self.requires_auth() || self.requires_admin()
    }
}

/// RouteTable
///
/// Ordered list of routes. Declaration order is the precedence rule: the first route
/// whose pattern matches a path wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Result<Self, GateError> {
        let mut names = HashSet::new();
        for name in routes.iter().filter_map(Route::name) {
            if !names.insert(name) {
                return Err(GateError::DuplicateRouteName(name.to_string()));
            }
        }
        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn match_path(&self, path: &str) -> Option<(&Route, RouteParams)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    /// Reverse routing: builds the concrete path of a named route.
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Result<String, GateError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.name() == Some(name))
            .ok_or_else(|| GateError::UnknownRouteName(name.to_string()))?;

        route
            .pattern
            .build(params)
            .map_err(|param| GateError::MissingParam {
                route: name.to_string(),
                param,
            })
    }
}

/// Why a navigation was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RedirectReason {
    /// The route needs a session token and none was present.
    Unauthenticated,
    /// The route needs the admin role and the session lacks it.
    Forbidden,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::Unauthenticated => "unauthenticated",
            RedirectReason::Forbidden => "forbidden",
        }
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision
///
/// Outcome of resolving one navigation. The caller performs the actual page change
/// or location update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, TS)]
#[serde(tag = "decision", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Proceed {
        page: PageId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[ts(optional)]
        name: Option<String>,
        params: BTreeMap<String, String>,
    },
    Redirect {
        to: String,
        reason: RedirectReason,
    },
}

impl Decision {
    pub fn page(&self) -> Option<PageId> {
        match self {
            Decision::Proceed { page, .. } => Some(*page),
            Decision::Redirect { .. } => None,
        }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, Decision::Proceed { .. })
    }
}

/// NavigationGate
///
/// Maps a target path onto a page and enforces the route's access flags against the
/// session passed in. Holds no mutable state, so resolving the same (path, session)
/// pair twice yields the same decision.
#[derive(Debug, Clone)]
pub struct NavigationGate {
    table: RouteTable,
    login_path: String,
    home_path: String,
}

impl NavigationGate {
    pub fn new(table: RouteTable) -> Result<Self, GateError> {
        Self::with_redirects(table, DEFAULT_LOGIN_PATH, DEFAULT_HOME_PATH)
    }

    pub fn with_redirects(
        table: RouteTable,
        login_path: &str,
        home_path: &str,
    ) -> Result<Self, GateError> {
        // Redirecting onto a gated page could bounce forever.
        for target in [login_path, home_path] {
            match table.match_path(target) {
                Some((route, _)) if !route.is_gated() => {}
                _ => return Err(GateError::InvalidRedirect(target.to_string())),
            }
        }

        Ok(Self {
            table,
            login_path: login_path.to_string(),
            home_path: home_path.to_string(),
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    pub fn resolve(&self, target: &str, session: &Session) -> Result<Decision, GateError> {
        let Some((route, params)) = self.table.match_path(target) else {
            tracing::warn!(path = %target, "No route matches navigation target");
            return Err(GateError::RouteNotFound {
                path: target.to_string(),
            });
        };

        // Authentication is checked first; a missing token never reaches the role check.
        if route.requires_auth() && !session.is_authenticated() {
            return Ok(self.redirect(target, &self.login_path, RedirectReason::Unauthenticated));
        }

        if route.requires_admin() && !session.user.has_role(ADMIN_ROLE) {
            return Ok(self.redirect(target, &self.home_path, RedirectReason::Forbidden));
        }

        tracing::debug!(path = %target, page = ?route.page(), "Navigation allowed");
        Ok(Decision::Proceed {
            page: route.page(),
            name: route.name().map(str::to_string),
            params,
        })
    }

    /// Resolves against a single snapshot of the store.
    pub fn navigate(&self, target: &str, store: &dyn SessionStore) -> Result<Decision, GateError> {
        let session = store.snapshot();
        self.resolve(target, &session)
    }

    fn redirect(&self, from: &str, to: &str, reason: RedirectReason) -> Decision {
        tracing::info!(path = %from, redirect_to = %to, %reason, "Navigation redirected");
        Decision::Redirect {
            to: to.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_pattern_matches_only_root() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/map").is_none());
    }

    #[test]
    fn required_param_captures_segment() {
        let pattern = RoutePattern::parse("/observations/:source_id").unwrap();
        let params = pattern.matches("/observations/12345").unwrap();
        assert_eq!(params.get("source_id").map(String::as_str), Some("12345"));
        assert!(pattern.matches("/observations").is_none());
        assert!(pattern.matches("/observations/1/2").is_none());
    }

    #[test]
    fn optional_param_may_be_absent() {
        let pattern = RoutePattern::parse("/profile/:userId?").unwrap();
        assert!(pattern.matches("/profile").unwrap().is_empty());
        assert_eq!(
            pattern.matches("/profile/42").unwrap().get("userId").map(String::as_str),
            Some("42")
        );
    }

    #[test]
    fn optional_param_before_static_tail() {
        let pattern = RoutePattern::parse("/a/:b?/c").unwrap();
        assert!(pattern.matches("/a/c").unwrap().is_empty());
        assert_eq!(
            pattern.matches("/a/x/c").unwrap().get("b").map(String::as_str),
            Some("x")
        );
        assert!(pattern.matches("/a/x").is_none());
    }

    #[test]
    fn trailing_slash_query_and_fragment_are_ignored() {
        let pattern = RoutePattern::parse("/map").unwrap();
        assert!(pattern.matches("/map/").is_some());
        assert!(pattern.matches("/map?family=Felidae").is_some());
        assert!(pattern.matches("/map#top").is_some());
    }

    #[test]
    fn static_segments_are_case_insensitive_params_are_not() {
        let pattern = RoutePattern::parse("/species/:species_name").unwrap();
        let params = pattern.matches("/Species/Puma_concolor").unwrap();
        assert_eq!(params["species_name"], "Puma_concolor");
    }

    #[test]
    fn captured_values_are_percent_decoded() {
        let pattern = RoutePattern::parse("/species/:species_name").unwrap();
        let params = pattern.matches("/species/Puma%20concolor").unwrap();
        assert_eq!(params["species_name"], "Puma concolor");
    }

    #[test]
    fn undecodable_capture_keeps_raw_value() {
        let pattern = RoutePattern::parse("/species/:species_name").unwrap();
        let params = pattern.matches("/species/%FF").unwrap();
        assert_eq!(params["species_name"], "%FF");
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        for bad in ["species", "/species/:", "/a/:b-c", "/a/:id/:id", "/a*"] {
            assert!(
                matches!(RoutePattern::parse(bad), Err(GateError::InvalidPattern { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn build_encodes_and_skips_optional() {
        let pattern = RoutePattern::parse("/profile/:userId?").unwrap();
        assert_eq!(pattern.build(&[]).unwrap(), "/profile");
        assert_eq!(pattern.build(&[("userId", "a b")]).unwrap(), "/profile/a%20b");

        let required = RoutePattern::parse("/species/:species_name").unwrap();
        assert_eq!(required.build(&[]).unwrap_err(), "species_name");
    }

    #[test]
    fn admin_flag_implies_auth() {
        let route = Route::new("/x", PageId::AdminDashboard).unwrap().with_admin();
        assert!(route.requires_auth());
        assert!(route.requires_admin());

        let both = Route::new("/z", PageId::AdminDashboard).unwrap().admin_only();
        assert!(both.requires_auth());
        assert!(both.requires_admin());

        let plain = Route::new("/y", PageId::Map).unwrap();
        assert!(!plain.requires_auth());
        assert!(!plain.requires_admin());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let routes = vec![
            Route::new("/", PageId::Home).unwrap().named("Home"),
            Route::new("/home", PageId::Home).unwrap().named("Home"),
        ];
        assert_eq!(
            RouteTable::new(routes).unwrap_err(),
            GateError::DuplicateRouteName("Home".to_string())
        );
    }

    #[test]
    fn redirect_targets_must_be_ungated() {
        let table = RouteTable::new(vec![
            Route::new("/", PageId::Home).unwrap(),
            Route::new("/auth/login", PageId::Login).unwrap().with_auth(),
        ])
        .unwrap();
        assert_eq!(
            NavigationGate::new(table).unwrap_err(),
            GateError::InvalidRedirect("/auth/login".to_string())
        );
    }
}
