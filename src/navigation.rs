use std::{collections::BTreeMap, collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    authorizer::{Authorizer, DEFAULT_LOGIN_PATH, DEFAULT_REGISTER_PATH},
    models::{Access, Decision, Role, RouteSummary, Session},
};

/// Upper bound on redirect hops for a single navigation.
pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route pattern `{0}` must start with `/`")]
    InvalidPattern(String),
    #[error("route pattern `{0}` has an unnamed parameter")]
    EmptyParam(String),
    #[error("route pattern `{0}` is declared twice")]
    DuplicatePattern(String),
    #[error("route name `{0}` is declared twice")]
    DuplicateName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("navigation to `{from}` exceeded {MAX_REDIRECTS} redirects: {hops:?}")]
    RedirectLoop { from: String, hops: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// What a route record points at: a named view behind an access requirement, or
/// another path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    View { name: String, access: Access },
    Redirect { to: String },
}

/// RouteRecord
///
/// One entry of the static route table. Patterns use `:name` for a single captured
/// segment, e.g. `/admin/parking-lots/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pattern: String,
    segments: Vec<Segment>,
    target: RouteTarget,
}

impl RouteRecord {
    fn parse(pattern: &str, target: RouteTarget) -> Result<Self, RouteTableError> {
        if !pattern.starts_with('/') {
            return Err(RouteTableError::InvalidPattern(pattern.to_string()));
        }

        let segments = split_segments(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some("") => Err(RouteTableError::EmptyParam(pattern.to_string())),
                Some(name) => Ok(Segment::Param(name.to_string())),
                None => Ok(Segment::Static(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            target,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn name(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::View { name, .. } => Some(name),
            RouteTarget::Redirect { .. } => None,
        }
    }

    /// Redirect records carry no requirement of their own; the guard runs on the target.
    pub fn access(&self) -> Access {
        match &self.target {
            RouteTarget::View { access, .. } => *access,
            RouteTarget::Redirect { .. } => Access::Public,
        }
    }

    // Parameter names do not distinguish patterns: `/a/:x` and `/a/:y` collide.
    fn shape(&self) -> Vec<Option<String>> {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(s) => Some(s.clone()),
                Segment::Param(_) => None,
            })
            .collect()
    }

    fn matches(&self, path: &[&str]) -> Option<BTreeMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            match segment {
                Segment::Static(expected) if expected == actual => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }

    pub fn summary(&self) -> RouteSummary {
        let redirect = match &self.target {
            RouteTarget::Redirect { to } => Some(to.clone()),
            RouteTarget::View { .. } => None,
        };
        RouteSummary {
            path: self.pattern.clone(),
            name: self.name().map(str::to_string),
            access: self.access(),
            redirect,
        }
    }
}

/// A route record together with the parameters captured from the requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub record: &'a RouteRecord,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    records: Vec<(String, RouteTarget)>,
}

impl RouteTableBuilder {
    pub fn view(mut self, pattern: &str, name: &str, access: Access) -> Self {
        self.records.push((
            pattern.to_string(),
            RouteTarget::View {
                name: name.to_string(),
                access,
            },
        ));
        self
    }

    pub fn redirect(mut self, pattern: &str, to: &str) -> Self {
        self.records
            .push((pattern.to_string(), RouteTarget::Redirect { to: to.to_string() }));
        self
    }

    pub fn build(self) -> Result<RouteTable, RouteTableError> {
        let mut patterns = HashSet::new();
        let mut names = HashSet::new();
        let mut records = Vec::with_capacity(self.records.len());

        for (pattern, target) in self.records {
            let record = RouteRecord::parse(&pattern, target)?;
            if !patterns.insert(record.shape()) {
                return Err(RouteTableError::DuplicatePattern(pattern));
            }
            if let Some(name) = record.name() {
                if !names.insert(name.to_string()) {
                    return Err(RouteTableError::DuplicateName(name.to_string()));
                }
            }
            records.push(record);
        }

        Ok(RouteTable { records })
    }
}

/// RouteTable
///
/// The immutable URL-to-view map of the portal, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// parking_portal
    ///
    /// The portal's route table: guest entry pages, the admin area and the user area.
    /// `login_path` is where the Login view lives and where `/` forwards to.
    ///
    /// # Panics
    /// If `login_path` is not an absolute path pattern, or if it collides with another
    /// record of the table (`/`, `/register`, or any admin/user page).
    pub fn parking_portal(login_path: &str) -> Self {
        let admin = Access::role(Role::Admin);
        let user = Access::role(Role::User);

        Self::builder()
            .redirect("/", login_path)
            .view(login_path, "Login", Access::Public)
            .view(DEFAULT_REGISTER_PATH, "Register", Access::Public)
            // Admin area
            .view("/admin/dashboard", "AdminDashboard", admin)
            .view("/admin/parking-lots", "AdminParkingLots", admin)
            .view("/admin/parking-lots/:id", "AdminParkingLotDetails", admin)
            .view("/admin/users", "AdminUsers", admin)
            .view("/admin/charts", "AdminCharts", admin)
            // User area
            .view("/user/dashboard", "UserDashboard", user)
            .view("/user/book", "UserBooking", user)
            .view("/user/history", "UserHistory", user)
            .build()
            .expect("FATAL: built-in route table is invalid")
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    /// resolve
    ///
    /// Finds the first record matching `path`. Query string and fragment are ignored,
    /// as are empty segments (so `/user/book/` resolves like `/user/book`).
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segments: Vec<&str> = split_segments(strip_query(path)).collect();
        self.records.iter().find_map(|record| {
            record
                .matches(&segments)
                .map(|params| RouteMatch { record, params })
        })
    }

    /// The access requirement for `path`; unmatched paths have none.
    pub fn access_for(&self, path: &str) -> Access {
        self.resolve(path)
            .map(|m| m.record.access())
            .unwrap_or(Access::Public)
    }
}

/// Navigation
///
/// The settled result of opening a path: where the client ends up, the redirects taken
/// on the way, and what is shown there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Navigation {
    pub path: String,
    pub redirects: Vec<String>,
    pub outcome: Outcome,
}

impl Navigation {
    pub fn redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Outcome {
    Render {
        view: String,
        params: BTreeMap<String, String>,
    },
    NotFound,
}

/// Navigator
///
/// Resolves a path against the route table and runs the authorizer on every hop, the
/// way the client router re-enters its guard after each redirect.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: RouteTable,
    authorizer: Authorizer,
}

pub type NavigatorState = Arc<Navigator>;

impl Navigator {
    pub fn new(table: RouteTable, authorizer: Authorizer) -> Self {
        Self { table, authorizer }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Single guard check for `path`, without following redirects.
    pub fn decide(&self, path: &str, session: Option<&Session>) -> Decision {
        let path = strip_query(path);
        self.authorizer
            .decide(self.table.access_for(path), session, path)
    }

    pub fn navigate(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<Navigation, NavigationError> {
        let mut current = strip_query(path).to_string();
        let mut redirects = Vec::new();

        loop {
            let next = match self.table.resolve(&current) {
                Some(RouteMatch { record, params }) => match record.target() {
                    RouteTarget::Redirect { to } => to.clone(),
                    RouteTarget::View { name, access } => {
                        match self.authorizer.decide(*access, session, &current) {
                            Decision::Allow => {
                                return Ok(Navigation {
                                    path: current,
                                    redirects,
                                    outcome: Outcome::Render {
                                        view: name.clone(),
                                        params,
                                    },
                                });
                            }
                            Decision::RedirectTo { path } => path,
                        }
                    }
                },
                None => match self.authorizer.decide(Access::Public, session, &current) {
                    Decision::Allow => {
                        return Ok(Navigation {
                            path: current,
                            redirects,
                            outcome: Outcome::NotFound,
                        });
                    }
                    Decision::RedirectTo { path } => path,
                },
            };

            if redirects.len() == MAX_REDIRECTS {
                return Err(NavigationError::RedirectLoop {
                    from: path.to_string(),
                    hops: redirects,
                });
            }
            redirects.push(next.clone());
            current = next;
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RouteTable::parking_portal(DEFAULT_LOGIN_PATH), Authorizer::default())
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
