use std::sync::LazyLock;

use crate::models::{Access, Decision, Role, Session};

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_REGISTER_PATH: &str = "/register";
pub const DEFAULT_ADMIN_LANDING: &str = "/admin/dashboard";
pub const DEFAULT_USER_LANDING: &str = "/user/dashboard";

/// LandingPaths
///
/// Maps each role to the page it lands on after login or after being bounced from a
/// page it may not open. Adding a variant to `Role` will not compile until it is given
/// a landing path here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingPaths {
    admin: String,
    user: String,
}

impl LandingPaths {
    pub fn new(admin: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            admin: admin.into(),
            user: user.into(),
        }
    }

    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin,
            Role::User => &self.user,
        }
    }
}

impl Default for LandingPaths {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_LANDING, DEFAULT_USER_LANDING)
    }
}

/// Authorizer
///
/// The per-navigation access check. It holds only static configuration (the login path,
/// the guest-only entry pages and the landing map); the session is always handed in by
/// the caller, so `decide` is a pure function of its three inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorizer {
    login_path: String,
    guest_only: Vec<String>,
    landing: LandingPaths,
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_LOGIN_PATH,
            [DEFAULT_LOGIN_PATH, DEFAULT_REGISTER_PATH],
            LandingPaths::default(),
        )
    }
}

impl Authorizer {
    /// new
    ///
    /// `guest_only` lists the entry pages (login, register) that an authenticated
    /// session is sent away from. Paths are compared segment by segment, so empty
    /// segments (`//login`, `/register/`) do not matter.
    pub fn new<I, P>(login_path: impl Into<String>, guest_only: I, landing: LandingPaths) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            login_path: login_path.into(),
            guest_only: guest_only
                .into_iter()
                .map(|p| {
                    let p: String = p.into();
                    normalize_path(&p)
                })
                .collect(),
            landing,
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing(&self) -> &LandingPaths {
        &self.landing
    }

    pub fn is_guest_only(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.guest_only.iter().any(|p| *p == path)
    }

    /// decide
    ///
    /// Evaluates one navigation attempt:
    /// 1. Protected target, no session: go to the login page.
    /// 2. Protected target, session holds a different role than required: go to the
    ///    session role's landing page, never the target.
    /// 3. Protected target, role matches (or the route names no role): allow.
    /// 4. Open target: a session asking for a guest-only entry page goes to its landing
    ///    page; everything else is allowed.
    pub fn decide(&self, access: Access, session: Option<&Session>, target_path: &str) -> Decision {
        let decision = match (access.requires_auth(), session) {
            (true, None) => Decision::redirect(self.login_path.as_str()),
            (true, Some(session)) => match access.required_role() {
                Some(required) if required != session.role => {
                    Decision::redirect(self.landing.for_role(session.role))
                }
                _ => Decision::Allow,
            },
            (false, Some(session)) if self.is_guest_only(target_path) => {
                Decision::redirect(self.landing.for_role(session.role))
            }
            (false, _) => Decision::Allow,
        };

        tracing::debug!(
            path = target_path,
            role = session.map(|s| s.role.as_str()).unwrap_or("anonymous"),
            ?access,
            ?decision,
            "navigation decided"
        );

        decision
    }
}

static DEFAULT_AUTHORIZER: LazyLock<Authorizer> = LazyLock::new(Authorizer::default);

/// decide
///
/// `Authorizer::decide` with the portal's stock paths (`/login`, `/register`,
/// `/admin/dashboard`, `/user/dashboard`).
pub fn decide(access: Access, session: Option<&Session>, target_path: &str) -> Decision {
    DEFAULT_AUTHORIZER.decide(access, session, target_path)
}

// Same segmentation as route matching: query, fragment and empty segments are dropped.
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
