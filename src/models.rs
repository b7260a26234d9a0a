use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Identity ---

/// Role
///
/// The two account kinds of the parking portal. The backend derives it from the
/// `is_admin` flag on the user record and ships it to the client as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // Exact match only; "Admin" is not a role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Session
///
/// The identity/role pair of the current client, as written to client storage at login
/// and removed at logout. Only `role` takes part in navigation decisions; the identity
/// fields are carried along for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    pub role: Role,
}

impl Session {
    /// A session with a role and no identity fields.
    pub fn with_role(role: Role) -> Self {
        Self {
            id: None,
            username: None,
            email: None,
            role,
        }
    }
}

// --- Access Policy ---

/// Access
///
/// The access requirement declared on a route. `Authenticated` covers routes that
/// demand a session without naming a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "requires", rename_all = "snake_case")]
#[ts(export)]
pub enum Access {
    Public,
    Authenticated,
    Role { role: Role },
}

impl Access {
    pub fn role(role: Role) -> Self {
        Access::Role { role }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Access::Public)
    }

    /// The role a session must hold, if the route names one.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Access::Role { role } => Some(*role),
            _ => None,
        }
    }
}

/// Decision
///
/// Outcome of a single navigation check: proceed to the target, or go somewhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Allow,
    RedirectTo { path: String },
}

impl Decision {
    pub fn redirect(path: impl Into<String>) -> Self {
        Decision::RedirectTo { path: path.into() }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectTo { path } => Some(path),
        }
    }
}

// --- Request Payloads ---

/// DecideRequest
///
/// Input for `POST /api/navigation/decide`. The session is passed explicitly; a missing
/// or `null` session means the caller is unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecideRequest {
    #[schema(example = "/admin/dashboard")]
    pub path: String,
    #[serde(default)]
    pub session: Option<Session>,
}

/// ResolveQuery
///
/// Query parameters for `GET /api/navigation/resolve`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    /// The path the client wants to open, e.g. `/user/book`.
    pub path: String,
}

// --- Response Schemas ---

/// RouteSummary
///
/// One row of the static route table as exposed by `GET /api/navigation/routes`.
/// Exactly one of `name` or `redirect` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RouteSummary {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub access: Access,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// PageView
///
/// What a guarded page request renders: the view name bound to the route plus the
/// captured path parameters (e.g. the parking lot `id`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub view: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
}
