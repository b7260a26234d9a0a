use parking_portal::{
    Access, Authorizer, Decision, LandingPaths, Role, Session,
    authorizer::DEFAULT_LOGIN_PATH,
    decide,
    navigation::RouteTable,
};

// --- Helper Functions ---

fn session(role: Role) -> Session {
    Session::with_role(role)
}

/// Every (path, required role) pair in the portal table that needs a session.
fn protected_routes() -> Vec<(String, Role)> {
    RouteTable::parking_portal(DEFAULT_LOGIN_PATH)
        .records()
        .iter()
        .filter_map(|record| {
            record
                .access()
                .required_role()
                .map(|role| (record.pattern().replace(":id", "7"), role))
        })
        .collect()
}

fn other_role(role: Role) -> Role {
    match role {
        Role::Admin => Role::User,
        Role::User => Role::Admin,
    }
}

// --- Properties ---

#[test]
fn test_protected_routes_without_session_redirect_to_login() {
    for (path, role) in protected_routes() {
        assert_eq!(
            decide(Access::role(role), None, &path),
            Decision::redirect("/login"),
            "{path}"
        );
    }
}

#[test]
fn test_protected_routes_with_wrong_role_redirect_to_own_landing() {
    let landing = LandingPaths::default();
    for (path, required) in protected_routes() {
        let actual = other_role(required);
        let decision = decide(Access::role(required), Some(&session(actual)), &path);

        assert_eq!(decision, Decision::redirect(landing.for_role(actual)), "{path}");
        assert_ne!(decision.redirect_path(), Some(path.as_str()));
    }
}

#[test]
fn test_protected_routes_with_matching_role_allow() {
    for (path, role) in protected_routes() {
        assert!(decide(Access::role(role), Some(&session(role)), &path).is_allow(), "{path}");
    }
}

#[test]
fn test_guest_only_routes_bounce_active_sessions() {
    for path in ["/login", "/register"] {
        assert_eq!(
            decide(Access::Public, Some(&session(Role::Admin)), path),
            Decision::redirect("/admin/dashboard")
        );
        assert_eq!(
            decide(Access::Public, Some(&session(Role::User)), path),
            Decision::redirect("/user/dashboard")
        );
    }
}

#[test]
fn test_guest_only_routes_allow_without_session() {
    for path in ["/login", "/register"] {
        assert!(decide(Access::Public, None, path).is_allow());
    }
}

#[test]
fn test_authenticated_without_role_allows_any_session() {
    for role in Role::ALL {
        assert!(decide(Access::Authenticated, Some(&session(role)), "/profile").is_allow());
    }
    assert_eq!(
        decide(Access::Authenticated, None, "/profile"),
        Decision::redirect("/login")
    );
}

#[test]
fn test_open_routes_are_always_reachable() {
    assert!(decide(Access::Public, None, "/about").is_allow());
    assert!(decide(Access::Public, Some(&session(Role::User)), "/about").is_allow());
    assert!(decide(Access::Public, Some(&session(Role::Admin)), "/about").is_allow());
}

// --- Scenarios ---

#[test]
fn test_scenario_admin_dashboard_without_session() {
    let decision = decide(Access::role(Role::Admin), None, "/admin/dashboard");
    assert_eq!(decision, Decision::redirect("/login"));
}

#[test]
fn test_scenario_admin_dashboard_as_user() {
    let decision = decide(
        Access::role(Role::Admin),
        Some(&session(Role::User)),
        "/admin/dashboard",
    );
    assert_eq!(decision, Decision::redirect("/user/dashboard"));
}

#[test]
fn test_scenario_user_book_as_user() {
    let decision = decide(Access::role(Role::User), Some(&session(Role::User)), "/user/book");
    assert_eq!(decision, Decision::Allow);
}

#[test]
fn test_scenario_login_as_admin() {
    let decision = decide(Access::Public, Some(&session(Role::Admin)), "/login");
    assert_eq!(decision, Decision::redirect("/admin/dashboard"));
}

// --- Configuration ---

#[test]
fn test_custom_paths_are_honoured() {
    let authorizer = Authorizer::new(
        "/signin",
        ["/signin", "/signup/"],
        LandingPaths::new("/ops", "/home"),
    );

    assert_eq!(
        authorizer.decide(Access::role(Role::User), None, "/user/book"),
        Decision::redirect("/signin")
    );
    assert_eq!(
        authorizer.decide(Access::role(Role::Admin), Some(&session(Role::User)), "/ops"),
        Decision::redirect("/home")
    );
    // Trailing slashes do not matter for guest-only pages.
    assert_eq!(
        authorizer.decide(Access::Public, Some(&session(Role::Admin)), "/signup"),
        Decision::redirect("/ops")
    );
    assert!(authorizer.decide(Access::Public, Some(&session(Role::Admin)), "/login").is_allow());
}

#[test]
fn test_guest_only_check_ignores_empty_segments() {
    let admin = session(Role::Admin);
    let user = session(Role::User);

    for path in ["//login", "/login//", "//login/", "/register//", "///register"] {
        assert_eq!(
            decide(Access::Public, Some(&admin), path),
            Decision::redirect("/admin/dashboard"),
            "{path}"
        );
        assert_eq!(
            decide(Access::Public, Some(&user), path),
            Decision::redirect("/user/dashboard"),
            "{path}"
        );
        assert!(decide(Access::Public, None, path).is_allow(), "{path}");
    }
    // Collapsing empty segments must not merge distinct segments.
    assert!(decide(Access::Public, Some(&admin), "/log/in").is_allow());
}

#[test]
fn test_identity_fields_do_not_affect_decisions() {
    let full = Session {
        id: Some(42),
        username: Some("alice".to_string()),
        email: Some("alice@example.com".to_string()),
        role: Role::User,
    };
    assert_eq!(
        decide(Access::role(Role::User), Some(&full), "/user/history"),
        decide(Access::role(Role::User), Some(&session(Role::User)), "/user/history")
    );
}
