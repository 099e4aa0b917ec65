//! End-to-end resolution tests over YAML declarations.

use fleet_governance::{
    resolve, Deferred, GovernanceError, GovernanceSettings, OverrideStore, Permission,
    RepoPolicyResolver, RepositoryConfig, TeamConfig, TeamResolver, TeamRole,
    VAR_REPO_ENVIRONMENTS, VAR_REPO_ENV_COMPARISON,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const TEAMS: &str = r#"
- name: admin
  description: Organization administrators
  members:
    - username: alice
      role: maintainer
- name: backend
  description: Backend engineers
  members:
    - username: bob
      role: member
    - username: carol
      role: maintainer
- name: docs
"#;

const REPOS: &str = r#"
- name: api
  description: Public API
  visibility: private
  actionsAccess: org
  teams:
    - name: backend
      permission: push
  environments: [sandbox, production]
- name: site
  visibility: public
  teams:
    - name: docs
      permission: maintain
  environments: [production]
- name: notes
  visibility: private
"#;

fn store() -> OverrideStore {
    let mut store = OverrideStore::new();
    store.add_deployment_branches("sandbox", ["dev/*"]);
    store.add_deployment_branches("production", ["release/*"]);

    store.add_variable("REGION", "us-east-1", None);
    store.add_variable("REGION", "eu-west-1", Some("api"));
    store.add_secret("DEPLOY_TOKEN", Deferred::pending("deploy-token.value"), None);

    store.add_webhook("ci", "https://ci.example.com/hook", ["push", "pull_request"], None);
    store.add_webhook("ci", "https://ci.example.com/api", ["push"], Some("api"));

    store.add_status_checks("production", ["ci/build", "ci/test"], None);
    store.add_status_checks("production", ["ci/e2e"], Some("api"));

    store.add_environment_variable("production", "URL", "https://prod.example.com", None);
    store
}

#[test]
fn test_full_resolution() {
    init_tracing();

    let settings = GovernanceSettings::new("acme");
    let teams = TeamConfig::parse_list(TEAMS).unwrap();
    let repos = RepositoryConfig::parse_list(REPOS).unwrap();
    let store = store();

    let model = resolve(&settings, teams, &repos, &store).unwrap();
    assert_eq!(model.repositories.len(), 3);
    assert_eq!(model.teams.len(), 3);
    assert_eq!(
        model.teams.require("backend").unwrap().role_of("carol"),
        Some(TeamRole::Maintainer)
    );

    // api: sandbox gate, own overrides, shared workflows
    let api = model.repository("api").unwrap();
    assert!(api.shared_workflow_access);
    assert_eq!(api.teams["backend"], Permission::Push);
    assert_eq!(api.teams["admin"], Permission::Admin);
    assert_eq!(api.environments["production"].deployment_policies, vec!["release/*"]);
    assert_eq!(api.environments["sandbox"].deployment_policies, vec!["dev/*"]);
    assert_eq!(api.variables[VAR_REPO_ENV_COMPARISON], Deferred::from("sandbox"));
    assert_eq!(
        api.variables[VAR_REPO_ENVIRONMENTS],
        Deferred::from(r#"["sandbox","production"]"#)
    );
    assert_eq!(api.variables["REGION"], Deferred::from("eu-west-1"));
    assert!(api.secrets["DEPLOY_TOKEN"].is_pending());
    assert_eq!(api.webhooks["ci"].url, Deferred::from("https://ci.example.com/api"));
    assert_eq!(
        api.environments["production"].variables["URL"],
        Deferred::from("https://prod.example.com")
    );

    let production = &api.branch_protections["production/*"];
    assert_eq!(production.required_status_checks, vec!["ci/e2e"]);
    assert!(production.allows_push_from("admin"));
    assert!(production.allows_push_from("backend"));
    assert!(!production.allows_push_from("docs"));
    // api has its own status-check set, so no wildcard checks for sandbox
    assert!(api.branch_protections["sandbox/*"].required_status_checks.is_empty());

    // site: no sandbox, production open to every branch, wildcard checks
    let site = model.repository("site").unwrap();
    assert_eq!(
        site.environments["production"].deployment_policies,
        vec!["release/*", "*/*"]
    );
    assert_eq!(site.variables[VAR_REPO_ENV_COMPARISON], Deferred::from("production"));
    assert_eq!(site.variables["REGION"], Deferred::from("us-east-1"));
    assert_eq!(
        site.branch_protections["production/*"].required_status_checks,
        vec!["ci/build", "ci/test"]
    );
    assert_eq!(site.webhooks["ci"].events, vec!["push", "pull_request"]);

    // notes: no environments declared
    let notes = model.repository("notes").unwrap();
    assert!(notes.environments.is_empty());
    assert!(notes.branch_protections.is_empty());
    assert!(!notes.variables.contains_key(VAR_REPO_ENVIRONMENTS));
    assert_eq!(notes.teams.len(), 1);
}

#[test]
fn test_single_production_example() {
    let settings = GovernanceSettings::new("acme");
    let repos = RepositoryConfig::parse_list(
        r#"
- name: svc
  visibility: public
  teams: []
  environments: [production]
"#,
    )
    .unwrap();
    let mut store = OverrideStore::new();
    store.add_deployment_branches("production", Vec::<String>::new());

    let model = resolve(&settings, vec![TeamConfig::empty("admin")], &repos, &store).unwrap();
    let svc = model.repository("svc").unwrap();

    assert_eq!(svc.environments["production"].deployment_policies, vec!["*/*"]);
    assert_eq!(svc.teams.len(), 1);
    assert_eq!(svc.teams["admin"], Permission::Admin);
}

#[test]
fn test_sandbox_and_production_example() {
    let settings = GovernanceSettings::new("acme");
    let repos = RepositoryConfig::parse_list(
        r#"
- name: svc
  visibility: public
  environments: [sandbox, production]
"#,
    )
    .unwrap();
    let mut store = OverrideStore::new();
    store.add_deployment_branches("sandbox", ["dev/*"]);
    store.add_deployment_branches("production", ["release/*"]);

    let model = resolve(&settings, vec![], &repos, &store).unwrap();
    let svc = model.repository("svc").unwrap();

    assert_eq!(svc.environments["production"].deployment_policies, vec!["release/*"]);
    assert_eq!(svc.variables[VAR_REPO_ENV_COMPARISON], Deferred::from("sandbox"));
}

#[test]
fn test_failures_abort_whole_run() {
    let settings = GovernanceSettings::new("acme");
    let store = store();

    let cases: Vec<(&str, fn(&GovernanceError) -> bool)> = vec![
        (
            "- name: \"\"\n  visibility: public\n",
            |e| matches!(e, GovernanceError::InvalidRepository { .. }),
        ),
        (
            "- name: svc\n  visibility: internal\n",
            |e| matches!(e, GovernanceError::InvalidRepository { .. }),
        ),
        (
            "- name: svc\n  visibility: public\n  teams:\n    - name: backend\n      \
             permission: write\n",
            |e| matches!(e, GovernanceError::InvalidPermission { .. }),
        ),
        (
            "- name: svc\n  visibility: public\n  teams:\n    - name: ghost\n      \
             permission: push\n",
            |e| matches!(e, GovernanceError::TeamNotFound(_)),
        ),
        (
            "- name: svc\n  visibility: public\n  environments: [staging]\n",
            |e| matches!(e, GovernanceError::MissingBranchPolicy(_)),
        ),
    ];

    for (yaml, expected) in cases {
        // The valid repository declared first must not leak into a result
        let mut repos = RepositoryConfig::parse_list(REPOS).unwrap();
        repos.extend(RepositoryConfig::parse_list(yaml).unwrap());

        let err = resolve(&settings, TeamConfig::parse_list(TEAMS).unwrap(), &repos, &store)
            .unwrap_err();
        assert!(expected(&err), "unexpected error for {:?}: {}", yaml, err);
    }
}

#[test]
fn test_omitted_enumerated_fields_use_domain_errors() {
    let settings = GovernanceSettings::new("acme");
    let store = OverrideStore::new();
    let teams = || TeamConfig::parse_list(TEAMS).unwrap();

    let no_visibility = RepositoryConfig::parse_list("- name: svc\n").unwrap();
    let err = resolve(&settings, teams(), &no_visibility, &store).unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidRepository { .. }));

    let no_permission = RepositoryConfig::parse_list(
        "- name: svc\n  visibility: public\n  teams:\n    - name: backend\n",
    )
    .unwrap();
    let err = resolve(&settings, teams(), &no_permission, &store).unwrap_err();
    assert_eq!(
        err,
        GovernanceError::InvalidPermission {
            team: "backend".into(),
            permission: "".into(),
        }
    );

    let no_role =
        TeamConfig::parse_list("- name: backend\n  members:\n    - username: bob\n").unwrap();
    let err = resolve(&settings, no_role, &[], &store).unwrap_err();
    assert_eq!(
        err,
        GovernanceError::InvalidRole {
            team: "backend".into(),
            username: "bob".into(),
            role: "".into(),
        }
    );
}

#[test]
fn test_invalid_member_role() {
    let settings = GovernanceSettings::new("acme");
    let teams = TeamConfig::parse_list(
        r#"
- name: backend
  members:
    - username: bob
      role: owner
"#,
    )
    .unwrap();

    let err = resolve(&settings, teams, &[], &OverrideStore::new()).unwrap_err();
    assert!(matches!(err, GovernanceError::InvalidRole { .. }));
}

#[test]
fn test_invalid_settings() {
    let settings = GovernanceSettings::default();
    let err = resolve(&settings, vec![], &[], &OverrideStore::new()).unwrap_err();
    assert!(matches!(err, GovernanceError::Config(_)));
}

#[test]
fn test_extra_default_teams_and_bound_identities() {
    let settings = GovernanceSettings::new("acme").with_default_teams(["infrastructure"]);
    let teams = TeamConfig::parse_list(TEAMS).unwrap();
    let mut registry = TeamResolver::new(teams, settings.effective_default_teams())
        .load()
        .unwrap();
    registry.bind_identity("admin", "1", "admin").unwrap();
    registry.bind_identity("infrastructure", "2", "infra").unwrap();
    registry.bind_identity("backend", "3", "backend").unwrap();

    let repos = RepositoryConfig::parse_list(REPOS).unwrap();
    let store = store();
    let model = RepoPolicyResolver::new(&settings, &repos, &registry, &store)
        .unwrap()
        .load()
        .unwrap();

    let api = model.repository("api").unwrap();
    assert_eq!(api.teams["infrastructure"], Permission::Maintain);

    let allowances: Vec<String> = api.branch_protections["production/*"]
        .push_allowances
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(allowances, vec!["acme/admin", "acme/infra", "acme/backend"]);

    let bypass: Vec<String> = api.branch_protections["production/*"]
        .pull_request_bypassers
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(bypass, vec!["acme/admin"]);
}

#[test]
fn test_new_default_team_reaches_every_repository() {
    let repos = RepositoryConfig::parse_list(REPOS).unwrap();
    let store = store();
    let teams = TeamConfig::parse_list(TEAMS).unwrap();

    let before = resolve(&GovernanceSettings::new("acme"), teams.clone(), &repos, &store).unwrap();
    assert!(before
        .repositories
        .values()
        .all(|repo| !repo.teams.contains_key("security")));

    let settings = GovernanceSettings::new("acme").with_default_teams(["security", "docs"]);
    let after = resolve(&settings, teams, &repos, &store).unwrap();
    assert!(after.teams.require("security").unwrap().is_default);
    assert!(after.teams.require("docs").unwrap().is_default);

    for repo in after.repositories.values() {
        assert_eq!(repo.teams["security"], Permission::Maintain, "{}", repo.name);
        assert_eq!(repo.teams["docs"], Permission::Maintain, "{}", repo.name);
        assert_eq!(repo.teams["admin"], Permission::Admin);

        for rule in repo.branch_protections.values() {
            assert!(rule.allows_push_from("security"), "{} {}", repo.name, rule.pattern);
            assert!(rule.allows_push_from("docs"), "{} {}", repo.name, rule.pattern);
        }
    }
    // Every repository declaring environments carries protection rules to check
    assert_eq!(after.repository("api").unwrap().branch_protections.len(), 2);
    assert_eq!(after.repository("site").unwrap().branch_protections.len(), 1);
}

#[test]
fn test_late_team_change_reflected_everywhere() {
    let settings = GovernanceSettings::new("acme");
    let repos = RepositoryConfig::parse_list(REPOS).unwrap();
    let store = store();

    let mut teams = TeamConfig::parse_list(TEAMS).unwrap();
    let before = resolve(&settings, teams.clone(), &repos, &store).unwrap();
    assert!(!before.teams.require("admin").unwrap().is_member("dave"));

    teams[0].members.push(fleet_governance::TeamMemberConfig {
        username: "dave".into(),
        role: "member".into(),
    });
    let after = resolve(&settings, teams, &repos, &store).unwrap();
    assert!(after.teams.require("admin").unwrap().is_member("dave"));
    // Repository grants are derived from the same registry on every run
    assert_eq!(before.repositories, after.repositories);
}
