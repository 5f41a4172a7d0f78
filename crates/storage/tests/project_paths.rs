#![forbid(unsafe_code)]

use std::path::PathBuf;
use tk_core::{Actor, Project, ProjectId, ScopeId, Slug};
use tk_storage::{ProjectCreateRequest, ProjectEditRequest, SqliteStore, StoreError};

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let dir = base.join(format!("tk_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn slug(value: &str) -> Slug {
    Slug::try_new(value).expect("slug")
}

fn path(value: &str) -> Vec<Slug> {
    Slug::split_path(value).expect("path")
}

fn create(
    store: &mut SqliteStore,
    scope: &ScopeId,
    parent: Option<ProjectId>,
    name: &str,
    is_public: bool,
) -> Project {
    store
        .create_project(
            scope,
            ProjectCreateRequest {
                parent,
                name: name.to_string(),
                slug: slug(&name.to_lowercase()),
                description: String::new(),
                is_public,
                is_active: true,
            },
        )
        .expect("create project")
}

#[test]
fn resolves_nested_public_path() {
    let mut store = SqliteStore::open(temp_dir("resolves_nested_public_path")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = create(&mut store, &scope, None, "Acme", true);
    let web = create(&mut store, &scope, Some(acme.id), "Web", true);

    let found = store
        .resolve_project_path(&scope, &Actor::Anonymous, &path("acme/web"))
        .expect("resolve");
    assert_eq!(found.map(|project| project.id), Some(web.id));

    let err = store
        .resolve_project_path(&scope, &Actor::Anonymous, &path("acme/missing"))
        .expect_err("missing child");
    assert!(matches!(err, StoreError::NotFound));

    let root = store
        .resolve_project_path(&scope, &Actor::Anonymous, &[])
        .expect("empty path");
    assert_eq!(root, None);

    assert_eq!(
        store
            .project_path(&scope, &Actor::Anonymous, web.id)
            .expect("path"),
        "acme/web"
    );
}

#[test]
fn private_projects_need_direct_membership() {
    let mut store =
        SqliteStore::open(temp_dir("private_projects_need_direct_membership")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = create(&mut store, &scope, None, "Acme", true);
    let secret = create(&mut store, &scope, Some(acme.id), "Secret", false);
    let nested = create(&mut store, &scope, Some(secret.id), "Nested", false);

    let anonymous = Actor::Anonymous;
    let member = Actor::user(tk_core::UserId(7), [secret.id]);
    let parent_member = Actor::user(tk_core::UserId(8), [acme.id]);
    let root = Actor::superuser(tk_core::UserId(1));

    assert!(matches!(
        store.resolve_project_path(&scope, &anonymous, &path("acme/secret")),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.resolve_project_path(&scope, &parent_member, &path("acme/secret")),
        Err(StoreError::NotFound)
    ));
    let found = store
        .resolve_project_path(&scope, &member, &path("acme/secret"))
        .expect("member resolves");
    assert_eq!(found.map(|project| project.id), Some(secret.id));

    // Membership on the parent does not reach the child.
    assert!(matches!(
        store.resolve_project_path(&scope, &member, &path("acme/secret/nested")),
        Err(StoreError::NotFound)
    ));
    let found = store
        .resolve_project_path(&scope, &root, &path("acme/secret/nested"))
        .expect("superuser resolves");
    assert_eq!(found.map(|project| project.id), Some(nested.id));

    let err = store
        .project(&scope, &anonymous, secret.id)
        .expect_err("direct lookup is gated");
    assert!(matches!(
        err,
        StoreError::Forbidden { project: Some(id) } if id == secret.id
    ));
    let err = store
        .project_path(&scope, &parent_member, secret.id)
        .expect_err("path lookup is gated");
    assert!(matches!(
        err,
        StoreError::Forbidden { project: Some(id) } if id == secret.id
    ));
    assert_eq!(
        store
            .project_path(&scope, &member, secret.id)
            .expect("member path"),
        "acme/secret"
    );
}

#[test]
fn privacy_is_not_inherited_by_public_children() {
    let mut store = SqliteStore::open(temp_dir("privacy_is_not_inherited_by_public_children"))
        .expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let intranet = create(&mut store, &scope, None, "Intranet", false);
    let docs = create(&mut store, &scope, Some(intranet.id), "Docs", true);

    // The walk stops at the private parent...
    assert!(matches!(
        store.resolve_project_path(&scope, &Actor::Anonymous, &path("intranet/docs")),
        Err(StoreError::NotFound)
    ));
    // ...but the public child itself is readable by id.
    let project = store
        .project(&scope, &Actor::Anonymous, docs.id)
        .expect("public child");
    assert_eq!(project.slug.as_str(), "docs");
}

#[test]
fn inactive_projects_hide_their_subtree() {
    let mut store =
        SqliteStore::open(temp_dir("inactive_projects_hide_their_subtree")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = create(&mut store, &scope, None, "Acme", true);
    let web = create(&mut store, &scope, Some(acme.id), "Web", true);
    create(&mut store, &scope, Some(web.id), "Api", true);

    let mut edit = ProjectEditRequest::new(web.id);
    edit.is_active = Some(false);
    store.update_project(&scope, edit).expect("deactivate");

    let root = Actor::superuser(tk_core::UserId(1));
    for target in ["acme/web", "acme/web/api"] {
        assert!(matches!(
            store.resolve_project_path(&scope, &root, &path(target)),
            Err(StoreError::NotFound)
        ));
    }

    // The flat listing filters node by node.
    let visible = store.visible_projects(&scope, &root).expect("visible");
    let slugs = visible
        .iter()
        .map(|project| project.slug.as_str())
        .collect::<Vec<_>>();
    assert_eq!(slugs, vec!["acme", "api"]);
}

#[test]
fn scopes_do_not_share_projects() {
    let mut store =
        SqliteStore::open(temp_dir("scopes_do_not_share_projects")).expect("open store");
    let site = ScopeId::try_new("site").expect("scope");
    let other = ScopeId::try_new("other").expect("scope");
    create(&mut store, &other, None, "Acme", true);
    store.init_scope(&site).expect("init scope");

    assert!(store.scope_exists(&other).expect("exists"));
    assert!(matches!(
        store.resolve_project_path(&site, &Actor::Anonymous, &path("acme")),
        Err(StoreError::NotFound)
    ));
    // Root slugs are unique per scope, not globally.
    create(&mut store, &site, None, "Acme", true);
}

#[test]
fn sibling_slugs_are_unique() {
    let mut store = SqliteStore::open(temp_dir("sibling_slugs_are_unique")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = create(&mut store, &scope, None, "Acme", true);
    let beta = create(&mut store, &scope, None, "Beta", true);
    create(&mut store, &scope, Some(acme.id), "Web", true);
    create(&mut store, &scope, Some(beta.id), "Web", true);

    let err = store
        .create_project(
            &scope,
            ProjectCreateRequest {
                parent: Some(acme.id),
                name: "Website".to_string(),
                slug: slug("web"),
                description: String::new(),
                is_public: true,
                is_active: true,
            },
        )
        .expect_err("duplicate sibling slug");
    assert!(matches!(err, StoreError::SlugTaken { slug } if slug == "web"));

    let mut edit = ProjectEditRequest::new(beta.id);
    edit.slug = Some(slug("acme"));
    let err = store.update_project(&scope, edit).expect_err("root clash");
    assert!(matches!(err, StoreError::SlugTaken { .. }));
}

#[test]
fn reparenting_rejects_cycles() {
    let mut store = SqliteStore::open(temp_dir("reparenting_rejects_cycles")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = create(&mut store, &scope, None, "Acme", true);
    let web = create(&mut store, &scope, Some(acme.id), "Web", true);
    let api = create(&mut store, &scope, Some(web.id), "Api", true);

    for parent in [acme.id, api.id] {
        let mut edit = ProjectEditRequest::new(acme.id);
        edit.parent = Some(Some(parent));
        let err = store.update_project(&scope, edit).expect_err("cycle");
        assert!(matches!(err, StoreError::ParentCycle));
    }

    let mut edit = ProjectEditRequest::new(api.id);
    edit.parent = Some(None);
    let moved = store.update_project(&scope, edit).expect("move to root");
    assert_eq!(moved.parent, None);
    assert_eq!(
        store
            .project_path(&scope, &Actor::Anonymous, api.id)
            .expect("path"),
        "api"
    );

    let err = store
        .update_project(&scope, ProjectEditRequest::new(api.id))
        .expect_err("empty edit");
    assert!(matches!(err, StoreError::InvalidInput("no fields to edit")));
}

#[test]
fn slugs_keep_their_case() {
    let mut store = SqliteStore::open(temp_dir("slugs_keep_their_case")).expect("open store");
    let scope = ScopeId::try_new("site").expect("scope");
    let acme = store
        .create_project(
            &scope,
            ProjectCreateRequest {
                parent: None,
                name: "Acme".to_string(),
                slug: slug("Acme"),
                description: String::new(),
                is_public: true,
                is_active: true,
            },
        )
        .expect("mixed-case slug");
    assert_eq!(acme.slug.as_str(), "Acme");

    let found = store
        .resolve_project_path(&scope, &Actor::Anonymous, &path("Acme"))
        .expect("resolve");
    assert_eq!(found.map(|project| project.id), Some(acme.id));
    assert!(matches!(
        store.resolve_project_path(&scope, &Actor::Anonymous, &path("acme")),
        Err(StoreError::NotFound)
    ));
}
