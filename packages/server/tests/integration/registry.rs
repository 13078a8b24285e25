use forge_common::PusherIdentity;
use forge_server::registry::{PluginFields, PluginRegistry, PusherRegistry};

use crate::common::TestApp;

fn fields(name: &str) -> PluginFields {
    PluginFields {
        name: name.to_string(),
        private: false,
        html_url: format!("https://github.com/octo-org/{name}"),
        default_branch: "main".to_string(),
        pushed_at: Some("1700000000".to_string()),
        updated_at: None,
        created_at: None,
    }
}

fn identity(name: &str, email: &str) -> PusherIdentity {
    PusherIdentity {
        name: name.to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn unknown_full_name_is_none() {
    let app = TestApp::spawn().await;

    let found = PluginRegistry::new(&app.db)
        .find_by_full_name("octo-org/missing")
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn upsert_is_idempotent_per_full_name() {
    let app = TestApp::spawn().await;
    let plugins = PluginRegistry::new(&app.db);
    let urls = vec!["http://a/1.zip".to_string()];

    let first = plugins
        .upsert("octo-org/p", &fields("p"), &urls, 1)
        .await
        .unwrap();
    let second = plugins
        .upsert("octo-org/p", &fields("p"), &urls, 1)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(app.plugin_count().await, 1);

    plugins
        .upsert("octo-org/q", &fields("q"), &[], 1)
        .await
        .unwrap();
    assert_eq!(app.plugin_count().await, 2);
}

#[tokio::test]
async fn upsert_replaces_fields_and_history() {
    let app = TestApp::spawn().await;
    let plugins = PluginRegistry::new(&app.db);
    plugins
        .upsert("octo-org/p", &fields("p"), &["http://a/1.zip".to_string()], 1)
        .await
        .unwrap();

    let mut changed = fields("p");
    changed.private = true;
    changed.default_branch = "trunk".to_string();
    let history = vec!["http://a/1.zip".to_string(), "http://a/2.zip".to_string()];
    let updated = plugins
        .upsert("octo-org/p", &changed, &history, 7)
        .await
        .unwrap();

    assert!(updated.private);
    assert_eq!(updated.default_branch, "trunk");
    assert_eq!(updated.pusher_id, 7);
    assert_eq!(updated.zip_urls(), history);

    let existing = plugins
        .find_by_full_name("octo-org/p")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(existing.id, updated.id);
    assert_eq!(existing.zips, history);
}

#[tokio::test]
async fn pusher_is_created_once_per_email() {
    let app = TestApp::spawn().await;
    let pushers = PusherRegistry::new(&app.db);

    let a = pushers
        .get_or_create_pusher_id(&identity("a", "a@x.com"))
        .await
        .unwrap();
    let again = pushers
        .get_or_create_pusher_id(&identity("renamed", "a@x.com"))
        .await
        .unwrap();
    let b = pushers
        .get_or_create_pusher_id(&identity("b", "b@x.com"))
        .await
        .unwrap();

    assert_eq!(a, again);
    assert_ne!(a, b);
    assert_eq!(app.pusher_count().await, 2);

    let stored = pushers.find_by_id(a).await.unwrap().unwrap();
    assert_eq!(stored.name, "a");
}

#[tokio::test]
async fn plugins_are_recovered_by_pusher() {
    let app = TestApp::spawn().await;
    let plugins = PluginRegistry::new(&app.db);
    plugins.upsert("octo-org/a", &fields("a"), &[], 1).await.unwrap();
    plugins.upsert("octo-org/b", &fields("b"), &[], 2).await.unwrap();
    plugins.upsert("octo-org/c", &fields("c"), &[], 1).await.unwrap();

    let names: Vec<String> = plugins
        .list_by_pusher(1)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.full_name)
        .collect();

    assert_eq!(names, vec!["octo-org/a", "octo-org/c"]);
    assert_eq!(plugins.list().await.unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_pusher_creation_converges_on_one_record() {
    let app = TestApp::spawn().await;
    let left = PusherRegistry::new(&app.db);
    let right = PusherRegistry::new(&app.db);
    let someone = identity("someone", "same@x.com");

    let (a, b) = tokio::join!(
        left.get_or_create_pusher_id(&someone),
        right.get_or_create_pusher_id(&someone),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(app.pusher_count().await, 1);
}

#[tokio::test]
async fn concurrent_plugin_upserts_converge_on_one_record() {
    let app = TestApp::spawn().await;
    let left = PluginRegistry::new(&app.db);
    let right = PluginRegistry::new(&app.db);
    let urls = vec!["http://a/1.zip".to_string()];
    let left_fields = fields("p");
    let right_fields = fields("p");

    let (a, b) = tokio::join!(
        left.upsert("octo-org/p", &left_fields, &urls, 1),
        right.upsert("octo-org/p", &right_fields, &urls, 1),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(app.plugin_count().await, 1);
}
