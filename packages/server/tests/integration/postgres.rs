//! The same flows against PostgreSQL, the production backend. Opt in with
//! `FORGE_TEST_POSTGRES=1`; each test returns early otherwise.

use forge_server::registry::{PluginRegistry, PusherRegistry};

use crate::common::{TestApp, push_payload};

#[tokio::test]
async fn push_round_trips_artifact_history() {
    let Some(app) = TestApp::spawn_postgres().await else {
        return;
    };
    let payload = push_payload("octo-org/my-plugin", "refs/heads/main", "a@x.com");

    let first = app.post_webhook(&payload).await;
    let second = app.post_webhook(&payload).await;

    assert_eq!(first.status, 200, "body: {}", first.text);
    assert_eq!(second.status, 200, "body: {}", second.text);
    assert_eq!(second.body["plugin"]["id"], first.body["plugin"]["id"]);
    assert_eq!(second.body["plugin"]["zips"].as_array().unwrap().len(), 2);

    let stored = PluginRegistry::new(&app.db)
        .find_by_full_name("octo-org/my-plugin")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.zips.len(), 2);
    assert_eq!(app.artifact_files().len(), 2);
}

#[tokio::test]
async fn concurrent_pusher_creation_converges_on_one_record() {
    let Some(app) = TestApp::spawn_postgres().await else {
        return;
    };
    let left = PusherRegistry::new(&app.db);
    let right = PusherRegistry::new(&app.db);
    let someone = forge_common::PusherIdentity {
        name: "someone".to_string(),
        email: "same@x.com".to_string(),
    };

    let (a, b) = tokio::join!(
        left.get_or_create_pusher_id(&someone),
        right.get_or_create_pusher_id(&someone),
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(app.pusher_count().await, 1);
}

#[tokio::test]
async fn concurrent_pushes_from_one_pusher_share_the_record() {
    let Some(app) = TestApp::spawn_postgres().await else {
        return;
    };
    let a = push_payload("octo-org/a", "refs/heads/main", "same@x.com");
    let b = push_payload("octo-org/b", "refs/heads/main", "same@x.com");

    let (first, second) = tokio::join!(app.post_webhook(&a), app.post_webhook(&b));

    assert_eq!(first.status, 200, "body: {}", first.text);
    assert_eq!(second.status, 200, "body: {}", second.text);
    assert_eq!(first.body["plugin"]["pusher_id"], second.body["plugin"]["pusher_id"]);
    assert_eq!(app.pusher_count().await, 1);
}
