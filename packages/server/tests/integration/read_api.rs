use crate::common::{TestApp, path_hash, push_payload, routes};

#[tokio::test]
async fn lists_plugins_with_valid_hash() {
    let app = TestApp::spawn().await;
    app.post_webhook(&push_payload("octo-org/one", "refs/heads/main", "a@x.com"))
        .await;
    app.post_webhook(&push_payload("octo-org/two", "refs/heads/main", "a@x.com"))
        .await;

    let res = app.get_signed(routes::PLUGINS).await;

    assert_eq!(res.status, 200, "body: {}", res.text);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["full_name"], "octo-org/one");
    assert_eq!(data[1]["full_name"], "octo-org/two");
    assert_eq!(data[0]["zips"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_hash_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_unsigned(routes::PLUGINS).await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "SIGNATURE_MISSING");
}

#[tokio::test]
async fn wrong_hash_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get_with_hash(routes::PLUGINS, "deadbeef").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "SIGNATURE_INVALID");

    let res = app.get_with_hash(routes::PLUGINS, "zz").await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "SIGNATURE_INVALID");
}

#[tokio::test]
async fn hash_is_bound_to_the_path() {
    let app = TestApp::spawn().await;

    let res = app
        .get_with_hash(routes::PUSHERS, &path_hash(routes::PLUGINS))
        .await;

    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "SIGNATURE_INVALID");
}

#[tokio::test]
async fn plugin_detail_includes_its_pusher() {
    let app = TestApp::spawn().await;
    let created = app
        .post_webhook(&push_payload("octo-org/one", "refs/heads/main", "a@x.com"))
        .await;
    let id = created.body["plugin"]["id"].as_i64().unwrap() as i32;

    let res = app.get_signed(&routes::plugin(id)).await;

    assert_eq!(res.status, 200, "body: {}", res.text);
    assert_eq!(res.body["full_name"], "octo-org/one");
    assert_eq!(res.body["pusher"]["email"], "a@x.com");
    assert_eq!(res.body["pusher"]["id"], created.body["plugin"]["pusher_id"]);
}

#[tokio::test]
async fn unknown_plugin_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get_signed(&routes::plugin(999)).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn pusher_detail_lists_their_plugins() {
    let app = TestApp::spawn().await;
    let one = app
        .post_webhook(&push_payload("octo-org/one", "refs/heads/main", "a@x.com"))
        .await;
    app.post_webhook(&push_payload("octo-org/two", "refs/heads/main", "a@x.com"))
        .await;
    app.post_webhook(&push_payload("octo-org/three", "refs/heads/main", "b@x.com"))
        .await;
    let pusher_id = one.body["plugin"]["pusher_id"].as_i64().unwrap() as i32;

    let res = app.get_signed(&routes::pusher(pusher_id)).await;

    assert_eq!(res.status, 200, "body: {}", res.text);
    assert_eq!(res.body["email"], "a@x.com");
    let names: Vec<&str> = res.body["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["full_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["octo-org/one", "octo-org/two"]);

    let all = app.get_signed(routes::PUSHERS).await;
    assert_eq!(all.status, 200);
    assert_eq!(all.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn plugin_moves_to_latest_pusher() {
    let app = TestApp::spawn().await;
    let first = app
        .post_webhook(&push_payload("octo-org/one", "refs/heads/main", "a@x.com"))
        .await;
    app.post_webhook(&push_payload("octo-org/one", "refs/heads/main", "b@x.com"))
        .await;
    let a_id = first.body["plugin"]["pusher_id"].as_i64().unwrap() as i32;

    let res = app.get_signed(&routes::pusher(a_id)).await;

    assert_eq!(res.status, 200);
    assert!(res.body["plugins"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::spawn().await;

    let res = app.get_unsigned("/api-docs/openapi.json").await;

    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/github"].is_object());
    assert!(res.body["paths"]["/api/v1/plugins/{id}"].is_object());
}
