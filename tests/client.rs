//! End-to-end tests of `WecomClient` over real HTTP against a mock server.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wecom::models::ErrCode;
use wecom::{ApiRequest, Config, Credentials, TokenPolicy, WecomClient, WecomError};

fn client(server: &MockServer, policy: TokenPolicy) -> WecomClient {
    let config = Config::new(Credentials::new("C", "S", "1000002"))
        .with_base_url(format!("{}/cgi-bin", server.uri()))
        .with_token_policy(policy);
    WecomClient::new(config).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .and(query_param("corpid", "C"))
        .and(query_param("corpsecret", "S"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "access_token": "TOK",
            "expires_in": 7200
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let token = client(&server, TokenPolicy::PerCall).fetch_token().await.unwrap();
    assert_eq!(token.value, "TOK");
    assert_eq!(token.expires_in, 7200);
}

#[tokio::test]
async fn test_fetch_token_rejected() {
    let server = MockServer::start().await;
    Mock::given(path("/cgi-bin/gettoken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"errcode":"40001","errmsg":"invalid credential"}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server, TokenPolicy::PerCall)
        .access_token()
        .await
        .unwrap_err();
    assert_eq!(err.api_code(), Some(&ErrCode::Code(40001)));
}

#[tokio::test]
async fn test_fixed_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/ping"))
        .and(header("content-type", "application/json"))
        .and(header("connection", "close"))
        .and(header("accept", "*/*"))
        .and(query_param("a", "1"))
        .and(query_param("b", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, TokenPolicy::PerCall);
    let request = ApiRequest::get("ping").param("a", "1").param("b", "2");
    let raw = client.execute(&request).await.unwrap();
    assert_eq!(raw, b"pong");
}

#[tokio::test]
async fn test_non_2xx_status() {
    let server = MockServer::start().await;
    Mock::given(path("/cgi-bin/ping"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;

    let err = client(&server, TokenPolicy::PerCall)
        .execute(&ApiRequest::get("ping"))
        .await
        .unwrap_err();
    match err {
        WecomError::HttpStatus { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "internal failure");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let server = MockServer::start().await;
    let client = client(&server, TokenPolicy::PerCall);
    drop(server);

    let err = client.fetch_token().await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_per_call_policy_fetches_token_every_call() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/user/get"))
        .and(query_param("access_token", "TOK"))
        .and(query_param("userid", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "userid": "alice",
            "name": "Alice"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, TokenPolicy::PerCall);
    for _ in 0..2 {
        let user = client.get_user("alice").await.unwrap();
        assert_eq!(user.to_string(), "User Id: alice, Name: Alice");
    }
}

#[tokio::test]
async fn test_cached_policy_shares_token_across_concurrent_calls() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(path("/cgi-bin/department/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "department": [{"id": 1, "name": "HQ", "parentid": 0, "order": 1}]
        })))
        .expect(4)
        .mount(&server)
        .await;

    let client = client(&server, TokenPolicy::Cached);
    let (a, b, c, d) = tokio::join!(
        client.list_departments(),
        client.list_departments(),
        client.list_departments(),
        client.list_departments()
    );
    for result in [a, b, c, d] {
        assert_eq!(result.unwrap()[0].id, 1);
    }
}

#[tokio::test]
async fn test_get_user_application_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(path("/cgi-bin/user/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 40014,
            "errmsg": "invalid access_token"
        })))
        .mount(&server)
        .await;

    let result = client(&server, TokenPolicy::PerCall).get_user("u1").await;
    let err = tokio_test::assert_err!(result);
    assert!(err.is_token_rejected());
}

#[tokio::test]
async fn test_send_text_message() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/message/send"))
        .and(query_param("access_token", "TOK"))
        .and(body_json(json!({
            "touser": "alice|bob",
            "msgtype": "text",
            "agentid": "1000002",
            "text": {"content": "hello"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "invaliduser": "bob",
            "msgid": "m1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client(&server, TokenPolicy::PerCall)
        .send_text_message("alice|bob", "hello")
        .await
        .unwrap();
    assert!(!receipt.all_delivered());
    assert_eq!(receipt.invalid_user.as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_directory_walk() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;
    Mock::given(path("/cgi-bin/agent/get"))
        .and(query_param("agentid", "1000002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "allow_userinfos": {"user": [{"userid": "alice"}]},
            "allow_partys": {"partyid": [3]}
        })))
        .mount(&server)
        .await;
    Mock::given(path("/cgi-bin/user/simplelist"))
        .and(query_param("department_id", "3"))
        .and(query_param("fetch_child", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "userlist": [{"userid": "alice", "name": "Alice"}, {"userid": "bob", "name": "Bob"}]
        })))
        .mount(&server)
        .await;

    let client = client(&server, TokenPolicy::PerCall);
    let agent = client.get_agent().await.unwrap();
    let users = client
        .list_users(agent.allow_parties.party_ids[0], true)
        .await
        .unwrap();
    let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}
