//! HTTP integration tests for the webhook endpoint
//!
//! These exercise the handler layer in-process via actix test utilities.
//! Only paths that never leave the process are covered; anything that
//! would call GitHub runs behind the immediate 200 acknowledgment.

#[cfg(test)]
mod http_integration_tests {
    use actix_web::{test, web, App};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use std::sync::Arc;

    use crate::config::{Config, WriteBackMode};
    use crate::handlers::configure_routes;
    use crate::services::generator::ContentGenerator;
    use crate::services::github::GitHubClient;
    use crate::services::llm::LlmClient;
    use crate::services::loop_guard::LoopGuard;
    use crate::services::pipeline::WebhookPipeline;
    use crate::services::write_back::WriteBackEngine;
    use crate::AppState;

    const SECRET: &str = "test-secret";

    fn test_state(secret: Option<&str>) -> AppState {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            github_token: "t".into(),
            webhook_secret: secret.map(String::from),
            llm_api_key: None,
            llm_model: "gemini-1.5-flash".into(),
            write_back_mode: WriteBackMode::Comment,
            request_timeout_secs: 5,
            loop_suppress_secs: 180,
            loop_entry_ttl_secs: 600,
        };
        let github = GitHubClient::with_base_url("t".into(), "http://localhost:1".into());
        let generator = ContentGenerator::new(LlmClient::with_base_url(
            None,
            "gemini-1.5-flash".into(),
            "http://localhost:1".into(),
        ));
        let write_back = WriteBackEngine::new(GitHubClient::with_base_url(
            "t".into(),
            "http://localhost:1".into(),
        ));
        let pipeline = WebhookPipeline::new(
            config.clone(),
            github,
            generator,
            write_back,
            LoopGuard::default(),
        );
        AppState {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn invalid_signature_returns_401() {
        let app = test_app!(test_state(Some(SECRET)));
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("X-GitHub-Event", "push"))
            .insert_header(("X-Hub-Signature-256", "sha256=deadbeef"))
            .set_payload(r#"{"ref": "refs/heads/main"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn missing_signature_returns_401_when_secret_set() {
        let app = test_app!(test_state(Some(SECRET)));
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("X-GitHub-Event", "push"))
            .set_payload(r#"{}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn malformed_json_returns_400() {
        let body = b"not json at all";
        let app = test_app!(test_state(Some(SECRET)));
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("X-GitHub-Event", "push"))
            .insert_header(("X-Hub-Signature-256", sign(body)))
            .set_payload(body.as_slice())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn push_event_is_acknowledged_without_processing() {
        let body = br#"{"ref": "refs/heads/main", "commits": []}"#;
        let app = test_app!(test_state(Some(SECRET)));
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("X-GitHub-Event", "push"))
            .insert_header(("X-Hub-Signature-256", sign(body)))
            .insert_header(("X-GitHub-Delivery", "d-42"))
            .set_payload(body.as_slice())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["event_type"], "push");
        assert_eq!(json["delivery_id"], "d-42");
    }

    #[actix_web::test]
    async fn no_secret_accepts_unsigned_delivery() {
        let app = test_app!(test_state(None));
        let req = test::TestRequest::post()
            .uri("/webhook")
            .insert_header(("X-GitHub-Event", "issues"))
            .set_payload(r#"{"action": "opened"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn health_reports_configuration_flags() {
        let app = test_app!(test_state(Some(SECRET)));
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["github_token_configured"], true);
        assert_eq!(json["webhook_secret_configured"], true);
        assert_eq!(json["llm_configured"], false);
    }

    #[actix_web::test]
    async fn status_lists_endpoints() {
        let app = test_app!(test_state(None));
        let req = test::TestRequest::get().uri("/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let json: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(json["service"], "DocuSync Webhook Server");
        assert_eq!(json["endpoints"]["webhook"], "/webhook");
        assert_eq!(json["configuration"]["write_back_mode"], "comment");
    }
}
