#[cfg(test)]
mod test {

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::auth::auth_base_url;
    use crate::auth::consent::{build_consent_url, CONSENT_SCOPE};
    use crate::auth::error::AuthError;
    use crate::auth::provider::TokenProvider;
    use crate::config::settings::Settings;
    use crate::tests::common::test_credentials;

    #[tokio::test]
    async fn consent_required_response_yields_a_typed_error_with_url() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(400).json_body(json!({
                    "error": "consent_required",
                    "error_description": "user has not granted consent"
                }));
            })
            .await;

        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider");

        match provider.get_access_token().await.unwrap_err() {
            AuthError::ConsentRequired {
                consent_url,
                detail,
            } => {
                assert!(consent_url.contains("client_id=ik_1"));
                assert!(consent_url.contains("response_type=code"));
                assert!(consent_url.contains("scope=signature"));
                assert_eq!(detail["error"], "consent_required");
            }
            other => panic!("expected ConsentRequired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn other_exchange_errors_are_wrapped_with_their_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(401).json_body(json!({"error": "invalid_grant"}));
            })
            .await;

        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider");

        match provider.get_access_token().await.unwrap_err() {
            AuthError::AuthServer { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail["error"], "invalid_grant");
            }
            other => panic!("expected AuthServer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn success_body_without_access_token_is_an_auth_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200).json_body(json!({"token_type": "Bearer"}));
            })
            .await;

        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider");

        let err = provider.get_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::AuthServer { .. }));
    }

    #[test]
    fn consent_url_embeds_client_scope_and_redirect() {
        let url = build_consent_url(
            "ik_1",
            "account-d.docusign.com",
            "http://localhost:3000/oauth/callback",
            CONSENT_SCOPE,
        )
        .expect("consent url");

        assert!(url.starts_with("https://account-d.docusign.com/oauth/auth?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=ik_1"));
        assert!(url.contains("scope=signature+impersonation"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth%2Fcallback"));
    }

    #[test]
    fn auth_host_with_trailing_slash_builds_clean_urls() {
        assert_eq!(
            auth_base_url("account-d.docusign.com/"),
            "https://account-d.docusign.com"
        );
        assert_eq!(auth_base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");

        let url = build_consent_url(
            "ik_1",
            "account-d.docusign.com/",
            "http://localhost:3000/oauth/callback",
            CONSENT_SCOPE,
        )
        .expect("consent url");
        assert!(url.starts_with("https://account-d.docusign.com/oauth/auth?"));
        assert!(!url.contains("//oauth"));
    }

    #[test]
    fn consent_url_without_integration_key_is_a_configuration_error() {
        let err = build_consent_url("", "account-d.docusign.com", "http://x", CONSENT_SCOPE)
            .unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
