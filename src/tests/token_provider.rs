#[cfg(test)]
mod test {

    use std::sync::Arc;
    use std::time::Duration;

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    use crate::auth::error::AuthError;
    use crate::auth::provider::TokenProvider;
    use crate::config::settings::Settings;
    use crate::tests::common::{test_credentials, ManualClock};

    const T0: u64 = 1_700_000_000;

    #[tokio::test]
    async fn fetch_token_and_serve_from_cache() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"access_token": "tok_abc", "expires_in": 3600}));
            })
            .await;

        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider");

        assert_eq!(provider.get_access_token().await.unwrap(), "tok_abc");
        // second call inside the safety margin must not touch the network
        assert_eq!(provider.get_access_token().await.unwrap(), "tok_abc");
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn expiry_triggers_refresh() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_one", "expires_in": 3600}));
            })
            .await;

        let clock = ManualClock::at(T0);
        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider")
                .with_clock(clock.clone());

        assert_eq!(provider.get_access_token().await.unwrap(), "tok_one");
        assert_eq!(first.hits_async().await, 1);
        first.delete_async().await;

        let second = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_two", "expires_in": 3600}));
            })
            .await;

        // usable window is expires_in minus the 300 s safety margin
        clock.advance(3600 - 300);
        assert_eq!(provider.get_access_token().await.unwrap(), "tok_two");
        assert_eq!(second.hits_async().await, 1);
    }

    #[tokio::test]
    async fn missing_integration_key_fails_without_network_calls() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_abc", "expires_in": 3600}));
            })
            .await;

        let mut credentials = test_credentials(&server.base_url());
        credentials.integration_key = String::new();
        let provider = TokenProvider::new(credentials, Settings::default()).expect("provider");

        let err = provider.get_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Configuration { .. }));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn failed_exchange_clears_a_still_valid_cached_token() {
        let server = MockServer::start_async().await;
        let healthy = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_a", "expires_in": 3600}));
            })
            .await;

        let clock = ManualClock::at(T0);
        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider")
                .with_clock(clock.clone());

        assert_eq!(provider.get_access_token().await.unwrap(), "tok_a");
        healthy.delete_async().await;

        // force an exchange while tok_a is still inside its window
        let failing = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(500).json_body(json!({"error": "server_error"}));
            })
            .await;
        let err = provider.refresh_access_token().await.unwrap_err();
        assert!(matches!(err, AuthError::AuthServer { status: 500, .. }));
        assert_eq!(failing.hits_async().await, 1);
        failing.delete_async().await;

        // tok_a would still be time-valid, but the failure cleared it: the
        // next call must exchange again rather than serve the old entry
        let recovered = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_b", "expires_in": 3600}));
            })
            .await;
        assert_eq!(provider.get_access_token().await.unwrap(), "tok_b");
        assert_eq!(recovered.hits_async().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_a_single_exchange() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_abc", "expires_in": 3600}));
            })
            .await;

        let provider = Arc::new(
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider"),
        );

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let provider = provider.clone();
            tasks.push(tokio::spawn(
                async move { provider.get_access_token().await },
            ));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "tok_abc");
        }
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn exchange_timeout_is_transient() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .delay(Duration::from_millis(800))
                    .json_body(json!({"access_token": "tok_late", "expires_in": 3600}));
            })
            .await;

        let settings = Settings {
            exchange_timeout: Duration::from_millis(150),
            ..Settings::default()
        };
        let provider = TokenProvider::new(test_credentials(&server.base_url()), settings)
            .expect("provider");

        let err = provider.get_access_token().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn invalidate_forces_the_next_call_to_exchange() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200)
                    .json_body(json!({"access_token": "tok_abc", "expires_in": 3600}));
            })
            .await;

        let provider =
            TokenProvider::new(test_credentials(&server.base_url()), Settings::default())
                .expect("provider");

        assert_eq!(provider.get_access_token().await.unwrap(), "tok_abc");
        provider.invalidate().await;
        assert_eq!(provider.get_access_token().await.unwrap(), "tok_abc");
        assert_eq!(mock.hits_async().await, 2);
    }
}
