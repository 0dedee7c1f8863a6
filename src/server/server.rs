use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::provider::TokenProvider;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<TokenProvider>,
}

/// Query parameters the authorization server appends when redirecting the
/// operator's browser back after the consent grant.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Start the consent-callback server: the landing page for the browser
/// redirect plus a small endpoint handing out the consent URL.
pub async fn start(bind_addr: &str, provider: Arc<TokenProvider>) -> Result<()> {
    let state = AppState { provider };

    let app = Router::new()
        .route("/oauth/callback", get(consent_callback))
        .route("/consent-url", get(consent_url))
        .with_state(state);

    info!(%bind_addr, "consent callback server listening");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Landing page after the operator completes (or aborts) consent.
///
/// The authorization code is acknowledged but deliberately not exchanged:
/// JWT-bearer is the sole supported grant, so the code-for-token flow is
/// vestigial here. Only the presence and length of the code are logged.
pub async fn consent_callback(Query(params): Query<CallbackParams>) -> Html<String> {
    if let Some(error) = &params.error {
        warn!(
            consent_error = %error,
            has_description = params.error_description.is_some(),
            "consent grant failed"
        );
        return Html(result_page(
            "Error",
            &format!(
                "Failed to obtain consent: {}. {}",
                error,
                params.error_description.as_deref().unwrap_or("")
            ),
        ));
    }

    match &params.code {
        Some(code) => {
            info!(code_length = code.len(), "consent granted, authorization code received");
            Html(result_page(
                "Success!",
                "Consent granted. You can close this window.",
            ))
        }
        None => {
            warn!("consent callback hit without code or error");
            Html(result_page("Error", "No authorization code received."))
        }
    }
}

pub async fn consent_url(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.provider.consent_url() {
        Ok(url) => (
            StatusCode::OK,
            Json(serde_json::json!({ "consent_url": url })),
        ),
        Err(err) => {
            error!(%err, "failed to build consent URL");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
        }
    }
}

fn result_page(title: &str, message: &str) -> String {
    format!(
        "<html>\n  <body>\n    <h1>{}</h1>\n    <p>{}</p>\n    <script>setTimeout(() => {{ window.close(); }}, 5000);</script>\n  </body>\n</html>\n",
        title, message
    )
}
