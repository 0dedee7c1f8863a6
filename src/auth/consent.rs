use url::Url;

use crate::auth::auth_base_url;
use crate::auth::error::AuthError;

/// Scope requested when sending an operator through the consent grant.
/// Impersonated JWT-bearer exchanges need both capabilities approved.
pub const CONSENT_SCOPE: &str = "signature impersonation";

/// Build the authorization-grant URL an operator opens in a browser to
/// approve impersonation for the integration key. Pure function of
/// configuration; this component never fetches the URL itself.
pub fn build_consent_url(
    integration_key: &str,
    auth_server_host: &str,
    redirect_uri: &str,
    scope: &str,
) -> Result<String, AuthError> {
    if integration_key.is_empty() {
        return Err(AuthError::configuration(
            "integration key is required to build a consent URL",
        ));
    }

    let mut url = Url::parse(&format!("{}/oauth/auth", auth_base_url(auth_server_host)))
        .map_err(|err| {
            AuthError::configuration(format!("auth server host is not a valid URL base: {}", err))
        })?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("scope", scope)
        .append_pair("client_id", integration_key)
        .append_pair("redirect_uri", redirect_uri);

    Ok(url.into())
}
