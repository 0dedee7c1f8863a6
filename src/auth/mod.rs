pub mod assertion;
pub mod consent;
pub mod error;
pub mod key;
pub mod provider;

/// Build the base URL for an authorization-server host.
///
/// Configuration normally carries a bare hostname; a full `http(s)://`
/// authority is accepted as-is so that local stand-ins can be targeted.
pub fn auth_base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
