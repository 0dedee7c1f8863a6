use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tracing::debug;

use crate::auth::error::AuthError;

const PEM_WRAP_COLUMNS: usize = 64;

// Checked in order: "PRIVATE KEY" is a substring of "RSA PRIVATE KEY".
const PEM_LABELS: [&str; 2] = ["RSA PRIVATE KEY", "PRIVATE KEY"];

/// Reconstruct a canonical PEM block from key material that may have been
/// mangled in transit through environment variables: literal `\n` escape
/// sequences, surrounding quote characters, inconsistent line lengths.
///
/// Output is a header line, a base64 body wrapped at 64 columns, and a
/// footer line. Re-normalizing canonical input is a no-op. Input that lacks
/// BEGIN/END markers after unescaping, or whose body is not decodable
/// base64, is a configuration error rather than something to pass further
/// down the signing path.
pub fn normalize_private_key(raw: &str) -> Result<String, AuthError> {
    let unescaped = raw
        .trim()
        .replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\r", "\n");
    let key = unescaped
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string();

    let label = PEM_LABELS
        .iter()
        .copied()
        .find(|label| key.contains(&pem_header(label)) && key.contains(&pem_footer(label)))
        .ok_or_else(|| {
            debug!(
                input_length = raw.len(),
                has_begin_marker = key.contains("-----BEGIN"),
                has_end_marker = key.contains("-----END"),
                "private key is missing PEM markers"
            );
            AuthError::configuration("private key is missing PEM BEGIN/END markers")
        })?;

    let header = pem_header(label);
    let footer = pem_footer(label);

    let body: String = key
        .replace(&header, "")
        .replace(&footer, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if body.is_empty() {
        return Err(AuthError::configuration("private key PEM body is empty"));
    }
    BASE64_STANDARD.decode(&body).map_err(|_| {
        AuthError::configuration("private key PEM body is not valid base64")
    })?;

    let wrapped = body
        .as_bytes()
        .chunks(PEM_WRAP_COLUMNS)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n");

    let formatted = format!("{}\n{}\n{}", header, wrapped, footer);
    debug!(
        key_length = formatted.len(),
        line_count = formatted.lines().count(),
        "private key normalized"
    );
    Ok(formatted)
}

fn pem_header(label: &str) -> String {
    format!("-----BEGIN {}-----", label)
}

fn pem_footer(label: &str) -> String {
    format!("-----END {}-----", label)
}
