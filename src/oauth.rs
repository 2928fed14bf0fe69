//! OAuth 1.0a request signing for the Twitter/X API.
//!
//! Posting a tweet on behalf of a user with an app key/secret and access token/secret requires
//! an `Authorization: OAuth ...` header carrying an HMAC-SHA1 signature over the request method,
//! URL and parameters. JSON request bodies are not part of the signature.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha1::Sha1;
use url::Url;

use crate::config::TwitterCredentials;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Why an `Authorization` header could not be built.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid signing key")]
    Key,
}

/// Per-request values that make a signature unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthNonce {
    pub nonce: String,
    pub timestamp: i64,
}

impl OAuthNonce {
    /// A random 32-character nonce stamped with the current time.
    pub fn generate() -> Self {
        let nonce = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        OAuthNonce {
            nonce,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// RFC 3986 percent-encoding, as OAuth 1.0a requires.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Builds the signature base string.
///
/// `params` holds every request parameter: the `oauth_*` protocol values, the URL query and any
/// form body fields. The query and fragment of `url` are dropped from the base URL.
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let parameter_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_url.as_str()),
        encode(&parameter_string)
    )
}

/// Signs a base string with HMAC-SHA1 and returns the base64 signature.
pub fn sign(
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> Result<String, OAuthError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| OAuthError::Key)?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the OAuth 1.0a `Authorization` header value for a request.
///
/// # Parameters
///
/// - `method`: HTTP method, e.g. `POST`
/// - `url`: Full request URL; its query parameters are included in the signature
/// - `form_params`: `application/x-www-form-urlencoded` body fields, if any
/// - `credentials`: App and user credentials
/// - `nonce`: Nonce and timestamp for this request
///
/// # Example
///
/// ```rust
/// use botx::config::TwitterCredentials;
/// use botx::oauth::{build_oauth1_header, OAuthNonce};
///
/// let credentials = TwitterCredentials {
///     app_key: "ck".into(),
///     app_secret: "cs".into(),
///     access_token: "tok".into(),
///     access_secret: "ts".into(),
/// };
/// let header = build_oauth1_header(
///     "POST",
///     "https://api.x.com/2/tweets",
///     &[],
///     &credentials,
///     &OAuthNonce::generate(),
/// )
/// .unwrap();
/// assert!(header.starts_with("OAuth oauth_consumer_key=\"ck\""));
/// ```
pub fn build_oauth1_header(
    method: &str,
    url: &str,
    form_params: &[(&str, &str)],
    credentials: &TwitterCredentials,
    nonce: &OAuthNonce,
) -> Result<String, OAuthError> {
    let url = Url::parse(url)?;
    let timestamp = nonce.timestamp.to_string();

    let mut oauth_params: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), credentials.app_key.clone()),
        ("oauth_nonce".into(), nonce.nonce.clone()),
        ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
        ("oauth_timestamp".into(), timestamp),
        ("oauth_token".into(), credentials.access_token.clone()),
        ("oauth_version".into(), OAUTH_VERSION.into()),
    ];

    let mut all_params = oauth_params.clone();
    all_params.extend(
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned())),
    );
    all_params.extend(
        form_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );

    let base_string = signature_base_string(method, &url, &all_params);
    let signature = sign(
        &base_string,
        &credentials.app_secret,
        &credentials.access_secret,
    )?;

    oauth_params.push(("oauth_signature".into(), signature));
    oauth_params.sort();

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}
