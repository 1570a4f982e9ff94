//! Connection-string helpers shared by the URL parsers.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{MapError, Result};

/// Percent-decode one URL component.
pub fn decode_component(dialect: &str, value: &str) -> Result<String> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| MapError::connection(dialect, "credentials are not valid UTF-8 after decoding"))
}

/// Decoded `(user, password)` from a URL's userinfo.
pub fn url_credentials(dialect: &str, url: &Url) -> Result<(String, String)> {
    let user = decode_component(dialect, url.username())?;
    let password = decode_component(dialect, url.password().unwrap_or_default())?;
    Ok((user, password))
}
