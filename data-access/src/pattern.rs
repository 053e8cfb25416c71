//! Registrable-domain extraction
//!
//! A URL's pattern is its host cut one label below the public suffix, so
//! `www.example.co.uk` groups under `example.co.uk`.

use history_store_core::ValidationError;
use url::{Host, Url};

/// Parse `raw` and return its registrable domain.
///
/// A URL that does not parse is an error. A parsed URL without a usable host
/// (no host, an IP literal, a single label) yields `Ok(None)`.
pub fn registrable_domain(raw: &str) -> Result<Option<String>, ValidationError> {
    let parsed = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(pattern_for_url(&parsed))
}

pub fn pattern_for_url(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(host) => pattern_for_host(host),
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

pub fn pattern_for_host(host: &str) -> Option<String> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if !host.contains('.') {
        return None;
    }
    psl::domain_str(&host).map(str::to_owned)
}
