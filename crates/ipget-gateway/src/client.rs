//! # Gateway Client
//!
//! Two endpoints, two protocol generations. Trustless gateways export a
//! CAR for `GET /ipfs/<cid>` with an `Accept` header; older node APIs use
//! `POST /api/v0/dag/export?arg=<cid>`. Which one to speak is chosen by
//! configuration, never by probing. Path resolution always goes through
//! the node API's `POST /api/v0/resolve?arg=<path>`.

use bytes::Bytes;
use ipget_core::Cid;
use url::Url;

use crate::error::GatewayError;

/// Media type a trustless gateway serves CAR streams under.
const CAR_MEDIA_TYPE: &str = "application/vnd.ipld.car";
const IPFS_PREFIX: &str = "/ipfs/";

/// Which export endpoint shape the gateway speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportProtocol {
    /// `GET <base>/ipfs/<cid>` with `Accept: application/vnd.ipld.car`.
    #[default]
    Gateway,
    /// Legacy `POST <base>/api/v0/dag/export?arg=<cid>`.
    Api,
}

/// An HTTP client for one gateway base URL.
pub struct GatewayClient {
    base: Url,
    protocol: ExportProtocol,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Build a client for a normalized base URL (see
    /// [`crate::normalize_gateway`]).
    pub fn new(base: Url, protocol: ExportProtocol) -> Self {
        Self {
            base,
            protocol,
            http: reqwest::Client::new(),
        }
    }

    /// Export the CAR for `cid`, returning the container bytes.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Status`] for any status above 400 (400 itself is
    /// tolerated, preserving the reference gateway protocol's boundary),
    /// [`GatewayError::Http`] for transport failures.
    pub async fn fetch_car(&self, cid: &Cid) -> Result<Bytes, GatewayError> {
        let (url, request) = match self.protocol {
            ExportProtocol::Gateway => {
                let url = self.endpoint(&format!("ipfs/{cid}"), None)?;
                let request = self
                    .http
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, CAR_MEDIA_TYPE);
                (url, request)
            }
            ExportProtocol::Api => {
                let url = self.endpoint("api/v0/dag/export", Some(&cid.to_string()))?;
                (url.clone(), self.http.post(url))
            }
        };
        tracing::debug!(%url, "requesting car export");
        let response = request.send().await?;
        check_status(response.status().as_u16(), url.as_str())?;
        Ok(response.bytes().await?)
    }

    /// Resolve an IPFS path to the bare CID text of its target.
    ///
    /// # Errors
    ///
    /// The status policy of [`Self::fetch_car`], plus
    /// [`GatewayError::UnexpectedResolveShape`] when the body lacks the
    /// `Path` field and [`GatewayError::NotAnIpfsPath`] when the resolved
    /// path is not content-addressed.
    pub async fn resolve(&self, ipfs_path: &str) -> Result<String, GatewayError> {
        let url = self.endpoint("api/v0/resolve", Some(ipfs_path))?;
        tracing::debug!(%url, "resolving path");
        let response = self.http.post(url.clone()).send().await?;
        check_status(response.status().as_u16(), url.as_str())?;
        let body: serde_json::Value = response.json().await?;
        parse_resolve_body(ipfs_path, &body)
    }

    fn endpoint(&self, path: &str, arg: Option<&str>) -> Result<Url, GatewayError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| GatewayError::BadGatewayUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })?;
        if let Some(arg) = arg {
            url.query_pairs_mut().append_pair("arg", arg);
        }
        Ok(url)
    }
}

/// Status policy shared by both endpoints: anything above 400 is an
/// error. Exactly 400 passes, matching the historical tolerance of the
/// reference implementation.
fn check_status(status: u16, url: &str) -> Result<(), GatewayError> {
    if status > 400 {
        return Err(GatewayError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Extract the resolved CID text from a resolve response body:
/// `{"Path": "/ipfs/<cid>"}`.
fn parse_resolve_body(
    requested: &str,
    body: &serde_json::Value,
) -> Result<String, GatewayError> {
    let resolved = body
        .get("Path")
        .and_then(|path| path.as_str())
        .ok_or_else(|| GatewayError::UnexpectedResolveShape(body.to_string()))?;
    match resolved.strip_prefix(IPFS_PREFIX) {
        Some(cid) => Ok(cid.to_string()),
        None => Err(GatewayError::NotAnIpfsPath {
            requested: requested.to_string(),
            resolved: resolved.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_boundary_tolerates_exactly_400() {
        assert!(check_status(200, "u").is_ok());
        assert!(check_status(400, "u").is_ok());
        for status in [401, 404, 500, 502] {
            assert!(matches!(
                check_status(status, "u"),
                Err(GatewayError::Status { status: s, .. }) if s == status
            ));
        }
    }

    #[test]
    fn resolve_body_yields_bare_cid() {
        let body = json!({"Path": "/ipfs/bafkreiabltrd5zm73pvi7plq25pef3hm7jxhbi3kv4hapegrkfpkqtkbme"});
        assert_eq!(
            parse_resolve_body("bafy.../dr-is-tired.jpg", &body).unwrap(),
            "bafkreiabltrd5zm73pvi7plq25pef3hm7jxhbi3kv4hapegrkfpkqtkbme"
        );
    }

    #[test]
    fn resolve_body_without_path_field_rejected() {
        let body = json!({"Message": "not what you wanted"});
        assert!(matches!(
            parse_resolve_body("any", &body),
            Err(GatewayError::UnexpectedResolveShape(_))
        ));
    }

    #[test]
    fn non_ipfs_resolution_rejected() {
        let body = json!({"Path": "/ipns/example.net"});
        assert!(matches!(
            parse_resolve_body("any", &body),
            Err(GatewayError::NotAnIpfsPath { .. })
        ));
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let client = GatewayClient::new(
            crate::normalize_gateway("http://127.0.0.1:5001").unwrap(),
            ExportProtocol::Api,
        );
        let url = client
            .endpoint("api/v0/resolve", Some("/ipfs/QmX/a b"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5001/api/v0/resolve?arg=%2Fipfs%2FQmX%2Fa+b"
        );
    }
}
