use crate::error::{Error, RelayUrlError};
use ethereum_consensus::primitives::{BlsPublicKey, Hash32, Slot};
use relay_monitor_types::types::SignedBid;
use std::time::{Duration, Instant};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A relay URL of the form `scheme://<48-byte hex pubkey>@host[:port]`; the
/// userinfo segment is the relay's own BLS identity, not a credential.
#[derive(Clone, Debug)]
pub struct RelayEndpoint {
    url: Url,
    public_key: BlsPublicKey,
}

impl RelayEndpoint {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn public_key(&self) -> &BlsPublicKey {
        &self.public_key
    }
}

impl TryFrom<Url> for RelayEndpoint {
    type Error = RelayUrlError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        let public_key = url.username();
        if public_key.is_empty() {
            return Err(Self::Error::MissingPublicKey(url.to_string()))
        }

        let public_key =
            public_key.strip_prefix("0x").ok_or(Self::Error::Missing0xPrefix(public_key.into()))?;
        let public_key = hex::decode(public_key)?;
        let public_key = BlsPublicKey::try_from(public_key.as_slice())?;

        Ok(Self { url, public_key })
    }
}

/// The outcome of a `getBid` call: either a decoded bid with its round-trip
/// latency, or "no bid" (relay responded 204 — not an error).
pub struct BidResponse {
    pub bid: Option<SignedBid>,
    pub latency: Duration,
}

/// One instance per configured relay, wrapping a bare HTTP client rather
/// than `beacon_api_client::Client`: the builder API's status codes (204 for
/// "no bid") need to reach the caller directly, and the per-request timeout
/// here (2s) is shorter than the beacon client's own default.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: RelayEndpoint,
}

impl RelayClient {
    pub fn new(endpoint: RelayEndpoint) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("static reqwest client configuration is valid");
        Self { http, endpoint }
    }

    pub fn public_key(&self) -> &BlsPublicKey {
        self.endpoint.public_key()
    }

    pub fn url(&self) -> &Url {
        self.endpoint.url()
    }

    pub async fn status(&self) -> Result<(), Error> {
        let target = self.endpoint.url().join("/eth/v1/builder/status")?;
        let response = self.http.get(target).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let body = truncated_body(response).await;
            Err(Error::UnexpectedStatus { status, body })
        }
    }

    pub async fn get_bid(
        &self,
        slot: Slot,
        parent_hash: &Hash32,
        proposer_public_key: &BlsPublicKey,
    ) -> Result<BidResponse, Error> {
        let path = format!("/eth/v1/builder/header/{slot}/{parent_hash}/{proposer_public_key}");
        let target = self.endpoint.url().join(&path)?;

        let start = Instant::now();
        let response = self.http.get(target).send().await?;
        let latency = start.elapsed();

        match response.status() {
            status if status.as_u16() == 204 => Ok(BidResponse { bid: None, latency }),
            status if status.is_success() => {
                let body = response.bytes().await?;
                let bid: SignedBid = serde_json::from_slice(&body)?;
                Ok(BidResponse { bid: Some(bid), latency })
            }
            status => {
                let status = status.as_u16();
                let body = truncated_body(response).await;
                Err(Error::UnexpectedStatus { status, body })
            }
        }
    }
}

async fn truncated_body(response: reqwest::Response) -> String {
    const MAX_LEN: usize = 256;
    match response.text().await {
        Ok(body) => body.chars().take(MAX_LEN).collect(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_consensus::crypto::SecretKey;
    use std::ops::Deref;

    const URL: &str = "https://relay.example";

    fn random_bls_public_key() -> BlsPublicKey {
        let mut rng = rand::thread_rng();
        let sk = SecretKey::random(&mut rng).unwrap();
        sk.public_key()
    }

    #[test]
    fn parse_relay_endpoint() {
        let public_key = random_bls_public_key();
        let public_key_hex = format!("{:#x}", public_key.deref());

        let mut url = Url::parse(URL).unwrap();
        url.set_username(&public_key_hex).unwrap();

        let endpoint = RelayEndpoint::try_from(url.clone()).unwrap();
        assert_eq!(endpoint.url, url);
        assert_eq!(endpoint.public_key, public_key);
    }

    #[test]
    fn parse_relay_endpoint_missing_public_key() {
        let url = Url::parse(URL).unwrap();
        let endpoint = RelayEndpoint::try_from(url);
        assert!(std::matches!(endpoint, Err(RelayUrlError::MissingPublicKey(..))));
    }

    #[test]
    fn parse_relay_endpoint_missing_0x_prefix() {
        let public_key = random_bls_public_key();
        let public_key_hex = format!("{:x}", public_key.deref());

        let mut url = Url::parse(URL).unwrap();
        url.set_username(&public_key_hex).unwrap();

        let endpoint = RelayEndpoint::try_from(url);
        assert!(std::matches!(endpoint, Err(RelayUrlError::Missing0xPrefix(..))));
    }

    #[test]
    fn parse_relay_endpoint_invalid_hex() {
        let mut url = Url::parse(URL).unwrap();
        url.set_username("0xethereum").unwrap();

        let endpoint = RelayEndpoint::try_from(url);
        assert!(std::matches!(endpoint, Err(RelayUrlError::Hex(..))));
    }
}
