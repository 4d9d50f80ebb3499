//! Solana JSON-RPC access.
//!
//! [`SolanaRpc`] is the seam between the send flow and the network: the
//! builder and submitter only ever talk to `&dyn SolanaRpc`, and
//! [`HttpRpcClient`] is the production implementation over `reqwest`.
//! Every call uses commitment `confirmed`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chain_sol::{address_to_bytes, bytes_to_address, TOKEN_PROGRAM_ID};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, trace};

const COMMITMENT: &str = "confirmed";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("malformed {method} response: {detail}")]
    MalformedResponse {
        method: &'static str,
        detail: String,
    },

    #[error("Mint account {0} not found")]
    MintNotFound(String),

    #[error("Account {0} is not an SPL token mint")]
    NotAMint(String),
}

/// Recent blockhash plus the last block height at which it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

/// One entry of a `getSignatureStatuses` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<ConfirmationStatus>,
}

impl SignatureStatus {
    /// Reached at least `confirmed` without an execution error.
    pub fn is_confirmed(&self) -> bool {
        self.err.is_none()
            && matches!(
                self.confirmation_status,
                Some(ConfirmationStatus::Confirmed | ConfirmationStatus::Finalized)
            )
    }
}

#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// URL (or label) of the node behind this client.
    fn endpoint(&self) -> &str;

    /// Decimals of an SPL token mint.
    async fn get_mint_decimals(&self, mint: &[u8; 32]) -> Result<u8, RpcError>;

    async fn account_exists(&self, address: &[u8; 32]) -> Result<bool, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError>;

    /// Submit a signed wire transaction; returns the node's signature string.
    async fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError>;

    /// `None` while the node has not seen the signature yet.
    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, RpcError>;

    async fn get_block_height(&self) -> Result<u64, RpcError>;
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{ "context": {...}, "value": ... }` wrapper used by most methods.
#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
struct AccountInfo {
    owner: String,
    data: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

/// Extract `decimals` from a `jsonParsed` account owned by the token program.
fn parse_mint_decimals(mint: &str, account: &AccountInfo) -> Result<u8, RpcError> {
    let not_a_mint = || RpcError::NotAMint(mint.to_string());

    if account.owner != bytes_to_address(&TOKEN_PROGRAM_ID) {
        return Err(not_a_mint());
    }
    if account.data.pointer("/parsed/type").and_then(Value::as_str) != Some("mint") {
        return Err(not_a_mint());
    }
    account
        .data
        .pointer("/parsed/info/decimals")
        .and_then(Value::as_u64)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| RpcError::MalformedResponse {
            method: "getAccountInfo",
            detail: format!("mint {mint} has no decimals"),
        })
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// JSON-RPC client for a single Solana node.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RpcError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, url = %self.url, "rpc request");

        let transport = |source| RpcError::Transport {
            url: self.url.clone(),
            source,
        };
        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        if let Some(error) = response.error {
            debug!(method, code = error.code, "rpc error");
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or(RpcError::MalformedResponse {
            method,
            detail: "missing result".into(),
        })
    }

    async fn get_account_info(
        &self,
        address: &str,
        encoding: &str,
    ) -> Result<Option<AccountInfo>, RpcError> {
        let info: WithContext<Option<AccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([address, { "encoding": encoding, "commitment": COMMITMENT }]),
            )
            .await?;
        Ok(info.value)
    }
}

#[async_trait]
impl SolanaRpc for HttpRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn get_mint_decimals(&self, mint: &[u8; 32]) -> Result<u8, RpcError> {
        let mint = bytes_to_address(mint);
        let account = self
            .get_account_info(&mint, "jsonParsed")
            .await?
            .ok_or_else(|| RpcError::MintNotFound(mint.clone()))?;
        parse_mint_decimals(&mint, &account)
    }

    async fn account_exists(&self, address: &[u8; 32]) -> Result<bool, RpcError> {
        let account = self
            .get_account_info(&bytes_to_address(address), "base64")
            .await?;
        Ok(account.is_some())
    }

    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        let latest: WithContext<BlockhashValue> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": COMMITMENT }]),
            )
            .await?;
        let blockhash =
            address_to_bytes(&latest.value.blockhash).map_err(|e| RpcError::MalformedResponse {
                method: "getLatestBlockhash",
                detail: e.to_string(),
            })?;
        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, RpcError> {
        trace!(bytes = wire.len(), "sending transaction");
        self.call(
            "sendTransaction",
            json!([
                STANDARD.encode(wire),
                { "encoding": "base64", "preflightCommitment": COMMITMENT }
            ]),
        )
        .await
    }

    async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([[signature]]))
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }

    async fn get_block_height(&self) -> Result<u64, RpcError> {
        self.call("getBlockHeight", json!([{ "commitment": COMMITMENT }]))
            .await
    }
}

// ---------------------------------------------------------------------------
// In-memory node for unit tests
// ---------------------------------------------------------------------------
