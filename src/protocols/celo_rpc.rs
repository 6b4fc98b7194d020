//! Minimal Celo JSON-RPC client for read-only `eth_call`s. Calldata is built
//! and decoded by the caller through `sol!`-generated call types.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{hex, Address};
use alloy_sol_types::SolCall;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::json;

pub const CELO_RPC_URL: &str = "https://rpc.ankr.com/celo";

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

pub struct CeloRpc {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl CeloRpc {
    pub fn new(http: reqwest::Client, url: &str) -> Self {
        Self { http, url: url.to_string(), next_id: AtomicU64::new(1) }
    }

    /// `eth_call` against `to` at the latest block, returning the raw return data.
    pub async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>> {
        let to = hex::encode_prefixed(to);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to, "data": hex::encode_prefixed(data) }, "latest"],
        });
        let res = self.http.post(&self.url).json(&body).send().await?.error_for_status()?;
        let reply: RpcResponse = res.json().await?;
        if let Some(err) = reply.error {
            bail!("eth_call to {} failed ({}): {}", to, err.code, err.message);
        }
        let result = reply.result.ok_or_else(|| anyhow!("eth_call to {} returned no result", to))?;
        hex::decode(&result).with_context(|| format!("invalid hex payload {:?}", result))
    }

    /// Encodes `call`, sends it to `to` and decodes the typed return value.
    pub async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return> {
        let ret = self.call(to, &call.abi_encode()).await?;
        C::abi_decode_returns(&ret).with_context(|| format!("decoding {} from {}", C::SIGNATURE, to))
    }
}
