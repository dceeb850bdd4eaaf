// crates/harvest-cli/src/rpc_client.rs
//
// JSON-RPC client that POSTs envelopes to the harvest-daemon endpoint, plus
// the sign-and-submit helper used by every state-changing command.

use serde::de::DeserializeOwned;
use serde_json::json;

use harvest_core::crypto::Keypair;
use harvest_core::transaction::{Call, Transaction};
use harvest_rpc::handlers::query::GetNonceResponse;
use harvest_rpc::handlers::tx::SubmitTxResponse;
use harvest_rpc::{JsonRpcRequest, JsonRpcResponse};
use harvest_runtime::Receipt;

/// Send a JSON-RPC call to the daemon and return the parsed envelope.
pub async fn rpc_call(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<JsonRpcResponse, Box<dyn std::error::Error>> {
    let request = JsonRpcRequest {
        method: method.to_string(),
        params,
    };

    let client = reqwest::Client::new();
    let resp = client.post(endpoint).json(&request).send().await?;

    let rpc_response: JsonRpcResponse = resp.json().await?;
    Ok(rpc_response)
}

/// Call a method and decode its result, turning an error envelope into `Err`.
pub async fn query<T: DeserializeOwned>(
    endpoint: &str,
    method: &str,
    params: serde_json::Value,
) -> Result<T, Box<dyn std::error::Error>> {
    let response = rpc_call(endpoint, method, params).await?;
    if !response.success {
        let error = response
            .error
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(format!("{} failed: {}", method, error).into());
    }
    let result = response.result.unwrap_or(serde_json::Value::Null);
    Ok(serde_json::from_value(result)?)
}

/// Sign `call` with the next nonce of `keypair` and submit it.
pub async fn submit(
    endpoint: &str,
    keypair: &Keypair,
    call: Call,
) -> Result<Receipt, Box<dyn std::error::Error>> {
    let nonce: GetNonceResponse = query(
        endpoint,
        "account/nonce",
        json!({ "account": keypair.address() }),
    )
    .await?;

    let transaction = Transaction::sign(keypair, nonce.next_nonce, call)?;
    let response: SubmitTxResponse = query(
        endpoint,
        "tx/submit",
        json!({ "transaction": transaction }),
    )
    .await?;
    Ok(response.receipt)
}
