use alloy::primitives::Address;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::chain::ChainClient;
use crate::config::Config;
use crate::error::DeployError;
use crate::networks::{Network, SUPPORTED_NETWORKS};
use crate::orchestrator::{failure_result, DeploymentOrchestrator};
use crate::persist::{record_non_fatal, DeploymentRecord, DeploymentSink};
use crate::query::{QueryService, TokenSummary};
use crate::types::TokenConfig;
use crate::wallet::LocalSigner;

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    pub sink: Arc<dyn DeploymentSink>,
}

#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub config: TokenConfig,
    #[serde(rename = "userAddress")]
    pub user_address: String,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub success: bool,
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: u64,
    #[serde(rename = "deploymentCost")]
    pub deployment_cost: String,
    #[serde(rename = "explorerUrl")]
    pub explorer_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TokensQuery {
    #[serde(rename = "userAddress")]
    pub user_address: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub tokens: Vec<TokenSummary>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn create_api_router() -> Router<ApiState> {
    Router::new()
        .route("/deploy", post(deploy_token))
        .route("/tokens", get(list_user_tokens))
        .route("/networks", get(list_networks))
}

fn error_response(err: &DeployError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Deployment request failed: {}", err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Deploy a token from a wizard config. Validation and network-config
/// failures come back as 4xx without anything having been sent to a chain;
/// execution failures are 5xx.
#[instrument(skip(state, request), fields(chain_id = request.config.chain_id))]
async fn deploy_token(
    State(state): State<ApiState>,
    Json(request): Json<DeployRequest>,
) -> Response {
    let network = match Network::resolve(request.config.chain_id) {
        Ok(n) => n,
        Err(e) => return error_response(&e),
    };

    let user_address = match Address::from_str(request.user_address.trim()) {
        Ok(a) => a,
        Err(_) => {
            return error_response(&DeployError::InvalidAddress(format!(
                "Invalid user address: {}",
                request.user_address
            )))
        }
    };

    let orchestrator = match build_orchestrator(&state, network) {
        Ok(o) => o,
        Err(e) => return error_response(&e),
    };

    info!(
        "Deploying {} ({}) on {} for {}",
        request.config.name, request.config.symbol, network.name, user_address
    );

    match orchestrator.deploy(&request.config).await {
        Ok(result) => {
            let record = DeploymentRecord::from_result(
                &result,
                &request.user_address,
                &request.config.name,
                &request.config.symbol,
                network.name,
            );
            record_non_fatal(state.sink.as_ref(), record).await;

            let contract_address = result.contract_address.unwrap_or_default();
            let transaction_hash = result.transaction_hash.unwrap_or_default();
            // Inconsistent success has no address to link; point at the
            // transaction instead.
            let explorer_url = if contract_address.is_empty() {
                network.tx_url(&transaction_hash)
            } else {
                network.address_url(&contract_address)
            };

            Json(DeployResponse {
                success: true,
                contract_address,
                transaction_hash,
                gas_used: result.gas_used.unwrap_or(0),
                deployment_cost: result.deployment_cost.unwrap_or_default(),
                explorer_url,
            })
            .into_response()
        }
        Err(e) => {
            let record = DeploymentRecord::from_result(
                &failure_result(&e),
                &request.user_address,
                &request.config.name,
                &request.config.symbol,
                network.name,
            );
            record_non_fatal(state.sink.as_ref(), record).await;
            error_response(&e)
        }
    }
}

/// List a user's previously created tokens with per-token metadata. One
/// token failing to describe does not fail the listing.
#[instrument(skip(state))]
async fn list_user_tokens(
    State(state): State<ApiState>,
    Query(params): Query<TokensQuery>,
) -> Response {
    let network = match Network::resolve(params.chain_id) {
        Ok(n) => n,
        Err(e) => return error_response(&e),
    };

    let user_address = match Address::from_str(params.user_address.trim()) {
        Ok(a) => a,
        Err(_) => {
            return error_response(&DeployError::InvalidAddress(format!(
                "Invalid user address: {}",
                params.user_address
            )))
        }
    };

    let client = match build_client(&state, network) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let service = QueryService::new(client);

    let addresses = match service.list_user_tokens(user_address).await {
        Ok(addrs) => addrs,
        Err(e) => return error_response(&e),
    };

    let tokens = service.describe_all(&addresses, user_address).await;
    Json(TokensResponse { tokens }).into_response()
}

async fn list_networks() -> Json<Vec<Network>> {
    Json(SUPPORTED_NETWORKS.clone())
}

fn build_client(state: &ApiState, network: &'static Network) -> Result<ChainClient, DeployError> {
    let signer = LocalSigner::new(&state.config.deployer_key, network)
        .map_err(|e| DeployError::ConnectionError(e.to_string()))?;
    ChainClient::new(network, Arc::new(signer))
}

fn build_orchestrator(
    state: &ApiState,
    network: &'static Network,
) -> Result<DeploymentOrchestrator, DeployError> {
    let client = build_client(state, network)?;
    Ok(DeploymentOrchestrator::new(
        client,
        state.config.confirmations,
        Duration::from_secs(state.config.confirmation_timeout_secs),
    ))
}
