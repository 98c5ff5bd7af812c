use crate::domain::types::{non_empty, FundingExecutionResult, Metadata};
use crate::errors::LedgerError;
use crate::features::abi::{encode_function_call, ContractFunctionParameters};
use crate::features::hedera_client::{
    resolve_address, HederaClientHandle, TransactionRequest, RECEIPT_SUCCESS,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_FUNDING_FUNCTION: &str = "payForPlan";
pub const DEFAULT_CONTRACT_GAS_LIMIT: u64 = 2_000_000;

/// One payable contract invocation requested by the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractFundingCall {
    pub function_name: String,
    pub parameters: ContractFunctionParameters,
    pub payable_amount_tinybars: Option<i64>,
    /// Falls back to the gateway's configured limit.
    pub gas: Option<u64>,
    pub memo: Option<String>,
    pub metadata: Metadata,
}

#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn execute_funding_call(
        &self,
        call: ContractFundingCall,
    ) -> Result<FundingExecutionResult, LedgerError>;
}

#[async_trait]
impl<T: LedgerGateway + ?Sized> LedgerGateway for Arc<T> {
    async fn execute_funding_call(
        &self,
        call: ContractFundingCall,
    ) -> Result<FundingExecutionResult, LedgerError> {
        (**self).execute_funding_call(call).await
    }
}

#[derive(Debug)]
pub struct HederaContractService {
    contract_id: String,
    gas_limit: u64,
    dry_run: bool,
    client: Arc<HederaClientHandle>,
}

impl HederaContractService {
    pub fn new(
        contract_id: impl Into<String>,
        gas_limit: u64,
        dry_run: bool,
        client: Arc<HederaClientHandle>,
    ) -> Self {
        Self {
            contract_id: contract_id.into(),
            gas_limit,
            dry_run,
            client,
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl LedgerGateway for HederaContractService {
    async fn execute_funding_call(
        &self,
        call: ContractFundingCall,
    ) -> Result<FundingExecutionResult, LedgerError> {
        let function_name = if call.function_name.trim().is_empty() {
            DEFAULT_FUNDING_FUNCTION.to_string()
        } else {
            call.function_name.trim().to_string()
        };
        let gas_limit = call.gas.unwrap_or(self.gas_limit);

        if self.dry_run {
            info!(
                contract_id = %self.contract_id,
                function = %function_name,
                "dry run: contract call skipped"
            );
            return Ok(FundingExecutionResult {
                executed: false,
                transaction_id: None,
                status: None,
                message: format!("DRY_RUN enabled: skipping contract call {function_name}"),
                metadata: non_empty(&call.metadata),
            });
        }

        let value_tinybars = match call.payable_amount_tinybars {
            None => 0,
            Some(amount) => u64::try_from(amount)
                .map_err(|_| LedgerError::InvalidPayableAmount { tinybars: amount })?,
        };
        let contract_address = resolve_address(&self.contract_id)?;
        let calldata = encode_function_call(&function_name, &call.parameters)?;
        let client = self.client.client().await?;

        debug!(
            contract_id = %self.contract_id,
            function = %function_name,
            value_tinybars,
            gas_limit,
            calldata_len = calldata.len(),
            "submitting contract call"
        );
        let receipt = client
            .submit(TransactionRequest {
                to: Some(contract_address),
                data: calldata,
                value_tinybars,
                gas_limit,
            })
            .await?;

        if !receipt.succeeded() {
            return Err(LedgerError::Reverted {
                function: function_name,
                transaction_id: receipt.transaction_hash,
            });
        }

        let mut metadata = call.metadata;
        if let Some(memo) = call.memo {
            metadata.insert("memo".to_string(), Value::String(memo));
        }
        info!(
            function = %function_name,
            transaction_id = %receipt.transaction_hash,
            "contract call settled"
        );
        Ok(FundingExecutionResult {
            executed: true,
            transaction_id: Some(receipt.transaction_hash),
            status: Some(RECEIPT_SUCCESS.to_string()),
            message: format!("Contract {function_name} executed with status {RECEIPT_SUCCESS}"),
            metadata: non_empty(&metadata),
        })
    }
}
