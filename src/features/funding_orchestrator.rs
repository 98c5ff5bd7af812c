use crate::domain::funding_policy::{evaluate_funding, funding_trigger, hbar_to_tinybars};
use crate::domain::state_machine::{transition, FundingEvent, FundingState};
use crate::domain::types::{
    AgentFundingContext, FundingDecision, FundingOutcome, FundingProofArtifact,
    FundingProofRequest, FundingProofStatus, Metadata,
};
use crate::errors::FundingError;
use crate::features::abi::ContractFunctionParameters;
use crate::features::contract_service::{
    ContractFundingCall, LedgerGateway, DEFAULT_FUNDING_FUNCTION,
};
use crate::features::proof_service::FundingProofProvider;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type ParameterBuilder =
    Arc<dyn Fn(&AgentFundingContext, &FundingDecision) -> ContractFunctionParameters + Send + Sync>;
pub type MemoBuilder =
    Arc<dyn Fn(&AgentFundingContext, &FundingDecision) -> Option<String> + Send + Sync>;
pub type ProofRequestBuilder = Arc<
    dyn Fn(&AgentFundingContext, &FundingDecision) -> Option<FundingProofRequest> + Send + Sync,
>;

#[derive(Clone)]
pub struct FundingOrchestratorOptions {
    contract_function_name: String,
    parameter_builder: Option<ParameterBuilder>,
    memo_builder: Option<MemoBuilder>,
    proof_service: Option<Arc<dyn FundingProofProvider>>,
    proof_request_builder: Option<ProofRequestBuilder>,
    require_proof_success: bool,
}

impl Default for FundingOrchestratorOptions {
    fn default() -> Self {
        Self {
            contract_function_name: DEFAULT_FUNDING_FUNCTION.to_string(),
            parameter_builder: None,
            memo_builder: None,
            proof_service: None,
            proof_request_builder: None,
            require_proof_success: true,
        }
    }
}

impl fmt::Debug for FundingOrchestratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FundingOrchestratorOptions")
            .field("contract_function_name", &self.contract_function_name)
            .field("parameter_builder", &self.parameter_builder.is_some())
            .field("memo_builder", &self.memo_builder.is_some())
            .field("proof_service", &self.proof_service.is_some())
            .field("proof_request_builder", &self.proof_request_builder.is_some())
            .field("require_proof_success", &self.require_proof_success)
            .finish()
    }
}

impl FundingOrchestratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract_function_name(mut self, name: impl Into<String>) -> Self {
        self.contract_function_name = name.into();
        self
    }

    pub fn with_parameter_builder(mut self, builder: ParameterBuilder) -> Self {
        self.parameter_builder = Some(builder);
        self
    }

    pub fn with_memo_builder(mut self, builder: MemoBuilder) -> Self {
        self.memo_builder = Some(builder);
        self
    }

    pub fn with_proof_service(mut self, service: Arc<dyn FundingProofProvider>) -> Self {
        self.proof_service = Some(service);
        self
    }

    pub fn with_proof_request_builder(mut self, builder: ProofRequestBuilder) -> Self {
        self.proof_request_builder = Some(builder);
        self
    }

    pub fn with_require_proof_success(mut self, required: bool) -> Self {
        self.require_proof_success = required;
        self
    }
}

/// `string contractAccountId, string planId, string agentId, int64 tinybars`.
pub fn default_parameter_builder(
    context: &AgentFundingContext,
    decision: &FundingDecision,
) -> ContractFunctionParameters {
    ContractFunctionParameters::new()
        .add_string(context.profile.contract_account_id.clone())
        .add_string(context.profile.plan_id.clone())
        .add_string(context.profile.agent_id.clone())
        .add_int64(hbar_to_tinybars(decision.top_up_amount_hbar))
}

/// Evaluates an agent, optionally gates on a proof, and pays the contract.
/// Holds no per-agent state; one call is one independent attempt.
pub struct FundingOrchestrator<L: LedgerGateway> {
    ledger: L,
    options: FundingOrchestratorOptions,
}

impl<L: LedgerGateway> FundingOrchestrator<L> {
    pub fn new(ledger: L, options: FundingOrchestratorOptions) -> Self {
        Self { ledger, options }
    }

    pub fn options(&self) -> &FundingOrchestratorOptions {
        &self.options
    }

    pub async fn handle_agent_funding(
        &self,
        context: &AgentFundingContext,
    ) -> Result<FundingOutcome, FundingError> {
        let profile = &context.profile;
        let decision = evaluate_funding(context);
        let mut state = advance(FundingState::Start, FundingEvent::DecisionMade)?;
        info!(
            agent_id = %profile.agent_id,
            should_fund = decision.should_fund,
            top_up_amount_hbar = decision.top_up_amount_hbar,
            reevaluate_in_ms = decision.reevaluate_in_ms,
            trigger = ?funding_trigger(&context.snapshot),
            "funding evaluated"
        );

        if !decision.should_fund || decision.top_up_amount_hbar <= 0.0 {
            state = advance(state, FundingEvent::FundingNotRequired)?;
            advance(state, FundingEvent::Finish)?;
            let mut metadata = Metadata::new();
            metadata.insert("agentId".to_string(), json!(profile.agent_id));
            metadata.insert(
                "contractAccountId".to_string(),
                json!(profile.contract_account_id),
            );
            metadata.insert(
                "proofStatus".to_string(),
                json!(FundingProofStatus::Skipped.as_str()),
            );
            return Ok(FundingOutcome {
                decision,
                executed: false,
                transaction_id: None,
                status: None,
                message: None,
                metadata,
                proof_artifact: None,
            });
        }

        let mut proof_artifact: Option<FundingProofArtifact> = None;
        if let (Some(service), Some(builder)) = (
            self.options.proof_service.as_ref(),
            self.options.proof_request_builder.as_ref(),
        ) {
            match builder(context, &decision) {
                None => debug!(agent_id = %profile.agent_id, "no proof request; proof phase skipped"),
                Some(request) => {
                    state = advance(state, FundingEvent::ProofDispatched)?;
                    let artifact = service.generate_funding_proof(request).await?;
                    state = advance(
                        state,
                        FundingEvent::ProofReturned {
                            status: artifact.status,
                        },
                    )?;

                    if self.options.require_proof_success
                        && artifact.status != FundingProofStatus::Success
                    {
                        state = advance(state, FundingEvent::ProofRejected)?;
                        advance(state, FundingEvent::Finish)?;
                        warn!(
                            agent_id = %profile.agent_id,
                            proof_status = %artifact.status,
                            "funding blocked by proof"
                        );
                        return Ok(rejected_outcome(context, decision, artifact));
                    }
                    proof_artifact = Some(artifact);
                }
            }
        }

        let parameters = match self.options.parameter_builder.as_ref() {
            Some(builder) => builder(context, &decision),
            None => default_parameter_builder(context, &decision),
        };
        let memo = self
            .options
            .memo_builder
            .as_ref()
            .and_then(|builder| builder(context, &decision));

        let mut call_metadata = Metadata::new();
        call_metadata.insert("agentId".to_string(), json!(profile.agent_id));
        call_metadata.insert("planId".to_string(), json!(profile.plan_id));
        call_metadata.insert(
            "requestedTopUpHbar".to_string(),
            json!(decision.top_up_amount_hbar),
        );

        let execution = self
            .ledger
            .execute_funding_call(ContractFundingCall {
                function_name: self.options.contract_function_name.clone(),
                parameters,
                payable_amount_tinybars: Some(hbar_to_tinybars(decision.top_up_amount_hbar)),
                gas: None,
                memo,
                metadata: call_metadata,
            })
            .await?;
        state = advance(
            state,
            FundingEvent::LedgerSettled {
                executed: execution.executed,
            },
        )?;
        advance(state, FundingEvent::Finish)?;

        let proof_status = proof_artifact
            .as_ref()
            .map(|artifact| artifact.status)
            .unwrap_or(FundingProofStatus::Skipped);
        let mut metadata = execution.metadata.unwrap_or_default();
        metadata.insert(
            "proofStatus".to_string(),
            Value::String(proof_status.as_str().to_string()),
        );
        info!(
            agent_id = %profile.agent_id,
            executed = execution.executed,
            transaction_id = execution.transaction_id.as_deref().unwrap_or(""),
            %proof_status,
            "funding attempt finished"
        );

        Ok(FundingOutcome {
            decision,
            executed: execution.executed,
            transaction_id: execution.transaction_id,
            status: execution.status,
            message: Some(execution.message),
            metadata,
            proof_artifact,
        })
    }
}

fn advance(state: FundingState, event: FundingEvent) -> Result<FundingState, FundingError> {
    let next = transition(&state, &event)?;
    debug!(from = ?state, to = ?next, event = ?event, "funding state transition");
    Ok(next)
}

fn rejected_outcome(
    context: &AgentFundingContext,
    mut decision: FundingDecision,
    artifact: FundingProofArtifact,
) -> FundingOutcome {
    let profile = &context.profile;
    decision.reason = match artifact.reason.as_deref() {
        Some(detail) => format!(
            "{} Proof status: {} ({detail}).",
            decision.reason, artifact.status
        ),
        None => format!("{} Proof status: {}.", decision.reason, artifact.status),
    };
    let mut metadata = Metadata::new();
    metadata.insert("agentId".to_string(), json!(profile.agent_id));
    metadata.insert("planId".to_string(), json!(profile.plan_id));
    metadata.insert(
        "contractAccountId".to_string(),
        json!(profile.contract_account_id),
    );
    metadata.insert("proofStatus".to_string(), json!(artifact.status.as_str()));
    FundingOutcome {
        decision,
        executed: false,
        transaction_id: None,
        status: None,
        message: None,
        metadata,
        proof_artifact: Some(artifact),
    }
}
