use async_trait::async_trait;
use chrono::Utc;
use hedera_agent_funding::domain::types::{
    AgentFundingContext, AgentFundingSnapshot, AgentProfile, FundingDecision,
    FundingExecutionResult, FundingProofArtifact, FundingProofRequest, FundingProofStatus,
};
use hedera_agent_funding::features::abi::ContractFunctionParameters;
use hedera_agent_funding::features::funding_orchestrator::{MemoBuilder, ParameterBuilder};
use hedera_agent_funding::features::{
    ContractFundingCall, FundingOrchestrator, FundingOrchestratorOptions, FundingProofProvider,
    LedgerGateway,
};
use hedera_agent_funding::{FundingError, LedgerError, ProofError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LedgerDouble {
    calls: Mutex<Vec<ContractFundingCall>>,
    dry_run: bool,
    fail: bool,
}

impl LedgerDouble {
    fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("ledger calls should lock").len()
    }

    fn last_call(&self) -> ContractFundingCall {
        self.calls
            .lock()
            .expect("ledger calls should lock")
            .last()
            .cloned()
            .expect("ledger should have been called")
    }
}

#[async_trait]
impl LedgerGateway for LedgerDouble {
    async fn execute_funding_call(
        &self,
        call: ContractFundingCall,
    ) -> Result<FundingExecutionResult, LedgerError> {
        let function_name = call.function_name.clone();
        let metadata = call.metadata.clone();
        self.calls
            .lock()
            .expect("ledger calls should lock")
            .push(call);
        if self.fail {
            return Err(LedgerError::Reverted {
                function: function_name,
                transaction_id: "0xdead".to_string(),
            });
        }
        if self.dry_run {
            return Ok(FundingExecutionResult {
                executed: false,
                transaction_id: None,
                status: None,
                message: format!("DRY_RUN enabled: skipping contract call {function_name}"),
                metadata: Some(metadata),
            });
        }
        Ok(FundingExecutionResult {
            executed: true,
            transaction_id: Some("0xabc123".to_string()),
            status: Some("SUCCESS".to_string()),
            message: format!("Contract {function_name} executed with status SUCCESS"),
            metadata: Some(metadata),
        })
    }
}

enum ProofBehaviour {
    Status(FundingProofStatus, Option<&'static str>),
    Error,
}

struct ProofDouble {
    behaviour: ProofBehaviour,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl ProofDouble {
    fn new(behaviour: ProofBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundingProofProvider for ProofDouble {
    async fn generate_funding_proof(
        &self,
        request: FundingProofRequest,
    ) -> Result<FundingProofArtifact, ProofError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().expect("url slot should lock") = Some(request.url.clone());
        match &self.behaviour {
            ProofBehaviour::Error => Err(ProofError::Spawn {
                cli_path: "vlayer".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            }),
            ProofBehaviour::Status(status, reason) => Ok(FundingProofArtifact {
                status: *status,
                generated_at: Utc::now(),
                request_url: request.url,
                raw_proof: (*status == FundingProofStatus::Success).then(|| "proof".to_string()),
                stdout: None,
                stderr: None,
                reason: reason.map(str::to_string),
                headers: None,
                metadata: None,
            }),
        }
    }
}

fn context(snapshot: AgentFundingSnapshot) -> AgentFundingContext {
    AgentFundingContext {
        profile: AgentProfile {
            agent_id: "agent-7".to_string(),
            contract_account_id: "0.0.123456".to_string(),
            plan_id: "starter".to_string(),
        },
        snapshot,
    }
}

fn low_balance() -> AgentFundingContext {
    context(AgentFundingSnapshot {
        current_balance_hbar: 2.0,
        min_buffer_hbar: 5.0,
        max_buffer_hbar: 20.0,
        plan_cost_hbar: 3.0,
        demand_score: 0.8,
        last_funding_at: None,
        projected_hours_until_depletion: 1.5,
    })
}

fn healthy() -> AgentFundingContext {
    context(AgentFundingSnapshot {
        current_balance_hbar: 15.0,
        min_buffer_hbar: 5.0,
        max_buffer_hbar: 20.0,
        plan_cost_hbar: 3.0,
        demand_score: 0.2,
        last_funding_at: None,
        projected_hours_until_depletion: 48.0,
    })
}

fn proof_request(
    _context: &AgentFundingContext,
    _decision: &FundingDecision,
) -> Option<FundingProofRequest> {
    Some(FundingProofRequest::new("https://usage.example/agent-7"))
}

fn with_proof(proof: Arc<ProofDouble>) -> FundingOrchestratorOptions {
    FundingOrchestratorOptions::new()
        .with_proof_service(proof)
        .with_proof_request_builder(Arc::new(proof_request))
}

#[tokio::test]
async fn healthy_agent_is_not_funded_and_touches_no_collaborator() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(FundingProofStatus::Success, None));
    let orchestrator = FundingOrchestrator::new(ledger.clone(), with_proof(proof.clone()));

    let outcome = orchestrator
        .handle_agent_funding(&healthy())
        .await
        .expect("evaluation should succeed");

    assert!(!outcome.decision.should_fund);
    assert!(!outcome.executed);
    assert_eq!(outcome.decision.reevaluate_in_ms, 1_800_000);
    assert_eq!(outcome.metadata["proofStatus"], json!("skipped"));
    assert_eq!(outcome.metadata["contractAccountId"], json!("0.0.123456"));
    assert_eq!(ledger.call_count(), 0);
    assert_eq!(proof.calls(), 0);
}

#[tokio::test]
async fn successful_proof_leads_to_payment() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(FundingProofStatus::Success, None));
    let orchestrator = FundingOrchestrator::new(ledger.clone(), with_proof(proof.clone()));

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("funding should succeed");

    assert!(outcome.executed);
    assert_eq!(outcome.transaction_id.as_deref(), Some("0xabc123"));
    assert_eq!(outcome.status.as_deref(), Some("SUCCESS"));
    assert_eq!(outcome.decision.top_up_amount_hbar, 6.0);
    assert_eq!(outcome.metadata["proofStatus"], json!("success"));
    assert_eq!(outcome.metadata["requestedTopUpHbar"], json!(6.0));
    assert_eq!(
        outcome
            .proof_artifact
            .as_ref()
            .expect("artifact should be attached")
            .raw_proof
            .as_deref(),
        Some("proof")
    );
    assert_eq!(proof.calls(), 1);
    assert_eq!(
        proof.last_url.lock().expect("url slot should lock").as_deref(),
        Some("https://usage.example/agent-7")
    );

    let call = ledger.last_call();
    assert_eq!(call.function_name, "payForPlan");
    assert_eq!(call.payable_amount_tinybars, Some(600_000_000));
    assert_eq!(
        call.parameters.solidity_types(),
        vec!["string", "string", "string", "int64"]
    );
}

#[tokio::test]
async fn failed_proof_blocks_payment_and_annotates_reason() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(
        FundingProofStatus::Failed,
        Some("vlayer cli exited with code 1"),
    ));
    let orchestrator = FundingOrchestrator::new(ledger.clone(), with_proof(proof));

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("rejection is not an error");

    assert!(outcome.decision.should_fund);
    assert!(!outcome.executed);
    assert!(outcome
        .decision
        .reason
        .ends_with("Proof status: failed (vlayer cli exited with code 1)."));
    assert_eq!(outcome.metadata["proofStatus"], json!("failed"));
    assert_eq!(outcome.metadata["planId"], json!("starter"));
    assert!(outcome.proof_artifact.is_some());
    assert_eq!(ledger.call_count(), 0);
}

#[tokio::test]
async fn skipped_proof_without_reason_uses_short_annotation() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(FundingProofStatus::Skipped, None));
    let orchestrator = FundingOrchestrator::new(ledger.clone(), with_proof(proof));

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("rejection is not an error");

    assert!(outcome.decision.reason.ends_with("Proof status: skipped."));
    assert_eq!(ledger.call_count(), 0);
}

#[tokio::test]
async fn optional_proof_lets_failed_attestation_through() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(FundingProofStatus::Failed, None));
    let orchestrator = FundingOrchestrator::new(
        ledger.clone(),
        with_proof(proof).with_require_proof_success(false),
    );

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("funding should succeed");

    assert!(outcome.executed);
    assert_eq!(outcome.metadata["proofStatus"], json!("failed"));
    assert_eq!(ledger.call_count(), 1);
}

#[tokio::test]
async fn builder_returning_none_skips_proof_but_still_pays() {
    let ledger = Arc::new(LedgerDouble::default());
    let proof = ProofDouble::new(ProofBehaviour::Status(FundingProofStatus::Success, None));
    let options = FundingOrchestratorOptions::new()
        .with_proof_service(proof.clone())
        .with_proof_request_builder(Arc::new(
            |_context: &AgentFundingContext, _decision: &FundingDecision| -> Option<FundingProofRequest> {
                None
            },
        ));
    let orchestrator = FundingOrchestrator::new(ledger.clone(), options);

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("funding should succeed");

    assert!(outcome.executed);
    assert!(outcome.proof_artifact.is_none());
    assert_eq!(outcome.metadata["proofStatus"], json!("skipped"));
    assert_eq!(proof.calls(), 0);
}

#[tokio::test]
async fn custom_builders_shape_the_contract_call() {
    let ledger = Arc::new(LedgerDouble::default());
    let parameters: ParameterBuilder =
        Arc::new(|context: &AgentFundingContext, _decision: &FundingDecision| {
            ContractFunctionParameters::new().add_string(context.profile.agent_id.clone())
        });
    let memo: MemoBuilder = Arc::new(|context: &AgentFundingContext, decision: &FundingDecision| {
        Some(format!(
            "top-up {} for {}",
            decision.top_up_amount_hbar, context.profile.agent_id
        ))
    });
    let options = FundingOrchestratorOptions::new()
        .with_contract_function_name("fundAgent")
        .with_parameter_builder(parameters)
        .with_memo_builder(memo);
    let orchestrator = FundingOrchestrator::new(ledger.clone(), options);

    orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("funding should succeed");

    let call = ledger.last_call();
    assert_eq!(call.function_name, "fundAgent");
    assert_eq!(call.parameters.solidity_types(), vec!["string"]);
    assert_eq!(call.memo.as_deref(), Some("top-up 6 for agent-7"));
}

#[tokio::test]
async fn dry_run_gateway_reports_not_executed() {
    let ledger = Arc::new(LedgerDouble::dry_run());
    let orchestrator = FundingOrchestrator::new(ledger, FundingOrchestratorOptions::new());

    let outcome = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect("dry run should succeed");

    assert!(outcome.decision.should_fund);
    assert!(!outcome.executed);
    assert_eq!(outcome.transaction_id, None);
    assert_eq!(
        outcome.message.as_deref(),
        Some("DRY_RUN enabled: skipping contract call payForPlan")
    );
    assert_eq!(outcome.metadata["agentId"], json!("agent-7"));
}

#[tokio::test]
async fn ledger_failure_propagates() {
    let orchestrator = FundingOrchestrator::new(
        Arc::new(LedgerDouble::failing()),
        FundingOrchestratorOptions::new(),
    );

    let error = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect_err("revert should propagate");
    assert!(matches!(
        error,
        FundingError::Ledger(LedgerError::Reverted { .. })
    ));
}

#[tokio::test]
async fn proof_failure_propagates_without_paying() {
    let ledger = Arc::new(LedgerDouble::default());
    let orchestrator = FundingOrchestrator::new(
        ledger.clone(),
        with_proof(ProofDouble::new(ProofBehaviour::Error)),
    );

    let error = orchestrator
        .handle_agent_funding(&low_balance())
        .await
        .expect_err("spawn failure should propagate");
    assert!(matches!(error, FundingError::Proof(ProofError::Spawn { .. })));
    assert_eq!(ledger.call_count(), 0);
}

#[tokio::test]
async fn orchestrator_can_be_shared_across_tasks() {
    let ledger = Arc::new(LedgerDouble::default());
    let orchestrator = Arc::new(FundingOrchestrator::new(
        ledger.clone(),
        FundingOrchestratorOptions::new(),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.handle_agent_funding(&low_balance()).await })
        })
        .collect();
    for handle in handles {
        let outcome = handle
            .await
            .expect("task should join")
            .expect("funding should succeed");
        assert!(outcome.executed);
    }
    assert_eq!(ledger.call_count(), 4);
}
