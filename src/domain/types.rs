use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use indexmap::IndexMap;
use std::fmt;

/// Free-form metadata bag carried on artifacts, execution results and outcomes.
pub type Metadata = Map<String, Value>;

/// HTTP headers in insertion order; the attestation CLI receives them in
/// exactly this order.
pub type Headers = IndexMap<String, String>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    /// Stable identifier used internally to track the agent.
    pub agent_id: String,
    /// Hedera account that owns the agent contract.
    pub contract_account_id: String,
    /// Pricing plan identifier tied to the contract logic.
    pub plan_id: String,
}

/// Point-in-time read of an agent's finances. Amounts are in HBAR.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentFundingSnapshot {
    pub current_balance_hbar: f64,
    pub min_buffer_hbar: f64,
    pub max_buffer_hbar: f64,
    pub plan_cost_hbar: f64,
    /// Usage intensity in `[0, 1]`; higher means the agent is busier.
    pub demand_score: f64,
    #[serde(default)]
    pub last_funding_at: Option<DateTime<Utc>>,
    pub projected_hours_until_depletion: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentFundingContext {
    pub profile: AgentProfile,
    pub snapshot: AgentFundingSnapshot,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingDecision {
    pub should_fund: bool,
    /// HBAR to move to the contract, rounded to 8 decimals.
    pub top_up_amount_hbar: f64,
    pub reason: String,
    pub reevaluate_in_ms: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FundingProofStatus {
    Success,
    Failed,
    Skipped,
}

impl FundingProofStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for FundingProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingProofRequest {
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    /// Request payload. Strings are forwarded verbatim, anything else as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl FundingProofRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Headers::new(),
            body: None,
            metadata: Metadata::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingProofArtifact {
    pub status: FundingProofStatus,
    pub generated_at: DateTime<Utc>,
    pub request_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    /// Diagnostic detail for non-success outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl FundingProofArtifact {
    pub fn skipped(request: &FundingProofRequest, reason: impl Into<String>) -> Self {
        Self {
            status: FundingProofStatus::Skipped,
            generated_at: Utc::now(),
            request_url: request.url.clone(),
            raw_proof: None,
            stdout: None,
            stderr: None,
            reason: Some(reason.into()),
            headers: None,
            metadata: non_empty(&request.metadata),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingExecutionResult {
    /// `false` without an error means the call was intentionally simulated.
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Decision, execution and proof artifact of a single orchestrator call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FundingOutcome {
    #[serde(flatten)]
    pub decision: FundingDecision,
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_artifact: Option<FundingProofArtifact>,
}

impl FundingOutcome {
    /// Proof status recorded in the outcome metadata, `"skipped"` when absent.
    pub fn proof_status(&self) -> &str {
        self.metadata
            .get("proofStatus")
            .and_then(Value::as_str)
            .unwrap_or(FundingProofStatus::Skipped.as_str())
    }
}

pub(crate) fn non_empty(metadata: &Metadata) -> Option<Metadata> {
    (!metadata.is_empty()).then(|| metadata.clone())
}
