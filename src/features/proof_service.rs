use crate::config::VlayerConfig;
use crate::domain::types::{
    non_empty, AgentFundingContext, FundingDecision, FundingProofArtifact, FundingProofRequest,
    FundingProofStatus, Headers, Metadata,
};
use crate::errors::ProofError;
use crate::features::funding_orchestrator::ProofRequestBuilder;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

const AUTHORIZATION_HEADER: &str = "Authorization";
const WEB_PROOF_SUBCOMMAND: &str = "web-proof-fetch";

#[async_trait]
pub trait FundingProofProvider: Send + Sync {
    /// Expected negatives (disabled, non-zero exit) come back as artifacts;
    /// only failures to run the attestation at all are errors.
    async fn generate_funding_proof(
        &self,
        request: FundingProofRequest,
    ) -> Result<FundingProofArtifact, ProofError>;
}

/// Runs the vlayer CLI to notarize an HTTP request.
#[derive(Clone, Debug)]
pub struct VlayerProofService {
    config: VlayerConfig,
}

impl VlayerProofService {
    pub fn new(config: VlayerConfig) -> Self {
        Self { config }
    }

    pub fn build_args(&self, url: &str, headers: &Headers, body: Option<&Value>) -> Vec<String> {
        let mut args = vec![
            WEB_PROOF_SUBCOMMAND.to_string(),
            "--url".to_string(),
            url.to_string(),
            "--notary".to_string(),
            self.config.notary_url.clone(),
        ];
        for (key, value) in headers {
            args.push("--headers".to_string());
            args.push(format!("{key}: {value}"));
        }
        match body {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) => {
                args.push("--data".to_string());
                args.push(text.clone());
            }
            Some(other) => {
                args.push("--data".to_string());
                args.push(serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()));
            }
        }
        args
    }

    /// Appends `Authorization: Bearer <jwt>` after the caller's headers unless
    /// one is already present (any case).
    pub fn merge_headers_with_jwt(&self, base_headers: &Headers) -> Headers {
        let mut headers = base_headers.clone();
        let has_authorization = headers
            .keys()
            .any(|key| key.eq_ignore_ascii_case(AUTHORIZATION_HEADER));
        if let Some(token) = self.config.jwt_token.as_deref() {
            if !has_authorization {
                headers.insert(AUTHORIZATION_HEADER.to_string(), format!("Bearer {token}"));
            }
        }
        headers
    }
}

#[async_trait]
impl FundingProofProvider for VlayerProofService {
    async fn generate_funding_proof(
        &self,
        request: FundingProofRequest,
    ) -> Result<FundingProofArtifact, ProofError> {
        if !self.config.enabled {
            debug!(url = %request.url, "vlayer disabled; proof skipped");
            return Ok(FundingProofArtifact::skipped(
                &request,
                "vlayer integration is disabled",
            ));
        }

        let headers = self.merge_headers_with_jwt(&request.headers);
        let args = self.build_args(&request.url, &headers, request.body.as_ref());
        info!(
            cli = %self.config.cli_path,
            url = %request.url,
            header_count = headers.len(),
            "requesting web proof"
        );

        let output = Command::new(&self.config.cli_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProofError::Spawn {
                cli_path: self.config.cli_path.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        let mut artifact = FundingProofArtifact {
            status: FundingProofStatus::Success,
            generated_at: Utc::now(),
            request_url: request.url.clone(),
            raw_proof: None,
            stdout: Some(stdout.clone()),
            stderr: Some(stderr),
            reason: None,
            headers: Some(headers),
            metadata: non_empty(&request.metadata),
        };

        if exit_code != 0 {
            warn!(url = %request.url, exit_code, "vlayer cli failed");
            artifact.status = FundingProofStatus::Failed;
            artifact.reason = Some(format!("vlayer cli exited with code {exit_code}"));
            return Ok(artifact);
        }

        artifact.raw_proof = Some(stdout);
        Ok(artifact)
    }
}

/// Default strategy for the CLI: notarize a POST of the decision to
/// `proof_url`, or skip the proof phase when no URL is configured.
pub fn funding_proof_request_builder(proof_url: Option<String>) -> ProofRequestBuilder {
    Arc::new(
        move |context: &AgentFundingContext, decision: &FundingDecision| {
            let url = proof_url.as_deref()?;
            let profile = &context.profile;
            let mut request = FundingProofRequest::new(url);
            request
                .headers
                .insert("Content-Type".to_string(), "application/json".to_string());
            request.body = Some(json!({
                "agentId": profile.agent_id,
                "planId": profile.plan_id,
                "contractAccountId": profile.contract_account_id,
                "decision": {
                    "topUpAmountHbar": decision.top_up_amount_hbar,
                    "reason": decision.reason,
                    "reevaluateInMs": decision.reevaluate_in_ms,
                },
                "snapshot": context.snapshot,
            }));
            let mut metadata = Metadata::new();
            metadata.insert("agentId".to_string(), json!(profile.agent_id));
            metadata.insert("planId".to_string(), json!(profile.plan_id));
            request.metadata = metadata;
            Some(request)
        },
    )
}
