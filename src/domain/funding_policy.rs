use crate::domain::types::{AgentFundingContext, AgentFundingSnapshot, FundingDecision};
use crate::timing::{MAX_REEVALUATE_MS, MILLIS_PER_HOUR, MIN_REEVALUATE_MS};

/// Demand at or above this score makes an agent eligible for funding.
pub const MIN_DEMAND_SCORE: f64 = 0.35;
/// Projected runway at or below this many hours counts as approaching depletion.
pub const DEPLETION_WARNING_HOURS: f64 = 3.0;

const PLAN_COST_TARGET_MULTIPLIER: f64 = 2.0;
const MIN_TOP_UP_PLAN_FRACTION: f64 = 0.5;
const MIN_TOP_UP_HBAR: f64 = 0.01;
const FUNDED_REEVALUATE_FRACTION: f64 = 0.5;

/// 1 HBAR = 100,000,000 tinybars.
pub const TINYBARS_PER_HBAR: f64 = 100_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingTrigger {
    None,
    BufferDeficit,
    ApproachingDepletion,
    BufferDeficitAndDepletion,
}

impl FundingTrigger {
    pub fn is_triggered(&self) -> bool {
        !matches!(self, Self::None)
    }
}

pub fn funding_trigger(snapshot: &AgentFundingSnapshot) -> FundingTrigger {
    let buffer_deficit = snapshot.min_buffer_hbar - snapshot.current_balance_hbar > 0.0;
    let approaching_depletion = snapshot.projected_hours_until_depletion <= DEPLETION_WARNING_HOURS;
    match (buffer_deficit, approaching_depletion) {
        (true, true) => FundingTrigger::BufferDeficitAndDepletion,
        (true, false) => FundingTrigger::BufferDeficit,
        (false, true) => FundingTrigger::ApproachingDepletion,
        (false, false) => FundingTrigger::None,
    }
}

pub fn is_high_demand(snapshot: &AgentFundingSnapshot) -> bool {
    snapshot.demand_score >= MIN_DEMAND_SCORE
}

/// Turns a funding snapshot into a decision. Pure and total for finite input.
pub fn evaluate_funding(context: &AgentFundingContext) -> FundingDecision {
    let AgentFundingContext { profile, snapshot } = context;
    let trigger = funding_trigger(snapshot);
    let should_fund = trigger.is_triggered() && is_high_demand(snapshot);
    let projected_ms = snapshot.projected_hours_until_depletion * MILLIS_PER_HOUR as f64;

    if !should_fund {
        return FundingDecision {
            should_fund: false,
            top_up_amount_hbar: 0.0,
            reason: format!(
                "Agent {} funding deferred: buffer healthy or demand low.",
                profile.agent_id
            ),
            reevaluate_in_ms: reevaluate_window_ms(projected_ms),
        };
    }

    FundingDecision {
        should_fund: true,
        top_up_amount_hbar: top_up_amount(snapshot),
        reason: match trigger {
            FundingTrigger::ApproachingDepletion => format!(
                "Funding approved for agent {}: approaching depletion detected.",
                profile.agent_id
            ),
            _ => format!(
                "Funding approved for agent {}: buffer deficit detected.",
                profile.agent_id
            ),
        },
        reevaluate_in_ms: reevaluate_window_ms(projected_ms * FUNDED_REEVALUATE_FRACTION),
    }
}

/// Top-up that brings the balance towards two plan cycles, bounded by the
/// buffer ceiling and a minimum useful transfer.
pub fn top_up_amount(snapshot: &AgentFundingSnapshot) -> f64 {
    let current = snapshot.current_balance_hbar;
    let plan_cost = snapshot.plan_cost_hbar;
    let desired_balance = current + plan_cost * PLAN_COST_TARGET_MULTIPLIER;
    let target_balance = snapshot.max_buffer_hbar.min(desired_balance);
    let max_possible_top_up = (snapshot.max_buffer_hbar - current).max(plan_cost);
    let min_top_up = (plan_cost * MIN_TOP_UP_PLAN_FRACTION).max(MIN_TOP_UP_HBAR);
    round_to_tinybar_precision(clamp(
        target_balance - current,
        min_top_up,
        max_possible_top_up,
    ))
}

/// Pins `value` into `[min, max]`. When `min > max` the lower bound wins;
/// NaN maps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    min.max(value.min(max))
}

pub fn round_to_tinybar_precision(amount: f64) -> f64 {
    (amount * TINYBARS_PER_HBAR).round() / TINYBARS_PER_HBAR
}

/// Ledger amount for an HBAR figure, rounded to the nearest tinybar.
pub fn hbar_to_tinybars(amount_hbar: f64) -> i64 {
    (amount_hbar * TINYBARS_PER_HBAR).round() as i64
}

fn reevaluate_window_ms(projected_ms: f64) -> u64 {
    clamp(
        projected_ms,
        MIN_REEVALUATE_MS as f64,
        MAX_REEVALUATE_MS as f64,
    )
    .round() as u64
}
