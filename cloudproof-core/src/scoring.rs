//! Scoring rules for AWS management actions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum score a single day can contribute to the heatmap.
pub const DAILY_SCORE_CAP: u64 = 50;
/// Maximum score one service can contribute on a single day.
pub const SERVICE_DAILY_CAP: u64 = 20;

/// Action name prefixes that never score (read-only or login traffic).
pub const IGNORED_ACTION_PREFIXES: [&str; 5] = ["ConsoleLogin", "Describe", "Get", "List", "Head"];

const RULES: &[(&str, &[(&str, u64)])] = &[
    (
        "EC2",
        &[
            ("RunInstances", 3),
            ("TerminateInstances", 2),
            ("StopInstances", 1),
            ("StartInstances", 1),
            ("ModifyInstanceAttribute", 2),
        ],
    ),
    (
        "S3",
        &[
            ("CreateBucket", 2),
            ("DeleteBucket", 2),
            ("PutBucketPolicy", 2),
            ("PutBucketVersioning", 1),
        ],
    ),
    (
        "IAM",
        &[
            ("CreateRole", 2),
            ("CreateUser", 2),
            ("AttachRolePolicy", 2),
            ("CreatePolicy", 3),
        ],
    ),
    (
        "VPC",
        &[
            ("CreateVpc", 3),
            ("CreateSubnet", 2),
            ("CreateSecurityGroup", 2),
            ("AuthorizeSecurityGroupIngress", 1),
        ],
    ),
    (
        "CloudFormation",
        &[("CreateStack", 5), ("UpdateStack", 4), ("DeleteStack", 3)],
    ),
    (
        "Lambda",
        &[("CreateFunction", 3), ("UpdateFunctionCode", 2)],
    ),
    ("RDS", &[("CreateDBInstance", 4), ("ModifyDBInstance", 2)]),
    ("EKS", &[("CreateCluster", 5), ("CreateNodegroup", 4)]),
];

/// One scored action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoringRule {
    /// Service name, e.g. `EC2`.
    pub service: String,
    /// Action name, e.g. `RunInstances`.
    pub action: String,
    /// Points awarded.
    pub score: u64,
}

/// The full rule set with its caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRules {
    /// Scored actions.
    pub rules: Vec<ScoringRule>,
    /// Action prefixes that never score.
    pub ignored_prefixes: Vec<String>,
    /// Per-day heatmap cap.
    pub daily_cap: u64,
    /// Per-day, per-service cap.
    pub service_daily_cap: u64,
}

/// Whether an action is read-only or login traffic.
pub fn should_ignore_action(action: &str) -> bool {
    IGNORED_ACTION_PREFIXES
        .iter()
        .any(|prefix| action.starts_with(prefix))
}

/// Rule-table spelling of a service name, matched case-insensitively.
pub fn canonical_service(name: &str) -> Option<&'static str> {
    RULES
        .iter()
        .map(|(service, _)| *service)
        .find(|service| service.eq_ignore_ascii_case(name))
}

/// Points for an action. Ignored and unknown actions score 0.
pub fn calculate_score(service: &str, action: &str) -> u64 {
    if should_ignore_action(action) {
        return 0;
    }
    RULES
        .iter()
        .find(|(name, _)| *name == service)
        .and_then(|(_, actions)| actions.iter().find(|(name, _)| *name == action))
        .map(|(_, score)| *score)
        .unwrap_or(0)
}

/// List every rule in table order.
pub fn scoring_rules() -> ScoringRules {
    let rules = RULES
        .iter()
        .flat_map(|(service, actions)| {
            actions.iter().map(move |(action, score)| ScoringRule {
                service: service.to_string(),
                action: action.to_string(),
                score: *score,
            })
        })
        .collect();
    ScoringRules {
        rules,
        ignored_prefixes: IGNORED_ACTION_PREFIXES
            .iter()
            .map(|prefix| prefix.to_string())
            .collect(),
        daily_cap: DAILY_SCORE_CAP,
        service_daily_cap: SERVICE_DAILY_CAP,
    }
}
