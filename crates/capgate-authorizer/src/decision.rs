//! Authorization decisions returned to the gateway.

use serde::{Deserialize, Serialize};

/// Policy language version understood by the gateway.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The only action an authorizer policy grants.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Resource scope of an Allow decision: every method of the API.
pub const WILDCARD_RESOURCE: &str = "*";

/// Policy effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Admit the request.
    Allow,
    /// Refuse the request.
    Deny,
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Granted action.
    pub action: String,
    /// Allow or Deny.
    pub effect: Effect,
    /// Resource the statement applies to.
    pub resource: String,
}

/// Policy document attached to a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version.
    pub version: String,
    /// Statements, exactly one for decisions built here.
    pub statement: Vec<Statement>,
}

/// Flat key/value context propagated to downstream handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContext {
    /// Serialized token metadata, or `""` when the token carried none.
    pub unsafe_metadata: String,
}

/// The authorizer's answer for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationDecision {
    /// Verified token subject.
    pub principal_id: String,
    /// Policy applied by the gateway.
    pub policy_document: PolicyDocument,
    /// Context handed to the downstream handler.
    pub context: DecisionContext,
}

impl AuthorizationDecision {
    /// An Allow decision for `principal_id` on `resource`.
    #[must_use]
    pub fn allow(
        principal_id: impl Into<String>,
        resource: impl Into<String>,
        unsafe_metadata: impl Into<String>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect: Effect::Allow,
                    resource: resource.into(),
                }],
            },
            context: DecisionContext {
                unsafe_metadata: unsafe_metadata.into(),
            },
        }
    }

    /// Whether every statement allows.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        !self.policy_document.statement.is_empty()
            && self
                .policy_document
                .statement
                .iter()
                .all(|s| s.effect == Effect::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let decision = AuthorizationDecision::allow("user_1", WILDCARD_RESOURCE, r#"{"a":1}"#);
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "principalId": "user_1",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": "execute-api:Invoke",
                        "Effect": "Allow",
                        "Resource": "*"
                    }]
                },
                "context": { "unsafeMetadata": "{\"a\":1}" }
            })
        );
        assert!(decision.is_allow());
    }

    #[test]
    fn test_deny_statement_is_not_allow() {
        let mut decision = AuthorizationDecision::allow("user_1", WILDCARD_RESOURCE, "");
        decision.policy_document.statement[0].effect = Effect::Deny;
        assert!(!decision.is_allow());

        decision.policy_document.statement.clear();
        assert!(!decision.is_allow());
    }
}
