//! Proxied requests as delivered to downstream handlers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Values the authorizer attached to the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerContext {
    /// Verified token subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    /// Serialized token metadata; empty when the token carried none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsafe_metadata: Option<String>,
}

/// Gateway-supplied request context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayContext {
    /// Gateway request id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Authorizer output, absent when no authorizer ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<AuthorizerContext>,
}

/// A proxied request. Only the fields handlers read are modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// HTTP method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    /// Request path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Request headers.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    /// Gateway context.
    #[serde(default)]
    pub request_context: GatewayContext,
    /// Raw body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ProxyRequest {
    /// A request carrying the given authorizer output.
    #[must_use]
    pub fn authorized(principal_id: impl Into<String>, unsafe_metadata: impl Into<String>) -> Self {
        Self {
            request_context: GatewayContext {
                authorizer: Some(AuthorizerContext {
                    principal_id: Some(principal_id.into()),
                    unsafe_metadata: Some(unsafe_metadata.into()),
                }),
                ..GatewayContext::default()
            },
            ..Self::default()
        }
    }

    /// The authorizer output, if any.
    #[must_use]
    pub fn authorizer(&self) -> Option<&AuthorizerContext> {
        self.request_context.authorizer.as_ref()
    }

    /// The authenticated principal, if any. Empty ids count as absent.
    #[must_use]
    pub fn principal_id(&self) -> Option<&str> {
        self.authorizer()?
            .principal_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Gateway request id, if supplied.
    #[must_use]
    pub fn gateway_request_id(&self) -> Option<&str> {
        self.request_context.request_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gateway_shape() {
        let request: ProxyRequest = serde_json::from_value(json!({
            "httpMethod": "GET",
            "path": "/thing",
            "headers": null,
            "requestContext": {
                "requestId": "c6af9ac6",
                "authorizer": {
                    "principalId": "user_1",
                    "unsafeMetadata": "{\"capabilities\":{}}",
                    "integrationLatency": 12
                }
            },
            "body": null
        }))
        .unwrap();

        assert_eq!(request.principal_id(), Some("user_1"));
        assert_eq!(request.gateway_request_id(), Some("c6af9ac6"));
        assert_eq!(
            request.authorizer().unwrap().unsafe_metadata.as_deref(),
            Some("{\"capabilities\":{}}")
        );
    }

    #[test]
    fn test_missing_authorizer() {
        let request: ProxyRequest =
            serde_json::from_value(json!({ "requestContext": {} })).unwrap();
        assert!(request.authorizer().is_none());
        assert!(request.principal_id().is_none());

        let bare: ProxyRequest = serde_json::from_value(json!({})).unwrap();
        assert!(bare.principal_id().is_none());
    }

    #[test]
    fn test_empty_principal_is_absent() {
        let request = ProxyRequest::authorized("", "");
        assert!(request.authorizer().is_some());
        assert!(request.principal_id().is_none());
    }
}
