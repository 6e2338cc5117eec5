//! License synchronization into identity provider metadata.
//!
//! The license service is the source of truth for capabilities. These
//! endpoints copy the caller's current grants into the metadata the
//! identity provider embeds in future tokens.

use std::sync::Arc;

use async_trait::async_trait;
use capgate_capabilities::CapabilityMap;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::guard::authenticate;
use crate::request::ProxyRequest;
use crate::response::HandlerResponse;

/// Result of a license lookup for one grantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseStatus {
    /// The grantee holds a license granting these capabilities.
    Licensed(CapabilityMap),
    /// The grantee holds no license.
    NoLicense,
}

/// The external license-management service.
#[async_trait]
pub trait LicenseService: Send + Sync {
    /// Look up the licenses held by `grantee_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Upstream`](crate::HandlerError::Upstream) if
    /// the service cannot be queried.
    async fn check(&self, grantee_id: &str) -> HandlerResult<LicenseStatus>;

    /// Purchase the default plan for `grantee_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Upstream`](crate::HandlerError::Upstream) if
    /// the purchase fails.
    async fn purchase_default_plan(&self, grantee_id: &str) -> HandlerResult<()>;
}

/// The external identity provider that issues tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Replace the `capabilities` field of the user's token metadata.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Upstream`](crate::HandlerError::Upstream) if
    /// the update fails.
    async fn set_capabilities(&self, user_id: &str, capabilities: &CapabilityMap) -> HandlerResult<()>;
}

/// Copies license grants into identity provider metadata.
#[derive(Clone)]
pub struct LicenseSync {
    licenses: Arc<dyn LicenseService>,
    identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for LicenseSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseSync").finish_non_exhaustive()
    }
}

impl LicenseSync {
    /// Create a sync over the two services.
    #[must_use]
    pub fn new(licenses: Arc<dyn LicenseService>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { licenses, identity }
    }

    /// Refresh `user_id`'s capabilities. A user without a license ends up
    /// with an empty capability map.
    ///
    /// # Errors
    ///
    /// Propagates either service's failure.
    pub async fn refresh(&self, user_id: &str) -> HandlerResult<LicenseStatus> {
        let status = self.licenses.check(user_id).await?;
        let capabilities = match &status {
            LicenseStatus::Licensed(capabilities) => {
                info!(user = user_id, count = capabilities.len(), "license found");
                capabilities.clone()
            },
            LicenseStatus::NoLicense => {
                info!(user = user_id, "no license, clearing capabilities");
                CapabilityMap::new()
            },
        };
        self.identity.set_capabilities(user_id, &capabilities).await?;
        Ok(status)
    }

    /// Purchase the default plan for `user_id`, then refresh.
    ///
    /// # Errors
    ///
    /// Propagates either service's failure. Nothing is refreshed if the
    /// purchase fails.
    pub async fn purchase_and_refresh(&self, user_id: &str) -> HandlerResult<LicenseStatus> {
        self.licenses.purchase_default_plan(user_id).await?;
        info!(user = user_id, "default plan purchased");
        self.refresh(user_id).await
    }
}

/// Refreshes the caller's capabilities from the license service.
#[derive(Debug, Clone)]
pub struct LicenseCheck {
    sync: LicenseSync,
}

impl LicenseCheck {
    /// Create the endpoint.
    #[must_use]
    pub fn new(sync: LicenseSync) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl Endpoint for LicenseCheck {
    fn name(&self) -> &'static str {
        "license-check"
    }

    async fn call(&self, request: &ProxyRequest, _now: DateTime<Utc>) -> HandlerResult<HandlerResponse> {
        let user_id = authenticate(request)?;
        self.sync.refresh(user_id).await?;
        Ok(HandlerResponse::no_content())
    }
}

/// Grants the default plan to a newly signed-up caller.
#[derive(Debug, Clone)]
pub struct PostSignUp {
    sync: LicenseSync,
}

impl PostSignUp {
    /// Create the endpoint.
    #[must_use]
    pub fn new(sync: LicenseSync) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl Endpoint for PostSignUp {
    fn name(&self) -> &'static str {
        "post-sign-up"
    }

    async fn call(&self, request: &ProxyRequest, _now: DateTime<Utc>) -> HandlerResult<HandlerResponse> {
        let user_id = authenticate(request)?;
        self.sync.purchase_and_refresh(user_id).await?;
        Ok(HandlerResponse::no_content())
    }
}
