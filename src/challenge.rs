// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Challenge payloads exchanged with the webhook host.
//!
//! The host sends a [`ChallengePayload`] carrying a [`ChallengeRequest`] and expects the same
//! payload back with a [`ChallengeResponse`] filled in. [`dispatch`] routes the request to
//! the matching [`Solver`] entry point by its [`ChallengeAction`].

use crate::constants::{CHALLENGE_API_VERSION, CHALLENGE_KIND};
use crate::solver::Solver;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Lifecycle step requested by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeAction {
    /// Publish the challenge TXT record
    Present,
    /// Remove the challenge TXT record
    CleanUp,
}

impl ChallengeAction {
    /// Action name as it appears on the wire
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "Present",
            Self::CleanUp => "CleanUp",
        }
    }
}

/// A single DNS-01 challenge as handed to the solver.
///
/// `resolved_fqdn` and `resolved_zone` are computed by the host; the solver uses them as-is.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    #[serde(default)]
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ChallengeAction>,

    /// Challenge type, always `dns-01` for this solver
    #[serde(default, rename = "type")]
    pub challenge_type: String,

    #[serde(default)]
    pub dns_name: String,

    /// Value that must be published verbatim as the TXT record content
    #[serde(default)]
    pub key: String,

    /// Namespace secret references are resolved in
    #[serde(default)]
    pub resource_namespace: String,

    /// Fully qualified name of the challenge record, e.g. `_acme-challenge.example.com.`
    #[serde(default, rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// Zone the challenge record lives in, e.g. `example.com.`
    #[serde(default)]
    pub resolved_zone: String,

    /// Whether the issuer allows ambient credentials (unused by this solver)
    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Raw solver configuration from the issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Outcome reported back to the host.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub uid: String,

    pub success: bool,

    /// Failure details, absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ChallengeResponse {
    /// Successful response for the given request id
    #[must_use]
    pub fn success(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            success: true,
            status: None,
        }
    }

    /// Failed response carrying a reason and message
    #[must_use]
    pub fn failure(uid: impl Into<String>, reason: &str, message: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            success: false,
            status: Some(Status {
                status: Some("Failure".to_string()),
                reason: Some(reason.to_string()),
                message: Some(message.into()),
                code: Some(500),
                ..Default::default()
            }),
        }
    }
}

/// Envelope exchanged with the host.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    /// Always [`CHALLENGE_API_VERSION`]
    pub api_version: String,

    /// Always [`CHALLENGE_KIND`]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengePayload {
    /// Wrap a request into a fresh payload envelope
    #[must_use]
    pub fn for_request(request: ChallengeRequest) -> Self {
        Self {
            api_version: CHALLENGE_API_VERSION.to_string(),
            kind: CHALLENGE_KIND.to_string(),
            request: Some(request),
            response: None,
        }
    }
}

/// Route a payload to the solver and fill in its response.
///
/// Solver errors never escape this function: they are reported as `success: false` with
/// the error kind as the status reason and the error text as the status message.
pub async fn dispatch<S>(solver: &S, mut payload: ChallengePayload) -> ChallengePayload
where
    S: Solver + ?Sized,
{
    let Some(request) = payload.request.as_ref() else {
        warn!("Received challenge payload without a request");
        payload.response = Some(ChallengeResponse::failure(
            "",
            "BadRequest",
            "challenge payload has no request",
        ));
        return payload;
    };

    let Some(action) = request.action else {
        warn!("Challenge request {} has no action", request.uid);
        payload.response = Some(ChallengeResponse::failure(
            request.uid.clone(),
            "BadRequest",
            "challenge request has no action",
        ));
        return payload;
    };

    info!(
        "Dispatching {} for request {} ({})",
        action.as_str(),
        request.uid,
        request.resolved_fqdn
    );

    let result = match action {
        ChallengeAction::Present => solver.present(request).await,
        ChallengeAction::CleanUp => solver.clean_up(request).await,
    };

    let response = match result {
        Ok(()) => ChallengeResponse::success(request.uid.clone()),
        Err(err) => ChallengeResponse::failure(request.uid.clone(), err.kind(), err.to_string()),
    };
    payload.response = Some(response);
    payload
}

#[cfg(test)]
#[path = "challenge_tests.rs"]
mod challenge_tests;
