//! The persistence boundary a confirmed leave request crosses before it is
//! recorded in history.
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::CommitError;
use crate::types::LeaveType;
use crate::utils;
use crate::validation::ValidatedRequest;

/// Acknowledgement that a request was accepted; `id` becomes the record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAck {
    pub id: String,
}

#[async_trait]
pub trait CommitBackend: Send + Sync {
    async fn commit(&self, candidate: &ValidatedRequest) -> Result<CommitAck, CommitError>;
}

/// Accepts everything without leaving the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCommit;

#[async_trait]
impl CommitBackend for LocalCommit {
    async fn commit(&self, _candidate: &ValidatedRequest) -> Result<CommitAck, CommitError> {
        Ok(CommitAck {
            id: utils::new_record_id()?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LeavePayload<'a> {
    leave_type: LeaveType,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: &'a str,
}

/// Posts the request to a leave service and waits for its JSON acknowledgement.
#[derive(Debug, Clone)]
pub struct HttpCommit {
    client: reqwest::Client,
    url: String,
}

impl HttpCommit {
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> Result<Self, CommitError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CommitError::Transport)?;
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommitBackend for HttpCommit {
    #[instrument(skip(self, candidate), fields(url = %self.url))]
    async fn commit(&self, candidate: &ValidatedRequest) -> Result<CommitAck, CommitError> {
        let payload = LeavePayload {
            leave_type: candidate.leave_type(),
            from_date: candidate.range().from(),
            to_date: candidate.range().to(),
            reason: candidate.reason(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(CommitError::Transport)?;

        let status = response.status();
        debug!(status = %status, "leave service responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "leave service refused request");
            // error bodies carry a human readable `detail`
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "Submission failed".to_string());
            return Err(CommitError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let ack: Value = response.json().await.map_err(CommitError::Decode)?;
        let id = match ack.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => utils::new_record_id()?,
        };

        Ok(CommitAck { id })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::draft::LeaveRequestDraft;
    use crate::types::Recipient;
    use crate::validation::{ValidationPolicy, validate};

    fn candidate() -> ValidatedRequest {
        let draft = LeaveRequestDraft::new()
            .set_leave_type(LeaveType::Sick)
            .set_from_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .set_to_date(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap())
            .set_reason("Medical appointment and recovery")
            .add_recipient(Recipient::HR);
        validate(&draft, &ValidationPolicy::default()).unwrap()
    }

    fn backend(server: &MockServer) -> HttpCommit {
        HttpCommit::new(&server.uri(), "/api/leave", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn joins_base_url_and_endpoint() {
        let commit = HttpCommit::new("http://localhost:8000/", "/api/leave", Duration::from_secs(1)).unwrap();
        assert_eq!(commit.url(), "http://localhost:8000/api/leave");
    }

    #[tokio::test]
    async fn local_commit_mints_ids() {
        let ack = LocalCommit.commit(&candidate()).await.unwrap();
        assert!(ack.id.starts_with("leave_1"));
    }

    #[tokio::test]
    async fn posts_payload_and_uses_acknowledged_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/leave"))
            .and(body_json(serde_json::json!({
                "leaveType": "Sick",
                "fromDate": "2025-06-01",
                "toDate": "2025-06-03",
                "reason": "Medical appointment and recovery"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 42 })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = backend(&server).commit(&candidate()).await.unwrap();
        assert_eq!(ack.id, "42");
    }

    #[tokio::test]
    async fn ack_without_id_gets_local_id() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .mount(&server)
            .await;

        let ack = backend(&server).commit(&candidate()).await.unwrap();
        assert!(ack.id.starts_with("leave_1"));
    }

    #[tokio::test]
    async fn refusal_surfaces_detail() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({ "detail": "Overlapping leave" })),
            )
            .mount(&server)
            .await;

        let err = backend(&server).commit(&candidate()).await.unwrap_err();
        match err {
            CommitError::Status { status, reason } => {
                assert_eq!(status, 409);
                assert_eq!(reason, "Overlapping leave");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_ack_is_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
            .mount(&server)
            .await;

        let err = backend(&server).commit(&candidate()).await.unwrap_err();
        assert!(matches!(err, CommitError::Decode(_)));
    }
}
