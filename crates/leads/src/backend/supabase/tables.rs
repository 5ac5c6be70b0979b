//! PostgREST (`/rest/v1`) table access for `leads` and `users`.

use serde::de::DeserializeOwned;
use url::Url;

use zenthra_core::{Lead, LeadId, LeadSubmission, LeadUpdate, UserId, UserProfile};

use super::rows::{LeadChanges, LeadInsert, LeadRow, ProfileInsert, ProfileRow};
use super::{SupabaseBackend, extract_message, join_err, truncate};
use crate::backend::{BackendError, NewProfile};

/// Ask PostgREST to echo the affected row back.
const PREFER_REPRESENTATION: &str = "return=representation";

/// Single-object responses (`.single()` semantics): exactly one row or a
/// 406 error, never an array.
const ACCEPT_SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

impl SupabaseBackend {
    fn table(&self, name: &str) -> Result<Url, BackendError> {
        self.rest_base.join(name).map_err(join_err)
    }

    pub(super) async fn select_leads(&self) -> Result<Vec<Lead>, BackendError> {
        let mut url = self.table("leads")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let response = self.client.get(url).bearer_auth(self.bearer()).send().await?;
        let rows: Vec<LeadRow> = read_json(response).await?;
        Ok(rows.into_iter().map(Lead::from).collect())
    }

    pub(super) async fn insert_lead_row(
        &self,
        submission: LeadSubmission,
    ) -> Result<Lead, BackendError> {
        let url = self.table("leads")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.bearer())
            .header("Prefer", PREFER_REPRESENTATION)
            .header("Accept", ACCEPT_SINGLE_OBJECT)
            .json(&LeadInsert::from(submission))
            .send()
            .await?;

        let row: LeadRow = read_json(response).await?;
        Ok(Lead::from(row))
    }

    pub(super) async fn update_lead_row(
        &self,
        id: &LeadId,
        update: LeadUpdate,
    ) -> Result<Lead, BackendError> {
        let mut url = self.table("leads")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .client
            .patch(url)
            .bearer_auth(self.bearer())
            .header("Prefer", PREFER_REPRESENTATION)
            // A patch that matches no row fails under the single-object
            // accept header, which is exactly the contract: updating a
            // missing id is the service's error to report.
            .header("Accept", ACCEPT_SINGLE_OBJECT)
            .json(&LeadChanges::from(update))
            .send()
            .await?;

        let row: LeadRow = read_json(response).await?;
        Ok(Lead::from(row))
    }

    pub(super) async fn delete_lead_row(&self, id: &LeadId) -> Result<(), BackendError> {
        let mut url = self.table("leads")?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .client
            .delete(url)
            .bearer_auth(self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        // Deleting zero rows is a success to PostgREST; a missing id is a
        // silent no-op by design.
        Ok(())
    }

    pub(super) async fn select_profile(
        &self,
        id: &UserId,
    ) -> Result<Option<UserProfile>, BackendError> {
        let mut url = self.table("users")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .client
            .get(url)
            .bearer_auth(self.bearer())
            .header("Accept", ACCEPT_SINGLE_OBJECT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // No matching row under the single-object accept header.
        if status.as_u16() == 406 {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        let row: ProfileRow =
            serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Some(UserProfile::from(row)))
    }

    pub(super) async fn insert_profile(
        &self,
        profile: NewProfile,
    ) -> Result<UserProfile, BackendError> {
        let url = self.table("users")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.bearer())
            .header("Prefer", PREFER_REPRESENTATION)
            .header("Accept", ACCEPT_SINGLE_OBJECT)
            .json(&ProfileInsert::from(profile))
            .send()
            .await?;

        let row: ProfileRow = read_json(response).await?;
        Ok(UserProfile::from(row))
    }
}

/// Read a response body as text first, then parse; failures keep enough of
/// the body around to diagnose.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %truncate(&body),
            "backend request failed"
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: extract_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body),
            "failed to parse backend response"
        );
        BackendError::Parse(e.to_string())
    })
}
