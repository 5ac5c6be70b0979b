//! GoTrue (`/auth/v1`) requests.

use serde_json::json;

use zenthra_core::Email;

use super::rows::{SignUpResponse, TokenResponse};
use super::{SupabaseBackend, extract_message, join_err};
use crate::backend::{BackendError, UserAttributes};

impl SupabaseBackend {
    /// Exchange credentials for a session via the password grant.
    pub(super) async fn password_grant(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<TokenResponse, BackendError> {
        let mut url = self.auth_base.join("token").map_err(join_err)?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .json(&json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_message(&body);
            // GoTrue reports a bad email/password pair as a plain 400.
            if status.as_u16() == 400
                && message.to_lowercase().contains("invalid login credentials")
            {
                return Err(BackendError::InvalidCredentials);
            }
            tracing::warn!(status = %status, message = %message, "sign in rejected");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Create an account; the response may or may not carry a session,
    /// depending on the project's confirmation policy.
    pub(super) async fn request_sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpResponse, BackendError> {
        let url = self.auth_base.join("signup").map_err(join_err)?;

        let response = self
            .client
            .post(url)
            .json(&json!({
                "email": email.as_str(),
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_message(&body);
            tracing::warn!(status = %status, message = %message, "sign up rejected");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Revoke the given session token.
    pub(super) async fn revoke_session(&self, token: &str) -> Result<(), BackendError> {
        let url = self.auth_base.join("logout").map_err(join_err)?;

        let response = self.client.post(url).bearer_auth(token).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        Ok(())
    }

    /// Update attributes of the account behind the given session token.
    pub(super) async fn put_user(
        &self,
        token: &str,
        attrs: &UserAttributes,
    ) -> Result<(), BackendError> {
        let url = self.auth_base.join("user").map_err(join_err)?;

        let mut body = serde_json::Map::new();
        if let Some(password) = &attrs.password {
            body.insert("password".to_owned(), json!(password));
        }

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&serde_json::Value::Object(body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_message(&text);
            tracing::warn!(status = %status, message = %message, "account update rejected");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
