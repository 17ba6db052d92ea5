//! Resolve the authenticated account

use tracing::info;

use crate::api::TimelineApi;
use crate::error::{PurgeError, Result};
use crate::types::{AccountIdentity, IdentityEnvelope};

/// Look up the account the user-context credentials belong to.
///
/// Issues exactly one identity call. Anything other than a 200 is fatal and
/// reported as [`PurgeError::AuthResolution`] with the status and body.
pub async fn resolve_account(api: &dyn TimelineApi) -> Result<AccountIdentity> {
    let reply = api.me().await?;

    if !reply.is_success() {
        return Err(PurgeError::AuthResolution {
            status: reply.status,
            body: reply.body,
        });
    }

    let envelope: IdentityEnvelope =
        serde_json::from_str(&reply.body).map_err(|e| PurgeError::InvalidResponse {
            endpoint: "GET /2/users/me".to_string(),
            message: e.to_string(),
        })?;

    let account = envelope.data;
    info!(id = %account.id, username = %account.username, "Current user: @{}", account.username);

    Ok(account)
}
