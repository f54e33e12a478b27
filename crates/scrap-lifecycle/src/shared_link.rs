//! Shared link lifecycle: issue, resolve, list, revoke, and the expiry sweep.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use scrap_core::entities::SharedLink;
use scrap_core::errors::CoreError;
use scrap_core::ids::generate_share_token;
use scrap_core::responses::SharedProject;
use scrap_db::MetadataStore;

use crate::error::LifecycleError;
use crate::project::ProjectManager;

/// Insert attempts per issue before a token collision becomes fatal.
pub const MAX_TOKEN_ATTEMPTS: u32 = 3;

/// Produces a fresh share token.
pub type TokenSource = fn() -> Result<String, CoreError>;

#[derive(Clone)]
pub struct SharedLinkManager {
    store: Arc<MetadataStore>,
    projects: ProjectManager,
    token_source: TokenSource,
}

impl SharedLinkManager {
    pub fn new(store: Arc<MetadataStore>, projects: ProjectManager) -> Self {
        Self {
            store,
            projects,
            token_source: generate_share_token,
        }
    }

    /// Replace the token generator.
    #[must_use]
    pub fn with_token_source(mut self, token_source: TokenSource) -> Self {
        self.token_source = token_source;
        self
    }

    /// Issue a link for a project.
    ///
    /// An expiry in the past is accepted; such a link resolves as expired
    /// and is removed by the next sweep.
    pub async fn issue(
        &self,
        project_id: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<SharedLink, LifecycleError> {
        self.store.get_project(project_id).await?;

        let mut attempt = 1;
        loop {
            let token = (self.token_source)()?;
            match self.store.insert_shared_link(project_id, &token, expires_at).await {
                Ok(link) => {
                    tracing::info!(project_id, link_id = link.id, expires_at = ?link.expires_at, "shared link issued");
                    return Ok(link);
                }
                Err(e) if e.is_constraint() && attempt < MAX_TOKEN_ATTEMPTS => {
                    tracing::warn!(project_id, attempt, "share token collision; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Resolve a token to the shared project as of now.
    pub async fn resolve(&self, token: &str) -> Result<SharedProject, LifecycleError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolve a token as of `now`. Never mutates anything.
    pub async fn resolve_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SharedProject, LifecycleError> {
        let link = self.store.get_shared_link(token).await?;
        if let Some(expired_at) = link.expires_at.filter(|_| !link.is_live_at(now)) {
            return Err(LifecycleError::Expired {
                token: link.token,
                expired_at,
            });
        }
        let project = self.projects.get(link.project_id).await?;
        Ok(SharedProject {
            project,
            shared_link: link,
            is_shared: true,
        })
    }

    /// Links of a project, newest first.
    pub async fn list(&self, project_id: i64) -> Result<Vec<SharedLink>, LifecycleError> {
        self.store.get_project(project_id).await?;
        Ok(self.store.list_shared_links(project_id).await?)
    }

    pub async fn revoke(&self, token: &str) -> Result<SharedLink, LifecycleError> {
        let link = self.store.delete_shared_link(token).await?;
        tracing::info!(project_id = link.project_id, link_id = link.id, "shared link revoked");
        Ok(link)
    }

    /// Delete every link that expired before now. Returns how many went.
    pub async fn sweep_expired(&self) -> Result<u64, LifecycleError> {
        self.sweep_expired_at(Utc::now()).await
    }

    /// Delete every link whose expiry is strictly before `now`.
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<u64, LifecycleError> {
        let removed = self.store.delete_expired_links(now).await?;
        if removed > 0 {
            tracing::info!(removed, "expired shared links swept");
        }
        Ok(removed)
    }
}
