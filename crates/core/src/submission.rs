//! # Team Submission
//!
//! Hands a finished, padded team to the backend.

use async_trait::async_trait;

use crate::config::DraftConfig;
use crate::error::{DraftError, Result};
use crate::team::PaddedTeam;

/// Receiver of finished teams
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit(&self, team: &PaddedTeam) -> Result<()>;
}

/// Posts teams as JSON to `{backend}/teams/new`
pub struct HttpSubmission {
    client: reqwest::Client,
    url: String,
}

impl HttpSubmission {
    pub fn new(config: &DraftConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("pokedraft/0.1")
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DraftError::submission(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: config.submission_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SubmissionService for HttpSubmission {
    #[tracing::instrument(skip(self, team), fields(url = %self.url, members = team.members()))]
    async fn submit(&self, team: &PaddedTeam) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(team)
            .send()
            .await
            .map_err(|e| DraftError::submission(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DraftError::submission(format!(
                "POST {} returned {}",
                self.url, status
            )));
        }
        Ok(())
    }
}
