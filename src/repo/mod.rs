use async_trait::async_trait;

use crate::domain::pull_request::{
    Comment, PullRequestDetail, PullRequestSummary, Review, ReviewRequestEvent,
};
use crate::error::Result;

pub mod github;
#[cfg(test)]
pub mod memory;

/// Read/write access to the pull requests of a single repository.
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Every open pull request, across all pages.
    async fn open_pull_requests(&self) -> Result<Vec<PullRequestSummary>>;

    /// `REVIEW_REQUESTED_EVENT`s of one pull request, chronological.
    async fn review_requests(&self, number: u64) -> Result<Vec<ReviewRequestEvent>>;

    /// Submitted reviews (approved, changes requested, commented).
    async fn reviews(&self, number: u64) -> Result<Vec<Review>>;

    /// Issue comments, oldest first.
    async fn comments(&self, number: u64) -> Result<Vec<Comment>>;

    async fn pull_request(&self, number: u64) -> Result<PullRequestDetail>;

    async fn post_comment(&self, number: u64, body: &str) -> Result<()>;
}
