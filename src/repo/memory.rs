use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::PullRequestRepository;
use crate::domain::pull_request::{
    Comment, PullRequestDetail, PullRequestSummary, Review, ReviewActivity, ReviewRequestEvent,
};
use crate::error::{ReminderError, Result};

/// Canned pull requests for driver tests. Posted comments are recorded
/// instead of sent anywhere.
#[derive(Default)]
pub struct InMemoryPullRequestRepo {
    pulls: Vec<PullRequestSummary>,
    activity: HashMap<u64, ReviewActivity>,
    detail_reviewers: HashMap<u64, Vec<String>>,
    fail_comments_for: Option<u64>,
    posted: Mutex<Vec<(u64, String)>>,
    detail_lookups: Mutex<Vec<u64>>,
}

impl InMemoryPullRequestRepo {
    pub fn with_pull(mut self, pr: PullRequestSummary, activity: ReviewActivity) -> Self {
        self.activity.insert(pr.number, activity);
        self.pulls.push(pr);
        self
    }

    /// Reviewers reported by the detail call, when they differ from the list.
    pub fn with_detail_reviewers(mut self, number: u64, reviewers: &[&str]) -> Self {
        self.detail_reviewers
            .insert(number, reviewers.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Make the comment fetch for `number` fail like a dropped connection.
    pub fn failing_comments_for(mut self, number: u64) -> Self {
        self.fail_comments_for = Some(number);
        self
    }

    pub fn posted(&self) -> Vec<(u64, String)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn detail_lookups(&self) -> Vec<u64> {
        self.detail_lookups.lock().unwrap().clone()
    }

    fn activity(&self, number: u64) -> Result<&ReviewActivity> {
        self.activity
            .get(&number)
            .ok_or_else(|| ReminderError::transport(format!("pull request #{number}"), "not found"))
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryPullRequestRepo {
    async fn open_pull_requests(&self) -> Result<Vec<PullRequestSummary>> {
        Ok(self.pulls.clone())
    }

    async fn review_requests(&self, number: u64) -> Result<Vec<ReviewRequestEvent>> {
        Ok(self.activity(number)?.review_requests.clone())
    }

    async fn reviews(&self, number: u64) -> Result<Vec<Review>> {
        Ok(self.activity(number)?.reviews.clone())
    }

    async fn comments(&self, number: u64) -> Result<Vec<Comment>> {
        if self.fail_comments_for == Some(number) {
            return Err(ReminderError::transport(
                format!("fetching comments of #{number}"),
                "connection reset by peer",
            ));
        }
        Ok(self.activity(number)?.comments.clone())
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequestDetail> {
        self.detail_lookups.lock().unwrap().push(number);
        let requested_reviewers = match self.detail_reviewers.get(&number) {
            Some(reviewers) => reviewers.clone(),
            None => self
                .pulls
                .iter()
                .find(|p| p.number == number)
                .map(|p| p.requested_reviewers.clone())
                .ok_or_else(|| {
                    ReminderError::transport(format!("pull request #{number}"), "not found")
                })?,
        };
        Ok(PullRequestDetail {
            number,
            requested_reviewers,
        })
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<()> {
        self.posted.lock().unwrap().push((number, body.to_string()));
        Ok(())
    }
}
