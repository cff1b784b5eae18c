use serde::{Deserialize, Serialize};

use super::timeutil::parse_github_datetime;
use crate::domain::pull_request::{Comment, Review, ReviewRequestEvent, ReviewState};
use crate::error::{ReminderError, Result};

#[derive(Debug, Serialize)]
pub struct GraphQlPayload<V> {
    pub query: &'static str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
pub struct ConnectionVars<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub number: i64,
    pub page_size: i32,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryData<N> {
    pub repository: Option<RepositoryNode<N>>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryNode<N> {
    #[serde(rename = "pullRequest")]
    pub pull_request: Option<PullRequestNode<N>>,
}

/// Every per-PR query aliases the connection it pages through to
/// `connection`, so one shape covers timeline, reviews and comments.
#[derive(Debug, Deserialize)]
pub struct PullRequestNode<N> {
    pub connection: Connection<N>,
}

#[derive(Debug, Deserialize)]
pub struct Connection<N> {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    pub nodes: Option<Vec<Option<N>>>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

impl<N> GraphQlResponse<RepositoryData<N>> {
    /// Unwrap `data.repository.pullRequest.connection`, turning GraphQL
    /// errors into transport failures and missing objects into data errors.
    pub fn into_connection(self, number: u64) -> Result<Connection<N>> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ReminderError::transport(
                format!("GitHub GraphQL query for #{number} returned errors"),
                messages,
            ));
        }
        self.data
            .and_then(|d| d.repository)
            .ok_or_else(|| {
                ReminderError::DataIntegrity("repository missing from response".into())
            })?
            .pull_request
            .map(|pr| pr.connection)
            .ok_or_else(|| {
                ReminderError::DataIntegrity(format!("pull request #{number} missing from response"))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct TimelineNode {
    #[serde(rename = "__typename")]
    pub typename: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewNode {
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentNode {
    pub body: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
}

fn required<'a>(value: Option<&'a str>, what: &str, number: u64) -> Result<&'a str> {
    value.ok_or_else(|| ReminderError::DataIntegrity(format!("{what} on #{number} has no value")))
}

impl TimelineNode {
    /// `None` for node types other than review requests.
    pub fn into_event(self, number: u64) -> Result<Option<ReviewRequestEvent>> {
        if self
            .typename
            .as_deref()
            .is_some_and(|t| t != "ReviewRequestedEvent")
        {
            return Ok(None);
        }
        let raw = required(self.created_at.as_deref(), "review request createdAt", number)?;
        Ok(Some(ReviewRequestEvent {
            created_at: parse_github_datetime(raw)?,
        }))
    }
}

impl ReviewNode {
    pub fn into_review(self, number: u64) -> Result<Review> {
        let raw_state = required(self.state.as_deref(), "review state", number)?;
        let state = ReviewState::from_graphql(raw_state).ok_or_else(|| {
            ReminderError::DataIntegrity(format!("review on #{number} has state {raw_state}"))
        })?;
        let raw = required(self.created_at.as_deref(), "review createdAt", number)?;
        Ok(Review {
            created_at: parse_github_datetime(raw)?,
            state,
        })
    }
}

impl CommentNode {
    pub fn into_comment(self, number: u64) -> Result<Comment> {
        let raw = required(self.created_at.as_deref(), "comment createdAt", number)?;
        let created_at = parse_github_datetime(raw)?;
        Ok(Comment {
            body: self.body.unwrap_or_default(),
            created_at,
        })
    }
}
