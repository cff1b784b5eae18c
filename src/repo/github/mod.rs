pub mod auth;
pub mod model;
mod timeutil;

use async_trait::async_trait;
use log::debug;
use model::{
    CommentNode, Connection, ConnectionVars, GraphQlPayload, GraphQlResponse, RepositoryData,
    ReviewNode, TimelineNode,
};
use octocrab::{Octocrab, params};
use serde::de::DeserializeOwned;

use super::PullRequestRepository;
use crate::config::RepoSlug;
use crate::domain::pull_request::{
    Comment, PullRequestDetail, PullRequestSummary, Review, ReviewRequestEvent,
};
use crate::error::{ReminderError, Result};

/// REST page size for listing open pull requests (GitHub maximum).
const PULLS_PER_PAGE: u8 = 100;
/// GraphQL page sizes; connections are followed until `hasNextPage` is false.
const TIMELINE_PAGE_SIZE: i32 = 50;
const REVIEWS_PAGE_SIZE: i32 = 50;
const COMMENTS_PAGE_SIZE: i32 = 100;

const TIMELINE_QUERY: &str = r#"
query ($owner: String!, $name: String!, $number: Int!, $page_size: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      connection: timelineItems(first: $page_size, after: $cursor, itemTypes: [REVIEW_REQUESTED_EVENT]) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          __typename
          ... on ReviewRequestedEvent {
            createdAt
          }
        }
      }
    }
  }
}
"#;

const REVIEWS_QUERY: &str = r#"
query ($owner: String!, $name: String!, $number: Int!, $page_size: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      connection: reviews(first: $page_size, after: $cursor, states: [APPROVED, CHANGES_REQUESTED, COMMENTED]) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          createdAt
          state
        }
      }
    }
  }
}
"#;

const COMMENTS_QUERY: &str = r#"
query ($owner: String!, $name: String!, $number: Int!, $page_size: Int!, $cursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $number) {
      connection: comments(first: $page_size, after: $cursor) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          body
          createdAt
        }
      }
    }
  }
}
"#;

/// Pull requests of one GitHub repository, via octocrab.
pub struct GithubPullRequestRepo {
    octo: Octocrab,
    repo: RepoSlug,
}

impl GithubPullRequestRepo {
    /// Build the client. Must be called from within a Tokio runtime.
    pub fn connect(token: String, api_base: Option<&str>, repo: RepoSlug) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(api) = api_base {
            builder = builder.base_uri(api).map_err(|e| {
                ReminderError::Configuration(format!("invalid GitHub API URL {api:?}: {e}"))
            })?;
        }
        let octo = builder
            .build()
            .map_err(|e| ReminderError::transport("failed to init GitHub client", e))?;
        Ok(Self { octo, repo })
    }

    /// Page through one per-PR GraphQL connection.
    async fn fetch_connection<N: DeserializeOwned>(
        &self,
        query: &'static str,
        what: &str,
        number: u64,
        page_size: i32,
    ) -> Result<Vec<N>> {
        collect_pages(move |cursor| async move {
            let payload = GraphQlPayload {
                query,
                variables: ConnectionVars {
                    owner: &self.repo.owner,
                    name: &self.repo.name,
                    number: number as i64,
                    page_size,
                    cursor,
                },
            };
            let resp: GraphQlResponse<RepositoryData<N>> =
                self.octo.graphql(&payload).await.map_err(|e| {
                    ReminderError::transport(
                        format!("GitHub GraphQL {what} query for #{number} failed"),
                        e,
                    )
                })?;
            let connection = resp.into_connection(number)?;
            debug!(
                "#{number}: fetched {} {what} node(s)",
                connection.nodes.as_ref().map_or(0, Vec::len)
            );
            Ok(connection)
        })
        .await
    }
}

/// Request pages until `hasNextPage` is false or no cursor comes back,
/// passing each page's `endCursor` to the next request. Nodes keep page order.
async fn collect_pages<N, F, Fut>(mut fetch_page: F) -> Result<Vec<N>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Connection<N>>>,
{
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let connection = fetch_page(cursor.take()).await?;
        out.extend(connection.nodes.unwrap_or_default().into_iter().flatten());

        if !connection.page_info.has_next_page {
            break;
        }
        cursor = connection.page_info.end_cursor;
        if cursor.is_none() {
            break;
        }
    }
    Ok(out)
}

fn logins(authors: Option<Vec<octocrab::models::Author>>) -> Vec<String> {
    authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.login)
        .collect()
}

#[async_trait]
impl PullRequestRepository for GithubPullRequestRepo {
    async fn open_pull_requests(&self) -> Result<Vec<PullRequestSummary>> {
        let context = || format!("listing open pull requests of {}", self.repo);
        let first = self
            .octo
            .pulls(&self.repo.owner, &self.repo.name)
            .list()
            .state(params::State::Open)
            .per_page(PULLS_PER_PAGE)
            .send()
            .await
            .map_err(|e| ReminderError::transport(context(), e))?;
        let pulls = self
            .octo
            .all_pages(first)
            .await
            .map_err(|e| ReminderError::transport(context(), e))?;
        debug!("{}: {} open pull request(s)", self.repo, pulls.len());

        Ok(pulls
            .into_iter()
            .map(|pr| PullRequestSummary {
                number: pr.number,
                title: pr.title.unwrap_or_default(),
                id: pr.id.0,
                requested_reviewers: logins(pr.requested_reviewers),
            })
            .collect())
    }

    async fn review_requests(&self, number: u64) -> Result<Vec<ReviewRequestEvent>> {
        let nodes: Vec<TimelineNode> = self
            .fetch_connection(TIMELINE_QUERY, "review request", number, TIMELINE_PAGE_SIZE)
            .await?;
        let mut events = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(event) = node.into_event(number)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn reviews(&self, number: u64) -> Result<Vec<Review>> {
        let nodes: Vec<ReviewNode> = self
            .fetch_connection(REVIEWS_QUERY, "review", number, REVIEWS_PAGE_SIZE)
            .await?;
        nodes.into_iter().map(|n| n.into_review(number)).collect()
    }

    async fn comments(&self, number: u64) -> Result<Vec<Comment>> {
        let nodes: Vec<CommentNode> = self
            .fetch_connection(COMMENTS_QUERY, "comment", number, COMMENTS_PAGE_SIZE)
            .await?;
        nodes.into_iter().map(|n| n.into_comment(number)).collect()
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequestDetail> {
        let pr = self
            .octo
            .pulls(&self.repo.owner, &self.repo.name)
            .get(number)
            .await
            .map_err(|e| ReminderError::transport(format!("fetching pull request #{number}"), e))?;
        Ok(PullRequestDetail {
            number: pr.number,
            requested_reviewers: logins(pr.requested_reviewers),
        })
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<()> {
        self.octo
            .issues(&self.repo.owner, &self.repo.name)
            .create_comment(number, body)
            .await
            .map_err(|e| ReminderError::transport(format!("commenting on #{number}"), e))?;
        Ok(())
    }
}
