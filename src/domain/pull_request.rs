use time::OffsetDateTime;

/// An open pull request as returned by the listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub id: u64,
    /// Logins of the currently requested reviewers, in API order.
    pub requested_reviewers: Vec<String>,
}

/// Full detail of a single pull request; only the reviewer set matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetail {
    pub number: u64,
    pub requested_reviewers: Vec<String>,
}

/// A `REVIEW_REQUESTED_EVENT` on the pull request timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRequestEvent {
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
}

impl ReviewState {
    pub fn from_graphql(raw: &str) -> Option<Self> {
        match raw {
            "APPROVED" => Some(Self::Approved),
            "CHANGES_REQUESTED" => Some(Self::ChangesRequested),
            "COMMENTED" => Some(Self::Commented),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Review {
    pub created_at: OffsetDateTime,
    pub state: ReviewState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub body: String,
    pub created_at: OffsetDateTime,
}

/// Everything fetched for one pull request before deciding on a reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewActivity {
    /// Review-request events, chronological.
    pub review_requests: Vec<ReviewRequestEvent>,
    pub reviews: Vec<Review>,
    /// Issue comments, oldest first.
    pub comments: Vec<Comment>,
}
