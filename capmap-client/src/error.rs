use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed GraphQL response: {0}")]
    MalformedResponse(String),

    /// The endpoint answered with a GraphQL `errors` member, kept verbatim.
    #[error("GraphQL query failed: {0}")]
    Query(serde_json::Value),

    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("Capability name '{name}' is shared by {first_id} and {second_id}")]
    NameCollision {
        name: String,
        first_id: String,
        second_id: String,
    },
}

impl ClientError {
    /// True for failures of the HTTP exchange itself rather than of the query.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_) | ClientError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
