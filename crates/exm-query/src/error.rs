use thiserror::Error;

use crate::key::QueryKey;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("cannot encode query key part: {0}")]
    Key(String),

    #[error("cannot cache result for {key}: {message}")]
    Encode { key: QueryKey, message: String },

    #[error("cached data for {key} does not match the requested type: {message}")]
    Decode { key: QueryKey, message: String },

    #[error("query {0} was cancelled")]
    Cancelled(QueryKey),
}
