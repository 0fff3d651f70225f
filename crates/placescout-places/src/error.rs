use thiserror::Error;

/// Errors returned by the nearby-places provider client.
///
/// None of these are retryable at this layer: a transport or provider fault
/// at one radius recurs at a wider one.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned an error payload (`error_message` or a
    /// non-OK status field).
    #[error("places API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
