use connectors::error::QueryError;
use engine_core::retry::RetryDisposition;

pub fn classify_query_error(err: &QueryError) -> RetryDisposition {
    match err {
        QueryError::Unavailable(_) => RetryDisposition::Retry,
        QueryError::UnknownTable(_) => RetryDisposition::Stop,
        QueryError::UnknownField { .. } => RetryDisposition::Stop,
        QueryError::File(_) => RetryDisposition::Stop,
    }
}
