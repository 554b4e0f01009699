use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors surfaced by the pgfit database layer
#[derive(Debug, Error)]
pub enum Error {
    /// A generator found an empty identifier pool before its first iteration
    #[error("not enough seeded data: the {pool} pool is empty (run `pgfit seed` first)")]
    InsufficientData { pool: &'static str },

    /// The statistics catalog could not be read or reset
    #[error("index statistics catalog unavailable")]
    CatalogUnavailable {
        #[source]
        source: sqlx::Error,
    },

    /// Any other database error
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether a generator loop may swallow this error and keep going
    ///
    /// Pool ids go stale on purpose: churned rows vanish while their ids
    /// stay in the pools. Those misses surface as RowNotFound or as
    /// constraint violations and are part of the workload. Everything
    /// else (connection loss, bad SQL) stops the run.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Db(sqlx::Error::RowNotFound) => true,
            Error::Db(e) => e
                .as_database_error()
                .map(|dbe| {
                    matches!(
                        dbe.kind(),
                        ErrorKind::UniqueViolation
                            | ErrorKind::ForeignKeyViolation
                            | ErrorKind::NotNullViolation
                            | ErrorKind::CheckViolation
                    )
                })
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_transient() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(err.is_transient());
    }

    #[test]
    fn test_insufficient_data_is_fatal() {
        let err = Error::InsufficientData { pool: "product sku" };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("product sku"));
    }

    #[test]
    fn test_catalog_unavailable_is_fatal() {
        let err = Error::CatalogUnavailable {
            source: sqlx::Error::PoolClosed,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_connection_errors_are_fatal() {
        let err = Error::from(sqlx::Error::PoolTimedOut);
        assert!(!err.is_transient());
    }
}
