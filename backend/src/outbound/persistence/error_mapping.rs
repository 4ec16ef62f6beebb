//! Shared Diesel error mapping for the persistence adapters.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Whether the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}

/// Extract the conflicting value from a PostgreSQL unique-violation detail
/// such as `Key (code)=(FF-A1B2C3) already exists.`.
pub(crate) fn unique_violation_value(error: &diesel::result::Error) -> Option<String> {
    let diesel::result::Error::DatabaseError(_, info) = error else {
        return None;
    };
    let detail = info.details()?;
    let (_, rest) = detail.split_once(")=(")?;
    let (value, _) = rest.split_once(')')?;
    Some(value.to_owned())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the unique-violation helpers.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    fn unique_violation(detail: Option<&str>) -> DieselError {
        #[derive(Debug)]
        struct Info {
            message: String,
            details: Option<String>,
        }

        impl diesel::result::DatabaseErrorInformation for Info {
            fn message(&self) -> &str {
                &self.message
            }
            fn details(&self) -> Option<&str> {
                self.details.as_deref()
            }
            fn hint(&self) -> Option<&str> {
                None
            }
            fn table_name(&self) -> Option<&str> {
                None
            }
            fn column_name(&self) -> Option<&str> {
                None
            }
            fn constraint_name(&self) -> Option<&str> {
                None
            }
            fn statement_position(&self) -> Option<i32> {
                None
            }
        }

        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info {
                message: "duplicate key value violates unique constraint".to_owned(),
                details: detail.map(str::to_owned),
            }),
        )
    }

    #[test]
    fn unique_violations_are_detected() {
        assert!(is_unique_violation(&unique_violation(None)));
        assert!(!is_unique_violation(&DieselError::NotFound));
    }

    #[test]
    fn conflicting_value_is_extracted_from_the_detail() {
        let error = unique_violation(Some("Key (code)=(FF-A1B2C3) already exists."));
        assert_eq!(
            unique_violation_value(&error).as_deref(),
            Some("FF-A1B2C3")
        );
    }

    #[test]
    fn missing_detail_yields_none() {
        assert_eq!(unique_violation_value(&unique_violation(None)), None);
        assert_eq!(unique_violation_value(&DieselError::NotFound), None);
    }
}
