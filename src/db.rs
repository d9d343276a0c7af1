//! Constraint-violation checks for errors bubbled up from the repositories.

use sqlx::error::{DatabaseError, ErrorKind};

/// Kind of the database error behind `e`, if it is one.
pub fn error_kind(e: &anyhow::Error) -> Option<ErrorKind> {
    e.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .map(|d| d.kind())
}

pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(error_kind(e), Some(ErrorKind::UniqueViolation))
}

pub fn is_foreign_key_violation(e: &anyhow::Error) -> bool {
    matches!(error_kind(e), Some(ErrorKind::ForeignKeyViolation))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    pub(crate) struct FakeDbError(pub ErrorKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "constraint violated: {:?}", self.0)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub(crate) fn db_error(kind: ErrorKind) -> anyhow::Error {
        anyhow::Error::from(sqlx::Error::Database(Box::new(FakeDbError(kind))))
    }

    #[test]
    fn classifies_constraint_violations() {
        assert!(is_unique_violation(&db_error(ErrorKind::UniqueViolation)));
        assert!(!is_foreign_key_violation(&db_error(ErrorKind::UniqueViolation)));
        assert!(is_foreign_key_violation(&db_error(ErrorKind::ForeignKeyViolation)));
        assert!(!is_unique_violation(&db_error(ErrorKind::ForeignKeyViolation)));
    }

    #[test]
    fn other_errors_are_not_violations() {
        assert!(error_kind(&anyhow::anyhow!("boom")).is_none());
        assert!(error_kind(&anyhow::Error::from(sqlx::Error::RowNotFound)).is_none());
        assert!(!is_unique_violation(&db_error(ErrorKind::Other)));
    }
}
