pub mod appointment;
pub mod feedback;
pub mod free_schedule;
pub mod session;

use tutorsync_core::errors::TutorError;

/// sqlx errors surface as the infrastructure tail of the taxonomy.
pub(crate) fn db_err(err: sqlx::Error) -> TutorError {
    TutorError::Database(err.into())
}
