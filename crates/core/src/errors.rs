use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Appointment full: {0}")]
    Full(String),

    #[error("Already booked: {0}")]
    AlreadyBooked(String),

    #[error("Not booked: {0}")]
    NotBooked(String),

    #[error("Feedback already submitted: {0}")]
    AlreadySubmitted(String),

    #[error("Schedule overlap: {0}")]
    Overlap(String),

    /// Step 2 of the two-step reschedule lost its race. The old booking in
    /// `vacated` is already gone; callers must send the user back to slot
    /// selection instead of pretending nothing happened.
    #[error("Reschedule failed after leaving appointment {vacated}: {source}")]
    RescheduleBookFailed {
        vacated: Uuid,
        #[source]
        source: Box<TutorError>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TutorError {
    /// Machine-readable code carried in HTTP error bodies so clients can
    /// decide retry vs. abandon without parsing messages.
    pub fn code(&self) -> &'static str {
        match self {
            TutorError::NotFound(_) => "NOT_FOUND",
            TutorError::Full(_) => "FULL",
            TutorError::AlreadyBooked(_) => "ALREADY_BOOKED",
            TutorError::NotBooked(_) => "NOT_BOOKED",
            TutorError::AlreadySubmitted(_) => "ALREADY_SUBMITTED",
            TutorError::Overlap(_) => "OVERLAP",
            TutorError::RescheduleBookFailed { .. } => "RESCHEDULE_BOOK_FAILED",
            TutorError::Validation(_) => "VALIDATION",
            TutorError::Authentication(_) => "UNAUTHORIZED",
            TutorError::Authorization(_) => "FORBIDDEN",
            TutorError::Database(_) => "DATABASE",
            TutorError::Internal(_) => "INTERNAL",
        }
    }
}

pub type TutorResult<T> = Result<T, TutorError>;
