use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Claim store failed: {0}")]
    Store(#[from] crate::db::DatabaseError),

    #[error("Classification task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(e: tokio::task::JoinError) -> Self {
        if e.is_panic() {
            PipelineError::TaskFailed(format!("task panicked: {}", panic_message(e.into_panic())))
        } else {
            PipelineError::TaskFailed(e.to_string())
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
