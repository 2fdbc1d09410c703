use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("Receiver hung up before taking the value")]
    Disconnected,

    #[error("Consumer thread panicked")]
    ConsumerPanicked,

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
