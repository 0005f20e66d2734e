use a2p_types::{Did, ReceiptId};

#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Nothing granted to {0}; no receipt issued")]
    NothingGranted(Did),

    #[error("Receipt already revoked: {0}")]
    AlreadyRevoked(ReceiptId),

    #[error("Receipt not found: {0}")]
    ReceiptNotFound(ReceiptId),

    #[error("Receipt already recorded: {0}")]
    DuplicateReceipt(ReceiptId),
}

pub type ConsentResult<T> = Result<T, ConsentError>;
