pub(crate) mod newick;
pub(crate) mod rst;

use crate::TreeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeParseError {
    #[error("NEWICK string is empty.")]
    Empty,
    #[error("Unexpected token '{token}' at byte {position}.")]
    UnexpectedToken { token: String, position: usize },
    #[error("NEWICK string ended before the tree was complete.")]
    UnexpectedEnd,
    #[error("Quoted label opened at byte {position} is never closed.")]
    UnterminatedQuote { position: usize },
    #[error(transparent)]
    TreeError(#[from] TreeError),
}
