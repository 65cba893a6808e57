use thiserror::Error;

pub type Result<T> = std::result::Result<T, RcError>;

#[derive(Debug, Error)]
pub enum RcError {
	/// Server-reported failure for a remotely executed command.
	#[error("remote error: {0}")]
	Remote(String),

	#[error("timeout after {ms}ms waiting for: {condition}")]
	Timeout { ms: u64, condition: String },

	#[error(transparent)]
	Runtime(#[from] rcdash_runtime::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}
