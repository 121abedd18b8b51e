pub mod commit;
pub mod transport;

pub use commit::{CommitOrchestrator, CommitRequest, CommitResult};
pub use transport::{GitTransport, GithubError, HttpTransport};
