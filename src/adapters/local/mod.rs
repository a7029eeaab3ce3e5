//! Local adapters for single-server deployment.

pub mod fs;
pub mod http;
pub mod janitor;
pub mod process;

pub use fs::FsAdapter;
pub use janitor::Janitor;
pub use process::ProcessRunner;
