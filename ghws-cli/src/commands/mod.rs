//! CLI command implementations

mod context;
pub mod repo;
pub mod secrets;
pub mod status;
pub mod sync;
pub mod upload;

pub use context::Context;
pub use repo::RepoArgs;
pub use secrets::SecretsArgs;
pub use status::StatusArgs;
pub use sync::{CloneArgs, PullArgs, PushArgs};
pub use upload::UploadArgs;
