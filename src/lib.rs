pub mod config;
pub mod error;
pub mod link;
pub mod locate;
pub mod open;
pub mod presets;
pub mod repo;
pub mod scheme;
pub mod shell;

pub use config::Config;
pub use error::OpenError;
pub use open::Location;
pub use repo::RepoIndex;
