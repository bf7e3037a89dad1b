//! CLI command implementations

pub mod create;
pub mod discover;
pub mod import;
pub mod init;
pub mod list;
pub mod quality;
pub mod rate;
pub mod update;
pub mod validate;

pub use create::CreateCommand;
pub use discover::{RecommendCommand, Showcase, ShowcaseCommand};
pub use import::ImportCommand;
pub use init::{InitCommand, InitSelection};
pub use list::{CategoriesCommand, ListCommand, SearchCommand};
pub use quality::QualityCommand;
pub use rate::RateCommand;
pub use update::UpdateCommand;
pub use validate::{ValidateAllCommand, ValidateCommand};
