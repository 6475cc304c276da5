pub mod archive;
pub mod db;
pub mod fixtures;
pub mod temp;

pub use archive::ArchiveBuilder;
pub use db::TestDb;
pub use temp::TempDir;
