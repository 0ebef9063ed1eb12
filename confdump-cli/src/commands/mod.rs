pub mod dump;
pub mod init;
pub mod inspect;

pub use dump::run_dump;
pub use init::run_init;
pub use inspect::run_inspect;
