pub mod env;
pub mod level;
pub mod record;
pub mod serializers;

pub mod stream;
pub mod capture;
pub mod metadata;

pub mod init;
pub mod logger;

pub use init::{build_logger, create_logger, LoggerConfig};
pub use level::Level;
pub use logger::Logger;
pub use serializers::Fields;
