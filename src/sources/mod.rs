//! Configuration sources: environment variables, config files, dotenv.

pub mod dotenv_source;
pub mod env_source;
pub mod file_source;

pub use dotenv_source::load_dotenv;
pub use env_source::Env;
pub use file_source::load_file;
