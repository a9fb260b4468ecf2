pub mod buffer;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generate;
pub mod grouped;
pub mod index;
pub mod naming;
pub mod scale;
pub mod unclaimed;

pub use buffer::{FileBuffer, MemoryBuffer, TextBuffer};
pub use config::GeneratorConfig;
pub use error::{GenerateError, GenerateWarning};
pub use generate::{Generation, generate, generate_into};
pub use index::ControlIndex;
pub use unclaimed::UnclaimedNames;
