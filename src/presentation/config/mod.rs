mod environment;
mod error_messages;
mod settings;

pub use environment::Environment;
pub use error_messages::ErrorMessages;
pub use settings::{
    ChatSettings, DatabaseSettings, InferenceSettings, LoggingSettings, ServerSettings, Settings,
};
