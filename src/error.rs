use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while handling a command. These never reach the runtime, they are rendered into a reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("invalid value for {field}: {reason}")]
    Validation { field: &'static str, reason: &'static str },
    #[error("missing required argument: {0}")]
    InvalidArgument(&'static str),
    #[error("{0} may only be used by the bot owner")]
    Permission(&'static str),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl CommandError {
    pub(crate) fn user_message(&self, prefix: &str) -> String {
        match self {
            CommandError::Validation { field, reason } => format!("**The {field} {reason}.**"),
            CommandError::InvalidArgument(field) => {
                format!(
                    "**Please pass in all requirements to use the command (missing `{field}`). Try using** \
                     `{prefix}help`**!**"
                )
            }
            CommandError::Permission(_) => {
                "**You don't have all the requirements or permissions for using this command.**".to_string()
            }
            CommandError::UnknownCommand(_) => {
                format!("**Invalid command. Try using** `{prefix}help` **to figure out commands!**")
            }
        }
    }
}

/// A relay submission that did not make it to the storage endpoint.
#[derive(Debug, Error)]
pub(crate) enum DeliveryError {
    #[error("storage endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("storage endpoint returned {0}")]
    Status(StatusCode),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
