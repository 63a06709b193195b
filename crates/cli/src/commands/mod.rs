pub mod config;
pub mod evaluate;
pub mod generate;
pub mod operations;
pub mod schema;

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandFailure {
    command: String,
    status: String,
    error_class: String,
    message: String,
}

impl CommandResult {
    /// Pretty-printed JSON payload with exit code zero.
    pub fn payload<T: Serialize>(payload: &T) -> Self {
        Self::payload_with_code(payload, 0)
    }

    pub fn payload_with_code<T: Serialize>(payload: &T, exit_code: u8) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code, output },
            Err(error) => Self::failure("output", "serialization", error.to_string(), 3),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandFailure {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: error_class.to_string(),
            message: message.into(),
        };
        let output = serde_json::to_string(&payload).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
            )
        });
        Self { exit_code, output }
    }
}
