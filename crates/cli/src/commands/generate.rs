use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use tracing::warn;

use parley_core::config::AppConfig;
use parley_core::{
    evaluate, Evaluation, GenerateRequest, Irdi, Message, MessageGenerator, MessageType, ValueSet,
};

use super::CommandResult;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[arg(long, help = "Message kind tag, e.g. callForProposal or proposal")]
    pub message_type: String,
    #[arg(long, help = "Sender identity id")]
    pub user_id: String,
    #[arg(long, help = "Catalog identifier (required to open a conversation or override a price)")]
    pub irdi: Option<String>,
    #[arg(long, help = "JSON object mapping semantic ids to proposed values")]
    pub values: Option<String>,
    #[arg(long, help = "Reply window in minutes; falls back to the configured default")]
    pub reply_minutes: Option<i64>,
    #[arg(long, help = "Path to the prior message JSON to continue the conversation from")]
    pub original: Option<PathBuf>,
    #[arg(long, help = "Price override for a proposal continuation")]
    pub price: Option<Decimal>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, help = "RFC 3339 timestamp; only applied together with --end-timestamp")]
    pub start_timestamp: Option<DateTime<Utc>>,
    #[arg(long, help = "RFC 3339 timestamp; only applied together with --start-timestamp")]
    pub end_timestamp: Option<DateTime<Utc>>,
    #[arg(long, help = "RFC 3339 timestamp")]
    pub creation_date: Option<DateTime<Utc>>,
    #[arg(long)]
    pub user_name: Option<String>,
}

pub fn run(generator: &MessageGenerator, config: &AppConfig, args: GenerateArgs) -> CommandResult {
    let Some(kind) = MessageType::from_tag(&args.message_type) else {
        return CommandResult::failure(
            "generate",
            "unrecognized_message_type",
            format!("`{}` is not one of the six message kinds", args.message_type),
            2,
        );
    };

    let values: ValueSet = match &args.values {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(values) => values,
            Err(error) => {
                return CommandResult::failure(
                    "generate",
                    "invalid_values_json",
                    error.to_string(),
                    2,
                )
            }
        },
        None => ValueSet::new(),
    };

    let original = match &args.original {
        Some(path) => match read_original(path) {
            Ok(message) => Some(message),
            Err(error) => {
                return CommandResult::failure(
                    "generate",
                    "invalid_original_message",
                    format!("{error:#}"),
                    2,
                )
            }
        },
        None => None,
    };

    let mut request = GenerateRequest::new(kind, args.user_id);
    request.irdi = args.irdi.map(Irdi);
    request.submodel_values = values;
    request.reply_offset_minutes =
        args.reply_minutes.or(Some(config.negotiation.default_reply_minutes));
    request.original_message = original;
    request.price = args.price;
    request.location = args.location;
    request.start_timestamp = args.start_timestamp;
    request.end_timestamp = args.end_timestamp;
    request.creation_date = args.creation_date;
    request.user_name = args.user_name;

    // The generator deliberately opens a conversation without payload when
    // the value set fails evaluation; surface the discarded reason here.
    if kind == MessageType::CallForProposal {
        if let Some(irdi) = &request.irdi {
            if let Ok(Evaluation::Invalid(failure)) =
                evaluate(generator.catalog(), irdi, &request.submodel_values)
            {
                warn!(
                    event_name = "cli.generate.values_rejected",
                    irdi = %irdi,
                    reason = %failure,
                    "value set rejected; message will carry no payload elements"
                );
            }
        }
    }

    match generator.generate(request) {
        Ok(Some(message)) => CommandResult::payload(&message),
        Ok(None) => CommandResult::failure(
            "generate",
            "unrecognized_message_type",
            "no skeleton is registered for the requested message kind",
            2,
        ),
        Err(error) => CommandResult::failure("generate", "domain", error.to_string(), 1),
    }
}

fn read_original(path: &Path) -> anyhow::Result<Message> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read prior message `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse prior message `{}`", path.display()))
}
