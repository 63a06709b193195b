use parley_core::config::{AppConfig, LogFormat};

use super::CommandResult;

pub fn run(config: &AppConfig) -> CommandResult {
    let templates_dir = config
        .data
        .templates_dir
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "<embedded>".to_string());
    let format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };

    let lines = [
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        format!("  data.catalog_path = {}", config.data.catalog_path.display()),
        format!("  data.operations_path = {}", config.data.operations_path.display()),
        format!("  data.templates_dir = {templates_dir}"),
        format!(
            "  negotiation.default_reply_minutes = {}",
            config.negotiation.default_reply_minutes
        ),
        format!("  logging.level = {}", config.logging.level),
        format!("  logging.format = {format}"),
    ];

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

#[cfg(test)]
mod tests {
    use parley_core::config::AppConfig;

    #[test]
    fn renders_every_effective_value() {
        let result = super::run(&AppConfig::default());
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("data.catalog_path = catalog/eclass.json"));
        assert!(result.output.contains("negotiation.default_reply_minutes = 10"));
        assert!(result.output.contains("data.templates_dir = <embedded>"));
    }
}
