use tracing::Level;

/// Installs the JSON formatter used by every function in the project.
/// CloudWatch stamps each line itself, so timestamps are left out.
pub fn init(level: Level) {
    tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_line_number(true)
        .init();
}

/// Reads `LOG_LEVEL`, falling back to `INFO` when it is unset or unparsable.
pub fn level_from_env() -> Level {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(Level::INFO)
}

fn parse_level(value: &str) -> Option<Level> {
    value.trim().parse::<Level>().ok()
}
