use crate::CliError;
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity count. Without `-v` the environment
/// filter wins when present.
#[must_use]
pub fn directive(verbosity: u8, env: Option<&str>) -> String {
    match (verbosity, env) {
        (0, Some(env)) if !env.trim().is_empty() => env.to_string(),
        (0, _) => "info".to_string(),
        (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the fmt subscriber on stderr.
pub fn init(verbosity: u8) -> Result<(), CliError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(directive(verbosity, env.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| CliError::Logging)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(directive(0, None), "info");
        assert_eq!(directive(0, Some("rpcforge=warn")), "rpcforge=warn");
        assert_eq!(directive(0, Some("  ")), "info");
        assert_eq!(directive(1, Some("warn")), "debug");
        assert_eq!(directive(3, None), "trace");
    }
}
