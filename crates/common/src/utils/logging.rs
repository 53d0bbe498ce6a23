use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Used when `RUST_LOG` is unset.
/// - `server`: handler outcomes (`create_request_ok`, `user_logged_out`, ...)
/// - `service::records` / `service::auth`: record and account events at info
/// - `service::storage` / `service::session`: per-write and per-session detail at debug, hidden by default
/// - `tower_http`: one span per request from the trace layer
pub const DEFAULT_DIRECTIVES: &str = "info,service::storage=info,service::session=info,tower_http=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber writing to stdout.
///
/// `format` comes from `[log] format` in the config: `json` gives one JSON
/// object per event with targets, anything else the compact human format.
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(format: &str) {
    let builder = fmt().with_env_filter(env_filter()).with_writer(io::stdout);
    // 重复初始化（例如测试中）直接忽略
    let _ = if format.eq_ignore_ascii_case("json") {
        builder.json().with_target(true).try_init()
    } else {
        builder.compact().with_target(false).try_init()
    };
}
