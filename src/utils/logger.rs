use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "simple_cards=info";
const VERBOSE_FILTER: &str = "simple_cards=debug,info";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 解析最終使用的過濾字串：verbose 優先，其次是設定檔
fn resolve_filter(verbose: bool, configured: Option<&str>) -> String {
    if verbose {
        return VERBOSE_FILTER.to_string();
    }

    configured
        .filter(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

pub fn init_cli_logger(verbose: bool, configured: Option<&str>) {
    let filter = env_filter(&resolve_filter(verbose, configured));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool, configured: Option<&str>) {
    let filter = env_filter(&resolve_filter(verbose, configured));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // 結構化輸出，方便集中收集
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filter() {
        assert_eq!(resolve_filter(true, Some("warn")), VERBOSE_FILTER);
        assert_eq!(resolve_filter(false, Some("warn")), "warn");
        assert_eq!(resolve_filter(false, Some("  ")), DEFAULT_FILTER);
        assert_eq!(resolve_filter(false, None), DEFAULT_FILTER);
    }
}
