use skiff_config::ENV_PREFIX;

const SECTIONS: [&str; 2] = ["API", "AUTH"];

/// Emit warnings for env var keys that look like config but never reach figment.
pub fn warn_unconfigured() {
    for warning in collect_unconfigured_warnings(std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

/// `SKIFF_API_BASE_URL` silently does nothing; `SKIFF_API__BASE_URL` is meant.
fn collect_unconfigured_warnings<I>(env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut warnings = Vec::new();

    for (key, _) in env {
        let Some(rest) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        for section in SECTIONS {
            if let Some(field) = rest.strip_prefix(section)
                && let Some(field) = field.strip_prefix('_')
                && !field.is_empty()
                && !field.starts_with('_')
            {
                warnings.push(format!(
                    "{key} is ignored. Use double underscores (example: {ENV_PREFIX}{section}__{field})."
                ));
            }
        }
    }

    warnings
}
