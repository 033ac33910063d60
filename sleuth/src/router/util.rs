use sleuth_core::SleuthError;

/// Short, provider-free explanation of one failed attempt.
///
/// The router prefixes it with the provider name, so variants that already
/// embed the provider are reworded here.
pub fn failure_reason(e: &SleuthError) -> String {
    match e {
        SleuthError::Provider {
            message,
            status_code: Some(code),
            ..
        } => format!("HTTP {code}: {message}"),
        SleuthError::Provider { message, .. } => message.clone(),
        SleuthError::ProviderTimeout { .. } => "timed out".to_string(),
        SleuthError::RequestTimeout { .. } => "request deadline exceeded".to_string(),
        SleuthError::RateLimitExceeded { waited_ms, .. } => {
            format!("rate limit exceeded (waited {waited_ms}ms for a token)")
        }
        other => other.to_string(),
    }
}

/// Join per-provider reasons into the caller-visible summary.
pub fn summarize(reasons: &[String]) -> String {
    reasons.join(" | ")
}
