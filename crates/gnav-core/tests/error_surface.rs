use gnav_core::errors::{ErrorInfo, GenError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("phase", "learn_rewards")
        .with_context("subject", 3)
}

#[test]
fn template_error_surface() {
    let err = GenError::Template(sample_info("start-children", "start has one child"));
    assert_eq!(err.info().code, "start-children");
    assert_eq!(err.info().context.get("subject"), Some(&"3".to_string()));
}

#[test]
fn context_is_appended_to_existing_payload() {
    let err = GenError::Rewards(sample_info("reward-count", "too few rewards"))
        .with_context("required", 6);
    assert!(matches!(&err, GenError::Rewards(_)));
    assert_eq!(err.info().context.get("required"), Some(&"6".to_string()));
    assert_eq!(err.info().context.len(), 3);
}

#[test]
fn display_includes_code_context_and_hint() {
    let err = GenError::Config(
        ErrorInfo::new("node-count", "node count is zero").with_hint("set node_count"),
    );
    let text = err.to_string();
    assert!(text.starts_with("config error: node count is zero (code: node-count)"));
    assert!(text.contains("hint: set node_count"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = GenError::Serde(ErrorInfo::new("subject-write", "disk full"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Serde");
    assert_eq!(json["detail"]["code"], "subject-write");
    let back: GenError = serde_json::from_value(json).unwrap();
    assert_eq!(back, err);
}
