use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SketchError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SketchError::encode("x").to_string().contains("encode error:"));
    assert!(SketchError::config("x").to_string().contains("config error:"));
    assert!(
        SketchError::CredentialMissing
            .to_string()
            .contains("missing credential")
    );
}

#[test]
fn rejections_are_classified() {
    assert!(SketchError::Busy.is_rejection());
    assert!(SketchError::CredentialMissing.is_rejection());
    assert!(!SketchError::validation("x").is_rejection());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SketchError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
