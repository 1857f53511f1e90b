use tether_util::errors::{TetherError, TetherResult};

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "universe missing");
    let err = TetherError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_config_error_display() {
    let err = TetherError::Config {
        message: "bad key".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: bad key");
}

#[test]
fn test_universe_error_display() {
    let err = TetherError::Universe {
        message: "duplicate module id".to_string(),
    };
    assert_eq!(err.to_string(), "Universe error: duplicate module id");
}

#[test]
fn test_resolution_error_display() {
    let err = TetherError::Resolution {
        message: "no candidates".to_string(),
    };
    assert_eq!(err.to_string(), "Resolution failed: no candidates");
}

#[test]
fn test_generic_error_display() {
    let err = TetherError::Generic {
        message: "something broke".to_string(),
    };
    assert_eq!(err.to_string(), "something broke");
}

#[test]
fn test_errors_convert_into_reports() {
    let err = TetherError::Config {
        message: "unreadable".to_string(),
    };
    let report: miette::Report = err.into();
    assert!(report.to_string().contains("unreadable"));
}

fn read_universe(path: &str) -> TetherResult<String> {
    let content = std::fs::read_to_string(path).map_err(TetherError::from)?;
    Ok(content)
}

#[test]
fn test_result_alias_propagates_with_question_mark() {
    let err = read_universe("/nonexistent/tether/universe.toml").unwrap_err();
    assert!(err.to_string().starts_with("I/O error:"), "got: {err}");
}
