//! Environment-driven construction.
//!
//! Kept in its own test binary with a single test: the process environment
//! is shared by every thread of a test binary.

use std::env;
use workflow_logger::{AxiomConfig, AxiomLogger, BuildError, ConfigError};

#[test]
fn test_construction_from_environment() {
    env::remove_var("AXIOM_TOKEN");
    env::remove_var("AXIOM_DATASET");
    env::remove_var("AXIOM_URL");

    let err = AxiomLogger::new("svc", None).unwrap_err();
    #[cfg(feature = "axiom")]
    assert!(matches!(
        err,
        BuildError::Config(ConfigError::MissingToken("AXIOM_TOKEN"))
    ));
    #[cfg(not(feature = "axiom"))]
    assert!(matches!(err, BuildError::NoOutput));
    assert_eq!(
        AxiomConfig::from_env().unwrap_err(),
        ConfigError::MissingToken("AXIOM_TOKEN")
    );

    env::set_var("AXIOM_TOKEN", "xaat-integration");
    let config = AxiomConfig::from_env().unwrap();
    assert_eq!(config.dataset, "local");

    env::set_var("AXIOM_DATASET", "workflows");
    let config = AxiomConfig::from_env().unwrap();
    assert_eq!(config.dataset, "workflows");

    #[cfg(feature = "axiom")]
    {
        let logger = AxiomLogger::new("svc", Some(vec!["id".into(), "email".into()])).unwrap();
        assert_eq!(logger.service_name(), "svc");
        assert_eq!(logger.allowlist().len(), 2);

        // An empty list falls back to the default allowlist
        let logger = AxiomLogger::new("svc", Some(Vec::new())).unwrap();
        assert_eq!(logger.allowlist().len(), 1);
        assert!(logger.allowlist().allows("id", "id"));

        env::set_var("AXIOM_DATASET", "workflows/../admin");
        assert!(matches!(
            AxiomLogger::new("svc", None).unwrap_err(),
            BuildError::Config(ConfigError::InvalidValue { name: "AXIOM_DATASET", .. })
        ));
    }

    env::remove_var("AXIOM_TOKEN");
    env::remove_var("AXIOM_DATASET");
}
