// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for solver configuration decoding.

#[cfg(test)]
mod tests {
    use crate::errors::SolverError;
    use crate::solver_config::{ProviderConfig, SecretKeySelector};
    use serde_json::json;

    #[test]
    fn test_missing_payload_is_default() {
        let config = ProviderConfig::from_json(None).unwrap();

        assert_eq!(config, ProviderConfig::default());
        assert!(config.inline_api_key().is_none());
        assert!(!config.api_key_ref.is_complete());
    }

    #[test]
    fn test_null_payload_is_default() {
        let config = ProviderConfig::from_json(Some(&serde_json::Value::Null)).unwrap();

        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_full_payload() {
        let raw = json!({
            "provider": "ovh",
            "apiKeyRef": { "name": "ovh-credentials", "key": "application-key" },
            "apiSecretRef": { "name": "ovh-credentials", "key": "application-secret" },
            "ttl": 600,
            "sandbox": true,
            "usePassword": true
        });

        let config = ProviderConfig::from_json(Some(&raw)).unwrap();

        assert_eq!(config.provider, "ovh");
        assert_eq!(
            config.api_key_ref,
            SecretKeySelector {
                name: "ovh-credentials".to_string(),
                key: "application-key".to_string(),
            }
        );
        assert_eq!(config.api_secret_ref.key, "application-secret");
        assert_eq!(config.ttl, Some(600));
        assert!(config.sandbox);
        assert!(config.use_password);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_inline_credentials() {
        let raw = json!({
            "provider": "route53",
            "apiKey": "AKIAEXAMPLE",
            "apiSecret": "secret",
            "ttl": 120
        });

        let config = ProviderConfig::from_json(Some(&raw)).unwrap();

        assert_eq!(config.inline_api_key(), Some("AKIAEXAMPLE"));
        assert_eq!(config.inline_api_secret(), Some("secret"));
    }

    #[test]
    fn test_empty_inline_credentials_are_ignored() {
        let raw = json!({ "provider": "route53", "apiKey": "", "apiSecret": "" });

        let config = ProviderConfig::from_json(Some(&raw)).unwrap();

        assert!(config.inline_api_key().is_none());
        assert!(config.inline_api_secret().is_none());
    }

    #[test]
    fn test_invalid_payload_is_configuration_error() {
        let raw = json!({ "provider": "route53", "ttl": "two minutes" });

        let result = ProviderConfig::from_json(Some(&raw));

        match result {
            Err(SolverError::Configuration(message)) => {
                assert!(message.contains("error decoding solver config"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_payload_is_configuration_error() {
        let result = ProviderConfig::from_json(Some(&json!(["route53"])));

        assert!(matches!(result, Err(SolverError::Configuration(_))));
    }

    #[test]
    fn test_positional_array_payload_is_rejected() {
        let raw = json!([
            "route53",
            { "name": "creds", "key": "key" },
            { "name": "creds", "key": "secret" },
            120,
            false,
            true,
            "AKIAEXAMPLE",
            "secret"
        ]);

        match ProviderConfig::from_json(Some(&raw)) {
            Err(SolverError::Configuration(message)) => {
                assert!(message.contains("expected a JSON object"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_payload_is_rejected() {
        let result = ProviderConfig::from_json(Some(&json!("route53")));

        assert!(matches!(result, Err(SolverError::Configuration(_))));
    }

    #[test]
    fn test_selector_completeness() {
        let partial = SecretKeySelector {
            name: "creds".to_string(),
            key: String::new(),
        };
        let complete = SecretKeySelector {
            name: "creds".to_string(),
            key: "token".to_string(),
        };

        assert!(!partial.is_complete());
        assert!(complete.is_complete());
    }
}
