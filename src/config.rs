// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{DEFAULT_FIELD_MANAGER, DEFAULT_NAMESPACE};
use anyhow::{Context, Result};
use std::env;

/// Provider configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Field manager recorded for server-side apply
    pub field_manager: String,
    /// Take ownership of fields managed by someone else on apply
    pub force_conflicts: bool,
    /// Namespace for manifests that don't set one
    pub default_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let field_manager =
            env::var("FIELD_MANAGER").unwrap_or_else(|_| DEFAULT_FIELD_MANAGER.to_string());
        let force_conflicts = match env::var("FORCE_CONFLICTS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("FORCE_CONFLICTS must be true or false, got '{}'", value))?,
            Err(_) => false,
        };
        let default_namespace =
            env::var("DEFAULT_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

        Ok(Config {
            field_manager,
            force_conflicts,
            default_namespace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 3] = ["FIELD_MANAGER", "FORCE_CONFLICTS", "DEFAULT_NAMESPACE"];

    /// Sets provider variables for one test and restores the previous values on drop
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn set(values: &[(&'static str, &str)]) -> Self {
            let saved = VARS.iter().map(|name| (*name, env::var(name).ok())).collect();
            for name in VARS {
                env::remove_var(name);
            }
            for (name, value) in values {
                env::set_var(name, value);
            }
            EnvGuard { saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(value) => env::set_var(name, value),
                    None => env::remove_var(name),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        let _guard = EnvGuard::set(&[]);

        let config = Config::from_env().unwrap();

        assert_eq!(config.field_manager, DEFAULT_FIELD_MANAGER);
        assert!(!config.force_conflicts);
        assert_eq!(config.default_namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        let _guard = EnvGuard::set(&[
            ("FIELD_MANAGER", "chaos-team"),
            ("FORCE_CONFLICTS", "true"),
            ("DEFAULT_NAMESPACE", "chaos-testing"),
        ]);

        let config = Config::from_env().unwrap();

        assert_eq!(config.field_manager, "chaos-team");
        assert!(config.force_conflicts);
        assert_eq!(config.default_namespace, "chaos-testing");
    }

    #[test]
    #[serial]
    fn test_force_conflicts_false() {
        let _guard = EnvGuard::set(&[("FORCE_CONFLICTS", "false")]);

        assert!(!Config::from_env().unwrap().force_conflicts);
    }

    #[test]
    #[serial]
    fn test_force_conflicts_rejects_non_boolean() {
        let _guard = EnvGuard::set(&[("FORCE_CONFLICTS", "yes")]);

        let error = Config::from_env().unwrap_err();

        assert!(error.to_string().contains("FORCE_CONFLICTS must be true or false, got 'yes'"));
    }
}
