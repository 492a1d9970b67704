use crate::utils::error::{EtlError, Result};
use std::fmt;

pub const CLOUD_NAME_VAR: &str = "CLOUD_NAME";
pub const API_KEY_VAR: &str = "CLOUD_API_KEY";
pub const API_SECRET_VAR: &str = "CLOUD_API_SECRET";

/// Media host account. Loaded once before any row is read.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as missing. The error lists every missing variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let cloud_name = read(CLOUD_NAME_VAR);
        let api_key = read(API_KEY_VAR);
        let api_secret = read(API_SECRET_VAR);

        if !missing.is_empty() {
            return Err(EtlError::MissingCredentials { missing });
        }

        Ok(Self {
            cloud_name,
            api_key,
            api_secret,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| env.get(name).cloned()
    }

    #[test]
    fn test_all_present() {
        let creds = Credentials::from_lookup(lookup(&[
            ("CLOUD_NAME", "demo"),
            ("CLOUD_API_KEY", "123"),
            ("CLOUD_API_SECRET", "s3cr3t"),
        ]))
        .unwrap();
        assert_eq!(creds, Credentials::new("demo", "123", "s3cr3t"));
        assert!(!format!("{:?}", creds).contains("s3cr3t"));
    }

    #[test]
    fn test_all_missing_are_named() {
        let err = Credentials::from_lookup(lookup(&[])).unwrap_err();
        match err {
            EtlError::MissingCredentials { missing } => {
                assert_eq!(missing, vec![CLOUD_NAME_VAR, API_KEY_VAR, API_SECRET_VAR])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = Credentials::from_lookup(lookup(&[
            ("CLOUD_NAME", "demo"),
            ("CLOUD_API_KEY", "   "),
            ("CLOUD_API_SECRET", "x"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: CLOUD_API_KEY"
        );
    }
}
