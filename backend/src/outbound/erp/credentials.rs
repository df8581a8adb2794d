//! ERP login credentials read from the environment.
//!
//! The four values are opaque header credentials for the login endpoint.
//! They are wiped on drop and never printed.

use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

const TOKEN_ENV: &str = "SANKHYA_TOKEN";
const APPKEY_ENV: &str = "SANKHYA_APPKEY";
const USERNAME_ENV: &str = "SANKHYA_USERNAME";
const PASSWORD_ENV: &str = "SANKHYA_PASSWORD";

/// Build mode for credential validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds warn about missing credentials and continue.
    Debug,
    /// Release builds require every credential.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crm_bff::outbound::erp::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while reading ERP credentials.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
}

/// Header credentials sent to the ERP login endpoint.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ErpCredentials {
    token: String,
    appkey: String,
    username: String,
    password: String,
}

impl ErpCredentials {
    /// Build credentials from explicit values.
    pub fn new(
        token: impl Into<String>,
        appkey: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            appkey: appkey.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read `SANKHYA_TOKEN`, `SANKHYA_APPKEY`, `SANKHYA_USERNAME`, and
    /// `SANKHYA_PASSWORD`.
    ///
    /// # Errors
    /// In release builds, returns [`CredentialsError::MissingEnv`] for the
    /// first unset or blank variable. Debug builds warn and use empty values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use crm_bff::outbound::erp::{BuildMode, ErpCredentials};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| Some(format!("{name}-value")));
    ///
    /// let credentials = ErpCredentials::from_env(&env, BuildMode::Release)
    ///     .expect("all variables set");
    /// assert_eq!(credentials.headers()[0], ("token", "SANKHYA_TOKEN-value"));
    /// ```
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, CredentialsError> {
        Ok(Self {
            token: required(env, TOKEN_ENV, mode)?,
            appkey: required(env, APPKEY_ENV, mode)?,
            username: required(env, USERNAME_ENV, mode)?,
            password: required(env, PASSWORD_ENV, mode)?,
        })
    }

    /// Header name/value pairs in the order the login endpoint expects.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, &str); 4] {
        [
            ("token", self.token.as_str()),
            ("appkey", self.appkey.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ]
    }
}

fn required<E: Env>(env: &E, name: &'static str, mode: BuildMode) -> Result<String, CredentialsError> {
    match env.string(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => Ok(value),
        None if mode.is_debug() => {
            warn!(name, "ERP credential not set; using empty value (dev only)");
            Ok(String::new())
        }
        None => Err(CredentialsError::MissingEnv { name }),
    }
}

impl std::fmt::Debug for ErpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Drop for ErpCredentials {
    fn drop(&mut self) {
        self.token.zeroize();
        self.appkey.zeroize();
        self.username.zeroize();
        self.password.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;

    fn env_with(values: &'static [(&'static str, &'static str)]) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |name| {
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned())
        });
        env
    }

    #[rstest]
    fn release_requires_every_variable() {
        let env = env_with(&[
            ("SANKHYA_TOKEN", "t"),
            ("SANKHYA_APPKEY", "a"),
            ("SANKHYA_USERNAME", "u"),
        ]);
        let error = ErpCredentials::from_env(&env, BuildMode::Release).expect_err("missing");
        assert_eq!(
            error,
            CredentialsError::MissingEnv {
                name: "SANKHYA_PASSWORD"
            }
        );
    }

    #[rstest]
    fn release_treats_blank_as_missing() {
        let env = env_with(&[("SANKHYA_TOKEN", "  ")]);
        let error = ErpCredentials::from_env(&env, BuildMode::Release).expect_err("blank");
        assert_eq!(error, CredentialsError::MissingEnv { name: "SANKHYA_TOKEN" });
    }

    #[rstest]
    fn debug_falls_back_to_empty_values() {
        let env = env_with(&[("SANKHYA_USERNAME", "ops")]);
        let credentials = ErpCredentials::from_env(&env, BuildMode::Debug).expect("debug");
        assert_eq!(
            credentials.headers(),
            [("token", ""), ("appkey", ""), ("username", "ops"), ("password", "")]
        );
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let credentials = ErpCredentials::new("tok-secret", "app-secret", "ops", "pw-secret");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("ops"));
        assert!(!rendered.contains("secret"), "secret leaked: {rendered}");
    }
}
