//! Consent gating for attribution tracking

use crate::config::AttributionConfig;

/// Decide whether attribution tracking is allowed for a request.
///
/// `actual_value` is the consent cookie value read from the request, `None`
/// when the cookie is absent. Empty configured name/value count as absent.
pub fn decide(
    requires_consent: bool,
    consent_cookie_name: Option<&str>,
    actual_value: Option<&str>,
    expected_value: Option<&str>,
) -> bool {
    if !requires_consent {
        return true;
    }

    if consent_cookie_name.is_none_or(str::is_empty) {
        return false;
    }

    let Some(actual) = actual_value else {
        return false;
    };

    match expected_value {
        None | Some("") => true,
        Some(expected) => actual == expected,
    }
}

/// Consent settings resolved from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentPolicy {
    pub required: bool,
    pub cookie_name: Option<String>,
    pub expected_value: Option<String>,
}

impl ConsentPolicy {
    pub fn from_config(config: &AttributionConfig) -> Self {
        Self {
            required: config.consent_required,
            cookie_name: config.consent_cookie_name.clone(),
            expected_value: config.consent_cookie_value.clone(),
        }
    }

    /// Look the configured consent cookie up through `lookup` and decide.
    pub fn allows<F>(&self, lookup: F) -> bool
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let actual = match self.cookie_name.as_deref() {
            Some(name) if self.required && !name.is_empty() => lookup(name),
            _ => None,
        };

        decide(
            self.required,
            self.cookie_name.as_deref(),
            actual.as_deref(),
            self.expected_value.as_deref(),
        )
    }
}
