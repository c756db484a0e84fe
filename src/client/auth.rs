//! Keystone v3 password credentials
//!
//! Token issue, caching and renewal happen inside the SDK session. This
//! module only turns config values into the SDK's password plugin.

use openstack::auth::Password;
use openstack::IdOrName;
use tracing::warn;

use super::ClientError;

/// User domain assumed when the config names none
pub const DEFAULT_DOMAIN: &str = "Default";

/// Credentials and scope used to obtain a token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthOptions {
    pub identity_endpoint: String,
    pub username: String,
    pub user_id: String,
    pub password: String,
    pub api_key: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub domain_id: String,
    pub domain_name: String,
}

// ============================================================================
// SBIO: Pure functions (no I/O)
// ============================================================================

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Project to scope the token to: tenant id wins over tenant name, and the
/// project domain is taken from the domain id or name when one is set.
pub fn project_scope(options: &AuthOptions) -> Option<(IdOrName, Option<IdOrName>)> {
    let project = non_empty(&options.tenant_id)
        .map(IdOrName::from_id)
        .or_else(|| non_empty(&options.tenant_name).map(IdOrName::from_name))?;

    let domain = non_empty(&options.domain_id)
        .map(IdOrName::from_id)
        .or_else(|| non_empty(&options.domain_name).map(IdOrName::from_name));

    Some((project, domain))
}

impl AuthOptions {
    /// Domain of the user. Only a domain name can be sent with a user name.
    pub fn user_domain(&self) -> &str {
        non_empty(&self.domain_name).unwrap_or(DEFAULT_DOMAIN)
    }

    /// Build the SDK password plugin for these credentials.
    pub fn password_auth(&self) -> Result<Password, ClientError> {
        if self.username.is_empty() {
            return Err(ClientError::InvalidAuth(
                "a username is required for password authentication".to_string(),
            ));
        }
        if !self.user_id.is_empty() {
            warn!(user_id = %self.user_id, "Ignoring user-id, authenticating by username");
        }
        if !self.api_key.is_empty() {
            warn!("Ignoring api-key, only password authentication is supported");
        }

        let password = Password::new(
            &self.identity_endpoint,
            self.username.clone(),
            self.password.clone(),
            self.user_domain(),
        )
        .map_err(|e| ClientError::InvalidAuth(e.to_string()))?;

        Ok(match project_scope(self) {
            Some((project, domain)) => password.with_project_scope(project, domain),
            None => password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> AuthOptions {
        AuthOptions {
            identity_endpoint: "http://keystone:5000/v3".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_scope_prefers_ids() {
        let opts = AuthOptions {
            tenant_id: "t-1".to_string(),
            tenant_name: "demo".to_string(),
            domain_id: "d-1".to_string(),
            domain_name: "Users".to_string(),
            ..options()
        };
        assert_eq!(
            project_scope(&opts),
            Some((IdOrName::from_id("t-1"), Some(IdOrName::from_id("d-1"))))
        );
    }

    #[test]
    fn test_project_scope_by_name() {
        let opts = AuthOptions {
            tenant_name: "demo".to_string(),
            domain_name: "Users".to_string(),
            ..options()
        };
        assert_eq!(
            project_scope(&opts),
            Some((IdOrName::from_name("demo"), Some(IdOrName::from_name("Users"))))
        );

        let opts = AuthOptions {
            tenant_name: "demo".to_string(),
            ..options()
        };
        assert_eq!(project_scope(&opts), Some((IdOrName::from_name("demo"), None)));
    }

    #[test]
    fn test_project_scope_unscoped() {
        let opts = AuthOptions {
            domain_name: "Users".to_string(),
            ..options()
        };
        assert_eq!(project_scope(&opts), None);
    }

    #[test]
    fn test_user_domain_default() {
        assert_eq!(options().user_domain(), "Default");

        let opts = AuthOptions {
            domain_name: "Users".to_string(),
            ..options()
        };
        assert_eq!(opts.user_domain(), "Users");
    }

    #[test]
    fn test_password_auth() {
        let opts = AuthOptions {
            tenant_name: "demo".to_string(),
            ..options()
        };
        let password = opts.password_auth().unwrap();
        assert_eq!(password.user(), &IdOrName::from_name("admin"));
        assert_eq!(password.project(), Some(&IdOrName::from_name("demo")));
    }

    #[test]
    fn test_password_auth_requires_username() {
        let opts = AuthOptions {
            username: String::new(),
            user_id: "u-1".to_string(),
            ..options()
        };
        assert!(matches!(opts.password_auth(), Err(ClientError::InvalidAuth(_))));
    }

    #[test]
    fn test_password_auth_invalid_url() {
        let opts = AuthOptions {
            identity_endpoint: "not a url".to_string(),
            ..options()
        };
        assert!(matches!(opts.password_auth(), Err(ClientError::InvalidAuth(_))));
    }
}
