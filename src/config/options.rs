//! Typed provider options read from the `[Global]`, `[LoadBalancer]` and
//! `[Route]` sections.

use std::time::Duration;

use tracing::debug;

use super::gcfg::{Document, Variable};
use super::ConfigError;
use crate::client::AuthOptions;

/// Credentials and scope for the identity service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOpts {
    pub auth_url: String,
    pub username: String,
    pub user_id: String,
    pub password: String,
    pub api_key: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub domain_id: String,
    pub domain_name: String,
    pub region: String,
}

/// Options for load balancers created on behalf of the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadBalancerOpts {
    pub subnet_id: String,
    pub floating_network_id: String,
    pub lb_method: String,
    pub create_monitor: bool,
    pub monitor_delay: Duration,
    pub monitor_timeout: Duration,
    pub monitor_max_retries: u32,
}

/// Options for programming routes on a Neutron router
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOpts {
    pub router_id: String,
    pub hostname_override: bool,
}

/// Complete provider configuration. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub global: GlobalOpts,
    pub load_balancer: LoadBalancerOpts,
    pub route: RouteOpts,
}

pub const SECTION_GLOBAL: &str = "global";
pub const SECTION_LOAD_BALANCER: &str = "loadbalancer";
pub const SECTION_ROUTE: &str = "route";

const KNOWN_SECTIONS: [&str; 3] = [SECTION_GLOBAL, SECTION_LOAD_BALANCER, SECTION_ROUTE];

impl Config {
    /// Build a config from a parsed document. Unknown sections and keys are
    /// skipped; a later assignment of a key overrides an earlier one.
    pub fn from_document(doc: &Document) -> Result<Self, ConfigError> {
        let mut cfg = Config::default();

        for var in doc.variables(SECTION_GLOBAL) {
            cfg.global.apply(var)?;
        }
        for var in doc.variables(SECTION_LOAD_BALANCER) {
            cfg.load_balancer.apply(var)?;
        }
        for var in doc.variables(SECTION_ROUTE) {
            cfg.route.apply(var)?;
        }

        for section in &doc.sections {
            if section.subsection.is_some() || !KNOWN_SECTIONS.contains(&section.name.as_str()) {
                debug!(
                    section = %section.name,
                    subsection = ?section.subsection,
                    "Ignoring config section"
                );
            }
        }

        Ok(cfg)
    }

    /// Identity options for this config.
    pub fn to_auth_options(&self) -> AuthOptions {
        AuthOptions {
            identity_endpoint: self.global.auth_url.clone(),
            username: self.global.username.clone(),
            user_id: self.global.user_id.clone(),
            password: self.global.password.clone(),
            api_key: self.global.api_key.clone(),
            tenant_id: self.global.tenant_id.clone(),
            tenant_name: self.global.tenant_name.clone(),
            domain_id: self.global.domain_id.clone(),
            domain_name: self.global.domain_name.clone(),
        }
    }
}

impl GlobalOpts {
    fn apply(&mut self, var: &Variable) -> Result<(), ConfigError> {
        let target = match var.name.as_str() {
            "auth-url" => &mut self.auth_url,
            "username" => &mut self.username,
            "user-id" => &mut self.user_id,
            "password" => &mut self.password,
            "api-key" => &mut self.api_key,
            "tenant-id" => &mut self.tenant_id,
            "tenant-name" => &mut self.tenant_name,
            "domain-id" => &mut self.domain_id,
            "domain-name" => &mut self.domain_name,
            "region" => &mut self.region,
            _ => {
                debug!(section = SECTION_GLOBAL, key = %var.name, "Ignoring unknown config key");
                return Ok(());
            }
        };
        *target = parse_string(SECTION_GLOBAL, var)?;
        Ok(())
    }
}

impl LoadBalancerOpts {
    fn apply(&mut self, var: &Variable) -> Result<(), ConfigError> {
        const S: &str = SECTION_LOAD_BALANCER;
        match var.name.as_str() {
            "subnet-id" => self.subnet_id = parse_string(S, var)?,
            "floating-network-id" => self.floating_network_id = parse_string(S, var)?,
            "lb-method" => self.lb_method = parse_string(S, var)?,
            "create-monitor" => self.create_monitor = parse_bool(S, var)?,
            "monitor-delay" => self.monitor_delay = parse_duration(S, var)?,
            "monitor-timeout" => self.monitor_timeout = parse_duration(S, var)?,
            "monitor-max-retries" => self.monitor_max_retries = parse_u32(S, var)?,
            _ => debug!(section = S, key = %var.name, "Ignoring unknown config key"),
        }
        Ok(())
    }
}

impl RouteOpts {
    fn apply(&mut self, var: &Variable) -> Result<(), ConfigError> {
        const S: &str = SECTION_ROUTE;
        match var.name.as_str() {
            "router-id" => self.router_id = parse_string(S, var)?,
            "hostname-override" => self.hostname_override = parse_bool(S, var)?,
            _ => debug!(section = S, key = %var.name, "Ignoring unknown config key"),
        }
        Ok(())
    }
}

// ============================================================================
// SBIO: Pure value parsers
// ============================================================================

fn invalid(section: &str, var: &Variable, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: var.name.clone(),
        value: var.value.clone().unwrap_or_default(),
        reason: reason.into(),
    }
}

fn parse_string(section: &str, var: &Variable) -> Result<String, ConfigError> {
    var.value
        .clone()
        .ok_or_else(|| invalid(section, var, "missing value"))
}

/// A bare variable name counts as true.
fn parse_bool(section: &str, var: &Variable) -> Result<bool, ConfigError> {
    let Some(value) = var.value.as_deref() else {
        return Ok(true);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, var, "expected a boolean")),
    }
}

fn parse_u32(section: &str, var: &Variable) -> Result<u32, ConfigError> {
    let value = parse_string(section, var)?;
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(section, var, e.to_string()))
}

fn parse_duration(section: &str, var: &Variable) -> Result<Duration, ConfigError> {
    let value = parse_string(section, var)?;
    humantime::parse_duration(value.trim()).map_err(|e| invalid(section, var, e.to_string()))
}
