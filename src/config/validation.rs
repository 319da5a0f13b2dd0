use crate::config::types::{Config, JobSpec, ServiceConfig};
use crate::url::is_valid_url;
use crate::{ConfigError, ConfigResult};

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_service_config(&config.service)?;
    for job in &config.jobs {
        validate_job_spec(job)?;
    }
    Ok(())
}

/// Validates service-wide configuration
fn validate_service_config(config: &ServiceConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a job submission before it is admitted to the engine
///
/// `name`, `allowed-domains`, and `seed-urls` must be non-empty, and every
/// seed URL must pass syntax validation. This is the only place a malformed
/// request surfaces to the operator; a running job absorbs failures into
/// the dead-link records instead.
pub fn validate_job_spec(job: &JobSpec) -> ConfigResult<()> {
    if job.name.is_empty() {
        return Err(ConfigError::Validation(
            "job name cannot be empty".to_string(),
        ));
    }

    if job.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(format!(
            "job '{}' must have at least one allowed domain",
            job.name
        )));
    }

    if job.seed_urls.is_empty() {
        return Err(ConfigError::Validation(format!(
            "job '{}' must have at least one seed URL",
            job.name
        )));
    }

    for seed in &job.seed_urls {
        if !is_valid_url(seed) {
            return Err(ConfigError::InvalidSeedUrl {
                url: seed.clone(),
                reason: "not a valid absolute http(s) URL".to_string(),
            });
        }
    }

    Ok(())
}
