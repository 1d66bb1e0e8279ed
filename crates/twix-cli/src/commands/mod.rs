pub mod anonymize;
pub mod inspect;

use anyhow::Result;
use twix_config::Config;
use twix_security::{Catalog, Redactor};

/// Redactor over the built-in catalog plus the configured extra fields.
pub fn redactor(config: &Config) -> Result<Redactor> {
    let catalog = Catalog::with_extra(&config.redaction.extra_fields)?;
    Ok(Redactor::new(catalog))
}
