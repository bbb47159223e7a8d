use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{LookupKind, SupplierType};
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "supplier_form.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub tax_id_lookup_path: Option<String>,
    pub zip_code_lookup_path: Option<String>,
    pub request_timeout_seconds: u64,
    pub masks_enabled: bool,
    pub supplier_type: SupplierType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            tax_id_lookup_path: Some("/suppliers/lookup/tax-id/".into()),
            zip_code_lookup_path: Some("/suppliers/lookup/zip-code/".into()),
            request_timeout_seconds: 10,
            masks_enabled: true,
            supplier_type: SupplierType::Corporate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    tax_id_lookup_path: Option<String>,
    zip_code_lookup_path: Option<String>,
    request_timeout_seconds: Option<u64>,
    masks_enabled: Option<bool>,
    supplier_type: Option<String>,
}

impl Settings {
    /// Per-request timeout for the HTTP transport. Zero disables it.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Endpoint for `kind` resolved against `base_url`. `None` leaves the
    /// lookup button without a URL, so searching reports it as unconfigured.
    pub fn lookup_endpoint(&self, kind: LookupKind) -> Option<String> {
        let path = match kind {
            LookupKind::TaxId => self.tax_id_lookup_path.as_deref(),
            LookupKind::ZipCode => self.zip_code_lookup_path.as_deref(),
        }?
        .trim();
        if path.is_empty() {
            return None;
        }

        match Url::parse(&self.base_url).and_then(|base| base.join(path)) {
            Ok(url) => Some(url.to_string()),
            Err(err) => {
                warn!(
                    kind = kind.name(),
                    base_url = %self.base_url,
                    path,
                    "invalid lookup endpoint: {err}"
                );
                None
            }
        }
    }
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg)?;
    }

    apply_env_overrides(&mut settings, env);
    Ok(settings)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) -> anyhow::Result<()> {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.tax_id_lookup_path {
        settings.tax_id_lookup_path = Some(v);
    }
    if let Some(v) = file_cfg.zip_code_lookup_path {
        settings.zip_code_lookup_path = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout_seconds = v;
    }
    if let Some(v) = file_cfg.masks_enabled {
        settings.masks_enabled = v;
    }
    if let Some(v) = file_cfg.supplier_type {
        settings.supplier_type = v.parse()?;
    }
    Ok(())
}

fn first_env(env: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env(*key))
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = first_env(&env, &["APP__BASE_URL", "SUPPLIER_FORM_BASE_URL"]) {
        settings.base_url = v;
    }
    if let Some(v) = first_env(&env, &["APP__TAX_ID_LOOKUP_PATH", "SUPPLIER_FORM_TAX_ID_LOOKUP_PATH"]) {
        settings.tax_id_lookup_path = Some(v);
    }
    if let Some(v) = first_env(
        &env,
        &["APP__ZIP_CODE_LOOKUP_PATH", "SUPPLIER_FORM_ZIP_CODE_LOOKUP_PATH"],
    ) {
        settings.zip_code_lookup_path = Some(v);
    }
    if let Some(v) = first_env(
        &env,
        &["APP__REQUEST_TIMEOUT_SECONDS", "SUPPLIER_FORM_REQUEST_TIMEOUT_SECONDS"],
    ) {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_seconds = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric request timeout override"),
        }
    }
    if let Some(v) = first_env(&env, &["APP__MASKS_ENABLED", "SUPPLIER_FORM_MASKS_ENABLED"]) {
        match v.parse::<bool>() {
            Ok(parsed) => settings.masks_enabled = parsed,
            Err(_) => warn!(value = %v, "ignoring non-boolean masks override"),
        }
    }
    if let Some(v) = first_env(&env, &["APP__SUPPLIER_TYPE", "SUPPLIER_FORM_SUPPLIER_TYPE"]) {
        match v.parse::<SupplierType>() {
            Ok(parsed) => settings.supplier_type = parsed,
            Err(err) => warn!("ignoring supplier type override: {err}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
