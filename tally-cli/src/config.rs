use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sheets: SheetsSection,
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsSection {
    /// Target spreadsheet id (the long id in the sheet URL).
    pub spreadsheet_id: Option<String>,
    /// Worksheet receiving the ledger table.
    pub sheet_name: String,
    /// Worksheet receiving the pivot table.
    pub pivot_sheet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// Default ledger file when --csv is not passed.
    pub csv_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheets: SheetsSection {
                spreadsheet_id: None,
                sheet_name: "Sheet1".to_string(),
                pivot_sheet: "Pivot".to_string(),
            },
            ledger: LedgerSection {
                csv_path: "expenses.csv".to_string(),
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.sheets.sheet_name, "Sheet1");
        assert_eq!(cfg.sheets.pivot_sheet, "Pivot");
        assert_eq!(cfg.sheets.spreadsheet_id, None);
        assert_eq!(cfg.ledger.csv_path, "expenses.csv");
    }

    #[test]
    fn test_toml_round_trip() {
        let mut cfg = Config::default();
        cfg.sheets.spreadsheet_id = Some("abc123".to_string());

        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.sheets.spreadsheet_id.as_deref(), Some("abc123"));
        assert_eq!(back.ledger.csv_path, cfg.ledger.csv_path);
    }
}
