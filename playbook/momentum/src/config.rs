use inflect::{AnalysisConfig, SignRule, DEFAULT_SMOOTHING_WINDOW, DEFAULT_STEP_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MomentumConfig {
  pub tickers: Vec<String>,
  pub data_dir: PathBuf,
  pub lookback_years: Option<u32>,
  pub analysis: AnalysisConfig,
  pub plot: bool,
  pub out_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct YamlConfig {
  pub tickers: Vec<String>,
  pub data_dir: String,
  pub lookback_years: Option<u32>,
  pub step_size: Option<f64>,
  pub smoothing_window: Option<usize>,
  pub sign_rule: Option<SignRule>,
  #[serde(default)]
  pub plot: bool,
  pub out_dir: String,
}

/// Relative paths are taken from `base`.
fn resolve(base: &Path, path: &str) -> PathBuf {
  let path = PathBuf::from(path);
  match path.is_absolute() {
    true => path,
    false => base.join(path),
  }
}

impl MomentumConfig {
  /// Reads `config.yaml` next to this crate's manifest, or the file named by `MOMENTUM_CONFIG`.
  /// `DATA_DIR` and `OUT_DIR` override the directories from the file.
  pub fn read() -> anyhow::Result<Self> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = match std::env::var("MOMENTUM_CONFIG") {
      Ok(path) => PathBuf::from(path),
      Err(_) => dir.join("config.yaml"),
    };
    let contents = std::fs::read_to_string(&path)
      .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    let mut cfg = Self::parse(&contents, &dir)?;
    if let Ok(data_dir) = std::env::var("DATA_DIR") {
      cfg.data_dir = PathBuf::from(data_dir);
    }
    if let Ok(out_dir) = std::env::var("OUT_DIR") {
      cfg.out_dir = PathBuf::from(out_dir);
    }
    Ok(cfg)
  }

  pub fn parse(contents: &str, base: &Path) -> anyhow::Result<Self> {
    let yaml: YamlConfig = serde_yaml::from_str(contents)?;
    if yaml.tickers.is_empty() {
      return Err(anyhow::anyhow!("Config lists no tickers"));
    }
    Ok(Self {
      tickers: yaml.tickers,
      data_dir: resolve(base, &yaml.data_dir),
      lookback_years: yaml.lookback_years,
      analysis: AnalysisConfig {
        step_size: yaml.step_size.unwrap_or(DEFAULT_STEP_SIZE),
        smoothing_window: yaml.smoothing_window.unwrap_or(DEFAULT_SMOOTHING_WINDOW),
        sign_rule: yaml.sign_rule.unwrap_or_default(),
      },
      plot: yaml.plot,
      out_dir: resolve(base, &yaml.out_dir),
    })
  }
}
