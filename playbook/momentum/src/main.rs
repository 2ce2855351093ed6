use config::MomentumConfig;
use inflect::*;
use log::{error, info};
use rayon::prelude::*;

mod config;
mod report;

fn load(provider: &CsvProvider, ticker: &str, cfg: &MomentumConfig) -> anyhow::Result<(TimeSeries, Analysis)> {
  let start = cfg.lookback_years.map(lookback_start).transpose()?;
  let series = provider.closes(ticker, start, None)?;
  let analysis = Analysis::run(ticker, &series, &cfg.analysis)?;
  Ok((series, analysis))
}

fn main() -> anyhow::Result<()> {
  dotenv::dotenv().ok();
  init_logger()?;

  let cfg = MomentumConfig::read()?;
  let provider = CsvProvider::new(&cfg.data_dir);
  info!(
    "Analysing {} ticker(s) from {}",
    cfg.tickers.len(),
    cfg.data_dir.display()
  );

  // runs share nothing, so each ticker is analysed on its own thread
  let runs: Vec<(&String, anyhow::Result<(TimeSeries, Analysis)>)> = cfg
    .tickers
    .par_iter()
    .map(|ticker| (ticker, load(&provider, ticker, &cfg)))
    .collect();

  let mut failed = 0;
  for (ticker, run) in runs {
    match run {
      Ok((series, analysis)) => {
        report::summary(&analysis);
        if cfg.plot {
          if let Err(e) = report::charts(&series, &analysis, &cfg.out_dir) {
            error!("Failed to plot {}: {}", ticker, e);
          }
        }
      }
      Err(e) => {
        error!("Failed to analyse {}: {}", ticker, e);
        failed += 1;
      }
    }
  }

  if failed == cfg.tickers.len() {
    return Err(anyhow::anyhow!("No ticker could be analysed"));
  }
  Ok(())
}
