use amortization_core::LoanTerms;

/// Default upper bound on schedule length accepted from the command line.
pub const DEFAULT_MAX_PERIODS: u32 = 600;

/// Settings shared by every subcommand, taken from the global flags.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub max_periods: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

impl Settings {
    /// The engine does no defensive cap on term length; the CLI does.
    pub fn check_terms(&self, terms: &LoanTerms) -> Result<(), Box<dyn std::error::Error>> {
        if terms.periods > self.max_periods {
            return Err(format!(
                "--term {} exceeds the configured maximum of {} periods (see --max-periods)",
                terms.periods, self.max_periods
            )
            .into());
        }
        Ok(())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
