//! rusty-exr CLI - Norges Bank exchange rates from the command line
//!
//! ## Example Usage
//!
//! ```bash
//! # Latest rates for the saved selection
//! rusty-exr rates
//!
//! # Last 5 business days from EUR, written to CSV
//! rusty-exr rates --base EUR --currencies NOK,USD,SEK --last-n 5 --output rates.csv
//!
//! # Change the saved base currency
//! rusty-exr config set-base USD
//!
//! # Try the amount sanitizer keystroke by keystroke
//! rusty-exr amount 1 12 123 1234 1234. 1234.5
//! ```

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rusty_exr::amount_input::{AmountFormat, AmountInput};
use rusty_exr::conversion::{ConversionResult, ConversionService};
use rusty_exr::currency::{parse_code_list, Currency};
use rusty_exr::data::sources::norges_bank::NORGES_BANK_BASE_URL;
use rusty_exr::data::sources::{ExchangeRateSource, NorgesBankSource, ObservationWindow, OfflineSource};
use rusty_exr::data::store::FileDatasetStore;
use rusty_exr::data::{Provenance, SeriesFrequency};
use rusty_exr::decimal::NumberLocale;
use rusty_exr::export::write_csv;
use rusty_exr::settings::{load_or_default, ConversionConfig, DateInterval, JsonFileSettingsStore, SettingsStore};
use rusty_exr::types::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

type CliResult<T = ()> = anyhow::Result<T>;

/// rusty-exr: exchange rates from Norges Bank, from any base currency
#[derive(Parser)]
#[command(name = "rusty-exr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Robert Fall")]
#[command(about = "Exchange rates from Norges Bank, rebased onto any currency", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and show exchange rates
    Rates {
        /// Base currency (default: the saved one)
        #[arg(short = 'b', long)]
        base: Option<String>,

        /// Currencies to show, e.g. NOK,USD,SEK (default: the saved selection)
        #[arg(short = 'c', long)]
        currencies: Option<String>,

        /// Latest N observations of each series
        #[arg(short = 'n', long, conflicts_with_all = ["start", "end"])]
        last_n: Option<u32>,

        /// Start date (YYYY-MM-DD)
        #[arg(short = 's', long, requires = "end")]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(short = 'e', long, requires = "start")]
        end: Option<String>,

        /// Series frequency (B, M, A)
        #[arg(short = 'f', long)]
        frequency: Option<String>,

        /// Do not touch the network; use the cache or the packaged sample
        #[arg(long)]
        offline: bool,

        /// Write the rates to a CSV file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// List supported currencies
    Currencies,

    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run the amount sanitizer over successive inputs
    Amount {
        /// Text after each keystroke
        #[arg(value_name = "TEXT", required = true)]
        inputs: Vec<String>,

        /// Save the final amount as the multiplier
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings
    Show,
    /// Set the base currency
    SetBase {
        #[arg(value_name = "CURRENCY")]
        currency: String,
    },
    /// Set the selected currencies, e.g. NOK,USD,SEK
    Select {
        #[arg(value_name = "CURRENCIES")]
        currencies: String,
    },
    /// Restore first-run settings
    Reset,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,

    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,

    #[serde(default = "default_cache_dir")]
    cache_dir: PathBuf,

    /// Number locale for amounts: en_us, nb_no or de_de
    #[serde(default = "default_locale")]
    locale: String,
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rusty-exr")
}

fn default_api_base_url() -> String {
    NORGES_BANK_BASE_URL.to_string()
}

fn default_data_dir() -> PathBuf {
    app_dir().join("data")
}

fn default_cache_dir() -> PathBuf {
    app_dir().join("cache")
}

fn default_locale() -> String {
    "en_us".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            data_dir: default_data_dir(),
            cache_dir: default_cache_dir(),
            locale: default_locale(),
        }
    }
}

impl AppConfig {
    fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| app_dir().join("config.toml"));
        if !path.exists() {
            return AppConfig::default();
        }
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e),
            },
            Err(e) => eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e),
        }
        AppConfig::default()
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }

    fn settings_store(&self) -> JsonFileSettingsStore {
        JsonFileSettingsStore::new(self.data_dir.join("settings.json"))
    }

    fn number_locale(&self) -> NumberLocale {
        NumberLocale::from_name(&self.locale).unwrap_or_else(|| {
            eprintln!("{} Unknown locale {}, using en_us", "Warning:".yellow(), self.locale);
            NumberLocale::en_us()
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = AppConfig::load(cli.config.as_deref());
    if let Err(e) = config.ensure_dirs() {
        eprintln!("{} Failed to create directories: {}", "Error:".red().bold(), e);
        process::exit(1);
    }

    if cli.verbose {
        println!("{} v{}", "rusty-exr".cyan().bold(), env!("CARGO_PKG_VERSION"));
        println!("Data dir: {}", config.data_dir.display().to_string().dimmed());
    }

    let result = match cli.command {
        Commands::Rates {
            base,
            currencies,
            last_n,
            start,
            end,
            frequency,
            offline,
            output,
        } => {
            show_rates(RatesArgs {
                base,
                currencies,
                last_n,
                start,
                end,
                frequency,
                offline,
                output,
                config,
            })
            .await
        }
        Commands::Currencies => list_currencies(&config),
        Commands::Config { action } => handle_config_action(action, &config),
        Commands::Amount { inputs, save } => run_amount(&inputs, save, &config),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

struct RatesArgs {
    base: Option<String>,
    currencies: Option<String>,
    last_n: Option<u32>,
    start: Option<String>,
    end: Option<String>,
    frequency: Option<String>,
    offline: bool,
    output: Option<PathBuf>,
    config: AppConfig,
}

fn parse_currency(code: &str) -> CliResult<Currency> {
    Currency::from_code(code).ok_or_else(|| anyhow!("Unknown currency: {}", code))
}

fn parse_date(text: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").with_context(|| format!("Invalid date {}", text))
}

impl RatesArgs {
    /// Saved settings with this run's overrides applied
    fn conversion_config(&self, settings: &JsonFileSettingsStore) -> CliResult<ConversionConfig> {
        let mut config = load_or_default(settings);
        if let Some(ref base) = self.base {
            config.set_base_currency(parse_currency(base)?);
        }
        if let Some(ref list) = self.currencies {
            config.update_selected_currencies(parse_code_list(list).map_err(anyhow::Error::msg)?);
        }
        if let Some(ref frequency) = self.frequency {
            config.frequency = frequency.parse::<SeriesFrequency>()?;
        }
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            config.interval = DateInterval::new(parse_date(start)?, parse_date(end)?)?;
        }
        Ok(config)
    }

    fn window(&self, config: &ConversionConfig) -> Option<ObservationWindow> {
        match (self.last_n, &self.start) {
            (Some(n), _) => Some(ObservationWindow::LastN(n)),
            (None, Some(_)) => Some(config.interval.window()),
            (None, None) => None,
        }
    }
}

async fn refresh<S: ExchangeRateSource>(
    source: S,
    args: &RatesArgs,
    config: &mut ConversionConfig,
) -> CliResult<ConversionResult> {
    let store = FileDatasetStore::new(&args.config.cache_dir);
    let mut service = ConversionService::new(
        source,
        store,
        args.config.settings_store(),
        &PipelineConfig::default(),
    );
    if let Some(window) = args.window(config) {
        service = service.with_window(window);
    }
    Ok(service.refresh(config).await?)
}

async fn show_rates(args: RatesArgs) -> CliResult {
    let settings = args.config.settings_store();
    let mut config = args.conversion_config(&settings)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message("Fetching exchange rates...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = if args.offline {
        refresh(OfflineSource::new(), &args, &mut config).await
    } else {
        let source = NorgesBankSource::with_base_url(args.config.api_base_url.clone())?;
        refresh(source, &args, &mut config).await
    };
    spinner.finish_and_clear();
    let result = result?;

    print_result(&result);

    if let Some(path) = args.output {
        let file = fs::File::create(&path).with_context(|| format!("Cannot create {}", path.display()))?;
        write_csv(&result, file)?;
        println!("{} {}", "Wrote".green(), path.display());
    }
    Ok(())
}

fn print_result(result: &ConversionResult) {
    println!(
        "{} {} {}",
        "Rates from".cyan().bold(),
        result.requested_base.code().bold(),
        format!("(prepared {})", result.prepared_at.format("%Y-%m-%d %H:%M UTC")).dimmed()
    );
    if result.provenance != Provenance::Live {
        println!("{}", result.provenance_message.yellow());
    }
    if let Some(previous) = result.recovered_from {
        println!(
            "{} no rates for {}, showing {} instead",
            "Note:".yellow(),
            previous,
            result.requested_base
        );
    }
    if !result.missing_currencies.is_empty() {
        let missing: Vec<&str> = result.missing_currencies.iter().map(|c| c.code()).collect();
        println!("{} {}", "Not published:".yellow(), missing.join(", "));
    }
    println!();

    let show_converted = result.multiplier.is_some_and(|m| m != 1.0);
    for series in &result.series {
        println!(
            "  {} {}",
            series.quote_currency.code().bold(),
            series.quote_currency.name().dimmed()
        );
        for obs in &series.observations {
            if show_converted {
                println!(
                    "    {}  {:>14}  {:>16.4}",
                    obs.period_key,
                    obs.display_value,
                    result.convert(obs.value)
                );
            } else {
                println!("    {}  {:>14}", obs.period_key, obs.display_value);
            }
        }
    }
}

fn list_currencies(app: &AppConfig) -> CliResult {
    let config = load_or_default(&app.settings_store());
    println!("{}", "Supported currencies".cyan().bold());
    for currency in Currency::all() {
        let marker = if *currency == config.base_currency {
            "base".green().to_string()
        } else if config.selected_currencies.contains(currency) {
            "selected".to_string()
        } else if config.excluded_currencies.contains(currency) {
            "unavailable".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<4} {:<3} {:<36} {}",
            currency.code().bold(),
            currency.symbol(),
            currency.name(),
            marker
        );
    }
    Ok(())
}

fn handle_config_action(action: ConfigAction, app: &AppConfig) -> CliResult {
    let store = app.settings_store();
    match action {
        ConfigAction::Show => {
            let config = load_or_default(&store);
            println!("{}", "Settings".cyan().bold());
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!();
            println!("{}", "App config".cyan().bold());
            println!("{}", toml::to_string_pretty(app)?);
        }
        ConfigAction::SetBase { currency } => {
            let mut config = load_or_default(&store);
            config.set_base_currency(parse_currency(&currency)?);
            store.save(&config)?;
            println!("{} base currency {}", "Saved".green(), config.base_currency);
        }
        ConfigAction::Select { currencies } => {
            let mut config = load_or_default(&store);
            config.update_selected_currencies(parse_code_list(&currencies).map_err(anyhow::Error::msg)?);
            store.save(&config)?;
            let codes: Vec<&str> = config.selected_currencies.iter().map(|c| c.code()).collect();
            println!("{} selection {}", "Saved".green(), codes.join(", "));
        }
        ConfigAction::Reset => {
            store.save(&ConversionConfig::first_run())?;
            println!("{} settings reset", "Saved".green());
        }
    }
    Ok(())
}

fn run_amount(inputs: &[String], save: bool, app: &AppConfig) -> CliResult {
    let store = app.settings_store();
    let mut config = load_or_default(&store);
    let mut input = AmountInput::new(config.multiplier, AmountFormat::new(app.number_locale()));
    println!("{:>20}  {}", "(start)".dimmed(), input.text);

    for typed in inputs {
        input.on_edit(typed);
        match input.error {
            Some(ref error) => println!("{:>20}  {}  {}", typed, input.text, error.red()),
            None => println!("{:>20}  {}  {}", typed, input.text, input.value.to_string().dimmed()),
        }
    }

    if save {
        if input.value.is_nan() {
            bail!("Final amount is not a number, nothing saved");
        }
        config.set_multiplier(input.value)?;
        store.save(&config)?;
        println!("{} multiplier {}", "Saved".green(), config.multiplier);
    }
    Ok(())
}
