use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{MultiSelect, Text};
use spot_check_core::{
    Config, ConfigScreen, ForecastToggles, ForecastType, ScreenOptions, SyncOutcome,
    transport::transport_from_config,
};
use tracing::debug;

use crate::ui::{TerminalUi, render_fields};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "spot-check", version, about = "Configure a Spot Check device")]
pub struct Cli {
    /// Device hostname for this run, overriding the configured one.
    #[arg(long, global = true)]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the configuration currently stored on the device.
    Show,

    /// Edit the device configuration and apply it.
    ///
    /// Values not given as flags are prompted for, prefilled from the device.
    Configure {
        #[arg(long)]
        spot_name: Option<String>,

        /// Number of days of forecast to display.
        #[arg(long)]
        days: Option<String>,

        /// Forecast type to enable; repeat for several ("swell", "tides").
        #[arg(long = "forecast", value_parser = parse_forecast_type)]
        forecast: Vec<ForecastType>,
    },

    /// Show or change the device hostname stored in the settings file.
    Device {
        /// New hostname, e.g. "spot-check.local." or "192.168.1.40:8080".
        host: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Device { host: Some(host) } => {
                config.set_host(host);
                config.save()?;
                println!("Device host set to {}", config.host());
            }
            Command::Device { host: None } => {
                println!("{}", config.host());
            }
            Command::Show => {
                let mut screen = open_screen(&config, self.host)?;
                load_current(&mut screen).await?;
                println!("{}", render_fields(&screen.ui().fields));
            }
            Command::Configure { spot_name, days, forecast } => {
                let mut screen = open_screen(&config, self.host)?;
                // A failed fetch has already been reported; editing from blank fields still works.
                let _ = load_current(&mut screen).await;

                let spot_name = match spot_name {
                    Some(name) => name,
                    None => prompt_text("Spot name:", &screen.ui().fields.spot_name)?,
                };
                screen.ui_mut().fields.spot_name = spot_name.clone();
                screen.spot_name_changed(&spot_name);

                let days = match days {
                    Some(days) => days,
                    None => prompt_text("Number of days:", &screen.ui().fields.number_of_days)?,
                };
                screen.ui_mut().fields.number_of_days = days.clone();
                screen.number_of_days_changed(&days);

                let toggles = if forecast.is_empty() {
                    prompt_forecast(screen.ui().fields.forecast)?
                } else {
                    forecast.into_iter().collect()
                };
                screen.ui_mut().fields.forecast = toggles;
                screen.forecast_toggled(toggles);

                if !screen.ui().submit_enabled() {
                    bail!("Spot name, number of days and at least one forecast type are required.");
                }

                screen.apply_config()?;
                let outcomes = screen.run_until_idle().await;
                if !outcomes.contains(&SyncOutcome::Applied) {
                    bail!("Configuration was not applied to the device.");
                }
            }
        }

        Ok(())
    }
}

fn open_screen(config: &Config, host: Option<String>) -> anyhow::Result<ConfigScreen<TerminalUi>> {
    let transport = transport_from_config(config)?;

    let mut options = ScreenOptions::from_config(config);
    if let Some(host) = host {
        options.host = host;
    }
    debug!(host = %options.host, "opening configuration screen");

    Ok(ConfigScreen::new(TerminalUi::default(), transport, options))
}

async fn load_current(screen: &mut ConfigScreen<TerminalUi>) -> anyhow::Result<()> {
    screen.activate();

    for outcome in screen.run_until_idle().await {
        match outcome {
            SyncOutcome::FetchFailed => bail!("Could not read configuration from the device."),
            SyncOutcome::FetchUnreadable => {
                eprintln!("Device returned a configuration this tool could not read.");
            }
            _ => {}
        }
    }

    Ok(())
}

fn prompt_text(message: &str, current: &str) -> anyhow::Result<String> {
    let mut prompt = Text::new(message);
    if !current.is_empty() {
        prompt = prompt.with_default(current);
    }

    prompt.prompt().with_context(|| format!("Failed to read '{message}'"))
}

fn prompt_forecast(current: ForecastToggles) -> anyhow::Result<ForecastToggles> {
    let options = ForecastType::all().to_vec();
    let defaults: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, kind)| current.is_enabled(**kind))
        .map(|(idx, _)| idx)
        .collect();

    let selected = MultiSelect::new("Forecast types:", options)
        .with_default(&defaults)
        .prompt()
        .context("Failed to read forecast types")?;

    Ok(selected.into_iter().collect())
}

fn parse_forecast_type(value: &str) -> Result<ForecastType, String> {
    ForecastType::try_from(value).map_err(|e| e.to_string())
}
