mod app;
mod render;

use anyhow::Result;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use weatherly_core::{AppError, Config, ConfigError, WeatherError};
use weatherly_weather::{select_view, LocationOption, TemperatureUnit};

use crate::app::App;

#[derive(Parser)]
#[command(name = "weatherly", about = "Current weather and forecasts for any city")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cities matching a name (popular cities when empty)
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Show current weather and the daily forecast
    Weather {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Show the weather at the configured position
    Locate,
    /// Manage saved locations
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Show or change the temperature unit
    Unit { unit: Option<TemperatureUnit> },
    /// Run the API proxy
    Serve,
}

#[derive(Subcommand)]
enum FavoritesAction {
    List,
    Add {
        #[command(flatten)]
        location: LocationArgs,
    },
    Remove { id: String },
    Toggle {
        #[command(flatten)]
        location: LocationArgs,
    },
}

#[derive(clap::Args)]
struct LocationArgs {
    /// City name; the first search match is used
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<String>,
    /// Display name when giving coordinates
    #[arg(long)]
    label: Option<String>,
}

impl LocationArgs {
    async fn resolve(&self, app: &App) -> Result<LocationOption, AppError> {
        if let Some(city) = &self.city {
            return app.find_city(city).await;
        }

        match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => {
                let value = format!("{} {}", lat, lon);
                let label = self.label.clone().unwrap_or_else(|| value.clone());
                Ok(LocationOption::new(value, label))
            }
            _ => Err(WeatherError::InvalidLocation("give --city or --lat/--lon".into()).into()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    weatherly_core::init()?;

    let cli = Cli::parse();
    if let Command::Serve = cli.command {
        // Proxy secrets; a missing file is fine
        dotenv::from_filename(".env.local").ok();
    }
    let (config, _) = Config::load_validated()?;

    if let Err(e) = run(cli.command, config).await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: Config) -> Result<(), AppError> {
    if let Command::Serve = command {
        return serve(config).await;
    }

    let app = App::new(config)?;
    for problem in app.storage_problems() {
        eprintln!("{}", problem.user_message());
    }

    match command {
        Command::Search { query } => {
            // A single call is never superseded
            if let Some(options) = app.search().load_options(&query).await {
                if let Some(reason) = options.reason() {
                    tracing::warn!("Search degraded: {}", reason);
                }
                print!("{}", render::options(options.value()));
            }
        }
        Command::Weather { location } => {
            let location = location.resolve(&app).await?;
            show_weather(&app, &location).await;
        }
        Command::Locate => {
            let location = app.locate().await?.to_location_option();
            show_weather(&app, &location).await;
        }
        Command::Favorites { action } => {
            if !app.config().features.enable_favorites {
                return Err(ConfigError::Invalid("favorites are disabled".into()).into());
            }
            favorites(&app, action).await?;
        }
        Command::Unit { unit } => {
            if let Some(unit) = unit {
                app.settings().set_temperature_unit(unit);
            }
            println!("{}", app.settings().temperature_unit());
        }
        Command::Serve => {}
    }

    Ok(())
}

async fn favorites(app: &App, action: FavoritesAction) -> Result<(), AppError> {
    match action {
        FavoritesAction::List => {}
        FavoritesAction::Add { location } => {
            let location = location.resolve(app).await?;
            app.favorites().add(&location);
        }
        FavoritesAction::Remove { id } => app.favorites().remove(&id),
        FavoritesAction::Toggle { location } => {
            let location = location.resolve(app).await?;
            app.favorites().toggle(&location);
        }
    }

    let view = app.fetcher().view();
    let screen = select_view(&view, true);
    print!(
        "{}",
        render::screen(
            &screen,
            display_unit(app),
            chrono::Local::now().weekday(),
            false,
            &app.favorites().list(),
        )
    );
    Ok(())
}

async fn show_weather(app: &App, location: &LocationOption) {
    app.fetcher().fetch_weather(location).await;

    let view = app.fetcher().view();
    let is_favorite = view
        .location_value
        .as_deref()
        .is_some_and(|value| app.favorites().is_favorite(value));

    print!(
        "{}",
        render::screen(
            &select_view(&view, false),
            display_unit(app),
            chrono::Local::now().weekday(),
            is_favorite,
            &[],
        )
    );
}

fn display_unit(app: &App) -> TemperatureUnit {
    if app.config().features.enable_unit_conversion {
        app.settings().temperature_unit()
    } else {
        TemperatureUnit::Celsius
    }
}

async fn serve(config: Config) -> Result<(), AppError> {
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    weatherly_proxy::serve(config.proxy, shutdown).await?;
    Ok(())
}
