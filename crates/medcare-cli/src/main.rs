mod context;
mod display;
mod interactive;
mod views;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use medcare_ai::{GatewayConfig, ModelGateway};
use medcare_assets::DEFAULT_ANIMATION_URL;
use medcare_core::{FetalFeatures, InputError, MaternalFeatures, ModelId};
use tracing::Level;

use crate::context::{AppContext, AssetConfig};
use crate::display::Style;
use crate::views::{Form, MenuItem, View};

#[derive(Parser)]
#[command(name = "medcare", version, about = "MedCare maternal and fetal health predictions")]
struct Cli {
    /// Maternal risk model artifact (.json, or .onnx with the `onnx` feature).
    #[arg(long, global = true, env = "MEDCARE_MATERNAL_MODEL")]
    maternal_model: Option<PathBuf>,

    /// Fetal health model artifact.
    #[arg(long, global = true, env = "MEDCARE_FETAL_MODEL")]
    fetal_model: Option<PathBuf>,

    /// Decorative animation shown on the About page.
    #[arg(long, global = true, env = "MEDCARE_ANIMATION_URL", default_value = DEFAULT_ANIMATION_URL)]
    animation_url: String,

    /// Skip the animation fetch entirely.
    #[arg(long, global = true)]
    no_animation: bool,

    #[arg(long, global = true, default_value_t = 5)]
    fetch_timeout_secs: u64,

    /// Plain output even on a terminal.
    #[arg(long, global = true)]
    no_color: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Mission statement and features.
    About,
    /// Predict pregnancy risk from maternal vitals.
    Pregnancy(MaternalArgs),
    /// Predict fetal health from cardiotocogram metrics.
    Fetal(FetalArgs),
    /// Risk distribution by age group.
    Dashboard,
    /// Show the loaded model artifacts.
    Models,
    /// Menu-driven session (default).
    Interactive,
}

/// Unset flags keep their defaults.
#[derive(Args)]
struct MaternalArgs {
    #[arg(long)]
    age: Option<f64>,
    #[arg(long)]
    diastolic_bp: Option<f64>,
    /// mmol/L
    #[arg(long)]
    blood_glucose: Option<f64>,
    /// °C
    #[arg(long)]
    body_temp: Option<f64>,
    #[arg(long)]
    heart_rate: Option<f64>,
}

impl MaternalArgs {
    fn apply(&self, form: &mut Form<MaternalFeatures>) -> Result<(), InputError> {
        let given = [
            ("Age", self.age),
            ("DiastolicBP", self.diastolic_bp),
            ("BS", self.blood_glucose),
            ("BodyTemp", self.body_temp),
            ("HeartRate", self.heart_rate),
        ];
        for (name, value) in given {
            if let Some(value) = value {
                form.set_value(name, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Args)]
struct FetalArgs {
    #[arg(long)]
    baseline_value: Option<f64>,
    #[arg(long)]
    accelerations: Option<f64>,
    #[arg(long)]
    fetal_movement: Option<f64>,
    #[arg(long)]
    uterine_contractions: Option<f64>,
    #[arg(long)]
    light_decelerations: Option<f64>,
    #[arg(long)]
    severe_decelerations: Option<f64>,
    #[arg(long)]
    prolongued_decelerations: Option<f64>,
    #[arg(long)]
    abnormal_short_term_variability: Option<f64>,
    #[arg(long)]
    mean_value_of_short_term_variability: Option<f64>,
    #[arg(long)]
    percentage_of_time_with_abnormal_long_term_variability: Option<f64>,
}

impl FetalArgs {
    fn apply(&self, form: &mut Form<FetalFeatures>) -> Result<(), InputError> {
        let given = [
            ("baseline_value", self.baseline_value),
            ("accelerations", self.accelerations),
            ("fetal_movement", self.fetal_movement),
            ("uterine_contractions", self.uterine_contractions),
            ("light_decelerations", self.light_decelerations),
            ("severe_decelerations", self.severe_decelerations),
            ("prolongued_decelerations", self.prolongued_decelerations),
            (
                "abnormal_short_term_variability",
                self.abnormal_short_term_variability,
            ),
            (
                "mean_value_of_short_term_variability",
                self.mean_value_of_short_term_variability,
            ),
            (
                "percentage_of_time_with_abnormal_long_term_variability",
                self.percentage_of_time_with_abnormal_long_term_variability,
            ),
        ];
        for (name, value) in given {
            if let Some(value) = value {
                form.set_value(name, value)?;
            }
        }
        Ok(())
    }
}

impl Cli {
    fn gateway_config(&self) -> GatewayConfig {
        let defaults = GatewayConfig::default();
        GatewayConfig {
            maternal_path: self.maternal_model.clone().unwrap_or(defaults.maternal_path),
            fetal_path: self.fetal_model.clone().unwrap_or(defaults.fetal_path),
        }
    }

    fn asset_config(&self) -> AssetConfig {
        AssetConfig {
            url: (!self.no_animation).then(|| self.animation_url.clone()),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }

    fn style(&self) -> Style {
        Style {
            color: !self.no_color && io::stdout().is_terminal(),
        }
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with rendered views.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cli.log_level())
        .init();
    tracing::info!("medcare v{}", env!("CARGO_PKG_VERSION"));

    let config = cli.gateway_config();
    let gateway = ModelGateway::load(&config).with_context(|| {
        format!(
            "failed to load models ({}, {})",
            config.maternal_path.display(),
            config.fetal_path.display()
        )
    })?;

    let assets = cli.asset_config();
    let style = cli.style();
    let command = cli.command.unwrap_or(Command::Interactive);
    let animation = match command {
        Command::About | Command::Interactive => assets.fetch().await,
        _ => None,
    };
    let ctx = AppContext::new(gateway, animation, style);

    match command {
        Command::About => print_view(&ctx, View::select(MenuItem::AboutUs)),
        Command::Dashboard => print_view(&ctx, View::select(MenuItem::Dashboard)),
        Command::Pregnancy(args) => {
            let mut form = Form::default();
            args.apply(&mut form).context("invalid pregnancy input")?;
            // A failed prediction is rendered in the view, not returned.
            let _ = form.predict(&ctx.gateway);
            print_view(&ctx, View::PregnancyRisk(form));
        }
        Command::Fetal(args) => {
            let mut form = Form::default();
            args.apply(&mut form).context("invalid fetal input")?;
            let _ = form.predict(&ctx.gateway);
            print_view(&ctx, View::FetalHealth(form));
        }
        Command::Models => {
            let summaries: Vec<_> = ModelId::ALL.iter().map(|m| ctx.gateway.describe(*m)).collect();
            print!("{}", display::render_models(&summaries));
        }
        Command::Interactive => {
            interactive::run_session(&ctx, io::stdin().lock(), io::stdout().lock())
                .context("interactive session failed")?;
        }
    }
    Ok(())
}

fn print_view(ctx: &AppContext, view: View) {
    print!(
        "{}",
        display::render_view(&view, ctx.animation.as_ref(), ctx.style)
    );
}
