use clap::{Args, Parser, Subcommand};
use mash_core::equations::{liters_to_gallons, MAX_RESTS};
use mash_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

type Model = MashModel<FormParameters, ResultTable>;

#[derive(Parser)]
#[command(name = "mash")]
#[command(about = "Mash water calculator for homebrewing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the initial parameter payload (JSON)
    #[arg(long, global = true)]
    payload: Option<PathBuf>,

    /// Ignore hop absorption when computing the runoff
    #[arg(long, global = true)]
    no_hops: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute strike, infusion and sparge volumes once (default)
    Calc {
        #[command(flatten)]
        params: ParameterArgs,

        /// Rest target temperature, repeat for a stepped mash
        #[arg(long = "rest", value_name = "TEMP")]
        rests: Vec<f64>,

        /// Also export the result table to a CSV file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Edit the mash schedule line by line from stdin
    Interactive {
        #[command(flatten)]
        params: ParameterArgs,
    },
}

/// Parameter overrides applied on top of the payload
#[derive(Args, Default)]
struct ParameterArgs {
    /// Total grain bill (kg)
    #[arg(long)]
    grain_mass: Option<f64>,
    /// Water to grain ratio (L/kg)
    #[arg(long)]
    mash_thickness: Option<f64>,
    /// Grain temperature
    #[arg(long)]
    grain_temp: Option<f64>,
    /// Batch volume (L)
    #[arg(long)]
    batch_volume: Option<f64>,
    /// Evaporation rate (L/hr)
    #[arg(long)]
    evaporation_rate: Option<f64>,
    /// Boil length (min)
    #[arg(long)]
    boil_length: Option<f64>,
    /// Equipment loss (L)
    #[arg(long)]
    equipment_loss: Option<f64>,
    /// Trub loss (L)
    #[arg(long)]
    trub_loss: Option<f64>,
    /// Mash tun volume (L)
    #[arg(long)]
    mash_tun_volume: Option<f64>,
    /// Total hops (g)
    #[arg(long)]
    total_hops: Option<f64>,
}

impl ParameterArgs {
    fn overrides(&self) -> Vec<(ParameterKey, f64)> {
        [
            (ParameterKey::GrainMass, self.grain_mass),
            (ParameterKey::MashThickness, self.mash_thickness),
            (ParameterKey::GrainTemp, self.grain_temp),
            (ParameterKey::BatchVolume, self.batch_volume),
            (ParameterKey::EvaporationRate, self.evaporation_rate),
            (ParameterKey::BoilLength, self.boil_length),
            (ParameterKey::EquipmentLoss, self.equipment_loss),
            (ParameterKey::TrubLoss, self.trub_loss),
            (ParameterKey::MashTunVolume, self.mash_tun_volume),
            (ParameterKey::TotalHops, self.total_hops),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        mash_core::logging::init_with_level("debug");
    } else {
        mash_core::logging::init();
    }

    let mut config = Config::load()?;
    if cli.no_hops {
        config.mash.track_hops = false;
    }
    let payload_path = cli.payload.unwrap_or_else(|| config.payload.path.clone());
    let payload = InitialParameters::load(&payload_path)?;

    match cli.command {
        Some(Commands::Calc { params, rests, csv }) => {
            cmd_calc(&config, &payload, &params, &rests, csv)
        }
        Some(Commands::Interactive { params }) => cmd_interactive(&config, &payload, &params),
        None => {
            // Default to "calc" command
            cmd_calc(&config, &payload, &ParameterArgs::default(), &[], None)
        }
    }
}

/// Build the model the way the form loads: payload first, then the fields
/// the payload does not carry, then command-line overrides
fn build_model(config: &Config, payload: &InitialParameters, params: &ParameterArgs) -> Model {
    let mut form = FormParameters::new();
    for key in [
        ParameterKey::GrainMass,
        ParameterKey::BoilLength,
        ParameterKey::TotalHops,
    ] {
        form.set(key, 0.0);
    }

    let mut model = MashModel::with_config(form, ResultTable::new(), &config.mash);
    model.initialize(payload);

    for (key, value) in params.overrides() {
        model.set_parameter(key, value);
    }
    model
}

fn cmd_calc(
    config: &Config,
    payload: &InitialParameters,
    params: &ParameterArgs,
    rests: &[f64],
    csv: Option<PathBuf>,
) -> Result<()> {
    let mut model = build_model(config, payload, params);

    if rests.len() > MAX_RESTS {
        tracing::warn!(
            "A mash schedule holds at most {} rests, ignoring {} extra",
            MAX_RESTS,
            rests.len() - MAX_RESTS
        );
    }

    for (index, temperature) in rests.iter().take(MAX_RESTS).enumerate() {
        if index > 0 {
            model.add_rest();
        }
        model.set_rest_temperature(index, *temperature)?;
    }

    print!("{}", render_table(&model, config.display.precision));

    if let Some(path) = csv {
        let count = export_csv(&path, model.sink())?;
        println!("\n✓ Exported {} rows to {}", count, path.display());
    }

    Ok(())
}

fn cmd_interactive(
    config: &Config,
    payload: &InitialParameters,
    params: &ParameterArgs,
) -> Result<()> {
    let mut model = build_model(config, payload, params);
    let precision = config.display.precision;

    print!("{}", render_table(&model, precision));
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => print_help(),
            Ok(Command::Show) => print!("{}", render_table(&model, precision)),
            Ok(command) => match apply_command(&mut model, command) {
                Ok(()) => print!("{}", render_table(&model, precision)),
                Err(e) => eprintln!("{}", e),
            },
            Err(message) => eprintln!("{}", message),
        }
    }

    Ok(())
}

enum Command {
    Add,
    Delete,
    Rest { index: usize, temperature: f64 },
    Set { key: ParameterKey, input: String },
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        [] | ["show"] => Ok(Command::Show),
        ["add"] => Ok(Command::Add),
        ["del"] | ["delete"] => Ok(Command::Delete),
        ["help"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] | ["q"] => Ok(Command::Quit),
        ["rest", number, temperature] => {
            let index = number
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| format!("Invalid rest number: {}", number))?;
            let temperature = temperature
                .parse::<f64>()
                .map_err(|_| format!("Invalid temperature: {}", temperature))?;
            Ok(Command::Rest { index, temperature })
        }
        ["set", name, input @ ..] if !input.is_empty() => {
            let key = name.parse::<ParameterKey>().map_err(|e| e.to_string())?;
            Ok(Command::Set {
                key,
                input: input.join(" "),
            })
        }
        _ => Err(format!("Unknown command: {}", line.trim())),
    }
}

fn apply_command(model: &mut Model, command: Command) -> Result<()> {
    match command {
        Command::Add => {
            if model.rests().len() >= MAX_RESTS {
                tracing::warn!("Already at {} rests, not adding another", MAX_RESTS);
            }
            model.add_rest();
        }
        Command::Delete => model.remove_rest(),
        Command::Rest { index, temperature } => {
            model.set_rest_temperature(index, temperature)?;
        }
        Command::Set { key, input } => model.set_parameter_input(key, &input),
        Command::Show | Command::Help | Command::Quit => {}
    }
    Ok(())
}

fn print_help() {
    println!("─────────────────────────────────────────");
    println!("  add                 add a rest");
    println!("  del                 remove the last rest");
    println!("  rest <n> <temp>     set the target of rest n");
    println!("  set <param> <value> set a parameter");
    println!("  show                print the table");
    println!("  quit                exit");
}

fn render_table(model: &Model, precision: usize) -> String {
    let p = precision;
    let sink = model.sink();
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!(
        "  {:<6}{:>10}{:>14}{:>14}{:>14}\n",
        "Rest", "Target", "Water temp", "Volume (L)", "Volume (gal)"
    ));

    for (rest, infusion) in model.rests().iter().zip(model.infusions()) {
        let (temp, liters, gallons) = if infusion.achievable {
            let liters = sink.read(ResultKey::InfusionVolume(infusion.index));
            (
                format!("{:.p$}", sink.read(ResultKey::InfusionTemperature(infusion.index))),
                format!("{:.p$}", liters),
                format!("{:.p$}", liters_to_gallons(liters)),
            )
        } else {
            ("n/a".to_string(), "n/a".to_string(), "n/a".to_string())
        };

        out.push_str(&format!(
            "  {:<6}{:>10.p$}{:>14}{:>14}{:>14}\n",
            rest.index + 1,
            rest.target_temperature,
            temp,
            liters,
            gallons
        ));
    }

    out.push('\n');
    for key in ResultKey::SUMMARY {
        let Some(entry) = sink.entry(key) else {
            continue;
        };
        let marker = match entry.good {
            Some(true) => "  ✓ fits",
            Some(false) => "  ✗ too big",
            None => "",
        };
        out.push_str(&format!(
            "  {:<20}{:>10.p$} L{:>10.p$} gal{}\n",
            key.label(),
            entry.value,
            entry.gallons.unwrap_or_default(),
            marker
        ));
    }

    out
}
