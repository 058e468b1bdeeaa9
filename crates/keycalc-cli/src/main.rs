//! keycalc: keypad calculator for the terminal
//!
//! ## Usage
//!
//! ```bash
//! keycalc run 12 + 3 =            # Press keys, print display and history
//! keycalc run --format json 2 ^ 8 =
//! keycalc repl                    # Interactive session
//! keycalc --history-size 20 config
//! keycalc --history-file tape.json repl
//! ```

use clap::Parser;
use keycalc::core::DisplayMode;
use keycalc_cli::{
    Cli, CliConfig, CliError, CliResult, Commands, Renderer, ReplArgs, RunArgs, Session,
    Verbosity,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from file, then CLI args
    let config = build_config(&cli)?;
    init_tracing(config.verbosity);

    let use_color = config.color.should_color();
    console::set_colors_enabled(use_color);
    let renderer = Renderer::new(use_color, config.verbosity.is_quiet());

    match cli.command {
        Commands::Run(args) => run_keys(&config, renderer, &args),
        Commands::Repl(args) => run_repl(&config, renderer, &args),
        Commands::Config => run_config(&config),
    }
}

fn build_config(cli: &Cli) -> CliResult<CliConfig> {
    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::new(),
    };

    if cli.quiet || cli.verbose > 0 {
        config = config.with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet));
    }
    if let Some(color) = cli.color {
        config = config.with_color(color.into());
    }
    if let Some(size) = cli.history_size {
        config = config.with_history_capacity(size);
    }
    if let Some(path) = &cli.history_file {
        config = config.with_history_file(path);
    }
    Ok(config)
}

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

const fn display_mode(override_display: bool) -> DisplayMode {
    if override_display {
        DisplayMode::Override
    } else {
        DisplayMode::Normal
    }
}

fn open_session(
    config: &CliConfig,
    renderer: Renderer,
    override_display: bool,
) -> CliResult<Session> {
    let mode = display_mode(override_display);
    let mut session = Session::new(config.engine.clone(), mode, renderer);
    if let Some(path) = &config.history_file {
        session.load_history(path)?;
    }
    Ok(session)
}

fn run_keys(config: &CliConfig, renderer: Renderer, args: &RunArgs) -> CliResult<()> {
    let mut session = open_session(config, renderer, args.override_display)?;

    let pressed = session.press_tokens(&args.tokens);
    if let Err(CliError::Calc(err)) = &pressed {
        // Errors clear the calculator before the state is shown
        tracing::info!(kind = err.kind(), "calculation failed; clearing");
        keycalc::driver::CalculatorDriver::reset(&mut session);
    }
    if matches!(pressed, Err(CliError::InvalidArgument { .. })) {
        return pressed;
    }

    println!("{}", renderer.report(session.engine(), args.format.into())?);
    pressed
}

fn run_repl(config: &CliConfig, renderer: Renderer, args: &ReplArgs) -> CliResult<()> {
    if !config.verbosity.is_quiet() {
        println!("{}", renderer.header("keycalc"));
        println!("Type keys separated by spaces (e.g. `12 + 3 =`), `help` for commands.");
    }

    let mut session = open_session(config, renderer, args.override_display)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    session.run(stdin.lock(), stdout.lock())
}

fn run_config(config: &CliConfig) -> CliResult<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}
