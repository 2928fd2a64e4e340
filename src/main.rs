//! Main CLI application for the puzzle SAT solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use puzzle_sat::{
    config::{CliOverrides, OutputFormat, Settings},
    numberlink::NumberlinkPuzzle,
    problem::{create_example_puzzles, decode_offline, solve_batch},
    sudoku::SudokuPuzzle,
    utils::{ColorOutput, SolutionFormatter},
    NumberlinkProblem, SudokuProblem,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "puzzle_sat")]
#[command(about = "Sudoku and Numberlink SAT Solver")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Redundancy-elimination clause families for Numberlink
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Constraint {
    UShape,
    UShapeLong,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a Sudoku problem file
    Sudoku {
        /// Problem file (`p sudoku 9 9` followed by hint lines)
        file: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Write the DIMACS formula here
        #[arg(long)]
        dimacs: Option<PathBuf>,

        /// Write the variable meaning map (JSON) here
        #[arg(long)]
        meaning: Option<PathBuf>,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Save solutions to the output directory
        #[arg(long)]
        save: bool,

        /// Output directory (overrides config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Solve a Numberlink problem file
    Numberlink {
        /// Problem file (`SIZE`, `LINE_NUM` and `LINE#` lines)
        file: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Additional constraints to prune redundant routes
        #[arg(short = 'C', long = "constraint", value_enum)]
        constraints: Vec<Constraint>,

        /// Write the DIMACS formula here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the variable meaning map (JSON) here
        #[arg(long)]
        meaning: Option<PathBuf>,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Print only the elapsed solve time
        #[arg(short = 't', long)]
        show_only_elapsed_time: bool,

        /// Save solutions to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Decode a solver result file with a saved meaning map
    Decode {
        /// Variable meaning map written by `--meaning`
        #[arg(long)]
        meaning: PathBuf,

        /// Solver output with `s` and `v` lines
        #[arg(long)]
        result: PathBuf,
    },

    /// Solve every puzzle file in a directory in parallel
    Batch {
        /// Directory holding .txt, .sudoku and .nl files
        directory: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Worker threads (overrides config)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sudoku {
            file,
            config,
            dimacs,
            meaning,
            max_solutions,
            save,
            output_dir,
        } => {
            let overrides = CliOverrides {
                max_solutions,
                dimacs_file: dimacs,
                meaning_file: meaning,
                output_dir,
                ..Default::default()
            };
            sudoku_command(file, config, overrides, save)
        }
        Commands::Numberlink {
            file,
            config,
            constraints,
            output,
            meaning,
            max_solutions,
            show_only_elapsed_time,
            save,
        } => {
            let overrides = CliOverrides {
                max_solutions,
                u_shape: constraints.contains(&Constraint::UShape),
                u_shape_long: constraints.contains(&Constraint::UShapeLong),
                dimacs_file: output,
                meaning_file: meaning,
                ..Default::default()
            };
            numberlink_command(file, config, overrides, show_only_elapsed_time, save)
        }
        Commands::Decode { meaning, result } => decode_command(meaning, result),
        Commands::Batch {
            directory,
            config,
            threads,
        } => batch_command(directory, config, threads),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

/// Load the config file if present, then apply CLI overrides
fn load_settings(config_path: &PathBuf, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        log::debug!("Config file {} not found, using defaults", config_path.display());
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn sudoku_command(file: PathBuf, config_path: PathBuf, overrides: CliOverrides, save: bool) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    let puzzle = SudokuPuzzle::load(&file)
        .with_context(|| format!("Failed to load sudoku from {}", file.display()))?;

    println!("{}", ColorOutput::info(&format!("Sudoku with {} hints:", puzzle.hints.len())));
    println!("{}", SolutionFormatter::format_sudoku_puzzle(&puzzle));

    let start_time = Instant::now();
    let problem = SudokuProblem::new(settings.clone(), puzzle);
    let outcome = problem.solve().context("Failed to solve sudoku")?;

    if !outcome.is_satisfiable() {
        println!("{}", ColorOutput::warning("No solution"));
        if !outcome.core.is_empty() {
            println!("{}", SolutionFormatter::format_core(&outcome.core));
        }
        return Ok(());
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Found {} solution(s) in {:.3}s",
            outcome.solutions.len(),
            start_time.elapsed().as_secs_f64()
        ))
    );
    for (i, solution) in outcome.solutions.iter().enumerate() {
        println!("\n{}", ColorOutput::info(&format!("Solution {}:", i + 1)));
        println!("{}", SolutionFormatter::format_sudoku(solution));
    }
    for violation in &outcome.violations {
        println!("{}", ColorOutput::error(violation));
    }

    if save {
        SolutionFormatter::save_solutions(
            &outcome.solutions,
            &settings.output.output_directory,
            settings.output.format,
            SolutionFormatter::format_sudoku_compact,
        )
        .context("Failed to save solutions")?;
        println!(
            "{}",
            ColorOutput::success(&format!("Solutions saved to {}", settings.output.output_directory.display()))
        );
    }

    log::debug!("{}", problem.encoding().formula.statistics());
    log::debug!("{}", outcome.report);
    Ok(())
}

fn numberlink_command(
    file: PathBuf,
    config_path: PathBuf,
    overrides: CliOverrides,
    show_only_elapsed_time: bool,
    save: bool,
) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    let puzzle = NumberlinkPuzzle::load(&file)
        .with_context(|| format!("Failed to load numberlink from {}", file.display()))?;

    let problem = NumberlinkProblem::new(settings.clone(), puzzle)?;
    let outcome = problem.solve().context("Failed to solve numberlink")?;

    if show_only_elapsed_time {
        println!("{:.6}", outcome.solve_time().as_secs_f64());
        return Ok(());
    }

    println!("{}", ColorOutput::info("Problem:"));
    println!("{}", SolutionFormatter::format_numberlink(problem.puzzle(), None));

    if !outcome.is_satisfiable() {
        println!("{}", ColorOutput::warning("UNSAT"));
        if !outcome.core.is_empty() {
            println!("{}", SolutionFormatter::format_core(&outcome.core));
        }
        return Ok(());
    }

    for (i, solution) in outcome.solutions.iter().enumerate() {
        println!("{}", ColorOutput::info(&format!("Answer {}:", i + 1)));
        println!("{}", SolutionFormatter::format_numberlink(problem.puzzle(), Some(solution)));
        print!("{}", SolutionFormatter::format_paths(problem.puzzle(), solution));
    }
    for violation in &outcome.violations {
        println!("{}", ColorOutput::error(violation));
    }
    println!("Solve time: {:.3}s", outcome.solve_time().as_secs_f64());

    if save {
        SolutionFormatter::save_solutions(
            &outcome.solutions,
            &settings.output.output_directory,
            settings.output.format,
            |solution| SolutionFormatter::format_numberlink(problem.puzzle(), Some(solution)),
        )
        .context("Failed to save solutions")?;
        println!(
            "{}",
            ColorOutput::success(&format!("Solutions saved to {}", settings.output.output_directory.display()))
        );
    }

    log::debug!("{}", problem.encoding().formula.statistics());
    Ok(())
}

fn decode_command(meaning: PathBuf, result: PathBuf) -> Result<()> {
    let decoded = decode_offline(&meaning, &result)?;

    if !decoded.satisfiable {
        println!("{}", ColorOutput::warning("UNSATISFIABLE"));
        return Ok(());
    }

    println!("{}", ColorOutput::success("SATISFIABLE"));
    match decoded.sudoku_grid() {
        Some(grid) => println!("{}", SolutionFormatter::format_sudoku(&grid)),
        None => {
            for name in &decoded.true_names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

fn batch_command(directory: PathBuf, config_path: PathBuf, threads: Option<usize>) -> Result<()> {
    let overrides = CliOverrides {
        threads,
        ..Default::default()
    };
    let settings = load_settings(&config_path, &overrides)?;

    println!("{}", ColorOutput::info(&format!("Solving puzzles in {}", directory.display())));
    let start_time = Instant::now();
    let entries = solve_batch(&directory, &settings)?;

    println!("{}", SolutionFormatter::format_batch_summary(&entries));
    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    let summary = format!(
        "{} file(s) in {:.3}s, {} failed",
        entries.len(),
        start_time.elapsed().as_secs_f64(),
        failed
    );
    if failed == 0 {
        println!("{}", ColorOutput::success(&summary));
    } else {
        println!("{}", ColorOutput::warning(&summary));
    }
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let puzzle_dir = directory.join("puzzles");
    let output_dir = directory.join("output/solutions");

    for dir in [&config_dir, &puzzle_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_puzzles(&puzzle_dir).context("Failed to create example puzzles")?;
    println!("Created example puzzles in: {}", puzzle_dir.display());

    let presets_dir = config_dir.join("presets");
    std::fs::create_dir_all(&presets_dir)?;

    let mut pruned = Settings::default();
    pruned.encoding.u_shape = true;
    pruned.encoding.u_shape_long = true;
    pruned.to_file(&presets_dir.join("pruned.yaml"))?;

    let mut enumerate = Settings::default();
    enumerate.solver.max_solutions = 10;
    enumerate.solver.track_core = false;
    enumerate.output.format = OutputFormat::Json;
    enumerate.to_file(&presets_dir.join("enumerate.yaml"))?;

    println!("Created preset configurations in: {}", presets_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- sudoku {}", puzzle_dir.join("classic.sudoku").display());
    println!("3. Run: cargo run -- numberlink -C u-shape {}", puzzle_dir.join("three_lines.nl").display());

    Ok(())
}
