use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for palette-display")]
struct Cli {
    /// Build without the `window` feature (no display server needed)
    #[arg(long, global = true)]
    headless: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy, then the test suite in debug and release
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Run tests
    Test {
        /// Restrict to one area of the crate
        #[arg(long, value_enum)]
        only: Option<Area>,
        /// Also run in release mode, where per-caller lock tracking is compiled out
        #[arg(long)]
        release: bool,
    },
    /// Run criterion benchmarks
    Bench {
        #[arg(value_enum)]
        bench: Option<BenchTarget>,
    },
    /// Run the windowed demo
    Demo {
        /// Configuration file (defaults to display_config.toml)
        #[arg(short, long)]
        config: Option<String>,
        /// Log filter passed as RUST_LOG
        #[arg(long, default_value = "info")]
        log: String,
        #[arg(long)]
        release: bool,
    },
}

/// Test areas: library module plus the integration targets covering it
#[derive(Clone, Copy, ValueEnum)]
enum Area {
    Session,
    Palette,
    Surface,
}

impl Area {
    fn module(self) -> &'static str {
        match self {
            Area::Session => "session",
            Area::Palette => "palette",
            Area::Surface => "surface",
        }
    }

    fn targets(self) -> &'static [&'static str] {
        match self {
            Area::Session => &["frame_lock_tests", "lifecycle_tests"],
            Area::Palette => &["palette_tests"],
            Area::Surface => &["present_tests"],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BenchTarget {
    Blit,
    Lock,
}

/// Cargo invocation carrying the feature selection for this machine
struct Cargo {
    headless: bool,
}

impl Cargo {
    fn new(headless: bool) -> Self {
        // CI runners have no display server
        Self {
            headless: headless || std::env::var_os("CI").is_some(),
        }
    }

    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new("cargo");
        cmd.arg(subcommand);
        if self.headless {
            cmd.arg("--no-default-features");
        } else {
            cmd.arg("--all-features");
        }
        cmd
    }

    fn fmt(&self, check: bool) -> Result<()> {
        let mut cmd = Command::new("cargo");
        cmd.args(["fmt", "--all"]);
        if check {
            cmd.args(["--", "--check"]);
        }
        run(cmd)
    }

    fn clippy(&self, fix: bool) -> Result<()> {
        let mut cmd = self.cmd("clippy");
        cmd.arg("--all-targets");
        if fix {
            cmd.arg("--fix");
        } else {
            cmd.args(["--", "-D", "warnings"]);
        }
        run(cmd)
    }

    fn test(&self, only: Option<Area>, release: bool) -> Result<()> {
        let profile = |cmd: &mut Command| {
            if release {
                cmd.arg("--release");
            }
        };

        let Some(area) = only else {
            let mut cmd = self.cmd("test");
            profile(&mut cmd);
            return run(cmd);
        };

        let mut lib = self.cmd("test");
        profile(&mut lib);
        lib.args(["--lib", area.module()]);
        run(lib)?;

        let mut integration = self.cmd("test");
        profile(&mut integration);
        for target in area.targets() {
            integration.args(["--test", target]);
        }
        run(integration)
    }

    fn bench(&self, bench: Option<BenchTarget>) -> Result<()> {
        let mut cmd = self.cmd("bench");
        match bench {
            Some(BenchTarget::Blit) => cmd.args(["--bench", "blit_bench"]),
            Some(BenchTarget::Lock) => cmd.args(["--bench", "lock_bench"]),
            None => &mut cmd,
        };
        run(cmd)
    }

    fn demo(&self, config: Option<&str>, log: &str, release: bool) -> Result<()> {
        if self.headless {
            bail!("The demo needs the window feature; drop --headless");
        }

        if let Some(path) = config {
            if Path::new(path).exists() {
                println!("{} Config file: {}", "✓".green(), path.cyan());
            } else {
                println!(
                    "{} {} not found, defaults will be written there",
                    "⚠".yellow().bold(),
                    path.yellow()
                );
            }
        }
        println!("{} RUST_LOG={}", "→".blue(), log.bold());
        println!("{} Keys: F5 reinit, Esc quit", "ℹ".blue());

        let mut cmd = Command::new("cargo");
        cmd.arg("run").env("RUST_LOG", log);
        if release {
            cmd.arg("--release");
        }
        if let Some(path) = config {
            cmd.arg("--").arg(path);
        }

        // Exit status 1 means a frame lock violation was reported
        run(cmd)
    }
}

fn run(mut cmd: Command) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        bail!("{:?} failed: {}", cmd, status);
    }
    Ok(())
}

fn ci(cargo: &Cargo) -> Result<()> {
    println!("{}", "=== CI ===".bold().blue());
    let start = Instant::now();

    let stages: [(&str, &dyn Fn() -> Result<()>); 4] = [
        ("fmt", &|| cargo.fmt(true)),
        ("clippy", &|| cargo.clippy(false)),
        ("test (debug, lock tracking on)", &|| cargo.test(None, false)),
        ("test (release, lock tracking off)", &|| {
            cargo.test(None, true)
        }),
    ];

    for (name, stage) in stages {
        println!("{} {}", "→".blue(), name.bold());
        if let Err(e) = stage() {
            println!("{} {}", "✗".red().bold(), name);
            return Err(e);
        }
    }

    println!(
        "\n{} {:.2}s",
        "✓ CI passed in".green().bold(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cargo = Cargo::new(cli.headless);

    match cli.command {
        Commands::Ci => ci(&cargo),
        Commands::Fmt { check } => cargo.fmt(check),
        Commands::Clippy { fix } => cargo.clippy(fix),
        Commands::Test { only, release } => {
            cargo.test(only, false)?;
            if release {
                cargo.test(only, true)?;
            }
            Ok(())
        }
        Commands::Bench { bench } => cargo.bench(bench),
        Commands::Demo {
            config,
            log,
            release,
        } => cargo.demo(config.as_deref(), &log, release),
    }
}
