use colored::*;
use env_logger::{Builder, Env, Target};
use log::{LevelFilter, info};
use std::fs;
use std::process::ExitCode;
use std::time::Instant;
use wordfind::{Cli, Parser, Result as WordfindResult, WordfindError, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = setup_logging(&cli) {
        eprintln!("{}", format!("Failed to set up logging: {e}").red());
        return ExitCode::FAILURE;
    }

    let start_time = Instant::now();
    info!("Application started with {cli:?}");

    let code = match run(&cli).await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            1
        }
    };

    info!(
        "Application finished. Total elapsed time: {:.2?}",
        start_time.elapsed()
    );
    ExitCode::from(code as u8)
}

fn setup_logging(cli: &Cli) -> WordfindResult<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Info);
    }

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| WordfindError::Other(e.to_string()))?;
    Ok(())
}
