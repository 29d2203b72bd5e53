use clap::Parser;
use fanlog::{Builder, ColorChoice, ConsoleStream, Level};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fanlog", about = "Structured logging demo: console, file and UDP fan-out")]
struct Args {
    /// Plain-text log file path
    #[arg(long, default_value = "test.log")]
    log_file: String,

    /// Remote collector address, host:port (JSON over UDP)
    #[arg(long)]
    remote: Option<String>,

    /// Disable console colors
    #[arg(long)]
    no_color: bool,

    /// Stamp timestamps in UTC instead of local time
    #[arg(long)]
    utc: bool,
}

fn main() -> ExitCode {
    match run() {
        Err(err) => {
            let root = err.root_cause();

            eprint!("\x1b[31m");
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("Caused by:");
            eprint!("  {}", root);
            eprintln!("\x1b[0m");
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::from(0),
    }
}

fn run() -> eyre::Result<()> {
    let args = Args::parse();

    let mut builder = Builder::new()
        .with_console(ConsoleStream::Stdout, Level::Debug)
        .with_file(&args.log_file, Level::Debug)
        .with_utc(args.utc);

    if args.no_color {
        builder = builder.with_color(ColorChoice::Never);
    }

    if let Some(remote) = &args.remote {
        let (host, port) = remote
            .rsplit_once(':')
            .ok_or_else(|| eyre::eyre!("Expected host:port, got {}", remote))?;
        let port: u16 = port
            .parse()
            .map_err(|_| eyre::eyre!("Invalid port in {}", remote))?;
        builder = builder.with_remote(host, port, Level::Info);
    }

    let logger = builder
        .build()?
        .named("fanlog.demo")
        .bind("execution_id", uuid::Uuid::new_v4().to_string());

    logger.info("Test Application {execution_id} started", &[]);
    logger.warning(
        "The product {product_id} is too big",
        &[("product_id", 987163.into())],
    );
    logger.flush();

    println!("Done!");
    Ok(())
}
