mod browser;
mod display;

use anyhow::Context;
use passtally::{GitHub, parse_args, run_report};

use crate::display::display_report;

fn handle_clap_help_version(clap_err: &clap::Error) -> ! {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            std::process::exit(0);
        }
        _ => {
            eprint!("{clap_err}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let spec = match parse_args(std::env::args()) {
        Ok(spec) => spec,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                handle_clap_help_version(clap_err);
            } else {
                return Err(err);
            }
        }
    };

    let github = GitHub::connect()?;
    let report = run_report(&spec, &github).await?;

    let mut stdout = std::io::stdout();
    display_report(&report, spec.quiet, &mut stdout)?;

    if let Some(target) = &spec.open {
        let links = report
            .links_for(target)
            .with_context(|| format!("No result set for open target {target:?}"))?;
        browser::open_urls(&links)?;
    }

    Ok(())
}
