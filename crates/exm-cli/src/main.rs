use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod context;
mod output;
mod ui;

const LOGIN_HINT: &str = "not signed in or session expired; run `exm auth login --phone <phone> --code <code>`";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        if is_unauthorized(&error) {
            eprintln!("exm: {LOGIN_HINT}");
        } else {
            eprintln!("exm error: {error:#}");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let config = bootstrap::load_config()?;
    let ctx = context::AppContext::init(config, &flags).await?;
    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("EXAMIND_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// Any 401 anywhere in the chain gets the same login hint.
fn is_unauthorized(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<exm_api::ApiError>()
            .is_some_and(exm_api::ApiError::is_unauthorized)
            || cause
                .downcast_ref::<exm_http::HttpError>()
                .is_some_and(exm_http::HttpError::is_unauthorized)
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::is_unauthorized;

    #[test]
    fn unauthorized_is_found_under_context() {
        let error: anyhow::Result<()> = Err(exm_api::ApiError::Http(exm_http::HttpError::Unauthorized))
            .context("failed to list goals");
        assert!(is_unauthorized(&error.unwrap_err()));

        let other = anyhow::anyhow!("disk full");
        assert!(!is_unauthorized(&other));
    }
}
