use clap::Parser;
use song_rewriter::cli::{self, Cli, OUTPUT_HEADER, USAGE_HINT};
use song_rewriter::logging::{init_tracing, log_warn};
use song_rewriter::{
    call_site, CallSite, CliState, LockScope, LogQuery, LogWriter, RewriteError, Settings,
    SongRewriter,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing("song_rewriter=warn");

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.version {
        println!("{}", cli::version_text());
        return Ok(ExitCode::SUCCESS);
    }

    let state_path = CliState::default_path();
    let mut state = CliState::load(&state_path);
    let banner_changed = state.apply_banner_flags(cli.no_banner, cli.show_banner);
    let first_run = state.first_run;

    if state.show_banner {
        println!("{}", cli::banner());
    }
    if first_run {
        println!("{}", cli::welcome());
        state.first_run = false;
    }
    if banner_changed || first_run {
        if let Err(e) = state.save(&state_path) {
            log_warn!(path = %state_path.display(), error = %e, "Failed to save CLI state");
        }
    }

    let mut settings = Settings::from_env();
    if let Some(dir) = cli.log_dir.clone() {
        settings.log.dir = dir;
    }
    let writer = LogWriter::new(settings.log.clone(), LockScope::PerPath);

    if cli.show_logs {
        show_logs(&writer, &cli)?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(source) = cli.lyrics_source() else {
        println!("{USAGE_HINT}");
        return Ok(ExitCode::SUCCESS);
    };

    let rewriter = match SongRewriter::from_settings(&settings) {
        Ok(rewriter) => rewriter,
        Err(e) => return Ok(report(&writer, &e, call_site!())),
    };

    match rewriter.rewrite(&source, cli.mode).await {
        Ok(rewrite) => {
            println!("{OUTPUT_HEADER}");
            println!("{}", rewrite.transformed);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(&writer, &e, call_site!())),
    }
}

/// Persist the failure and print the user-facing message.
fn report(writer: &LogWriter, error: &RewriteError, site: CallSite) -> ExitCode {
    writer.record_failure(error, site);
    println!("Error: {}", error.user_message());
    ExitCode::FAILURE
}

fn show_logs(writer: &LogWriter, cli: &Cli) -> anyhow::Result<()> {
    let mut query = LogQuery::default();
    if let Some(level) = cli.log_level {
        query = query.level(level);
    }

    let entries = writer.read(&query)?;
    println!(
        "{}",
        cli::log_listing_header(&writer.path(), writer.target().format)
    );
    if entries.is_empty() {
        println!("No matching entries.");
    }
    for entry in entries {
        println!(
            "[{}] {} {} {}/{}: {}",
            entry.timestamp, entry.level, entry.code, entry.category, entry.subtype, entry.message
        );
    }
    Ok(())
}
