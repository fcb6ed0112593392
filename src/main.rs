//! CLI entry point for themer.

mod cli;

use clap::Parser;
use themer::build_info;
use themer::config::{default_config_template, load_config_with_source};
use themer::service::ThemeService;
use themer::worker::{ThemeContext, ThemeRequest, WorkerEvent, WorkerEventStream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();

    if let cli::Command::Config { template: true } = args.command {
        print!("{}", default_config_template());
        return;
    }

    let (config, source) = match load_config_with_source(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    if let cli::Command::Config { .. } = args.command {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    info!(
        build = %build_info::startup_metadata_line(),
        config = ?source,
        theme_dir = %config.paths.theme_dir.display(),
        "themer starting"
    );

    let ctx = ThemeContext::from_config(&config);
    ctx.store.ensure_layout();
    let (service, events) = ThemeService::start(ctx);

    match args.command.one_shot_request() {
        Some(request) => {
            let failures = run_one_shot(service, events, request).await;
            if failures > 0 {
                std::process::exit(1);
            }
        }
        None => serve(service, events).await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("THEMER_LOG")
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Submit one request and wait for it. Returns the number of failed steps.
async fn run_one_shot(
    service: ThemeService,
    mut events: WorkerEventStream,
    request: ThemeRequest,
) -> usize {
    let Some(id) = service.enqueue(request) else {
        return 1;
    };
    drop(service);

    while let Some(envelope) = events.recv().await {
        if let WorkerEvent::RequestFinished {
            request_id,
            failures,
        } = envelope.event
        {
            if request_id == id {
                return failures;
            }
        }
    }
    error!(request_id = id, "worker stopped before the request finished");
    1
}

/// Stdin IPC stub: one JSON request per line in, one JSON event per line out.
/// Returns once stdin closes and the queue has drained.
async fn serve(service: ThemeService, mut events: WorkerEventStream) {
    let printer = tokio::spawn(async move {
        while let Some(envelope) = events.recv().await {
            match serde_json::to_string(&envelope) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "failed to encode worker event"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_request_line(&line) {
                Some(Ok(request)) => {
                    service.enqueue(request);
                }
                Some(Err(e)) => warn!(error = %e, "ignoring malformed request"),
                None => {}
            },
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "failed to read requests from stdin");
                break;
            }
        }
    }

    drop(service);
    let _ = printer.await;
}

fn parse_request_line(line: &str) -> Option<Result<ThemeRequest, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use themer::worker::ThemeSection;

    #[test]
    fn request_lines_parse_and_blank_lines_are_skipped() {
        assert!(parse_request_line("   ").is_none());
        let parsed = parse_request_line(r#" {"kind":"apply_section","section":"mms"} "#)
            .expect("non-empty")
            .expect("valid");
        assert_eq!(
            parsed,
            ThemeRequest::ApplySection {
                section: ThemeSection::Mms
            }
        );
        assert!(parse_request_line(r#"{"kind":"reboot"}"#)
            .expect("non-empty")
            .is_err());
    }
}
