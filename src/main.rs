mod addresses;
mod bytes;
mod capture;
mod classify;
mod cli;
mod config;
mod error;
mod ethernet;
mod event_log;
mod ip;
mod logging;
mod monitor;
mod packet;
mod resolver;


use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use crate::capture::CaptureSession;
use crate::cli::Opts;
use crate::error::MonitorError;
use crate::event_log::EventLog;
use crate::monitor::Monitor;
use crate::resolver::DnsResolver;


// 128 + SIGINT, as shells report it
const EXIT_INTERRUPTED: i32 = 130;


#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();

    let _guard = match logging::init(opts.diagnostics_file.as_deref()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to open diagnostics file: {}", e);
            return ExitCode::FAILURE;
        },
    };

    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        },
    }
}


async fn run(opts: Opts) -> Result<(), MonitorError> {
    let adapters = capture::list_adapters()?;
    if opts.list_adapters {
        return cli::print_adapters(&adapters, &mut io::stdout())
            .map_err(MonitorError::Console);
    }

    let resolver = DnsResolver::from_system_conf()?;
    let cli::Setup { config, addresses, adapter } = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        cli::configure(&opts, adapters, &resolver, &mut input, &mut io::stdout()).await?
    };

    info!("targets {} on adapter #{}", config.targets.join(", "), config.adapter_index);
    let tracked: Vec<String> = addresses.sorted().iter().map(|a| a.to_string()).collect();
    println!("Monitoring adapter: {}", adapter.label());
    println!("Tracking {} addresses: {}", addresses.len(), tracked.join(", "));

    let log = EventLog::create(&config.log_path)?;
    info!("recording traffic to {}", log.path().display());

    let session = CaptureSession::open(&adapter, &config.capture)?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl+C: {}", e);
                return;
            }
            info!("interrupted; stopping capture (press Ctrl+C again to quit at once)");
            stop.store(true, Ordering::SeqCst);

            // every recorded event is already on disk
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted again; exiting without waiting for the capture to stop");
                std::process::exit(EXIT_INTERRUPTED);
            }
        });
    }
    println!("Press Ctrl+C to stop.\n");

    let monitor = Monitor::new(addresses, log);
    let frames = session.frames(stop);
    tokio::task::spawn_blocking(move || monitor.run(frames, &mut io::stdout()))
        .await
        .map_err(|e| MonitorError::Task(e.to_string()))?
}
