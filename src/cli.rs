use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::addresses::TrackedAddresses;
use crate::capture::{self, Adapter};
use crate::config::{
    CaptureSettings, DEFAULT_LOG_PATH, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SNAPSHOT_LENGTH, MonitorConfig,
};
use crate::error::MonitorError;
use crate::resolver::HostResolver;


#[derive(Debug, Parser)]
#[clap(version, about = "Records traffic exchanged with a set of hosts")]
pub struct Opts {
    /// Number of the adapter to capture on; asked for if not given.
    pub interface_index: Option<usize>,

    /// Comma-separated IP addresses or hostnames to track; asked for if not given.
    #[clap(short, long)]
    pub targets: Option<String>,

    /// Where to write the traffic report. Existing content is replaced.
    #[clap(short, long, default_value = DEFAULT_LOG_PATH)]
    pub output: PathBuf,

    /// Bytes to capture per packet.
    #[clap(long, default_value_t = DEFAULT_SNAPSHOT_LENGTH)]
    pub snaplen: i32,

    /// Put the adapter into promiscuous mode.
    #[clap(long)]
    pub promiscuous: bool,

    /// Milliseconds libpcap may wait before handing over packets; Ctrl+C is noticed at least
    /// this often. Must be positive, as zero would block until the next packet.
    #[clap(
        long,
        value_parser = clap::value_parser!(i32).range(1..),
        default_value_t = DEFAULT_READ_TIMEOUT_MS,
    )]
    pub read_timeout_ms: i32,

    /// Print the available adapters and exit.
    #[clap(long)]
    pub list_adapters: bool,

    /// Also write diagnostics to this file.
    #[clap(long)]
    pub diagnostics_file: Option<PathBuf>,
}


/// Splits comma-separated user input into trimmed, non-empty entries.
pub fn parse_targets(input: &str) -> Vec<String> {
    input.split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.to_owned())
        .collect()
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String, MonitorError> {
    let mut line = String::new();
    input.read_line(&mut line)
        .map_err(MonitorError::Console)?;
    Ok(line)
}

pub fn prompt_targets<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Vec<String>, MonitorError> {
    writeln!(output, "Enter IP addresses or hostnames to monitor (comma-separated):")
        .map_err(MonitorError::Console)?;
    output.flush().map_err(MonitorError::Console)?;
    Ok(parse_targets(&read_line(input)?))
}

pub fn print_adapters<W: Write>(adapters: &[Adapter], output: &mut W) -> io::Result<()> {
    writeln!(output, "Available network adapters:")?;
    for (i, adapter) in adapters.iter().enumerate() {
        writeln!(output, "{}: {}", i, adapter.label())?;
    }
    Ok(())
}

pub fn prompt_adapter_index<R: BufRead, W: Write>(
    adapters: &[Adapter],
    input: &mut R,
    output: &mut W,
) -> Result<usize, MonitorError> {
    print_adapters(adapters, output)
        .and_then(|()| write!(output, "\nEnter the number of the adapter to monitor: "))
        .and_then(|()| output.flush())
        .map_err(MonitorError::Console)?;

    let line = read_line(input)?;
    let choice = line.trim();
    choice.parse()
        .map_err(|_| MonitorError::AdapterChoice(choice.to_owned()))
}

/// What startup settles on before capturing.
#[derive(Debug)]
pub struct Setup {
    pub config: MonitorConfig,
    pub addresses: TrackedAddresses,
    pub adapter: Adapter,
}

/// Gathers the configuration from the command line, prompting for anything left out.
///
/// Targets are resolved before the adapter is asked for, so a session with nothing to track
/// fails without any further questions.
pub async fn configure<H, R, W>(
    opts: &Opts,
    adapters: Vec<Adapter>,
    resolver: &H,
    input: &mut R,
    output: &mut W,
) -> Result<Setup, MonitorError>
    where
        H: HostResolver,
        R: BufRead,
        W: Write,
{
    let targets = match &opts.targets {
        Some(t) => parse_targets(t),
        None => prompt_targets(input, output)?,
    };
    let addresses = TrackedAddresses::from_targets(&targets, resolver).await?;

    let adapter_index = match opts.interface_index {
        Some(ii) => ii,
        None => prompt_adapter_index(&adapters, input, output)?,
    };
    let adapter = capture::select_adapter(adapters, adapter_index)?;

    let config = MonitorConfig {
        targets,
        adapter_index,
        log_path: opts.output.clone(),
        capture: CaptureSettings {
            snapshot_length: opts.snaplen,
            promiscuous: opts.promiscuous,
            read_timeout_ms: opts.read_timeout_ms,
        },
    };
    Ok(Setup { config, addresses, adapter })
}
