use std::io;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use itchcast_core::transport::multicast::{DEFAULT_GROUP, DEFAULT_PORT, DEFAULT_TTL};
use itchcast_core::{
    DecoderConfig, JsonLinesSink, ListenOptions, MessageFilter, MessageSink, MulticastConfig,
    MulticastReceiver, MulticastSender, ReplayOptions, StopFlag, TextSink, TimestampWidth,
    decode_source, listen, open_capture, replay,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "itchcast")]
#[command(version)]
#[command(
    about = "Decode an ITCH market-data feed from UDP multicast, or replay a recorded feed onto a group.",
    long_about = None,
    after_help = "Examples:\n  itchcast listen --stock AAPL --stock MSFT\n  itchcast replay data/01302019.NASDAQ_ITCH50 --pacing-us 100\n  itchcast decode capture.pcapng --udp-port 12345 --json"
)]
struct Cli {
    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Join the multicast group and print decoded messages.
    Listen {
        #[command(flatten)]
        net: NetworkArgs,

        #[command(flatten)]
        output: DecodeArgs,

        /// Log throughput every N delivered messages (0 disables)
        #[arg(long, default_value_t = 1000)]
        stats_interval: u64,
    },
    /// Send a recorded feed to the multicast group, one record per datagram.
    Replay {
        /// Raw length-prefixed capture, or a .pcap/.pcapng file
        input: PathBuf,

        #[command(flatten)]
        net: NetworkArgs,

        /// Multicast TTL
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u32,

        /// Pause between datagrams, in microseconds
        #[arg(long, default_value_t = 100)]
        pacing_us: u64,

        /// Stop after this many records
        #[arg(long)]
        max_records: Option<u64>,

        /// For .pcap/.pcapng inputs, only replay datagrams sent to this port
        #[arg(long)]
        udp_port: Option<u16>,
    },
    /// Decode a recorded feed offline, without touching the network.
    Decode {
        /// Raw length-prefixed capture, or a .pcap/.pcapng file
        input: PathBuf,

        #[command(flatten)]
        output: DecodeArgs,

        /// For .pcap/.pcapng inputs, only decode datagrams sent to this port
        #[arg(long)]
        udp_port: Option<u16>,
    },
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// Multicast group address
    #[arg(long, env = "ITCHCAST_GROUP", default_value_t = DEFAULT_GROUP)]
    group: Ipv4Addr,

    /// Multicast port
    #[arg(long, env = "ITCHCAST_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Local interface address used for the group
    #[arg(long, env = "ITCHCAST_INTERFACE", default_value_t = Ipv4Addr::UNSPECIFIED)]
    interface: Ipv4Addr,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Only show messages for this stock symbol (repeatable)
    #[arg(long = "stock", value_name = "SYMBOL")]
    stocks: Vec<String>,

    /// Only show this message type tag, e.g. A or P (repeatable)
    #[arg(long = "type", value_name = "TAG", value_parser = parse_tag)]
    types: Vec<u8>,

    /// Stop after this many displayed messages
    #[arg(long)]
    max_messages: Option<u64>,

    /// Print each raw frame as hex
    #[arg(long)]
    show_raw: bool,

    /// Write one JSON object per message instead of text
    #[arg(long)]
    json: bool,

    /// Width of the timestamp field in bytes (6 or 8)
    #[arg(long, default_value = "8", value_parser = parse_timestamp_width)]
    timestamp_width: TimestampWidth,
}

impl NetworkArgs {
    fn config(&self) -> MulticastConfig {
        MulticastConfig {
            group: self.group,
            port: self.port,
            interface: self.interface,
            ..MulticastConfig::default()
        }
    }
}

impl DecodeArgs {
    fn options(&self, stats_interval: u64) -> ListenOptions {
        ListenOptions {
            decoder: DecoderConfig {
                timestamp_width: self.timestamp_width,
            },
            filter: MessageFilter::new()
                .with_stocks(&self.stocks)
                .with_tags(self.types.iter().copied()),
            max_messages: self.max_messages,
            stats_interval,
        }
    }

    fn sink(&self) -> Box<dyn MessageSink> {
        let out = io::stdout().lock();
        if self.json {
            Box::new(JsonLinesSink::new(out, self.show_raw))
        } else {
            Box::new(TextSink::new(out, self.show_raw))
        }
    }
}

fn parse_tag(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [tag] if tag.is_ascii_graphic() => Ok(*tag),
        _ => Err(format!("expected a single ASCII character, got '{value}'")),
    }
}

fn parse_timestamp_width(value: &str) -> Result<TimestampWidth, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(TimestampWidth::from_bytes)
        .ok_or_else(|| format!("expected 6 or 8, got '{value}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    let result = match cli.command {
        Commands::Listen {
            net,
            output,
            stats_interval,
        } => cmd_listen(&net, &output, stats_interval),
        Commands::Replay {
            input,
            net,
            ttl,
            pacing_us,
            max_records,
            udp_port,
        } => cmd_replay(&input, &net, ttl, pacing_us, max_records, udp_port),
        Commands::Decode {
            input,
            output,
            udp_port,
        } => cmd_decode(&input, &output, udp_port),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn install_stop_handler() -> Result<StopFlag, CliError> {
    let stop = StopFlag::new();
    let handle = stop.clone();
    ctrlc::set_handler(move || handle.stop()).context("failed to install Ctrl+C handler")?;
    Ok(stop)
}

fn cmd_listen(net: &NetworkArgs, output: &DecodeArgs, stats_interval: u64) -> Result<(), CliError> {
    let config = net.config();
    let mut receiver = MulticastReceiver::join(&config).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("check --group/--port/--interface and that multicast is routable here".to_string()),
        )
    })?;
    let stop = install_stop_handler()?;
    let mut sink = output.sink();

    listen(
        &mut receiver,
        sink.as_mut(),
        &output.options(stats_interval),
        &stop,
    )
    .context("listening failed")?;
    Ok(())
}

fn cmd_replay(
    input: &Path,
    net: &NetworkArgs,
    ttl: u32,
    pacing_us: u64,
    max_records: Option<u64>,
    udp_port: Option<u16>,
) -> Result<(), CliError> {
    validate_input_file(input)?;
    let mut source = open_capture(input, udp_port)
        .with_context(|| format!("Failed to open capture: {}", input.display()))?;
    let config = MulticastConfig {
        ttl,
        ..net.config()
    };
    let mut sender = MulticastSender::open(&config).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("check --group and --interface".to_string()),
        )
    })?;
    let stop = install_stop_handler()?;
    info!(input = %input.display(), "replaying capture");
    let options = ReplayOptions {
        pacing: Duration::from_micros(pacing_us),
        max_records,
    };

    replay(source.as_mut(), &mut sender, &options, &stop)
        .with_context(|| format!("Replay of {} failed", input.display()))?;
    Ok(())
}

fn cmd_decode(input: &Path, output: &DecodeArgs, udp_port: Option<u16>) -> Result<(), CliError> {
    validate_input_file(input)?;
    let mut source = open_capture(input, udp_port)
        .with_context(|| format!("Failed to open capture: {}", input.display()))?;
    let stop = install_stop_handler()?;
    let mut sink = output.sink();
    info!(input = %input.display(), "decoding capture");

    decode_source(source.as_mut(), sink.as_mut(), &output.options(0), &stop)
        .with_context(|| format!("Decoding {} failed", input.display()))?;
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a recorded feed (raw length-prefixed, .pcap or .pcapng)".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a recorded feed (raw length-prefixed, .pcap or .pcapng)".to_string()),
        ));
    }
    Ok(())
}
