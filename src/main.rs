mod logging;

use clap::{Parser, Subcommand};
use logging::LogFormat;
use qrchain::{
    BlockBuilder, Block, Chain, ChainError, EntropyConfig, EntropySource, NonceSource, QrngClient,
    Unavailable,
};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "qrchain",
    version,
    about = "Hash chain with quantum-sourced block nonces"
)]
struct Cli {
    /// Entropy provider endpoint
    #[arg(long, env = "QRCHAIN_ENTROPY_URL", default_value = qrchain::config::DEFAULT_ENTROPY_URL)]
    entropy_url: String,

    /// Seconds to wait for the entropy provider before falling back
    #[arg(long, env = "QRCHAIN_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Never contact the provider; every nonce is time-derived
    #[arg(long, env = "QRCHAIN_OFFLINE")]
    offline: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a new genesis block
    Genesis,
    /// Build a chain: genesis plus one block per DATA argument
    Build {
        #[arg(required = true)]
        data: Vec<String>,
    },
    /// Verify a chain read from FILE (stdin when omitted)
    Verify { file: Option<PathBuf> },
    /// Fetch hex values from the entropy provider
    Nonce {
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },
    /// Fetch byte values from the entropy provider
    Bytes {
        #[arg(short = 'n', long, default_value = "8")]
        count: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let result = entropy_source(&cli).and_then(|source| {
        let builder = BlockBuilder::new(source);
        match &cli.command {
            Commands::Genesis => cmd_genesis(&builder),
            Commands::Build { data } => cmd_build(&builder, data),
            Commands::Verify { file } => cmd_verify(file.as_ref()),
            Commands::Nonce { count } => cmd_nonce(builder.entropy(), *count),
            Commands::Bytes { count } => cmd_bytes(builder.entropy(), *count),
        }
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn entropy_source(cli: &Cli) -> Result<Box<dyn EntropySource>, ChainError> {
    if cli.offline {
        return Ok(Box::new(Unavailable));
    }
    let config = EntropyConfig::default()
        .with_base_url(cli.entropy_url.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    Ok(Box::new(QrngClient::new(config)?))
}

fn print_block_source(block: &Block, source: NonceSource) {
    if source == NonceSource::Fallback {
        eprintln!("warning: block {} uses a fallback nonce", block.index);
    }
}

fn cmd_genesis<S: EntropySource>(builder: &BlockBuilder<S>) -> Result<bool, ChainError> {
    let (block, source) = builder.mint(0, qrchain::builder::GENESIS_DATA, qrchain::block::GENESIS_PREV_HASH);
    print_block_source(&block, source);
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(true)
}

fn cmd_build<S: EntropySource>(builder: &BlockBuilder<S>, data: &[String]) -> Result<bool, ChainError> {
    let mut chain = Chain::new(builder);
    for item in data {
        let (block, source) = chain.append(builder, item);
        print_block_source(block, source);
    }
    chain.validate()?;
    println!("{}", serde_json::to_string_pretty(&chain)?);
    Ok(true)
}

fn cmd_verify(file: Option<&PathBuf>) -> Result<bool, ChainError> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    // Parse as plain blocks so a broken chain is reported, not rejected.
    let blocks: Vec<Block> = serde_json::from_str(&raw)?;
    match qrchain::validate_chain(&blocks) {
        Ok(()) => {
            println!("valid ({} blocks)", blocks.len());
            Ok(true)
        }
        Err(ChainError::Integrity { index, fault }) => {
            println!("invalid at block {}: {}", index, fault);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

fn cmd_nonce(source: &dyn EntropySource, count: usize) -> Result<bool, ChainError> {
    for value in source.fetch_hex_values(count)? {
        println!("{}", value);
    }
    Ok(true)
}

fn cmd_bytes(source: &dyn EntropySource, count: usize) -> Result<bool, ChainError> {
    let values = source.fetch_byte_values(count)?;
    let rendered: Vec<String> = values.iter().map(|b| b.to_string()).collect();
    println!("{}", rendered.join(" "));
    Ok(true)
}
