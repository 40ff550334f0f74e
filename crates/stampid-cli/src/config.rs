use anyhow::bail;
use clap::{Parser, Subcommand};
use stampid::DEFAULT_MAX_ATTEMPTS;

/// Runtime configuration for the `stampid` binary.
///
/// Values are parsed from CLI arguments or environment variables (a `.env`
/// file is loaded first), then validated into a [`Config`].
#[derive(Parser, Debug, Clone)]
#[command(
    name = "stampid",
    version,
    about = "Mint and decode prefixed, date-stamped identifiers"
)]
pub struct CliArgs {
    /// Seed for the node identity stamped into every identifier.
    ///
    /// Reduced modulo 10 000. Processes sharing a node can mint colliding
    /// identifiers, so give every process its own seed. Defaults to the
    /// process id.
    ///
    /// Environment variable: `STAMPID_NODE`
    #[arg(long, env = "STAMPID_NODE")]
    pub node: Option<u64>,

    /// Maximum candidates drawn per constrained identifier before giving up.
    ///
    /// Environment variable: `STAMPID_MAX_ATTEMPTS`
    #[arg(long, env = "STAMPID_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: usize,

    /// Only emit identifiers whose text hashes into this partition.
    ///
    /// Requires `--partitions`.
    ///
    /// Environment variable: `STAMPID_PARTITION`
    #[arg(long, env = "STAMPID_PARTITION")]
    pub partition: Option<u32>,

    /// Total number of partitions the identifier space is split into.
    ///
    /// Environment variable: `STAMPID_PARTITIONS`
    #[arg(long, env = "STAMPID_PARTITIONS")]
    pub partitions: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Mint identifiers, one per line.
    Generate {
        /// Prefix of every identifier.
        ///
        /// Environment variable: `STAMPID_PREFIX`
        #[arg(short, long, env = "STAMPID_PREFIX", default_value = "ID")]
        prefix: String,

        /// Number of identifiers to mint.
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },
    /// Decode an identifier and print its fields as JSON.
    Parse {
        /// The identifier to decode.
        id: String,
    },
}

/// Target shard of constrained generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioning {
    pub partition: u32,
    pub partitions: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node_seed: u64,
    pub max_attempts: usize,
    pub partitioning: Option<Partitioning>,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_attempts == 0 {
            bail!("STAMPID_MAX_ATTEMPTS must be greater than 0");
        }

        let partitioning = match (args.partition, args.partitions) {
            (None, None) => None,
            (Some(_), None) | (None, Some(_)) => {
                bail!("STAMPID_PARTITION and STAMPID_PARTITIONS must be set together")
            }
            (Some(_), Some(0)) => bail!("STAMPID_PARTITIONS must be greater than 0"),
            (Some(partition), Some(partitions)) if partition >= partitions => {
                bail!(
                    "STAMPID_PARTITION ({}) must be below STAMPID_PARTITIONS ({})",
                    partition,
                    partitions
                );
            }
            (Some(partition), Some(partitions)) => Some(Partitioning {
                partition,
                partitions,
            }),
        };

        if let Command::Generate { prefix, .. } = &args.command {
            if prefix.is_empty() {
                bail!("STAMPID_PREFIX must not be empty");
            }
        }

        Ok(Self {
            node_seed: args.node.unwrap_or_else(|| u64::from(std::process::id())),
            max_attempts: args.max_attempts,
            partitioning,
            command: args.command,
        })
    }
}
