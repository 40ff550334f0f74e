#![doc = include_str!("../README.md")]

mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use anyhow::Context;
use clap::Parser;
use config::{CliArgs, Command, Config, Partitioning};
use serde::Serialize;
use stampid::{Constraint, Id, IdGenerator, JavaHashPartitioner, PartitionConstraint};
use telemetry::init_telemetry;

/// JSON view of a decoded identifier.
#[derive(Serialize)]
struct Decoded<'a> {
    id: &'a Id,
    prefix: &'a str,
    generated_at: String,
    node: u16,
    sequence: u16,
}

impl<'a> From<&'a Id> for Decoded<'a> {
    fn from(id: &'a Id) -> Self {
        Self {
            id,
            prefix: id.prefix(),
            generated_at: id
                .generated_at()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            node: id.node().get(),
            sequence: id.sequence(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = Config::try_from(args)?;

    init_telemetry()?;

    match &config.command {
        Command::Generate { prefix, count } => generate(&config, prefix, *count),
        Command::Parse { id } => parse(id),
    }
}

fn generate(config: &Config, prefix: &str, count: usize) -> anyhow::Result<()> {
    let generator = IdGenerator::new().with_max_attempts(config.max_attempts);
    let node = generator.initialize(config.node_seed);
    tracing::info!(%node, count, "minting identifiers");

    let partition = config
        .partitioning
        .map(|Partitioning { partition, partitions }| {
            JavaHashPartitioner::new(partitions)
                .and_then(|p| PartitionConstraint::new(partition, p))
                .context("invalid partitioning")
        })
        .transpose()?;
    let constraints: Vec<&dyn Constraint> = partition
        .iter()
        .map(|c| c as &dyn Constraint)
        .collect();

    let mut out = BufWriter::new(io::stdout().lock());
    for _ in 0..count {
        let id = if constraints.is_empty() {
            generator.generate(prefix)?
        } else {
            generator
                .generate_with_constraints(prefix, &constraints, true)?
                .with_context(|| {
                    format!(
                        "no identifier satisfied the constraints within {} attempts",
                        generator.max_attempts()
                    )
                })?
        };
        writeln!(out, "{id}")?;
    }
    out.flush()?;
    Ok(())
}

fn parse(text: &str) -> anyhow::Result<()> {
    let id: Id = text
        .parse()
        .with_context(|| format!("malformed identifier `{text}`"))?;
    let json = serde_json::to_string_pretty(&Decoded::from(&id))?;
    println!("{json}");
    Ok(())
}
