//! blocksim CLI
//!
//! Interactive disk allocation simulator. Reads one command per line from
//! stdin and prints the disk and allocation table as text.

use anyhow::{bail, Context};
use blocksim::validation::{parse_block_count, parse_disk_size};
use blocksim::{AllocationStrategy, Block, SimConfig, Simulation, SimulationBuilder};
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing::info;

/// Blocks per row in the disk grid
const GRID_WIDTH: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "blocksim")]
#[command(about = "Simulate contiguous, chained and indexed disk allocation")]
struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Number of blocks on the disk (overrides config)
    #[arg(short = 's', long)]
    size: Option<usize>,

    /// Allocation strategy: contiguous, chained, indexed (overrides config)
    #[arg(short = 'a', long, value_parser = parse_strategy)]
    strategy: Option<AllocationStrategy>,

    /// Seed for random placement (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Largest accepted disk size (overrides config)
    #[arg(long)]
    max_size: Option<usize>,
}

/// Parse allocation strategy from CLI string
fn parse_strategy(s: &str) -> Result<AllocationStrategy, String> {
    s.parse::<AllocationStrategy>().map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config from {:?}", path))?,
        None => SimConfig::default(),
    };

    let mut builder = SimulationBuilder::from_config(config);
    if let Some(size) = args.size {
        builder = builder.disk_size(size);
    }
    if let Some(max) = args.max_size {
        builder = builder.max_disk_size(max);
    }
    if let Some(strategy) = args.strategy {
        builder = builder.strategy(strategy);
    }
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }

    let mut sim = builder.build().context("failed to create simulation")?;
    info!("Simulation ready");

    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("{}", HELP);
    }

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            write!(out, "blocksim> ")?;
            out.flush()?;
        }

        let Some(line) = lines.next() else { break };
        let line = line.context("failed to read command")?;

        match run_command(&mut sim, line.trim(), &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }

    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

const HELP: &str = "\
Commands:
  init <size> [strategy]   reset the disk (strategy: contiguous, chained, indexed)
  strategy <name>          switch strategy for new files
  create <name> <blocks>   allocate a file
  delete <name>            delete a file
  show <name>              show a file's blocks (index block first)
  disk                     print the block grid
  table                    print the allocation table
  stats                    print usage statistics
  json                     print the full state as JSON
  help                     show this message
  quit                     exit";

fn run_command(sim: &mut Simulation, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    match parts.as_slice() {
        [] => {}
        ["init", size] | ["init", size, _] => {
            let size = parse_disk_size(size, sim.state().max_disk_size())?;
            let strategy = match parts.get(2) {
                Some(name) => name.parse::<AllocationStrategy>()?,
                None => sim.strategy(),
            };
            sim.initialize(size, strategy)?;
            writeln!(out, "disk initialized: {} blocks, {} allocation", size, strategy)?;
        }
        ["strategy", name] => {
            let strategy: AllocationStrategy = name.parse()?;
            sim.set_strategy(strategy);
            writeln!(out, "allocation strategy: {}", strategy)?;
        }
        ["create", name, blocks] => {
            let block_count = parse_block_count(blocks)?;
            let entry = sim.allocate(name, block_count)?;
            writeln!(out, "created {}", describe_blocks(&entry))?;
        }
        ["delete", name] => {
            let entry = sim.delete_file(name)?;
            writeln!(out, "deleted {} ({} block(s) freed)", entry.name, entry.block_count())?;
        }
        ["show", name] => {
            let blocks = sim.file_blocks(name)?;
            render_disk(sim, &blocks, out)?;
        }
        ["disk"] => render_disk(sim, &[], out)?,
        ["table"] => render_table(sim, out)?,
        ["stats"] => {
            let stats = sim.stats();
            writeln!(out, "strategy:          {}", stats.strategy)?;
            writeln!(out, "blocks:            {} total, {} used, {} free", stats.total_blocks, stats.used_blocks, stats.free_blocks)?;
            writeln!(out, "files:             {}", stats.file_count)?;
            writeln!(out, "largest free run:  {}", stats.largest_free_run)?;
            writeln!(out, "fragmentation:     {:.3}", stats.fragmentation)?;
        }
        ["json"] => {
            let json = serde_json::to_string_pretty(&sim.snapshot())?;
            writeln!(out, "{}", json)?;
        }
        ["help"] => writeln!(out, "{}", HELP)?,
        ["quit"] | ["exit"] => return Ok(Flow::Quit),
        [cmd, ..] => bail!("unknown command or wrong arguments: {} (try `help`)", cmd),
    }

    Ok(Flow::Continue)
}

/// One-line block list, e.g. `db: index 4 | 9 -> 2 -> 17`
fn describe_blocks(entry: &blocksim::FileEntry) -> String {
    let data = entry
        .data_blocks
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");

    match entry.index_block {
        Some(index) => format!("{}: index {} | {}", entry.name, index, data),
        None => format!("{}: {}", entry.name, data),
    }
}

/// Table position (1-based) of every file, used to tell grid cells apart
fn file_tags(sim: &Simulation) -> HashMap<&str, usize> {
    sim.table()
        .all()
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.name.as_str(), i + 1))
        .collect()
}

/// Print the block grid; `highlight` blocks are wrapped in `>` `<`
///
/// Owned cells read `tag:name`, where `tag` is the file's row in `table`.
fn render_disk(sim: &Simulation, highlight: &[usize], out: &mut impl Write) -> io::Result<()> {
    let tags = file_tags(sim);

    for (row, chunk) in sim.store().blocks().chunks(GRID_WIDTH).enumerate() {
        let cells: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, block)| {
                let index = row * GRID_WIDTH + col;
                let label = match block {
                    Block::Free => String::new(),
                    Block::Owned { owner, .. } => {
                        let tag = tags.get(owner.as_str()).copied().unwrap_or(0);
                        let short: String = owner.chars().take(4).collect();
                        let marker = if block.is_index() { "*" } else { "" };
                        format!("{}:{}{}", tag, short, marker)
                    }
                };
                let (open, close) = if highlight.contains(&index) {
                    ('>', '<')
                } else {
                    ('[', ']')
                };
                format!("{}{:>3} {:<9}{}", open, index, label, close)
            })
            .collect();
        writeln!(out, "{}", cells.join(" "))?;
    }
    Ok(())
}

fn render_table(sim: &Simulation, out: &mut impl Write) -> io::Result<()> {
    if sim.table().is_empty() {
        return writeln!(out, "(no files)");
    }

    for (i, entry) in sim.table().all().iter().enumerate() {
        writeln!(
            out,
            "{:>3} {:<10} {:<10} {}",
            i + 1,
            entry.name,
            entry.strategy,
            describe_blocks(entry)
        )?;

        if entry.strategy == AllocationStrategy::Chained {
            let pointers = entry
                .data_blocks
                .iter()
                .map(|&b| match sim.store().get(b).and_then(Block::next) {
                    Some(next) => format!("{}->{}", b, next),
                    None => format!("{}->nil", b),
                })
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "{:<25} next: {}", "", pointers)?;
        }
    }
    Ok(())
}
