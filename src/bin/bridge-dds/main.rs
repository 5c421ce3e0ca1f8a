//! bridge-dds - Double-dummy tables for PBN files
//!
//! Reads PBN text, solves every `[Deal "..."]` and writes the block back
//! with fresh double-dummy tags:
//! - DoubleDummyTricks (compact encoding)
//! - OptimumResultTable (full table)
//!
//! Lines holding a bare deal (`N:AKQ.. ...`) print a trick table instead.
//! With `--lead` the opening leads of the first deal are listed with their
//! scores.
//!
//! Usage: bridge-dds [--input <file.pbn>] [--output <file.pbn>]

use bridge_dds::types::{char_to_seat, char_to_suit, seat_name, suit_name};
use bridge_dds::{
    calc_all_tables, DdTable, Deal, Hands, Seat, SolveSlot, SolverConfig, TtKind, NOTRUMP,
    TABLE_DECLARERS, TABLE_STRAINS,
};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bridge-dds")]
#[command(about = "Double-dummy solver for PBN files")]
#[command(version)]
struct Args {
    /// Input PBN file (stdin when omitted)
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Output file (if not specified, writes to stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Worker threads (0 = one per core)
    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Transposition table kind: small or large
    #[arg(long = "tt")]
    tt: Option<TtKind>,

    /// Table memory per worker in MB
    #[arg(short = 'm', long = "memory")]
    memory: Option<usize>,

    /// Log filter such as "info" or "bridge_dds=debug"; RUST_LOG wins when set
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,

    /// List every opening lead of the first deal for this leader (N/E/S/W)
    #[arg(long = "lead", value_parser = parse_seat)]
    lead: Option<Seat>,

    /// Strain for --lead (S/H/D/C/N)
    #[arg(long = "trump", value_parser = parse_strain, default_value = "N")]
    trump: usize,
}

fn parse_seat(s: &str) -> Result<Seat, String> {
    s.chars()
        .next()
        .and_then(char_to_seat)
        .ok_or_else(|| format!("not a seat: {s:?}"))
}

fn parse_strain(s: &str) -> Result<usize, String> {
    s.chars()
        .next()
        .and_then(char_to_suit)
        .ok_or_else(|| format!("not a strain: {s:?}"))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn config_from_args(args: &Args) -> Result<SolverConfig, String> {
    let mut config = SolverConfig::from_env_with_kind(args.tt).map_err(|e| e.to_string())?;
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(mb) = args.memory {
        config.memory_default_mb = mb;
        config.memory_max_mb = config.memory_max_mb.max(mb);
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match config_from_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error in configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let content = match read_input(args.input.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.lead {
        Some(leader) => list_leads(&content, leader, args.trump, &config),
        None => process_pbn(&content, &config),
    };
    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let written = match &args.output {
        Some(path) => fs::write(path, &result),
        None => io::stdout().write_all(result.as_bytes()),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

/// One piece of the input: a tag block, or a bare deal line
enum Block<'a> {
    Tags(Vec<&'a str>),
    Bare(&'a str),
}

/// Split into blocks separated by blank lines outside of brace comments.
/// Blank lines are kept as their own tag blocks so the output round-trips.
fn split_blocks(content: &str) -> Vec<Block<'_>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].trim().is_empty() {
            blocks.push(Block::Tags(vec![lines[i]]));
            i += 1;
            continue;
        }

        if is_bare_deal_line(lines[i]) {
            blocks.push(Block::Bare(lines[i]));
            i += 1;
            continue;
        }

        // Braces don't nest in PBN
        let start = i;
        let mut in_brace_comment = false;
        while i < lines.len() {
            for ch in lines[i].chars() {
                if ch == '{' {
                    in_brace_comment = true;
                } else if ch == '}' {
                    in_brace_comment = false;
                }
            }
            i += 1;
            if i < lines.len() && lines[i].trim().is_empty() && !in_brace_comment {
                break;
            }
        }
        blocks.push(Block::Tags(lines[start..i].to_vec()));
    }
    blocks
}

fn is_bare_deal_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.starts_with('[') && trimmed.contains(':') && Hands::from_pbn(trimmed).is_some()
}

/// Solve every deal in the PBN text and rewrite its double-dummy tags
fn process_pbn(content: &str, config: &SolverConfig) -> Result<String, String> {
    let blocks = split_blocks(content);

    let deals: Vec<Hands> = blocks
        .iter()
        .filter_map(|block| match block {
            Block::Tags(lines) => lines
                .iter()
                .find_map(|line| extract_deal_tag(line))
                .and_then(Hands::from_pbn),
            Block::Bare(line) => Hands::from_pbn(line),
        })
        .collect();
    info!(deals = deals.len(), "solving");
    let tables = calc_all_tables(&deals, config).map_err(|e| e.to_string())?;
    let mut tables = tables.iter();

    let mut result = String::new();
    for block in &blocks {
        match block {
            Block::Bare(line) => {
                if let Some(table) = tables.next() {
                    result.push_str(line.trim());
                    result.push('\n');
                    result.push_str(&table.to_string());
                }
            }
            Block::Tags(lines) => {
                let solved = lines
                    .iter()
                    .find_map(|line| extract_deal_tag(line))
                    .and_then(Hands::from_pbn)
                    .is_some();
                match if solved { tables.next() } else { None } {
                    Some(table) => result.push_str(&process_deal_block(lines, table)),
                    None => {
                        for line in lines {
                            result.push_str(line);
                            result.push('\n');
                        }
                    }
                }
            }
        }
    }
    Ok(result)
}

/// Rewrite one deal block: drop existing double-dummy tags and insert ours
fn process_deal_block(lines: &[&str], table: &DdTable) -> String {
    let dd_tags = generate_dd_tags(table);

    let mut output_lines: Vec<String> = Vec::new();
    let mut found_dd_tag = false;
    let mut skipping_optimum_data = false;
    let mut insertion_point: Option<usize> = None;

    let dd_tag_names = [
        "DoubleDummyTricks",
        "OptimumScore",
        "ParContract",
        "OptimumResultTable",
    ];

    for line in lines {
        let trimmed = line.trim();

        if let Some(tag_name) = extract_tag_name(trimmed) {
            if dd_tag_names.contains(&tag_name) {
                if !found_dd_tag {
                    insertion_point = Some(output_lines.len());
                    found_dd_tag = true;
                }
                if tag_name == "OptimumResultTable" {
                    skipping_optimum_data = true;
                }
                continue;
            }
        }

        if skipping_optimum_data {
            if is_optimum_result_data_line(line) {
                continue;
            }
            skipping_optimum_data = false;
        }

        output_lines.push(line.to_string());

        // Keep tags in alphabetical order around the supplemental section
        if !found_dd_tag {
            if trimmed.starts_with("[Result ") {
                insertion_point = Some(output_lines.len());
            } else if let Some(tag_name) = extract_tag_name(trimmed) {
                if tag_name > "DoubleDummyTricks" && insertion_point.is_none() {
                    insertion_point = Some(output_lines.len() - 1);
                } else if tag_name < "DoubleDummyTricks" {
                    insertion_point = Some(output_lines.len());
                }
            }
        }
    }

    let mut result = String::new();
    let insert_at = insertion_point.unwrap_or(output_lines.len());
    for (idx, line) in output_lines.iter().enumerate() {
        if idx == insert_at {
            result.push_str(&dd_tags);
        }
        result.push_str(line);
        result.push('\n');
    }
    if insert_at >= output_lines.len() {
        result.push_str(&dd_tags);
    }
    result
}

/// Score every opening lead of the first deal in the input
fn list_leads(content: &str, leader: Seat, trump: usize, config: &SolverConfig) -> Result<String, String> {
    let hands = content
        .lines()
        .find_map(|line| {
            extract_deal_tag(line)
                .and_then(Hands::from_pbn)
                .or_else(|| Hands::from_pbn(line.trim()))
        })
        .ok_or("no deal found")?;

    let mut slot = SolveSlot::new(config);
    let deal = Deal::new(&hands, trump, leader);
    let fut = slot.solve_board(&deal, -1, 3, 1).map_err(|e| e.to_string())?;
    debug!(nodes = fut.nodes, "leads scored");

    let mut out = format!(
        "{} leads, {}: tricks for the defence\n",
        seat_name(leader),
        if trump == NOTRUMP { "no trump" } else { suit_name(trump) }
    );
    for card in fut.scored_cards() {
        out.push_str(&format!("{}\n", card));
    }
    Ok(out)
}

/// Extract the deal string from a [Deal "..."] tag
fn extract_deal_tag(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if !trimmed.starts_with("[Deal ") {
        return None;
    }

    let start = trimmed.find('"')? + 1;
    let end = trimmed.rfind('"')?;
    if end <= start {
        return None;
    }

    Some(&trimmed[start..end])
}

/// Extract the tag name from a tag line like "[TagName ...]"
fn extract_tag_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find([' ', ']'])?;
    Some(&rest[..end])
}

/// Check if a line is OptimumResultTable data (e.g., "N NT  3")
fn is_optimum_result_data_line(line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    parts.len() == 3
        && ["N", "S", "E", "W"].contains(&parts[0])
        && ["NT", "S", "H", "D", "C"].contains(&parts[1])
        && parts[2].parse::<u8>().is_ok()
}

fn generate_dd_tags(table: &DdTable) -> String {
    let mut output = String::new();
    output.push_str(&format!("[DoubleDummyTricks \"{}\"]\n", table.to_ddt_string()));
    output.push_str("[OptimumResultTable \"Declarer;Denomination\\2R;Result\\2R\"]\n");

    let denom_names = ["NT", " S", " H", " D", " C"];
    for declarer in TABLE_DECLARERS {
        let decl_name = bridge_dds::types::seat_letter(declarer);
        for (strain, denom_name) in TABLE_STRAINS.iter().zip(denom_names) {
            output.push_str(&format!(
                "{} {} {:2}\n",
                decl_name,
                denom_name,
                table.tricks(*strain, declarer)
            ));
        }
    }
    output
}
