//! publog - Decode and consolidate PUB LOG catalog TAB files
//!
//! The catalog distribution ships its tables as `V_*.TAB` containers with
//! an undocumented compression scheme. `publog decode` recovers the
//! tab-separated text inside them; `publog consolidate` joins the decoded
//! item master, part cross-reference, and CAGE address tables into one
//! import-ready CSV.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use publog_core::{
    decode_file, read_cages, read_items, read_parts, write_csv, Consolidator, DecodeMethod,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Filename pattern for catalog table containers
const TAB_PATTERN: &str = "V_*.TAB";

/// Decode and consolidate PUB LOG catalog TAB files
#[derive(Parser, Debug)]
#[command(name = "publog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode TAB containers into tab-separated text files
    Decode(DecodeArgs),
    /// Join decoded tables into one import-ready CSV
    Consolidate(ConsolidateArgs),
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Input TAB files or directories (directories are scanned
    /// non-recursively for V_*.TAB)
    inputs: Vec<PathBuf>,

    /// Process all V_*.TAB files in the current directory
    #[arg(long)]
    all: bool,

    /// Output directory, created if absent (default: next to each input)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConsolidateArgs {
    /// Item master table (V_FLIS_NSN), decoded or raw
    #[arg(long)]
    items: PathBuf,

    /// Part cross-reference table (V_FLIS_PART), decoded or raw
    #[arg(long)]
    parts: Option<PathBuf>,

    /// CAGE address table (V_CAGE_ADDRESS), decoded or raw
    #[arg(long)]
    cages: Option<PathBuf>,

    /// Output CSV path
    #[arg(long, default_value = "nsn_import.csv")]
    output: PathBuf,
}

/// Per-run accounting for the decode batch
#[derive(Debug, Default)]
struct DecodeStats {
    succeeded: usize,
    failed: usize,
    fallback_used: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    match cli.command {
        Command::Decode(args) => run_decode(&args),
        Command::Consolidate(args) => run_consolidate(&args),
    }
}

/// Decode a batch of containers, continuing past per-file failures
fn run_decode(args: &DecodeArgs) -> Result<()> {
    let inputs = expand_inputs(args)?;
    if inputs.is_empty() {
        bail!("no {} files matched the given inputs", TAB_PATTERN);
    }

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }

    let mut stats = DecodeStats::default();
    for input in &inputs {
        let output = output_path(input, args.output_dir.as_deref());

        match decode_one(input, &output) {
            Ok(method) => {
                stats.succeeded += 1;
                if method == DecodeMethod::TextLikelihood {
                    stats.fallback_used += 1;
                    info!("{}: recovered via text fallback", input.display());
                }
                println!("Decoded {} -> {}", input.display(), output.display());
            }
            Err(e) => {
                stats.failed += 1;
                warn!("failed to process {}: {:#}", input.display(), e);
            }
        }
    }

    println!(
        "Completed: {}/{} files ({} via text fallback)",
        stats.succeeded,
        inputs.len(),
        stats.fallback_used
    );

    if stats.failed > 0 {
        bail!("{} of {} files failed", stats.failed, inputs.len());
    }
    Ok(())
}

/// Decodes one container and writes its TSV; returns the method used.
///
/// Decoding itself cannot fail a file: the pipeline degrades to the text
/// fallback. Only an unreadable input or unwritable output fails here.
fn decode_one(input: &Path, output: &Path) -> Result<DecodeMethod> {
    let decoded = decode_file(input)?;
    debug!(
        "{}: {} bytes out via {}",
        input.display(),
        decoded.len(),
        decoded.method().as_str()
    );

    fs::write(output, decoded.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(decoded.method())
}

/// Expands CLI inputs into the list of files to decode.
///
/// Directories are scanned non-recursively for V_*.TAB entries; `--all`
/// scans the current directory. Explicit file paths are taken as-is, and a
/// nonexistent explicit path fails the run.
fn expand_inputs(args: &DecodeArgs) -> Result<Vec<PathBuf>> {
    if args.inputs.is_empty() && !args.all {
        bail!("no inputs given (pass files, directories, or --all)");
    }

    let mut files = Vec::new();

    if args.all {
        files.extend(glob_tabs(Path::new("."))?);
    }

    for input in &args.inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            files.extend(glob_tabs(input)?);
        } else {
            bail!("file not found: {}", input.display());
        }
    }

    Ok(files)
}

/// Non-recursive V_*.TAB expansion within one directory
fn glob_tabs(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(TAB_PATTERN);
    let pattern = pattern
        .to_str()
        .with_context(|| format!("non-UTF-8 path: {}", pattern.display()))?;

    let mut files = Vec::new();
    for entry in glob::glob(pattern).context("invalid glob pattern")? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable directory entry: {}", e),
        }
    }

    files.sort();
    Ok(files)
}

/// Maps an input TAB path to its TSV output path.
///
/// `V_FLIS_NSN.TAB` becomes `V_FLIS_NSN.tsv`; a name without the `.TAB`
/// suffix gets `.tsv` appended.
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match name.strip_suffix(".TAB") {
        Some(stem) => format!("{stem}.tsv"),
        None => format!("{name}.tsv"),
    };

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Join the three tables into the consolidated import CSV
fn run_consolidate(args: &ConsolidateArgs) -> Result<()> {
    let mut consolidator = Consolidator::new();

    let items = load_table(&args.items, read_items)?;
    info!("read {} item rows from {}", items.len(), args.items.display());
    consolidator.add_items(items);

    if let Some(path) = &args.parts {
        let parts = load_table(path, read_parts)?;
        info!("read {} part rows from {}", parts.len(), path.display());
        consolidator.add_parts(parts);
    }

    if let Some(path) = &args.cages {
        let cages = load_table(path, read_cages)?;
        info!("read {} CAGE rows from {}", cages.len(), path.display());
        consolidator.add_cages(cages);
    }

    let records = consolidator.consolidate();
    write_csv(&args.output, &records)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(())
}

/// Reads a table file through the decode pipeline and parses it.
///
/// Already-decoded TSV passes through the marker decoder byte-for-byte, so
/// both raw TAB containers and decoded text are accepted.
fn load_table<T>(path: &Path, parse: fn(&[u8]) -> Vec<T>) -> Result<Vec<T>> {
    let decoded = decode_file(path)?;
    if decoded.method() == DecodeMethod::TextLikelihood {
        debug!("{}: recovered via text fallback", path.display());
    }
    Ok(parse(decoded.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &[u8]) {
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_output_path_naming() {
        assert_eq!(
            output_path(Path::new("/data/V_FLIS_NSN.TAB"), None),
            PathBuf::from("/data/V_FLIS_NSN.tsv")
        );
        assert_eq!(
            output_path(Path::new("/data/V_FLIS_NSN.TAB"), Some(Path::new("/out"))),
            PathBuf::from("/out/V_FLIS_NSN.tsv")
        );
        // No .TAB suffix: .tsv is appended, matching the legacy naming
        assert_eq!(
            output_path(Path::new("/data/V_FLIS_NSN"), None),
            PathBuf::from("/data/V_FLIS_NSN.tsv")
        );
        assert_eq!(
            output_path(Path::new("/data/v_flis_nsn.tab"), None),
            PathBuf::from("/data/v_flis_nsn.tab.tsv")
        );
    }

    #[test]
    fn test_expand_inputs_directory_is_non_recursive() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("V_FLIS_NSN.TAB"), b"x");
        touch(&dir.path().join("V_FLIS_PART.TAB"), b"x");
        touch(&dir.path().join("README.txt"), b"x");
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        touch(&sub.join("V_MOE_RULE.TAB"), b"x");

        let args = DecodeArgs {
            inputs: vec![dir.path().to_path_buf()],
            all: false,
            output_dir: None,
        };
        let files = expand_inputs(&args).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["V_FLIS_NSN.TAB", "V_FLIS_PART.TAB"]);
    }

    #[test]
    fn test_expand_inputs_explicit_file_kept_as_is() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("renamed.bin");
        touch(&file, b"x");

        let args = DecodeArgs {
            inputs: vec![file.clone()],
            all: false,
            output_dir: None,
        };
        assert_eq!(expand_inputs(&args).unwrap(), vec![file]);
    }

    #[test]
    fn test_expand_inputs_missing_path_fails() {
        let args = DecodeArgs {
            inputs: vec![PathBuf::from("/nonexistent/V_X.TAB")],
            all: false,
            output_dir: None,
        };
        assert!(expand_inputs(&args).is_err());
    }

    #[test]
    fn test_expand_inputs_requires_inputs_or_all() {
        let args = DecodeArgs {
            inputs: vec![],
            all: false,
            output_dir: None,
        };
        assert!(expand_inputs(&args).is_err());
    }

    #[test]
    fn test_decode_one_writes_expanded_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("V_TEST.TAB");
        let output = dir.path().join("V_TEST.tsv");
        // IMD2 header, then a compressed run of three 'A's and a literal tail
        let mut data = b"IMD2\x00\x00\x00\x00".to_vec();
        data.extend_from_slice(&[0x00, 0x03, b'A']);
        data.extend_from_slice(b"\t123\r\n");
        touch(&input, &data);

        let method = decode_one(&input, &output).unwrap();
        assert_eq!(method, DecodeMethod::Marker);
        assert_eq!(fs::read(&output).unwrap(), b"AAA\t123\r\n".to_vec());
    }

    #[test]
    fn test_decode_one_falls_back_on_garbage() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("V_TINY.TAB");
        let output = dir.path().join("V_TINY.tsv");
        touch(&input, b"\x00ab");

        let method = decode_one(&input, &output).unwrap();
        assert_eq!(method, DecodeMethod::TextLikelihood);
        assert_eq!(fs::read(&output).unwrap(), b"ab".to_vec());
    }

    #[test]
    fn test_run_consolidate_end_to_end() {
        let dir = TempDir::new().unwrap();
        let items = dir.path().join("V_FLIS_NSN.tsv");
        let parts = dir.path().join("V_FLIS_PART.tsv");
        let cages = dir.path().join("V_CAGE_ADDRESS.tsv");
        let output = dir.path().join("nsn_import.csv");

        touch(
            &items,
            b"001234567\t5310\tINC\tWASHER, FLAT\tX\tEA\t12345\ta\tb\tc\td\tH\n\
              12345\t5310\tINC\tBAD NSN\tX\tEA\t100\n",
        );
        touch(
            &parts,
            b"001234567\tA\tPN-1\tX\n001234567\tB\tPN-2\tX\n",
        );
        touch(&cages, b"A\tACME FASTENERS\n");

        let args = ConsolidateArgs {
            items,
            parts: Some(parts),
            cages: Some(cages),
            output: output.clone(),
        };
        run_consolidate(&args).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("NSN,LIN,"));
        assert_eq!(
            lines.next().unwrap(),
            "5310001234567,,\"WASHER, FLAT\",,5310,ACME FASTENERS,PN-1,EA,123.45,H"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
