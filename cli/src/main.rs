use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use json_shape_core::{SchemaNode, Value, fill_defaults, normalize_to_save};

#[derive(Debug, Parser)]
#[command(name = "json-shape")]
#[command(about = "Schema-driven defaulting and normalization for JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fill a JSON document with schema-declared defaults.
    Fill(TransformArgs),
    /// Normalize a JSON document for persistence.
    Normalize(TransformArgs),
    /// Rewrite legacy per-property required flags into required-name sets.
    Modernize(ModernizeArgs),
}

#[derive(Debug, Args)]
struct TransformArgs {
    /// Schema file (JSON, or YAML by .yaml/.yml extension).
    #[arg(long)]
    schema: PathBuf,
    /// Treat the schema as the element shape of a sequence.
    #[arg(long)]
    array: bool,
    /// Input JSON document (stdin when omitted; empty input means "unset").
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output file (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Pretty-print the output document.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct ModernizeArgs {
    /// Schema file (JSON, or YAML by .yaml/.yml extension).
    #[arg(long)]
    schema: PathBuf,
    /// Output file (stdout when omitted).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Fill(args) => run_transform(args, fill_defaults),
        Command::Normalize(args) => run_transform(args, normalize_to_save),
        Command::Modernize(args) => run_modernize(args),
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn run_transform(
    args: TransformArgs,
    engine: fn(&SchemaNode, Option<&Value>) -> Option<Value>,
) -> Result<(), String> {
    let mut schema = load_schema(&args.schema)?;
    if args.array {
        schema = SchemaNode::array(schema);
    }

    let data = read_input(args.input.as_deref())?;
    let transformed = engine(&schema, data.as_ref());

    // "Unset" has no JSON spelling; an absent result prints as null.
    let document = transformed.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .map_err(|e| format!("failed to render output: {e}"))?;

    write_output(args.output.as_deref(), &rendered)
}

fn run_modernize(args: ModernizeArgs) -> Result<(), String> {
    let schema = load_schema(&args.schema)?;
    let canonical = schema.adopt_legacy_required().map_err(|e| e.to_string())?;
    let rendered = canonical.to_json_string().map_err(|e| e.to_string())?;
    write_output(args.output.as_deref(), &rendered)
}

fn load_schema(path: &Path) -> Result<SchemaNode, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read schema {}: {e}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
        SchemaNode::from_yaml_str(&text)
    } else {
        SchemaNode::from_json_str(&text)
    };
    parsed.map_err(|e| format!("failed to parse schema {}: {e}", path.display()))
}

fn read_input(path: Option<&Path>) -> Result<Option<Value>, String> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read input {}: {e}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("failed to read stdin: {e}"))?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Ok(None);
    }

    let document: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("failed to parse input JSON: {e}"))?;
    Ok(Some(Value::from(document)))
}

fn write_output(path: Option<&Path>, rendered: &str) -> Result<(), String> {
    match path {
        Some(path) => fs::write(path, format!("{rendered}\n"))
            .map_err(|e| format!("failed to write {}: {e}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
