//! Recast CLI - run record pipelines from YAML or JSON definitions
//!
//! # Main Commands
//!
//! ```bash
//! recast run pipeline.yaml input.csv     # Run a pipeline over an input file
//! recast example                         # Print an example definition
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! recast parse 'Trim|Prepend(" - ", $config::prefix)'   # Show the parsed chain
//! recast extract input.json order.lines.0.sku           # Resolve one accessor
//! recast catalog                                        # List transformers and validators
//! ```

use clap::{Parser, Subcommand};
use recast::catalog::Transformer;
use recast::{
    dsl, example_definition, extract, logs, run_files, Context, Registry, RunOptions, Value,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "recast")]
#[command(about = "Extract, transform and validate records with declarative pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline definition over an input file
    Run {
        /// Pipeline definition (YAML or JSON)
        definition: PathBuf,

        /// Input file (.json, .jsonl, .csv)
        input: PathBuf,

        /// JSON file merged over the definition's context
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read JSON Lines and CSV records lazily
        #[arg(long)]
        stream: bool,

        /// Expose environment variables as $env::NAME
        #[arg(long)]
        with_env: bool,

        /// Print progress to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a DSL chain and print it as JSON
    Parse {
        /// Chain such as 'Trim|Replace("a", "b")'
        syntax: String,
    },

    /// Resolve an accessor against a JSON document
    Extract {
        /// Input JSON file
        input: PathBuf,

        /// Accessor such as 'order.lines.0.sku'
        accessor: String,

        /// JSON file used as context
        #[arg(short, long)]
        context: Option<PathBuf>,
    },

    /// List bundled transformers and validators
    Catalog,

    /// Print an example pipeline definition
    Example,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            definition,
            input,
            context,
            output,
            stream,
            with_env,
            verbose,
        } => {
            logs::set_echo(verbose);
            cmd_run(&definition, &input, context.as_deref(), output.as_deref(), stream, with_env)
        }

        Commands::Parse { syntax } => cmd_parse(&syntax),

        Commands::Extract {
            input,
            accessor,
            context,
        } => cmd_extract(&input, &accessor, context.as_deref()),

        Commands::Catalog => cmd_catalog(),

        Commands::Example => {
            print!("{}", example_definition());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    definition: &Path,
    input: &Path,
    context: Option<&Path>,
    output: Option<&Path>,
    stream: bool,
    with_env: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let options = RunOptions {
        context: context.map(read_json).transpose()?,
        stream,
        with_env,
    };
    let report = run_files(definition, input, &options)?;

    eprintln!("   Format: {:?}", report.input.format);
    eprintln!("   Encoding: {}", report.input.encoding);
    if let Some(delimiter) = report.input.delimiter {
        eprintln!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    if let Some(records) = report.input.records {
        eprintln!("   Records: {}", records);
    }
    eprintln!("   Stages: {}", report.stage_count);

    if !report.result.success {
        eprintln!("\n❌ Pipeline failed:");
        for message in &report.result.messages {
            eprintln!("   - {}", message);
        }
        return Err("pipeline did not complete".into());
    }

    let json = serde_json::to_string_pretty(&report.result.payload)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(syntax: &str) -> Result<(), Box<dyn std::error::Error>> {
    let items = dsl::parse(syntax)?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn cmd_extract(input: &Path, accessor: &str, context: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_json(input)?;
    let context = match context {
        Some(path) => {
            let value = read_json(path)?;
            Context::from_value(value).ok_or("context file must hold a JSON object")?
        }
        None => Context::new(),
    };

    let found = extract(&source, accessor, &context)?;
    println!("{}", serde_json::to_string_pretty(&found)?);
    Ok(())
}

fn cmd_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Registry::with_defaults();

    println!("Transformers:");
    for name in registry.transformer_names() {
        let transformer = registry.transformer(name)?;
        let scope = if transformer.broadcasts() { "" } else { "  (whole value)" };
        println!("  {}{}", name, scope);
    }

    println!("\nValidators:");
    for name in registry.validator_names() {
        println!("  {}", name);
    }

    println!("\nSyntax: Name|Name(arg, key: value, $accessor|Chain, [list], {{map}})");
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    Ok(Value::from(json))
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("   💾 Saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
