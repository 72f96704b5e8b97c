//! Command-line interface for ecschema-xml

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use ecschema::{
    CustomAttributeProvider, Limits, SchemaContext, SchemaItem, SchemaItemLookup, SchemaParser,
};
#[cfg(feature = "cli")]
use serde_json::{json, Map, Value};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "ecschema")]
#[command(author, version, about = "ECSchema XML inspection and validation tool", long_about = None)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use strict resource limits
    #[arg(long, global = true)]
    strict_limits: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a schema and display its items
    Inspect {
        /// Path to the ECSchema XML file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Show the parsed props of a single item and its properties
        #[arg(short, long)]
        item: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List the schemas referenced by a schema
    References {
        /// Path to the ECSchema XML file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List and realize custom attributes applied to a schema or an item
    #[command(name = "custom-attributes")]
    CustomAttributes {
        /// Path to the ECSchema XML file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Item whose class-level custom attributes are listed (defaults to
        /// the schema itself)
        #[arg(short, long)]
        item: Option<String>,

        /// Referenced schema files that declare attribute classes
        #[arg(short, long = "reference", value_name = "SCHEMA")]
        references: Vec<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
type CliResult = Result<(), Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let limits = if cli.strict_limits {
        Limits::strict()
    } else {
        Limits::default()
    };

    let result = match cli.command {
        Commands::Inspect { schema, item, json } => cmd_inspect(schema, item, json, limits),
        Commands::References { schema, json } => cmd_references(schema, json, limits),
        Commands::CustomAttributes {
            schema,
            item,
            references,
            json,
        } => cmd_custom_attributes(schema, item, references, json, limits),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn open(path: &Path, limits: Limits) -> Result<SchemaParser, Box<dyn std::error::Error>> {
    let bytes = ecschema::loaders::Loader::new()
        .with_limits(limits.clone())
        .load_bytes(path)?;
    let document = ecschema::Document::parse(&bytes, &limits)?;
    tracing::info!(path = %path.display(), "loaded schema document");
    Ok(SchemaParser::with_limits(document, limits)?)
}

#[cfg(feature = "cli")]
fn find<'a>(parser: &'a SchemaParser, name: &str) -> Result<SchemaItem<'a>, Box<dyn std::error::Error>> {
    parser
        .find_item(name)?
        .ok_or_else(|| format!("No item named '{}' in schema {}", name, parser.schema_name()).into())
}

#[cfg(feature = "cli")]
fn cmd_inspect(path: PathBuf, item: Option<String>, json_output: bool, limits: Limits) -> CliResult {
    let parser = open(&path, limits)?;
    let schema = parser.parse_schema()?;

    if let Some(name) = item {
        let item = find(&parser, &name)?;
        let props = parser.parse_item(&item)?;

        let mut properties = Vec::new();
        if item.kind.is_class() {
            for property in parser.properties(&item) {
                properties.push(parser.parse_property(&property?)?);
            }
        }

        if json_output {
            let output = json!({
                "name": parser_full_name(&parser, &item),
                "props": props,
                "properties": properties,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{} ({})", parser_full_name(&parser, &item), item.kind);
            println!("{}", serde_json::to_string_pretty(&props)?);
            if !properties.is_empty() {
                println!("\n=== Properties ===");
                for property in &properties {
                    let common = property.property();
                    println!("  {} : {:?}", common.name, common.kind);
                }
            }
        }
        return Ok(());
    }

    let mut items = Vec::new();
    for item in parser.items() {
        let item = item?;
        // Validate every item, not just classify it
        parser.parse_item(&item)?;
        items.push((item.name.to_string(), item.kind));
    }

    if json_output {
        let mut output = Map::new();
        output.insert("schema".to_string(), serde_json::to_value(&schema)?);
        output.insert(
            "items".to_string(),
            Value::Array(
                items
                    .iter()
                    .map(|(name, kind)| json!({ "name": name, "kind": kind }))
                    .collect(),
            ),
        );
        println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
    } else {
        println!("ecschema-xml v{}", ecschema::VERSION);
        println!();
        println!("Schema Information:");
        println!("  Name: {}", schema.name);
        println!("  Version: {}", schema.version);
        println!("  Alias: {}", schema.alias);
        if let Some(label) = &schema.label {
            println!("  Label: {}", label);
        }
        println!(
            "  ECXML: {}.{}",
            schema.ec_spec_major_version, schema.ec_spec_minor_version
        );
        println!();
        println!("=== Items ({}) ===", items.len());
        for (name, kind) in &items {
            println!("  {} ({})", name, kind);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn parser_full_name(parser: &SchemaParser, item: &SchemaItem<'_>) -> String {
    format!("{}.{}", parser.schema_name(), item.name)
}

#[cfg(feature = "cli")]
fn cmd_references(path: PathBuf, json_output: bool, limits: Limits) -> CliResult {
    let parser = open(&path, limits)?;
    parser.parse_schema()?;
    let references: Vec<_> = parser.get_references()?.cloned().collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&references)?);
    } else {
        for reference in &references {
            println!("  {} {}", reference.name, reference.version);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_custom_attributes(
    path: PathBuf,
    item: Option<String>,
    references: Vec<PathBuf>,
    json_output: bool,
    limits: Limits,
) -> CliResult {
    let mut context = SchemaContext::with_limits(limits.clone());
    let main = open(&path, limits.clone())?;
    let schema_name = main.parse_schema()?.name;
    context.add_schema(main)?;
    for reference in &references {
        context.add_schema(open(reference, limits.clone())?)?;
    }

    let parser = context
        .schema(&schema_name)
        .ok_or_else(|| format!("Schema {} was not added", schema_name))?;

    let providers: Vec<CustomAttributeProvider<'_>> = match &item {
        Some(name) => {
            let item = find(parser, name)?;
            parser
                .class_custom_attribute_providers(&item)
                .collect::<ecschema::Result<_>>()?
        }
        None => parser
            .schema_custom_attribute_providers()
            .collect::<ecschema::Result<_>>()?,
    };

    let mut entries = Vec::new();
    for provider in &providers {
        let instance = match context.lookup_class(&provider.class_name)? {
            Some(class) => Some(provider.pending.realize(&class, &context)?),
            None => {
                tracing::warn!(class = %provider.class_name, "attribute class not found in loaded schemas");
                None
            }
        };
        entries.push((provider.class_name.to_string(), instance));
    }

    if json_output {
        let output: Vec<Value> = entries
            .iter()
            .map(|(name, instance)| json!({ "className": name, "instance": instance }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for (name, instance) in &entries {
            match instance {
                Some(instance) => println!("  {} {}", name, serde_json::to_string(&instance.properties)?),
                None => println!("  {} (class not available)", name),
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
