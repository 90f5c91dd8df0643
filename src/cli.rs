//! Minimal CLI: split | fields | build | term | check
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::annotation::VocabularyAnnotation;
use crate::literal::{BuildOptions, Builder, DEFAULT_MAX_DEPTH};
use crate::lower::{lower_schema, resolve_type_name, SchemaDoc};
use crate::model::Model;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile raw term default values into typed annotation expressions
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// log filter used when RUST_LOG is unset (e.g. `debug`, `edm_defaults=trace`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// split a bracketed collection literal into its top-level items
    Split(ValueSettings),
    /// extract the `"name": value` fields of a record literal
    Fields(ValueSettings),
    /// build the expression for a value against a type
    Build(BuildOut),
    /// build the default-value annotation of a declared term
    Term(TermOut),
    /// build every term default in the loaded schemas
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// One or more schema documents (JSON). May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1..)]
    schema: Vec<String>,

    /// collections/records nested deeper than this are rejected
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(Args, Debug, Clone)]
struct ValueSettings {
    /// raw literal text
    #[arg(long, required_unless_present = "value_file", conflicts_with = "value_file")]
    value: Option<String>,

    /// read the raw literal from a file (multi-line record literals)
    #[arg(long)]
    value_file: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct BuildOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    #[command(flatten)]
    value_settings: ValueSettings,

    /// declared type, e.g. `Collection(Edm.Int32)` or `Org.Address`
    #[arg(long = "type")]
    ty: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TermOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// qualified term name
    #[arg(long)]
    term: String,

    /// annotated element
    #[arg(long, default_value = "")]
    target: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    schema_settings: SchemaSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaSettings {
    fn load_model(&self) -> Result<Model> {
        let source_paths = resolve_file_path_patterns(&self.schema)
            .context("failed to resolve schema file paths")?;
        let mut docs = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read schema file ({})", source_path.display()))?;
            let doc = SchemaDoc::from_json(&source)
                .with_context(|| format!("failed to parse schema file ({})", source_path.display()))?;
            docs.push(doc);
        }
        Ok(lower_schema(&docs)?)
    }

    fn require_model(&self) -> Result<Model> {
        if self.schema.is_empty() {
            bail!("at least one --schema is required");
        }
        self.load_model()
    }

    fn options(&self) -> BuildOptions {
        BuildOptions { max_depth: self.max_depth }
    }
}

impl ValueSettings {
    fn load(&self) -> Result<String> {
        match (&self.value, &self.value_file) {
            (Some(value), _) => Ok(value.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read value file ({})", path.display())),
            (None, None) => bail!("either --value or --value-file is required"),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Install the stderr subscriber. `RUST_LOG` wins over `--log-level`.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Split(target) => {
                let items = crate::literal::split_top_level(&target.load()?);
                write_json(None, &Value::from(items))
            }
            Command::Fields(target) => {
                let fields = crate::literal::extract_fields(&target.load()?)?;
                let o: serde_json::Map<String, Value> =
                    fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
                write_json(None, &Value::Object(o))
            }
            Command::Build(target) => {
                let model = target.schema_settings.load_model()?;
                let ty = resolve_type_name(&model, &target.ty)?;
                let raw = target.value_settings.load()?;
                let expr = Builder::with_options(&model, target.schema_settings.options())
                    .build(&ty, &raw)
                    .with_context(|| format!("failed to build a `{ty}` value"))?;
                write_json(target.out.as_ref(), &expr.to_json())
            }
            Command::Term(target) => {
                let model = target.schema_settings.require_model()?;
                let annotation = VocabularyAnnotation::from_default(
                    &model,
                    target.target.as_str(),
                    &target.term,
                    target.schema_settings.options(),
                )
                .with_context(|| format!("failed to build the default of `{}`", target.term))?;
                write_json(target.out.as_ref(), &annotation.to_json())
            }
            Command::Check(target) => {
                let model = target.schema_settings.require_model()?;
                let options = target.schema_settings.options();
                let terms: Vec<_> = model.terms().filter(|t| t.default_value.is_some()).collect();

                let results: Vec<_> = terms
                    .par_iter()
                    .map(|term| {
                        let result = VocabularyAnnotation::from_default(&model, "", &term.name, options);
                        (term.name.as_str(), result)
                    })
                    .collect();

                let mut failed = 0usize;
                for (name, result) in &results {
                    match result {
                        Ok(annotation) => println!("{} {name} = {}", "✓".green(), annotation.value.to_json()),
                        Err(error) => {
                            failed += 1;
                            println!("{} {name}: {}", "✗".red(), error.to_string().red());
                        }
                    }
                }
                if failed > 0 {
                    bail!("{failed} of {} term defaults failed", results.len());
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_json(out: Option<&PathBuf>, value: &Value) -> Result<()> {
    let src = serde_json::to_string_pretty(value)?;
    if let Some(out) = out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(out, &src)
            .with_context(|| format!("failed to write {}", out.display()))?;
    } else {
        println!("{src}");
    }
    Ok(())
}

pub(crate) fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
