//! Runs the JSON fixtures under `fixtures/` against the builder.
//!
//! usage: dev-test-runner [GLOB] [--filter REGEX]
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use edm_defaults::lower::{lower_schema, resolve_type_name, SchemaDoc};
use edm_defaults::{BuildError, BuildOptions, Builder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

static VARIANT_RX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)").unwrap());

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    schema: SchemaDoc,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Case {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    value: String,
    max_depth: Option<usize>,
    /// expected `Expr::to_json` output
    expect: Option<Value>,
    /// expected `BuildError` variant name
    error: Option<String>,
}

enum Outcome {
    Pass,
    Fail(String),
}

fn error_variant(err: &BuildError) -> String {
    let debug = format!("{err:?}");
    VARIANT_RX
        .captures(&debug)
        .map(|c| c[1].to_string())
        .unwrap_or(debug)
}

fn run_case(builder: &Builder<'_>, model: &edm_defaults::Model, case: &Case) -> Outcome {
    let ty = match resolve_type_name(model, &case.ty) {
        Ok(ty) => ty,
        Err(error) => return Outcome::Fail(format!("bad type `{}`: {error}", case.ty)),
    };
    let result = match case.max_depth {
        Some(max_depth) => Builder::with_options(model, BuildOptions { max_depth }).build(&ty, &case.value),
        None => builder.build(&ty, &case.value),
    };
    match (result, &case.expect, &case.error) {
        (Ok(expr), Some(expect), None) => {
            let got = expr.to_json();
            if &got == expect { Outcome::Pass } else { Outcome::Fail(format!("expected {expect}, got {got}")) }
        }
        (Err(error), None, Some(variant)) => {
            let got = error_variant(&error);
            if &got == variant { Outcome::Pass } else { Outcome::Fail(format!("expected {variant}, got {error:?}")) }
        }
        (Ok(expr), None, Some(variant)) => Outcome::Fail(format!("expected {variant}, got {}", expr.to_json())),
        (Err(error), Some(expect), None) => Outcome::Fail(format!("expected {expect}, got {error:?}")),
        _ => Outcome::Fail("case must set exactly one of `expect` / `error`".into()),
    }
}

fn run_file(path: &Path, filter: Option<&Regex>) -> Result<(usize, usize), String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    let fixture: FixtureFile = serde_path_to_error::deserialize(de)
        .map_err(|e| format!("{}: at JSON path {} → {}", path.display(), e.path(), e.inner()))?;
    let model = lower_schema([&fixture.schema]).map_err(|e| format!("{}: {e}", path.display()))?;
    let builder = Builder::new(&model);

    let (mut passed, mut failed) = (0, 0);
    for case in &fixture.cases {
        if filter.is_some_and(|rx| !rx.is_match(&case.name)) {
            continue;
        }
        match run_case(&builder, &model, case) {
            Outcome::Pass => {
                passed += 1;
                println!("{} {}", "✓".green(), case.name);
            }
            Outcome::Fail(why) => {
                failed += 1;
                println!("{} {}: {}", "✗".red(), case.name, why.red());
            }
        }
    }
    Ok((passed, failed))
}

fn main() -> ExitCode {
    let mut pattern = None;
    let mut filter = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--filter" {
            match args.next().map(|f| Regex::new(&f)) {
                Some(Ok(rx)) => filter = Some(rx),
                _ => {
                    eprintln!("--filter needs a valid regex");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            pattern = Some(arg);
        }
    }
    let pattern = pattern.unwrap_or_else(|| {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        format!("{}/*.json", dir.display())
    });

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect::<Vec<_>>(),
        Err(error) => {
            eprintln!("bad glob pattern {pattern}: {error}");
            return ExitCode::FAILURE;
        }
    };

    let (mut passed, mut failed) = (0, 0);
    for path in paths {
        println!("== {} ==", path.display());
        match run_file(&path, filter.as_ref()) {
            Ok((p, f)) => {
                passed += p;
                failed += f;
            }
            Err(error) => {
                eprintln!("{}", error.red());
                failed += 1;
            }
        }
    }

    println!("{passed} passed, {failed} failed");
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
