use clap::{Args, ValueEnum};
use routetypes_common::{Definitions, OutputTarget, RouteSet, Routes};
use routetypes_core::{ExtractorOptions, Output, SaveOutcome, SchemaHook, extract, render, save};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::cli::run_cli_async;
use crate::config::Config;

/// Boilerplate flavour of an output file.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "camelCase")]
pub enum Target {
    /// Types plus the server handler boilerplate
    ServerTypes,
    /// Types only
    ClientTypes,
}

impl From<Target> for OutputTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::ServerTypes => OutputTarget::ServerTypes,
            Target::ClientTypes => OutputTarget::ClientTypes,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Route file (JSON or YAML)
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,
    /// Config file [default: ./routetypes.toml when present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Leave HEAD routes out of the generated types
    #[arg(long)]
    pub ignore_head: bool,
    /// Output file, repeatable; replaces the outputs of the config file
    #[arg(long = "output", short, value_name = "PATH")]
    pub outputs: Vec<PathBuf>,
    /// Target of the `--output` at the same position [default: clientTypes]
    #[arg(long = "target", value_enum, value_name = "TARGET")]
    pub targets: Vec<Target>,
    /// Also write the consolidated JSON-Schema document
    #[arg(long, value_name = "PATH")]
    pub schema_out: Option<PathBuf>,
    /// Write nothing; show what would change and fail if anything would
    #[arg(long)]
    pub check: bool,
}

pub async fn run(args: GenerateArgs) -> i32 {
    run_cli_async(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to read current directory: {e}"))?;
    let mut options = Config::discover(args.config.as_deref(), &cwd)?.into_extractor_options();
    apply_overrides(&mut options, &args)?;

    if !options.enabled {
        println!("Generation is disabled in the config file");
        return Ok(());
    }
    if options.outputs.is_empty() && args.schema_out.is_none() {
        return Err(
            "No outputs configured: pass --output or add an [outputs] table to routetypes.toml"
                .to_string(),
        );
    }

    let (routes, definitions) = RouteSet::read(&args.input)?.into_parts()?;
    if args.check {
        check(&routes, &definitions, &options, args.schema_out.as_deref()).await
    } else {
        generate(&routes, &definitions, options, args.schema_out.as_deref()).await
    }
}

/// Command line flags win over the config file.
fn apply_overrides(options: &mut ExtractorOptions, args: &GenerateArgs) -> Result<(), String> {
    options.ignore_head |= args.ignore_head;

    if args.targets.len() > args.outputs.len() {
        return Err(format!(
            "{} --target values given for {} --output paths",
            args.targets.len(),
            args.outputs.len()
        ));
    }
    if !args.outputs.is_empty() {
        options.outputs = args
            .outputs
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let target = args.targets.get(i).copied().map_or_else(OutputTarget::default, Into::into);
                Output::new(path, target)
            })
            .collect();
    }
    Ok(())
}

async fn generate(
    routes: &Routes,
    definitions: &Definitions,
    mut options: ExtractorOptions,
    schema_out: Option<&Path>,
) -> Result<(), String> {
    let captured = Arc::new(Mutex::new(None::<Value>));
    if schema_out.is_some() {
        let sink = Arc::clone(&captured);
        let hook: SchemaHook = Arc::new(move |document: &Value| -> Result<(), String> {
            *sink.lock().map_err(|e| e.to_string())? = Some(document.clone());
            Ok(())
        });
        options.on_schema_ready = Some(hook);
    }

    let mut report = extract(routes, definitions, &options)
        .await
        .map_err(|e| e.to_string())?;

    let document = captured.lock().map_err(|e| e.to_string())?.take();
    if let (Some(path), Some(document)) = (schema_out, document) {
        match save(&schema_text(&document)?, path).await.map_err(|e| e.to_string())? {
            SaveOutcome::Written => report.written.push(path.to_path_buf()),
            SaveOutcome::Unchanged => report.unchanged.push(path.to_path_buf()),
        }
    }

    for path in &report.written {
        println!("✅ {}", path.display());
    }
    for path in &report.unchanged {
        println!("   {} (unchanged)", path.display());
    }
    Ok(())
}

async fn check(
    routes: &Routes,
    definitions: &Definitions,
    options: &ExtractorOptions,
    schema_out: Option<&Path>,
) -> Result<(), String> {
    let (compiled, rendered) = render(routes, definitions, options)
        .await
        .map_err(|e| e.to_string())?;

    let mut expected: Vec<(PathBuf, String)> = rendered
        .into_iter()
        .map(|(output, text)| (output.path, text))
        .collect();
    if let Some(path) = schema_out {
        expected.push((path.to_path_buf(), schema_text(&compiled.schema)?));
    }

    let mut stale = 0;
    for (path, text) in &expected {
        // A missing file diffs against empty content.
        let current = tokio::fs::read_to_string(path).await.unwrap_or_default();
        if let Some(diff) = render_diff(&path.display().to_string(), &current, text) {
            print!("{diff}");
            stale += 1;
        }
    }

    if stale > 0 {
        return Err(format!("{stale} generated file(s) out of date"));
    }
    println!("All generated files are up to date");
    Ok(())
}

fn schema_text(document: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(document)
        .map(|text| format!("{text}\n"))
        .map_err(|e| format!("Failed to serialize schema: {e}"))
}

/// Colored unified diff of `current` against `new`, `None` when equal.
fn render_diff(label: &str, current: &str, new: &str) -> Option<String> {
    if current == new {
        return None;
    }

    let diff = TextDiff::from_lines(current, new);
    let mut output = String::new();

    output.push_str(&format!("\x1b[1m--- {label} (current)\x1b[0m\n"));
    output.push_str(&format!("\x1b[1m+++ {label} (generated)\x1b[0m\n"));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", "\x1b[31m"),
                    ChangeTag::Insert => ("+", "\x1b[32m"),
                    ChangeTag::Equal => (" ", ""),
                };
                output.push_str(color);
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
                if !color.is_empty() {
                    output.push_str("\x1b[0m");
                }
            }
        }
    }

    Some(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const ROUTES: &str = r#"{
  "routes": [
    {
      "url": "/items/:id",
      "method": "GET",
      "schema": {
        "params": { "type": "object", "properties": { "id": { "type": "string" } } },
        "response": { "200": { "$ref": "item#" } }
      }
    },
    { "url": "/items/:id", "method": "HEAD" }
  ],
  "schemas": [
    {
      "$id": "item",
      "title": "Item",
      "type": "object",
      "properties": { "name": { "type": "string" } },
      "required": ["name"]
    }
  ]
}"#;

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("routes.json"), ROUTES).unwrap();
            let config = format!(
                "ignoreHead = true\n\n[outputs.\"{}\"]\ntarget = \"serverTypes\"\n\n[compilerOptions]\ncwd = \"{}\"\n",
                dir.path().join("src/types.ts").display(),
                dir.path().display()
            );
            std::fs::write(dir.path().join("routetypes.toml"), config).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn args(&self) -> GenerateArgs {
            GenerateArgs {
                input: self.path("routes.json"),
                config: Some(self.path("routetypes.toml")),
                ignore_head: false,
                outputs: vec![],
                targets: vec![],
                schema_out: None,
                check: false,
            }
        }
    }

    #[test]
    fn test_outputs_pair_with_targets() {
        let mut options = ExtractorOptions::default();
        let args = GenerateArgs {
            ignore_head: true,
            outputs: vec!["server.ts".into(), "client.ts".into()],
            targets: vec![Target::ServerTypes],
            ..Workspace::new().args()
        };

        apply_overrides(&mut options, &args).unwrap();
        assert!(options.ignore_head);
        assert_eq!(
            options.outputs,
            vec![
                Output::new("server.ts", OutputTarget::ServerTypes),
                Output::new("client.ts", OutputTarget::ClientTypes),
            ]
        );
    }

    #[test]
    fn test_extra_targets_are_rejected() {
        let args = GenerateArgs {
            outputs: vec!["a.ts".into()],
            targets: vec![Target::ServerTypes, Target::ClientTypes],
            ..Workspace::new().args()
        };
        let err = apply_overrides(&mut ExtractorOptions::default(), &args).unwrap_err();
        assert_eq!(err, "2 --target values given for 1 --output paths");
    }

    #[test]
    fn test_config_outputs_survive_without_flags() {
        let workspace = Workspace::new();
        let mut options = Config::read(&workspace.path("routetypes.toml"))
            .unwrap()
            .into_extractor_options();
        apply_overrides(&mut options, &workspace.args()).unwrap();
        assert_eq!(
            options.outputs,
            vec![Output::new(workspace.path("src/types.ts"), OutputTarget::ServerTypes)]
        );
    }

    #[test]
    fn test_render_diff() {
        assert_eq!(render_diff("a.ts", "same\n", "same\n"), None);

        let diff = render_diff("a.ts", "one\ntwo\n", "one\nthree\n").unwrap();
        assert!(diff.starts_with("\x1b[1m--- a.ts (current)\x1b[0m\n"));
        assert!(diff.contains(" one\n"));
        assert!(diff.contains("\x1b[31m-two\n\x1b[0m"));
        assert!(diff.contains("\x1b[32m+three\n\x1b[0m"));
    }

    #[tokio::test]
    async fn test_generate_then_check() {
        let workspace = Workspace::new();
        let types = workspace.path("src/types.ts");
        let schema = workspace.path("schema.json");
        let args = GenerateArgs {
            schema_out: Some(schema.clone()),
            ..workspace.args()
        };

        let check_args = GenerateArgs {
            check: true,
            ..args.clone()
        };
        let err = run_inner(check_args.clone()).await.unwrap_err();
        assert_eq!(err, "2 generated file(s) out of date");
        assert!(!types.exists());

        run_inner(args).await.unwrap();
        let text = std::fs::read_to_string(&types).unwrap();
        assert!(text.contains("export type Handler<"));
        assert!(text.contains("export type ItemsIdGetReply = Item;\n"));
        assert!(!text.contains("ItemsIdHead"));

        let document: Value =
            serde_json::from_str(&std::fs::read_to_string(&schema).unwrap()).unwrap();
        assert_eq!(document["title"], "API");

        run_inner(check_args.clone()).await.unwrap();

        std::fs::write(&types, "stale\n").unwrap();
        let err = run_inner(check_args).await.unwrap_err();
        assert_eq!(err, "1 generated file(s) out of date");
    }

    #[tokio::test]
    async fn test_disabled_config_writes_nothing() {
        let workspace = Workspace::new();
        std::fs::write(workspace.path("routetypes.toml"), "enabled = false\n").unwrap();
        let args = GenerateArgs {
            outputs: vec![workspace.path("out.ts")],
            ..workspace.args()
        };

        run_inner(args).await.unwrap();
        assert!(!workspace.path("out.ts").exists());
    }

    #[tokio::test]
    async fn test_no_outputs_is_an_error() {
        let workspace = Workspace::new();
        std::fs::write(workspace.path("routetypes.toml"), "").unwrap();
        let err = run_inner(workspace.args()).await.unwrap_err();
        assert!(err.starts_with("No outputs configured"));
    }
}
