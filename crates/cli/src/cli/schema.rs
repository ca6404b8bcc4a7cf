use clap::Args;
use routetypes_common::RouteSet;
use routetypes_core::{NameRegistry, build_schema};
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Route file (JSON or YAML)
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,
    /// Leave HEAD routes out of the document
    #[arg(long)]
    pub ignore_head: bool,
}

pub fn run(args: SchemaArgs) -> i32 {
    match schema_document(&args) {
        Ok(document) => {
            println!("{document}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn schema_document(args: &SchemaArgs) -> Result<String, String> {
    let (routes, definitions) = RouteSet::read(&args.input)?.into_parts()?;
    let schema = build_schema(&routes, &definitions, args.ignore_head, &mut NameRegistry::new());
    serde_json::to_string_pretty(&schema).map_err(|e| format!("Failed to serialize schema: {e}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_schema_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("routes.json");
        std::fs::write(
            &input,
            r#"{ "routes": [
                { "url": "/items", "method": ["GET", "HEAD"] }
            ] }"#,
        )
        .unwrap();

        let args = SchemaArgs {
            input: input.clone(),
            ignore_head: true,
        };
        let document: Value = serde_json::from_str(&schema_document(&args).unwrap()).unwrap();
        assert_eq!(document["title"], json!("API"));
        assert_eq!(document["properties"]["/items"]["required"], json!(["GET"]));
        assert_eq!(document["definitions"], json!({}));

        let args = SchemaArgs {
            input,
            ignore_head: false,
        };
        let document: Value = serde_json::from_str(&schema_document(&args).unwrap()).unwrap();
        assert_eq!(
            document["properties"]["/items"]["required"],
            json!(["GET", "HEAD"])
        );
    }

    #[test]
    fn test_missing_input() {
        let args = SchemaArgs {
            input: PathBuf::from("/definitely/not/here.json"),
            ignore_head: false,
        };
        assert!(schema_document(&args).unwrap_err().starts_with("Failed to read route file"));
        assert_eq!(run(args), 1);
    }
}
