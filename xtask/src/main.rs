use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use recprio_domain::RuleTables;
use serde::Serialize;
use std::path::Path;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by recprio.
    PrintSchemas,
    /// Create a sample input layout (data/recommendations.json, data/text/<sector>/, recprio.toml).
    InitInputs {
        #[arg(long, default_value = ".")]
        dir: String,

        /// Write the built-in rule tables into recprio.toml so they can be edited in place.
        #[arg(long, default_value_t = false)]
        with_rules: bool,
    },
    /// Bless golden fixtures (overwrite expected outputs).
    BlessFixtures,
}

const SECTORS: &[&str] = &["energy", "finance", "labour", "trade", "transport"];

const CONFIG_TEMPLATE: &str = r#"# recprio configuration. Command-line flags override these values.

[pipeline]
input = "data/recommendations.json"
out_dir = "artifacts/recprio"
dedup_threshold = 0.85
top_roi = 100
top_growth = 200

[output]
workbook = true
memo = true
"#;

#[derive(Serialize)]
struct RulesSection<'a> {
    rules: &'a RuleTables,
}

fn sample_table() -> serde_json::Value {
    serde_json::json!({
        "recommendations": [
            {
                "id": "lab-2024-01",
                "year": 2024,
                "sector": "labour",
                "report": "BRRR 2024",
                "recommendation": "Report to all citizens on the unemployment guideline for small business."
            },
            {
                "id": "en-2023-01",
                "year": 2023,
                "sector": "energy",
                "report": "BRRR 2023",
                "recommendation": "Eskom should publish a plan to end load shedding in the Western Cape."
            }
        ]
    })
}

fn init_inputs(dir: &Path, with_rules: bool) -> anyhow::Result<()> {
    let data = dir.join("data");
    for sector in SECTORS {
        let sector_dir = data.join("text").join(sector);
        fs::create_dir_all(&sector_dir)
            .with_context(|| format!("create {}", sector_dir.display()))?;
    }

    let table = data.join("recommendations.json");
    if !table.exists() {
        fs::write(&table, serde_json::to_string_pretty(&sample_table())?)?;
    }

    let config = dir.join("recprio.toml");
    if !config.exists() {
        let mut contents = CONFIG_TEMPLATE.to_string();
        if with_rules {
            let rules = toml::to_string(&RulesSection {
                rules: &RuleTables::default(),
            })
            .context("serialize built-in rule tables")?;
            contents.push('\n');
            contents.push_str(&rules);
        }
        fs::write(&config, contents)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", recprio_types::schema::RECPRIO_SCORED_V1);
            println!("{}", recprio_types::schema::RECPRIO_SUMMARY_V1);
            println!("{}", recprio_types::schema::RECPRIO_REPORT_V1);
        }
        Command::InitInputs { dir, with_rules } => {
            init_inputs(Path::new(&dir), with_rules)?;
            println!(
                "initialized {dir}/data/recommendations.json, {dir}/data/text/{{{}}} and {dir}/recprio.toml",
                SECTORS.join(",")
            );
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "recprio-core", "--test", "golden_fixtures"])
                .env("RECPRIO_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_inputs_creates_layout_and_keeps_existing_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_inputs(temp.path(), false).expect("init");

        for sector in SECTORS {
            assert!(temp.path().join("data").join("text").join(sector).is_dir());
        }
        let table: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(temp.path().join("data").join("recommendations.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(table["recommendations"].as_array().map(Vec::len), Some(2));

        fs::write(temp.path().join("recprio.toml"), "# mine\n").unwrap();
        init_inputs(temp.path(), true).expect("rerun");
        assert_eq!(
            fs::read_to_string(temp.path().join("recprio.toml")).unwrap(),
            "# mine\n"
        );
    }

    #[test]
    fn rules_section_parses_back_into_builtin_tables() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_inputs(temp.path(), true).expect("init");

        #[derive(serde::Deserialize)]
        struct Doc {
            rules: RuleTables,
        }
        let doc: Doc =
            toml::from_str(&fs::read_to_string(temp.path().join("recprio.toml")).unwrap())
                .expect("parse written config");
        assert_eq!(doc.rules, RuleTables::default());
    }
}
