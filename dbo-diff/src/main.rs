use crate::cli::{Commands, DiffArgs};
use clap::Parser;
use dbo_tools::{diff_with_provider, objects_from_json, Bucket, DboObject, DiffOptions, DiffResult, Result, SnapshotProvider, STATEMENT_SEPARATOR};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let output = run(cli).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}

#[instrument(skip_all)]
async fn run(cli: cli::Cli) -> Result<String> {
    let options = get_diff_options(cli.full, cli.keep);

    match cli.command {
        Commands::Diff(diff_args) => do_diff(diff_args, &options).await,
        Commands::Create { new } => do_create(&new, &options).await,
    }
}

fn get_diff_options(full: bool, keep: Vec<String>) -> DiffOptions {
    let options = if full { DiffOptions::full() } else { DiffOptions::default() };

    if keep.is_empty() {
        options
    } else {
        options.with_keep_removed(move |name, _table| keep.iter().any(|k| k == name))
    }
}

async fn load_objects(path: &str) -> Result<Vec<DboObject>> {
    let json = tokio::fs::read_to_string(path).await?;
    objects_from_json(&json)
}

#[instrument(skip_all)]
async fn do_diff(diff_args: DiffArgs, options: &DiffOptions) -> Result<String> {
    let new_objects = load_objects(&diff_args.new).await?;

    let provider = match &diff_args.old {
        Some(path) => SnapshotProvider::new(load_objects(path).await?),
        None => SnapshotProvider::default(),
    };

    info!(new = new_objects.len(), old = provider.len(), "diffing objects");

    let mut results = Vec::with_capacity(new_objects.len());
    for object in &new_objects {
        results.push(diff_with_provider(&provider, object, options).await?);
    }

    Ok(if diff_args.print_buckets {
        render_buckets(&results)
    } else {
        render_scripts(&results)
    })
}

#[instrument(skip_all)]
async fn do_create(path: &str, options: &DiffOptions) -> Result<String> {
    let mut results = Vec::new();
    for object in load_objects(path).await? {
        results.push(object.diff(None, options)?);
    }

    Ok(render_scripts(&results))
}

fn render_scripts(results: &[DiffResult]) -> String {
    results
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| r.to_script())
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}

fn render_buckets(results: &[DiffResult]) -> String {
    let mut lines = Vec::new();

    for bucket in Bucket::ALL {
        let statements: Vec<&String> = results.iter().flat_map(|r| r.bucket(bucket)).collect();
        if statements.is_empty() {
            continue;
        }

        lines.push(format!("-- {}", bucket.name()));
        lines.extend(statements.into_iter().cloned());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> String {
        let path: PathBuf = std::env::temp_dir().join(format!("dbo-diff-{}-{}.json", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    const OLD_TABLE: &str = indoc! {r#"
        {
            "kind": "table",
            "schema": "public",
            "name": "people",
            "columns": [
                { "name": "id", "data_type": "int4", "required": true },
                { "name": "nickname", "data_type": "text" }
            ],
            "constraints": [
                { "name": "people_pkey", "type": "primary", "columns": ["id"], "definition": "PRIMARY KEY (id)" },
                { "name": "people_nickname_key", "type": "unique", "columns": ["nickname"], "definition": "UNIQUE (nickname)" }
            ]
        }
    "#};

    const NEW_TABLE: &str = indoc! {r#"
        [{
            "kind": "table",
            "schema": "public",
            "name": "people",
            "columns": [
                { "name": "id", "data_type": "int4", "required": true },
                { "name": "email", "data_type": "text", "required": true }
            ],
            "constraints": [
                { "name": "people_pkey", "type": "primary", "columns": ["id"], "definition": "PRIMARY KEY (id)" },
                { "name": "people_email_key", "type": "unique", "columns": ["email"], "definition": "UNIQUE (email)" }
            ]
        }]
    "#};

    fn cli(command: Commands, keep: Vec<String>) -> cli::Cli {
        cli::Cli {
            command,
            full: false,
            keep,
        }
    }

    #[tokio::test]
    async fn diff_prints_ordered_script() {
        let old = write_temp("ordered-old", OLD_TABLE);
        let new = write_temp("ordered-new", NEW_TABLE);

        let output = run(cli(Commands::Diff(DiffArgs {
            new,
            old: Some(old),
            print_buckets: false,
        }), vec![])).await.unwrap();

        assert_eq!(output.replace(STATEMENT_SEPARATOR, "\n"), indoc! {"
            alter table public.people drop constraint if exists people_nickname_key;
            alter table public.people drop column if exists nickname;
            alter table public.people add column email text;
            alter table public.people add constraint people_email_key UNIQUE (email);
            alter table public.people alter column email set not null;"}.trim_end_matches('\n'));
    }

    #[tokio::test]
    async fn diff_prints_buckets_and_keeps_listed_names() {
        let old = write_temp("buckets-old", OLD_TABLE);
        let new = write_temp("buckets-new", NEW_TABLE);

        let output = run(cli(Commands::Diff(DiffArgs {
            new,
            old: Some(old),
            print_buckets: true,
        }), vec!["people_nickname_key".to_string()])).await.unwrap();

        assert_eq!(output, indoc! {"
            -- unsafedrop
            alter table public.people drop column if exists nickname;
            -- main
            alter table public.people add column email text;
            -- pkey
            alter table public.people add constraint people_email_key UNIQUE (email);
            -- end
            alter table public.people alter column email set not null;"}.trim_end_matches('\n'));
    }

    #[tokio::test]
    async fn create_renders_from_scratch() {
        let new = write_temp("create-new", OLD_TABLE);

        let output = run(cli(Commands::Create { new }, vec![])).await.unwrap();

        assert!(output.starts_with("create table public.people ();\r\n"));
        assert!(output.ends_with("alter table public.people alter column id set not null;"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = run(cli(Commands::Create { new: "/nonexistent/dbo-diff.json".to_string() }, vec![])).await;

        assert!(matches!(result, Err(dbo_tools::DboToolsError::IoError(_))));
    }
}
