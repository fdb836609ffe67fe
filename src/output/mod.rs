mod styling;
mod tables;

use anyhow::Result;
use jenkins_client::OutputFormat;
use serde::Serialize;

pub use styling::{muted, report, title, Outcome};
pub use tables::{
    available_plugins_table, builds_table, categories_table, installed_plugins_table,
    inputs_table, items_table, job_table,
};

/// Prints the `jclient` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        title("jclient"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Jenkins command line client")
    );
}

/// Serializes `value` as JSON or YAML; `None` for table output.
pub fn render<T: Serialize>(value: &T, format: OutputFormat, pretty: bool) -> Result<Option<String>> {
    let text = match format {
        OutputFormat::Table => return Ok(None),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(Some(text))
}

/// Prints `value` in the structured format, or the table `table` builds.
pub fn emit<T, F>(value: &T, format: OutputFormat, pretty: bool, table: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> comfy_table::Table,
{
    match render(value, format, pretty)? {
        Some(text) => println!("{}", text.trim_end()),
        None => println!("{}", table(value)),
    }
    Ok(())
}
