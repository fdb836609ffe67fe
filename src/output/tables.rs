use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};
use jenkins_client::job::{Build, Category, InputItem, JenkinsItem, Job};
use jenkins_client::plugin::{AvailablePlugin, InstalledPlugin};

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn color_coded_status_cell(status: &str) -> Cell {
    let color = match status {
        "SUCCESS" => TableColor::Green,
        "UNSTABLE" | "BUILDING" => TableColor::Yellow,
        "FAILURE" => TableColor::Red,
        _ => TableColor::Grey,
    };
    Cell::new(status).fg(color)
}

fn yes_no(flag: bool) -> Cell {
    if flag {
        Cell::new("yes").fg(TableColor::Green)
    } else {
        Cell::new("no").fg(TableColor::DarkGrey)
    }
}

fn format_duration(millis: i64) -> String {
    let seconds = millis.max(0) / 1000;
    if seconds >= 60 {
        format!("{}m{:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

pub fn builds_table(builds: &[Build]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["#", "Status", "Started", "Duration", "Name"]);
    for build in builds {
        let started = build
            .started_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(build.number),
            color_coded_status_cell(build.status()),
            Cell::new(started),
            Cell::new(format_duration(build.duration)),
            Cell::new(&build.full_display_name),
        ]);
    }
    table
}

pub fn job_table(job: &Job) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Name", job.name.as_str()]);
    table.add_row(vec!["URL", job.url.as_str()]);
    table.add_row(vec!["Buildable", if job.buildable { "yes" } else { "no" }]);
    table.add_row(vec!["Next build".to_string(), job.next_build_number.to_string()]);
    table.add_row(vec!["Builds".to_string(), job.builds.len().to_string()]);
    for definition in job.parameter_definitions() {
        let default = definition.default_value().unwrap_or_default();
        table.add_row(vec![
            format!("Parameter {}", definition.name),
            format!("{} [{}]", default, definition.kind),
        ]);
    }
    table
}

pub fn items_table(items: &[JenkinsItem]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Name", "Full name", "Type", "URL"]);
    for item in items {
        table.add_row(vec![
            item.display_name.as_str(),
            item.full_name.as_str(),
            item.kind.as_str(),
            item.url.as_str(),
        ]);
    }
    table
}

pub fn categories_table(categories: &[Category]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Category", "Type", "Class"]);
    for category in categories {
        for item in &category.items {
            table.add_row(vec![
                category.name.as_str(),
                item.display_name.as_str(),
                item.class.as_str(),
            ]);
        }
    }
    table
}

pub fn inputs_table(inputs: &[InputItem]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Id", "Message", "Parameters"]);
    for input in inputs {
        let parameters = input
            .inputs
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![input.id.clone(), input.message.clone(), parameters]);
    }
    table
}

pub fn installed_plugins_table(plugins: &[InstalledPlugin]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Name", "Version", "Active", "Update"]);
    for plugin in plugins {
        table.add_row(vec![
            Cell::new(&plugin.short_name),
            Cell::new(&plugin.version),
            yes_no(plugin.active),
            yes_no(plugin.has_update),
        ]);
    }
    table
}

pub fn available_plugins_table(plugins: &[AvailablePlugin]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Name", "Title", "Installed"]);
    for plugin in plugins {
        table.add_row(vec![
            Cell::new(&plugin.name),
            Cell::new(plugin.title.as_deref().unwrap_or_default()),
            yes_no(plugin.installed),
        ]);
    }
    table
}
