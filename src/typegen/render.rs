use super::{Resolution, ResolvedCategory};
use std::fmt::Write;

pub const DEFAULT_PREFIX: &str = "psyco";

/// Renders the per-category value arrays, each terminated by a 0 sentinel
pub fn render_arrays(resolution: &Resolution, prefix: &str) -> String {
    let mut out = String::new();
    for category in &resolution.categories {
        let _ = writeln!(
            out,
            "static int {}_cast_types_{}[] = {};",
            prefix,
            category.name,
            array_initializer(category)
        );
    }
    out
}

/// Renders the init-list table, terminated by a NULL row
pub fn render_table(resolution: &Resolution, prefix: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{p}_DBAPIInitList {p}_cast_types[] = {{", p = prefix);
    for category in &resolution.categories {
        let _ = writeln!(
            out,
            "    {{\"{c}\", {p}_cast_types_{c}, {p}_{c}_cast}},",
            p = prefix,
            c = category.name
        );
    }
    out.push_str("    {NULL, NULL, NULL}\n};\n");
    out
}

/// Both blocks, separated by a blank line
pub fn render(resolution: &Resolution, prefix: &str) -> String {
    format!(
        "{}\n{}",
        render_arrays(resolution, prefix),
        render_table(resolution, prefix)
    )
}

fn array_initializer(category: &ResolvedCategory) -> String {
    let values: Vec<String> = category
        .values
        .iter()
        .map(|v| v.to_string())
        .chain(std::iter::once("0".to_string()))
        .collect();
    format!("{{{}}}", values.join(", "))
}
