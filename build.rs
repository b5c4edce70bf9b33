use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_LOCALE: &str = "en-US";

fn main() {
    let locales_dir = Path::new("locales");
    println!("cargo:rerun-if-changed={}", locales_dir.display());

    let mut locales = BTreeMap::new();
    let entries = fs::read_dir(locales_dir)
        .unwrap_or_else(|error| panic!("failed to read {}: {error}", locales_dir.display()));
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        println!("cargo:rerun-if-changed={}", path.display());

        let source = fs::read_to_string(&path)
            .unwrap_or_else(|error| panic!("failed to read {}: {error}", path.display()));
        let table = source
            .parse::<toml::Table>()
            .unwrap_or_else(|error| panic!("invalid locale file {}: {error}", path.display()));
        let mut entries = BTreeMap::new();
        flatten("", &table, &mut entries);
        locales.insert(locale.to_string(), entries);
    }

    let mut generated = String::new();
    let _ = writeln!(generated, "pub const DEFAULT_LOCALE: &str = {DEFAULT_LOCALE:?};");
    let _ = writeln!(generated, "pub static LOCALES: &[(&str, &[(&str, &str)])] = &[");
    for (locale, entries) in &locales {
        let _ = writeln!(generated, "    ({locale:?}, &[");
        for (key, value) in entries {
            let _ = writeln!(generated, "        ({key:?}, {value:?}),");
        }
        let _ = writeln!(generated, "    ]),");
    }
    let _ = writeln!(generated, "];");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("leadform_i18n_generated.rs"), generated)
        .expect("failed to write generated i18n catalog");
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                out.insert(path, text.clone());
            }
            toml::Value::Table(nested) => flatten(&path, nested, out),
            other => panic!("locale entry `{path}` must be a string or table, found {other}"),
        }
    }
}
