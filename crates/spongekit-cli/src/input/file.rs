use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use spongekit_core::config::RunConfig;

/// Read a run configuration; `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
pub fn read_config(path: &str) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_config(&contents, is_yaml(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

fn parse_config(contents: &str, yaml: bool) -> Result<RunConfig, Box<dyn std::error::Error>> {
    if yaml {
        parse_yaml(contents)
    } else {
        Ok(serde_json::from_str(contents)?)
    }
}

fn parse_yaml<T: DeserializeOwned>(contents: &str) -> Result<T, Box<dyn std::error::Error>> {
    Ok(serde_yaml::from_str(contents)?)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()),
        Some(ref ext) if ext == "yaml" || ext == "yml"
    )
}

/// Resolve the path against the working directory and check it is a readable file.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("run.yaml")));
        assert!(is_yaml(Path::new("conf/RUN.YML")));
        assert!(!is_yaml(Path::new("run.json")));
        assert!(!is_yaml(Path::new("run")));
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
storm:
  kind: single_pulse
  total_depth_mm: "35"
baseline_runoff_coefficient: "0.85"
coverage_fractions: ["0.25", "0.5"]
measures: [INTENSIVE]
buildings:
  - id: hall
    roof_area_m2: "1200"
"#;
        let cfg = parse_config(yaml, true).unwrap();
        assert_eq!(cfg.storm.total_depth(), dec!(35));
        assert_eq!(cfg.baseline_runoff_coefficient, dec!(0.85));
        assert_eq!(cfg.buildings[0].id, "hall");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_json_config() {
        let cfg = parse_config(r#"{"buildings":[{"id":"a","roof_area_m2":"10"}]}"#, false).unwrap();
        assert_eq!(cfg.buildings.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        assert!(read_config("definitely/not/here.json").is_err());
    }
}
