//! Scaffolds a default config file and a starter rule set under `dir`.

use std::path::Path;

use crate::config_loader;

const STARTER_RULES: &str = r#"- id: todo-comment
  name: "Unresolved TODO"
  severity: info
  type: style
  pattern: "TODO"
  presets: [standard, strict]
- id: console-debug
  name: "Leftover debug print"
  severity: warning
  type: best_practice
  pattern: "console\\.log\\("
  languages: [javascript, typescript]
  presets: [standard, strict]
"#;

pub fn run(dir: &Path) -> anyhow::Result<Vec<String>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let config_path = dir.join(config_loader::DEFAULT_CONFIG_FILE);
    if !config_path.exists() {
        std::fs::write(&config_path, config_loader::default_config_toml())?;
        written.push(config_path.display().to_string());
    }

    let rules_dir = dir.join("rules");
    std::fs::create_dir_all(&rules_dir)?;
    let rules_path = rules_dir.join("standard.yml");
    if !rules_path.exists() {
        std::fs::write(&rules_path, STARTER_RULES)?;
        written.push(rules_path.display().to_string());
    }

    Ok(written)
}
