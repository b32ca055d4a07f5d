//! Extension → language map. Unknown extensions pass through as `unknown`.

pub fn detect_language(path: &str) -> String {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    let lang = match ext.as_str() {
        "go" => "go",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" | "pyi" => "python",
        "rs" => "rust",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        "sh" | "bash" | "zsh" => "shell",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "xml" => "xml",
        "md" => "markdown",
        "html" => "html",
        "css" | "scss" => "css",
        _ => "unknown",
    };
    lang.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extensions() {
        assert_eq!(detect_language("src/main.rs"), "rust");
        assert_eq!(detect_language("api/routes.tsx"), "typescript");
        assert_eq!(detect_language("Makefile.toml"), "toml");
    }

    #[test]
    fn unknown_extension_falls_through() {
        assert_eq!(detect_language("LICENSE"), "unknown");
        assert_eq!(detect_language("script.zig"), "unknown");
    }
}
