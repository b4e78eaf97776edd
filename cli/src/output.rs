//! Output utilities for CLI tools.

use std::{fs::File, io::Write};

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

impl OutputFormat {
    /// Maps the `--json` flag to a format.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Yaml }
    }
}

/// Output configuration.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// Renders a value in the configured format.
    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }

    /// Outputs the result.
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        self.write_text(&output)
    }

    /// Writes pre-rendered text to the output file or stdout.
    pub fn write_text(&self, text: &str) -> anyhow::Result<()> {
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(text.as_bytes())?;
            }
            None => {
                print!("{}", text);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_formats() {
        let value = json!({"samples": 2, "fraudsters": 1});

        let yaml = Output::new(OutputFormat::Yaml, None).render(&value).unwrap();
        assert!(yaml.contains("samples: 2"));

        let out = Output::new(OutputFormat::from_json_flag(true), None)
            .render(&value)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let output = Output::new(OutputFormat::Yaml, Some(path.to_string_lossy().into_owned()));
        output.write(&json!({"id": "call-1"})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "id: call-1");
    }
}
