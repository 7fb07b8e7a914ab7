//! Jinja template rendering against per-device YAML variables.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use minijinja::Environment;
use serde_yaml::{Mapping, Value};

use crate::error::TemplateError;

/// A template read from disk, rendered once per device.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    source: String,
}

impl Template {
    /// Read a template file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        let path = path.into();
        let source = fs::read_to_string(&path).map_err(|source| TemplateError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, source })
    }

    /// Build a template from text, for callers that do not read files.
    pub fn from_source(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render with `vars` as the template context.
    pub fn render(&self, vars: &Mapping) -> Result<String, TemplateError> {
        debug!("rendering {:?} with {} variables", self.path, vars.len());
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.render_str(&self.source, vars)
            .map_err(|source| TemplateError::Render {
                path: self.path.clone(),
                source,
            })
    }
}

/// Load a per-device variables file.
///
/// An empty file (or one holding only comments) means no variables.
pub fn load_vars(path: &Path) -> Result<Mapping, TemplateError> {
    let text = fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_vars(path, &text)
}

fn parse_vars(path: &Path, text: &str) -> Result<Mapping, TemplateError> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value = serde_yaml::from_str(text).map_err(|source| TemplateError::Vars {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Mapping(vars) => Ok(vars),
        Value::Null => Ok(Mapping::new()),
        _ => Err(TemplateError::VarsNotMapping {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ACCESS_PORT: &str = "\
interfaces {
{% for port in ports %}
    {{ port.name }} {
        description \"{{ port.description }}\";
    }
{% endfor %}
}
";

    #[test]
    fn test_render_with_vars() {
        let vars = parse_vars(
            Path::new("sw1.yml"),
            "ports:\n  - name: ge-0/0/1\n    description: printer\n",
        )
        .unwrap();
        let template = Template::from_source("access.j2", ACCESS_PORT);

        let text = template.render(&vars).unwrap();
        assert!(text.contains("ge-0/0/1 {"));
        assert!(text.contains("description \"printer\";"));
        assert!(text.ends_with("}\n"));
    }

    #[test]
    fn test_empty_vars_file() {
        assert!(parse_vars(Path::new("sw1.yml"), "").unwrap().is_empty());
        assert!(parse_vars(Path::new("sw1.yml"), "# nothing yet\n").unwrap().is_empty());
    }

    #[test]
    fn test_vars_must_be_mapping() {
        let err = parse_vars(Path::new("sw1.yml"), "- a\n- b\n").unwrap_err();
        assert!(matches!(err, TemplateError::VarsNotMapping { .. }));
    }

    #[test]
    fn test_bad_yaml() {
        let err = parse_vars(Path::new("sw1.yml"), "ports: [unclosed").unwrap_err();
        assert!(matches!(err, TemplateError::Vars { .. }));
    }

    #[test]
    fn test_render_error() {
        let template = Template::from_source("broken.j2", "{% for x in %}");
        let err = template.render(&Mapping::new()).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".j2").tempfile().unwrap();
        write!(file, "system {{ host-name {{{{ hostname }}}}; }}").unwrap();

        let template = Template::load(file.path()).unwrap();
        let mut vars = Mapping::new();
        vars.insert("hostname".into(), "sw1".into());
        assert_eq!(template.render(&vars).unwrap(), "system { host-name sw1; }");

        assert!(matches!(
            Template::load("/nonexistent/template.j2"),
            Err(TemplateError::Read { .. })
        ));
    }
}
