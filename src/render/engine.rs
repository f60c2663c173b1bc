//! Bundled template engines.
//!
//! Both engines support plain `{{ name }}` / `{{ user.email }}` variable
//! substitution, enough for the CLI and for tests. Production deployments
//! plug a real engine in behind [`super::TemplateEngine`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::render::TemplateEngine;

static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_.]*)\s*\}\}").unwrap());

/// Substitutes `{{ dotted.path }}` placeholders from the context.
/// Unresolved placeholders render empty, matching lenient engine behavior.
fn substitute(source: &str, context: &Map<String, JsonValue>) -> String {
    VAR_PATTERN
        .replace_all(source, |caps: &regex::Captures<'_>| {
            let path = &caps[1];
            match lookup(context, path) {
                Some(JsonValue::String(s)) => s.clone(),
                Some(value) => value.to_string(),
                None => {
                    debug!(variable = path, "unresolved template variable");
                    String::new()
                }
            }
        })
        .into_owned()
}

fn lookup<'a>(context: &'a Map<String, JsonValue>, path: &str) -> Option<&'a JsonValue> {
    let mut parts = path.split('.');
    let mut current = context.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// Filesystem-backed engine reading templates under a root directory.
#[derive(Debug, Clone)]
pub struct DirTemplates {
    root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateEngine for DirTemplates {
    fn render(&self, path: &str, context: &Map<String, JsonValue>) -> AppResult<String> {
        let file = self.root.join(path);
        let source = match std::fs::read_to_string(&file) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::TemplateNotFound {
                    name: path.to_string(),
                })
            }
            Err(e) => {
                return Err(AppError::Template {
                    name: path.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        Ok(substitute(&source, context))
    }
}

/// In-memory engine over registered template sources.
#[derive(Debug, Clone, Default)]
pub struct MapTemplates {
    templates: HashMap<String, String>,
}

impl MapTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(path.into(), source.into());
        self
    }
}

impl TemplateEngine for MapTemplates {
    fn render(&self, path: &str, context: &Map<String, JsonValue>) -> AppResult<String> {
        match self.templates.get(path) {
            Some(source) => Ok(substitute(source, context)),
            None => Err(AppError::TemplateNotFound {
                name: path.to_string(),
            }),
        }
    }
}
