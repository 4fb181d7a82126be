use std::{collections::HashMap, path::PathBuf};
use serde::Serialize;
use tracing::debug;
use crate::{
    error::CclError,
    gen_go::GoBackend,
    gen_rust::RustBackend,
    planner::{plan_definition, ModelPlan},
    types::{Definition, Model},
};

/// First line of every generated artifact.
pub const GENERATED_HEADER: &str = "// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.";

/// Backend identifiers accepted by [backend_for].
pub const BACKENDS: [&str; 2] = ["go", "rust"];

/// The logical output categories, plus the optional module index some
/// languages need to tie the others together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    Constants,
    Vars,
    Types,
    Helpers,
    Methods,
    Index,
}

/// Emission and write order.
pub const ARTIFACT_ORDER: [ArtifactKind; 5] = [
    ArtifactKind::Constants,
    ArtifactKind::Vars,
    ArtifactKind::Types,
    ArtifactKind::Helpers,
    ArtifactKind::Methods,
];

impl ArtifactKind {
    /// File stem shared by every backend.
    pub fn stem(self) -> &'static str {
        match self {
            ArtifactKind::Constants => "constants",
            ArtifactKind::Vars      => "vars",
            ArtifactKind::Types     => "types",
            ArtifactKind::Helpers   => "helpers",
            ArtifactKind::Methods   => "methods",
            ArtifactKind::Index     => "mod",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind:      ArtifactKind,
    pub file_name: String,
    pub contents:  String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Explicit package/namespace; falls back to the schema's `package`
    /// declaration, then to the output directory's name.
    pub package_name: Option<String>,
    pub output_dir:   PathBuf,
    pub backend:      String,
}

impl GenerateOptions {
    pub fn new(backend: &str, output_dir: impl Into<PathBuf>) -> GenerateOptions {
        GenerateOptions {
            package_name: None,
            output_dir: output_dir.into(),
            backend: backend.to_string(),
        }
    }

    pub fn with_package(mut self, package_name: &str) -> GenerateOptions {
        self.package_name = Some(package_name.to_string());
        self
    }

    /// The effective package name, or an empty string when nothing names one.
    pub fn resolve_package_name(&self, definition: &Definition) -> String {
        if let Some(name) = self.package_name.as_deref().filter(|name| !name.is_empty()) {
            return name.to_string();
        }
        if let Some(name) = definition.package.as_deref() {
            return name.to_string();
        }
        self.output_dir
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| {
                name.chars()
                    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Everything a backend reads while emitting: the definition, its plans
/// and the resolved package name.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    pub definition:   &'a Definition,
    pub plans:        Vec<ModelPlan>,
    pub package_name: String,
}

impl<'a> GenerationContext<'a> {
    pub fn new(definition: &'a Definition, package_name: &str) -> Result<GenerationContext<'a>, CclError> {
        Ok(GenerationContext {
            definition,
            plans: plan_definition(definition)?,
            package_name: package_name.to_string(),
        })
    }

    /// Models paired with their plans, in declaration order.
    pub fn models(&self) -> impl Iterator<Item = (&Model, &ModelPlan)> {
        self.definition.models.iter().zip(self.plans.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.definition.models.is_empty()
    }

    pub fn uses_timestamps(&self) -> bool {
        self.plans
            .iter()
            .any(|plan| plan.fields.iter().any(|field| field.uses_timestamp()))
    }
}

/// One target language. Each category method returns `Ok(None)` when it has
/// nothing to contribute, in which case no file is written for it.
pub trait Backend {
    /// The identifier used to select this backend.
    fn name(&self) -> &'static str;

    /// File extension of generated sources, without the dot.
    fn extension(&self) -> &'static str;

    /// Rejects schemas whose names cannot be emitted as legal, unambiguous
    /// identifiers in this language. Runs before any artifact is produced.
    fn check_names(&self, _ctx: &GenerationContext) -> Result<(), CclError> {
        Ok(())
    }

    fn constants(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError>;
    fn vars(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError>;
    fn types(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError>;
    fn helpers(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError>;
    fn methods(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError>;

    /// A module index over the artifacts that were produced.
    fn index(&self, _ctx: &GenerationContext, _written: &[ArtifactKind]) -> Option<String> {
        None
    }

    fn file_name(&self, kind: ArtifactKind) -> String {
        format!("{}.{}", kind.stem(), self.extension())
    }
}

pub fn backend_for(name: &str) -> Result<Box<dyn Backend>, CclError> {
    match name {
        "go"   => Ok(Box::new(GoBackend)),
        "rust" => Ok(Box::new(RustBackend)),
        other  => Err(CclError::UnknownBackend(other.to_string())),
    }
}

/// Produces every artifact of `definition` for the backend named in
/// `options`, entirely in memory. Any failure rejects the whole set.
pub fn emit(definition: &Definition, options: &GenerateOptions) -> Result<Vec<Artifact>, CclError> {
    let backend = backend_for(&options.backend)?;
    let package_name = options.resolve_package_name(definition);
    let ctx = GenerationContext::new(definition, &package_name)
        .map_err(|e| e.for_backend(backend.name()))?;
    backend.check_names(&ctx)?;

    let mut artifacts = Vec::new();
    for kind in ARTIFACT_ORDER {
        let contents = match kind {
            ArtifactKind::Constants => backend.constants(&ctx),
            ArtifactKind::Vars      => backend.vars(&ctx),
            ArtifactKind::Types     => backend.types(&ctx),
            ArtifactKind::Helpers   => backend.helpers(&ctx),
            ArtifactKind::Methods   => backend.methods(&ctx),
            ArtifactKind::Index     => Ok(None),
        }
        .map_err(|e| e.for_backend(backend.name()))?;

        match contents {
            Some(contents) => {
                debug!(backend = backend.name(), ?kind, bytes = contents.len(), "emitted artifact");
                artifacts.push(Artifact { kind, file_name: backend.file_name(kind), contents });
            }
            None => debug!(backend = backend.name(), ?kind, "nothing to emit"),
        }
    }

    let written: Vec<ArtifactKind> = artifacts.iter().map(|artifact| artifact.kind).collect();
    if let Some(contents) = backend.index(&ctx, &written) {
        artifacts.push(Artifact {
            kind: ArtifactKind::Index,
            file_name: backend.file_name(ArtifactKind::Index),
            contents,
        });
    }

    Ok(artifacts)
}

/// The first pair of source names that map to the same generated name.
pub fn first_clash<'n>(names: impl IntoIterator<Item = (&'n str, String)>) -> Option<(&'n str, &'n str, String)> {
    let mut seen: HashMap<String, &'n str> = HashMap::new();
    for (source, generated) in names {
        if let Some(previous) = seen.insert(generated.clone(), source) {
            return Some((previous, source, generated));
        }
    }
    None
}

/// Pushes `block` onto `lines` with every non-empty line indented `depth` tabs.
pub fn indent_block(lines: &mut Vec<String>, block: &[String], depth: usize, unit: &str) {
    let pad = unit.repeat(depth);
    for line in block {
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{}{}", pad, line));
        }
    }
}
