//! Format-preserving rewrites of manifest files.
//!
//! A manifest is read once, each platform's provider list is offered to a
//! transform, and only the provider arrays the transform actually changed
//! are patched back into the original text. Comments, whitespace and any
//! members this tool does not model survive byte for byte.

use super::error::Result;
use super::jsonc;
use super::types::{ArtifactInfo, Manifest, Provider, sanitize_file_name_component};
use super::validator::StructuralValidator;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Reads, transforms and (when anything changed) rewrites one manifest.
///
/// The transform sees each platform's providers in file order; returning
/// `None` means "leave this platform untouched", while a returned list
/// always rewrites the span, even if it is semantically equal to the input.
///
/// The file is validated with the external launcher before it is touched and
/// again after a rewrite; a failure of the second validation means the edit
/// broke the file and is reported as-is rather than swallowed. Writes happen
/// at most once, and only when the text actually changed.
pub fn process_manifest_in_place<F>(
    path: &Path,
    validator: &dyn StructuralValidator,
    mut transform: F,
) -> Result<()>
where
    F: FnMut(&[Provider], &str, &ArtifactInfo) -> Result<Option<Vec<Provider>>>,
{
    validator.validate(path)?;

    let original = fs::read_to_string(path)?;
    let (shebang, body) = split_shebang(&original);
    let manifest: Manifest = serde_json::from_value(jsonc::parse(body)?)?;

    let mut working = body.to_string();
    for (platform, spec) in &manifest.platforms {
        let suggested = suggested_filename(&manifest.name, platform, spec.format.as_deref());
        let info = spec.artifact_info();
        let Some(new_providers) = transform(&spec.providers, &suggested, &info)? else {
            continue;
        };
        working = patch_providers(&working, platform, &new_providers)?;
    }

    if working != body {
        fs::write(path, format!("{shebang}{working}"))?;
        validator.validate(path)?;
    }
    Ok(())
}

/// `sanitize(name)-platform[.format]` — the file name an asset for this
/// platform is published under.
pub fn suggested_filename(name: &str, platform: &str, format: Option<&str>) -> String {
    let mut filename = format!("{}-{}", sanitize_file_name_component(name), platform);
    if let Some(format) = format {
        filename.push('.');
        filename.push_str(format);
    }
    filename
}

fn split_shebang(contents: &str) -> (&str, &str) {
    if contents.starts_with("#!") {
        match contents.find('\n') {
            Some(end) => contents.split_at(end + 1),
            None => (contents, ""),
        }
    } else {
        ("", contents)
    }
}

fn patch_providers(text: &str, platform: &str, providers: &[Provider]) -> Result<String> {
    let path = ["platforms", platform, "providers"];
    let span = jsonc::value_span(text, &path)?;
    let rendered = render_array(providers, line_indent(text, span.start))?;
    Ok(jsonc::replace_value(text, &path, &rendered)?)
}

/// Pretty-prints the provider array with four-space steps and re-indents
/// every continuation line to sit under the `providers` key it replaces.
fn render_array(providers: &[Provider], base_indent: &str) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    providers.serialize(&mut serializer)?;
    let pretty = String::from_utf8_lossy(&buf).into_owned();

    let mut out = String::with_capacity(pretty.len());
    for (i, line) in pretty.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(base_indent);
        }
        out.push_str(line);
    }
    Ok(out)
}

/// Leading whitespace of the line `offset` sits on.
fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = &text[line_start..offset];
    &line[..line.len() - line.trim_start().len()]
}
