use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    tool: &'static str,
    version: &'static str,
    generated_at: String,
    #[serde(flatten)]
    body: &'a T,
}

/// Writes `value` as pretty JSON wrapped with tool metadata.
pub fn write_json<T: Serialize>(value: &T, out: &Path) -> anyhow::Result<()> {
    let artifact = Artifact {
        tool: "codematch",
        version: env!("CARGO_PKG_VERSION"),
        generated_at: chrono::Utc::now().to_rfc3339(),
        body: value,
    };
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, serde_json::to_string_pretty(&artifact)?)?;
    Ok(())
}
