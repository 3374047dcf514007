//! JSON reports of a domain operation, with an optional provenance sidecar.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

use polka::api::{Domain, Interval, Outcome, PolyError, Polyhedron};

/// Range of a bounded expression; `None` is infinite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundReport {
    pub inf: Option<String>,
    pub sup: Option<String>,
}

impl From<&Interval> for BoundReport {
    fn from(itv: &Interval) -> Self {
        Self {
            inf: itv.inf.as_ref().map(|q| q.to_string()),
            sup: itv.sup.as_ref().map(|q| q.to_string()),
        }
    }
}

/// Result of one CLI operation.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub op: String,
    pub int_dims: usize,
    pub real_dims: usize,
    pub strict: bool,
    pub exact: String,
    pub best: String,
    pub bottom: String,
    pub constraints: Vec<String>,
    pub generators: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<BoundReport>,
}

impl Report {
    /// Describe `out.value`, exporting both of its systems.
    pub fn of_outcome(op: &str, dom: &Domain, out: &Outcome<Polyhedron>) -> Result<Self, PolyError> {
        let p = &out.value;
        Ok(Self {
            op: op.to_string(),
            int_dims: p.int_dims(),
            real_dims: p.real_dims(),
            strict: dom.cfg().strict,
            exact: out.exact.to_string(),
            best: out.best.to_string(),
            bottom: p.is_bottom(dom)?.to_string(),
            constraints: p.to_constraints(dom)?.iter().map(|c| c.to_string()).collect(),
            generators: p.to_generators(dom)?.iter().map(|g| g.to_string()).collect(),
            bound: None,
        })
    }
}

/// Metadata used to generate a provenance sidecar.
pub struct Payload {
    pub params: Value,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self { params }
    }
}

/// Write `report` to `path` as pretty JSON.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating report dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(report)?).with_context(|| format!("writing {}", path.display()))
}

/// Write `<artifact>.provenance.json` containing the git commit, callsite, params, and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "polka_version": polka::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "params": payload.params,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("report"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polka::api::Tbool;
    use polka::num::rat;
    use tempfile::tempdir;

    fn sample() -> Report {
        let dom = Domain::default();
        let p = Polyhedron::of_box(&dom, 0, 1, &[Interval::closed(rat(0), rat(2))]).unwrap();
        Report::of_outcome("minimize", &dom, &p).unwrap()
    }

    #[test]
    fn provenance_path_rewrites_extension() {
        let base = Path::new("/tmp/output/run.json");
        assert_eq!(provenance_path(base), Path::new("/tmp/output/run.provenance.json"));
    }

    #[test]
    fn report_lists_both_systems() {
        let r = sample();
        assert_eq!(r.exact, Tbool::True.to_string());
        assert_eq!(r.bottom, "false");
        assert_eq!(r.constraints.len(), 2);
        assert_eq!(r.generators.len(), 2);
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("bound").is_none());
    }

    #[test]
    fn bound_report_keeps_infinities() {
        let b = BoundReport::from(&Interval::new(Some(rat(-1)), None));
        assert_eq!(b.inf.as_deref(), Some("-1"));
        assert_eq!(b.sup, None);
    }

    #[test]
    fn write_report_and_sidecar() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("out.json");
        write_report(&artifact, &sample()).unwrap();
        let prov_path = write_sidecar(&artifact, Payload::new(json!({"op": "minimize"}))).unwrap();
        assert!(prov_path.exists());
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["params"]["op"], "minimize");
        let report: Value = serde_json::from_slice(&fs::read(&artifact).unwrap()).unwrap();
        assert_eq!(report["op"], "minimize");
    }
}
