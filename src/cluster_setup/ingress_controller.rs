// ingress-nginx for kind, patched so it can be scheduled before the nodes
// report Ready.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yml::Value;
use simplelog::*;

use crate::utils::TransientFile;
use crate::workspace::Workspace;

pub const MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/kubernetes/ingress-nginx/main/deploy/static/provider/kind/deploy.yaml";

const NOT_READY_TOLERATION: &str = r#"
key: node.kubernetes.io/not-ready
operator: Exists
effect: NoSchedule
"#;

/// Download, patch and apply the ingress controller manifest.
pub fn install(ws: &Workspace, kube_context: &str) -> Result<()> {
    info!("🏗 Installing NGINX ingress controller...");

    let manifest = ws
        .runner
        .output("curl", &["-fsSL", MANIFEST_URL])
        .context("failed to download NGINX ingress manifest")?;

    let manifest = match patch_not_ready_toleration(&manifest) {
        Some(patched) => patched,
        None => {
            warn!("applying NGINX ingress manifest without the not-ready toleration");
            manifest
        }
    };

    let file = TransientFile::create(&ws.workdir, "nginx-ingress-patched", &manifest)?;
    ws.runner
        .stream(
            "kubectl",
            &["--context", kube_context, "apply", "-f", &file.arg()],
        )
        .context("failed to install NGINX ingress controller")?;

    info!("<green>✅ Installed NGINX ingress controller</>");
    Ok(())
}

/// Add the not-ready toleration to every Deployment whose pods select
/// `ingress-ready: "true"` nodes. Returns `None`, after logging why, when
/// the manifest does not have the expected shape.
pub fn patch_not_ready_toleration(manifest: &str) -> Option<String> {
    let toleration: Value = match serde_yml::from_str(NOT_READY_TOLERATION) {
        Ok(t) => t,
        Err(e) => {
            warn!("could not build not-ready toleration: {e}");
            return None;
        }
    };
    let mut docs = match multidoc_deserialize(manifest) {
        Ok(docs) => docs,
        Err(e) => {
            warn!("could not parse NGINX ingress manifest: {e:#}");
            return None;
        }
    };
    let mut patched = false;

    for doc in docs.iter_mut() {
        if doc.get("kind").and_then(Value::as_str) != Some("Deployment") {
            continue;
        }

        let Some(pod_spec) = doc
            .get_mut("spec")
            .and_then(|s| s.get_mut("template"))
            .and_then(|t| t.get_mut("spec"))
        else {
            continue;
        };

        let ingress_ready = pod_spec
            .get("nodeSelector")
            .and_then(|sel| sel.get("ingress-ready"))
            .and_then(Value::as_str)
            == Some("true");
        if !ingress_ready {
            continue;
        }

        patched |= add_toleration(pod_spec, &toleration);
    }

    if !patched {
        warn!("no ingress-ready Deployment with patchable tolerations in NGINX manifest");
        return None;
    }

    match multidoc_serialize(&docs) {
        Ok(rendered) => Some(rendered),
        Err(e) => {
            warn!("{e:#}");
            None
        }
    }
}

/// Returns whether `pod_spec` now carries the toleration.
fn add_toleration(pod_spec: &mut Value, toleration: &Value) -> bool {
    let Value::Mapping(spec) = pod_spec else {
        warn!("deployment pod spec is not a mapping");
        return false;
    };

    match spec.get_mut("tolerations") {
        Some(Value::Sequence(existing)) => {
            if !existing.contains(toleration) {
                existing.push(toleration.clone());
            }
        }
        Some(Value::Null) | None => {
            spec.insert(
                Value::String("tolerations".to_string()),
                Value::Sequence(vec![toleration.clone()]),
            );
        }
        Some(other) => {
            warn!("unexpected tolerations value in deployment: {other:?}");
            return false;
        }
    }
    true
}

/// Deserialize multi-document yaml string into a Vec of the documents
fn multidoc_deserialize(data: &str) -> Result<Vec<Value>> {
    let mut docs = vec![];
    for de in serde_yml::Deserializer::from_str(data) {
        match Value::deserialize(de)? {
            Value::Null => (),
            not_null => docs.push(not_null),
        };
    }
    Ok(docs)
}

fn multidoc_serialize(docs: &[Value]) -> Result<String> {
    let rendered = docs
        .iter()
        .map(serde_yml::to_string)
        .collect::<Result<Vec<_>, _>>()
        .context("could not serialize patched manifest")?;
    Ok(rendered.join("---\n"))
}
