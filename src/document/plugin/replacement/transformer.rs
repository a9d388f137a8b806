//! The replacement transformer plugin
//!
//! Applies a configured rule set to a document bundle: each rule resolves
//! its source value once (a literal, or a field read out of exactly one
//! matched document), then writes it at every configured field path of every
//! document matched by the target reference. Rules run in configuration
//! order and the first error aborts the transform; mutations already applied
//! are not rolled back, so callers needing atomicity transform a copy of the
//! bundle and swap it in on success.

use serde_yaml::Value;
use tracing::debug;

use super::config::{ReplacementConfig, ReplacementSource, ReplacementTarget};
use super::error::ReplacementError;
use super::mutate::{read_field, update_field};
use super::path::PathPlan;
use crate::document::plugin::Plugin;
use crate::document::DocumentBundle;

/// `apiVersion` of the replacement transformer configuration document
pub const API_VERSION: &str = "keel.io/v1alpha1";

/// `kind` of the replacement transformer configuration document
pub const KIND: &str = "ReplacementTransformer";

/// Document plugin applying configured value replacements
#[derive(Clone, Debug)]
pub struct ReplacementTransformer {
    config: ReplacementConfig,
}

impl ReplacementTransformer {
    /// Build a transformer from its configuration document
    ///
    /// The generic value is decoded against the rule schema and the rule set
    /// is validated; any shape problem is a [`ReplacementError::BadConfiguration`].
    pub fn new(config: Value) -> Result<Self, ReplacementError> {
        let config: ReplacementConfig = serde_yaml::from_value(config)
            .map_err(|err| ReplacementError::bad_configuration(err.to_string()))?;
        config.validate()?;
        Ok(Self { config })
    }

    /// Apply every rule, in order, to the bundle
    pub fn apply(&self, bundle: &mut DocumentBundle) -> Result<(), ReplacementError> {
        for replacement in &self.config.replacements {
            let Some(source) = &replacement.source else {
                return Err(ReplacementError::bad_configuration(
                    "every replacement must specify a source",
                ));
            };
            let Some(target) = &replacement.target else {
                return Err(ReplacementError::bad_configuration(
                    "every replacement must specify a target",
                ));
            };
            let value = resolve_source(bundle, source)?;
            substitute(bundle, target, &value)?;
        }
        Ok(())
    }
}

impl Plugin for ReplacementTransformer {
    fn transform(&self, bundle: &mut DocumentBundle) -> crate::Result<()> {
        self.apply(bundle)?;
        Ok(())
    }
}

/// Produce the single concrete value a rule's source stands for
fn resolve_source(
    bundle: &DocumentBundle,
    source: &ReplacementSource,
) -> Result<Value, ReplacementError> {
    if let Some(literal) = source.literal() {
        return Ok(Value::String(literal.to_string()));
    }

    let Some(objref) = &source.objref else {
        return Err(ReplacementError::bad_configuration(
            "a replacement source must set one of objref or value",
        ));
    };
    let selector = objref.to_selector();
    let matches = bundle.select(&selector);
    if matches.is_empty() {
        return Err(ReplacementError::SourceNotFound {
            selector: selector.to_string(),
        });
    }
    if matches.len() > 1 {
        return Err(ReplacementError::MultipleResources {
            selector: selector.to_string(),
            count: matches.len(),
        });
    }

    let plan = PathPlan::parse(source.field_path());
    let value = read_field(matches[0].content(), &plan)?;
    Ok(value.clone())
}

/// Write the resolved value at every field path of every matched document
fn substitute(
    bundle: &mut DocumentBundle,
    target: &ReplacementTarget,
    value: &Value,
) -> Result<(), ReplacementError> {
    let selector = target.objref.to_selector();
    let documents = bundle.select_mut(&selector);
    if documents.is_empty() {
        return Err(ReplacementError::TargetNotFound {
            selector: selector.to_string(),
        });
    }

    for document in documents {
        for fieldref in &target.fieldrefs {
            debug!(
                kind = document.kind().unwrap_or(""),
                name = document.name().unwrap_or(""),
                path = %fieldref,
                "applying replacement"
            );
            let plan = PathPlan::parse(fieldref);
            update_field(document.content_mut(), &plan, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer(yaml: &str) -> ReplacementTransformer {
        ReplacementTransformer::new(serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    fn bundle(yaml: &str) -> DocumentBundle {
        DocumentBundle::parse(yaml).unwrap()
    }

    const CLUSTER_AND_KUBEADM: &str = r#"
apiVersion: cluster.x-k8s.io/v1alpha3
kind: Cluster
metadata:
  name: c1
spec:
  controlPlaneEndpoint:
    host: 10.0.0.10
    port: 6443
---
apiVersion: bootstrap.cluster.x-k8s.io/v1alpha3
kind: KubeadmConfig
metadata:
  name: cp-config
spec:
  clusterConfiguration:
    apiServer:
      certSANs:
        - localhost
        - 127.0.0.1
"#;

    // =========================================================================
    // Story: value flows from a source document into target paths
    // =========================================================================

    #[test]
    fn copies_a_source_field_into_an_indexed_target() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Cluster, name: c1}
      fieldref: spec.controlPlaneEndpoint.host
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: ["spec.clusterConfiguration.apiServer.certSANs[0]"]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        transformer.apply(&mut docs).unwrap();

        let kubeadm = &docs.documents()[1];
        let sans = kubeadm.content()["spec"]["clusterConfiguration"]["apiServer"]["certSANs"]
            .as_sequence()
            .unwrap();
        assert_eq!(sans[0], Value::String("10.0.0.10".to_string()));
        // Other elements stay untouched.
        assert_eq!(sans[1], Value::String("127.0.0.1".to_string()));
    }

    #[test]
    fn literal_sources_need_no_documents() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      value: registry.local/images
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.imageRepository]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        transformer.apply(&mut docs).unwrap();
        assert_eq!(
            docs.documents()[1].content()["spec"]["imageRepository"],
            Value::String("registry.local/images".to_string())
        );
    }

    #[test]
    fn source_fieldref_defaults_to_metadata_name() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Cluster}
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.clusterName]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        transformer.apply(&mut docs).unwrap();
        assert_eq!(
            docs.documents()[1].content()["spec"]["clusterName"],
            Value::String("c1".to_string())
        );
    }

    #[test]
    fn structured_source_values_are_copied_whole() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Cluster, name: c1}
      fieldref: spec.controlPlaneEndpoint
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.endpoint]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        transformer.apply(&mut docs).unwrap();
        assert_eq!(
            docs.documents()[1].content()["spec"]["endpoint"]["port"],
            Value::Number(6443.into())
        );
    }

    // =========================================================================
    // Story: source and target resolution failures
    // =========================================================================

    #[test]
    fn zero_source_matches_fail_before_any_target_work() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Missing}
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.x]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        let err = transformer.apply(&mut docs).unwrap_err();
        assert!(matches!(err, ReplacementError::SourceNotFound { .. }));
    }

    #[test]
    fn ambiguous_sources_fail_regardless_of_target_validity() {
        // Two Clusters match; the bogus target path is never reached.
        let two_clusters = format!(
            "{CLUSTER_AND_KUBEADM}---\napiVersion: cluster.x-k8s.io/v1alpha3\nkind: Cluster\nmetadata:\n  name: c2\n"
        );
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Cluster}
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec..broken..path]
"#,
        );
        let mut docs = bundle(&two_clusters);
        let err = transformer.apply(&mut docs).unwrap_err();
        match err {
            ReplacementError::MultipleResources { count, .. } => assert_eq!(count, 2),
            other => panic!("expected MultipleResources, got {other:?}"),
        }
    }

    #[test]
    fn zero_target_matches_fail() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      value: literal
    target:
      objref: {kind: Missing}
      fieldrefs: [spec.x]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        let err = transformer.apply(&mut docs).unwrap_err();
        assert!(matches!(err, ReplacementError::TargetNotFound { .. }));
    }

    #[test]
    fn missing_source_field_is_reported() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      objref: {kind: Cluster, name: c1}
      fieldref: spec.noSuchField.host
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.x]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        let err = transformer.apply(&mut docs).unwrap_err();
        assert_eq!(err, ReplacementError::field_not_found("noSuchField"));
    }

    // =========================================================================
    // Story: construction-time validation and rule ordering
    // =========================================================================

    #[test]
    fn malformed_rule_sets_are_rejected_at_construction() {
        let config: Value = serde_yaml::from_str(
            r#"
replacements:
  - source:
      objref: {kind: Cluster}
      value: also-a-literal
    target:
      objref: {kind: X}
      fieldrefs: [a.b]
"#,
        )
        .unwrap();
        let err = ReplacementTransformer::new(config).unwrap_err();
        assert!(matches!(err, ReplacementError::BadConfiguration { .. }));
    }

    #[test]
    fn undecodable_configuration_is_bad_configuration() {
        let config: Value = serde_yaml::from_str("replacements: not-a-list").unwrap();
        let err = ReplacementTransformer::new(config).unwrap_err();
        assert!(matches!(err, ReplacementError::BadConfiguration { .. }));
    }

    #[test]
    fn rules_apply_in_order_and_later_rules_see_earlier_writes() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      value: first
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.stamp]
  - source:
      objref: {kind: KubeadmConfig}
      fieldref: spec.stamp
    target:
      objref: {kind: Cluster}
      fieldrefs: [spec.stamp]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        transformer.apply(&mut docs).unwrap();
        assert_eq!(
            docs.documents()[0].content()["spec"]["stamp"],
            Value::String("first".to_string())
        );
    }

    #[test]
    fn failure_does_not_roll_back_earlier_mutations() {
        let transformer = transformer(
            r#"
replacements:
  - source:
      value: applied
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.stamp]
  - source:
      value: never-applied
    target:
      objref: {kind: Missing}
      fieldrefs: [spec.x]
"#,
        );
        let mut docs = bundle(CLUSTER_AND_KUBEADM);
        let err = transformer.apply(&mut docs).unwrap_err();
        assert!(matches!(err, ReplacementError::TargetNotFound { .. }));
        // The first rule's write survives the second rule's failure.
        assert_eq!(
            docs.documents()[1].content()["spec"]["stamp"],
            Value::String("applied".to_string())
        );
    }

    #[test]
    fn every_matched_target_document_is_mutated() {
        let two_configs = format!(
            "{CLUSTER_AND_KUBEADM}---\napiVersion: bootstrap.cluster.x-k8s.io/v1alpha3\nkind: KubeadmConfig\nmetadata:\n  name: worker-config\nspec: {{}}\n"
        );
        let transformer = transformer(
            r#"
replacements:
  - source:
      value: shared
    target:
      objref: {kind: KubeadmConfig}
      fieldrefs: [spec.stamp]
"#,
        );
        let mut docs = bundle(&two_configs);
        transformer.apply(&mut docs).unwrap();
        for document in docs.select(&crate::document::Selector::new().by_gvk("", "", "KubeadmConfig"))
        {
            assert_eq!(
                document.content()["spec"]["stamp"],
                Value::String("shared".to_string())
            );
        }
    }
}
