//! Grammars for the multi-level CLIs.
//!
//! `kubectl` has its own per-action grammar. The rest share
//! [`cloud::TreeCliSpec`]: leading words form a command path checked
//! against the tool's allow/deny trees, everything else passes through as
//! flags with free-form values.

/// `argocd` read-only application and cluster inspection.
pub mod argocd;
/// `aws` describe/list/get calls.
pub mod aws;
/// `az` show/list calls.
pub mod azure;
/// Shared tree-driven grammar for pass-through CLIs.
pub mod cloud;
/// `docker` inspection without container lifecycle.
pub mod docker;
/// `gcloud` describe/list calls.
pub mod gcloud;
/// `helm` release inspection.
pub mod helm;
/// `kubectl` read-only actions plus sandboxed `run`.
pub mod kubectl;
