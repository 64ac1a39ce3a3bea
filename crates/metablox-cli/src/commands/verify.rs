//! `metablox verify` — Verify a credential or presentation file against
//! anchored DIDs.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use metablox_core::MetabloxConfig;
use metablox_credentials::{
    CredentialVerifier, PresentationVerificationResult, VerifiableCredential,
    VerifiablePresentation, VerificationCheck, VerificationPolicy, VerificationResult,
};
use metablox_crypto::SuiteRegistry;
use metablox_identity::{ChainRegistry, DidDocumentResolver};

use crate::anchors::LocalAnchors;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential JSON file.
    #[arg(long, conflicts_with = "presentation", required_unless_present = "presentation")]
    pub credential: Option<PathBuf>,

    /// Presentation JSON file.
    #[arg(long)]
    pub presentation: Option<PathBuf>,

    /// Anchor records (JSON array) standing in for the bound contracts.
    #[arg(long)]
    pub anchors: PathBuf,

    /// Nonce the presentation must carry.
    #[arg(long, requires = "presentation")]
    pub nonce: Option<String>,
}

pub async fn run(args: &VerifyArgs, config: &MetabloxConfig) -> anyhow::Result<()> {
    let anchors = LocalAnchors::from_config(&config.registry)?;
    anchors.load_file(&args.anchors)?;
    let registry = Arc::new(anchors.registry(&config.registry)?);
    let verifier = build_verifier(registry, config);

    if let Some(path) = &args.credential {
        let json = read(path)?;
        let vc = VerifiableCredential::from_json(&json)?;
        let result = verifier.verify_vc(&vc).await?;
        print_credential_result(&vc.id, &result);
    } else if let Some(path) = &args.presentation {
        let json = read(path)?;
        let vp = VerifiablePresentation::from_json(&json)?;
        let result = verifier
            .verify_vp_with_nonce(&vp, args.nonce.as_deref())
            .await?;
        print_presentation_result(&vp, &result);
    }
    Ok(())
}

fn read(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Verifier over the registry's contracts, with the configured policy and
/// the registry's issuer DIDs as trusted issuers.
pub fn build_verifier(registry: Arc<ChainRegistry>, config: &MetabloxConfig) -> CredentialVerifier {
    let trusted: Vec<_> = registry.issuer_dids().cloned().collect();
    let resolver = Arc::new(DidDocumentResolver::new(registry));
    CredentialVerifier::new(resolver, Arc::new(SuiteRegistry::new()))
        .with_policy(VerificationPolicy::from(&config.verification))
        .with_trusted_issuers(&trusted)
}

fn print_checks(indent: &str, checks: &[VerificationCheck]) {
    for check in checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("{}[{}] {}", indent, icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
}

pub fn print_credential_result(id: &str, result: &VerificationResult) {
    let verdict = if result.valid { "VALID" } else { "INVALID" };
    println!("Credential {} is {}", id, verdict);
    print_checks("  ", &result.checks);
}

pub fn print_presentation_result(vp: &VerifiablePresentation, result: &PresentationVerificationResult) {
    let verdict = if result.valid { "VALID" } else { "INVALID" };
    println!("Presentation by {} is {}", vp.holder, verdict);
    print_checks("  ", &result.checks);
    for (vc, vc_result) in vp.verifiable_credential.iter().zip(&result.credentials) {
        let verdict = if vc_result.valid { "VALID" } else { "INVALID" };
        println!("  Credential {} is {}", vc.id, verdict);
        print_checks("    ", &vc_result.checks);
    }
}
