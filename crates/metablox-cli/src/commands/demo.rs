//! `metablox demo` — End-to-end flow against in-memory chain anchors.
//!
//! Anchors an Ed25519 issuer on solana, a secp256k1 issuer on ethereum and
//! a holder on solana, issues a mining license from each issuer, verifies
//! them, wraps them into a presentation, verifies that, and finally swaps the
//! presentation holder to show that the tampering is detected.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use metablox_core::{ChainName, MetabloxConfig, SuiteTag};
use metablox_credentials::{CredentialIssuer, CredentialWallet, MiningLicenseInfo};
use metablox_crypto::{KeyPair, SuiteRegistry};
use metablox_identity::{
    AnchorRecord, Base58KeyScheme, ChainRegistry, DidDocument, DidDocumentResolver, DidResolver,
    IdentifierScheme, KeccakAddressScheme,
};

use crate::anchors::LocalAnchors;
use crate::commands::verify::{build_verifier, print_credential_result, print_presentation_result};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Nonce the verifier expects in the presentation.
    #[arg(long, default_value = "NONCE")]
    pub nonce: String,

    /// Write anchors.json, credential.json and presentation.json here.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

struct Party {
    key: KeyPair,
    record: AnchorRecord,
}

fn anchor(
    anchors: &LocalAnchors,
    chain: &ChainName,
    suite: SuiteTag,
    scheme: &dyn IdentifierScheme,
) -> anyhow::Result<Party> {
    let key = KeyPair::generate(suite);
    let record = anchors.contract(chain)?.anchor_key(scheme, key.public_key())?;
    Ok(Party { key, record })
}

pub async fn run(args: &DemoArgs, config: &MetabloxConfig) -> anyhow::Result<()> {
    let anchors = LocalAnchors::from_config(&config.registry)?;
    let solana = ChainName::solana();
    let ethereum = ChainName::ethereum();

    let sol_issuer = anchor(&anchors, &solana, SuiteTag::Ed25519Signature2020, &Base58KeyScheme)?;
    let eth_issuer = anchor(
        &anchors,
        &ethereum,
        SuiteTag::EcdsaSecp256k1Signature2019,
        &KeccakAddressScheme,
    )?;
    let holder = anchor(&anchors, &solana, SuiteTag::Ed25519Signature2020, &Base58KeyScheme)?;

    let mut registry = anchors.registry(&config.registry)?;
    let mut issuer_dids = config.registry.issuer_dids()?;
    issuer_dids.push(sol_issuer.record.did()?);
    issuer_dids.push(eth_issuer.record.did()?);
    registry.init_issuer_dids(issuer_dids);
    let registry: Arc<ChainRegistry> = Arc::new(registry);

    let resolver = DidDocumentResolver::new(registry.clone());
    let suites = Arc::new(SuiteRegistry::new());
    let verifier = build_verifier(registry.clone(), config);

    let holder_doc: DidDocument = resolver.resolve(holder.record.did()?.uri()).await?;
    println!("Holder DID: {}", holder_doc.id);

    let mut issued = Vec::new();
    for (name, party) in [("solana", sol_issuer), ("ethereum", eth_issuer)] {
        let doc = resolver.resolve(party.record.did()?.uri()).await?;
        println!("Issuer DID ({}): {}", name, doc.id);
        let issuer = CredentialIssuer::new(doc, party.key, suites.clone());
        let license = MiningLicenseInfo::new(
            holder_doc.id.uri(),
            (issued.len() + 1).to_string(),
            "100",
            "TestName",
            "TestModel",
        );
        let vc = issuer.issue_typed(&license)?;
        let result = verifier.verify_vc(&vc).await?;
        print_credential_result(&vc.id, &result);
        issued.push(vc);
    }

    let wallet = CredentialWallet::new(holder_doc.clone(), holder.key);
    for vc in &issued {
        wallet.store(vc.clone())?;
    }
    let ids: Vec<&str> = issued.iter().map(|vc| vc.id.as_str()).collect();
    let vp = wallet.present(&ids, &args.nonce, &suites)?;
    let result = verifier.verify_vp_with_nonce(&vp, Some(args.nonce.as_str())).await?;
    print_presentation_result(&vp, &result);

    let mut tampered = vp.clone();
    tampered.holder = issued[0].issuer.clone();
    let result = verifier.verify_vp(&tampered).await?;
    println!();
    println!("After replacing the holder with {}:", tampered.holder);
    print_presentation_result(&tampered, &result);

    if let Some(dir) = &args.out {
        std::fs::create_dir_all(dir)?;
        let identifiers = [&issued[0].issuer, &issued[1].issuer, &holder_doc.id]
            .into_iter()
            .map(|did| (did.chain(), did.identifier().to_string()))
            .collect::<Vec<_>>();
        let records = anchors.records(&identifiers).await?;
        std::fs::write(dir.join("anchors.json"), serde_json::to_string_pretty(&records)?)?;
        std::fs::write(dir.join("credential.json"), serde_json::to_string_pretty(&issued[0])?)?;
        std::fs::write(dir.join("presentation.json"), serde_json::to_string_pretty(&vp)?)?;
        println!();
        println!("Wrote anchors, credential and presentation to {}", dir.display());
    }

    Ok(())
}
