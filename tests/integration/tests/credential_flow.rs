//! Integration test: credential lifecycle across crates.
//!
//! DIDs are anchored on in-memory bound contracts, resolved through the
//! chain registry, and used to issue, store and verify credentials.

use std::sync::Arc;

use chrono::Duration;
use metablox_core::{utc_now, ChainName, Did, ErrorKind, SuiteTag};
use metablox_credentials::{
    CredentialVerifier, MiningLicenseInfo, VerifiableCredential, VerificationPolicy,
};
use metablox_crypto::{Ed25519Suite, KeyPair, SuiteRegistry};
use metablox_identity::{BoundContract, ChainRegistry, DidCodec, DidDocumentResolver, KeyMaterial};
use metablox_integration_tests::TestNetwork;
use serde_json::json;

fn license_for(holder: &Did) -> MiningLicenseInfo {
    MiningLicenseInfo::new(holder.uri(), "1", "100", "TestName", "TestModel")
}

// =========================================================================
// DID codec
// =========================================================================

#[test]
fn test_did_roundtrip_on_both_chains() {
    let codec = DidCodec::new();

    let ed = KeyPair::generate(SuiteTag::Ed25519Signature2020);
    let did = codec.encode(ed.public_key(), &ChainName::solana()).unwrap();
    let decoded = codec.decode(did.uri()).unwrap();
    assert_eq!(decoded.chain, ChainName::solana());
    assert_eq!(decoded.material, KeyMaterial::PublicKey(ed.public_key().to_vec()));

    let secp = KeyPair::generate(SuiteTag::EcdsaSecp256k1Signature2019);
    let did = codec.encode(secp.public_key(), &ChainName::ethereum()).unwrap();
    assert!(did.identifier().starts_with("0x"));
    let decoded = codec.decode(did.uri()).unwrap();
    assert_eq!(decoded.chain, ChainName::ethereum());
    assert!(matches!(decoded.material, KeyMaterial::Address(ref a) if a.len() == 20));
}

// =========================================================================
// Issuer → Holder → Verifier
// =========================================================================

#[tokio::test]
async fn test_issue_store_and_verify_both_suites() {
    let net = TestNetwork::new();
    let wallet = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let verifier = net.verifier();

    for suite in SuiteTag::ALL {
        let issuer = net.issuer(suite).await;
        let vc = issuer
            .issue_typed(&license_for(wallet.owner_did()))
            .expect("issuance should succeed");
        assert!(vc.is_signed());
        assert_eq!(vc.proof.suite(), suite);
        assert_eq!(&vc.issuer, issuer.did());

        let result = verifier.verify_vc(&vc).await.expect("verification should run");
        assert!(result.valid, "{:?} credential rejected: {:?}", suite, result.first_failure());

        wallet.store(vc).expect("store should succeed");
    }

    assert_eq!(wallet.count(), 2);
    assert_eq!(wallet.list_by_type("MiningLicense").len(), 2);
}

#[tokio::test]
async fn test_credential_survives_json_transport() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::EcdsaSecp256k1Signature2019).await;
    let vc = issuer.issue_typed(&license_for(holder.owner_did())).unwrap();

    let json = serde_json::to_string_pretty(&vc).unwrap();
    let parsed = VerifiableCredential::from_json(&json).unwrap();
    let result = net.verifier().verify_vc(&parsed).await.unwrap();
    assert!(result.valid);
}

// =========================================================================
// Tampering
// =========================================================================

#[tokio::test]
async fn test_tampered_subject_is_rejected() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;
    let mut vc = issuer.issue_typed(&license_for(holder.owner_did())).unwrap();

    vc.credential_subject["name"] = json!("SomeoneElse");

    let result = net.verifier().verify_vc(&vc).await.expect("tampering is not an error");
    assert!(!result.valid);
    assert!(!result.check("signature_valid").unwrap().passed);
    assert!(result.check("issuer_key_bound").unwrap().passed);
}

#[tokio::test]
async fn test_key_from_another_did_is_rejected() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;
    let impostor = net.issuer(SuiteTag::Ed25519Signature2020).await;

    // Signed by the impostor but claiming the real issuer.
    let mut vc = impostor.issue_typed(&license_for(holder.owner_did())).unwrap();
    vc.issuer = issuer.did().clone();

    let result = net.verifier().verify_vc(&vc).await.unwrap();
    assert!(!result.valid);
    assert!(!result.check("issuer_key_bound").unwrap().passed);
}

#[tokio::test]
async fn test_unsigned_credential_fails() {
    let net = TestNetwork::new();
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;
    let vc = VerifiableCredential::create(issuer.document(), SuiteTag::Ed25519Signature2020).unwrap();
    assert!(!vc.is_signed());

    let result = net.verifier().verify_vc(&vc).await.unwrap();
    assert!(!result.valid);
    assert_eq!(result.first_failure().unwrap().name, "signature_present");
}

// =========================================================================
// Policy
// =========================================================================

#[tokio::test]
async fn test_expired_credential_and_trusted_issuers() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;

    let expired = issuer
        .issue_with_expiration(
            &json!({ "id": holder.owner_did().uri(), "serial": "7" }),
            &["MiningLicense"],
            utc_now() - Duration::hours(1),
        )
        .unwrap();
    let result = net.verifier().verify_vc(&expired).await.unwrap();
    assert!(!result.valid);
    assert!(!result.check("not_expired").unwrap().passed);

    let lenient = net.verifier().with_policy(VerificationPolicy {
        enforce_expiration: false,
        require_trusted_issuer: false,
    });
    assert!(lenient.verify_vc(&expired).await.unwrap().valid);

    let fresh = issuer.issue_typed(&license_for(holder.owner_did())).unwrap();
    let strict = net.verifier().with_policy(VerificationPolicy {
        enforce_expiration: true,
        require_trusted_issuer: true,
    });
    let result = strict.verify_vc(&fresh).await.unwrap();
    assert!(!result.check("issuer_trusted").unwrap().passed);

    let strict = strict.with_trusted_issuers([issuer.did()]);
    assert!(strict.verify_vc(&fresh).await.unwrap().valid);
}

// =========================================================================
// Registry and suite dispatch errors
// =========================================================================

#[tokio::test]
async fn test_unregistered_and_unknown_chains() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::EcdsaSecp256k1Signature2019).await;
    let vc = issuer.issue_typed(&license_for(holder.owner_did())).unwrap();

    // A registry that only knows solana cannot resolve the ethereum issuer.
    let mut registry = ChainRegistry::new();
    registry.init_bound_contracts([net.solana.clone() as Arc<dyn BoundContract>]);
    let resolver = Arc::new(DidDocumentResolver::new(Arc::new(registry)));
    let verifier = CredentialVerifier::new(resolver, net.suites.clone());
    let err = verifier.verify_vc(&vc).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // No scheme exists for the chain at all.
    let mut unknown = vc.clone();
    unknown.issuer = Did::new("did:metablox:polygon:0xabc").unwrap();
    let err = net.verifier().verify_vc(&unknown).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Nothing registered yet.
    let resolver = Arc::new(DidDocumentResolver::new(Arc::new(ChainRegistry::new())));
    let verifier = CredentialVerifier::new(resolver, net.suites.clone());
    let err = verifier.verify_vc(&vc).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_unanchored_issuer_is_not_found() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;
    let vc = issuer.issue_typed(&license_for(holder.owner_did())).unwrap();

    net.solana.remove(issuer.did().identifier());
    let err = net.verifier().verify_vc(&vc).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_suite_registry_dispatch() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let ed_issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;
    let secp_issuer = net.issuer(SuiteTag::EcdsaSecp256k1Signature2019).await;

    let mut suites = SuiteRegistry::empty();
    suites.register(Arc::new(Ed25519Suite));
    let verifier = CredentialVerifier::new(net.resolver.clone(), Arc::new(suites));

    let ed_vc = ed_issuer.issue_typed(&license_for(holder.owner_did())).unwrap();
    assert!(verifier.verify_vc(&ed_vc).await.unwrap().valid);

    let secp_vc = secp_issuer.issue_typed(&license_for(holder.owner_did())).unwrap();
    let err = verifier.verify_vc(&secp_vc).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SuiteMismatch);
}

#[tokio::test]
async fn test_wallet_rejects_foreign_credentials() {
    let net = TestNetwork::new();
    let holder = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let other = net.wallet(SuiteTag::Ed25519Signature2020).await;
    let issuer = net.issuer(SuiteTag::Ed25519Signature2020).await;

    let vc = issuer.issue_typed(&license_for(other.owner_did())).unwrap();
    assert!(holder.store(vc.clone()).is_err());
    other.store(vc).expect("owner stores its own credential");
    assert!(holder.is_empty());
}
