//! Integration test: presentations of credentials from issuers on different
//! chains, verified end to end.

use metablox_core::{ChainName, Did, ErrorKind, SuiteTag};
use metablox_credentials::{
    CredentialWallet, MiningLicenseInfo, VerifiableCredential, VerifiablePresentation,
};
use metablox_crypto::KeyPair;
use metablox_identity::DidCodec;
use metablox_integration_tests::TestNetwork;
use serde_json::json;

/// Holder wallet with one credential from a solana issuer and one from an
/// ethereum issuer.
async fn wallet_with_licenses(net: &TestNetwork, holder_suite: SuiteTag) -> (CredentialWallet, Vec<String>) {
    let wallet = net.wallet(holder_suite).await;
    let mut ids = Vec::new();
    for (serial, suite) in SuiteTag::ALL.into_iter().enumerate() {
        let issuer = net.issuer(suite).await;
        let license = MiningLicenseInfo::new(
            wallet.owner_did().uri(),
            serial.to_string(),
            "100",
            "TestName",
            "TestModel",
        );
        let vc = issuer.issue_typed(&license).expect("issuance should succeed");
        ids.push(vc.id.clone());
        wallet.store(vc).expect("store should succeed");
    }
    (wallet, ids)
}

fn present(net: &TestNetwork, wallet: &CredentialWallet, ids: &[String], nonce: &str) -> VerifiablePresentation {
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    wallet.present(&ids, nonce, &net.suites).expect("presentation should succeed")
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test]
async fn test_present_and_verify_for_each_holder_suite() {
    for holder_suite in SuiteTag::ALL {
        let net = TestNetwork::new();
        let (wallet, ids) = wallet_with_licenses(&net, holder_suite).await;
        let vp = present(&net, &wallet, &ids, "NONCE");

        assert_eq!(&vp.holder, wallet.owner_did());
        assert_eq!(vp.proof.suite(), holder_suite);
        assert_eq!(vp.verifiable_credential.len(), 2);

        let result = net
            .verifier()
            .verify_vp_with_nonce(&vp, Some("NONCE"))
            .await
            .expect("verification should run");
        assert!(result.valid, "{:?} holder rejected: {:?}", holder_suite, result.checks);
        assert!(result.credentials.iter().all(|r| r.valid));
        assert!(result.check("nonce_matches").unwrap().passed);
    }
}

#[tokio::test]
async fn test_presentation_survives_json_transport() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let vp = present(&net, &wallet, &ids, "abc");

    let json = serde_json::to_string(&vp).unwrap();
    let parsed = VerifiablePresentation::from_json(&json).unwrap();
    assert_eq!(parsed, vp);
    assert!(net.verifier().verify_vp(&parsed).await.unwrap().valid);
}

// =========================================================================
// Tampering
// =========================================================================

#[tokio::test]
async fn test_swapped_holder_is_rejected() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let mut vp = present(&net, &wallet, &ids, "NONCE");

    // Point the presentation at one of the (resolvable) issuers instead.
    vp.holder = vp.verifiable_credential[0].issuer.clone();

    let result = net.verifier().verify_vp(&vp).await.expect("tampering is not an error");
    assert!(!result.valid);
    assert!(!result.check("holder_key_bound").unwrap().passed);
    assert!(!result.check("signature_valid").unwrap().passed);
    // The embedded credentials themselves are untouched.
    assert!(result.credentials.iter().all(|r| r.valid));
}

#[tokio::test]
async fn test_unresolvable_holder_is_a_lookup_error() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let mut vp = present(&net, &wallet, &ids, "NONCE");

    // Well-formed solana DID that was never anchored.
    let stranger = KeyPair::generate(SuiteTag::Ed25519Signature2020);
    vp.holder = DidCodec::new()
        .encode(stranger.public_key(), &ChainName::solana())
        .unwrap();

    let err = net.verifier().verify_vp(&vp).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_tampered_embedded_credential_invalidates_presentation() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let mut vp = present(&net, &wallet, &ids, "NONCE");

    vp.verifiable_credential[1].credential_subject["serial"] = json!("999");

    let result = net.verifier().verify_vp(&vp).await.unwrap();
    assert!(!result.valid);
    // The holder signed over the original credential.
    assert!(!result.check("signature_valid").unwrap().passed);
    assert!(result.credentials[0].valid);
    assert!(!result.credentials[1].valid);
}

#[tokio::test]
async fn test_wrong_nonce_is_rejected() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let vp = present(&net, &wallet, &ids, "issued-nonce");

    let result = net.verifier().verify_vp_with_nonce(&vp, Some("expected-nonce")).await.unwrap();
    assert!(!result.valid);
    assert!(result.check("signature_valid").unwrap().passed);
    assert!(!result.check("nonce_matches").unwrap().passed);

    let mut replayed = vp.clone();
    replayed.nonce = "expected-nonce".into();
    let result = net.verifier().verify_vp_with_nonce(&replayed, Some("expected-nonce")).await.unwrap();
    assert!(!result.valid);
    assert!(!result.check("signature_valid").unwrap().passed);
}

#[tokio::test]
async fn test_unresolvable_embedded_issuer_is_reported_per_credential() {
    let net = TestNetwork::new();
    let (wallet, ids) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let vp = present(&net, &wallet, &ids, "NONCE");

    let ethereum_issuer: &Did = &vp.verifiable_credential[1].issuer;
    net.ethereum.remove(ethereum_issuer.identifier());

    let result = net.verifier().verify_vp(&vp).await.unwrap();
    assert!(!result.valid);
    assert!(result.check("signature_valid").unwrap().passed);
    assert!(result.credentials[0].valid);
    let failed = result.credentials[1].check("credential_verifiable").unwrap();
    assert!(!failed.passed);
}

// =========================================================================
// Errors
// =========================================================================

#[tokio::test]
async fn test_presenting_unknown_credential_fails() {
    let net = TestNetwork::new();
    let (wallet, _) = wallet_with_licenses(&net, SuiteTag::Ed25519Signature2020).await;
    let err = wallet.present(&["urn:uuid:missing"], "n", &net.suites).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_unknown_proof_type_is_suite_mismatch() {
    let json = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": "urn:uuid:1",
        "type": ["VerifiableCredential"],
        "issuer": "did:metablox:solana:abc",
        "issuanceDate": "2024-01-01T00:00:00Z",
        "credentialSubject": {},
        "proof": {
            "type": "RsaSignature2018",
            "created": "2024-01-01T00:00:00Z",
            "verificationMethod": "did:metablox:solana:abc#keys-1",
            "proofPurpose": "assertionMethod",
            "publicKeyMultibase": "",
            "jws": ""
        }
    });
    let err = VerifiableCredential::from_json(&json.to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SuiteMismatch);
}
