use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use metablox_core::config::VerificationConfig;
use metablox_core::Did;
use metablox_crypto::{multibase, SignatureSuite, SuiteRegistry};
use metablox_identity::{DidDocument, DidResolver};
use serde::Serialize;

use crate::credential::VerifiableCredential;
use crate::error::CredentialError;
use crate::presentation::VerifiablePresentation;
use crate::proof::{self, Proof};

/// Result of credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// Individual check results.
    pub checks: Vec<VerificationCheck>,
}

impl VerificationResult {
    fn from_checks(checks: Vec<VerificationCheck>) -> Self {
        Self {
            valid: checks.iter().all(|c| c.passed),
            checks,
        }
    }

    /// The first failed check, if any.
    pub fn first_failure(&self) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// An individual verification check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationCheck {
    fn new(name: &str, passed: bool, failure: impl FnOnce() -> String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: if passed { None } else { Some(failure()) },
        }
    }
}

/// Result of presentation verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationVerificationResult {
    /// Whether the presentation checks and every embedded credential passed.
    pub valid: bool,
    /// Checks on the presentation's own proof.
    pub checks: Vec<VerificationCheck>,
    /// One result per embedded credential, in order.
    pub credentials: Vec<VerificationResult>,
}

impl PresentationVerificationResult {
    pub fn check(&self, name: &str) -> Option<&VerificationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Verifier policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    /// Fail credentials whose issuer is not in the trusted set.
    pub require_trusted_issuer: bool,
    /// Fail credentials past their expiration date.
    pub enforce_expiration: bool,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            require_trusted_issuer: false,
            enforce_expiration: true,
        }
    }
}

impl From<&VerificationConfig> for VerificationPolicy {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            require_trusted_issuer: config.require_trusted_issuer,
            enforce_expiration: config.enforce_expiration,
        }
    }
}

/// Verifies credentials and presentations against resolved DID Documents.
///
/// Bad signatures, unbound keys, wrong nonces and expired credentials are
/// reported as `Ok` results with `valid == false`. Errors are reserved for
/// input that cannot be checked at all: an unsupported suite, a malformed
/// proof key, or a signer DID that does not resolve.
pub struct CredentialVerifier {
    resolver: Arc<dyn DidResolver>,
    suites: Arc<SuiteRegistry>,
    policy: VerificationPolicy,
    trusted_issuers: HashSet<Did>,
}

impl CredentialVerifier {
    pub fn new(resolver: Arc<dyn DidResolver>, suites: Arc<SuiteRegistry>) -> Self {
        Self {
            resolver,
            suites,
            policy: VerificationPolicy::default(),
            trusted_issuers: HashSet::new(),
        }
    }

    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Issuers accepted when the policy requires a trusted issuer.
    pub fn with_trusted_issuers<'a>(mut self, issuers: impl IntoIterator<Item = &'a Did>) -> Self {
        self.trusted_issuers.extend(issuers.into_iter().cloned());
        self
    }

    pub fn policy(&self) -> VerificationPolicy {
        self.policy
    }

    pub fn is_trusted_issuer(&self, did: &Did) -> bool {
        self.trusted_issuers.contains(did)
    }

    /// Verify a credential's proof, its binding to the issuer DID and the policy checks.
    pub async fn verify_vc(
        &self,
        credential: &VerifiableCredential,
    ) -> Result<VerificationResult, CredentialError> {
        let payload = credential.signing_payload()?;
        let signer_checks = self
            .check_signer(&credential.proof, &credential.issuer, payload.as_bytes(), "issuer_key_bound")
            .await?;
        let Some(mut checks) = signer_checks else {
            return Ok(Self::unsigned("credential"));
        };

        if self.policy.enforce_expiration {
            let not_expired = !credential.is_expired_at(Utc::now());
            checks.push(VerificationCheck::new("not_expired", not_expired, || {
                "credential has expired".into()
            }));
        }

        if self.policy.require_trusted_issuer {
            let trusted = self.is_trusted_issuer(&credential.issuer);
            checks.push(VerificationCheck::new("issuer_trusted", trusted, || {
                format!("issuer {} is not trusted", credential.issuer)
            }));
        }

        let result = VerificationResult::from_checks(checks);
        if let Some(failed) = result.first_failure() {
            tracing::warn!(
                credential_id = %credential.id,
                issuer = %credential.issuer,
                check = %failed.name,
                "credential verification failed"
            );
        } else {
            tracing::debug!(credential_id = %credential.id, "credential verified");
        }
        Ok(result)
    }

    /// Verify a presentation without a nonce expectation.
    pub async fn verify_vp(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<PresentationVerificationResult, CredentialError> {
        self.verify_vp_with_nonce(presentation, None).await
    }

    /// Verify a presentation's proof, its binding to the holder DID, the
    /// expected nonce when given, and every embedded credential.
    ///
    /// A credential that cannot be verified at all is recorded as a failed
    /// result carrying the error, so the remaining credentials are still
    /// reported.
    pub async fn verify_vp_with_nonce(
        &self,
        presentation: &VerifiablePresentation,
        expected_nonce: Option<&str>,
    ) -> Result<PresentationVerificationResult, CredentialError> {
        let payload = presentation.signing_payload()?;
        let mut checks = self
            .check_signer(
                &presentation.proof,
                &presentation.holder,
                payload.as_bytes(),
                "holder_key_bound",
            )
            .await?
            .unwrap_or_else(|| Self::unsigned("presentation").checks);

        if let Some(expected) = expected_nonce {
            let matches = presentation.nonce == expected;
            checks.push(VerificationCheck::new("nonce_matches", matches, || {
                format!("nonce {:?} does not match expected {:?}", presentation.nonce, expected)
            }));
        }

        let mut credentials = Vec::with_capacity(presentation.verifiable_credential.len());
        for vc in &presentation.verifiable_credential {
            let result = match self.verify_vc(vc).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(credential_id = %vc.id, error = %e, "embedded credential could not be verified");
                    VerificationResult::from_checks(vec![VerificationCheck::new(
                        "credential_verifiable",
                        false,
                        || format!("{} ({})", e, e.kind()),
                    )])
                }
            };
            credentials.push(result);
        }

        let valid = checks.iter().all(|c| c.passed) && credentials.iter().all(|r| r.valid);
        if !valid {
            tracing::warn!(holder = %presentation.holder, "presentation verification failed");
        }
        Ok(PresentationVerificationResult {
            valid,
            checks,
            credentials,
        })
    }

    /// Signature and key-binding checks common to credentials and
    /// presentations. `None` when the proof carries no signature.
    async fn check_signer(
        &self,
        proof: &Proof,
        signer: &Did,
        payload: &[u8],
        binding_check: &str,
    ) -> Result<Option<Vec<VerificationCheck>>, CredentialError> {
        let suite = self.suites.get(proof.suite())?;
        if !proof.is_signed() {
            return Ok(None);
        }
        let value = proof.value();
        let (_, public_key) = multibase::decode(&value.public_key_multibase)?;
        let document = self.resolver.resolve(signer.uri()).await?;

        let mut checks = vec![VerificationCheck::new("signature_present", true, String::new)];

        let bound = Self::key_bound(&document, suite.as_ref(), &public_key);
        checks.push(VerificationCheck::new(binding_check, bound, || {
            format!("proof key is not a {} key of {}", suite.tag(), signer)
        }));

        let digest = suite.digest(payload);
        let valid = proof::verify_signature(suite.as_ref(), &public_key, &digest, &value.jws);
        checks.push(VerificationCheck::new("signature_valid", valid, || {
            "signature does not match the payload".into()
        }));

        Ok(Some(checks))
    }

    fn key_bound(document: &DidDocument, suite: &dyn SignatureSuite, public_key: &[u8]) -> bool {
        document.has_verification_key(suite, public_key)
    }

    fn unsigned(what: &str) -> VerificationResult {
        VerificationResult::from_checks(vec![VerificationCheck::new(
            "signature_present",
            false,
            || format!("{} is not signed", what),
        )])
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("suites", &self.suites)
            .field("policy", &self.policy)
            .field("trusted_issuers", &self.trusted_issuers)
            .finish_non_exhaustive()
    }
}
