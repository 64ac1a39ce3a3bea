use serde::{Deserialize, Serialize};

/// A credential subject with a fixed credential type.
pub trait TypedSubject: Serialize {
    /// Type appended after `VerifiableCredential`.
    const CREDENTIAL_TYPE: &'static str;

    /// DID of the entity the claims are about.
    fn subject_id(&self) -> &str;
}

/// Claims of a mining-equipment license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningLicenseInfo {
    /// DID of the license holder.
    pub id: String,
    pub credential_id: String,
    pub serial: String,
    pub name: String,
    pub model: String,
}

impl MiningLicenseInfo {
    pub fn new(
        id: impl Into<String>,
        credential_id: impl Into<String>,
        serial: impl Into<String>,
        name: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            credential_id: credential_id.into(),
            serial: serial.into(),
            name: name.into(),
            model: model.into(),
        }
    }
}

impl TypedSubject for MiningLicenseInfo {
    const CREDENTIAL_TYPE: &'static str = "MiningLicense";

    fn subject_id(&self) -> &str {
        &self.id
    }
}
