use serde::{Serialize, Deserialize};

/// One form submission. Required fields are enforced client-side; the
/// server interpolates whatever is present into the prompt and skips the
/// rest. Covers both the personal-portfolio form and the home-service
/// business form, which share most of their shape.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub name: String,
    pub role: String,
    pub business_name: String,
    pub service_type: String,
    pub experience: String,
    pub coverage: String,
    pub working_hours: String,
    pub emergency: bool,
    pub about: String,
    pub skills: String, // comma-separated
    pub services: Vec<String>,
    pub pricing: Vec<String>,
    pub licenses: String,
    pub guarantees: String,
    pub testimonials: Vec<String>,
    pub projects: Vec<String>,
    pub contact: Contact,
    pub colors: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeployRequest {
    #[serde(default)]
    pub code: String,
    #[serde(rename = "folderName", default)]
    pub folder_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
