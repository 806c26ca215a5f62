use crate::models::GenerationRequest;
use serde_json::json;
use thiserror::Error;
use serde::Deserialize;
use reqwest::Client;
use tracing::{info, error};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("API error: {0}")] Api(String),
    #[error("parse error: {0}")] Parse(String),
    #[error("model returned empty content")] Empty,
}

const MODEL: &str = "llama-3.3-70b-versatile";

// A few hundred tokens would silently truncate a full page, so the limit is
// sized to a complete single-page document.
const MAX_OUTPUT_TOKENS: u32 = 8000;

const SYSTEM_PROMPT: &str = "You are an expert web developer specializing in creating portfolio websites and websites for home service businesses like plumbers, electricians, and cleaning services. Generate complete, production-ready HTML code with embedded Tailwind CSS and JavaScript. Include comprehensive comments for each section and ensure the code follows best practices for performance and SEO. The website should be designed to convert visitors into customers. Other than the code, nothing should be shown.";

pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        let base_url = std::env::var("GROQ_API_BASE")
            .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Interpolates every populated form field into a fixed instruction
    /// describing the sections the generated site must carry. Empty fields
    /// are skipped so personal-portfolio and business submissions share one
    /// template.
    pub fn build_prompt(req: &GenerationRequest) -> String {
        let display_name = if req.business_name.is_empty() { &req.name } else { &req.business_name };
        let role = if req.service_type.is_empty() {
            req.role.clone()
        } else {
            format!("{} service provider", req.service_type)
        };

        let mut p = String::from(
            "Create a modern, responsive website using HTML, Tailwind CSS, and JavaScript.\n\n",
        );
        p.push_str("Business Details:\n");
        p.push_str(&format!("- Name: {}\n", display_name));
        if !role.is_empty() {
            p.push_str(&format!("- Role: {}\n", role));
        }
        if !req.experience.is_empty() {
            p.push_str(&format!("- Years of Experience: {}\n", req.experience));
        }
        if !req.coverage.is_empty() {
            p.push_str(&format!("- Service Area: {}\n", req.coverage));
        }
        if !req.working_hours.is_empty() {
            p.push_str(&format!("- Working Hours: {}\n", req.working_hours));
        }
        if req.emergency || !req.service_type.is_empty() {
            p.push_str(&format!(
                "- Emergency Services: {}\n",
                if req.emergency { "Available" } else { "Not available" }
            ));
        }

        if !req.about.is_empty() {
            p.push_str(&format!("\nAbout:\n{}\n", req.about));
        }
        if !req.skills.is_empty() {
            p.push_str(&format!("\nSkills (comma-separated):\n{}\n", req.skills));
        }
        if !req.services.is_empty() {
            p.push_str("\nServices Offered:\n");
            for s in &req.services {
                p.push_str(&format!("- {}\n", s));
            }
        }
        if !req.projects.is_empty() {
            p.push_str("\nProjects:\n");
            for proj in &req.projects {
                p.push_str(&format!("- {}\n", proj));
            }
        }
        if !req.pricing.is_empty() {
            p.push_str("\nPricing Information:\n");
            for price in &req.pricing {
                p.push_str(&format!("- {}\n", price));
            }
        }
        if !req.licenses.is_empty() {
            p.push_str(&format!("\nLicenses & Certifications:\n{}\n", req.licenses));
        }
        if !req.guarantees.is_empty() {
            p.push_str(&format!("\nService Guarantees:\n{}\n", req.guarantees));
        }
        if !req.testimonials.is_empty() {
            p.push_str("\nTestimonials:\n");
            for t in &req.testimonials {
                p.push_str(&format!("- \"{}\"\n", t));
            }
        }

        p.push_str("\nContact Information:\n");
        if !req.contact.phone.is_empty() {
            p.push_str(&format!("- Phone: {}\n", req.contact.phone));
        }
        if !req.contact.email.is_empty() {
            p.push_str(&format!("- Email: {}\n", req.contact.email));
        }
        if !req.contact.address.is_empty() {
            p.push_str(&format!("- Address: {}\n", req.contact.address));
        }
        if !req.contact.linkedin.is_empty() {
            p.push_str(&format!("- LinkedIn: {}\n", req.contact.linkedin));
        }
        if !req.contact.github.is_empty() {
            p.push_str(&format!("- GitHub: {}\n", req.contact.github));
        }

        if !req.colors.is_empty() {
            p.push_str(&format!("\nColor Scheme: {}\n", req.colors));
        }

        p.push_str(&format!(
            "\nRequirements:\n\
            1. Create a professional, trust-building design with smooth animations. Add some matching color to {} in hero section as gradient.\n\
            2. Ensure mobile-responsive layout\n\
            3. Include a prominent call-to-action\n\
            4. Add emergency service badge if applicable\n\
            5. Include testimonials carousel\n\
            6. Add schema markup for local business\n\
            7. Implement contact form with validation\n\
            8. Add service scheduling functionality\n\
            9. Include trust indicators (licenses, guarantees, years of experience)\n\
            10. Optimize for local SEO\n\
            11. Add emergency contact floating button if applicable\n\
            12. Include service comparison tables\n\
            13. It should be a long page with more content\n\
            14. All the above ones are for reference only and don't include them in site as it is",
            req.colors
        ));
        p
    }

    pub async fn generate_site(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        if self.api_key == "DEMO_KEY" {
            info!("Using demo mode - no real generation");
            return postprocess(&demo_site(req));
        }

        let prompt = Self::build_prompt(req);
        let preview: String = prompt.chars().take(120).collect();
        info!("🎯 Generating site, prompt ({} chars): {}", prompt.len(), preview);

        let raw = self.perform_api_call(&prompt).await?;
        let code = postprocess(&raw)?;
        info!("✅ Generated document ({} chars)", code.len());
        Ok(code)
    }

    async fn perform_api_call(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = json!({
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "model": MODEL,
            "temperature": 0.1,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "stream": false
        });

        info!("🔗 Making request to: {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API error response: {}", error_body);
            return Err(GenerationError::Api(format!("status={} body={}", status, error_body)));
        }

        let response_text = response.text().await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        parsed.choices.into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenerationError::Empty)
    }
}

/// Cleans the raw completion into a standalone document: drops Markdown
/// code fences and any leading HTML comment, trims, and injects the
/// DOCTYPE wrapper and viewport meta tag when absent. Stable when re-run
/// on its own output.
pub fn postprocess(raw: &str) -> Result<String, GenerationError> {
    let mut code = raw
        .replace("```html\n", "")
        .replace("```html", "")
        .replace("```\n", "")
        .replace("```", "");

    code = code.trim_start().to_string();
    if code.starts_with("<!--") {
        if let Some(end) = code.find("-->") {
            code = code[end + 3..].trim_start().to_string();
        }
    }

    let mut code = code.trim().to_string();
    if code.is_empty() {
        return Err(GenerationError::Empty);
    }

    if !code.contains("<!DOCTYPE html>") {
        code = format!("<!DOCTYPE html>\n<html lang=\"en\">\n{}", code);
    }

    if !code.contains("viewport") {
        code = code.replace(
            "<head>",
            "<head>\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
        );
    }

    Ok(code)
}

fn demo_site(req: &GenerationRequest) -> String {
    let title = if req.business_name.is_empty() { &req.name } else { &req.business_name };
    let title = if title.is_empty() { "Demo Portfolio" } else { title.as_str() };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  <title>{title}</title>\n</head>\n<body>\n  <header><h1>{title}</h1><p>{role}</p></header>\n  <main><section id=\"about\"><p>{about}</p></section></main>\n</body>\n</html>",
        title = title,
        role = req.role,
        about = req.about,
    )
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice { message: ChatMessage }

#[derive(Debug, Deserialize)]
struct ChatMessage { content: String }

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_request() -> GenerationRequest {
        GenerationRequest {
            name: "John Doe".into(),
            role: "Full Stack Developer".into(),
            about: "I build web apps.".into(),
            skills: "JavaScript, React, Rust".into(),
            colors: "teal and navy".into(),
            projects: vec!["A realtime chat app".into()],
            testimonials: vec!["Great work!".into()],
            contact: crate::models::Contact {
                email: "john@example.com".into(),
                linkedin: "https://linkedin.com/in/johndoe".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn prompt_includes_every_populated_field() {
        let req = sample_request();
        let prompt = GroqClient::build_prompt(&req);
        assert!(prompt.contains("John Doe"));
        assert!(prompt.contains("Full Stack Developer"));
        assert!(prompt.contains("I build web apps."));
        assert!(prompt.contains("JavaScript, React, Rust"));
        assert!(prompt.contains("- A realtime chat app"));
        assert!(prompt.contains("- \"Great work!\""));
        assert!(prompt.contains("john@example.com"));
        assert!(prompt.contains("https://linkedin.com/in/johndoe"));
        assert!(prompt.contains("Color Scheme: teal and navy"));
    }

    #[test]
    fn prompt_skips_empty_fields() {
        let req = sample_request();
        let prompt = GroqClient::build_prompt(&req);
        assert!(!prompt.contains("Licenses"));
        assert!(!prompt.contains("Pricing Information"));
        assert!(!prompt.contains("Phone:"));
    }

    #[test]
    fn postprocess_strips_fences_and_leading_comment() {
        let raw = "```html\n<!-- generated by model -->\n<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n</head>\n<body></body>\n</html>\n```";
        let out = postprocess(raw).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(!out.contains("```"));
        assert!(!out.contains("generated by model"));
    }

    #[test]
    fn postprocess_injects_doctype_and_viewport() {
        let raw = "<html lang=\"en\">\n<head>\n<title>x</title>\n</head>\n<body></body>\n</html>";
        let out = postprocess(raw).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("<meta name=\"viewport\""));
    }

    #[test]
    fn postprocess_is_idempotent() {
        let raw = "```html\n<head>\n<title>x</title>\n</head>\n<body>hi</body>\n```";
        let once = postprocess(raw).unwrap();
        let twice = postprocess(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn postprocess_rejects_empty_content() {
        assert!(matches!(postprocess("```html\n```"), Err(GenerationError::Empty)));
        assert!(matches!(postprocess("   \n  "), Err(GenerationError::Empty)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_surfaces_http_error() {
        // Nothing listens on the discard port, so the request fails at
        // connect time without touching the real API.
        let client = GroqClient::with_base_url("test-key".into(), "http://127.0.0.1:9".into());
        let err = client.generate_site(&sample_request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));
    }

    #[test]
    fn demo_site_passes_postprocess_checks() {
        let out = postprocess(&demo_site(&sample_request())).unwrap();
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert!(out.contains("viewport"));
        assert!(out.contains("John Doe"));
    }
}
