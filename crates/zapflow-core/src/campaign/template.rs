//! Template Renderer - Handles personalization of outgoing message text

use regex::Regex;
use serde_json::Value;
use zapflow_storage::models::Recipient;

/// Template renderer for personalizing message content
pub struct TemplateRenderer {
    placeholder_re: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer
    pub fn new() -> Self {
        // Match patterns like {{nome}} or {{custom_field}}
        let placeholder_re = Regex::new(r"\{\{[^}]+\}\}").expect("valid placeholder pattern");
        Self { placeholder_re }
    }

    /// Render a template with recipient data
    pub fn render(&self, template: &str, recipient: &Recipient) -> String {
        let mut result = template.to_string();

        // Basic variables
        result = result.replace("{{nome}}", recipient.name.as_deref().unwrap_or(""));
        result = result.replace("{{tag}}", recipient.tag.as_deref().unwrap_or(""));

        // Custom attributes
        if let Some(attrs) = recipient.attributes.as_object() {
            for (key, value) in attrs {
                let placeholder = format!("{{{{{}}}}}", key);
                let value_str = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => value.to_string(),
                };
                result = result.replace(&placeholder, &value_str);
            }
        }

        // Clean up any remaining placeholders
        self.remove_unused_placeholders(&result)
    }

    /// Remove unused placeholder variables
    fn remove_unused_placeholders(&self, content: &str) -> String {
        self.placeholder_re.replace_all(content, "").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_recipient() -> Recipient {
        Recipient {
            id: uuid::Uuid::new_v4(),
            campaign_id: uuid::Uuid::new_v4(),
            name: Some("Ana".to_string()),
            address: "5511999990000".to_string(),
            tag: Some("vip".to_string()),
            attributes: serde_json::json!({
                "cidade": "Lisboa",
                "pedidos": 3,
                "ativo": true
            }),
            status: "pending".to_string(),
            sent_at: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_render_basic_template() {
        let renderer = TemplateRenderer::new();
        let recipient = create_test_recipient();

        let result = renderer.render("Oi {{nome}}, seu plano: {{tag}}", &recipient);

        assert_eq!(result, "Oi Ana, seu plano: vip");
    }

    #[test]
    fn test_render_with_attributes() {
        let renderer = TemplateRenderer::new();
        let recipient = create_test_recipient();

        let result = renderer.render(
            "{{nome}} de {{cidade}} tem {{pedidos}} pedidos (ativo: {{ativo}})",
            &recipient,
        );

        assert_eq!(result, "Ana de Lisboa tem 3 pedidos (ativo: true)");
    }

    #[test]
    fn test_render_removes_unused() {
        let renderer = TemplateRenderer::new();
        let recipient = create_test_recipient();

        let result = renderer.render("Oi {{nome}}, {{desconhecido}} promo", &recipient);

        assert_eq!(result, "Oi Ana,  promo");
    }

    #[test]
    fn test_render_missing_name_and_tag_fall_back_to_empty() {
        let renderer = TemplateRenderer::new();
        let mut recipient = create_test_recipient();
        recipient.name = None;
        recipient.tag = None;

        let result = renderer.render("Oi {{nome}} [{{tag}}]", &recipient);

        assert_eq!(result, "Oi  []");
    }
}
