use serde::{Deserialize, Serialize};

/// Body of the bulk WhatsApp template endpoint. The nesting mirrors the
/// provider's wire format exactly.
#[derive(Serialize, Debug)]
pub struct BulkTemplatePayload {
    pub integrated_number: String,
    pub content_type: String,
    pub payload: TemplateMessage,
}

#[derive(Serialize, Debug)]
pub struct TemplateMessage {
    pub messaging_product: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub template: Template,
}

#[derive(Serialize, Debug)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    pub to_and_components: Vec<ToAndComponents>,
}

#[derive(Serialize, Debug)]
pub struct TemplateLanguage {
    pub code: String,
    pub policy: String,
}

#[derive(Serialize, Debug)]
pub struct ToAndComponents {
    pub to: Vec<String>,
    pub components: Components,
}

#[derive(Serialize, Debug)]
pub struct Components {
    pub body_1: BodyComponent,
}

#[derive(Serialize, Debug)]
pub struct BodyComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub value: String,
}

impl BulkTemplatePayload {
    /// Template message to a single recipient with one body variable.
    pub fn single(integrated_number: &str, template_name: &str, to: &str, body_value: &str) -> Self {
        Self {
            integrated_number: integrated_number.to_string(),
            content_type: "template".to_string(),
            payload: TemplateMessage {
                messaging_product: "whatsapp".to_string(),
                message_type: "template".to_string(),
                template: Template {
                    name: template_name.to_string(),
                    language: TemplateLanguage {
                        code: "en".to_string(),
                        policy: "deterministic".to_string(),
                    },
                    to_and_components: vec![ToAndComponents {
                        to: vec![to.to_string()],
                        components: Components {
                            body_1: BodyComponent {
                                component_type: "text".to_string(),
                                value: body_value.to_string(),
                            },
                        },
                    }],
                },
            },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SendResponse {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_matches_the_provider_wire_format() {
        let payload = BulkTemplatePayload::single("919000000001", "welcome3", "919876543210", "Asha");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "integrated_number": "919000000001",
                "content_type": "template",
                "payload": {
                    "messaging_product": "whatsapp",
                    "type": "template",
                    "template": {
                        "name": "welcome3",
                        "language": { "code": "en", "policy": "deterministic" },
                        "to_and_components": [
                            {
                                "to": ["919876543210"],
                                "components": {
                                    "body_1": { "type": "text", "value": "Asha" }
                                }
                            }
                        ]
                    }
                }
            })
        );
    }
}
