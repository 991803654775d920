use async_trait::async_trait;
use invochat_core::{Tool, ToolError, Value};
use invochat_mail::{Mailer, SendRequest};
use serde_json::json;

/// Sends the approved email through the configured mailer. Credentials are
/// fixed at construction; the model only ever supplies draft fields.
///
/// Send failures are reported as an error-status payload rather than a tool
/// error, so the model can relay what went wrong.
pub struct SendEmailTool {
    mailer: Mailer,
}

impl SendEmailTool {
    pub const NAME: &'static str = "send_email_with_attachments_tool";

    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Sends an email with one or more attachments. This tool is called by the system after \
         user consent is given."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "to_emails": {
                    "type": "string",
                    "description": "A comma-separated string of recipient email addresses."
                },
                "subject": {
                    "type": "string",
                    "description": "The email subject."
                },
                "body": {
                    "type": "string",
                    "description": "The plain-text email content."
                },
                "attachments_json": {
                    "type": "string",
                    "description": "A JSON string of a list of attachment objects. Each object must have a 'url' and a 'filename' key. Example: '[{\"url\": \"...\", \"filename\": \"report.csv\"}]'"
                }
            },
            "required": ["to_emails", "subject", "body", "attachments_json"]
        })
    }

    async fn invoke(&self, arguments: &str) -> Result<Value, ToolError> {
        let request: SendRequest = serde_json::from_str(arguments)?;
        match self.mailer.send(&request).await {
            Ok(receipt) => Ok(json!({
                "status": "success",
                "message": "Email sent successfully.",
                "message_id": receipt.message_id,
            })),
            Err(error) => {
                tracing::error!(error = %error, "email send failed");
                Ok(json!({ "status": "error", "message": error.to_string() }))
            }
        }
    }
}
