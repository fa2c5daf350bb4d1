//! Extraction routines that delegate to the completion provider.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;

/// Pull the sender address out of `/data/email.txt`.
pub struct EmailSender;

#[async_trait]
impl Handler for EmailSender {
    fn name(&self) -> &str {
        "email_sender"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("email.txt");
        let output = ctx.sandbox.path("email-sender.txt");

        let message = ctx.sandbox.read_to_string(&input).await?;
        let prompt = format!(
            "Extract the sender's email address from the following email message. \
             Respond with only the email address.\n\n{}",
            message
        );

        let sender = ctx.llm.complete(&prompt).await?;
        let sender = sender.trim();

        ctx.sandbox.write(&output, sender).await?;

        Ok(json!({
            "sender": sender,
            "output": output.display().to_string(),
        }))
    }
}

/// Read the card number off `/data/credit_card.png` with a vision prompt.
pub struct CreditCardNumber;

fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[async_trait]
impl Handler for CreditCardNumber {
    fn name(&self) -> &str {
        "credit_card_number"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("credit_card.png");
        let output = ctx.sandbox.path("credit-card.txt");

        let bytes = ctx.sandbox.read(&input).await?;
        let data_url = format!("data:image/png;base64,{}", BASE64.encode(&bytes));

        let response = ctx
            .llm
            .complete_vision(
                "Extract the card number shown in this image. Respond with only the number.",
                &data_url,
            )
            .await?;
        let number = digits_only(&response);

        ctx.sandbox.write(&output, &number).await?;

        Ok(json!({
            "card_number": number,
            "output": output.display().to_string(),
        }))
    }
}

/// Transcribe `/data/audio.mp3` via the provider's audio input support.
pub struct TranscribeAudio;

#[async_trait]
impl Handler for TranscribeAudio {
    fn name(&self) -> &str {
        "transcribe_audio"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("audio.mp3");
        let output = ctx.sandbox.path("audio-transcript.txt");

        let bytes = ctx.sandbox.read(&input).await?;
        let transcript = ctx
            .llm
            .complete_audio(
                "Transcribe this audio recording. Respond with only the transcript text.",
                &BASE64.encode(&bytes),
                "mp3",
            )
            .await?;
        let transcript = transcript.trim();

        ctx.sandbox.write(&output, transcript).await?;

        Ok(json!({
            "characters": transcript.len(),
            "output": output.display().to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::context;

    #[test]
    fn digits_only_strips_everything_else() {
        assert_eq!(digits_only("The number is 4111-1111 1111 1111."), "4111111111111111");
        assert_eq!(digits_only("no digits here"), "");
    }

    #[tokio::test]
    async fn missing_email_input_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(matches!(
            EmailSender.run(&ctx, "extract email sender").await,
            Err(AgentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn missing_card_image_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(matches!(
            CreditCardNumber.run(&ctx, "extract credit card").await,
            Err(AgentError::NotFound(_))
        ));
    }
}
