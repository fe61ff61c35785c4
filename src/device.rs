//! Device capabilities (share sheet, speech). These belong to the UI host; the
//! engine only requests them and never lets a failure affect committed state.

use async_trait::async_trait;
use tracing::info;

use crate::domain::LanguageCode;

pub const SPEECH_RATE: f32 = 0.8;

#[async_trait]
pub trait DeviceActions: Send + Sync {
  async fn share(&self, text: &str) -> Result<(), String>;
  async fn speak(&self, text: &str, locale: &str, rate: f32) -> Result<(), String>;
}

/// Speech locale for a content language.
pub fn speech_locale(lang: LanguageCode) -> &'static str {
  match lang {
    LanguageCode::En => "en-US",
    other => other.code(),
  }
}

/// Records requests in the log only; used when no host bridge is attached.
pub struct LoggingDevice;

#[async_trait]
impl DeviceActions for LoggingDevice {
  async fn share(&self, text: &str) -> Result<(), String> {
    info!(target: "deyim_backend", text_len = text.len(), "Share requested");
    Ok(())
  }

  async fn speak(&self, text: &str, locale: &str, rate: f32) -> Result<(), String> {
    info!(target: "deyim_backend", text_len = text.len(), %locale, rate, "Speech requested");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn english_uses_region_locale() {
    assert_eq!(speech_locale(LanguageCode::En), "en-US");
    assert_eq!(speech_locale(LanguageCode::Ja), "ja");
  }
}
