use std::borrow::Cow;

use crate::error::Result;

/// External rewriter applied to a job description before ranking.
///
/// Typically backed by a generative model. The engine treats it as an opaque
/// text -> text step and never retries it.
pub trait DescriptionEnhancer {
    fn enhance(&self, description: &str) -> Result<String>;
}

/// Returns the description unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl DescriptionEnhancer for PassThrough {
    fn enhance(&self, description: &str) -> Result<String> {
        Ok(description.to_string())
    }
}

impl<F> DescriptionEnhancer for F
where
    F: Fn(&str) -> Result<String>,
{
    fn enhance(&self, description: &str) -> Result<String> {
        self(description)
    }
}

/// Run `enhancer`, falling back to `description` when it fails, returns blank
/// text, or answers with `refusal_marker`.
pub fn enhance_or_original<'a>(
    enhancer: &dyn DescriptionEnhancer,
    description: &'a str,
    refusal_marker: &str,
) -> Cow<'a, str> {
    match enhancer.enhance(description) {
        Ok(text) if text.trim().is_empty() => {
            tracing::warn!("description enhancer returned empty text, using original");
            Cow::Borrowed(description)
        }
        Ok(text) if !refusal_marker.is_empty() && text.to_lowercase().contains(&refusal_marker.to_lowercase()) => {
            tracing::warn!("description enhancer refused the description, using original");
            Cow::Borrowed(description)
        }
        Ok(text) => Cow::Owned(text),
        Err(e) => {
            tracing::warn!(error = %e, "description enhancer failed, using original");
            Cow::Borrowed(description)
        }
    }
}
