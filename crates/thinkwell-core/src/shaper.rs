//! Request shaping
//!
//! Applies an [`EffectiveConfig`] to an outgoing request. The caller's
//! request is never modified; shaping returns an independent copy.

use crate::request::ChatRequest;
use crate::resolver::EffectiveConfig;
use crate::rules::InjectPosition;

/// Produce the request actually sent to the provider
///
/// - `think` is always set explicitly to the resolved flag, so a forced
///   override replaces whatever the caller asked for.
/// - The injected message, if any, is added once, before or after the
///   caller's messages. An empty conversation is left empty.
#[must_use]
pub fn shape_request(request: &ChatRequest, effective: &EffectiveConfig) -> ChatRequest {
    let mut shaped = request.clone();
    shaped.think = Some(effective.send_reasoning_flag);

    if let Some(injected) = &effective.injected_message {
        if !shaped.messages.is_empty() {
            let message = injected.to_message();
            match injected.position {
                InjectPosition::Prepend => shaped.messages.insert(0, message),
                InjectPosition::Append => shaped.messages.push(message),
            }
        }
    }

    shaped
}
