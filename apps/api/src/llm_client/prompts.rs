// Shared prompt fragments.
// Each feature module builds its own prompts; this file holds the cross-cutting pieces.

/// Appended to prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences.";

/// Tone shared by every piece of user-facing copy the service generates.
pub const DATING_APP_TONE: &str = "Keep the tone warm, inclusive, and respectful.";
