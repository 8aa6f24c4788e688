// Text generation: typed requests → prompts → single LLM call → interpreted reply.
// All LLM calls go through llm_client — no direct Gemini calls here.

pub mod generator;
pub mod handlers;
pub mod interpreter;
pub mod prompts;
pub mod request;
