// Matching: candidate → job and job → candidate.
// Flow: validate form → extract skill sheet → fetch template + records →
//       assemble prompt → one chat completion → trimmed answer.
// All LLM calls go through llm_client; all remote documents through google.

pub mod handlers;
pub mod pipeline;
pub mod prompts;
