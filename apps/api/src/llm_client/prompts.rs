// Shared prompt fragments used by more than one letter section.
// Section-specific prompts live in generation/prompts.rs.

/// Persona for the drafting pass.
pub const COACH_SYSTEM: &str = "You are a seasoned career coach who writes resumes and \
    cover letters for a living.";

/// Persona for the revision pass.
pub const EDITOR_SYSTEM: &str = "You are a careful editor. Revise the text you are given \
    so it reads clearly and lands with impact.";

/// Persona for the company-alignment section.
pub const ALIGNMENT_SYSTEM: &str = "You are a skilled writer who connects a candidate's \
    strengths to the values of the company they are applying to.";

/// Appended to every section that is not the last one in the letter.
pub const NO_SIGNATURE_INSTRUCTION: &str = "This is not the end of the letter: do NOT add \
    a greeting, a closing or a signature.";

/// Appended to the final section. Replace `{name}` before sending.
pub const SIGNATURE_INSTRUCTION: &str = "This is the final section of the letter: do NOT \
    open with a greeting, but finish with a signature that ends with {name}.";
