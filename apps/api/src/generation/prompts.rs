// Prompt templates for the three letter sections.
// Placeholders are `{name}`-style and filled with `str::replace` by sections.rs.
// Cross-section fragments come from llm_client::prompts.

/// Intro, pass 1. Replace: {name}, {role}, {company}, {points}, {signature_rule}
pub const INTRO_DRAFT_TEMPLATE: &str = "We are writing the opening paragraph of a cover letter. \
Write EXACTLY ONE PARAGRAPH. Work in every key point below and make clear why I am a strong \
fit for the position. The paragraph has to stand out in a crowded field and make the first \
reader curious to learn more. Write like a person, not a template. {signature_rule}

My name is {name} and I am applying for the {role} position at {company}.

Key points: {points}";

/// Intro, pass 2. Replace: {name}, {role}, {company}, {draft}, {signature_rule}
pub const INTRO_REVISION_TEMPLATE: &str = "Below is the opening paragraph of my cover letter. \
It is solid but sounds mechanical. Make it more human while keeping it professional, with a \
confident and assertive voice. Return EXACTLY ONE PARAGRAPH. {signature_rule}

I am {name}, applying for the {role} position at {company}.

Paragraph: {draft}";

/// Experience, pass 1. Replace: {role}, {company}, {points}, {signature_rule}
pub const EXPERIENCE_DRAFT_TEMPLATE: &str = "We are writing the experience section of a cover \
letter. Write EXACTLY TWO PARAGRAPHS. Use the key points below about my experience and skills \
to show why I am a great fit for the role; this section must prove my expertise. Keep the \
style compelling and assertive. {signature_rule}

I am applying for the {role} position at {company}.

Key points: {points}";

/// Experience, pass 2. Replace: {draft}, {signature_rule}
pub const EXPERIENCE_REVISION_TEMPLATE: &str = "Here is the experience section of my cover \
letter. It is decent but can be better. Rewrite it with a more human touch so it stands out \
from other applications and shows off my skills and experience. Return EXACTLY TWO \
PARAGRAPHS. {signature_rule}

Section: {draft}";

/// Alignment without company material. Replace: {company}, {signature_rule}
pub const ALIGNMENT_GENERIC_TEMPLATE: &str = "I have no specific information about {company}. \
{signature_rule} Write ONE OR TWO paragraphs for my cover letter that show how I align with \
values most companies care about: innovation, dedication, teamwork and excellence.";

/// Alignment grounded in the company's own site. Replace: {company}, {content}, {signature_rule}
pub const ALIGNMENT_GROUNDED_TEMPLATE: &str = "Below are sentences taken from the website of \
{company}. {signature_rule} Write ONE OR TWO paragraphs for my cover letter that show how I \
align with the values and mission expressed in them.

Company material: {content}";
