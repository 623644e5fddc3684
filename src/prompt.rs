// The system instruction pins the response shape; the model still drifts
// from it often enough that extraction has to tolerate wrapped output.
pub const SYSTEM_PROMPT: &str =
    "You are a library classification expert specializing in the Dewey \
    Decimal Classification (DDC) system. Always respond with valid JSON \
    containing number, category, and description fields. The number must \
    be in XXX.XX format. Do not include markdown code blocks in your \
    response.";

pub fn user_prompt(text: &str) -> String {
    format!(
        "Analyze the following text and provide a Dewey Decimal \
        Classification (DDC). Return ONLY a JSON object with this exact \
        structure, no other text:\n\
        {{\n\
        \x20 \"number\": \"XXX.XX\",\n\
        \x20 \"category\": \"Category Name\",\n\
        \x20 \"description\": \"Brief description\"\n\
        }}\n\n\
        Text to analyze: {}",
        text
    )
}
