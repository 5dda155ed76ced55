pub const VISION_INSTRUCTION: &str = "Describe this photograph of professional ballet dancers \
vividly but briefly. Cover their movement, costumes, facial expressions and the overall mood \
of the performance, so the description serves readers who are blind or have low vision.";

pub const VISION_TEMPERATURE: f32 = 0.7;

pub fn synthesis_instruction(description: &str, image_context: &str, text_context: &str) -> String {
    format!(
        "You write alt text for accessibility.\n\
         Base it on this image analysis: \"{description}\".\n\
         Take into account this context about the dancers: \"{image_context}\".\n\
         Write for this audience: \"{text_context}\".\n\
         Answer with a single JSON object with exactly two string keys: \"simple\" (short, clear \
         alt text) and \"complex\" (detailed alt text). Output the JSON object only, with no \
         surrounding text or line breaks."
    )
}

pub fn synthesis_user_message(image_context: &str, text_context: &str) -> String {
    format!("{image_context}, {text_context}")
}
