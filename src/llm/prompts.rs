use crate::models::AspectDef;

/// Corrective prompt for the single JSON repair pass
pub const REPAIR_PROMPT: &str = r#"You are a JSON formatter. You will be given an invalid JSON string and the error the parser reported when loading it. Correct the JSON string using the error message and return only the corrected JSON, with no additional text.

Invalid JSON string: """{invalid_json}"""

Parser error message: """{error}"""

Corrected JSON string: "#;

pub fn render_repair_prompt(invalid_json: &str, error: &str) -> String {
    fill_placeholders(
        REPAIR_PROMPT,
        &[("{invalid_json}", invalid_json), ("{error}", error)],
    )
}

/// Substitute every placeholder in one left-to-right pass over the template.
/// Inserted values are never scanned again.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = values
            .iter()
            .filter_map(|&(placeholder, value)| {
                rest.find(placeholder).map(|at| (at, placeholder, value))
            })
            .min_by_key(|&(at, _, _)| at);

        match next {
            Some((at, placeholder, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + placeholder.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

const ASPECT_PREAMBLE: &str = "You are a customer service quality analyst. You will be given the transcription of a customer service call, one line per turn prefixed with \"agent\" or \"customer\". Analyze it objectively and without bias.\n\nTranscript:\n\"\"\"{transcript}\"\"\"\n\n";

const ASPECT_FOOTER: &str = "\n\nThe rating must be one of [1, 2, 3, 4, 5]. Give a brief reason for the rating and a suggestion for the agent if there is scope for improvement; if no improvement is needed use \"None\" as the suggestion. Keep the reason and suggestion to 7 to 10 words each.\n\nOutput should be in the JSON format below:\n{\"rating\": <rating>, \"reason\": \"<reason for the rating>\", \"suggestion\": \"<scope of improvement>\"}\n\nResult: ";

fn aspect(label: &str, task: &str) -> AspectDef {
    AspectDef::new(label, format!("{}{}{}", ASPECT_PREAMBLE, task, ASPECT_FOOTER))
}

/// The six quality dimensions every call is rated on
pub fn default_aspects() -> Vec<AspectDef> {
    vec![
        aspect(
            "Customer Satisfaction",
            "Rate how satisfied the customer appeared to be at the end of the call:\n1 = Very Dissatisfied\n2 = Dissatisfied\n3 = Neutral\n4 = Satisfied\n5 = Very Satisfied",
        ),
        aspect(
            "Product Knowledge",
            "Rate the agent's product knowledge, based on:\n  - Depth of knowledge about products and services\n  - Ability to answer questions accurately\n1 = Very Poor, 2 = Poor, 3 = Adequate, 4 = Good, 5 = Excellent",
        ),
        aspect(
            "Empathy",
            "Rate the agent's empathy and understanding, based on:\n  - Understanding of the customer's issue\n  - Patience and respect shown\n1 = Very Poor, 2 = Poor, 3 = Average, 4 = Good, 5 = Excellent",
        ),
        aspect(
            "Listening Skills",
            "Rate only the agent's listening skills, based on:\n  - Active listening and acknowledgment (\"I understand\", paraphrasing the concern)\n  - Letting the customer finish without interrupting\n1 = Very Poor, 2 = Poor, 3 = Average, 4 = Good, 5 = Excellent",
        ),
        aspect(
            "Communication Clarity",
            "Rate how clearly and effectively the agent communicated, based on:\n  - Clear and concise language\n  - Avoiding jargon and technical terms\n1 = Very Unclear, 2 = Unclear, 3 = Moderately Clear, 4 = Clear, 5 = Very Clear",
        ),
        aspect(
            "Call Handling Skills",
            "Rate the agent's call handling skills, based on:\n  - Managing difficult customers effectively\n  - Keeping the conversation focused and on track\n1 = Very Poor, 2 = Poor, 3 = Average, 4 = Good, 5 = Excellent",
        ),
    ]
}

const SENTIMENT_FOOTER: &str = "\n\nThe sentiment must be one of: Positive, Negative, Neutral.\n\nProvide the output in the JSON format below:\n{\n  \"sentiment\": \"<sentiment>\",\n  \"reason\": \"<reason for the sentiment>\",\n  \"suggestion\": \"<scope of improvement, or 'None' if no improvement is needed>\"\n}\n\nProvide only the JSON output, without any additional text. Keep the reason and suggestion to 7 to 10 words each.\n\nJSON Output: ";

/// Sentiment of the whole call
pub fn overall_sentiment_prompt() -> String {
    format!(
        "You are analyzing the sentiment of a customer support call transcript. Consider the politeness, professionalism, clarity and problem-solving ability of the agent, and the politeness, patience and completeness of information of the customer.\n\nTranscript:\n\"\"\"{{transcript}}\"\"\"{}",
        SENTIMENT_FOOTER
    )
}

/// Sentiment of the agent's lines only
pub fn agent_sentiment_prompt() -> String {
    format!(
        "You are analyzing the sentiment of the agent's responses only, taken from a customer support call. Consider politeness, professionalism, clarity of communication, problem-solving ability and product knowledge.\n\nAgent responses:\n\"\"\"{{transcript}}\"\"\"{}",
        SENTIMENT_FOOTER
    )
}

/// Sentiment of the customer's lines only
pub fn customer_sentiment_prompt() -> String {
    format!(
        "You are analyzing the sentiment of the customer's responses only, taken from a customer support call. Consider politeness, patience, clarity and how satisfied the customer sounds.\n\nCustomer responses:\n\"\"\"{{transcript}}\"\"\"{}",
        SENTIMENT_FOOTER
    )
}
