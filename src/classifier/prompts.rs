use serde_json::Value;

use crate::classifier::taxonomy::Taxonomy;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationInput {
    pub name: Option<String>,
    pub description: String,
}

impl ClassificationInput {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            name: None,
            description: description.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

pub fn build_prompt(taxonomy: &Taxonomy, input: &ClassificationInput) -> String {
    if taxonomy.is_closed_set() {
        closed_set_prompt(taxonomy, input)
    } else {
        open_set_prompt(taxonomy, input)
    }
}

fn closed_set_prompt(taxonomy: &Taxonomy, input: &ClassificationInput) -> String {
    let labels = taxonomy.labels.join(", ");
    let mut prompt = String::from("You are an AI trained to classify medical conditions.\n\n");
    prompt.push_str("TASK:\n");
    prompt.push_str(&format!(
        "- Classify the following disease into ONE of these categories: {}.\n",
        labels
    ));
    prompt.push_str(&format!(
        "- If none of them fits, reply with \"{}\".\n\n",
        taxonomy.sentinels.no_match
    ));
    prompt.push_str("STRICT RULES:\n");
    prompt.push_str("- Return ONLY one category name.\n");
    prompt.push_str("- No explanations, no extra words, no follow-up questions.\n\n");
    push_subject(&mut prompt, input);
    prompt.push_str(&format!(
        "\nReply with only one of these categories: {}\n\nCategory:",
        labels
    ));
    prompt
}

fn open_set_prompt(taxonomy: &Taxonomy, input: &ClassificationInput) -> String {
    let mut prompt =
        String::from("You are an AI trained to analyze and categorize diseases.\n");
    prompt.push_str(
        "Given the following disease information, determine its most appropriate category.\n\n",
    );
    prompt.push_str("TASK:\n");
    prompt.push_str("- Read the disease name and description.\n");
    prompt.push_str("- Determine the most relevant category from standard medical classification.\n");
    prompt.push_str(
        "- Reply with ONLY the category name (e.g. \"Neurological Diseases\", \"Respiratory Diseases\").\n",
    );
    prompt.push_str("- No explanations, extra words, or follow-up questions.\n");
    prompt.push_str(&format!(
        "- If uncertain, return \"{}\".\n\n",
        taxonomy.sentinels.no_match
    ));
    push_subject(&mut prompt, input);
    prompt
}

fn push_subject(prompt: &mut String, input: &ClassificationInput) {
    if let Some(name) = input.name.as_deref().filter(|name| !name.trim().is_empty()) {
        prompt.push_str(&format!("Disease Name: {}\n", name.trim()));
    }
    // Embedded as a JSON string literal so quotes and newlines in the record
    // cannot break out of the description line.
    let description = Value::String(input.description.trim().to_string());
    prompt.push_str(&format!("Disease Description: {}\n", description));
}
