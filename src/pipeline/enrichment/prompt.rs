use crate::models::COLUMNS;

/// System instruction sent with every enrichment call.
pub const SYSTEM_PROMPT: &str = "\
You are a defence intelligence data extraction analyst.

Extract structured fields from the BODY TEXT into the given schema.

Rules:
- Do not hallucinate. Do not infer details that are not stated.
- Use null for any field the text does not state.
- cadres_min, cadres_max and ammunition are integers.
- Always write input_summary when body text exists: factual, at most 3 lines.
- Return only one valid JSON object.";

/// The 19-key schema with every value null, in column order.
pub fn schema_template() -> String {
    let fields: Vec<String> = COLUMNS
        .iter()
        .map(|c| format!("  \"{}\": null", c.key()))
        .collect();
    format!("{{\n{}\n}}", fields.join(",\n"))
}

/// User message: schema followed by the (already truncated) block text.
pub fn build_user_prompt(body: &str) -> String {
    format!(
        "Extract the following fields.\n\nSCHEMA:\n{}\n\nBODY TEXT:\n\"\"\"\n{}\n\"\"\"\n\nReturn strictly valid JSON.",
        schema_template(),
        body
    )
}
