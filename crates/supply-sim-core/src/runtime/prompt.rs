// crates/supply-sim-core/src/runtime/prompt.rs
// ============================================================================
// Module: Supply Sim Prompt Builder
// Description: Builds the structured-call request for a disruption event.
// Purpose: Embed the event text and the option catalog into one prompt.
// Dependencies: crate::core, crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! The prompt lists every stage with its default and alternative options so
//! the model can only pick labels that exist. The answer format is stated
//! twice: in prose in the instructions and as a JSON schema.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use serde_json::Value;
use serde_json::json;

use crate::core::Catalog;
use crate::core::DEFAULT_CHOICE_LABEL;
use crate::interfaces::AssessmentRequest;

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Task instructions shared by every disruption request.
const INSTRUCTIONS: &str = "You assess how a real-world disruption event affects a laptop supply \
                            chain. For every stage listed in the input, decide whether the event \
                            affects it and which option the stage should use. Respond with a \
                            JSON array containing exactly one object per stage of the form \
                            {\"stage\": string, \"affected\": boolean, \"choice\": string, \
                            \"reason\": string}. \"stage\" must repeat the stage name verbatim. \
                            \"choice\" must be \"Default\" or one of the option names listed for \
                            that stage. Return only the JSON array.";

/// Builds the structured-call request for an event.
#[must_use]
pub fn build_request(catalog: &Catalog, event: &str) -> AssessmentRequest {
    AssessmentRequest {
        instructions: INSTRUCTIONS.to_string(),
        prompt: build_prompt(catalog, event),
        output_schema: output_schema(catalog),
    }
}

/// Renders the event and option catalog as prompt text.
#[must_use]
pub fn build_prompt(catalog: &Catalog, event: &str) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Disruption event: {}", event.trim());
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Stages and options:");
    for stage in catalog.stages() {
        let _ = writeln!(prompt, "- {}", stage.stage_id);
        let _ = writeln!(
            prompt,
            "  - {DEFAULT_CHOICE_LABEL}: {} (cost ${}, CO2 {} kg)",
            stage.default_choice, stage.cost_usd, stage.co2_kg
        );
        for alternative in &stage.alternatives {
            let _ = writeln!(
                prompt,
                "  - {}: {} (cost ${}, CO2 {} kg)",
                alternative.label, alternative.suppliers, alternative.cost_usd, alternative.co2_kg
            );
        }
    }
    prompt
}

/// Returns the JSON schema for the expected answer array.
#[must_use]
pub fn output_schema(catalog: &Catalog) -> Value {
    let stages: Vec<&str> = catalog.stages().iter().map(|stage| stage.stage_id.as_str()).collect();
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "stage": { "type": "string", "enum": stages },
                "affected": { "type": "boolean" },
                "choice": { "type": "string" },
                "reason": { "type": "string" }
            },
            "required": ["stage", "affected", "choice", "reason"]
        }
    })
}
