//! Completion prompt assembly from retrieved context.

/// Join retrieved texts into one context block and interpolate it, together
/// with the system prompt, into the completion template. Pure and
/// deterministic: identical inputs produce byte-identical output.
pub fn assemble(system_prompt: &str, contexts: &[String]) -> String {
    let context = contexts.join(" ");
    format!(
        "{}\n\nBased on the context provided from the vector database, here is the relevant information:\n\n{}\n\n",
        system_prompt, context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_contexts_with_a_single_space() {
        let contexts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let prompt = assemble("system", &contexts);
        assert!(prompt.contains("one two three"));
    }

    #[test]
    fn output_is_byte_identical_for_identical_inputs() {
        let contexts = vec!["a".to_string(), "b".to_string()];
        let first = assemble("answer briefly", &contexts);
        let second = assemble("answer briefly", &contexts);
        assert_eq!(first, second);
    }

    #[test]
    fn template_shape_is_fixed() {
        let prompt = assemble("SYS", &["CTX".to_string()]);
        assert_eq!(
            prompt,
            "SYS\n\nBased on the context provided from the vector database, here is the relevant information:\n\nCTX\n\n"
        );
    }

    #[test]
    fn empty_context_list_still_produces_the_template() {
        let prompt = assemble("SYS", &[]);
        assert!(prompt.starts_with("SYS\n\n"));
        assert!(prompt.ends_with("\n\n\n\n"));
    }
}
