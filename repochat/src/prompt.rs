use indoc::formatdoc;

pub const SYSTEM_PROMPT: &str = "You are a Senior Software Engineer with expertise in TypeScript, Python, Java, C++, Go, Rust, C, and Swift. Your role is to answer questions about the codebase using the context provided. Always analyze all the available context thoroughly, and if the context is insufficient, use your expertise and previously provided information to form a thoughtful, accurate response. If any assumptions are required due to limited context, do not mention that you are limited by a lack of context or anything along those lines. Do not mention anything about a section for context on anything along those lines.";

const CHUNK_SEPARATOR: &str = "\n\n-------\n\n";

#[must_use]
pub fn build_prompt<S: AsRef<str>>(query: &str, contexts: &[S]) -> String {
    let context = contexts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR);

    formatdoc!(
        "<CONTEXT>
        {context}
        -------
        </CONTEXT>



        MY QUESTION:
        {query}",
        context = context,
        query = query,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_chunks_in_context_block() {
        let prompt = build_prompt("How is routing done?", &["fn route()", "struct Router"]);

        assert_eq!(
            prompt,
            "<CONTEXT>\nfn route()\n\n-------\n\nstruct Router\n-------\n</CONTEXT>\n\n\n\nMY QUESTION:\nHow is routing done?"
        );
    }

    #[test]
    fn keeps_multiline_chunks_intact() {
        let prompt = build_prompt("q", &["fn main() {\n    run();\n}"]);

        assert!(prompt.contains("fn main() {\n    run();\n}\n-------\n</CONTEXT>"));
    }
}
