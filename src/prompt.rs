//! Prompt construction for README generation.

use crate::source::SourceFile;
use crate::utils::calculate_fence;

/// Everything that goes into the generation prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// `None` when a folder was selected instead of a file.
    pub source: Option<&'a SourceFile>,
    pub tree: &'a str,
    pub previous_readme: Option<&'a str>,
    /// Natural language the README should be written in.
    pub language: &'a str,
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let subject = if input.source.is_some() {
        "the following source code"
    } else {
        "the project with the following folder structure"
    };

    let previous = input
        .previous_readme
        .map(str::trim)
        .filter(|readme| !readme.is_empty());

    let mut prompt = match previous {
        Some(_) => format!(
            "Create a new README in {} for {subject}, using the existing README below as a reference.\n",
            input.language
        ),
        None => format!("Create a README in {} for {subject}.\n", input.language),
    };

    if let Some(readme) = previous {
        prompt.push_str("\nREADME:\n");
        push_fenced(&mut prompt, "markdown", readme);
    }

    if let Some(source) = input.source {
        prompt.push_str(&format!("\nSource code ({}):\n", source.file_name()));
        push_fenced(&mut prompt, source.language, &source.text);
    }

    prompt.push_str("\nFolder structure:\n");
    push_fenced(&mut prompt, "", input.tree);
    prompt
}

fn push_fenced(prompt: &mut String, lang: &str, body: &str) {
    let fence = calculate_fence(body);
    prompt.push_str(&fence);
    prompt.push_str(lang);
    prompt.push('\n');
    prompt.push_str(body);
    if !body.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str(&fence);
    prompt.push('\n');
}
