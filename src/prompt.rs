//! System prompt templating.
//!
//! The built-in prompt text lives in one template file and is rendered with
//! the discovered tools and optional operator instructions.

use std::collections::BTreeMap;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.template");

/// Parameters used to compile the system prompt template.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemPromptParams<'a> {
    pub toolkits: Vec<&'a str>,
    /// Model-facing names of the tools actually offered.
    pub available_tools: Vec<&'a str>,
    pub custom_instructions: Option<&'a str>,
}

/// Render the system prompt template using runtime parameters.
pub fn render_system_prompt(params: SystemPromptParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TOOLKITS_LIST", render_toolkits(&params.toolkits));
    vars.insert(
        "AVAILABLE_TOOLS_LIST",
        render_available_tools(&params.available_tools),
    );
    vars.insert(
        "CUSTOM_INSTRUCTIONS_BLOCK",
        render_custom_instructions(params.custom_instructions),
    );

    normalize_blank_lines(&render_template(SYSTEM_PROMPT_TEMPLATE, &vars))
}

fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

fn render_toolkits(toolkits: &[&str]) -> String {
    if toolkits.is_empty() {
        return "none".to_string();
    }
    toolkits.join(", ")
}

fn render_available_tools(tools: &[&str]) -> String {
    if tools.is_empty() {
        return "- none".to_string();
    }

    tools
        .iter()
        .map(|name| format!("- `{name}`"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_custom_instructions(custom: Option<&str>) -> String {
    let Some(custom) = custom.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    format!("# Additional operator instructions\n\n{custom}")
}

/// Collapse runs of blank lines left behind by empty placeholders.
fn normalize_blank_lines(text: &str) -> String {
    let mut out = String::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
        previous_blank = is_blank;
    }

    out.trim().to_string()
}
