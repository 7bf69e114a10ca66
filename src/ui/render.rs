//! Rendering contract and the default crossterm terminal renderer.
//!
//! `RenderSink` is what the control loop talks to. Tests substitute a
//! recording sink; the binary uses [`Renderer`].

use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::terminal;
use crossterm::QueueableCommand;
use std::io::{self, Write};

use crate::textutil::{truncate_single_line, wrap_by_chars};
use crate::types::{Message, Role};

const INDENT: &str = "  ";
const GLYPH_ACTIVITY: &str = "•";
const GLYPH_TOOL_CALL: &str = "▶";
const GLYPH_TOOL_CALL_PLAIN: &str = ">";
const GLYPH_TOOL_RESULT: &str = "\u{2190}";
const GLYPH_TOOL_RESULT_PLAIN: &str = "<-";
const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const TOOL_ARGS_PREVIEW_CHARS: usize = 80;
const TOOL_RESULT_PREVIEW_CHARS: usize = 120;
const BLOCK_FALLBACK_COLUMNS: usize = 100;
const BLOCK_RIGHT_MARGIN: usize = 2;

/// Injectable rendering interface used by the control loop.
pub trait RenderSink: Send + Sync {
    /// Greeting shown once when the session starts.
    fn welcome(&self, text: &str);
    /// Closing line shown when the session ends.
    fn farewell(&self, text: &str);
    /// One engine output message, rendered as it arrives.
    fn assistant_message(&self, message: &Message);
    /// Lifecycle text such as authorization progress.
    fn activity(&self, text: &str);
    /// Indented supporting detail, e.g. an authorization URL.
    fn detail(&self, text: &str);
    /// Tool input shown for a human approval decision.
    fn approval_block(&self, text: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Whether ANSI color/style output is enabled.
    color: bool,
    /// Whether tool call and tool result lines are echoed.
    show_tool_calls: bool,
}

impl Renderer {
    pub fn new(color: bool, show_tool_calls: bool) -> Self {
        Self {
            color,
            show_tool_calls,
        }
    }

    fn tool_call_line(&self, name: &str, args: &str) {
        let preview = truncate_single_line(args, TOOL_ARGS_PREVIEW_CHARS);
        if self.color {
            eprintln!(
                "\r{INDENT}{} {}({})",
                GLYPH_TOOL_CALL.with(Color::Yellow),
                name.with(Color::Cyan).bold(),
                preview.with(Color::DarkGrey),
            );
        } else {
            eprintln!("\r{INDENT}{GLYPH_TOOL_CALL_PLAIN} {name}({preview})");
        }
    }

    fn tool_result_line(&self, content: &str) {
        let preview = truncate_single_line(content, TOOL_RESULT_PREVIEW_CHARS);
        if self.color {
            eprintln!(
                "\r{INDENT}{} {}",
                GLYPH_TOOL_RESULT.with(Color::Green),
                preview.with(Color::DarkGrey),
            );
        } else {
            eprintln!("\r{INDENT}{GLYPH_TOOL_RESULT_PLAIN} {preview}");
        }
    }

    fn write_block<W: Write + QueueableCommand>(
        &self,
        out: &mut W,
        rows: &[String],
        width: usize,
    ) -> io::Result<()> {
        for row in rows {
            out.queue(Print("\r"))?;
            out.queue(Print(INDENT))?;
            let padded = pad_to_width(row, width);
            if self.color {
                out.queue(PrintStyledContent(
                    padded.with(Color::White).on(Color::DarkBlue),
                ))?;
            } else {
                out.queue(Print(padded.trim_end()))?;
            }
            out.queue(Print("\r\n"))?;
        }
        out.flush()
    }
}

impl RenderSink for Renderer {
    fn welcome(&self, text: &str) {
        if self.color {
            println!("{}", text.with(Color::Green).bold());
        } else {
            println!("{text}");
        }
    }

    fn farewell(&self, text: &str) {
        if self.color {
            println!("{}", text.with(Color::Red));
        } else {
            println!("{text}");
        }
    }

    fn assistant_message(&self, message: &Message) {
        match message.role {
            Role::Assistant => {
                if let Some(text) = message.content.as_deref().filter(|t| !t.trim().is_empty()) {
                    println!("{text}");
                }
                if self.show_tool_calls {
                    for call in message.tool_calls.iter().flatten() {
                        self.tool_call_line(&call.function.name, &call.function.arguments);
                    }
                }
            }
            Role::Tool => {
                if self.show_tool_calls {
                    self.tool_result_line(message.content.as_deref().unwrap_or_default());
                }
            }
            Role::System | Role::User => {}
        }
    }

    fn activity(&self, text: &str) {
        if self.color {
            eprintln!(
                "\r{} {}",
                GLYPH_ACTIVITY.with(Color::DarkGrey),
                text.with(Color::DarkGrey).bold()
            );
        } else {
            eprintln!("\r{text}");
        }
    }

    fn detail(&self, text: &str) {
        if self.color {
            eprintln!("\r{INDENT}{}", text.with(Color::Blue).underlined());
        } else {
            eprintln!("\r{INDENT}{text}");
        }
    }

    fn approval_block(&self, text: &str) {
        let width = block_content_width();
        let rows = approval_rows(text, width);
        if rows.is_empty() {
            return;
        }
        let mut stderr = io::stderr();
        if self.write_block(&mut stderr, &rows, width).is_err() {
            for row in rows {
                eprintln!("{INDENT}{row}");
            }
        }
    }

    fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("\r{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("\r{LABEL_WARNING} {msg}");
        }
    }

    fn error(&self, msg: &str) {
        if self.color {
            eprintln!("\r{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("\r{LABEL_ERROR} {msg}");
        }
    }
}

/// Rows of an approval block for a block `width` columns wide.
///
/// Long lines wrap. No part of the input is dropped.
fn approval_rows(text: &str, width: usize) -> Vec<String> {
    // One column goes to the leading pad space.
    let wrap_at = width.saturating_sub(1);
    text.lines()
        .flat_map(|line| wrap_by_chars(line, wrap_at))
        .collect()
}

fn pad_to_width(text: &str, width: usize) -> String {
    let used = text.chars().count();
    let mut out = format!(" {text}");
    out.push_str(&" ".repeat(width.saturating_sub(used + 1)));
    out
}

fn block_content_width() -> usize {
    let cols = terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(BLOCK_FALLBACK_COLUMNS);
    cols.saturating_sub(INDENT.len() + BLOCK_RIGHT_MARGIN).max(1)
}
