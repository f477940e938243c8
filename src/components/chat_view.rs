use yew::prelude::*;

use crate::types::{Entry, EntryBody, FileRef, Origin, Verdict};

pub fn verdict_label(verdict: &Verdict) -> &'static str {
    if verdict.vulnerable {
        "Vulnerable"
    } else {
        "Safe"
    }
}

pub fn status_label(model: &str) -> String {
    format!("Current model: {}", model)
}

pub fn format_size(bytes: u64) -> String {
    match bytes {
        0..=1023 => format!("{} B", bytes),
        1024..=1_048_575 => format!("{:.1} KB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MB", bytes as f64 / 1_048_576.0),
    }
}

#[derive(Properties, PartialEq)]
pub struct ChatViewProps {
    pub entries: Vec<Entry>,
    pub busy: bool,
}

#[function_component(ChatView)]
pub fn chat_view(props: &ChatViewProps) -> Html {
    if props.entries.is_empty() && !props.busy {
        return html! {
            <div style="flex:1; display:flex; align-items:center; justify-content:center; color:#888; font-size:1.2em;">
                { "Attach source files and press Send to scan them for vulnerabilities" }
            </div>
        };
    }

    html! {
        <div style="flex:1; display:flex; flex-direction:column; gap:0.75em; padding:1em; overflow-y:auto;">
            { for props.entries.iter().map(render_entry) }
            { if props.busy {
                html! {
                    <div style="display:flex; justify-content:flex-start;">
                        <div style="display:flex; align-items:center; gap:0.5em; padding:0.75em 1em; background:#374151; color:white; border-radius:8px;">
                            <div class="spinner" style="
                                width:16px; height:16px;
                                border:2px solid #f3f3f3;
                                border-top:2px solid #3b82f6;
                                border-radius:50%;
                                animation:spin 1s linear infinite;
                            "></div>
                            { "Scanning..." }
                        </div>
                    </div>
                }
            } else {
                html! {}
            }}
        </div>
    }
}

fn render_entry(entry: &Entry) -> Html {
    let (justify, bubble) = match entry.sender {
        Origin::User => ("flex-end", "background:#3b82f6; color:white;"),
        Origin::Ai => ("flex-start", "background:#374151; color:white;"),
    };

    html! {
        <div style={format!("display:flex; justify-content:{};", justify)}>
            <div style={format!("max-width:70%; padding:0.75em 1em; border-radius:8px; {}", bubble)}>
                { render_body(&entry.body) }
            </div>
        </div>
    }
}

fn render_body(body: &EntryBody) -> Html {
    match body {
        EntryBody::Text(text) => html! { <p style="margin:0;">{ text }</p> },
        EntryBody::Status(model) => html! {
            <p style="margin:0; font-size:0.85em; font-style:italic; opacity:0.85;">{ status_label(model) }</p>
        },
        EntryBody::Results(results) if results.is_empty() => html! {
            <p style="margin:0;">{ "The service returned no verdicts." }</p>
        },
        EntryBody::Results(results) => html! {
            <ul style="margin:0; padding-left:1.2em;">
                { for results.iter().map(render_verdict) }
            </ul>
        },
        EntryBody::Files(files) => html! {
            <div style="display:flex; flex-direction:column; gap:0.25em;">
                { for files.iter().map(render_file) }
            </div>
        },
    }
}

fn render_verdict(verdict: &Verdict) -> Html {
    let color = if verdict.vulnerable { "#fca5a5" } else { "#86efac" };
    html! {
        <li>
            { "📂 " }<strong>{ &verdict.filename }</strong>{ " - " }
            <span style={format!("color:{};", color)}>{ verdict_label(verdict) }</span>
        </li>
    }
}

fn render_file(file: &FileRef) -> Html {
    html! {
        <span style="text-decoration:underline;">
            { &file.name }
            <span style="opacity:0.75; font-size:0.8em;">{ format!(" ({})", format_size(file.size)) }</span>
        </span>
    }
}
